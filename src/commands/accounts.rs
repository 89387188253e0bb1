// Copyright (c) 2025 Nidhi Authors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::currency::Converter;
use crate::error::Error;
use crate::ledger;
use crate::models::AccountType;
use crate::utils::{
    account_by_name, accounts_for_profile, active_profile, fmt_money, maybe_print_json,
    parse_currency, parse_decimal, pretty_table,
};
use anyhow::Result;
use rusqlite::{Connection, params};
use serde::Serialize;

pub fn handle(conn: &Connection, converter: &Converter, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("edit", sub)) => edit(conn, sub)?,
        Some(("rm", sub)) => rm(conn, sub)?,
        Some(("set-order", sub)) => set_order(conn, sub)?,
        Some(("update-balance", sub)) => update_balance(conn, converter, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let profile = active_profile(conn)?;
    let name = sub.get_one::<String>("name").unwrap();
    let typ = sub.get_one::<String>("type").unwrap();
    let ccy = parse_currency(sub.get_one::<String>("currency").unwrap())?;
    let balance = parse_decimal(sub.get_one::<String>("balance").unwrap())?;
    conn.execute(
        "INSERT INTO accounts(profile_id, name, type, currency, initial_balance)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![profile.id, name, typ, ccy.code(), balance.to_string()],
    )?;
    println!("Added account '{}' ({}, {})", name, typ, ccy);
    Ok(())
}

#[derive(Serialize)]
struct AccountRow {
    name: String,
    r#type: AccountType,
    currency: String,
    balance: String,
    total_value: String,
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let profile = active_profile(conn)?;
    let mut data = Vec::new();
    for account in accounts_for_profile(conn, profile.id)? {
        let balance = ledger::current_balance(conn, &account)?;
        let total = ledger::total_value(conn, &account)?;
        data.push(AccountRow {
            name: account.name.clone(),
            r#type: account.account_type,
            currency: account.currency.code().to_string(),
            balance: fmt_money(&balance, account.currency),
            total_value: fmt_money(&total, account.currency),
        });
    }
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows = data
            .into_iter()
            .map(|r| {
                vec![
                    r.name,
                    r.r#type.to_string(),
                    r.currency,
                    r.balance,
                    r.total_value,
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Account", "Type", "CCY", "Balance", "Total Value"],
                rows
            )
        );
    }
    Ok(())
}

fn edit(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let profile = active_profile(conn)?;
    let account = account_by_name(conn, profile.id, sub.get_one::<String>("name").unwrap())?;
    if let Some(n) = sub.get_one::<String>("new-name") {
        conn.execute(
            "UPDATE accounts SET name=?1 WHERE id=?2",
            params![n, account.id],
        )?;
    }
    if let Some(t) = sub.get_one::<String>("type") {
        conn.execute(
            "UPDATE accounts SET type=?1 WHERE id=?2",
            params![t, account.id],
        )?;
    }
    if let Some(c) = sub.get_one::<String>("currency") {
        let ccy = parse_currency(c)?;
        conn.execute(
            "UPDATE accounts SET currency=?1 WHERE id=?2",
            params![ccy.code(), account.id],
        )?;
    }
    println!("Updated account '{}'", account.name);
    Ok(())
}

fn rm(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let profile = active_profile(conn)?;
    let name = sub.get_one::<String>("name").unwrap();
    let account = account_by_name(conn, profile.id, name)?;
    // Cascades to the account's transactions and fixed deposits.
    conn.execute("DELETE FROM accounts WHERE id=?1", params![account.id])?;
    println!("Removed account '{}'", account.name);
    Ok(())
}

fn set_order(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let profile = active_profile(conn)?;
    let name = sub.get_one::<String>("name").unwrap();
    let order = *sub.get_one::<i64>("order").unwrap();
    let account = account_by_name(conn, profile.id, name)?;
    conn.execute(
        "UPDATE accounts SET display_order=?1 WHERE id=?2",
        params![order, account.id],
    )?;
    println!("Set display order of '{}' to {}", account.name, order);
    Ok(())
}

/// Manual correction for investment accounts where statements, not
/// transactions, are the source of truth.
fn update_balance(conn: &Connection, converter: &Converter, sub: &clap::ArgMatches) -> Result<()> {
    let profile = active_profile(conn)?;
    let name = sub.get_one::<String>("name").unwrap();
    let account = account_by_name(conn, profile.id, name)?;
    if account.account_type != AccountType::Investment {
        return Err(Error::Validation(
            "Balance can only be manually updated for investment accounts".into(),
        )
        .into());
    }
    let target = parse_decimal(sub.get_one::<String>("target").unwrap())?;
    let input_ccy = match sub.get_one::<String>("currency") {
        Some(c) => parse_currency(c)?,
        None => account.currency,
    };
    ledger::correct_balance(conn, converter, &account, target, input_ccy)?;
    let shown = converter.convert(target, input_ccy, account.currency)?;
    println!(
        "Balance for '{}' updated to {}",
        account.name,
        fmt_money(&shown, account.currency)
    );
    Ok(())
}
