// Copyright (c) 2025 Nidhi Authors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, Row, params};
use serde::Serialize;

use crate::currency::Currency;
use crate::error::Error;
use crate::models::{FixedDeposit, SystemCategory};
use crate::utils::{
    account_by_name, active_profile, fmt_money, maybe_print_json, parse_date, parse_decimal,
    pretty_table, stored_decimal,
};

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("show", sub)) => show(conn, sub)?,
        Some(("edit", sub)) => edit(conn, sub)?,
        Some(("mark-matured", sub)) => mark_matured(conn, sub)?,
        Some(("rm", sub)) => rm(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let profile = active_profile(conn)?;
    let account = account_by_name(conn, profile.id, sub.get_one::<String>("account").unwrap())?;
    if account.currency != Currency::Inr {
        return Err(Error::Validation(
            "Fixed deposits can only be linked to INR accounts".into(),
        )
        .into());
    }
    let principal = parse_decimal(sub.get_one::<String>("principal").unwrap())?;
    let rate = *sub.get_one::<f64>("rate").unwrap();
    let start = parse_date(sub.get_one::<String>("start").unwrap())?;
    let maturity = parse_date(sub.get_one::<String>("maturity").unwrap())?;
    FixedDeposit::validate_terms(principal, rate, start, maturity)?;

    let bank = sub.get_one::<String>("bank").cloned();
    let number = sub.get_one::<String>("number").cloned();
    let debit = !sub.get_flag("no-debit");

    let fd = FixedDeposit {
        id: 0,
        account_id: account.id,
        principal,
        interest_rate: rate,
        start_date: start,
        maturity_date: maturity,
        bank_name: bank,
        fd_number: number,
        is_matured: false,
    };

    // The deposit row and its funding debit land together or not at all;
    // there is no foreign key between them, so atomicity is the link.
    let tx = conn.transaction()?;
    tx.execute(
        "INSERT INTO fixed_deposits(account_id, principal, interest_rate, start_date,
                                    maturity_date, bank_name, fd_number)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            fd.account_id,
            fd.principal.to_string(),
            fd.interest_rate,
            fd.start_date.to_string(),
            fd.maturity_date.to_string(),
            fd.bank_name,
            fd.fd_number
        ],
    )?;
    if debit {
        tx.execute(
            "INSERT INTO transactions(account_id, amount, description, category, date)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                fd.account_id,
                (-fd.principal).to_string(),
                fd.funding_description(),
                SystemCategory::Transfer.as_str(),
                fd.start_date.to_string()
            ],
        )?;
    }
    tx.commit()?;

    println!(
        "Added fixed deposit of {} at {}% maturing {}{}",
        fmt_money(&fd.principal, Currency::Inr),
        fd.interest_rate,
        fd.maturity_date,
        if debit {
            " (principal debited from account)"
        } else {
            ""
        }
    );
    Ok(())
}

/// A stored date that fails to parse is corrupt data, reported through the
/// row mapper rather than silently defaulted.
fn stored_date(idx: usize, s: &str) -> rusqlite::Result<chrono::NaiveDate> {
    chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn fd_from_row(r: &Row<'_>) -> rusqlite::Result<(FixedDeposit, String)> {
    let principal: String = r.get(2)?;
    let start: String = r.get(4)?;
    let maturity: String = r.get(5)?;
    Ok((
        FixedDeposit {
            id: r.get(0)?,
            account_id: r.get(1)?,
            principal: rust_decimal::Decimal::ZERO,
            interest_rate: r.get(3)?,
            start_date: stored_date(4, &start)?,
            maturity_date: stored_date(5, &maturity)?,
            bank_name: r.get(6)?,
            fd_number: r.get(7)?,
            is_matured: r.get(8)?,
        },
        principal,
    ))
}

const FD_COLS: &str = "f.id, f.account_id, f.principal, f.interest_rate, f.start_date,
                       f.maturity_date, f.bank_name, f.fd_number, f.is_matured";

fn owned_fd(conn: &Connection, profile_id: i64, id: i64) -> Result<FixedDeposit> {
    let sql = format!(
        "SELECT {FD_COLS} FROM fixed_deposits f JOIN accounts a ON f.account_id=a.id
         WHERE a.profile_id=?1 AND f.id=?2"
    );
    let row = conn
        .query_row(&sql, params![profile_id, id], fd_from_row)
        .optional()?;
    match row {
        Some((mut fd, principal)) => {
            fd.principal = stored_decimal(&principal)?;
            Ok(fd)
        }
        None => Err(Error::not_found("Fixed deposit", id.to_string()).into()),
    }
}

#[derive(Serialize)]
struct FdRow {
    id: i64,
    account: String,
    principal: String,
    rate: f64,
    maturity_date: String,
    maturity_value: String,
    interest: String,
    days_left: i64,
    status: String,
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let profile = active_profile(conn)?;
    let today = Utc::now().date_naive();

    let sql = format!(
        "SELECT {FD_COLS}, a.name FROM fixed_deposits f JOIN accounts a ON f.account_id=a.id
         WHERE a.profile_id=?1 ORDER BY f.maturity_date"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![profile.id], |r| {
        let pair = fd_from_row(r)?;
        let account: String = r.get(9)?;
        Ok((pair, account))
    })?;

    let mut data = Vec::new();
    for row in rows {
        let ((mut fd, principal), account) = row?;
        fd.principal = stored_decimal(&principal)?;
        let status = if fd.is_matured {
            "matured".to_string()
        } else if fd.is_past_maturity(today) {
            "past maturity".to_string()
        } else {
            "active".to_string()
        };
        data.push(FdRow {
            id: fd.id,
            account,
            principal: fmt_money(&fd.principal, Currency::Inr),
            rate: fd.interest_rate,
            maturity_date: fd.maturity_date.to_string(),
            maturity_value: fmt_money(&fd.maturity_value(), Currency::Inr),
            interest: fmt_money(&fd.interest_earned(), Currency::Inr),
            days_left: fd.days_to_maturity(today),
            status,
        });
    }
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows = data
            .into_iter()
            .map(|r| {
                vec![
                    r.id.to_string(),
                    r.account,
                    r.principal,
                    format!("{}%", r.rate),
                    r.maturity_date,
                    r.maturity_value,
                    r.interest,
                    r.days_left.to_string(),
                    r.status,
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &[
                    "Id", "Account", "Principal", "Rate", "Maturity", "Value", "Interest",
                    "Days Left", "Status",
                ],
                rows
            )
        );
    }
    Ok(())
}

fn show(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let profile = active_profile(conn)?;
    let id = *sub.get_one::<i64>("id").unwrap();
    let fd = owned_fd(conn, profile.id, id)?;
    let today = Utc::now().date_naive();

    let rows = vec![
        vec!["Principal".into(), fmt_money(&fd.principal, Currency::Inr)],
        vec!["Interest rate".into(), format!("{}% p.a.", fd.interest_rate)],
        vec!["Start date".into(), fd.start_date.to_string()],
        vec!["Maturity date".into(), fd.maturity_date.to_string()],
        vec![
            "Maturity value".into(),
            fmt_money(&fd.maturity_value(), Currency::Inr),
        ],
        vec![
            "Interest earned".into(),
            fmt_money(&fd.interest_earned(), Currency::Inr),
        ],
        vec![
            "Days to maturity".into(),
            fd.days_to_maturity(today).to_string(),
        ],
        vec![
            "Past maturity".into(),
            if fd.is_past_maturity(today) { "yes" } else { "no" }.into(),
        ],
        vec![
            "Status".into(),
            if fd.is_matured { "matured" } else { "active" }.into(),
        ],
        vec!["Bank".into(), fd.bank_name.clone().unwrap_or_default()],
        vec!["Reference".into(), fd.fd_number.clone().unwrap_or_default()],
    ];
    println!("{}", pretty_table(&["Field", "Value"], rows));
    Ok(())
}

/// Correct a deposit's terms. The funding debit, if one was recorded, is
/// historical and stays untouched.
fn edit(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let profile = active_profile(conn)?;
    let id = *sub.get_one::<i64>("id").unwrap();
    let mut fd = owned_fd(conn, profile.id, id)?;

    if let Some(s) = sub.get_one::<String>("principal") {
        fd.principal = parse_decimal(s)?;
    }
    if let Some(rate) = sub.get_one::<f64>("rate") {
        fd.interest_rate = *rate;
    }
    if let Some(s) = sub.get_one::<String>("start") {
        fd.start_date = parse_date(s)?;
    }
    if let Some(s) = sub.get_one::<String>("maturity") {
        fd.maturity_date = parse_date(s)?;
    }
    if let Some(s) = sub.get_one::<String>("bank") {
        fd.bank_name = Some(s.clone());
    }
    if let Some(s) = sub.get_one::<String>("number") {
        fd.fd_number = Some(s.clone());
    }
    FixedDeposit::validate_terms(fd.principal, fd.interest_rate, fd.start_date, fd.maturity_date)?;

    conn.execute(
        "UPDATE fixed_deposits SET principal=?1, interest_rate=?2, start_date=?3,
                                   maturity_date=?4, bank_name=?5, fd_number=?6
         WHERE id=?7",
        params![
            fd.principal.to_string(),
            fd.interest_rate,
            fd.start_date.to_string(),
            fd.maturity_date.to_string(),
            fd.bank_name,
            fd.fd_number,
            fd.id
        ],
    )?;
    println!("Updated fixed deposit {}", fd.id);
    Ok(())
}

fn mark_matured(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let profile = active_profile(conn)?;
    let id = *sub.get_one::<i64>("id").unwrap();
    let fd = owned_fd(conn, profile.id, id)?;
    conn.execute(
        "UPDATE fixed_deposits SET is_matured=1 WHERE id=?1",
        params![fd.id],
    )?;
    println!("Marked fixed deposit {} as matured", fd.id);
    Ok(())
}

fn rm(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let profile = active_profile(conn)?;
    let id = *sub.get_one::<i64>("id").unwrap();
    let fd = owned_fd(conn, profile.id, id)?;
    conn.execute("DELETE FROM fixed_deposits WHERE id=?1", params![fd.id])?;
    println!("Removed fixed deposit {}", fd.id);
    Ok(())
}
