// Copyright (c) 2025 Nidhi Authors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::Error;
use crate::models::SystemCategory;
use crate::utils::{
    account_by_name, active_profile, category_exists, maybe_print_json, parse_date, parse_decimal,
    pretty_table,
};
use anyhow::Result;
use rusqlite::{Connection, OptionalExtension, params};
use rust_decimal::Decimal;
use serde::Serialize;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("edit", sub)) => edit(conn, sub)?,
        Some(("rm", sub)) => rm(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let profile = active_profile(conn)?;
    let account = account_by_name(conn, profile.id, sub.get_one::<String>("account").unwrap())?;
    let is_expense = sub.get_one::<String>("type").unwrap() == "expense";
    let date = parse_date(sub.get_one::<String>("date").unwrap())?;
    let description = sub.get_one::<String>("description").unwrap();
    let category = sub.get_one::<String>("category").unwrap().trim().to_string();

    if !category_exists(conn, profile.id, &category)? {
        return Err(Error::not_found("Category", category).into());
    }

    let amount = parse_decimal(sub.get_one::<String>("amount").unwrap())?;
    if amount <= Decimal::ZERO {
        return Err(Error::Validation("Amount must be positive".into()).into());
    }
    let amount = if is_expense { -amount } else { amount };

    // A zero share means "not applicable", same as omitting it; the sign
    // always follows the transaction type.
    let my_share = match sub.get_one::<String>("my-share") {
        Some(s) => {
            let share = parse_decimal(s)?.abs();
            if share.is_zero() {
                None
            } else if is_expense {
                Some(-share)
            } else {
                Some(share)
            }
        }
        None => None,
    };

    conn.execute(
        "INSERT INTO transactions(account_id, amount, my_share, description, category, date)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            account.id,
            amount.to_string(),
            my_share.map(|s| s.to_string()),
            description,
            category,
            date.to_string()
        ],
    )?;
    println!(
        "Recorded {} on {} '{}' (acct: {})",
        amount, date, description, account.name
    );
    Ok(())
}

#[derive(Serialize)]
pub struct TransactionRow {
    pub id: i64,
    pub date: String,
    pub account: String,
    pub description: String,
    pub amount: String,
    pub my_share: Option<String>,
    pub category: String,
}

pub fn query_rows(conn: &Connection, sub: &clap::ArgMatches) -> Result<Vec<TransactionRow>> {
    let profile = active_profile(conn)?;
    let mut sql = String::from(
        "SELECT t.id, t.date, a.name, t.description, t.amount, t.my_share, t.category
         FROM transactions t JOIN accounts a ON t.account_id=a.id
         WHERE a.profile_id=?",
    );
    let mut params_vec: Vec<String> = vec![profile.id.to_string()];

    if let Some(month) = sub.get_one::<String>("month") {
        sql.push_str(" AND substr(t.date,1,7)=?");
        params_vec.push(crate::utils::parse_month(month)?);
    }
    if let Some(acct) = sub.get_one::<String>("account") {
        sql.push_str(" AND a.name=?");
        params_vec.push(acct.into());
    }
    if let Some(cat) = sub.get_one::<String>("category") {
        sql.push_str(" AND t.category=?");
        params_vec.push(cat.into());
    }
    sql.push_str(" ORDER BY t.date DESC, t.id DESC");
    if let Some(limit) = sub.get_one::<usize>("limit") {
        sql.push_str(" LIMIT ?");
        params_vec.push(limit.to_string());
    }

    let mut stmt = conn.prepare(&sql)?;
    let params: Vec<&dyn rusqlite::ToSql> = params_vec
        .iter()
        .map(|s| s as &dyn rusqlite::ToSql)
        .collect();
    let mut rows = stmt.query(rusqlite::params_from_iter(params))?;

    let mut data = Vec::new();
    while let Some(r) = rows.next()? {
        data.push(TransactionRow {
            id: r.get(0)?,
            date: r.get(1)?,
            account: r.get(2)?,
            description: r.get(3)?,
            amount: r.get(4)?,
            my_share: r.get(5)?,
            category: r.get(6)?,
        });
    }
    Ok(data)
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let data = query_rows(conn, sub)?;
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|r| {
                vec![
                    r.id.to_string(),
                    r.date.clone(),
                    r.account.clone(),
                    r.description.clone(),
                    r.amount.clone(),
                    r.my_share.clone().unwrap_or_default(),
                    r.category.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Id", "Date", "Account", "Description", "Amount", "My Share", "Category"],
                rows,
            )
        );
    }
    Ok(())
}

/// Look up a transaction id within the active profile's accounts.
fn owned_transaction(
    conn: &Connection,
    profile_id: i64,
    id: i64,
) -> Result<(i64, Decimal, Option<Decimal>)> {
    let row: Option<(i64, String, Option<String>)> = conn
        .query_row(
            "SELECT t.id, t.amount, t.my_share
             FROM transactions t JOIN accounts a ON t.account_id=a.id
             WHERE a.profile_id=?1 AND t.id=?2",
            params![profile_id, id],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
        )
        .optional()?;
    match row {
        Some((id, amount, share)) => Ok((
            id,
            crate::utils::stored_decimal(&amount)?,
            share.as_deref().map(crate::utils::stored_decimal).transpose()?,
        )),
        None => Err(Error::not_found("Transaction", id.to_string()).into()),
    }
}

fn edit(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let profile = active_profile(conn)?;
    let id = *sub.get_one::<i64>("id").unwrap();
    let (id, current_amount, current_share) = owned_transaction(conn, profile.id, id)?;

    let amount = match sub.get_one::<String>("amount") {
        Some(s) => {
            let amount = parse_decimal(s)?;
            conn.execute(
                "UPDATE transactions SET amount=?1 WHERE id=?2",
                params![amount.to_string(), id],
            )?;
            amount
        }
        None => current_amount,
    };
    match sub.get_one::<String>("my-share") {
        Some(s) => {
            let share = parse_decimal(s)?;
            if share.is_zero() {
                conn.execute(
                    "UPDATE transactions SET my_share=NULL WHERE id=?1",
                    params![id],
                )?;
            } else {
                if (share > Decimal::ZERO) != (amount > Decimal::ZERO) {
                    return Err(Error::Validation(
                        "My-share must carry the same sign as the amount".into(),
                    )
                    .into());
                }
                conn.execute(
                    "UPDATE transactions SET my_share=?1 WHERE id=?2",
                    params![share.to_string(), id],
                )?;
            }
        }
        None => {
            // A surviving share must keep the sign of the (possibly new)
            // amount, so a sign-flipping amount edit re-signs it.
            if let Some(share) = current_share {
                if !amount.is_zero() && (share > Decimal::ZERO) != (amount > Decimal::ZERO) {
                    conn.execute(
                        "UPDATE transactions SET my_share=?1 WHERE id=?2",
                        params![(-share).to_string(), id],
                    )?;
                }
            }
        }
    }
    if let Some(desc) = sub.get_one::<String>("description") {
        conn.execute(
            "UPDATE transactions SET description=?1 WHERE id=?2",
            params![desc, id],
        )?;
    }
    if let Some(cat) = sub.get_one::<String>("category") {
        let cat = cat.trim();
        if !category_exists(conn, profile.id, cat)? {
            return Err(Error::not_found("Category", cat).into());
        }
        conn.execute(
            "UPDATE transactions SET category=?1 WHERE id=?2",
            params![cat, id],
        )?;
    }
    if let Some(d) = sub.get_one::<String>("date") {
        let date = parse_date(d)?;
        conn.execute(
            "UPDATE transactions SET date=?1 WHERE id=?2",
            params![date.to_string(), id],
        )?;
    }
    println!("Updated transaction {}", id);
    Ok(())
}

fn rm(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let profile = active_profile(conn)?;
    let id = *sub.get_one::<i64>("id").unwrap();
    let (id, _, _) = owned_transaction(conn, profile.id, id)?;
    conn.execute("DELETE FROM transactions WHERE id=?1", params![id])?;
    println!("Removed transaction {}", id);
    Ok(())
}

/// Create the matched pair of transactions for an inter-account movement:
/// a debit on the source, a credit on the destination, equal in magnitude,
/// both tagged with the transfer category and the same date. Inserted in
/// one database transaction so a half-written pair cannot exist.
pub fn transfer(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    let profile = active_profile(conn)?;
    let from = account_by_name(conn, profile.id, m.get_one::<String>("from").unwrap())?;
    let to = account_by_name(conn, profile.id, m.get_one::<String>("to").unwrap())?;
    if from.id == to.id {
        return Err(Error::Validation("Cannot transfer to the same account".into()).into());
    }
    let amount = parse_decimal(m.get_one::<String>("amount").unwrap())?.abs();
    if amount.is_zero() {
        return Err(Error::Validation("Amount must be positive".into()).into());
    }
    let date = parse_date(m.get_one::<String>("date").unwrap())?;
    let description = m
        .get_one::<String>("description")
        .cloned()
        .unwrap_or_else(|| "Transfer".to_string());
    let category = SystemCategory::Transfer.as_str();

    let tx = conn.transaction()?;
    tx.execute(
        "INSERT INTO transactions(account_id, amount, description, category, date)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            from.id,
            (-amount).to_string(),
            format!("Transfer to {}: {}", to.name, description),
            category,
            date.to_string()
        ],
    )?;
    tx.execute(
        "INSERT INTO transactions(account_id, amount, description, category, date)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            to.id,
            amount.to_string(),
            format!("Transfer from {}: {}", from.name, description),
            category,
            date.to_string()
        ],
    )?;
    tx.commit()?;

    println!(
        "Transferred {} from '{}' to '{}' on {}",
        amount, from.name, to.name, date
    );
    Ok(())
}
