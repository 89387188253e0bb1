// Copyright (c) 2025 Nidhi Authors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use rusqlite::{Connection, OptionalExtension, Row, params};
use rust_decimal::Decimal;

use crate::currency::Currency;
use crate::error::Error;
use crate::models::{Account, AccountType, Profile};

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
}

pub fn parse_month(s: &str) -> Result<String> {
    let s = s.trim();
    NaiveDate::parse_from_str(&format!("{}-01", s), "%Y-%m-%d")
        .with_context(|| format!("Invalid month '{}', expected YYYY-MM", s))?;
    Ok(s.to_string())
}

pub fn parse_decimal(s: &str) -> Result<Decimal> {
    s.trim()
        .parse::<Decimal>()
        .with_context(|| format!("Invalid decimal '{}'", s))
}

/// Amounts are persisted as decimal strings; a row that fails to parse is
/// corrupt data, not user error.
pub fn stored_decimal(s: &str) -> Result<Decimal> {
    s.parse::<Decimal>()
        .with_context(|| format!("Corrupt stored amount '{}'", s))
}

pub fn parse_currency(s: &str) -> Result<Currency> {
    Currency::parse(s)
        .ok_or_else(|| Error::Validation(format!("Unsupported currency '{}', use USD or INR", s)))
        .map_err(Into::into)
}

pub fn month_key(year: i32, month: u32) -> String {
    format!("{year:04}-{month:02}")
}

pub fn fmt_money(d: &Decimal, ccy: Currency) -> String {
    format!("{}{}", ccy.symbol(), d.round_dp(2))
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}

// ---- profile scoping -------------------------------------------------------

pub fn set_active_profile(conn: &Connection, name: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO settings(key, value) VALUES('active_profile', ?1)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        params![name],
    )?;
    Ok(())
}

pub fn profile_by_name(conn: &Connection, name: &str) -> Result<Profile> {
    let row = conn
        .query_row(
            "SELECT id, name, display_currency FROM profiles WHERE name=?1",
            params![name],
            |r| {
                Ok((
                    r.get::<_, i64>(0)?,
                    r.get::<_, String>(1)?,
                    r.get::<_, String>(2)?,
                ))
            },
        )
        .optional()?;
    let (id, name, ccy) = row.ok_or_else(|| Error::not_found("Profile", name))?;
    Ok(Profile {
        id,
        name,
        display_currency: Currency::parse_or_usd(&ccy),
    })
}

/// The profile every command operates as. Lookups elsewhere are scoped to
/// this id, so entities of other profiles surface as NotFound.
pub fn active_profile(conn: &Connection) -> Result<Profile> {
    let name: Option<String> = conn
        .query_row(
            "SELECT value FROM settings WHERE key='active_profile'",
            [],
            |r| r.get(0),
        )
        .optional()?;
    match name {
        Some(n) => profile_by_name(conn, &n),
        None => Err(Error::Validation(
            "No active profile; create one with 'nidhi profile add <name>'".into(),
        )
        .into()),
    }
}

// ---- account loading -------------------------------------------------------

pub const ACCOUNT_COLS: &str =
    "id, profile_id, name, type, currency, initial_balance, display_order";

pub fn account_from_row(r: &Row<'_>) -> rusqlite::Result<(Account, String)> {
    let typ: String = r.get(3)?;
    let ccy: String = r.get(4)?;
    let bal: String = r.get(5)?;
    Ok((
        Account {
            id: r.get(0)?,
            profile_id: r.get(1)?,
            name: r.get(2)?,
            account_type: AccountType::parse(&typ).unwrap_or(AccountType::Checking),
            currency: Currency::parse_or_usd(&ccy),
            initial_balance: Decimal::ZERO,
            display_order: r.get(6)?,
        },
        bal,
    ))
}

fn finish_account(pair: (Account, String)) -> Result<Account> {
    let (mut account, bal) = pair;
    account.initial_balance = stored_decimal(&bal)?;
    Ok(account)
}

pub fn account_by_name(conn: &Connection, profile_id: i64, name: &str) -> Result<Account> {
    let sql = format!("SELECT {ACCOUNT_COLS} FROM accounts WHERE profile_id=?1 AND name=?2");
    let row = conn
        .query_row(&sql, params![profile_id, name], account_from_row)
        .optional()?;
    match row {
        Some(pair) => finish_account(pair),
        None => Err(Error::not_found("Account", name).into()),
    }
}

pub fn accounts_for_profile(conn: &Connection, profile_id: i64) -> Result<Vec<Account>> {
    let sql = format!(
        "SELECT {ACCOUNT_COLS} FROM accounts WHERE profile_id=?1
         ORDER BY display_order, name"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![profile_id], account_from_row)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(finish_account(row?)?);
    }
    Ok(out)
}

/// Categories visible to a profile: system defaults plus its own.
pub fn category_names(conn: &Connection, profile_id: i64) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT name FROM categories WHERE profile_id IS NULL OR profile_id=?1
         ORDER BY profile_id IS NOT NULL, name",
    )?;
    let rows = stmt.query_map(params![profile_id], |r| r.get::<_, String>(0))?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

pub fn category_exists(conn: &Connection, profile_id: i64, name: &str) -> Result<bool> {
    let mut stmt = conn.prepare(
        "SELECT 1 FROM categories WHERE (profile_id IS NULL OR profile_id=?1) AND name=?2",
    )?;
    Ok(stmt.exists(params![profile_id, name])?)
}
