// Copyright (c) 2025 Nidhi Authors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use rusqlite::{Connection, params};
use rust_decimal::Decimal;

use crate::currency::{Converter, Currency};
use crate::models::Account;
use crate::utils::stored_decimal;

/// Sum of all transaction amounts on an account. Amounts are stored as
/// decimal text, so the sum runs in `Decimal`, not SQL floats.
pub fn transaction_sum(conn: &Connection, account_id: i64) -> Result<Decimal> {
    let mut stmt = conn.prepare_cached("SELECT amount FROM transactions WHERE account_id=?1")?;
    let mut rows = stmt.query(params![account_id])?;
    let mut total = Decimal::ZERO;
    while let Some(r) = rows.next()? {
        let s: String = r.get(0)?;
        total += stored_decimal(&s)?;
    }
    Ok(total)
}

/// initial_balance + sum of transactions. With no transactions this is the
/// initial balance unchanged.
pub fn current_balance(conn: &Connection, account: &Account) -> Result<Decimal> {
    Ok(account.initial_balance + transaction_sum(conn, account.id)?)
}

/// Outstanding (non-matured) fixed deposit principal on an account.
/// Deposits are INR-only, so any other currency contributes zero.
pub fn fixed_deposit_principal(conn: &Connection, account: &Account) -> Result<Decimal> {
    if account.currency != Currency::Inr {
        return Ok(Decimal::ZERO);
    }
    let mut stmt = conn.prepare_cached(
        "SELECT principal FROM fixed_deposits WHERE account_id=?1 AND is_matured=0",
    )?;
    let mut rows = stmt.query(params![account.id])?;
    let mut total = Decimal::ZERO;
    while let Some(r) = rows.next()? {
        let s: String = r.get(0)?;
        total += stored_decimal(&s)?;
    }
    Ok(total)
}

/// Balance plus outstanding fixed deposit principal.
pub fn total_value(conn: &Connection, account: &Account) -> Result<Decimal> {
    Ok(current_balance(conn, account)? + fixed_deposit_principal(conn, account)?)
}

/// Manual balance correction: make `current_balance` equal `target` by
/// back-solving the initial balance. The target may be entered in either
/// currency and is converted to the account's own first. Callers restrict
/// this to investment accounts; the calculation itself does not care.
pub fn correct_balance(
    conn: &Connection,
    converter: &Converter,
    account: &Account,
    target: Decimal,
    input_currency: Currency,
) -> Result<Decimal> {
    let target = converter.convert(target, input_currency, account.currency)?;
    let new_initial = target - transaction_sum(conn, account.id)?;
    conn.execute(
        "UPDATE accounts SET initial_balance=?1 WHERE id=?2",
        params![new_initial.to_string(), account.id],
    )?;
    Ok(new_initial)
}
