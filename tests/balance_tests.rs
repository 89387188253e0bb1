// Copyright (c) 2025 Nidhi Authors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::{Connection, params};
use rust_decimal::Decimal;

use nidhi::currency::Converter;
use nidhi::ledger;
use nidhi::utils::account_by_name;

fn setup() -> Connection {
    let mut conn = Connection::open_in_memory().unwrap();
    nidhi::db::init_schema(&mut conn).unwrap();
    conn.execute("INSERT INTO profiles(name) VALUES ('me')", [])
        .unwrap();
    conn
}

fn add_account(conn: &Connection, name: &str, typ: &str, ccy: &str, balance: &str) -> i64 {
    conn.execute(
        "INSERT INTO accounts(profile_id, name, type, currency, initial_balance)
         VALUES (1, ?1, ?2, ?3, ?4)",
        params![name, typ, ccy, balance],
    )
    .unwrap();
    conn.last_insert_rowid()
}

fn add_tx(conn: &Connection, account_id: i64, amount: &str, date: &str) {
    conn.execute(
        "INSERT INTO transactions(account_id, amount, description, category, date)
         VALUES (?1, ?2, 'x', 'other', ?3)",
        params![account_id, amount, date],
    )
    .unwrap();
}

#[test]
fn balance_is_initial_plus_transactions() {
    let conn = setup();
    let id = add_account(&conn, "checking", "checking", "USD", "1000");
    add_tx(&conn, id, "500", "2025-07-01");
    add_tx(&conn, id, "-200", "2025-07-02");

    let account = account_by_name(&conn, 1, "checking").unwrap();
    let balance = ledger::current_balance(&conn, &account).unwrap();
    assert_eq!(balance, Decimal::from(1300));
}

#[test]
fn balance_with_no_transactions_is_initial() {
    let conn = setup();
    add_account(&conn, "checking", "checking", "USD", "250.75");
    let account = account_by_name(&conn, 1, "checking").unwrap();
    assert_eq!(
        ledger::current_balance(&conn, &account).unwrap(),
        "250.75".parse::<Decimal>().unwrap()
    );
}

#[test]
fn total_value_includes_outstanding_fd_principal() {
    let conn = setup();
    let id = add_account(&conn, "nre", "savings", "INR", "50000");
    conn.execute(
        "INSERT INTO fixed_deposits(account_id, principal, interest_rate, start_date, maturity_date)
         VALUES (?1, '100000', 7.0, '2025-01-01', '2026-01-01')",
        params![id],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO fixed_deposits(account_id, principal, interest_rate, start_date, maturity_date, is_matured)
         VALUES (?1, '40000', 6.5, '2024-01-01', '2025-01-01', 1)",
        params![id],
    )
    .unwrap();

    let account = account_by_name(&conn, 1, "nre").unwrap();
    // The matured deposit no longer counts.
    assert_eq!(
        ledger::total_value(&conn, &account).unwrap(),
        Decimal::from(150_000)
    );
}

#[test]
fn fd_principal_ignored_on_usd_accounts() {
    let conn = setup();
    let id = add_account(&conn, "usd-sav", "savings", "USD", "100");
    conn.execute(
        "INSERT INTO fixed_deposits(account_id, principal, interest_rate, start_date, maturity_date)
         VALUES (?1, '100000', 7.0, '2025-01-01', '2026-01-01')",
        params![id],
    )
    .unwrap();
    let account = account_by_name(&conn, 1, "usd-sav").unwrap();
    assert_eq!(
        ledger::total_value(&conn, &account).unwrap(),
        Decimal::from(100)
    );
}

#[test]
fn correct_balance_back_solves_initial() {
    let conn = setup();
    let converter = Converter::with_rate(80.0);
    let id = add_account(&conn, "brokerage", "investment", "USD", "0");
    add_tx(&conn, id, "1000", "2025-07-01");
    add_tx(&conn, id, "-100", "2025-07-05");

    let account = account_by_name(&conn, 1, "brokerage").unwrap();
    let new_initial = ledger::correct_balance(
        &conn,
        &converter,
        &account,
        Decimal::from(5000),
        nidhi::currency::Currency::Usd,
    )
    .unwrap();
    assert_eq!(new_initial, Decimal::from(4100));

    let account = account_by_name(&conn, 1, "brokerage").unwrap();
    assert_eq!(
        ledger::current_balance(&conn, &account).unwrap(),
        Decimal::from(5000)
    );
}

#[test]
fn correct_balance_converts_target_currency() {
    let conn = setup();
    let converter = Converter::with_rate(80.0);
    add_account(&conn, "mf", "investment", "INR", "0");
    let account = account_by_name(&conn, 1, "mf").unwrap();
    // Target entered in USD against an INR account.
    let new_initial = ledger::correct_balance(
        &conn,
        &converter,
        &account,
        Decimal::from(100),
        nidhi::currency::Currency::Usd,
    )
    .unwrap();
    assert_eq!(new_initial, Decimal::from(8000));
}
