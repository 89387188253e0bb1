// Copyright (c) 2025 Nidhi Authors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::Connection;

use nidhi::cli;
use nidhi::commands::accounts;
use nidhi::currency::Converter;
use nidhi::utils::{account_by_name, set_active_profile};

fn setup() -> Connection {
    let mut conn = Connection::open_in_memory().unwrap();
    nidhi::db::init_schema(&mut conn).unwrap();
    conn.execute("INSERT INTO profiles(name) VALUES ('me')", [])
        .unwrap();
    set_active_profile(&conn, "me").unwrap();
    conn.execute(
        "INSERT INTO accounts(profile_id, name, type, currency) VALUES
         (1, 'checking', 'checking', 'USD')",
        [],
    )
    .unwrap();
    conn
}

fn run(conn: &Connection, argv: &[&str]) -> anyhow::Result<()> {
    let converter = Converter::with_rate(83.0);
    let m = cli::build_cli().try_get_matches_from(argv).unwrap();
    match m.subcommand() {
        Some(("account", sub)) => accounts::handle(conn, &converter, sub),
        _ => unreachable!(),
    }
}

#[test]
fn edit_renames_and_retypes() {
    let conn = setup();
    run(
        &conn,
        &[
            "nidhi", "account", "edit", "checking", "--new-name", "daily", "--type", "savings",
        ],
    )
    .unwrap();

    let account = account_by_name(&conn, 1, "daily").unwrap();
    assert_eq!(account.account_type, nidhi::models::AccountType::Savings);
    assert!(account_by_name(&conn, 1, "checking").is_err());
}

#[test]
fn edit_changes_the_currency() {
    let conn = setup();
    run(&conn, &["nidhi", "account", "edit", "checking", "--currency", "INR"]).unwrap();
    let account = account_by_name(&conn, 1, "checking").unwrap();
    assert_eq!(account.currency, nidhi::currency::Currency::Inr);
}

#[test]
fn edit_of_a_missing_account_fails() {
    let conn = setup();
    let err = run(
        &conn,
        &["nidhi", "account", "edit", "nope", "--new-name", "still-nope"],
    )
    .unwrap_err();
    assert!(err.to_string().contains("not found"), "{err}");
}
