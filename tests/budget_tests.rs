// Copyright (c) 2025 Nidhi Authors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::Connection;
use rust_decimal::Decimal;

use nidhi::cli;
use nidhi::commands::budgets;
use nidhi::currency::Converter;
use nidhi::report;
use nidhi::utils::{profile_by_name, set_active_profile};

fn setup() -> Connection {
    let mut conn = Connection::open_in_memory().unwrap();
    nidhi::db::init_schema(&mut conn).unwrap();
    conn.execute("INSERT INTO profiles(name) VALUES ('me')", [])
        .unwrap();
    set_active_profile(&conn, "me").unwrap();
    conn.execute(
        "INSERT INTO accounts(profile_id, name, type, currency) VALUES
         (1, 'checking', 'checking', 'USD'),
         (1, 'nre-savings', 'savings', 'INR')",
        [],
    )
    .unwrap();
    conn
}

fn run(conn: &mut Connection, argv: &[&str]) -> anyhow::Result<()> {
    let converter = Converter::with_rate(83.0);
    let m = cli::build_cli().try_get_matches_from(argv).unwrap();
    match m.subcommand() {
        Some(("budget", sub)) => budgets::handle(conn, &converter, sub),
        _ => unreachable!(),
    }
}

fn active_budget_name(conn: &Connection) -> Option<String> {
    report::active_budget(conn, 1)
        .unwrap()
        .map(|b| b.name)
}

#[test]
fn creating_a_budget_makes_it_the_only_active_one() {
    let mut conn = setup();
    run(
        &mut conn,
        &["nidhi", "budget", "create", "--name", "july", "--income", "5000"],
    )
    .unwrap();
    assert_eq!(active_budget_name(&conn).as_deref(), Some("july"));

    run(
        &mut conn,
        &["nidhi", "budget", "create", "--name", "august", "--income", "5200"],
    )
    .unwrap();
    assert_eq!(active_budget_name(&conn).as_deref(), Some("august"));

    let actives: i64 = conn
        .query_row(
            "SELECT count(*) FROM budgets WHERE profile_id=1 AND is_active=1",
            [],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(actives, 1);
}

#[test]
fn activate_swaps_atomically() {
    let mut conn = setup();
    run(&mut conn, &["nidhi", "budget", "create", "--name", "a"]).unwrap();
    run(&mut conn, &["nidhi", "budget", "create", "--name", "b"]).unwrap();
    run(&mut conn, &["nidhi", "budget", "activate", "a"]).unwrap();
    assert_eq!(active_budget_name(&conn).as_deref(), Some("a"));

    let err = run(&mut conn, &["nidhi", "budget", "activate", "missing"]).unwrap_err();
    assert!(err.to_string().contains("not found"), "{err}");
    assert_eq!(active_budget_name(&conn).as_deref(), Some("a"));
}

#[test]
fn item_add_upserts_and_shows_in_comparison() {
    let mut conn = setup();
    run(&mut conn, &["nidhi", "budget", "create", "--name", "m"]).unwrap();
    run(
        &mut conn,
        &["nidhi", "budget", "item", "add", "--category", "groceries", "--amount", "300"],
    )
    .unwrap();
    run(
        &mut conn,
        &["nidhi", "budget", "item", "add", "--category", "groceries", "--amount", "250"],
    )
    .unwrap();

    conn.execute(
        "INSERT INTO transactions(account_id, amount, description, category, date)
         VALUES (1, '-200', 'food', 'groceries', '2025-07-10')",
        [],
    )
    .unwrap();

    let converter = Converter::with_rate(83.0);
    let profile = profile_by_name(&conn, "me").unwrap();
    let s = report::monthly_summary(&conn, &converter, &profile, 2025, 7).unwrap();
    let groceries = s.expenses.iter().find(|e| e.category == "groceries").unwrap();
    assert_eq!(groceries.actual, Decimal::from(200));
    assert_eq!(groceries.budgeted, Some(Decimal::from(250)));
    assert_eq!(groceries.difference, Some(Decimal::from(50)));
}

#[test]
fn zero_budget_items_produce_no_difference() {
    let mut conn = setup();
    run(&mut conn, &["nidhi", "budget", "create", "--name", "m"]).unwrap();
    run(
        &mut conn,
        &["nidhi", "budget", "item", "add", "--category", "dining", "--amount", "0"],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO transactions(account_id, amount, description, category, date)
         VALUES (1, '-40', 'lunch', 'dining', '2025-07-10')",
        [],
    )
    .unwrap();

    let converter = Converter::with_rate(83.0);
    let profile = profile_by_name(&conn, "me").unwrap();
    let s = report::monthly_summary(&conn, &converter, &profile, 2025, 7).unwrap();
    let dining = s.expenses.iter().find(|e| e.category == "dining").unwrap();
    assert_eq!(dining.budgeted, Some(Decimal::ZERO));
    assert_eq!(dining.difference, None);
}

#[test]
fn item_add_requires_active_budget_and_known_category() {
    let mut conn = setup();
    let err = run(
        &mut conn,
        &["nidhi", "budget", "item", "add", "--category", "dining", "--amount", "10"],
    )
    .unwrap_err();
    assert!(err.to_string().contains("No active budget"), "{err}");

    run(&mut conn, &["nidhi", "budget", "create", "--name", "m"]).unwrap();
    let err = run(
        &mut conn,
        &["nidhi", "budget", "item", "add", "--category", "nonsense", "--amount", "10"],
    )
    .unwrap_err();
    assert!(err.to_string().contains("not found"), "{err}");
}

#[test]
fn goal_summary_prefers_per_account_goals() {
    let mut conn = setup();
    run(
        &mut conn,
        &[
            "nidhi", "budget", "create", "--name", "m", "--savings", "1000", "--investments",
            "400",
        ],
    )
    .unwrap();

    let converter = Converter::with_rate(83.0);
    let profile = profile_by_name(&conn, "me").unwrap();
    let budget = report::active_budget(&conn, 1).unwrap().unwrap();

    // Without per-account goals, the budget's flat targets apply.
    let g = report::goal_summary(&conn, &converter, &profile, &budget).unwrap();
    assert_eq!(g.effective_savings_usd, Decimal::from(1000));
    assert_eq!(g.effective_investments_usd, Decimal::from(400));

    // An INR account goal overrides and is converted to USD.
    run(
        &mut conn,
        &["nidhi", "budget", "goal", "add", "--account", "nre-savings", "--amount", "41500"],
    )
    .unwrap();
    let g = report::goal_summary(&conn, &converter, &profile, &budget).unwrap();
    assert_eq!(g.total_savings_goal, Decimal::from(500));
    assert_eq!(g.effective_savings_usd, Decimal::from(500));
    assert_eq!(g.effective_investments_usd, Decimal::from(400));
}

#[test]
fn per_account_goals_flow_into_monthly_summary() {
    let mut conn = setup();
    run(&mut conn, &["nidhi", "budget", "create", "--name", "m"]).unwrap();
    run(
        &mut conn,
        &["nidhi", "budget", "goal", "add", "--account", "nre-savings", "--amount", "8300"],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO transactions(account_id, amount, description, category, date)
         VALUES (2, '4150', 'top-up', 'transfer', '2025-07-05')",
        [],
    )
    .unwrap();

    let converter = Converter::with_rate(83.0);
    let profile = profile_by_name(&conn, "me").unwrap();
    let s = report::monthly_summary(&conn, &converter, &profile, 2025, 7).unwrap();
    let c = s
        .contributions
        .iter()
        .find(|c| c.account == "nre-savings")
        .unwrap();
    assert_eq!(c.contributed, Decimal::from(50));
    assert_eq!(c.monthly_goal, Some(Decimal::from(100)));
}

#[test]
fn deleting_a_budget_cascades_to_items_and_goals() {
    let mut conn = setup();
    run(&mut conn, &["nidhi", "budget", "create", "--name", "m"]).unwrap();
    run(
        &mut conn,
        &["nidhi", "budget", "item", "add", "--category", "rent", "--amount", "900"],
    )
    .unwrap();
    run(
        &mut conn,
        &["nidhi", "budget", "goal", "add", "--account", "checking", "--amount", "100"],
    )
    .unwrap();
    run(&mut conn, &["nidhi", "budget", "rm", "m"]).unwrap();

    for table in ["budgets", "budget_items", "budget_account_goals"] {
        let n: i64 = conn
            .query_row(&format!("SELECT count(*) FROM {table}"), [], |r| r.get(0))
            .unwrap();
        assert_eq!(n, 0, "{table} not emptied");
    }
}

#[test]
fn budgets_are_scoped_to_the_owning_profile() {
    let mut conn = setup();
    run(&mut conn, &["nidhi", "budget", "create", "--name", "mine"]).unwrap();

    conn.execute("INSERT INTO profiles(name) VALUES ('other')", [])
        .unwrap();
    conn.execute(
        "INSERT INTO budgets(profile_id, name, is_active) VALUES (2, 'theirs', 1)",
        [],
    )
    .unwrap();

    let mine = report::active_budget(&conn, 1).unwrap().unwrap();
    assert_eq!(mine.name, "mine");
    let theirs = report::active_budget(&conn, 2).unwrap().unwrap();
    assert_eq!(theirs.name, "theirs");

    let err = run(&mut conn, &["nidhi", "budget", "rm", "theirs"]).unwrap_err();
    assert!(err.to_string().contains("not found"), "{err}");
}
