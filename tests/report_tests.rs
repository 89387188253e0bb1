// Copyright (c) 2025 Nidhi Authors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::{Connection, params};
use rust_decimal::Decimal;

use nidhi::currency::Converter;
use nidhi::models::Profile;
use nidhi::report;
use nidhi::utils::profile_by_name;

fn setup() -> (Connection, Profile) {
    let mut conn = Connection::open_in_memory().unwrap();
    nidhi::db::init_schema(&mut conn).unwrap();
    conn.execute("INSERT INTO profiles(name) VALUES ('me')", [])
        .unwrap();
    conn.execute(
        "INSERT INTO accounts(profile_id, name, type, currency) VALUES
         (1, 'checking', 'checking', 'USD'),
         (1, 'nre-savings', 'savings', 'INR'),
         (1, 'brokerage', 'investment', 'USD')",
        [],
    )
    .unwrap();
    let profile = profile_by_name(&conn, "me").unwrap();
    (conn, profile)
}

fn add_tx(
    conn: &Connection,
    account_id: i64,
    amount: &str,
    my_share: Option<&str>,
    category: &str,
    date: &str,
) {
    conn.execute(
        "INSERT INTO transactions(account_id, amount, my_share, description, category, date)
         VALUES (?1, ?2, ?3, 'x', ?4, ?5)",
        params![account_id, amount, my_share, category, date],
    )
    .unwrap();
}

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

#[test]
fn monthly_summary_partitions_by_month() {
    let (conn, profile) = setup();
    let converter = Converter::with_rate(83.0);
    add_tx(&conn, 1, "3000", None, "salary", "2025-07-01");
    add_tx(&conn, 1, "-200", None, "groceries", "2025-07-10");
    add_tx(&conn, 1, "-999", None, "groceries", "2025-08-01");

    let july = report::monthly_summary(&conn, &converter, &profile, 2025, 7).unwrap();
    assert_eq!(july.total_income, dec("3000"));
    assert_eq!(july.total_expenses, dec("200"));
    assert_eq!(july.net, dec("2800"));

    let august = report::monthly_summary(&conn, &converter, &profile, 2025, 8).unwrap();
    assert_eq!(august.total_income, Decimal::ZERO);
    assert_eq!(august.total_expenses, dec("999"));
}

#[test]
fn empty_month_yields_zeros() {
    let (conn, profile) = setup();
    let converter = Converter::with_rate(83.0);
    let s = report::monthly_summary(&conn, &converter, &profile, 2025, 1).unwrap();
    assert_eq!(s.total_income, Decimal::ZERO);
    assert_eq!(s.total_expenses, Decimal::ZERO);
    assert_eq!(s.net, Decimal::ZERO);
    assert!(s.expenses.is_empty());
    assert_eq!(s.savings_contributions, Decimal::ZERO);
    assert_eq!(s.investment_contributions, Decimal::ZERO);
}

#[test]
fn shared_expenses_count_only_the_personal_share() {
    let (conn, profile) = setup();
    let converter = Converter::with_rate(83.0);
    // 100 split, my share 40; a zero share means the full amount.
    add_tx(&conn, 1, "-100", Some("-40"), "dining", "2025-07-05");
    add_tx(&conn, 1, "-60", Some("0"), "dining", "2025-07-06");

    let s = report::monthly_summary(&conn, &converter, &profile, 2025, 7).unwrap();
    assert_eq!(s.total_expenses, dec("100"));
    assert_eq!(s.expenses[0].category, "dining");
    assert_eq!(s.expenses[0].actual, dec("100"));
}

#[test]
fn inr_amounts_are_converted_to_usd() {
    let (conn, profile) = setup();
    let converter = Converter::with_rate(83.0);
    add_tx(&conn, 2, "-8300", None, "rent", "2025-07-01");
    let s = report::monthly_summary(&conn, &converter, &profile, 2025, 7).unwrap();
    assert_eq!(s.total_expenses, dec("100"));
}

#[test]
fn expense_categories_sort_by_actual_descending() {
    let (conn, profile) = setup();
    let converter = Converter::with_rate(83.0);
    add_tx(&conn, 1, "-10", None, "dining", "2025-07-01");
    add_tx(&conn, 1, "-500", None, "rent", "2025-07-01");
    add_tx(&conn, 1, "-30", None, "groceries", "2025-07-02");

    let s = report::monthly_summary(&conn, &converter, &profile, 2025, 7).unwrap();
    let order: Vec<&str> = s.expenses.iter().map(|e| e.category.as_str()).collect();
    assert_eq!(order, vec!["rent", "groceries", "dining"]);
}

#[test]
fn transfers_are_excluded_from_income_and_expenses() {
    let (conn, profile) = setup();
    let converter = Converter::with_rate(83.0);
    add_tx(&conn, 1, "-500", None, "transfer", "2025-07-15");
    add_tx(&conn, 2, "41500", None, "transfer", "2025-07-15");

    let s = report::monthly_summary(&conn, &converter, &profile, 2025, 7).unwrap();
    assert_eq!(s.total_income, Decimal::ZERO);
    assert_eq!(s.total_expenses, Decimal::ZERO);
    // But they do count as contributions into the INR savings account.
    assert_eq!(s.savings_contributions, dec("500"));
}

#[test]
fn contributions_use_full_amounts_and_split_by_type() {
    let (conn, profile) = setup();
    let converter = Converter::with_rate(83.0);
    add_tx(&conn, 2, "8300", None, "transfer", "2025-07-01");
    add_tx(&conn, 3, "250", Some("100"), "transfer", "2025-07-02");
    // Outbound transfer from savings does not contribute.
    add_tx(&conn, 2, "-830", None, "transfer", "2025-07-03");

    let s = report::monthly_summary(&conn, &converter, &profile, 2025, 7).unwrap();
    assert_eq!(s.savings_contributions, dec("100"));
    // my_share is ignored for transfers; the whole 250 counts.
    assert_eq!(s.investment_contributions, dec("250"));
}

#[test]
fn net_worth_nets_liabilities() {
    let (conn, profile) = setup();
    let converter = Converter::with_rate(83.0);
    conn.execute(
        "INSERT INTO accounts(profile_id, name, type, currency, initial_balance)
         VALUES (1, 'visa', 'credit_card', 'USD', '-200')",
        [],
    )
    .unwrap();
    conn.execute(
        "UPDATE accounts SET initial_balance='1000' WHERE name='checking'",
        [],
    )
    .unwrap();
    conn.execute(
        "UPDATE accounts SET initial_balance='8300' WHERE name='nre-savings'",
        [],
    )
    .unwrap();

    let nw = report::net_worth(&conn, &converter, &profile).unwrap();
    assert_eq!(nw.checking, dec("1000"));
    assert_eq!(nw.savings, dec("100"));
    assert_eq!(nw.credit_cards, dec("-200"));
    assert_eq!(nw.total_assets, dec("1100"));
    assert_eq!(nw.total_liabilities, dec("200"));
    assert_eq!(nw.net_worth_usd, dec("900"));
    assert_eq!(nw.net_worth_inr, dec("74700"));
}

#[test]
fn currency_summary_groups_by_native_currency() {
    let (conn, profile) = setup();
    let converter = Converter::with_rate(83.0);
    conn.execute(
        "UPDATE accounts SET initial_balance='100' WHERE name='checking'",
        [],
    )
    .unwrap();
    conn.execute(
        "UPDATE accounts SET initial_balance='16600' WHERE name='nre-savings'",
        [],
    )
    .unwrap();

    let cs = report::currency_summary(&conn, &converter, &profile).unwrap();
    assert_eq!(cs.usd_total, dec("100"));
    assert_eq!(cs.inr_total, dec("16600"));
    assert_eq!(cs.usd_total_in_inr, dec("8300"));
    assert_eq!(cs.inr_total_in_usd, dec("200"));
    assert_eq!(cs.total_in_usd, dec("300"));
    assert_eq!(cs.total_in_inr, dec("24900"));
    assert_eq!(cs.rate, 83.0);
}
