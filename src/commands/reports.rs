// Copyright (c) 2025 Nidhi Authors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use chrono::{Datelike, Utc};
use rusqlite::Connection;
use rust_decimal::Decimal;

use crate::currency::{Converter, Currency};
use crate::ledger;
use crate::report;
use crate::utils::{accounts_for_profile, active_profile, fmt_money, maybe_print_json, pretty_table};

pub fn handle(conn: &Connection, converter: &Converter, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("monthly", sub)) => monthly(conn, converter, sub)?,
        Some(("net-worth", sub)) => net_worth(conn, converter, sub)?,
        Some(("currency-summary", sub)) => currency_summary(conn, converter, sub)?,
        _ => {}
    }
    Ok(())
}

fn monthly(conn: &Connection, converter: &Converter, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let profile = active_profile(conn)?;
    let now = Utc::now().date_naive();
    let year = sub.get_one::<i32>("year").copied().unwrap_or(now.year());
    let month = sub.get_one::<u32>("month").copied().unwrap_or(now.month());

    let summary = report::monthly_summary(conn, converter, &profile, year, month)?;
    if maybe_print_json(json_flag, jsonl_flag, &summary)? {
        return Ok(());
    }

    println!("Report for {}-{:02} (all figures USD)", year, month);
    println!(
        "Income: {}  |  Expenses: {}  |  Net: {}",
        fmt_money(&summary.total_income, Currency::Usd),
        fmt_money(&summary.total_expenses, Currency::Usd),
        fmt_money(&summary.net, Currency::Usd)
    );

    let rows: Vec<Vec<String>> = summary
        .expenses
        .iter()
        .map(|e| {
            vec![
                e.category.clone(),
                fmt_money(&e.actual, Currency::Usd),
                e.budgeted
                    .map(|b| fmt_money(&b, Currency::Usd))
                    .unwrap_or_default(),
                e.difference
                    .map(|d| fmt_money(&d, Currency::Usd))
                    .unwrap_or_default(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Category", "Actual", "Budgeted", "Difference"], rows)
    );

    if !summary.contributions.is_empty() {
        let rows: Vec<Vec<String>> = summary
            .contributions
            .iter()
            .map(|c| {
                vec![
                    c.account.clone(),
                    c.account_type.to_string(),
                    fmt_money(&c.contributed, Currency::Usd),
                    c.monthly_goal
                        .map(|g| fmt_money(&g, Currency::Usd))
                        .unwrap_or_default(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Account", "Type", "Contributed", "Goal"], rows)
        );
        println!(
            "Savings contributions: {}  |  Investment contributions: {}",
            fmt_money(&summary.savings_contributions, Currency::Usd),
            fmt_money(&summary.investment_contributions, Currency::Usd)
        );
    }
    Ok(())
}

fn net_worth(conn: &Connection, converter: &Converter, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let profile = active_profile(conn)?;
    let nw = report::net_worth(conn, converter, &profile)?;
    if maybe_print_json(json_flag, jsonl_flag, &nw)? {
        return Ok(());
    }
    let rows = vec![
        vec!["Checking".into(), fmt_money(&nw.checking, Currency::Usd)],
        vec!["Savings".into(), fmt_money(&nw.savings, Currency::Usd)],
        vec!["Investments".into(), fmt_money(&nw.investments, Currency::Usd)],
        vec!["Credit cards".into(), fmt_money(&nw.credit_cards, Currency::Usd)],
        vec!["Loans".into(), fmt_money(&nw.loans, Currency::Usd)],
        vec!["Total assets".into(), fmt_money(&nw.total_assets, Currency::Usd)],
        vec![
            "Total liabilities".into(),
            fmt_money(&nw.total_liabilities, Currency::Usd),
        ],
        vec!["Net worth (USD)".into(), fmt_money(&nw.net_worth_usd, Currency::Usd)],
        vec!["Net worth (INR)".into(), fmt_money(&nw.net_worth_inr, Currency::Inr)],
    ];
    println!("{}", pretty_table(&["", "Amount"], rows));
    Ok(())
}

fn currency_summary(conn: &Connection, converter: &Converter, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let profile = active_profile(conn)?;
    let cs = report::currency_summary(conn, converter, &profile)?;
    if maybe_print_json(json_flag, jsonl_flag, &cs)? {
        return Ok(());
    }
    let rows = vec![
        vec![
            "USD holdings".into(),
            fmt_money(&cs.usd_total, Currency::Usd),
            fmt_money(&cs.usd_total_in_inr, Currency::Inr),
        ],
        vec![
            "INR holdings".into(),
            fmt_money(&cs.inr_total_in_usd, Currency::Usd),
            fmt_money(&cs.inr_total, Currency::Inr),
        ],
        vec![
            "Total".into(),
            fmt_money(&cs.total_in_usd, Currency::Usd),
            fmt_money(&cs.total_in_inr, Currency::Inr),
        ],
    ];
    println!("{}", pretty_table(&["", "In USD", "In INR"], rows));
    println!("Rate: 1 USD = {} INR", cs.rate);
    Ok(())
}

/// One-screen overview: accounts with balances, then the current month's
/// headline figures.
pub fn dashboard(conn: &Connection, converter: &Converter) -> Result<()> {
    let profile = active_profile(conn)?;
    let now = Utc::now().date_naive();

    let mut rows = Vec::new();
    let mut total_usd = Decimal::ZERO;
    for account in accounts_for_profile(conn, profile.id)? {
        let balance = ledger::current_balance(conn, &account)?;
        let total = ledger::total_value(conn, &account)?;
        total_usd += converter.convert(total, account.currency, Currency::Usd)?;
        rows.push(vec![
            account.name.clone(),
            account.account_type.to_string(),
            fmt_money(&balance, account.currency),
            fmt_money(&total, account.currency),
        ]);
    }
    println!("Profile: {}", profile.name);
    println!(
        "{}",
        pretty_table(&["Account", "Type", "Balance", "Total Value"], rows)
    );
    let display = profile.display_currency;
    let total = converter.convert(total_usd, Currency::Usd, display)?;
    println!("Total value: {}", fmt_money(&total, display));

    let summary = report::monthly_summary(conn, converter, &profile, now.year(), now.month())?;
    println!(
        "This month: income {}  |  expenses {}  |  net {}",
        fmt_money(&summary.total_income, Currency::Usd),
        fmt_money(&summary.total_expenses, Currency::Usd),
        fmt_money(&summary.net, Currency::Usd)
    );

    let mut stmt = conn.prepare(
        "SELECT t.date, a.name, t.description, t.amount, a.currency
         FROM transactions t JOIN accounts a ON t.account_id=a.id
         WHERE a.profile_id=?1 ORDER BY t.date DESC, t.id DESC LIMIT 5",
    )?;
    let recent = stmt
        .query_map([profile.id], |r| {
            Ok((
                r.get::<_, String>(0)?,
                r.get::<_, String>(1)?,
                r.get::<_, String>(2)?,
                r.get::<_, String>(3)?,
                r.get::<_, String>(4)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;
    if !recent.is_empty() {
        let rows = recent
            .into_iter()
            .map(|(date, account, desc, amount, ccy)| {
                let amount = crate::utils::stored_decimal(&amount)
                    .map(|d| fmt_money(&d, crate::currency::Currency::parse_or_usd(&ccy)))
                    .unwrap_or(amount);
                vec![date, account, desc, amount]
            })
            .collect();
        println!("Recent transactions:");
        println!(
            "{}",
            pretty_table(&["Date", "Account", "Description", "Amount"], rows)
        );
    }
    Ok(())
}
