// Copyright (c) 2025 Nidhi Authors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use chrono::{Datelike, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;

use crate::currency::{Converter, Currency};
use crate::error::Error;
use crate::models::Budget;
use crate::report;
use crate::utils::{
    account_by_name, active_profile, category_exists, fmt_money, maybe_print_json, parse_currency,
    parse_decimal, pretty_table, stored_decimal,
};

pub fn handle(conn: &mut Connection, converter: &Converter, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("create", sub)) => create(conn, sub)?,
        Some(("show", sub)) => show(conn, converter, sub)?,
        Some(("activate", sub)) => activate(conn, sub)?,
        Some(("list", _)) => list(conn)?,
        Some(("rm", sub)) => rm(conn, sub)?,
        Some(("item", sub)) => item(conn, sub)?,
        Some(("goal", sub)) => goal(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn budget_by_name(conn: &Connection, profile_id: i64, name: &str) -> Result<Budget> {
    let row = conn
        .query_row(
            "SELECT id, profile_id, name, expected_income, expected_savings,
                    expected_investments, currency, is_active
             FROM budgets WHERE profile_id=?1 AND name=?2",
            params![profile_id, name],
            |r| {
                Ok((
                    r.get::<_, i64>(0)?,
                    r.get::<_, i64>(1)?,
                    r.get::<_, String>(2)?,
                    r.get::<_, String>(3)?,
                    r.get::<_, String>(4)?,
                    r.get::<_, String>(5)?,
                    r.get::<_, String>(6)?,
                    r.get::<_, bool>(7)?,
                ))
            },
        )
        .optional()?;
    let Some((id, profile_id, name, income, savings, investments, ccy, is_active)) = row else {
        return Err(Error::not_found("Budget", name).into());
    };
    Ok(Budget {
        id,
        profile_id,
        name,
        expected_income: stored_decimal(&income)?,
        expected_savings: stored_decimal(&savings)?,
        expected_investments: stored_decimal(&investments)?,
        currency: Currency::parse_or_usd(&ccy),
        is_active,
    })
}

fn require_active_budget(conn: &Connection, profile_id: i64) -> Result<Budget> {
    report::active_budget(conn, profile_id)?
        .ok_or_else(|| Error::Validation("No active budget; create or activate one first".into()))
        .map_err(Into::into)
}

fn create(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let profile = active_profile(conn)?;
    let name = sub.get_one::<String>("name").unwrap();
    let income = parse_decimal(sub.get_one::<String>("income").unwrap())?;
    let savings = parse_decimal(sub.get_one::<String>("savings").unwrap())?;
    let investments = parse_decimal(sub.get_one::<String>("investments").unwrap())?;
    let ccy = parse_currency(sub.get_one::<String>("currency").unwrap())?;

    // Deactivate-then-insert in one transaction keeps "at most one active
    // budget" true at every commit point.
    let tx = conn.transaction()?;
    tx.execute(
        "UPDATE budgets SET is_active=0 WHERE profile_id=?1",
        params![profile.id],
    )?;
    tx.execute(
        "INSERT INTO budgets(profile_id, name, expected_income, expected_savings,
                             expected_investments, currency, is_active)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, 1)",
        params![
            profile.id,
            name,
            income.to_string(),
            savings.to_string(),
            investments.to_string(),
            ccy.code()
        ],
    )?;
    tx.commit()?;
    println!("Created budget '{}' (now active)", name);
    Ok(())
}

fn activate(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let profile = active_profile(conn)?;
    let budget = budget_by_name(conn, profile.id, sub.get_one::<String>("name").unwrap())?;
    let tx = conn.transaction()?;
    tx.execute(
        "UPDATE budgets SET is_active=0 WHERE profile_id=?1",
        params![profile.id],
    )?;
    tx.execute(
        "UPDATE budgets SET is_active=1 WHERE id=?1",
        params![budget.id],
    )?;
    tx.commit()?;
    println!("Budget '{}' is now active", budget.name);
    Ok(())
}

fn list(conn: &Connection) -> Result<()> {
    let profile = active_profile(conn)?;
    let mut stmt = conn.prepare(
        "SELECT name, expected_income, expected_savings, expected_investments, currency, is_active
         FROM budgets WHERE profile_id=?1 ORDER BY name",
    )?;
    let rows = stmt.query_map(params![profile.id], |r| {
        Ok((
            r.get::<_, String>(0)?,
            r.get::<_, String>(1)?,
            r.get::<_, String>(2)?,
            r.get::<_, String>(3)?,
            r.get::<_, String>(4)?,
            r.get::<_, bool>(5)?,
        ))
    })?;
    let mut data = Vec::new();
    for row in rows {
        let (name, income, savings, investments, ccy, is_active) = row?;
        let marker = if is_active { "*" } else { "" };
        data.push(vec![marker.to_string(), name, income, savings, investments, ccy]);
    }
    println!(
        "{}",
        pretty_table(
            &["", "Budget", "Income", "Savings", "Investments", "CCY"],
            data
        )
    );
    Ok(())
}

fn rm(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let profile = active_profile(conn)?;
    let budget = budget_by_name(conn, profile.id, sub.get_one::<String>("name").unwrap())?;
    // Cascades to budget_items and budget_account_goals.
    conn.execute("DELETE FROM budgets WHERE id=?1", params![budget.id])?;
    println!("Removed budget '{}'", budget.name);
    Ok(())
}

fn item(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    let profile = active_profile(conn)?;
    let budget = require_active_budget(conn, profile.id)?;
    match m.subcommand() {
        Some(("add", sub)) => {
            let category = sub.get_one::<String>("category").unwrap().trim().to_string();
            if !category_exists(conn, profile.id, &category)? {
                return Err(Error::not_found("Category", category).into());
            }
            let amount = parse_decimal(sub.get_one::<String>("amount").unwrap())?;
            conn.execute(
                "INSERT INTO budget_items(budget_id, category, amount) VALUES (?1, ?2, ?3)
                 ON CONFLICT(budget_id, category) DO UPDATE SET amount=excluded.amount",
                params![budget.id, category, amount.to_string()],
            )?;
            println!(
                "Set '{}' target to {} on budget '{}'",
                category,
                fmt_money(&amount, budget.currency),
                budget.name
            );
        }
        Some(("rm", sub)) => {
            let category = sub.get_one::<String>("category").unwrap().trim().to_string();
            let n = conn.execute(
                "DELETE FROM budget_items WHERE budget_id=?1 AND category=?2",
                params![budget.id, category],
            )?;
            if n == 0 {
                return Err(Error::not_found("Budget item", category).into());
            }
            println!("Removed '{}' target from budget '{}'", category, budget.name);
        }
        _ => {}
    }
    Ok(())
}

fn goal(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    let profile = active_profile(conn)?;
    let budget = require_active_budget(conn, profile.id)?;
    match m.subcommand() {
        Some(("add", sub)) => {
            let account =
                account_by_name(conn, profile.id, sub.get_one::<String>("account").unwrap())?;
            let amount = parse_decimal(sub.get_one::<String>("amount").unwrap())?;
            conn.execute(
                "INSERT INTO budget_account_goals(budget_id, account_id, monthly_goal)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT(budget_id, account_id) DO UPDATE SET monthly_goal=excluded.monthly_goal",
                params![budget.id, account.id, amount.to_string()],
            )?;
            println!(
                "Set monthly goal for '{}' to {} on budget '{}'",
                account.name,
                fmt_money(&amount, account.currency),
                budget.name
            );
        }
        Some(("rm", sub)) => {
            let account =
                account_by_name(conn, profile.id, sub.get_one::<String>("account").unwrap())?;
            let n = conn.execute(
                "DELETE FROM budget_account_goals WHERE budget_id=?1 AND account_id=?2",
                params![budget.id, account.id],
            )?;
            if n == 0 {
                return Err(Error::not_found("Budget goal", account.name).into());
            }
            println!("Removed goal for '{}' from budget '{}'", account.name, budget.name);
        }
        _ => {}
    }
    Ok(())
}

#[derive(Serialize)]
struct BudgetShow<'a> {
    budget: &'a Budget,
    goals: report::GoalSummary,
    month: report::MonthlySummary,
}

fn show(conn: &Connection, converter: &Converter, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let profile = active_profile(conn)?;
    let budget = require_active_budget(conn, profile.id)?;
    let goals = report::goal_summary(conn, converter, &profile, &budget)?;
    let now = Utc::now().date_naive();
    let month = report::monthly_summary(conn, converter, &profile, now.year(), now.month())?;

    let out = BudgetShow {
        budget: &budget,
        goals,
        month,
    };
    if maybe_print_json(json_flag, jsonl_flag, &out)? {
        return Ok(());
    }

    println!(
        "Budget '{}' ({}) for {}-{:02}",
        budget.name,
        budget.currency,
        out.month.year,
        out.month.month
    );
    println!(
        "Expected income: {}  |  Actual income: {}",
        fmt_money(&budget.expected_income, budget.currency),
        fmt_money(&out.month.total_income, Currency::Usd)
    );

    let mut rows = Vec::new();
    for e in &out.month.expenses {
        rows.push(vec![
            e.category.clone(),
            fmt_money(&e.actual, Currency::Usd),
            e.budgeted
                .map(|b| fmt_money(&b, Currency::Usd))
                .unwrap_or_default(),
            e.difference
                .map(|d| fmt_money(&d, Currency::Usd))
                .unwrap_or_default(),
        ]);
    }
    println!(
        "{}",
        pretty_table(&["Category", "Actual", "Budgeted", "Difference"], rows)
    );

    println!(
        "Savings: {} of {}  |  Investments: {} of {}",
        fmt_money(&out.month.savings_contributions, Currency::Usd),
        fmt_money(&out.goals.effective_savings_usd, Currency::Usd),
        fmt_money(&out.month.investment_contributions, Currency::Usd),
        fmt_money(&out.goals.effective_investments_usd, Currency::Usd)
    );
    Ok(())
}
