// Copyright (c) 2025 Nidhi Authors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Month-by-month aggregation over a profile's transactions. Everything is
//! reduced to USD (the common denominator for display) via the converter;
//! INR-account amounts are converted, unknown currencies pass through.

use anyhow::Result;
use rusqlite::{Connection, OptionalExtension, params};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::currency::{Converter, Currency};
use crate::models::{Account, AccountType, Budget, Profile, Transaction};
use crate::utils::{accounts_for_profile, month_key, stored_decimal};

#[derive(Debug, Serialize)]
pub struct CategorySpend {
    pub category: String,
    /// Absolute personal spend in USD.
    pub actual: Decimal,
    pub budgeted: Option<Decimal>,
    /// budgeted - actual; None when no positive budget item exists.
    pub difference: Option<Decimal>,
}

#[derive(Debug, Serialize)]
pub struct AccountContribution {
    pub account_id: i64,
    pub account: String,
    pub account_type: AccountType,
    /// Inbound transfers this month, in USD.
    pub contributed: Decimal,
    pub monthly_goal: Option<Decimal>,
}

#[derive(Debug, Serialize)]
pub struct MonthlySummary {
    pub year: i32,
    pub month: u32,
    pub total_income: Decimal,
    pub total_expenses: Decimal,
    pub net: Decimal,
    pub expenses: Vec<CategorySpend>,
    pub savings_contributions: Decimal,
    pub investment_contributions: Decimal,
    pub contributions: Vec<AccountContribution>,
}

fn month_transactions(
    conn: &Connection,
    profile_id: i64,
    month: &str,
) -> Result<Vec<Transaction>> {
    let mut stmt = conn.prepare_cached(
        "SELECT t.id, t.account_id, t.amount, t.my_share, t.description, t.category, t.date
         FROM transactions t JOIN accounts a ON t.account_id=a.id
         WHERE a.profile_id=?1 AND substr(t.date,1,7)=?2
         ORDER BY t.date, t.id",
    )?;
    let mut rows = stmt.query(params![profile_id, month])?;
    let mut out = Vec::new();
    while let Some(r) = rows.next()? {
        let amount: String = r.get(2)?;
        let my_share: Option<String> = r.get(3)?;
        let date: String = r.get(6)?;
        out.push(Transaction {
            id: r.get(0)?,
            account_id: r.get(1)?,
            amount: stored_decimal(&amount)?,
            my_share: my_share.as_deref().map(stored_decimal).transpose()?,
            description: r.get(4)?,
            category: r.get(5)?,
            date: crate::utils::parse_date(&date)?,
        });
    }
    Ok(out)
}

/// The profile's single active budget, if any. Activation is an atomic
/// swap at write time, so at most one row can match.
pub fn active_budget(conn: &Connection, profile_id: i64) -> Result<Option<Budget>> {
    let row = conn
        .query_row(
            "SELECT id, profile_id, name, expected_income, expected_savings,
                    expected_investments, currency, is_active
             FROM budgets WHERE profile_id=?1 AND is_active=1",
            params![profile_id],
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
        return Ok(None);
    };
    Ok(Some(Budget {
        id,
        profile_id,
        name,
        expected_income: stored_decimal(&income)?,
        expected_savings: stored_decimal(&savings)?,
        expected_investments: stored_decimal(&investments)?,
        currency: Currency::parse_or_usd(&ccy),
        is_active,
    }))
}

fn budget_items_map(conn: &Connection, budget_id: i64) -> Result<Vec<(String, Decimal)>> {
    let mut stmt =
        conn.prepare_cached("SELECT category, amount FROM budget_items WHERE budget_id=?1")?;
    let mut rows = stmt.query(params![budget_id])?;
    let mut out = Vec::new();
    while let Some(r) = rows.next()? {
        let cat: String = r.get(0)?;
        let amt: String = r.get(1)?;
        out.push((cat, stored_decimal(&amt)?));
    }
    Ok(out)
}

fn goal_for_account(
    conn: &Connection,
    budget_id: i64,
    account_id: i64,
) -> Result<Option<Decimal>> {
    let s: Option<String> = conn
        .query_row(
            "SELECT monthly_goal FROM budget_account_goals WHERE budget_id=?1 AND account_id=?2",
            params![budget_id, account_id],
            |r| r.get(0),
        )
        .optional()?;
    s.as_deref().map(stored_decimal).transpose()
}

/// Income, expense-by-category, and goal-contribution aggregates for one
/// calendar month. A month with no transactions yields all-zero figures.
pub fn monthly_summary(
    conn: &Connection,
    converter: &Converter,
    profile: &Profile,
    year: i32,
    month: u32,
) -> Result<MonthlySummary> {
    let accounts = accounts_for_profile(conn, profile.id)?;
    let key = month_key(year, month);
    let transactions = month_transactions(conn, profile.id, &key)?;

    let currency_of = |account_id: i64| -> Currency {
        accounts
            .iter()
            .find(|a| a.id == account_id)
            .map(|a| a.currency)
            .unwrap_or(Currency::Usd)
    };

    let mut total_income = Decimal::ZERO;
    // Insertion-ordered so a later stable sort keeps ties deterministic.
    let mut by_category: Vec<(String, Decimal)> = Vec::new();

    for t in &transactions {
        if t.is_transfer() {
            continue;
        }
        let personal = converter.convert(t.personal_amount(), currency_of(t.account_id), Currency::Usd)?;
        if personal > Decimal::ZERO {
            total_income += personal;
        } else if personal < Decimal::ZERO {
            match by_category.iter_mut().find(|(c, _)| *c == t.category) {
                Some((_, sum)) => *sum += personal.abs(),
                None => by_category.push((t.category.clone(), personal.abs())),
            }
        }
    }
    let total_expenses: Decimal = by_category.iter().map(|(_, v)| *v).sum();

    let budget = active_budget(conn, profile.id)?;
    let items = match &budget {
        Some(b) => budget_items_map(conn, b.id)?,
        None => Vec::new(),
    };

    let mut expenses: Vec<CategorySpend> = by_category
        .into_iter()
        .map(|(category, actual)| {
            let budgeted = items
                .iter()
                .find(|(c, _)| *c == category)
                .map(|(_, amt)| *amt);
            let difference = budgeted
                .filter(|b| *b > Decimal::ZERO)
                .map(|b| b - actual);
            CategorySpend {
                category,
                actual,
                budgeted,
                difference,
            }
        })
        .collect();
    expenses.sort_by(|a, b| b.actual.cmp(&a.actual));

    let mut savings_contributions = Decimal::ZERO;
    let mut investment_contributions = Decimal::ZERO;
    let mut contributions = Vec::new();
    for account in &accounts {
        if !matches!(
            account.account_type,
            AccountType::Savings | AccountType::Investment
        ) {
            continue;
        }
        let contributed =
            account_contribution(converter, &transactions, account)?;
        match account.account_type {
            AccountType::Savings => savings_contributions += contributed,
            AccountType::Investment => investment_contributions += contributed,
            _ => {}
        }
        let monthly_goal = match &budget {
            Some(b) => match goal_for_account(conn, b.id, account.id)? {
                Some(goal) => {
                    Some(converter.convert(goal, account.currency, Currency::Usd)?)
                }
                None => None,
            },
            None => None,
        };
        contributions.push(AccountContribution {
            account_id: account.id,
            account: account.name.clone(),
            account_type: account.account_type,
            contributed,
            monthly_goal,
        });
    }

    Ok(MonthlySummary {
        year,
        month,
        total_income,
        total_expenses,
        net: total_income - total_expenses,
        expenses,
        savings_contributions,
        investment_contributions,
        contributions,
    })
}

/// Inbound transfers into one goal account this month, in USD. These use
/// the full transaction amount: a transfer is whole-sum by definition.
fn account_contribution(
    converter: &Converter,
    month_transactions: &[Transaction],
    account: &Account,
) -> Result<Decimal> {
    let mut total = Decimal::ZERO;
    for t in month_transactions {
        if t.account_id == account.id && t.is_transfer() && t.amount > Decimal::ZERO {
            total += converter.convert(t.amount, account.currency, Currency::Usd)?;
        }
    }
    Ok(total)
}

#[derive(Debug, Serialize)]
pub struct GoalSummary {
    pub total_savings_goal: Decimal,
    pub total_investment_goal: Decimal,
    /// Per-account goals when set, else the budget's flat targets,
    /// everything in USD.
    pub effective_savings_usd: Decimal,
    pub effective_investments_usd: Decimal,
}

pub fn goal_summary(
    conn: &Connection,
    converter: &Converter,
    profile: &Profile,
    budget: &Budget,
) -> Result<GoalSummary> {
    let accounts = accounts_for_profile(conn, profile.id)?;
    let mut total_savings_goal = Decimal::ZERO;
    let mut total_investment_goal = Decimal::ZERO;
    for account in &accounts {
        if let Some(goal) = goal_for_account(conn, budget.id, account.id)? {
            let goal_usd = converter.convert(goal, account.currency, Currency::Usd)?;
            match account.account_type {
                AccountType::Savings => total_savings_goal += goal_usd,
                AccountType::Investment => total_investment_goal += goal_usd,
                _ => {}
            }
        }
    }
    let effective_savings_usd = if total_savings_goal > Decimal::ZERO {
        total_savings_goal
    } else {
        converter.convert(budget.expected_savings, budget.currency, Currency::Usd)?
    };
    let effective_investments_usd = if total_investment_goal > Decimal::ZERO {
        total_investment_goal
    } else {
        converter.convert(budget.expected_investments, budget.currency, Currency::Usd)?
    };
    Ok(GoalSummary {
        total_savings_goal,
        total_investment_goal,
        effective_savings_usd,
        effective_investments_usd,
    })
}

#[derive(Debug, Serialize)]
pub struct NetWorth {
    pub checking: Decimal,
    pub savings: Decimal,
    pub credit_cards: Decimal,
    pub loans: Decimal,
    pub investments: Decimal,
    pub total_assets: Decimal,
    pub total_liabilities: Decimal,
    pub net_worth_usd: Decimal,
    pub net_worth_inr: Decimal,
}

/// Per-type USD totals of account total value (balance + outstanding FDs).
/// Credit cards and loans normally carry negative balances, so the net
/// worth is a plain sum while liabilities report absolute values.
pub fn net_worth(conn: &Connection, converter: &Converter, profile: &Profile) -> Result<NetWorth> {
    let accounts = accounts_for_profile(conn, profile.id)?;
    let mut totals = [Decimal::ZERO; 5];
    for account in &accounts {
        let value = crate::ledger::total_value(conn, account)?;
        let usd = converter.convert(value, account.currency, Currency::Usd)?;
        let idx = match account.account_type {
            AccountType::Checking => 0,
            AccountType::Savings => 1,
            AccountType::CreditCard => 2,
            AccountType::Loan => 3,
            AccountType::Investment => 4,
        };
        totals[idx] += usd;
    }
    let [checking, savings, credit_cards, loans, investments] = totals;
    let net_worth_usd = checking + savings + credit_cards + loans + investments;
    Ok(NetWorth {
        checking,
        savings,
        credit_cards,
        loans,
        investments,
        total_assets: checking + savings + investments,
        total_liabilities: credit_cards.abs() + loans.abs(),
        net_worth_usd,
        net_worth_inr: converter.convert(net_worth_usd, Currency::Usd, Currency::Inr)?,
    })
}

#[derive(Debug, Serialize)]
pub struct CurrencySummary {
    pub usd_total: Decimal,
    pub inr_total: Decimal,
    pub usd_total_in_inr: Decimal,
    pub inr_total_in_usd: Decimal,
    pub total_in_usd: Decimal,
    pub total_in_inr: Decimal,
    pub rate: f64,
}

/// Holdings grouped by native currency, with cross-currency totals.
pub fn currency_summary(
    conn: &Connection,
    converter: &Converter,
    profile: &Profile,
) -> Result<CurrencySummary> {
    let accounts = accounts_for_profile(conn, profile.id)?;
    let mut usd_total = Decimal::ZERO;
    let mut inr_total = Decimal::ZERO;
    for account in &accounts {
        let value = crate::ledger::total_value(conn, account)?;
        match account.currency {
            Currency::Usd => usd_total += value,
            Currency::Inr => inr_total += value,
        }
    }
    let usd_total_in_inr = converter.convert(usd_total, Currency::Usd, Currency::Inr)?;
    let inr_total_in_usd = converter.convert(inr_total, Currency::Inr, Currency::Usd)?;
    Ok(CurrencySummary {
        usd_total,
        inr_total,
        usd_total_in_inr,
        inr_total_in_usd,
        total_in_usd: usd_total + inr_total_in_usd,
        total_in_inr: usd_total_in_inr + inr_total,
        rate: converter.rate(),
    })
}
