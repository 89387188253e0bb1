// Copyright (c) 2025 Nidhi Authors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::currency::Currency;
use crate::error::Error;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: i64,
    pub name: String,
    pub display_currency: Currency,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    Checking,
    Savings,
    CreditCard,
    Loan,
    Investment,
}

impl AccountType {
    pub const ALL: [AccountType; 5] = [
        AccountType::Checking,
        AccountType::Savings,
        AccountType::CreditCard,
        AccountType::Loan,
        AccountType::Investment,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AccountType::Checking => "checking",
            AccountType::Savings => "savings",
            AccountType::CreditCard => "credit_card",
            AccountType::Loan => "loan",
            AccountType::Investment => "investment",
        }
    }

    pub fn parse(s: &str) -> Option<AccountType> {
        Self::ALL.into_iter().find(|t| t.as_str() == s.trim())
    }
}

impl std::fmt::Display for AccountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub profile_id: i64,
    pub name: String,
    pub account_type: AccountType,
    pub currency: Currency,
    pub initial_balance: Decimal,
    pub display_order: i64,
}

/// Categories shipped with every install (profile_id NULL in the table).
/// `Transfer` doubles as the marker for inter-account movements and is
/// excluded from income/expense aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemCategory {
    Income,
    Salary,
    Groceries,
    Utilities,
    Rent,
    Mortgage,
    Transportation,
    Entertainment,
    Dining,
    Shopping,
    Healthcare,
    Insurance,
    Education,
    Travel,
    Transfer,
    Other,
}

impl SystemCategory {
    pub const ALL: [SystemCategory; 16] = [
        SystemCategory::Income,
        SystemCategory::Salary,
        SystemCategory::Groceries,
        SystemCategory::Utilities,
        SystemCategory::Rent,
        SystemCategory::Mortgage,
        SystemCategory::Transportation,
        SystemCategory::Entertainment,
        SystemCategory::Dining,
        SystemCategory::Shopping,
        SystemCategory::Healthcare,
        SystemCategory::Insurance,
        SystemCategory::Education,
        SystemCategory::Travel,
        SystemCategory::Transfer,
        SystemCategory::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SystemCategory::Income => "income",
            SystemCategory::Salary => "salary",
            SystemCategory::Groceries => "groceries",
            SystemCategory::Utilities => "utilities",
            SystemCategory::Rent => "rent",
            SystemCategory::Mortgage => "mortgage",
            SystemCategory::Transportation => "transportation",
            SystemCategory::Entertainment => "entertainment",
            SystemCategory::Dining => "dining",
            SystemCategory::Shopping => "shopping",
            SystemCategory::Healthcare => "healthcare",
            SystemCategory::Insurance => "insurance",
            SystemCategory::Education => "education",
            SystemCategory::Travel => "travel",
            SystemCategory::Transfer => "transfer",
            SystemCategory::Other => "other",
        }
    }

    pub fn is_system(name: &str) -> bool {
        Self::ALL.iter().any(|c| c.as_str() == name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub profile_id: Option<i64>,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub account_id: i64,
    /// Full signed amount: negative = money out, positive = money in.
    pub amount: Decimal,
    /// The user's share of a split transaction, same sign as `amount`.
    /// NULL (and, defensively, zero) means the full amount is personal.
    pub my_share: Option<Decimal>,
    pub description: String,
    pub category: String,
    pub date: NaiveDate,
}

impl Transaction {
    /// The portion attributable to the user. Aggregation works on this,
    /// never on the raw amount, except for transfer/contribution tracking.
    pub fn personal_amount(&self) -> Decimal {
        match self.my_share {
            Some(share) if !share.is_zero() => share,
            _ => self.amount,
        }
    }

    pub fn is_transfer(&self) -> bool {
        self.category == SystemCategory::Transfer.as_str()
    }
}

pub const FD_MIN_PRINCIPAL: i64 = 1000;
pub const FD_MIN_RATE: f64 = 0.1;
pub const FD_MAX_RATE: f64 = 15.0;
pub const FD_MIN_TENURE_DAYS: i64 = 7;

/// A time-bound INR deposit with quarterly-compounded interest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixedDeposit {
    pub id: i64,
    pub account_id: i64,
    pub principal: Decimal,
    /// Annual rate as a percentage, e.g. 7.5.
    pub interest_rate: f64,
    pub start_date: NaiveDate,
    pub maturity_date: NaiveDate,
    pub bank_name: Option<String>,
    pub fd_number: Option<String>,
    /// Set only by explicit user action, never by date math.
    pub is_matured: bool,
}

impl FixedDeposit {
    /// Maturity value A = P * (1 + r/4)^(4t) with t in 365-day years.
    /// The fixed 365-day year matches the books this replaces; do not
    /// switch to an actual/365 convention without migrating expectations.
    pub fn maturity_value(&self) -> Decimal {
        let days = (self.maturity_date - self.start_date).num_days();
        let years = days as f64 / 365.0;
        let rate = self.interest_rate / 100.0;
        let principal = self.principal.to_f64().unwrap_or(0.0);
        let value = principal * (1.0 + rate / 4.0).powf(4.0 * years);
        Decimal::try_from(value).unwrap_or(self.principal)
    }

    pub fn interest_earned(&self) -> Decimal {
        self.maturity_value() - self.principal
    }

    /// Days remaining until maturity, never negative. A deposit marked
    /// matured reports zero regardless of dates.
    pub fn days_to_maturity(&self, today: NaiveDate) -> i64 {
        if self.is_matured {
            return 0;
        }
        (self.maturity_date - today).num_days().max(0)
    }

    /// Date-based check, independent of the manual `is_matured` flag.
    pub fn is_past_maturity(&self, today: NaiveDate) -> bool {
        today > self.maturity_date
    }

    /// Description for the optional funding debit, e.g.
    /// "Fixed Deposit (HDFC) - FD1234".
    pub fn funding_description(&self) -> String {
        let mut s = String::from("Fixed Deposit");
        if let Some(bank) = &self.bank_name {
            s.push_str(&format!(" ({bank})"));
        }
        if let Some(num) = &self.fd_number {
            s.push_str(&format!(" - {num}"));
        }
        s
    }

    pub fn validate_terms(
        principal: Decimal,
        interest_rate: f64,
        start_date: NaiveDate,
        maturity_date: NaiveDate,
    ) -> Result<(), Error> {
        if principal < Decimal::from(FD_MIN_PRINCIPAL) {
            return Err(Error::Validation(format!(
                "Minimum FD principal is {FD_MIN_PRINCIPAL}"
            )));
        }
        if !(FD_MIN_RATE..=FD_MAX_RATE).contains(&interest_rate) {
            return Err(Error::Validation(format!(
                "Interest rate must be between {FD_MIN_RATE}% and {FD_MAX_RATE}%"
            )));
        }
        if maturity_date <= start_date {
            return Err(Error::Validation(
                "Maturity date must be after start date".into(),
            ));
        }
        if (maturity_date - start_date).num_days() < FD_MIN_TENURE_DAYS {
            return Err(Error::Validation(format!(
                "Minimum FD tenure is {FD_MIN_TENURE_DAYS} days"
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Budget {
    pub id: i64,
    pub profile_id: i64,
    pub name: String,
    pub expected_income: Decimal,
    pub expected_savings: Decimal,
    pub expected_investments: Decimal,
    pub currency: Currency,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetItem {
    pub id: i64,
    pub budget_id: i64,
    pub category: String,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetAccountGoal {
    pub id: i64,
    pub budget_id: i64,
    pub account_id: i64,
    pub monthly_goal: Decimal,
}
