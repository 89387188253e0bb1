// Copyright (c) 2025 Nidhi Authors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow};
use rust_decimal::Decimal;
use serde::Deserialize;

/// Fallback rate when no fetch has ever succeeded: 1 USD = 83 INR.
pub const DEFAULT_USD_INR_RATE: f64 = 83.0;

/// A fetched rate is reused for an hour before refreshing.
pub const RATE_TTL: Duration = Duration::from_secs(60 * 60);

const RATE_URL: &str = "https://api.exchangerate-api.com/v4/latest/USD";

/// The two currencies this ledger knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Usd,
    Inr,
}

impl Currency {
    pub fn code(self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Inr => "INR",
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Currency::Usd => "$",
            Currency::Inr => "₹",
        }
    }

    pub fn parse(s: &str) -> Option<Currency> {
        match s.trim().to_uppercase().as_str() {
            "USD" => Some(Currency::Usd),
            "INR" => Some(Currency::Inr),
            _ => None,
        }
    }

    /// Lenient parse for stored data: anything unrecognized is treated as
    /// USD so aggregation degrades to a no-op conversion.
    pub fn parse_or_usd(s: &str) -> Currency {
        Currency::parse(s).unwrap_or(Currency::Usd)
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Where USD->INR rates come from. Injectable so tests never hit the network.
pub trait RateSource: Send {
    fn fetch_usd_inr(&self) -> Result<f64>;
}

#[derive(Debug, Deserialize)]
struct RatePayload {
    rates: HashMap<String, f64>,
}

/// Live source backed by exchangerate-api.com (USD base, no API key).
pub struct ExchangeRateApi {
    client: reqwest::blocking::Client,
}

impl ExchangeRateApi {
    pub fn new() -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(5))
            .user_agent(concat!(
                "nidhi/",
                env!("CARGO_PKG_VERSION"),
                " (+https://github.com/nidhi-fin/nidhi)"
            ))
            .build()?;
        Ok(Self { client })
    }
}

impl RateSource for ExchangeRateApi {
    fn fetch_usd_inr(&self) -> Result<f64> {
        let payload: RatePayload = self
            .client
            .get(RATE_URL)
            .send()?
            .error_for_status()?
            .json()
            .context("Malformed exchange rate payload")?;
        payload
            .rates
            .get("INR")
            .copied()
            .ok_or_else(|| anyhow!("Exchange rate payload has no INR entry"))
    }
}

/// Source with a fixed rate, for tests and offline use.
pub struct FixedRate(pub f64);

impl RateSource for FixedRate {
    fn fetch_usd_inr(&self) -> Result<f64> {
        Ok(self.0)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CachedRate {
    pub rate: f64,
    pub fetched_at: Instant,
}

/// USD<->INR converter with an hour-long in-process rate cache.
///
/// Best-effort and stale-tolerant: a failed fetch keeps the previous rate,
/// and before any fetch has succeeded the hardcoded default applies. The
/// figures downstream are display approximations, not settlement values.
pub struct Converter {
    source: Box<dyn RateSource>,
    cache: Mutex<Option<CachedRate>>,
}

impl Converter {
    pub fn new(source: Box<dyn RateSource>) -> Self {
        Self {
            source,
            cache: Mutex::new(None),
        }
    }

    pub fn live() -> Result<Self> {
        Ok(Self::new(Box::new(ExchangeRateApi::new()?)))
    }

    /// Converter that always uses `rate`, with the cache pre-warmed so no
    /// fetch happens.
    pub fn with_rate(rate: f64) -> Self {
        let c = Self::new(Box::new(FixedRate(rate)));
        c.prime(rate, Instant::now());
        c
    }

    pub fn prime(&self, rate: f64, fetched_at: Instant) {
        let mut slot = self.cache.lock().expect("poisoned rate cache lock");
        *slot = Some(CachedRate { rate, fetched_at });
    }

    pub fn cached(&self) -> Option<CachedRate> {
        *self.cache.lock().expect("poisoned rate cache lock")
    }

    /// Current USD->INR multiplier. Refreshes after [`RATE_TTL`]; on any
    /// fetch failure the stale value is kept, or the default if none exists.
    pub fn rate(&self) -> f64 {
        let mut slot = self.cache.lock().expect("poisoned rate cache lock");
        if let Some(cached) = *slot {
            if cached.fetched_at.elapsed() < RATE_TTL {
                return cached.rate;
            }
        }
        match self.source.fetch_usd_inr() {
            // A zero, negative, or non-finite rate would poison every
            // conversion downstream; treat it like a failed fetch.
            Ok(rate) if rate.is_finite() && rate > 0.0 => {
                *slot = Some(CachedRate {
                    rate,
                    fetched_at: Instant::now(),
                });
                rate
            }
            Ok(bad) => {
                eprintln!("warning: ignoring invalid exchange rate {bad}");
                slot.map(|c| c.rate).unwrap_or(DEFAULT_USD_INR_RATE)
            }
            Err(err) => {
                eprintln!("warning: exchange rate fetch failed: {err:#}");
                slot.map(|c| c.rate).unwrap_or(DEFAULT_USD_INR_RATE)
            }
        }
    }

    /// Convert between USD and INR. Same-currency conversion is exact.
    pub fn convert(&self, amount: Decimal, from: Currency, to: Currency) -> Result<Decimal> {
        if from == to {
            return Ok(amount);
        }
        let rate = self.rate();
        let rate = Decimal::try_from(rate)
            .with_context(|| format!("Exchange rate {rate} is not representable"))?;
        Ok(match (from, to) {
            (Currency::Usd, Currency::Inr) => amount * rate,
            (Currency::Inr, Currency::Usd) => amount / rate,
            _ => amount,
        })
    }
}
