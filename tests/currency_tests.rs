// Copyright (c) 2025 Nidhi Authors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::time::Instant;

use anyhow::{Result, bail};
use rust_decimal::Decimal;

use nidhi::currency::{
    Converter, Currency, DEFAULT_USD_INR_RATE, FixedRate, RATE_TTL, RateSource,
};

struct FailingSource;

impl RateSource for FailingSource {
    fn fetch_usd_inr(&self) -> Result<f64> {
        bail!("network down")
    }
}

struct BadRateSource(f64);

impl RateSource for BadRateSource {
    fn fetch_usd_inr(&self) -> Result<f64> {
        Ok(self.0)
    }
}

#[test]
fn same_currency_conversion_is_identity() {
    let c = Converter::with_rate(83.0);
    let amt = "123.45".parse::<Decimal>().unwrap();
    assert_eq!(c.convert(amt, Currency::Usd, Currency::Usd).unwrap(), amt);
    assert_eq!(c.convert(amt, Currency::Inr, Currency::Inr).unwrap(), amt);
}

#[test]
fn usd_inr_both_directions() {
    let c = Converter::with_rate(80.0);
    let usd = Decimal::from(100);
    let inr = c.convert(usd, Currency::Usd, Currency::Inr).unwrap();
    assert_eq!(inr, Decimal::from(8000));
    let back = c.convert(inr, Currency::Inr, Currency::Usd).unwrap();
    assert_eq!(back, usd);
}

#[test]
fn default_rate_applies_before_any_fetch() {
    let c = Converter::new(Box::new(FailingSource));
    assert_eq!(c.rate(), DEFAULT_USD_INR_RATE);
}

#[test]
fn fresh_cache_skips_the_source() {
    // A primed cache within the TTL must win over the source's value.
    let c = Converter::new(Box::new(FixedRate(90.0)));
    c.prime(75.0, Instant::now());
    assert_eq!(c.rate(), 75.0);
}

#[test]
fn expired_cache_refetches() {
    let c = Converter::new(Box::new(FixedRate(90.0)));
    c.prime(75.0, Instant::now() - RATE_TTL - std::time::Duration::from_secs(1));
    assert_eq!(c.rate(), 90.0);
}

#[test]
fn failed_refresh_keeps_stale_rate() {
    let c = Converter::new(Box::new(FailingSource));
    c.prime(75.0, Instant::now() - RATE_TTL - std::time::Duration::from_secs(1));
    assert_eq!(c.rate(), 75.0);
}

#[test]
fn invalid_rates_are_treated_as_failures() {
    for bad in [0.0, -5.0, f64::NAN, f64::INFINITY] {
        let c = Converter::new(Box::new(BadRateSource(bad)));
        assert_eq!(c.rate(), DEFAULT_USD_INR_RATE, "rate {bad} accepted");
    }
}

#[test]
fn unknown_currency_codes_fall_back_to_usd() {
    assert_eq!(Currency::parse_or_usd("INR"), Currency::Inr);
    assert_eq!(Currency::parse_or_usd("usd"), Currency::Usd);
    assert_eq!(Currency::parse_or_usd("EUR"), Currency::Usd);
    assert_eq!(Currency::parse_or_usd(""), Currency::Usd);
    assert_eq!(Currency::parse("EUR"), None);
}
