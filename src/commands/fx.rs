// Copyright (c) 2025 Nidhi Authors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use crate::currency::Converter;
use crate::utils::{fmt_money, parse_currency, parse_decimal};

pub fn handle(converter: &Converter, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("rate", _)) => {
            println!("1 USD = {} INR", converter.rate());
        }
        Some(("convert", sub)) => {
            let amount = parse_decimal(sub.get_one::<String>("amount").unwrap())?;
            let from = parse_currency(sub.get_one::<String>("from").unwrap())?;
            let to = parse_currency(sub.get_one::<String>("to").unwrap())?;
            let converted = converter.convert(amount, from, to)?;
            println!("{} = {}", fmt_money(&amount, from), fmt_money(&converted, to));
        }
        _ => {}
    }
    Ok(())
}
