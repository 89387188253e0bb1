// Copyright (c) 2025 Nidhi Authors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::Error;
use crate::models::SystemCategory;
use crate::utils::{active_profile, category_names, pretty_table};
use anyhow::Result;
use rusqlite::{Connection, params};

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let profile = active_profile(conn)?;
            let name = normalize(sub.get_one::<String>("name").unwrap());
            if name.is_empty() {
                return Err(Error::Validation("Category name cannot be empty".into()).into());
            }
            if SystemCategory::is_system(&name) {
                return Err(Error::Validation(format!(
                    "'{}' is a built-in category and already available",
                    name
                ))
                .into());
            }
            conn.execute(
                "INSERT INTO categories(profile_id, name) VALUES (?1, ?2)",
                params![profile.id, name],
            )?;
            println!("Added category '{}'", name);
        }
        Some(("list", _)) => {
            let profile = active_profile(conn)?;
            let mut data = Vec::new();
            for name in category_names(conn, profile.id)? {
                let kind = if SystemCategory::is_system(&name) {
                    "built-in"
                } else {
                    "custom"
                };
                data.push(vec![name, kind.to_string()]);
            }
            println!("{}", pretty_table(&["Category", "Kind"], data));
        }
        Some(("rm", sub)) => {
            let profile = active_profile(conn)?;
            let name = normalize(sub.get_one::<String>("name").unwrap());
            if SystemCategory::is_system(&name) {
                return Err(Error::Validation(format!(
                    "'{}' is a built-in category and cannot be removed",
                    name
                ))
                .into());
            }
            let n = conn.execute(
                "DELETE FROM categories WHERE profile_id=?1 AND name=?2",
                params![profile.id, name],
            )?;
            if n == 0 {
                return Err(Error::not_found("Category", name).into());
            }
            println!("Removed category '{}'", name);
        }
        _ => {}
    }
    Ok(())
}

/// Category names are stored lowercase with underscores.
fn normalize(name: &str) -> String {
    name.trim().to_lowercase().replace(' ', "_")
}
