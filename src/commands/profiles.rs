// Copyright (c) 2025 Nidhi Authors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::utils::{active_profile, pretty_table, profile_by_name, set_active_profile};
use anyhow::Result;
use rusqlite::{Connection, params};

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = sub.get_one::<String>("name").unwrap();
            conn.execute("INSERT INTO profiles(name) VALUES (?1)", params![name])?;
            set_active_profile(conn, name)?;
            println!("Created profile '{}' (now active)", name);
        }
        Some(("list", _)) => {
            let active = active_profile(conn).map(|p| p.name).unwrap_or_default();
            let mut stmt = conn
                .prepare("SELECT name, display_currency, created_at FROM profiles ORDER BY name")?;
            let rows = stmt.query_map([], |r| {
                Ok((
                    r.get::<_, String>(0)?,
                    r.get::<_, String>(1)?,
                    r.get::<_, String>(2)?,
                ))
            })?;
            let mut data = Vec::new();
            for row in rows {
                let (n, c, cr) = row?;
                let marker = if n == active { "*" } else { "" };
                data.push(vec![marker.to_string(), n, c, cr]);
            }
            println!(
                "{}",
                pretty_table(&["", "Profile", "Display CCY", "Created"], data)
            );
        }
        Some(("use", sub)) => {
            let name = sub.get_one::<String>("name").unwrap();
            let profile = profile_by_name(conn, name)?;
            set_active_profile(conn, &profile.name)?;
            println!("Active profile is now '{}'", profile.name);
        }
        Some(("currency", sub)) => {
            let ccy = sub.get_one::<String>("currency").unwrap().to_uppercase();
            let profile = active_profile(conn)?;
            conn.execute(
                "UPDATE profiles SET display_currency=?1 WHERE id=?2",
                params![ccy, profile.id],
            )?;
            println!("Display currency for '{}' set to {}", profile.name, ccy);
        }
        Some(("rm", sub)) => {
            let name = sub.get_one::<String>("name").unwrap();
            let profile = profile_by_name(conn, name)?;
            // Cascades through accounts, transactions, deposits, budgets.
            conn.execute("DELETE FROM profiles WHERE id=?1", params![profile.id])?;
            println!("Removed profile '{}'", profile.name);
        }
        _ => {}
    }
    Ok(())
}
