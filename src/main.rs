// Copyright (c) 2025 Nidhi Authors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use nidhi::currency::Converter;
use nidhi::{backup, cli, commands, db};

fn main() -> Result<()> {
    let matches = cli::build_cli().get_matches();
    let mut conn = db::open_or_init()?;
    let converter = Converter::live()?;

    let db_path = db::db_path()?;
    let backup_dir = backup::backup_dir()?;
    // Scheduled snapshots piggyback on command invocations; a failure here
    // must never block the command itself.
    if !matches!(matches.subcommand(), Some(("backup", _))) {
        if let Err(err) = backup::maybe_backup(&db_path, &backup_dir) {
            eprintln!("warning: scheduled backup failed: {err:#}");
        }
    }

    match matches.subcommand() {
        Some(("init", _)) => {
            println!("Database ready at {}", db_path.display());
        }
        Some(("profile", sub)) => commands::profiles::handle(&conn, sub)?,
        Some(("account", sub)) => commands::accounts::handle(&conn, &converter, sub)?,
        Some(("category", sub)) => commands::categories::handle(&conn, sub)?,
        Some(("tx", sub)) => commands::transactions::handle(&mut conn, sub)?,
        Some(("transfer", sub)) => commands::transactions::transfer(&mut conn, sub)?,
        Some(("fd", sub)) => commands::fd::handle(&mut conn, sub)?,
        Some(("budget", sub)) => commands::budgets::handle(&mut conn, &converter, sub)?,
        Some(("report", sub)) => commands::reports::handle(&conn, &converter, sub)?,
        Some(("dashboard", _)) => commands::reports::dashboard(&conn, &converter)?,
        Some(("fx", sub)) => commands::fx::handle(&converter, sub)?,
        Some(("backup", sub)) => match sub.subcommand() {
            Some(("now", _)) => {
                let path = backup::backup_database(&db_path, &backup_dir)?;
                println!("Backup written to {}", path.display());
            }
            Some(("list", _)) => {
                for path in backup::list_backups(&backup_dir)? {
                    println!("{}", path.display());
                }
            }
            _ => {}
        },
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
