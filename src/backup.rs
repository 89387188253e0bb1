// Copyright (c) 2025 Nidhi Authors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Timestamped SQLite snapshots. The schedule survives restarts because
//! "time of last backup" is parsed from the newest file name on disk, not
//! kept in memory.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use chrono::{Local, NaiveDateTime};
use rusqlite::Connection;

use crate::db;

const BACKUP_PREFIX: &str = "nidhi_";
const BACKUP_EXT: &str = "sqlite";
const TIMESTAMP_FMT: &str = "%Y-%m-%d_%H-%M-%S";

/// Older backups beyond this count are pruned after each snapshot.
pub const MAX_BACKUPS: usize = 7;

/// A snapshot is due once this much time has passed since the last one.
pub const BACKUP_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

pub fn backup_dir() -> Result<PathBuf> {
    let dir = db::data_dir()?.join("backups");
    fs::create_dir_all(&dir).context("Failed to create backups dir")?;
    Ok(dir)
}

/// All backup files in `dir`, oldest first.
pub fn list_backups(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let name = match path.file_name().and_then(|n| n.to_str()) {
            Some(n) => n,
            None => continue,
        };
        if name.starts_with(BACKUP_PREFIX) && name.ends_with(&format!(".{BACKUP_EXT}")) {
            out.push(path);
        }
    }
    out.sort();
    Ok(out)
}

/// Timestamp of the most recent backup, parsed from its file name.
pub fn last_backup_time(dir: &Path) -> Result<Option<NaiveDateTime>> {
    let backups = list_backups(dir)?;
    let Some(latest) = backups.last() else {
        return Ok(None);
    };
    let stem = latest
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    let ts = stem.strip_prefix(BACKUP_PREFIX).unwrap_or(stem);
    Ok(NaiveDateTime::parse_from_str(ts, TIMESTAMP_FMT).ok())
}

/// Snapshot the database via SQLite's online backup API, safe against a
/// concurrently writing process, then prune beyond [`MAX_BACKUPS`].
pub fn backup_database(db_path: &Path, dir: &Path) -> Result<PathBuf> {
    if !db_path.exists() {
        bail!("Database not found at {}", db_path.display());
    }
    let timestamp = Local::now().format(TIMESTAMP_FMT);
    let backup_path = dir.join(format!("{BACKUP_PREFIX}{timestamp}.{BACKUP_EXT}"));

    let src = Connection::open(db_path)
        .with_context(|| format!("Open DB at {}", db_path.display()))?;
    let mut dst = Connection::open(&backup_path)
        .with_context(|| format!("Open backup at {}", backup_path.display()))?;
    let backup = rusqlite::backup::Backup::new(&src, &mut dst)?;
    backup.run_to_completion(64, Duration::from_millis(10), None)?;
    drop(backup);

    prune_old_backups(dir)?;
    Ok(backup_path)
}

fn prune_old_backups(dir: &Path) -> Result<()> {
    let backups = list_backups(dir)?;
    if backups.len() > MAX_BACKUPS {
        for old in &backups[..backups.len() - MAX_BACKUPS] {
            fs::remove_file(old)
                .with_context(|| format!("Prune backup {}", old.display()))?;
        }
    }
    Ok(())
}

/// Run a snapshot if none exists yet or the last one is older than
/// [`BACKUP_INTERVAL`]. Returns the path when a backup was taken.
pub fn maybe_backup(db_path: &Path, dir: &Path) -> Result<Option<PathBuf>> {
    let due = match last_backup_time(dir)? {
        None => true,
        Some(last) => {
            let elapsed = Local::now().naive_local() - last;
            elapsed.num_seconds() >= BACKUP_INTERVAL.as_secs() as i64
        }
    };
    if !due {
        return Ok(None);
    }
    Ok(Some(backup_database(db_path, dir)?))
}
