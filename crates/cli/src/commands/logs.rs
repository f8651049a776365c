// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `botctl logs` - Manager and bot logs

use std::path::Path;

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use crate::context::Context;
use crate::output::{format_or_json, OutputFormat};

#[derive(Args)]
pub struct LogsArgs {
    /// Number of recent lines to show
    #[arg(short = 'n', long, default_value = "50")]
    pub limit: usize,

    /// Truncate the log instead of showing it
    #[arg(long, conflicts_with = "limit")]
    pub clear: bool,

    /// Use the bot's own stdout/stderr log
    #[arg(long)]
    pub bot: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LogStats {
    pub size_bytes: u64,
    pub lines: usize,
}

pub fn logs(ctx: &Context, args: LogsArgs, format: OutputFormat) -> Result<()> {
    let path = if args.bot { &ctx.paths.bot_log } else { &ctx.paths.log_file };

    if args.clear {
        let cleared = clear(path)?;
        // Logging a manager-log clear would write straight back into it
        if args.bot && cleared {
            tracing::info!(target: "system", path = %path.display(), "bot log cleared");
        }
        let obj = serde_json::json!({ "log_path": path, "cleared": cleared });
        return format_or_json(format, &obj, || {
            if cleared {
                println!("Cleared {}", path.display());
            } else {
                println!("No log file found at {}", path.display());
            }
        });
    }

    if !path.exists() {
        let empty: Vec<String> = vec![];
        let obj = serde_json::json!({ "log_path": path, "lines": empty });
        return format_or_json(format, &obj, || {
            println!("No log file found at {}", path.display())
        });
    }

    let lines = tail_lines(path, args.limit)?;
    let obj = serde_json::json!({ "log_path": path, "lines": lines });
    format_or_json(format, &obj, || {
        if lines.is_empty() {
            eprintln!("Log is empty");
        }
        for line in &lines {
            println!("{line}");
        }
    })
}

/// Last `n` lines of `path`. Invalid UTF-8 is replaced, not rejected.
pub fn tail_lines(path: &Path, n: usize) -> std::io::Result<Vec<String>> {
    let bytes = std::fs::read(path)?;
    let body = bytes.strip_suffix(b"\n").unwrap_or(&bytes);
    if body.is_empty() {
        return Ok(Vec::new());
    }
    let lines: Vec<&[u8]> = body.split(|b| *b == b'\n').collect();
    let start = lines.len().saturating_sub(n);
    Ok(lines[start..]
        .iter()
        .map(|line| String::from_utf8_lossy(line.strip_suffix(b"\r").unwrap_or(line)).into_owned())
        .collect())
}

/// Truncate the log. Returns false when there was no log.
pub fn clear(path: &Path) -> std::io::Result<bool> {
    match std::fs::OpenOptions::new().write(true).truncate(true).open(path) {
        Ok(_) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

pub fn log_stats(path: &Path) -> Option<LogStats> {
    let bytes = std::fs::read(path).ok()?;
    let size_bytes = bytes.len() as u64;
    let mut lines = bytes.iter().filter(|b| **b == b'\n').count();
    if bytes.last().is_some_and(|b| *b != b'\n') {
        lines += 1;
    }
    Some(LogStats { size_bytes, lines })
}

#[cfg(test)]
#[path = "logs_tests.rs"]
mod tests;
