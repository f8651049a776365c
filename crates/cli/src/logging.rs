// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Manager log setup.
//!
//! Events go to `.botctl/logs/botctl.log` through a non-blocking writer, so
//! a slow or failing disk never stalls a command. `--verbose` mirrors them
//! to stderr.

use botctl_core::{env, Paths};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Install the global subscriber. The returned guard flushes the file
/// writer on drop and must outlive the command.
pub fn init(paths: &Paths, verbose: bool) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_new(env::log_filter()).unwrap_or_else(|_| EnvFilter::new("info"));

    let appender = std::fs::create_dir_all(&paths.logs_dir).ok().and_then(|_| {
        RollingFileAppender::builder()
            .rotation(Rotation::NEVER)
            .filename_prefix("botctl")
            .filename_suffix("log")
            .build(&paths.logs_dir)
            .ok()
    });
    if appender.is_none() {
        eprintln!("warning: cannot open {}, continuing without a log file", paths.log_file.display());
    }

    let (file_layer, guard) = match appender {
        Some(appender) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(fmt::layer().with_writer(writer).with_ansi(false)), Some(guard))
        }
        None => (None, None),
    };
    let stderr_layer = verbose.then(|| fmt::layer().with_writer(std::io::stderr));

    let _ = tracing_subscriber::registry().with(filter).with(file_layer).with(stderr_layer).try_init();
    guard
}
