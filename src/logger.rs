use std::{fs::File, path::PathBuf};

use anyhow::Context;
use time::{
    format_description::{self, parse},
    OffsetDateTime,
};
use tracing::{subscriber::set_global_default, warn, Level};
use tracing_subscriber::{fmt::writer::BoxMakeWriter, FmtSubscriber};

use crate::configuration::Configuration;

/// Installs a global subscriber writing every event to a timestamped file in the log directory.
///
/// Returns the path of the log file. If a global subscriber is already set, it is kept and only
/// a warning is emitted through it.
pub fn init_logger(config: &Configuration) -> anyhow::Result<PathBuf> {
    let path = config.log_dir.join(get_log_file_name()?);
    let file = File::create(&path)
        .with_context(|| format!("could not create log file {}", path.display()))?;
    let writer = BoxMakeWriter::new(file);
    let local_offset = time::UtcOffset::current_local_offset().unwrap_or(time::UtcOffset::UTC);
    let timer = tracing_subscriber::fmt::time::OffsetTime::new(
        local_offset,
        format_description::parse("[year]-[month]-[day] [hour]:[minute]:[second]")?,
    );

    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::TRACE)
        .with_ansi(false)
        .with_timer(timer)
        .with_writer(writer)
        .finish();

    if set_global_default(subscriber).is_err() {
        warn!(
            "a global tracing subscriber is already set, not logging to {}",
            path.display()
        );
    }
    Ok(path)
}

fn get_log_file_name() -> anyhow::Result<String> {
    let format = parse("[year]-[month]-[day]_[hour]-[minute]-[second]_engine_log.txt")?;
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    Ok(now.format(&format)?)
}
