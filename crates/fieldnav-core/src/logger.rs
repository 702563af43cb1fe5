//! Stderr logging for the robot's control loop.
//!
//! Each line reads `[  12.345s  INFO arc::solver] message`, where the time
//! counts from [`init_with_level`] and the target drops its `fieldnav_`
//! prefix. Builds with the `tracing` feature can use `init_tracing` instead.

use std::io::Write;
use std::sync::OnceLock;
use std::time::Instant;

use log::{LevelFilter, Log, Metadata, Record};

#[cfg(feature = "tracing")]
use tracing_subscriber::fmt::format::FmtSpan;
#[cfg(feature = "tracing")]
use tracing_subscriber::util::SubscriberInitExt;
#[cfg(feature = "tracing")]
use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable consulted by [`level_from_env`].
pub const LOG_ENV_VAR: &str = "FIELDNAV_LOG";

struct FieldLogger {
    level: LevelFilter,
    started: Instant,
}

impl Log for FieldLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let t = self.started.elapsed().as_secs_f64();
        let mut out = std::io::stderr().lock();
        let _ = writeln!(
            out,
            "[{t:8.3}s {:>5} {}] {}",
            record.level(),
            short_target(record.target()),
            record.args()
        );
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

/// `fieldnav_arc::solver` prints as `arc::solver`.
fn short_target(target: &str) -> &str {
    target.strip_prefix("fieldnav_").unwrap_or(target)
}

static LOGGER: OnceLock<FieldLogger> = OnceLock::new();

/// Send `log` records from every fieldnav crate to stderr, stamped with the
/// seconds since this call. Call it when the match (or replay) starts so the
/// stamps read as match time.
///
/// Only the first call takes effect: later calls keep its level and clock.
/// Fails if some other logger already owns the `log` facade.
pub fn init_with_level(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    let mut installed_now = false;
    let logger = LOGGER.get_or_init(|| {
        installed_now = true;
        FieldLogger {
            level,
            started: Instant::now(),
        }
    });
    if installed_now {
        log::set_logger(logger)?;
        log::set_max_level(level);
    }
    Ok(())
}

/// Read the level filter from `FIELDNAV_LOG` (`off`, `error`, ..., `trace`).
///
/// Falls back to `default` when the variable is unset or unparsable.
pub fn level_from_env(default: LevelFilter) -> LevelFilter {
    std::env::var(LOG_ENV_VAR)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

#[cfg(feature = "tracing")]
const DEFAULT_DIRECTIVES: &str =
    "warn,fieldnav=info,fieldnav_arc=info,fieldnav_blob=info,fieldnav_field=info,fieldnav_mission=info";

/// Route spans and events to stderr through `tracing-subscriber`.
///
/// `FIELDNAV_LOG` takes env-filter directives (`fieldnav_arc=debug`); without
/// it the fieldnav crates log at `info` and everything else at `warn`. Span
/// close events carry the time spent in `solve`, `locate` and
/// `Mission::handle`. With `json` each line is a flattened JSON object,
/// otherwise text stamped with process uptime. Ignored if a global
/// subscriber is already set.
#[cfg(feature = "tracing")]
pub fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES));
    let builder = fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE);
    let installed = if json {
        builder.json().flatten_event(true).finish().try_init()
    } else {
        builder
            .with_timer(fmt::time::Uptime::default())
            .finish()
            .try_init()
    };
    if installed.is_err() {
        log::debug!("tracing subscriber already installed");
    }
}
