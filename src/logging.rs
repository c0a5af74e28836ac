//! Process-level log subscriber setup
//!
//! The library itself only emits `tracing` events; hosts that want them
//! printed call [`init`] once at startup.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::{EngineConfig, LogFormat};

/// Install a global fmt subscriber.
///
/// `RUST_LOG` takes precedence over `config.log_filter`. Returns `false` when a
/// global subscriber was already installed.
pub fn init(config: &EngineConfig) -> bool {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = match config.log_format {
        LogFormat::Json => fmt::layer().json().with_target(true).boxed(),
        LogFormat::Pretty => fmt::layer().with_target(true).with_ansi(true).boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .is_ok()
}
