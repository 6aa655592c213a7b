use std::{
    io::{stderr, stdout},
    sync::Once,
};

use tracing::Level;
use tracing_subscriber::{prelude::*, EnvFilter};

use super::*;

static INIT: Once = Once::new();

/// Install the global subscriber. Warnings and errors go to stderr, the
/// rest to stdout.
///
/// `RUST_LOG`, when set, replaces the built-in level filter. Calling this
/// more than once, or after another subscriber was installed, is a no-op.
pub fn init_logger() {
    INIT.call_once(|| {
        let colorful = std::env::var(COLORFUL_LOGS).is_ok() || cfg!(debug_assertions);
        let dev = std::env::var(DEV_LOGS).is_ok();

        let writer = stderr.with_max_level(Level::WARN).or_else(stdout);
        let layer = tracing_subscriber::fmt::layer()
            .map_writer(move |_| writer)
            .map_event_format(move |format| BlockwireFormatter {
                default: format.with_timer(LogTime),
                colorful,
            });

        let result = match EnvFilter::try_from_default_env() {
            Ok(env) => tracing_subscriber::registry().with(layer.with_filter(env)).try_init(),
            Err(_) => tracing_subscriber::registry()
                .with(layer.with_filter(EditorFilter::new(dev)))
                .try_init(),
        };

        if let Err(e) = result {
            eprintln!("logger already initialized: {e}");
        }
    });
}
