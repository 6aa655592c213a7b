mod filter;
mod formatter;
mod logger;

pub use logger::init_logger;
pub use tracing::{
    debug, debug_span, error, error_span, info, info_span, log::LevelFilter, trace, trace_span, warn, warn_span,
};

use filter::EditorFilter;
use formatter::{BlockwireFormatter, LogTime};

/// Print colored output even in release builds.
pub const COLORFUL_LOGS: &str = "BLOCKWIRE_COLORFUL_LOGS";
/// Show every event of the editor crates, down to `TRACE`.
pub const DEV_LOGS: &str = "BLOCKWIRE_DEV";
