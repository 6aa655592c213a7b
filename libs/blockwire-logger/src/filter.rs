use tracing::{subscriber::Interest, Level, Metadata};
use tracing_subscriber::layer::{Context, Filter};

const EDITOR_PREFIX: &str = "blockwire";

/// Lets through everything at `INFO` and above. Debug builds add `DEBUG`
/// for the editor crates, and dev mode adds their `TRACE` events.
pub struct EditorFilter {
    dev: bool,
}

impl EditorFilter {
    pub fn new(dev: bool) -> Self {
        Self { dev }
    }

    fn max_level(&self, metadata: &Metadata<'_>) -> Level {
        if !metadata.target().starts_with(EDITOR_PREFIX) {
            Level::INFO
        } else if self.dev {
            Level::TRACE
        } else if cfg!(debug_assertions) {
            Level::DEBUG
        } else {
            Level::INFO
        }
    }

    fn is_enabled(&self, metadata: &Metadata<'_>) -> bool {
        *metadata.level() <= self.max_level(metadata)
    }
}

impl<S> Filter<S> for EditorFilter {
    fn enabled(&self, metadata: &Metadata<'_>, _: &Context<'_, S>) -> bool {
        self.is_enabled(metadata)
    }

    fn callsite_enabled(&self, metadata: &'static Metadata<'static>) -> Interest {
        if self.is_enabled(metadata) {
            Interest::always()
        } else {
            Interest::never()
        }
    }
}
