use std::fmt::Result;

use nu_ansi_term::{AnsiGenericString, Color};
use tracing::{Event, Level, Metadata, Subscriber};
use tracing_log::NormalizeEvent;
use tracing_subscriber::{
    fmt::{
        format::{Format, Full, Writer},
        time::FormatTime,
        FmtContext, FormatEvent, FormatFields, FormattedFields,
    },
    registry::LookupSpan,
};

pub struct LogTime;

impl LogTime {
    fn now() -> String {
        if cfg!(debug_assertions) {
            chrono::Local::now().format("%m-%d %H:%M:%S%.3f").to_string()
        } else {
            chrono::Utc::now().to_rfc3339()
        }
    }
}

impl FormatTime for LogTime {
    fn format_time(&self, w: &mut Writer<'_>) -> Result {
        write!(w, "[{}]", Self::now())
    }
}

/// One line per event: `[time][level][target] span{fields}: message`.
///
/// Release builds without colors fall back to the stock full format.
pub struct BlockwireFormatter {
    pub(super) default: Format<Full, LogTime>,
    pub(super) colorful: bool,
}

impl BlockwireFormatter {
    fn level(level: &Level) -> AnsiGenericString<'static, str> {
        match *level {
            Level::ERROR => Color::Red.paint("ERROR"),
            Level::WARN => Color::Yellow.paint(" WARN"),
            Level::INFO => Color::Green.paint(" INFO"),
            Level::DEBUG => Color::Blue.paint("DEBUG"),
            Level::TRACE => Color::Purple.paint("TRACE"),
        }
    }

    fn prefix(meta: &Metadata<'_>) -> String {
        format!(
            "[{}][{}][{}] ",
            Color::DarkGray.paint(LogTime::now()),
            Self::level(meta.level()),
            Color::LightCyan.paint(meta.target())
        )
    }
}

impl<S, N> FormatEvent<S, N> for BlockwireFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(&self, ctx: &FmtContext<'_, S, N>, mut writer: Writer<'_>, event: &Event<'_>) -> Result {
        if !self.colorful {
            return self.default.format_event(ctx, writer, event);
        }

        // events bridged from `log` carry their real target in fields
        let normalized = event.normalized_metadata();
        let meta = normalized.as_ref().unwrap_or_else(|| event.metadata());
        write!(writer, "{}", Self::prefix(meta))?;

        if let Some(scope) = ctx.event_scope() {
            for span in scope.from_root() {
                write!(writer, "{}", Color::Cyan.paint(span.name()))?;

                let ext = span.extensions();
                if let Some(fields) = ext.get::<FormattedFields<N>>().filter(|fields| !fields.is_empty()) {
                    write!(writer, "{{{fields}}}")?;
                }
                write!(writer, ": ")?;
            }
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;

        writeln!(writer)
    }
}
