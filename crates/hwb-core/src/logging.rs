use std::{fmt, fs::File, path::Path};

use chrono::Local;
use tracing::{Event, Subscriber};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{
        format::{DefaultFields, Writer},
        FmtContext, FormatEvent, FormatFields, MakeWriter,
    },
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
    EnvFilter,
};

use crate::{errors::Error, Result};

/// Keeps the file writer flushing; drop it only on shutdown.
pub struct LogGuard {
    _file: WorkerGuard,
}

/// Event formatter shared by both sinks: `<timestamp> [<LEVEL>] -- <message>`.
#[derive(Clone, Copy, Debug, Default)]
pub struct LineFormat;

impl<S, N> FormatEvent<S, N> for LineFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let ts = Local::now().format("%Y-%m-%d %H:%M:%S,%3f");
        write!(writer, "{ts} [{}] -- ", event.metadata().level())?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// A fmt layer rendering `LineFormat` without ANSI escapes into `writer`.
pub fn line_layer<S, W>(writer: W) -> tracing_subscriber::fmt::Layer<S, DefaultFields, LineFormat, W>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + 'static,
{
    tracing_subscriber::fmt::layer()
        .event_format(LineFormat)
        .with_ansi(false)
        .with_writer(writer)
}

/// Initialize logging for the relay: console (stderr) plus a log file that is
/// truncated on every start.
///
/// Default: debug for our crates, info for everything else.
/// Can be overridden with `RUST_LOG`.
pub fn init(service_name: &str, log_file: &Path) -> Result<LogGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "info,hwb_core=debug,hwb_telegram=debug,{service_name}=debug"
        ))
    });

    let file = File::create(log_file)?;
    let (file_writer, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::registry()
        .with(filter)
        .with(line_layer(std::io::stderr))
        .with(line_layer(file_writer))
        .try_init()
        .map_err(|e| Error::Config(format!("failed to initialize logging: {e}")))?;

    Ok(LogGuard { _file: guard })
}

/// In-memory log sink for tests.
#[cfg(test)]
pub(crate) mod capture {
    use std::sync::{Arc, Mutex};

    use tracing::subscriber::DefaultGuard;
    use tracing_subscriber::{fmt::MakeWriter, layer::SubscriberExt};

    use super::line_layer;

    #[derive(Clone, Default)]
    pub(crate) struct Capture(Arc<Mutex<Vec<u8>>>);

    impl Capture {
        pub(crate) fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }

        /// Lines of the given level whose text contains `needle`.
        pub(crate) fn lines_with(&self, level: &str, needle: &str) -> Vec<String> {
            let marker = format!("[{level}] -- ");
            self.text()
                .lines()
                .filter(|l| l.contains(&marker) && l.contains(needle))
                .map(str::to_string)
                .collect()
        }
    }

    impl std::io::Write for Capture {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Capture {
        type Writer = Capture;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    /// Route this thread's events into a fresh capture until the guard drops.
    pub(crate) fn capture_logs() -> (Capture, DefaultGuard) {
        let capture = Capture::default();
        let subscriber = tracing_subscriber::registry().with(line_layer(capture.clone()));
        let guard = tracing::subscriber::set_default(subscriber);
        (capture, guard)
    }
}
