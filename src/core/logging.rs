use crate::shared::paths::{ensure_dir, get_log_dir};
use std::path::Path;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Log file per component: `(file stem, targets routed to it)`.
const COMPONENTS: [(&str, &[&str]); 2] = [
    ("store", &["store", "storage", "voice"]),
    ("gifs", &["gifs"]),
];

pub struct LoggingGuards {
    _guards: Vec<WorkerGuard>,
}

/// Routes each event to its component file by target, everything else to `system.log`.
struct ComponentWriter {
    routes: Vec<(&'static str, NonBlocking)>,
    system_writer: NonBlocking,
}

impl ComponentWriter {
    fn writer_for(&self, target: &str) -> &NonBlocking {
        self.routes
            .iter()
            .find(|(prefix, _)| matches_target(target, prefix))
            .map(|(_, writer)| writer)
            .unwrap_or(&self.system_writer)
    }
}

fn matches_target(target: &str, prefix: &str) -> bool {
    target == prefix
        || target
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with("::"))
}

impl<'a> MakeWriter<'a> for ComponentWriter {
    type Writer = NonBlocking;

    fn make_writer(&'a self) -> Self::Writer {
        self.system_writer.clone()
    }

    fn make_writer_for(&'a self, meta: &tracing::Metadata<'_>) -> Self::Writer {
        self.writer_for(meta.target()).clone()
    }
}

fn daily_writer(log_dir: &Path, file_name: &str, guards: &mut Vec<WorkerGuard>) -> NonBlocking {
    let appender = RollingFileAppender::new(Rotation::DAILY, log_dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    guards.push(guard);
    writer
}

/// Installs the global subscriber: daily rolling files under the log dir plus stderr.
/// Keep the returned guards alive for as long as logs should be flushed.
pub fn init_logging() -> LoggingGuards {
    let log_dir = get_log_dir();
    let mut guards = Vec::new();

    let file_layer = match ensure_dir(&log_dir) {
        Ok(()) => {
            let mut routes = Vec::new();
            for (file_stem, targets) in COMPONENTS {
                let writer = daily_writer(&log_dir, &format!("{}.log", file_stem), &mut guards);
                for target in targets {
                    routes.push((*target, writer.clone()));
                }
            }
            let system_writer = daily_writer(&log_dir, "system.log", &mut guards);

            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(ComponentWriter {
                        routes,
                        system_writer,
                    })
                    .with_ansi(false)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_thread_names(false),
            )
        }
        Err(e) => {
            eprintln!("Failed to create logs directory {}: {}", log_dir.display(), e);
            None
        }
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true),
        );

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set global tracing subscriber: {}", e);
    }

    tracing::info!(target: "system", "Logging initialized at {:?}", log_dir);

    LoggingGuards { _guards: guards }
}
