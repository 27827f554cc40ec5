//! Tracing setup for the binary.
//!
//! Output goes to stderr so stdout stays reserved for command output.
//! `RUST_LOG` overrides [`DEFAULT_FILTER`].

/// Directive used when `RUST_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "warn,pokersim_engine=info";

/// Installs the stderr subscriber. `POKERSIM_LOG_FORMAT=json` switches to
/// JSON lines.
pub fn init_logging() {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::fmt;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let json = std::env::var("POKERSIM_LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let builder = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(true);

    // A subscriber may already be installed when embedded; keep that one.
    let installed = if json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    };
    if installed.is_err() {
        tracing::debug!("global subscriber already set");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tracing::{Level, info, warn};
    use tracing_subscriber::layer::{Context, SubscriberExt};
    use tracing_subscriber::{Layer, Registry};

    #[derive(Debug, Clone)]
    struct Captured {
        level: Level,
        target: String,
        message: String,
        fields: Vec<(String, String)>,
    }

    impl Captured {
        fn field(&self, name: &str) -> Option<&str> {
            self.fields
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.as_str())
        }
    }

    /// Records every event it sees; clones share one buffer.
    #[derive(Clone, Default)]
    struct CaptureLayer {
        events: Arc<Mutex<Vec<Captured>>>,
    }

    impl CaptureLayer {
        fn events(&self) -> Vec<Captured> {
            self.events.lock().map(|e| e.clone()).unwrap_or_default()
        }

        fn clear(&self) {
            if let Ok(mut e) = self.events.lock() {
                e.clear();
            }
        }
    }

    impl<S: tracing::Subscriber> Layer<S> for CaptureLayer {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            let mut visitor = FieldVisitor::default();
            event.record(&mut visitor);
            let captured = Captured {
                level: *event.metadata().level(),
                target: event.metadata().target().to_string(),
                message: visitor.message.unwrap_or_default(),
                fields: visitor.fields,
            };
            if let Ok(mut events) = self.events.lock() {
                events.push(captured);
            }
        }
    }

    #[derive(Default)]
    struct FieldVisitor {
        message: Option<String>,
        fields: Vec<(String, String)>,
    }

    impl tracing::field::Visit for FieldVisitor {
        fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
            let rendered = format!("{:?}", value);
            if field.name() == "message" {
                self.message = Some(rendered);
            } else {
                self.fields.push((field.name().to_string(), rendered));
            }
        }
    }

    #[test]
    fn events_keep_structured_fields() {
        let capture = CaptureLayer::default();
        let registry = Registry::default().with(capture.clone());

        tracing::subscriber::with_default(registry, || {
            info!(rounds = 10u64, seats = 4usize, "simulation started");
            warn!("simulation cancelled");
        });

        let entries = capture.events();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].level, Level::INFO);
        assert!(entries[0].message.contains("simulation started"));
        assert_eq!(entries[0].field("rounds"), Some("10"));
        assert_eq!(entries[0].field("seats"), Some("4"));
        assert_eq!(entries[1].level, Level::WARN);
    }

    #[test]
    fn engine_run_is_logged_with_structured_fields() {
        use pokersim_engine::runner::{
            CancelToken, Progress, RunnerConfig, StartRequest, run_simulation,
        };

        let capture = CaptureLayer::default();
        let registry = Registry::default().with(capture.clone());

        tracing::subscriber::with_default(registry, || {
            let config = RunnerConfig {
                seed: Some(1),
                break_after: Some(5),
                ..RunnerConfig::default()
            };
            let mut ignore = |_: &Progress| {};
            run_simulation(
                &config,
                &StartRequest::new(10, 2),
                &CancelToken::new(),
                &mut ignore,
            )
            .unwrap();
        });

        let entries = capture.events();
        let started = entries
            .iter()
            .find(|e| e.message.contains("simulation started"))
            .expect("start event");
        assert_eq!(started.target, "pokersim_engine::runner");
        assert_eq!(started.field("rounds"), Some("10"));
        assert_eq!(started.field("variant"), Some("draw"));
        assert!(
            entries
                .iter()
                .any(|e| e.level == Level::WARN && e.message.contains("cancelled"))
        );
    }

    #[test]
    fn clear_empties_buffer() {
        let capture = CaptureLayer::default();
        let registry = Registry::default().with(capture.clone());
        tracing::subscriber::with_default(registry, || {
            info!("first message");
        });
        assert_eq!(capture.events().len(), 1);
        capture.clear();
        assert!(capture.events().is_empty());
    }
}
