//! Logging for the userctl binary
//!
//! One registry: `EnvFilter` -> compact fmt layer -> optional OTLP layer.
//!
//! Without `RUST_LOG` only our own crates and request traces are shown:
//!   userctl serve            # info for userctl/userctl_server/tower_http, warn elsewhere
//!   userctl --debug serve    # debug for the same targets, sqlx statements at info
//!   RUST_LOG=sqlx=debug userctl serve
//!
//! With the `telemetry` feature, `--otel` also exports spans to
//! OTEL_EXPORTER_OTLP_ENDPOINT (default http://localhost:4317) as
//! OTEL_SERVICE_NAME (default userctl).

use anyhow::{anyhow, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Targets whose events we always want at the chosen level
const SERVICE_TARGETS: &[&str] = &["userctl_cli", "userctl_server", "tower_http"];

/// Tracing configuration options
#[derive(Debug, Clone, Default)]
pub struct TracingConfig {
    /// Debug level for service targets
    pub debug: bool,
    /// Enable OpenTelemetry OTLP export
    pub otel: bool,
}

/// Directive string used when `RUST_LOG` is unset.
fn default_directives(debug: bool) -> String {
    let (base, service) = if debug {
        ("sqlx=info,warn", "debug")
    } else {
        ("warn", "info")
    };

    SERVICE_TARGETS
        .iter()
        .map(|target| format!("{target}={service}"))
        .fold(base.to_owned(), |acc, d| format!("{acc},{d}"))
}

fn env_filter(config: &TracingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(config.debug)))
}

/// Install the global subscriber.
pub fn init(config: &TracingConfig) -> Result<()> {
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(config.debug)
        .compact();

    let registry = tracing_subscriber::registry()
        .with(env_filter(config))
        .with(fmt_layer);

    #[cfg(feature = "telemetry")]
    {
        let otel_layer = if config.otel {
            Some(otel::layer()?)
        } else {
            None
        };
        registry
            .with(otel_layer)
            .try_init()
            .map_err(|err| anyhow!(err))?;
    }

    #[cfg(not(feature = "telemetry"))]
    {
        registry.try_init().map_err(|err| anyhow!(err))?;
        if config.otel {
            tracing::warn!("--otel ignored: built without the telemetry feature");
        }
    }

    Ok(())
}

#[cfg(feature = "telemetry")]
mod otel {
    use anyhow::{anyhow, Result};
    use opentelemetry::trace::TracerProvider as _;
    use opentelemetry::KeyValue;
    use opentelemetry_otlp::WithExportConfig;
    use opentelemetry_sdk::trace::TracerProvider;
    use tracing::Subscriber;
    use tracing_subscriber::registry::LookupSpan;
    use tracing_subscriber::Layer;

    /// OTLP span exporter layer tagged with this binary's name and version.
    pub fn layer<S>() -> Result<impl Layer<S>>
    where
        S: Subscriber + for<'span> LookupSpan<'span>,
    {
        let endpoint = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
            .unwrap_or_else(|_| "http://localhost:4317".to_string());
        let service_name =
            std::env::var("OTEL_SERVICE_NAME").unwrap_or_else(|_| "userctl".to_string());

        let exporter = opentelemetry_otlp::SpanExporter::builder()
            .with_tonic()
            .with_endpoint(&endpoint)
            .build()
            .map_err(|e| anyhow!("Failed to create OTLP exporter: {}", e))?;

        let resource = opentelemetry_sdk::Resource::new(vec![
            KeyValue::new("service.name", service_name),
            KeyValue::new("service.version", env!("CARGO_PKG_VERSION")),
        ]);

        let provider = TracerProvider::builder()
            .with_batch_exporter(exporter, opentelemetry_sdk::runtime::Tokio)
            .with_resource(resource)
            .build();
        let tracer = provider.tracer("userctl");

        // Dropping the provider would stop trace export
        let _ = opentelemetry::global::set_tracer_provider(provider);

        Ok(tracing_opentelemetry::layer().with_tracer(tracer))
    }
}

/// Flush pending spans
#[cfg(feature = "telemetry")]
pub fn shutdown_otel() {
    opentelemetry::global::shutdown_tracer_provider();
}

#[cfg(not(feature = "telemetry"))]
pub fn shutdown_otel() {}
