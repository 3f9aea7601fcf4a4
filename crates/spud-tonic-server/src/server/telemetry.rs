//! # Logging and telemetry
//!
//! Structured logs are always on: a `tracing_subscriber` registry filtered by
//! `RUST_LOG` (falling back to `debug` or `info` depending on `--debug`) and
//! formatted either for humans (`--dev-mode`) or as JSON lines.
//!
//! ## Feature matrix
//!
//! - `otlp`: exports spans over OTLP/gRPC via `tracing-opentelemetry`.
//! - `metrics`: exports request counters and a page size histogram over
//!   OTLP/gRPC.
//!
//! Both exporters read `OTEL_EXPORTER_OTLP_ENDPOINT`, defaulting to
//! `http://localhost:4317`.
//!
//! ```bash
//! cargo run --features otlp,metrics
//! ```

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[cfg(any(feature = "metrics", feature = "otlp"))]
use opentelemetry::{InstrumentationScope, KeyValue};
#[cfg(any(feature = "metrics", feature = "otlp"))]
use opentelemetry_otlp::{Protocol, WithExportConfig};
#[cfg(any(feature = "metrics", feature = "otlp"))]
use opentelemetry_sdk::Resource;
#[cfg(any(feature = "metrics", feature = "otlp"))]
use opentelemetry_semantic_conventions as semvcns;

#[cfg(feature = "metrics")]
use opentelemetry::metrics::{Counter, Histogram, Meter};
#[cfg(feature = "metrics")]
use opentelemetry_sdk::metrics as sdkmetrics;
#[cfg(feature = "metrics")]
use std::sync::OnceLock;

#[cfg(feature = "otlp")]
use opentelemetry::trace::TracerProvider;
#[cfg(feature = "otlp")]
use opentelemetry_sdk::propagation::TraceContextPropagator;
#[cfg(feature = "otlp")]
use opentelemetry_sdk::trace as sdktrace;

pub struct TelemetryProviders {
    #[cfg(feature = "otlp")]
    pub tracer_provider: sdktrace::SdkTracerProvider,
    #[cfg(feature = "metrics")]
    pub meter_provider: sdkmetrics::SdkMeterProvider,
}

impl TelemetryProviders {
    /// Flushes pending spans and metrics, then shuts the exporters down.
    pub fn shutdown(self) {
        #[cfg(feature = "otlp")]
        {
            if let Err(err) = self.tracer_provider.force_flush() {
                eprintln!("Error flushing traces: {err:#?}");
            }
            if let Err(err) = self.tracer_provider.shutdown() {
                eprintln!("Error shutting down tracer: {err:#?}");
            }
        }

        #[cfg(feature = "metrics")]
        {
            if let Err(err) = self.meter_provider.force_flush() {
                eprintln!("Error flushing metrics: {err:#?}");
            }
            if let Err(err) = self.meter_provider.shutdown() {
                eprintln!("Error shutting down meter: {err:#?}");
            }
        }
    }
}

fn default_filter(debug: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if debug {
            "debug,h2=info,hyper=info,tower=info".into()
        } else {
            "info".into()
        }
    })
}

pub fn init_telemetry(debug: bool, dev_mode: bool) -> anyhow::Result<TelemetryProviders> {
    #[cfg(feature = "otlp")]
    opentelemetry::global::set_text_map_propagator(TraceContextPropagator::new());

    #[cfg(feature = "otlp")]
    let tracer_provider = init_tracer()?;

    #[cfg(feature = "metrics")]
    let meter_provider = init_metrics()?;

    #[cfg(any(feature = "metrics", feature = "otlp"))]
    let scope = InstrumentationScope::builder("spud")
        .with_version(env!("CARGO_PKG_VERSION"))
        .with_schema_url(semvcns::SCHEMA_URL)
        .build();

    // Exactly one of the two fmt layers is active.
    let pretty = dev_mode.then(|| {
        tracing_subscriber::fmt::layer()
            .with_thread_ids(true)
            .with_line_number(true)
            .with_target(false)
            .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
            .with_file(true)
            .pretty()
    });
    let json = (!dev_mode).then(|| {
        tracing_subscriber::fmt::layer()
            .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
            .json()
            .flatten_event(true)
            .with_current_span(true)
    });

    let registry = tracing_subscriber::registry()
        .with(default_filter(debug))
        .with(pretty)
        .with(json);

    #[cfg(feature = "otlp")]
    let registry = {
        opentelemetry::global::set_tracer_provider(tracer_provider.clone());
        registry.with(
            tracing_opentelemetry::layer()
                .with_tracer(tracer_provider.tracer_with_scope(scope.clone()))
                .with_error_records_to_exceptions(true),
        )
    };

    #[cfg(feature = "metrics")]
    {
        opentelemetry::global::set_meter_provider(meter_provider.clone());
        let meter = opentelemetry::global::meter_with_scope(scope);
        init_metric_handles(meter);
    }

    registry.try_init()?;

    if debug && dev_mode {
        tracing::debug!("Dev mode is ON");
    }
    let debug_logs = debug;
    tracing::debug!(debug = debug_logs, dev_mode, "Logging configured");

    Ok(TelemetryProviders {
        #[cfg(feature = "otlp")]
        tracer_provider,
        #[cfg(feature = "metrics")]
        meter_provider,
    })
}

#[cfg(any(feature = "metrics", feature = "otlp"))]
fn otlp_endpoint() -> String {
    std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
        .unwrap_or_else(|_| String::from("http://localhost:4317"))
}

#[cfg(any(feature = "metrics", feature = "otlp"))]
fn resource() -> Resource {
    Resource::builder()
        .with_service_name("spud")
        .with_schema_url(
            [KeyValue::new(
                semvcns::resource::SERVICE_VERSION,
                env!("CARGO_PKG_VERSION"),
            )],
            semvcns::SCHEMA_URL,
        )
        .build()
}

#[cfg(feature = "otlp")]
fn init_tracer() -> anyhow::Result<sdktrace::SdkTracerProvider> {
    use anyhow::Context;

    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(otlp_endpoint())
        .with_protocol(Protocol::Grpc)
        .with_timeout(std::time::Duration::from_secs(10))
        .build()
        .context("failed to build span exporter")?;

    let batch = sdktrace::BatchSpanProcessor::builder(exporter)
        .with_batch_config(
            sdktrace::BatchConfigBuilder::default()
                .with_scheduled_delay(std::time::Duration::from_secs(5))
                .with_max_queue_size(2048)
                .build(),
        )
        .build();

    Ok(sdktrace::SdkTracerProvider::builder()
        .with_resource(resource())
        .with_span_processor(batch)
        .build())
}

#[cfg(feature = "metrics")]
fn init_metrics() -> anyhow::Result<sdkmetrics::SdkMeterProvider> {
    use anyhow::Context;

    let exporter = opentelemetry_otlp::MetricExporter::builder()
        .with_tonic()
        .with_endpoint(otlp_endpoint())
        .with_protocol(Protocol::Grpc)
        .with_timeout(std::time::Duration::from_secs(10))
        .build()
        .context("failed to build metrics exporter")?;

    Ok(sdkmetrics::SdkMeterProvider::builder()
        .with_resource(resource())
        .with_periodic_exporter(exporter)
        .build())
}

#[cfg(feature = "metrics")]
static REQUESTS: OnceLock<Counter<u64>> = OnceLock::new();
#[cfg(feature = "metrics")]
static QUERY_ERRORS: OnceLock<Counter<u64>> = OnceLock::new();
#[cfg(feature = "metrics")]
static PAGE_SIZE: OnceLock<Histogram<u64>> = OnceLock::new();

#[cfg(feature = "metrics")]
fn init_metric_handles(meter: Meter) {
    let _ = REQUESTS.set(
        meter
            .u64_counter("requests")
            .with_description("Total potato RPCs")
            .build(),
    );

    let _ = QUERY_ERRORS.set(
        meter
            .u64_counter("query_errors")
            .with_description("Potato RPCs rejected by validation")
            .build(),
    );

    let _ = PAGE_SIZE.set(
        meter
            .u64_histogram("page_size")
            .with_description("Requested page size of GetPotatoes")
            .build(),
    );
}

// No-ops when metrics are disabled
#[cfg(feature = "metrics")]
pub fn increment_requests(method: &'static str) {
    if let Some(counter) = REQUESTS.get() {
        counter.add(1, &[KeyValue::new("method", method)]);
    }
}

#[cfg(not(feature = "metrics"))]
pub fn increment_requests(_method: &'static str) {}

#[cfg(feature = "metrics")]
pub fn increment_query_errors(method: &'static str) {
    if let Some(counter) = QUERY_ERRORS.get() {
        counter.add(1, &[KeyValue::new("method", method)]);
    }
}

#[cfg(not(feature = "metrics"))]
pub fn increment_query_errors(_method: &'static str) {}

#[cfg(feature = "metrics")]
pub fn record_page_size(page_size: u64) {
    if let Some(histogram) = PAGE_SIZE.get() {
        histogram.record(page_size, &[]);
    }
}

#[cfg(not(feature = "metrics"))]
pub fn record_page_size(_page_size: u64) {}
