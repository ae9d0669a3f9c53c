//! # Telemetry
//!
//! Structured logs are always emitted through `tracing_subscriber::fmt`, either
//! human-readable (`pretty`) or one JSON object per line (`json`). The level is
//! taken from `RUST_LOG` and defaults to `info`.
//!
//! ## Feature matrix
//!
//! - `metrics`: Enables OpenTelemetry counters for RPCs and scheduled mail.
//! - `stdout`: Exports those counters to stdout every few seconds.
//!
//! ## Feature constraints
//!
//! - `stdout` requires `metrics`.
//!
//! ## Metrics
//!
//! | Name           | Kind    | Attributes | Meaning                          |
//! |----------------|---------|------------|----------------------------------|
//! | `rpc_requests` | counter | `rpc`      | Requests received, per RPC       |
//! | `rpc_errors`   | counter | `rpc`      | Requests answered with an error  |
//! | `mails_sent`   | counter |            | Scheduled mails delivered        |
//! | `mail_failures`| counter |            | Scheduled mails that failed      |
//!
//! Recording helpers compile to no-ops when `metrics` is disabled, so call
//! sites never need their own `cfg` attributes.
//!
//! ## Example usage
//!
//! ```bash
//! cargo run --features metrics,stdout
//! ```

#[cfg(all(feature = "stdout", not(feature = "metrics")))]
compile_error!("The 'stdout' feature requires 'metrics' to be enabled.");

use crate::server::config::LogFormat;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

#[cfg(feature = "metrics")]
use opentelemetry::{
    InstrumentationScope, KeyValue,
    metrics::{Counter, Meter},
};
#[cfg(feature = "metrics")]
use opentelemetry_sdk::{Resource, metrics as sdkmetrics};
#[cfg(feature = "metrics")]
use opentelemetry_semantic_conventions as semvcns;
#[cfg(feature = "metrics")]
use std::sync::OnceLock;

#[cfg(feature = "metrics")]
const SERVICE_NAME: &str = "mywordoftheday";

pub struct TelemetryProviders {
    #[cfg(feature = "metrics")]
    pub meter_provider: sdkmetrics::SdkMeterProvider,
}

impl TelemetryProviders {
    /// Flushes and stops every exporter. Errors go to stderr since the
    /// subscriber may already be gone.
    pub fn shutdown(self) {
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

pub fn init_telemetry(format: LogFormat) -> anyhow::Result<TelemetryProviders> {
    #[cfg(feature = "metrics")]
    let meter_provider = init_metrics();

    let fmt_layer = match format {
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .with_thread_ids(true)
            .with_line_number(true)
            .with_target(false)
            .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
            .with_file(true)
            .pretty()
            .boxed(),
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
            .json()
            .with_current_span(true)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(fmt_layer)
        .try_init()?;

    #[cfg(feature = "metrics")]
    {
        opentelemetry::global::set_meter_provider(meter_provider.clone());
        let scope = InstrumentationScope::builder(SERVICE_NAME)
            .with_version(env!("CARGO_PKG_VERSION"))
            .with_schema_url(semvcns::SCHEMA_URL)
            .build();
        init_metric_handles(&opentelemetry::global::meter_with_scope(scope));
    }

    Ok(TelemetryProviders {
        #[cfg(feature = "metrics")]
        meter_provider,
    })
}

#[cfg(feature = "metrics")]
fn resource() -> Resource {
    Resource::builder()
        .with_service_name(SERVICE_NAME)
        .with_schema_url(
            [KeyValue::new(
                semvcns::resource::SERVICE_VERSION,
                env!("CARGO_PKG_VERSION"),
            )],
            semvcns::SCHEMA_URL,
        )
        .build()
}

#[cfg(feature = "metrics")]
fn init_metrics() -> sdkmetrics::SdkMeterProvider {
    let builder = sdkmetrics::SdkMeterProvider::builder().with_resource(resource());

    #[cfg(feature = "stdout")]
    let builder = {
        let reader =
            sdkmetrics::PeriodicReader::builder(opentelemetry_stdout::MetricExporter::default())
                .with_interval(std::time::Duration::from_secs(5))
                .build();
        builder.with_reader(reader)
    };

    builder.build()
}

#[cfg(feature = "metrics")]
static RPC_REQUESTS: OnceLock<Counter<u64>> = OnceLock::new();
#[cfg(feature = "metrics")]
static RPC_ERRORS: OnceLock<Counter<u64>> = OnceLock::new();
#[cfg(feature = "metrics")]
static MAILS_SENT: OnceLock<Counter<u64>> = OnceLock::new();
#[cfg(feature = "metrics")]
static MAIL_FAILURES: OnceLock<Counter<u64>> = OnceLock::new();

#[cfg(feature = "metrics")]
fn init_metric_handles(meter: &Meter) {
    let _ = RPC_REQUESTS.set(
        meter
            .u64_counter("rpc_requests")
            .with_description("Total gRPC and gateway requests")
            .build(),
    );

    let _ = RPC_ERRORS.set(
        meter
            .u64_counter("rpc_errors")
            .with_description("Requests answered with an error status")
            .build(),
    );

    let _ = MAILS_SENT.set(
        meter
            .u64_counter("mails_sent")
            .with_description("Scheduled word-of-the-day mails delivered")
            .build(),
    );

    let _ = MAIL_FAILURES.set(
        meter
            .u64_counter("mail_failures")
            .with_description("Scheduled mails that could not be fetched or sent")
            .build(),
    );
}

#[cfg(feature = "metrics")]
pub fn record_rpc(rpc: &'static str) {
    if let Some(counter) = RPC_REQUESTS.get() {
        counter.add(1, &[KeyValue::new("rpc", rpc)]);
    }
}

#[cfg(not(feature = "metrics"))]
pub fn record_rpc(_rpc: &'static str) {}

#[cfg(feature = "metrics")]
pub fn record_rpc_error(rpc: &'static str) {
    if let Some(counter) = RPC_ERRORS.get() {
        counter.add(1, &[KeyValue::new("rpc", rpc)]);
    }
}

#[cfg(not(feature = "metrics"))]
pub fn record_rpc_error(_rpc: &'static str) {}

#[cfg(feature = "metrics")]
pub fn record_mail_sent() {
    if let Some(counter) = MAILS_SENT.get() {
        counter.add(1, &[]);
    }
}

#[cfg(not(feature = "metrics"))]
pub fn record_mail_sent() {}

#[cfg(feature = "metrics")]
pub fn record_mail_failure() {
    if let Some(counter) = MAIL_FAILURES.get() {
        counter.add(1, &[]);
    }
}

#[cfg(not(feature = "metrics"))]
pub fn record_mail_failure() {}
