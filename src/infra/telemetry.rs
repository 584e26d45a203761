use std::sync::Once;

use metrics::{Unit, describe_counter};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::config::{LogFormat, LoggingSettings};

use super::error::InfraError;

static METRIC_DESCRIPTIONS: Once = Once::new();

/// Install a global tracing subscriber using the provided logging settings.
pub fn init(logging: &LoggingSettings) -> Result<(), InfraError> {
    describe_metrics();

    let env_filter = EnvFilter::builder()
        .with_default_directive(logging.level.into())
        .from_env_lossy();

    let fmt_layer = match logging.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .boxed(),
        LogFormat::Compact => fmt::layer().compact().with_target(true).boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(ErrorLayer::default())
        .with(fmt_layer)
        .try_init()
        .map_err(|err| {
            InfraError::telemetry(format!("failed to install tracing subscriber: {err}"))
        })
}

/// Counters recorded by the transient cache, keyed by transient name.
const TRANSIENT_COUNTERS: [(&str, &str); 4] = [
    (
        "site_counts_transient_hit_total",
        "Aggregate lookups served from a transient.",
    ),
    (
        "site_counts_transient_miss_total",
        "Aggregate lookups that found no usable transient.",
    ),
    (
        "site_counts_transient_rebuild_total",
        "Aggregate recomputations, forced or on miss.",
    ),
    (
        "site_counts_transient_unavailable_total",
        "Transient backend failures degraded to recomputation.",
    ),
];

pub fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        for (name, description) in TRANSIENT_COUNTERS {
            describe_counter!(name, Unit::Count, description);
        }
    });
}
