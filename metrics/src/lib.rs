use std::{env, sync::LazyLock};

use strum_macros::EnumIter;

static CONNECTION_URI: LazyLock<String> = LazyLock::new(|| {
    let host = env::var("PROMETHEUS_HOST").unwrap_or("localhost".into());
    let port = env::var("PROMETHEUS_PORT").unwrap_or("9090".into());

    format!("http://{host}:{port}/api/v1/otlp/v1/metrics")
});

const SERVICE_NAME: &str = "patent-dedupe";

#[derive(Debug, EnumIter, Hash, Eq, PartialEq)]
pub enum Metrics {
    /// Counter for records forwarded to storage
    RecordAccepted,
    /// Counter for records dropped by the filter, labelled with the reason code
    RecordRejected,
    /// Counter for input lines that could not be read as a record
    RecordUnreadable,
    /// Counter for start URLs handed to the crawl
    SeedUrlGenerated,
}

impl Metrics {
    fn name(&self) -> &'static str {
        match self {
            Metrics::RecordAccepted => "RECORD_ACCEPTED",
            Metrics::RecordRejected => "RECORD_REJECTED",
            Metrics::RecordUnreadable => "RECORD_UNREADABLE",
            Metrics::SeedUrlGenerated => "SEED_URL_GENERATED",
        }
    }
}

/// Pushes whatever the periodic reader has buffered and stops the exporter.
/// Only call this from binaries that emitted metrics.
pub fn shutdown() {
    if let Err(err) = _private::PROVIDER.shutdown() {
        tracing::warn!("Failed to flush metrics: {err}");
    }
}

pub mod _private {
    pub use opentelemetry::KeyValue;

    use std::{collections::HashMap, sync::LazyLock, time::Duration};

    use opentelemetry::{
        global,
        metrics::{Counter, Meter},
    };
    use opentelemetry_otlp::{MetricExporter, Protocol, WithExportConfig};
    use opentelemetry_sdk::{
        Resource,
        metrics::{PeriodicReader, SdkMeterProvider},
    };
    use strum::IntoEnumIterator;

    use crate::{CONNECTION_URI, Metrics, SERVICE_NAME};

    static OTEL_METER: LazyLock<Meter> = LazyLock::new(|| {
        global::set_meter_provider(PROVIDER.clone());
        global::meter(SERVICE_NAME)
    });

    pub static PROVIDER: LazyLock<SdkMeterProvider> = LazyLock::new(|| {
        let exporter = MetricExporter::builder()
            .with_http()
            .with_protocol(Protocol::HttpBinary)
            .with_endpoint(CONNECTION_URI.to_string())
            .build()
            .expect("Expect Prometheus exporter to build");

        let reader = PeriodicReader::builder(exporter)
            .with_interval(Duration::from_secs(1))
            .build();

        let resource = Resource::builder().with_service_name(SERVICE_NAME).build();

        SdkMeterProvider::builder()
            .with_reader(reader)
            .with_resource(resource)
            .build()
    });

    pub static COUNTERS: LazyLock<HashMap<Metrics, Counter<u64>>> = LazyLock::new(|| {
        let mut mapping: HashMap<Metrics, Counter<u64>> = HashMap::new();

        for metric in crate::Metrics::iter() {
            let metric_meter = OTEL_METER.u64_counter(metric.name()).build();

            mapping.insert(metric, metric_meter);
        }

        mapping
    });
}

#[macro_export]
macro_rules! put_metric {
    ($metric_name:expr, $added_value:expr $(, $key:literal => $value:expr)* $(,)?) => {
        use $crate::_private::{KeyValue, COUNTERS};
        use $crate::Metrics;

        let metric_name: Metrics = $metric_name;
        let added_value: u64 = $added_value;

        let attributes: &[KeyValue] = &[
            $(KeyValue::new($key, $value),)*
        ];

        if let Some(counter) = COUNTERS.get(&metric_name) {
            counter.add(added_value, attributes);
        }
    };
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::Metrics;

    #[test]
    fn counter_names_are_unique() {
        let mut names: Vec<&str> = Metrics::iter().map(|metric| metric.name()).collect();
        let count = names.len();

        names.sort();
        names.dedup();

        assert_eq!(names.len(), count);
        assert!(names.iter().all(|name| name.chars().all(|c| c.is_ascii_uppercase() || c == '_')));
    }
}
