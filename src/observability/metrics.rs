use prometheus::{Encoder, Histogram, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub orders_created_total: IntCounter,
    pub assignments_total: IntCounterVec,
    pub order_deliveries_total: IntCounter,
    pub order_cancellations_total: IntCounter,
    pub distance_lookup_seconds: Histogram,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let orders_created_total =
            IntCounter::new("orders_created_total", "Total orders created")
                .expect("valid orders_created_total metric");

        let assignments_total = IntCounterVec::new(
            Opts::new("assignments_total", "Courier assignment attempts by outcome"),
            &["outcome"],
        )
        .expect("valid assignments_total metric");

        let order_deliveries_total =
            IntCounter::new("order_deliveries_total", "Total orders delivered")
                .expect("valid order_deliveries_total metric");

        let order_cancellations_total =
            IntCounter::new("order_cancellations_total", "Total orders canceled")
                .expect("valid order_cancellations_total metric");

        let distance_lookup_seconds = Histogram::with_opts(prometheus::HistogramOpts::new(
            "distance_lookup_seconds",
            "Latency of geocoding distance lookups in seconds",
        ))
        .expect("valid distance_lookup_seconds metric");

        registry
            .register(Box::new(orders_created_total.clone()))
            .expect("register orders_created_total");
        registry
            .register(Box::new(assignments_total.clone()))
            .expect("register assignments_total");
        registry
            .register(Box::new(order_deliveries_total.clone()))
            .expect("register order_deliveries_total");
        registry
            .register(Box::new(order_cancellations_total.clone()))
            .expect("register order_cancellations_total");
        registry
            .register(Box::new(distance_lookup_seconds.clone()))
            .expect("register distance_lookup_seconds");

        // The text encoder skips a counter vec with no children, so
        // materialize every outcome up front to keep scrapes stable.
        for outcome in ["success", "rejected"] {
            assignments_total.with_label_values(&[outcome]);
        }

        Self {
            registry,
            orders_created_total,
            assignments_total,
            order_deliveries_total,
            order_cancellations_total,
            distance_lookup_seconds,
        }
    }

    pub fn encode(&self) -> Result<String, String> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();

        TextEncoder::new()
            .encode(&metric_families, &mut buffer)
            .map_err(|err| format!("failed to encode metrics: {err}"))?;

        String::from_utf8(buffer).map_err(|err| format!("metrics are not valid utf8: {err}"))
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
