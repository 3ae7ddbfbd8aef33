use once_cell::sync::Lazy;
use prometheus::{register_histogram, register_int_counter_vec, Histogram, IntCounterVec};
use std::time::Instant;

pub static AUTH_FAILURES: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "auth_failures_total",
        "Authenticator failures skipped while resolving the request user",
        &["mechanism"]
    ).unwrap()
});

pub static GEO_LOOKUPS: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "geo_lookups_total",
        "Login location lookups by outcome",
        &["outcome"]
    ).unwrap()
});

pub static GEO_LATENCY: Lazy<Histogram> = Lazy::new(|| {
    register_histogram!(
        "geo_lookup_seconds",
        "Login location lookup latency in seconds",
        vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.0, 5.0]
    ).unwrap()
});

/// Registers every collector up front so `/metrics` lists them before first use.
pub fn init_metrics() {
    Lazy::force(&AUTH_FAILURES);
    Lazy::force(&GEO_LOOKUPS);
    Lazy::force(&GEO_LATENCY);
}

pub fn record_auth_failure(mechanism: &str) {
    AUTH_FAILURES.with_label_values(&[mechanism]).inc();
}

pub fn record_geo_lookup(outcome: &'static str, start: Instant) {
    GEO_LOOKUPS.with_label_values(&[outcome]).inc();
    GEO_LATENCY.observe(start.elapsed().as_secs_f64());
}
