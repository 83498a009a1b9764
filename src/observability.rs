use std::net::SocketAddr;

// ── Store traffic ───────────────────────────────────────────────

/// Counter: calls into the booking store. Labels: op, status.
pub const STORE_CALLS_TOTAL: &str = "slotdesk_store_calls_total";

/// Histogram: full reload (fetch + cache swap) latency in seconds.
pub const RELOAD_DURATION_SECONDS: &str = "slotdesk_reload_duration_seconds";

/// Counter: client history lookups that reached the store. Labels: status.
pub const HISTORY_LOOKUPS_TOTAL: &str = "slotdesk_history_lookups_total";

// ── Derived views ───────────────────────────────────────────────

/// Counter: bookings left out of a slot grid because the slot was full.
pub const GRID_OVERFLOW_TOTAL: &str = "slotdesk_grid_overflow_total";

/// Install Prometheus metrics exporter on the given port. No-op if port is None.
pub fn init(port: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let Some(port) = port else { return Ok(()) };
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;
    tracing::info!("metrics endpoint: http://0.0.0.0:{port}/metrics");
    Ok(())
}
