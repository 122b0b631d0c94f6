//! Process-wide Prometheus counters for the money flows.

use once_cell::sync::Lazy;
use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

pub static REGISTRY: Lazy<Registry> = Lazy::new(Registry::new);

static PAYMENTS: Lazy<IntCounterVec> = Lazy::new(|| {
    let c = IntCounterVec::new(
        Opts::new("servicedir_payments_total", "Payment attempts by method and outcome"),
        &["method", "outcome"],
    )
    .expect("valid payment counter opts");
    let _ = REGISTRY.register(Box::new(c.clone()));
    c
});

static WALLET_OPS: Lazy<IntCounterVec> = Lazy::new(|| {
    let c = IntCounterVec::new(
        Opts::new("servicedir_wallet_ops_total", "Wallet ledger entries by kind"),
        &["kind"],
    )
    .expect("valid wallet counter opts");
    let _ = REGISTRY.register(Box::new(c.clone()));
    c
});

static INVOICES: Lazy<IntCounter> = Lazy::new(|| {
    let c = IntCounter::new("servicedir_invoices_total", "Invoices issued")
        .expect("valid invoice counter opts");
    let _ = REGISTRY.register(Box::new(c.clone()));
    c
});

pub fn record_payment(method: &str, outcome: &str) {
    PAYMENTS.with_label_values(&[method, outcome]).inc();
}

pub fn record_wallet_op(kind: &str) {
    WALLET_OPS.with_label_values(&[kind]).inc();
}

pub fn record_invoice() {
    INVOICES.inc();
}

/// Render all registered metrics in the Prometheus text format.
pub fn gather_text() -> String {
    // touch lazies so families show up even before the first event
    Lazy::force(&PAYMENTS);
    Lazy::force(&WALLET_OPS);
    Lazy::force(&INVOICES);
    let mut buf = Vec::new();
    let encoder = TextEncoder::new();
    if encoder.encode(&REGISTRY.gather(), &mut buf).is_err() {
        return String::new();
    }
    String::from_utf8(buf).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_show_up_in_text_output() {
        record_payment("wallet", "succeeded");
        record_wallet_op("debit");
        record_invoice();
        let text = gather_text();
        assert!(text.contains("servicedir_payments_total"));
        assert!(text.contains("method=\"wallet\""));
        assert!(text.contains("servicedir_wallet_ops_total"));
        assert!(text.contains("servicedir_invoices_total"));
    }
}
