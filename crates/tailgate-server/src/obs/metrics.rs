//! Minimal metrics registry for the server.
//!
//! No metrics crate is used: counters, gauges and histograms are atomics keyed by a sorted
//! label vector in a `DashMap`, rendered in Prometheus text format by `/metrics`. Histogram
//! buckets are fixed in microseconds.

use std::fmt::Write;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering};
use std::time::Duration;

use dashmap::DashMap;

type LabelKey = Vec<(String, String)>;

fn label_key(labels: &[(&str, &str)]) -> LabelKey {
    let mut key: LabelKey = labels
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    key.sort();
    key
}

fn render_labels(key: &LabelKey) -> String {
    key.iter()
        .map(|(k, v)| {
            let v = v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n");
            format!("{k}=\"{v}\"")
        })
        .collect::<Vec<_>>()
        .join(",")
}

fn series(name: &str, labels: &str) -> String {
    if labels.is_empty() {
        name.to_string()
    } else {
        format!("{name}{{{labels}}}")
    }
}

#[derive(Default)]
pub struct CounterVec {
    map: DashMap<LabelKey, AtomicU64>,
}

impl CounterVec {
    pub fn inc(&self, labels: &[(&str, &str)]) {
        self.map
            .entry(label_key(labels))
            .or_insert_with(|| AtomicU64::new(0))
            .fetch_add(1, Ordering::Relaxed);
    }

    /// Current value for an exact label set (0 if never touched).
    pub fn get(&self, labels: &[(&str, &str)]) -> u64 {
        self.map
            .get(&label_key(labels))
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    fn render(&self, name: &str, out: &mut String) {
        let _ = writeln!(out, "# TYPE {name} counter");
        for r in self.map.iter() {
            let labels = render_labels(r.key());
            let value = r.value().load(Ordering::Relaxed);
            let _ = writeln!(out, "{} {value}", series(name, &labels));
        }
    }
}

/// Label-less gauge.
#[derive(Default)]
pub struct Gauge {
    value: AtomicI64,
}

impl Gauge {
    pub fn inc(&self) {
        self.value.fetch_add(1, Ordering::Relaxed);
    }
    pub fn dec(&self) {
        self.value.fetch_sub(1, Ordering::Relaxed);
    }
    pub fn get(&self) -> i64 {
        self.value.load(Ordering::Relaxed)
    }

    fn render(&self, name: &str, out: &mut String) {
        let _ = writeln!(out, "# TYPE {name} gauge\n{name} {}", self.get());
    }
}

// 100us, 500us, 1ms, 5ms, 10ms, 50ms, 100ms, 500ms, 1s
const BUCKETS_MICROS: [u64; 9] = [
    100, 500, 1_000, 5_000, 10_000, 50_000, 100_000, 500_000, 1_000_000,
];

#[derive(Default)]
struct AtomicHistogram {
    count: AtomicU64,
    sum: AtomicU64,
    buckets: [AtomicU64; BUCKETS_MICROS.len()],
}

#[derive(Default)]
pub struct HistogramVec {
    map: DashMap<LabelKey, AtomicHistogram>,
}

impl HistogramVec {
    pub fn observe(&self, labels: &[(&str, &str)], duration: Duration) {
        let hist = self.map.entry(label_key(labels)).or_default();
        let micros = u64::try_from(duration.as_micros()).unwrap_or(u64::MAX);

        hist.count.fetch_add(1, Ordering::Relaxed);
        hist.sum.fetch_add(micros, Ordering::Relaxed);
        for (i, &le) in BUCKETS_MICROS.iter().enumerate() {
            if micros <= le {
                hist.buckets[i].fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    fn render(&self, name: &str, out: &mut String) {
        let _ = writeln!(out, "# TYPE {name} histogram");
        for r in self.map.iter() {
            let labels = render_labels(r.key());
            let hist = r.value();
            let prefix = if labels.is_empty() { String::new() } else { format!("{labels},") };

            for (i, &le) in BUCKETS_MICROS.iter().enumerate() {
                let n = hist.buckets[i].load(Ordering::Relaxed);
                let _ = writeln!(out, "{name}_bucket{{{prefix}le=\"{le}\"}} {n}");
            }
            let count = hist.count.load(Ordering::Relaxed);
            let _ = writeln!(out, "{name}_bucket{{{prefix}le=\"+Inf\"}} {count}");
            let sum = hist.sum.load(Ordering::Relaxed);
            let _ = writeln!(out, "{} {sum}", series(&format!("{name}_sum"), &labels));
            let _ = writeln!(out, "{} {count}", series(&format!("{name}_count"), &labels));
        }
    }
}

#[derive(Default)]
pub struct GatewayMetrics {
    pub rpc_calls: CounterVec,
    pub rpc_duration: HistogramVec, // microseconds
    pub authz_decisions: CounterVec,
    pub tail_streams_active: Gauge,
    draining: AtomicBool,
}

impl GatewayMetrics {
    pub fn set_draining(&self) {
        self.draining.store(true, Ordering::Relaxed);
    }
    pub fn is_draining(&self) -> bool {
        self.draining.load(Ordering::Relaxed)
    }

    /// Render all registered metrics plus point-in-time values supplied by the caller.
    pub fn render(&self, extra: &[(&str, u64)]) -> String {
        let mut out = String::new();
        self.rpc_calls.render("tailgate_rpc_calls_total", &mut out);
        self.rpc_duration.render("tailgate_rpc_duration_micros", &mut out);
        self.authz_decisions.render("tailgate_authz_decisions_total", &mut out);
        self.tail_streams_active.render("tailgate_tail_streams_active", &mut out);

        let draining = u8::from(self.is_draining());
        let _ = writeln!(out, "# TYPE tailgate_draining gauge\ntailgate_draining {draining}");
        for (k, v) in extra {
            let _ = writeln!(out, "# TYPE {k} gauge\n{k} {v}");
        }
        out
    }
}
