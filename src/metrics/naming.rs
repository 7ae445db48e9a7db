//! Meter name conventions
//!
//! Dotted meter names (`http.server.requests`) become Prometheus names
//! (`http_server_requests_total`).

/// Kind of meter, decides the unit/type suffix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeterKind {
    Counter,
    Gauge,
    Histogram,
    Timer,
}

impl MeterKind {
    fn suffix(self) -> Option<&'static str> {
        match self {
            MeterKind::Counter => Some("_total"),
            MeterKind::Timer => Some("_seconds"),
            MeterKind::Gauge | MeterKind::Histogram => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MeterKind::Counter => "counter",
            MeterKind::Gauge => "gauge",
            MeterKind::Histogram => "histogram",
            MeterKind::Timer => "timer",
        }
    }
}

/// Replace every character outside `[a-zA-Z0-9_:]` with `_`.
/// A leading digit gets an `_` prefix.
pub fn sanitize(name: &str) -> String {
    let mut out: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == ':' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if out.is_empty() || out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}

/// Label names only allow `[a-zA-Z0-9_]`
pub fn sanitize_label(name: &str) -> String {
    sanitize(name).replace(':', "_")
}

/// Full Prometheus name for a meter
pub fn prometheus_name(namespace: Option<&str>, name: &str, kind: MeterKind) -> String {
    let mut full = match namespace {
        Some(ns) if !ns.is_empty() => format!("{}_{}", sanitize(ns), sanitize(name)),
        _ => sanitize(name),
    };
    if let Some(suffix) = kind.suffix()
        && !full.ends_with(suffix)
    {
        full.push_str(suffix);
    }
    full
}
