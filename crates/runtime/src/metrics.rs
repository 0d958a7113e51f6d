use std::collections::BTreeMap;

/// Counters, gauges and value ranges accumulated across draw passes.
///
/// Keys are dotted names such as `render.spans`; sorted maps keep the
/// summary in a stable order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Metrics {
    counters: BTreeMap<String, u64>,
    gauges: BTreeMap<String, i64>,
    ranges: BTreeMap<String, ValueRange>,
}

/// Count, total and extremes of the values recorded under one name.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct ValueRange {
    pub count: u64,
    pub sum: i64,
    pub min: i64,
    pub max: i64,
}

impl ValueRange {
    pub fn record(&mut self, value: i64) {
        if self.count == 0 {
            (self.min, self.max) = (value, value);
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);
        }
        self.count += 1;
        self.sum += value;
    }

    pub fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum as f64 / self.count as f64)
    }
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn counter(&self, name: &str) -> u64 {
        self.counters.get(name).copied().unwrap_or(0)
    }

    pub fn inc_counter(&mut self, name: &str, by: u64) {
        match self.counters.get_mut(name) {
            Some(v) => *v += by,
            None => {
                self.counters.insert(name.to_string(), by);
            }
        }
    }

    pub fn gauge(&self, name: &str) -> Option<i64> {
        self.gauges.get(name).copied()
    }

    pub fn set_gauge(&mut self, name: &str, value: i64) {
        self.gauges.insert(name.to_string(), value);
    }

    pub fn record(&mut self, name: &str, value: i64) {
        if let Some(r) = self.ranges.get_mut(name) {
            r.record(value);
            return;
        }
        let mut r = ValueRange::default();
        r.record(value);
        self.ranges.insert(name.to_string(), r);
    }

    pub fn range(&self, name: &str) -> Option<ValueRange> {
        self.ranges.get(name).copied()
    }

    /// One `name=value` line per counter and gauge, then
    /// `name=min..max (n)` per recorded range.
    pub fn summary(&self) -> String {
        let mut lines: Vec<String> = Vec::new();
        lines.extend(self.counters.iter().map(|(k, v)| format!("{k}={v}")));
        lines.extend(self.gauges.iter().map(|(k, v)| format!("{k}={v}")));
        lines.extend(
            self.ranges
                .iter()
                .map(|(k, r)| format!("{k}={}..{} ({})", r.min, r.max, r.count)),
        );
        let mut out = lines.join("\n");
        if !out.is_empty() {
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::Metrics;

    #[test]
    fn counters_accumulate_and_gauges_overwrite() {
        let mut m = Metrics::new();
        m.inc_counter("render.spans", 3);
        m.inc_counter("render.spans", 2);
        m.set_gauge("render.frame", 1);
        m.set_gauge("render.frame", 2);
        assert_eq!(m.counter("render.spans"), 5);
        assert_eq!(m.counter("render.shapes_skipped"), 0);
        assert_eq!(m.gauge("render.frame"), Some(2));
        assert_eq!(m.gauge("render.width"), None);
    }

    #[test]
    fn ranges_track_extremes() {
        let mut m = Metrics::new();
        for v in [5, -2, 7] {
            m.record("row.crossings", v);
        }
        let r = m.range("row.crossings").unwrap();
        assert_eq!((r.count, r.sum, r.min, r.max), (3, 10, -2, 7));
        assert!((r.mean().unwrap() - 10.0 / 3.0).abs() < 1e-12);
        assert!(m.range("missing").is_none());
    }

    #[test]
    fn summary_is_sorted_by_name() {
        let mut m = Metrics::new();
        assert_eq!(m.summary(), "");
        m.inc_counter("b", 1);
        m.inc_counter("a", 2);
        m.set_gauge("g", -1);
        m.record("r", 4);
        assert_eq!(m.summary(), "a=2\nb=1\ng=-1\nr=4..4 (1)\n");
    }
}
