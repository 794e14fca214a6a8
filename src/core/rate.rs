//! Cumulative counter to per-second rate transform
//!
//! Counters from the module only ever grow. A pair of samples that breaks
//! that (counter reset on module restart) or whose timestamps do not move
//! forward produces a NaN rate, which the chart leaves as a gap.

use serde_json::Value;

use super::window::Sample;

/// One point of a derived rate series
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RatePoint {
    /// Receipt time of the later sample of the pair (ms)
    pub t: f64,
    /// Units per second, NaN when the pair cannot be differenced
    pub rate: f64,
}

impl RatePoint {
    pub fn is_plottable(&self) -> bool {
        self.rate.is_finite()
    }
}

/// Path to a numeric counter inside the stats payload,
/// e.g. `["Total", "Incoming", "Bytes"]`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CounterPath(pub &'static [&'static str]);

impl CounterPath {
    /// Read the counter, NaN if it is missing or not a number
    pub fn read(&self, payload: &Value) -> f64 {
        self.0
            .iter()
            .try_fold(payload, |node, key| node.get(*key))
            .and_then(Value::as_f64)
            .unwrap_or(f64::NAN)
    }
}

/// Rate between two consecutive counter readings.
///
/// Returns NaN for a decreasing counter and for a time delta that is not
/// strictly positive.
pub fn pair_rate(prev: f64, curr: f64, prev_t: f64, curr_t: f64) -> f64 {
    let delta = curr - prev;
    let time_delta = curr_t - prev_t;
    if delta < 0.0 || time_delta <= 0.0 {
        return f64::NAN;
    }
    delta * 1000.0 / time_delta
}

/// Derive a rate series with one point per sample.
///
/// The first point is always NaN: there is nothing to difference it with.
pub fn rate_series<'a, I, F>(samples: I, counter: F) -> Vec<RatePoint>
where
    I: IntoIterator<Item = &'a Sample>,
    F: Fn(&Value) -> f64,
{
    let mut out = Vec::new();
    let mut prev: Option<(f64, f64)> = None;

    for sample in samples {
        let value = counter(&sample.payload);
        let rate = match prev {
            Some((prev_value, prev_t)) => pair_rate(prev_value, value, prev_t, sample.captured_at),
            None => f64::NAN,
        };
        out.push(RatePoint {
            t: sample.captured_at,
            rate,
        });
        prev = Some((value, sample.captured_at));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    const BYTES: CounterPath = CounterPath(&["Total", "Incoming", "Bytes"]);

    fn samples(points: &[(f64, f64)]) -> Vec<Sample> {
        points
            .iter()
            .map(|&(t, c)| Sample::new(t, json!({ "Total": { "Incoming": { "Bytes": c } } })))
            .collect()
    }

    fn rates(points: &[(f64, f64)]) -> Vec<f64> {
        rate_series(&samples(points), |p| BYTES.read(p))
            .into_iter()
            .map(|p| p.rate)
            .collect()
    }

    #[test]
    fn counter_path_reads_nested_numbers() {
        let payload = json!({ "Total": { "Incoming": { "Bytes": 1234 } } });
        assert_eq!(BYTES.read(&payload), 1234.0);
    }

    #[test]
    fn counter_path_missing_is_nan() {
        assert!(BYTES.read(&json!({ "Total": {} })).is_nan());
        assert!(BYTES.read(&json!({ "Total": { "Incoming": { "Bytes": "x" } } })).is_nan());
        assert!(BYTES.read(&json!(null)).is_nan());
    }

    #[test]
    fn empty_input_gives_empty_series() {
        let none: Vec<Sample> = Vec::new();
        assert!(rate_series(&none, |p| BYTES.read(p)).is_empty());
    }

    #[test]
    fn steady_traffic() {
        let r = rates(&[(0.0, 0.0), (2000.0, 1000.0), (4000.0, 3000.0)]);
        assert!(r[0].is_nan());
        assert_eq!(r[1], 500.0);
        assert_eq!(r[2], 1000.0);
    }

    #[test]
    fn counter_reset_is_not_plotted() {
        let r = rates(&[(0.0, 100.0), (1000.0, 40.0)]);
        assert!(r[0].is_nan());
        assert!(r[1].is_nan());
    }

    #[test]
    fn misordered_timestamps_are_not_plotted() {
        let r = rates(&[(1000.0, 10.0), (500.0, 20.0)]);
        assert!(r[1].is_nan());
    }

    #[test]
    fn identical_timestamps_are_not_plotted() {
        let r = rates(&[(1000.0, 10.0), (1000.0, 20.0)]);
        assert!(r[1].is_nan());
    }

    #[test]
    fn traffic_resumes_after_reset() {
        let r = rates(&[(0.0, 500.0), (1000.0, 10.0), (2000.0, 110.0)]);
        assert!(r[1].is_nan());
        assert_eq!(r[2], 100.0);
    }

    #[test]
    fn timestamps_follow_samples() {
        let series = rate_series(&samples(&[(10.0, 0.0), (20.0, 1.0)]), |p| BYTES.read(p));
        assert_eq!(series[0].t, 10.0);
        assert_eq!(series[1].t, 20.0);
        assert!(!series[0].is_plottable());
        assert!(series[1].is_plottable());
    }

    proptest! {
        #[test]
        fn one_point_per_sample_first_is_nan(
            points in proptest::collection::vec((0u32..1_000_000, 0u32..1_000_000), 0..64),
        ) {
            let points: Vec<(f64, f64)> =
                points.into_iter().map(|(t, c)| (t as f64, c as f64)).collect();
            let r = rates(&points);
            prop_assert_eq!(r.len(), points.len());
            if let Some(first) = r.first() {
                prop_assert!(first.is_nan());
            }
        }

        #[test]
        fn monotonic_pairs_use_exact_formula(
            steps in proptest::collection::vec((1u32..10_000, 0u32..1_000_000), 1..64),
        ) {
            let mut points = vec![(0.0, 0.0)];
            for (dt, dc) in &steps {
                let (t, c) = *points.last().unwrap();
                points.push((t + *dt as f64, c + *dc as f64));
            }
            let r = rates(&points);
            for i in 1..points.len() {
                let expected =
                    (points[i].1 - points[i - 1].1) * 1000.0 / (points[i].0 - points[i - 1].0);
                prop_assert_eq!(r[i], expected);
            }
        }

        #[test]
        fn regressions_are_always_nan(
            t0 in 0u32..1_000_000,
            dt in 1u32..10_000,
            c1 in 0u32..1_000_000,
            drop in 1u32..1_000_000,
        ) {
            let c0 = c1 as f64 + drop as f64;
            let r = rates(&[(t0 as f64, c0), (t0 as f64 + dt as f64, c1 as f64)]);
            prop_assert!(r[1].is_nan());
        }

        #[test]
        fn non_increasing_time_is_always_nan(
            t1 in 0u32..1_000_000,
            back in 0u32..10_000,
            c0 in 0u32..1_000_000,
            dc in 0u32..1_000_000,
        ) {
            let t0 = t1 as f64 + back as f64;
            let r = rates(&[(t0, c0 as f64), (t1 as f64, c0 as f64 + dc as f64)]);
            prop_assert!(r[1].is_nan());
        }
    }
}
