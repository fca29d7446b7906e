use crate::wide_long::{Event, Interval};

/// Smallest and largest non-negative offset across all interval bounds and events.
///
/// Negative offsets (before the reference) and `NaN` are left out, matching what a renderer
/// shows on the time axis. `None` when nothing qualifies.
pub fn time_extent(intervals: &[Interval], events: &[Event]) -> Option<(f64, f64)> {
    intervals
        .iter()
        .flat_map(|i| [i.start, i.end])
        .chain(events.iter().map(|e| e.event))
        .filter(|t| *t >= 0.0)
        .fold(None, |acc, t| match acc {
            None => Some((t, t)),
            Some((lo, hi)) => Some((lo.min(t), hi.max(t))),
        })
}
