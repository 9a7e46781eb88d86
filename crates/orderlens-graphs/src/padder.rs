//! Densifies sparse two-key tables for the animated views.

use orderlens_common::{MonthBucket, StateCode};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// One cell of a padded table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaddedCell<A, B> {
    /// Animation frame key.
    pub frame: A,
    /// Member drawn within the frame.
    pub member: B,
    pub value: f64,
    /// Set when `value` is the sentinel rather than data.
    pub padded: bool,
}

/// A (month, state) row of an animated view.
pub type MonthlyStateSummary = PaddedCell<MonthBucket, StateCode>;

/// Produces exactly one cell per distinct `(frame, member)` pair.
///
/// Pairs missing from `sparse` receive `sentinel` with `padded = true`.
/// Cells come out frame-major, both axes in ascending order; duplicate axis
/// values are collapsed first.
pub fn pad<A, B>(
    frames: &[A],
    members: &[B],
    sparse: &BTreeMap<(A, B), f64>,
    sentinel: f64,
) -> Vec<PaddedCell<A, B>>
where
    A: Ord + Clone,
    B: Ord + Clone,
{
    let frames: BTreeSet<&A> = frames.iter().collect();
    let members: BTreeSet<&B> = members.iter().collect();

    let mut cells = Vec::with_capacity(frames.len() * members.len());
    let mut filled = 0usize;
    for frame in &frames {
        for member in &members {
            let key = ((*frame).clone(), (*member).clone());
            let cell = match sparse.get(&key) {
                Some(value) => PaddedCell {
                    frame: key.0,
                    member: key.1,
                    value: *value,
                    padded: false,
                },
                None => {
                    filled += 1;
                    PaddedCell {
                        frame: key.0,
                        member: key.1,
                        value: sentinel,
                        padded: true,
                    }
                }
            };
            cells.push(cell);
        }
    }

    debug!(cells = cells.len(), padded = filled, "Padded sparse table");
    cells
}

/// Contiguous month axis spanning every key in `months`.
pub fn month_axis<'a>(months: impl IntoIterator<Item = &'a MonthBucket>) -> Vec<MonthBucket> {
    let mut iter = months.into_iter();
    let Some(first) = iter.next() else {
        return Vec::new();
    };
    let (start, end) = iter.fold((*first, *first), |(lo, hi), m| (lo.min(*m), hi.max(*m)));
    MonthBucket::range_inclusive(start, end)
}
