//! GPS segments for data availability.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Half-open `[start, end)` GPS interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Segment {
    /// Start (inclusive), GPS seconds
    pub start: i64,
    /// End (exclusive), GPS seconds
    pub end: i64,
}

impl Segment {
    /// Create a segment.
    #[must_use]
    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    /// Length in seconds.
    #[must_use]
    pub fn duration(&self) -> i64 {
        self.end - self.start
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} ... {})", self.start, self.end)
    }
}

impl From<(i64, i64)> for Segment {
    fn from((start, end): (i64, i64)) -> Self {
        Self::new(start, end)
    }
}

/// Ordered list of segments for one channel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SegmentList(Vec<Segment>);

impl SegmentList {
    /// An empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a segment.
    pub fn push(&mut self, segment: Segment) {
        self.0.push(segment);
    }

    /// Iterate over the segments.
    pub fn iter(&self) -> std::slice::Iter<'_, Segment> {
        self.0.iter()
    }

    /// Number of segments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if there are no segments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sort and merge touching or overlapping segments.
    #[must_use]
    pub fn coalesce(mut self) -> Self {
        self.0.sort_unstable();
        let mut merged: Vec<Segment> = Vec::with_capacity(self.0.len());
        for segment in self.0 {
            match merged.last_mut() {
                Some(last) if segment.start <= last.end => {
                    last.end = last.end.max(segment.end);
                }
                _ => merged.push(segment),
            }
        }
        Self(merged)
    }

    /// Total covered time in seconds (segments are summed as given).
    #[must_use]
    pub fn total_duration(&self) -> i64 {
        self.0.iter().map(Segment::duration).sum()
    }
}

impl FromIterator<Segment> for SegmentList {
    fn from_iter<I: IntoIterator<Item = Segment>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for SegmentList {
    type Item = Segment;
    type IntoIter = std::vec::IntoIter<Segment>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a SegmentList {
    type Item = &'a Segment;
    type IntoIter = std::slice::Iter<'a, Segment>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
