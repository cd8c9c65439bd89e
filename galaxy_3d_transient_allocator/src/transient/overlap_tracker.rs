/// Aliasing-overlap bookkeeping for one heap.
///
/// Keeps the byte ranges last occupied by each resource placed on the heap
/// during a session, sorted by start offset. Tracking a new placement
/// reports every resource whose last known range it overlaps, then carves
/// that overlap out of the older ranges. Ranges of deallocated resources stay
/// in the list: their bytes may still hold data the new resource aliases.

use super::transient_resource::TransientResourceId;

/// A resource whose memory was (partly) reused by a newer resource
///
/// Recorded on the newer resource only: the consumer must synchronize with
/// `resource` before the newer resource is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AliasingOverlap {
    pub resource: TransientResourceId,
}

/// Last known byte range `[offset_min, offset_max)` of one resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackedRange {
    pub resource: TransientResourceId,
    pub offset_min: u64,
    pub offset_max: u64,
}

/// Sorted list of tracked ranges for one heap
#[derive(Debug, Default)]
pub struct OverlapTracker {
    ranges: Vec<TrackedRange>,
}

impl OverlapTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a new placement and return the resources it aliases
    ///
    /// Existing ranges fully covered by `[offset_min, offset_max)` are
    /// removed, ranges overlapping one side are trimmed to the new boundary,
    /// and a range containing the new one is split in two.
    pub fn track(
        &mut self,
        resource: TransientResourceId,
        offset_min: u64,
        offset_max: u64,
    ) -> Vec<AliasingOverlap> {
        debug_assert!(offset_min < offset_max, "empty tracked range");

        let mut overlaps = Vec::new();
        let mut index = 0;

        while index < self.ranges.len() {
            let range = self.ranges[index];

            if range.offset_max <= offset_min {
                index += 1;
                continue;
            }
            // Sorted by offset_min: nothing further can overlap
            if range.offset_min >= offset_max {
                break;
            }

            // A split range shows up once per half
            if !overlaps.iter().any(|overlap: &AliasingOverlap| overlap.resource == range.resource) {
                overlaps.push(AliasingOverlap { resource: range.resource });
            }

            let covers_low = range.offset_min >= offset_min;
            let covers_high = range.offset_max <= offset_max;

            match (covers_low, covers_high) {
                (true, true) => {
                    self.ranges.remove(index);
                }
                (false, false) => {
                    self.ranges[index].offset_max = offset_min;
                    self.ranges.insert(index + 1, TrackedRange {
                        resource: range.resource,
                        offset_min: offset_max,
                        offset_max: range.offset_max,
                    });
                    index += 2;
                }
                (false, true) => {
                    self.ranges[index].offset_max = offset_min;
                    index += 1;
                }
                (true, false) => {
                    self.ranges[index].offset_min = offset_max;
                    index += 1;
                }
            }
        }

        let insert_at = self.ranges.partition_point(|range| range.offset_min < offset_min);
        self.ranges.insert(insert_at, TrackedRange { resource, offset_min, offset_max });

        overlaps
    }

    pub fn ranges(&self) -> &[TrackedRange] {
        &self.ranges
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}

#[cfg(test)]
#[path = "overlap_tracker_tests.rs"]
mod tests;
