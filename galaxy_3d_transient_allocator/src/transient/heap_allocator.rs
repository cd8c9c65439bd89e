/// First-fit free-list allocator over one transient heap.
///
/// Only computes byte offsets; it owns no GPU memory and no resources.
/// Free ranges are kept sorted by offset, disjoint and never adjacent
/// (touching ranges are always merged).

const SOURCE: &str = "galaxy3d::transient::HeapAllocator";

/// Round `value` up to a multiple of `alignment` (a power of two)
#[inline]
pub fn align_up(value: u64, alignment: u64) -> u64 {
    debug_assert!(alignment.is_power_of_two());
    (value + alignment - 1) & !(alignment - 1)
}

/// Round `value` down to a multiple of `alignment` (a power of two)
#[inline]
pub fn align_down(value: u64, alignment: u64) -> u64 {
    debug_assert!(alignment.is_power_of_two());
    value & !(alignment - 1)
}

/// One placement inside a heap
///
/// Produced by `HeapAllocator::allocate` and consumed by the matching
/// `HeapAllocator::deallocate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeapAllocation {
    /// Requested size in bytes
    pub size: u64,
    /// Aligned byte offset of the placement
    pub offset: u64,
    /// Slack bytes consumed between the end of the placement and the end of
    /// the free range it was carved from
    pub alignment_pad: u64,
    /// Index of the heap in the owning allocator session
    pub heap_index: u32,
}

impl HeapAllocation {
    /// Bytes removed from the free list by this placement (size + pad)
    pub fn footprint(&self) -> u64 {
        self.size + self.alignment_pad
    }

    /// One past the last byte of the placement
    pub fn end(&self) -> u64 {
        self.offset + self.size
    }
}

/// A free byte range `[offset, offset + size)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreeRange {
    pub offset: u64,
    pub size: u64,
}

impl FreeRange {
    pub fn end(&self) -> u64 {
        self.offset + self.size
    }
}

/// First-fit allocator for one heap of fixed capacity and alignment
#[derive(Debug)]
pub struct HeapAllocator {
    capacity: u64,
    alignment: u32,
    heap_index: u32,
    /// Sorted by offset, never adjacent
    free_ranges: Vec<FreeRange>,
    used_size: u64,
    alignment_waste: u64,
    allocation_count: u32,
}

impl HeapAllocator {
    /// Create an allocator with the whole heap free
    ///
    /// # Arguments
    ///
    /// * `capacity` - Heap size in bytes
    /// * `alignment` - Minimum alignment of every placement (power of two)
    /// * `heap_index` - Index stamped on every allocation record
    pub fn new(capacity: u64, alignment: u32, heap_index: u32) -> Self {
        debug_assert!(alignment.is_power_of_two(), "heap alignment must be a power of two");
        debug_assert!(capacity > 0, "heap capacity must be greater than zero");

        Self {
            capacity,
            alignment,
            heap_index,
            free_ranges: vec![FreeRange { offset: 0, size: capacity }],
            used_size: 0,
            alignment_waste: 0,
            allocation_count: 0,
        }
    }

    /// Place `size` bytes with at least `alignment` (raised to the heap alignment)
    ///
    /// Walks the free list front to back and takes the first range that can
    /// hold an aligned placement. The placement goes at the highest aligned
    /// offset of that range, so the leftover free space stays at the front.
    ///
    /// Returns `None` when no free range is large enough; the caller is
    /// expected to try another heap.
    pub fn allocate(&mut self, size: u64, alignment: u32) -> Option<HeapAllocation> {
        if size == 0 || size > self.capacity {
            return None;
        }
        debug_assert!(alignment == 0 || alignment.is_power_of_two(),
            "allocation alignment {} is not a power of two", alignment);
        let alignment = alignment.max(self.alignment) as u64;

        let index = self.free_ranges.iter().position(|range| {
            range.size >= size && align_down(range.end() - size, alignment) >= range.offset
        })?;

        let range = self.free_ranges[index];
        let offset = align_down(range.end() - size, alignment);
        let alignment_pad = range.end() - (offset + size);
        let leftover = offset - range.offset;

        if leftover == 0 {
            self.free_ranges.remove(index);
        } else {
            self.free_ranges[index].size = leftover;
        }

        self.used_size += size + alignment_pad;
        self.alignment_waste += alignment_pad;
        self.allocation_count += 1;
        self.validate();

        Some(HeapAllocation {
            size,
            offset,
            alignment_pad,
            heap_index: self.heap_index,
        })
    }

    /// Return a placement to the free list, merging with adjacent free ranges
    pub fn deallocate(&mut self, allocation: HeapAllocation) {
        debug_assert_eq!(allocation.heap_index, self.heap_index,
            "allocation belongs to heap {}, not {}", allocation.heap_index, self.heap_index);
        debug_assert!(self.allocation_count > 0, "deallocate called on an empty heap");

        let start = allocation.offset;
        let size = allocation.footprint();
        let end = start + size;

        if size > self.used_size {
            crate::engine_error!(SOURCE,
                "Deallocating {} bytes but only {} are in use (double free or stale allocation?)",
                size, self.used_size);
            debug_assert!(false, "heap allocator underflow");
            return;
        }

        let index = self.free_ranges.partition_point(|range| range.offset < start);

        debug_assert!(index == 0 || self.free_ranges[index - 1].end() <= start,
            "deallocated range overlaps the preceding free range");
        debug_assert!(index == self.free_ranges.len() || end <= self.free_ranges[index].offset,
            "deallocated range overlaps the following free range");

        let merge_left = index > 0 && self.free_ranges[index - 1].end() == start;
        let merge_right = index < self.free_ranges.len() && self.free_ranges[index].offset == end;

        match (merge_left, merge_right) {
            (true, true) => {
                let right = self.free_ranges.remove(index);
                self.free_ranges[index - 1].size += size + right.size;
            }
            (true, false) => {
                self.free_ranges[index - 1].size += size;
            }
            (false, true) => {
                let right = &mut self.free_ranges[index];
                right.offset = start;
                right.size += size;
            }
            (false, false) => {
                self.free_ranges.insert(index, FreeRange { offset: start, size });
            }
        }

        self.used_size -= size;
        self.alignment_waste -= allocation.alignment_pad;
        self.allocation_count -= 1;
        self.validate();
    }

    // ===== ACCESSORS =====

    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    pub fn alignment(&self) -> u32 {
        self.alignment
    }

    pub fn heap_index(&self) -> u32 {
        self.heap_index
    }

    /// Bytes in use, alignment slack included
    pub fn used_size(&self) -> u64 {
        self.used_size
    }

    /// Bytes lost to alignment across live allocations
    pub fn alignment_waste(&self) -> u64 {
        self.alignment_waste
    }

    pub fn allocation_count(&self) -> u32 {
        self.allocation_count
    }

    /// Sum of all free ranges
    pub fn free_size(&self) -> u64 {
        self.free_ranges.iter().map(|range| range.size).sum()
    }

    pub fn free_range_count(&self) -> usize {
        self.free_ranges.len()
    }

    pub fn free_ranges(&self) -> &[FreeRange] {
        &self.free_ranges
    }

    /// Whether no allocation is live
    pub fn is_empty(&self) -> bool {
        self.allocation_count == 0
    }

    // ===== VALIDATION =====

    #[cfg(any(debug_assertions, feature = "heap-validation"))]
    fn validate(&self) {
        let free_size = self.free_size();
        assert_eq!(free_size + self.used_size, self.capacity,
            "free ({}) + used ({}) does not match heap capacity ({})",
            free_size, self.used_size, self.capacity);

        for range in &self.free_ranges {
            assert!(range.size > 0, "empty free range at offset {}", range.offset);
        }
        for pair in self.free_ranges.windows(2) {
            assert!(pair[0].end() < pair[1].offset,
                "free ranges [{}, {}) and [{}, {}) are unsorted, overlapping or unmerged",
                pair[0].offset, pair[0].end(), pair[1].offset, pair[1].end());
        }
    }

    #[cfg(not(any(debug_assertions, feature = "heap-validation")))]
    #[inline(always)]
    fn validate(&self) {}
}

impl Drop for HeapAllocator {
    fn drop(&mut self) {
        if self.allocation_count != 0 && !std::thread::panicking() {
            crate::engine_error!(SOURCE,
                "Heap allocator {} destroyed with {} live allocations ({} bytes)",
                self.heap_index, self.allocation_count, self.used_size);
            debug_assert!(false, "heap allocator destroyed with live allocations");
        }
    }
}

#[cfg(test)]
#[path = "heap_allocator_tests.rs"]
mod tests;
