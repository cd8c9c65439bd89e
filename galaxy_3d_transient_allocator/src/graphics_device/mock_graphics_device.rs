/// Mock graphics device objects for unit tests (no GPU required)
///
/// Native textures/buffers/views that only record their debug name, plus
/// counters shared with the test so factory calls and destructions can be
/// asserted.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use super::{Buffer, CommandContext, CommandLambda, ResourceView, Texture, ViewKind};

// ============================================================================
// Counters
// ============================================================================

/// Shared creation/destruction counters
#[derive(Debug, Default)]
pub struct MockCounters {
    created: AtomicUsize,
    dropped: AtomicUsize,
}

impl MockCounters {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    pub fn dropped(&self) -> usize {
        self.dropped.load(Ordering::SeqCst)
    }

    /// Objects created and not yet destroyed
    pub fn alive(&self) -> usize {
        self.created() - self.dropped()
    }
}

// ============================================================================
// Mock Texture
// ============================================================================

#[derive(Debug)]
pub struct MockTexture {
    pub name: String,
    pub heap_offset: u64,
    counters: Arc<MockCounters>,
}

impl MockTexture {
    pub fn new(heap_offset: u64, counters: &Arc<MockCounters>) -> Self {
        counters.created.fetch_add(1, Ordering::SeqCst);
        Self {
            name: String::new(),
            heap_offset,
            counters: counters.clone(),
        }
    }
}

impl Texture for MockTexture {
    fn set_debug_name(&mut self, name: &str) {
        self.name = name.to_string();
    }
}

impl Drop for MockTexture {
    fn drop(&mut self) {
        self.counters.dropped.fetch_add(1, Ordering::SeqCst);
    }
}

// ============================================================================
// Mock Buffer
// ============================================================================

#[derive(Debug)]
pub struct MockBuffer {
    pub name: String,
    pub heap_offset: u64,
    counters: Arc<MockCounters>,
}

impl MockBuffer {
    pub fn new(heap_offset: u64, counters: &Arc<MockCounters>) -> Self {
        counters.created.fetch_add(1, Ordering::SeqCst);
        Self {
            name: String::new(),
            heap_offset,
            counters: counters.clone(),
        }
    }
}

impl Buffer for MockBuffer {
    fn set_debug_name(&mut self, name: &str) {
        self.name = name.to_string();
    }
}

impl Drop for MockBuffer {
    fn drop(&mut self) {
        self.counters.dropped.fetch_add(1, Ordering::SeqCst);
    }
}

// ============================================================================
// Mock View
// ============================================================================

#[derive(Debug)]
pub struct MockView {
    pub kind: ViewKind,
}

impl ResourceView for MockView {
    fn kind(&self) -> ViewKind {
        self.kind
    }
}

// ============================================================================
// Mock Command Context
// ============================================================================

/// Command context that holds lambdas until `execute` is called
#[derive(Default)]
pub struct DeferredCommandContext {
    pending: Vec<CommandLambda>,
}

impl DeferredCommandContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Run every queued lambda in submission order
    pub fn execute(&mut self) {
        for lambda in self.pending.drain(..) {
            lambda();
        }
    }
}

impl CommandContext for DeferredCommandContext {
    fn enqueue_lambda(&mut self, lambda: CommandLambda) {
        self.pending.push(lambda);
    }
}
