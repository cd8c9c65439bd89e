/// Command context used to defer work until a session's commands are recorded

/// Deferred work queued on a command context
pub type CommandLambda = Box<dyn FnOnce() + Send + 'static>;

/// Command context handed to `ResourceAllocator::freeze`
///
/// The transient allocator only needs to run a callback once every command
/// currently recorded for the session has been recorded.
pub trait CommandContext {
    /// Enqueue a callback to run after all currently recorded commands
    fn enqueue_lambda(&mut self, lambda: CommandLambda);
}

/// Command context that runs every lambda as soon as it is enqueued
///
/// Useful when no GPU timeline exists (tools, tests, headless runs).
#[derive(Debug, Default)]
pub struct ImmediateCommandContext {
    executed: usize,
}

impl ImmediateCommandContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of lambdas run so far
    pub fn executed_count(&self) -> usize {
        self.executed
    }
}

impl CommandContext for ImmediateCommandContext {
    fn enqueue_lambda(&mut self, lambda: CommandLambda) {
        lambda();
        self.executed += 1;
    }
}

#[cfg(test)]
#[path = "command_context_tests.rs"]
mod tests;
