use super::*;
use crate::graphics_device::mock_graphics_device::DeferredCommandContext;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn counting_lambda(counter: &Arc<AtomicUsize>) -> CommandLambda {
    let counter = counter.clone();
    Box::new(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    })
}

#[test]
fn test_immediate_context_runs_on_enqueue() {
    let counter = Arc::new(AtomicUsize::new(0));
    let mut context = ImmediateCommandContext::new();

    context.enqueue_lambda(counting_lambda(&counter));
    assert_eq!(counter.load(Ordering::SeqCst), 1);

    context.enqueue_lambda(counting_lambda(&counter));
    assert_eq!(counter.load(Ordering::SeqCst), 2);
    assert_eq!(context.executed_count(), 2);
}

#[test]
fn test_deferred_context_waits_for_execute() {
    let counter = Arc::new(AtomicUsize::new(0));
    let mut context = DeferredCommandContext::new();

    context.enqueue_lambda(counting_lambda(&counter));
    context.enqueue_lambda(counting_lambda(&counter));
    assert_eq!(counter.load(Ordering::SeqCst), 0);
    assert_eq!(context.pending_count(), 2);

    context.execute();

    assert_eq!(counter.load(Ordering::SeqCst), 2);
    assert_eq!(context.pending_count(), 0);
}

#[test]
fn test_context_usable_as_trait_object() {
    let counter = Arc::new(AtomicUsize::new(0));
    let mut immediate = ImmediateCommandContext::new();
    let context: &mut dyn CommandContext = &mut immediate;

    context.enqueue_lambda(counting_lambda(&counter));

    assert_eq!(counter.load(Ordering::SeqCst), 1);
}
