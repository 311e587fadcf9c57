//! One-shot result delivery for submitted work.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::oneshot;

/// What a worker sends back: the processor result, or the payload of a
/// panic raised while producing it.
pub(crate) type ItemResult<T, E> = std::thread::Result<Result<T, E>>;

/// Future returned by [`AdaptiveWorkerPool::submit`](super::AdaptiveWorkerPool::submit).
///
/// Resolves to exactly the `Result` the processor produced. If the processor
/// panicked, the panic is resumed in the task awaiting the submission.
///
/// Dropping a submission does not cancel the work item; it still runs and
/// its result is discarded. A work item that is never serviced (the runtime
/// shut down underneath it) leaves its submission pending forever.
pub struct Submission<T, E> {
    rx: oneshot::Receiver<ItemResult<T, E>>,
}

impl<T, E> Submission<T, E> {
    pub(crate) fn new(rx: oneshot::Receiver<ItemResult<T, E>>) -> Self {
        Self { rx }
    }
}

impl<T, E> Future for Submission<T, E> {
    type Output = Result<T, E>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.rx).poll(cx) {
            Poll::Ready(Ok(Ok(result))) => Poll::Ready(result),
            Poll::Ready(Ok(Err(panic))) => std::panic::resume_unwind(panic),
            // Sink dropped unfulfilled: nothing will ever complete this item
            Poll::Ready(Err(_)) => Poll::Pending,
            Poll::Pending => Poll::Pending,
        }
    }
}

impl<T, E> std::fmt::Debug for Submission<T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Submission").finish_non_exhaustive()
    }
}
