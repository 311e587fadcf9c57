//! Work processor abstraction.
//!
//! The pool does not know what a unit of work is. It hands each input to a
//! [`WorkProcessor`] and delivers whatever that produces back to the caller.
//!
//! # Example
//!
//! ```rust,ignore
//! use render_autoscale::processor::processor_fn;
//!
//! let double = processor_fn(|x: u32| async move { Ok::<_, String>(x * 2) });
//! ```

use std::future::Future;
use std::marker::PhantomData;

use async_trait::async_trait;

/// Trait for the asynchronous function a pool drives.
///
/// Implementations may succeed, fail, or take arbitrarily long. The pool
/// neither retries nor transforms failures.
#[async_trait]
pub trait WorkProcessor: Send + Sync + 'static {
    /// Payload supplied by the caller.
    type Input: Send + 'static;

    /// Value produced on success.
    type Output: Send + 'static;

    /// Error produced on failure.
    type Error: Send + 'static;

    /// Processes one input.
    async fn process(&self, input: Self::Input) -> Result<Self::Output, Self::Error>;

    /// Returns the name of this processor for logging purposes.
    fn name(&self) -> &'static str {
        "processor"
    }
}

/// Processor backed by an async closure.
pub struct FnProcessor<F, In, Fut> {
    f: F,
    _marker: PhantomData<fn(In) -> Fut>,
}

impl<F, In, Fut> FnProcessor<F, In, Fut> {
    pub fn new(f: F) -> Self {
        Self {
            f,
            _marker: PhantomData,
        }
    }
}

/// Wraps a closure returning a future of `Result` into a [`WorkProcessor`].
pub fn processor_fn<F, In, Fut, Out, E>(f: F) -> FnProcessor<F, In, Fut>
where
    F: Fn(In) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Out, E>> + Send + 'static,
{
    FnProcessor::new(f)
}

#[async_trait]
impl<F, In, Fut, Out, E> WorkProcessor for FnProcessor<F, In, Fut>
where
    F: Fn(In) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Out, E>> + Send + 'static,
    In: Send + 'static,
    Out: Send + 'static,
    E: Send + 'static,
{
    type Input = In;
    type Output = Out;
    type Error = E;

    async fn process(&self, input: In) -> Result<Out, E> {
        (self.f)(input).await
    }

    fn name(&self) -> &'static str {
        "fn"
    }
}
