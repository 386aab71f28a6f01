//! Request handlers.
//!
//! A [`Handler`] is either synchronous or deferred.
//!
//! A synchronous handler is a function from [`&RequestContext`][RequestContext] to anything
//! that implement [`IntoOutcome`]:
//!
//! ```
//! use switchyard::{Handler, RequestContext};
//!
//! fn upload(ctx: &RequestContext) -> String {
//!     format!("You've sent: {}", ctx.body().as_str().unwrap_or_default())
//! }
//!
//! let handler = Handler::sync(upload);
//! ```
//!
//! A deferred handler receives a [`Completion`] and may answer after it returns, typically
//! from a spawned task:
//!
//! ```
//! use switchyard::Handler;
//!
//! let handler = Handler::deferred(|_ctx, completion| {
//!     tokio::spawn(async move {
//!         completion.complete("done later");
//!     });
//! });
//! ```
//!
//! [`Handler::future`] wraps an async function into a deferred handler.
use bytes::{Bytes, BytesMut};
use http::StatusCode;
use std::{fmt, sync::Arc};
use tokio::sync::oneshot;

use crate::{
    error::BoxError,
    log,
    request::RequestContext,
    response::{IntoResponse, ResponsePayload},
};

mod command;

pub use command::command;

/// Result of running a handler.
pub type Outcome = Result<ResponsePayload, BoxError>;

/// A unit of business logic bound to a path.
///
/// Cloning is cheap, the underlying function is shared.
#[derive(Clone)]
pub enum Handler {
    /// Returns the response directly.
    Sync(Arc<dyn SyncHandler>),
    /// Answers through a [`Completion`], possibly after returning.
    Deferred(Arc<dyn DeferredHandler>),
}

impl Handler {
    /// Create synchronous handler.
    pub fn sync<F, R>(f: F) -> Self
    where
        F: Fn(&RequestContext) -> R + Send + Sync + 'static,
        R: IntoOutcome,
    {
        Self::Sync(Arc::new(f))
    }

    /// Create deferred handler.
    pub fn deferred<F>(f: F) -> Self
    where
        F: Fn(Arc<RequestContext>, Completion) + Send + Sync + 'static,
    {
        Self::Deferred(Arc::new(f))
    }

    /// Create deferred handler from an async function.
    ///
    /// The returned future is spawned on the current runtime, it keeps running even if nobody
    /// waits for its result anymore.
    pub fn future<F, Fut>(f: F) -> Self
    where
        F: Fn(Arc<RequestContext>) -> Fut + Send + Sync + 'static,
        Fut: Future + Send + 'static,
        Fut::Output: IntoOutcome,
    {
        Self::deferred(move |ctx, completion| {
            let fut = f(ctx);
            tokio::spawn(async move {
                let outcome = fut.await;
                completion.finish(outcome);
            });
        })
    }

    /// Returns `true` if this is a [`Handler::Deferred`].
    pub fn is_deferred(&self) -> bool {
        matches!(self, Self::Deferred(_))
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sync(_) => f.write_str("Handler::Sync"),
            Self::Deferred(_) => f.write_str("Handler::Deferred"),
        }
    }
}

// ===== Sync =====

/// Handler that produce its response before returning.
pub trait SyncHandler: Send + Sync + 'static {
    fn call(&self, ctx: &RequestContext) -> Outcome;
}

impl<F, R> SyncHandler for F
where
    F: Fn(&RequestContext) -> R + Send + Sync + 'static,
    R: IntoOutcome,
{
    fn call(&self, ctx: &RequestContext) -> Outcome {
        self(ctx).into_outcome()
    }
}

// ===== Deferred =====

/// Handler that answer through a [`Completion`].
pub trait DeferredHandler: Send + Sync + 'static {
    fn call(&self, ctx: Arc<RequestContext>, completion: Completion);
}

impl<F> DeferredHandler for F
where
    F: Fn(Arc<RequestContext>, Completion) + Send + Sync + 'static,
{
    fn call(&self, ctx: Arc<RequestContext>, completion: Completion) {
        self(ctx, completion)
    }
}

/// One-shot response sink handed to a deferred handler.
///
/// Dropping it without answering is reported as a handler failure.
#[derive(Debug)]
pub struct Completion {
    tx: oneshot::Sender<Outcome>,
}

impl Completion {
    pub(crate) fn channel() -> (Self, oneshot::Receiver<Outcome>) {
        let (tx, rx) = oneshot::channel();
        (Self { tx }, rx)
    }

    /// Answer with a response.
    pub fn complete(self, response: impl IntoResponse) {
        self.send(Ok(response.into_response()));
    }

    /// Report failure, a 500 response is sent instead.
    pub fn fail(self, err: impl Into<BoxError>) {
        self.send(Err(err.into()));
    }

    /// Answer with either a response or a failure.
    pub fn finish(self, outcome: impl IntoOutcome) {
        self.send(outcome.into_outcome());
    }

    /// Returns `true` if the response is no longer awaited, because the request timed out
    /// or the connection is gone.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    fn send(self, outcome: Outcome) {
        if self.tx.send(outcome).is_err() {
            log::debug!("deferred response discarded, request no longer awaited");
        }
    }
}

// ===== IntoOutcome =====

/// A type that can be returned from a handler.
///
/// Implemented for every [`IntoResponse`] type, and for [`Result`] of those where the error
/// is reported as a handler failure.
pub trait IntoOutcome {
    fn into_outcome(self) -> Outcome;
}

impl<R, E> IntoOutcome for Result<R, E>
where
    R: IntoResponse,
    E: Into<BoxError>,
{
    fn into_outcome(self) -> Outcome {
        self.map(IntoResponse::into_response).map_err(Into::into)
    }
}

impl<R: IntoResponse> IntoOutcome for (StatusCode, R) {
    fn into_outcome(self) -> Outcome {
        Ok(self.into_response())
    }
}

macro_rules! outcome {
    ($($target:ty),* $(,)?) => {
        $(
            impl IntoOutcome for $target {
                fn into_outcome(self) -> Outcome {
                    Ok(self.into_response())
                }
            }
        )*
    };
}

outcome!(
    ResponsePayload,
    StatusCode,
    &'static str,
    String,
    &'static [u8],
    Vec<u8>,
    Bytes,
    BytesMut,
);
