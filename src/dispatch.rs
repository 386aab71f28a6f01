//! Handler dispatch.
//!
//! The dispatch boundary contains every per request failure: a failing, panicking or slow
//! handler results in an error response, never in an error escaping to the transport.
use std::{
    panic::{AssertUnwindSafe, catch_unwind},
    sync::Arc,
    time::Duration,
};

use crate::{
    error::{BoxError, DispatchError},
    handler::{Completion, Handler},
    log,
    request::RequestContext,
    response::ResponsePayload,
    router::Route,
};

/// Dispatch a routed request.
///
/// [`Route::NotFound`] yields [`ResponsePayload::not_found`]. Handler failures are logged and
/// turned into a 500 response, a deferred handler exceeding `timeout` into a 504 response.
pub async fn dispatch(
    route: Route<'_>,
    ctx: Arc<RequestContext>,
    timeout: Duration,
) -> ResponsePayload {
    let handler = match route {
        Route::Found(handler) => handler,
        Route::NotFound => {
            log::debug!("no request handler found for {}", ctx.path());
            return ResponsePayload::not_found();
        }
    };

    match try_dispatch(handler, ctx.clone(), timeout).await {
        Ok(res) => res,
        Err(err @ DispatchError::HandlerTimeout(_)) => {
            log::warning!("{} {}: {err}", ctx.method(), ctx.path());
            ResponsePayload::gateway_timeout()
        }
        Err(err @ DispatchError::HandlerFailure(_)) => {
            log::error!("{} {}: {err}", ctx.method(), ctx.path());
            ResponsePayload::internal_error()
        }
    }
}

/// Invoke a handler and wait for its response.
///
/// Synchronous handlers run inline. Deferred handlers are awaited for at most `timeout`, their
/// background work is not cancelled when the timeout elapses.
pub async fn try_dispatch(
    handler: &Handler,
    ctx: Arc<RequestContext>,
    timeout: Duration,
) -> Result<ResponsePayload, DispatchError> {
    match handler {
        Handler::Sync(f) => {
            let outcome = catch_unwind(AssertUnwindSafe(|| f.call(&ctx))).map_err(panicked)?;
            outcome.map_err(DispatchError::HandlerFailure)
        }
        Handler::Deferred(f) => {
            let (completion, rx) = Completion::channel();
            catch_unwind(AssertUnwindSafe(|| f.call(ctx, completion))).map_err(panicked)?;

            match tokio::time::timeout(timeout, rx).await {
                Ok(Ok(outcome)) => outcome.map_err(DispatchError::HandlerFailure),
                Ok(Err(_)) => Err(DispatchError::HandlerFailure(
                    "deferred handler dropped its completion without responding".into(),
                )),
                Err(_) => Err(DispatchError::HandlerTimeout(timeout)),
            }
        }
    }
}

fn panicked(payload: Box<dyn std::any::Any + Send>) -> DispatchError {
    let msg: BoxError = match payload.downcast::<String>() {
        Ok(msg) => format!("handler panicked: {msg}").into(),
        Err(payload) => match payload.downcast::<&'static str>() {
            Ok(msg) => format!("handler panicked: {msg}").into(),
            Err(_) => "handler panicked".into(),
        },
    };
    DispatchError::HandlerFailure(msg)
}
