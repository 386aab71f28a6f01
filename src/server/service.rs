use http::{HeaderValue, header::CONNECTION};
use http_body::Body;
use std::{convert::Infallible, pin::Pin, sync::Arc};

use crate::{
    body::{BodyAccumulator, Collect},
    config::Config,
    dispatch::dispatch,
    error::{BodyError, BoxError, ProtocolViolation},
    lifecycle::{Lifecycle, Phase},
    log,
    registry::HandlerRegistry,
    request::RequestContext,
    response::{IntoResponse, Response, ResponsePayload},
};

/// Drives a single request through its lifecycle.
///
/// Implements [`hyper::service::Service`], cloned once per connection.
#[derive(Debug, Clone)]
pub struct RequestDriver {
    registry: HandlerRegistry,
    config: Arc<Config>,
}

impl RequestDriver {
    pub fn new(registry: HandlerRegistry, config: Arc<Config>) -> Self {
        Self { registry, config }
    }

    /// Accumulate, route and dispatch one request.
    ///
    /// Never fails, every error is turned into a response.
    pub async fn drive<B>(&self, req: http::Request<B>) -> ResponsePayload
    where
        B: Body,
        B::Error: Into<BoxError>,
    {
        let mut lifecycle = Lifecycle::new();
        match self.try_drive(&mut lifecycle, req).await {
            Ok(res) => {
                lifecycle.close();
                res
            }
            Err(rejection) => {
                lifecycle.close();
                rejection.into_response()
            }
        }
    }

    async fn try_drive<B>(
        &self,
        lifecycle: &mut Lifecycle,
        req: http::Request<B>,
    ) -> Result<ResponsePayload, Rejection>
    where
        B: Body,
        B::Error: Into<BoxError>,
    {
        let (parts, body) = req.into_parts();
        let mut ctx = RequestContext::from_parts(&parts);
        log::info!("request for {} received", ctx.path());

        lifecycle.advance(Phase::Accumulating)?;
        let accumulator = BodyAccumulator::new(self.config.max_body_size, self.config.encoding);
        ctx.set_body(Collect::new(body, accumulator).await?);

        lifecycle.advance(Phase::Routed)?;
        let route = self.registry.route(ctx.path());

        lifecycle.advance(Phase::Dispatched)?;
        let res = dispatch(route, Arc::new(ctx), self.config.timeout()).await;

        lifecycle.advance(Phase::Responded)?;
        Ok(res)
    }
}

impl<B> hyper::service::Service<http::Request<B>> for RequestDriver
where
    B: Body + Send + 'static,
    B::Data: Send,
    B::Error: Into<BoxError>,
{
    type Response = Response;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Response, Infallible>> + Send>>;

    fn call(&self, req: http::Request<B>) -> Self::Future {
        let driver = self.clone();
        Box::pin(async move { Ok(driver.drive(req).await.into_http()) })
    }
}

/// Request rejected before reaching a handler.
enum Rejection {
    Body(BodyError),
    Protocol(ProtocolViolation),
}

impl From<BodyError> for Rejection {
    fn from(value: BodyError) -> Self {
        Self::Body(value)
    }
}

impl From<ProtocolViolation> for Rejection {
    fn from(value: ProtocolViolation) -> Self {
        Self::Protocol(value)
    }
}

impl IntoResponse for Rejection {
    fn into_response(self) -> ResponsePayload {
        match self {
            Self::Body(err) if err.is_protocol_violation() => abort(err.into_response()),
            Self::Body(err) => err.into_response(),
            Self::Protocol(err) => abort(err.into_response()),
        }
    }
}

/// Protocol violations end the connection after the response is written.
fn abort(res: ResponsePayload) -> ResponsePayload {
    res.header(CONNECTION, HeaderValue::from_static("close"))
}

#[cfg(test)]
mod test {
    use bytes::Bytes;
    use http::StatusCode;
    use http_body_util::Full;

    use super::*;
    use crate::handler::Handler;

    fn driver(config: Config) -> RequestDriver {
        let registry = HandlerRegistry::builder()
            .route("/upload", Handler::sync(|ctx: &RequestContext| {
                format!("You've sent: {}", ctx.body().as_str().unwrap_or_default())
            }))
            .build()
            .unwrap();
        RequestDriver::new(registry, Arc::new(config))
    }

    fn post(path: &str, body: &'static [u8]) -> http::Request<Full<Bytes>> {
        http::Request::post(path).body(Full::new(Bytes::from_static(body))).unwrap()
    }

    #[tokio::test]
    async fn drive_upload() {
        let res = driver(Config::default()).drive(post("/upload?x=1", b"hello")).await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.body, "You've sent: hello");
    }

    #[tokio::test]
    async fn drive_not_found() {
        let res = driver(Config::default()).drive(post("/upload/", b"hello")).await;
        assert_eq!(res.status, StatusCode::NOT_FOUND);
        assert_eq!(res.body, "404 - Not Found.");
    }

    #[tokio::test]
    async fn drive_body_too_large() {
        let res = driver(Config::default().max_body_size(4)).drive(post("/upload", b"hello")).await;
        assert_eq!(res.status, StatusCode::PAYLOAD_TOO_LARGE);
        assert!(res.headers.get(CONNECTION).is_none());
    }

    #[tokio::test]
    async fn drive_invalid_utf8() {
        let res = driver(Config::default()).drive(post("/upload", b"\xff\xfe")).await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn protocol_violation_closes_connection() {
        let violation = ProtocolViolation::InvalidTransition {
            from: Phase::Received,
            to: Phase::Dispatched,
        };
        let res = Rejection::from(violation).into_response();
        assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(res.headers[CONNECTION], "close");

        let res = Rejection::from(BodyError::ChunkAfterEnd).into_response();
        assert_eq!(res.status, StatusCode::BAD_REQUEST);
        assert_eq!(res.headers[CONNECTION], "close");

        let res = Rejection::from(BodyError::TooLarge { limit: 4 }).into_response();
        assert!(res.headers.get(CONNECTION).is_none());
    }
}
