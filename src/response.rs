//! HTTP response payload.
use bytes::Bytes;
use http::{HeaderMap, HeaderValue, StatusCode, header::CONTENT_TYPE};
use http_body_util::Full;

mod into_response;

/// Response as handed to the transport.
pub type Response = http::Response<Full<Bytes>>;

/// A type that can be converted into [`ResponsePayload`].
///
/// This trait is used as handler return type.
pub trait IntoResponse {
    fn into_response(self) -> ResponsePayload;
}

/// A fully specified response: status, headers and body.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponsePayload {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

const TEXT_PLAIN: HeaderValue = HeaderValue::from_static("text/plain");

impl ResponsePayload {
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self { status, headers: HeaderMap::new(), body: body.into() }
    }

    /// `text/plain` response.
    pub fn text(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self::new(status, body).header(CONTENT_TYPE, TEXT_PLAIN)
    }

    /// Append a header.
    pub fn header(mut self, name: http::HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    /// The fixed response for unmatched paths.
    pub fn not_found() -> Self {
        Self::text(StatusCode::NOT_FOUND, "404 - Not Found.")
    }

    pub fn internal_error() -> Self {
        Self::text(StatusCode::INTERNAL_SERVER_ERROR, "500 - Internal Server Error.")
    }

    pub fn gateway_timeout() -> Self {
        Self::text(StatusCode::GATEWAY_TIMEOUT, "504 - Gateway Timeout.")
    }

    pub fn payload_too_large() -> Self {
        Self::text(StatusCode::PAYLOAD_TOO_LARGE, "413 - Payload Too Large.")
    }

    pub fn bad_request() -> Self {
        Self::text(StatusCode::BAD_REQUEST, "400 - Bad Request.")
    }

    /// Convert into transport response.
    pub fn into_http(self) -> Response {
        let mut res = Response::new(Full::new(self.body));
        *res.status_mut() = self.status;
        *res.headers_mut() = self.headers;
        res
    }
}

impl From<ResponsePayload> for Response {
    fn from(value: ResponsePayload) -> Self {
        value.into_http()
    }
}
