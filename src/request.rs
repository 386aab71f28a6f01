//! HTTP request context.
use http::{HeaderMap, Method, request::Parts};

use crate::body::CompletedBody;

/// Represents one inbound HTTP request.
///
/// Created by the transport from the request head, its body is set once by the request
/// driver after the [`BodyAccumulator`][crate::body::BodyAccumulator] finishes. Handlers only
/// ever see it by shared reference.
#[derive(Debug)]
pub struct RequestContext {
    method: Method,
    path: String,
    query: Option<String>,
    headers: HeaderMap,
    body: CompletedBody,
}

impl RequestContext {
    /// Create context with empty body.
    ///
    /// `target` is the raw request target, it is normalized with [`normalize_path`].
    pub fn new(method: Method, target: &str, headers: HeaderMap) -> Self {
        let query = target
            .split_once('#')
            .map_or(target, |(target, _)| target)
            .split_once('?')
            .map(|(_, query)| query.to_string());

        Self {
            method,
            path: normalize_path(target).to_string(),
            query,
            headers,
            body: CompletedBody::empty(),
        }
    }

    /// Create context from [`http`] request parts.
    pub fn from_parts(parts: &Parts) -> Self {
        let target = match parts.uri.path_and_query() {
            Some(pq) => pq.as_str(),
            None => parts.uri.path(),
        };
        Self::new(parts.method.clone(), target, parts.headers.clone())
    }

    /// Finalize the request body.
    pub(crate) fn set_body(&mut self, body: CompletedBody) {
        self.body = body;
    }

    /// Attach a body, used to build contexts outside the transport.
    pub fn with_body(mut self, body: CompletedBody) -> Self {
        self.set_body(body);
        self
    }

    #[inline]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Normalized path, without query string or fragment.
    #[inline]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Raw query string, if any.
    #[inline]
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    #[inline]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Completed request body, empty for requests without one.
    #[inline]
    pub fn body(&self) -> &CompletedBody {
        &self.body
    }
}

/// Strip query string and fragment from a request target.
///
/// Trailing slashes are kept, `/upload/` and `/upload` are different paths.
///
/// ```
/// use switchyard::request::normalize_path;
///
/// assert_eq!(normalize_path("/upload?id=4#top"), "/upload");
/// assert_eq!(normalize_path("/upload/"), "/upload/");
/// assert_eq!(normalize_path(""), "");
/// ```
pub fn normalize_path(target: &str) -> &str {
    let end = target.find(['?', '#']).unwrap_or(target.len());
    &target[..end]
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("/"), "/");
        assert_eq!(normalize_path("/start"), "/start");
        assert_eq!(normalize_path("/start?"), "/start");
        assert_eq!(normalize_path("/start#frag?not-query"), "/start");
        assert_eq!(normalize_path("?only=query"), "");
        assert_eq!(normalize_path("/a/b/"), "/a/b/");
    }

    #[test]
    fn test_context_from_target() {
        let ctx = RequestContext::new(Method::GET, "/upload?name=foo#bar", HeaderMap::new());
        assert_eq!(ctx.method(), Method::GET);
        assert_eq!(ctx.path(), "/upload");
        assert_eq!(ctx.query(), Some("name=foo"));
        assert!(ctx.body().is_empty());

        let ctx = RequestContext::new(Method::POST, "/upload#a?b", HeaderMap::new());
        assert_eq!(ctx.query(), None);
    }

    #[test]
    fn test_context_from_parts() {
        let (parts, _) = http::Request::builder()
            .method(Method::POST)
            .uri("http://localhost:8888/upload?x=1")
            .header("content-type", "text/plain")
            .body(())
            .unwrap()
            .into_parts();

        let ctx = RequestContext::from_parts(&parts);
        assert_eq!(ctx.method(), Method::POST);
        assert_eq!(ctx.path(), "/upload");
        assert_eq!(ctx.query(), Some("x=1"));
        assert_eq!(ctx.headers()["content-type"], "text/plain");
    }
}
