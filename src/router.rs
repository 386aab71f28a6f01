//! Request routing.
//!
//! Routing decides which [`Handler`] should handle the current request. Lookup is an exact
//! string match on the normalized path:
//!
//! - `""` is looked up as `/`
//! - trailing slashes are significant, `/upload/` does not match `/upload`
//! - a missing route is a [`Route::NotFound`], not an error
use crate::{handler::Handler, registry::HandlerRegistry};

/// Result of a route lookup.
#[derive(Debug, Clone, Copy)]
pub enum Route<'a> {
    Found(&'a Handler),
    NotFound,
}

impl<'a> Route<'a> {
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    pub fn handler(self) -> Option<&'a Handler> {
        match self {
            Self::Found(handler) => Some(handler),
            Self::NotFound => None,
        }
    }
}

/// Lookup the handler bound to `path`.
///
/// `path` must already be normalized, see [`normalize_path`].
///
/// [`normalize_path`]: crate::request::normalize_path
pub fn route<'a>(registry: &'a HandlerRegistry, path: &str) -> Route<'a> {
    registry.route(path)
}
