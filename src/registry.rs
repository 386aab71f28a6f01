//! Path to handler mapping.
use std::{collections::HashMap, sync::Arc};

use crate::{error::RegistryError, handler::Handler, router::Route};

/// Immutable mapping from exact path to [`Handler`].
///
/// Built once at startup with [`HandlerRegistry::builder`] or
/// [`HandlerRegistry::from_entries`]. There is no way to mutate it afterwards, clones share
/// the same table.
///
/// ```
/// use switchyard::{Handler, HandlerRegistry, RequestContext};
///
/// fn start(_: &RequestContext) -> &'static str {
///     "Hello Start"
/// }
///
/// let registry = HandlerRegistry::builder()
///     .route("/", Handler::sync(start))
///     .route("/start", Handler::sync(start))
///     .build()
///     .unwrap();
///
/// assert_eq!(registry.len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct HandlerRegistry {
    routes: Arc<HashMap<String, Handler>>,
}

impl HandlerRegistry {
    /// Start building a registry.
    pub fn builder() -> Builder {
        Builder { entries: Vec::new() }
    }

    /// Build registry from `(path, handler)` entries.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicatePath`] if two entries share the same path.
    pub fn from_entries<I, P>(entries: I) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = (P, Handler)>,
        P: Into<String>,
    {
        let mut routes = HashMap::new();

        for (path, handler) in entries {
            let path = canonical(path.into());
            if routes.contains_key(&path) {
                return Err(RegistryError::DuplicatePath(path));
            }
            routes.insert(path, handler);
        }

        Ok(Self { routes: Arc::new(routes) })
    }

    /// Lookup handler by exact path.
    ///
    /// An empty path looks up `/`.
    pub fn route(&self, path: &str) -> Route<'_> {
        match self.routes.get(canonical_ref(path)) {
            Some(handler) => Route::Found(handler),
            None => Route::NotFound,
        }
    }

    /// Registered paths, in no particular order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.routes.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// [`HandlerRegistry`] builder.
#[derive(Debug)]
pub struct Builder {
    entries: Vec<(String, Handler)>,
}

impl Builder {
    /// Register handler for path.
    pub fn route(mut self, path: impl Into<String>, handler: Handler) -> Self {
        self.entries.push((path.into(), handler));
        self
    }

    /// Finish the registry.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicatePath`] if a path was registered twice.
    pub fn build(self) -> Result<HandlerRegistry, RegistryError> {
        HandlerRegistry::from_entries(self.entries)
    }
}

fn canonical(path: String) -> String {
    if path.is_empty() { "/".to_string() } else { path }
}

fn canonical_ref(path: &str) -> &str {
    if path.is_empty() { "/" } else { path }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::request::RequestContext;

    fn hello(_: &RequestContext) -> &'static str {
        "Hello World"
    }

    #[test]
    fn duplicate_path() {
        let result = HandlerRegistry::builder()
            .route("/", Handler::sync(hello))
            .route("/upload", Handler::sync(hello))
            .route("/upload", Handler::sync(hello))
            .build();

        assert!(matches!(result, Err(RegistryError::DuplicatePath(p)) if p == "/upload"));
    }

    #[test]
    fn empty_path_is_root() {
        let result = HandlerRegistry::from_entries([
            ("/", Handler::sync(hello)),
            ("", Handler::sync(hello)),
        ]);
        assert!(matches!(result, Err(RegistryError::DuplicatePath(p)) if p == "/"));

        let registry = HandlerRegistry::from_entries([("", Handler::sync(hello))]).unwrap();
        assert!(registry.route("/").is_found());
        assert!(registry.route("").is_found());
    }

    #[test]
    fn clones_share_table() {
        let registry = HandlerRegistry::from_entries([("/start", Handler::sync(hello))]).unwrap();
        let clone = registry.clone();
        assert!(Arc::ptr_eq(&registry.routes, &clone.routes));
        assert_eq!(clone.paths().collect::<Vec<_>>(), ["/start"]);
        assert!(!clone.is_empty());
    }
}
