//! Minimal HTTP Dispatch Server
//!
//! Requests are routed by exact path match against an immutable [`HandlerRegistry`], their
//! body is fully accumulated before the matching [`Handler`] is invoked. Unmatched paths get a
//! fixed `404 - Not Found.` response.
//!
//! ```no_run
//! use switchyard::{Handler, HandlerRegistry, RequestContext};
//!
//! fn upload(ctx: &RequestContext) -> String {
//!     format!("You've sent: {}", ctx.body().as_str().unwrap_or_default())
//! }
//!
//! let registry = HandlerRegistry::builder()
//!     .route("/upload", Handler::sync(upload))
//!     .route("/ls", switchyard::handler::command("ls", ["-lah"]))
//!     .build()
//!     .unwrap();
//!
//! switchyard::start(registry, 8888).unwrap();
//! ```
#![warn(missing_debug_implementations)]

mod log;

pub mod body;
pub mod config;
pub mod error;
pub mod request;
pub mod response;

pub mod handler;
pub mod registry;
pub mod router;

pub mod dispatch;
pub mod lifecycle;
pub mod server;

pub use config::Config;
pub use error::{BodyError, DispatchError, RegistryError, StartError};
pub use handler::{Completion, Handler};
pub use registry::HandlerRegistry;
pub use request::RequestContext;
pub use response::{IntoResponse, ResponsePayload};
pub use router::{Route, route};
pub use server::{Server, start};
