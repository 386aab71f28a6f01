//! Error types.
use std::{io, str::Utf8Error};

use thiserror::Error;

use crate::{
    lifecycle::Phase,
    log,
    response::{IntoResponse, ResponsePayload},
};

/// Type-erased error returned by handlers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failure while assembling a [`HandlerRegistry`][crate::registry::HandlerRegistry].
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Two entries were registered under the same path.
    #[error("duplicate handler path: \"{0}\"")]
    DuplicatePath(String),
}

/// Failure while accumulating a request body.
#[derive(Debug, Error)]
pub enum BodyError {
    /// Accumulated body would exceed the configured maximum.
    #[error("body exceeds limit of {limit} bytes")]
    TooLarge { limit: usize },

    /// Chunk delivered after end-of-stream.
    #[error("body chunk received after end-of-stream")]
    ChunkAfterEnd,

    /// End-of-stream signalled twice.
    #[error("end-of-stream received twice")]
    EndAfterEnd,

    /// Body is not valid in the configured text encoding.
    #[error("body is not valid utf-8: {0}")]
    Decode(#[from] Utf8Error),

    /// Transport failed before end-of-stream, e.g. connection reset.
    #[error("transport error: {0}")]
    Transport(BoxError),
}

impl BodyError {
    /// Returns `true` if the error is a violation of the chunk/end ordering.
    pub fn is_protocol_violation(&self) -> bool {
        matches!(self, Self::ChunkAfterEnd | Self::EndAfterEnd)
    }
}

/// Illegal step in a request lifecycle.
#[derive(Debug, Error)]
pub enum ProtocolViolation {
    #[error("invalid lifecycle transition from {from:?} to {to:?}")]
    InvalidTransition { from: Phase, to: Phase },
}

/// Failure at the dispatch boundary.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Deferred handler did not complete within the configured window.
    #[error("handler did not complete within {0:?}")]
    HandlerTimeout(std::time::Duration),

    /// Handler returned an error, panicked, or dropped its completion.
    #[error("handler failed: {0}")]
    HandlerFailure(BoxError),
}

/// Failure while loading a [`Config`][crate::config::Config].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Fatal error while starting the server.
#[derive(Debug, Error)]
pub enum StartError {
    #[error("failed to build runtime: {0}")]
    Runtime(io::Error),

    #[error("failed to bind \"{addr}\": {source}")]
    Bind { addr: String, source: io::Error },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

// ===== IntoResponse =====

impl IntoResponse for BodyError {
    fn into_response(self) -> ResponsePayload {
        match self {
            Self::TooLarge { .. } => {
                log::debug!("{self}");
                ResponsePayload::payload_too_large()
            }
            Self::Transport(_) => {
                log::debug!("{self}");
                ResponsePayload::bad_request()
            }
            Self::Decode(_) => ResponsePayload::bad_request(),
            Self::ChunkAfterEnd | Self::EndAfterEnd => {
                log::error!("protocol violation: {self}");
                ResponsePayload::bad_request()
            }
        }
    }
}

impl IntoResponse for ProtocolViolation {
    fn into_response(self) -> ResponsePayload {
        log::error!("protocol violation: {self}");
        ResponsePayload::internal_error()
    }
}
