//! Request body accumulation.
//!
//! A request body arrives as a sequence of chunks. [`BodyAccumulator`] appends them in arrival
//! order into one growable buffer and produces a [`CompletedBody`] at end-of-stream.
//! [`Collect`] drives any [`http_body::Body`] into an accumulator.
//!
//! ```
//! use switchyard::body::BodyAccumulator;
//! use switchyard::config::Encoding;
//!
//! let mut acc = BodyAccumulator::new(1024, Encoding::Utf8);
//! acc.on_chunk(&b"ab"[..]).unwrap();
//! acc.on_chunk(&b"cd"[..]).unwrap();
//!
//! let body = acc.on_end().unwrap();
//! assert_eq!(body, "abcd");
//! ```
use bytes::Bytes;

mod accumulator;
mod collect;

pub use accumulator::BodyAccumulator;
pub use collect::Collect;

/// A finished request body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletedBody {
    bytes: Bytes,
    text: Option<String>,
}

impl CompletedBody {
    /// Create an empty body.
    pub fn empty() -> Self {
        Self { bytes: Bytes::new(), text: Some(String::new()) }
    }

    /// Create body from text.
    pub fn text(text: impl Into<String>) -> Self {
        let text = text.into();
        Self { bytes: Bytes::copy_from_slice(text.as_bytes()), text: Some(text) }
    }

    /// Create body without text representation.
    pub fn binary(bytes: impl Into<Bytes>) -> Self {
        Self { bytes: bytes.into(), text: None }
    }

    pub(crate) fn decoded(bytes: Bytes, text: Option<String>) -> Self {
        Self { bytes, text }
    }

    /// Raw body bytes as received.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Decoded text, `None` when the body was accumulated as binary.
    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        self.text.as_deref()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn into_bytes(self) -> Bytes {
        self.bytes
    }
}

impl PartialEq<str> for CompletedBody {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == Some(other)
    }
}

impl PartialEq<&str> for CompletedBody {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == Some(*other)
    }
}
