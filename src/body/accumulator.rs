use bytes::{Buf, BufMut, BytesMut};

use super::CompletedBody;
use crate::{config::Encoding, error::BodyError, log};

/// Buffers the body chunks of one request.
///
/// Accumulation is append-only and ordered. Once [`on_end`] is called, any further chunk is a
/// protocol violation.
///
/// [`on_end`]: BodyAccumulator::on_end
#[derive(Debug)]
pub struct BodyAccumulator {
    buffer: BytesMut,
    limit: usize,
    encoding: Encoding,
    chunks: usize,
    state: State,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Accumulating,
    Ended,
}

impl BodyAccumulator {
    /// Create accumulator that fails once more than `limit` bytes are received.
    pub fn new(limit: usize, encoding: Encoding) -> Self {
        Self {
            buffer: BytesMut::new(),
            limit,
            encoding,
            chunks: 0,
            state: State::Accumulating,
        }
    }

    /// Reserve buffer capacity from a transport size hint, bounded by the limit.
    pub fn reserve(&mut self, size_hint: u64) {
        let hint = usize::try_from(size_hint).unwrap_or(usize::MAX);
        self.buffer.reserve(hint.min(self.limit));
    }

    /// Append one chunk.
    pub fn on_chunk<B: Buf>(&mut self, chunk: B) -> Result<(), BodyError> {
        if self.state == State::Ended {
            return Err(BodyError::ChunkAfterEnd);
        }

        let len = chunk.remaining();
        if self.buffer.len().saturating_add(len) > self.limit {
            return Err(BodyError::TooLarge { limit: self.limit });
        }

        self.buffer.put(chunk);
        self.chunks += 1;
        log::debug!("received body chunk #{} of {len} bytes", self.chunks);
        Ok(())
    }

    /// Finish accumulation and decode the body.
    pub fn on_end(&mut self) -> Result<CompletedBody, BodyError> {
        if self.state == State::Ended {
            return Err(BodyError::EndAfterEnd);
        }
        self.state = State::Ended;

        let bytes = self.buffer.split().freeze();
        let text = match self.encoding {
            Encoding::Utf8 => Some(std::str::from_utf8(&bytes)?.to_owned()),
            Encoding::Latin1 => Some(bytes.iter().map(|&b| char::from(b)).collect()),
            Encoding::Binary => None,
        };

        Ok(CompletedBody::decoded(bytes, text))
    }

    /// Bytes accumulated so far.
    #[inline]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Returns `true` after [`on_end`][BodyAccumulator::on_end] was called.
    #[inline]
    pub fn is_ended(&self) -> bool {
        self.state == State::Ended
    }
}
