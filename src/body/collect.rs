use http_body::Body;
use std::{
    pin::Pin,
    task::{Context, Poll, ready},
};

use super::{BodyAccumulator, CompletedBody};
use crate::error::{BodyError, BoxError};

pin_project_lite::pin_project! {
    /// Future that drives a body stream into a [`BodyAccumulator`].
    ///
    /// Data frames are appended in arrival order, trailers are ignored. Resolves when the
    /// stream signals end-of-stream.
    #[derive(Debug)]
    pub struct Collect<B> {
        #[pin]
        body: B,
        accumulator: BodyAccumulator,
    }
}

impl<B: Body> Collect<B> {
    pub fn new(body: B, mut accumulator: BodyAccumulator) -> Self {
        let size_hint = body.size_hint();
        accumulator.reserve(size_hint.upper().unwrap_or(size_hint.lower()));
        Self { body, accumulator }
    }
}

impl<B> Future for Collect<B>
where
    B: Body,
    B::Error: Into<BoxError>,
{
    type Output = Result<CompletedBody, BodyError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut me = self.project();

        loop {
            let Some(frame) = ready!(me.body.as_mut().poll_frame(cx)) else {
                return Poll::Ready(me.accumulator.on_end());
            };

            let frame = frame.map_err(|err| BodyError::Transport(err.into()))?;

            if let Ok(data) = frame.into_data() {
                me.accumulator.on_chunk(data)?;
            }
        }
    }
}
