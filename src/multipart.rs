use std::{
    pin::Pin,
    task::{Context, Poll},
};

use bytes::Bytes;
use futures::Stream;

use crate::{parser::stream::MultipartStream, ExtractError, ParseError, Part};

/// High-level multipart stream: the boundary reader for one nesting level.
#[derive(Debug)]
pub struct Multipart<S> {
    inner: MultipartStream<S>,
    boundary: String,
}

impl<S> Multipart<S> {
    /// Creates a multipart stream from an already extracted boundary and a chunk source.
    pub fn new(boundary: impl Into<String>, stream: S) -> Result<Self, ParseError> {
        let boundary = boundary.into();
        Ok(Self {
            inner: MultipartStream::new(boundary.clone(), stream)?,
            boundary,
        })
    }

    /// Boundary token of this level.
    pub fn boundary(&self) -> &str {
        &self.boundary
    }
}

impl<S> Multipart<S>
where
    S: Stream<Item = Result<Bytes, ExtractError>> + Unpin,
{
    /// Pulls the next part, `Ok(None)` once the closing boundary was consumed.
    pub async fn next_part(&mut self) -> Result<Option<Part>, ExtractError> {
        futures::StreamExt::next(self).await.transpose()
    }
}

impl<S> Stream for Multipart<S>
where
    S: Stream<Item = Result<Bytes, ExtractError>> + Unpin,
{
    type Item = Result<Part, ExtractError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        match Pin::new(&mut self.inner).poll_next(cx) {
            Poll::Ready(Some(Ok(parsed))) => Poll::Ready(Some(Ok(Part::from_parsed(parsed)))),
            Poll::Ready(Some(Err(err))) => Poll::Ready(Some(Err(err))),
            Poll::Ready(None) => Poll::Ready(None),
            Poll::Pending => Poll::Pending,
        }
    }
}
