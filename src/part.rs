use std::{
    pin::Pin,
    task::{Context, Poll},
};

use bytes::Bytes;
use futures::Stream;
use http::HeaderMap;

use crate::{
    decode::TransferEncoding,
    parser::headers::{ParsedPartHeaders, PartContentType},
    parser::stream::ParsedPart,
    ExtractError, ParseError,
};

/// One boundary-delimited MIME part.
///
/// The body can be taken exactly once, either whole ([`Part::bytes`]) or as a
/// one-shot stream ([`Part::stream`]) feeding a nested multipart reader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    /// Parsed part headers.
    pub headers: ParsedPartHeaders,
    body: Option<Bytes>,
}

impl Part {
    /// Creates a high-level part from a low-level parsed part.
    pub(crate) fn from_parsed(parsed: ParsedPart) -> Self {
        Self {
            headers: parsed.headers,
            body: Some(parsed.body),
        }
    }

    /// Returns the explicit file name declared in `Content-Disposition`.
    pub fn file_name(&self) -> Option<&str> {
        self.headers.file_name.as_deref()
    }

    /// Returns the part content type state.
    pub fn content_type(&self) -> &PartContentType {
        &self.headers.content_type
    }

    /// Returns the parsed media type, if the part declared a valid one.
    pub fn mime(&self) -> Option<&mime::Mime> {
        self.headers.content_type.mime()
    }

    /// Returns the resolved transfer encoding.
    pub fn transfer_encoding(&self) -> TransferEncoding {
        self.headers.transfer_encoding
    }

    /// Returns all raw part headers.
    pub fn raw_headers(&self) -> &HeaderMap {
        &self.headers.raw
    }

    /// Returns the remaining body size hint in bytes.
    pub fn size_hint(&self) -> usize {
        self.body.as_ref().map_or(0, Bytes::len)
    }

    /// Takes the full raw (still encoded) part body.
    pub fn bytes(&mut self) -> Result<Bytes, ExtractError> {
        self.take_body()
    }

    /// Returns a one-shot body stream for this part.
    pub fn stream(&mut self) -> Result<PartBodyStream, ExtractError> {
        Ok(PartBodyStream {
            body: Some(self.take_body()?),
        })
    }

    fn take_body(&mut self) -> Result<Bytes, ExtractError> {
        self.body
            .take()
            .ok_or_else(|| ParseError::new("part body was already consumed").into())
    }
}

/// One-shot stream returned by [`Part::stream`].
#[derive(Debug)]
pub struct PartBodyStream {
    body: Option<Bytes>,
}

impl Stream for PartBodyStream {
    type Item = Result<Bytes, ExtractError>;

    fn poll_next(mut self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Poll::Ready(self.body.take().map(Ok))
    }
}
