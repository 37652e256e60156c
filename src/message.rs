//! Top-level RFC 5322 message: header block plus a streamed body.

use std::{borrow::Cow, fmt};

use futures::StreamExt;
use http::{header, HeaderMap, HeaderName};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio_util::io::ReaderStream;

use crate::{
    extract::ByteStream,
    parser::headers::{header_text, parse_header_block},
    rfc2047::decode_header,
    ExtractError,
};

/// A message whose header block has been read and whose body is still unread.
#[derive(Debug)]
pub struct Message<R> {
    headers: HeaderMap,
    body: BufReader<R>,
}

impl<R> Message<R>
where
    R: AsyncRead + Unpin,
{
    /// Reads the header block of `input`, leaving the reader positioned at the body.
    ///
    /// A missing, empty or malformed header block is a [`ExtractError::FatalInput`].
    pub async fn read(input: R) -> Result<Self, ExtractError> {
        let mut body = BufReader::new(input);
        let mut raw = Vec::new();

        loop {
            let mut line = Vec::new();
            let read = body
                .read_until(b'\n', &mut line)
                .await
                .map_err(|err| ExtractError::fatal(format!("failed to read message: {err}")))?;
            if read == 0 || line == b"\n" || line == b"\r\n" {
                break;
            }
            raw.extend_from_slice(&line);
        }

        if raw.is_empty() {
            return Err(ExtractError::fatal("message has no header block"));
        }

        let headers = parse_header_block(&raw)
            .map_err(|err| ExtractError::fatal(format!("malformed message header: {err}")))?;

        Ok(Self { headers, body })
    }
}

impl<R> Message<R> {
    /// All top-level headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Last value of header `name` as text, `None` when absent or `name` is not a header name.
    pub fn header(&self, name: &str) -> Option<Cow<'_, str>> {
        let name = HeaderName::from_bytes(name.as_bytes()).ok()?;
        header_text(&self.headers, &name)
    }

    /// Raw top-level `Content-Type` value.
    pub fn content_type(&self) -> Option<String> {
        header_text(&self.headers, &header::CONTENT_TYPE).map(Cow::into_owned)
    }

    /// Decoded summary of the main headers.
    pub fn summary(&self) -> HeaderSummary {
        let text = |name: &str| self.header(name).map(Cow::into_owned).unwrap_or_default();
        HeaderSummary {
            from: decode_header(&text("from")),
            to: decode_header(&text("to")),
            date: text("date"),
            subject: decode_header(&text("subject")),
            content_type: text("content-type"),
        }
    }

    /// Turns the unread body into a chunk stream for the boundary reader.
    pub fn into_body<'a>(self) -> ByteStream<'a>
    where
        R: AsyncRead + Send + 'a,
    {
        Box::pin(ReaderStream::new(self.body).map(|chunk| chunk.map_err(ExtractError::from)))
    }
}

/// Main message headers, with RFC 2047 encoded words decoded in From, To and Subject.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HeaderSummary {
    /// Decoded `From`.
    pub from: String,
    /// Decoded `To`.
    pub to: String,
    /// Raw `Date`.
    pub date: String,
    /// Decoded `Subject`.
    pub subject: String,
    /// Raw `Content-Type`.
    pub content_type: String,
}

impl fmt::Display for HeaderSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "From: {}", self.from)?;
        writeln!(f, "To: {}", self.to)?;
        writeln!(f, "Date: {}", self.date)?;
        writeln!(f, "Subject: {}", self.subject)?;
        writeln!(f, "Content-Type: {}", self.content_type)
    }
}
