use std::{
    pin::Pin,
    task::{Context, Poll},
};

use bytes::Bytes;
use futures::Stream;

use crate::{
    parser::{
        boundary::validate_boundary,
        headers::{parse_header_block, parse_part_headers, ParsedPartHeaders},
    },
    ExtractError, ParseError,
};

/// Raw MIME part produced by the streaming parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPart {
    /// Parsed part headers.
    pub headers: ParsedPartHeaders,
    /// Raw (still transfer-encoded) part body bytes.
    pub body: Bytes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    Preamble,
    Headers,
    Body,
    End,
    Failed,
}

/// Incremental multipart parser over a chunked byte stream.
///
/// Yields one [`ParsedPart`] per boundary-delimited section and ends after the
/// closing `--boundary--` line. Preamble and epilogue text are skipped. After
/// the first error the stream is fused.
#[derive(Debug)]
pub struct MultipartStream<S> {
    stream: S,
    dash_boundary: Vec<u8>,
    buffer: Vec<u8>,
    state: ParseState,
    current_headers: Option<ParsedPartHeaders>,
    scan_from: usize,
    upstream_done: bool,
}

impl<S> MultipartStream<S> {
    /// Creates a new streaming parser for a known multipart boundary.
    pub fn new(boundary: impl Into<String>, stream: S) -> Result<Self, ParseError> {
        let boundary = boundary.into();
        validate_boundary(&boundary)?;

        Ok(Self {
            stream,
            dash_boundary: format!("--{boundary}").into_bytes(),
            buffer: Vec::new(),
            state: ParseState::Preamble,
            current_headers: None,
            scan_from: 0,
            upstream_done: false,
        })
    }
}

impl<S> Stream for MultipartStream<S>
where
    S: Stream<Item = Result<Bytes, ExtractError>> + Unpin,
{
    type Item = Result<ParsedPart, ExtractError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            match self.parse_available() {
                ParseOutcome::Emit(item) => return Poll::Ready(Some(item)),
                ParseOutcome::Done => return Poll::Ready(None),
                ParseOutcome::NeedMore => {}
            }

            if self.upstream_done {
                self.state = ParseState::Failed;
                return Poll::Ready(Some(Err(ExtractError::IncompleteStream)));
            }

            match Pin::new(&mut self.stream).poll_next(cx) {
                Poll::Ready(Some(Ok(chunk))) => {
                    if !chunk.is_empty() {
                        self.buffer.extend_from_slice(&chunk);
                    }
                }
                Poll::Ready(Some(Err(err))) => {
                    self.state = ParseState::Failed;
                    return Poll::Ready(Some(Err(err)));
                }
                Poll::Ready(None) => {
                    self.upstream_done = true;
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

impl<S> MultipartStream<S> {
    fn parse_available(&mut self) -> ParseOutcome {
        loop {
            match self.state {
                ParseState::Preamble => {
                    let Some(line) = take_line(&mut self.buffer, self.upstream_done) else {
                        if self.upstream_done {
                            return self.fail(ParseError::new("no multipart boundary found").into());
                        }
                        return ParseOutcome::NeedMore;
                    };

                    match classify_boundary_line(&line, &self.dash_boundary) {
                        Some(BoundaryKind::Next) => self.state = ParseState::Headers,
                        Some(BoundaryKind::Close) => self.state = ParseState::End,
                        None => {}
                    }
                }
                ParseState::Headers => {
                    let Some((header_len, consumed)) = find_header_end(&self.buffer) else {
                        return self.need_more();
                    };

                    let headers = match parse_header_block(&self.buffer[..header_len]) {
                        Ok(raw) => parse_part_headers(raw),
                        Err(err) => return self.fail(err.into()),
                    };
                    self.buffer.drain(..consumed);

                    self.current_headers = Some(headers);
                    self.scan_from = 0;
                    self.state = ParseState::Body;
                }
                ParseState::Body => {
                    let delimiter = match self.find_delimiter() {
                        DelimiterSearch::Found(delimiter) => delimiter,
                        DelimiterSearch::NeedMore => return self.need_more(),
                    };

                    let body = Bytes::copy_from_slice(&self.buffer[..delimiter.body_end]);
                    if delimiter.is_terminal {
                        self.buffer.clear();
                    } else {
                        self.buffer.drain(..delimiter.consumed);
                    }

                    let Some(headers) = self.current_headers.take() else {
                        return self.fail(ParseError::new("missing part headers").into());
                    };

                    self.state = if delimiter.is_terminal {
                        ParseState::End
                    } else {
                        ParseState::Headers
                    };

                    return ParseOutcome::Emit(Ok(ParsedPart { headers, body }));
                }
                ParseState::End | ParseState::Failed => return ParseOutcome::Done,
            }
        }
    }

    /// Finds the next delimiter line for the current body.
    ///
    /// A delimiter is `--boundary` at the start of a line, followed by `--`
    /// (closing) or optional linear whitespace and a line break. A longer
    /// token sharing the same prefix belongs to the body.
    fn find_delimiter(&mut self) -> DelimiterSearch {
        let dash_len = self.dash_boundary.len();
        let mut from = self.scan_from;

        while let Some(offset) = find_subslice(&self.buffer[from..], &self.dash_boundary) {
            let at = from + offset;
            from = at + 1;

            if at > 0 && self.buffer[at - 1] != b'\n' {
                continue;
            }

            let after = &self.buffer[at + dash_len..];
            let body_end = line_break_start(&self.buffer, at);

            if after.starts_with(b"--") {
                return DelimiterSearch::Found(Delimiter {
                    body_end,
                    consumed: self.buffer.len(),
                    is_terminal: true,
                });
            }

            let padding = after
                .iter()
                .take_while(|&&byte| byte == b' ' || byte == b'\t')
                .count();
            let rest = &after[padding..];

            let line_break = if rest.starts_with(b"\r\n") {
                2
            } else if rest.starts_with(b"\n") {
                1
            } else if rest.is_empty() || rest == b"\r" || rest == b"-" {
                // Not enough input yet to tell what follows the token.
                self.scan_from = at;
                return DelimiterSearch::NeedMore;
            } else {
                continue;
            };

            return DelimiterSearch::Found(Delimiter {
                body_end,
                consumed: at + dash_len + padding + line_break,
                is_terminal: false,
            });
        }

        // Keep enough tail to match a delimiter split across chunks.
        self.scan_from = self.buffer.len().saturating_sub(dash_len + 1);
        DelimiterSearch::NeedMore
    }

    fn need_more(&mut self) -> ParseOutcome {
        if self.upstream_done {
            return self.fail(ExtractError::IncompleteStream);
        }
        ParseOutcome::NeedMore
    }

    fn fail(&mut self, err: ExtractError) -> ParseOutcome {
        self.state = ParseState::Failed;
        ParseOutcome::Emit(Err(err))
    }
}

#[derive(Debug)]
enum ParseOutcome {
    NeedMore,
    Emit(Result<ParsedPart, ExtractError>),
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BoundaryKind {
    Next,
    Close,
}

#[derive(Debug, Clone, Copy)]
struct Delimiter {
    body_end: usize,
    consumed: usize,
    is_terminal: bool,
}

#[derive(Debug, Clone, Copy)]
enum DelimiterSearch {
    Found(Delimiter),
    NeedMore,
}

fn classify_boundary_line(line: &[u8], dash_boundary: &[u8]) -> Option<BoundaryKind> {
    let rest = line.strip_prefix(dash_boundary)?;
    let rest = trim_trailing_whitespace(rest);

    match rest {
        b"" => Some(BoundaryKind::Next),
        b"--" => Some(BoundaryKind::Close),
        _ => None,
    }
}

/// Index where the line break preceding `at` begins; that break belongs to the delimiter.
fn line_break_start(buffer: &[u8], at: usize) -> usize {
    if at == 0 {
        return 0;
    }
    if at >= 2 && buffer[at - 2] == b'\r' {
        at - 2
    } else {
        at - 1
    }
}

/// Returns `(header_len, consumed)` for the header block at the start of `buffer`.
fn find_header_end(buffer: &[u8]) -> Option<(usize, usize)> {
    if buffer.starts_with(b"\n") {
        return Some((0, 1));
    }
    if buffer.starts_with(b"\r\n") {
        return Some((0, 2));
    }

    let mut from = 0;
    while let Some(offset) = buffer[from..].iter().position(|&byte| byte == b'\n') {
        let newline = from + offset;
        let after = &buffer[newline + 1..];
        if after.starts_with(b"\n") {
            return Some((newline + 1, newline + 2));
        }
        if after.starts_with(b"\r\n") {
            return Some((newline + 1, newline + 3));
        }
        from = newline + 1;
    }

    None
}

fn take_line(buffer: &mut Vec<u8>, at_eof: bool) -> Option<Vec<u8>> {
    match buffer.iter().position(|&byte| byte == b'\n') {
        Some(split) => {
            let mut line: Vec<u8> = buffer.drain(..=split).collect();
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            Some(line)
        }
        None if at_eof && !buffer.is_empty() => Some(std::mem::take(buffer)),
        None => None,
    }
}

fn trim_trailing_whitespace(bytes: &[u8]) -> &[u8] {
    let end = bytes
        .iter()
        .rposition(|byte| !matches!(byte, b' ' | b'\t' | b'\r'))
        .map_or(0, |index| index + 1);
    &bytes[..end]
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }

    haystack.windows(needle.len()).position(|window| window == needle)
}
