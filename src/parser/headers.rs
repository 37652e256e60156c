use std::borrow::Cow;

use http::{header, HeaderMap, HeaderName, HeaderValue};

use crate::{decode::TransferEncoding, error::ParseError};

/// Parsed `Content-Disposition` metadata for a MIME part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentDisposition {
    /// Disposition type, typically `inline` or `attachment`.
    pub disposition: String,
    /// Parsed file name (`filename`/`filename*` parameter).
    pub filename: Option<String>,
}

/// State of a part-level `Content-Type` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartContentType {
    /// No `Content-Type` header was present.
    Missing,
    /// The header parsed into a media type.
    Parsed(mime::Mime),
    /// The header was present but could not be parsed.
    Invalid(String),
}

impl PartContentType {
    /// Returns the parsed media type, if any.
    pub fn mime(&self) -> Option<&mime::Mime> {
        match self {
            Self::Parsed(mime) => Some(mime),
            Self::Missing | Self::Invalid(_) => None,
        }
    }

    /// Returns the media type as declared, for display and storage metadata.
    pub fn as_declared(&self) -> &str {
        match self {
            Self::Parsed(mime) => mime.as_ref(),
            Self::Invalid(raw) => raw,
            Self::Missing => "",
        }
    }
}

/// Parsed header model for a MIME part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPartHeaders {
    /// All raw headers in arrival order.
    pub raw: HeaderMap,
    /// Parsed part-level content type.
    pub content_type: PartContentType,
    /// Explicit file name from `Content-Disposition`, when present and non-empty.
    pub file_name: Option<String>,
    /// Resolved `Content-Transfer-Encoding`.
    pub transfer_encoding: TransferEncoding,
}

/// Parses a `Content-Disposition` value.
pub fn parse_content_disposition(value: &str) -> Result<ContentDisposition, ParseError> {
    let mut segments = split_params(value).into_iter();
    let disposition = segments
        .next()
        .map(|segment| segment.trim().to_ascii_lowercase())
        .filter(|segment| !segment.is_empty())
        .ok_or_else(|| ParseError::new("invalid Content-Disposition header"))?;

    let mut filename: Option<String> = None;
    let mut filename_star: Option<String> = None;

    for segment in segments {
        let trimmed = segment.trim();
        if trimmed.is_empty() {
            continue;
        }

        let Some((raw_key, raw_value)) = trimmed.split_once('=') else {
            return Err(ParseError::new(
                "invalid Content-Disposition parameter format",
            ));
        };

        let key = raw_key.trim().to_ascii_lowercase();
        let decoded = param_value(raw_value.trim())?;

        match key.as_str() {
            "filename" => filename = Some(decoded),
            "filename*" => filename_star = Some(parse_rfc2231_value(&decoded)?),
            _ => {}
        }
    }

    Ok(ContentDisposition {
        disposition,
        filename: filename_star.or(filename),
    })
}

/// Parses a part-level `Content-Type` value.
pub fn parse_part_content_type(value: Option<&str>) -> PartContentType {
    match value.map(str::trim) {
        None | Some("") => PartContentType::Missing,
        Some(raw) => match raw.parse::<mime::Mime>() {
            Ok(mime) => PartContentType::Parsed(mime),
            Err(_) => PartContentType::Invalid(raw.to_owned()),
        },
    }
}

/// Parses the headers of a MIME part into the model used by the extractor.
///
/// Only the header block itself is fatal; a malformed `Content-Disposition`
/// degrades to "no explicit file name".
pub fn parse_part_headers(raw: HeaderMap) -> ParsedPartHeaders {
    let content_type = parse_part_content_type(header_text(&raw, &header::CONTENT_TYPE).as_deref());

    let file_name = header_text(&raw, &header::CONTENT_DISPOSITION)
        .and_then(|value| parse_content_disposition(&value).ok())
        .and_then(|disposition| disposition.filename)
        .filter(|name| !name.is_empty());

    let transfer_encoding = TransferEncoding::from_header(
        header_text(&raw, &HeaderName::from_static("content-transfer-encoding")).as_deref(),
    );

    ParsedPartHeaders {
        raw,
        content_type,
        file_name,
        transfer_encoding,
    }
}

/// Parses a raw header block (RFC 5322 section 2.2), unfolding continuation lines.
///
/// Accepts CRLF and bare LF line endings. Names are case-insensitive; repeated
/// headers keep every value in order.
pub fn parse_header_block(raw: &[u8]) -> Result<HeaderMap, ParseError> {
    let mut headers = HeaderMap::new();
    let mut current: Option<(Vec<u8>, Vec<u8>)> = None;

    for line in raw.split(|&byte| byte == b'\n') {
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        if line.is_empty() {
            continue;
        }

        if matches!(line[0], b' ' | b'\t') {
            let Some((_, value)) = current.as_mut() else {
                return Err(ParseError::new("header continuation without a header"));
            };
            value.push(b' ');
            value.extend_from_slice(line.trim_ascii());
            continue;
        }

        if let Some((name, value)) = current.take() {
            append_header(&mut headers, &name, &value)?;
        }

        let Some(colon) = line.iter().position(|&byte| byte == b':') else {
            return Err(ParseError::new("invalid part header line"));
        };
        current = Some((
            line[..colon].trim_ascii().to_vec(),
            line[colon + 1..].trim_ascii().to_vec(),
        ));
    }

    if let Some((name, value)) = current {
        append_header(&mut headers, &name, &value)?;
    }

    Ok(headers)
}

/// Returns the last value of a header as text, replacing invalid UTF-8.
pub fn header_text<'a>(headers: &'a HeaderMap, name: &HeaderName) -> Option<Cow<'a, str>> {
    headers
        .get_all(name)
        .iter()
        .last()
        .map(|value| String::from_utf8_lossy(value.as_bytes()))
}

fn append_header(headers: &mut HeaderMap, name: &[u8], value: &[u8]) -> Result<(), ParseError> {
    let name = HeaderName::from_bytes(name)
        .map_err(|_| ParseError::new("invalid part header name"))?;
    let value = HeaderValue::from_bytes(value)
        .map_err(|_| ParseError::new("invalid part header value"))?;
    headers.append(name, value);
    Ok(())
}

/// Returns a parameter value, unquoting and unescaping a quoted string.
fn param_value(raw: &str) -> Result<String, ParseError> {
    let Some(inner) = raw.strip_prefix('"') else {
        if raw.contains('"') {
            return Err(ParseError::new("invalid quoted parameter value"));
        }
        return Ok(raw.to_owned());
    };
    let inner = inner
        .strip_suffix('"')
        .ok_or_else(|| ParseError::new("invalid quoted parameter value"))?;

    let mut out = String::with_capacity(inner.len());
    let mut escaped = false;
    for ch in inner.chars() {
        if !escaped && ch == '\\' {
            escaped = true;
        } else {
            out.push(ch);
            escaped = false;
        }
    }
    if escaped {
        return Err(ParseError::new("dangling escape in quoted parameter"));
    }

    Ok(out)
}

fn parse_rfc2231_value(value: &str) -> Result<String, ParseError> {
    let Some((charset, encoded)) = split_rfc2231(value) else {
        return Err(ParseError::new("invalid filename* parameter encoding"));
    };

    let bytes = percent_decode(encoded)?;
    let encoding = encoding_rs::Encoding::for_label(charset.as_bytes())
        .ok_or_else(|| ParseError::new(format!("unsupported filename* charset `{charset}`")))?;
    let (text, _, had_errors) = encoding.decode(&bytes);
    if had_errors {
        return Err(ParseError::new("filename* is not valid in its declared charset"));
    }

    Ok(text.into_owned())
}

fn split_rfc2231(value: &str) -> Option<(&str, &str)> {
    let (charset, rest) = value.split_once('\'')?;
    let (_, encoded) = rest.split_once('\'')?;
    Some((charset, encoded))
}

fn percent_decode(value: &str) -> Result<Vec<u8>, ParseError> {
    let mut bytes = Vec::with_capacity(value.len());
    let raw = value.as_bytes();
    let mut index = 0;

    while index < raw.len() {
        if raw[index] == b'%' {
            if index + 2 >= raw.len() {
                return Err(ParseError::new("invalid percent-encoding in filename*"));
            }
            let hi = hex_value(raw[index + 1])?;
            let lo = hex_value(raw[index + 2])?;
            bytes.push((hi << 4) | lo);
            index += 3;
            continue;
        }

        bytes.push(raw[index]);
        index += 1;
    }

    Ok(bytes)
}

fn hex_value(byte: u8) -> Result<u8, ParseError> {
    match byte {
        b'0'..=b'9' => Ok(byte - b'0'),
        b'a'..=b'f' => Ok(byte - b'a' + 10),
        b'A'..=b'F' => Ok(byte - b'A' + 10),
        _ => Err(ParseError::new("invalid percent-encoding in filename*")),
    }
}

/// Splits a header value on `;` outside quoted strings.
fn split_params(value: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut start = 0;
    let mut quoted = false;
    let mut bytes = value.bytes().enumerate();

    while let Some((at, byte)) = bytes.next() {
        match byte {
            b'\\' if quoted => {
                bytes.next();
            }
            b'"' => quoted = !quoted,
            b';' if !quoted => {
                segments.push(&value[start..at]);
                start = at + 1;
            }
            _ => {}
        }
    }

    segments.push(&value[start..]);
    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unfolds_continuation_lines() {
        let raw = b"Content-Type: multipart/alternative;\r\n\tboundary=\"inner\"\r\nX-Tag: a\r\n";
        let headers = parse_header_block(raw).expect("headers should parse");
        assert_eq!(
            headers.get(header::CONTENT_TYPE).map(HeaderValue::as_bytes),
            Some(&b"multipart/alternative; boundary=\"inner\""[..])
        );
    }

    #[test]
    fn keeps_repeated_headers_in_order() {
        let raw = b"Received: one\nreceived: two\n";
        let headers = parse_header_block(raw).expect("headers should parse");
        let values: Vec<_> = headers
            .get_all("received")
            .iter()
            .map(|value| value.to_str().expect("ascii"))
            .collect();
        assert_eq!(values, ["one", "two"]);
    }

    #[test]
    fn rejects_line_without_colon() {
        let err = parse_header_block(b"Content-Type text/plain\r\n").expect_err("must fail");
        assert_eq!(err.to_string(), "invalid part header line");
    }

    #[test]
    fn disposition_prefers_extended_filename() {
        let disposition = parse_content_disposition(
            "attachment; filename=\"plain.txt\"; filename*=UTF-8''r%C3%A9sum%C3%A9.txt",
        )
        .expect("disposition should parse");
        assert_eq!(disposition.disposition, "attachment");
        assert_eq!(disposition.filename.as_deref(), Some("résumé.txt"));
    }

    #[test]
    fn disposition_keeps_semicolons_inside_quotes() {
        let disposition = parse_content_disposition(r#"attachment; filename="a;b \"c\".txt"; size=3"#)
            .expect("disposition should parse");
        assert_eq!(disposition.filename.as_deref(), Some(r#"a;b "c".txt"#));

        assert!(parse_content_disposition(r#"attachment; filename="open"#).is_err());
        assert!(parse_content_disposition(r#"attachment; filename="dangling\""#).is_err());
    }

    #[test]
    fn disposition_decodes_latin1_extended_filename() {
        let disposition = parse_content_disposition("attachment; filename*=iso-8859-1'fr'caf%E9.txt")
            .expect("disposition should parse");
        assert_eq!(disposition.filename.as_deref(), Some("café.txt"));
    }

    #[test]
    fn part_headers_resolve_content_type_states() {
        let missing = parse_part_headers(HeaderMap::new());
        assert_eq!(missing.content_type, PartContentType::Missing);
        assert_eq!(missing.transfer_encoding, TransferEncoding::Identity);

        let raw = parse_header_block(b"Content-Type: not a type\r\n").expect("headers parse");
        let invalid = parse_part_headers(raw);
        assert_eq!(invalid.content_type, PartContentType::Invalid("not a type".to_owned()));
    }

    #[test]
    fn malformed_disposition_means_no_file_name() {
        let raw = parse_header_block(b"Content-Disposition: attachment; filename\r\n")
            .expect("headers parse");
        assert_eq!(parse_part_headers(raw).file_name, None);
    }
}
