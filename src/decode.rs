//! Content-Transfer-Encoding resolution and decoding (RFC 2045 section 6).

use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;

use crate::error::DecodeError;

/// Transfer encoding of a leaf part body, resolved once from its headers.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransferEncoding {
    /// `7bit`, `8bit`, `binary`, unknown values and a missing header: bytes pass through.
    #[default]
    Identity,
    /// `base64`.
    Base64,
    /// `quoted-printable`.
    QuotedPrintable,
}

impl TransferEncoding {
    /// Resolves a `Content-Transfer-Encoding` header value.
    ///
    /// Matching is ASCII case-insensitive on the trimmed value.
    pub fn from_header(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(value) if value.eq_ignore_ascii_case("base64") => Self::Base64,
            Some(value) if value.eq_ignore_ascii_case("quoted-printable") => Self::QuotedPrintable,
            _ => Self::Identity,
        }
    }

    /// Decodes a complete part body.
    pub fn decode(self, body: Bytes) -> Result<Bytes, DecodeError> {
        match self {
            Self::Identity => Ok(body),
            Self::Base64 => decode_base64(&body).map(Bytes::from),
            Self::QuotedPrintable => decode_quoted_printable(&body).map(Bytes::from),
        }
    }

    /// Header spelling of this encoding.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Identity => "identity",
            Self::Base64 => "base64",
            Self::QuotedPrintable => "quoted-printable",
        }
    }
}

/// Decodes standard (padded) base64, ignoring line breaks and other ASCII whitespace.
pub fn decode_base64(body: &[u8]) -> Result<Vec<u8>, DecodeError> {
    let compact: Vec<u8> = body
        .iter()
        .copied()
        .filter(|byte| !byte.is_ascii_whitespace())
        .collect();

    STANDARD.decode(compact).map_err(|err| DecodeError::Base64 {
        message: err.to_string(),
    })
}

/// Decodes quoted-printable per RFC 2045 section 6.7.
///
/// Every `=` must introduce two hex digits or a soft line break; anything
/// else is rejected rather than passed through.
pub fn decode_quoted_printable(body: &[u8]) -> Result<Vec<u8>, DecodeError> {
    validate_qp_escapes(body)?;
    quoted_printable::decode(body, quoted_printable::ParseMode::Robust).map_err(|err| {
        DecodeError::QuotedPrintable {
            message: err.to_string(),
        }
    })
}

fn validate_qp_escapes(body: &[u8]) -> Result<(), DecodeError> {
    let mut index = 0;
    while let Some(offset) = body[index..].iter().position(|&byte| byte == b'=') {
        let at = index + offset;
        let rest = &body[at + 1..];

        let hex_escape = rest.len() >= 2 && rest[0].is_ascii_hexdigit() && rest[1].is_ascii_hexdigit();
        if hex_escape {
            index = at + 3;
            continue;
        }

        // Soft line break, possibly with transport padding before the newline.
        let padding = rest
            .iter()
            .take_while(|&&byte| byte == b' ' || byte == b'\t')
            .count();
        match &rest[padding..] {
            [] | [b'\n', ..] | [b'\r', b'\n', ..] => {
                index = at + 1 + padding;
            }
            _ => {
                return Err(DecodeError::QuotedPrintable {
                    message: format!("malformed escape at byte {at}"),
                });
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_header_values_case_insensitively() {
        assert_eq!(TransferEncoding::from_header(Some("BASE64")), TransferEncoding::Base64);
        assert_eq!(TransferEncoding::from_header(Some(" base64 ")), TransferEncoding::Base64);
        assert_eq!(
            TransferEncoding::from_header(Some("Quoted-Printable")),
            TransferEncoding::QuotedPrintable
        );
        for other in [Some("7bit"), Some("8BIT"), Some("binary"), Some("x-uuencode"), None] {
            assert_eq!(TransferEncoding::from_header(other), TransferEncoding::Identity);
        }
    }

    #[test]
    fn base64_ignores_line_breaks() {
        let decoded = decode_base64(b"aGVsbG8g\r\nd29ybGQ=\r\n").expect("valid base64");
        assert_eq!(decoded, b"hello world");
    }

    #[test]
    fn base64_rejects_garbage() {
        let err = decode_base64(b"not*base64!").expect_err("must fail");
        assert!(matches!(err, DecodeError::Base64 { .. }));
    }

    #[test]
    fn quoted_printable_handles_soft_breaks_and_escapes() {
        let decoded = decode_quoted_printable(b"caf=C3=A9 au =\r\nlait").expect("valid qp");
        assert_eq!(decoded, "café au lait".as_bytes());
    }

    #[test]
    fn quoted_printable_rejects_bad_escape() {
        let err = decode_quoted_printable(b"price =ZZ euros").expect_err("must fail");
        assert!(matches!(err, DecodeError::QuotedPrintable { .. }));
    }

    #[test]
    fn identity_passes_bytes_through() {
        let body = Bytes::from_static(b"\x00\xffraw=ZZ");
        let decoded = TransferEncoding::Identity.decode(body.clone()).expect("identity");
        assert_eq!(decoded, body);
    }
}
