//! Module for decoding RFC 2047 encoded words in header values.

use base64::{
    engine::general_purpose::{STANDARD, STANDARD_NO_PAD},
    Engine as _,
};
use encoding_rs::Encoding;

/// Decodes every `=?charset?encoding?text?=` word of a header value.
///
/// Whitespace between two adjacent encoded words is dropped (RFC 2047
/// section 6.2). Words that do not decode are kept verbatim.
pub fn decode_header(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    let mut after_word = false;

    while let Some(start) = rest.find("=?") {
        let (before, candidate) = rest.split_at(start);

        match decode_word(candidate) {
            Some((decoded, consumed)) => {
                let separator_only = before.chars().all(|ch| ch.is_ascii_whitespace());
                if !(after_word && separator_only) {
                    out.push_str(before);
                }
                out.push_str(&decoded);
                rest = &candidate[consumed..];
                after_word = true;
            }
            None => {
                out.push_str(before);
                out.push_str("=?");
                rest = &candidate[2..];
                after_word = false;
            }
        }
    }

    out.push_str(rest);
    out
}

/// Decodes one encoded word at the start of `s`, returning the text and the bytes consumed.
pub fn decode_word(s: &str) -> Option<(String, usize)> {
    let inner = s.strip_prefix("=?")?;
    let (charset, after_charset) = inner.split_once('?')?;
    let (encoding, after_encoding) = after_charset.split_once('?')?;
    let end = after_encoding.find("?=")?;
    let text = &after_encoding[..end];

    if charset.is_empty() || text.contains(|ch: char| ch.is_ascii_whitespace()) {
        return None;
    }

    let bytes = match encoding {
        "B" | "b" => STANDARD
            .decode(text)
            .or_else(|_| STANDARD_NO_PAD.decode(text))
            .ok()?,
        "Q" | "q" => decode_q_encoding(text)?,
        _ => return None,
    };

    // RFC 2231 allows a language suffix: `charset*lang`.
    let label = charset.split('*').next().unwrap_or(charset);
    let encoding_impl = Encoding::for_label(label.as_bytes())?;
    let (decoded, _, _) = encoding_impl.decode(&bytes);

    let consumed = 2 + charset.len() + 1 + encoding.len() + 1 + end + 2;
    Some((decoded.into_owned(), consumed))
}

/// Decodes the "Q" encoding (RFC 2047 section 4.2).
pub fn decode_q_encoding(s: &str) -> Option<Vec<u8>> {
    let raw = s.as_bytes();
    let mut out = Vec::with_capacity(raw.len());
    let mut index = 0;

    while index < raw.len() {
        match raw[index] {
            b'_' => out.push(b' '),
            b'=' => {
                let &[hi, lo] = raw.get(index + 1..index + 3)? else {
                    return None;
                };
                out.push(hex_digit(hi)? << 4 | hex_digit(lo)?);
                index += 2;
            }
            byte => out.push(byte),
        }
        index += 1;
    }

    Some(out)
}

fn hex_digit(byte: u8) -> Option<u8> {
    byte.is_ascii_hexdigit()
        .then(|| char::from(byte).to_digit(16))
        .flatten()
        .and_then(|digit| u8::try_from(digit).ok())
}
