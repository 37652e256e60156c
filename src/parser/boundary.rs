use crate::error::ParseError;

/// Parses a `Content-Type` value into a media type with parameters.
pub fn parse_content_type(value: &str) -> Result<mime::Mime, ParseError> {
    value
        .trim()
        .parse::<mime::Mime>()
        .map_err(|_| ParseError::new(format!("invalid Content-Type header `{}`", value.trim())))
}

/// Returns `true` when the media type is any `multipart/*` subtype.
pub fn is_multipart(content_type: &mime::Mime) -> bool {
    content_type.type_() == mime::MULTIPART
}

/// Returns the non-empty `boundary` parameter of a media type, if declared.
pub fn multipart_boundary(content_type: &mime::Mime) -> Option<String> {
    content_type
        .get_param(mime::BOUNDARY)
        .map(|value| value.as_str().to_owned())
        .filter(|value| !value.is_empty())
}

/// Extracts and validates the `boundary` parameter from a `multipart/*` `Content-Type` value.
pub fn extract_multipart_boundary(content_type: &str) -> Result<String, ParseError> {
    let mime = parse_content_type(content_type)?;

    if !is_multipart(&mime) {
        return Err(ParseError::new(format!(
            "Content-Type must be multipart/*, found `{}`",
            mime.essence_str()
        )));
    }

    let boundary = mime
        .get_param(mime::BOUNDARY)
        .map(|value| value.as_str())
        .ok_or_else(|| ParseError::new("missing multipart boundary parameter"))?;

    validate_boundary(boundary)?;
    Ok(boundary.to_owned())
}

pub(crate) fn validate_boundary(boundary: &str) -> Result<(), ParseError> {
    if boundary.is_empty() {
        return Err(ParseError::new("multipart boundary cannot be empty"));
    }

    if boundary.contains('\r') || boundary.contains('\n') {
        return Err(ParseError::new("multipart boundary cannot contain CRLF"));
    }

    Ok(())
}
