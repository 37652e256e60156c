/// Content-Type and boundary helpers.
pub mod boundary;
/// MIME part header parsing helpers.
pub mod headers;
/// Streaming multipart parser state machine.
pub mod stream;

pub use boundary::{extract_multipart_boundary, is_multipart, multipart_boundary, parse_content_type};
pub use headers::{
    parse_content_disposition, parse_header_block, parse_part_content_type, parse_part_headers,
    ContentDisposition, ParsedPartHeaders, PartContentType,
};
pub use stream::{MultipartStream, ParsedPart};
