#![allow(missing_docs)]

use bytes::Bytes;
use futures::{stream, TryStreamExt};
use mimesplit::{ExtractError, Multipart, Part, TransferEncoding};

#[tokio::test]
async fn exposes_metadata_accessors() {
    let body = concat!(
        "--BOUND\r\n",
        "Content-Disposition: attachment; filename=\"face.png\"\r\n",
        "Content-Type: image/png\r\n",
        "Content-Transfer-Encoding: base64\r\n",
        "\r\n",
        "YWJj\r\n",
        "--BOUND--\r\n"
    );

    let part = first_part("BOUND", body).await;

    assert_eq!(part.file_name(), Some("face.png"));
    assert_eq!(part.mime(), Some(&mime::IMAGE_PNG));
    assert_eq!(part.content_type().as_declared(), "image/png");
    assert_eq!(part.transfer_encoding(), TransferEncoding::Base64);
    assert_eq!(
        part.raw_headers()
            .get("content-disposition")
            .and_then(|value| value.to_str().ok()),
        Some("attachment; filename=\"face.png\"")
    );
    assert_eq!(part.size_hint(), 4);
}

#[tokio::test]
async fn bytes_are_single_pass() {
    let mut part = first_part("BOUND", "--BOUND\r\n\r\nhello\r\n--BOUND--\r\n").await;

    let payload = part.bytes().expect("bytes should be readable");
    assert_eq!(payload, Bytes::from_static(b"hello"));
    assert_eq!(part.size_hint(), 0);

    let err = part.bytes().expect_err("second read must fail");
    assert_already_consumed(err);
}

#[tokio::test]
async fn stream_is_single_pass_and_returns_body() {
    let mut part = first_part("BOUND", "--BOUND\r\n\r\nstream-body\r\n--BOUND--\r\n").await;

    let chunks = part
        .stream()
        .expect("body not yet taken")
        .try_collect::<Vec<_>>()
        .await
        .expect("stream should read");
    assert_eq!(chunks, vec![Bytes::from_static(b"stream-body")]);

    let err = part.stream().expect_err("second take must fail");
    assert_already_consumed(err);
}

#[tokio::test]
async fn body_is_not_decoded_by_the_reader() {
    let body = concat!(
        "--q\r\n",
        "Content-Transfer-Encoding: quoted-printable\r\n",
        "\r\n",
        "caf=C3=A9\r\n",
        "--q--\r\n"
    );
    let mut part = first_part("q", body).await;

    let raw = part.bytes().expect("body");
    assert_eq!(raw, Bytes::from_static(b"caf=C3=A9"));
    assert_eq!(
        part.transfer_encoding().decode(raw).expect("valid quoted-printable"),
        Bytes::from("café")
    );
}

async fn first_part(boundary: &str, body: &'static str) -> Part {
    let input = stream::iter([Ok::<Bytes, ExtractError>(Bytes::from_static(body.as_bytes()))]);
    let mut multipart = Multipart::new(boundary, input).expect("boundary should be valid");
    multipart
        .next_part()
        .await
        .expect("part should parse")
        .expect("part expected")
}

fn assert_already_consumed(err: ExtractError) {
    assert!(
        err.to_string().contains("already consumed"),
        "unexpected error: {err}"
    );
}
