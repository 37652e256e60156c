#![allow(missing_docs)]

use mimesplit::{Diagnostics, ExtractorBuilder, IndentedTrace, MemoryStorage, PartFailure};

const NESTED: &str = concat!(
    "Content-Type: multipart/mixed; boundary=\"outer\"\r\n",
    "\r\n",
    "--outer\r\n",
    "Content-Type: multipart/alternative; boundary=\"inner\"\r\n",
    "\r\n",
    "--inner\r\n",
    "Content-Type: text/plain\r\n",
    "\r\n",
    "hi\r\n",
    "--inner--\r\n",
    "--outer\r\n",
    "Content-Type: application/pdf\r\n",
    "Content-Transfer-Encoding: base64\r\n",
    "\r\n",
    "!!!\r\n",
    "--outer--\r\n"
);

#[tokio::test]
async fn indented_trace_marks_levels_and_headers() {
    let mut extractor = ExtractorBuilder::new()
        .build_with_diagnostics(MemoryStorage::new(), IndentedTrace::new(Vec::new()))
        .expect("valid configuration");

    let report = extractor
        .extract_reader(NESTED.as_bytes())
        .await
        .expect("extraction should run");
    assert_eq!(report.outputs.len(), 1);
    assert_eq!(report.failures.len(), 1);

    let trace = String::from_utf8(extractor.into_diagnostics().into_inner()).expect("utf-8 trace");
    let lines: Vec<&str> = trace.lines().collect();

    assert_eq!(lines.first(), Some(&">>>>>>>>>>>>> outer"));
    assert_eq!(lines.last(), Some(&"<<<<<<<<<<<<< outer"));
    assert!(lines.contains(&"    >>>>>>>>>>>>> inner"), "{trace}");
    assert!(lines.contains(&"    <<<<<<<<<<<<< inner"), "{trace}");
    assert!(
        lines.contains(&"    Key: (content-type) - 1 Value: ([\"text/plain\"])"),
        "{trace}"
    );
    assert!(
        lines.contains(&"Key: (content-transfer-encoding) - 1 Value: ([\"base64\"])"),
        "{trace}"
    );
    assert!(
        lines
            .iter()
            .any(|line| line.starts_with("!! skipped outer-1.") && line.contains("base64")),
        "{trace}"
    );
}

#[derive(Debug, Default)]
struct Recorder {
    events: Vec<String>,
}

impl Diagnostics for Recorder {
    fn enter_level(&mut self, depth: usize, boundary: &str) {
        self.events.push(format!("enter {depth} {boundary}"));
    }

    fn part_failed(&mut self, failure: &PartFailure) {
        self.events
            .push(format!("fail {} {}", failure.depth, failure.boundary));
    }

    fn leave_level(&mut self, depth: usize, boundary: &str) {
        self.events.push(format!("leave {depth} {boundary}"));
    }
}

#[tokio::test]
async fn custom_sinks_see_levels_in_traversal_order() {
    let mut extractor = ExtractorBuilder::new()
        .build_with_diagnostics(MemoryStorage::new(), Recorder::default())
        .expect("valid configuration");

    extractor
        .extract_reader(NESTED.as_bytes())
        .await
        .expect("extraction should run");

    assert_eq!(
        extractor.diagnostics().events,
        [
            "enter 1 outer",
            "enter 2 inner",
            "leave 2 inner",
            "fail 1 outer",
            "leave 1 outer",
        ]
    );
}
