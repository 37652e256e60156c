//! Recursive multipart traversal: classify, recurse, decode, name and store.

use bytes::Bytes;
use futures::{future::BoxFuture, stream::BoxStream, FutureExt};
use tokio::io::AsyncRead;

use crate::{
    config::{ContentTypeFallback, ExtractConfig},
    naming::FileNamer,
    parser::{
        boundary::{extract_multipart_boundary, is_multipart, multipart_boundary, validate_boundary},
        headers::PartContentType,
    },
    storage::{StorageEngine, StoredFile},
    trace::Diagnostics,
    ExtractError, Extractor, Message, Multipart, Part,
};

/// Owned chunk source feeding one multipart level.
pub type ByteStream<'a> = BoxStream<'a, Result<Bytes, ExtractError>>;

/// A part, or a whole nested level, that produced no output.
#[derive(Debug)]
pub struct PartFailure {
    /// Nesting depth of the level the failure belongs to.
    pub depth: usize,
    /// Boundary of that level.
    pub boundary: String,
    /// Output name, when one had already been assigned.
    pub file_name: Option<String>,
    /// What went wrong.
    pub error: ExtractError,
}

/// Outcome of one extraction run.
#[derive(Debug, Default)]
pub struct ExtractReport {
    /// Successfully written outputs, in traversal order.
    pub outputs: Vec<StoredFile>,
    /// Skipped parts and levels, in traversal order.
    pub failures: Vec<PartFailure>,
}

impl ExtractReport {
    /// Returns `true` when every visited part was written.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Classification {
    Nested(String),
    MissingBoundary(String),
    Rejected(String),
    Leaf,
}

fn classify(part: &Part, fallback: ContentTypeFallback) -> Classification {
    match part.content_type() {
        PartContentType::Parsed(mime) if is_multipart(mime) => match multipart_boundary(mime) {
            Some(boundary) => Classification::Nested(boundary),
            None => Classification::MissingBoundary(mime.essence_str().to_owned()),
        },
        PartContentType::Invalid(raw) if fallback == ContentTypeFallback::Reject => {
            Classification::Rejected(raw.clone())
        }
        _ => Classification::Leaf,
    }
}

impl<S, D> Extractor<S, D>
where
    S: StorageEngine,
    D: Diagnostics,
{
    /// Reads a message from `input` and extracts every leaf part of its body.
    pub async fn extract_reader<R>(&mut self, input: R) -> Result<ExtractReport, ExtractError>
    where
        R: AsyncRead + Unpin + Send,
    {
        let message = Message::read(input).await?;
        self.extract_message(message).await
    }

    /// Extracts every leaf part of an already split message.
    ///
    /// Fails before any traversal when the top-level `Content-Type` is missing,
    /// not `multipart/*` or without a boundary. Everything below the top level
    /// is reported through [`ExtractReport::failures`] instead.
    pub async fn extract_message<R>(
        &mut self,
        message: Message<R>,
    ) -> Result<ExtractReport, ExtractError>
    where
        R: AsyncRead + Unpin + Send,
    {
        let content_type = message
            .content_type()
            .ok_or_else(|| ExtractError::fatal("missing Content-Type header"))?;
        let boundary = extract_multipart_boundary(&content_type)
            .map_err(|err| ExtractError::fatal(err.to_string()))?;

        self.extract_multipart(boundary, message.into_body()).await
    }

    /// Extracts every leaf part of a multipart body delimited by `boundary`.
    pub async fn extract_multipart(
        &mut self,
        boundary: impl Into<String>,
        body: ByteStream<'_>,
    ) -> Result<ExtractReport, ExtractError> {
        let boundary = boundary.into();
        validate_boundary(&boundary).map_err(|err| ExtractError::fatal(err.to_string()))?;

        #[cfg(feature = "tracing")]
        tracing::debug!(boundary = boundary.as_str(), "extract: begin traversal");

        let mut run = Run {
            storage: &self.storage,
            diagnostics: &mut self.diagnostics,
            config: &self.config,
            namer: FileNamer::new(self.config.naming),
            report: ExtractReport::default(),
        };
        run.walk(body, boundary, 1).await;

        #[cfg(feature = "tracing")]
        tracing::debug!(
            outputs = run.report.outputs.len(),
            failures = run.report.failures.len(),
            "extract: traversal complete"
        );

        Ok(run.report)
    }
}

/// State of one traversal. Each level's stream is owned by its own `walk` frame.
struct Run<'a, S, D> {
    storage: &'a S,
    diagnostics: &'a mut D,
    config: &'a ExtractConfig,
    namer: FileNamer,
    report: ExtractReport,
}

impl<'a, S, D> Run<'a, S, D>
where
    S: StorageEngine,
    D: Diagnostics,
{
    /// Walks one multipart level, depth first. Failures are recorded, never returned.
    fn walk<'w>(
        &'w mut self,
        source: ByteStream<'w>,
        boundary: String,
        depth: usize,
    ) -> BoxFuture<'w, ()> {
        async move {
            let mut multipart = match Multipart::new(boundary.clone(), source) {
                Ok(multipart) => multipart,
                Err(err) => {
                    self.fail(depth, &boundary, None, err.into());
                    return;
                }
            };

            self.diagnostics.enter_level(depth, &boundary);
            let mut leaves = 0usize;

            loop {
                let mut part = match multipart.next_part().await {
                    Ok(Some(part)) => part,
                    Ok(None) => break,
                    Err(err) => {
                        self.fail(depth, &boundary, None, err);
                        break;
                    }
                };

                self.diagnostics.part_headers(depth, part.raw_headers());

                match classify(&part, self.config.content_type_fallback) {
                    Classification::Nested(nested) => {
                        if let Some(max_depth) = self.config.max_depth {
                            if depth + 1 > max_depth {
                                self.fail(
                                    depth,
                                    &boundary,
                                    None,
                                    ExtractError::DepthLimitExceeded { max_depth },
                                );
                                continue;
                            }
                        }

                        match part.stream() {
                            Ok(body) => self.walk(Box::pin(body), nested, depth + 1).await,
                            Err(err) => self.fail(depth, &boundary, None, err),
                        }
                    }
                    Classification::MissingBoundary(media_type) => {
                        self.fail(depth, &boundary, None, ExtractError::Boundary { media_type });
                    }
                    Classification::Rejected(value) => {
                        self.fail(depth, &boundary, None, ExtractError::ContentType { value });
                    }
                    Classification::Leaf => {
                        leaves += 1;
                        self.store_leaf(&mut part, &boundary, depth, leaves).await;
                    }
                }
            }

            self.diagnostics.leave_level(depth, &boundary);
        }
        .boxed()
    }

    async fn store_leaf(&mut self, part: &mut Part, boundary: &str, depth: usize, sibling: usize) {
        #[cfg(feature = "tracing")]
        if let PartContentType::Invalid(raw) = part.content_type() {
            tracing::warn!(
                depth = depth,
                boundary = boundary,
                content_type = raw.as_str(),
                "extract: unparsable Content-Type, treating part as opaque leaf"
            );
        }

        let file_name = self.namer.assign(part, boundary, sibling);

        let body = match part.bytes() {
            Ok(body) => body,
            Err(err) => return self.fail(depth, boundary, Some(file_name), err),
        };

        let decoded = match part.transfer_encoding().decode(body) {
            Ok(decoded) => decoded,
            Err(err) => return self.fail(depth, boundary, Some(file_name), err.into()),
        };

        match self
            .storage
            .store(&file_name, part.content_type().as_declared(), decoded)
            .await
        {
            Ok(stored) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(
                    depth = depth,
                    boundary = boundary,
                    file_name = stored.file_name.as_str(),
                    encoding = part.transfer_encoding().as_str(),
                    size = stored.size,
                    "extract: stored leaf part"
                );
                self.report.outputs.push(stored);
            }
            Err(err) => self.fail(depth, boundary, Some(file_name), err.into()),
        }
    }

    fn fail(&mut self, depth: usize, boundary: &str, file_name: Option<String>, error: ExtractError) {
        #[cfg(feature = "tracing")]
        tracing::warn!(
            depth = depth,
            boundary = boundary,
            file_name = file_name.as_deref().unwrap_or("<none>"),
            error = %error,
            "extract: part skipped"
        );

        let failure = PartFailure {
            depth,
            boundary: boundary.to_owned(),
            file_name,
            error,
        };
        self.diagnostics.part_failed(&failure);
        self.report.failures.push(failure);
    }
}
