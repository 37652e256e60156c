#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core crate surface for `mimesplit`: recursive MIME multipart decomposition.

/// Fluent builder API.
pub mod builder;
/// Extraction configuration.
pub mod config;
/// Content-Transfer-Encoding decoding.
pub mod decode;
/// Error types exposed by this crate.
pub mod error;
/// Recursive traversal engine.
pub mod extract;
/// Top-level message reading and header summary.
pub mod message;
/// High-level multipart stream type.
pub mod multipart;
/// Output file naming.
pub mod naming;
/// Parsed MIME part API.
pub mod part;
/// Low-level parser components.
pub mod parser;
/// RFC 2047 header decoding.
pub mod rfc2047;
/// Storage engine traits and implementations.
pub mod storage;
/// Diagnostic trace sinks.
pub mod trace;

pub use builder::ExtractorBuilder;
pub use config::{ContentTypeFallback, ExtractConfig, NamingPolicy};
pub use decode::TransferEncoding;
pub use error::{ConfigError, DecodeError, ExtractError, ParseError, StorageError};
pub use extract::{ByteStream, ExtractReport, PartFailure};
pub use message::{HeaderSummary, Message};
pub use multipart::Multipart;
pub use part::Part;
pub use storage::{DiskStorage, DiskStorageBuilder, MemoryStorage, StorageEngine, StoredFile};
pub use trace::{Diagnostics, IndentedTrace, NoopDiagnostics};

/// Main `mimesplit` entry point.
///
/// Owns the output sink, the diagnostic sink and the configuration; each
/// `extract_*` call is one independent run.
#[derive(Debug)]
pub struct Extractor<S, D = NoopDiagnostics> {
    config: ExtractConfig,
    storage: S,
    diagnostics: D,
}

impl<S> Extractor<S, NoopDiagnostics> {
    /// Creates a new extractor with default configuration and no diagnostics.
    pub fn new(storage: S) -> Self {
        Self {
            config: ExtractConfig::default(),
            storage,
            diagnostics: NoopDiagnostics,
        }
    }
}

impl<S, D> Extractor<S, D> {
    /// Creates a new extractor with explicit validated configuration.
    pub fn with_config(storage: S, diagnostics: D, config: ExtractConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            storage,
            diagnostics,
        })
    }

    /// Returns an immutable reference to the active configuration.
    pub fn config(&self) -> &ExtractConfig {
        &self.config
    }

    /// Returns an immutable reference to the configured storage backend.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Returns the diagnostic sink.
    pub fn diagnostics(&self) -> &D {
        &self.diagnostics
    }

    /// Consumes the extractor, returning its diagnostic sink.
    pub fn into_diagnostics(self) -> D {
        self.diagnostics
    }
}
