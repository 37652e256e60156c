use crate::{
    config::{ContentTypeFallback, ExtractConfig, NamingPolicy},
    error::ConfigError,
    storage::StorageEngine,
    trace::{Diagnostics, NoopDiagnostics},
    Extractor,
};

/// Builder for configuring an [`Extractor`].
#[derive(Debug, Clone, Default)]
pub struct ExtractorBuilder {
    config: ExtractConfig,
}

impl ExtractorBuilder {
    /// Creates a builder with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current builder configuration snapshot.
    pub fn config(&self) -> &ExtractConfig {
        &self.config
    }

    /// Replaces the full builder configuration.
    pub fn with_config(mut self, config: ExtractConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the output name numbering policy.
    pub fn naming(mut self, policy: NamingPolicy) -> Self {
        self.config.naming = policy;
        self
    }

    /// Sets how parts with an unparsable `Content-Type` are handled.
    pub fn content_type_fallback(mut self, fallback: ContentTypeFallback) -> Self {
        self.config.content_type_fallback = fallback;
        self
    }

    /// Bounds multipart nesting depth.
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.config.max_depth = Some(max_depth);
        self
    }

    /// Validates builder configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.config.validate()
    }

    /// Finalizes and returns validated configuration.
    pub fn build_config(self) -> Result<ExtractConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }

    /// Builds an extractor writing through `storage`, without diagnostics.
    pub fn build<S>(self, storage: S) -> Result<Extractor<S, NoopDiagnostics>, ConfigError>
    where
        S: StorageEngine,
    {
        self.build_with_diagnostics(storage, NoopDiagnostics)
    }

    /// Builds an extractor writing through `storage` and reporting to `diagnostics`.
    pub fn build_with_diagnostics<S, D>(
        self,
        storage: S,
        diagnostics: D,
    ) -> Result<Extractor<S, D>, ConfigError>
    where
        S: StorageEngine,
        D: Diagnostics,
    {
        Extractor::with_config(storage, diagnostics, self.build_config()?)
    }
}
