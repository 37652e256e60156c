use crate::error::ConfigError;

/// How synthesized output names are numbered.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NamingPolicy {
    /// Every synthesized name uses index `1`. Unnamed leaves sharing an
    /// enclosing boundary get the same name and later writes replace earlier ones.
    #[default]
    Literal,
    /// Synthesized names count siblings (`1`, `2`, ...) and any name already
    /// handed out during the run gets a `-<n>` suffix before its extension.
    Unique,
}

/// How a part with an unparsable `Content-Type` is handled.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentTypeFallback {
    /// Treat the part as a leaf of unknown type (no file extension).
    #[default]
    Leaf,
    /// Report the part as failed and write nothing for it.
    Reject,
}

/// Top-level extraction configuration model.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExtractConfig {
    /// Output name numbering policy.
    pub naming: NamingPolicy,
    /// Handling of parts whose `Content-Type` does not parse.
    pub content_type_fallback: ContentTypeFallback,
    /// Maximum multipart nesting depth, the top level being depth 1.
    ///
    /// `None` leaves recursion unbounded.
    pub max_depth: Option<usize>,
}

impl ExtractConfig {
    /// Creates a default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks that every configured value is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_depth == Some(0) {
            return Err(ConfigError::InvalidLimitValue { limit: "max_depth" });
        }

        Ok(())
    }
}
