#![allow(missing_docs)]

use mimesplit::{
    ConfigError, ContentTypeFallback, ExtractConfig, Extractor, ExtractorBuilder, MemoryStorage,
    NamingPolicy, NoopDiagnostics,
};

#[test]
fn defaults_follow_literal_naming_and_leaf_fallback() {
    let config = ExtractConfig::default();
    assert_eq!(config.naming, NamingPolicy::Literal);
    assert_eq!(config.content_type_fallback, ContentTypeFallback::Leaf);
    assert_eq!(config.max_depth, None);
    assert!(config.validate().is_ok());
}

#[test]
fn rejects_zero_max_depth() {
    let config = ExtractConfig {
        max_depth: Some(0),
        ..ExtractConfig::default()
    };

    assert_eq!(
        config.validate(),
        Err(ConfigError::InvalidLimitValue { limit: "max_depth" })
    );
}

#[test]
fn builder_applies_every_setting() {
    let config = ExtractorBuilder::new()
        .naming(NamingPolicy::Unique)
        .content_type_fallback(ContentTypeFallback::Reject)
        .max_depth(4)
        .build_config()
        .expect("configuration should be valid");

    assert_eq!(
        config,
        ExtractConfig {
            naming: NamingPolicy::Unique,
            content_type_fallback: ContentTypeFallback::Reject,
            max_depth: Some(4),
        }
    );
}

#[test]
fn builder_refuses_invalid_configuration() {
    let builder = ExtractorBuilder::new().max_depth(0);
    assert!(builder.validate().is_err());

    let err = builder
        .build(MemoryStorage::new())
        .expect_err("zero depth must be rejected");
    assert_eq!(err.to_string(), "limit `max_depth` must be greater than 0");
}

#[test]
fn with_config_replaces_the_snapshot() {
    let config = ExtractConfig {
        naming: NamingPolicy::Unique,
        ..ExtractConfig::new()
    };
    let builder = ExtractorBuilder::new().with_config(config.clone());
    assert_eq!(builder.config(), &config);

    let extractor = builder
        .build(MemoryStorage::new())
        .expect("configuration should be valid");
    assert_eq!(extractor.config(), &config);
}

#[test]
fn extractor_constructors_validate() {
    let extractor = Extractor::new(MemoryStorage::new());
    assert_eq!(extractor.config(), &ExtractConfig::default());

    let result = Extractor::with_config(
        MemoryStorage::new(),
        NoopDiagnostics,
        ExtractConfig {
            max_depth: Some(0),
            ..ExtractConfig::default()
        },
    );
    assert!(matches!(
        result,
        Err(ConfigError::InvalidLimitValue { limit: "max_depth" })
    ));
}
