//! Normalizer module - turns untrusted webhook bodies into canonical results.
//!
//! Strict schema validation runs first. When it fails the normalizer still
//! builds a usable result from whatever fields it can recognise and marks it
//! with `meta.source = "fallback"`.

mod content;
mod extraction;
mod normalizer_model;
mod normalizer_service;
mod sanitize;
mod score;
mod validation;

pub use content::{converge_content, default_content, RawContent};
pub use extraction::{rule_for, CanonicalField, ExtractionRule, EXTRACTION_RULES};
pub use normalizer_model::{
    ContentFormat, Normalized, NormalizationOutcome, NormalizerConfig, SplitRule,
    ValidationIssue,
};
pub use normalizer_service::{generate_result_id, Normalizer};
pub use sanitize::escape_html;
pub use score::coerce_score;
