use chrono::{DateTime, Utc};
use log::{info, warn};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::content::{converge_content, default_content, RawContent};
use super::extraction::{non_empty_str, rule_for, CanonicalField};
use super::normalizer_model::{
    NormalizationOutcome, Normalized, NormalizerConfig, ValidationIssue,
};
use super::sanitize::escape_html;
use super::score::coerce_score;
use super::validation::{validate_strict, StrictPayload};
use crate::constants::{
    FALLBACK_SOURCE, PLACEHOLDER_COMPANY_NAME, PLACEHOLDER_IMAGE_URL, PLACEHOLDER_VACANCY_TITLE,
};
use crate::results::{AnalysisResult, ResultMeta};
use crate::utils::time_utils::format_timestamp;

/// Generates an opaque result id: 32 lowercase hex characters.
pub fn generate_result_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Turns untyped webhook bodies into canonical results.
///
/// Normalization never fails. A body that does not pass the strict schema
/// goes through the fallback path, which recovers what it can and fills the
/// rest with placeholders.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    config: NormalizerConfig,
}

impl Normalizer {
    pub fn new(config: NormalizerConfig) -> Self {
        Self { config }
    }

    /// Normalizes `body`. `received_at` becomes the provisional timestamp;
    /// the ingest service restamps it at insertion.
    pub fn normalize(&self, body: &Value, received_at: DateTime<Utc>) -> Normalized {
        match validate_strict(body) {
            Ok(payload) => {
                let result = self.build_strict(payload, received_at);
                info!(
                    "Webhook payload passed strict validation (result {}, score {:?})",
                    result.id, result.score
                );
                Normalized {
                    result,
                    outcome: NormalizationOutcome::Strict,
                }
            }
            Err(issues) => {
                let result = self.build_fallback(body, received_at);
                warn!(
                    "Webhook payload failed validation, using fallback for result {}: {}",
                    result.id,
                    issues
                        .iter()
                        .map(ValidationIssue::to_string)
                        .collect::<Vec<_>>()
                        .join("; ")
                );
                Normalized {
                    result,
                    outcome: NormalizationOutcome::Fallback { issues },
                }
            }
        }
    }

    fn build_strict(&self, payload: StrictPayload<'_>, received_at: DateTime<Utc>) -> AnalysisResult {
        let company_name = escape_html(payload.company_name);
        let vacancy_title = escape_html(payload.vacancy_title);
        // A blob holding only a heading converges to nothing.
        let content = Some(converge_content(
            &payload.content,
            self.config.content_format,
            &self.config.split_rule,
        ))
        .filter(|content| !content.is_empty())
        .unwrap_or_else(|| {
            default_content(&company_name, &vacancy_title, self.config.content_format)
        });

        AnalysisResult {
            id: generate_result_id(),
            company_name,
            vacancy_title,
            ideal_candidate_image_url: payload.image_url.to_string(),
            content,
            score: payload.score.and_then(coerce_score),
            timestamp: received_at,
            meta: payload.meta,
        }
    }

    fn build_fallback(&self, body: &Value, received_at: DateTime<Utc>) -> AnalysisResult {
        let empty = Map::new();
        let object = body.as_object().unwrap_or(&empty);

        let company_name = lenient_text(object, CanonicalField::CompanyName)
            .map(escape_html)
            .unwrap_or_else(|| PLACEHOLDER_COMPANY_NAME.to_string());
        let vacancy_title = lenient_text(object, CanonicalField::VacancyTitle)
            .map(escape_html)
            .unwrap_or_else(|| PLACEHOLDER_VACANCY_TITLE.to_string());
        let ideal_candidate_image_url = lenient_text(object, CanonicalField::ImageUrl)
            .unwrap_or(PLACEHOLDER_IMAGE_URL)
            .to_string();

        let content = rule_for(CanonicalField::Content)
            .find_lenient(object)
            .and_then(|(_, value)| RawContent::from_value(value))
            .map(|raw| {
                converge_content(&raw, self.config.content_format, &self.config.split_rule)
            })
            .filter(|content| !content.is_empty())
            .unwrap_or_else(|| {
                default_content(&company_name, &vacancy_title, self.config.content_format)
            });

        let score = rule_for(CanonicalField::Score)
            .find_lenient(object)
            .and_then(|(_, value)| coerce_score(value));

        AnalysisResult {
            id: generate_result_id(),
            company_name,
            vacancy_title,
            ideal_candidate_image_url,
            content,
            score,
            timestamp: received_at,
            meta: Some(ResultMeta {
                source: Some(FALLBACK_SOURCE.to_string()),
                analysis_id: Some(format!("fallback-{}", received_at.timestamp_millis())),
                submitted_at: Some(format_timestamp(&received_at)),
            }),
        }
    }
}

fn lenient_text(object: &Map<String, Value>, field: CanonicalField) -> Option<&str> {
    rule_for(field)
        .find_lenient(object)
        .and_then(|(_, value)| non_empty_str(value))
}
