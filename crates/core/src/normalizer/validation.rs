//! Strict schema for webhook payloads.
//!
//! Collects every field-level issue instead of stopping at the first one,
//! so operators see the whole picture when a payload degrades.

use serde_json::{Map, Value};

use super::content::RawContent;
use super::extraction::{rule_for, CanonicalField};
use super::normalizer_model::ValidationIssue;
use crate::results::ResultMeta;

const META_FIELDS: [&str; 3] = ["source", "analysis_id", "submitted_at"];

/// A payload that passed strict validation. Borrowed from the raw body.
#[derive(Debug)]
pub(crate) struct StrictPayload<'a> {
    pub company_name: &'a str,
    pub vacancy_title: &'a str,
    pub image_url: &'a str,
    pub content: RawContent<'a>,
    pub score: Option<&'a Value>,
    pub meta: Option<ResultMeta>,
}

pub(crate) fn validate_strict(body: &Value) -> Result<StrictPayload<'_>, Vec<ValidationIssue>> {
    let Some(object) = body.as_object() else {
        return Err(vec![ValidationIssue::new(
            "",
            format!("Expected object, received {}", type_name(body)),
        )]);
    };

    let mut issues = Vec::new();

    let company_name = required_text(
        object,
        CanonicalField::CompanyName,
        "Company name is required",
        &mut issues,
    );
    let vacancy_title = required_text(
        object,
        CanonicalField::VacancyTitle,
        "Vacancy title is required",
        &mut issues,
    );
    let image_url = required_text(
        object,
        CanonicalField::ImageUrl,
        "Image URL is required",
        &mut issues,
    );

    let content_rule = rule_for(CanonicalField::Content);
    for name in content_rule.schema {
        if let Some(value) = present(object, name) {
            check_content_value(name, value, &mut issues);
        }
    }
    let content = content_rule
        .find_strict(object)
        .and_then(|(_, value)| RawContent::from_value(value));
    if content.is_none() {
        issues.push(ValidationIssue::new(
            content_rule.schema.first().copied().unwrap_or_default(),
            format!(
                "Either {} must be provided",
                content_rule.schema.join(" or ")
            ),
        ));
    }

    let score_rule = rule_for(CanonicalField::Score);
    for name in score_rule.schema {
        if let Some(value) = present(object, name) {
            if !matches!(value, Value::String(_) | Value::Number(_)) {
                issues.push(ValidationIssue::new(
                    *name,
                    format!("Expected string or number, received {}", type_name(value)),
                ));
            }
        }
    }
    let score = score_rule.find_strict(object).map(|(_, value)| value);

    let meta = present(object, "meta").and_then(|value| parse_meta(value, &mut issues));

    match (company_name, vacancy_title, image_url, content) {
        (Some(company_name), Some(vacancy_title), Some(image_url), Some(content))
            if issues.is_empty() =>
        {
            Ok(StrictPayload {
                company_name,
                vacancy_title,
                image_url,
                content,
                score,
                meta,
            })
        }
        _ => Err(issues),
    }
}

fn present<'a>(object: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    object.get(name).filter(|value| !value.is_null())
}

fn required_text<'a>(
    object: &'a Map<String, Value>,
    field: CanonicalField,
    empty_message: &str,
    issues: &mut Vec<ValidationIssue>,
) -> Option<&'a str> {
    let rule = rule_for(field);
    let name = rule.schema.first().copied().unwrap_or_default();
    match present(object, name) {
        None => {
            issues.push(ValidationIssue::new(name, "Required"));
            None
        }
        Some(Value::String(text)) if text.trim().is_empty() => {
            issues.push(ValidationIssue::new(name, empty_message));
            None
        }
        Some(Value::String(text)) => Some(text.trim()),
        Some(other) => {
            issues.push(ValidationIssue::new(
                name,
                format!("Expected string, received {}", type_name(other)),
            ));
            None
        }
    }
}

fn check_content_value(name: &str, value: &Value, issues: &mut Vec<ValidationIssue>) {
    match value {
        Value::String(_) => {}
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                if !item.is_string() {
                    issues.push(ValidationIssue::new(
                        format!("{name}[{index}]"),
                        format!("Expected string, received {}", type_name(item)),
                    ));
                }
            }
            if !items
                .iter()
                .any(|item| item.as_str().is_some_and(|text| !text.trim().is_empty()))
            {
                issues.push(ValidationIssue::new(name, "Must contain at least one tip"));
            }
        }
        other => issues.push(ValidationIssue::new(
            name,
            format!("Expected string or array, received {}", type_name(other)),
        )),
    }
}

fn parse_meta(value: &Value, issues: &mut Vec<ValidationIssue>) -> Option<ResultMeta> {
    let Some(object) = value.as_object() else {
        issues.push(ValidationIssue::new(
            "meta",
            format!("Expected object, received {}", type_name(value)),
        ));
        return None;
    };

    let mut fields: [Option<String>; 3] = Default::default();
    for (slot, name) in fields.iter_mut().zip(META_FIELDS) {
        match present(object, name) {
            None => {}
            Some(Value::String(text)) => *slot = Some(text.clone()),
            Some(other) => issues.push(ValidationIssue::new(
                format!("meta.{name}"),
                format!("Expected string, received {}", type_name(other)),
            )),
        }
    }

    let [source, analysis_id, submitted_at] = fields;
    Some(ResultMeta {
        source,
        analysis_id,
        submitted_at,
    })
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
