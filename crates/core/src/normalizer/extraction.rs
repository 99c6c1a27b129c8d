//! Ordered field-name rules for locating canonical fields in a raw body.
//!
//! Adding a legacy alias is a change to [`EXTRACTION_RULES`] only.

use serde_json::{Map, Value};

/// Canonical result fields that can be recovered from a raw body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CanonicalField {
    CompanyName,
    VacancyTitle,
    ImageUrl,
    Content,
    Score,
}

/// Candidate field names for one canonical field, in priority order.
///
/// `schema` names are the ones the strict schema knows about. `aliases` are
/// only consulted by the fallback path, after the schema names.
#[derive(Debug)]
pub struct ExtractionRule {
    pub target: CanonicalField,
    pub schema: &'static [&'static str],
    pub aliases: &'static [&'static str],
}

impl ExtractionRule {
    /// Schema names followed by aliases.
    pub fn candidates(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.schema.iter().chain(self.aliases.iter()).copied()
    }

    /// First schema field holding a usable value.
    pub fn find_strict<'a>(&self, body: &'a Map<String, Value>) -> Option<(&'static str, &'a Value)> {
        self.find_in(self.schema.iter().copied(), body)
    }

    /// First schema field or alias holding a usable value.
    pub fn find_lenient<'a>(
        &self,
        body: &'a Map<String, Value>,
    ) -> Option<(&'static str, &'a Value)> {
        self.find_in(self.candidates(), body)
    }

    fn find_in<'a>(
        &self,
        names: impl Iterator<Item = &'static str>,
        body: &'a Map<String, Value>,
    ) -> Option<(&'static str, &'a Value)> {
        names
            .filter_map(|name| body.get(name).map(|value| (name, value)))
            .find(|(_, value)| is_usable(self.target, value))
    }
}

pub static EXTRACTION_RULES: [ExtractionRule; 5] = [
    ExtractionRule {
        target: CanonicalField::CompanyName,
        schema: &["company_name"],
        aliases: &["companyName"],
    },
    ExtractionRule {
        target: CanonicalField::VacancyTitle,
        schema: &["vacancy_title"],
        aliases: &["vacancyTitle", "job_title"],
    },
    ExtractionRule {
        target: CanonicalField::ImageUrl,
        schema: &["ideal_candidate_image_url"],
        aliases: &["idealCandidateImageUrl"],
    },
    ExtractionRule {
        target: CanonicalField::Content,
        schema: &["analysis_content", "tips"],
        aliases: &["content"],
    },
    ExtractionRule {
        target: CanonicalField::Score,
        schema: &["score", "Score"],
        aliases: &[],
    },
];

/// Looks up the rule for a canonical field.
pub fn rule_for(target: CanonicalField) -> &'static ExtractionRule {
    match target {
        CanonicalField::CompanyName => &EXTRACTION_RULES[0],
        CanonicalField::VacancyTitle => &EXTRACTION_RULES[1],
        CanonicalField::ImageUrl => &EXTRACTION_RULES[2],
        CanonicalField::Content => &EXTRACTION_RULES[3],
        CanonicalField::Score => &EXTRACTION_RULES[4],
    }
}

/// Whether a raw value can populate the target field.
///
/// Empty strings never count. A score of `0` does.
fn is_usable(target: CanonicalField, value: &Value) -> bool {
    match target {
        CanonicalField::CompanyName | CanonicalField::VacancyTitle | CanonicalField::ImageUrl => {
            non_empty_str(value).is_some()
        }
        CanonicalField::Content => match value {
            Value::String(text) => !text.trim().is_empty(),
            Value::Array(items) => items.iter().any(|item| non_empty_str(item).is_some()),
            _ => false,
        },
        CanonicalField::Score => match value {
            Value::Null => false,
            Value::String(text) => !text.trim().is_empty(),
            _ => true,
        },
    }
}

pub(crate) fn non_empty_str(value: &Value) -> Option<&str> {
    value.as_str().map(str::trim).filter(|text| !text.is_empty())
}
