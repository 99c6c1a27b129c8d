//! Content convergence: every accepted input shape becomes the canonical one.

use scraper::{ElementRef, Html, Selector};
use serde_json::Value;

use super::extraction::non_empty_str;
use super::normalizer_model::{ContentFormat, SplitRule};
use super::sanitize::escape_html;
use crate::results::AnalysisContent;

/// Advice shown when the fallback path recovers no content at all.
const DEFAULT_TIPS: [(&str, &str); 4] = [
    (
        "Specifieke vereisten toevoegen",
        "Voeg meer specifieke vereisten toe aan je vacature om de juiste kandidaten aan te trekken.",
    ),
    (
        "Bedrijfscultuur beschrijven",
        "Beschrijf de bedrijfscultuur en waarden om kandidaten een beter beeld te geven van de werkomgeving.",
    ),
    (
        "Salaris vermelden",
        "Vermeld het salaris of salarisrange om transparantie te bieden en geschikte kandidaten aan te trekken.",
    ),
    (
        "Thuiswerk mogelijkheden",
        "Specificeer thuiswerk mogelijkheden om flexibiliteit te bieden en meer kandidaten aan te spreken.",
    ),
];

/// Content as it arrived, before convergence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawContent<'a> {
    /// An HTML blob, possibly led by a heading line.
    Markup(&'a str),
    /// A list of advisory strings.
    Items(Vec<&'a str>),
}

impl<'a> RawContent<'a> {
    /// Reads a string or an array of strings. Blank entries are skipped.
    pub fn from_value(value: &'a Value) -> Option<Self> {
        match value {
            Value::String(text) if !text.trim().is_empty() => Some(RawContent::Markup(text)),
            Value::Array(items) => {
                let items: Vec<&str> = items.iter().filter_map(non_empty_str).collect();
                (!items.is_empty()).then_some(RawContent::Items(items))
            }
            _ => None,
        }
    }
}

/// Converges raw content into the deployment's canonical format.
pub fn converge_content(
    raw: &RawContent<'_>,
    format: ContentFormat,
    rule: &SplitRule,
) -> AnalysisContent {
    match (raw, format) {
        (RawContent::Markup(markup), ContentFormat::Html) => {
            let (paragraph, tips) = rule.split(rule.strip_heading(markup));
            AnalysisContent::Html {
                paragraph: paragraph.to_string(),
                tips: tips.to_string(),
            }
        }
        (RawContent::Items(items), ContentFormat::Html) => AnalysisContent::Html {
            paragraph: String::new(),
            tips: render_list(items.iter().copied()),
        },
        (RawContent::Markup(markup), ContentFormat::Tips) => {
            let (paragraph, tips) = rule.split(rule.strip_heading(markup));
            let mut items = list_items(tips);
            if items.is_empty() {
                let text = collapse_whitespace(&fragment_text(&format!("{paragraph} {tips}")));
                if !text.is_empty() {
                    items.push(text);
                }
            }
            AnalysisContent::Tips {
                items: items.iter().map(|item| escape_html(item)).collect(),
            }
        }
        (RawContent::Items(items), ContentFormat::Tips) => AnalysisContent::Tips {
            items: items.iter().map(|item| escape_html(item.trim())).collect(),
        },
    }
}

/// Placeholder advice naming the (already escaped) company and title.
pub fn default_content(company_name: &str, vacancy_title: &str, format: ContentFormat) -> AnalysisContent {
    match format {
        ContentFormat::Html => {
            let paragraph = format!(
                "<p>De vacaturetekst voor {vacancy_title} bij {company_name} heeft een goede basis, maar er zijn enkele verbeterpunten mogelijk.</p>"
            );
            let tips = DEFAULT_TIPS
                .iter()
                .map(|(title, body)| format!("<li><h3>{title}</h3><p>{body}</p></li>"))
                .collect::<String>();
            AnalysisContent::Html {
                paragraph,
                tips: format!("<ul>{tips}</ul>"),
            }
        }
        ContentFormat::Tips => AnalysisContent::Tips {
            items: DEFAULT_TIPS
                .iter()
                .map(|(title, _)| (*title).to_string())
                .collect(),
        },
    }
}

fn render_list<'a>(items: impl Iterator<Item = &'a str>) -> String {
    let body: String = items
        .map(|item| format!("<li>{}</li>", escape_html(item.trim())))
        .collect();
    format!("<ul>{body}</ul>")
}

/// Text of each `<li>`, preferring its heading when it has one.
fn list_items(markup: &str) -> Vec<String> {
    let (Ok(item_selector), Ok(heading_selector)) = (
        Selector::parse("li"),
        Selector::parse("h1, h2, h3, h4, h5, h6, strong, b"),
    ) else {
        return Vec::new();
    };

    let fragment = Html::parse_fragment(markup);
    fragment
        .select(&item_selector)
        .filter(|item| !has_list_item_ancestor(item))
        .filter_map(|item| {
            let heading = item
                .select(&heading_selector)
                .map(|heading| collapse_whitespace(&element_text(&heading)))
                .find(|text| !text.is_empty());
            let text = heading.unwrap_or_else(|| collapse_whitespace(&element_text(&item)));
            (!text.is_empty()).then_some(text)
        })
        .collect()
}

fn has_list_item_ancestor(element: &ElementRef<'_>) -> bool {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(|ancestor| ancestor.value().name() == "li")
}

fn element_text(element: &ElementRef<'_>) -> String {
    element.text().collect::<Vec<_>>().join(" ")
}

fn fragment_text(markup: &str) -> String {
    let fragment = Html::parse_fragment(markup);
    fragment.root_element().text().collect::<Vec<_>>().join(" ")
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
