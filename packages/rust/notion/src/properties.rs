//! Extraction of the fixed note schema from a page's property bag.

use chrono::{DateTime, Utc};
use tracing::warn;

use deepnotes_shared::{DocumentProperties, PageSummary};

use crate::api::{FormulaValue, PageObject, PropertyValue, plain_text};

const TITLE: &str = "Title";
const CATEGORY: &str = "Category";
const SUBCATEGORY: &str = "Subcategory";
const LANGUAGE: &str = "Language";
const TAGS: &str = "Tags";
const CREATED: &str = "Created";
const SUMMARY: &str = "Summary";
const CHAPTER: &str = "Chapter";
const SECTION: &str = "Section";
const SYNC_PATH: &str = "Sync_Path";

/// Title used when a page has no title text.
pub const UNTITLED: &str = "Untitled";

impl From<PageObject> for PageSummary {
    fn from(page: PageObject) -> Self {
        let properties = extract_properties(&page);
        PageSummary {
            id: page.id,
            properties,
        }
    }
}

/// Build [`DocumentProperties`] from a page.
///
/// Missing or wrongly typed properties read as absent; they never fail the page.
pub(crate) fn extract_properties(page: &PageObject) -> DocumentProperties {
    let props = &page.properties;

    let title = title_text(page)
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| UNTITLED.to_string());

    let select = |name: &str| match props.get(name) {
        Some(PropertyValue::Select {
            select: Some(option),
        }) => Some(option.name.clone()),
        _ => None,
    };

    let tags = match props.get(TAGS) {
        Some(PropertyValue::MultiSelect { multi_select }) => {
            multi_select.iter().map(|o| o.name.clone()).collect()
        }
        _ => Vec::new(),
    };

    let created = match props.get(CREATED) {
        Some(PropertyValue::CreatedTime {
            created_time: Some(ts),
        }) => parse_timestamp(CREATED, ts),
        _ => None,
    };

    let summary = match props.get(SUMMARY) {
        Some(PropertyValue::RichText { rich_text }) => {
            Some(plain_text(rich_text).trim().to_string()).filter(|s| !s.is_empty())
        }
        _ => None,
    };

    let sync_path = match props.get(SYNC_PATH) {
        Some(PropertyValue::Formula {
            formula: FormulaValue::String { string: Some(path) },
        }) => Some(path.trim().to_string()).filter(|p| !p.is_empty()),
        _ => None,
    };

    DocumentProperties {
        title,
        category: select(CATEGORY),
        subcategory: select(SUBCATEGORY),
        language: select(LANGUAGE),
        tags,
        created,
        last_edited: page
            .last_edited_time
            .as_deref()
            .and_then(|ts| parse_timestamp("last_edited_time", ts)),
        summary,
        chapter: ordinal(page, CHAPTER),
        section: ordinal(page, SECTION),
        sync_path,
    }
}

/// Text of the `Title` property, or of whichever property has the title type.
fn title_text(page: &PageObject) -> Option<String> {
    let from = |value: &PropertyValue| match value {
        PropertyValue::Title { title } => Some(plain_text(title).trim().to_string()),
        _ => None,
    };

    page.properties.get(TITLE).and_then(from).or_else(|| {
        // A database has exactly one title property, whatever it is named.
        page.properties.values().find_map(from)
    })
}

/// A number property holding a positive whole number.
fn ordinal(page: &PageObject, name: &str) -> Option<u32> {
    let Some(PropertyValue::Number { number: Some(n) }) = page.properties.get(name) else {
        return None;
    };

    if n.is_finite() && *n >= 1.0 && n.fract() == 0.0 && *n <= f64::from(u32::MAX) {
        Some(*n as u32)
    } else {
        warn!(page = %page.id, property = name, value = n, "ignoring non-ordinal number");
        None
    }
}

fn parse_timestamp(property: &str, raw: &str) -> Option<DateTime<Utc>> {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(ts) => Some(ts.with_timezone(&Utc)),
        Err(error) => {
            warn!(property, raw, %error, "ignoring unparsable timestamp");
            None
        }
    }
}
