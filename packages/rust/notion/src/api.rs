//! Wire models for the subset of the Notion REST API we consume.
//!
//! Unknown property kinds and block types are kept as explicit
//! "unsupported" values instead of failing the whole response.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use deepnotes_shared::{ContentBlock, StyledRun};

// ---------------------------------------------------------------------------
// Pagination
// ---------------------------------------------------------------------------

/// One page of a cursor-paginated list endpoint.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub(crate) struct PaginatedList<T> {
    #[serde(default)]
    pub results: Vec<T>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

/// Body of a non-success response.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    pub message: String,
}

// ---------------------------------------------------------------------------
// Pages and properties
// ---------------------------------------------------------------------------

/// A database row as returned by `databases/{id}/query`.
#[derive(Debug, Deserialize)]
pub(crate) struct PageObject {
    pub id: String,
    #[serde(default)]
    pub last_edited_time: Option<String>,
    #[serde(default)]
    pub properties: HashMap<String, PropertyValue>,
}

/// A single typed property value.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub(crate) enum PropertyValue {
    Title {
        #[serde(default)]
        title: Vec<RichTextItem>,
    },
    RichText {
        #[serde(default)]
        rich_text: Vec<RichTextItem>,
    },
    Select {
        select: Option<SelectOption>,
    },
    MultiSelect {
        #[serde(default)]
        multi_select: Vec<SelectOption>,
    },
    Number {
        number: Option<f64>,
    },
    CreatedTime {
        created_time: Option<String>,
    },
    Formula {
        formula: FormulaValue,
    },
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SelectOption {
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub(crate) enum FormulaValue {
    String { string: Option<String> },
    #[serde(other)]
    Other,
}

// ---------------------------------------------------------------------------
// Rich text
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct RichTextItem {
    /// Present only for `type: "text"` items; mentions and equations lack it.
    #[serde(default)]
    pub text: Option<TextContent>,
    #[serde(default)]
    pub annotations: Annotations,
    #[serde(default)]
    pub plain_text: String,
    #[serde(default)]
    pub href: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TextContent {
    pub content: String,
    #[serde(default)]
    pub link: Option<TextLink>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TextLink {
    pub url: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct Annotations {
    pub bold: bool,
    pub italic: bool,
    pub strikethrough: bool,
    pub underline: bool,
    pub code: bool,
}

/// Convert rich-text items into styled runs, skipping non-text items.
pub(crate) fn to_runs(items: &[RichTextItem]) -> Vec<StyledRun> {
    items
        .iter()
        .filter_map(|item| {
            let text = item.text.as_ref()?;
            let link = item
                .href
                .clone()
                .or_else(|| text.link.as_ref().map(|l| l.url.clone()));
            Some(StyledRun {
                text: text.content.clone(),
                bold: item.annotations.bold,
                italic: item.annotations.italic,
                strikethrough: item.annotations.strikethrough,
                underline: item.annotations.underline,
                code: item.annotations.code,
                link,
            })
        })
        .collect()
}

/// Concatenated plain text of all items.
pub(crate) fn plain_text(items: &[RichTextItem]) -> String {
    items.iter().map(|item| item.plain_text.as_str()).collect()
}

// ---------------------------------------------------------------------------
// Blocks
// ---------------------------------------------------------------------------

/// A block child, kept loosely typed until its `type` is inspected.
#[derive(Debug, Deserialize)]
pub(crate) struct RawBlock {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct TextBlockBody {
    #[serde(default)]
    rich_text: Vec<RichTextItem>,
}

#[derive(Debug, Deserialize)]
struct CodeBlockBody {
    #[serde(default)]
    rich_text: Vec<RichTextItem>,
    #[serde(default)]
    language: Option<String>,
}

impl RawBlock {
    /// Map the block onto the closed [`ContentBlock`] set.
    ///
    /// Unknown types, and known types whose body does not decode, become
    /// [`ContentBlock::Unsupported`].
    pub(crate) fn into_content_block(mut self) -> ContentBlock {
        let body = self.payload.remove(&self.kind).unwrap_or(Value::Null);

        let block = match self.kind.as_str() {
            "paragraph" => text_body(body).map(ContentBlock::Paragraph),
            "heading_1" => text_body(body).map(|runs| ContentBlock::Heading { level: 1, runs }),
            "heading_2" => text_body(body).map(|runs| ContentBlock::Heading { level: 2, runs }),
            "heading_3" => text_body(body).map(|runs| ContentBlock::Heading { level: 3, runs }),
            "bulleted_list_item" => text_body(body).map(ContentBlock::BulletedItem),
            "numbered_list_item" => text_body(body).map(ContentBlock::NumberedItem),
            "quote" => text_body(body).map(ContentBlock::Quote),
            "code" => serde_json::from_value::<CodeBlockBody>(body)
                .map(|code| ContentBlock::Code {
                    language: code.language.unwrap_or_default(),
                    text: to_runs(&code.rich_text)
                        .into_iter()
                        .map(|run| run.text)
                        .collect(),
                })
                .map_err(|e| e.to_string()),
            other => {
                debug!(kind = other, "unsupported block type");
                return ContentBlock::Unsupported {
                    kind: other.to_string(),
                };
            }
        };

        block.unwrap_or_else(|error| {
            warn!(kind = %self.kind, %error, "malformed block body, skipping");
            ContentBlock::Unsupported { kind: self.kind }
        })
    }
}

fn text_body(body: Value) -> Result<Vec<StyledRun>, String> {
    serde_json::from_value::<TextBlockBody>(body)
        .map(|b| to_runs(&b.rich_text))
        .map_err(|e| e.to_string())
}
