//! Core domain types: remote documents, content blocks, and navigation nodes.

use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

// ---------------------------------------------------------------------------
// StyledRun
// ---------------------------------------------------------------------------

/// A contiguous span of text sharing one set of inline styles and an optional link.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyledRun {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
    pub strikethrough: bool,
    pub underline: bool,
    pub code: bool,
    /// Hyperlink target. An empty string is treated as no link.
    pub link: Option<String>,
}

impl StyledRun {
    /// An unstyled run.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }
}

// ---------------------------------------------------------------------------
// ContentBlock
// ---------------------------------------------------------------------------

/// One structural unit of a remote document's body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentBlock {
    Paragraph(Vec<StyledRun>),
    /// Heading with `level` in `1..=3`.
    Heading { level: u8, runs: Vec<StyledRun> },
    BulletedItem(Vec<StyledRun>),
    NumberedItem(Vec<StyledRun>),
    Quote(Vec<StyledRun>),
    /// Code carries plain text only; styling inside code is dropped.
    Code { language: String, text: String },
    /// A block type the renderer does not know. Rendered as nothing.
    Unsupported { kind: String },
}

// ---------------------------------------------------------------------------
// Documents
// ---------------------------------------------------------------------------

/// Typed view of a page's property bag.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentProperties {
    pub title: String,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub language: Option<String>,
    pub tags: Vec<String>,
    pub created: Option<DateTime<Utc>>,
    pub last_edited: Option<DateTime<Utc>>,
    pub summary: Option<String>,
    pub chapter: Option<u32>,
    pub section: Option<u32>,
    /// Destination relative to the docs directory (e.g. `Math/Algebra/groups.md`).
    pub sync_path: Option<String>,
}

/// A page returned by the database query, before its blocks are fetched.
#[derive(Debug, Clone, PartialEq)]
pub struct PageSummary {
    pub id: String,
    pub properties: DocumentProperties,
}

/// Immutable snapshot of one remote page and its ordered blocks.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteDocument {
    pub id: String,
    pub properties: DocumentProperties,
    pub blocks: Vec<ContentBlock>,
}

// ---------------------------------------------------------------------------
// NavNode
// ---------------------------------------------------------------------------

/// A node of the navigation index.
///
/// Serializes as a single-entry mapping, `label: path` for leaves and
/// `label: [children]` for groups, which is the shape MkDocs expects under
/// its `nav` key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavNode {
    Leaf { label: String, path: String },
    Group { label: String, children: Vec<NavNode> },
}

impl NavNode {
    pub fn leaf(label: impl Into<String>, path: impl Into<String>) -> Self {
        Self::Leaf {
            label: label.into(),
            path: path.into(),
        }
    }

    pub fn group(label: impl Into<String>, children: Vec<NavNode>) -> Self {
        Self::Group {
            label: label.into(),
            children,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Leaf { label, .. } | Self::Group { label, .. } => label,
        }
    }

    /// Children of a group; empty for leaves.
    pub fn children(&self) -> &[NavNode] {
        match self {
            Self::Leaf { .. } => &[],
            Self::Group { children, .. } => children,
        }
    }
}

impl Serialize for NavNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        match self {
            Self::Leaf { label, path } => map.serialize_entry(label, path)?,
            Self::Group { label, children } => map.serialize_entry(label, children)?,
        }
        map.end()
    }
}
