//! Navigation tree builder.
//!
//! Reads the header of every note under the docs directory and groups the
//! notes into a category → subcategory → chapter → section hierarchy that
//! maps directly onto the MkDocs `nav` list.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, instrument, warn};
use walkdir::WalkDir;

use deepnotes_markdown::{FALLBACK_CATEGORY, parse_header};
use deepnotes_shared::{DeepNotesError, NavNode, Result, SiteConfig};

/// One note as seen by the navigation builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteEntry {
    /// Path relative to the docs directory, `/`-separated.
    pub path: String,
    pub title: String,
    pub category: String,
    pub subcategory: Option<String>,
    pub chapter: Option<u32>,
    pub section: Option<u32>,
}

/// Labels for the fixed top of the tree.
#[derive(Debug, Clone)]
pub struct NavOptions {
    /// Label of the single group holding every category.
    pub root_label: String,
    pub home_label: String,
    /// When set, a `{home_label: home_url}` link is placed first.
    pub home_url: Option<String>,
}

impl Default for NavOptions {
    fn default() -> Self {
        Self {
            root_label: "Deep Notes".into(),
            home_label: "Home".into(),
            home_url: None,
        }
    }
}

impl From<&SiteConfig> for NavOptions {
    fn from(site: &SiteConfig) -> Self {
        Self {
            root_label: site.nav_root_label.clone(),
            home_label: site.home_label.clone(),
            home_url: site.home_url.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Scanning
// ---------------------------------------------------------------------------

/// Collect every `*.md` file under `docs_dir`, sorted by relative path.
#[instrument(skip_all, fields(docs_dir = %docs_dir.display()))]
pub fn scan_notes(docs_dir: &Path) -> Result<Vec<NoteEntry>> {
    let mut entries = Vec::new();

    for item in WalkDir::new(docs_dir).follow_links(true) {
        let item = item.map_err(|e| {
            let path = e.path().unwrap_or(docs_dir).to_path_buf();
            match e.into_io_error() {
                Some(source) => DeepNotesError::io(path, source),
                None => DeepNotesError::config(format!(
                    "filesystem loop under {}",
                    path.display()
                )),
            }
        })?;

        if !item.file_type().is_file()
            || item.path().extension().and_then(|ext| ext.to_str()) != Some("md")
        {
            continue;
        }

        let Ok(relative) = item.path().strip_prefix(docs_dir) else {
            continue;
        };
        let relative = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        let content = match std::fs::read_to_string(item.path()) {
            Ok(content) => content,
            Err(e) => {
                warn!(path = %item.path().display(), error = %e, "unreadable note, using file name only");
                String::new()
            }
        };

        entries.push(note_entry(&relative, &content));
    }

    entries.sort_by(|a, b| a.path.cmp(&b.path));
    debug!(notes = entries.len(), "scanned docs directory");
    Ok(entries)
}

/// Build an entry from a note's relative path and file content.
///
/// Header values win; the file name fills in what the header lacks.
pub fn note_entry(relative_path: &str, content: &str) -> NoteEntry {
    let header = parse_header(content).unwrap_or_else(|| {
        debug!(path = relative_path, "no usable header");
        Default::default()
    });

    let hints = FileNameHints::from_path(relative_path);

    NoteEntry {
        path: relative_path.to_string(),
        title: header.title.unwrap_or(hints.title),
        category: header
            .category
            .unwrap_or_else(|| FALLBACK_CATEGORY.to_string()),
        subcategory: header.subcategory,
        chapter: header.chapter.or(hints.chapter),
        section: header.section.or(hints.section),
    }
}

/// What a note's location says about it.
#[derive(Debug, Default, PartialEq, Eq)]
struct FileNameHints {
    title: String,
    chapter: Option<u32>,
    section: Option<u32>,
}

impl FileNameHints {
    /// `chapter_<N>…` as the stem or parent directory gives the chapter;
    /// `sec_<S>_…` gives the section and `sec_<C>_<S>_…` both numbers.
    fn from_path(relative_path: &str) -> Self {
        static CHAPTER_RE: LazyLock<Regex> =
            LazyLock::new(|| Regex::new(r"^chapter_(\d+)").expect("valid regex"));
        static SECTION_RE: LazyLock<Regex> =
            LazyLock::new(|| Regex::new(r"^sec_((?:\d+_)+)").expect("valid regex"));

        let path = Path::new(relative_path);
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let parent = path
            .parent()
            .and_then(Path::file_name)
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        let chapter_of = |name: &str| {
            CHAPTER_RE
                .captures(name)
                .and_then(|c| c[1].parse::<u32>().ok())
                .filter(|n| *n > 0)
        };

        let numbers: Vec<u32> = SECTION_RE
            .captures(&stem)
            .map(|c| {
                c[1].split('_')
                    .filter_map(|n| n.parse::<u32>().ok())
                    .collect()
            })
            .unwrap_or_default();

        let section = numbers.last().copied().filter(|n| *n > 0);
        let numbered_chapter = if numbers.len() > 1 {
            numbers.first().copied().filter(|n| *n > 0)
        } else {
            None
        };

        Self {
            title: stem.replace('_', " "),
            chapter: chapter_of(&stem)
                .or_else(|| chapter_of(&parent))
                .or(numbered_chapter),
            section,
        }
    }
}

// ---------------------------------------------------------------------------
// Tree building
// ---------------------------------------------------------------------------

/// Build the MkDocs navigation from scanned notes.
///
/// The result does not depend on the order of `entries`.
#[instrument(skip_all, fields(notes = entries.len()))]
pub fn build_nav(entries: &[NoteEntry], opts: &NavOptions) -> Vec<NavNode> {
    let mut sorted: Vec<&NoteEntry> = entries.iter().collect();
    sorted.sort_by(|a, b| a.path.cmp(&b.path));

    let mut categories: BTreeMap<&str, CategoryBucket<'_>> = BTreeMap::new();
    for entry in sorted {
        let bucket = categories.entry(entry.category.as_str()).or_default();
        match entry.subcategory.as_deref() {
            Some(sub) => bucket.subcategories.entry(sub).or_default().push(entry),
            None => bucket.direct.push(entry),
        }
    }

    let category_nodes: Vec<NavNode> = categories
        .into_iter()
        .map(|(name, bucket)| {
            let mut children = layout(bucket.direct);
            children.extend(
                bucket
                    .subcategories
                    .into_iter()
                    .map(|(sub, notes)| NavNode::group(sub, layout(notes))),
            );
            NavNode::group(name, children)
        })
        .collect();

    debug!(categories = category_nodes.len(), "navigation built");

    let mut nav = Vec::with_capacity(2);
    if let Some(url) = &opts.home_url {
        nav.push(NavNode::leaf(&opts.home_label, url));
    }
    nav.push(NavNode::group(&opts.root_label, category_nodes));
    nav
}

#[derive(Default)]
struct CategoryBucket<'a> {
    direct: Vec<&'a NoteEntry>,
    subcategories: BTreeMap<&'a str, Vec<&'a NoteEntry>>,
}

/// Loose notes first, then one group per chapter in ascending order.
///
/// `notes` must be in path order: the chapter's main note is the first one
/// in that order without a section.
fn layout(notes: Vec<&NoteEntry>) -> Vec<NavNode> {
    let mut loose = Vec::new();
    let mut chapters: BTreeMap<u32, Vec<&NoteEntry>> = BTreeMap::new();
    for note in notes {
        match note.chapter {
            Some(n) => chapters.entry(n).or_default().push(note),
            None => loose.push(note),
        }
    }

    loose.sort_by(|a, b| by_section(a, b));
    let mut out: Vec<NavNode> = loose
        .into_iter()
        .map(|note| NavNode::leaf(&note.title, &note.path))
        .collect();

    for (number, mut members) in chapters {
        let main = members
            .iter()
            .position(|note| note.section.is_none())
            .map(|i| members.remove(i));
        members.sort_by(|a, b| by_section(a, b));

        let mut children = Vec::with_capacity(members.len() + 1);
        let label = match main {
            Some(main) => {
                children.push(NavNode::leaf(&main.title, &main.path));
                format!("{number} {}", main.title)
            }
            None => format!("Chapter {number}"),
        };

        children.extend(members.into_iter().map(|note| {
            let label = match note.section {
                Some(section) => format!("{number}.{section} {}", note.title),
                None => note.title.clone(),
            };
            NavNode::leaf(label, &note.path)
        }));

        out.push(NavNode::group(label, children));
    }

    out
}

/// Order by section (absent last), then title, then path.
fn by_section(a: &NoteEntry, b: &NoteEntry) -> Ordering {
    let key = |n: &NoteEntry| n.section.unwrap_or(u32::MAX);
    key(a)
        .cmp(&key(b))
        .then_with(|| a.title.cmp(&b.title))
        .then_with(|| a.path.cmp(&b.path))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
