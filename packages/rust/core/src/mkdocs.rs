//! The `nav` pipeline: docs directory → `nav` key of `mkdocs.yml`.

use std::path::Path;

use serde_yaml::{Mapping, Value};
use tracing::{info, instrument};

use deepnotes_shared::{DeepNotesError, NavNode, Result, SiteConfig};

use crate::nav::{NavOptions, build_nav, scan_notes};

/// Rebuild the navigation for a site and write it into its MkDocs config.
///
/// Returns the number of notes indexed.
#[instrument(skip_all, fields(docs_dir = %site.docs_dir.display()))]
pub fn rebuild_nav(site: &SiteConfig) -> Result<usize> {
    if !site.docs_dir.is_dir() {
        return Err(DeepNotesError::config(format!(
            "docs directory {} does not exist",
            site.docs_dir.display()
        )));
    }
    if !site.mkdocs_config.is_file() {
        return Err(missing_config(&site.mkdocs_config));
    }

    let notes = scan_notes(&site.docs_dir)?;
    let nav = build_nav(&notes, &NavOptions::from(site));
    update_mkdocs_nav(&site.mkdocs_config, &nav)?;

    info!(
        notes = notes.len(),
        config = %site.mkdocs_config.display(),
        "navigation updated"
    );
    Ok(notes.len())
}

/// Replace the `nav` key of an MkDocs config, keeping every other key.
///
/// Only the top-level `nav` block is rewritten; the rest of the file is
/// kept byte for byte, so comments and tagged scalars such as
/// `!!python/name:` survive. The new file is written next to the old one
/// and renamed over it.
pub fn update_mkdocs_nav(config_path: &Path, nav: &[NavNode]) -> Result<()> {
    if !config_path.is_file() {
        return Err(missing_config(config_path));
    }

    let raw = std::fs::read_to_string(config_path)
        .map_err(|e| DeepNotesError::io(config_path, e))?;
    let before = parse_mapping(&raw, config_path)?;

    let nav_value =
        serde_yaml::to_value(nav).map_err(|e| DeepNotesError::Serialize(e.to_string()))?;
    let mut block = Mapping::new();
    block.insert(Value::String("nav".into()), nav_value.clone());
    let block =
        serde_yaml::to_string(&block).map_err(|e| DeepNotesError::Serialize(e.to_string()))?;

    let yaml = splice_nav(&raw, &block);

    // The splice must change `nav` and nothing else.
    let after = parse_mapping(&yaml, config_path)?;
    if after.get("nav") != Some(&nav_value) || without_nav(before) != without_nav(after.clone()) {
        return Err(DeepNotesError::parse(format!(
            "could not locate the top-level nav block in {}",
            config_path.display()
        )));
    }

    let file_name = config_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "mkdocs.yml".into());
    let temp = config_path.with_file_name(format!(".{file_name}.tmp"));

    std::fs::write(&temp, &yaml).map_err(|e| DeepNotesError::io(&temp, e))?;
    std::fs::rename(&temp, config_path).map_err(|e| DeepNotesError::io(config_path, e))?;

    Ok(())
}

fn parse_mapping(yaml: &str, path: &Path) -> Result<Mapping> {
    match serde_yaml::from_str::<Value>(yaml) {
        Ok(Value::Mapping(map)) => Ok(map),
        Ok(Value::Null) => Ok(Mapping::new()),
        Ok(_) => Err(DeepNotesError::parse(format!(
            "{} is not a YAML mapping",
            path.display()
        ))),
        Err(e) => Err(DeepNotesError::parse(format!(
            "invalid YAML in {}: {e}",
            path.display()
        ))),
    }
}

fn without_nav(mut map: Mapping) -> Mapping {
    map.remove("nav");
    map
}

/// Swap the top-level `nav:` block of `raw` for `block`, or append `block`.
///
/// The block runs from the `nav:` line through every following line that is
/// indented, a column-0 sequence item, or blank; trailing blank lines stay.
fn splice_nav(raw: &str, block: &str) -> String {
    let lines: Vec<&str> = raw.split_inclusive('\n').collect();

    let Some(start) = lines.iter().position(|line| is_nav_key(line)) else {
        let mut out = raw.to_string();
        if !out.is_empty() && !out.ends_with('\n') {
            out.push('\n');
        }
        out.push_str(block);
        return out;
    };

    let mut end = start + 1;
    let mut last_content = start + 1;
    while end < lines.len() && continues_block(lines[end]) {
        end += 1;
        if !lines[end - 1].trim().is_empty() {
            last_content = end;
        }
    }

    let mut out = String::with_capacity(raw.len() + block.len());
    out.extend(lines[..start].iter().copied());
    out.push_str(block);
    out.extend(lines[last_content..].iter().copied());
    out
}

fn is_nav_key(line: &str) -> bool {
    line.strip_prefix("nav")
        .map(|rest| rest.trim_start_matches([' ', '\t']).starts_with(':'))
        .unwrap_or(false)
}

fn continues_block(line: &str) -> bool {
    let body = line.trim_end_matches(['\r', '\n']);
    body.trim().is_empty()
        || body.starts_with([' ', '\t'])
        || body == "-"
        || body.starts_with("- ")
}

fn missing_config(path: &Path) -> DeepNotesError {
    DeepNotesError::config(format!("MkDocs config {} not found", path.display()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
