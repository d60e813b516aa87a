//! Placement of rendered notes under the docs directory.

use std::path::{Component, Path, PathBuf};

use tracing::{debug, instrument};

use deepnotes_markdown::compose_note;
use deepnotes_shared::{DeepNotesError, DocumentProperties, Result};

/// Resolve where a document goes, without touching the filesystem.
///
/// The sync path must be present, relative, and free of `..` components.
pub fn resolve_destination(docs_dir: &Path, props: &DocumentProperties) -> Result<PathBuf> {
    let Some(sync_path) = props.sync_path.as_deref() else {
        return Err(DeepNotesError::config(format!(
            "page \"{}\" has no sync path",
            props.title
        )));
    };

    let relative = Path::new(sync_path);
    let escapes = relative.components().any(|c| {
        matches!(
            c,
            Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    });
    if escapes {
        return Err(DeepNotesError::config(format!(
            "sync path \"{sync_path}\" of page \"{}\" leaves the docs directory",
            props.title
        )));
    }

    Ok(docs_dir.join(relative))
}

/// Write a note (header plus already-normalized body) to its sync path.
///
/// Parent directories are created as needed and an existing file is
/// replaced. Returns the written path.
#[instrument(skip_all, fields(title = %props.title))]
pub fn write_document(docs_dir: &Path, props: &DocumentProperties, body: &str) -> Result<PathBuf> {
    let target = resolve_destination(docs_dir, props)?;

    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent).map_err(|e| DeepNotesError::io(parent, e))?;
    }

    let content = compose_note(props, body);
    std::fs::write(&target, &content).map_err(|e| DeepNotesError::io(&target, e))?;

    debug!(path = %target.display(), bytes = content.len(), "wrote note");
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("dn-writer-test-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn props(sync_path: Option<&str>) -> DocumentProperties {
        DocumentProperties {
            title: "Groups".into(),
            category: Some("Math".into()),
            sync_path: sync_path.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn writes_into_nested_directories() {
        let tmp = temp_dir();

        let path = write_document(&tmp, &props(Some("Math/Algebra/groups.md")), "Body\n").unwrap();

        assert_eq!(path, tmp.join("Math/Algebra/groups.md"));
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("---\ntitle: \"Groups\"\n"));
        assert!(content.ends_with("---\n\nBody\n"));

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn second_write_replaces_first() {
        let tmp = temp_dir();
        let p = props(Some("note.md"));

        write_document(&tmp, &p, "old\n").unwrap();
        let path = write_document(&tmp, &p, "new\n").unwrap();

        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.ends_with("\nnew\n"));
        assert!(!content.contains("old"));

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn missing_sync_path_is_config_error() {
        let tmp = temp_dir();

        let err = write_document(&tmp, &props(None), "x\n").unwrap_err();
        assert!(matches!(err, DeepNotesError::Config { .. }));
        assert!(err.to_string().contains("Groups"));
        assert_eq!(std::fs::read_dir(&tmp).unwrap().count(), 0);

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn escaping_paths_are_rejected() {
        let tmp = temp_dir();

        for bad in ["../outside.md", "Math/../../x.md", "/etc/passwd"] {
            let err = resolve_destination(&tmp, &props(Some(bad))).unwrap_err();
            assert!(
                matches!(err, DeepNotesError::Config { .. }),
                "path {bad:?} should be rejected"
            );
        }

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn current_dir_components_are_allowed() {
        let tmp = temp_dir();
        let path = resolve_destination(&tmp, &props(Some("./Math/groups.md"))).unwrap();
        assert!(path.ends_with("Math/groups.md"));
        let _ = std::fs::remove_dir_all(&tmp);
    }
}
