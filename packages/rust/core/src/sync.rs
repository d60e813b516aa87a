//! The `sync` pipeline: completed Notion pages → Markdown notes on disk.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::{debug, info, instrument};

use deepnotes_markdown::render_body;
use deepnotes_notion::NotionClient;
use deepnotes_shared::{ContentBlock, DeepNotesError, Result};

use crate::writer::{resolve_destination, write_document};

/// Outcome of a completed sync run.
#[derive(Debug, Clone, Default)]
pub struct SyncReport {
    /// Pages matched by the completed-status filter.
    pub matched: usize,
    /// Notes written, in the order they were saved.
    pub written: Vec<PathBuf>,
    /// Blocks dropped because their type is not rendered.
    pub skipped_blocks: usize,
    pub elapsed: Duration,
}

/// Progress callback for reporting sync status.
pub trait SyncProgress: Send + Sync {
    /// Called once the page query has finished.
    fn pages_matched(&self, total: usize);
    /// Called after each note is written.
    fn document_saved(&self, path: &Path, current: usize, total: usize);
    /// Called when the run completes.
    fn done(&self, report: &SyncReport);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl SyncProgress for SilentProgress {
    fn pages_matched(&self, _total: usize) {}
    fn document_saved(&self, _path: &Path, _current: usize, _total: usize) {}
    fn done(&self, _report: &SyncReport) {}
}

/// Create the docs directory (and parents) if it does not exist yet.
pub fn prepare_docs_dir(docs_dir: &Path) -> Result<()> {
    if docs_dir.is_dir() {
        return Ok(());
    }
    std::fs::create_dir_all(docs_dir).map_err(|e| DeepNotesError::io(docs_dir, e))?;
    debug!(path = %docs_dir.display(), "created docs directory");
    Ok(())
}

/// Mirror every completed page into `docs_dir`.
///
/// Pages are handled one at a time in query order. The first failure aborts
/// the run; notes already written stay on disk. A page without a usable
/// sync path is rejected before its blocks are fetched.
#[instrument(skip_all, fields(docs_dir = %docs_dir.display()))]
pub async fn sync_notes(
    client: &NotionClient,
    docs_dir: &Path,
    progress: &dyn SyncProgress,
) -> Result<SyncReport> {
    let start = Instant::now();
    prepare_docs_dir(docs_dir)?;

    let pages = client.query_pages().await?;
    let total = pages.len();
    progress.pages_matched(total);

    let mut report = SyncReport {
        matched: total,
        ..SyncReport::default()
    };

    if pages.is_empty() {
        info!("no pages matched the completed status");
    }

    for (i, page) in pages.iter().enumerate() {
        resolve_destination(docs_dir, &page.properties)?;

        let doc = client.fetch_document(page).await?;
        let skipped = doc
            .blocks
            .iter()
            .filter(|b| matches!(b, ContentBlock::Unsupported { .. }))
            .count();

        let body = render_body(&doc.blocks);
        let path = write_document(docs_dir, &doc.properties, &body)?;

        info!(
            title = %doc.properties.title,
            path = %path.display(),
            skipped_blocks = skipped,
            "saved document"
        );
        progress.document_saved(&path, i + 1, total);

        report.skipped_blocks += skipped;
        report.written.push(path);
    }

    report.elapsed = start.elapsed();
    info!(
        written = report.written.len(),
        skipped_blocks = report.skipped_blocks,
        elapsed_ms = report.elapsed.as_millis() as u64,
        "sync completed"
    );
    progress.done(&report);

    Ok(report)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use deepnotes_notion::ClientOptions;
    use deepnotes_shared::{NotionConfig, NotionCredentials};
    use serde_json::{Value, json};
    use url::Url;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("dn-sync-test-{}", uuid::Uuid::now_v7()))
    }

    fn client(server: &MockServer) -> NotionClient {
        let config = NotionConfig {
            base_url: Url::parse(&server.uri()).unwrap(),
            ..NotionConfig::default()
        };
        let opts = ClientOptions::from_config(
            &config,
            NotionCredentials {
                api_key: "secret_test".into(),
                database_id: "db1".into(),
            },
        );
        NotionClient::new(opts).unwrap()
    }

    fn rich(text: &str) -> Value {
        json!([{ "type": "text", "text": { "content": text }, "plain_text": text }])
    }

    fn page_json(id: &str, title: &str, sync_path: Option<&str>) -> Value {
        let mut properties = json!({
            "Title": { "type": "title", "title": rich(title) },
            "Category": { "type": "select", "select": { "name": "Math" } },
            "Chapter": { "type": "number", "number": 1 }
        });
        if let Some(p) = sync_path {
            properties["Sync_Path"] = json!({
                "type": "formula",
                "formula": { "type": "string", "string": p }
            });
        }
        json!({ "object": "page", "id": id, "properties": properties })
    }

    async fn mount_query(server: &MockServer, pages: Vec<Value>) {
        Mock::given(method("POST"))
            .and(path("/databases/db1/query"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": pages,
                "has_more": false,
                "next_cursor": null
            })))
            .mount(server)
            .await;
    }

    async fn mount_blocks(server: &MockServer, page_id: &str, blocks: Vec<Value>) {
        Mock::given(method("GET"))
            .and(path(format!("/blocks/{page_id}/children")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": blocks,
                "has_more": false,
                "next_cursor": null
            })))
            .mount(server)
            .await;
    }

    fn paragraph(text: &str) -> Value {
        json!({ "type": "paragraph", "paragraph": { "rich_text": rich(text) } })
    }

    #[tokio::test]
    async fn writes_each_completed_page() {
        let server = MockServer::start().await;
        mount_query(
            &server,
            vec![
                page_json("p1", "Groups", Some("Math/Algebra/groups.md")),
                page_json("p2", "Rings", Some("Math/Algebra/rings.md")),
            ],
        )
        .await;
        mount_blocks(&server, "p1", vec![paragraph("A group has $e$.")]).await;
        mount_blocks(
            &server,
            "p2",
            vec![
                paragraph("A ring."),
                json!({ "type": "table", "table": {} }),
            ],
        )
        .await;

        let docs = temp_dir();
        let report = sync_notes(&client(&server), &docs, &SilentProgress)
            .await
            .unwrap();

        assert_eq!(report.matched, 2);
        assert_eq!(report.written.len(), 2);
        assert_eq!(report.skipped_blocks, 1);

        let groups = std::fs::read_to_string(docs.join("Math/Algebra/groups.md")).unwrap();
        assert!(groups.starts_with("---\ntitle: \"Groups\"\ncategory: \"Math\"\n"));
        assert!(groups.contains("chapter: 1\n"));
        assert!(groups.ends_with("---\n\nA group has \\(e\\).\n"));

        let rings = std::fs::read_to_string(docs.join("Math/Algebra/rings.md")).unwrap();
        assert!(rings.ends_with("\nA ring.\n"));

        let _ = std::fs::remove_dir_all(&docs);
    }

    #[tokio::test]
    async fn no_matching_pages_still_creates_docs_dir() {
        let server = MockServer::start().await;
        mount_query(&server, Vec::new()).await;

        let docs = temp_dir();
        let report = sync_notes(&client(&server), &docs, &SilentProgress)
            .await
            .unwrap();

        assert_eq!(report.matched, 0);
        assert!(report.written.is_empty());
        assert!(docs.is_dir());

        let _ = std::fs::remove_dir_all(&docs);
    }

    #[tokio::test]
    async fn missing_sync_path_aborts_and_keeps_earlier_notes() {
        let server = MockServer::start().await;
        mount_query(
            &server,
            vec![
                page_json("p1", "Groups", Some("groups.md")),
                page_json("p2", "Orphan", None),
                page_json("p3", "Rings", Some("rings.md")),
            ],
        )
        .await;
        mount_blocks(&server, "p1", vec![paragraph("kept")]).await;

        Mock::given(method("GET"))
            .and(path("/blocks/p2/children"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [], "has_more": false
            })))
            .expect(0)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/blocks/p3/children"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [], "has_more": false
            })))
            .expect(0)
            .mount(&server)
            .await;

        let docs = temp_dir();
        let err = sync_notes(&client(&server), &docs, &SilentProgress)
            .await
            .unwrap_err();

        assert!(matches!(err, DeepNotesError::Config { .. }));
        assert!(docs.join("groups.md").is_file());
        assert!(!docs.join("rings.md").exists());

        let _ = std::fs::remove_dir_all(&docs);
    }

    #[tokio::test]
    async fn api_failure_propagates() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/databases/db1/query"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(json!({ "object": "error", "message": "API token is invalid." })),
            )
            .mount(&server)
            .await;

        let docs = temp_dir();
        let err = sync_notes(&client(&server), &docs, &SilentProgress)
            .await
            .unwrap_err();

        match err {
            DeepNotesError::Api { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "API token is invalid.");
            }
            other => panic!("expected Api error, got {other:?}"),
        }

        let _ = std::fs::remove_dir_all(&docs);
    }

    #[tokio::test]
    async fn rerun_overwrites_with_same_content() {
        let server = MockServer::start().await;
        mount_query(&server, vec![page_json("p1", "Groups", Some("groups.md"))]).await;
        mount_blocks(&server, "p1", vec![paragraph("same")]).await;

        let docs = temp_dir();
        let client = client(&server);
        sync_notes(&client, &docs, &SilentProgress).await.unwrap();
        let first = std::fs::read_to_string(docs.join("groups.md")).unwrap();
        sync_notes(&client, &docs, &SilentProgress).await.unwrap();
        let second = std::fs::read_to_string(docs.join("groups.md")).unwrap();

        assert_eq!(first, second);

        let _ = std::fs::remove_dir_all(&docs);
    }

    #[test]
    fn prepare_creates_nested_dir() {
        let root = temp_dir();
        let docs = root.join("a/b/notes");
        prepare_docs_dir(&docs).unwrap();
        assert!(docs.is_dir());
        prepare_docs_dir(&docs).unwrap();
        let _ = std::fs::remove_dir_all(&root);
    }
}
