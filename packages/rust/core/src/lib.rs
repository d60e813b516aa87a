//! Pipeline orchestration for deepnotes.
//!
//! Ties the Notion client, the Markdown renderer, and the filesystem together
//! into the two end-to-end workflows: [`sync::sync_notes`] and
//! [`mkdocs::rebuild_nav`].

pub mod mkdocs;
pub mod nav;
pub mod sync;
pub mod writer;
