//! deepnotes CLI: Notion notes database → MkDocs site.
//!
//! `sync` mirrors completed pages into Markdown files; `nav` rebuilds the
//! site navigation from those files.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
