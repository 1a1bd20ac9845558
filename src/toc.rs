// ABOUTME: Table of contents generation for the revealpack build
// ABOUTME: Collects deck summaries and renders the index page linking every deck

use crate::deck::TitlePage;
use crate::errors::Result;
use crate::html::{self, TemplateRenderer};
use crate::utils;
use log::info;
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// File name of the generated index page
pub const TOC_FILE_NAME: &str = "index.html";

/// Summary of one generated deck
#[derive(Debug, Clone, PartialEq)]
pub struct TocEntry {
    /// Presentation folder name
    pub id: String,
    /// Deck file relative to the build root
    pub link: String,
    /// Deck title, before title-casing
    pub name: String,
    /// First title page headline, or the deck title
    pub title: String,
    pub titlepage: Option<TitlePage>,
}

/// A TOC entry as the index template sees it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TocLink {
    pub link: String,
    pub name: String,
    pub title: String,
    /// The title page, or an empty object
    pub titlepage: Value,
}

impl From<&TocEntry> for TocLink {
    fn from(entry: &TocEntry) -> Self {
        let titlepage = entry
            .titlepage
            .as_ref()
            .and_then(|titlepage| serde_json::to_value(titlepage).ok())
            .unwrap_or_else(|| Value::Object(Map::new()));
        Self {
            link: format!("./{}", entry.link),
            name: utils::title_case(&entry.name),
            title: entry.title.clone(),
            titlepage,
        }
    }
}

/// Render-ready links, in the order the entries were given
pub fn toc_links(entries: &[TocEntry]) -> Vec<TocLink> {
    entries.iter().map(TocLink::from).collect()
}

/// Render the index page for `entries` into `{target}/index.html`
pub fn generate_toc(
    entries: &[TocEntry],
    template: &Path,
    target: &Path,
    renderer: &TemplateRenderer,
    info: &Map<String, Value>,
) -> Result<PathBuf> {
    info!("Preparing TOC...");
    let rendered = renderer.render(
        template,
        minijinja::context! { toc_links => toc_links(entries), info => info },
    )?;

    let target_path = target.join(TOC_FILE_NAME);
    html::write_html_to_file(&rendered, &target_path)?;
    info!("Generated TOC and saved at {:?}", target_path);
    Ok(target_path)
}
