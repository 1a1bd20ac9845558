// ABOUTME: Presentation deck assembly for the revealpack build
// ABOUTME: Merges deck metadata, orders and parses slides, validates title pages and renders decks

use crate::config::{BuildPaths, Config};
use crate::errors::{PackError, Result};
use crate::html::{self, TemplateRenderer};
use crate::slide::{self, Slide};
use crate::toc::TocEntry;
use crate::utils;
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

/// Optional per-deck metadata file
pub const DECK_METADATA_FILE: &str = "presentation.json";

/// Extension of slide source files
pub const SLIDE_EXTENSION: &str = "html";

/// Indent width of the written deck HTML
pub const DECK_INDENT: usize = 2;

/// Contents of a deck's `presentation.json`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeckMetadata {
    #[serde(default)]
    pub title: Option<String>,
    /// Explicit slide order; absent or null means "scan the folder"
    #[serde(default)]
    pub slides: Option<Vec<String>>,
    #[serde(default)]
    pub titlepage: Option<Value>,
    #[serde(default)]
    pub footer: Option<Value>,
    #[serde(default)]
    pub head: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DeckMetadata {
    /// Read `presentation.json` from a deck folder, if there is one
    pub fn load(folder: &Path) -> Result<Option<Self>> {
        let path = folder.join(DECK_METADATA_FILE);
        if !path.is_file() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path).map_err(|e| PackError::at(&path, e))?;
        let metadata = serde_json::from_str(&content).map_err(|e| {
            PackError::ValidationError(format!("{:?} is invalid: {}", path, e))
        })?;
        Ok(Some(metadata))
    }
}

/// Background settings of a title page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TitleBackground {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeat: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
}

/// Front matter shown as a deck's opening page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TitlePage {
    pub headline: Vec<String>,
    #[serde(default)]
    pub by: Vec<String>,
    #[serde(default)]
    pub notes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<TitleBackground>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TitlePage {
    /// The display title of the deck, the first headline
    pub fn title(&self) -> &str {
        self.headline.first().map(String::as_str).unwrap_or_default()
    }
}

/// Check raw title page metadata and convert it into a [`TitlePage`]
pub fn validate_titlepage(value: &Value) -> Result<TitlePage> {
    let object = value
        .as_object()
        .ok_or_else(|| PackError::ValidationError("'titlepage' must be an object".to_string()))?;

    match object.get("headline") {
        Some(Value::Array(items)) if !items.is_empty() => {
            if items.iter().any(|item| !item.is_string()) {
                return Err(PackError::ValidationError(
                    "'titlepage.headline' must only contain strings".to_string(),
                ));
            }
        }
        Some(Value::Array(_)) => {
            return Err(PackError::ValidationError(
                "'titlepage.headline' must not be empty".to_string(),
            ))
        }
        Some(_) => {
            return Err(PackError::ValidationError(
                "'titlepage.headline' must be a list of strings".to_string(),
            ))
        }
        None => {
            return Err(PackError::ValidationError(
                "'titlepage' requires a 'headline'".to_string(),
            ))
        }
    }

    let titlepage: TitlePage = serde_json::from_value(value.clone())
        .map_err(|e| PackError::ValidationError(format!("invalid 'titlepage': {}", e)))?;

    if titlepage.title().trim().is_empty() {
        return Err(PackError::ValidationError(
            "the first 'titlepage.headline' entry must not be blank".to_string(),
        ));
    }
    if let Some(opacity) = titlepage.background.as_ref().and_then(|b| b.opacity) {
        if !(0.0..=1.0).contains(&opacity) {
            return Err(PackError::ValidationError(format!(
                "'titlepage.background.opacity' must be between 0 and 1, got {}",
                opacity
            )));
        }
    }
    Ok(titlepage)
}

/// One presentation's document model, as handed to the deck template
#[derive(Debug, Clone, Serialize)]
pub struct Deck {
    /// Folder name, also the output file stem
    pub id: String,
    pub title: String,
    pub slides: Vec<Slide>,
    pub titlepage: Option<TitlePage>,
    pub footer: Option<Value>,
    pub head: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Deck {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            title: id.to_string(),
            slides: Vec::new(),
            titlepage: None,
            footer: None,
            head: None,
            extra: Map::new(),
        }
    }

    /// Title shown for the deck: the first headline when there is a title page
    pub fn page_title(&self) -> &str {
        match &self.titlepage {
            Some(titlepage) => titlepage.title(),
            None => &self.title,
        }
    }

    /// Output file name, `{id}.html`
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.id, SLIDE_EXTENSION)
    }

    pub fn toc_entry(&self) -> TocEntry {
        TocEntry {
            id: self.id.clone(),
            link: self.file_name(),
            name: self.title.clone(),
            title: self.page_title().to_string(),
            titlepage: self.titlepage.clone(),
        }
    }
}

/// Decide which slide files make up a deck, in order.
///
/// Without a declared list every `*.html` file in the folder is used, sorted
/// by file name. A declared list keeps its order but drops entries that do
/// not exist. A declared empty list means no slides.
pub fn resolve_slide_order(folder: &Path, declared: Option<&[String]>) -> Result<Vec<String>> {
    match declared {
        None => {
            let pattern = format!(
                "{}/*.{}",
                glob::Pattern::escape(&folder.to_string_lossy()),
                SLIDE_EXTENSION
            );
            let mut names: Vec<String> = glob::glob(&pattern)
                .map_err(|e| PackError::ValidationError(format!("Invalid glob pattern: {}", e)))?
                .filter_map(|entry| entry.ok())
                .filter(|path| path.is_file())
                .map(|path| utils::file_name_string(&path))
                .collect();
            names.sort();
            Ok(names)
        }
        Some(declared) => Ok(declared
            .iter()
            .filter(|name| {
                let exists = folder.join(name.as_str()).is_file();
                if !exists {
                    warn!("Slide {} not found in {:?}, skipping.", name, folder);
                }
                exists
            })
            .cloned()
            .collect()),
    }
}

/// Build the document model for one presentation folder
pub fn load_deck(folder: &Path) -> Result<Deck> {
    let id = utils::file_name_string(folder);
    let mut deck = Deck::new(&id);

    let mut declared_slides = None;
    let mut raw_titlepage = None;
    if let Some(metadata) = DeckMetadata::load(folder)? {
        if let Some(title) = metadata.title {
            deck.title = title;
        }
        declared_slides = metadata.slides;
        raw_titlepage = metadata.titlepage;
        deck.footer = metadata.footer;
        deck.head = metadata.head;
        deck.extra = metadata.extra;
        // the id is always the folder name
        if deck.extra.remove("id").is_some() {
            warn!("Ignoring 'id' in {:?}, decks are named after their folder.", folder.join(DECK_METADATA_FILE));
        }
    }

    let slide_order = resolve_slide_order(folder, declared_slides.as_deref())?;
    info!("Parsing slide files: {}", serde_json::to_string(&slide_order)?);
    for slide_file in &slide_order {
        deck.slides.push(slide::parse_slide(&folder.join(slide_file))?);
    }
    info!("Slides parsed successfully.");

    match raw_titlepage {
        Some(Value::Null) | None => {}
        Some(value) => {
            deck.titlepage = Some(validate_titlepage(&value)?);
            info!("Finished parsing 'titlepage'.");
        }
    }
    Ok(deck)
}

/// Result of building one deck
#[derive(Debug)]
pub struct DeckOutcome {
    pub id: String,
    pub result: Result<TocEntry>,
}

impl DeckOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Presentation folders under `root`, sorted by name; other entries are skipped
pub fn presentation_folders(root: &Path) -> Result<Vec<PathBuf>> {
    utils::validate_directory_exists(root)?;
    let mut folders = Vec::new();
    for entry in fs::read_dir(root).map_err(|e| PackError::at(root, e))? {
        let path = entry.map_err(|e| PackError::at(root, e))?.path();
        if path.is_dir() {
            folders.push(path);
        }
    }
    folders.sort_by_key(|path| utils::file_name_string(path));
    Ok(folders)
}

fn build_deck(
    folder: &Path,
    paths: &BuildPaths,
    renderer: &TemplateRenderer,
    config: &Config,
) -> Result<TocEntry> {
    let deck = load_deck(folder)?;
    let rendered = renderer.render(
        &paths.reveal_template,
        minijinja::context! { deck => &deck, info => &config.info },
    )?;
    let output_path = paths.build_root.join(deck.file_name());
    html::write_html_to_file(&html::beautify_html(&rendered, DECK_INDENT), &output_path)?;
    info!("Presentation {} generated successfully.", deck.id);
    Ok(deck.toc_entry())
}

/// Assemble and write every presentation under the presentation root.
///
/// A deck that fails is reported in its outcome and does not stop the
/// remaining decks. Missing templates or a missing presentation root fail
/// the whole stage.
pub fn assemble_decks(
    config: &Config,
    paths: &BuildPaths,
    renderer: &TemplateRenderer,
) -> Result<Vec<DeckOutcome>> {
    info!("Generating presentations...");
    renderer.require(&paths.reveal_template)?;
    utils::ensure_directory_exists(&paths.build_root)?;

    let mut outcomes = Vec::new();
    for folder in presentation_folders(&paths.presentation_root)? {
        let id = utils::file_name_string(&folder);
        let result = build_deck(&folder, paths, renderer, config).map_err(|e| {
            error!("Presentation {} failed: {}", id, e);
            PackError::DeckError {
                deck: id.clone(),
                source: Box::new(e),
            }
        });
        outcomes.push(DeckOutcome { id, result });
    }
    Ok(outcomes)
}
