// ABOUTME: Library module for the revealpack program.
// ABOUTME: Builds Reveal.js decks, themes, plugins and a table of contents into a static site.

// Reexport modules
pub mod compiler;
pub mod config;
pub mod deck;
pub mod errors;
pub mod fsync;
pub mod html;
pub mod pipeline;
pub mod plugins;
pub mod slide;
pub mod styles;
pub mod theme;
pub mod toc;
pub mod utils;
pub mod watch;

// Reexport common types and functions
pub use compiler::{SassCommand, StyleCompiler};
pub use config::{BuildPaths, Config};
pub use deck::{Deck, DeckOutcome, TitlePage, assemble_decks};
pub use errors::{PackError, Result};
pub use fsync::{StagingArea, copy_and_overwrite, copy_file_if_different};
pub use html::{TemplateRenderer, beautify_html, write_html_to_file};
pub use pipeline::{BuildReport, run_build};
pub use plugins::{copy_custom_css, copy_custom_scripts, copy_libraries, copy_plugins};
pub use slide::{Slide, parse_slide};
pub use styles::{compile_styles, copy_framework};
pub use theme::{ThemeOrigin, ThemeReference, compile_theme, resolve_theme};
pub use toc::{TocEntry, generate_toc};
pub use watch::{ServeConfig, serve};
