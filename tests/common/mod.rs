// Shared fixtures for the integration tests
#![allow(dead_code)]

use revealpack::errors::{PackError, Result};
use revealpack::{BuildPaths, Config, StyleCompiler};
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const DECK_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
<title>{{ deck.title }}</title>
<link rel="stylesheet" href="src/css/reveal.css">
{% if deck.head %}
{{ deck.head|safe }}
{% endif %}
</head>
<body>
<div class="reveal"><div class="slides">
{% if deck.titlepage %}
<section class="titlepage"><h1>{{ deck.titlepage.headline[0] }}</h1></section>
{% endif %}
{% for slide in deck.slides %}
<section{{ slide.attrs|to_html_attrs }}>{{ slide.content|safe }}</section>
{% endfor %}
</div></div>
</body>
</html>
"#;

pub const TOC_TEMPLATE: &str = r#"<ul>
{% for item in toc_links %}
<li><a href="{{ item.link }}">{{ item.name }}</a> {{ item.title }}</li>
{% endfor %}
</ul>
"#;

/// A project laid out on disk with a stub reveal.js checkout
pub struct Fixture {
    _dir: TempDir,
    pub root: PathBuf,
}

impl Fixture {
    pub fn new(theme: &str) -> Self {
        Self::with_config(&format!(
            r#"{{
                "theme": "{}",
                "packages": {{"reveal_plugins": {{"built_in": ["notes", "highlight"]}}}}
            }}"#,
            theme
        ))
    }

    pub fn with_config(config_json: &str) -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let root = fs::canonicalize(dir.path()).expect("Failed to resolve temp dir");
        let fixture = Self { _dir: dir, root };

        fixture.write("config.json", config_json);
        fixture.write("source/default.html", DECK_TEMPLATE);
        fixture.write("source/toc_template.html", TOC_TEMPLATE);

        let framework = "source/cached/reveal.js";
        for file in [
            "dist/reset.css",
            "dist/reveal.css",
            "dist/reveal.js",
            "dist/reveal.js.map",
            "dist/reveal.esm.js",
            "dist/reveal.esm.js.map",
        ] {
            fixture.write(&format!("{}/{}", framework, file), &format!("/* {} */", file));
        }
        fixture.write(&format!("{}/css/theme/source/black.scss", framework), "$base: #000;");
        fixture.write(&format!("{}/css/print/paper.scss", framework), "@page { size: A4; }");
        fixture.write(&format!("{}/css/print/pdf.scss", framework), "@page { margin: 0; }");
        fixture.write(&format!("{}/plugin/notes/notes.js", framework), "// notes");
        fixture.write(&format!("{}/plugin/highlight/highlight.js", framework), "// highlight");
        fixture.write(&format!("{}/plugin/highlight/monokai.css", framework), ".hljs { color: #f8f8f2; }");
        fixture
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    pub fn write(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.path(relative);
        fs::create_dir_all(path.parent().expect("fixture paths have a parent"))
            .expect("Failed to create fixture directory");
        fs::write(&path, content).expect("Failed to write fixture file");
        path
    }

    pub fn remove(&self, relative: &str) {
        let path = self.path(relative);
        if path.is_dir() {
            fs::remove_dir_all(path).expect("Failed to remove fixture directory");
        } else {
            fs::remove_file(path).expect("Failed to remove fixture file");
        }
    }

    pub fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.path(relative)).expect("Failed to read output file")
    }

    pub fn exists(&self, relative: &str) -> bool {
        self.path(relative).exists()
    }

    pub fn config(&self) -> Config {
        Config::load(&self.root).expect("Failed to load fixture config")
    }

    pub fn paths(&self) -> BuildPaths {
        BuildPaths::new(&self.root, &self.config())
    }

    /// Files below the framework's theme source directory, relative to it
    pub fn compiler_tree(&self) -> Vec<String> {
        let base = self.path("source/cached/reveal.js/css/theme/source");
        let mut files: Vec<String> = walkdir::WalkDir::new(&base)
            .min_depth(1)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .map(|entry| {
                entry
                    .path()
                    .strip_prefix(&base)
                    .expect("walk stays below base")
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect();
        files.sort();
        files
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileCall {
    pub source: PathBuf,
    pub destination: PathBuf,
}

/// Stands in for sass: copies the source with a marker comment
#[derive(Default)]
pub struct RecordingCompiler {
    pub calls: RefCell<Vec<CompileCall>>,
}

impl RecordingCompiler {
    pub fn sources(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .map(|call| file_name(&call.source))
            .collect()
    }
}

impl StyleCompiler for RecordingCompiler {
    fn compile(&self, source: &Path, destination: &Path) -> Result<()> {
        let content = fs::read_to_string(source).map_err(|e| PackError::at(source, e))?;
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(
            destination,
            format!("/* compiled from {} */\n{}", file_name(source), content),
        )?;
        self.calls.borrow_mut().push(CompileCall {
            source: source.to_path_buf(),
            destination: destination.to_path_buf(),
        });
        Ok(())
    }
}

/// Always fails, to exercise cleanup on the error path
pub struct FailingCompiler;

impl StyleCompiler for FailingCompiler {
    fn compile(&self, source: &Path, _destination: &Path) -> Result<()> {
        Err(PackError::CompileError {
            source_path: source.to_path_buf(),
            message: "syntax error".to_string(),
        })
    }
}

pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
