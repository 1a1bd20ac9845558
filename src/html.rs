// ABOUTME: HTML output module for the revealpack build
// ABOUTME: Template rendering, HTML pretty-printing and writing pages to disk

use crate::errors::{PackError, Result};
use crate::slide;
use lazy_static::lazy_static;
use log::{debug, info};
use minijinja::Environment;
use regex::Regex;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

lazy_static! {
    static ref TAG: Regex =
        Regex::new(r#"\A<(/?)([A-Za-z][A-Za-z0-9:-]*)(?:[^>"']|"[^"]*"|'[^']*')*?(/?)>"#).unwrap();
    static ref DECLARATION: Regex = Regex::new(r"\A<![^>]*>").unwrap();
    static ref RAW_CLOSE: Regex = Regex::new(r"(?i)</(pre|textarea|script|style)\s*>").unwrap();
}

const VOID_ELEMENTS: [&str; 14] = [
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

const RAW_ELEMENTS: [&str; 4] = ["pre", "textarea", "script", "style"];

/// Renders the deck and index templates found under the source root
pub struct TemplateRenderer {
    root: PathBuf,
    env: Environment<'static>,
}

impl TemplateRenderer {
    pub fn new(root: &Path) -> Self {
        let mut env = Environment::new();
        env.set_loader(minijinja::path_loader(root));
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        env.add_filter("to_html_attrs", slide::to_html_attrs);
        Self {
            root: root.to_path_buf(),
            env,
        }
    }

    /// Loader name of a template file: its path below the root with `/` separators
    pub fn template_name(&self, path: &Path) -> Result<String> {
        let relative = path.strip_prefix(&self.root).map_err(|_| {
            PackError::ConfigError(format!(
                "template {:?} must be inside the source root {:?}",
                path, self.root
            ))
        })?;
        Ok(relative
            .components()
            .map(|component| component.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/"))
    }

    /// Fail unless the template file exists
    pub fn require(&self, path: &Path) -> Result<()> {
        if !path.is_file() {
            return Err(PackError::TemplateNotFound(path.to_path_buf()));
        }
        Ok(())
    }

    pub fn render<S: Serialize>(&self, path: &Path, context: S) -> Result<String> {
        self.require(path)?;
        let name = self.template_name(path)?;
        debug!("Rendering template {}", name);
        let template = self.env.get_template(&name)?;
        Ok(template.render(context)?)
    }
}

fn push_line(lines: &mut Vec<String>, depth: usize, indent: usize, text: &str) {
    lines.push(format!("{}{}", " ".repeat(depth * indent), text));
}

/// Pretty-print HTML with one tag per line and `indent` spaces per level.
///
/// Contents of `pre`, `textarea`, `script` and `style` are left untouched.
pub fn beautify_html(html: &str, indent: usize) -> String {
    let mut lines = Vec::new();
    let mut depth = 0usize;
    let mut rest = html;

    while !rest.is_empty() {
        if rest.starts_with("<!--") {
            let end = rest.find("-->").map(|i| i + 3).unwrap_or(rest.len());
            push_line(&mut lines, depth, indent, rest[..end].trim());
            rest = &rest[end..];
            continue;
        }
        if let Some(declaration) = DECLARATION.find(rest) {
            push_line(&mut lines, depth, indent, declaration.as_str());
            rest = &rest[declaration.end()..];
            continue;
        }
        if let Some(tag) = TAG.captures(rest) {
            let whole = tag.get(0).map(|m| m.as_str()).unwrap_or_default();
            let closing = !tag[1].is_empty();
            let name = tag[2].to_ascii_lowercase();
            let self_closing = !tag[3].is_empty();
            rest = &rest[whole.len()..];

            if closing {
                depth = depth.saturating_sub(1);
                push_line(&mut lines, depth, indent, whole);
            } else if RAW_ELEMENTS.contains(&name.as_str()) && !self_closing {
                // keep everything up to the matching close tag verbatim
                let close = RAW_CLOSE
                    .captures_iter(rest)
                    .find(|c| c[1].eq_ignore_ascii_case(&name))
                    .and_then(|c| c.get(0));
                let end = close.map(|m| m.end()).unwrap_or(rest.len());
                push_line(&mut lines, depth, indent, &format!("{}{}", whole, &rest[..end]));
                rest = &rest[end..];
            } else {
                push_line(&mut lines, depth, indent, whole);
                if !self_closing && !VOID_ELEMENTS.contains(&name.as_str()) {
                    depth += 1;
                }
            }
            continue;
        }

        // text up to the next tag-like `<`; a lone `<` counts as text
        let skip = usize::from(rest.starts_with('<'));
        let end = rest[skip..].find('<').map(|i| i + skip).unwrap_or(rest.len());
        for line in rest[..end].lines() {
            let line = line.trim();
            if !line.is_empty() {
                push_line(&mut lines, depth, indent, line);
            }
        }
        rest = &rest[end..];
    }

    let mut output = lines.join("\n");
    output.push('\n');
    output
}

/// Utility function to write HTML content to a file
pub fn write_html_to_file(html_content: &str, output_path: &Path) -> Result<()> {
    info!("Writing HTML to file: {:?}", output_path);

    // Ensure parent directory exists
    if let Some(parent) = output_path.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| PackError::at(parent, e))?;
        }
    }

    fs::write(output_path, html_content).map_err(|e| PackError::at(output_path, e))?;

    Ok(())
}
