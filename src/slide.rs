// ABOUTME: Slide parsing for the revealpack build
// ABOUTME: Splits slide sources into front-matter section attributes and body content

use crate::errors::{PackError, Result};
use crate::utils;
use lazy_static::lazy_static;
use log::debug;
use minijinja::value::{Value, ValueKind};
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

lazy_static! {
    /// Leading `---` delimited block at the very top of a slide file
    static ref FRONT_MATTER: Regex =
        Regex::new(r"(?s)\A\s*---[ \t]*\r?\n(.*?)\r?\n---[ \t]*(?:\r?\n|\z)").unwrap();
    static ref ATTRIBUTE_LINE: Regex =
        Regex::new(r"^\s*([A-Za-z_][A-Za-z0-9_.:-]*)\s*:\s*(.*?)\s*$").unwrap();
}

/// One parsed slide source
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Slide {
    /// File name the slide was read from
    pub source: String,
    /// Slide body, inserted into the deck unescaped
    pub content: String,
    /// Section attributes from the front matter
    pub attrs: BTreeMap<String, String>,
    pub notes: Option<String>,
}

fn unquote(value: &str) -> &str {
    let bytes = value.as_bytes();
    if bytes.len() >= 2
        && (bytes[0] == b'"' || bytes[0] == b'\'')
        && bytes[bytes.len() - 1] == bytes[0]
    {
        &value[1..value.len() - 1]
    } else {
        value
    }
}

/// Parse slide text; `source` is only used for naming and error messages
pub fn parse_slide_str(source: &str, text: &str) -> Result<Slide> {
    let mut slide = Slide {
        source: source.to_string(),
        ..Slide::default()
    };

    let body = match FRONT_MATTER.captures(text) {
        Some(captures) => {
            let block = captures.get(1).map(|m| m.as_str()).unwrap_or_default();
            for (index, line) in block.lines().enumerate() {
                let trimmed = line.trim();
                if trimmed.is_empty() || trimmed.starts_with('#') {
                    continue;
                }
                let attribute = ATTRIBUTE_LINE.captures(line).ok_or_else(|| {
                    PackError::ValidationError(format!(
                        "{}: front matter line {} is not 'key: value': {:?}",
                        source,
                        index + 1,
                        trimmed
                    ))
                })?;
                let key = attribute[1].to_string();
                let value = unquote(&attribute[2]).to_string();
                if key == "notes" {
                    slide.notes = Some(value);
                } else {
                    slide.attrs.insert(key, value);
                }
            }
            let end = captures.get(0).map(|m| m.end()).unwrap_or(0);
            &text[end..]
        }
        None => text,
    };

    slide.content = body.trim().to_string();
    Ok(slide)
}

/// Read and parse one slide file
pub fn parse_slide(path: &Path) -> Result<Slide> {
    debug!("Parsing slide {:?}", path);
    let text = fs::read_to_string(path).map_err(|e| PackError::at(path, e))?;
    parse_slide_str(&utils::file_name_string(path), &text)
}

/// Escape text for use inside a double-quoted HTML attribute
pub fn escape_attribute(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Template filter rendering a map as HTML attributes.
///
/// `{"class": "center", "data-state": "x"}` renders as
/// ` class="center" data-state="x"`. `true` gives a bare attribute while
/// `false` and none drop the key.
pub fn to_html_attrs(value: Value) -> std::result::Result<Value, minijinja::Error> {
    if value.is_undefined() || value.is_none() {
        return Ok(Value::from_safe_string(String::new()));
    }
    if value.kind() != ValueKind::Map {
        return Err(minijinja::Error::new(
            minijinja::ErrorKind::InvalidOperation,
            format!("to_html_attrs expects a map, got {}", value.kind()),
        ));
    }

    let mut rendered = String::new();
    for key in value.try_iter()? {
        let item = value.get_item(&key)?;
        if item.is_undefined() || item.is_none() {
            continue;
        }
        if item.kind() == ValueKind::Bool {
            if item.is_true() {
                rendered.push(' ');
                rendered.push_str(&escape_attribute(&key.to_string()));
            }
            continue;
        }
        rendered.push_str(&format!(
            " {}=\"{}\"",
            escape_attribute(&key.to_string()),
            escape_attribute(&item.to_string())
        ));
    }
    Ok(Value::from_safe_string(rendered))
}
