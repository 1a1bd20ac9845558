// ABOUTME: Serve mode for revealpack
// ABOUTME: Rebuilds the presentations when sources change and serves the build over HTTP

use log::{debug, error, info, warn};
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use notify::{RecursiveMode, Watcher};
use notify_debouncer_full::new_debouncer;
use tiny_http::{Header, Response, Server, StatusCode};

use crate::compiler::StyleCompiler;
use crate::config::{BuildPaths, Config, CONFIG_FILE_NAME};
use crate::errors::{PackError, Result};
use crate::pipeline;
use crate::toc::TOC_FILE_NAME;

/// Configuration for serve mode
pub struct ServeConfig {
    /// Project root holding config.json
    pub root: PathBuf,

    /// Port for the local web server
    pub port: u16,

    /// Debounce time in milliseconds
    pub debounce_ms: u64,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            port: 8000,
            debounce_ms: 500,
        }
    }
}

/// Content type for a served file, by extension
pub fn content_type(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "html" | "htm" => "text/html; charset=utf-8",
        "css" => "text/css",
        "js" | "mjs" => "application/javascript",
        "json" | "map" => "application/json",
        "svg" => "image/svg+xml",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "ico" => "image/x-icon",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "ttf" => "font/ttf",
        "otf" => "font/otf",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        _ => "application/octet-stream",
    }
}

/// Map a request URL onto a file below `root`.
///
/// Query strings are ignored, `/` and directories resolve to their
/// `index.html`, and URLs climbing out of `root` resolve to nothing.
pub fn resolve_request_path(root: &Path, url: &str) -> Option<PathBuf> {
    let path = url.split(|c: char| c == '?' || c == '#').next().unwrap_or_default();
    let mut resolved = root.to_path_buf();
    for component in Path::new(path.trim_start_matches('/')).components() {
        match component {
            Component::Normal(part) => resolved.push(part),
            Component::CurDir => {}
            _ => return None,
        }
    }
    if resolved.is_dir() {
        resolved.push(TOC_FILE_NAME);
    }
    Some(resolved)
}

/// Start a simple HTTP server for the build directory
fn start_server(build_root: PathBuf, port: u16) -> Result<()> {
    let server = Server::http(format!("0.0.0.0:{}", port))
        .map_err(|e| PackError::WatchError(format!("Failed to start HTTP server: {}", e)))?;

    thread::spawn(move || {
        info!("HTTP server listening on http://localhost:{}", port);
        println!("Serving presentations on http://localhost:{}", port);

        for request in server.incoming_requests() {
            let url = request.url().to_string();
            let file_path = resolve_request_path(&build_root, &url);
            debug!("Request for {:?} -> {:?}", url, file_path);

            let response = match file_path.filter(|path| path.is_file()) {
                Some(path) => match fs::read(&path) {
                    Ok(content) => {
                        let mut response = Response::from_data(content);
                        if let Ok(header) = Header::from_bytes("Content-Type", content_type(&path)) {
                            response = response.with_header(header);
                        }
                        response
                    }
                    Err(e) => {
                        error!("Failed to read file {:?}: {}", path, e);
                        Response::from_string(format!("Failed to read file: {}", e))
                            .with_status_code(StatusCode(500))
                    }
                },
                None => Response::from_string("404 Not Found").with_status_code(StatusCode(404)),
            };
            if let Err(e) = request.respond(response) {
                error!("Failed to send response: {}", e);
            }
        }
    });

    Ok(())
}

/// Load the configuration afresh and run a complete build
pub fn rebuild(root: &Path, compiler: &dyn StyleCompiler) -> Result<pipeline::BuildReport> {
    let config = Config::load(root)?;
    pipeline::run_build(root, &config, compiler)?.into_result()
}

/// Paths whose changes trigger a rebuild
fn watch_targets(paths: &BuildPaths) -> Vec<(PathBuf, RecursiveMode)> {
    let mut targets = vec![
        (paths.source_root.clone(), RecursiveMode::Recursive),
        (paths.custom_scripts_dir.clone(), RecursiveMode::Recursive),
        (paths.custom_css_dir.clone(), RecursiveMode::Recursive),
        (paths.root.join("assets"), RecursiveMode::Recursive),
        (paths.root.join(CONFIG_FILE_NAME), RecursiveMode::NonRecursive),
    ];
    targets.retain(|(path, _)| path.exists());
    targets
}

/// Checks if a changed path should trigger a rebuild.
///
/// The build output and the compiler staging tree are written by the build
/// itself and never count.
pub fn is_relevant_path(path: &Path, paths: &BuildPaths) -> bool {
    !(path.starts_with(&paths.build_root) || path.starts_with(&paths.theme_compiler_root))
}

/// Build once, serve the output and rebuild whenever a source changes
pub fn serve(config: ServeConfig, compiler: &dyn StyleCompiler) -> Result<()> {
    let app_config = Config::load(&config.root)?;
    let paths = BuildPaths::new(&config.root, &app_config);

    // Initial build; a broken source must not keep the server from starting
    if let Err(e) = rebuild(&config.root, compiler) {
        error!("Initial build failed: {}", e);
    }

    start_server(paths.build_root.clone(), config.port)?;

    let (tx, rx) = mpsc::channel();
    let mut debouncer = new_debouncer(Duration::from_millis(config.debounce_ms), None, tx)
        .map_err(|e| PackError::WatchError(format!("Failed to create file watcher: {}", e)))?;

    for (target, mode) in watch_targets(&paths) {
        debouncer.watcher().watch(&target, mode).map_err(|e| {
            PackError::WatchError(format!("Failed to start watching {:?}: {}", target, e))
        })?;
        info!("Watching for changes in {:?}", target);
    }
    println!("Watching for changes (Press Ctrl+C to stop)");

    let mut last_processed = Instant::now();
    for result in rx {
        match result {
            Ok(events) => {
                let relevant_changes = events.iter().any(|event| {
                    event.paths.iter().any(|path| {
                        let is_relevant = is_relevant_path(path, &paths);
                        if is_relevant {
                            debug!("Detected relevant change in {:?}", path);
                        }
                        is_relevant
                    })
                });

                let now = Instant::now();
                if relevant_changes
                    && now.duration_since(last_processed) > Duration::from_millis(config.debounce_ms)
                {
                    info!("Rebuilding presentations...");
                    match rebuild(&config.root, compiler) {
                        Ok(report) => info!("Rebuilt {} presentation(s)", report.decks.len()),
                        Err(e) => error!("Failed to rebuild: {}", e),
                    }
                    // changes written by the build itself land inside this window
                    last_processed = Instant::now();
                }
            }
            Err(errors) => {
                for e in errors {
                    warn!("Watch error: {:?}", e);
                }
            }
        }
    }

    Ok(())
}
