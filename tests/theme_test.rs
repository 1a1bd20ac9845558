mod common;

use common::{FailingCompiler, Fixture, RecordingCompiler};
use revealpack::theme::{self, ThemeOrigin, ThemeReference};
use revealpack::{PackError, compile_styles, compile_theme, resolve_theme};

#[test]
fn test_theme_in_project_root_is_staged_compiled_and_removed() {
    let fixture = Fixture::new("custom.scss");
    fixture.write("custom.scss", "$primary: #f00;");
    let compiler = RecordingCompiler::default();

    let compiled = compile_theme(&fixture.config(), &fixture.paths(), &compiler)
        .expect("theme should compile");

    assert_eq!(compiled.theme.origin, ThemeOrigin::InProjectRoot);
    assert_eq!(compiler.sources(), vec!["custom.scss"]);
    let call = compiler.calls.borrow()[0].clone();
    assert_eq!(
        call.source,
        fixture.path("source/cached/reveal.js/css/theme/source/custom.scss")
    );
    assert_eq!(call.destination, fixture.path("prod/src/theme/custom.css"));
    assert!(fixture.read("prod/src/theme/custom.css").contains("$primary: #f00;"));

    // staged copy is gone, the framework's own theme is untouched
    assert_eq!(fixture.compiler_tree(), vec!["black.scss"]);
    assert!(fixture.exists("custom.scss"));
}

#[test]
fn test_nested_theme_stages_whole_directory_and_fonts() {
    let fixture = Fixture::new("themes/brand/brand.scss");
    fixture.write("themes/brand/brand.scss", "@import 'partials/colors';");
    fixture.write("themes/brand/partials/_colors.scss", "$c: #123;");
    fixture.write("themes/brand/fonts/brand.woff2", "font-bytes");
    let compiler = RecordingCompiler::default();

    let compiled = compile_theme(&fixture.config(), &fixture.paths(), &compiler)
        .expect("theme should compile");

    assert_eq!(compiled.theme.origin, ThemeOrigin::Nested);
    assert_eq!(
        compiled.theme.fonts_dir,
        Some(fixture.path("themes/brand/fonts"))
    );
    assert_eq!(compiler.sources(), vec!["brand.scss"]);
    assert_eq!(fixture.read("prod/src/theme/fonts/brand.woff2"), "font-bytes");
    assert!(fixture.exists("prod/src/theme/brand.css"));
    assert_eq!(fixture.compiler_tree(), vec!["black.scss"]);
}

#[test]
fn test_framework_theme_is_compiled_in_place() {
    let fixture = Fixture::new("black");
    let compiler = RecordingCompiler::default();

    let compiled = compile_theme(&fixture.config(), &fixture.paths(), &compiler)
        .expect("theme should compile");

    assert_eq!(compiled.theme.origin, ThemeOrigin::InFramework);
    assert_eq!(
        compiler.calls.borrow()[0].source,
        fixture.path("source/cached/reveal.js/css/theme/source/black.scss")
    );
    assert!(fixture.exists("prod/src/theme/black.css"));
    assert_eq!(fixture.compiler_tree(), vec!["black.scss"]);
}

#[test]
fn test_precompiled_theme_is_copied_without_compiling() {
    let fixture = Fixture::new("look.css");
    fixture.write("look.css", "body { color: red; }");
    fixture.write("fonts/look.ttf", "ttf");
    let compiler = RecordingCompiler::default();

    let compiled = compile_theme(&fixture.config(), &fixture.paths(), &compiler)
        .expect("theme should copy");

    assert!(compiled.theme.is_precompiled());
    assert!(compiler.calls.borrow().is_empty());
    assert_eq!(fixture.read("prod/src/theme/look.css"), "body { color: red; }");
    assert_eq!(fixture.read("prod/src/theme/fonts/look.ttf"), "ttf");
    assert_eq!(fixture.compiler_tree(), vec!["black.scss"]);
}

#[test]
fn test_missing_theme_is_fatal() {
    let fixture = Fixture::new("nowhere.scss");

    let result = resolve_theme(&fixture.config(), &fixture.paths());

    assert!(matches!(result, Err(PackError::ThemeNotFound(name)) if name == "nowhere.scss"));
}

#[test]
fn test_classification_follows_the_resolved_path() {
    let fixture = Fixture::new("black.scss");
    // same file name in the project root and in the framework
    fixture.write("black.scss", "$mine: 1;");
    let paths = fixture.paths();

    let from_root = resolve_theme(&fixture.config(), &paths).expect("theme exists");
    assert_eq!(from_root.origin, ThemeOrigin::InProjectRoot);
    assert_eq!(from_root.path, fixture.path("black.scss"));

    let framework_file = fixture.path("source/cached/reveal.js/css/theme/source/black.scss");
    let from_framework = ThemeReference::classify(&framework_file, &paths);
    assert_eq!(from_framework.origin, ThemeOrigin::InFramework);
}

#[test]
fn test_highlight_style_is_optional() {
    let fixture = Fixture::new("black");
    fixture.remove("source/cached/reveal.js/plugin/highlight/monokai.css");
    let compiler = RecordingCompiler::default();

    let compiled = compile_theme(&fixture.config(), &fixture.paths(), &compiler)
        .expect("theme should compile without a highlight style");

    assert_eq!(compiled.highlight_css, None);
    assert!(!fixture.exists("prod/src/theme/monokai.css"));
    assert!(fixture.exists("prod/src/theme/black.css"));
}

#[test]
fn test_highlight_style_precedence() {
    let fixture = Fixture::with_config(r#"{"theme": "black", "highlight_theme": "zenburn"}"#);
    fixture.write("zenburn.css", ".root {}");
    let paths = fixture.paths();

    assert_eq!(
        theme::resolve_highlight_style(&fixture.config(), &paths),
        Some(fixture.path("zenburn.css"))
    );

    // the default comes from the framework's highlight plugin
    let fixture = Fixture::new("black");
    let compiled = compile_theme(&fixture.config(), &fixture.paths(), &RecordingCompiler::default())
        .expect("theme should compile");
    assert_eq!(
        compiled.highlight_css,
        Some(fixture.path("prod/src/theme/monokai.css"))
    );
    assert_eq!(
        fixture.read("prod/src/theme/monokai.css"),
        ".hljs { color: #f8f8f2; }"
    );
}

#[test]
fn test_staged_theme_is_removed_when_compilation_fails() {
    let fixture = Fixture::new("themes/brand/brand.scss");
    fixture.write("themes/brand/brand.scss", "broken {");
    fixture.write("themes/brand/partials/_x.scss", "");

    let result = compile_theme(&fixture.config(), &fixture.paths(), &FailingCompiler);

    assert!(matches!(result, Err(PackError::CompileError { .. })));
    assert_eq!(fixture.compiler_tree(), vec!["black.scss"]);
}

#[test]
fn test_compile_styles_compiles_sass_and_copies_css() {
    let fixture = Fixture::new("black");
    fixture.write("assets/styles/deck.scss", ".a { b: c; }");
    fixture.write("assets/styles/grid.sass", ".g\n  d: e");
    fixture.write("assets/styles/plain.css", ".plain {}");
    fixture.write("assets/styles/readme.txt", "ignored");
    let compiler = RecordingCompiler::default();

    let outputs = compile_styles(&fixture.paths(), &compiler).expect("styles should compile");

    assert_eq!(outputs.len(), 3);
    assert_eq!(compiler.sources(), vec!["deck.scss", "grid.sass"]);
    assert!(fixture.read("prod/src/css/deck.css").contains(".a { b: c; }"));
    assert!(fixture.exists("prod/src/css/grid.css"));
    assert_eq!(fixture.read("prod/src/css/plain.css"), ".plain {}");
    assert!(!fixture.exists("prod/src/css/readme.css"));
    assert_eq!(fixture.compiler_tree(), vec!["black.scss"]);
}

#[test]
fn test_compile_styles_leaves_framework_files_alone() {
    let fixture = Fixture::new("black");
    // identical to the framework's own file, so it is never staged
    fixture.write("assets/styles/black.scss", "$base: #000;");

    compile_styles(&fixture.paths(), &RecordingCompiler::default()).expect("styles should compile");

    assert_eq!(fixture.compiler_tree(), vec!["black.scss"]);
    assert_eq!(
        fixture.read("source/cached/reveal.js/css/theme/source/black.scss"),
        "$base: #000;"
    );
}

#[test]
fn test_compile_styles_restores_shadowed_framework_file() {
    let fixture = Fixture::new("black");
    fixture.write("assets/styles/black.scss", "$base: #fff; /* user */");
    let compiler = RecordingCompiler::default();

    compile_styles(&fixture.paths(), &compiler).expect("styles should compile");

    // the user's file was compiled, then the framework's original came back
    assert!(fixture.read("prod/src/css/black.css").contains("/* user */"));
    assert_eq!(fixture.compiler_tree(), vec!["black.scss"]);
    assert_eq!(
        fixture.read("source/cached/reveal.js/css/theme/source/black.scss"),
        "$base: #000;"
    );

    // a later build of the bundled theme still sees the original
    let compiled = compile_theme(&fixture.config(), &fixture.paths(), &compiler)
        .expect("theme should compile");
    assert_eq!(compiled.theme.origin, ThemeOrigin::InFramework);
    assert!(fixture.read("prod/src/theme/black.css").contains("$base: #000;"));
}

#[test]
fn test_root_theme_shadowing_bundled_theme_is_restored() {
    let fixture = Fixture::new("black.scss");
    fixture.write("black.scss", "$mine: 1;");

    compile_theme(&fixture.config(), &fixture.paths(), &RecordingCompiler::default())
        .expect("theme should compile");

    assert!(fixture.read("prod/src/theme/black.css").contains("$mine: 1;"));
    assert_eq!(
        fixture.read("source/cached/reveal.js/css/theme/source/black.scss"),
        "$base: #000;"
    );
}

#[test]
fn test_shadowed_framework_file_is_restored_when_compilation_fails() {
    let fixture = Fixture::new("themes/brand/brand.scss");
    fixture.write("themes/brand/brand.scss", "@import 'black';");
    fixture.write("themes/brand/black.scss", "$base: #abc;");

    let result = compile_theme(&fixture.config(), &fixture.paths(), &FailingCompiler);

    assert!(matches!(result, Err(PackError::CompileError { .. })));
    assert_eq!(fixture.compiler_tree(), vec!["black.scss"]);
    assert_eq!(
        fixture.read("source/cached/reveal.js/css/theme/source/black.scss"),
        "$base: #000;"
    );
}

#[test]
fn test_theme_in_source_root_stages_only_the_theme_file() {
    let fixture = Fixture::new("mytheme");
    fixture.write("source/mytheme.scss", "$accent: #0a0;");
    fixture.write("source/presentations/demo/01.html", "<p>demo</p>");
    let compiler = RecordingCompiler::default();

    let compiled = compile_theme(&fixture.config(), &fixture.paths(), &compiler)
        .expect("theme should compile");

    assert_eq!(compiled.theme.path, fixture.path("source/mytheme.scss"));
    assert_eq!(compiler.sources(), vec!["mytheme.scss"]);
    assert!(fixture.read("prod/src/theme/mytheme.css").contains("$accent: #0a0;"));
    assert_eq!(fixture.compiler_tree(), vec!["black.scss"]);
}

#[test]
fn test_copy_framework_copies_dist_and_compiles_print_styles() {
    let fixture = Fixture::new("black");
    let compiler = RecordingCompiler::default();

    revealpack::copy_framework(&fixture.paths(), &compiler).expect("framework should copy");

    assert_eq!(fixture.read("prod/src/css/reveal.css"), "/* dist/reveal.css */");
    assert_eq!(fixture.read("prod/src/reveal.esm.js.map"), "/* dist/reveal.esm.js.map */");
    assert_eq!(compiler.sources(), vec!["paper.scss", "pdf.scss"]);
    assert!(fixture.exists("prod/src/css/print/paper.css"));
    assert!(fixture.exists("prod/src/css/print/pdf.css"));
}
