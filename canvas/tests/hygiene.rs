//! Source checks for the layout engine.
//!
//! The engine is pure geometry behind a thin browser shell, so the budgets
//! target the ways that kind of code goes wrong: panics in the pointer path,
//! lossy numeric casts, raw cell indexing, and browser calls leaking out of
//! the wrapper. Budgets only ratchet down.

use std::fs;
use std::path::{Path, PathBuf};

/// Files allowed to turn counts into coordinates with `as f64`.
const GEOMETRY_FILES: &[&str] = &["grid.rs", "layout.rs"];

/// The only file that may touch `web_sys`, `js_sys` or `wasm_bindgen`.
const BROWSER_SHELL: &str = "engine.rs";

const MAX_FLOAT_CMP_ALLOWS: usize = 2;

struct Source {
    name: String,
    /// Non-comment lines, numbered from 1.
    code: Vec<(usize, String)>,
}

fn sources() -> Vec<Source> {
    let mut paths: Vec<PathBuf> = fs::read_dir(Path::new("src"))
        .map(|entries| entries.flatten().map(|e| e.path()).collect())
        .unwrap_or_default();
    paths.retain(|p| p.extension().is_some_and(|e| e == "rs"));
    paths.sort();

    paths
        .into_iter()
        .filter_map(|path| {
            let name = path.file_name()?.to_string_lossy().into_owned();
            if name.ends_with("_test.rs") {
                return None;
            }
            let text = fs::read_to_string(&path).ok()?;
            let code = text
                .lines()
                .enumerate()
                .filter(|(_, line)| !line.trim_start().starts_with("//"))
                .map(|(i, line)| (i + 1, line.to_owned()))
                .collect();
            Some(Source { name, code })
        })
        .collect()
}

/// Every `file:line` in `files` whose code contains any of `patterns`.
fn find<'a>(files: impl IntoIterator<Item = &'a Source>, patterns: &[&str]) -> Vec<String> {
    files
        .into_iter()
        .flat_map(|src| {
            src.code
                .iter()
                .filter(|(_, line)| patterns.iter().any(|p| line.contains(p)))
                .map(move |(n, line)| format!("  {}:{n}: {}", src.name, line.trim()))
        })
        .collect()
}

fn assert_within(what: &str, hits: &[String], max: usize) {
    assert!(hits.len() <= max, "{what}: found {}, max {max}\n{}", hits.len(), hits.join("\n"));
}

// =============================================================================
// Pointer path never panics
// =============================================================================

#[test]
fn no_panicking_calls() {
    let files = sources();
    let hits = find(
        &files,
        &[".unwrap()", ".expect(", "panic!(", "unreachable!(", "todo!(", "unimplemented!("],
    );
    assert_within("panicking calls", &hits, 0);
}

#[test]
fn no_silently_dropped_results() {
    let files = sources();
    assert_within("discarded results", &find(&files, &["let _ =", ".ok()"]), 0);
}

#[test]
fn no_direct_output() {
    let files = sources();
    let hits = find(&files, &["println!(", "eprintln!(", "dbg!("]);
    assert_within("direct output (use tracing)", &hits, 0);
}

// =============================================================================
// Numeric hygiene
// =============================================================================

#[test]
fn no_narrowing_casts() {
    let files = sources();
    let hits = find(&files, &[" as usize", " as u32", " as u16", " as u8", " as i64", " as i32"]);
    assert_within("narrowing `as` casts (use try_from)", &hits, 0);
}

#[test]
fn float_casts_stay_in_geometry() {
    let files = sources();
    let outside = files.iter().filter(|src| !GEOMETRY_FILES.contains(&src.name.as_str()));
    assert_within("`as f64` outside grid/layout", &find(outside, &[" as f64"]), 0);
}

#[test]
fn geometry_casts_are_acknowledged() {
    for src in sources().iter().filter(|src| GEOMETRY_FILES.contains(&src.name.as_str())) {
        let casts = find([src], &[" as f64"]);
        let allows = find([src], &["cast_precision_loss"]);
        assert!(casts.is_empty() || !allows.is_empty(), "{} casts without allowing precision loss", src.name);
    }
}

#[test]
fn float_cmp_allows_are_rare() {
    let files = sources();
    assert_within("float_cmp allows", &find(&files, &["clippy::float_cmp"]), MAX_FLOAT_CMP_ALLOWS);
}

#[test]
fn grid_cells_are_not_indexed_directly() {
    let files = sources();
    let hits = find(&files, &["cells["]);
    assert_within("raw `cells[..]` indexing (use FixedGrid::cell)", &hits, 0);
}

// =============================================================================
// Browser shell
// =============================================================================

#[test]
fn browser_bindings_stay_in_the_shell() {
    let files = sources();
    let outside = files.iter().filter(|src| src.name != BROWSER_SHELL);
    let hits = find(outside, &["web_sys", "js_sys", "wasm_bindgen"]);
    assert_within("browser bindings outside the engine wrapper", &hits, 0);
}

#[test]
fn sources_are_found() {
    let names: Vec<String> = sources().into_iter().map(|s| s.name).collect();
    assert!(names.iter().any(|n| n == BROWSER_SHELL), "{names:?}");
    assert!(GEOMETRY_FILES.iter().all(|g| names.iter().any(|n| n == g)), "{names:?}");
}
