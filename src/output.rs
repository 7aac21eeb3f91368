//! CLI output formatting.
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects. Diagnostics go through `tracing`, not
//! through here.
//!
//! # Output Format
//!
//! ## Build
//!
//! ```text
//! 001 jobs/programme-1952.json → https://iiif.sapa.swiss/manifests/programme-1952.json
//!     Canvases: 12 of 13 (1 dropped)
//!     Stored: performing-arts-iiif-source/manifests/programme-1952.json
//! 002 jobs/broken.json
//!     Failed: Manifest error: Invalid argument: at least one image required
//!
//! Built 1 manifest, 1 failed
//! ```
//!
//! ## Resolve
//!
//! ```text
//! 001 https://iiif.sapa.swiss/iiif/3/a → 1000 × 800
//! 002 https://iiif.sapa.swiss/iiif/3/b → unresolved
//! ```

use crate::job::{BuildError, JobReport};
use crate::resolver::Dimensions;
use std::path::Path;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

// ============================================================================
// Build
// ============================================================================

/// Outcome of one job file, as shown by `build`.
pub type BuildOutcome<'a> = (&'a Path, &'a Result<JobReport, BuildError>);

pub fn format_build_output(outcomes: &[BuildOutcome<'_>]) -> Vec<String> {
    let mut lines = Vec::new();
    let mut built = 0;
    let mut failed = 0;

    for (i, (path, outcome)) in outcomes.iter().enumerate() {
        let header = format!("{} {}", format_index(i + 1), path.display());
        match outcome {
            Ok(report) => {
                built += 1;
                lines.push(format!("{header} → {}", report.manifest_id));
                let dropped = match report.dropped() {
                    0 => String::new(),
                    n => format!(" ({n} dropped)"),
                };
                lines.push(format!(
                    "{}Canvases: {} of {}{dropped}",
                    indent(1),
                    report.canvases,
                    report.images
                ));
                match &report.destination {
                    Some(dest) => lines.push(format!(
                        "{}Stored: {}/{}",
                        indent(1),
                        dest.bucket,
                        dest.key
                    )),
                    None => lines.push(format!("{}Dry run: not stored", indent(1))),
                }
            }
            Err(err) => {
                failed += 1;
                lines.push(header);
                lines.push(format!("{}Failed: {err}", indent(1)));
            }
        }
    }

    lines.push(String::new());
    let mut summary = format!("Built {}", plural(built, "manifest"));
    if failed > 0 {
        summary.push_str(&format!(", {failed} failed"));
    }
    lines.push(summary);
    lines
}

pub fn print_build_output(outcomes: &[BuildOutcome<'_>]) {
    for line in format_build_output(outcomes) {
        println!("{line}");
    }
}

// ============================================================================
// Resolve
// ============================================================================

pub fn format_resolve_output(results: &[(&str, Option<Dimensions>)]) -> Vec<String> {
    results
        .iter()
        .enumerate()
        .map(|(i, (url, dims))| {
            let size = match dims {
                Some(d) => format!("{} × {}", d.width, d.height),
                None => "unresolved".to_string(),
            };
            format!("{} {url} → {size}", format_index(i + 1))
        })
        .collect()
}

pub fn print_resolve_output(results: &[(&str, Option<Dimensions>)]) {
    for line in format_resolve_output(results) {
        println!("{line}");
    }
}
