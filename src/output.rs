//! CLI output formatting for `build` and `check`.
//!
//! # Output Format
//!
//! ## Build
//!
//! ```text
//! Pages
//! 001 Support → help/support.html
//!     Source: global/help/support.md
//! 002 Overview → packages/module-vpc/overview.html
//!     Source: packages/module-vpc/README.md
//!
//! Images
//! 001 help/images/sample.png
//!     Source: global/help/images/sample.png
//!
//! Failed
//!     packages/module-vpc/modules/vpc-app/_docs/peering.md
//!         Link error: ...
//!
//! Built 2 pages, 1 image (3 skipped, 1 failed)
//! ```
//!
//! ## Check
//!
//! ```text
//! global/help/support.md
//!     global-doc → help/support.html
//! notes.txt
//!     skip
//!
//! Checked 2 files: 1 page, 0 images, 1 skipped, 0 errors
//! ```
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout.

use crate::assemble::{BuildReport, Classification};
use crate::classify::DocumentKind;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// `1 page`, `2 pages`
fn count(n: usize, singular: &str, plural: &str) -> String {
    if n == 1 {
        format!("{} {}", n, singular)
    } else {
        format!("{} {}", n, plural)
    }
}

// ============================================================================
// Build
// ============================================================================

pub fn format_build_report(report: &BuildReport) -> Vec<String> {
    let mut lines = Vec::new();

    if !report.pages.is_empty() {
        lines.push("Pages".to_string());
        for (i, page) in report.pages.iter().enumerate() {
            lines.push(format!(
                "{} {} → {}",
                format_index(i + 1),
                page.title,
                page.output_path
            ));
            lines.push(format!("{}Source: {}", indent(1), page.input_path));
        }
    }

    if !report.images.is_empty() {
        if !lines.is_empty() {
            lines.push(String::new());
        }
        lines.push("Images".to_string());
        for (i, image) in report.images.iter().enumerate() {
            lines.push(format!("{} {}", format_index(i + 1), image.output_path));
            lines.push(format!("{}Source: {}", indent(1), image.input_path));
        }
    }

    if !report.failures.is_empty() {
        if !lines.is_empty() {
            lines.push(String::new());
        }
        lines.push("Failed".to_string());
        for failure in &report.failures {
            lines.push(format!("{}{}", indent(1), failure.path));
            lines.push(format!("{}{}", indent(2), failure.error));
        }
    }

    if !lines.is_empty() {
        lines.push(String::new());
    }
    lines.push(format!(
        "Built {}, {} ({} skipped, {} failed)",
        count(report.pages.len(), "page", "pages"),
        count(report.images.len(), "image", "images"),
        report.skipped.len(),
        report.failures.len()
    ));

    lines
}

pub fn print_build_report(report: &BuildReport) {
    for line in format_build_report(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Check
// ============================================================================

pub fn format_check_output(classifications: &[Classification]) -> Vec<String> {
    let mut lines = Vec::new();
    let (mut pages, mut images, mut skipped, mut errors) = (0, 0, 0, 0);

    for c in classifications {
        lines.push(c.input_path.clone());
        let detail = match (&c.output_path, &c.error) {
            (_, Some(error)) => {
                errors += 1;
                format!("{} ✗ {}", c.kind, error)
            }
            (Some(output), None) => {
                if c.kind == DocumentKind::Image {
                    images += 1;
                } else {
                    pages += 1;
                }
                format!("{} → {}", c.kind, output)
            }
            (None, None) => {
                skipped += 1;
                c.kind.to_string()
            }
        };
        lines.push(format!("{}{}", indent(1), detail));
    }

    if !lines.is_empty() {
        lines.push(String::new());
    }
    lines.push(format!(
        "Checked {}: {}, {}, {} skipped, {} errors",
        count(classifications.len(), "file", "files"),
        count(pages, "page", "pages"),
        count(images, "image", "images"),
        skipped,
        errors
    ));

    lines
}

pub fn print_check_output(classifications: &[Classification]) {
    for line in format_check_output(classifications) {
        println!("{}", line);
    }
}
