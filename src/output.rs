//! CLI output formatting for every command.
//!
//! # Content-First Display
//!
//! Output describes the microsite, not the files behind it. A record is shown
//! as the company it belongs to, its enrollment window, and its tiles by
//! position; file paths appear only as secondary `→ path` context.
//!
//! # Output Format
//!
//! ## Extract
//!
//! ```text
//! ABC Manufacturing Corp
//!     Enrollment: 2025-09-01 → 2025-09-30
//!     Primary Color: #1f4e79
//!     Buttons: Enroll Now, Learn More
//! Tiles
//! 001 Benefit 1
//!     Link: https://benefits.abcmanufacturing.com/1
//! Ignored columns: Notes
//! ```
//!
//! ## Check
//!
//! ```text
//! 2 problems
//!     Company Name is required
//!     Primary Color must be a valid hex color (e.g., #7b1d3c)
//! ```
//!
//! ## Build
//!
//! ```text
//! ABC Company Benefits Enrollment → dist/index.html
//!     September 1 – September 30, 2025
//!     001 Experience MyTomorrow! (placeholder image)
//!     002 Enroll in your benefits now!
//! Wrote 1 page, 1 media file
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.

use crate::render::Presentation;
use crate::types::ContentRecord;
use crate::validate::{Violation, messages};
use std::path::Path;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate_desc(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let head: String = text.chars().take(max).collect();
        format!("{}...", head)
    }
}

/// `1 thing` / `2 things`.
fn plural(n: usize, singular: &str, plural: &str) -> String {
    if n == 1 {
        format!("{} {}", n, singular)
    } else {
        format!("{} {}", n, plural)
    }
}

fn or_unset(value: &str) -> &str {
    if value.is_empty() { "(not set)" } else { value }
}

// ============================================================================
// Extract
// ============================================================================

/// Summarize an extracted record.
pub fn format_record(record: &ContentRecord, ignored: &[String]) -> Vec<String> {
    let mut lines = vec![record.display_company_name().to_string()];

    lines.push(format!(
        "{}Enrollment: {} \u{2192} {}",
        indent(1),
        or_unset(&record.enrollment_start),
        or_unset(&record.enrollment_end)
    ));
    lines.push(format!(
        "{}Primary Color: {}",
        indent(1),
        or_unset(&record.primary_color)
    ));

    let buttons: Vec<&str> = [&record.cta1, &record.cta2]
        .into_iter()
        .filter(|c| c.is_shown())
        .map(|c| c.text.as_str())
        .collect();
    if buttons.is_empty() {
        lines.push(format!("{}Buttons: (none)", indent(1)));
    } else {
        lines.push(format!("{}Buttons: {}", indent(1), buttons.join(", ")));
    }

    lines.push("Tiles".to_string());
    if record.tiles.is_empty() {
        lines.push(format!("{}(none)", indent(1)));
    }
    for (i, tile) in record.tiles.iter().enumerate() {
        lines.push(format!("{} {}", format_index(i + 1), tile.headline));
        lines.push(format!("{}Link: {}", indent(1), or_unset(&tile.link)));
        if !tile.description.is_empty() {
            lines.push(format!(
                "{}Description: {}",
                indent(1),
                truncate_desc(&tile.description, 60)
            ));
        }
    }

    if !ignored.is_empty() {
        lines.push(format!("Ignored columns: {}", ignored.join(", ")));
    }

    lines
}

/// Print extract output to stdout.
pub fn print_record(record: &ContentRecord, ignored: &[String]) {
    for line in format_record(record, ignored) {
        println!("{}", line);
    }
}

// ============================================================================
// Check
// ============================================================================

/// List every violation, or confirm there are none.
pub fn format_violations(violations: &[Violation]) -> Vec<String> {
    if violations.is_empty() {
        return vec!["No problems found".to_string()];
    }
    let mut lines = vec![plural(violations.len(), "problem", "problems")];
    for message in messages(violations) {
        lines.push(format!("{}{}", indent(1), message));
    }
    lines
}

/// Print check output to stdout.
pub fn print_violations(violations: &[Violation]) {
    for line in format_violations(violations) {
        println!("{}", line);
    }
}

// ============================================================================
// Build
// ============================================================================

/// Describe a written page.
pub fn format_build(page: &Presentation, page_path: &Path, media_files: usize) -> Vec<String> {
    let mut lines = vec![format!(
        "{} \u{2192} {}",
        page.title,
        page_path.display()
    )];
    lines.push(format!("{}{}", indent(1), page.header.date_range));
    for (i, tile) in page.tiles.iter().enumerate() {
        let marker = if tile.image.placeholder {
            " (placeholder image)"
        } else {
            ""
        };
        lines.push(format!(
            "{}{} {}{}",
            indent(1),
            format_index(i + 1),
            tile.headline,
            marker
        ));
    }
    lines.push(format!(
        "Wrote 1 page, {}",
        plural(media_files, "media file", "media files")
    ));
    lines
}

/// Print build output to stdout.
pub fn print_build(page: &Presentation, page_path: &Path, media_files: usize) {
    for line in format_build(page, page_path, media_files) {
        println!("{}", line);
    }
}

// ============================================================================
// Publish
// ============================================================================

pub fn format_published(company: &str, url: &str) -> Vec<String> {
    vec![
        format!("Published {}", company),
        format!("{}{}", indent(1), url),
    ]
}

/// Print publish output to stdout.
pub fn print_published(company: &str, url: &str) {
    for line in format_published(company, url) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
