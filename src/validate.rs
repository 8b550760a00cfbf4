//! Content validation.
//!
//! [`validate`] checks a record for completeness and format and returns every
//! broken rule as a [`Violation`]. Nothing here fails: an empty list means the
//! record can be published, a non-empty one is shown to the user as-is and
//! blocks publishing. All violations are equally blocking.
//!
//! ## Rules, in report order
//!
//! 1. Required fields: company name, both enrollment dates, primary color, both
//!    button texts and URLs, footer content and disclaimer, employer logo, hero image.
//! 2. Tiles (depends on [`Gate`]):
//!    - `Publish`: at least 3 tiles
//!    - `Editor`: at least one tile
//!
//!    then, for both gates, each tile's missing headline, description or link
//!    as its own violation, keyed by 1-based position.
//! 3. Enrollment dates, when present, are `YYYY-MM-DD`.
//! 4. Primary color, when present, is `#RRGGBB`.
//! 5. Button URLs, when present, start with `http://` or `https://`.
//! 6. When both dates are real calendar dates, the end is not before the start.
//!
//! Rules are evaluated independently, so a missing field never hides an
//! unrelated format problem.

use crate::columns::{Column, TileField};
use crate::types::{ContentRecord, has_image};
use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

/// Minimum number of tiles a published site shows.
pub const MIN_PUBLISHED_TILES: usize = 3;

// `[0-9]` rather than `\d`: the regex crate's `\d` matches any Unicode digit.
static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").expect("date pattern"));
static COLOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").expect("color pattern"));
static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://.+").expect("url pattern"));

/// Which tile rule applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Gate {
    /// The publish requirement: a full grid of tiles.
    #[default]
    Publish,
    /// The live editor form: any non-empty set of tiles.
    Editor,
}

/// A malformed value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("{0} must be in YYYY-MM-DD format")]
    Date(Column),
    #[error("Primary Color must be a valid hex color (e.g., #7b1d3c)")]
    Color,
    #[error("{0} must be a valid URL starting with http:// or https://")]
    Url(Column),
}

/// One broken rule.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    #[error("{0} is required")]
    Missing(Column),
    #[error("At least 3 tiles are required")]
    TooFewTiles,
    #[error("At least one tile is required")]
    NoTiles,
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error("Enrollment End Date must not be before Enrollment Start Date")]
    ReversedDates,
}

/// Check a record against every rule and collect what is broken.
pub fn validate(record: &ContentRecord, gate: Gate) -> Vec<Violation> {
    let mut violations = Vec::new();

    for (column, present) in required_fields(record) {
        if !present {
            violations.push(Violation::Missing(column));
        }
    }

    check_tiles(record, gate, &mut violations);

    for (column, value) in [
        (Column::EnrollmentStartDate, &record.enrollment_start),
        (Column::EnrollmentEndDate, &record.enrollment_end),
    ] {
        if !value.is_empty() && !DATE_RE.is_match(value) {
            violations.push(FormatError::Date(column).into());
        }
    }

    if !record.primary_color.is_empty() && !is_hex_color(&record.primary_color) {
        violations.push(FormatError::Color.into());
    }

    for (column, url) in [
        (Column::Button1Url, &record.cta1.url),
        (Column::Button2Url, &record.cta2.url),
    ] {
        if !url.is_empty() && !URL_RE.is_match(url) {
            violations.push(FormatError::Url(column).into());
        }
    }

    if is_reversed(&record.enrollment_start, &record.enrollment_end) {
        violations.push(Violation::ReversedDates);
    }

    tracing::debug!(count = violations.len(), ?gate, "validated record");
    violations
}

/// No violations under the publish gate.
pub fn is_publishable(record: &ContentRecord) -> bool {
    validate(record, Gate::Publish).is_empty()
}

/// `#RRGGBB`, as accepted for the primary color.
pub fn is_hex_color(value: &str) -> bool {
    COLOR_RE.is_match(value)
}

/// Violations as display strings, in report order.
pub fn messages(violations: &[Violation]) -> Vec<String> {
    violations.iter().map(ToString::to_string).collect()
}

fn required_fields(record: &ContentRecord) -> [(Column, bool); 12] {
    [
        (Column::CompanyName, !record.company_name.is_empty()),
        (Column::EnrollmentStartDate, !record.enrollment_start.is_empty()),
        (Column::EnrollmentEndDate, !record.enrollment_end.is_empty()),
        (Column::PrimaryColor, !record.primary_color.is_empty()),
        (Column::Button1Text, !record.cta1.text.is_empty()),
        (Column::Button1Url, !record.cta1.url.is_empty()),
        (Column::Button2Text, !record.cta2.text.is_empty()),
        (Column::Button2Url, !record.cta2.url.is_empty()),
        (Column::FooterContent, !record.footer_content.is_empty()),
        (Column::FooterDisclaimer, !record.footer_disclaimer.is_empty()),
        (Column::EmployerLogo, has_image(record.employer_logo.as_ref())),
        (Column::HeroImage, has_image(record.hero_image.as_ref())),
    ]
}

fn check_tiles(record: &ContentRecord, gate: Gate, violations: &mut Vec<Violation>) {
    match gate {
        Gate::Publish if record.tiles.len() < MIN_PUBLISHED_TILES => {
            violations.push(Violation::TooFewTiles);
        }
        Gate::Editor if record.tiles.is_empty() => violations.push(Violation::NoTiles),
        _ => {}
    }

    for (idx, tile) in record.tiles.iter().enumerate() {
        let position = u32::try_from(idx + 1).unwrap_or(u32::MAX);
        for (field, value) in [
            (TileField::Headline, &tile.headline),
            (TileField::Description, &tile.description),
            (TileField::Link, &tile.link),
        ] {
            if value.is_empty() {
                violations.push(Violation::Missing(Column::Tile(position, field)));
            }
        }
    }
}

fn is_reversed(start: &str, end: &str) -> bool {
    let parse = |s: &str| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok();
    match (parse(start), parse(end)) {
        (Some(start), Some(end)) => end < start,
        _ => false,
    }
}
