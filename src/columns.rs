//! Column names of the employer data sheet and the typed row built from them.
//!
//! The sheet follows one fixed naming convention: a set of scalar columns
//! (`Company Name`, `Button 1 URL`, ...) plus a family of numbered tile columns
//! shaped like `Tile {n} {Field}`:
//!
//! - `"Company Name"` → [`Column::CompanyName`]
//! - `"Tile 1 Headline"` → `Column::Tile(1, TileField::Headline)`
//! - `"Tile 12 Image"` → `Column::Tile(12, TileField::Image)`
//!
//! Matching is exact. `"company name"`, `"Tile 01 Link"` and `"Tile 0 Link"` are
//! not recognized, the same way a key lookup on the raw sheet row would miss them.
//! Headers that don't parse are kept aside on the [`TabularRow`] instead of being
//! silently looked up later.

use std::collections::BTreeMap;
use std::fmt;

/// One recognized column of the data sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Column {
    CompanyName,
    EmployerLogo,
    HeroImage,
    EnrollmentStartDate,
    EnrollmentEndDate,
    PrimaryColor,
    Button1Text,
    Button1Url,
    Button2Text,
    Button2Url,
    FooterContent,
    FooterDisclaimer,
    /// A numbered tile column. Tile numbers start at 1.
    Tile(u32, TileField),
}

/// The per-tile part of a `Tile {n} {Field}` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TileField {
    Headline,
    Description,
    Link,
    Image,
}

impl TileField {
    pub const ALL: [TileField; 4] = [
        TileField::Headline,
        TileField::Description,
        TileField::Link,
        TileField::Image,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TileField::Headline => "Headline",
            TileField::Description => "Description",
            TileField::Link => "Link",
            TileField::Image => "Image",
        }
    }

    fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.label() == label)
    }
}

impl Column {
    /// Every non-tile column, in sheet order.
    pub const SCALARS: [Column; 12] = [
        Column::CompanyName,
        Column::EmployerLogo,
        Column::HeroImage,
        Column::EnrollmentStartDate,
        Column::EnrollmentEndDate,
        Column::PrimaryColor,
        Column::Button1Text,
        Column::Button1Url,
        Column::Button2Text,
        Column::Button2Url,
        Column::FooterContent,
        Column::FooterDisclaimer,
    ];

    fn scalar_name(self) -> Option<&'static str> {
        let name = match self {
            Column::CompanyName => "Company Name",
            Column::EmployerLogo => "Employer Logo",
            Column::HeroImage => "Hero Image",
            Column::EnrollmentStartDate => "Enrollment Start Date",
            Column::EnrollmentEndDate => "Enrollment End Date",
            Column::PrimaryColor => "Primary Color",
            Column::Button1Text => "Button 1 Text",
            Column::Button1Url => "Button 1 URL",
            Column::Button2Text => "Button 2 Text",
            Column::Button2Url => "Button 2 URL",
            Column::FooterContent => "Footer Content",
            Column::FooterDisclaimer => "Footer Disclaimer",
            Column::Tile(..) => return None,
        };
        Some(name)
    }

    /// Parse a raw header into a column.
    ///
    /// Returns `None` for anything outside the naming convention.
    pub fn parse(header: &str) -> Option<Column> {
        if let Some(column) = Self::SCALARS
            .into_iter()
            .find(|c| c.scalar_name() == Some(header))
        {
            return Some(column);
        }
        parse_tile_column(header)
    }
}

/// `Tile {n} {Field}` with `n` written canonically (no sign, no leading zero).
fn parse_tile_column(header: &str) -> Option<Column> {
    let rest = header.strip_prefix("Tile ")?;
    let (digits, field) = rest.split_once(' ')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let number: u32 = digits.parse().ok()?;
    if number == 0 || number.to_string() != digits {
        return None;
    }
    let field = TileField::from_label(field)?;
    Some(Column::Tile(number, field))
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Column::Tile(n, field) => write!(f, "Tile {} {}", n, field.label()),
            other => f.write_str(other.scalar_name().unwrap_or_default()),
        }
    }
}

/// One decoded sheet row, keyed by recognized columns.
///
/// Values are kept as written. Empty values count as absent, matching the
/// sheet semantics where a blank cell and a missing column are the same thing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TabularRow {
    values: BTreeMap<Column, String>,
    ignored: Vec<String>,
}

impl TabularRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a row from raw `(header, value)` pairs.
    ///
    /// Unrecognized headers are recorded in [`TabularRow::ignored`]. When a
    /// header repeats, the first occurrence wins.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut row = Self::new();
        for (header, value) in pairs {
            let header = header.as_ref();
            match Column::parse(header) {
                Some(column) => {
                    row.values.entry(column).or_insert_with(|| value.into());
                }
                None => {
                    tracing::debug!(header, "ignoring unrecognized column");
                    row.ignored.push(header.to_string());
                }
            }
        }
        row
    }

    /// Builder-style insert, mostly for tests and fixtures.
    pub fn with(mut self, column: Column, value: impl Into<String>) -> Self {
        self.insert(column, value);
        self
    }

    pub fn insert(&mut self, column: Column, value: impl Into<String>) {
        self.values.insert(column, value.into());
    }

    /// The value of a column, or `None` when absent or empty.
    pub fn get(&self, column: Column) -> Option<&str> {
        self.values
            .get(&column)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// Headers that were present in the source but are not part of the sheet format.
    pub fn ignored(&self) -> &[String] {
        &self.ignored
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
