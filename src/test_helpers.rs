//! Shared test utilities for the microsite test suite.
//!
//! Provides sample sheet rows and records, a deterministic placeholder
//! chooser, and a render helper that works without randomness.
//!
//! # Usage
//!
//! ```ignore
//! use crate::test_helpers::*;
//!
//! let record = extract(&[full_row(3)]).unwrap();
//! assert_eq!(validate(&record, Gate::Publish), vec![]);
//!
//! let page = render_site(&valid_record());
//! assert_eq!(page.tiles.len(), 3);
//! ```

use crate::columns::{Column, TabularRow, TileField};
use crate::config::BrandConfig;
use crate::render::{
    PlaceholderChooser, Presentation, RenderContext, SessionLocators, Variant, render,
};
use crate::types::ContentRecord;
use chrono::{Datelike, NaiveDate};
use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};

// =========================================================================
// Sheet fixtures
// =========================================================================

/// A fully filled-in data row with `tiles` complete tiles.
pub fn full_row(tiles: u32) -> TabularRow {
    let mut row = TabularRow::new()
        .with(Column::CompanyName, "ABC Manufacturing Corp")
        .with(Column::EmployerLogo, "https://cdn.abcmanufacturing.com/logo.png")
        .with(Column::HeroImage, "https://cdn.abcmanufacturing.com/hero.jpg")
        .with(Column::EnrollmentStartDate, "2025-09-01")
        .with(Column::EnrollmentEndDate, "2025-09-30")
        .with(Column::PrimaryColor, "#1f4e79")
        .with(Column::Button1Text, "Enroll Now")
        .with(Column::Button1Url, "https://benefits.abcmanufacturing.com/enroll")
        .with(Column::Button2Text, "Learn More")
        .with(Column::Button2Url, "https://benefits.abcmanufacturing.com/info")
        .with(
            Column::FooterContent,
            "Questions? Contact HR at hr@abcmanufacturing.com",
        )
        .with(
            Column::FooterDisclaimer,
            "The Hartford® is The Hartford Financial Services Group, Inc.",
        );
    for n in 1..=tiles {
        row = row
            .with(Column::Tile(n, TileField::Headline), format!("Benefit {n}"))
            .with(
                Column::Tile(n, TileField::Description),
                format!("Everything about benefit {n}."),
            )
            .with(
                Column::Tile(n, TileField::Link),
                format!("https://benefits.abcmanufacturing.com/{n}"),
            );
    }
    row
}

/// Header order of the fixture sheets.
fn sheet_columns(tiles: u32) -> Vec<Column> {
    let mut columns: Vec<Column> = Column::SCALARS.to_vec();
    for n in 1..=tiles {
        columns.extend(TileField::ALL.iter().map(|&f| Column::Tile(n, f)));
    }
    columns
}

/// The same content as [`full_row`], as CSV text.
pub fn full_csv(tiles: u32) -> String {
    let row = full_row(tiles);
    let columns = sheet_columns(tiles);
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(columns.iter().map(ToString::to_string)).unwrap();
    wtr.write_record(columns.iter().map(|&c| row.get(c).unwrap_or_default()))
        .unwrap();
    let bytes = wtr.into_inner().map_err(|e| e.into_error()).unwrap();
    String::from_utf8(bytes).unwrap()
}

/// The same content as [`full_row`], as an `.xlsx` workbook. Enrollment
/// dates are real date cells.
pub fn full_xlsx(tiles: u32) -> Vec<u8> {
    let row = full_row(tiles);
    let date_format = Format::new().set_num_format("yyyy-mm-dd");
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    for (col, column) in sheet_columns(tiles).into_iter().enumerate() {
        let col = u16::try_from(col).unwrap();
        sheet.write_string(0, col, column.to_string()).unwrap();
        let value = row.get(column).unwrap_or_default();
        match column {
            Column::EnrollmentStartDate | Column::EnrollmentEndDate => {
                let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").unwrap();
                let date = ExcelDateTime::from_ymd(
                    u16::try_from(date.year()).unwrap(),
                    u8::try_from(date.month()).unwrap(),
                    u8::try_from(date.day()).unwrap(),
                )
                .unwrap();
                sheet
                    .write_datetime_with_format(1, col, &date, &date_format)
                    .unwrap();
            }
            _ => {
                sheet.write_string(1, col, value).unwrap();
            }
        }
    }
    workbook.save_to_buffer().unwrap()
}

// =========================================================================
// Record fixtures
// =========================================================================

/// A record that passes both validation gates.
pub fn valid_record() -> ContentRecord {
    ContentRecord::template()
}

// =========================================================================
// Rendering
// =========================================================================

/// Four distinct placeholder URLs.
pub fn placeholder_library() -> Vec<String> {
    (1..=4).map(|n| format!("/test-placeholder-{n}.svg")).collect()
}

/// Picks 0, 1, 2, ... wrapping at the library length.
#[derive(Debug, Default)]
pub struct SequenceChooser {
    next: usize,
}

impl PlaceholderChooser for SequenceChooser {
    fn choose(&mut self, len: usize) -> usize {
        let idx = self.next % len;
        self.next += 1;
        idx
    }
}

/// Render with the stock brand, the test library, and sequential placeholders.
pub fn render_variant(record: &ContentRecord, variant: Variant) -> Presentation {
    let brand = BrandConfig::default();
    let library = placeholder_library();
    let mut chooser = SequenceChooser::default();
    let mut locators = SessionLocators::new();
    let mut ctx = RenderContext {
        variant,
        brand: &brand,
        placeholders: &library,
        year: 2025,
        chooser: &mut chooser,
        locators: &mut locators,
    };
    render(record, &mut ctx)
}

/// [`render_variant`] for the published site.
pub fn render_site(record: &ContentRecord) -> Presentation {
    render_variant(record, Variant::Site)
}
