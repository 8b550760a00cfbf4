//! Tabular extraction: sheet rows → [`ContentRecord`].
//!
//! The employer data sheet carries everything in its first data row. Scalar
//! fields map one-to-one onto columns; tiles are spread across numbered column
//! families (`Tile 1 Headline`, `Tile 1 Description`, ...).
//!
//! ## Tile discovery
//!
//! Tiles are found by probing numbers in sequence, starting at 1:
//!
//! ```text
//! Tile 1 Headline  present → read tile 1, probe 2
//! Tile 2 Headline  present → read tile 2, probe 3
//! Tile 3 Headline  absent  → stop (Tile 4 is never looked at)
//! ```
//!
//! A discovered tile is kept only when its headline, description and link are
//! all non-empty. Incomplete tiles are dropped without error; completeness of
//! the overall record is judged later by [`crate::validate`].
//!
//! ## Decoding
//!
//! Turning a spreadsheet file into rows is delegated to a [`RowDecoder`]. Two
//! decoders ship with the crate, both expecting one header row naming the
//! columns followed by data rows:
//!
//! - [`XlsxDecoder`] reads the first worksheet of an Excel workbook. Date
//!   cells come out as `YYYY-MM-DD`.
//! - [`CsvDecoder`] reads the same sheet exported as CSV.

use crate::columns::{Column, TabularRow, TileField};
use crate::types::{
    ContentRecord, Cta, DEFAULT_COMPANY_NAME, DEFAULT_PRIMARY_COLOR, ImageRef, Tile,
};
use calamine::{Data, DataType, Reader, Xlsx};
use std::io::Cursor;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("No data found in the sheet")]
    Empty,
}

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Excel error: {0}")]
    Xlsx(#[from] calamine::XlsxError),
    #[error("The workbook has no worksheets")]
    NoSheet,
}

/// Decodes a spreadsheet file into rows.
pub trait RowDecoder: Send + Sync {
    /// File suffix this decoder understands, including the dot (`".csv"`).
    fn suffix(&self) -> &str;

    fn decode(&self, bytes: &[u8]) -> Result<Vec<TabularRow>, DecodeError>;
}

/// Reads the data sheet exported as CSV.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvDecoder;

impl RowDecoder for CsvDecoder {
    fn suffix(&self) -> &str {
        ".csv"
    }

    fn decode(&self, bytes: &[u8]) -> Result<Vec<TabularRow>, DecodeError> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(bytes);

        let headers = rdr.headers()?.clone();
        let mut rows = Vec::new();
        for record in rdr.records() {
            let record = record?;
            rows.push(TabularRow::from_pairs(headers.iter().zip(record.iter())));
        }
        tracing::debug!(rows = rows.len(), columns = headers.len(), "decoded csv");
        Ok(rows)
    }
}

/// Reads the first worksheet of an `.xlsx` workbook.
#[derive(Debug, Clone, Copy, Default)]
pub struct XlsxDecoder;

impl RowDecoder for XlsxDecoder {
    fn suffix(&self) -> &str {
        ".xlsx"
    }

    fn decode(&self, bytes: &[u8]) -> Result<Vec<TabularRow>, DecodeError> {
        let mut workbook = Xlsx::new(Cursor::new(bytes))?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or(DecodeError::NoSheet)??;

        let mut cells = range.rows();
        let headers: Vec<String> = cells
            .next()
            .map(|row| row.iter().map(cell_text).collect())
            .unwrap_or_default();

        let rows: Vec<TabularRow> = cells
            .filter(|row| row.iter().any(|cell| !matches!(cell, Data::Empty)))
            .map(|row| TabularRow::from_pairs(headers.iter().zip(row.iter().map(cell_text))))
            .collect();
        tracing::debug!(rows = rows.len(), columns = headers.len(), "decoded xlsx");
        Ok(rows)
    }
}

/// Cell contents as the sheet shows them, trimmed. Dates become `YYYY-MM-DD`.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::DateTime(_) | Data::DateTimeIso(_) => match cell.as_date() {
            Some(date) => date.format("%Y-%m-%d").to_string(),
            None => cell.to_string(),
        },
        other => other.to_string().trim().to_string(),
    }
}

/// Build a content record from decoded sheet rows.
///
/// Only the first row is consulted. Fails only when there are no rows at all;
/// every missing field falls back to its default.
pub fn extract(rows: &[TabularRow]) -> Result<ContentRecord, ExtractError> {
    let row = rows.first().ok_or(ExtractError::Empty)?;
    if rows.len() > 1 {
        tracing::debug!(extra = rows.len() - 1, "ignoring rows after the first");
    }

    let text = |column: Column| row.get(column).unwrap_or_default().to_string();
    let image = |column: Column| row.get(column).map(ImageRef::url);

    let tiles = discover_tiles(row);
    tracing::info!(tiles = tiles.len(), "extracted content record");

    Ok(ContentRecord {
        company_name: row
            .get(Column::CompanyName)
            .unwrap_or(DEFAULT_COMPANY_NAME)
            .to_string(),
        employer_logo: image(Column::EmployerLogo),
        hero_image: image(Column::HeroImage),
        enrollment_start: text(Column::EnrollmentStartDate),
        enrollment_end: text(Column::EnrollmentEndDate),
        primary_color: row
            .get(Column::PrimaryColor)
            .unwrap_or(DEFAULT_PRIMARY_COLOR)
            .to_string(),
        cta1: Cta::new(text(Column::Button1Text), text(Column::Button1Url)),
        cta2: Cta::new(text(Column::Button2Text), text(Column::Button2Url)),
        footer_content: text(Column::FooterContent),
        footer_disclaimer: text(Column::FooterDisclaimer),
        tiles,
    })
}

/// Sequential probe over `Tile {n} Headline`, stopping at the first gap.
fn discover_tiles(row: &TabularRow) -> Vec<Tile> {
    let mut tiles = Vec::new();
    let mut n = 1;
    while let Some(headline) = row.get(Column::Tile(n, TileField::Headline)) {
        let field = |f: TileField| row.get(Column::Tile(n, f)).unwrap_or_default();
        let mut tile = Tile::new(headline, field(TileField::Description), field(TileField::Link));
        tile.image = row.get(Column::Tile(n, TileField::Image)).map(ImageRef::url);

        if tile.is_complete() {
            tiles.push(tile);
        } else {
            tracing::debug!(tile = n, "dropping incomplete tile");
        }
        n += 1;
    }
    tiles
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;

    fn with_tile(
        row: TabularRow,
        n: u32,
        headline: &str,
        description: &str,
        link: &str,
    ) -> TabularRow {
        row.with(Column::Tile(n, TileField::Headline), headline)
            .with(Column::Tile(n, TileField::Description), description)
            .with(Column::Tile(n, TileField::Link), link)
    }

    #[test]
    fn no_rows_is_an_error() {
        assert!(matches!(extract(&[]), Err(ExtractError::Empty)));
    }

    #[test]
    fn empty_row_yields_defaults() {
        let record = extract(&[TabularRow::new()]).unwrap();
        assert_eq!(record.company_name, "ABC Company");
        assert_eq!(record.primary_color, "#7b1d3c");
        assert_eq!(record.enrollment_start, "");
        assert_eq!(record.cta2, Cta::default());
        assert_eq!(record.employer_logo, None);
        assert!(record.tiles.is_empty());
    }

    #[test]
    fn reads_scalar_columns() {
        let record = extract(&[full_row(3)]).unwrap();
        assert_eq!(record.company_name, "ABC Manufacturing Corp");
        assert_eq!(record.enrollment_start, "2025-09-01");
        assert_eq!(record.enrollment_end, "2025-09-30");
        assert_eq!(record.cta1.text, "Enroll Now");
        assert_eq!(record.cta2.url, "https://benefits.abcmanufacturing.com/info");
        assert!(record.footer_disclaimer.starts_with("The Hartford"));
    }

    #[test]
    fn image_columns_become_persisted_refs() {
        let row = TabularRow::new()
            .with(Column::HeroImage, "https://cdn.test/hero.jpg")
            .with(Column::EmployerLogo, "");
        let record = extract(&[row]).unwrap();
        assert_eq!(record.hero_image, Some(ImageRef::url("https://cdn.test/hero.jpg")));
        assert_eq!(record.employer_logo, None);
    }

    #[test]
    fn no_tile_headlines_means_no_tiles() {
        let row = TabularRow::new()
            .with(Column::Tile(1, TileField::Description), "orphan description")
            .with(Column::Tile(1, TileField::Link), "https://x.test");
        let record = extract(&[row]).unwrap();
        assert!(record.tiles.is_empty());
    }

    #[test]
    fn probe_stops_at_first_gap() {
        let mut row = TabularRow::new();
        for n in [1, 2, 4] {
            row = with_tile(row, n, &format!("Tile {n}"), "desc", "https://x.test");
        }
        let record = extract(&[row]).unwrap();
        let headlines: Vec<_> = record.tiles.iter().map(|t| t.headline.as_str()).collect();
        assert_eq!(headlines, ["Tile 1", "Tile 2"]);
    }

    #[test]
    fn empty_headline_is_a_gap() {
        let row = with_tile(TabularRow::new(), 1, "One", "d", "https://x.test")
            .with(Column::Tile(2, TileField::Headline), "");
        let row = with_tile(row, 3, "Three", "d", "https://x.test");
        assert_eq!(extract(&[row]).unwrap().tiles.len(), 1);
    }

    #[test]
    fn incomplete_tile_is_dropped_but_probe_continues() {
        let row = with_tile(TabularRow::new(), 1, "One", "d", "");
        let row = with_tile(row, 2, "Two", "d", "https://x.test");
        let record = extract(&[row]).unwrap();
        assert_eq!(record.tiles.len(), 1);
        assert_eq!(record.tiles[0].headline, "Two");
    }

    #[test]
    fn tile_image_is_optional() {
        let row = with_tile(TabularRow::new(), 1, "One", "d", "https://x.test")
            .with(Column::Tile(1, TileField::Image), "https://cdn.test/1.png");
        let row = with_tile(row, 2, "Two", "d", "https://x.test");
        let record = extract(&[row]).unwrap();
        assert_eq!(record.tiles[0].image, Some(ImageRef::url("https://cdn.test/1.png")));
        assert_eq!(record.tiles[1].image, None);
    }

    #[test]
    fn extracted_tiles_get_distinct_ids() {
        let record = extract(&[full_row(6)]).unwrap();
        let ids: std::collections::HashSet<_> = record.tiles.iter().map(|t| &t.id).collect();
        assert_eq!(ids.len(), 6);
    }

    #[test]
    fn only_first_row_is_used() {
        let first = TabularRow::new().with(Column::CompanyName, "First");
        let second = TabularRow::new().with(Column::CompanyName, "Second");
        assert_eq!(extract(&[first, second]).unwrap().company_name, "First");
    }

    #[test]
    fn csv_decoder_reads_header_and_rows() {
        let csv = "Company Name,Primary Color,Tile 1 Headline,Mystery\n  Acme  ,#112233,Hello,?\n";
        let rows = CsvDecoder.decode(csv.as_bytes()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get(Column::CompanyName), Some("Acme"));
        assert_eq!(rows[0].get(Column::Tile(1, TileField::Headline)), Some("Hello"));
        assert_eq!(rows[0].ignored(), ["Mystery"]);
    }

    #[test]
    fn csv_decoder_tolerates_short_rows() {
        let csv = "Company Name,Footer Content\nAcme\n";
        let rows = CsvDecoder.decode(csv.as_bytes()).unwrap();
        assert_eq!(rows[0].get(Column::FooterContent), None);
    }

    #[test]
    fn xlsx_decoder_reads_first_sheet() {
        let rows = XlsxDecoder.decode(&full_xlsx(3)).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get(Column::CompanyName), Some("ABC Manufacturing Corp"));
        assert_eq!(rows[0].get(Column::EnrollmentStartDate), Some("2025-09-01"));

        let record = extract(&rows).unwrap();
        assert_eq!(record.enrollment_end, "2025-09-30");
        assert_eq!(record.primary_color, "#1f4e79");
        let headlines: Vec<_> = record.tiles.iter().map(|t| t.headline.as_str()).collect();
        assert_eq!(headlines, ["Benefit 1", "Benefit 2", "Benefit 3"]);
    }

    #[test]
    fn xlsx_decoder_rejects_non_workbooks() {
        let err = XlsxDecoder.decode(b"Company Name\nAcme\n").unwrap_err();
        assert!(matches!(err, DecodeError::Xlsx(_)), "{err}");
    }

    #[test]
    fn csv_header_only_has_no_rows() {
        let rows = CsvDecoder.decode(b"Company Name,Primary Color\n").unwrap();
        assert!(rows.is_empty());
        assert!(matches!(extract(&rows), Err(ExtractError::Empty)));
    }
}
