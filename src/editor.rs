//! Typed edit operations.
//!
//! Every operation takes a record by reference and returns a fresh one; the
//! input is never touched. [`Editor`] keeps the current record for an editing
//! session along with undo/redo history, and re-validates on demand with the
//! editor's looser tile rule.
//!
//! Field names are the sheet's column names (`"Primary Color"`,
//! `"Button 1 URL"`), so a value can be moved between the sheet and the editor
//! without translation.

use crate::columns::Column;
use crate::types::{ContentRecord, ImageRef, Tile, TileId};
use crate::validate::{Gate, Violation, validate};
use std::str::FromStr;
use thiserror::Error;

/// Undo steps kept per session.
pub const HISTORY_LIMIT: usize = 100;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    #[error("tile {0} already exists")]
    DuplicateTileId(TileId),
    #[error("no tile with id {0}")]
    UnknownTile(TileId),
    #[error("unknown field: {0}")]
    UnknownField(String),
}

/// A single-valued field of the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarField {
    CompanyName,
    EmployerLogo,
    HeroImage,
    EnrollmentStart,
    EnrollmentEnd,
    PrimaryColor,
    Button1Text,
    Button1Url,
    Button2Text,
    Button2Url,
    FooterContent,
    FooterDisclaimer,
}

impl ScalarField {
    pub fn column(self) -> Column {
        match self {
            ScalarField::CompanyName => Column::CompanyName,
            ScalarField::EmployerLogo => Column::EmployerLogo,
            ScalarField::HeroImage => Column::HeroImage,
            ScalarField::EnrollmentStart => Column::EnrollmentStartDate,
            ScalarField::EnrollmentEnd => Column::EnrollmentEndDate,
            ScalarField::PrimaryColor => Column::PrimaryColor,
            ScalarField::Button1Text => Column::Button1Text,
            ScalarField::Button1Url => Column::Button1Url,
            ScalarField::Button2Text => Column::Button2Text,
            ScalarField::Button2Url => Column::Button2Url,
            ScalarField::FooterContent => Column::FooterContent,
            ScalarField::FooterDisclaimer => Column::FooterDisclaimer,
        }
    }

    fn from_column(column: Column) -> Option<Self> {
        Some(match column {
            Column::CompanyName => ScalarField::CompanyName,
            Column::EmployerLogo => ScalarField::EmployerLogo,
            Column::HeroImage => ScalarField::HeroImage,
            Column::EnrollmentStartDate => ScalarField::EnrollmentStart,
            Column::EnrollmentEndDate => ScalarField::EnrollmentEnd,
            Column::PrimaryColor => ScalarField::PrimaryColor,
            Column::Button1Text => ScalarField::Button1Text,
            Column::Button1Url => ScalarField::Button1Url,
            Column::Button2Text => ScalarField::Button2Text,
            Column::Button2Url => ScalarField::Button2Url,
            Column::FooterContent => ScalarField::FooterContent,
            Column::FooterDisclaimer => ScalarField::FooterDisclaimer,
            Column::Tile(..) => return None,
        })
    }
}

impl FromStr for ScalarField {
    type Err = EditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Column::parse(s)
            .and_then(ScalarField::from_column)
            .ok_or_else(|| EditError::UnknownField(s.to_string()))
    }
}

/// The two header image slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSlot {
    EmployerLogo,
    HeroImage,
}

/// Partial update for one tile. `None` leaves a field as it is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TilePatch {
    /// `Some(None)` clears the image.
    pub image: Option<Option<ImageRef>>,
    pub headline: Option<String>,
    pub description: Option<String>,
    pub link: Option<String>,
}

impl TilePatch {
    pub fn headline(mut self, value: impl Into<String>) -> Self {
        self.headline = Some(value.into());
        self
    }

    pub fn description(mut self, value: impl Into<String>) -> Self {
        self.description = Some(value.into());
        self
    }

    pub fn link(mut self, value: impl Into<String>) -> Self {
        self.link = Some(value.into());
        self
    }

    pub fn image(mut self, value: Option<ImageRef>) -> Self {
        self.image = Some(value);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    fn apply(self, tile: &mut Tile) {
        if let Some(image) = self.image {
            tile.image = image;
        }
        if let Some(headline) = self.headline {
            tile.headline = headline;
        }
        if let Some(description) = self.description {
            tile.description = description;
        }
        if let Some(link) = self.link {
            tile.link = link;
        }
    }
}

// =============================================================================
// Record operations
// =============================================================================

impl ContentRecord {
    pub fn with_company_name(&self, name: impl Into<String>) -> Self {
        self.with_field(ScalarField::CompanyName, name)
    }

    /// Set a field from text. For the image slots, text is a URL and an empty
    /// value clears the slot.
    pub fn with_field(&self, field: ScalarField, value: impl Into<String>) -> Self {
        let value = value.into();
        let mut next = self.clone();
        match field {
            ScalarField::CompanyName => next.company_name = value,
            ScalarField::EmployerLogo => {
                next.employer_logo = (!value.is_empty()).then(|| ImageRef::url(value));
            }
            ScalarField::HeroImage => {
                next.hero_image = (!value.is_empty()).then(|| ImageRef::url(value));
            }
            ScalarField::EnrollmentStart => next.enrollment_start = value,
            ScalarField::EnrollmentEnd => next.enrollment_end = value,
            ScalarField::PrimaryColor => next.primary_color = value,
            ScalarField::Button1Text => next.cta1.text = value,
            ScalarField::Button1Url => next.cta1.url = value,
            ScalarField::Button2Text => next.cta2.text = value,
            ScalarField::Button2Url => next.cta2.url = value,
            ScalarField::FooterContent => next.footer_content = value,
            ScalarField::FooterDisclaimer => next.footer_disclaimer = value,
        }
        next
    }

    /// Put an uploaded or linked image into a header slot.
    pub fn with_image(&self, slot: ImageSlot, image: Option<ImageRef>) -> Self {
        let mut next = self.clone();
        match slot {
            ImageSlot::EmployerLogo => next.employer_logo = image,
            ImageSlot::HeroImage => next.hero_image = image,
        }
        next
    }

    /// Append a tile. Its id must not already be in use.
    pub fn add_tile(&self, tile: Tile) -> Result<Self, EditError> {
        if self.tile(&tile.id).is_some() {
            return Err(EditError::DuplicateTileId(tile.id));
        }
        let mut next = self.clone();
        next.tiles.push(tile);
        Ok(next)
    }

    /// Patch a tile. If a hand-edited record repeats an id, the first tile
    /// with that id is the one changed.
    pub fn update_tile(&self, id: &TileId, patch: TilePatch) -> Result<Self, EditError> {
        let idx = self.tile_position(id)?;
        let mut next = self.clone();
        patch.apply(&mut next.tiles[idx]);
        Ok(next)
    }

    /// Remove a tile, the first one with `id` when ids repeat.
    pub fn remove_tile(&self, id: &TileId) -> Result<Self, EditError> {
        let idx = self.tile_position(id)?;
        let mut next = self.clone();
        next.tiles.remove(idx);
        Ok(next)
    }

    fn tile_position(&self, id: &TileId) -> Result<usize, EditError> {
        self.tiles
            .iter()
            .position(|t| &t.id == id)
            .ok_or_else(|| EditError::UnknownTile(id.clone()))
    }
}

// =============================================================================
// Editing session
// =============================================================================

/// The record being edited, with undo/redo history.
#[derive(Debug, Clone)]
pub struct Editor {
    current: ContentRecord,
    undo: Vec<ContentRecord>,
    redo: Vec<ContentRecord>,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(ContentRecord::template())
    }
}

impl Editor {
    pub fn new(record: ContentRecord) -> Self {
        Self {
            current: record,
            undo: Vec::new(),
            redo: Vec::new(),
        }
    }

    pub fn record(&self) -> &ContentRecord {
        &self.current
    }

    pub fn into_record(self) -> ContentRecord {
        self.current
    }

    /// Swap in a whole new record, e.g. after a successful upload.
    pub fn replace(&mut self, record: ContentRecord) {
        self.commit(record);
    }

    pub fn set_field(&mut self, field: ScalarField, value: impl Into<String>) {
        let next = self.current.with_field(field, value);
        self.commit(next);
    }

    pub fn set_image(&mut self, slot: ImageSlot, image: Option<ImageRef>) {
        let next = self.current.with_image(slot, image);
        self.commit(next);
    }

    /// Append an empty tile and return its id.
    pub fn add_tile(&mut self) -> Result<TileId, EditError> {
        let tile = Tile::blank();
        let id = tile.id.clone();
        let next = self.current.add_tile(tile)?;
        self.commit(next);
        Ok(id)
    }

    pub fn update_tile(&mut self, id: &TileId, patch: TilePatch) -> Result<(), EditError> {
        let next = self.current.update_tile(id, patch)?;
        self.commit(next);
        Ok(())
    }

    pub fn remove_tile(&mut self, id: &TileId) -> Result<(), EditError> {
        let next = self.current.remove_tile(id)?;
        self.commit(next);
        Ok(())
    }

    /// Step back one edit. Returns false when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        match self.undo.pop() {
            Some(previous) => {
                self.redo.push(std::mem::replace(&mut self.current, previous));
                true
            }
            None => false,
        }
    }

    /// Re-apply an undone edit. Returns false when there is nothing to redo.
    pub fn redo(&mut self) -> bool {
        match self.redo.pop() {
            Some(next) => {
                self.undo.push(std::mem::replace(&mut self.current, next));
                true
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// What the form currently shows as broken.
    pub fn violations(&self) -> Vec<Violation> {
        validate(&self.current, Gate::Editor)
    }

    /// Whether the publish button is enabled.
    pub fn can_publish(&self) -> bool {
        validate(&self.current, Gate::Publish).is_empty()
    }

    fn commit(&mut self, next: ContentRecord) {
        if next == self.current {
            return;
        }
        self.undo.push(std::mem::replace(&mut self.current, next));
        if self.undo.len() > HISTORY_LIMIT {
            self.undo.remove(0);
        }
        self.redo.clear();
    }
}
