//! # Microsite
//!
//! Builds benefits-enrollment microsites for employers. The employer's data
//! sheet (one row, fixed column names) becomes a [`types::ContentRecord`], the
//! record is checked for completeness, and a page is rendered from it with a
//! placeholder in every empty image slot.
//!
//! # Architecture: Three Pure Stages
//!
//! ```text
//! 1. Extract   sheet row  →  ContentRecord     (missing fields get defaults)
//! 2. Validate  record     →  Vec<Violation>    (everything broken, at once)
//! 3. Render    record     →  Presentation      (never fails; HTML via maud)
//! ```
//!
//! Extraction, validation and rendering are synchronous functions that borrow
//! the record and return fresh values. Only upload and publish take time; they
//! run on a cancellable [`task::DelayedTask`] so a newer attempt supersedes an
//! older one.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`columns`] | Sheet column names and the decoded [`columns::TabularRow`] |
//! | [`types`] | The content model shared by every stage |
//! | [`extract`] | Stage 1: row decoding and record extraction |
//! | [`validate`] | Stage 2: completeness and format rules, publish and editor gates |
//! | [`render`] | Stage 3: the presentation model and placeholder resolution |
//! | [`html`] | Presentation → standalone HTML page plus uploaded media |
//! | [`editor`] | Typed edit operations and an undo/redo editing session |
//! | [`task`] | Cancellable delayed work |
//! | [`upload`] | Upload state machine with the file suffix gate |
//! | [`publish`] | Publish state machine and URL slugs |
//! | [`config`] | `microsite.toml` loading, validation and merging |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Closed Column Set
//!
//! Sheet headers are parsed into a closed [`columns::Column`] enum when the row
//! is decoded. Unknown headers are kept aside rather than carried around as
//! string keys, so a typo in a column name shows up as an ignored column and
//! not as a silently empty field.
//!
//! ## Violations Are Data
//!
//! Validation never fails. It returns every broken rule so the editor can show
//! them all at once; each rule is checked independently, so a missing field
//! never hides an unrelated format problem.
//!
//! ## Placeholders Behind a Trait
//!
//! Empty image slots are filled from a configured library through
//! [`render::PlaceholderChooser`]. The CLI picks at random; tests plug in a
//! deterministic chooser.

pub mod columns;
pub mod config;
pub mod editor;
pub mod extract;
pub mod html;
pub mod output;
pub mod publish;
pub mod render;
pub mod task;
pub mod types;
pub mod upload;
pub mod validate;

#[cfg(test)]
pub(crate) mod test_helpers;
