//! The content model shared by every stage.
//!
//! A [`ContentRecord`] describes one microsite. It is produced by the extractor
//! or from [`ContentRecord::template`], changed through the typed operations in
//! [`crate::editor`], and only ever borrowed by validation and rendering.
//!
//! Records serialize to JSON with camelCase keys so a record file can be edited
//! by hand:
//!
//! ```json
//! {
//!   "companyName": "ABC Manufacturing Corp",
//!   "heroImage": { "persisted": "https://cdn.example.com/hero.jpg" },
//!   "enrollmentStart": "2025-09-01",
//!   "enrollmentEnd": "2025-09-30",
//!   "primaryColor": "#7b1d3c",
//!   "cta1": { "text": "Enroll Now", "url": "https://example.com/enroll" },
//!   "tiles": [ { "id": "01J…", "headline": "…", "description": "…", "link": "…" } ]
//! }
//! ```
//!
//! Missing keys deserialize to empty values; the record is never rejected for
//! being incomplete. That judgement belongs to [`crate::validate`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Shown when no company name was provided.
pub const DEFAULT_COMPANY_NAME: &str = "ABC Company";
/// Brand color used when the sheet has none.
pub const DEFAULT_PRIMARY_COLOR: &str = "#7b1d3c";

/// Unique identifier of a tile within a record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TileId(String);

impl TileId {
    /// A fresh ULID-backed id. Two calls in the same millisecond still differ.
    pub fn generate() -> Self {
        Self(ulid::Ulid::new().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TileId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An uploaded image that has not been persisted anywhere yet.
///
/// The bytes live only for the editing session and are not serialized;
/// a record file carries the file name alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransientImage {
    pub file_name: String,
    #[serde(skip)]
    pub bytes: Arc<Vec<u8>>,
}

impl TransientImage {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: Arc::new(bytes),
        }
    }

    /// Read an image from disk as an upload.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self::new(file_name, bytes))
    }

    /// Lowercased file extension, if any.
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.file_name)
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
    }
}

/// Where an image comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageRef {
    /// Uploaded in this session, only available in memory.
    Transient(TransientImage),
    /// A URL or site-relative path.
    Persisted(String),
}

impl ImageRef {
    pub fn url(url: impl Into<String>) -> Self {
        ImageRef::Persisted(url.into())
    }

    /// Carries no image: a persisted reference with an empty URL, or an
    /// upload whose bytes are gone (e.g. after a JSON round-trip).
    pub fn is_blank(&self) -> bool {
        match self {
            ImageRef::Persisted(url) => url.is_empty(),
            ImageRef::Transient(upload) => upload.bytes.is_empty(),
        }
    }
}

/// `Some` non-blank image reference.
pub fn has_image(image: Option<&ImageRef>) -> bool {
    image.is_some_and(|i| !i.is_blank())
}

/// A call-to-action button slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Cta {
    pub text: String,
    pub url: String,
}

impl Cta {
    pub fn new(text: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            url: url.into(),
        }
    }

    /// Buttons only appear when they have both a label and a target.
    pub fn is_shown(&self) -> bool {
        !self.text.is_empty() && !self.url.is_empty()
    }
}

/// One content card in the tile grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    #[serde(default = "TileId::generate")]
    pub id: TileId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageRef>,
    #[serde(default)]
    pub headline: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub link: String,
}

impl Tile {
    /// An empty tile with a fresh id, as created by "Add Tile".
    pub fn blank() -> Self {
        Self {
            id: TileId::generate(),
            image: None,
            headline: String::new(),
            description: String::new(),
            link: String::new(),
        }
    }

    pub fn new(
        headline: impl Into<String>,
        description: impl Into<String>,
        link: impl Into<String>,
    ) -> Self {
        Self {
            headline: headline.into(),
            description: description.into(),
            link: link.into(),
            ..Self::blank()
        }
    }

    pub fn with_image(mut self, image: ImageRef) -> Self {
        self.image = Some(image);
        self
    }

    /// Headline, description and link are all filled in.
    pub fn is_complete(&self) -> bool {
        !self.headline.is_empty() && !self.description.is_empty() && !self.link.is_empty()
    }
}

/// The canonical content of one microsite.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ContentRecord {
    pub company_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employer_logo: Option<ImageRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hero_image: Option<ImageRef>,
    /// `YYYY-MM-DD`.
    pub enrollment_start: String,
    /// `YYYY-MM-DD`.
    pub enrollment_end: String,
    pub primary_color: String,
    pub cta1: Cta,
    pub cta2: Cta,
    pub footer_content: String,
    pub footer_disclaimer: String,
    pub tiles: Vec<Tile>,
}

impl ContentRecord {
    /// The editor's starting content: a complete, publishable demo site.
    pub fn template() -> Self {
        Self {
            company_name: DEFAULT_COMPANY_NAME.to_string(),
            employer_logo: Some(ImageRef::url("/placeholder.svg?height=30&width=120")),
            hero_image: Some(ImageRef::url("/placeholder.svg?height=400&width=600")),
            enrollment_start: "2025-09-01".to_string(),
            enrollment_end: "2025-09-30".to_string(),
            primary_color: DEFAULT_PRIMARY_COLOR.to_string(),
            cta1: Cta::new("Enroll Now", "https://example.com/enroll"),
            cta2: Cta::new("Learn More", "https://example.com/learn"),
            footer_content: "Questions? Contact HR at hr@company.com or call 1-800-555-0123"
                .to_string(),
            footer_disclaimer: "The Hartford® is The Hartford Financial Services Group, Inc. and \
                its subsidiaries, including underwriting companies Hartford Life and Accident \
                Insurance Company and Hartford Fire Insurance Company. Home Office is Hartford, \
                CT. © 2025 The Hartford"
                .to_string(),
            tiles: vec![
                Tile::new(
                    "Experience MyTomorrow!",
                    "Click here to learn more about the products being offered and assistance \
                     in choosing the best option for you.",
                    "https://example.com/mytomorrow",
                )
                .with_image(ImageRef::url("/placeholder.svg?height=200&width=300")),
                Tile::new(
                    "Enroll in your benefits now!",
                    "Click here to be directed to your enrollment platform to enroll in your \
                     benefits.",
                    "https://example.com/enroll",
                )
                .with_image(ImageRef::url("/placeholder.svg?height=30&width=120")),
                Tile::new(
                    "Short-term Income Protection Benefit Highlight Sheets",
                    "Learn more about your Short-term Income Protection Benefits plan details.",
                    "https://example.com/short-term",
                )
                .with_image(ImageRef::url("/placeholder.svg?height=30&width=120")),
            ],
        }
    }

    /// Company name for display, falling back to [`DEFAULT_COMPANY_NAME`].
    pub fn display_company_name(&self) -> &str {
        if self.company_name.is_empty() {
            DEFAULT_COMPANY_NAME
        } else {
            &self.company_name
        }
    }

    pub fn tile(&self, id: &TileId) -> Option<&Tile> {
        self.tiles.iter().find(|t| &t.id == id)
    }
}
