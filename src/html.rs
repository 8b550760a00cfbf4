//! HTML output.
//!
//! Turns a [`Presentation`] into a single static page. Every choice has
//! already been made by [`crate::render`]; this module only lays it out.
//!
//! ## Output Structure
//!
//! ```text
//! dist/
//! ├── index.html                 # Published site (preview.html for previews)
//! └── media/
//!     ├── 3f1c…9a.png            # Uploaded images, named by content hash
//!     └── …
//! ```
//!
//! ## Uploaded images
//!
//! [`MediaCollector`] is the [`LocatorResolver`] used when building to disk:
//! each uploaded image gets a `media/<sha256>.<ext>` path and its bytes are
//! kept until [`write_site`] writes them next to the page. The same bytes
//! uploaded twice land in one file.
//!
//! ## CSS
//!
//! `static/style.css` is embedded at compile time. The record's primary color
//! is passed in as the `--accent` custom property on `<body>`.
//!
//! ## HTML Generation
//!
//! Uses [maud](https://maud.lambda.xyz/) for compile-time HTML templating.
//! Templates are type-safe Rust code with automatic XSS escaping.

use crate::render::{
    Button, ButtonStyle, Footer, Header, LocatorResolver, Presentation, TileCard, Variant,
};
use crate::types::{DEFAULT_PRIMARY_COLOR, TransientImage};
use crate::validate::is_hex_color;
use maud::{DOCTYPE, Markup, PreEscaped, html};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HtmlError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

const CSS: &str = include_str!("../static/style.css");

/// Directory, relative to the page, that uploaded images are written to.
pub const MEDIA_DIR: &str = "media";

/// Collects uploaded images while rendering and assigns them stable paths.
#[derive(Debug, Default)]
pub struct MediaCollector {
    files: BTreeMap<String, Arc<Vec<u8>>>,
}

impl MediaCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Relative paths of collected files, sorted.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl LocatorResolver for MediaCollector {
    fn locate(&mut self, image: &TransientImage) -> String {
        let hash = format!("{:x}", Sha256::digest(image.bytes.as_slice()));
        let path = match image.extension() {
            Some(ext) => format!("{MEDIA_DIR}/{hash}.{ext}"),
            None => format!("{MEDIA_DIR}/{hash}"),
        };
        self.files
            .entry(path.clone())
            .or_insert_with(|| Arc::clone(&image.bytes));
        path
    }
}

/// File name of the page for a variant.
pub fn page_file_name(variant: Variant) -> &'static str {
    match variant {
        Variant::Site => "index.html",
        Variant::Preview => "preview.html",
    }
}

/// Write the page and its collected media into `output_dir`.
///
/// Returns the path of the written page.
pub fn write_site(
    page: &Presentation,
    media: &MediaCollector,
    output_dir: &Path,
) -> Result<PathBuf, HtmlError> {
    fs::create_dir_all(output_dir)?;

    for (rel, bytes) in &media.files {
        let dest = output_dir.join(rel);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&dest, bytes.as_slice())?;
        tracing::debug!(path = %dest.display(), "wrote media file");
    }

    let page_path = output_dir.join(page_file_name(page.variant));
    fs::write(&page_path, render_page(page).into_string())?;
    tracing::info!(
        path = %page_path.display(),
        media = media.len(),
        "wrote page"
    );
    Ok(page_path)
}

// ============================================================================
// HTML Components
// ============================================================================

/// Renders the base HTML document structure
fn base_document(title: &str, accent: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { (PreEscaped(CSS)) }
            }
            body style={ "--accent: " (accent) ";" } {
                (content)
            }
        }
    }
}

/// The accent color to inject, or the stock color if the value isn't `#RRGGBB`.
fn safe_accent(accent: &str) -> &str {
    if is_hex_color(accent) {
        accent
    } else {
        DEFAULT_PRIMARY_COLOR
    }
}

fn button(b: &Button) -> Markup {
    let class = match b.style {
        ButtonStyle::Solid => "button solid",
        ButtonStyle::Outline => "button outline",
    };
    html! {
        a class=(class) href=(b.url) target="_blank" rel="noopener noreferrer" { (b.text) }
    }
}

fn site_header(header: &Header) -> Markup {
    html! {
        header.site-header {
            div.logos {
                img src=(header.brand_logo) alt=(header.brand_name);
                img src=(header.employer_logo.src) alt="Employer logo";
            }
            div.hero {
                div.hero-text {
                    h1 { (header.heading) }
                    p.date-range { (header.date_range) }
                    p.tagline { (header.tagline) }
                    @if !header.buttons.is_empty() {
                        div.buttons {
                            @for b in &header.buttons {
                                (button(b))
                            }
                        }
                    }
                }
                img.hero-image src=(header.hero.src) alt="";
            }
        }
    }
}

fn tile_card(tile: &TileCard) -> Markup {
    html! {
        article.tile data-tile-id=(tile.id) {
            img src=(tile.image.src) alt="" loading="lazy";
            div.tile-body {
                h3 { (tile.headline) }
                p { (tile.description) }
                @if let Some(link) = &tile.link {
                    a.learn-more href=(link) target="_blank" rel="noopener noreferrer" {
                        "Learn more"
                    }
                }
            }
        }
    }
}

fn site_footer(footer: &Footer) -> Markup {
    html! {
        footer.site-footer
            style={ "background-color: " (safe_accent(&footer.background)) ";" } {
            div.inner {
                @if let Some(text) = &footer.text {
                    p.disclaimer { (text.disclaimer) }
                    p.footer-content { (text.content) }
                }
                p.copyright { (footer.copyright) }
            }
        }
    }
}

// ============================================================================
// Page Renderer
// ============================================================================

/// Renders the whole microsite page.
pub fn render_page(page: &Presentation) -> Markup {
    let content = html! {
        @if page.variant == Variant::Preview {
            div.preview-banner { "Preview" }
        }
        (site_header(&page.header))
        main {
            section.tiles {
                @for tile in &page.tiles {
                    (tile_card(tile))
                }
            }
        }
        (site_footer(&page.footer))
    };

    base_document(&page.title, safe_accent(&page.accent), content)
}

// ============================================================================
// Tests
// ============================================================================
