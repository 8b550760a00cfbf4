//! Rendering: [`ContentRecord`] → [`Presentation`].
//!
//! The presentation model is everything the page shows, already decided:
//! which buttons exist, which image URL each slot uses, the formatted date
//! range. Turning it into HTML is [`crate::html`]'s job and involves no more
//! choices.
//!
//! Rendering never fails. Every field of the record is optional from here and
//! has a fallback:
//!
//! | Field | Absent → |
//! |-------|----------|
//! | company name | `"ABC Company"` |
//! | either enrollment date | `"Open Enrollment Period"` |
//! | employer logo, hero image, tile image | a placeholder from the library |
//! | button text or URL | button not shown |
//! | tile link | no "Learn more" |
//! | footer content | footer text block not shown (the colored block stays) |
//!
//! ## Placeholders
//!
//! Placeholder images are picked through a [`PlaceholderChooser`] on every
//! render, so two renders of the same record may show different placeholders.
//! Slots are resolved in page order: employer logo, hero, then tiles.
//!
//! ## Uploaded images
//!
//! An [`ImageRef::Transient`] has no URL yet. A [`LocatorResolver`] hands out a
//! locator that is only valid for the current render session; what it points
//! at (an in-memory preview, a file written next to the page) is up to the
//! resolver.

use crate::config::BrandConfig;
use crate::types::{ContentRecord, Cta, ImageRef, Tile, TransientImage};
use chrono::NaiveDate;
use rand::Rng;
use serde::Serialize;

/// Date line shown when the enrollment window is not set.
pub const OPEN_ENROLLMENT: &str = "Open Enrollment Period";
/// Used only if the placeholder library is somehow empty.
const LAST_RESORT_PLACEHOLDER: &str = "/placeholder.svg";

/// Which page is being produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    /// The published site: the end date carries the year.
    #[default]
    Site,
    /// The editor's live preview: compact dates.
    Preview,
}

/// Picks which placeholder fills an empty image slot.
pub trait PlaceholderChooser {
    /// Return an index in `0..len`. Called only with `len > 0`.
    fn choose(&mut self, len: usize) -> usize;
}

/// Uniform choice from the thread-local RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomChooser;

impl PlaceholderChooser for RandomChooser {
    fn choose(&mut self, len: usize) -> usize {
        rand::rng().random_range(0..len)
    }
}

/// Hands out display locators for images that only exist in memory.
pub trait LocatorResolver {
    fn locate(&mut self, image: &TransientImage) -> String;
}

/// Locators valid for one render session: `session:{id}/{n}/{file_name}`.
///
/// Nothing is stored; the host that displays the page maps locators back to
/// the uploaded bytes and drops them when the session ends.
#[derive(Debug, Clone)]
pub struct SessionLocators {
    session: String,
    issued: usize,
}

impl SessionLocators {
    pub fn new() -> Self {
        Self {
            session: ulid::Ulid::new().to_string().to_lowercase(),
            issued: 0,
        }
    }

    pub fn issued(&self) -> usize {
        self.issued
    }
}

impl Default for SessionLocators {
    fn default() -> Self {
        Self::new()
    }
}

impl LocatorResolver for SessionLocators {
    fn locate(&mut self, image: &TransientImage) -> String {
        self.issued += 1;
        format!("session:{}/{}/{}", self.session, self.issued, image.file_name)
    }
}

/// Everything rendering needs besides the record.
pub struct RenderContext<'a> {
    pub variant: Variant,
    pub brand: &'a BrandConfig,
    pub placeholders: &'a [String],
    /// Year printed in the footer copyright line.
    pub year: i32,
    pub chooser: &'a mut dyn PlaceholderChooser,
    pub locators: &'a mut dyn LocatorResolver,
}

impl RenderContext<'_> {
    fn resolve_image(&mut self, image: Option<&ImageRef>) -> ImageSource {
        match image.filter(|i| !i.is_blank()) {
            Some(ImageRef::Persisted(url)) => ImageSource {
                src: url.clone(),
                placeholder: false,
            },
            Some(ImageRef::Transient(upload)) => ImageSource {
                src: self.locators.locate(upload),
                placeholder: false,
            },
            None => ImageSource {
                src: self.placeholder(),
                placeholder: true,
            },
        }
    }

    fn placeholder(&mut self) -> String {
        if self.placeholders.is_empty() {
            return LAST_RESORT_PLACEHOLDER.to_string();
        }
        let idx = self.chooser.choose(self.placeholders.len());
        self.placeholders
            .get(idx)
            .or_else(|| self.placeholders.first())
            .cloned()
            .unwrap_or_else(|| LAST_RESORT_PLACEHOLDER.to_string())
    }
}

/// A resolved image slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageSource {
    pub src: String,
    /// True when the slot was empty and a placeholder was substituted.
    pub placeholder: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonStyle {
    /// Filled with the primary color.
    Solid,
    /// Primary-colored outline and label.
    Outline,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Button {
    pub style: ButtonStyle,
    pub text: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Header {
    pub brand_name: String,
    pub brand_logo: String,
    pub employer_logo: ImageSource,
    pub hero: ImageSource,
    pub heading: String,
    pub date_range: String,
    pub tagline: String,
    pub buttons: Vec<Button>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TileCard {
    pub id: String,
    pub image: ImageSource,
    pub headline: String,
    pub description: String,
    /// `None` hides the "Learn more" affordance.
    pub link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FooterText {
    pub disclaimer: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Footer {
    /// Always the record's primary color, even when there is no text.
    pub background: String,
    pub text: Option<FooterText>,
    pub copyright: String,
}

/// The decided page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Presentation {
    pub variant: Variant,
    pub title: String,
    /// Primary color for buttons and links.
    pub accent: String,
    pub header: Header,
    pub tiles: Vec<TileCard>,
    pub footer: Footer,
}

/// Project a record onto the page.
pub fn render(record: &ContentRecord, ctx: &mut RenderContext<'_>) -> Presentation {
    let company = record.display_company_name();

    let employer_logo = ctx.resolve_image(record.employer_logo.as_ref());
    let hero = ctx.resolve_image(record.hero_image.as_ref());

    let buttons = [
        (ButtonStyle::Solid, &record.cta1),
        (ButtonStyle::Outline, &record.cta2),
    ]
    .into_iter()
    .filter(|(_, cta)| cta.is_shown())
    .map(|(style, cta)| button(style, cta))
    .collect();

    let tiles: Vec<TileCard> = record
        .tiles
        .iter()
        .map(|tile| tile_card(tile, ctx))
        .collect();

    let footer = Footer {
        background: record.primary_color.clone(),
        text: (!record.footer_content.is_empty()).then(|| FooterText {
            disclaimer: record.footer_disclaimer.clone(),
            content: record.footer_content.clone(),
        }),
        copyright: format!("© {} {}", ctx.year, ctx.brand.name),
    };

    tracing::debug!(
        tiles = tiles.len(),
        variant = ?ctx.variant,
        "rendered presentation"
    );

    Presentation {
        variant: ctx.variant,
        title: format!("{company} Benefits Enrollment"),
        accent: record.primary_color.clone(),
        header: Header {
            brand_name: ctx.brand.name.clone(),
            brand_logo: ctx.brand.logo.clone(),
            employer_logo,
            hero,
            heading: ctx.brand.heading.clone(),
            date_range: format_enrollment_period(
                &record.enrollment_start,
                &record.enrollment_end,
                ctx.variant,
            ),
            tagline: format!("Your benefits provided by {company} from {}", ctx.brand.name),
            buttons,
        },
        tiles,
        footer,
    }
}

fn button(style: ButtonStyle, cta: &Cta) -> Button {
    Button {
        style,
        text: cta.text.clone(),
        url: cta.url.clone(),
    }
}

fn tile_card(tile: &Tile, ctx: &mut RenderContext<'_>) -> TileCard {
    TileCard {
        id: tile.id.to_string(),
        image: ctx.resolve_image(tile.image.as_ref()),
        headline: tile.headline.clone(),
        description: tile.description.clone(),
        link: (!tile.link.is_empty()).then(|| tile.link.clone()),
    }
}

/// Format the enrollment window for display.
///
/// ```text
/// Site:    September 1 – September 30, 2025
/// Preview: September 1 – September 30
/// ```
///
/// Either date empty gives [`OPEN_ENROLLMENT`]. A date that isn't a real
/// calendar date is shown as written. Reversed ranges are shown as given.
pub fn format_enrollment_period(start: &str, end: &str, variant: Variant) -> String {
    if start.is_empty() || end.is_empty() {
        return OPEN_ENROLLMENT.to_string();
    }
    let end_format = match variant {
        Variant::Site => "%B %-d, %Y",
        Variant::Preview => "%B %-d",
    };
    format!(
        "{} – {}",
        format_date(start, "%B %-d"),
        format_date(end, end_format)
    )
}

fn format_date(raw: &str, format: &str) -> String {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(|d| d.format(format).to_string())
        .unwrap_or_else(|_| raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columns::{Column, TileField};
    use crate::extract::extract;
    use crate::test_helpers::*;
    use crate::types::TileId;

    #[test]
    fn site_date_range_includes_year() {
        assert_eq!(
            format_enrollment_period("2025-09-01", "2025-09-30", Variant::Site),
            "September 1 – September 30, 2025"
        );
    }

    #[test]
    fn preview_date_range_is_compact() {
        assert_eq!(
            format_enrollment_period("2025-09-01", "2025-09-30", Variant::Preview),
            "September 1 – September 30"
        );
    }

    #[test]
    fn missing_date_gives_open_enrollment() {
        assert_eq!(
            format_enrollment_period("2025-09-01", "", Variant::Site),
            OPEN_ENROLLMENT
        );
        assert_eq!(format_enrollment_period("", "", Variant::Preview), OPEN_ENROLLMENT);
    }

    #[test]
    fn reversed_and_malformed_dates_render_as_given() {
        assert_eq!(
            format_enrollment_period("2025-10-05", "2025-10-01", Variant::Site),
            "October 5 – October 1, 2025"
        );
        assert_eq!(
            format_enrollment_period("soon", "2025-12-31", Variant::Site),
            "soon – December 31, 2025"
        );
    }

    #[test]
    fn imageless_tile_gets_a_library_placeholder() {
        let mut record = valid_record();
        record.tiles[1].image = None;
        let page = render_site(&record);
        let image = &page.tiles[1].image;
        assert!(image.placeholder);
        assert!(!image.src.is_empty());
        assert!(placeholder_library().contains(&image.src));
    }

    #[test]
    fn random_chooser_stays_in_library() {
        let brand = BrandConfig::default();
        let library = placeholder_library();
        let mut chooser = RandomChooser;
        let mut locators = SessionLocators::new();
        let record = ContentRecord::default();
        for _ in 0..50 {
            let mut ctx = RenderContext {
                variant: Variant::Site,
                brand: &brand,
                placeholders: &library,
                year: 2025,
                chooser: &mut chooser,
                locators: &mut locators,
            };
            let page = render(&record, &mut ctx);
            assert!(library.contains(&page.header.hero.src));
            assert!(library.contains(&page.header.employer_logo.src));
        }
    }

    #[test]
    fn placeholders_are_chosen_in_page_order() {
        let record = ContentRecord {
            tiles: vec![Tile::new("a", "b", "c"), Tile::new("d", "e", "f")],
            ..Default::default()
        };
        let page = render_site(&record);
        let library = placeholder_library();
        assert_eq!(page.header.employer_logo.src, library[0]);
        assert_eq!(page.header.hero.src, library[1]);
        assert_eq!(page.tiles[0].image.src, library[2]);
        assert_eq!(page.tiles[1].image.src, library[3]);
    }

    #[test]
    fn empty_library_still_yields_a_locator() {
        let brand = BrandConfig::default();
        let mut chooser = SequenceChooser::default();
        let mut locators = SessionLocators::new();
        let mut ctx = RenderContext {
            variant: Variant::Site,
            brand: &brand,
            placeholders: &[],
            year: 2025,
            chooser: &mut chooser,
            locators: &mut locators,
        };
        let page = render(&ContentRecord::default(), &mut ctx);
        assert_eq!(page.header.hero.src, "/placeholder.svg");
    }

    #[test]
    fn persisted_images_resolve_to_their_url() {
        let record = valid_record();
        let page = render_site(&record);
        assert_eq!(page.header.hero.src, "/placeholder.svg?height=400&width=600");
        assert!(!page.header.hero.placeholder);
    }

    #[test]
    fn transient_images_get_session_locators() {
        let mut record = valid_record();
        record.employer_logo = Some(ImageRef::Transient(TransientImage::new(
            "acme.png",
            vec![1, 2, 3],
        )));
        let page = render_site(&record);
        let src = &page.header.employer_logo.src;
        assert!(src.starts_with("session:"), "{src}");
        assert!(src.ends_with("/1/acme.png"), "{src}");
    }

    #[test]
    fn upload_without_bytes_falls_back_to_placeholder() {
        let mut record = valid_record();
        record.hero_image = Some(ImageRef::Transient(TransientImage::new("hero.png", vec![])));
        let page = render_site(&record);
        assert!(page.header.hero.placeholder);
        assert!(placeholder_library().contains(&page.header.hero.src));
    }

    #[test]
    fn extracted_row_renders_one_card_per_complete_tile() {
        let row = full_row(5).with(Column::Tile(3, TileField::Link), "");
        let record = extract(&[row]).unwrap();
        let page = render_site(&record);
        assert_eq!(page.tiles.len(), 4);
        let headlines: Vec<_> = page.tiles.iter().map(|t| t.headline.as_str()).collect();
        assert_eq!(headlines, ["Benefit 1", "Benefit 2", "Benefit 4", "Benefit 5"]);
        assert!(page.tiles.iter().all(|t| t.link.is_some()));
        assert_eq!(page.title, "ABC Manufacturing Corp Benefits Enrollment");
    }

    #[test]
    fn buttons_are_independent() {
        let mut record = valid_record();
        record.cta1.url.clear();
        let page = render_site(&record);
        assert_eq!(page.header.buttons.len(), 1);
        assert_eq!(page.header.buttons[0].style, ButtonStyle::Outline);
        assert_eq!(page.header.buttons[0].text, "Learn More");

        let mut record = valid_record();
        record.cta2.text.clear();
        let page = render_site(&record);
        assert_eq!(page.header.buttons.len(), 1);
        assert_eq!(page.header.buttons[0].style, ButtonStyle::Solid);
    }

    #[test]
    fn tiles_keep_order_and_hide_empty_links() {
        let mut record = valid_record();
        record.tiles.push(Tile {
            id: TileId::from("no-link"),
            ..Tile::new("Last", "No link here", "")
        });
        let page = render_site(&record);
        let headlines: Vec<_> = page.tiles.iter().map(|t| t.headline.as_str()).collect();
        let expected: Vec<_> = record.tiles.iter().map(|t| t.headline.as_str()).collect();
        assert_eq!(headlines, expected);
        assert!(page.tiles[0].link.is_some());
        assert_eq!(page.tiles[3].link, None);
        assert_eq!(page.tiles[3].id, "no-link");
    }

    #[test]
    fn footer_text_needs_content_but_color_always_applies() {
        let mut record = valid_record();
        record.footer_content.clear();
        let page = render_site(&record);
        assert_eq!(page.footer.text, None);
        assert_eq!(page.footer.background, "#7b1d3c");

        let page = render_site(&valid_record());
        let text = page.footer.text.unwrap();
        assert!(text.content.starts_with("Questions?"));
        assert!(text.disclaimer.starts_with("The Hartford"));
    }

    #[test]
    fn header_copy_uses_company_and_brand() {
        let page = render_variant(&ContentRecord::default(), Variant::Preview);
        assert_eq!(
            page.header.tagline,
            "Your benefits provided by ABC Company from The Hartford"
        );
        assert_eq!(page.header.date_range, OPEN_ENROLLMENT);
        assert_eq!(page.footer.copyright, "© 2025 The Hartford");
        assert!(page.header.buttons.is_empty());
        assert!(page.tiles.is_empty());
    }
}
