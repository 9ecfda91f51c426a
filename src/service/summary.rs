//! Summary image: an 800x600 PNG listing the country total, the top five
//! countries by estimated GDP and the last refresh time.

use crate::db::sqlite::CountryStorage;
use crate::error::CountryError;
use chrono::{DateTime, Utc};
use num_format::{Locale, ToFormattedString};
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;
use plotters::style::{FontStyle, register_font};
use plotters_bitmap::BitMapBackend;
use std::path::{Path, PathBuf};
use std::sync::Once;
use tracing::{debug, warn};

pub const IMAGE_SIZE: (u32, u32) = (800, 600);
pub const TOP_N: i64 = 5;
const FONT_FAMILY: &str = "sans-serif";

/// Data drawn on the summary image.
#[derive(Debug, Clone, PartialEq)]
pub struct SummarySnapshot {
    pub total_countries: i64,
    /// Already ordered by GDP, highest first.
    pub top_countries: Vec<(String, Option<f64>)>,
    pub last_refreshed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Title,
    Heading,
    Entry,
    Footer,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryLine {
    pub kind: LineKind,
    pub text: String,
}

impl SummarySnapshot {
    pub async fn load(storage: &CountryStorage) -> Result<Self, CountryError> {
        let total_countries = storage.count().await?;
        let top_countries = storage
            .top_by_gdp(TOP_N)
            .await?
            .into_iter()
            .map(|c| (c.name, c.estimated_gdp))
            .collect();
        let metadata = storage.metadata().await?;
        Ok(Self {
            total_countries,
            top_countries,
            last_refreshed_at: metadata.last_refreshed_at,
        })
    }

    /// Text content in drawing order.
    pub fn lines(&self) -> Vec<SummaryLine> {
        let line = |kind, text: String| SummaryLine { kind, text };
        let mut lines = vec![
            line(LineKind::Title, "Country Data Summary".to_string()),
            line(
                LineKind::Heading,
                format!("Total Countries: {}", self.total_countries),
            ),
            line(
                LineKind::Heading,
                "Top 5 Countries by Estimated GDP:".to_string(),
            ),
        ];
        lines.extend(
            self.top_countries
                .iter()
                .take(TOP_N as usize)
                .enumerate()
                .map(|(idx, (name, gdp))| {
                    let gdp = gdp.map(format_gdp).unwrap_or_else(|| "N/A".to_string());
                    line(LineKind::Entry, format!("{}. {}: ${}", idx + 1, name, gdp))
                }),
        );
        let refreshed = self
            .last_refreshed_at
            .map(|ts| ts.format("%Y-%m-%d %H:%M:%S UTC").to_string())
            .unwrap_or_else(|| "Never".to_string());
        lines.push(line(LineKind::Footer, format!("Last Refreshed: {refreshed}")));
        lines
    }
}

/// Thousands separators and exactly two decimals, e.g. `1,234,567.89`.
pub fn format_gdp(value: f64) -> String {
    let cents = (value.abs() * 100.0).round() as u64;
    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!(
        "{sign}{}.{:02}",
        (cents / 100).to_formatted_string(&Locale::en),
        cents % 100
    )
}

static FONT_BYTES: &[u8] = include_bytes!("../../assets/DejaVuSans.ttf");
static INIT_FONT: Once = Once::new();

/// ab_glyph does not discover system fonts, so the bundled face is registered once.
fn ensure_font_registered() {
    INIT_FONT.call_once(|| {
        if register_font(FONT_FAMILY, FontStyle::Normal, FONT_BYTES).is_err() {
            warn!("bundled summary font could not be parsed");
        }
    });
}

fn render_err<E>(e: DrawingAreaErrorKind<E>) -> CountryError
where
    E: std::error::Error + Send + Sync,
{
    CountryError::RenderError(e.to_string())
}

#[derive(Debug, Clone)]
pub struct SummaryRenderer {
    image_path: PathBuf,
}

impl SummaryRenderer {
    pub fn new(image_path: impl Into<PathBuf>) -> Self {
        Self {
            image_path: image_path.into(),
        }
    }

    pub fn image_path(&self) -> &Path {
        &self.image_path
    }

    /// Draw `snapshot` and overwrite the image file.
    pub fn render(&self, snapshot: &SummarySnapshot) -> Result<(), CountryError> {
        if let Some(dir) = self.image_path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
        ensure_font_registered();

        let root = BitMapBackend::new(&self.image_path, IMAGE_SIZE).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;

        let mut y = 30;
        let mut previous = None;
        for line in snapshot.lines() {
            // extra gap between the list and the footer
            if line.kind == LineKind::Footer && previous == Some(LineKind::Entry) {
                y += 30;
            }
            let (x, size, color, advance) = match line.kind {
                LineKind::Title => (30, 32.0, &BLACK, 60),
                LineKind::Heading if previous == Some(LineKind::Title) => (30, 20.0, &BLACK, 50),
                LineKind::Heading => (30, 20.0, &BLACK, 40),
                LineKind::Entry => (50, 16.0, &BLUE, 30),
                LineKind::Footer => (30, 16.0, &GREEN, 30),
            };
            let style = (FONT_FAMILY, size).into_font().color(color);
            root.draw_text(&line.text, &style, (x, y)).map_err(render_err)?;
            y += advance;
            previous = Some(line.kind);
        }

        root.present().map_err(render_err)?;
        debug!(path = %self.image_path.display(), "summary image written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn snapshot() -> SummarySnapshot {
        SummarySnapshot {
            total_countries: 250,
            top_countries: vec![
                ("China".into(), Some(25_000_000_000.0)),
                ("India".into(), Some(1_234_567.891)),
                ("Nowhere".into(), None),
            ],
            last_refreshed_at: Some(Utc.with_ymd_and_hms(2025, 10, 22, 18, 5, 9).unwrap()),
        }
    }

    #[test]
    fn gdp_has_separators_and_two_decimals() {
        assert_eq!(format_gdp(1_234_567.891), "1,234,567.89");
        assert_eq!(format_gdp(0.0), "0.00");
        assert_eq!(format_gdp(999.999), "1,000.00");
        assert_eq!(format_gdp(12.5), "12.50");
    }

    #[test]
    fn lines_follow_layout_order() {
        let texts: Vec<_> = snapshot().lines().into_iter().map(|l| l.text).collect();
        assert_eq!(
            texts,
            vec![
                "Country Data Summary",
                "Total Countries: 250",
                "Top 5 Countries by Estimated GDP:",
                "1. China: $25,000,000,000.00",
                "2. India: $1,234,567.89",
                "3. Nowhere: $N/A",
                "Last Refreshed: 2025-10-22 18:05:09 UTC",
            ]
        );
    }

    #[test]
    fn never_refreshed_and_capped_at_five() {
        let snap = SummarySnapshot {
            total_countries: 7,
            top_countries: (1..=7)
                .map(|i| (format!("C{i}"), Some(100.0 - i as f64)))
                .collect(),
            last_refreshed_at: None,
        };
        let lines = snap.lines();
        let entries = lines.iter().filter(|l| l.kind == LineKind::Entry).count();
        assert_eq!(entries, 5);
        assert_eq!(lines.last().unwrap().text, "Last Refreshed: Never");
    }

    #[test]
    fn unwritable_location_is_an_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"x").unwrap();
        let renderer = SummaryRenderer::new(blocker.join("summary.png"));

        assert!(renderer.render(&snapshot()).is_err());
        assert!(!renderer.image_path().exists());
    }

    #[test]
    fn renders_png_and_overwrites() {
        let dir = tempfile::TempDir::new().unwrap();
        let renderer = SummaryRenderer::new(dir.path().join("cache").join("summary.png"));

        renderer.render(&snapshot()).unwrap();
        let first = std::fs::read(renderer.image_path()).unwrap();
        assert!(first.starts_with(b"\x89PNG\r\n\x1a\n"));

        let empty = SummarySnapshot {
            total_countries: 0,
            top_countries: Vec::new(),
            last_refreshed_at: None,
        };
        renderer.render(&empty).unwrap();
        let second = std::fs::read(renderer.image_path()).unwrap();
        assert!(second.starts_with(b"\x89PNG"));
        assert_ne!(first, second);
    }
}
