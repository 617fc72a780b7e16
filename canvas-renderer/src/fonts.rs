//! Font discovery and glyph-advance text measurement.
//!
//! One [`FontBook`] serves two consumers: the export rasterizer (which needs the
//! font database to shape text) and the document's wrapping code (which needs
//! advance widths). Both see the same faces, so line breaks computed for a text
//! element match what the rasterizer draws.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, RwLock};

use canvas_core::{FontSpec, HeuristicMeasure, TextMeasure};
use usvg::fontdb::{self, Database, Family, Query, ID};

/// Raw face bytes as loaded from the database.
#[derive(Debug)]
struct LoadedFace {
    data: Vec<u8>,
    index: u32,
}

/// Fraction of the font size used for the ascent when no face is available.
const FALLBACK_ASCENT: f32 = 0.8;

/// Font database shared between measurement and rasterization.
pub struct FontBook {
    db: Arc<Database>,
    cache: RwLock<HashMap<ID, Arc<LoadedFace>>>,
}

impl FontBook {
    /// A book seeded with the system's installed fonts.
    #[must_use]
    pub fn system() -> Self {
        let mut db = Database::new();
        db.load_system_fonts();
        tracing::debug!("Loaded {} system font faces", db.len());
        Self::from_database(db)
    }

    /// A book with no fonts; measurement falls back to the heuristic.
    #[must_use]
    pub fn empty() -> Self {
        Self::from_database(Database::new())
    }

    /// Wrap an existing database.
    #[must_use]
    pub fn from_database(db: Database) -> Self {
        Self {
            db: Arc::new(db),
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Recursively load font files from a directory.
    pub fn load_dir(&mut self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        let db = Arc::make_mut(&mut self.db);
        let before = db.len();
        db.load_fonts_dir(path);
        tracing::debug!(
            "Loaded {} font faces from {}",
            db.len() - before,
            path.display()
        );
    }

    /// Number of faces known to the book.
    #[must_use]
    pub fn face_count(&self) -> usize {
        self.db.len()
    }

    /// The shared database, for the rasterizer's options.
    #[must_use]
    pub fn database(&self) -> Arc<Database> {
        Arc::clone(&self.db)
    }

    /// Distance from the top of the line box to the baseline.
    #[must_use]
    pub fn ascent(&self, font: &FontSpec<'_>) -> f32 {
        self.with_face(font, |face| {
            f32::from(face.ascender()) * font.size / f32::from(face.units_per_em())
        })
        .unwrap_or(font.size * FALLBACK_ASCENT)
    }

    fn query(&self, font: &FontSpec<'_>) -> Option<ID> {
        let families = [family(font.family), Family::SansSerif];
        self.db.query(&Query {
            families: &families,
            weight: fontdb::Weight(font.weight),
            stretch: fontdb::Stretch::Normal,
            style: fontdb::Style::Normal,
        })
    }

    fn load(&self, id: ID) -> Option<Arc<LoadedFace>> {
        if let Some(face) = self.cache.read().ok()?.get(&id) {
            return Some(Arc::clone(face));
        }

        let face = self.db.with_face_data(id, |data, index| {
            Arc::new(LoadedFace {
                data: data.to_vec(),
                index,
            })
        })?;

        if let Ok(mut cache) = self.cache.write() {
            cache.insert(id, Arc::clone(&face));
        }
        Some(face)
    }

    fn with_face<T>(
        &self,
        font: &FontSpec<'_>,
        read: impl FnOnce(&ttf_parser::Face<'_>) -> T,
    ) -> Option<T> {
        let loaded = self.load(self.query(font)?)?;
        match ttf_parser::Face::parse(&loaded.data, loaded.index) {
            Ok(face) if face.units_per_em() > 0 => Some(read(&face)),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!("Unreadable face for {}: {e}", font.family);
                None
            }
        }
    }
}

impl Default for FontBook {
    fn default() -> Self {
        Self::system()
    }
}

impl std::fmt::Debug for FontBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontBook")
            .field("faces", &self.db.len())
            .finish_non_exhaustive()
    }
}

impl TextMeasure for FontBook {
    fn measure(&self, text: &str, font: &FontSpec<'_>) -> f32 {
        self.with_face(font, |face| {
            let scale = font.size / f32::from(face.units_per_em());
            let notdef = face
                .glyph_hor_advance(ttf_parser::GlyphId(0))
                .unwrap_or_default();
            text.chars()
                .map(|c| {
                    face.glyph_index(c)
                        .and_then(|glyph| face.glyph_hor_advance(glyph))
                        .unwrap_or(notdef)
                })
                .map(|advance| f32::from(advance) * scale)
                .sum()
        })
        .unwrap_or_else(|| HeuristicMeasure.measure(text, font))
    }
}

/// Map a CSS-style family name onto a database family.
fn family(name: &str) -> Family<'_> {
    match name.trim().to_ascii_lowercase().as_str() {
        "serif" => Family::Serif,
        "sans-serif" => Family::SansSerif,
        "monospace" => Family::Monospace,
        "cursive" => Family::Cursive,
        "fantasy" => Family::Fantasy,
        _ => Family::Name(name.trim()),
    }
}
