//! Stable per-country display colors.
//!
//! Every guessed country gets a fill color picked at random from
//! [`PALETTE`] and an outline color derived from it. The pick is
//! persisted through a [`ColorStore`] the first time a country is seen,
//! so reloading the page (or guessing the same country in a later
//! session) reproduces the same color.
//!
//! Lookup order in [`ColorAllocator::color_for`]:
//!
//! 1. in-memory working set
//! 2. persisted memo
//! 3. fresh random pick, written to the memo immediately
//!
//! Memo writes are append-only: a key that already has a value is never
//! overwritten, so two tabs racing on a brand-new country converge on
//! whichever value landed first.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use rand::Rng;
use serde::{Deserialize, Serialize};
use siphasher::sip::SipHasher13;

/// Curated fill palette: bright, mutually distinct hues.
pub const PALETTE: [Rgb; 16] = [
    Rgb::new(0xFF, 0x57, 0x33), // fiery red
    Rgb::new(0x33, 0xFF, 0x57), // vivid green
    Rgb::new(0x33, 0x57, 0xFF), // bright blue
    Rgb::new(0xFF, 0x33, 0xA1), // hot pink
    Rgb::new(0xFF, 0x8C, 0x33), // orange
    Rgb::new(0x33, 0xFF, 0xF5), // aqua
    Rgb::new(0x8C, 0x33, 0xFF), // purple
    Rgb::new(0xC7, 0x00, 0x39), // crimson
    Rgb::new(0x33, 0xFF, 0x8C), // mint
    Rgb::new(0xFF, 0x33, 0xFF), // magenta
    Rgb::new(0x33, 0xA1, 0xFF), // sky blue
    Rgb::new(0xA1, 0xFF, 0x33), // lime
    Rgb::new(0xFF, 0x7F, 0x50), // coral
    Rgb::new(0x57, 0x33, 0xFF), // indigo
    Rgb::new(0xFF, 0xD4, 0x33), // sunflower
    Rgb::new(0x00, 0x80, 0x80), // teal
];

/// Fraction of lightness removed when deriving an outline color.
pub const DARKEN_FACTOR: f64 = 0.3;

/// Multiplier applied to saturation when deriving an outline color.
pub const SATURATE_FACTOR: f64 = 1.2;

/// Errors from parsing color strings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ColorError {
    /// The string is not of the form `#RRGGBB`.
    #[error("invalid hex color: {0:?}")]
    InvalidHex(String),
}

/// Errors from reading or writing the persisted color memo.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The backing store could not be read.
    #[error("failed to read color memo: {0}")]
    Read(String),
    /// The backing store could not be written.
    #[error("failed to write color memo: {0}")]
    Write(String),
}

/// A 24-bit sRGB color.
///
/// Serializes as a `#RRGGBB` hex string, which is also the format
/// stored in the color memo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Rgb {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Rgb {
    /// Create a color from its channels.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a `#RRGGBB` string (case-insensitive, surrounding
    /// whitespace ignored).
    ///
    /// # Errors
    ///
    /// Returns [`ColorError::InvalidHex`] for anything else.
    pub fn from_hex(s: &str) -> Result<Self, ColorError> {
        let invalid = || ColorError::InvalidHex(s.to_owned());
        let digits = s.trim().strip_prefix('#').ok_or_else(invalid)?;
        if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| invalid());
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Format as an uppercase `#RRGGBB` string.
    #[must_use]
    pub fn to_hex(self) -> String {
        self.to_string()
    }

    /// Hue (degrees, `0..360`), saturation and lightness (`0..=1`).
    #[must_use]
    pub fn to_hsl(self) -> (f64, f64, f64) {
        let r = f64::from(self.r) / 255.0;
        let g = f64::from(self.g) / 255.0;
        let b = f64::from(self.b) / 255.0;
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let lightness = (max + min) / 2.0;
        let delta = max - min;

        if delta == 0.0 {
            return (0.0, 0.0, lightness);
        }

        let saturation = if lightness > 0.5 {
            delta / (2.0 - max - min)
        } else {
            delta / (max + min)
        };
        #[allow(clippy::float_cmp)]
        let sector = if max == r {
            ((g - b) / delta).rem_euclid(6.0)
        } else if max == g {
            (b - r) / delta + 2.0
        } else {
            (r - g) / delta + 4.0
        };
        (sector * 60.0, saturation, lightness)
    }

    /// Build a color from hue (degrees), saturation and lightness.
    ///
    /// Saturation and lightness are clamped to `0..=1`.
    #[must_use]
    pub fn from_hsl(hue: f64, saturation: f64, lightness: f64) -> Self {
        let s = saturation.clamp(0.0, 1.0);
        let l = lightness.clamp(0.0, 1.0);
        let h = hue.rem_euclid(360.0) / 60.0;

        let chroma = (1.0 - 2.0f64.mul_add(l, -1.0).abs()) * s;
        let x = chroma * (1.0 - (h.rem_euclid(2.0) - 1.0).abs());
        let m = l - chroma / 2.0;

        let (r, g, b) = match h {
            h if h < 1.0 => (chroma, x, 0.0),
            h if h < 2.0 => (x, chroma, 0.0),
            h if h < 3.0 => (0.0, chroma, x),
            h if h < 4.0 => (0.0, x, chroma),
            h if h < 5.0 => (x, 0.0, chroma),
            _ => (chroma, 0.0, x),
        };
        Self::new(to_channel(r + m), to_channel(g + m), to_channel(b + m))
    }

    /// Outline color for this fill: lightness reduced by
    /// [`DARKEN_FACTOR`], saturation boosted by [`SATURATE_FACTOR`].
    #[must_use]
    pub fn stroke(self) -> Self {
        let (h, s, l) = self.to_hsl();
        Self::from_hsl(h, s * SATURATE_FACTOR, l * (1.0 - DARKEN_FACTOR))
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_channel(unit: f64) -> u8 {
    (unit.clamp(0.0, 1.0) * 255.0).round() as u8
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl From<Rgb> for String {
    fn from(c: Rgb) -> Self {
        c.to_hex()
    }
}

impl TryFrom<String> for Rgb {
    type Error = ColorError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::from_hex(&s)
    }
}

/// Fill and outline pair for one country.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryColors {
    /// Polygon fill.
    pub fill: Rgb,
    /// Polygon outline, derived from `fill`.
    pub stroke: Rgb,
}

impl CountryColors {
    /// Pair a fill with its derived outline.
    #[must_use]
    pub fn from_fill(fill: Rgb) -> Self {
        Self {
            fill,
            stroke: fill.stroke(),
        }
    }
}

/// Persisted mapping from canonical country name to `#RRGGBB` fill.
///
/// Implementations back onto browser `localStorage`, a JSON file, or
/// memory.
pub trait ColorStore {
    /// The stored hex color for `country`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Read`] if the backing store is unavailable.
    fn load(&self, country: &str) -> Result<Option<String>, StoreError>;

    /// Persist `color` for `country`.
    ///
    /// Must leave an existing value for `country` untouched.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Write`] if the value could not be persisted.
    fn save(&mut self, country: &str, color: &str) -> Result<(), StoreError>;
}

/// In-memory [`ColorStore`].
///
/// Clones share the same map, so two allocators built from clones of
/// one store behave like two sessions over the same persistent memo.
#[derive(Debug, Clone, Default)]
pub struct MemoryColorStore {
    entries: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryColorStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of persisted entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Returns `true` if nothing has been persisted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl ColorStore for MemoryColorStore {
    fn load(&self, country: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.borrow().get(country).cloned())
    }

    fn save(&mut self, country: &str, color: &str) -> Result<(), StoreError> {
        self.entries
            .borrow_mut()
            .entry(country.to_owned())
            .or_insert_with(|| color.to_owned());
        Ok(())
    }
}

/// Assigns and remembers a color for each country.
///
/// Both the persistence layer and the random source are injected so
/// tests can use [`MemoryColorStore`] and a seeded RNG.
#[derive(Debug)]
pub struct ColorAllocator<S, R> {
    store: S,
    rng: R,
    working_set: HashMap<String, CountryColors>,
}

impl<S: ColorStore, R: Rng> ColorAllocator<S, R> {
    /// Create an allocator over `store`, drawing fresh picks from `rng`.
    pub fn new(store: S, rng: R) -> Self {
        Self {
            store,
            rng,
            working_set: HashMap::new(),
        }
    }

    /// The colors for `country`, assigning and persisting them on first
    /// sight.
    ///
    /// Store failures never surface: an unreadable memo falls back to a
    /// fresh in-memory pick (nothing is written, since the existing value
    /// is unknown), a corrupt memo value falls back to a stable
    /// hash-based palette entry, and a failed write is logged.
    pub fn color_for(&mut self, country: &str) -> CountryColors {
        if let Some(colors) = self.working_set.get(country) {
            return *colors;
        }

        let fill = match self.store.load(country) {
            Ok(Some(hex)) => Rgb::from_hex(&hex).unwrap_or_else(|e| {
                tracing::warn!(country, error = %e, "ignoring corrupt color memo entry");
                hashed_fill(country)
            }),
            Ok(None) => self.assign(country),
            Err(e) => {
                tracing::warn!(country, error = %e, "color memo unavailable");
                self.pick()
            }
        };

        let colors = CountryColors::from_fill(fill);
        self.working_set.insert(country.to_owned(), colors);
        colors
    }

    /// The backing store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Pick and persist a fill for a country the store has never seen.
    ///
    /// Another writer may have stored the key between our load and save;
    /// the stored value is read back and wins if it parses.
    fn assign(&mut self, country: &str) -> Rgb {
        let fill = self.pick();
        if let Err(e) = self.store.save(country, &fill.to_hex()) {
            tracing::warn!(country, error = %e, "color will not survive a reload");
            return fill;
        }
        match self.store.load(country) {
            Ok(Some(hex)) => match Rgb::from_hex(&hex) {
                Ok(stored) => {
                    if stored != fill {
                        tracing::debug!(country, %stored, "another session assigned first");
                    }
                    stored
                }
                Err(_) => fill,
            },
            Ok(None) | Err(_) => fill,
        }
    }

    fn pick(&mut self) -> Rgb {
        PALETTE[self.rng.gen_range(0..PALETTE.len())]
    }
}

/// Palette entry chosen by a stable hash of the country name.
#[allow(clippy::cast_possible_truncation)]
fn hashed_fill(country: &str) -> Rgb {
    let mut hasher = SipHasher13::new();
    country.hash(&mut hasher);
    PALETTE[(hasher.finish() % PALETTE.len() as u64) as usize]
}
