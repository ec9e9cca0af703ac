// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tunables for the pointer engine, loadable from TOML.
//!
//! Every field has a default, so a partial file (or none at all) is valid:
//!
//! ```
//! use understory_pointer::{Hand, InteractionConfig};
//!
//! let cfg = InteractionConfig::from_toml_str(
//!     r##"
//!     primary_hand = "left"
//!     [colors]
//!     alt = "#ff8800"
//!     "##,
//! )
//! .unwrap();
//! assert_eq!(cfg.primary_hand, Hand::Left);
//! assert_eq!(cfg.scroll_deadzone, 0.1);
//! ```

use std::{fs, path::Path, str::FromStr};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::ConfigError;
use crate::types::{Hand, PointerMode};

/// An sRGB colour parsed from and written as `#RRGGBB`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb(pub u8, pub u8, pub u8);

impl FromStr for Rgb {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidColor(s.to_owned());
        let hex = s.strip_prefix('#').ok_or_else(invalid)?;
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(invalid());
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
        Ok(Self(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl TryFrom<String> for Rgb {
    type Error = ConfigError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Rgb> for String {
    fn from(c: Rgb) -> Self {
        c.to_string()
    }
}

impl core::fmt::Display for Rgb {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }
}

/// Laser colour per [`PointerMode`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModeColors {
    /// [`PointerMode::Normal`].
    pub normal: Rgb,
    /// [`PointerMode::Alt`].
    pub alt: Rgb,
    /// [`PointerMode::Alt2`].
    pub alt2: Rgb,
    /// [`PointerMode::Neutral`].
    pub neutral: Rgb,
}

impl Default for ModeColors {
    fn default() -> Self {
        Self {
            normal: Rgb(0x00, 0x60, 0x80),
            alt: Rgb(0xB0, 0x30, 0x00),
            alt2: Rgb(0x60, 0x00, 0x80),
            neutral: Rgb(0xA0, 0xA0, 0xA0),
        }
    }
}

impl ModeColors {
    /// Colour for `mode`.
    pub fn for_mode(&self, mode: PointerMode) -> Rgb {
        match mode {
            PointerMode::Normal => self.normal,
            PointerMode::Alt => self.alt,
            PointerMode::Alt2 => self.alt2,
            PointerMode::Neutral => self.neutral,
        }
    }
}

/// Bounds for the default grab manipulation.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrabLimits {
    /// Closest a held surface may be pulled (meters from the hand).
    pub min_distance: f32,
    /// Farthest a held surface may be pushed.
    pub max_distance: f32,
    /// Smallest scale reachable by resizing.
    pub min_scale: f32,
    /// Largest scale reachable by resizing.
    pub max_scale: f32,
}

impl Default for GrabLimits {
    fn default() -> Self {
        Self {
            min_distance: 0.3,
            max_distance: 10.0,
            min_scale: 0.35,
            max_scale: 10.0,
        }
    }
}

/// Engine configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    /// Scroll magnitudes at or below this are ignored.
    pub scroll_deadzone: f32,
    /// Roll dot product strictly below this selects [`PointerMode::Alt`].
    pub alt_roll_threshold: f32,
    /// When false, roll never selects `Alt`; only explicit modifiers change mode.
    pub roll_alt_mode: bool,
    /// Hand processed first in each frame.
    pub primary_hand: Hand,
    /// Laser colours.
    pub colors: ModeColors,
    /// Grab manipulation bounds.
    pub grab: GrabLimits,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            scroll_deadzone: 0.1,
            alt_roll_threshold: -0.5,
            roll_alt_mode: true,
            primary_hand: Hand::Right,
            colors: ModeColors::default(),
            grab: GrabLimits::default(),
        }
    }
}

impl InteractionConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let cfg: Self = toml::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load configuration from an explicit path, falling back to defaults on errors.
    pub fn load_from_path(path: &Path) -> Self {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!("Interaction config not found at {}. Using defaults", path.display());
                return Self::default();
            }
            Err(err) => {
                warn!("Failed to read {}: {err}. Using defaults", path.display());
                return Self::default();
            }
        };
        match Self::from_toml_str(&contents) {
            Ok(cfg) => cfg,
            Err(err) => {
                warn!("Failed to load {}: {err}. Using defaults", path.display());
                Self::default()
            }
        }
    }

    /// Serialize to pretty TOML.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check numeric fields against their allowed ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let check = |field: &'static str, value: f32, ok: bool| {
            if ok && value.is_finite() {
                Ok(())
            } else {
                Err(ConfigError::OutOfRange { field, value })
            }
        };
        let g = &self.grab;
        check(
            "scroll_deadzone",
            self.scroll_deadzone,
            (0.0..1.0).contains(&self.scroll_deadzone),
        )?;
        check(
            "alt_roll_threshold",
            self.alt_roll_threshold,
            (-1.0..=1.0).contains(&self.alt_roll_threshold),
        )?;
        check("grab.min_distance", g.min_distance, g.min_distance > 0.0)?;
        check(
            "grab.max_distance",
            g.max_distance,
            g.max_distance > g.min_distance,
        )?;
        check("grab.min_scale", g.min_scale, g.min_scale > 0.0)?;
        check("grab.max_scale", g.max_scale, g.max_scale > g.min_scale)?;
        Ok(())
    }
}
