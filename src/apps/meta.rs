//! # Application metadata.
//!
//! [`AppMeta`] is a typed record of per-application presentation settings. The
//! supervisor never interprets it; it travels with the application's [`AppState`]
//! so the host can lay the application out.
//!
//! ## Defaults
//! - `maximised = false`, `cascade = false`
//! - `align = Centre`, `valign = Centre`
//! - `dimensions = (40, 10)` (width, height)
//!
//! Decoding from JSON accepts any subset of the fields, but rejects unknown keys and
//! values of the wrong type.
//!
//! ## Example
//! ```rust
//! use appvisor::{AppMeta, HorizontalAlign};
//!
//! let meta = AppMeta {
//!     align: HorizontalAlign::Left,
//!     ..AppMeta::default()
//! };
//! let json = meta.to_json().unwrap();
//! assert_eq!(AppMeta::from_json(&json).unwrap(), meta);
//! ```
//!
//! [`AppState`]: crate::AppState

use serde::{Deserialize, Serialize};

/// Horizontal placement of an application inside its container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HorizontalAlign {
    Left,
    #[default]
    Centre,
    Right,
}

/// Vertical placement of an application inside its container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalAlign {
    Top,
    #[default]
    Centre,
    Bottom,
}

/// Presentation settings of one application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppMeta {
    /// Application occupies its whole container.
    pub maximised: bool,

    /// Application is cascaded over its siblings.
    pub cascade: bool,

    pub align: HorizontalAlign,
    pub valign: VerticalAlign,

    /// Width and height.
    pub dimensions: (u16, u16),
}

impl Default for AppMeta {
    fn default() -> Self {
        Self {
            maximised: false,
            cascade: false,
            align: HorizontalAlign::default(),
            valign: VerticalAlign::default(),
            dimensions: (40, 10),
        }
    }
}

impl AppMeta {
    /// Returns the settings as a JSON object.
    pub fn to_value(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    /// Returns the settings as compact JSON text.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parses settings from JSON text; missing fields keep their defaults.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}
