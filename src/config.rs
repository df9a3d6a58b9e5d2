//! Configuration data structures and TOML parsing.
//!
//! The config file uses TOML format. Example:
//!
//! ```toml
//! [global]
//! log_level = "info"
//!
//! [global.thresholds]
//! horizontal_top_min_swipe = 25.0
//! horizontal_bottom_min_swipe = 25.0
//! vertical_left_min_swipe = 25.0
//! vertical_right_min_swipe = 25.0
//! dead_zone_margin_pct = 5.0
//!
//! [global.toggles]
//! double_tap = true
//! zoom = false
//!
//! [global.actions.volume_up]
//! command = "pactl set-sink-volume @DEFAULT_SINK@ +5%"
//! enabled = true
//!
//! [surface.media_panel]
//! device_usb_id = "1234:5678"
//! enabled = true
//!
//! [surface.media_panel.actions.seek_forward]
//! command = "playerctl position 10+"
//! enabled = true
//!
//! [surface.media_panel.thresholds]
//! horizontal_top_min_swipe = 40.0
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde::Deserialize;
use thiserror::Error;

/// Top-level error type used throughout the crate.
#[derive(Debug, Error)]
pub enum VidgestError {
    #[error("Failed to read config file {path}: {source}")]
    ConfigReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    #[error("Config validation error for surface '{surface}': missing threshold(s): {missing}")]
    MissingThresholds { surface: String, missing: String },
}

/// Root of the TOML config file.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct RawConfig {
    global: RawGlobal,
    #[serde(default)]
    surface: HashMap<String, RawSurface>,
}

/// The `[global]` section.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct RawGlobal {
    log_level: Option<String>,
    log_file: Option<String>,
    #[serde(default)]
    thresholds: RawThresholds,
    #[serde(default)]
    toggles: RawToggles,
    #[serde(default)]
    actions: HashMap<String, RawActionConfig>,
}

/// Threshold values - all optional so surface sections can partially
/// override.
#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
struct RawThresholds {
    horizontal_top_min_swipe: Option<f64>,
    horizontal_bottom_min_swipe: Option<f64>,
    vertical_left_min_swipe: Option<f64>,
    vertical_right_min_swipe: Option<f64>,
    dead_zone_margin_pct: Option<f64>,
}

/// Gesture toggles - absent means enabled.
#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
struct RawToggles {
    double_tap: Option<bool>,
    horizontal_top: Option<bool>,
    horizontal_bottom: Option<bool>,
    vertical_left: Option<bool>,
    vertical_right: Option<bool>,
    zoom: Option<bool>,
    pan: Option<bool>,
}

/// An action entry (command + enabled).
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
struct RawActionConfig {
    command: Option<String>,
    enabled: Option<bool>,
}

/// A `[surface.<id>]` section.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct RawSurface {
    device_usb_id: Option<String>,
    enabled: Option<bool>,
    #[serde(default)]
    thresholds: RawThresholds,
    #[serde(default)]
    toggles: RawToggles,
    #[serde(default)]
    actions: HashMap<String, RawActionConfig>,
}

/// Gesture thresholds and toggles consumed by the recognizer.
///
/// One value object per gesture session: the recognizer snapshots it at
/// first finger down, so mid-gesture reconfiguration never flips an
/// in-progress zone decision.
#[derive(Debug, Clone)]
pub struct GestureSettings {
    pub double_tap_enabled: bool,
    pub horizontal_top_enabled: bool,
    pub horizontal_bottom_enabled: bool,
    pub vertical_left_enabled: bool,
    pub vertical_right_enabled: bool,
    pub zoom_enabled: bool,
    pub pan_enabled: bool,
    pub horizontal_top_min_swipe: f64,
    pub horizontal_bottom_min_swipe: f64,
    pub vertical_left_min_swipe: f64,
    pub vertical_right_min_swipe: f64,
    pub dead_zone_margin_pct: f64,
}

impl Default for GestureSettings {
    fn default() -> Self {
        GestureSettings {
            double_tap_enabled: true,
            horizontal_top_enabled: true,
            horizontal_bottom_enabled: true,
            vertical_left_enabled: true,
            vertical_right_enabled: true,
            zoom_enabled: true,
            pan_enabled: true,
            horizontal_top_min_swipe: 25.0,
            horizontal_bottom_min_swipe: 25.0,
            vertical_left_min_swipe: 25.0,
            vertical_right_min_swipe: 25.0,
            dead_zone_margin_pct: 5.0,
        }
    }
}

/// Action configuration (command + enabled).
#[derive(Debug, Clone)]
pub struct ActionConfig {
    pub command: Option<String>,
    pub enabled: bool,
}

/// Configuration for a single touch surface.
#[derive(Debug, Clone)]
pub struct SurfaceConfig {
    pub device_usb_id: String,
    pub actions: HashMap<String, ActionConfig>,
    pub settings: GestureSettings,
}

/// Top-level parsed configuration.
#[derive(Debug)]
pub struct AppConfig {
    pub log_level: String,
    pub log_file: Option<String>,
    pub surfaces: HashMap<String, SurfaceConfig>,
}

/// Generate merge and validation for threshold fields.
macro_rules! threshold_fields {
    ($($field:ident),+ $(,)?) => {
        impl RawThresholds {
            fn merge_with_fallback(&self, fallback: &RawThresholds) -> RawThresholds {
                RawThresholds {
                    $($field: self.$field.or(fallback.$field),)+
                }
            }

            fn missing_fields(&self) -> Vec<&'static str> {
                [$(
                    if self.$field.is_none() { Some(stringify!($field)) } else { None },
                )+].into_iter().flatten().collect()
            }
        }
    };
}

threshold_fields!(
    horizontal_top_min_swipe,
    horizontal_bottom_min_swipe,
    vertical_left_min_swipe,
    vertical_right_min_swipe,
    dead_zone_margin_pct,
);

/// Generate merge for toggle fields; a toggle nobody set defaults to
/// enabled at resolution time.
macro_rules! toggle_fields {
    ($($field:ident),+ $(,)?) => {
        impl RawToggles {
            fn merge_with_fallback(&self, fallback: &RawToggles) -> RawToggles {
                RawToggles {
                    $($field: self.$field.or(fallback.$field),)+
                }
            }
        }
    };
}

toggle_fields!(
    double_tap,
    horizontal_top,
    horizontal_bottom,
    vertical_left,
    vertical_right,
    zoom,
    pan,
);

fn build_settings(
    surface_id: &str,
    thresholds: &RawThresholds,
    toggles: &RawToggles,
) -> Result<GestureSettings, VidgestError> {
    let missing = thresholds.missing_fields();
    if !missing.is_empty() {
        return Err(VidgestError::MissingThresholds {
            surface: surface_id.to_string(),
            missing: missing.join(", "),
        });
    }

    Ok(GestureSettings {
        double_tap_enabled: toggles.double_tap.unwrap_or(true),
        horizontal_top_enabled: toggles.horizontal_top.unwrap_or(true),
        horizontal_bottom_enabled: toggles.horizontal_bottom.unwrap_or(true),
        vertical_left_enabled: toggles.vertical_left.unwrap_or(true),
        vertical_right_enabled: toggles.vertical_right.unwrap_or(true),
        zoom_enabled: toggles.zoom.unwrap_or(true),
        pan_enabled: toggles.pan.unwrap_or(true),
        horizontal_top_min_swipe: thresholds.horizontal_top_min_swipe.unwrap_or_default(),
        horizontal_bottom_min_swipe: thresholds.horizontal_bottom_min_swipe.unwrap_or_default(),
        vertical_left_min_swipe: thresholds.vertical_left_min_swipe.unwrap_or_default(),
        vertical_right_min_swipe: thresholds.vertical_right_min_swipe.unwrap_or_default(),
        dead_zone_margin_pct: thresholds.dead_zone_margin_pct.unwrap_or_default(),
    })
}

/// Merge action maps: global first, then surface-specific overrides.
fn merge_actions(
    global: &HashMap<String, RawActionConfig>,
    surface: &HashMap<String, RawActionConfig>,
) -> HashMap<String, ActionConfig> {
    let mut merged = HashMap::new();

    // Insert all global + surface action names, surface values override.
    for (name, ac) in global.iter().chain(surface.iter()) {
        let entry = merged.entry(name.clone()).or_insert(ActionConfig {
            command: None,
            enabled: false,
        });
        if ac.command.is_some() {
            entry.command.clone_from(&ac.command);
        }
        if let Some(enabled) = ac.enabled {
            entry.enabled = enabled;
        }
    }

    merged
}

/// Parse a TOML config file and return the fully resolved `AppConfig`.
pub fn parse_config_file(path: &Path) -> Result<AppConfig, VidgestError> {
    let raw: RawConfig =
        toml::from_str(
            &fs::read_to_string(path).map_err(|e| VidgestError::ConfigReadError {
                path: path.to_path_buf(),
                source: e,
            })?,
        )
        .map_err(|e| VidgestError::ConfigParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    let mut surfaces = HashMap::new();

    for (surface_id, raw_surface) in &raw.surface {
        if !raw_surface.enabled.unwrap_or(false) {
            debug!("Surface '{surface_id}' is not enabled – skipping.");
            continue;
        }

        let Some(usb_id) = raw_surface.device_usb_id.as_deref().filter(|s| !s.is_empty()) else {
            warn!(
                "Surface '{surface_id}' is enabled but has no device_usb_id – skipping. \
                 Run 'vidgest --list-devices' to find your USB ID.",
            );
            continue;
        };

        let thresholds = raw_surface
            .thresholds
            .merge_with_fallback(&raw.global.thresholds);
        let toggles = raw_surface.toggles.merge_with_fallback(&raw.global.toggles);

        surfaces.insert(
            surface_id.clone(),
            SurfaceConfig {
                device_usb_id: usb_id.to_string(),
                actions: merge_actions(&raw.global.actions, &raw_surface.actions),
                settings: build_settings(surface_id, &thresholds, &toggles)?,
            },
        );
    }

    Ok(AppConfig {
        log_level: raw.global.log_level.unwrap_or_else(|| "info".to_string()),
        log_file: raw.global.log_file,
        surfaces,
    })
}

/// Parse a USB vendor:product ID string into `(vendor, product)`.
///
/// Accepts formats like `"1234:5678"` or `"USB:1234:5678"` (case-insensitive).
/// Returns `None` if the format is invalid or the hex values cannot be parsed.
pub fn parse_usb_id(raw: &str) -> Option<(u16, u16)> {
    let cleaned = raw.to_lowercase().replace("usb:", "");
    let (vendor_str, product_str) = cleaned.split_once(':')?;
    let vendor = u16::from_str_radix(vendor_str, 16).ok()?;
    let product = u16::from_str_radix(product_str, 16).ok()?;
    Some((vendor, product))
}
