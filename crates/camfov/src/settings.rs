//! User-facing settings, persisted as TOML or JSON.

use std::collections::BTreeSet;
use std::path::Path;

use camfov_cone::SynthesisOptions;
use camfov_math::SHORT_CURVE;
use camfov_obstacles::{default_whitelist, BuiltInCategory, ExtractOptions};
use serde::{Deserialize, Serialize};

use crate::{FovError, Result};

/// Settings shared by extraction and synthesis.
///
/// Lengths are meters. Missing keys in a settings file take their default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FovSettings {
    /// Requested ray spacing in degrees.
    pub angular_resolution_deg: f64,
    /// Coarser spacings tried when reconstruction fails.
    pub fallback_ladder_deg: Vec<f64>,
    /// Camera nudge along its heading for jittered retries.
    pub jitter_distance: f64,
    /// Decimal places of the obstacle dedup key.
    pub dedup_precision: usize,
    /// Shortest curve the host can draw.
    pub short_curve_tolerance: f64,
    /// Obstacle categories.
    pub categories: BTreeSet<BuiltInCategory>,
    /// Field of view for cameras that do not specify one.
    pub default_fov_deg: f64,
    /// Sensor width in pixels, for DORI ranges.
    pub horizontal_resolution_px: u32,
    /// Drop standalone curves found in linked models.
    pub drop_linked_curves: bool,
}

impl Default for FovSettings {
    fn default() -> Self {
        Self {
            angular_resolution_deg: 0.5,
            fallback_ladder_deg: vec![0.5, 1.0, 2.0, 5.0],
            jitter_distance: 0.01,
            dedup_precision: 4,
            short_curve_tolerance: SHORT_CURVE,
            categories: default_whitelist(),
            default_fov_deg: 93.0,
            horizontal_resolution_px: 1920,
            drop_linked_curves: true,
        }
    }
}

impl FovSettings {
    /// Validate settings.
    pub fn validate(&self) -> Result<()> {
        if !(self.angular_resolution_deg > 0.0 && self.angular_resolution_deg <= 90.0) {
            return Err(FovError::InvalidSettings(
                "angular_resolution_deg must be in (0, 90]".into(),
            ));
        }
        if self.fallback_ladder_deg.iter().any(|r| !(*r > 0.0 && r.is_finite())) {
            return Err(FovError::InvalidSettings(
                "fallback_ladder_deg entries must be positive".into(),
            ));
        }
        if !(self.jitter_distance >= 0.0 && self.jitter_distance.is_finite()) {
            return Err(FovError::InvalidSettings(
                "jitter_distance must be non-negative".into(),
            ));
        }
        if self.dedup_precision > 12 {
            return Err(FovError::InvalidSettings(
                "dedup_precision must be at most 12".into(),
            ));
        }
        if !(self.short_curve_tolerance > 0.0 && self.short_curve_tolerance.is_finite()) {
            return Err(FovError::InvalidSettings(
                "short_curve_tolerance must be positive".into(),
            ));
        }
        if !(self.default_fov_deg > 0.0 && self.default_fov_deg <= 360.0) {
            return Err(FovError::InvalidSettings(
                "default_fov_deg must be in (0, 360]".into(),
            ));
        }
        if self.horizontal_resolution_px == 0 {
            return Err(FovError::InvalidSettings(
                "horizontal_resolution_px must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Extraction options derived from these settings.
    pub fn extract_options(&self) -> ExtractOptions {
        ExtractOptions {
            precision: self.dedup_precision,
            short_curve_tolerance: self.short_curve_tolerance,
            whitelist: self.categories.clone(),
            drop_linked_curves: self.drop_linked_curves,
        }
    }

    /// Synthesis options derived from these settings.
    pub fn synthesis_options(&self) -> SynthesisOptions {
        SynthesisOptions {
            fallback_ladder_deg: self.fallback_ladder_deg.clone(),
            jitter_distance: self.jitter_distance,
            tolerance: self.short_curve_tolerance,
        }
    }

    /// Parse TOML settings.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let settings: FovSettings = toml::from_str(s)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Serialize as TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Load settings from a `.json` or TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        if is_json(path) {
            let settings: FovSettings = serde_json::from_str(&content)?;
            settings.validate()?;
            Ok(settings)
        } else {
            Self::from_toml_str(&content)
        }
    }

    /// Load settings, writing the defaults first if the file is missing.
    pub fn load_or_init(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::info!("creating default settings at {}", path.display());
            let defaults = Self::default();
            defaults.save(path)?;
            return Ok(defaults);
        }
        Self::load(path)
    }

    /// Save settings; the format follows the file extension.
    pub fn save(&self, path: &Path) -> Result<()> {
        self.validate()?;
        let content = if is_json(path) {
            serde_json::to_string_pretty(self)?
        } else {
            self.to_toml_string()?
        };
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let s = FovSettings::default();
        assert!(s.validate().is_ok());
        assert_eq!(s.default_fov_deg, 93.0);
        assert_eq!(s.horizontal_resolution_px, 1920);
        assert_eq!(s.extract_options().precision, 4);
        assert_eq!(s.synthesis_options().fallback_ladder_deg.len(), 4);
    }

    #[test]
    fn test_toml_round_trip_keeps_values() {
        let mut s = FovSettings::default();
        s.angular_resolution_deg = 0.25;
        s.categories.remove(&BuiltInCategory::Doors);
        s.drop_linked_curves = false;
        let text = s.to_toml_string().unwrap();
        let back = FovSettings::from_toml_str(&text).unwrap();
        assert_eq!(back, s);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let s = FovSettings::from_toml_str("default_fov_deg = 110.0\n").unwrap();
        assert_eq!(s.default_fov_deg, 110.0);
        assert_eq!(s.angular_resolution_deg, 0.5);
        assert_eq!(s.categories, default_whitelist());
    }

    #[test]
    fn test_category_names_in_toml() {
        let s = FovSettings::from_toml_str("categories = [\"walls\", \"curtain_wall_panels\"]\n")
            .unwrap();
        assert_eq!(s.categories.len(), 2);
        assert!(s.categories.contains(&BuiltInCategory::CurtainWallPanels));
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            FovSettings::from_toml_str("angular_resolution_deg = 0.0\n"),
            Err(FovError::InvalidSettings(_))
        ));
        assert!(matches!(
            FovSettings::from_toml_str("fallback_ladder_deg = [1.0, -2.0]\n"),
            Err(FovError::InvalidSettings(_))
        ));
        assert!(matches!(
            FovSettings::from_toml_str("angular_resolution_deg = \"fine\"\n"),
            Err(FovError::Format(_))
        ));
    }

    #[test]
    fn test_load_or_init_creates_file() {
        let dir = std::env::temp_dir().join(format!("camfov-settings-{}", std::process::id()));
        let path = dir.join("settings.toml");
        let _ = std::fs::remove_file(&path);

        let created = FovSettings::load_or_init(&path).unwrap();
        assert!(path.exists());
        assert_eq!(created, FovSettings::default());

        let json = dir.join("settings.json");
        created.save(&json).unwrap();
        assert_eq!(FovSettings::load(&json).unwrap(), created);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
