//! Sealpost configuration.
//!
//! All tunables live in one explicit structure handed to the scheduler at
//! construction — asset paths, routing table, page target — so tests can run
//! against synthetic tables and temporary directories.

use crate::engine::{PageSize, StampPlacement};
use crate::error::{Result, SpError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SealpostConfig {
    #[serde(default)]
    pub watch: WatchConfig,
    #[serde(default)]
    pub stamp: StampConfig,
    #[serde(default)]
    pub page: PageConfig,
    /// Ordered routing rules; declaration order is evaluation order.
    #[serde(default)]
    pub routing: Vec<RouteRule>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Seconds between poll cycles of the watched directory.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    /// Short retry used when the watched directory is unreachable.
    #[serde(default = "default_retry_interval")]
    pub retry_interval_secs: u64,
    /// Name of the pre-stamp backup folder created inside the watched dir.
    #[serde(default = "default_backup_dir")]
    pub backup_dir_name: String,
    /// Name of the sent archive created next to the watched dir.
    #[serde(default = "default_sent_dir")]
    pub sent_dir_name: String,
    /// Render a live MM:SS countdown on the console between polls.
    #[serde(default)]
    pub show_countdown: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StampConfig {
    /// Reference page raster width in pixels (A4 at 300 DPI).
    #[serde(default = "default_reference_width")]
    pub reference_width_px: f64,
    /// Reference page raster height in pixels (A4 at 300 DPI).
    #[serde(default = "default_reference_height")]
    pub reference_height_px: f64,
    /// Stamp center, pixels from the left edge of the reference raster.
    #[serde(default = "default_center_x")]
    pub center_x_px: f64,
    /// Stamp center, pixels from the top edge of the reference raster.
    #[serde(default = "default_center_y")]
    pub center_y_px: f64,
    /// Ordered overlay rules; the first marker contained in a filename
    /// wins, and the final rule is the fallback when none match.
    #[serde(default)]
    pub overlays: Vec<OverlayRule>,
}

/// One outcome-tag to overlay-image binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlayRule {
    pub tag: String,
    /// Filename substring selecting this rule.
    pub marker: String,
    pub image: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageConfig {
    #[serde(default = "default_target_width")]
    pub target_width_pt: f64,
    #[serde(default = "default_target_height")]
    pub target_height_pt: f64,
}

/// One closed identifier interval mapped to a destination directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteRule {
    pub start: u32,
    pub end: u32,
    pub dest: PathBuf,
}

impl RouteRule {
    pub fn contains(&self, id: u32) -> bool {
        self.start <= id && id <= self.end
    }
}

fn default_poll_interval() -> u64 {
    600
}

fn default_retry_interval() -> u64 {
    10
}

fn default_backup_dir() -> String {
    "pre-stamp".to_string()
}

fn default_sent_dir() -> String {
    "sent".to_string()
}

fn default_reference_width() -> f64 {
    2481.0
}

fn default_reference_height() -> f64 {
    3508.0
}

fn default_center_x() -> f64 {
    2010.0
}

fn default_center_y() -> f64 {
    1035.0
}

fn default_target_width() -> f64 {
    595.0
}

fn default_target_height() -> f64 {
    842.0
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval(),
            retry_interval_secs: default_retry_interval(),
            backup_dir_name: default_backup_dir(),
            sent_dir_name: default_sent_dir(),
            show_countdown: false,
        }
    }
}

impl Default for StampConfig {
    fn default() -> Self {
        Self {
            reference_width_px: default_reference_width(),
            reference_height_px: default_reference_height(),
            center_x_px: default_center_x(),
            center_y_px: default_center_y(),
            overlays: Vec::new(),
        }
    }
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            target_width_pt: default_target_width(),
            target_height_pt: default_target_height(),
        }
    }
}

impl StampConfig {
    pub fn placement(&self) -> StampPlacement {
        StampPlacement {
            reference_width_px: self.reference_width_px,
            reference_height_px: self.reference_height_px,
            center_x_px: self.center_x_px,
            center_y_px: self.center_y_px,
        }
    }
}

impl PageConfig {
    pub fn target(&self) -> PageSize {
        PageSize::new(self.target_width_pt, self.target_height_pt)
    }
}

impl SealpostConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SpError::Config(format!("read {}: {e}", path.display())))?;
        let config: SealpostConfig =
            toml::from_str(&content).map_err(|e| SpError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject tables and targets the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.page.target().is_degenerate() {
            return Err(SpError::Config(format!(
                "degenerate target page size {}x{}",
                self.page.target_width_pt, self.page.target_height_pt
            )));
        }
        if self.stamp.overlays.is_empty() {
            return Err(SpError::Config("no overlay rules configured".into()));
        }
        for rule in &self.routing {
            if rule.start > rule.end {
                return Err(SpError::Config(format!(
                    "inverted routing range [{}, {}]",
                    rule.start, rule.end
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overlay(tag: &str, marker: &str) -> OverlayRule {
        OverlayRule {
            tag: tag.into(),
            marker: marker.into(),
            image: PathBuf::from(format!("{tag}.png")),
        }
    }

    #[test]
    fn test_defaults_match_deployment() {
        let config = SealpostConfig::default();
        assert_eq!(config.watch.poll_interval_secs, 600);
        assert_eq!(config.watch.retry_interval_secs, 10);
        assert_eq!(config.watch.backup_dir_name, "pre-stamp");
        assert_eq!(config.watch.sent_dir_name, "sent");
        assert_eq!(config.stamp.reference_width_px, 2481.0);
        assert_eq!(config.stamp.reference_height_px, 3508.0);
        assert_eq!(config.page.target(), PageSize::A4);
        assert!(config.routing.is_empty());
    }

    #[test]
    fn test_route_rule_contains_is_closed() {
        let rule = RouteRule {
            start: 1000,
            end: 2299,
            dest: PathBuf::from("a"),
        };
        assert!(rule.contains(1000));
        assert!(rule.contains(2299));
        assert!(!rule.contains(999));
        assert!(!rule.contains(2300));
    }

    #[test]
    fn test_toml_roundtrip() {
        let mut config = SealpostConfig::default();
        config.stamp.overlays = vec![overlay("pass", "passed"), overlay("fail", "")];
        config.routing = vec![RouteRule {
            start: 1000,
            end: 2299,
            dest: PathBuf::from("/out/a"),
        }];
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: SealpostConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed.routing, config.routing);
        assert_eq!(parsed.stamp.overlays, config.stamp.overlays);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let parsed: SealpostConfig = toml::from_str(
            r#"
            [watch]
            poll_interval_secs = 60
            "#,
        )
        .unwrap();
        assert_eq!(parsed.watch.poll_interval_secs, 60);
        assert_eq!(parsed.watch.retry_interval_secs, 10);
        assert_eq!(parsed.page.target(), PageSize::A4);
    }

    #[test]
    fn test_validate_rejects_inverted_range() {
        let mut config = SealpostConfig::default();
        config.stamp.overlays = vec![overlay("fail", "")];
        config.routing = vec![RouteRule {
            start: 2000,
            end: 1000,
            dest: PathBuf::from("a"),
        }];
        assert!(matches!(config.validate(), Err(SpError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_missing_overlays() {
        let config = SealpostConfig::default();
        assert!(matches!(config.validate(), Err(SpError::Config(_))));
    }

    #[test]
    fn test_load_missing_file_is_config_error() {
        let err = SealpostConfig::load(Path::new("/nonexistent/sealpost.toml")).unwrap_err();
        assert!(matches!(err, SpError::Config(_)));
    }
}
