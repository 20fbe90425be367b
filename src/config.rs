use crate::constants::is_severity_class;
use crate::error::{ReportError, Result};
use chrono::Weekday;
use serde::Deserialize;
use std::fs;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub feed: FeedConfig,
    pub report: ReportConfig,
    pub render: RenderConfig,
    pub publish: PublishConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    pub endpoint: String,
    pub county: String,
    pub start_year: i32,
    pub severity_classes: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
    /// Target municipality, matched case-sensitively against feed records.
    pub municipality: String,
    pub week_start: WeekStart,
    /// Platform character ceiling for the composed text.
    pub text_limit: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RenderConfig {
    pub template_path: String,
    pub font_path: String,
    pub font_scale: f32,
    /// RGB of the overlaid text.
    pub text_color: [u8; 3],
    /// Top-left anchor of the first overlaid line, in pixels.
    pub anchor: [i32; 2],
    /// Vertical distance between overlaid lines, in pixels.
    pub line_height: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PublishConfig {
    pub endpoint: String,
    /// Where dry runs and previews write the composed artifact.
    pub output_dir: String,
}

/// First day of the calendar week used for reporting windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekStart {
    Sunday,
    Monday,
}

impl WeekStart {
    pub fn weekday(self) -> Weekday {
        match self {
            Self::Sunday => Weekday::Sun,
            Self::Monday => Weekday::Mon,
        }
    }
}

impl Config {
    pub fn load(config_path: &str) -> Result<Self> {
        let config_content = fs::read_to_string(config_path).map_err(|e| {
            ReportError::Config(format!("Failed to read config file '{config_path}': {e}"))
        })?;

        let config: Config = toml::from_str(&config_content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.feed.severity_classes.is_empty() {
            return Err(ReportError::Config(
                "feed.severity_classes must name at least one class".to_string(),
            ));
        }
        for class in &self.feed.severity_classes {
            if !is_severity_class(class) {
                return Err(ReportError::Config(format!(
                    "unknown severity class '{class}' (expected one of K/A/B/O)"
                )));
            }
        }
        if self.report.municipality.is_empty() {
            return Err(ReportError::Config(
                "report.municipality must not be empty".to_string(),
            ));
        }
        if self.report.text_limit == 0 {
            return Err(ReportError::Config(
                "report.text_limit must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
