// src/models/config.rs

//! Application configuration structures.
//!
//! A [`SourceProfile`] describes one institution-specific scraper variant
//! as plain data: listing URL shape, detail-link pattern and the natural
//! keys the reconciler resolves against. Adding a source means adding a
//! profile, not a subclass.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::schedule::{CourseLevel, Semester};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP and pacing behavior settings
    #[serde(default)]
    pub scraper: ScraperConfig,

    /// Relational store settings
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Per-source scraper profiles
    #[serde(default = "defaults::sources")]
    pub sources: Vec<SourceProfile>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.scraper.user_agent.trim().is_empty() {
            return Err(AppError::validation("scraper.user_agent is empty"));
        }
        if self.scraper.timeout_secs == 0 {
            return Err(AppError::validation("scraper.timeout_secs must be > 0"));
        }
        if self.database.url.trim().is_empty() {
            return Err(AppError::validation("database.url is empty"));
        }
        if self.sources.is_empty() {
            return Err(AppError::validation("no sources defined"));
        }
        for source in &self.sources {
            source.validate()?;
        }
        Ok(())
    }

    /// Find the source profile for an institution pair.
    ///
    /// `university` matches the university short name; `faculty`, when
    /// given, additionally matches the faculty short name. Matching is
    /// case-insensitive.
    pub fn find_source(&self, university: &str, faculty: Option<&str>) -> Option<&SourceProfile> {
        self.sources.iter().find(|s| {
            s.university.short_name.eq_ignore_ascii_case(university)
                && faculty.is_none_or(|f| s.faculty.short_name.eq_ignore_ascii_case(f))
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scraper: ScraperConfig::default(),
            database: DatabaseConfig::default(),
            sources: defaults::sources(),
        }
    }
}

/// HTTP client and pacing behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Delay between program requests in milliseconds
    #[serde(default = "defaults::request_delay")]
    pub request_delay_ms: u64,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            request_delay_ms: defaults::request_delay(),
        }
    }
}

/// Relational store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// sqlx connection URL
    #[serde(default = "defaults::database_url")]
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: defaults::database_url(),
        }
    }
}

/// One institution-specific scraper variant, described as data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceProfile {
    /// Source identifier recorded on scraping jobs (e.g., "uk-ff")
    pub id: String,

    /// Base URL of the timetable site, without trailing slash
    pub base_url: String,

    /// Number of listing pages to walk
    #[serde(default = "defaults::listing_pages")]
    pub listing_pages: u32,

    /// Path fragment identifying program detail links (e.g., "/ft/detail/")
    pub detail_path: String,

    /// Path fragment for the XLS export of a program
    pub export_path: String,

    /// University natural key and display data
    pub university: InstitutionInfo,

    /// Faculty natural key and display data
    pub faculty: InstitutionInfo,

    /// The single building rooms are attached to for this source
    pub building: BuildingInfo,

    /// Attribute defaults for synthesized courses
    #[serde(default)]
    pub course_defaults: CourseDefaults,
}

impl SourceProfile {
    /// Listing URL for a 1-based page index.
    ///
    /// Page 1 is the bare base URL; later pages use the `?page=N` query.
    pub fn listing_url(&self, page: u32) -> String {
        if page <= 1 {
            format!("{}/", self.base_url)
        } else {
            format!("{}/?page={}", self.base_url, page)
        }
    }

    /// Canonical detail URL for a program id.
    pub fn detail_url(&self, program_id: &str) -> String {
        format!("{}{}{}", self.base_url, self.detail_path, program_id)
    }

    /// Canonical export URL for a program id.
    pub fn export_url(&self, program_id: &str) -> String {
        format!("{}{}{}", self.base_url, self.export_path, program_id)
    }

    /// Course code synthesized for a program id.
    pub fn course_code(&self, program_id: &str) -> String {
        format!(
            "{}-{}-{}",
            self.university.short_name, self.faculty.short_name, program_id
        )
    }

    fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(AppError::validation("source.id is empty"));
        }
        url::Url::parse(&self.base_url)
            .map_err(|e| AppError::validation(format!("source {}: bad base_url: {e}", self.id)))?;
        if self.listing_pages == 0 {
            return Err(AppError::validation(format!(
                "source {}: listing_pages must be > 0",
                self.id
            )));
        }
        if self.detail_path.trim().is_empty() {
            return Err(AppError::validation(format!(
                "source {}: detail_path is empty",
                self.id
            )));
        }
        if self.university.short_name.trim().is_empty() {
            return Err(AppError::validation(format!(
                "source {}: university.short_name is empty",
                self.id
            )));
        }
        if self.faculty.short_name.trim().is_empty() {
            return Err(AppError::validation(format!(
                "source {}: faculty.short_name is empty",
                self.id
            )));
        }
        if self.course_defaults.credits == 0 {
            return Err(AppError::validation(format!(
                "source {}: course_defaults.credits must be > 0",
                self.id
            )));
        }
        Ok(())
    }
}

/// Natural key and display data for a university or faculty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstitutionInfo {
    /// Unique short name (natural key, e.g., "UK", "FF")
    pub short_name: String,

    /// Display name
    pub name: String,

    /// Optional website URL
    #[serde(default)]
    pub website: Option<String>,
}

/// The building rooms are resolved against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildingInfo {
    /// Building name (natural key in the observed source data)
    pub name: String,

    /// Street address
    pub address: String,
}

/// Attribute defaults for courses synthesized from programs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseDefaults {
    #[serde(default = "defaults::credits")]
    pub credits: u32,

    #[serde(default)]
    pub semester: Semester,

    #[serde(default)]
    pub level: CourseLevel,
}

impl Default for CourseDefaults {
    fn default() -> Self {
        Self {
            credits: defaults::credits(),
            semester: Semester::default(),
            level: CourseLevel::default(),
        }
    }
}

mod defaults {
    use super::{BuildingInfo, CourseDefaults, InstitutionInfo, SourceProfile};

    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; rozvrh-scraper/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn request_delay() -> u64 {
        1000
    }
    pub fn database_url() -> String {
        "sqlite:data/schedule.db?mode=rwc".into()
    }
    pub fn listing_pages() -> u32 {
        4
    }
    pub fn credits() -> u32 {
        5
    }

    pub fn sources() -> Vec<SourceProfile> {
        vec![SourceProfile {
            id: "uk-ff".to_string(),
            base_url: "https://rozvrhy.ff.cuni.cz".to_string(),
            listing_pages: listing_pages(),
            detail_path: "/ft/detail/".to_string(),
            export_path: "/export/xls/".to_string(),
            university: InstitutionInfo {
                short_name: "UK".to_string(),
                name: "Univerzita Karlova".to_string(),
                website: Some("https://cuni.cz".to_string()),
            },
            faculty: InstitutionInfo {
                short_name: "FF".to_string(),
                name: "Filozofická fakulta".to_string(),
                website: None,
            },
            building: BuildingInfo {
                name: "Hlavní budova FF UK".to_string(),
                address: "náměstí Jana Palacha 1/2, Praha 1".to_string(),
            },
            course_defaults: CourseDefaults::default(),
        }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_default_config_ok() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_user_agent() {
        let mut config = Config::default();
        config.scraper.user_agent = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_bad_base_url() {
        let mut config = Config::default();
        config.sources[0].base_url = "not a url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn find_source_matches_case_insensitive() {
        let config = Config::default();
        assert!(config.find_source("uk", Some("ff")).is_some());
        assert!(config.find_source("UK", None).is_some());
        assert!(config.find_source("UK", Some("PedF")).is_none());
        assert!(config.find_source("MUNI", None).is_none());
    }

    #[test]
    fn listing_url_shape() {
        let source = &Config::default().sources[0];
        assert_eq!(source.listing_url(1), "https://rozvrhy.ff.cuni.cz/");
        assert_eq!(source.listing_url(3), "https://rozvrhy.ff.cuni.cz/?page=3");
    }

    #[test]
    fn course_code_synthesis() {
        let source = &Config::default().sources[0];
        assert_eq!(source.course_code("123"), "UK-FF-123");
        assert_eq!(
            source.detail_url("123"),
            "https://rozvrhy.ff.cuni.cz/ft/detail/123"
        );
        assert_eq!(
            source.export_url("123"),
            "https://rozvrhy.ff.cuni.cz/export/xls/123"
        );
    }
}
