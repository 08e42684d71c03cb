//! Configuration loading and validation.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid skip pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// HTTP client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// User agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("tracwiki-export/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

/// Excludes every path under `prefix` except the exact path `allowed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkipException {
    pub prefix: String,
    pub allowed: String,
}

/// Pages that are never fetched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkipConfig {
    /// Regular expressions tested against the raw page path
    #[serde(default = "default_skip_patterns")]
    pub patterns: Vec<String>,

    #[serde(default = "default_skip_exceptions")]
    pub exceptions: Vec<SkipException>,
}

fn default_skip_patterns() -> Vec<String> {
    vec!["^/wiki/Trac".to_string(), "^/wiki/SandBox$".to_string()]
}

fn default_skip_exceptions() -> Vec<SkipException> {
    vec![SkipException {
        prefix: "/wiki/Wiki".to_string(),
        allowed: "/wiki/WikiStart".to_string(),
    }]
}

impl Default for SkipConfig {
    fn default() -> Self {
        Self {
            patterns: default_skip_patterns(),
            exceptions: default_skip_exceptions(),
        }
    }
}

/// A stylesheet that always needs a sibling fetched alongside it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanionStylesheet {
    /// File name the linked stylesheet ends with
    pub linked: String,
    /// File name substituted to form the companion reference
    pub companion: String,
}

impl Default for CompanionStylesheet {
    fn default() -> Self {
        Self {
            linked: "wiki.css".to_string(),
            companion: "code.css".to_string(),
        }
    }
}

/// Site-skin specific sanitizer settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SanitizeConfig {
    /// External scripts removed by `src` suffix
    #[serde(default = "default_blocked_scripts")]
    pub blocked_script_suffixes: Vec<String>,

    /// Logo path as served by the wiki's chrome handler
    #[serde(default = "default_logo_source")]
    pub logo_source: String,

    /// Static path the logo is stored and linked under
    #[serde(default = "default_logo_path")]
    pub logo_path: String,

    /// Markup replacing the wiki footer on every page
    #[serde(default = "default_footer_html")]
    pub footer_html: String,

    #[serde(default)]
    pub companion_stylesheet: CompanionStylesheet,
}

fn default_blocked_scripts() -> Vec<String> {
    vec![
        "/site/js/babel.js".to_string(),
        "/site/js/search.js".to_string(),
    ]
}

fn default_logo_source() -> String {
    "/chrome/site/logo.png".to_string()
}

fn default_logo_path() -> String {
    "/site/logo.png".to_string()
}

fn default_footer_html() -> String {
    concat!(
        "<footer id=\"footer\">",
        "<hr>",
        "<p class=\"license\">Content on this site is licensed under a ",
        "<a href=\"https://creativecommons.org/licenses/by-sa/4.0/\">",
        "Creative Commons Attribution-ShareAlike 4.0</a> license.</p>",
        "<nav><a href=\"/\">Home</a> | <a href=\"/wiki/TitleIndex\">Index</a></nav>",
        "</footer>"
    )
    .to_string()
}

impl Default for SanitizeConfig {
    fn default() -> Self {
        Self {
            blocked_script_suffixes: default_blocked_scripts(),
            logo_source: default_logo_source(),
            logo_path: default_logo_path(),
            footer_html: default_footer_html(),
            companion_stylesheet: CompanionStylesheet::default(),
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MirrorConfig {
    /// Root of the static site tree
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Path of the wiki's title index page
    #[serde(default = "default_index_path")]
    pub index_path: String,

    /// Namespace prefix of wiki pages, dropped by `--wiki`
    #[serde(default = "default_wiki_prefix")]
    pub wiki_prefix: String,

    /// Minimum interval between page fetches
    #[serde(default = "default_page_delay")]
    pub page_delay_ms: u64,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub http: HttpConfig,

    #[serde(default)]
    pub skip: SkipConfig,

    #[serde(default)]
    pub sanitize: SanitizeConfig,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./public")
}

fn default_index_path() -> String {
    "/wiki/TitleIndex".to_string()
}

fn default_wiki_prefix() -> String {
    "/wiki".to_string()
}

fn default_page_delay() -> u64 {
    1000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            index_path: default_index_path(),
            wiki_prefix: default_wiki_prefix(),
            page_delay_ms: default_page_delay(),
            log_level: default_log_level(),
            http: HttpConfig::default(),
            skip: SkipConfig::default(),
            sanitize: SanitizeConfig::default(),
        }
    }
}

impl MirrorConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: MirrorConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if it exists, falling back to defaults otherwise.
    pub fn from_file_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.output_dir.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(
                "output_dir must not be empty".to_string(),
            ));
        }

        for (name, value) in [
            ("index_path", &self.index_path),
            ("wiki_prefix", &self.wiki_prefix),
        ] {
            if !value.starts_with('/') {
                return Err(ConfigError::ValidationError(format!(
                    "{} must start with '/': {}",
                    name, value
                )));
            }
        }

        if self.http.timeout_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "HTTP timeout must be greater than 0".to_string(),
            ));
        }

        for pattern in &self.skip.patterns {
            Regex::new(pattern).map_err(|source| ConfigError::InvalidPattern {
                pattern: pattern.clone(),
                source,
            })?;
        }

        Ok(())
    }
}
