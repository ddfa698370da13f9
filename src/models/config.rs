//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Upstream job board API settings
    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// Listing filter settings
    #[serde(default)]
    pub filter: FilterConfig,

    /// Keyword taxonomy and state file locations
    #[serde(default)]
    pub paths: PathsConfig,

    /// Client-credentials token exchange settings
    #[serde(default)]
    pub auth: AuthConfig,

    /// Digest delivery settings
    #[serde(default)]
    pub mail: MailConfig,

    /// Log output settings
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Display strings used when enriching listings and rendering the digest
    #[serde(default)]
    pub locale: LocaleConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Apply overrides from the process environment (after reading `.env`).
    pub fn apply_env(&mut self) -> Result<()> {
        let _ = dotenvy::dotenv();
        self.apply_env_with(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup.
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = var("SMTP_SERVER") {
            self.mail.smtp_server = v;
        }
        if let Some(v) = var("SMTP_PORT") {
            self.mail.smtp_port = v
                .trim()
                .parse()
                .map_err(|_| AppError::config(format!("SMTP_PORT is not a port: {v}")))?;
        }
        if let Some(v) = var("SMTP_LOGIN") {
            self.mail.smtp_login = v;
        }
        if let Some(v) = var("SMTP_PASSWORD") {
            self.mail.smtp_password = v;
        }
        if let Some(v) = var("SENDER_EMAIL") {
            self.mail.sender = v;
        }
        if let Some(v) = var("RECEIVER_EMAIL") {
            self.mail.receiver = v;
        }
        if let Some(v) = var("EMAIL_SUBJECT") {
            self.mail.subject = v;
        }
        if let Some(v) = var("LOGO_PATH") {
            self.mail.logo_path = Some(PathBuf::from(v));
        }
        if let Some(v) = var("ALLOWED_REGIONS") {
            self.filter.allowed_regions = parse_region_list(&v)?;
        }
        if let Some(v) = var("CLIENT_ID") {
            self.auth.client_id = Some(v);
        }
        if let Some(v) = var("CLIENT_SECRET") {
            self.auth.client_secret = Some(v);
        }
        if let Some(v) = var("TOKEN_ENDPOINT") {
            self.auth.token_endpoint = v;
        }
        Ok(())
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.upstream.user_agent.trim().is_empty() {
            return Err(AppError::validation("upstream.user_agent is empty"));
        }
        if self.upstream.timeout_secs == 0 {
            return Err(AppError::validation("upstream.timeout_secs must be > 0"));
        }
        if self.upstream.page_size == 0 {
            return Err(AppError::validation("upstream.page_size must be > 0"));
        }
        if self.upstream.max_pages == 0 {
            return Err(AppError::validation("upstream.max_pages must be > 0"));
        }
        if self.filter.allowed_regions.is_empty() {
            return Err(AppError::validation("filter.allowed_regions is empty"));
        }
        if self.locale.months.len() != 12 {
            return Err(AppError::validation(format!(
                "locale.months must list 12 names, found {}",
                self.locale.months.len()
            )));
        }
        Ok(())
    }
}

/// Parse a comma-separated list of region codes, e.g. `"41, 190,42"`.
pub fn parse_region_list(raw: &str) -> Result<Vec<i64>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<i64>()
                .map_err(|_| AppError::config(format!("Invalid region code '{s}'")))
        })
        .collect()
}

/// Upstream job board API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Scheme and host of the job board
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// Paginated listings endpoint
    #[serde(default = "defaults::listings_path")]
    pub listings_path: String,

    /// Concepts endpoint carrying the salary table
    #[serde(default = "defaults::concepts_path")]
    pub concepts_path: String,

    /// Flat region-code to region-name endpoint
    #[serde(default = "defaults::regions_path")]
    pub regions_path: String,

    /// Records requested per page
    #[serde(default = "defaults::page_size")]
    pub page_size: u32,

    /// Hard cap on pages fetched per run
    #[serde(default = "defaults::max_pages")]
    pub max_pages: u32,

    /// Per-request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::base_url(),
            listings_path: defaults::listings_path(),
            concepts_path: defaults::concepts_path(),
            regions_path: defaults::regions_path(),
            page_size: defaults::page_size(),
            max_pages: defaults::max_pages(),
            timeout_secs: defaults::timeout(),
            user_agent: defaults::user_agent(),
        }
    }
}

/// Listing filter settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Region codes a listing must belong to
    #[serde(default = "defaults::allowed_regions")]
    pub allowed_regions: Vec<i64>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            allowed_regions: defaults::allowed_regions(),
        }
    }
}

/// File locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// JSON document mapping category names to keyword lists
    #[serde(default = "defaults::keywords_file")]
    pub keywords_file: PathBuf,

    /// JSON array of already-notified listing ids
    #[serde(default = "defaults::seen_ids_file")]
    pub seen_ids_file: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            keywords_file: defaults::keywords_file(),
            seen_ids_file: defaults::seen_ids_file(),
        }
    }
}

/// Client-credentials token exchange settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "defaults::token_endpoint")]
    pub token_endpoint: String,

    #[serde(default)]
    pub client_id: Option<String>,

    #[serde(default)]
    pub client_secret: Option<String>,

    #[serde(default = "defaults::scope")]
    pub scope: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_endpoint: defaults::token_endpoint(),
            client_id: None,
            client_secret: None,
            scope: defaults::scope(),
        }
    }
}

/// Digest delivery settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    /// SMTP relay host
    #[serde(default)]
    pub smtp_server: String,

    /// SMTP submission port (STARTTLS)
    #[serde(default = "defaults::smtp_port")]
    pub smtp_port: u16,

    #[serde(default)]
    pub smtp_login: String,

    #[serde(default)]
    pub smtp_password: String,

    /// From address
    #[serde(default)]
    pub sender: String,

    /// To address
    #[serde(default)]
    pub receiver: String,

    #[serde(default = "defaults::subject")]
    pub subject: String,

    /// Image embedded at the top of the digest, if any
    #[serde(default)]
    pub logo_path: Option<PathBuf>,

    /// Base URL of the "Apply" button
    #[serde(default = "defaults::apply_url")]
    pub apply_url: String,
}

impl MailConfig {
    /// Check that everything needed to send a digest is present.
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("mail.smtp_server", &self.smtp_server),
            ("mail.smtp_login", &self.smtp_login),
            ("mail.smtp_password", &self.smtp_password),
            ("mail.sender", &self.sender),
            ("mail.receiver", &self.receiver),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(AppError::validation(format!("{name} is not set")));
            }
        }
        if self.smtp_port == 0 {
            return Err(AppError::validation("mail.smtp_port must be > 0"));
        }
        Ok(())
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            smtp_server: String::new(),
            smtp_port: defaults::smtp_port(),
            smtp_login: String::new(),
            smtp_password: String::new(),
            sender: String::new(),
            receiver: String::new(),
            subject: defaults::subject(),
            logo_path: None,
            apply_url: defaults::apply_url(),
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Minimum level: debug, info, warn, error
    #[serde(default = "defaults::log_level")]
    pub level: String,

    /// Append log lines to this file instead of stderr
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
            file: None,
        }
    }
}

/// Display strings for enrichment and digest rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocaleConfig {
    /// Sentinel for absent free-text fields
    #[serde(default = "defaults::not_specified")]
    pub not_specified: String,

    /// Region name when the code has no mapping
    #[serde(default = "defaults::unknown_region")]
    pub unknown_region: String,

    /// Salary text for a salary code listed without a description
    #[serde(default = "defaults::salary_range_unspecified")]
    pub salary_range_unspecified: String,

    #[serde(default = "defaults::slot_singular")]
    pub slot_singular: String,

    #[serde(default = "defaults::slot_plural")]
    pub slot_plural: String,

    /// Month names, January first
    #[serde(default = "defaults::months")]
    pub months: Vec<String>,

    #[serde(default)]
    pub digest: DigestLocale,
}

impl LocaleConfig {
    /// Month name for a 1-based month number, or `""` if out of range.
    pub fn month_name(&self, month: u32) -> &str {
        month
            .checked_sub(1)
            .and_then(|i| self.months.get(i as usize))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Render a slot count: `1 Slot available`, `3 Slots available`.
    pub fn quantity_text(&self, quantity: Option<i64>) -> String {
        match quantity {
            Some(1) => format!("1 {}", self.slot_singular),
            Some(n) => format!("{} {}", n, self.slot_plural),
            None => self.not_specified.clone(),
        }
    }
}

impl Default for LocaleConfig {
    fn default() -> Self {
        Self {
            not_specified: defaults::not_specified(),
            unknown_region: defaults::unknown_region(),
            salary_range_unspecified: defaults::salary_range_unspecified(),
            slot_singular: defaults::slot_singular(),
            slot_plural: defaults::slot_plural(),
            months: defaults::months(),
            digest: DigestLocale::default(),
        }
    }
}

/// Labels and prose of the email digest.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DigestLocale {
    pub heading: String,
    pub greeting: String,
    pub intro: String,
    pub label_title: String,
    pub label_description: String,
    pub label_benefits: String,
    pub label_requirements: String,
    pub label_salary: String,
    pub label_quantity: String,
    pub label_expiration: String,
    pub label_region: String,
    pub apply: String,
    pub sign_off: String,
    pub team: String,
    pub footer: String,
}

impl Default for DigestLocale {
    fn default() -> Self {
        Self {
            heading: "JobWatch".into(),
            greeting: "Hello,".into(),
            intro: "Here are the job opportunities we found:".into(),
            label_title: "Title:".into(),
            label_description: "Description:".into(),
            label_benefits: "Benefits:".into(),
            label_requirements: "Requirements:".into(),
            label_salary: "Salary:".into(),
            label_quantity: "Quantity:".into(),
            label_expiration: "Expiration date:".into(),
            label_region: "Region:".into(),
            apply: "Apply".into(),
            sign_off: "Best regards,".into(),
            team: "The JobWatch team".into(),
            footer: "You are receiving this digest because you subscribed to job alerts.".into(),
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    // Upstream defaults
    pub fn base_url() -> String {
        "https://empleateya.mt.gob.do".into()
    }
    pub fn listings_path() -> String {
        "/api/puestos".into()
    }
    pub fn concepts_path() -> String {
        "/api/conceptos".into()
    }
    pub fn regions_path() -> String {
        "/api/conceptos/regionesFlat".into()
    }
    pub fn page_size() -> u32 {
        6
    }
    pub fn max_pages() -> u32 {
        200
    }
    pub fn timeout() -> u64 {
        15
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; jobwatch/0.1)".into()
    }

    // Filter defaults
    pub fn allowed_regions() -> Vec<i64> {
        vec![41, 190, 42]
    }

    // Path defaults
    pub fn keywords_file() -> PathBuf {
        PathBuf::from("json/keywords.json")
    }
    pub fn seen_ids_file() -> PathBuf {
        PathBuf::from("json/processed_jobs.json")
    }

    // Auth defaults
    pub fn token_endpoint() -> String {
        "https://empleateya.mt.gob.do/idp/connect/token".into()
    }
    pub fn scope() -> String {
        "squidex-api".into()
    }

    // Mail defaults
    pub fn smtp_port() -> u16 {
        587
    }
    pub fn subject() -> String {
        "New job listings".into()
    }
    pub fn apply_url() -> String {
        "https://empleateya.mt.gob.do/web/candidatos/puestos".into()
    }

    // Logging defaults
    pub fn log_level() -> String {
        "info".into()
    }

    // Locale defaults
    pub fn not_specified() -> String {
        "not specified".into()
    }
    pub fn unknown_region() -> String {
        "Unknown".into()
    }
    pub fn salary_range_unspecified() -> String {
        "Range not specified".into()
    }
    pub fn slot_singular() -> String {
        "Slot available".into()
    }
    pub fn slot_plural() -> String {
        "Slots available".into()
    }
    pub fn months() -> Vec<String> {
        [
            "January",
            "February",
            "March",
            "April",
            "May",
            "June",
            "July",
            "August",
            "September",
            "October",
            "November",
            "December",
        ]
        .iter()
        .map(|m| m.to_string())
        .collect()
    }
}
