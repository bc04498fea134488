use serde::{Deserialize, Serialize};

use crate::sheets::Sheet;

const MAX_READ_RETRIES: u32 = 5;

/// Main configuration structure loaded from celebration_rsvp.toml and environment variables
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub site: SiteConfig,
    /// Runtime configuration loaded from environment variables
    #[serde(skip)]
    pub runtime: RuntimeConfig,
}

/// Spreadsheet proxy endpoints, one script deployment per sheet
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    pub guests_url: String,
    pub messages_url: String,
    pub guest_requests_url: String,
    pub entourage_url: String,
    pub principal_sponsor_url: String,
    pub timeout_ms: u64,
    pub read_retries: u32,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            guests_url: String::new(),
            messages_url: String::new(),
            guest_requests_url: String::new(),
            entourage_url: String::new(),
            principal_sponsor_url: String::new(),
            timeout_ms: 10_000,
            read_retries: 1,
        }
    }
}

impl UpstreamConfig {
    /// Endpoint for a sheet, or `None` when left blank.
    pub fn endpoint(&self, sheet: Sheet) -> Option<&str> {
        let url = match sheet {
            Sheet::Guests => &self.guests_url,
            Sheet::Messages => &self.messages_url,
            Sheet::GuestRequests => &self.guest_requests_url,
            Sheet::Entourage => &self.entourage_url,
            Sheet::PrincipalSponsors => &self.principal_sponsor_url,
        };
        let url = url.trim();
        (!url.is_empty()).then_some(url)
    }

    /// Apply `RSVP_*` overrides through `lookup` (normally `std::env::var`).
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let urls: [(&str, &mut String); 5] = [
            ("RSVP_GUESTS_URL", &mut self.guests_url),
            ("RSVP_MESSAGES_URL", &mut self.messages_url),
            ("RSVP_GUEST_REQUESTS_URL", &mut self.guest_requests_url),
            ("RSVP_ENTOURAGE_URL", &mut self.entourage_url),
            ("RSVP_PRINCIPAL_SPONSOR_URL", &mut self.principal_sponsor_url),
        ];
        for (key, slot) in urls {
            if let Some(v) = lookup(key) {
                tracing::debug!("{key} env override applied");
                *slot = v;
            }
        }
        if let Some(ms) = lookup("RSVP_UPSTREAM_TIMEOUT_MS").and_then(|v| v.parse().ok()) {
            self.timeout_ms = ms;
        }
        if let Some(n) = lookup("RSVP_UPSTREAM_READ_RETRIES").and_then(|v| v.parse().ok()) {
            self.read_retries = n;
        }
    }

    /// Clamps out-of-range values. Returns the warnings it logged.
    fn validate(&mut self) -> Vec<String> {
        let mut warnings = Vec::new();
        for sheet in Sheet::ALL {
            match self.endpoint(sheet) {
                None => warnings.push(format!("No endpoint configured for the {sheet} sheet")),
                Some(url) if !url.starts_with("http://") && !url.starts_with("https://") => {
                    warnings.push(format!(
                        "Endpoint '{}' for the {sheet} sheet is not an http(s) URL",
                        redact_url(url)
                    ));
                }
                Some(_) => {}
            }
        }
        if self.read_retries > MAX_READ_RETRIES {
            warnings.push(format!(
                "read_retries {} exceeds max {MAX_READ_RETRIES}, clamping",
                self.read_retries
            ));
            self.read_retries = MAX_READ_RETRIES;
        }
        if self.timeout_ms == 0 {
            warnings.push(format!(
                "timeout_ms 0 is invalid, using {}",
                UpstreamConfig::default().timeout_ms
            ));
            self.timeout_ms = UpstreamConfig::default().timeout_ms;
        }
        for warning in &warnings {
            tracing::warn!("{warning}");
        }
        warnings
    }
}

/// Event content shown across the site
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SiteConfig {
    pub title: String,
    pub celebrants: Vec<String>,
    pub event_date: String,
    pub event_time: String,
    pub venue: String,
    pub venue_address: String,
    pub rsvp_deadline: String,
    pub dress_code: String,
}

/// Runtime configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub http_bind: std::net::SocketAddr,
    pub admin_passcode: Option<String>,
    pub session_ttl_min: i64,
    pub allowed_origin: Option<String>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            http_bind: std::net::SocketAddr::from(([127, 0, 0, 1], 3000)),
            admin_passcode: None,
            session_ttl_min: 120,
            allowed_origin: None,
        }
    }
}

impl RuntimeConfig {
    /// Load runtime configuration from environment variables
    pub fn load_from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut cfg = Self::default();
        if let Some(v) = lookup("RSVP_HTTP_BIND") {
            match v.parse::<std::net::SocketAddr>() {
                Ok(bind) => cfg.http_bind = bind,
                Err(e) => tracing::warn!("Invalid RSVP_HTTP_BIND '{v}': {e}"),
            }
        }
        cfg.admin_passcode = lookup("RSVP_ADMIN_PASSCODE").filter(|p| !p.trim().is_empty());
        if let Some(ttl) = lookup("RSVP_SESSION_TTL_MIN")
            .and_then(|v| v.parse::<i64>().ok())
            .filter(|ttl| *ttl > 0)
        {
            cfg.session_ttl_min = ttl;
        }
        cfg.allowed_origin = lookup("RSVP_ALLOWED_ORIGIN").filter(|o| !o.trim().is_empty());
        cfg
    }
}

/// Scheme and host of an endpoint; script URLs carry deployment ids in the
/// path that should not be echoed back.
pub fn redact_url(url: &str) -> String {
    match url.split_once("://") {
        Some((scheme, rest)) => {
            let host = rest.split('/').next().unwrap_or_default();
            format!("{scheme}://{host}")
        }
        None => "(invalid)".to_string(),
    }
}

impl Config {
    /// Load configuration from TOML file and environment variables
    /// Uses CELEBRATION_RSVP_CONFIG environment variable or defaults to "celebration_rsvp.toml"
    pub fn load() -> anyhow::Result<Self> {
        if let Ok(env_path) = std::env::var("RSVP_ENV_FILE") {
            let _ = dotenvy::from_path(env_path);
        } else {
            let _ = dotenvy::from_path(".env");
        }

        let config_path = std::env::var("CELEBRATION_RSVP_CONFIG")
            .unwrap_or_else(|_| "celebration_rsvp.toml".to_string());

        let mut config: Config = if let Ok(content) = std::fs::read_to_string(&config_path) {
            toml::from_str(&content)?
        } else {
            tracing::warn!("Config file {} not found, using defaults", config_path);
            Self::default()
        };

        config
            .upstream
            .apply_overrides(|key| std::env::var(key).ok());
        config.runtime = RuntimeConfig::load_from_env();
        config.upstream.validate();

        Ok(config)
    }

    /// Human-readable summary with secrets redacted, for `check-config`.
    pub fn describe(&self) -> String {
        let mut out = String::new();
        for sheet in Sheet::ALL {
            out.push_str(&format!(
                "{:<20} {}\n",
                sheet.as_str(),
                self.upstream
                    .endpoint(sheet)
                    .map(redact_url)
                    .unwrap_or_else(|| "(not configured)".to_string())
            ));
        }
        out.push_str(&format!(
            "{:<20} {}ms, {} read retries\n",
            "upstream",
            self.upstream.timeout_ms,
            self.upstream.read_retries
        ));
        out.push_str(&format!("{:<20} {}\n", "http bind", self.runtime.http_bind));
        out.push_str(&format!(
            "{:<20} {}\n",
            "admin passcode",
            if self.runtime.admin_passcode.is_some() {
                "set"
            } else {
                "unset (dashboard disabled)"
            }
        ));
        out.push_str(&format!(
            "{:<20} {} min\n",
            "session ttl", self.runtime.session_ttl_min
        ));
        out
    }
}
