//! Environment configuration
//!
//! Reads (after `.env`, if present):
//! - `STOREFRONT_URL`, `STOREFRONT_HANDLE`, `STOREFRONT_LISTING`
//! - `CHROME_PATH`, `CHROME_HEADLESS`, `VISIBLE_TIMEOUT_SECS`
//! - `BIND_ADDR`

use once_cell::sync::Lazy;
use std::path::PathBuf;
use std::time::Duration;

use crate::crawler::Storefront;
use crate::session::ChromeLauncher;

/// Global configuration, read from the environment on first use
pub static CONFIG: Lazy<Config> = Lazy::new(|| {
    dotenv::dotenv().ok();
    Config::from_lookup(|key| std::env::var(key).ok())
});

#[derive(Debug, Clone)]
pub struct Config {
    pub storefront: Storefront,
    pub chrome: ChromeLauncher,
    pub bind_addr: String,
}

impl Config {
    /// Build from any key lookup; unset or unparsable values fall back to defaults
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Storefront::default();
        let storefront = Storefront {
            base_url: lookup("STOREFRONT_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or(defaults.base_url),
            handle: lookup("STOREFRONT_HANDLE").unwrap_or(defaults.handle),
            listing: lookup("STOREFRONT_LISTING").unwrap_or(defaults.listing),
        };

        let mut chrome = ChromeLauncher::default();
        if let Some(path) = lookup("CHROME_PATH").filter(|p| !p.is_empty()) {
            chrome.executable = Some(PathBuf::from(path));
        }
        if let Some(headless) = lookup("CHROME_HEADLESS").and_then(|s| parse_bool(&s)) {
            chrome.headless = headless;
        }
        if let Some(secs) = lookup("VISIBLE_TIMEOUT_SECS").and_then(|s| s.parse().ok()) {
            chrome.visible_timeout = Duration::from_secs(secs);
        }

        let bind_addr = lookup("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string());

        Self {
            storefront,
            chrome,
            bind_addr,
        }
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
