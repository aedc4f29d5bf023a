//! Configuration module for the tcli client.
//!
//! This module contains the runtime settings shared by every command and the
//! environment variable handling that can override them.

use log::{debug, info, warn};
use std::env;
use std::path::PathBuf;

/// Default Twitter API host.
pub const DEFAULT_API_URL: &str = "https://api.twitter.com";
/// Service that echoes the caller's public IP address.
pub const DEFAULT_IP_LOOKUP_URL: &str = "http://checkip.dyndns.org/";
/// Service that maps an IP address to coordinates.
pub const DEFAULT_GEO_LOOKUP_URL: &str = "http://www.geoplugin.net/xml.gp";
/// Terminal width used for column listings when `COLUMNS` is unset.
pub const DEFAULT_TERMINAL_WIDTH: usize = 80;
/// Credential file name inside the home directory.
pub const DEFAULT_PROFILE_FILE: &str = ".trc";

/// Settings for a single command invocation.
///
/// Everything a command needs to know about its environment is carried here
/// explicitly; nothing is read from process-wide state once the settings are built.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Path of the YAML credential file
    pub profile_path: PathBuf,
    /// Suppress browser-opening side effects
    pub dry_run: bool,
    /// Attach the caller's coordinates to posted statuses
    pub location: bool,
    /// Base URL of the REST API (no trailing slash)
    pub api_url: String,
    /// URL of the public-IP echo service
    pub ip_lookup_url: String,
    /// URL of the IP-to-coordinates service
    pub geo_lookup_url: String,
    /// Width available for column listings
    pub terminal_width: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            profile_path: default_profile_path(),
            dry_run: false,
            location: false,
            api_url: DEFAULT_API_URL.to_string(),
            ip_lookup_url: DEFAULT_IP_LOOKUP_URL.to_string(),
            geo_lookup_url: DEFAULT_GEO_LOOKUP_URL.to_string(),
            terminal_width: DEFAULT_TERMINAL_WIDTH,
        }
    }
}

impl Settings {
    /// Creates settings from defaults, then applies environment overrides.
    ///
    /// # Optional Environment Variables
    ///
    /// - `TCLI_API_URL`: alternate API host (e.g. a local proxy)
    /// - `COLUMNS`: terminal width for column listings
    pub fn from_env() -> Self {
        info!("Loading client settings from environment variables");
        let mut settings = Settings::default();

        match env::var("TCLI_API_URL") {
            Ok(url) if !url.trim().is_empty() => {
                info!("Found TCLI_API_URL environment variable: {}", url);
                settings.api_url = url.trim().trim_end_matches('/').to_string();
            }
            _ => debug!("No TCLI_API_URL set, using {}", DEFAULT_API_URL),
        }

        settings.terminal_width = parse_terminal_width(env::var("COLUMNS").ok().as_deref());
        debug!("Terminal width: {}", settings.terminal_width);

        settings
    }

    /// Overrides the credential file path.
    pub fn with_profile_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.profile_path = path.into();
        self
    }
}

/// Returns `~/.trc`, falling back to the working directory when no home exists.
pub fn default_profile_path() -> PathBuf {
    match dirs::home_dir() {
        Some(home) => home.join(DEFAULT_PROFILE_FILE),
        None => {
            warn!("Could not determine home directory, using ./{}", DEFAULT_PROFILE_FILE);
            PathBuf::from(DEFAULT_PROFILE_FILE)
        }
    }
}

/// Parses a `COLUMNS` value, defaulting to 80 when missing or unusable.
pub fn parse_terminal_width(value: Option<&str>) -> usize {
    match value.map(str::trim).map(str::parse::<usize>) {
        Some(Ok(width)) if width > 0 => width,
        Some(_) => {
            warn!("Ignoring invalid COLUMNS value, using {}", DEFAULT_TERMINAL_WIDTH);
            DEFAULT_TERMINAL_WIDTH
        }
        None => DEFAULT_TERMINAL_WIDTH,
    }
}

/// Masks a secret for logging, keeping at most 8 leading characters.
pub fn mask_secret(secret: &str) -> String {
    let prefix: String = secret.chars().take(8).collect();
    if secret.chars().count() > 16 {
        let suffix: String = secret
            .chars()
            .rev()
            .take(4)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        format!("{}...{}", prefix, suffix)
    } else {
        format!("{}...", prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_terminal_width() {
        assert_eq!(parse_terminal_width(None), 80);
        assert_eq!(parse_terminal_width(Some("120")), 120);
        assert_eq!(parse_terminal_width(Some(" 100 ")), 100);
        assert_eq!(parse_terminal_width(Some("0")), 80);
        assert_eq!(parse_terminal_width(Some("wide")), 80);
    }

    #[test]
    fn test_mask_secret() {
        assert_eq!(mask_secret("abc"), "abc...");
        assert_eq!(mask_secret("abcdefghij"), "abcdefgh...");
        assert_eq!(mask_secret("abcdefghijklmnopqrstuvwxyz"), "abcdefgh...wxyz");
    }

    #[test]
    fn test_with_profile_path() {
        let settings = Settings::default().with_profile_path("/tmp/trc");
        assert_eq!(settings.profile_path, PathBuf::from("/tmp/trc"));
        assert_eq!(settings.api_url, DEFAULT_API_URL);
        assert!(!settings.dry_run);
    }
}
