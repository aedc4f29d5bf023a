//! # tcli
//!
//! A command-line client for the Twitter REST API (v1). Every command reads
//! the active profile from `~/.trc`, signs its requests with OAuth 1.0a, and
//! prints a compact, human-readable rendering of the response.
//!
//! ## Features
//!
//! - OAuth PIN-based authorization with multiple stored profiles
//! - Timelines, mentions, favorites, retweets and direct messages
//! - Following, unfollowing, blocking and spam reports
//! - User lookups, suggestions and list membership
//! - Optional geotagging of posted statuses
//! - Automatic retry of requests the API answers with `502 Bad Gateway`
//!
//! ## Configuration
//!
//! - `TCLI_API_URL`: API base URL (defaults to `https://api.twitter.com`)
//! - `COLUMNS`: terminal width used for column listings (defaults to 80)
//! - `RUST_LOG`: log level for diagnostics written to stderr

pub mod clock;
pub mod commands;
pub mod config;
pub mod error;
pub mod format;
pub mod oauth;
pub mod rcfile;
pub mod twitter;

// Re-export commonly used types and functions
pub use clock::{Clock, FixedClock, SystemClock};
pub use commands::App;
pub use config::Settings;
pub use error::{CliError, Result};
pub use rcfile::{Credentials, RcFile};
pub use twitter::TwitterClient;
