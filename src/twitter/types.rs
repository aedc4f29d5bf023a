//! Typed records for API responses.
//!
//! Bodies are deserialized strictly: a missing required field turns into a
//! `MalformedResponse` error instead of a silently empty value.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

use crate::error::{CliError, Result};

/// Cursor value requesting the first page of a cursored collection.
pub const FIRST_PAGE: i64 = -1;
/// Cursor value marking the end of a cursored collection.
pub const LAST_PAGE: i64 = 0;

/// Timestamp format used by the v1 API, e.g. `Mon Jul 16 12:59:01 +0000 2007`.
pub const TWITTER_TIME_FORMAT: &str = "%a %b %d %H:%M:%S %z %Y";

/// Parses an API timestamp into UTC.
pub fn parse_twitter_time(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_str(value, TWITTER_TIME_FORMAT)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| CliError::MalformedResponse(format!("invalid timestamp '{}': {}", value, e)))
}

fn twitter_time<'de, D>(deserializer: D) -> std::result::Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_twitter_time(&raw).map_err(serde::de::Error::custom)
}

/// Deserializes a 2xx body into `T`.
pub fn parse_body<T: DeserializeOwned>(body: &str) -> Result<T> {
    Ok(serde_json::from_str(body)?)
}

/// An account.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct User {
    pub id: u64,
    pub screen_name: String,
    pub name: String,
    #[serde(deserialize_with = "twitter_time")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// Author embedded in a status. With `trim_user=true` only the id is present.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StatusAuthor {
    pub id: u64,
    #[serde(default)]
    pub screen_name: Option<String>,
}

/// A tweet.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Status {
    pub id: u64,
    pub text: String,
    #[serde(deserialize_with = "twitter_time")]
    pub created_at: DateTime<Utc>,
    pub user: StatusAuthor,
    #[serde(default)]
    pub retweeted_status: Option<Box<Status>>,
}

impl Status {
    /// Screen name of the author, required for display.
    pub fn author(&self) -> Result<&str> {
        self.user.screen_name.as_deref().ok_or_else(|| {
            CliError::MalformedResponse(format!(
                "status {} has no author screen_name",
                self.id
            ))
        })
    }

    /// The status a retweet points at, or the status itself.
    pub fn original(&self) -> &Status {
        self.retweeted_status.as_deref().unwrap_or(self)
    }
}

/// A direct message.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DirectMessage {
    pub id: u64,
    pub text: String,
    pub sender_screen_name: String,
    pub recipient_screen_name: String,
    #[serde(deserialize_with = "twitter_time")]
    pub created_at: DateTime<Utc>,
}

/// Entry of the suggestion endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Recommendation {
    pub user: User,
}

/// One page of a cursored list (`ids` or `users`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CursoredCollection<T> {
    #[serde(alias = "ids", alias = "users")]
    pub collection: Vec<T>,
    pub next_cursor: i64,
    #[serde(default)]
    pub previous_cursor: i64,
}

impl<T> CursoredCollection<T> {
    pub fn is_last_page(&self) -> bool {
        self.next_cursor == LAST_PAGE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, TimeZone};

    #[test]
    fn test_parse_twitter_time() {
        let dt = parse_twitter_time("Mon Jul 16 12:59:01 +0000 2007").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2007, 7, 16, 12, 59, 1).unwrap());

        let shifted = parse_twitter_time("Mon Jul 16 14:59:01 +0200 2007").unwrap();
        assert_eq!(shifted, dt);
        assert_eq!(shifted.year(), 2007);

        assert!(matches!(
            parse_twitter_time("2007-07-16"),
            Err(CliError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_user_requires_screen_name() {
        let body = r#"{"id": 1, "name": "No Handle", "created_at": "Mon Jul 16 12:59:01 +0000 2007"}"#;
        assert!(matches!(
            parse_body::<User>(body),
            Err(CliError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_user_optional_fields_accept_null() {
        let body = r#"{"id": 1, "screen_name": "a", "name": "A", "created_at": "Mon Jul 16 12:59:01 +0000 2007", "description": null, "url": null}"#;
        let user: User = parse_body(body).unwrap();
        assert_eq!(user.description, None);
        assert_eq!(user.location, None);
    }

    #[test]
    fn test_trimmed_status_author() {
        let body = r#"{"id": 5, "text": "hi", "created_at": "Mon Jul 16 12:59:01 +0000 2007", "user": {"id": 7505382}}"#;
        let status: Status = parse_body(body).unwrap();
        assert_eq!(status.user.id, 7505382);
        assert!(matches!(status.author(), Err(CliError::MalformedResponse(_))));
        assert_eq!(status.original().id, 5);
    }

    #[test]
    fn test_cursored_ids_and_users() {
        let ids: CursoredCollection<u64> =
            parse_body(r#"{"ids": [7505382, 14100886], "next_cursor": 0, "previous_cursor": 0}"#)
                .unwrap();
        assert_eq!(ids.collection, vec![7505382, 14100886]);
        assert!(ids.is_last_page());

        let users: CursoredCollection<User> =
            parse_body(r#"{"users": [], "next_cursor": 1418947360875712729}"#).unwrap();
        assert!(users.collection.is_empty());
        assert!(!users.is_last_page());
    }
}
