//! Status operations: timelines, posting, replies, retweets and favorites.

use log::{debug, info};

use super::api::{params, Params, TwitterClient};
use super::geo::Coordinates;
use super::types::{parse_body, Status};
use crate::error::Result;

/// Number of statuses requested by the listing commands.
pub const DEFAULT_COUNT: &str = "20";

/// Which list of statuses to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timeline<'a> {
    Home,
    User(&'a str),
    Mentions,
    Favorites,
    RetweetedByMe,
    RetweetedByUser(&'a str),
}

impl Timeline<'_> {
    fn resource(&self) -> &'static str {
        match self {
            Timeline::Home => "/statuses/home_timeline",
            Timeline::User(_) => "/statuses/user_timeline",
            Timeline::Mentions => "/statuses/mentions",
            Timeline::Favorites => "/favorites",
            Timeline::RetweetedByMe => "/statuses/retweeted_by_me",
            Timeline::RetweetedByUser(_) => "/statuses/retweeted_by_user",
        }
    }

    fn screen_name(&self) -> Option<&str> {
        match self {
            Timeline::User(name) | Timeline::RetweetedByUser(name) => Some(*name),
            _ => None,
        }
    }
}

/// Fetches the most recent page of a timeline.
pub async fn fetch_timeline(client: &TwitterClient, timeline: Timeline<'_>) -> Result<Vec<Status>> {
    info!("Fetching timeline {:?}", timeline);
    let mut query = params(&[("count", DEFAULT_COUNT), ("include_entities", "false")]);
    if let Some(name) = timeline.screen_name() {
        query.push(("screen_name".to_string(), name.to_string()));
    }
    let body = client.get(timeline.resource(), &query).await?;
    let statuses: Vec<Status> = parse_body(&body)?;
    debug!("Fetched {} statuses", statuses.len());
    Ok(statuses)
}

/// Fetches a single status with its author trimmed to an id where the API allows.
pub async fn show_status(client: &TwitterClient, id: &str) -> Result<Status> {
    let body = client
        .get(
            &format!("/statuses/show/{}", id),
            &params(&[
                ("include_entities", "false"),
                ("include_my_retweet", "false"),
                ("trim_user", "true"),
            ]),
        )
        .await?;
    parse_body(&body)
}

/// Posts a new status, optionally as a reply and with coordinates.
pub async fn update_status(
    client: &TwitterClient,
    text: &str,
    in_reply_to: Option<&str>,
    location: Option<&Coordinates>,
) -> Result<Status> {
    info!("Posting status ({} characters)", text.chars().count());
    let mut form: Params = Vec::new();
    if let Some(id) = in_reply_to {
        form.push(("in_reply_to_status_id".to_string(), id.to_string()));
    }
    form.push(("status".to_string(), text.to_string()));
    if let Some(coordinates) = location {
        form.push(("lat".to_string(), coordinates.lat.clone()));
        form.push(("long".to_string(), coordinates.long.clone()));
    }
    form.extend(params(&[("include_entities", "false"), ("trim_user", "true")]));

    let body = client.post("/statuses/update", &form).await?;
    parse_body(&body)
}

/// Retweets a status; the response wraps the original in `retweeted_status`.
pub async fn retweet(client: &TwitterClient, id: &str) -> Result<Status> {
    let body = client
        .post(&format!("/statuses/retweet/{}", id), &Params::new())
        .await?;
    parse_body(&body)
}

pub async fn favorite(client: &TwitterClient, id: &str) -> Result<Status> {
    let body = client
        .post(&format!("/favorites/create/{}", id), &Params::new())
        .await?;
    parse_body(&body)
}
