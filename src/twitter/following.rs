//! Social graph operations: id lists, follow/unfollow, block and spam reports.

use log::{info, warn};

use super::api::{params, TwitterClient};
use super::types::{parse_body, CursoredCollection, User, FIRST_PAGE};
use crate::error::Result;

/// Which id list to page through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Graph {
    Friends,
    Followers,
}

/// Fetches the first page of friend or follower ids.
///
/// Only one page is requested; the remaining cursor is logged but not followed.
pub async fn fetch_ids(client: &TwitterClient, graph: Graph) -> Result<Vec<u64>> {
    let resource = match graph {
        Graph::Friends => "/friends/ids",
        Graph::Followers => "/followers/ids",
    };
    info!("Fetching {:?} ids", graph);
    let cursor = FIRST_PAGE.to_string();
    let body = client
        .get(resource, &params(&[("cursor", cursor.as_str())]))
        .await?;
    let page: CursoredCollection<u64> = parse_body(&body)?;
    if !page.is_last_page() {
        warn!(
            "Only the first page of {} ids was fetched (next cursor {})",
            page.collection.len(),
            page.next_cursor
        );
    }
    Ok(page.collection)
}

/// Follows `screen_name`.
pub async fn follow(client: &TwitterClient, screen_name: &str) -> Result<User> {
    info!("Following @{}", screen_name);
    let body = client
        .post(
            "/friendships/create",
            &params(&[("screen_name", screen_name), ("include_entities", "false")]),
        )
        .await?;
    parse_body(&body)
}

/// Unfollows `screen_name`.
pub async fn unfollow(client: &TwitterClient, screen_name: &str) -> Result<User> {
    info!("Unfollowing @{}", screen_name);
    let body = client
        .delete(
            "/friendships/destroy",
            &params(&[("screen_name", screen_name), ("include_entities", "false")]),
        )
        .await?;
    parse_body(&body)
}

pub async fn block(client: &TwitterClient, screen_name: &str) -> Result<User> {
    info!("Blocking @{}", screen_name);
    let body = client
        .post(
            "/blocks/create",
            &params(&[("screen_name", screen_name), ("include_entities", "false")]),
        )
        .await?;
    parse_body(&body)
}

pub async fn report_spam(client: &TwitterClient, screen_name: &str) -> Result<User> {
    info!("Reporting @{} for spam", screen_name);
    let body = client
        .post(
            "/report_spam",
            &params(&[("screen_name", screen_name), ("include_entities", "false")]),
        )
        .await?;
    parse_body(&body)
}
