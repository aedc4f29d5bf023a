//! User lookups, suggestions and list membership.

use log::{debug, info};

use super::api::{params, TwitterClient};
use super::types::{parse_body, CursoredCollection, Recommendation, User, FIRST_PAGE};
use crate::error::Result;

/// Number of suggestions requested.
pub const SUGGESTION_LIMIT: &str = "20";

/// How to identify the users passed to a bulk lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<'a> {
    Ids(&'a [u64]),
    ScreenNames(&'a [String]),
}

/// Looks up many users in one call, keeping the API's ordering.
pub async fn lookup_users(client: &TwitterClient, lookup: Lookup<'_>) -> Result<Vec<User>> {
    let (key, value) = match lookup {
        Lookup::Ids(ids) => (
            "user_id",
            ids.iter()
                .map(u64::to_string)
                .collect::<Vec<_>>()
                .join(","),
        ),
        Lookup::ScreenNames(names) => ("screen_name", names.join(",")),
    };
    info!("Looking up users by {}", key);
    debug!("Lookup {}={}", key, value);
    let body = client
        .get(
            "/users/lookup",
            &params(&[(key, value.as_str()), ("include_entities", "false")]),
        )
        .await?;
    parse_body(&body)
}

/// Looks up a single user by screen name.
pub async fn show_user(client: &TwitterClient, screen_name: &str) -> Result<User> {
    info!("Looking up user @{}", screen_name);
    let body = client
        .get(
            "/users/show",
            &params(&[("screen_name", screen_name), ("include_entities", "false")]),
        )
        .await?;
    parse_body(&body)
}

/// Returns the account the current credentials belong to.
pub async fn verify_credentials(client: &TwitterClient) -> Result<User> {
    let body = client
        .get("/account/verify_credentials", &Vec::new())
        .await?;
    parse_body(&body)
}

/// Fetches suggested accounts to follow.
pub async fn recommendations(client: &TwitterClient) -> Result<Vec<User>> {
    let body = client
        .get(
            "/users/recommendations",
            &params(&[("limit", SUGGESTION_LIMIT), ("include_entities", "false")]),
        )
        .await?;
    let entries: Vec<Recommendation> = parse_body(&body)?;
    Ok(entries.into_iter().map(|entry| entry.user).collect())
}

/// Fetches the first page of members of `owner`'s list `slug`.
pub async fn list_members(client: &TwitterClient, owner: &str, slug: &str) -> Result<Vec<User>> {
    info!("Fetching members of list @{}/{}", owner, slug);
    let cursor = FIRST_PAGE.to_string();
    let body = client
        .get(
            "/lists/members",
            &params(&[
                ("cursor", cursor.as_str()),
                ("include_entities", "false"),
                ("owner_screen_name", owner),
                ("skip_status", "true"),
                ("slug", slug),
            ]),
        )
        .await?;
    let page: CursoredCollection<User> = parse_body(&body)?;
    Ok(page.collection)
}
