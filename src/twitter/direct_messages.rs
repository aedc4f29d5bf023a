//! Direct message functionality for Twitter API.

use log::{debug, info};

use super::api::{params, TwitterClient};
use super::tweets::DEFAULT_COUNT;
use super::types::{parse_body, DirectMessage};
use crate::error::Result;

/// Which mailbox to list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mailbox {
    Received,
    Sent,
}

/// Fetches the most recent direct messages from a mailbox.
///
/// # Returns
///
/// - `Ok(Vec<DirectMessage>)`: newest first, as returned by the API
/// - `Err(CliError)`: if the request fails or the body is malformed
pub async fn fetch_direct_messages(
    client: &TwitterClient,
    mailbox: Mailbox,
) -> Result<Vec<DirectMessage>> {
    let resource = match mailbox {
        Mailbox::Received => "/direct_messages",
        Mailbox::Sent => "/direct_messages/sent",
    };
    info!("Fetching direct messages from {}", resource);
    let body = client
        .get(
            resource,
            &params(&[("count", DEFAULT_COUNT), ("include_entities", "false")]),
        )
        .await?;
    let messages: Vec<DirectMessage> = parse_body(&body)?;
    debug!("Fetched {} direct messages", messages.len());
    Ok(messages)
}

/// Sends a direct message to `screen_name`.
pub async fn send_direct_message(
    client: &TwitterClient,
    screen_name: &str,
    text: &str,
) -> Result<DirectMessage> {
    info!("Sending direct message to @{}", screen_name);
    let body = client
        .post(
            "/direct_messages/new",
            &params(&[
                ("screen_name", screen_name),
                ("text", text),
                ("include_entities", "false"),
            ]),
        )
        .await?;
    parse_body(&body)
}
