//! Twitter/X API integration module.
//!
//! This module contains the signed HTTP client and one function per REST
//! resource the commands use: statuses, direct messages, the social graph,
//! user lookups and the geolocation helper used when posting.

pub mod api;
pub mod direct_messages;
pub mod following;
pub mod geo;
pub mod tweets;
pub mod types;
pub mod users;

pub use api::{TwitterClient, MAX_ATTEMPTS};
pub use types::{CursoredCollection, DirectMessage, Status, User};
