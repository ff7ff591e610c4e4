pub mod auth;
pub mod comments;
pub mod events;
pub mod questions;
pub mod votes;
