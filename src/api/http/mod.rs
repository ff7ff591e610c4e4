pub mod auth;
pub mod comments;
pub mod communities;
pub mod events;
pub mod questions;
pub mod votes;
