pub mod comments;
pub mod events;
pub mod questions;
pub mod users;
pub mod votes;
