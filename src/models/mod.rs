pub mod comments;
pub mod communities;
pub mod users;
pub mod votes;
