pub mod auth;
pub mod documents;
pub mod folders;
pub mod github;
pub mod reviews;
pub mod users;
