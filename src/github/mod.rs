//! GitHub REST API access, limited to what ghostie needs.

pub mod client;
pub mod notifications;

pub use client::{Credentials, Github, GithubError};
pub use notifications::Notification;
