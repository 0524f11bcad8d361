use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, Serializer};

use super::client::{Github, GithubError};

/// The `/notifications` endpoint family.
pub struct Notifications<'client> {
    github: &'client Github,
}

impl<'client> Notifications<'client> {
    pub(crate) fn new(github: &'client Github) -> Self {
        Self { github }
    }

    pub fn list(&self) -> NotificationsBuilder<'client> {
        NotificationsBuilder::new(self.github)
    }

    /// Mark a single thread as read on GitHub.
    pub async fn mark_as_read(&self, thread_id: &str) -> Result<(), GithubError> {
        self.github
            .patch(&format!("notifications/threads/{thread_id}"))
            .await
    }
}

fn rfc3339<S: Serializer>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(timestamp) => {
            serializer.serialize_str(&timestamp.to_rfc3339_opts(SecondsFormat::Secs, true))
        }
        None => serializer.serialize_none(),
    }
}

/// Query parameters for `GET /notifications`.
#[derive(Serialize)]
pub struct NotificationsBuilder<'client> {
    #[serde(skip)]
    github: &'client Github,
    #[serde(skip_serializing_if = "Option::is_none")]
    all: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    participating: Option<bool>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "rfc3339"
    )]
    since: Option<DateTime<Utc>>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "rfc3339"
    )]
    before: Option<DateTime<Utc>>,
}

impl<'client> NotificationsBuilder<'client> {
    fn new(github: &'client Github) -> Self {
        Self {
            github,
            all: None,
            participating: None,
            since: None,
            before: None,
        }
    }

    /// Include notifications already marked as read.
    pub fn all(mut self, all: bool) -> Self {
        self.all = Some(all);
        self
    }

    /// Only notifications where the user is directly participating or mentioned.
    pub fn participating(mut self, participating: bool) -> Self {
        self.participating = Some(participating);
        self
    }

    pub fn since(mut self, since: DateTime<Utc>) -> Self {
        self.since = Some(since);
        self
    }

    pub fn before(mut self, before: DateTime<Utc>) -> Self {
        self.before = Some(before);
        self
    }

    pub async fn fetch(self) -> Result<Vec<Notification>, GithubError> {
        self.github
            .get::<Vec<Notification>, NotificationsBuilder>("notifications", Some(&self))
            .await
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Notification {
    pub id: String,
    pub unread: bool,
    pub updated_at: DateTime<Utc>,
    pub last_read_at: Option<String>,
    pub reason: String,
    pub url: String,
    pub subject: Subject,
    pub repository: Repository,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Subject {
    pub title: String,
    pub url: Option<String>,
    pub latest_comment_url: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Repository {
    pub id: u64,
    pub node_id: String,
    pub name: String,
    pub full_name: String,
    pub html_url: String,
}
