use chrono::{DateTime, Utc};

use crate::github::Notification as GithubNotification;

/// A notification as kept in the local cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: String,
    /// Repository full name, `owner/repo`.
    pub name: String,
    pub repo: String,
    pub subject: String,
    pub kind: String,
    /// Browser URL of the subject.
    pub url: String,
    pub updated_at: DateTime<Utc>,
}

/// Turn a subject API url into the page a browser should open.
///
/// Subjects without an API url (e.g. some releases and discussions) fall back to the
/// repository page.
pub fn html_url(repo_url: &str, subject_url: Option<&str>) -> String {
    let Some(subject_url) = subject_url else {
        return repo_url.to_string();
    };

    subject_url
        .replace("api.github.com/repos", "github.com")
        .replace("/pulls/", "/pull/")
}

impl From<GithubNotification> for Notification {
    fn from(notification: GithubNotification) -> Notification {
        let url = html_url(
            &notification.repository.html_url,
            notification.subject.url.as_deref(),
        );
        Notification {
            id: notification.id,
            name: notification.repository.full_name,
            repo: notification.repository.name,
            subject: notification.subject.title,
            kind: notification.subject.kind,
            url,
            updated_at: notification.updated_at,
        }
    }
}
