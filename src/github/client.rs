use reqwest::header::{ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;
use url::Url;

use super::notifications::Notifications;

pub const DEFAULT_HOST: &str = "https://api.github.com/";
const MEDIA_TYPE: &str = "application/vnd.github.v3+json";
const AGENT: &str = "ghostie";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum GithubError {
    #[error("Failed to reach GitHub: {0}")]
    Http(#[from] reqwest::Error),
    #[error("GitHub rejected the token (401 Unauthorized); check it with 'ghostie token status'")]
    Unauthorized,
    #[error("GitHub API returned {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("Invalid GitHub API url '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    Token(String),
}

impl Credentials {
    fn header_value(&self) -> String {
        match self {
            Credentials::Token(token) => format!("token {token}"),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credentials::Token(_) => f.write_str("Token(<redacted>)"),
        }
    }
}

impl From<&crate::token::Token> for Credentials {
    fn from(token: &crate::token::Token) -> Self {
        Credentials::Token(token.secret().to_string())
    }
}

/// Thin async client over the GitHub REST API.
#[derive(Debug, Clone)]
pub struct Github {
    host: Url,
    client: Client,
    credentials: Credentials,
}

impl Github {
    pub fn new(credentials: impl Into<Credentials>) -> Result<Self, GithubError> {
        Self::with_host(DEFAULT_HOST, credentials)
    }

    pub fn with_host(host: &str, credentials: impl Into<Credentials>) -> Result<Self, GithubError> {
        Self::with_timeout(host, credentials, REQUEST_TIMEOUT)
    }

    /// Client for `host` whose requests fail once they take longer than `timeout`.
    pub fn with_timeout(
        host: &str,
        credentials: impl Into<Credentials>,
        timeout: Duration,
    ) -> Result<Self, GithubError> {
        // Url::join drops the last path segment unless the base ends with a slash.
        let normalized = if host.ends_with('/') {
            host.to_string()
        } else {
            format!("{host}/")
        };
        let host = Url::parse(&normalized).map_err(|source| GithubError::InvalidUrl {
            url: normalized.clone(),
            source,
        })?;
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            host,
            client,
            credentials: credentials.into(),
        })
    }

    pub fn host(&self) -> &Url {
        &self.host
    }

    fn endpoint(&self, uri: &str) -> Result<Url, GithubError> {
        self.host
            .join(uri.trim_start_matches('/'))
            .map_err(|source| GithubError::InvalidUrl {
                url: format!("{}{uri}", self.host),
                source,
            })
    }

    async fn request<P: Serialize + ?Sized>(
        &self,
        method: Method,
        uri: &str,
        params: Option<&P>,
    ) -> Result<Response, GithubError> {
        let url = self.endpoint(uri)?;
        debug!(%method, %url, "GitHub request");

        let mut req = self
            .client
            .request(method, url)
            .header(USER_AGENT, AGENT)
            .header(ACCEPT, MEDIA_TYPE)
            .header(AUTHORIZATION, self.credentials.header_value());

        if let Some(params) = params {
            req = req.query(params);
        }

        let response = req.send().await?;
        check_status(response).await
    }

    pub async fn get<T: DeserializeOwned, P: Serialize + ?Sized>(
        &self,
        uri: &str,
        params: Option<&P>,
    ) -> Result<T, GithubError> {
        let response = self.request(Method::GET, uri, params).await?;
        Ok(response.json::<T>().await?)
    }

    pub async fn patch(&self, uri: &str) -> Result<(), GithubError> {
        self.request::<()>(Method::PATCH, uri, None).await?;
        Ok(())
    }

    pub fn notifications(&self) -> Notifications<'_> {
        Notifications::new(self)
    }
}

async fn check_status(response: Response) -> Result<Response, GithubError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if status == StatusCode::UNAUTHORIZED {
        return Err(GithubError::Unauthorized);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<unavailable>".to_string());
    Err(GithubError::Status { status, body })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn token_header_value() {
        let credentials = Credentials::Token("super-secret-stuff".to_string());
        assert_eq!(credentials.header_value(), "token super-secret-stuff");
    }

    #[test]
    fn credentials_debug_is_redacted() {
        let credentials = Credentials::Token("super-secret-stuff".to_string());
        assert!(!format!("{credentials:?}").contains("super-secret"));
    }

    #[test]
    fn host_without_trailing_slash_keeps_prefix() {
        let github = Github::with_host(
            "https://ghe.example.com/api/v3",
            Credentials::Token("t".to_string()),
        )
        .unwrap();
        let url = github.endpoint("notifications").unwrap();
        assert_eq!(url.as_str(), "https://ghe.example.com/api/v3/notifications");
    }

    #[test]
    fn default_host_endpoint() {
        let github = Github::new(Credentials::Token("t".to_string())).unwrap();
        let url = github.endpoint("/notifications/threads/1").unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.github.com/notifications/threads/1"
        );
    }

    #[tokio::test]
    async fn slow_responses_time_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/notifications"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!([]))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let github = Github::with_timeout(
            &server.uri(),
            Credentials::Token("t".to_string()),
            Duration::from_millis(200),
        )
        .unwrap();
        let err = github
            .get::<serde_json::Value, ()>("notifications", None)
            .await
            .unwrap_err();

        match err {
            GithubError::Http(source) => assert!(source.is_timeout()),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn invalid_host_is_rejected() {
        let err = Github::with_host("not a url", Credentials::Token("t".to_string())).unwrap_err();
        assert!(matches!(err, GithubError::InvalidUrl { .. }));
    }
}
