//! Pull-request comments through the GitHub REST API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use serde_json::json;
use taskbridge_core::{CommentNotifier, NotifyError, RepoCoordinates};

use crate::config::{GithubConfig, RetryPolicy};
use crate::retry::{send_with_retry, HttpFailure};

impl From<HttpFailure> for NotifyError {
    fn from(failure: HttpFailure) -> Self {
        match failure {
            HttpFailure::Status { status, body } => NotifyError::Status { status, body },
            HttpFailure::Transport(message) => NotifyError::Transport(message),
        }
    }
}

/// Posts issue comments on pull requests.
#[derive(Debug)]
pub struct GithubNotifier {
    http: reqwest::Client,
    api_base: String,
    token: Option<String>,
    retry: RetryPolicy,
}

impl GithubNotifier {
    pub fn new(config: &GithubConfig) -> Result<Self, NotifyError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static("2022-11-28"),
        );
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("taskbridge/", env!("CARGO_PKG_VERSION"))),
        );

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(|e| NotifyError::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            retry: config.retry,
        })
    }

    fn comments_url(&self, repo: &RepoCoordinates, number: u64) -> String {
        format!(
            "{}/repos/{}/{}/issues/{}/comments",
            self.api_base, repo.owner, repo.name, number
        )
    }
}

#[async_trait]
impl CommentNotifier for GithubNotifier {
    async fn post_comment(
        &self,
        repo: &RepoCoordinates,
        number: u64,
        body: &str,
    ) -> Result<(), NotifyError> {
        let url = self.comments_url(repo, number);
        let payload = json!({ "body": body });
        send_with_retry(&self.retry, "github.create_comment", || {
            let request = self.http.post(&url).json(&payload);
            match &self.token {
                Some(token) => request.bearer_auth(token),
                None => request,
            }
        })
        .await?;
        Ok(())
    }
}
