use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::{Deserialize, Serialize};

use super::SyncError;
use crate::core::task::Task;
use crate::core::tracker::TrackerConfig;

pub const GITHUB_API_BASE: &str = "https://api.github.com";

const GITHUB_ACCEPT: &str = "application/vnd.github.v3+json";
const ISSUE_PREAMBLE: &str = "Created via TaskFlow.\n\nSubtasks:\n";

/// An issue as returned by the GitHub REST API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteIssue {
    pub number: u64,
    pub title: String,
    pub state: String,
    #[serde(rename = "html_url")]
    pub url: String,
    #[serde(default)]
    pub body: Option<String>,
}

impl RemoteIssue {
    pub fn is_closed(&self) -> bool {
        self.state == "closed"
    }
}

#[derive(Debug, Serialize)]
struct NewIssue<'a> {
    title: &'a str,
    body: String,
}

/// Render the issue body: a fixed preamble followed by the subtask checklist.
pub fn issue_body(task: &Task) -> String {
    let checklist: Vec<String> = task
        .subtasks
        .iter()
        .map(|s| format!("- [{}] {}", if s.completed { "x" } else { " " }, s.text))
        .collect();
    format!("{}{}", ISSUE_PREAMBLE, checklist.join("\n"))
}

/// Stateless wrapper around the three GitHub calls TaskFlow needs. No retry, first page only.
#[derive(Clone)]
pub struct GithubClient {
    base_url: String,
    http: Client,
}

impl GithubClient {
    pub fn new(base_url: &str) -> Result<Self, SyncError> {
        let http = Client::builder()
            .user_agent(concat!("taskflow/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    /// True iff an authenticated `GET /user` succeeds. Never errors.
    pub async fn validate_token(&self, token: &str) -> bool {
        let url = format!("{}/user", self.base_url);
        match self.request(Method::GET, &url, token).send().await {
            Ok(resp) => {
                let ok = resp.status().is_success();
                if !ok {
                    log::warn!("GitHub token validation returned {}", resp.status());
                }
                ok
            }
            Err(e) => {
                log::error!("GitHub validation error: {}", e);
                false
            }
        }
    }

    pub async fn list_open_issues(
        &self,
        config: &TrackerConfig,
    ) -> Result<Vec<RemoteIssue>, SyncError> {
        config.ensure_complete()?;
        let url = format!(
            "{}/repos/{}/{}/issues?state=open",
            self.base_url, config.owner, config.repo
        );

        let resp = self
            .request(Method::GET, &url, &config.token)
            .send()
            .await?;
        let issues: Vec<RemoteIssue> = read_json(resp, "list issues").await?;
        log::info!("Fetched {} open issues from {}", issues.len(), config.slug());
        Ok(issues)
    }

    pub async fn create_issue(
        &self,
        task: &Task,
        config: &TrackerConfig,
    ) -> Result<RemoteIssue, SyncError> {
        config.ensure_complete()?;
        let url = format!(
            "{}/repos/{}/{}/issues",
            self.base_url, config.owner, config.repo
        );
        let payload = NewIssue {
            title: &task.text,
            body: issue_body(task),
        };

        let resp = self
            .request(Method::POST, &url, &config.token)
            .json(&payload)
            .send()
            .await?;
        let issue: RemoteIssue = read_json(resp, "create issue").await?;
        log::info!("Created issue #{} in {}", issue.number, config.slug());
        Ok(issue)
    }

    fn request(&self, method: Method, url: &str, token: &str) -> RequestBuilder {
        self.http
            .request(method, url)
            .header(AUTHORIZATION, format!("token {}", token))
            .header(ACCEPT, GITHUB_ACCEPT)
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(
    resp: Response,
    operation: &'static str,
) -> Result<T, SyncError> {
    let status = resp.status();
    if !status.is_success() {
        let text = resp.text().await.unwrap_or_default();
        log::debug!("{} returned {}: {}", operation, status, text);
        return Err(SyncError::Fetch { operation, status });
    }
    let text = resp.text().await?;
    serde_json::from_str(&text).map_err(|source| SyncError::Parse { operation, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::task::Subtask;
    use crate::sync::stub::{StubServer, refused_url};

    fn config() -> TrackerConfig {
        TrackerConfig::new("ghp_test", "octo", "hello")
    }

    const ISSUES: &str = r#"[
        {"number": 5, "title": "Fix bug", "state": "open", "html_url": "https://github.com/octo/hello/issues/5", "body": null},
        {"number": 7, "title": "Add docs", "state": "open", "html_url": "https://github.com/octo/hello/issues/7", "body": "Write the docs", "labels": []}
    ]"#;

    #[test]
    fn body_renders_checklist() {
        let mut task = Task::new("Ship it");
        let mut done = Subtask::new("Write tests");
        done.completed = true;
        task.subtasks.push(done);
        task.subtasks.push(Subtask::new("Tag release"));

        assert_eq!(
            issue_body(&task),
            "Created via TaskFlow.\n\nSubtasks:\n- [x] Write tests\n- [ ] Tag release"
        );
    }

    #[test]
    fn body_without_subtasks_is_preamble_only() {
        assert_eq!(issue_body(&Task::new("Solo")), ISSUE_PREAMBLE);
    }

    #[tokio::test]
    async fn lists_open_issues() {
        let server = StubServer::start(vec![(200, ISSUES)]).await;
        let client = GithubClient::new(&server.base_url).unwrap();

        let issues = client.list_open_issues(&config()).await.unwrap();
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].number, 5);
        assert_eq!(issues[0].url, "https://github.com/octo/hello/issues/5");
        assert_eq!(issues[0].body, None);
        assert_eq!(issues[1].body.as_deref(), Some("Write the docs"));

        let requests = server.requests();
        let req = &requests[0];
        assert_eq!(req.request_line, "GET /repos/octo/hello/issues?state=open HTTP/1.1");
        assert_eq!(req.header("authorization").as_deref(), Some("token ghp_test"));
        assert_eq!(req.header("accept").as_deref(), Some(GITHUB_ACCEPT));
    }

    #[tokio::test]
    async fn incomplete_config_fails_before_request() {
        let client = GithubClient::new(&refused_url().await).unwrap();
        let cfg = TrackerConfig::new("ghp_test", "octo", "");
        let err = client.list_open_issues(&cfg).await.unwrap_err();
        assert!(matches!(err, SyncError::Configuration("repo")));
    }

    #[tokio::test]
    async fn path_breaking_repo_fails_before_request() {
        let server = StubServer::start(vec![(200, "[]")]).await;
        let client = GithubClient::new(&server.base_url).unwrap();
        let cfg = TrackerConfig::new("ghp_test", "octo", "hello/../../user");
        let err = client.list_open_issues(&cfg).await.unwrap_err();
        assert!(matches!(err, SyncError::InvalidName("repo")));
        assert!(server.requests().is_empty());
    }

    #[tokio::test]
    async fn non_success_is_fetch_error() {
        let server = StubServer::start(vec![(404, r#"{"message":"Not Found"}"#)]).await;
        let client = GithubClient::new(&server.base_url).unwrap();
        let err = client.list_open_issues(&config()).await.unwrap_err();
        match err {
            SyncError::Fetch { status, .. } => assert_eq!(status.as_u16(), 404),
            other => panic!("expected fetch error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn malformed_body_is_parse_error() {
        let server = StubServer::start(vec![(200, r#"{"not":"a list"}"#)]).await;
        let client = GithubClient::new(&server.base_url).unwrap();
        let err = client.list_open_issues(&config()).await.unwrap_err();
        assert!(matches!(err, SyncError::Parse { .. }));
    }

    #[tokio::test]
    async fn creates_issue_with_checklist_body() {
        let created = r#"{"number": 12, "title": "Ship it", "state": "open", "html_url": "https://github.com/octo/hello/issues/12"}"#;
        let server = StubServer::start(vec![(201, created)]).await;
        let client = GithubClient::new(&server.base_url).unwrap();

        let mut task = Task::new("Ship it");
        task.subtasks.push(Subtask::new("Tag release"));
        let issue = client.create_issue(&task, &config()).await.unwrap();
        assert_eq!(issue.number, 12);

        let requests = server.requests();
        let req = &requests[0];
        assert_eq!(req.request_line, "POST /repos/octo/hello/issues HTTP/1.1");
        let sent: serde_json::Value = serde_json::from_str(&req.body).unwrap();
        assert_eq!(sent["title"], "Ship it");
        assert_eq!(
            sent["body"],
            "Created via TaskFlow.\n\nSubtasks:\n- [ ] Tag release"
        );
    }

    #[tokio::test]
    async fn validate_token_reflects_status() {
        let server = StubServer::start(vec![(200, r#"{"login":"octo"}"#), (401, "{}")]).await;
        let client = GithubClient::new(&server.base_url).unwrap();
        assert!(client.validate_token("good").await);
        assert!(!client.validate_token("bad").await);
        assert_eq!(server.requests()[0].request_line, "GET /user HTTP/1.1");
    }

    #[tokio::test]
    async fn validate_token_swallows_transport_errors() {
        let client = GithubClient::new(&refused_url().await).unwrap();
        assert!(!client.validate_token("anything").await);
    }
}
