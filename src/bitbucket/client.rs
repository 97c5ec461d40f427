use reqwest::header::ACCEPT;
use reqwest::{Client, Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::bitbucket::error::{BitbucketError, BitbucketResult};
use crate::bitbucket::models::{
    AddCommentBody, DiffFormat, DiffQuery, Emoticon, InboxPullRequest, NewPullRequest, Page,
    PageQuery, ParticipantStatus, ProjectQuery, PullRequestKey, RawActivity, ReviewStatusBody,
};
use crate::config::BitbucketConfig;

/// Core REST API root, relative to the server base URL.
pub const API_ROOT: &str = "/rest/api/latest";

/// Comment reactions live under their own plugin root.
pub const COMMENT_LIKES_ROOT: &str = "/rest/comment-likes/latest";

/// Header carrying the authenticated username on every response.
pub const USERNAME_HEADER: &str = "x-ausername";

/// Body of a diff response, in the representation that was requested.
#[derive(Debug, Clone, PartialEq)]
pub enum DiffBody {
    Text(String),
    Json(Value),
}

/// API client for a single Bitbucket Server instance.
///
/// Every method issues exactly one request (the review status update issues
/// two, strictly in sequence) and returns the parsed body. Nothing is
/// retried and nothing is paginated automatically.
pub struct BitbucketClient {
    base_url: String,
    token: String,
    client: Client,
}

impl BitbucketClient {
    pub fn new(config: BitbucketConfig) -> BitbucketResult<Self> {
        let _ = rustls::crypto::ring::default_provider().install_default();

        let client = Client::builder()
            .user_agent(concat!("bitbucket-mcp/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            base_url: config.base_url().to_string(),
            token: config.token().to_string(),
            client,
        })
    }

    /// Get the server base URL being used
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Join unencoded path segments onto a REST root.
    ///
    /// Each segment is percent-encoded on its own, so `/`, `?` and `#` inside
    /// a caller value never change the shape of the request.
    fn endpoint<S: AsRef<str>>(
        &self,
        root: &str,
        segments: impl IntoIterator<Item = S>,
    ) -> BitbucketResult<Url> {
        let mut url = Url::parse(&format!("{}{}", self.base_url, root))
            .map_err(|e| BitbucketError::invalid_input(format!("invalid base URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|()| BitbucketError::invalid_input("base URL cannot carry a path"))?
            .extend(segments);
        Ok(url)
    }

    fn request<S: AsRef<str>>(
        &self,
        method: Method,
        root: &str,
        segments: impl IntoIterator<Item = S>,
    ) -> BitbucketResult<RequestBuilder> {
        let url = self.endpoint(root, segments)?;
        Ok(self.client.request(method, url).bearer_auth(&self.token))
    }

    fn get<S: AsRef<str>>(
        &self,
        segments: impl IntoIterator<Item = S>,
    ) -> BitbucketResult<RequestBuilder> {
        self.request(Method::GET, API_ROOT, segments)
    }

    fn post<S: AsRef<str>>(
        &self,
        segments: impl IntoIterator<Item = S>,
    ) -> BitbucketResult<RequestBuilder> {
        self.request(Method::POST, API_ROOT, segments)
    }

    fn put<S: AsRef<str>>(
        &self,
        segments: impl IntoIterator<Item = S>,
    ) -> BitbucketResult<RequestBuilder> {
        self.request(Method::PUT, API_ROOT, segments)
    }

    fn delete<S: AsRef<str>>(
        &self,
        segments: impl IntoIterator<Item = S>,
    ) -> BitbucketResult<RequestBuilder> {
        self.request(Method::DELETE, API_ROOT, segments)
    }

    /// Send a request and turn any non-2xx status into [`BitbucketError::Api`].
    async fn send(request: RequestBuilder) -> BitbucketResult<Response> {
        let response = request.send().await?;
        let status = response.status();
        debug!(%status, url = %response.url(), "bitbucket response");

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let err = BitbucketError::from_status(status, &body);
        warn!(status = status.as_u16(), error = %err, "bitbucket request failed");
        Err(err)
    }

    async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> BitbucketResult<T> {
        let response = Self::send(request).await?;
        response
            .json()
            .await
            .map_err(|e| BitbucketError::InvalidResponse {
                message: e.to_string(),
            })
    }

    // -------------------------------------------------------------------------
    // Users
    // -------------------------------------------------------------------------

    #[instrument(skip(self))]
    pub async fn get_user_profile(&self, username: &str) -> BitbucketResult<Value> {
        require("username", username)?;
        Self::send_json(self.get(["users", username])?).await
    }

    #[instrument(skip(self))]
    pub async fn get_all_users(&self, filter: Option<&str>) -> BitbucketResult<Value> {
        let mut request = self.get(["users"])?;
        if let Some(filter) = filter.filter(|f| !f.is_empty()) {
            request = request.query(&[("filter", filter)]);
        }
        Self::send_json(request).await
    }

    // -------------------------------------------------------------------------
    // Projects and repositories
    // -------------------------------------------------------------------------

    #[instrument(skip(self))]
    pub async fn list_projects(&self, query: &ProjectQuery) -> BitbucketResult<Value> {
        require_limit(query.limit)?;
        Self::send_json(self.get(["projects"])?.query(query)).await
    }

    #[instrument(skip(self))]
    pub async fn list_repositories(&self, project_key: &str) -> BitbucketResult<Value> {
        require("projectKey", project_key)?;
        Self::send_json(self.get(["projects", project_key, "repos"])?).await
    }

    // -------------------------------------------------------------------------
    // Pull requests
    // -------------------------------------------------------------------------

    #[instrument(skip(self))]
    pub async fn get_inbox_pull_requests(
        &self,
        page: &PageQuery,
    ) -> BitbucketResult<Page<InboxPullRequest>> {
        require_limit(page.limit)?;
        Self::send_json(self.get(["inbox", "pull-requests"])?.query(page)).await
    }

    #[instrument(skip(self))]
    pub async fn get_pull_request(&self, key: &PullRequestKey) -> BitbucketResult<Value> {
        require_key(key)?;
        Self::send_json(self.get(key.segments())?).await
    }

    #[instrument(skip(self))]
    pub async fn get_pull_request_changes(
        &self,
        key: &PullRequestKey,
        limit: Option<u32>,
    ) -> BitbucketResult<Value> {
        require_key(key)?;
        require_limit(limit)?;

        let mut request = self
            .get(pull_request_segments(key, &["changes"]))?
            .query(&[("withComments", "true")]);
        if let Some(limit) = limit {
            request = request.query(&[("limit", limit)]);
        }
        Self::send_json(request).await
    }

    /// Fetch a pull request diff, whole or for one file.
    ///
    /// `format` only selects the `Accept` header; no conversion happens here.
    #[instrument(skip(self))]
    pub async fn get_pull_request_diff(
        &self,
        key: &PullRequestKey,
        path: Option<&str>,
        query: &DiffQuery,
        format: DiffFormat,
    ) -> BitbucketResult<DiffBody> {
        require_key(key)?;

        let mut segments = pull_request_segments(key, &["diff"]);
        if let Some(path) = path.filter(|p| !p.trim().is_empty()) {
            segments.extend(
                path.split('/')
                    .filter(|part| !part.is_empty())
                    .map(str::to_string),
            );
        }
        let request = self
            .get(segments)?
            .query(query)
            .header(ACCEPT, format.accept());

        match format {
            DiffFormat::Text => {
                let response = Self::send(request).await?;
                Ok(DiffBody::Text(response.text().await?))
            }
            DiffFormat::Json => Ok(DiffBody::Json(Self::send_json(request).await?)),
        }
    }

    /// Structured diff for one file, with line coordinates for inline comments.
    #[instrument(skip(self))]
    pub async fn get_pull_request_file_diff(
        &self,
        key: &PullRequestKey,
        path: &str,
        context_lines: Option<u32>,
    ) -> BitbucketResult<Value> {
        require("path", path)?;
        let query = DiffQuery {
            context_lines,
            ..Default::default()
        };
        match self
            .get_pull_request_diff(key, Some(path), &query, DiffFormat::Json)
            .await?
        {
            DiffBody::Json(value) => Ok(value),
            DiffBody::Text(text) => Ok(Value::String(text)),
        }
    }

    #[instrument(skip(self))]
    pub async fn get_pull_request_activities(
        &self,
        key: &PullRequestKey,
        page: &PageQuery,
    ) -> BitbucketResult<Page<RawActivity>> {
        require_key(key)?;
        require_limit(page.limit)?;
        Self::send_json(
            self.get(pull_request_segments(key, &["activities"]))?
                .query(page),
        )
        .await
    }

    #[instrument(skip(self, request), fields(project = %request.project_key, repo = %request.repository_slug))]
    pub async fn create_pull_request(&self, request: &NewPullRequest) -> BitbucketResult<Value> {
        require("projectKey", &request.project_key)?;
        require("repositorySlug", &request.repository_slug)?;
        require("fromBranch", &request.from_branch)?;
        require("toBranch", &request.to_branch)?;
        require("title", &request.title)?;
        for reviewer in &request.reviewers {
            require("reviewers", reviewer)?;
        }

        let segments = [
            "projects",
            request.project_key.as_str(),
            "repos",
            request.repository_slug.as_str(),
            "pull-requests",
        ];
        Self::send_json(self.post(segments)?.json(&request.to_body())).await
    }

    // -------------------------------------------------------------------------
    // Comments
    // -------------------------------------------------------------------------

    #[instrument(skip(self, body))]
    pub async fn add_pull_request_comment(
        &self,
        key: &PullRequestKey,
        body: &AddCommentBody,
    ) -> BitbucketResult<Value> {
        require_key(key)?;
        require("text", &body.text)?;
        if let Some(anchor) = &body.anchor {
            require("path", &anchor.path)?;
            if anchor.line == Some(0) {
                return Err(BitbucketError::invalid_input("line must be at least 1"));
            }
        }

        let segments = pull_request_segments(key, &["comments"]);
        Self::send_json(self.post(segments)?.json(body)).await
    }

    /// Delete a comment at the version the caller last saw.
    ///
    /// The server rejects stale versions and comments that have replies.
    #[instrument(skip(self))]
    pub async fn delete_pull_request_comment(
        &self,
        key: &PullRequestKey,
        comment_id: u64,
        version: u32,
    ) -> BitbucketResult<()> {
        require_key(key)?;
        let segments = pull_request_segments(key, &["comments", comment_id.to_string().as_str()]);
        Self::send(self.delete(segments)?.query(&[("version", version)])).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn add_comment_reaction(
        &self,
        key: &PullRequestKey,
        comment_id: u64,
        emoticon: Emoticon,
    ) -> BitbucketResult<Value> {
        require_key(key)?;
        let segments = reaction_segments(key, comment_id, emoticon);
        Self::send_json(self.request(Method::PUT, COMMENT_LIKES_ROOT, segments)?).await
    }

    #[instrument(skip(self))]
    pub async fn remove_comment_reaction(
        &self,
        key: &PullRequestKey,
        comment_id: u64,
        emoticon: Emoticon,
    ) -> BitbucketResult<()> {
        require_key(key)?;
        let segments = reaction_segments(key, comment_id, emoticon);
        Self::send(self.request(Method::DELETE, COMMENT_LIKES_ROOT, segments)?).await?;
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Review
    // -------------------------------------------------------------------------

    /// Username of the token owner, read from the `X-AUSERNAME` header of a
    /// cheap metadata request.
    #[instrument(skip(self))]
    pub async fn current_username(&self) -> BitbucketResult<String> {
        let request = self
            .get(["application-properties"])
            .map_err(|e| BitbucketError::IdentityLookup {
                source: Box::new(e),
            })?;
        let response = Self::send(request)
            .await
            .map_err(|e| BitbucketError::IdentityLookup {
                source: Box::new(e),
            })?;

        response
            .headers()
            .get(USERNAME_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .ok_or(BitbucketError::MissingIdentity)
    }

    /// Set the caller's own review status.
    ///
    /// The participants endpoint needs the caller's user slug, so the identity
    /// lookup runs first; if it fails the write is never sent.
    #[instrument(skip(self))]
    pub async fn update_review_status(
        &self,
        key: &PullRequestKey,
        status: ParticipantStatus,
    ) -> BitbucketResult<Value> {
        require_key(key)?;
        let user_slug = self.current_username().await?;
        debug!(%user_slug, "resolved caller identity");

        let segments = pull_request_segments(key, &["participants", user_slug.as_str()]);
        Self::send_json(self.put(segments)?.json(&ReviewStatusBody { status })).await
    }
}

fn pull_request_segments(key: &PullRequestKey, tail: &[&str]) -> Vec<String> {
    let mut segments = key.segments();
    segments.extend(tail.iter().map(|s| s.to_string()));
    segments
}

fn reaction_segments(key: &PullRequestKey, comment_id: u64, emoticon: Emoticon) -> Vec<String> {
    pull_request_segments(
        key,
        &[
            "comments",
            comment_id.to_string().as_str(),
            "reactions",
            emoticon.as_str(),
        ],
    )
}

fn require(field: &str, value: &str) -> BitbucketResult<()> {
    if value.trim().is_empty() {
        return Err(BitbucketError::invalid_input(format!(
            "{field} must not be empty"
        )));
    }
    Ok(())
}

fn require_key(key: &PullRequestKey) -> BitbucketResult<()> {
    require("projectKey", &key.project_key)?;
    require("repositorySlug", &key.repository_slug)
}

fn require_limit(limit: Option<u32>) -> BitbucketResult<()> {
    match limit {
        Some(0) => Err(BitbucketError::invalid_input("limit must be at least 1")),
        _ => Ok(()),
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod client_test;
