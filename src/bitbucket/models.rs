//! Bitbucket Server REST shapes.
//!
//! Three groups live here:
//!
//! - closed vocabularies (states, statuses, diff coordinates, emoticons)
//! - request bodies and query strings sent upstream
//! - raw upstream shapes that the shaping layer reduces (`Raw*`) and their
//!   reduced counterparts (`Shaped*`, [`MinimalPullRequest`])
//!
//! Everything else the server returns is passed through as `serde_json::Value`.
//! Raw shapes keep unknown keys in a flattened map so that reduction only
//! removes what it names.

use rmcp::schemars::{self, JsonSchema};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// =============================================================================
// Vocabularies
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PullRequestState {
    Open,
    Merged,
    Declined,
}

/// Review status of a participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ParticipantStatus {
    Approved,
    NeedsWork,
    Unapproved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LineType {
    Added,
    Removed,
    Context,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FileType {
    From,
    To,
}

/// Diff a comment anchor is resolved against. New comments always target
/// the effective diff of the pull request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiffType {
    Effective,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum Whitespace {
    Show,
    IgnoreAll,
}

/// Representation requested from the diff endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum DiffFormat {
    /// Unified diff as plain text
    #[default]
    Text,
    /// Structured hunks/segments/lines
    Json,
}

impl DiffFormat {
    pub fn accept(self) -> &'static str {
        match self {
            DiffFormat::Text => "text/plain",
            DiffFormat::Json => "application/json",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Emoticon {
    Thumbsup,
    Thumbsdown,
    Heart,
    ThinkingFace,
    Laughing,
}

impl Emoticon {
    pub fn as_str(self) -> &'static str {
        match self {
            Emoticon::Thumbsup => "thumbsup",
            Emoticon::Thumbsdown => "thumbsdown",
            Emoticon::Heart => "heart",
            Emoticon::ThinkingFace => "thinking_face",
            Emoticon::Laughing => "laughing",
        }
    }
}

/// Pull request activity kinds, as reported in an activity's `action` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityAction {
    Approved,
    AutoMergeCancelled,
    AutoMergeRequested,
    Commented,
    Declined,
    Deleted,
    Merged,
    Opened,
    Reopened,
    Rescoped,
    ReviewCommented,
    ReviewDiscarded,
    ReviewFinished,
    Reviewed,
    Unapproved,
    Updated,
}

impl ActivityAction {
    pub fn as_str(self) -> &'static str {
        match self {
            ActivityAction::Approved => "APPROVED",
            ActivityAction::AutoMergeCancelled => "AUTO_MERGE_CANCELLED",
            ActivityAction::AutoMergeRequested => "AUTO_MERGE_REQUESTED",
            ActivityAction::Commented => "COMMENTED",
            ActivityAction::Declined => "DECLINED",
            ActivityAction::Deleted => "DELETED",
            ActivityAction::Merged => "MERGED",
            ActivityAction::Opened => "OPENED",
            ActivityAction::Reopened => "REOPENED",
            ActivityAction::Rescoped => "RESCOPED",
            ActivityAction::ReviewCommented => "REVIEW_COMMENTED",
            ActivityAction::ReviewDiscarded => "REVIEW_DISCARDED",
            ActivityAction::ReviewFinished => "REVIEW_FINISHED",
            ActivityAction::Reviewed => "REVIEWED",
            ActivityAction::Unapproved => "UNAPPROVED",
            ActivityAction::Updated => "UPDATED",
        }
    }
}

// =============================================================================
// Pagination
// =============================================================================

/// Envelope returned by every paged endpoint.
///
/// `nextPageStart` is absent on the last page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    #[serde(default)]
    pub size: u32,
    #[serde(default)]
    pub limit: u32,
    #[serde(default)]
    pub is_last_page: bool,
    #[serde(default)]
    pub start: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_start: Option<u32>,
    pub values: Vec<T>,
}

impl<T> Page<T> {
    /// Map the values while keeping the envelope verbatim.
    pub fn map_values<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            size: self.size,
            limit: self.limit,
            is_last_page: self.is_last_page,
            start: self.start,
            next_page_start: self.next_page_start,
            values: self.values.into_iter().map(f).collect(),
        }
    }
}

/// `start`/`limit` paging parameters, passed through verbatim.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct PageQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ProjectQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permission: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub since_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub until_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_lines: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub whitespace: Option<Whitespace>,
}

// =============================================================================
// Coordinates
// =============================================================================

/// Identifies one pull request on the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestKey {
    pub project_key: String,
    pub repository_slug: String,
    pub pull_request_id: u64,
}

impl PullRequestKey {
    pub fn new(
        project_key: impl Into<String>,
        repository_slug: impl Into<String>,
        pull_request_id: u64,
    ) -> Self {
        Self {
            project_key: project_key.into(),
            repository_slug: repository_slug.into(),
            pull_request_id,
        }
    }

    /// Unencoded segments of `projects/{key}/repos/{slug}/pull-requests/{id}`.
    pub fn segments(&self) -> Vec<String> {
        vec![
            "projects".to_string(),
            self.project_key.clone(),
            "repos".to_string(),
            self.repository_slug.clone(),
            "pull-requests".to_string(),
            self.pull_request_id.to_string(),
        ]
    }
}

// =============================================================================
// Request bodies
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentAnchor {
    pub path: String,
    pub diff_type: DiffType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_type: Option<LineType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_type: Option<FileType>,
}

impl CommentAnchor {
    /// Resolve where a new comment attaches.
    ///
    /// - no path: general comment, no anchor
    /// - path only: file comment
    /// - path and line: line comment; line type defaults to `CONTEXT`, file
    ///   side to `TO`
    pub fn resolve(
        path: Option<String>,
        line: Option<u32>,
        line_type: Option<LineType>,
        file_type: Option<FileType>,
    ) -> Option<Self> {
        let path = path?;
        let anchor = match line {
            None => Self {
                path,
                diff_type: DiffType::Effective,
                line: None,
                line_type: None,
                file_type: None,
            },
            Some(line) => Self {
                path,
                diff_type: DiffType::Effective,
                line: Some(line),
                line_type: Some(line_type.unwrap_or(LineType::Context)),
                file_type: Some(file_type.unwrap_or(FileType::To)),
            },
        };
        Some(anchor)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentParent {
    pub id: u64,
}

/// Body of `POST .../comments`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddCommentBody {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<CommentParent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor: Option<CommentAnchor>,
}

/// Caller-facing description of a new comment.
#[derive(Debug, Clone, Default)]
pub struct NewComment {
    pub text: String,
    pub parent_id: Option<u64>,
    pub path: Option<String>,
    pub line: Option<u32>,
    pub line_type: Option<LineType>,
    pub file_type: Option<FileType>,
}

impl NewComment {
    /// A parent id makes the comment a reply whether or not it is anchored.
    pub fn into_body(self) -> AddCommentBody {
        AddCommentBody {
            text: self.text,
            parent: self.parent_id.map(|id| CommentParent { id }),
            anchor: CommentAnchor::resolve(self.path, self.line, self.line_type, self.file_type),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectRef {
    pub key: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RepositoryRef {
    pub slug: String,
    pub project: ProjectRef,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BranchRef {
    pub id: String,
    pub repository: RepositoryRef,
}

impl BranchRef {
    /// Plain branch names become `refs/heads/<name>`; full refs are kept.
    pub fn new(branch: &str, project_key: &str, repository_slug: &str) -> Self {
        let id = if branch.starts_with("refs/") {
            branch.to_string()
        } else {
            format!("refs/heads/{branch}")
        };
        Self {
            id,
            repository: RepositoryRef {
                slug: repository_slug.to_string(),
                project: ProjectRef {
                    key: project_key.to_string(),
                },
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserName {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewerRef {
    pub user: UserName,
}

/// Body of `POST .../pull-requests`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePullRequestBody {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub from_ref: BranchRef,
    pub to_ref: BranchRef,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub reviewers: Vec<ReviewerRef>,
}

/// Caller-facing description of a new pull request within one repository.
#[derive(Debug, Clone, Default)]
pub struct NewPullRequest {
    pub project_key: String,
    pub repository_slug: String,
    pub from_branch: String,
    pub to_branch: String,
    pub title: String,
    pub description: Option<String>,
    pub reviewers: Vec<String>,
}

impl NewPullRequest {
    pub fn to_body(&self) -> CreatePullRequestBody {
        CreatePullRequestBody {
            title: self.title.clone(),
            description: self.description.clone(),
            from_ref: BranchRef::new(&self.from_branch, &self.project_key, &self.repository_slug),
            to_ref: BranchRef::new(&self.to_branch, &self.project_key, &self.repository_slug),
            reviewers: self
                .reviewers
                .iter()
                .map(|name| ReviewerRef {
                    user: UserName { name: name.clone() },
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReviewStatusBody {
    pub status: ParticipantStatus,
}

// =============================================================================
// Raw upstream shapes
// =============================================================================

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawUser {
    #[serde(default)]
    pub links: Option<Value>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawReaction {
    #[serde(default)]
    pub emoticon: Value,
    #[serde(default)]
    pub users: Option<Vec<Value>>,
    /// Present only on reactions that were already shaped.
    #[serde(default)]
    pub count: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawLikedBy {
    #[serde(default)]
    pub total: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCommentProperties {
    #[serde(default)]
    pub reactions: Option<Vec<RawReaction>>,
    #[serde(default)]
    pub liked_by: Option<RawLikedBy>,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawComment {
    pub id: u64,
    #[serde(default)]
    pub author: Option<RawUser>,
    #[serde(default)]
    pub anchor: Option<Value>,
    #[serde(default)]
    pub permitted_operations: Option<Value>,
    #[serde(default)]
    pub properties: Option<RawCommentProperties>,
    #[serde(default)]
    pub comments: Option<Vec<RawComment>>,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

/// One entry of `GET .../activities`.
///
/// `action` stays a string so actions added by newer servers still decode.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawActivity {
    pub id: u64,
    pub action: String,
    #[serde(default)]
    pub user: Option<RawUser>,
    #[serde(default)]
    pub comment: Option<RawComment>,
    #[serde(default)]
    pub diff: Option<Value>,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorUser {
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct InboxAuthor {
    pub user: AuthorUser,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct InboxProject {
    pub key: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct InboxRepository {
    pub slug: String,
    pub project: InboxProject,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct InboxRef {
    pub repository: InboxRepository,
}

/// Pull request as listed by `GET /inbox/pull-requests`.
///
/// The inbox always carries the author and the target repository with its
/// project; the reviewers, participants and links are ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboxPullRequest {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub state: PullRequestState,
    pub author: InboxAuthor,
    pub to_ref: InboxRef,
    pub created_date: i64,
    pub updated_date: i64,
}

// =============================================================================
// Shaped output
// =============================================================================

/// Inbox pull request reduced to the nine fields a reviewer needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MinimalPullRequest {
    pub id: u64,
    pub title: String,
    pub description: Option<String>,
    pub state: PullRequestState,
    /// Author display name
    pub author: String,
    pub project_key: String,
    pub repository_slug: String,
    pub created_date: i64,
    pub updated_date: i64,
}

/// User without `links`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShapedUser(pub Map<String, Value>);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapedReaction {
    pub emoticon: Value,
    pub count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShapedLikedBy {
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapedCommentProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reactions: Option<Vec<ShapedReaction>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub liked_by: Option<ShapedLikedBy>,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapedComment {
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<ShapedUser>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<ShapedCommentProperties>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<Vec<ShapedComment>>,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapedActivity {
    pub id: u64,
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<ShapedUser>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<ShapedComment>,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

#[cfg(test)]
#[path = "models_test.rs"]
mod models_test;
