use crate::bitbucket::models::{InboxPullRequest, MinimalPullRequest, Page};

/// Flatten an inbox pull request to its nine reviewer-facing fields.
pub fn minimal_pull_request(pr: InboxPullRequest) -> MinimalPullRequest {
    MinimalPullRequest {
        id: pr.id,
        title: pr.title,
        description: pr.description,
        state: pr.state,
        author: pr.author.user.display_name,
        project_key: pr.to_ref.repository.project.key,
        repository_slug: pr.to_ref.repository.slug,
        created_date: pr.created_date,
        updated_date: pr.updated_date,
    }
}

/// Reduce every pull request on an inbox page; the envelope is kept as-is.
pub fn shape_inbox_page(page: Page<InboxPullRequest>) -> Page<MinimalPullRequest> {
    page.map_values(minimal_pull_request)
}
