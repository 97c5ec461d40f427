use crate::bitbucket::models::{ActivityAction, Page, RawActivity, ShapedActivity};
use crate::shaping::comments::{strip_comment, strip_user};

/// Drop the attached `diff` and strip the actor and comment.
pub fn strip_activity(activity: RawActivity) -> ShapedActivity {
    ShapedActivity {
        id: activity.id,
        action: activity.action,
        user: activity.user.map(strip_user),
        comment: activity.comment.map(strip_comment),
        rest: activity.rest,
    }
}

/// Strip every activity on a page and optionally keep only some actions.
///
/// With a non-empty filter, `size` is set to the number of retained
/// activities. `start`, `isLastPage` and `nextPageStart` still describe the
/// unfiltered upstream page.
pub fn shape_activity_page(
    mut page: Page<RawActivity>,
    filter: Option<&[ActivityAction]>,
) -> Page<ShapedActivity> {
    if let Some(actions) = filter.filter(|f| !f.is_empty()) {
        page.values
            .retain(|a| actions.iter().any(|wanted| wanted.as_str() == a.action));
        page.size = page.values.len() as u32;
    }

    page.map_values(strip_activity)
}
