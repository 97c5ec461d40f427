use crate::bitbucket::models::{
    RawComment, RawCommentProperties, RawLikedBy, RawReaction, RawUser, ShapedComment,
    ShapedCommentProperties, ShapedLikedBy, ShapedReaction, ShapedUser,
};

/// Drop `links`; every other user field passes through.
pub fn strip_user(user: RawUser) -> ShapedUser {
    ShapedUser(user.fields)
}

/// Collapse the list of reacting users into a count.
pub fn simplify_reaction(reaction: RawReaction) -> ShapedReaction {
    let count = match (&reaction.users, reaction.count) {
        (Some(users), _) => users.len() as u64,
        (None, Some(count)) => count,
        (None, None) => 0,
    };
    ShapedReaction {
        emoticon: reaction.emoticon,
        count,
    }
}

pub fn simplify_liked_by(liked_by: RawLikedBy) -> ShapedLikedBy {
    ShapedLikedBy {
        total: liked_by.total.unwrap_or(0),
    }
}

fn simplify_properties(properties: RawCommentProperties) -> ShapedCommentProperties {
    ShapedCommentProperties {
        reactions: properties
            .reactions
            .map(|r| r.into_iter().map(simplify_reaction).collect()),
        liked_by: properties.liked_by.map(simplify_liked_by),
        rest: properties.rest,
    }
}

/// Strip a comment and, recursively, every reply under it.
///
/// `anchor` and `permittedOperations` are dropped at every depth.
pub fn strip_comment(comment: RawComment) -> ShapedComment {
    ShapedComment {
        id: comment.id,
        author: comment.author.map(strip_user),
        properties: comment.properties.map(simplify_properties),
        comments: comment
            .comments
            .map(|replies| replies.into_iter().map(strip_comment).collect()),
        rest: comment.rest,
    }
}

#[cfg(test)]
#[path = "comments_test.rs"]
mod comments_test;
