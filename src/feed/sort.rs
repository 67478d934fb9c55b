use crate::feed::Post;

/// Order posts newest first.
///
/// The sort is stable: posts sharing a timestamp keep the relative order
/// they had on input.
pub fn sort_by_recency(posts: &mut [Post]) {
    posts.sort_by(|a, b| b.published_at.cmp(&a.published_at));
}
