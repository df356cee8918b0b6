//! Turns store rows into the enriched objects the client renders.
//!
//! Every function collects the ids it needs up front and resolves them with
//! one set-based query per table, so the number of queries does not grow
//! with the number of rows.

use std::collections::BTreeSet;

use sociate_store::{Comment, Conversation, Message, Post};

use crate::db::StoreHandle;
use crate::dto::{CommentDto, ConversationDto, MessageDto, PostDto};
use crate::error::ApiError;

/// Attach liking user ids, comments with author usernames, and author
/// username/avatar to each post. Order is preserved.
pub async fn posts(store: &StoreHandle, posts: Vec<Post>) -> Result<Vec<PostDto>, ApiError> {
    if posts.is_empty() {
        return Ok(Vec::new());
    }

    let post_ids: Vec<String> = posts.iter().map(|p| p.id.clone()).collect();
    let like_ids = post_ids.clone();
    let (mut likes, mut comments) = tokio::try_join!(
        store.run(move |db| db.likes_for_posts(&like_ids)),
        store.run(move |db| db.comments_for_posts(&post_ids)),
    )?;

    let user_ids = unique(
        posts
            .iter()
            .map(|p| p.author_id.as_str())
            .chain(comments.values().flatten().map(|c| c.author_id.as_str())),
    );
    let users = store.run(move |db| db.users_by_ids(&user_ids)).await?;

    Ok(posts
        .into_iter()
        .map(|post| {
            let likes = likes.remove(&post.id).unwrap_or_default();
            let comments = comments
                .remove(&post.id)
                .unwrap_or_default()
                .into_iter()
                .map(|c| {
                    let author = users.get(&c.author_id);
                    CommentDto::new(c, author)
                })
                .collect();
            let author = users.get(&post.author_id);
            PostDto::new(post, author, likes, comments)
        })
        .collect())
}

/// Resolve comment author usernames.
pub async fn comments(
    store: &StoreHandle,
    comments: Vec<Comment>,
) -> Result<Vec<CommentDto>, ApiError> {
    let user_ids = unique(comments.iter().map(|c| c.author_id.as_str()));
    let users = store.run(move |db| db.users_by_ids(&user_ids)).await?;

    Ok(comments
        .into_iter()
        .map(|c| {
            let author = users.get(&c.author_id);
            CommentDto::new(c, author)
        })
        .collect())
}

/// Inline each sender's public profile.
pub async fn messages(
    store: &StoreHandle,
    messages: Vec<Message>,
) -> Result<Vec<MessageDto>, ApiError> {
    let user_ids = unique(messages.iter().map(|m| m.sender_id.as_str()));
    let users = store.run(move |db| db.users_by_ids(&user_ids)).await?;

    Ok(messages
        .into_iter()
        .map(|m| {
            let sender = users.get(&m.sender_id);
            MessageDto::new(m, sender)
        })
        .collect())
}

/// Attach the participant that is not `viewer` and the last message.
pub async fn conversations(
    store: &StoreHandle,
    viewer: &str,
    conversations: Vec<Conversation>,
) -> Result<Vec<ConversationDto>, ApiError> {
    if conversations.is_empty() {
        return Ok(Vec::new());
    }

    let other_ids = unique(conversations.iter().map(|c| c.other_participant(viewer)));
    let conversation_ids: Vec<String> = conversations.iter().map(|c| c.id.clone()).collect();
    let (users, mut last) = tokio::try_join!(
        store.run(move |db| db.users_by_ids(&other_ids)),
        store.run(move |db| db.last_messages(&conversation_ids)),
    )?;

    Ok(conversations
        .into_iter()
        .map(|c| {
            let other = users.get(c.other_participant(viewer));
            let last = last.remove(&c.id);
            ConversationDto::new(c, other, last)
        })
        .collect())
}

fn unique<'a>(ids: impl Iterator<Item = &'a str>) -> Vec<String> {
    ids.collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}
