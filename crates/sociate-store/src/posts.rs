//! CRUD operations for [`Post`] records.

use rusqlite::params;
use uuid::Uuid;

use sociate_shared::{time, MediaKind};

use crate::database::Database;
use crate::error::{not_found, Result, StoreError};
use crate::models::Post;
use crate::sql;

const POST_COLUMNS: &str = "id, author_id, caption, media_url, media_type, created_at";

impl Database {
    // ------------------------------------------------------------------
    // Create
    // ------------------------------------------------------------------

    /// Insert a new post authored by `author_id`, who must exist.
    pub fn create_post(
        &self,
        author_id: &str,
        caption: Option<&str>,
        media_url: Option<&str>,
        media_kind: Option<MediaKind>,
    ) -> Result<Post> {
        if !self.user_exists(author_id)? {
            return Err(StoreError::NotFound("User"));
        }

        let post = Post {
            id: Uuid::new_v4().to_string(),
            author_id: author_id.to_string(),
            caption: caption.map(str::to_string),
            media_url: media_url.map(str::to_string),
            media_kind,
            created_at: time::now(),
        };

        self.conn().execute(
            "INSERT INTO posts (id, author_id, caption, media_url, media_type, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                post.id,
                post.author_id,
                post.caption,
                post.media_url,
                post.media_kind.map(|k| k.as_str()),
                post.created_at.timestamp_millis(),
            ],
        )?;

        tracing::info!(post = %post.id, author = %post.author_id, "post created");
        Ok(post)
    }

    // ------------------------------------------------------------------
    // Read
    // ------------------------------------------------------------------

    pub fn get_post(&self, id: &str) -> Result<Post> {
        self.conn()
            .query_row(
                &format!("SELECT {POST_COLUMNS} FROM posts WHERE id = ?1"),
                params![id],
                row_to_post,
            )
            .map_err(not_found("Post"))
    }

    /// All posts by `author_id`, newest first.
    pub fn posts_by_author(&self, author_id: &str) -> Result<Vec<Post>> {
        let mut stmt = self.conn().prepare(&format!(
            "SELECT {POST_COLUMNS} FROM posts
             WHERE author_id = ?1
             ORDER BY created_at DESC, rowid DESC"
        ))?;
        let rows = stmt.query_map(params![author_id], row_to_post)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(StoreError::Sqlite)
    }

    /// The `limit` most recent posts from anyone, newest first.
    pub fn recent_posts(&self, limit: u32) -> Result<Vec<Post>> {
        let mut stmt = self.conn().prepare(&format!(
            "SELECT {POST_COLUMNS} FROM posts
             ORDER BY created_at DESC, rowid DESC
             LIMIT ?1"
        ))?;
        let rows = stmt.query_map(params![limit], row_to_post)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(StoreError::Sqlite)
    }

    /// The `limit` most recent posts by `viewer` or anyone `viewer`
    /// follows, newest first. The follow set is resolved inside the query.
    pub fn feed_posts(&self, viewer: &str, limit: u32) -> Result<Vec<Post>> {
        let mut stmt = self.conn().prepare(&format!(
            "SELECT {POST_COLUMNS} FROM posts
             WHERE author_id = ?1
                OR author_id IN (SELECT following_id FROM follows WHERE follower_id = ?1)
             ORDER BY created_at DESC, rowid DESC
             LIMIT ?2"
        ))?;
        let rows = stmt.query_map(params![viewer, limit], row_to_post)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(StoreError::Sqlite)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn row_to_post(row: &rusqlite::Row<'_>) -> rusqlite::Result<Post> {
    Ok(Post {
        id: row.get(0)?,
        author_id: row.get(1)?,
        caption: row.get(2)?,
        media_url: row.get(3)?,
        media_kind: sql::media_kind(row, 4)?,
        created_at: sql::timestamp(row, 5)?,
    })
}

#[cfg(test)]
mod tests {
    use sociate_shared::MediaKind;

    use crate::test_util::{seed_user, temp_db};
    use crate::StoreError;

    #[test]
    fn create_and_get() {
        let (db, _dir) = temp_db();
        seed_user(&db, "u1", "one");

        let post = db
            .create_post("u1", Some("hello"), Some("https://cdn/x.jpg"), Some(MediaKind::Image))
            .unwrap();
        let fetched = db.get_post(&post.id).unwrap();
        assert_eq!(fetched, post);
    }

    #[test]
    fn create_for_unknown_author_fails() {
        let (db, _dir) = temp_db();
        assert!(matches!(
            db.create_post("ghost", Some("x"), None, None),
            Err(StoreError::NotFound("User"))
        ));
    }

    #[test]
    fn author_posts_newest_first() {
        let (db, _dir) = temp_db();
        seed_user(&db, "u1", "one");
        let a = db.create_post("u1", Some("a"), None, None).unwrap();
        let b = db.create_post("u1", Some("b"), None, None).unwrap();

        let ids: Vec<_> = db
            .posts_by_author("u1")
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec![b.id, a.id]);
    }

    #[test]
    fn feed_posts_cover_viewer_and_followed_authors() {
        let (db, _dir) = temp_db();
        for (id, name) in [("u1", "one"), ("u2", "two"), ("u3", "three")] {
            seed_user(&db, id, name);
        }
        db.follow("u1", "u3").unwrap();
        for i in 0..4 {
            db.create_post("u1", Some(&format!("u1-{i}")), None, None).unwrap();
            db.create_post("u2", Some(&format!("u2-{i}")), None, None).unwrap();
            db.create_post("u3", Some(&format!("u3-{i}")), None, None).unwrap();
        }

        let posts = db.feed_posts("u1", 5).unwrap();
        assert_eq!(posts.len(), 5);
        assert!(posts.iter().all(|p| p.author_id != "u2"));
        assert_eq!(posts[0].caption.as_deref(), Some("u3-3"));

        // Without follows the viewer still sees their own posts.
        let own = db.feed_posts("u2", 50).unwrap();
        assert_eq!(own.len(), 4);
        assert!(own.iter().all(|p| p.author_id == "u2"));

        assert_eq!(db.recent_posts(50).unwrap().len(), 12);
    }
}
