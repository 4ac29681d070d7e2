use crate::record::{CommentRecord, GroupRecord, PostRecord, UserRecord};
use blattwerk_common::model::{
    Id, ModelValidationError,
    comment::{Comment, CommentMarker, CreateComment},
    group::{CreateGroup, Group, GroupMarker, GroupSlug},
    post::{CreatePost, Post, PostDraft, PostMarker},
    user::{CreateUser, User, UserMarker, Username},
};
use sqlx::{PgPool, migrate::Migrator, postgres::PgPoolOptions};
use thiserror::Error;

static MIGRATOR: Migrator = sqlx::migrate!();

pub type Result<T, E = DbError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("An object in the database was invalid: {0}")]
    Data(#[from] ModelValidationError),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error("Running migrations failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

pub struct DbClient {
    pool: PgPool,
}

impl DbClient {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(8)
            .connect(database_url)
            .await?;

        Ok(Self::new(pool))
    }

    pub async fn run_migrations(&self) -> Result<()> {
        MIGRATOR.run(&self.pool).await?;
        Ok(())
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Provisions a user row for an identity the identity collaborator
    /// asserted. Idempotent; an absent display name never clears a stored
    /// one.
    pub async fn upsert_user(&self, user: &CreateUser) -> Result<User> {
        let record = sqlx::query_as::<_, UserRecord>(
            "
            INSERT INTO users (username, display_name)
            VALUES ($1, $2)
            ON CONFLICT (username) DO UPDATE
                SET display_name = COALESCE(EXCLUDED.display_name, users.display_name)
            RETURNING user_id, username, display_name
            ",
        )
        .bind(user.username.get())
        .bind(user.display_name.as_deref())
        .fetch_one(&self.pool)
        .await?;

        Ok(record.try_into()?)
    }

    pub async fn fetch_user_by_username(&self, username: &Username) -> Result<Option<User>> {
        let record = sqlx::query_as::<_, UserRecord>(
            "
            SELECT user_id, username, display_name
            FROM users
            WHERE username = $1
            ",
        )
        .bind(username.get())
        .fetch_optional(&self.pool)
        .await?;

        let user = record.map(User::try_from).transpose()?;
        Ok(user)
    }

    pub async fn create_group(&self, group: &CreateGroup) -> Result<Group> {
        let record = sqlx::query_as::<_, GroupRecord>(
            "
            INSERT INTO groups (slug, title, description)
            VALUES ($1, $2, $3)
            RETURNING group_id, slug, title, description
            ",
        )
        .bind(group.slug.get())
        .bind(&group.title)
        .bind(&group.description)
        .fetch_one(&self.pool)
        .await?;

        Ok(record.try_into()?)
    }

    pub async fn fetch_group(&self, group_id: Id<GroupMarker>) -> Result<Option<Group>> {
        let record = sqlx::query_as::<_, GroupRecord>(
            "
            SELECT group_id, slug, title, description
            FROM groups
            WHERE group_id = $1
            ",
        )
        .bind(group_id.get())
        .fetch_optional(&self.pool)
        .await?;

        let group = record.map(Group::try_from).transpose()?;
        Ok(group)
    }

    pub async fn fetch_group_by_slug(&self, slug: &GroupSlug) -> Result<Option<Group>> {
        let record = sqlx::query_as::<_, GroupRecord>(
            "
            SELECT group_id, slug, title, description
            FROM groups
            WHERE slug = $1
            ",
        )
        .bind(slug.get())
        .fetch_optional(&self.pool)
        .await?;

        let group = record.map(Group::try_from).transpose()?;
        Ok(group)
    }

    pub async fn list_groups(&self) -> Result<Vec<Group>> {
        let records = sqlx::query_as::<_, GroupRecord>(
            "
            SELECT group_id, slug, title, description
            FROM groups
            ORDER BY title ASC, group_id ASC
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        let groups = records
            .into_iter()
            .map(Group::try_from)
            .collect::<Result<_, _>>()?;
        Ok(groups)
    }

    pub async fn create_post(&self, post: &CreatePost) -> Result<Id<PostMarker>> {
        let post_id = sqlx::query_scalar::<_, i64>(
            "
            INSERT INTO posts (author_id, group_id, body, image_path)
            VALUES ($1, $2, $3, $4)
            RETURNING post_id
            ",
        )
        .bind(post.author.get())
        .bind(post.group.map(Id::get))
        .bind(post.body.get())
        .bind(post.image.as_deref())
        .fetch_one(&self.pool)
        .await?;

        Ok(post_id.into())
    }

    pub async fn fetch_post(&self, post_id: Id<PostMarker>) -> Result<Option<Post>> {
        let record = sqlx::query_as::<_, PostRecord>(
            "
            SELECT
                posts.post_id,
                posts.body,
                posts.image_path,
                posts.created_at,
                users.user_id AS author_id,
                users.username,
                users.display_name,
                groups.group_id,
                groups.slug AS group_slug,
                groups.title AS group_title,
                groups.description AS group_description
            FROM posts
                JOIN users ON users.user_id = posts.author_id
                LEFT JOIN groups ON groups.group_id = posts.group_id
            WHERE posts.post_id = $1
            ",
        )
        .bind(post_id.get())
        .fetch_optional(&self.pool)
        .await?;

        let post = record.map(Post::try_from).transpose()?;
        Ok(post)
    }

    /// Applies an author's edit. Authorship and `created_at` are untouchable
    /// by design; callers gate on authorship first.
    pub async fn update_post(&self, post_id: Id<PostMarker>, draft: &PostDraft) -> Result<()> {
        sqlx::query(
            "
            UPDATE posts
            SET body = $2, group_id = $3, image_path = $4
            WHERE post_id = $1
            ",
        )
        .bind(post_id.get())
        .bind(draft.body.get())
        .bind(draft.group.map(Id::get))
        .bind(draft.image.as_deref())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn list_posts(&self) -> Result<Vec<Post>> {
        let records = sqlx::query_as::<_, PostRecord>(
            "
            SELECT
                posts.post_id,
                posts.body,
                posts.image_path,
                posts.created_at,
                users.user_id AS author_id,
                users.username,
                users.display_name,
                groups.group_id,
                groups.slug AS group_slug,
                groups.title AS group_title,
                groups.description AS group_description
            FROM posts
                JOIN users ON users.user_id = posts.author_id
                LEFT JOIN groups ON groups.group_id = posts.group_id
            ORDER BY posts.created_at DESC, posts.post_id DESC
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        collect_posts(records)
    }

    pub async fn list_group_posts(&self, group_id: Id<GroupMarker>) -> Result<Vec<Post>> {
        let records = sqlx::query_as::<_, PostRecord>(
            "
            SELECT
                posts.post_id,
                posts.body,
                posts.image_path,
                posts.created_at,
                users.user_id AS author_id,
                users.username,
                users.display_name,
                groups.group_id,
                groups.slug AS group_slug,
                groups.title AS group_title,
                groups.description AS group_description
            FROM posts
                JOIN users ON users.user_id = posts.author_id
                JOIN groups ON groups.group_id = posts.group_id
            WHERE posts.group_id = $1
            ORDER BY posts.created_at DESC, posts.post_id DESC
            ",
        )
        .bind(group_id.get())
        .fetch_all(&self.pool)
        .await?;

        collect_posts(records)
    }

    pub async fn list_author_posts(&self, author_id: Id<UserMarker>) -> Result<Vec<Post>> {
        let records = sqlx::query_as::<_, PostRecord>(
            "
            SELECT
                posts.post_id,
                posts.body,
                posts.image_path,
                posts.created_at,
                users.user_id AS author_id,
                users.username,
                users.display_name,
                groups.group_id,
                groups.slug AS group_slug,
                groups.title AS group_title,
                groups.description AS group_description
            FROM posts
                JOIN users ON users.user_id = posts.author_id
                LEFT JOIN groups ON groups.group_id = posts.group_id
            WHERE posts.author_id = $1
            ORDER BY posts.created_at DESC, posts.post_id DESC
            ",
        )
        .bind(author_id.get())
        .fetch_all(&self.pool)
        .await?;

        collect_posts(records)
    }

    /// Union of posts authored by everyone the viewer follows, newest first.
    pub async fn list_followed_posts(&self, viewer_id: Id<UserMarker>) -> Result<Vec<Post>> {
        let records = sqlx::query_as::<_, PostRecord>(
            "
            SELECT
                posts.post_id,
                posts.body,
                posts.image_path,
                posts.created_at,
                users.user_id AS author_id,
                users.username,
                users.display_name,
                groups.group_id,
                groups.slug AS group_slug,
                groups.title AS group_title,
                groups.description AS group_description
            FROM posts
                JOIN follows ON follows.author_id = posts.author_id
                JOIN users ON users.user_id = posts.author_id
                LEFT JOIN groups ON groups.group_id = posts.group_id
            WHERE follows.user_id = $1
            ORDER BY posts.created_at DESC, posts.post_id DESC
            ",
        )
        .bind(viewer_id.get())
        .fetch_all(&self.pool)
        .await?;

        collect_posts(records)
    }

    pub async fn create_comment(&self, comment: &CreateComment) -> Result<Id<CommentMarker>> {
        let comment_id = sqlx::query_scalar::<_, i64>(
            "
            INSERT INTO comments (post_id, author_id, body)
            VALUES ($1, $2, $3)
            RETURNING comment_id
            ",
        )
        .bind(comment.post.get())
        .bind(comment.author.get())
        .bind(comment.body.get())
        .fetch_one(&self.pool)
        .await?;

        Ok(comment_id.into())
    }

    /// Comments under a post in the order they were written.
    pub async fn list_post_comments(&self, post_id: Id<PostMarker>) -> Result<Vec<Comment>> {
        let records = sqlx::query_as::<_, CommentRecord>(
            "
            SELECT
                comments.comment_id,
                comments.post_id,
                comments.body,
                comments.created_at,
                users.user_id AS author_id,
                users.username,
                users.display_name
            FROM comments
                JOIN users ON users.user_id = comments.author_id
            WHERE comments.post_id = $1
            ORDER BY comments.created_at ASC, comments.comment_id ASC
            ",
        )
        .bind(post_id.get())
        .fetch_all(&self.pool)
        .await?;

        let comments = records
            .into_iter()
            .map(Comment::try_from)
            .collect::<Result<_, _>>()?;
        Ok(comments)
    }

    /// Creates the follow edge unless it already exists. Following yourself
    /// is silently ignored.
    pub async fn follow(&self, follower: Id<UserMarker>, author: Id<UserMarker>) -> Result<()> {
        if follower == author {
            return Ok(());
        }

        sqlx::query(
            "
            INSERT INTO follows (user_id, author_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, author_id) DO NOTHING
            ",
        )
        .bind(follower.get())
        .bind(author.get())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Removes the follow edge. A missing edge is not an error.
    pub async fn unfollow(&self, follower: Id<UserMarker>, author: Id<UserMarker>) -> Result<()> {
        sqlx::query(
            "
            DELETE FROM follows
            WHERE user_id = $1 AND author_id = $2
            ",
        )
        .bind(follower.get())
        .bind(author.get())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn is_following(
        &self,
        follower: Id<UserMarker>,
        author: Id<UserMarker>,
    ) -> Result<bool> {
        let following = sqlx::query_scalar::<_, bool>(
            "
            SELECT EXISTS (
                SELECT 1 FROM follows
                WHERE user_id = $1 AND author_id = $2
            )
            ",
        )
        .bind(follower.get())
        .bind(author.get())
        .fetch_one(&self.pool)
        .await?;

        Ok(following)
    }
}

fn collect_posts(records: Vec<PostRecord>) -> Result<Vec<Post>> {
    let posts = records
        .into_iter()
        .map(Post::try_from)
        .collect::<Result<_, ModelValidationError>>()?;
    Ok(posts)
}
