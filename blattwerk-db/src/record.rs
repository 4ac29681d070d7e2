use blattwerk_common::model::{
    ModelValidationError,
    comment::{Comment, CommentBody},
    group::{Group, GroupSlug},
    post::{Post, PostBody},
    user::{User, Username},
};
use time::PrimitiveDateTime;

#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, sqlx::FromRow)]
pub(crate) struct UserRecord {
    pub user_id: i64,
    pub username: String,
    pub display_name: Option<String>,
}

#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, sqlx::FromRow)]
pub(crate) struct GroupRecord {
    pub group_id: i64,
    pub slug: String,
    pub title: String,
    pub description: String,
}

/// One feed row: the post joined with its author and, when present, its
/// group. Group columns come from a LEFT JOIN and are null together.
#[derive(Clone, Eq, PartialEq, Debug, Hash, sqlx::FromRow)]
pub(crate) struct PostRecord {
    pub post_id: i64,
    pub body: String,
    pub image_path: Option<String>,
    pub created_at: PrimitiveDateTime,
    pub author_id: i64,
    pub username: String,
    pub display_name: Option<String>,
    pub group_id: Option<i64>,
    pub group_slug: Option<String>,
    pub group_title: Option<String>,
    pub group_description: Option<String>,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, sqlx::FromRow)]
pub(crate) struct CommentRecord {
    pub comment_id: i64,
    pub post_id: i64,
    pub body: String,
    pub created_at: PrimitiveDateTime,
    pub author_id: i64,
    pub username: String,
    pub display_name: Option<String>,
}

impl TryFrom<UserRecord> for User {
    type Error = ModelValidationError;

    fn try_from(value: UserRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.user_id.into(),
            username: Username::new(value.username)?,
            display_name: value.display_name,
        })
    }
}

impl TryFrom<GroupRecord> for Group {
    type Error = ModelValidationError;

    fn try_from(value: GroupRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.group_id.into(),
            slug: GroupSlug::new(value.slug)?,
            title: value.title,
            description: value.description,
        })
    }
}

impl TryFrom<PostRecord> for Post {
    type Error = ModelValidationError;

    fn try_from(value: PostRecord) -> Result<Self, Self::Error> {
        let group = match (
            value.group_id,
            value.group_slug,
            value.group_title,
            value.group_description,
        ) {
            (Some(group_id), Some(slug), Some(title), Some(description)) => Some(Group {
                id: group_id.into(),
                slug: GroupSlug::new(slug)?,
                title,
                description,
            }),
            _ => None,
        };

        Ok(Self {
            id: value.post_id.into(),
            author: User {
                id: value.author_id.into(),
                username: Username::new(value.username)?,
                display_name: value.display_name,
            },
            group,
            body: PostBody::new(value.body)?,
            image: value.image_path,
            created_at: value.created_at.as_utc(),
        })
    }
}

impl TryFrom<CommentRecord> for Comment {
    type Error = ModelValidationError;

    fn try_from(value: CommentRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.comment_id.into(),
            post: value.post_id.into(),
            author: User {
                id: value.author_id.into(),
                username: Username::new(value.username)?,
                display_name: value.display_name,
            },
            body: CommentBody::new(value.body)?,
            created_at: value.created_at.as_utc(),
        })
    }
}
