//! Post resource operations.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{NewPost, Post};
use crate::error::{DomainError, RepoError};
use crate::ports::{PostRepository, UserRepository};
use crate::validation::{Validator, not_blank};

const POST: &str = "Post";

/// Create, list, fetch and delete posts on behalf of an authenticated caller.
///
/// The caller's identity is resolved before any of these methods run; a
/// request without one never reaches this service.
pub struct PostService {
    posts: Arc<dyn PostRepository>,
    users: Arc<dyn UserRepository>,
    rules: Validator<NewPost>,
}

impl PostService {
    pub fn new(posts: Arc<dyn PostRepository>, users: Arc<dyn UserRepository>) -> Self {
        Self {
            posts,
            users,
            rules: Self::rules(),
        }
    }

    /// Rules applied to a create payload.
    pub fn rules() -> Validator<NewPost> {
        Validator::<NewPost>::new().rule("text", "Text is required", |p| not_blank(&p.text))
    }

    /// Validate `input`, snapshot the caller's profile and persist a new post.
    ///
    /// A caller whose profile cannot be found is an internal error: the token
    /// was issued for a user the store no longer knows.
    pub async fn create(&self, caller: Uuid, input: NewPost) -> Result<Post, DomainError> {
        let violations = self.rules.validate(&input);
        if violations.has_violations() {
            return Err(DomainError::Validation(violations));
        }

        let author = self
            .users
            .find_by_id(caller)
            .await?
            .ok_or_else(|| DomainError::Internal(format!("no profile for user {caller}")))?;

        let post = Post::new(&author, input.text);
        let saved = self.posts.create(post).await.map_err(|e| match e {
            // Post ids are generated here, so a collision is a store fault.
            RepoError::Constraint(msg) => DomainError::Internal(format!("storing post: {msg}")),
            other => other.into(),
        })?;

        tracing::debug!(post_id = %saved.id, user_id = %caller, "post stored");
        Ok(saved)
    }

    /// All posts, newest first.
    pub async fn list(&self) -> Result<Vec<Post>, DomainError> {
        Ok(self.posts.list_recent().await?)
    }

    /// Fetch one post. Ids that are not valid UUIDs are reported as not found.
    pub async fn get_by_id(&self, raw_id: &str) -> Result<Post, DomainError> {
        let id = parse_id(raw_id)?;
        self.posts
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found(POST, raw_id))
    }

    /// Delete a post owned by `caller`.
    ///
    /// Ownership is checked against the authenticated caller. The route id is
    /// only used to locate the post.
    pub async fn delete_by_id(&self, raw_id: &str, caller: Uuid) -> Result<(), DomainError> {
        let post = self.get_by_id(raw_id).await?;

        if !post.is_owned_by(caller) {
            tracing::warn!(post_id = %post.id, user_id = %caller, "delete rejected, not the owner");
            return Err(DomainError::Unauthorized);
        }

        match self.posts.delete(post.id).await {
            Ok(()) => Ok(()),
            // Removed by a concurrent request between lookup and delete.
            Err(RepoError::NotFound) => Err(DomainError::not_found(POST, raw_id)),
            Err(e) => Err(e.into()),
        }
    }
}

fn parse_id(raw_id: &str) -> Result<Uuid, DomainError> {
    Uuid::parse_str(raw_id).map_err(|_| DomainError::not_found(POST, raw_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::User;
    use crate::ports::BaseRepository;
    use async_trait::async_trait;

    /// Knows one user and rejects every post insert with a constraint error.
    struct CollidingStore {
        author: User,
    }

    #[async_trait]
    impl BaseRepository<User, Uuid> for CollidingStore {
        async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
            Ok((id == self.author.id).then(|| self.author.clone()))
        }

        async fn create(&self, user: User) -> Result<User, RepoError> {
            Ok(user)
        }

        async fn delete(&self, _id: Uuid) -> Result<(), RepoError> {
            Err(RepoError::NotFound)
        }
    }

    #[async_trait]
    impl UserRepository for CollidingStore {
        async fn find_by_email(&self, _email: &str) -> Result<Option<User>, RepoError> {
            Ok(None)
        }
    }

    #[async_trait]
    impl BaseRepository<Post, Uuid> for CollidingStore {
        async fn find_by_id(&self, _id: Uuid) -> Result<Option<Post>, RepoError> {
            Ok(None)
        }

        async fn create(&self, _post: Post) -> Result<Post, RepoError> {
            Err(RepoError::Constraint("duplicate key value".to_string()))
        }

        async fn delete(&self, _id: Uuid) -> Result<(), RepoError> {
            Err(RepoError::NotFound)
        }
    }

    #[async_trait]
    impl PostRepository for CollidingStore {
        async fn list_recent(&self) -> Result<Vec<Post>, RepoError> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_create_store_constraint_is_internal() {
        let author = User::new(
            "Ada".to_string(),
            "ada@example.com".to_string(),
            String::new(),
            "hash".to_string(),
        );
        let store = Arc::new(CollidingStore {
            author: author.clone(),
        });
        let service = PostService::new(store.clone(), store);

        let err = service
            .create(
                author.id,
                NewPost {
                    text: "hello".to_string(),
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::Internal(_)));
    }

    #[test]
    fn test_rules_reject_blank_text() {
        let rules = PostService::rules();

        let empty = rules.validate(&NewPost::default());
        let blank = rules.validate(&NewPost {
            text: "  \n ".to_string(),
        });

        assert!(empty.has_violations());
        assert!(blank.has_violations());
        assert_eq!(empty.violations()[0].field, "text");
        assert_eq!(empty.violations()[0].message, "Text is required");
    }

    #[test]
    fn test_rules_accept_text() {
        let rules = PostService::rules();

        let result = rules.validate(&NewPost {
            text: "hello".to_string(),
        });

        assert!(!result.has_violations());
    }

    #[test]
    fn test_parse_id_normalizes_malformed_ids() {
        let err = parse_id("not-a-uuid").unwrap_err();

        assert!(matches!(
            err,
            DomainError::NotFound { entity_type: "Post", ref id } if id == "not-a-uuid"
        ));
        assert!(parse_id(&Uuid::new_v4().to_string()).is_ok());
    }
}
