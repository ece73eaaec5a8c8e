use chrono::{DateTime, Utc};
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use super::User;

/// Post entity - a short text message owned by the user who wrote it.
///
/// `name` and `avatar` are copies of the author's profile taken when the post
/// is created. They are never refreshed from the user record afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub user_id: Uuid,
    pub text: String,
    pub name: String,
    pub avatar: String,
    pub created_at: DateTime<Utc>,
}

impl Post {
    /// Create a new post authored by `author`.
    pub fn new(author: &User, text: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: author.id,
            text,
            name: author.name.clone(),
            avatar: author.avatar.clone(),
            created_at: Utc::now(),
        }
    }

    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.user_id == user_id
    }
}

/// Payload for creating a post. A missing, null or non-string `text`
/// deserializes as empty so the validation stage, not the JSON parser,
/// reports it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewPost {
    #[serde(default, deserialize_with = "lenient_text")]
    pub text: String,
}

fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Text {
        Str(String),
        Other(IgnoredAny),
    }

    Ok(match Option::<Text>::deserialize(deserializer)? {
        Some(Text::Str(text)) => text,
        Some(Text::Other(_)) | None => String::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn author() -> User {
        User::new(
            "Ada Lovelace".to_string(),
            "ada@example.com".to_string(),
            "//gravatar/ada".to_string(),
            "hash".to_string(),
        )
    }

    #[test]
    fn test_new_post_snapshots_author_profile() {
        let mut user = author();
        let post = Post::new(&user, "hello".to_string());

        user.name = "Countess".to_string();
        user.avatar = "//gravatar/new".to_string();

        assert_eq!(post.user_id, user.id);
        assert_eq!(post.name, "Ada Lovelace");
        assert_eq!(post.avatar, "//gravatar/ada");
    }

    #[test]
    fn test_is_owned_by() {
        let user = author();
        let post = Post::new(&user, "hello".to_string());

        assert!(post.is_owned_by(user.id));
        assert!(!post.is_owned_by(Uuid::new_v4()));
        assert!(!post.is_owned_by(post.id));
    }

    #[test]
    fn test_new_post_treats_unusable_text_as_empty() {
        for body in [r#"{}"#, r#"{"text":null}"#, r#"{"text":5}"#, r#"{"text":["a"]}"#] {
            let input: NewPost = serde_json::from_str(body).unwrap();
            assert_eq!(input.text, "", "body {body}");
        }

        let input: NewPost = serde_json::from_str(r#"{"text":"hi"}"#).unwrap();
        assert_eq!(input.text, "hi");
    }
}
