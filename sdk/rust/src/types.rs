//! Request and response schemas for each gateway endpoint.

use serde::{Deserialize, Serialize};

/// `POST /api/auth/login`
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
}

/// `GET /api/user/me`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// `POST /api/requirement`: the free-text ask that a generation works from.
#[derive(Debug, Clone, Serialize)]
pub struct NewRequirement {
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Requirement {
    pub id: i64,
    #[serde(default)]
    pub content: Option<String>,
}

/// `POST /api/recipe/generate`
#[derive(Debug, Clone, Serialize)]
pub struct GenerateRecipe {
    pub requirement_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeAuthor {
    #[serde(default)]
    pub id: Option<i64>,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequirementSummary {
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: i64,
    #[serde(default)]
    pub content: Option<String>,
    pub rating: u8,
    pub created_at: String,
    pub user: RecipeAuthor,
}

/// A recipe as returned by listing, detail and generation endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub user: Option<RecipeAuthor>,
    #[serde(default)]
    pub requirement: Option<RequirementSummary>,
    #[serde(default)]
    pub reviews: Vec<Review>,
}

/// `POST /api/saved-recipe`
#[derive(Debug, Clone, Serialize)]
pub struct SaveRecipe {
    pub recipe_id: i64,
}

/// Result of `POST /api/saved-recipe`, which toggles the saved state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveToggle {
    pub saved: bool,
}

/// Entry of `GET /api/saved-recipe`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedRecipe {
    pub id: i64,
    pub recipe_id: i64,
    #[serde(default)]
    pub created_at: Option<String>,
    pub recipe: Recipe,
}

/// `POST /api/review`
#[derive(Debug, Clone, Serialize)]
pub struct NewReview {
    pub recipe_id: i64,
    pub content: String,
    pub rating: u8,
}

/// `PUT /api/review/:id`
#[derive(Debug, Clone, Serialize)]
pub struct ReviewUpdate {
    pub content: String,
    pub rating: u8,
}

/// `GET`/`PATCH /api/user/preferences`: free text passed along to generation.
/// An empty string clears it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub preferences: String,
}

/// `PATCH /api/user/:id`. Changes are confirmed with the current password.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AccountUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(rename = "currentPassword")]
    pub current_password: String,
}

impl AccountUpdate {
    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.email.is_none()
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Error body produced by the gateway (`error`) or the backend (`message`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recipe_tolerates_sparse_payloads() {
        let recipe: Recipe = serde_json::from_str(r#"{"id":7,"title":"Soup"}"#).unwrap();
        assert_eq!(recipe.id, 7);
        assert_eq!(recipe.title, "Soup");
        assert!(recipe.reviews.is_empty());
        assert!(recipe.user.is_none());
    }

    #[test]
    fn recipe_reads_nested_author_and_reviews() {
        let recipe: Recipe = serde_json::from_str(
            r#"{
                "id": 3, "title": "Dal", "description": "Lentils", "views": 12, "score": 4.5,
                "created_at": "2025-01-02T03:04:05Z",
                "user": {"id": 1, "username": "asha"},
                "requirement": {"content": "something warm"},
                "reviews": [{"id": 9, "rating": 5, "created_at": "2025-01-03", "user": {"username": "lee"}}]
            }"#,
        )
        .unwrap();
        assert_eq!(recipe.user.unwrap().username, "asha");
        assert_eq!(recipe.reviews[0].rating, 5);
        assert_eq!(recipe.reviews[0].content, None);
    }

    #[test]
    fn null_preferences_read_as_empty() {
        let prefs: Preferences = serde_json::from_str(r#"{"preferences":null}"#).unwrap();
        assert_eq!(prefs.preferences, "");
    }

    #[test]
    fn account_update_sends_only_changed_fields() {
        let update = AccountUpdate {
            email: Some("asha@example.com".into()),
            current_password: "pw".into(),
            ..AccountUpdate::default()
        };
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            serde_json::json!({ "email": "asha@example.com", "currentPassword": "pw" })
        );
    }
}
