use reqwest::{header::AUTHORIZATION, Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Result, SdkError};
use crate::session::Session;
use crate::types::{
    AccountUpdate, ErrorBody, GenerateRecipe, LoginRequest, NewRequirement, NewReview,
    Preferences, Recipe, Requirement, ReviewUpdate, SaveRecipe, SaveToggle, SavedRecipe,
    TokenResponse, UserProfile,
};

/// Typed client for the recipe gateway.
#[derive(Debug, Clone)]
pub struct RecipeClient {
    client: Client,
    gateway_url: String,
}

impl RecipeClient {
    pub fn new(gateway_url: &str) -> Self {
        Self::with_client(Client::new(), gateway_url)
    }

    /// Use a preconfigured `reqwest::Client` (timeouts, proxies).
    pub fn with_client(client: Client, gateway_url: &str) -> Self {
        Self {
            client,
            gateway_url: gateway_url.trim_end_matches('/').to_string(),
        }
    }

    /// Exchange credentials for a token, store it in `session` and return the profile.
    pub async fn login(&self, session: &mut Session, username: &str, password: &str) -> Result<UserProfile> {
        let body = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let token: TokenResponse = self
            .send(self.request(Method::POST, "/api/auth/login").json(&body))
            .await?;
        session.sign_in(token.access_token);

        match self.me(session).await {
            Ok(profile) => Ok(profile),
            Err(e) => {
                session.sign_out();
                Err(e)
            }
        }
    }

    pub async fn me(&self, session: &Session) -> Result<UserProfile> {
        self.get_authed(session, "/api/user/me").await
    }

    pub async fn create_requirement(&self, session: &Session, content: &str) -> Result<Requirement> {
        let body = NewRequirement {
            content: content.to_string(),
        };
        self.post_authed(session, "/api/requirement", &body).await
    }

    /// Generate a recipe from an existing requirement. May take minutes.
    pub async fn generate_recipe(&self, session: &Session, requirement_id: i64) -> Result<Recipe> {
        self.post_authed(session, "/api/recipe/generate", &GenerateRecipe { requirement_id })
            .await
    }

    /// Create a requirement from free text, then generate a recipe for it.
    pub async fn generate_from_prompt(&self, session: &Session, prompt: &str) -> Result<Recipe> {
        let requirement = self.create_requirement(session, prompt).await?;
        tracing::debug!(requirement_id = requirement.id, "Requirement created, generating");
        self.generate_recipe(session, requirement.id).await
    }

    pub async fn list_recipes(&self) -> Result<Vec<Recipe>> {
        self.send(self.request(Method::GET, "/api/recipe")).await
    }

    pub async fn get_recipe(&self, id: i64) -> Result<Recipe> {
        self.send(self.request(Method::GET, &format!("/api/recipe/{id}"))).await
    }

    /// Toggle whether `recipe_id` is saved.
    pub async fn save_recipe(&self, session: &Session, recipe_id: i64) -> Result<SaveToggle> {
        self.post_authed(session, "/api/saved-recipe", &SaveRecipe { recipe_id })
            .await
    }

    pub async fn saved_recipes(&self, session: &Session) -> Result<Vec<SavedRecipe>> {
        self.get_authed(session, "/api/saved-recipe").await
    }

    pub async fn post_review(&self, session: &Session, review: &NewReview) -> Result<serde_json::Value> {
        self.post_authed(session, "/api/review", review).await
    }

    pub async fn update_review(
        &self,
        session: &Session,
        review_id: i64,
        update: &ReviewUpdate,
    ) -> Result<serde_json::Value> {
        let path = format!("/api/review/{review_id}");
        self.send(self.authed(session, Method::PUT, &path)?.json(update))
            .await
    }

    pub async fn delete_review(&self, session: &Session, review_id: i64) -> Result<()> {
        let path = format!("/api/review/{review_id}");
        self.send_discarding(self.authed(session, Method::DELETE, &path)?)
            .await
    }

    pub async fn preferences(&self, session: &Session) -> Result<Preferences> {
        self.get_authed(session, "/api/user/preferences").await
    }

    /// Replace the stored preferences; an empty string clears them.
    pub async fn update_preferences(&self, session: &Session, preferences: &str) -> Result<Preferences> {
        let body = Preferences {
            preferences: preferences.to_string(),
        };
        self.send(self.authed(session, Method::PATCH, "/api/user/preferences")?.json(&body))
            .await
    }

    pub async fn update_account(
        &self,
        session: &Session,
        user_id: i64,
        update: &AccountUpdate,
    ) -> Result<serde_json::Value> {
        let path = format!("/api/user/{user_id}");
        self.send(self.authed(session, Method::PATCH, &path)?.json(update))
            .await
    }

    /// Delete the account and sign the session out once the backend confirms.
    pub async fn delete_account(&self, session: &mut Session, user_id: i64) -> Result<()> {
        let path = format!("/api/user/{user_id}");
        self.send_discarding(self.authed(session, Method::DELETE, &path)?)
            .await?;
        session.sign_out();
        Ok(())
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client.request(method, format!("{}{}", self.gateway_url, path))
    }

    fn authed(&self, session: &Session, method: Method, path: &str) -> Result<RequestBuilder> {
        let authorization = session.authorization().ok_or(SdkError::Unauthenticated)?;
        Ok(self.request(method, path).header(AUTHORIZATION, authorization))
    }

    async fn get_authed<T: DeserializeOwned>(&self, session: &Session, path: &str) -> Result<T> {
        self.send(self.authed(session, Method::GET, path)?).await
    }

    async fn post_authed<B, T>(&self, session: &Session, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(self.authed(session, Method::POST, path)?.json(body)).await
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(api_error(response).await);
        }
        Ok(response.json().await?)
    }

    /// Like `send`, for endpoints whose success body is empty or irrelevant.
    async fn send_discarding(&self, request: RequestBuilder) -> Result<()> {
        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(api_error(response).await);
        }
        Ok(())
    }
}

async fn api_error(response: Response) -> SdkError {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    let body: ErrorBody = serde_json::from_str(&text).unwrap_or_default();
    let message = body.error.or(body.message).unwrap_or_else(|| {
        if text.is_empty() {
            status.canonical_reason().unwrap_or("request failed").to_string()
        } else {
            text
        }
    });

    if status == StatusCode::GATEWAY_TIMEOUT {
        return SdkError::TimedOut(message);
    }
    SdkError::Api {
        status: status.as_u16(),
        message,
        details: body.details,
    }
}
