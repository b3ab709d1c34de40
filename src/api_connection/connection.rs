use dotenv::dotenv;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::env;
use thiserror::Error;
use tracing::debug;

use super::endpoints::{
    BackendErrorBody, DataEnvelope, GroceryListRequest, GroceryListResponse, PrepRecipes,
    SaveCurrentPrepRequest, SavePastPrepRequest, SectionOrderPayload, CURRENT_PREP_PATH,
    GROCERY_LIST_PATH, PAST_PREPS_PATH, RECIPES_PATH, SECTION_ORDER_PATH,
};
use crate::config::AppConfig;
use crate::ingredient_normalizer::RawRecipe;
use crate::models::RecipeId;

#[derive(Debug, Error)]
pub enum ApiConnectionError {
    #[error("Bearer token not found in environment: {0}")]
    MissingToken(String),
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("API error {status}: {error_body}")]
    ApiError {
        status: StatusCode,
        error_body: String,
    },
}

/// REST client for the meal prep backend.
///
/// The bearer token is looked up by environment variable name on every
/// call, so a token written to `.env` after start-up is still picked up.
#[derive(Debug, Clone)]
pub struct BackendClient {
    client: Client,
    base_url: String,
    token_env_var: String,
}

impl BackendClient {
    pub fn new(base_url: &str, token_env_var: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token_env_var: token_env_var.to_string(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(&config.api_base_url, &config.token_env_var)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn token(&self) -> Result<String, ApiConnectionError> {
        dotenv().ok();
        env::var(&self.token_env_var)
            .map_err(|_| ApiConnectionError::MissingToken(self.token_env_var.clone()))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn check_status(response: Response) -> Result<Response, ApiConnectionError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status();
        let raw_body = response
            .text()
            .await
            .unwrap_or_else(|_| "Failed to read error body".to_string());
        let error_body = serde_json::from_str::<BackendErrorBody>(&raw_body)
            .ok()
            .and_then(|body| body.error)
            .unwrap_or(raw_body);
        Err(ApiConnectionError::ApiError { status, error_body })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiConnectionError> {
        let token = self.token()?;
        debug!(path, "GET backend");
        let response = self
            .client
            .get(self.url(path))
            .bearer_auth(token)
            .query(query)
            .send()
            .await?;
        let response = Self::check_status(response).await?;
        Ok(response.json::<T>().await?)
    }

    async fn post<B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Response, ApiConnectionError> {
        let token = self.token()?;
        debug!(path, "POST backend");
        let response = self
            .client
            .post(self.url(path))
            .bearer_auth(token)
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await?;
        Self::check_status(response).await
    }

    pub async fn fetch_recipe(
        &self,
        id: RecipeId,
        prefer_metric: bool,
    ) -> Result<RawRecipe, ApiConnectionError> {
        let path = format!("{}/{}", RECIPES_PATH, id);
        let envelope: DataEnvelope<RawRecipe> = self
            .get_json(&path, &[("preferMetric", prefer_metric.to_string())])
            .await?;
        Ok(envelope.data)
    }

    pub async fn fetch_current_prep(&self) -> Result<Vec<RawRecipe>, ApiConnectionError> {
        let envelope: DataEnvelope<PrepRecipes> = self.get_json(CURRENT_PREP_PATH, &[]).await?;
        Ok(envelope.data.recipes)
    }

    /// Overwrites the user's current prep on the backend.
    pub async fn save_current_prep(
        &self,
        recipe_ids: &[RecipeId],
    ) -> Result<(), ApiConnectionError> {
        self.post(CURRENT_PREP_PATH, &SaveCurrentPrepRequest::new(recipe_ids))
            .await?;
        Ok(())
    }

    pub async fn fetch_past_prep(&self, id: i64) -> Result<PrepRecipes, ApiConnectionError> {
        let path = format!("{}/{}", PAST_PREPS_PATH, id);
        let envelope: DataEnvelope<PrepRecipes> = self.get_json(&path, &[]).await?;
        Ok(envelope.data)
    }

    pub async fn save_past_prep(
        &self,
        name: &str,
        recipe_ids: &[RecipeId],
    ) -> Result<(), ApiConnectionError> {
        let request = SavePastPrepRequest {
            name: name.to_string(),
            recipe_ids: recipe_ids.to_vec(),
        };
        self.post(PAST_PREPS_PATH, &request).await?;
        Ok(())
    }

    pub async fn fetch_grocery_list(
        &self,
        request: &GroceryListRequest,
    ) -> Result<GroceryListResponse, ApiConnectionError> {
        let response = self.post(GROCERY_LIST_PATH, request).await?;
        Ok(response.json::<GroceryListResponse>().await?)
    }

    /// Saved section order for the token's user. A user without a saved
    /// order gets `None`.
    pub async fn fetch_section_order(&self) -> Result<Option<Vec<String>>, ApiConnectionError> {
        match self.get_json::<SectionOrderPayload>(SECTION_ORDER_PATH, &[]).await {
            Ok(payload) if payload.order.is_empty() => Ok(None),
            Ok(payload) => Ok(Some(payload.order)),
            Err(ApiConnectionError::ApiError { status, .. }) if status == StatusCode::NOT_FOUND => {
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    pub async fn save_section_order(&self, order: &[String]) -> Result<(), ApiConnectionError> {
        let payload = SectionOrderPayload {
            order: order.to_vec(),
        };
        self.post(SECTION_ORDER_PATH, &payload).await?;
        Ok(())
    }
}
