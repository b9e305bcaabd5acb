use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use serde::{Deserialize, Serialize};

use super::error::ApiError;
use super::AppState;
use crate::query::{QueryResponse, QuerySource};
use crate::recipe::Recipe;

#[derive(Debug, Deserialize, Default)]
pub struct TextRequest {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GeneratedRecipeResponse {
    pub source: QuerySource,
    pub recipe: Recipe,
}

/// A body that is not `{"text": <string>}` (wrong content type, bad JSON, non-string
/// `text`) is read as a request without text.
fn request_text(payload: Result<Json<TextRequest>, JsonRejection>) -> Option<String> {
    match payload {
        Ok(Json(request)) => request.text,
        Err(rejection) => {
            tracing::debug!(%rejection, "Unreadable request body, treating text as missing");
            None
        }
    }
}

pub async fn query(
    State(state): State<AppState>,
    payload: Result<Json<TextRequest>, JsonRejection>,
) -> Json<QueryResponse> {
    let text = request_text(payload);
    let response = state.query.answer(text.as_deref()).await;
    tracing::debug!(source = ?response.source, results = response.results.len(), "Query answered");
    Json(response)
}

pub async fn ai_recipe(
    State(state): State<AppState>,
    payload: Result<Json<TextRequest>, JsonRejection>,
) -> Result<Json<GeneratedRecipeResponse>, ApiError> {
    let text = request_text(payload);
    let recipe = state.generation.generate(text.as_deref()).await?;
    Ok(Json(GeneratedRecipeResponse {
        source: QuerySource::Openai,
        recipe,
    }))
}

pub async fn get_recipe(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Recipe>, ApiError> {
    state.store.get(&id).map(Json).ok_or(ApiError::NotFound)
}
