use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::generation::GenerationService;
use crate::recipe::Recipe;
use crate::store::RecipeStore;

/// Where the results of a query came from.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum QuerySource {
    Local,
    Openai,
    /// Older servers that split the model call in two.
    #[serde(rename = "openai-split")]
    OpenaiSplit,
    /// Hugging Face inference backends.
    Hf,
    None,
    /// Anything a newer server might send that this build does not know about.
    #[serde(other)]
    Unknown,
}

impl QuerySource {
    pub fn is_generated(self) -> bool {
        matches!(self, QuerySource::Openai | QuerySource::OpenaiSplit | QuerySource::Hf)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct QueryResponse {
    pub source: QuerySource,
    pub results: Vec<Recipe>,
}

impl QueryResponse {
    pub fn none() -> Self {
        Self {
            source: QuerySource::None,
            results: Vec::new(),
        }
    }
}

/// Local search first, model fallback second.
pub struct QueryService {
    store: Arc<RecipeStore>,
    generation: Arc<GenerationService>,
}

impl QueryService {
    pub fn new(store: Arc<RecipeStore>, generation: Arc<GenerationService>) -> Self {
        Self { store, generation }
    }

    pub async fn answer(&self, text: Option<&str>) -> QueryResponse {
        let matches = self.store.search(text.unwrap_or_default());
        if !matches.is_empty() {
            tracing::info!(matches = matches.len(), "Answered from local recipes");
            return QueryResponse {
                source: QuerySource::Local,
                results: matches,
            };
        }

        match self.generation.generate(text).await {
            Ok(recipe) => QueryResponse {
                source: QuerySource::Openai,
                results: vec![recipe],
            },
            Err(e) => {
                tracing::warn!(error = %e, "Fallback generation failed");
                QueryResponse::none()
            }
        }
    }
}
