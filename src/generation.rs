use std::sync::Arc;

use thiserror::Error;

use crate::api_connection::{ApiConnectionError, TextGenerator};
use crate::config::Limits;
use crate::rate_limit::{FixedWindowLimiter, RATE_LIMIT_MESSAGE};
use crate::recipe::Recipe;
use crate::recipe_parser::{compose_prompt, parse_generated_recipe, RecipeParseError};
use crate::store::{RecipeStore, StoreError};

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("{}", RATE_LIMIT_MESSAGE)]
    RateLimited,
    #[error("Missing text")]
    MissingText,
    /// `raw` is already cut down to the configured snippet length.
    #[error("Invalid recipe: {reason}")]
    InvalidRecipe { reason: RecipeParseError, raw: String },
    #[error(transparent)]
    Upstream(#[from] ApiConnectionError),
    #[error("Failed to save recipe: {0}")]
    Store(#[from] StoreError),
}

/// Asks the model for a recipe, validates it and saves it to the store.
pub struct GenerationService {
    generator: Arc<dyn TextGenerator>,
    store: Arc<RecipeStore>,
    limiter: FixedWindowLimiter,
    raw_snippet_chars: usize,
}

impl GenerationService {
    pub fn new(generator: Arc<dyn TextGenerator>, store: Arc<RecipeStore>, limits: &Limits) -> Self {
        Self {
            generator,
            store,
            limiter: FixedWindowLimiter::new(limits.rate_limit_max, limits.rate_limit_window),
            raw_snippet_chars: limits.raw_snippet_chars,
        }
    }

    /// The limiter is consulted before anything else, so a rejected call never
    /// reaches the model. Calls with missing text still use up a slot.
    pub async fn generate(&self, text: Option<&str>) -> Result<Recipe, GenerationError> {
        if !self.limiter.try_acquire() {
            tracing::warn!(max = self.limiter.max(), "Generation rate limit hit");
            return Err(GenerationError::RateLimited);
        }

        let text = match text {
            Some(t) if !t.is_empty() => t,
            _ => return Err(GenerationError::MissingText),
        };

        let raw = self.generator.generate(&compose_prompt(text)).await?;

        let recipe = parse_generated_recipe(&raw).map_err(|reason| {
            tracing::warn!(%reason, raw_len = raw.len(), "Model returned an unusable recipe");
            GenerationError::InvalidRecipe {
                reason,
                raw: truncate_chars(&raw, self.raw_snippet_chars),
            }
        })?;

        self.store.append(recipe.clone())?;
        tracing::info!(
            recipe_id = recipe.id().unwrap_or_default(),
            name = recipe.name().unwrap_or_default(),
            "Stored generated recipe"
        );
        Ok(recipe)
    }
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}


#[cfg(test)]
mod tests {
    use super::test_support::CannedGenerator;
    use super::*;
    use crate::store::InMemoryBackend;
    use std::time::Duration;

    const PASTA: &str = r#"{"id":"pasta-1","name":"Pasta","servings":2,"ingredients":[],"steps":[]}"#;

    fn service(reply: &str, limits: Limits) -> (GenerationService, Arc<CannedGenerator>, Arc<RecipeStore>) {
        let generator = Arc::new(CannedGenerator::always(reply));
        let store = Arc::new(RecipeStore::load(Box::new(InMemoryBackend::default()), 10));
        let service = GenerationService::new(generator.clone(), store.clone(), &limits);
        (service, generator, store)
    }

    #[tokio::test]
    async fn test_valid_output_is_stored() {
        let (service, generator, store) = service(PASTA, Limits::default());

        let recipe = service.generate(Some("pasta")).await.unwrap();

        assert_eq!(recipe.id(), Some("pasta-1"));
        assert_eq!(store.len(), 1);
        let prompt = generator.last_prompt.lock().unwrap().clone().unwrap();
        assert!(prompt.ends_with("User request: \"pasta\""));
    }

    #[tokio::test]
    async fn test_missing_text_never_calls_model() {
        let (service, generator, _) = service(PASTA, Limits::default());
        assert!(matches!(service.generate(None).await, Err(GenerationError::MissingText)));
        assert!(matches!(service.generate(Some("")).await, Err(GenerationError::MissingText)));
        assert_eq!(generator.calls(), 0);
    }

    #[tokio::test]
    async fn test_invalid_output_is_truncated_and_not_stored() {
        let junk = "x".repeat(500);
        let (service, _, store) = service(&junk, Limits::default());

        match service.generate(Some("pasta")).await {
            Err(GenerationError::InvalidRecipe { reason, raw }) => {
                assert_eq!(reason, RecipeParseError::NoJsonObject);
                assert_eq!(raw.len(), 300);
            }
            other => panic!("expected InvalidRecipe, got {other:?}"),
        }
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_missing_required_field_is_not_stored() {
        let (service, _, store) = service(r#"{"id":"x","name":"X","ingredients":[],"steps":[]}"#, Limits::default());
        assert!(matches!(
            service.generate(Some("x")).await,
            Err(GenerationError::InvalidRecipe { reason: RecipeParseError::MissingField("servings"), .. })
        ));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_loosely_shaped_output_is_stored_verbatim() {
        let replies = [
            r#"{"id":"jeera-rice","name":"Jeera Rice","servings":2,"ingredients":[{"name":"salt","quantity":"to taste"}],"steps":["Cook."]}"#,
            r#"{"id":"khichdi","name":"Khichdi","servings":2,"ingredients":["1 cup rice","1/2 cup moong dal"],"steps":["Cook."]}"#,
            r#"{"id":"upma","name":"Upma","servings":"2-3","ingredients":[],"steps":[]}"#,
            r#"{"id":"lassi","name":"Lassi","tags":null,"servings":2,"ingredients":[],"steps":[]}"#,
        ];
        for reply in replies {
            let (service, _, store) = service(reply, Limits::default());

            let recipe = service.generate(Some("something")).await.unwrap();

            let expected: serde_json::Value = serde_json::from_str(reply).unwrap();
            assert_eq!(recipe.as_value(), &expected);
            assert_eq!(store.len(), 1);
        }
    }

    #[tokio::test]
    async fn test_snippet_counts_characters_not_bytes() {
        let limits = Limits {
            raw_snippet_chars: 3,
            ..Limits::default()
        };
        let (service, _, _) = service("मसाला चाय", limits);
        match service.generate(Some("chai")).await {
            Err(GenerationError::InvalidRecipe { raw, .. }) => assert_eq!(raw.chars().count(), 3),
            other => panic!("expected InvalidRecipe, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_eleventh_request_is_rejected_before_the_model() {
        let limits = Limits {
            rate_limit_window: Duration::from_secs(3600),
            ..Limits::default()
        };
        let (service, generator, _) = service(PASTA, limits);

        for _ in 0..10 {
            assert!(service.generate(Some("pasta")).await.is_ok());
        }
        assert!(matches!(service.generate(Some("pasta")).await, Err(GenerationError::RateLimited)));
        assert_eq!(generator.calls(), 10);
    }

    #[tokio::test]
    async fn test_missing_text_still_counts_against_limit() {
        let limits = Limits {
            rate_limit_max: 1,
            rate_limit_window: Duration::from_secs(3600),
            ..Limits::default()
        };
        let (service, _, _) = service(PASTA, limits);
        assert!(matches!(service.generate(None).await, Err(GenerationError::MissingText)));
        assert!(matches!(service.generate(Some("pasta")).await, Err(GenerationError::RateLimited)));
    }
}
