use serde_json::Value;
use thiserror::Error;

use crate::recipe::Recipe;

/// Keys a generated recipe must carry before it is accepted into the store.
pub const REQUIRED_FIELDS: [&str; 5] = ["id", "name", "servings", "ingredients", "steps"];

/// Which extraction step produced the JSON value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionTier {
    Direct,
    FenceStripped,
    BracketScan,
}

#[derive(Debug, Error, PartialEq)]
pub enum RecipeParseError {
    #[error("model output contains no JSON object")]
    NoJsonObject,
    #[error("generated JSON is not an object")]
    NotAnObject,
    #[error("generated recipe is missing required field `{0}`")]
    MissingField(&'static str),
    #[error("generated recipe field `{0}` must be an array")]
    NotAnArray(&'static str),
}

pub fn compose_prompt(user_text: &str) -> String {
    format!(
        r#"You are RasoiBot, an Indian recipe assistant.
Respond ONLY with valid JSON (no markdown, no extra text).
Return a JSON object:
{{
  "id": "slug-id",
  "name": "Dish name",
  "region": "North Indian",
  "tags": ["vegetarian"],
  "servings": 2,
  "prep_time_mins": 15,
  "cook_time_mins": 30,
  "ingredients": [
    {{"name":"ingredient","quantity":1,"unit":"cup"}}
  ],
  "steps": ["step1","step2"],
  "notes": "optional notes"
}}

User request: "{user_text}""#
    )
}

/// Tier 1: the trimmed output is itself a JSON object.
pub fn parse_direct(raw: &str) -> Option<Value> {
    parse_object(raw.trim())
}

/// Tier 2: the output is wrapped in a Markdown code fence (optionally tagged `json`).
pub fn parse_fence_stripped(raw: &str) -> Option<Value> {
    parse_object(strip_code_fence(raw))
}

/// Tier 3: greedy scan from the first `{` to the last `}` of the fence-stripped text.
pub fn parse_bracket_scan(raw: &str) -> Option<Value> {
    let text = strip_code_fence(raw);
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    parse_object(&text[start..=end])
}

pub fn strip_code_fence(raw: &str) -> &str {
    let mut text = raw.trim();
    if let Some(rest) = text.strip_prefix("```") {
        text = rest;
        if text.get(..4).is_some_and(|tag| tag.eq_ignore_ascii_case("json")) {
            text = &text[4..];
        }
        text = text.trim_start();
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest.trim_end();
    }
    text
}

/// Runs the tiers in order and reports which one succeeded.
pub fn extract_json(raw: &str) -> Result<(Value, ExtractionTier), RecipeParseError> {
    if let Some(value) = parse_direct(raw) {
        return Ok((value, ExtractionTier::Direct));
    }
    if let Some(value) = parse_fence_stripped(raw) {
        return Ok((value, ExtractionTier::FenceStripped));
    }
    if let Some(value) = parse_bracket_scan(raw) {
        return Ok((value, ExtractionTier::BracketScan));
    }
    Err(RecipeParseError::NoJsonObject)
}

/// Presence of the required keys, and `ingredients`/`steps` being arrays.
/// Element shapes are not inspected here.
pub fn validate_recipe_shape(value: &Value) -> Result<(), RecipeParseError> {
    let obj = value.as_object().ok_or(RecipeParseError::NotAnObject)?;
    for field in REQUIRED_FIELDS {
        if !obj.contains_key(field) {
            return Err(RecipeParseError::MissingField(field));
        }
    }
    for field in ["ingredients", "steps"] {
        if !obj[field].is_array() {
            return Err(RecipeParseError::NotAnArray(field));
        }
    }
    Ok(())
}

/// Full pipeline from raw model output to a recipe. The validated object is kept as is.
pub fn parse_generated_recipe(raw: &str) -> Result<Recipe, RecipeParseError> {
    let (value, tier) = extract_json(raw)?;
    tracing::debug!(?tier, "Extracted JSON from model output");
    validate_recipe_shape(&value)?;
    Ok(Recipe::from(value))
}

fn parse_object(text: &str) -> Option<Value> {
    serde_json::from_str::<Value>(text)
        .ok()
        .filter(Value::is_object)
}
