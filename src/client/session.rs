use serde::{Deserialize, Serialize};

use super::api::{ClientError, RecipeApiClient};
use crate::query::QueryResponse;
use crate::recipe::{display_text, is_blank, Recipe};

pub const GREETING: &str = "Hi! I'm RasoiBot 🍲. Ask me for Indian recipes!";
pub const AI_UNPARSED_REPLY: &str = "Here's an AI-generated recipe (couldn't parse fully).";
pub const NOTHING_FOUND_REPLY: &str = "Sorry, I couldn't find or generate a recipe.";

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Bot,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Message {
    pub role: Role,
    pub text: String,
}

impl Message {
    fn bot(text: impl Into<String>) -> Self {
        Self {
            role: Role::Bot,
            text: text.into(),
        }
    }
}

/// One chat conversation. Messages only ever get appended; nothing is saved.
pub struct ChatSession {
    api: RecipeApiClient,
    messages: Vec<Message>,
    loading: bool,
}

impl ChatSession {
    pub fn new(api: RecipeApiClient) -> Self {
        Self {
            api,
            messages: vec![Message::bot(GREETING)],
            loading: false,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Sends `input` to the server and appends both sides of the exchange.
    ///
    /// Blank input is ignored and returns `None`. Otherwise returns the bot reply,
    /// which is an error notice if the request or its decoding failed.
    pub async fn submit(&mut self, input: &str) -> Option<&Message> {
        if input.trim().is_empty() {
            return None;
        }

        self.messages.push(Message {
            role: Role::User,
            text: input.to_string(),
        });
        self.loading = true;
        let outcome = self.api.query(input).await;
        self.loading = false;

        let reply = match outcome {
            Ok(response) => format_reply(&response),
            Err(e) => error_reply(&e),
        };
        self.messages.push(Message::bot(reply));
        self.messages.last()
    }
}

/// Chooses the bot text for a query response.
pub fn format_reply(response: &QueryResponse) -> String {
    if let Some(recipe) = response.results.first() {
        format_recipe(recipe)
    } else if response.source.is_generated() {
        AI_UNPARSED_REPLY.to_string()
    } else {
        NOTHING_FOUND_REPLY.to_string()
    }
}

pub fn format_recipe(recipe: &Recipe) -> String {
    let ingredients = recipe
        .ingredients()
        .iter()
        .map(|i| {
            let qty = i.quantity.map(|q| format!("{} ", display_text(q))).unwrap_or_default();
            let unit = match i.unit {
                Some(u) if !is_blank(u) => format!("{} ", display_text(u)),
                _ => String::new(),
            };
            format!("- {}{}{}", qty, unit, i.name)
        })
        .collect::<Vec<_>>()
        .join("\n");

    let steps = recipe
        .steps()
        .iter()
        .enumerate()
        .map(|(idx, s)| format!("{}. {}", idx + 1, s))
        .collect::<Vec<_>>()
        .join("\n\n");

    let servings = match recipe.servings() {
        Some(s) if !is_blank(s) => display_text(s),
        _ => "N/A".to_string(),
    };

    format!(
        "*{}* ({} servings)\n\nIngredients:\n{}\n\nSteps:\n{}",
        recipe.name().unwrap_or_default(),
        servings,
        ingredients,
        steps
    )
}

fn error_reply(err: &ClientError) -> String {
    format!("⚠️ Error: {}", err)
}
