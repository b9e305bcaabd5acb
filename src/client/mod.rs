pub mod api;
pub mod session;

pub use api::{ClientError, RecipeApiClient};
pub use session::{format_reply, ChatSession, Message, Role};

use anyhow::Result;
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

const PROMPT: &str = "you> ";

/// Interactive terminal chat against a running server.
pub async fn run_chat(api_url: &str) -> Result<()> {
    let api = RecipeApiClient::new(api_url);
    tracing::info!(api_url = %api.base_url(), "Starting chat session");
    let mut session = ChatSession::new(api);
    let mut rl = DefaultEditor::new()?;

    println!("{}", "RasoiBot 🍲".bold());
    println!("{}", "Ask for Indian recipes, powered by AI. Type /exit to leave.".dimmed());
    for message in session.messages() {
        print_message(message);
    }

    loop {
        match rl.readline(PROMPT) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                if matches!(trimmed, "/exit" | "/quit") {
                    break;
                }
                rl.add_history_entry(trimmed)?;

                println!("{}", "Cooking...".dimmed());
                if let Some(reply) = session.submit(&line).await {
                    print_message(reply);
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        }
    }

    Ok(())
}

fn print_message(message: &Message) {
    match message.role {
        Role::User => println!("{}", message.text.blue()),
        Role::Bot => println!("\n{}\n", message.text.green()),
    }
}
