use anyhow::{Context, Result};
use tracing::info;

pub mod client;
pub mod exchange;
pub mod persona;

pub use client::{ChatClientConfig, ChatCompletion, OpenAiChatClient};
pub use exchange::{ChatMessage, Exchange, Role};
pub use persona::Persona;

pub mod env {
    pub const API_KEY: &str = "OPENAI_API_KEY";
    pub const BASE_URL: &str = "ADVISOR_OPENAI_BASE_URL";
}

/// Asks `persona` the question through `client`, one remote call per invocation.
///
/// Every failure of the remote call is folded into a single error; callers
/// render it with `{:#}` to include the underlying cause.
pub async fn request(
    client: &dyn ChatCompletion,
    question_txt: &str,
    persona: Persona,
) -> Result<String> {
    let exchange = Exchange::new(persona, question_txt);

    info!(
        "Requesting response from persona = '{}' (question length = {})",
        persona.label(),
        question_txt.chars().count()
    );
    let response = client
        .complete(&exchange)
        .await
        .context("failed to get a response from the chat completion service")?;

    info!("Completed response (length = {})", response.chars().count());
    Ok(response)
}
