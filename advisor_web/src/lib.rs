use axum::{
    extract::State,
    http::StatusCode,
    response::{AppendHeaders, Html, IntoResponse, Response},
    routing::{get, post},
    Form, Router,
};
use serde::Deserialize;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::{error, warn};

use std::sync::Arc;

use respond::{ChatCompletion, Persona};

use crate::{
    page::{Outcome, PageRenderer, PageView},
    tower_ext::{NoCacheExt, NO_CACHE_HEADERS},
};

pub mod logging;
pub mod page;
mod tower_ext;

pub mod env {
    pub const API_PORT: &str = "ADVISOR_API_PORT";
    pub const MAX_QUESTION_CHARS: &str = "ADVISOR_MAX_QUESTION_CHARS";
}

pub const EMPTY_QUESTION_WARNING: &str = "Please enter your question.";

#[derive(Debug, Clone)]
pub struct AdvisorConfig {
    pub max_question_chars: usize,
}

impl AdvisorConfig {
    pub const DEFAULT_MAX_QUESTION_CHARS: usize = 4_000;

    pub fn from_env() -> Self {
        let max_question_chars = std::env::var(env::MAX_QUESTION_CHARS).ok();
        let max_question_chars = max_question_chars
            .and_then(|x| x.parse().ok())
            .filter(|x| *x > 0)
            .unwrap_or(Self::DEFAULT_MAX_QUESTION_CHARS);

        Self { max_question_chars }
    }
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            max_question_chars: Self::DEFAULT_MAX_QUESTION_CHARS,
        }
    }
}

pub struct AppState {
    pub client: Arc<dyn ChatCompletion>,
    pub config: AdvisorConfig,
    pub pages: PageRenderer,
}

pub fn app(app_state: Arc<AppState>) -> Router<()> {
    Router::new()
        .route("/", get(index))
        .route("/ask", post(ask))
        .nest_service("/styles", ServeDir::new("public/styles").no_cache())
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

#[derive(Debug, Deserialize)]
pub struct AskForm {
    pub persona: String,
    #[serde(default)]
    pub question: String,
}

async fn index(State(state): State<Arc<AppState>>) -> Response {
    render_page(
        &state,
        PageView {
            persona: Persona::default(),
            question: "",
            outcome: &Outcome::Blank,
        },
    )
}

async fn ask(State(state): State<Arc<AppState>>, Form(form): Form<AskForm>) -> Response {
    let persona: Persona = match form.persona.parse() {
        Ok(persona) => persona,
        Err(e) => {
            error!("Rejected submission with invalid persona: {e}");
            return (StatusCode::BAD_REQUEST, e.to_string()).into_response();
        }
    };

    let outcome = match check_question(&form.question, &state.config) {
        Err(warning) => Outcome::Warning(warning),
        Ok(question) => match respond::request(state.client.as_ref(), question, persona).await {
            Ok(reply) => Outcome::Reply(reply),
            Err(e) => {
                warn!("Request for persona = '{}' failed: {e:#}", persona.label());
                Outcome::Error(format!("An error occurred: {e:#}"))
            }
        },
    };

    render_page(
        &state,
        PageView {
            persona,
            question: &form.question,
            outcome: &outcome,
        },
    )
}

/// Returns the question to send, or the warning to show instead of sending it.
pub fn check_question<'a>(question: &'a str, config: &AdvisorConfig) -> Result<&'a str, String> {
    if question.trim().is_empty() {
        return Err(EMPTY_QUESTION_WARNING.to_string());
    }
    let question_len = question.chars().count();
    if question_len > config.max_question_chars {
        return Err(format!(
            "Your question is too long ({question_len} characters). Please keep it to at most {} characters.",
            config.max_question_chars
        ));
    }
    Ok(question)
}

fn render_page(state: &AppState, view: PageView) -> Response {
    match state.pages.render(&view) {
        Ok(html) => (StatusCode::OK, AppendHeaders(NO_CACHE_HEADERS), Html(html)).into_response(),
        Err(e) => {
            error!("Failed to render page: {e:#}");
            (StatusCode::INTERNAL_SERVER_ERROR, format!("{e:#}")).into_response()
        }
    }
}
