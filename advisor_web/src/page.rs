use anyhow::{Context, Result};
use minijinja::{context, Environment};
use pulldown_cmark::{Event, Options, Parser};
use serde::Serialize;

use respond::Persona;

const TITLE: &str = "Expert AI Advisor";
const INDEX_TEMPLATE: &str = "index.html";

/// What the page shows below the form after a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Blank,
    Reply(String),
    Warning(String),
    Error(String),
}

pub struct PageView<'a> {
    pub persona: Persona,
    pub question: &'a str,
    pub outcome: &'a Outcome,
}

#[derive(Serialize)]
struct PersonaOption {
    id: &'static str,
    label: &'static str,
    checked: bool,
}

pub struct PageRenderer {
    env: Environment<'static>,
    help_html: String,
}

impl PageRenderer {
    pub fn new() -> Result<Self> {
        let mut env = Environment::new();
        env.add_template(INDEX_TEMPLATE, include_str!("../templates/index.html"))
            .context("failed to load page template")?;

        Ok(Self {
            env,
            help_html: markdown_to_html(&help_markdown()),
        })
    }

    pub fn render(&self, view: &PageView) -> Result<String> {
        let personas: Vec<_> = Persona::ALL
            .iter()
            .map(|persona| PersonaOption {
                id: persona.id(),
                label: persona.label(),
                checked: *persona == view.persona,
            })
            .collect();

        let (reply_html, warning, error) = match view.outcome {
            Outcome::Blank => (None, None, None),
            Outcome::Reply(reply) => (Some(markdown_to_html(reply)), None, None),
            Outcome::Warning(warning) => (None, Some(warning.as_str()), None),
            Outcome::Error(error) => (None, None, Some(error.as_str())),
        };

        self.env
            .get_template(INDEX_TEMPLATE)?
            .render(context! {
                title => TITLE,
                help_html => &self.help_html,
                personas => personas,
                question => view.question,
                reply_html => reply_html,
                warning => warning,
                error => error,
            })
            .context("failed to render page")
    }
}

fn help_markdown() -> String {
    let mut markdown = String::from(
        "### How to use\n\
         1. Choose the expert you want to consult\n\
         2. Enter your question in the text box\n\
         3. Press **Send** to get an answer from the selected expert\n\n\
         ### Available experts\n",
    );
    for persona in Persona::ALL {
        markdown.push_str(&format!("- **{}**: {}\n", persona.label(), persona.summary()));
    }
    markdown
}

/// Renders markdown to HTML, passing any raw HTML through as escaped text.
pub fn markdown_to_html(markdown: &str) -> String {
    let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH;
    let parser = Parser::new_ext(markdown, options).map(|event| match event {
        Event::Html(html) | Event::InlineHtml(html) => Event::Text(html),
        event => event,
    });

    let mut html = String::with_capacity(markdown.len() * 3 / 2);
    pulldown_cmark::html::push_html(&mut html, parser);
    html
}
