//! Prompt construction for SQL generation.
//!
//! The question is passed through untouched: no truncation and no filtering
//! of text that tries to override the system instruction.

use crate::training::TrainingExample;
use minijinja::{context, Environment};
use std::fmt;

/// System message sent alongside every prompt.
pub const SYSTEM_INSTRUCTION: &str = "You are a SQL expert. Generate only PostgreSQL SQL queries \
without any explanation or markdown formatting.";

const PROMPT_TEMPLATE: &str = "{{ schema }}
{% if examples %}
Example questions and their SQL:
{% for example in examples %}
Question: {{ example.question }}
SQL: {{ example.sql }}
{% endfor %}{% endif %}
Question: {{ question }}

Generate ONLY the SQL query (PostgreSQL syntax) to answer this question. \
Do not include any explanation, just the SQL query.
";

#[derive(Debug)]
pub struct PromptError(String);

impl fmt::Display for PromptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Prompt error: {}", self.0)
    }
}

impl std::error::Error for PromptError {}

impl From<minijinja::Error> for PromptError {
    fn from(e: minijinja::Error) -> Self {
        PromptError(e.to_string())
    }
}

/// Builds the user prompt from the schema description and the question.
pub fn build_prompt(schema: &str, question: &str) -> Result<String, PromptError> {
    build_prompt_with_examples(schema, question, &[])
}

/// Like [`build_prompt`], with stored question/SQL pairs between the schema
/// and the question.
pub fn build_prompt_with_examples(
    schema: &str,
    question: &str,
    examples: &[TrainingExample],
) -> Result<String, PromptError> {
    // Plain-text template name, so no HTML auto-escaping of quotes in SQL.
    let mut env = Environment::new();
    env.set_auto_escape_callback(|_| minijinja::AutoEscape::None);
    env.add_template("sql_prompt.txt", PROMPT_TEMPLATE)?;

    let template = env.get_template("sql_prompt.txt")?;
    let prompt = template.render(context! {
        schema => schema,
        question => question,
        examples => examples,
    })?;

    Ok(prompt)
}
