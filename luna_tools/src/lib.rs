//! Luna's tool set.
//!
//! The set is closed: every tool is a `ToolKind` variant, the agent picks one
//! by name, and its raw action input is parsed into a typed `ToolCall` before
//! anything runs.

#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::missing_errors_doc, clippy::module_name_repetitions)]

pub mod calculator;
mod planner;
mod search;
mod writer;

pub use calculator::{CalcError, evaluate};

use std::sync::Arc;
use std::time::Instant;

use luna_core::LLMProvider;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

/// Result of tool execution
#[derive(Debug, Clone)]
pub struct ToolResult {
    pub content: String,
    pub is_error: bool,
    pub duration_ms: Option<u128>,
    pub error_type: Option<String>,
}

impl ToolResult {
    pub fn success(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_error: false,
            duration_ms: None,
            error_type: None,
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_error: true,
            duration_ms: None,
            error_type: Some("tool_error".to_string()),
        }
    }

    #[must_use]
    pub fn with_error_type(mut self, error_type: impl Into<String>) -> Self {
        self.error_type = Some(error_type.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    WebSearch,
    Calculator,
    CreativeWriter,
    Translator,
    ReminderPlanner,
}

impl ToolKind {
    pub const ALL: [Self; 5] = [
        Self::WebSearch,
        Self::Calculator,
        Self::CreativeWriter,
        Self::Translator,
        Self::ReminderPlanner,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::WebSearch => "web_search",
            Self::Calculator => "calculator",
            Self::CreativeWriter => "creative_writer",
            Self::Translator => "language_translator",
            Self::ReminderPlanner => "reminder_planner",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim().trim_matches('`');
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::WebSearch => {
                "Luna's Web Search Tool (Search-chan). Input: the search query as plain text."
            }
            Self::Calculator => {
                "Luna's Calculator Tool (Calc-kun). Evaluates arithmetic with + - * / ^ and parentheses. \
                 Input: the expression as plain text, e.g. (2 + 3) * 4."
            }
            Self::CreativeWriter => {
                "Luna's Creative Writer Tool (Muse-sensei). Writes stories, poems and ideas. \
                 Input: the writing prompt as plain text."
            }
            Self::Translator => {
                "Luna's Language Translator Tool (Translate-kun). Input: a JSON object \
                 {\"text\": ..., \"target_language\": ..., \"source_language\": ... (optional, default English)}."
            }
            Self::ReminderPlanner => {
                "Luna's Reminder & Schedule Planner Tool (Memo-chan). Input: a JSON object \
                 {\"task_description\": ..., \"time_or_date\": ...}."
            }
        }
    }

}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolInputError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Missing required parameter: {0}")]
    MissingField(&'static str),

    #[error("Expected a JSON object, got: {0}")]
    NotAnObject(String),
}

/// A fully parsed tool invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolCall {
    WebSearch {
        query: String,
    },
    Calculator {
        expression: String,
    },
    CreativeWriter {
        prompt: String,
    },
    Translator {
        text: String,
        target_language: String,
        source_language: String,
    },
    ReminderPlanner {
        task_description: String,
        time_or_date: String,
    },
}

impl ToolCall {
    /// Parse the agent's raw action input for `kind`.
    ///
    /// Single-argument tools accept plain text or a JSON object carrying the
    /// named field; multi-argument tools need a JSON object.
    pub fn parse(kind: ToolKind, raw: &str) -> Result<Self, ToolInputError> {
        match kind {
            ToolKind::WebSearch => Ok(Self::WebSearch {
                query: single_arg(raw, "query")?,
            }),
            ToolKind::Calculator => Ok(Self::Calculator {
                expression: single_arg(raw, "expression")?,
            }),
            ToolKind::CreativeWriter => Ok(Self::CreativeWriter {
                prompt: single_arg(raw, "prompt")?,
            }),
            ToolKind::Translator => {
                let args = object_args(raw)?;
                Ok(Self::Translator {
                    text: required(&args, "text")?,
                    target_language: required(&args, "target_language")?,
                    source_language: required(&args, "source_language")
                        .unwrap_or_else(|_| "English".to_string()),
                })
            }
            ToolKind::ReminderPlanner => {
                let args = object_args(raw)?;
                Ok(Self::ReminderPlanner {
                    task_description: required(&args, "task_description")?,
                    time_or_date: required(&args, "time_or_date")?,
                })
            }
        }
    }

    #[must_use]
    pub const fn kind(&self) -> ToolKind {
        match self {
            Self::WebSearch { .. } => ToolKind::WebSearch,
            Self::Calculator { .. } => ToolKind::Calculator,
            Self::CreativeWriter { .. } => ToolKind::CreativeWriter,
            Self::Translator { .. } => ToolKind::Translator,
            Self::ReminderPlanner { .. } => ToolKind::ReminderPlanner,
        }
    }
}

fn parse_object(raw: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(raw.trim()) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

fn unquote(raw: &str) -> &str {
    let trimmed = raw.trim();
    for quote in ['"', '\''] {
        if let Some(inner) = trimmed
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner.trim();
        }
    }
    trimmed
}

fn required(args: &Map<String, Value>, name: &'static str) -> Result<String, ToolInputError> {
    args.get(name)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or(ToolInputError::MissingField(name))
}

fn single_arg(raw: &str, name: &'static str) -> Result<String, ToolInputError> {
    if let Some(args) = parse_object(raw) {
        return required(&args, name);
    }
    let value = unquote(raw);
    if value.is_empty() {
        return Err(ToolInputError::MissingField(name));
    }
    Ok(value.to_string())
}

fn object_args(raw: &str) -> Result<Map<String, Value>, ToolInputError> {
    parse_object(raw).ok_or_else(|| ToolInputError::NotAnObject(raw.trim().to_string()))
}

/// Runs tool calls. Holds the model used by the LLM-backed tools.
#[derive(Clone)]
pub struct Toolbox {
    llm: Arc<dyn LLMProvider>,
    model: String,
}

impl Toolbox {
    pub fn new(llm: Arc<dyn LLMProvider>, model: impl Into<String>) -> Self {
        Self {
            llm,
            model: model.into(),
        }
    }

    /// `name: description` lines for prompt templates.
    #[must_use]
    pub fn describe() -> String {
        ToolKind::ALL
            .iter()
            .map(|kind| format!("{}: {}", kind.name(), kind.description()))
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[must_use]
    pub fn names() -> Vec<&'static str> {
        ToolKind::ALL.iter().map(|kind| kind.name()).collect()
    }

    pub async fn execute(&self, call: ToolCall) -> ToolResult {
        let started = Instant::now();
        let kind = call.kind();

        let mut result = match call {
            ToolCall::WebSearch { query } => search::run(&query),
            ToolCall::Calculator { expression } => calculator::run(&expression),
            ToolCall::CreativeWriter { prompt } => {
                writer::create(self.llm.as_ref(), &self.model, &prompt).await
            }
            ToolCall::Translator {
                text,
                target_language,
                source_language,
            } => {
                writer::translate(
                    self.llm.as_ref(),
                    &self.model,
                    &text,
                    &target_language,
                    &source_language,
                )
                .await
            }
            ToolCall::ReminderPlanner {
                task_description,
                time_or_date,
            } => planner::run(&task_description, &time_or_date),
        };

        result.duration_ms = Some(started.elapsed().as_millis());
        debug!(
            "Tool {} finished in {:?}ms (error: {})",
            kind.name(),
            result.duration_ms,
            result.is_error
        );
        result
    }

    /// Resolve `name`, parse `raw_input` and run the tool.
    pub async fn run(&self, name: &str, raw_input: &str) -> ToolResult {
        let Some(kind) = ToolKind::from_name(name) else {
            return ToolResult::error(format!(
                "{} is not a valid tool, try one of [{}].",
                name.trim(),
                Self::names().join(", ")
            ))
            .with_error_type("unknown_tool");
        };

        match ToolCall::parse(kind, raw_input) {
            Ok(call) => self.execute(call).await,
            Err(e) => ToolResult::error(format!("Invalid input for {}: {e}", kind.name()))
                .with_error_type("invalid_input"),
        }
    }
}
