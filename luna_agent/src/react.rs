//! ReAct loop over an LLM and Luna's toolbox.

use std::sync::Arc;

use async_trait::async_trait;
use luna_core::util::preview;
use luna_core::{ChatMessage, LLMProvider, ToolAgent};
use luna_tools::Toolbox;
use tracing::{debug, info, warn};

use crate::parser::{AgentStep, parse_output, truncate_at_observation};
use crate::prompt;

#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub model: String,
    /// Upper bound on model calls per question.
    pub max_iterations: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.0-flash".to_string(),
            max_iterations: 5,
        }
    }
}

pub struct ReactAgent {
    llm: Arc<dyn LLMProvider>,
    toolbox: Toolbox,
    config: AgentConfig,
}

impl ReactAgent {
    pub fn new(llm: Arc<dyn LLMProvider>, config: AgentConfig) -> Self {
        info!(
            "Creating ReAct agent: model={}, max_iterations={}",
            config.model, config.max_iterations
        );
        let toolbox = Toolbox::new(Arc::clone(&llm), config.model.clone());
        Self {
            llm,
            toolbox,
            config,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Answer `question`, calling tools as the model asks for them.
    pub async fn run(&self, question: &str) -> anyhow::Result<String> {
        let tools = Toolbox::describe();
        let tool_names = Toolbox::names().join(", ");
        let mut scratchpad = String::new();

        for iteration in 1..=self.config.max_iterations {
            let prompt = prompt::render(&tools, &tool_names, question, &scratchpad);
            let response = self
                .llm
                .chat(&[ChatMessage::user(prompt)], &self.config.model)
                .await?;

            let output = truncate_at_observation(&response.content);
            debug!("Iteration {iteration} output: {}", preview(output, 120));

            let observation = match parse_output(output) {
                Ok(AgentStep::Finish(answer)) => {
                    info!("Agent finished after {iteration} iteration(s)");
                    return Ok(answer);
                }
                Ok(AgentStep::Act { tool, input }) => {
                    info!("Agent calling tool {tool} with: {}", preview(&input, 80));
                    self.toolbox.run(&tool, &input).await.content
                }
                Err(e) => {
                    warn!("Could not parse agent output: {e}");
                    e.to_string()
                }
            };

            scratchpad.push_str(output.trim_end());
            scratchpad.push_str("\nObservation: ");
            scratchpad.push_str(&observation);
            scratchpad.push_str("\nThought: ");
        }

        anyhow::bail!(
            "Agent stopped due to iteration limit ({})",
            self.config.max_iterations
        )
    }
}

#[async_trait]
impl ToolAgent for ReactAgent {
    async fn invoke(&self, input: &str) -> anyhow::Result<String> {
        self.run(input).await
    }
}
