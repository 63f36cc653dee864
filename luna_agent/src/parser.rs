//! Parsing of ReAct-formatted model output.

use thiserror::Error;

const FINAL_ANSWER: &str = "Final Answer:";
const ACTION: &str = "Action:";
const ACTION_INPUT: &str = "Action Input:";
const OBSERVATION: &str = "Observation:";

/// What the model asked for on one iteration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentStep {
    Finish(String),
    Act { tool: String, input: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Invalid Format: Missing 'Action:' after 'Thought:'")]
    MissingAction,

    #[error("Invalid Format: Missing 'Action Input:' after 'Action:'")]
    MissingActionInput,

    #[error("Parsing LLM output produced both a final answer and a parse-able action")]
    ActionAndFinalAnswer,
}

/// Drop everything from the first `Observation:` on.
///
/// Observations come from tools, so anything the model wrote after that
/// marker is invented.
#[must_use]
pub fn truncate_at_observation(output: &str) -> &str {
    output.find(OBSERVATION).map_or(output, |at| &output[..at])
}

fn strip_fences(input: &str) -> &str {
    let trimmed = input.trim();
    let Some(body) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = body.strip_prefix("json").unwrap_or(body);
    body.strip_suffix("```").unwrap_or(body).trim()
}

pub fn parse_output(output: &str) -> Result<AgentStep, ParseError> {
    let text = truncate_at_observation(output);
    let final_at = text.find(FINAL_ANSWER);

    if let Some(action_at) = text.find(ACTION) {
        let after_action = &text[action_at + ACTION.len()..];
        let Some(input_at) = after_action.find(ACTION_INPUT) else {
            return Err(ParseError::MissingActionInput);
        };
        if final_at.is_some() {
            return Err(ParseError::ActionAndFinalAnswer);
        }

        let tool = after_action[..input_at].trim();
        if tool.is_empty() {
            return Err(ParseError::MissingAction);
        }

        let input = strip_fences(&after_action[input_at + ACTION_INPUT.len()..]);
        let input = input.trim_matches('"').trim();

        return Ok(AgentStep::Act {
            tool: tool.to_string(),
            input: input.to_string(),
        });
    }

    match final_at {
        Some(at) => Ok(AgentStep::Finish(
            text[at + FINAL_ANSWER.len()..].trim().to_string(),
        )),
        None => Err(ParseError::MissingAction),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn final_answer() {
        let out = "Thought: I now know the final answer\nFinal Answer: Kyaa~! It's 4, Master! ✨";
        assert_eq!(
            parse_output(out),
            Ok(AgentStep::Finish("Kyaa~! It's 4, Master! ✨".into()))
        );
    }

    #[test]
    fn multiline_final_answer_is_kept_whole() {
        let out = "Final Answer: Line one!\nLine two~";
        assert_eq!(
            parse_output(out),
            Ok(AgentStep::Finish("Line one!\nLine two~".into()))
        );
    }

    #[test]
    fn action_with_plain_input() {
        let out = "Thought: Calc-kun can do this!\nAction: calculator\nAction Input: \"2+2\"\n";
        assert_eq!(
            parse_output(out),
            Ok(AgentStep::Act {
                tool: "calculator".into(),
                input: "2+2".into()
            })
        );
    }

    #[test]
    fn action_with_fenced_json_input() {
        let out = "Action: language_translator\nAction Input: ```json\n{\"text\": \"hi\", \"target_language\": \"French\"}\n```";
        assert_eq!(
            parse_output(out),
            Ok(AgentStep::Act {
                tool: "language_translator".into(),
                input: "{\"text\": \"hi\", \"target_language\": \"French\"}".into()
            })
        );
    }

    #[test]
    fn hallucinated_observation_is_ignored() {
        let out = "Action: web_search\nAction Input: cats\nObservation: cats are great\nThought: done\nFinal Answer: cats!";
        assert_eq!(
            truncate_at_observation(out),
            "Action: web_search\nAction Input: cats\n"
        );
        assert_eq!(
            parse_output(out),
            Ok(AgentStep::Act {
                tool: "web_search".into(),
                input: "cats".into()
            })
        );
    }

    #[test]
    fn malformed_output() {
        assert_eq!(
            parse_output("Hehe! Just chatting, no format here."),
            Err(ParseError::MissingAction)
        );
        assert_eq!(
            parse_output("Action: calculator\n"),
            Err(ParseError::MissingActionInput)
        );
        assert_eq!(
            parse_output("Action:\nAction Input: 2+2"),
            Err(ParseError::MissingAction)
        );
        assert_eq!(
            parse_output("Action: calculator\nAction Input: 1+1\nFinal Answer: 2"),
            Err(ParseError::ActionAndFinalAnswer)
        );
    }
}
