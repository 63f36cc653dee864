//! LLM-backed tools: Muse-sensei (creative writing) and Translate-kun.

use luna_core::{ChatMessage, LLMProvider};
use tracing::{info, warn};

use crate::ToolResult;

async fn complete(llm: &dyn LLMProvider, model: &str, prompt: String) -> anyhow::Result<String> {
    let response = llm.chat(&[ChatMessage::user(prompt)], model).await?;
    Ok(response.content.trim().to_string())
}

pub(crate) async fn create(llm: &dyn LLMProvider, model: &str, prompt: &str) -> ToolResult {
    info!("Muse-sensei creating something based on '{prompt}'");

    let request = format!(
        "You are Luna's creative writing tool, Muse-sensei! Create engaging, creative content based on this prompt: {prompt}\n\n\
         Write in an enthusiastic, creative style that matches Luna's vibrant personality. \
         This could be a story, poem, idea, or any creative text. Keep it fun and engaging!"
    );

    match complete(llm, model, request).await {
        Ok(content) => ToolResult::success(format!(
            "Kyaa~! Muse-sensei has blessed Luna with inspiration! ✨ Here's what flowed from the creative springs:\n\n{content}\n\n\
             Hehe! Luna hopes you love what Muse-sensei created! 🌸"
        )),
        Err(e) => {
            warn!("Muse-sensei failed: {e}");
            ToolResult::error(format!(
                "Waaah! Muse-sensei is taking a nap! Error: {e} But Luna's creativity never stops flowing! 💖"
            ))
            .with_error_type("llm_error")
        }
    }
}

pub(crate) async fn translate(
    llm: &dyn LLMProvider,
    model: &str,
    text: &str,
    target_language: &str,
    source_language: &str,
) -> ToolResult {
    info!("Translate-kun translating from {source_language} to {target_language}");

    let request = format!(
        "You are Luna's translation tool, Translate-kun! Please translate the following text:\n\n\
         Source Language: {source_language}\n\
         Target Language: {target_language}\n\
         Text to translate: {text}\n\n\
         Provide only the translation without additional explanation."
    );

    match complete(llm, model, request).await {
        Ok(translation) => ToolResult::success(format!(
            "Yay! Translate-kun worked his magic! ✨\n\n\
             Original ({source_language}): {text}\n\
             Translated ({target_language}): {translation}\n\n\
             Hehe! Luna hopes the translation captures the essence perfectly! 🌟"
        )),
        Err(e) => {
            warn!("Translate-kun failed: {e}");
            ToolResult::error(format!(
                "Eeeek! Translate-kun got tongue-tied! Error: {e} But Luna will keep practicing languages! 💖"
            ))
            .with_error_type("llm_error")
        }
    }
}
