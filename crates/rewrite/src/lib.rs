pub mod llm;
pub mod prompt;

pub use llm::{AzureOpenAiClient, ChatCompleter, ChatCompletion, ChatMessage};

use anyhow::Result;
use std::sync::Arc;

/// Rewrites manual text through a chat model.
#[derive(Clone)]
pub struct Rewriter {
    llm_client: Arc<dyn ChatCompleter>,
}

impl Rewriter {
    pub fn new(llm_client: Arc<dyn ChatCompleter>) -> Self {
        Self { llm_client }
    }

    /// Ask the model for an updated version of `document_text`.
    ///
    /// Returns the top choice; an empty string if the model returned none.
    pub async fn rewrite(&self, document_text: &str) -> Result<String> {
        let messages = [
            ChatMessage::system(prompt::SYSTEM_PROMPT),
            ChatMessage::user(prompt::build_update_prompt(document_text)),
        ];

        let completion = self.llm_client.complete(&messages).await?;
        if completion.choices.is_empty() {
            tracing::warn!("Model returned no completions");
        }

        Ok(completion.first_text())
    }
}
