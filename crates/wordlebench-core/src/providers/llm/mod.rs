use crate::model::Message;
use async_trait::async_trait;

/// One model reply and what the provider charged for it.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub text: String,
    pub cost: f64,
}

#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Requests one completion for the full message history.
    ///
    /// Errors are transport or provider faults; they end the session without a record.
    async fn complete(&self, model: &str, messages: &[Message]) -> anyhow::Result<Completion>;
    fn provider_name(&self) -> &'static str;
}

pub mod fake;
pub mod openai;
