use super::{Completion, CompletionClient};
use crate::model::Message;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Replays canned replies in order, then repeats `fallback` (if any).
///
/// Running out of replies without a fallback is reported as a transport fault.
pub struct ScriptedClient {
    replies: Mutex<VecDeque<String>>,
    fallback: Option<String>,
    cost_per_call: f64,
    calls: AtomicUsize,
    history_lens: Mutex<Vec<usize>>,
}

impl ScriptedClient {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().map(Into::into).collect()),
            fallback: None,
            cost_per_call: 0.0,
            calls: AtomicUsize::new(0),
            history_lens: Mutex::new(Vec::new()),
        }
    }

    /// A client that answers every call with `reply`.
    pub fn always(reply: impl Into<String>) -> Self {
        Self::new(Vec::<String>::new()).with_fallback(reply)
    }

    pub fn with_fallback(mut self, reply: impl Into<String>) -> Self {
        self.fallback = Some(reply.into());
        self
    }

    pub fn with_cost(mut self, cost_per_call: f64) -> Self {
        self.cost_per_call = cost_per_call;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Length of the message history passed on each call, in call order.
    pub fn history_lens(&self) -> Vec<usize> {
        lock(&self.history_lens).clone()
    }
}

#[async_trait]
impl CompletionClient for ScriptedClient {
    async fn complete(&self, _model: &str, messages: &[Message]) -> anyhow::Result<Completion> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        lock(&self.history_lens).push(messages.len());

        let next = lock(&self.replies).pop_front();
        let text = match next.or_else(|| self.fallback.clone()) {
            Some(t) => t,
            None => anyhow::bail!("scripted client has no replies left"),
        };

        Ok(Completion {
            text,
            cost: self.cost_per_call,
        })
    }

    fn provider_name(&self) -> &'static str {
        "fake"
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}
