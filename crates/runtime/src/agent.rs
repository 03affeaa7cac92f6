//! Bounded function-calling loop.
//!
//! One query runs against a fresh [`Conversation`]: the model is asked, any
//! tool calls it makes are executed in order and their results appended, and
//! the model is asked again. The loop ends on a final answer or after
//! `max_rounds` model requests, whichever comes first.

use crate::error::{Error, Result};
use crate::model::{Backend, FinishReason, Message, ModelRequest, ToolResult, Usage};
use crate::tools::{ToolError, ToolHost, ToolOutput};
use tracing::{debug, info, warn};

/// Model requests allowed per query unless configured otherwise.
pub const DEFAULT_MAX_ROUNDS: usize = 10;

/// Append-only message history for a single query.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    /// Start a conversation with the user's query.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::user(query)],
        }
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// How a query ended.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The model produced a final answer.
    Answer(String),
    /// The model stopped for a reason other than finishing, e.g. token limit.
    Stopped { reason: FinishReason, text: String },
    /// Every round was spent on tool calls.
    Incomplete { rounds: usize },
}

/// Result of [`Agent::ask`].
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub outcome: Outcome,
    /// Model requests made.
    pub rounds: usize,
    pub usage: Usage,
}

/// Drives a backend and a tool host through the function-calling loop.
pub struct Agent<B, T> {
    backend: B,
    tools: T,
    max_rounds: usize,
}

impl<B: Backend, T: ToolHost> Agent<B, T> {
    pub fn new(backend: B, tools: T) -> Self {
        Self {
            backend,
            tools,
            max_rounds: DEFAULT_MAX_ROUNDS,
        }
    }

    /// Set the round limit. At least one round is always allowed.
    pub fn with_max_rounds(mut self, max_rounds: usize) -> Self {
        self.max_rounds = max_rounds.max(1);
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn tools(&self) -> &T {
        &self.tools
    }

    pub fn into_parts(self) -> (B, T) {
        (self.backend, self.tools)
    }

    /// Answer one query.
    ///
    /// Tool results flagged as errors go back to the model like any other
    /// result. A tool that cannot be reached at all fails the query.
    pub async fn ask(&self, query: &str) -> Result<Reply> {
        let mut conversation = Conversation::new(query);
        let mut usage = Usage::default();

        for round in 1..=self.max_rounds {
            debug!(round, messages = conversation.len(), "requesting model response");
            let response = self
                .backend
                .call(ModelRequest {
                    messages: conversation.messages(),
                    tools: self.tools.specs(),
                })
                .await?;
            usage += response.usage;

            let calls = response.message.tool_calls();
            if calls.is_empty() {
                let text = response.message.text();
                let outcome = match response.finish_reason {
                    FinishReason::Stop | FinishReason::ToolCalls => {
                        if text.trim().is_empty() {
                            return Err(Error::EmptyResponse);
                        }
                        Outcome::Answer(text)
                    }
                    reason => {
                        warn!(%reason, "model stopped early");
                        Outcome::Stopped { reason, text }
                    }
                };
                info!(rounds = round, tokens = usage.total_tokens(), "query finished");
                return Ok(Reply {
                    outcome,
                    rounds: round,
                    usage,
                });
            }

            conversation.push(response.message);

            let mut results = Vec::with_capacity(calls.len());
            for call in &calls {
                info!(tool = %call.name, args = %call.input, "calling tool");
                let output = match self.tools.execute(call).await {
                    Ok(output) => output,
                    Err(e @ ToolError::Transport(_)) => return Err(e.into()),
                    Err(e) => ToolOutput::error(e.to_string()),
                };
                if output.is_error {
                    warn!(tool = %call.name, "tool returned an error");
                }
                results.push(ToolResult {
                    tool_call_id: call.id.clone(),
                    name: call.name.clone(),
                    content: output.text(),
                    is_error: output.is_error,
                });
            }
            conversation.push(Message::tool_results(results));
        }

        warn!(rounds = self.max_rounds, "round limit reached without an answer");
        Ok(Reply {
            outcome: Outcome::Incomplete {
                rounds: self.max_rounds,
            },
            rounds: self.max_rounds,
            usage,
        })
    }
}
