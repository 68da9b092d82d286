//! Agent executor for running the LLM/tool loop

use crate::{ExecutorError, Result};
use analyst_llm::{CompletionRequest, ContentBlock, LlmProvider, Message, StopReason, ToolDefinition};
use analyst_tools::ToolRegistry;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Configuration for one agent loop
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Maximum number of iterations (prevents infinite loops)
    pub max_iterations: usize,

    /// Model to use
    pub model: String,

    /// System prompt
    pub system_prompt: Option<String>,

    /// Max tokens per completion
    pub max_tokens: usize,

    /// Temperature
    pub temperature: Option<f32>,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            max_iterations: 10,
            model: "claude-sonnet-4-5-20250929".to_string(),
            system_prompt: None,
            max_tokens: 1024,
            temperature: Some(0.7),
        }
    }
}

/// Drives the agent loop: LLM → tool calls → invocation → loop back
///
/// Holds only shared read-only state (`Arc`s and config), so one executor
/// can serve concurrent requests without coordination.
pub struct ToolExecutor {
    provider: Arc<dyn LlmProvider>,
    registry: Arc<ToolRegistry>,
    config: ExecutorConfig,
}

impl ToolExecutor {
    /// Create a new executor
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        registry: Arc<ToolRegistry>,
        config: ExecutorConfig,
    ) -> Self {
        Self {
            provider,
            registry,
            config,
        }
    }

    /// Run the agent loop for a single user message
    ///
    /// Returns the model's final text once it stops requesting tools.
    pub async fn run(&self, user_message: String) -> Result<String> {
        let mut conversation = vec![Message::user(user_message)];
        let mut iteration = 0;

        loop {
            iteration += 1;
            if iteration > self.config.max_iterations {
                warn!(
                    max_iterations = self.config.max_iterations,
                    "Max iterations reached, stopping"
                );
                return Ok("Max iterations reached without completion".to_string());
            }

            let tools = self.build_tool_definitions();
            info!(
                iteration = iteration,
                model = %self.config.model,
                max_tokens = self.config.max_tokens,
                tool_count = tools.len(),
                "Agent iteration started"
            );

            let mut request = CompletionRequest::new(&self.config.model, conversation.clone())
                .with_max_tokens(self.config.max_tokens);
            if let Some(system) = &self.config.system_prompt {
                request = request.with_system(system.clone());
            }
            if let Some(temperature) = self.config.temperature {
                request = request.with_temperature(temperature);
            }
            if !tools.is_empty() {
                request = request.with_tools(tools);
            }

            let response = self.provider.complete(request).await?;

            info!(
                stop_reason = ?response.stop_reason,
                input_tokens = response.usage.input_tokens,
                output_tokens = response.usage.output_tokens,
                "LLM response received"
            );

            conversation.push(response.message.clone());

            match response.stop_reason {
                StopReason::EndTurn => {
                    let text = response.message.text().unwrap_or("No response").to_string();
                    info!(
                        iteration = iteration,
                        response_length = text.len(),
                        "Agent completed naturally"
                    );
                    return Ok(text);
                }

                StopReason::ToolUse => {
                    let tool_results = self.invoke_tools(&response.message).await?;

                    if tool_results.is_empty() {
                        warn!("No tool results despite tool_use stop reason");
                        return Ok("Tool execution failed".to_string());
                    }

                    for result in tool_results {
                        conversation.push(result);
                    }
                }

                StopReason::MaxTokens => {
                    warn!("Hit max tokens in LLM response");
                    return Ok("Response truncated due to token limit".to_string());
                }

                StopReason::StopSequence => {
                    debug!("Stop sequence encountered");
                    return Ok(response.message.text().unwrap_or("No response").to_string());
                }
            }
        }
    }

    /// Build tool definitions from the catalog
    fn build_tool_definitions(&self) -> Vec<ToolDefinition> {
        self.registry
            .list_tools()
            .iter()
            .map(|tool| ToolDefinition::new(tool.name(), tool.description(), tool.input_schema()))
            .collect()
    }

    /// Invoke the tool calls in an assistant message
    ///
    /// Tool failures are fed back to the model as error results rather
    /// than ending the loop; only an unknown tool name is terminal.
    async fn invoke_tools(&self, message: &Message) -> Result<Vec<Message>> {
        let mut results = Vec::new();

        for tool_use in message.tool_uses() {
            if let ContentBlock::ToolUse { id, name, input } = tool_use {
                let input_preview: String = input.to_string().chars().take(500).collect();
                info!(
                    tool_name = %name,
                    tool_id = %id,
                    input_preview = %input_preview,
                    "Invoking tool"
                );

                let tool = self
                    .registry
                    .get(name)
                    .ok_or_else(|| ExecutorError::ToolNotFound(name.clone()))?;

                let start = std::time::Instant::now();
                match tool.invoke(input.clone()).await {
                    Ok(result) => {
                        info!(
                            tool_name = %name,
                            duration_ms = start.elapsed().as_millis() as u64,
                            result_length = result.raw_text.len(),
                            "Tool invocation succeeded"
                        );
                        if let Some(artifact) = &result.artifact_path {
                            info!(tool_name = %name, artifact = %artifact, "Tool persisted artifact");
                        }
                        results.push(Message::tool_result(id.clone(), result.raw_text));
                    }
                    Err(e) => {
                        warn!(
                            tool_name = %name,
                            duration_ms = start.elapsed().as_millis() as u64,
                            error = %e,
                            "Tool invocation failed"
                        );
                        results.push(Message::tool_error(id.clone(), format!("Error: {e}")));
                    }
                }
            }
        }

        Ok(results)
    }
}
