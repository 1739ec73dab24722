//! Agentic tool-calling loop.
//!
//! Drives the LLM ↔ MCP round-trip: sends a request to the model, executes
//! any tool calls in the response against the connected MCP servers,
//! appends results, and repeats until the model produces a final text
//! response or the iteration limit is reached.

use tracing::debug;

use super::message::{ChatRequest, ChatResponse, assistant_tool_calls_message, tool_message};
use super::provider::LlmProvider;
use crate::error::AgentError;
use crate::mcp::ToolRouter;

/// Runs an agentic loop: model → tool calls → tool results → model → …
///
/// Continues until the model responds without tool calls (i.e., it produces
/// a final text answer) or `max_iterations` is reached.
///
/// # Arguments
///
/// * `provider` - LLM provider to call.
/// * `request` - Initial chat request (mutated in-place with tool messages).
/// * `router` - Dispatches tool calls to the owning MCP server.
/// * `max_iterations` - Safety limit on round-trips.
///
/// # Returns
///
/// The final [`ChatResponse`] containing the model's text answer and the
/// usage of the last call.
///
/// # Errors
///
/// Returns [`AgentError::ToolLoopExceeded`] if the model keeps requesting
/// tools beyond `max_iterations`. Propagates any provider errors. Tool
/// failures do not abort the loop; they are fed back to the model as error
/// results.
pub async fn agentic_loop(
    provider: &dyn LlmProvider,
    request: &mut ChatRequest,
    router: &ToolRouter,
    max_iterations: usize,
) -> Result<ChatResponse, AgentError> {
    for iteration in 0..max_iterations {
        let response = provider.chat(request).await?;

        // If no tool calls, we have a final answer
        if response.tool_calls.is_empty() {
            debug!(iteration, "agentic loop completed with final text response");
            return Ok(response);
        }

        debug!(
            iteration,
            tool_count = response.tool_calls.len(),
            "executing tool calls"
        );

        // Append the assistant message with tool calls
        request
            .messages
            .push(assistant_tool_calls_message(response.tool_calls.clone()));

        // Execute each tool call and append results
        for call in &response.tool_calls {
            let result = router.execute(call).await;
            debug!(
                tool = call.name,
                call_id = call.id,
                is_error = result.is_error,
                "tool execution complete"
            );
            request
                .messages
                .push(tool_message(&result.tool_call_id, &result.content));
        }
    }

    Err(AgentError::ToolLoopExceeded { max_iterations })
}
