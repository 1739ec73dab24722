//! CLI command implementations.
//!
//! Contains the business logic for each CLI command. Stdout carries the
//! command's actual output; diagnostics go through `tracing` to stderr.

use std::io::Write as IoWrite;
use std::path::Path;
use std::sync::Arc;

use futures_util::StreamExt;
use tracing::{debug, info, warn};

use crate::agent::config::AgentConfig;
use crate::agent::message::{ChatRequest, user_message};
use crate::agent::orchestrator::{Agent, McpServerSpec};
use crate::agent::{LlmProvider, create_provider};
use crate::cli::output;
use crate::cli::parser::{Cli, Commands, McpCommands};
use crate::error::{Error, Result};
use crate::mcp::{RetrievalServer, serve_stdio};
use crate::rag::{OpenAiEmbedder, Retriever, corpus};

/// Parameters for the run command.
#[derive(Debug, Clone)]
pub struct RunParams {
    /// The task for the agent to perform.
    pub task: String,
    /// Knowledge directory to retrieve context from.
    pub knowledge: Option<std::path::PathBuf>,
    /// Number of documents to inject as context.
    pub top_k: Option<usize>,
    /// MCP server command lines.
    pub mcp: Vec<String>,
    /// Chat model override.
    pub model: Option<String>,
    /// System prompt for the agent.
    pub system_prompt: Option<String>,
    /// Skip context retrieval.
    pub no_context: bool,
}

/// Executes the parsed CLI command.
///
/// # Errors
///
/// Returns an error if the command fails to execute.
pub async fn execute(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Run {
            task,
            knowledge,
            top_k,
            mcp,
            model,
            system_prompt,
            no_context,
        } => {
            cmd_run(RunParams {
                task,
                knowledge,
                top_k,
                mcp,
                model,
                system_prompt,
                no_context,
            })
            .await
        }
        Commands::Retrieve {
            query,
            knowledge,
            top_k,
            full,
        } => cmd_retrieve(&query, &knowledge, top_k, full).await,
        Commands::Chat {
            prompt,
            model,
            no_stream,
        } => cmd_chat(&prompt, model, no_stream).await,
        Commands::Mcp(McpCommands::Stdio { knowledge, top_k }) => {
            cmd_mcp_stdio(&knowledge, top_k).await
        }
    }
}

/// Runs the full pipeline: retrieve context, connect MCP servers, run the task.
async fn cmd_run(params: RunParams) -> Result<()> {
    let config = build_config(params.model, params.top_k)?;

    // Step 1: context retrieval (RAG)
    let context = match params.knowledge {
        Some(ref dir) if !params.no_context => {
            retrieve_context(&config, dir, &params.task).await?
        }
        _ => String::new(),
    };

    // Step 2: connect MCP servers and collect tools
    output::print_banner("TOOLS");
    let servers = params
        .mcp
        .iter()
        .map(|s| McpServerSpec::parse(s))
        .collect::<Result<Vec<_>>>()?;

    let provider: Arc<dyn LlmProvider> = Arc::from(create_provider(&config)?);
    let agent = Agent::connect(
        provider,
        config,
        params.system_prompt.unwrap_or_default(),
        context,
        &servers,
    )
    .await?;

    let tools = agent.tool_definitions();
    println!("{} tools available", tools.len());
    for (i, tool) in tools.iter().enumerate() {
        println!("  {}. {}", i + 1, tool.name);
    }

    // Step 3: drive the tool-calling loop
    output::print_banner("CHAT");
    let result = agent.run(&params.task).await;

    if let Err(e) = agent.shutdown().await {
        warn!(error = %e, "MCP shutdown failed");
    }
    let result = result?;

    output::print_banner("RESPONSE");
    println!("{}", result.content);
    debug!(
        prompt_tokens = result.usage.prompt_tokens,
        completion_tokens = result.usage.completion_tokens,
        "final completion usage"
    );

    Ok(())
}

/// Embeds the knowledge directory and retrieves context for the task.
async fn retrieve_context(config: &AgentConfig, dir: &Path, task: &str) -> Result<String> {
    output::print_banner("RAG");

    let documents = corpus::load_dir(dir)?;
    if documents.is_empty() {
        warn!(dir = %dir.display(), "no documents to retrieve from");
        return Ok(String::new());
    }

    let mut retriever = Retriever::new(Box::new(OpenAiEmbedder::new(config)));
    retriever.embed_corpus(documents).await?;

    let hits = retriever.retrieve(task, config.top_k).await?;
    for hit in &hits {
        info!(
            document = hit.document.name,
            score = f64::from(hit.score),
            "context document"
        );
    }

    Ok(hits
        .iter()
        .map(|hit| hit.document.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n"))
}

/// Ranks knowledge-base documents against a query and prints them.
async fn cmd_retrieve(query: &str, knowledge: &Path, top_k: usize, full: bool) -> Result<()> {
    let config = build_config(None, Some(top_k))?;

    let documents = corpus::load_dir(knowledge)?;
    if documents.is_empty() {
        return Err(Error::Command(format!(
            "knowledge directory '{}' contains no documents",
            knowledge.display()
        )));
    }

    let mut retriever = Retriever::new(Box::new(OpenAiEmbedder::new(&config)));
    retriever.embed_corpus(documents).await?;
    let hits = retriever.retrieve(query, top_k).await?;

    print!("{}", output::format_hits(&hits, full));
    Ok(())
}

/// Sends a single prompt to the chat model.
async fn cmd_chat(prompt: &str, model: Option<String>, no_stream: bool) -> Result<()> {
    let config = build_config(model, None)?;
    let provider = create_provider(&config)?;

    let request = ChatRequest {
        model: config.model.clone(),
        messages: vec![user_message(prompt)],
        temperature: None,
        max_tokens: config.max_tokens,
        stream: !no_stream,
        tools: Vec::new(),
    };

    if no_stream {
        let response = provider.chat(&request).await?;
        println!("{}", response.content);
        return Ok(());
    }

    let mut stream = provider.chat_stream(&request).await?;
    let mut stdout = std::io::stdout();
    while let Some(delta) = stream.next().await {
        let delta = delta?;
        write!(stdout, "{delta}").map_err(Error::Io)?;
        stdout.flush().map_err(Error::Io)?;
    }
    writeln!(stdout).map_err(Error::Io)?;

    Ok(())
}

/// Embeds the knowledge directory and serves retrieval over MCP stdio.
async fn cmd_mcp_stdio(knowledge: &Path, top_k: usize) -> Result<()> {
    let config = build_config(None, Some(top_k))?;

    let documents = corpus::load_dir(knowledge)?;
    if documents.is_empty() {
        return Err(Error::Command(format!(
            "knowledge directory '{}' contains no documents",
            knowledge.display()
        )));
    }

    let mut retriever = Retriever::new(Box::new(OpenAiEmbedder::new(&config)));
    retriever.embed_corpus(documents).await?;

    // Stdout is reserved for the MCP protocol from here on.
    let server = RetrievalServer::new(Arc::new(retriever), top_k);
    serve_stdio(server)
        .await
        .map_err(|e| Error::Command(format!("MCP server failed: {e}")))
}

/// Builds configuration from the environment with CLI overrides applied.
fn build_config(model: Option<String>, top_k: Option<usize>) -> Result<AgentConfig> {
    let mut builder = AgentConfig::builder().from_env();
    if let Some(model) = model {
        builder = builder.model(model);
    }
    if let Some(top_k) = top_k {
        builder = builder.top_k(top_k);
    }
    Ok(builder.build()?)
}
