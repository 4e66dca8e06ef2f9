mod cli;
mod clock;

use clap::Parser;
use cli::{ChatArgs, Cli, Command, DataArgs, ImageArgs};
use clock::ClockApi;
use std::error::Error;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt};
use xai_conversation_core::adapter::RequestAdapter;
use xai_conversation_core::agent::{ChatDelta, ConversationAgent, DeltaListener};
use xai_conversation_core::config::catalog::{Capability, XAI_MODELS};
use xai_conversation_core::model::{ChatBackend, XaiClient};
use xai_conversation_core::task::StructuredTask;
use xai_conversation_core::tooling::ToolRegistry;
use xai_conversation_core::types::{Attachment, ChatLog, ConversationInput};
use xai_conversation_core::{AgentKind, AgentOptions, AppConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    init_tracing();
    let cli = Cli::parse();
    debug!(command = ?cli.command, config = ?cli.config, agent = ?cli.agent, "CLI arguments parsed");

    let config = AppConfig::load(cli.config.as_deref())?;
    info!(agents = config.agents.len(), endpoint = config.endpoint.as_str(), "Configuration loaded");

    if let Command::Config = cli.command {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    let client = XaiClient::from_config(&config)?;
    let outcome = match cli.command {
        Command::Validate => validate(&client).await,
        Command::Models => list_models(&client).await,
        Command::Chat(args) => {
            let options = config.select(cli.agent.as_deref(), AgentKind::Conversation)?.clone();
            chat(client, options, args).await
        }
        Command::Data(args) => {
            let options = config.select(cli.agent.as_deref(), AgentKind::AiTask)?.clone();
            generate_data(client, &options, args).await
        }
        Command::Image(args) => {
            let options = config.select(cli.agent.as_deref(), AgentKind::AiTask)?.clone();
            generate_image(client, &options, args).await
        }
        Command::Config => Ok(()),
    };

    if let Err(message) = outcome {
        eprintln!("{message}");
        std::process::exit(1);
    }
    Ok(())
}

fn init_tracing() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_level(true)
            .with_writer(io::stderr)
            .init();
    });
}

/// Errors shown to the user, already in readable form
type CommandResult = Result<(), String>;

async fn validate(client: &XaiClient) -> CommandResult {
    let models = client.validate().await.map_err(|err| err.user_message())?;
    println!("API key accepted by {} ({} models available)", client.endpoint(), models.len());
    Ok(())
}

async fn list_models(client: &XaiClient) -> CommandResult {
    let available = client
        .list_language_models()
        .await
        .map_err(|err| err.user_message())?;
    let is_available = |id: &str| {
        available
            .iter()
            .any(|model| model.id == id || model.aliases.iter().any(|alias| alias == id))
    };

    for model in XAI_MODELS {
        let capabilities: Vec<&str> = [
            Capability::Chat,
            Capability::ReasoningEffort,
            Capability::LiveSearch,
            Capability::Vision,
            Capability::ImageGeneration,
        ]
        .into_iter()
        .filter(|capability| model.supports(*capability))
        .map(Capability::as_str)
        .collect();
        let marker = if is_available(model.id) { "*" } else { " " };
        println!("{marker} {:<28} {}", model.id, capabilities.join(", "));
    }
    println!("\n* available to this API key");
    Ok(())
}

/// Prints answer text as it arrives
struct TerminalListener;

impl DeltaListener for TerminalListener {
    fn on_delta(&self, _conversation_id: &str, delta: &ChatDelta<'_>) {
        match delta {
            ChatDelta::Content(text) => {
                let mut stdout = io::stdout().lock();
                let _ = write!(stdout, "{text}");
                let _ = stdout.flush();
            }
            ChatDelta::Progress(text) => eprintln!("{text}"),
            ChatDelta::ToolCalls(calls) => {
                for call in *calls {
                    eprintln!("[tool] {} {}", call.tool_name, call.tool_args);
                }
            }
            ChatDelta::Thinking(text) => debug!(thinking = *text, "Model reasoning"),
            ChatDelta::AssistantStart | ChatDelta::ToolResult { .. } => {}
        }
    }
}

async fn chat(client: XaiClient, mut options: AgentOptions, args: ChatArgs) -> CommandResult {
    if args.no_stream {
        options.stream = false;
    }
    let registry = ToolRegistry::new().with(Arc::new(ClockApi));
    let agent = ConversationAgent::new(Arc::new(RequestAdapter::new(client)), options, registry);
    let mut chat_log = ChatLog::new(args.conversation.clone());
    let mut attachments = to_attachments(&args.images);

    let prompt = args.prompt.join(" ");
    if !prompt.trim().is_empty() {
        return send(&agent, &mut chat_log, prompt, attachments).await;
    }

    eprintln!(
        "Chatting with {} ({}). Type 'exit' to quit.",
        agent.options().name,
        agent.options().chat_model
    );
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        eprint!("> ");
        let Some(line) = lines.next_line().await.map_err(|err| err.to_string())? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if matches!(line, "exit" | "quit") {
            break;
        }
        // A failed message keeps the REPL alive. The agent has already rolled the log back.
        if let Err(message) = send(&agent, &mut chat_log, line.to_string(), std::mem::take(&mut attachments)).await {
            eprintln!("{message}");
        }
    }
    info!(
        conversation_id = chat_log.conversation_id.as_str(),
        total_tokens = chat_log.usage.total_tokens,
        "Chat finished"
    );
    Ok(())
}

async fn send<B: ChatBackend>(
    agent: &ConversationAgent<B>,
    chat_log: &mut ChatLog,
    text: String,
    attachments: Vec<Attachment>,
) -> CommandResult {
    let input = ConversationInput::new(text).with_attachments(attachments);
    let result = agent
        .handle_message(input, chat_log, Some(&TerminalListener))
        .await
        .map_err(|err| err.user_message())?;
    println!();
    debug!(
        conversation_id = result.conversation_id.as_str(),
        continue_conversation = result.continue_conversation,
        "Message handled"
    );
    Ok(())
}

async fn generate_data(client: XaiClient, options: &AgentOptions, args: DataArgs) -> CommandResult {
    let instructions = args.instructions.join(" ");
    if instructions.trim().is_empty() {
        return Err("Instructions are required.".to_string());
    }
    let mut task = StructuredTask::new(args.name, instructions)
        .with_attachments(to_attachments(&args.attachments));
    if let Some(path) = &args.schema {
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|err| format!("Cannot read schema {}: {err}", path.display()))?;
        let schema = serde_json::from_str(&raw)
            .map_err(|err| format!("Schema {} is not valid JSON: {err}", path.display()))?;
        task = task.with_schema(schema);
    }

    let adapter = RequestAdapter::new(client);
    let value = adapter
        .generate_structured_data(options, &task)
        .await
        .map_err(|err| err.user_message())?;
    let rendered = serde_json::to_string_pretty(&value).map_err(|err| err.to_string())?;
    println!("{rendered}");
    Ok(())
}

async fn generate_image(client: XaiClient, options: &AgentOptions, args: ImageArgs) -> CommandResult {
    let adapter = RequestAdapter::new(client);
    let image = adapter
        .generate_image(options, &args.prompt.join(" "))
        .await
        .map_err(|err| err.user_message())?;

    let path = args
        .out
        .unwrap_or_else(|| PathBuf::from(format!("image.{}", image.mime_type.extension())));
    tokio::fs::write(&path, &image.data)
        .await
        .map_err(|err| format!("Cannot write {}: {err}", path.display()))?;
    println!("{} ({}, {} bytes)", path.display(), image.mime_type, image.data.len());
    if let Some(revised) = &image.revised_prompt {
        println!("Revised prompt: {revised}");
    }
    Ok(())
}

fn to_attachments(paths: &[PathBuf]) -> Vec<Attachment> {
    paths.iter().map(Attachment::from_path).collect()
}
