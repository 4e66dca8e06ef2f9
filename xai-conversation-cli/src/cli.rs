use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "xai-conversation",
    version,
    about = "Talk to xAI Grok models through the conversation adapter"
)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
    /// Agent to use (defaults to the first agent of the matching kind)
    #[arg(short, long, global = true)]
    pub agent: Option<String>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check the API key against the xAI API
    Validate,
    /// List known models and their capabilities
    Models,
    /// Send a message, or start an interactive chat without one
    Chat(ChatArgs),
    /// Generate structured data
    Data(DataArgs),
    /// Generate an image
    Image(ImageArgs),
    /// Print the effective configuration as TOML
    Config,
}

#[derive(Args, Debug)]
pub struct ChatArgs {
    /// Wait for the whole answer instead of streaming it
    #[arg(long)]
    pub no_stream: bool,
    /// Image to attach to the first message
    #[arg(long = "image", value_name = "PATH")]
    pub images: Vec<PathBuf>,
    /// Continue an existing conversation id
    #[arg(long)]
    pub conversation: Option<String>,
    pub prompt: Vec<String>,
}

#[derive(Args, Debug)]
pub struct DataArgs {
    /// Task name
    #[arg(long, default_value = "cli_task")]
    pub name: String,
    /// JSON schema file the output must follow
    #[arg(long, value_name = "FILE")]
    pub schema: Option<PathBuf>,
    /// Image to attach
    #[arg(long = "attach", value_name = "PATH")]
    pub attachments: Vec<PathBuf>,
    pub instructions: Vec<String>,
}

#[derive(Args, Debug)]
pub struct ImageArgs {
    /// Output file; the extension follows the image type when omitted
    #[arg(long, short, value_name = "FILE")]
    pub out: Option<PathBuf>,
    pub prompt: Vec<String>,
}
