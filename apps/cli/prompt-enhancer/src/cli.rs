use models::{Description, Format, Length, Tone};

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Turn short prompts into structured prompts using an LLM provider.
///
/// Every command prints one JSON object on stdout.
#[derive(Debug, Parser)]
#[command(name = "prompt-enhancer", version, about)]
pub struct Cli {
    /// Directory holding config.json, state.json, models.toml and the log
    #[arg(long, global = true, env = "PROMPT_ENHANCER_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Enhance a prompt with the stored settings and credential
    Enhance {
        /// The prompt; several words are joined with spaces
        #[arg(required = true, num_args = 1..)]
        prompt: Vec<String>,

        /// Provider id (openrouter, openai, anthropic, groq, perplexity)
        #[arg(short, long)]
        provider: Option<String>,

        /// Model id; defaults to the provider's default model
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Show or change the enhancement settings
    #[command(subcommand)]
    Settings(SettingsCommand),

    /// Manage the stored API key or redemption code
    #[command(subcommand)]
    Credential(CredentialCommand),

    /// Show usage counters and the cached credit balance
    Stats,

    /// Ask the backend for the current credit balance
    Credits,

    /// List the models offered for a provider
    Models {
        #[arg(short, long)]
        provider: Option<String>,
    },

    /// Check an API key against a provider without saving it
    ProbeKey {
        key: String,

        #[arg(short, long)]
        provider: Option<String>,

        #[arg(short, long)]
        model: Option<String>,
    },
}

#[derive(Debug, Subcommand)]
pub enum SettingsCommand {
    Show,
    Set(SettingsUpdate),
}

#[derive(Debug, Subcommand)]
pub enum CredentialCommand {
    /// Store an API key or a redemption code (detected by shape)
    Set { value: String },
    Show,
    Clear,
}

/// Fields to change; omitted ones keep their stored value.
#[derive(Debug, Clone, Default, Args, PartialEq, Eq)]
pub struct SettingsUpdate {
    #[arg(long)]
    pub role: Option<String>,

    /// detailed, summary or creative
    #[arg(long)]
    pub description: Option<Description>,

    /// short, medium or long
    #[arg(long)]
    pub length: Option<Length>,

    /// structured, paragraph, stepbystep or creative
    #[arg(long)]
    pub format: Option<Format>,

    /// helpful, professional, casual or technical
    #[arg(long)]
    pub tone: Option<Tone>,
}
