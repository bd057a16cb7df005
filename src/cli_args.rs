use clap::{ArgAction, Parser, Subcommand};

/// CLI options
#[derive(Parser, Debug)]
#[command(
    name = "codekoala",
    version,
    about = "Local-LLM code reviewer and commit message writer for Git"
)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Ollama model to use (e.g. codellama, llama3)
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// Base URL of the Ollama server
    #[arg(long, global = true)]
    pub ollama_url: Option<String>,

    /// Subcommand; defaults to reviewing all working-tree changes
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Subcommands, e.g. `codekoala review --branch main`
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Review code changes before committing
    Review {
        /// Branch to compare HEAD against
        #[arg(long, conflicts_with = "staged")]
        branch: Option<String>,

        /// Only review staged changes
        #[arg(long)]
        staged: bool,
    },

    /// Draft a commit message for the staged changes
    Commit {
        /// Extra context for the model (why the change was made, etc.)
        #[arg(long)]
        context: Option<String>,

        /// Ticket reference to put in the message (e.g. 123 or #123)
        #[arg(long)]
        ticket: Option<String>,

        /// Write the message into .git/COMMIT_EDITMSG (no commit is created)
        #[arg(long)]
        apply: bool,
    },

    /// Check that Ollama is running and the configured model is installed
    Check,

    /// Show the effective configuration, or a single value
    Config {
        /// Setting to print (model, ollama_url, timeout_secs)
        key: Option<String>,

        /// Persist a default model to ~/.config/codekoala.toml
        #[arg(long)]
        set_model: Option<String>,
    },
}
