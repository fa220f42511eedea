//! CLI command definitions for the `fchat` binary.
//!
//! Uses clap derive macros for argument parsing. Chatbots are addressed by
//! their id (e.g., `fchat show bot_1a2b3c4d5e6f`).

pub mod chatbot;
pub mod status;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

/// Turn Google Forms into embeddable chat widgets.
#[derive(Parser)]
#[command(name = "fchat", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export spans to stdout through OpenTelemetry.
    #[arg(long, global = true, env = "FORMCHAT_OTEL")]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Cosmetic flags shared by `create` and `update`.
#[derive(Args, Debug, Default, Clone)]
pub struct CustomizationArgs {
    /// Button and header color (hex, e.g. #7c3aed).
    #[arg(long)]
    pub primary_color: Option<String>,

    /// Accent color (hex).
    #[arg(long)]
    pub secondary_color: Option<String>,

    /// Name shown in the widget header.
    #[arg(long)]
    pub bot_name: Option<String>,

    /// Greeting shown under the bot name.
    #[arg(long)]
    pub welcome: Option<String>,

    /// Screen corner: bottom-left or bottom-right.
    #[arg(long)]
    pub position: Option<String>,

    /// Widget size: small, medium or large.
    #[arg(long)]
    pub size: Option<String>,
}

impl CustomizationArgs {
    pub fn is_empty(&self) -> bool {
        self.primary_color.is_none()
            && self.secondary_color.is_none()
            && self.bot_name.is_none()
            && self.welcome.is_none()
            && self.position.is_none()
            && self.size.is_none()
    }
}

/// Which embed snippet to print.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum EmbedKind {
    Popup,
    Iframe,
    Both,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a chatbot from a Google Form.
    #[command(alias = "new")]
    Create {
        /// Chatbot name (prompted when omitted).
        #[arg(long)]
        name: Option<String>,

        /// Google Form URL (prompted when omitted).
        #[arg(long)]
        form_url: Option<String>,

        /// Intended embed style: popup or iframe.
        #[arg(long)]
        embed_type: Option<String>,

        #[command(flatten)]
        customization: CustomizationArgs,
    },

    /// List chatbots.
    #[command(alias = "ls")]
    List {
        /// Page number (1-based).
        #[arg(long, default_value = "1")]
        page: u32,

        /// Results per page (1-100). Defaults to the configured page size.
        #[arg(long)]
        per_page: Option<u32>,

        /// Only active (true) or inactive (false) chatbots.
        #[arg(long)]
        active: Option<bool>,
    },

    /// Show details of a chatbot.
    Show {
        /// Chatbot id.
        id: String,
    },

    /// Print the embed code of a chatbot.
    Embed {
        /// Chatbot id.
        id: String,

        /// Which snippet to print.
        #[arg(long, value_enum, default_value = "both")]
        kind: EmbedKind,
    },

    /// Update a chatbot.
    Update {
        /// Chatbot id.
        id: String,

        /// New name.
        #[arg(long)]
        name: Option<String>,

        /// New Google Form URL.
        #[arg(long)]
        form_url: Option<String>,

        /// New embed style: popup or iframe.
        #[arg(long)]
        embed_type: Option<String>,

        /// Activate or deactivate.
        #[arg(long)]
        active: Option<bool>,

        #[command(flatten)]
        customization: CustomizationArgs,
    },

    /// Delete a chatbot and its usage counters.
    #[command(alias = "rm")]
    Delete {
        /// Chatbot id.
        id: String,

        /// Skip confirmation prompt.
        #[arg(long)]
        force: bool,
    },

    /// Usage statistics: one chatbot, or the whole fleet.
    Stats {
        /// Chatbot id; omit for global stats.
        id: Option<String>,
    },

    /// Start the REST API server.
    Serve {
        /// Port to listen on.
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to.
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}
