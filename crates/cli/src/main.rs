//! # agrobot: a command-line front end for the agricultural chatbot
//!
//! Answers questions with the same configuration the server uses (`config.yml`
//! plus environment), either one at a time or in an interactive session.

mod repl;

use agrobot::{rules::KeywordResponder, UserProfile};
use agrobot_server::{config::get_config, state::build_processor};
use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::fs::File;
use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

// --- CLI Definition ---

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to a config.yml; defaults to the server crate's config.yml if present
    #[arg(long, global = true, env = "AGROBOT_CONFIG")]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ask a single question
    Ask(AskArgs),
    /// Start an interactive session (type `exit` or `quit` to leave)
    Chat(ProfileArgs),
    /// Ask the rule-based responder, which needs no knowledge base or services
    Rules(RulesArgs),
}

#[derive(Args, Debug)]
struct AskArgs {
    /// The question to ask
    question: String,
    #[command(flatten)]
    profile: ProfileArgs,
}

#[derive(Args, Debug)]
struct ProfileArgs {
    /// Preferred reply language, e.g. `hi` or `ta`
    #[arg(long)]
    lang: Option<String>,
    /// Your name, passed to the language model as context
    #[arg(long)]
    name: Option<String>,
}

impl ProfileArgs {
    fn to_profile(&self) -> UserProfile {
        let mut profile = UserProfile::new();
        if let Some(lang) = &self.lang {
            profile = profile.with_preferred_language(lang.as_str());
        }
        if let Some(name) = &self.name {
            profile = profile.with_field("name", name.as_str());
        }
        profile
    }
}

#[derive(Args, Debug)]
struct RulesArgs {
    /// The message to answer
    message: String,
}

// --- Main Application Entry ---

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Log to a file so the console only shows answers.
    let log_file = File::create("agrobot-cli.log")?;
    let subscriber = fmt::Subscriber::builder()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();

    match &cli.command {
        Commands::Rules(args) => {
            println!("{}", KeywordResponder::new().respond(&args.message));
        }
        Commands::Ask(args) => {
            let config = get_config(cli.config.as_deref())?;
            let processor = build_processor(&config)?;
            let reply = processor
                .process_message(&args.profile.to_profile(), &args.question)
                .await;
            println!("{reply}");
        }
        Commands::Chat(args) => {
            let config = get_config(cli.config.as_deref())?;
            let processor = build_processor(&config)?;
            info!("Starting interactive session");
            let mut stdout = tokio::io::stdout();
            repl::run_chat(
                &processor,
                &args.to_profile(),
                BufReader::new(tokio::io::stdin()),
                &mut stdout,
            )
            .await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ask_with_profile() {
        let cli = Cli::parse_from(["agrobot", "ask", "When to sow wheat?", "--lang", "hi", "--name", "Asha"]);
        let Commands::Ask(args) = cli.command else {
            panic!("expected the ask command");
        };
        assert_eq!(args.question, "When to sow wheat?");
        let profile = args.profile.to_profile();
        assert_eq!(profile.preferred_language.as_deref(), Some("hi"));
        assert_eq!(profile.extra["name"], "Asha");
    }

    #[test]
    fn test_empty_profile_args() {
        let cli = Cli::parse_from(["agrobot", "chat"]);
        let Commands::Chat(args) = cli.command else {
            panic!("expected the chat command");
        };
        assert_eq!(args.to_profile(), UserProfile::default());
    }

    #[test]
    fn test_command_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
