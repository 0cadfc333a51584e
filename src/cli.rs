use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use colored::*;

use crate::config::Config;
use crate::engine::{IntimacyEngine, InteractionOutcome};
use crate::prompt;
use crate::responder::{self, ResponderClient};
use crate::store::JsonProfileStore;
use crate::tone;

#[derive(Parser)]
#[command(
    name = "aicompanion",
    about = "Adaptive AI companion with relationship-aware tone",
    version
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Send one message and print the adapted reply
    Chat {
        user_id: String,
        message: String,
        #[arg(short, long)]
        data_dir: Option<PathBuf>,
        #[arg(short, long)]
        model: Option<String>,
        #[arg(short, long)]
        provider: Option<String>,
    },
    /// Interactive conversation mode
    Conversation {
        user_id: String,
        #[arg(short, long)]
        data_dir: Option<PathBuf>,
        #[arg(short, long)]
        model: Option<String>,
        #[arg(short, long)]
        provider: Option<String>,
    },
    /// Show the relationship status for a user
    Status {
        user_id: String,
        #[arg(short, long)]
        data_dir: Option<PathBuf>,
    },
    /// List all known profiles
    Profiles {
        #[arg(short, long)]
        data_dir: Option<PathBuf>,
    },
    /// Forget a user and start over from the formal tier
    Reset {
        user_id: String,
        #[arg(short, long)]
        data_dir: Option<PathBuf>,
    },
}

pub async fn handle_chat(
    user_id: String,
    message: String,
    data_dir: Option<PathBuf>,
    model: Option<String>,
    provider: Option<String>,
) -> Result<()> {
    if message.trim().is_empty() {
        bail!("Message must not be empty");
    }

    let config = Config::new(data_dir)?;
    let store = JsonProfileStore::open(config.profiles_file())?;
    let mut engine = IntimacyEngine::new(store);

    let outcome = engine.process(&user_id, &message)?;
    let base = respond(&config, &outcome, &message, provider, model).await?;
    let reply = tone::adapt(&base, outcome.tier, &outcome.profile.personal_facts);
    engine.record_turn(&user_id, &message, &reply)?;

    println!("{}: {}", "You".cyan(), message);
    println!("{}: {}", "Companion".green(), reply);

    if outcome.boost > 0.0 {
        println!("{}", format!("(+{:.2} intimacy)", outcome.boost).green().dimmed());
    }
    if outcome.bonus_applied {
        println!("{}", "(+0.10 engagement bonus)".green().dimmed());
    }

    println!(
        "\n{}: {:.1}/5.0 ({})",
        "Intimacy".cyan(),
        outcome.profile.intimacy_level,
        outcome.tier
    );

    Ok(())
}

pub async fn handle_conversation(
    user_id: String,
    data_dir: Option<PathBuf>,
    model: Option<String>,
    provider: Option<String>,
) -> Result<()> {
    let config = Config::new(data_dir)?;
    let store = JsonProfileStore::open(config.profiles_file())?;
    let mut engine = IntimacyEngine::new(store);

    println!("{}", "Starting conversation mode...".cyan());
    println!(
        "{}",
        "Type your message and press Enter to chat.".yellow()
    );
    println!(
        "{}",
        "Type 'exit', 'quit' or an empty line to end the conversation.".yellow()
    );
    println!("{}", "---".dimmed());

    loop {
        print!("{} ", "You:".cyan().bold());
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim();

        if matches!(input.to_lowercase().as_str(), "exit" | "quit" | "bye" | "") {
            println!("{}", "À bientôt ! 👋".green());
            break;
        }

        let outcome = engine.process(&user_id, input)?;
        let base = respond(&config, &outcome, input, provider.clone(), model.clone()).await?;
        let reply = tone::adapt(&base, outcome.tier, &outcome.profile.personal_facts);
        engine.record_turn(&user_id, input, &reply)?;

        println!("{} {}", "Companion:".green().bold(), reply);

        if outcome.boost > 0.0 {
            println!(
                "{}",
                format!("  └─ (+{:.2} intimacy)", outcome.boost).green().dimmed()
            );
        }
        println!(
            "{}",
            format!(
                "  └─ intimacy {:.1}/5.0 ({})",
                outcome.profile.intimacy_level, outcome.tier
            )
            .dimmed()
        );
        println!();
    }

    Ok(())
}

// Base reply: external responder when a provider or model was asked for,
// canned tier-aware fallback otherwise.
async fn respond(
    config: &Config,
    outcome: &InteractionOutcome,
    message: &str,
    provider: Option<String>,
    model: Option<String>,
) -> Result<String> {
    if provider.is_none() && model.is_none() {
        return Ok(responder::canned_reply(message, outcome.tier));
    }

    let responder_config = config.responder_config(provider, model)?;
    let client = ResponderClient::new(responder_config);
    let context = prompt::build_context_prompt(
        outcome.tier,
        &outcome.profile.personal_facts,
        outcome.profile.recent_turns(prompt::CONTEXT_TURNS),
    );
    Ok(client
        .generate(&prompt::build_responder_prompt(&context, message))
        .await)
}

pub fn handle_status(user_id: String, data_dir: Option<PathBuf>) -> Result<()> {
    let config = Config::new(data_dir)?;
    let store = JsonProfileStore::open(config.profiles_file())?;
    let engine = IntimacyEngine::new(store);

    let Some(profile) = engine.profile(&user_id)? else {
        println!("{}", format!("No profile for '{}' yet", user_id).yellow());
        return Ok(());
    };

    println!("{}", "Relationship Status".cyan().bold());
    println!("User: {}", user_id.cyan());
    println!(
        "Intimacy: {:.1}/5.0 ({})",
        profile.intimacy_level,
        profile.tier().to_string().yellow()
    );
    println!("Interactions: {}", profile.interaction_count);

    if !profile.personal_facts.is_empty() {
        println!("\n{}", "Known facts:".cyan());
        let mut facts: Vec<_> = profile.personal_facts.iter().collect();
        facts.sort_by_key(|(category, _)| **category);
        for (category, snippet) in facts {
            println!("  {:<10} {}", category.to_string().yellow(), snippet);
        }
    }

    if !profile.conversation_history.is_empty() {
        println!("\n{}", "Recent history:".cyan());
        for turn in profile.recent_turns(5) {
            println!(
                "  {} {} → {}",
                turn.timestamp.format("%m-%d %H:%M").to_string().dimmed(),
                turn.user_text,
                turn.assistant_text
            );
        }
    }

    Ok(())
}

pub fn handle_profiles(data_dir: Option<PathBuf>) -> Result<()> {
    let config = Config::new(data_dir)?;
    let store = JsonProfileStore::open(config.profiles_file())?;

    if store.profiles().is_empty() {
        println!("{}", "No profiles yet".yellow());
        return Ok(());
    }

    println!("{}", "All Profiles".cyan().bold());
    println!();

    let mut entries: Vec<_> = store.profiles().iter().collect();
    entries.sort_by_key(|(user_id, _)| user_id.to_string());

    for (user_id, profile) in entries {
        let user_display = if user_id.len() > 16 {
            format!("{}...", &user_id[..16])
        } else {
            user_id.clone()
        };

        println!(
            "{:<20} {:<10} {:<8} {} interactions",
            user_display.cyan(),
            profile.tier().to_string(),
            format!("{:.1}", profile.intimacy_level),
            profile.interaction_count
        );
    }

    Ok(())
}

pub fn handle_reset(user_id: String, data_dir: Option<PathBuf>) -> Result<()> {
    let config = Config::new(data_dir)?;
    let store = JsonProfileStore::open(config.profiles_file())?;
    let mut engine = IntimacyEngine::new(store);

    engine.reset(&user_id)?;
    println!(
        "{}",
        format!("Profile for '{}' reset to the formal tier", user_id).green()
    );

    Ok(())
}
