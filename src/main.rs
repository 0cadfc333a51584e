// main.rs
mod cli;
mod config;
mod engine;
mod markers;
mod profile;
mod prompt;
mod responder;
mod scoring;
mod store;
mod tone;

use clap::Parser;
use cli::{Args, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    match args.command {
        Commands::Chat {
            user_id,
            message,
            data_dir,
            model,
            provider,
        } => cli::handle_chat(user_id, message, data_dir, model, provider).await,
        Commands::Conversation {
            user_id,
            data_dir,
            model,
            provider,
        } => cli::handle_conversation(user_id, data_dir, model, provider).await,
        Commands::Status { user_id, data_dir } => cli::handle_status(user_id, data_dir),
        Commands::Profiles { data_dir } => cli::handle_profiles(data_dir),
        Commands::Reset { user_id, data_dir } => cli::handle_reset(user_id, data_dir),
    }
}
