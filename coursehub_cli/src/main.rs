mod cli;
mod render;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use coursehub_forum::telemetry;
use coursehub_forum::{ApiClient, ClientConfig};

#[derive(Parser)]
#[command(author, version, about = "CourseHub discussion forum client")]
struct Args {
    /// Base URL of the platform API (overrides config and COURSEHUB_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Bearer token (overrides config and COURSEHUB_API_TOKEN)
    #[arg(long, global = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// List forums
    Forums,
    /// List the posts of one forum
    Posts { forum_id: String },
    /// Show a post with its comment thread
    Thread { post_id: String },
    /// Toggle your like on a post
    Like { post_id: String },
    /// Toggle your like on a comment
    LikeComment { post_id: String, comment_id: String },
    /// Comment on a post, or reply to one of its comments
    Reply {
        post_id: String,
        text: String,
        #[arg(long)]
        parent: Option<String>,
    },
    /// Start the interactive shell
    Shell,
}

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init_tracing();

    let args = Args::parse();

    let mut config = ClientConfig::load()?;
    if let Some(api_url) = args.api_url {
        config.api_url = api_url;
    }
    if let Some(token) = args.token {
        config.token = Some(token);
    }
    tracing::debug!(api_url = %config.api_url, "configuration resolved");

    let client = ApiClient::from_config(&config).context("failed to build API client")?;

    match args.command.unwrap_or(Command::Shell) {
        Command::Forums => cli::list_forums(&client).await,
        Command::Posts { forum_id } => cli::list_posts(&client, &forum_id).await,
        Command::Thread { post_id } => cli::show_thread(client, &post_id).await,
        Command::Like { post_id } => cli::like_post(client, &post_id).await,
        Command::LikeComment {
            post_id,
            comment_id,
        } => cli::like_comment(client, &post_id, &comment_id).await,
        Command::Reply {
            post_id,
            text,
            parent,
        } => cli::reply(client, &post_id, &text, parent).await,
        Command::Shell => cli::run_shell(client).await,
    }
}
