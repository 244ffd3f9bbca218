use std::io::{self, Write};

use anyhow::{Context, Result};
use coursehub_forum::{ApiClient, ThreadView};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::render;

/// Prints the forums visible to the current user.
pub async fn list_forums(client: &ApiClient) -> Result<()> {
    let forums = client.list_forums().await.context("failed to load forums")?;
    print!("{}", render::render_forums(&forums));
    Ok(())
}

pub async fn list_posts(client: &ApiClient, forum_id: &str) -> Result<()> {
    let posts = client
        .list_forum_posts(forum_id)
        .await
        .with_context(|| format!("failed to load posts for forum {forum_id}"))?;
    print!("{}", render::render_posts(&posts));
    Ok(())
}

pub async fn show_thread(client: ApiClient, post_id: &str) -> Result<()> {
    let view = open_thread(client, post_id).await?;
    print_thread(&view);
    Ok(())
}

pub async fn like_post(client: ApiClient, post_id: &str) -> Result<()> {
    let mut view = open_thread(client, post_id).await?;
    if let Some(display) = view.toggle_post_like() {
        println!("{}", render::likes_label(display));
    }
    view.settle().await;
    print_notices(&mut view);
    if let Some(display) = view.displayed_post_likes() {
        println!("Now: {}", render::likes_label(display));
    }
    Ok(())
}

pub async fn like_comment(client: ApiClient, post_id: &str, comment_id: &str) -> Result<()> {
    let mut view = open_thread(client, post_id).await?;
    let Some(display) = view.toggle_comment_like(comment_id) else {
        anyhow::bail!("comment {comment_id} not found in post {post_id}");
    };
    println!("{}", render::likes_label(display));
    view.settle().await;
    print_notices(&mut view);
    if let Some(display) = view.displayed_comment_likes(comment_id) {
        println!("Now: {}", render::likes_label(display));
    }
    Ok(())
}

pub async fn reply(
    client: ApiClient,
    post_id: &str,
    text: &str,
    parent_id: Option<String>,
) -> Result<()> {
    let mut view = open_thread(client, post_id).await?;
    let submitted = view.submit_comment(text, parent_id);
    view.settle().await;
    print_notices(&mut view);
    submitted?;
    Ok(())
}

async fn open_thread(client: ApiClient, post_id: &str) -> Result<ThreadView<ApiClient>> {
    let mut view = ThreadView::new(client, post_id);
    view.load()
        .await
        .with_context(|| format!("failed to load post {post_id}"))?;
    Ok(view)
}

fn print_thread(view: &ThreadView<ApiClient>) {
    let (Some(post), Some(likes)) = (view.post(), view.displayed_post_likes()) else {
        println!("Post {} is not loaded.", view.post_id());
        return;
    };
    let rendered = render::render_thread(post, likes, view.comments(), |comment| {
        view.displayed_comment_likes(&comment.id)
            .unwrap_or(coursehub_forum::LikeDisplay {
                liked: comment.is_liked,
                count: comment.likes,
            })
    });
    print!("{rendered}");
}

fn print_notices(view: &mut ThreadView<ApiClient>) {
    for notice in view.take_notices() {
        println!("{}", render::render_notice(&notice));
    }
}

/// Interactive loop for browsing forums and working inside one thread.
pub async fn run_shell(client: ApiClient) -> Result<()> {
    let mut session = ShellSession { client, view: None };

    println!("CourseHub forum shell. Type 'help' for a list of commands.");

    let stdin = tokio::io::stdin();
    let mut reader = BufReader::new(stdin);

    loop {
        print!("{}> ", session.prompt());
        io::stdout().flush()?;

        let mut line = String::new();
        let read = reader.read_line(&mut line).await?;
        if read == 0 {
            println!("Exiting");
            break;
        }
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let tokens = match shell_words::split(trimmed) {
            Ok(tokens) if !tokens.is_empty() => tokens,
            Ok(_) => continue,
            Err(err) => {
                println!("Unable to parse command: {err}");
                continue;
            }
        };

        match session.handle_command(&tokens).await {
            Ok(LoopAction::Continue) => {}
            Ok(LoopAction::Exit) => break,
            Err(err) => {
                println!("Error: {err:#}");
            }
        }
    }

    Ok(())
}

struct ShellSession {
    client: ApiClient,
    view: Option<ThreadView<ApiClient>>,
}

enum LoopAction {
    Continue,
    Exit,
}

impl ShellSession {
    fn prompt(&self) -> String {
        match &self.view {
            Some(view) => format!("coursehub:{}", view.post_id()),
            None => "coursehub".to_string(),
        }
    }

    async fn handle_command(&mut self, tokens: &[String]) -> Result<LoopAction> {
        let command = tokens[0].as_str();
        match command {
            "help" => {
                print_help();
            }
            "forums" => {
                list_forums(&self.client).await?;
            }
            "posts" => {
                let Some(forum_id) = tokens.get(1) else {
                    println!("Usage: posts <forum_id>");
                    return Ok(LoopAction::Continue);
                };
                list_posts(&self.client, forum_id).await?;
            }
            "open" => {
                let Some(post_id) = tokens.get(1) else {
                    println!("Usage: open <post_id>");
                    return Ok(LoopAction::Continue);
                };
                let view = open_thread(self.client.clone(), post_id).await?;
                print_thread(&view);
                self.view = Some(view);
            }
            "show" => {
                let view = self.current_view()?;
                view.drain_messages();
                print_notices(view);
                print_thread(view);
            }
            "like" => {
                let view = self.current_view()?;
                if let Some(display) = view.toggle_post_like() {
                    println!("{}", render::likes_label(display));
                }
                view.settle().await;
                print_notices(view);
            }
            "like-comment" => {
                let Some(comment_id) = tokens.get(1).cloned() else {
                    println!("Usage: like-comment <comment_id>");
                    return Ok(LoopAction::Continue);
                };
                let view = self.current_view()?;
                match view.toggle_comment_like(&comment_id) {
                    Some(display) => println!("#{comment_id} {}", render::likes_label(display)),
                    None => println!("No comment #{comment_id} in this thread."),
                }
                view.settle().await;
                print_notices(view);
            }
            "reply" => {
                let Some((parent, body)) = parse_reply_args(&tokens[1..]) else {
                    println!("Usage: reply [--to <comment_id>] MESSAGE");
                    return Ok(LoopAction::Continue);
                };
                let view = self.current_view()?;
                let submitted = view.submit_comment(&body, parent);
                view.settle().await;
                print_notices(view);
                submitted?;
            }
            "refresh" => {
                let view = self.current_view()?;
                view.refresh();
                view.settle().await;
                print_notices(view);
                print_thread(view);
            }
            "close" => {
                self.view = None;
            }
            "quit" | "exit" => return Ok(LoopAction::Exit),
            other => {
                println!("Unknown command '{other}'. Type 'help' for a list of commands.");
            }
        }
        Ok(LoopAction::Continue)
    }

    fn current_view(&mut self) -> Result<&mut ThreadView<ApiClient>> {
        self.view
            .as_mut()
            .context("no thread open, use 'open <post_id>' first")
    }
}

/// Splits `[--to ID] MESSAGE...` into the parent id and the message text.
fn parse_reply_args(args: &[String]) -> Option<(Option<String>, String)> {
    let (parent, rest) = match args {
        [flag, parent, rest @ ..] if flag == "--to" => (Some(parent.clone()), rest),
        [flag, ..] if flag == "--to" => return None,
        rest => (None, rest),
    };
    if rest.is_empty() {
        return None;
    }
    Some((parent, rest.join(" ")))
}

fn print_help() {
    println!("Available commands:");
    println!("  help                       Show this help message");
    println!("  forums                     List forums");
    println!("  posts <forum_id>           List posts in a forum");
    println!("  open <post_id>             Open a thread and show it");
    println!("  show                       Redraw the open thread");
    println!("  like                       Toggle your like on the open post");
    println!("  like-comment <comment_id>  Toggle your like on a comment");
    println!("  reply [--to ID] MESSAGE    Comment on the post, or reply to a comment");
    println!("  refresh                    Reload the open thread from the server");
    println!("  close                      Close the open thread");
    println!("  exit                       Quit the shell");
}
