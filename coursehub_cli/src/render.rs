use std::fmt::Write;

use coursehub_forum::models::{Comment, Forum, Post};
use coursehub_forum::{CommentTree, LikeDisplay, Notice, NoticeLevel};

const INDENT: &str = "    ";

pub fn likes_label(display: LikeDisplay) -> String {
    let heart = if display.liked { "♥" } else { "♡" };
    format!("{heart} {}", display.count)
}

pub fn render_forums(forums: &[Forum]) -> String {
    if forums.is_empty() {
        return "No forums available.\n".to_string();
    }
    let mut out = String::from("Forums:\n");
    for forum in forums {
        let _ = writeln!(out, "  {} [{}] - {} posts", forum.title, forum.id, forum.post_count);
        if let Some(description) = forum.description.as_deref().filter(|d| !d.is_empty()) {
            let _ = writeln!(out, "      {description}");
        }
    }
    out
}

pub fn render_posts(posts: &[Post]) -> String {
    if posts.is_empty() {
        return "No posts in this forum yet.\n".to_string();
    }
    let mut out = String::from("Posts:\n");
    for post in posts {
        let mut flags = String::new();
        if post.is_pinned {
            flags.push_str(" [pinned]");
        }
        if post.is_locked {
            flags.push_str(" [locked]");
        }
        let _ = writeln!(
            out,
            "  {}{} [{}] by {} - {} likes, {} views",
            post.title,
            flags,
            post.id,
            post.author.display_name(),
            post.likes,
            post.views
        );
    }
    out
}

/// Post header followed by its comments, replies indented under their parent.
pub fn render_thread<F>(
    post: &Post,
    post_likes: LikeDisplay,
    comments: &CommentTree,
    comment_likes: F,
) -> String
where
    F: Fn(&Comment) -> LikeDisplay,
{
    let mut out = String::new();
    let _ = writeln!(out, "{} [{}]", post.title, post.id);
    let _ = writeln!(
        out,
        "by {} on {} | {} | {} views{}{}",
        post.author.display_name(),
        post.created_at.format("%Y-%m-%d %H:%M"),
        likes_label(post_likes),
        post.views,
        if post.is_pinned { " | pinned" } else { "" },
        if post.is_locked { " | locked" } else { "" },
    );
    if !post.content.trim().is_empty() {
        let _ = writeln!(out);
        for line in post.content.lines() {
            let _ = writeln!(out, "{line}");
        }
    }
    let _ = writeln!(out);

    if comments.is_empty() {
        out.push_str("No comments yet.\n");
        return out;
    }
    let _ = writeln!(out, "{} comments:", comments.len());
    for (depth, comment) in comments.walk() {
        let pad = INDENT.repeat(depth + 1);
        let _ = writeln!(
            out,
            "{pad}#{} {}{} | {}",
            comment.id,
            comment.author.display_name(),
            if comment.is_edited { " (edited)" } else { "" },
            likes_label(comment_likes(comment)),
        );
        for line in comment.content.lines() {
            let _ = writeln!(out, "{pad}  {line}");
        }
    }
    out
}

pub fn render_notice(notice: &Notice) -> String {
    match notice.level {
        NoticeLevel::Info => format!("✓ {}", notice.message),
        NoticeLevel::Error => format!("✗ {}", notice.message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use coursehub_forum::models::Author;
    use pretty_assertions::assert_eq;

    fn post() -> Post {
        Post {
            id: "p1".into(),
            forum_id: None,
            title: "Week 3 questions".into(),
            content: "Ask here.".into(),
            author: Author {
                id: "u1".into(),
                name: "Dana".into(),
                avatar_url: None,
            },
            likes: 5,
            is_liked: false,
            views: 12,
            is_pinned: true,
            is_locked: false,
            comment_count: None,
            created_at: Utc.with_ymd_and_hms(2026, 9, 1, 10, 0, 0).unwrap(),
        }
    }

    fn comment(id: &str, parent: Option<&str>, content: &str) -> Comment {
        Comment {
            id: id.into(),
            post_id: "p1".into(),
            parent_id: parent.map(str::to_string),
            author: Author::default(),
            content: content.into(),
            likes: 1,
            is_liked: false,
            is_edited: id == "2",
            created_at: Utc.with_ymd_and_hms(2026, 9, 1, 11, 0, 0).unwrap(),
            replies: Vec::new(),
        }
    }

    #[test]
    fn thread_renders_nested_replies() {
        let tree = CommentTree::build(vec![
            comment("1", None, "Base case?"),
            comment("2", Some("1"), "Stops recursion."),
            comment("3", None, "Open book?"),
        ]);
        let rendered = render_thread(
            &post(),
            LikeDisplay {
                liked: true,
                count: 6,
            },
            &tree,
            |c| LikeDisplay {
                liked: c.is_liked,
                count: c.likes,
            },
        );
        let expected = "\
Week 3 questions [p1]
by Dana on 2026-09-01 10:00 | ♥ 6 | 12 views | pinned

Ask here.

3 comments:
    #1 anonymous | ♡ 1
      Base case?
        #2 anonymous (edited) | ♡ 1
          Stops recursion.
    #3 anonymous | ♡ 1
      Open book?
";
        assert_eq!(rendered, expected);
    }

    #[test]
    fn empty_thread_says_so() {
        let rendered = render_thread(
            &post(),
            LikeDisplay {
                liked: false,
                count: 5,
            },
            &CommentTree::default(),
            |_| unreachable!(),
        );
        assert!(rendered.ends_with("No comments yet.\n"));
    }

    #[test]
    fn posts_list_shows_flags() {
        let rendered = render_posts(&[post()]);
        assert_eq!(
            rendered,
            "Posts:\n  Week 3 questions [pinned] [p1] by Dana - 5 likes, 12 views\n"
        );
    }

    #[test]
    fn notices_are_prefixed_by_level() {
        let notice = Notice {
            level: NoticeLevel::Error,
            message: "Failed to like post p1".into(),
        };
        assert_eq!(render_notice(&notice), "✗ Failed to like post p1");
    }
}
