//! State behind one open forum thread: the post, its comment tree, and
//! pending like toggles.
//!
//! Network calls run on spawned tasks and report back as [`ThreadMessage`]s.
//! The owner feeds those into [`ThreadView::handle_message`] (or lets
//! [`ThreadView::settle`] do it), so every state change happens on the
//! owner's side.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

use crate::api::ForumApi;
use crate::comments::CommentTree;
use crate::error::{ForumError, ForumResult};
use crate::likes::{LikeAction, LikeDisplay, LikeOverrides, LikeTarget};
use crate::models::{Comment, CreateCommentInput, Post};

#[derive(Debug)]
pub enum ThreadMessage {
    /// `seq` orders refetches of the same resource; older ones are dropped.
    PostLoaded {
        seq: u64,
        result: ForumResult<Post>,
    },
    CommentsLoaded {
        seq: u64,
        result: ForumResult<Vec<Comment>>,
    },
    LikeSettled {
        target: LikeTarget,
        action: LikeAction,
        result: ForumResult<()>,
    },
    CommentCreated(ForumResult<Comment>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// User-facing notification, the CLI's equivalent of a toast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Issued and installed sequence numbers for one refetched resource.
#[derive(Debug, Default)]
struct Generation {
    issued: u64,
    installed: u64,
}

impl Generation {
    fn issue(&mut self) -> u64 {
        self.issued += 1;
        self.issued
    }

    fn install(&mut self, seq: u64) {
        self.installed = self.installed.max(seq);
    }

    /// A result is stale once something issued after it has been installed.
    fn is_current(&self, seq: u64) -> bool {
        seq > self.installed
    }
}

pub struct ThreadView<A> {
    api: Arc<A>,
    post_id: String,
    post: Option<Post>,
    comments: CommentTree,
    overrides: LikeOverrides,
    notices: Vec<Notice>,
    in_flight: usize,
    post_seq: Generation,
    comments_seq: Generation,
    tx: UnboundedSender<ThreadMessage>,
    rx: UnboundedReceiver<ThreadMessage>,
}

impl<A: ForumApi + 'static> ThreadView<A> {
    pub fn new(api: A, post_id: impl Into<String>) -> Self {
        Self::with_shared(Arc::new(api), post_id)
    }

    pub fn with_shared(api: Arc<A>, post_id: impl Into<String>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            api,
            post_id: post_id.into(),
            post: None,
            comments: CommentTree::default(),
            overrides: LikeOverrides::new(),
            notices: Vec::new(),
            in_flight: 0,
            post_seq: Generation::default(),
            comments_seq: Generation::default(),
            tx,
            rx,
        }
    }

    pub fn post_id(&self) -> &str {
        &self.post_id
    }

    pub fn post(&self) -> Option<&Post> {
        self.post.as_ref()
    }

    pub fn comments(&self) -> &CommentTree {
        &self.comments
    }

    pub fn overrides(&self) -> &LikeOverrides {
        &self.overrides
    }

    /// Number of spawned requests whose result has not been handled yet.
    pub fn pending(&self) -> usize {
        self.in_flight
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Fetches post and comments together and installs both.
    pub async fn load(&mut self) -> ForumResult<()> {
        let (post, comments) = tokio::try_join!(
            self.api.get_post(&self.post_id),
            self.api.list_comments(&self.post_id)
        )?;
        info!(post_id = %self.post_id, comments = comments.len(), "thread loaded");
        let post_seq = self.post_seq.issue();
        self.post_seq.install(post_seq);
        let comments_seq = self.comments_seq.issue();
        self.comments_seq.install(comments_seq);
        self.post = Some(post);
        self.install_comments(comments);
        Ok(())
    }

    /// Invalidates the cached post and comments; fresh copies arrive as messages.
    pub fn refresh(&mut self) {
        self.spawn_load_post();
        self.spawn_load_comments();
    }

    pub fn displayed_post_likes(&self) -> Option<LikeDisplay> {
        let post = self.post.as_ref()?;
        let target = LikeTarget::Post(post.id.clone());
        Some(self.overrides.display(&target, post.is_liked, post.likes))
    }

    pub fn displayed_comment_likes(&self, comment_id: &str) -> Option<LikeDisplay> {
        let comment = self.comments.get(comment_id)?;
        let target = LikeTarget::Comment(comment.id.clone());
        Some(self.overrides.display(&target, comment.is_liked, comment.likes))
    }

    /// Toggles the viewer's like on the post. Returns the optimistic display,
    /// or `None` when the post has not been loaded.
    pub fn toggle_post_like(&mut self) -> Option<LikeDisplay> {
        let liked = self.displayed_post_likes()?.liked;
        let target = LikeTarget::Post(self.post.as_ref()?.id.clone());
        self.toggle_like(target, liked);
        self.displayed_post_likes()
    }

    pub fn toggle_comment_like(&mut self, comment_id: &str) -> Option<LikeDisplay> {
        let liked = self.displayed_comment_likes(comment_id)?.liked;
        self.toggle_like(LikeTarget::Comment(comment_id.to_string()), liked);
        self.displayed_comment_likes(comment_id)
    }

    /// Records `!currently_liked` as the pending state and sends the matching
    /// like or unlike request.
    pub fn toggle_like(&mut self, target: LikeTarget, currently_liked: bool) {
        let action = self.overrides.begin(target.clone(), currently_liked);
        debug!(%target, ?action, "optimistic like toggle");
        self.spawn(move |api| async move {
            let result = match (&target, action) {
                (LikeTarget::Post(id), LikeAction::Like) => api.like_post(id).await,
                (LikeTarget::Post(id), LikeAction::Unlike) => api.unlike_post(id).await,
                (LikeTarget::Comment(id), LikeAction::Like) => api.like_comment(id).await,
                (LikeTarget::Comment(id), LikeAction::Unlike) => api.unlike_comment(id).await,
            };
            ThreadMessage::LikeSettled {
                target,
                action,
                result,
            }
        });
    }

    pub fn submit_comment(&mut self, content: &str, parent_id: Option<String>) -> ForumResult<()> {
        let content = content.trim();
        if content.is_empty() {
            self.notices.push(Notice::error(ForumError::EmptyComment.summary()));
            return Err(ForumError::EmptyComment);
        }
        if self.post.as_ref().is_some_and(|post| post.is_locked) {
            let err = ForumError::Locked(self.post_id.clone());
            self.notices.push(Notice::error(err.summary()));
            return Err(err);
        }
        let input = CreateCommentInput {
            content: content.to_string(),
            parent_id,
        };
        let post_id = self.post_id.clone();
        self.spawn(move |api| async move {
            ThreadMessage::CommentCreated(api.create_comment(&post_id, &input).await)
        });
        Ok(())
    }

    pub fn handle_message(&mut self, message: ThreadMessage) {
        self.in_flight = self.in_flight.saturating_sub(1);
        match message {
            ThreadMessage::PostLoaded { seq, .. } if !self.post_seq.is_current(seq) => {
                debug!(post_id = %self.post_id, seq, "dropping superseded post refetch");
            }
            ThreadMessage::PostLoaded { seq, result } => match result {
                Ok(post) => {
                    self.post_seq.install(seq);
                    self.post = Some(post);
                }
                Err(err) => {
                    warn!(post_id = %self.post_id, error = %err, "failed to reload post");
                    self.notices.push(Notice::error(err.summary()));
                }
            },
            ThreadMessage::CommentsLoaded { seq, .. } if !self.comments_seq.is_current(seq) => {
                debug!(post_id = %self.post_id, seq, "dropping superseded comments refetch");
            }
            ThreadMessage::CommentsLoaded { seq, result } => match result {
                Ok(comments) => {
                    self.comments_seq.install(seq);
                    self.install_comments(comments);
                }
                Err(err) => {
                    warn!(post_id = %self.post_id, error = %err, "failed to reload comments");
                    self.notices.push(Notice::error(err.summary()));
                }
            },
            ThreadMessage::LikeSettled {
                target,
                action,
                result,
            } => {
                self.overrides.settle(&target);
                match result {
                    Ok(()) => {
                        debug!(%target, ?action, "like mutation confirmed");
                        match target {
                            LikeTarget::Post(_) => self.spawn_load_post(),
                            LikeTarget::Comment(_) => self.spawn_load_comments(),
                        }
                    }
                    Err(err) => {
                        warn!(%target, ?action, error = %err, "like mutation failed, reverting");
                        let verb = match action {
                            LikeAction::Like => "like",
                            LikeAction::Unlike => "unlike",
                        };
                        self.notices
                            .push(Notice::error(format!("Failed to {verb} {target}")));
                    }
                }
            }
            ThreadMessage::CommentCreated(Ok(comment)) => {
                info!(post_id = %self.post_id, comment_id = %comment.id, "comment posted");
                self.notices.push(Notice::info("Comment posted"));
                self.refresh();
            }
            ThreadMessage::CommentCreated(Err(err)) => {
                warn!(post_id = %self.post_id, error = %err, "failed to post comment");
                self.notices.push(Notice::error(err.summary()));
            }
        }
    }

    /// Waits for the next result of a spawned request, if any is outstanding.
    pub async fn next_message(&mut self) -> Option<ThreadMessage> {
        if self.in_flight == 0 {
            return None;
        }
        self.rx.recv().await
    }

    /// Applies results that have already arrived without waiting.
    pub fn drain_messages(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(message) = self.rx.try_recv() {
            self.handle_message(message);
            handled += 1;
        }
        handled
    }

    /// Handles messages until nothing is in flight, including the refetches
    /// that confirmed mutations trigger.
    pub async fn settle(&mut self) {
        while let Some(message) = self.next_message().await {
            self.handle_message(message);
        }
    }

    fn install_comments(&mut self, comments: Vec<Comment>) {
        self.comments = CommentTree::build(comments);
        for orphan in self.comments.orphans() {
            warn!(
                comment_id = %orphan.id,
                parent_id = orphan.parent_id.as_deref().unwrap_or_default(),
                "comment parent not found, showing it at top level"
            );
        }
    }

    fn spawn_load_post(&mut self) {
        let post_id = self.post_id.clone();
        let seq = self.post_seq.issue();
        self.spawn(move |api| async move {
            ThreadMessage::PostLoaded {
                seq,
                result: api.get_post(&post_id).await,
            }
        });
    }

    fn spawn_load_comments(&mut self) {
        let post_id = self.post_id.clone();
        let seq = self.comments_seq.issue();
        self.spawn(move |api| async move {
            ThreadMessage::CommentsLoaded {
                seq,
                result: api.list_comments(&post_id).await,
            }
        });
    }

    fn spawn<F, Fut>(&mut self, job: F)
    where
        F: FnOnce(Arc<A>) -> Fut,
        Fut: Future<Output = ThreadMessage> + Send + 'static,
    {
        self.in_flight += 1;
        let tx = self.tx.clone();
        let fut = job(Arc::clone(&self.api));
        tokio::spawn(async move {
            let message = fut.await;
            if tx.send(message).is_err() {
                debug!("thread view closed before response arrived");
            }
        });
    }
}
