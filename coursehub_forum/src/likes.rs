//! Pending like/unlike state held while a mutation is in flight.

use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LikeTarget {
    Post(String),
    Comment(String),
}

impl fmt::Display for LikeTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LikeTarget::Post(id) => write!(f, "post {id}"),
            LikeTarget::Comment(id) => write!(f, "comment {id}"),
        }
    }
}

/// What the viewer should see for one likeable entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeDisplay {
    pub liked: bool,
    pub count: u64,
}

/// Which request a toggle has to send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeAction {
    Like,
    Unlike,
}

#[derive(Debug, Default)]
pub struct LikeOverrides {
    pending: HashMap<LikeTarget, bool>,
}

impl LikeOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the negation of `currently_liked` and returns the request to
    /// send. A toggle on a target that is already pending replaces its
    /// desired state.
    pub fn begin(&mut self, target: LikeTarget, currently_liked: bool) -> LikeAction {
        self.pending.insert(target, !currently_liked);
        if currently_liked {
            LikeAction::Unlike
        } else {
            LikeAction::Like
        }
    }

    /// Drops the override; the server copy is authoritative again.
    pub fn settle(&mut self, target: &LikeTarget) -> Option<bool> {
        self.pending.remove(target)
    }

    pub fn get(&self, target: &LikeTarget) -> Option<bool> {
        self.pending.get(target).copied()
    }

    pub fn is_pending(&self, target: &LikeTarget) -> bool {
        self.pending.contains_key(target)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn display(&self, target: &LikeTarget, server_liked: bool, server_count: u64) -> LikeDisplay {
        display_with(self.get(target), server_liked, server_count)
    }
}

/// Server count adjusted by at most one toward the pending state.
pub fn display_with(pending: Option<bool>, server_liked: bool, server_count: u64) -> LikeDisplay {
    match pending {
        Some(true) if !server_liked => LikeDisplay {
            liked: true,
            count: server_count + 1,
        },
        Some(false) if server_liked => LikeDisplay {
            liked: false,
            count: server_count.saturating_sub(1),
        },
        _ => LikeDisplay {
            liked: server_liked,
            count: server_count,
        },
    }
}
