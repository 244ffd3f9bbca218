//! Parent/child view over a post's comments.
//!
//! The backend sends comments either flat (each carrying `parentId`) or
//! partially nested under `replies`. [`CommentTree::build`] normalizes both
//! shapes into one flat list and indexes it by parent.

use std::collections::{HashMap, HashSet};

use crate::models::Comment;

#[derive(Debug, Clone, Default)]
pub struct CommentTree {
    comments: Vec<Comment>,
    index: HashMap<String, usize>,
    children: HashMap<String, Vec<usize>>,
    roots: Vec<usize>,
    orphans: Vec<usize>,
}

impl CommentTree {
    pub fn build(input: Vec<Comment>) -> Self {
        let comments = flatten(input);
        let index: HashMap<String, usize> = comments
            .iter()
            .enumerate()
            .map(|(pos, comment)| (comment.id.clone(), pos))
            .collect();

        let mut children: HashMap<String, Vec<usize>> = HashMap::new();
        let mut roots = Vec::new();
        let mut orphans = Vec::new();
        for (pos, comment) in comments.iter().enumerate() {
            match comment.parent_id.as_deref() {
                Some(parent) if parent != comment.id && index.contains_key(parent) => {
                    children.entry(parent.to_string()).or_default().push(pos);
                }
                Some(_) => {
                    orphans.push(pos);
                    roots.push(pos);
                }
                None => roots.push(pos),
            }
        }

        Self {
            comments,
            index,
            children,
            roots,
            orphans,
        }
    }

    pub fn len(&self) -> usize {
        self.comments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.comments.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Comment> {
        self.index.get(id).map(|&pos| &self.comments[pos])
    }

    /// All comments, flattened, in input order.
    pub fn iter(&self) -> impl Iterator<Item = &Comment> + '_ {
        self.comments.iter()
    }

    /// Comments without a parent, plus those whose parent is unknown.
    pub fn roots(&self) -> impl Iterator<Item = &Comment> + '_ {
        self.roots.iter().map(move |&pos| &self.comments[pos])
    }

    pub fn children(&self, id: &str) -> impl Iterator<Item = &Comment> + '_ {
        self.children
            .get(id)
            .map(Vec::as_slice)
            .unwrap_or_default()
            .iter()
            .map(move |&pos| &self.comments[pos])
    }

    /// Comments that named a parent which is not part of this tree.
    pub fn orphans(&self) -> impl Iterator<Item = &Comment> + '_ {
        self.orphans.iter().map(move |&pos| &self.comments[pos])
    }

    /// Depth-first render order as `(depth, comment)` pairs.
    ///
    /// Comments caught in a parent cycle are unreachable from any root; they
    /// are emitted afterwards at depth 0 with the cycle cut.
    pub fn walk(&self) -> Vec<(usize, &Comment)> {
        let mut out = Vec::with_capacity(self.comments.len());
        let mut visited = HashSet::with_capacity(self.comments.len());
        for &root in &self.roots {
            self.walk_from(root, &mut visited, &mut out);
        }
        for pos in 0..self.comments.len() {
            if !visited.contains(&pos) {
                self.walk_from(pos, &mut visited, &mut out);
            }
        }
        out
    }

    fn walk_from<'a>(
        &'a self,
        start: usize,
        visited: &mut HashSet<usize>,
        out: &mut Vec<(usize, &'a Comment)>,
    ) {
        let mut stack = vec![(start, 0usize)];
        while let Some((pos, depth)) = stack.pop() {
            if !visited.insert(pos) {
                continue;
            }
            let comment = &self.comments[pos];
            out.push((depth, comment));
            if let Some(kids) = self.children.get(&comment.id) {
                for &child in kids.iter().rev() {
                    stack.push((child, depth + 1));
                }
            }
        }
    }
}

/// Pulls embedded replies up into the flat list, filling in a missing
/// parent id from the enclosing comment. First occurrence of an id wins.
fn flatten(input: Vec<Comment>) -> Vec<Comment> {
    let mut out = Vec::with_capacity(input.len());
    let mut seen = HashSet::new();
    let mut stack: Vec<Comment> = input.into_iter().rev().collect();
    while let Some(mut comment) = stack.pop() {
        let replies = std::mem::take(&mut comment.replies);
        for mut reply in replies.into_iter().rev() {
            if reply.parent_id.is_none() {
                reply.parent_id = Some(comment.id.clone());
            }
            stack.push(reply);
        }
        if seen.insert(comment.id.clone()) {
            out.push(comment);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    fn comment(id: &str, parent: Option<&str>) -> Comment {
        Comment {
            id: id.to_string(),
            post_id: "post-1".to_string(),
            parent_id: parent.map(str::to_string),
            author: Default::default(),
            content: format!("comment {id}"),
            likes: 0,
            is_liked: false,
            is_edited: false,
            created_at: Utc::now(),
            replies: Vec::new(),
        }
    }

    fn ids<'a>(comments: impl Iterator<Item = &'a Comment>) -> Vec<&'a str> {
        comments.map(|c| c.id.as_str()).collect()
    }

    #[test]
    fn roots_and_children_from_flat_list() {
        let tree = CommentTree::build(vec![
            comment("1", None),
            comment("2", Some("1")),
            comment("3", None),
        ]);
        assert_eq!(ids(tree.roots()), vec!["1", "3"]);
        assert_eq!(ids(tree.children("1")), vec!["2"]);
        assert_eq!(ids(tree.children("3")), Vec::<&str>::new());
    }

    #[test]
    fn embedded_replies_are_flattened_with_parent() {
        let mut parent = comment("1", None);
        let mut reply = comment("2", None);
        reply.replies.push(comment("3", None));
        parent.replies.push(reply);

        let tree = CommentTree::build(vec![parent, comment("4", None)]);
        assert_eq!(tree.len(), 4);
        assert_eq!(ids(tree.iter()), vec!["1", "2", "3", "4"]);
        assert_eq!(ids(tree.roots()), vec!["1", "4"]);
        assert_eq!(ids(tree.children("1")), vec!["2"]);
        assert_eq!(ids(tree.children("2")), vec!["3"]);
        assert!(tree.get("2").expect("reply").replies.is_empty());
    }

    #[test]
    fn explicit_parent_on_embedded_reply_is_kept() {
        let mut parent = comment("1", None);
        parent.replies.push(comment("2", Some("9")));
        let tree = CommentTree::build(vec![parent, comment("9", None)]);
        assert_eq!(ids(tree.children("9")), vec!["2"]);
        assert_eq!(ids(tree.children("1")), Vec::<&str>::new());
    }

    #[test]
    fn duplicate_ids_keep_first_occurrence() {
        let mut parent = comment("1", None);
        parent.replies.push(comment("2", None));
        let tree = CommentTree::build(vec![parent, comment("2", Some("1"))]);
        assert_eq!(tree.len(), 2);
        assert_eq!(ids(tree.children("1")), vec!["2"]);
    }

    #[test]
    fn unknown_parent_falls_back_to_root() {
        let tree = CommentTree::build(vec![comment("1", None), comment("2", Some("missing"))]);
        assert_eq!(ids(tree.roots()), vec!["1", "2"]);
        assert_eq!(ids(tree.orphans()), vec!["2"]);
    }

    #[test]
    fn every_non_root_has_exactly_one_parent() {
        let tree = CommentTree::build(vec![
            comment("a", None),
            comment("b", Some("a")),
            comment("c", Some("a")),
            comment("d", Some("b")),
            comment("e", Some("ghost")),
            comment("f", Some("d")),
        ]);
        let root_ids: HashSet<&str> = ids(tree.roots()).into_iter().collect();
        for candidate in tree.iter() {
            let parents = tree
                .iter()
                .filter(|p| tree.children(&p.id).any(|c| c.id == candidate.id))
                .count();
            if root_ids.contains(candidate.id.as_str()) {
                assert_eq!(parents, 0, "root {} listed as a child", candidate.id);
            } else {
                assert_eq!(parents, 1, "comment {} has {} parents", candidate.id, parents);
            }
        }
    }

    #[test]
    fn walk_is_depth_first_in_input_order() {
        let tree = CommentTree::build(vec![
            comment("1", None),
            comment("2", Some("1")),
            comment("3", None),
            comment("4", Some("2")),
            comment("5", Some("1")),
        ]);
        let order: Vec<(usize, &str)> = tree
            .walk()
            .into_iter()
            .map(|(depth, c)| (depth, c.id.as_str()))
            .collect();
        assert_eq!(
            order,
            vec![(0, "1"), (1, "2"), (2, "4"), (1, "5"), (0, "3")]
        );
    }

    #[test]
    fn walk_cuts_parent_cycles() {
        let tree = CommentTree::build(vec![
            comment("root", None),
            comment("x", Some("y")),
            comment("y", Some("x")),
            comment("self", Some("self")),
        ]);
        let walked = tree.walk();
        assert_eq!(walked.len(), 4);
        assert_eq!(ids(tree.roots()), vec!["root", "self"]);
    }
}
