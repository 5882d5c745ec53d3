use std::collections::HashMap;

use crate::api::{CommentId, CommentRecord};

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CommentNode {
    pub record: CommentRecord,

    /// 0 for a top-level comment
    pub depth: usize,

    /// Answers to this comment, in the order the remote API sent them
    pub children: Vec<CommentNode>,
}

/// Threaded view of a flat list of comments
///
/// Comments whose parent is missing from the list, or that are part of a
/// reply cycle, are shown at top level so that no comment is ever lost.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CommentTree {
    roots: Vec<CommentNode>,
    len: usize,
}

#[derive(Clone, Copy, PartialEq)]
enum Mark {
    Unseen,
    OnPath,
    Done,
}

/// Flags every record whose parent chain loops back onto itself
fn find_cycles(parents: &[Option<usize>]) -> Vec<bool> {
    let mut mark = vec![Mark::Unseen; parents.len()];
    let mut in_cycle = vec![false; parents.len()];
    let mut path = Vec::new();
    for start in 0..parents.len() {
        let mut cur = Some(start);
        while let Some(i) = cur {
            match mark[i] {
                Mark::Unseen => {
                    mark[i] = Mark::OnPath;
                    path.push(i);
                    cur = parents[i];
                }
                Mark::OnPath => {
                    if let Some(pos) = path.iter().rposition(|&p| p == i) {
                        for &c in &path[pos..] {
                            in_cycle[c] = true;
                        }
                    }
                    break;
                }
                Mark::Done => break,
            }
        }
        for i in path.drain(..) {
            mark[i] = Mark::Done;
        }
    }
    in_cycle
}

impl CommentTree {
    pub fn build(records: Vec<CommentRecord>) -> CommentTree {
        let len = records.len();

        // With duplicated ids, answers go to the first comment carrying the id
        let mut index = HashMap::with_capacity(len);
        for (i, r) in records.iter().enumerate() {
            index.entry(r.id).or_insert(i);
        }

        let parents = records
            .iter()
            .map(|r| {
                let parent = r.parent_id?;
                let found = index.get(&parent).copied();
                if found.is_none() {
                    tracing::warn!(
                        comment = ?r.id,
                        ?parent,
                        "comment parent is not in the thread, showing it at top level"
                    );
                }
                found
            })
            .collect::<Vec<Option<usize>>>();

        let in_cycle = find_cycles(&parents);

        let mut roots = Vec::new();
        let mut children = vec![Vec::new(); len];
        for (i, parent) in parents.iter().enumerate() {
            match (in_cycle[i], parent) {
                (true, _) => {
                    tracing::warn!(
                        comment = ?records[i].id,
                        "comment is part of a reply cycle, showing it at top level"
                    );
                    roots.push(i);
                }
                (false, None) => roots.push(i),
                (false, Some(p)) => children[*p].push(i),
            }
        }

        let roots = assemble(&roots, records, &children);
        CommentTree { roots, len }
    }

    pub fn roots(&self) -> &[CommentNode] {
        &self.roots
    }

    pub fn into_roots(self) -> Vec<CommentNode> {
        self.roots
    }

    /// Number of comments in the whole tree
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Walks the comments in display order, each with its depth
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            stack: self.roots.iter().rev().collect(),
        }
    }

    pub fn find(&self, id: CommentId) -> Option<&CommentNode> {
        let mut stack = self.roots.iter().collect::<Vec<_>>();
        while let Some(n) = stack.pop() {
            if n.record.id == id {
                return Some(n);
            }
            stack.extend(n.children.iter());
        }
        None
    }
}

struct Frame {
    index: usize,
    depth: usize,
    next_child: usize,
    done: Vec<CommentNode>,
}

impl Frame {
    fn new(index: usize, depth: usize) -> Frame {
        Frame {
            index,
            depth,
            next_child: 0,
            done: Vec::new(),
        }
    }
}

/// Turns the child index lists into nodes, deepest replies first
///
/// Reply chains can be arbitrarily deep, so this walks with an explicit stack
/// rather than recursing.
fn assemble(
    roots: &[usize],
    records: Vec<CommentRecord>,
    children: &[Vec<usize>],
) -> Vec<CommentNode> {
    let mut records = records.into_iter().map(Some).collect::<Vec<_>>();
    let mut res = Vec::with_capacity(roots.len());
    let mut stack = Vec::new();
    for &root in roots {
        stack.push(Frame::new(root, 0));
        while let Some(top) = stack.last_mut() {
            if let Some(&child) = children[top.index].get(top.next_child) {
                top.next_child += 1;
                let depth = top.depth + 1;
                stack.push(Frame::new(child, depth));
                continue;
            }
            let frame = match stack.pop() {
                Some(frame) => frame,
                None => break,
            };
            // Once cycles are cut each record has at most one parent, so it
            // is only ever taken once
            let record = match records[frame.index].take() {
                Some(record) => record,
                None => continue,
            };
            let node = CommentNode {
                record,
                depth: frame.depth,
                children: frame.done,
            };
            match stack.last_mut() {
                Some(parent) => parent.done.push(node),
                None => res.push(node),
            }
        }
    }
    res
}

impl Drop for CommentNode {
    // The default drop recurses once per level of replies
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

impl<'a> IntoIterator for &'a CommentTree {
    type Item = (usize, &'a CommentRecord);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}

pub struct Iter<'a> {
    stack: Vec<&'a CommentNode>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (usize, &'a CommentRecord);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some((node.depth, &node.record))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn comment(id: i64, parent: Option<i64>) -> CommentRecord {
        CommentRecord {
            id: CommentId(id),
            post: None,
            parent_id: parent.map(CommentId),
            author: format!("user{id}"),
            body: format!("comment {id}"),
            upvotes: 0,
            submitted_at: None,
        }
    }

    fn shape(tree: &CommentTree) -> Vec<(usize, i64)> {
        tree.iter().map(|(d, r)| (d, r.id.0)).collect()
    }

    #[test]
    fn empty_input() {
        let tree = CommentTree::build(Vec::new());
        assert!(tree.is_empty());
        assert!(tree.roots().is_empty());
    }

    #[test]
    fn nested_replies_keep_source_order() {
        let tree = CommentTree::build(vec![
            comment(1, None),
            comment(2, Some(1)),
            comment(3, None),
            comment(4, Some(2)),
            comment(5, Some(1)),
            comment(6, Some(3)),
        ]);
        assert_eq!(
            shape(&tree),
            vec![(0, 1), (1, 2), (2, 4), (1, 5), (0, 3), (1, 6)],
        );
        assert_eq!(tree.roots().len(), 2);
        assert_eq!(tree.len(), 6);
    }

    #[test]
    fn child_listed_before_parent() {
        let tree = CommentTree::build(vec![comment(2, Some(1)), comment(1, None)]);
        assert_eq!(shape(&tree), vec![(0, 1), (1, 2)]);
    }

    #[test]
    fn orphan_becomes_root() {
        let tree = CommentTree::build(vec![comment(1, None), comment(2, Some(99))]);
        assert_eq!(shape(&tree), vec![(0, 1), (0, 2)]);
    }

    #[test]
    fn two_cycle_becomes_two_roots() {
        let tree = CommentTree::build(vec![comment(1, Some(2)), comment(2, Some(1))]);
        assert_eq!(shape(&tree), vec![(0, 1), (0, 2)]);
    }

    #[test]
    fn self_parent_becomes_root() {
        let tree = CommentTree::build(vec![comment(1, Some(1)), comment(2, Some(1))]);
        assert_eq!(shape(&tree), vec![(0, 1), (1, 2)]);
    }

    #[test]
    fn replies_hanging_off_a_cycle_are_kept() {
        let tree = CommentTree::build(vec![
            comment(1, Some(3)),
            comment(2, Some(1)),
            comment(3, Some(2)),
            comment(4, Some(2)),
            comment(5, Some(4)),
        ]);
        assert_eq!(
            shape(&tree),
            vec![(0, 1), (0, 2), (1, 4), (2, 5), (0, 3)],
        );
    }

    #[test]
    fn very_deep_reply_chain() {
        let n = 20_000;
        let records = (0..n)
            .map(|i| comment(i, (i > 0).then(|| i - 1)))
            .collect::<Vec<_>>();
        let tree = CommentTree::build(records);
        assert_eq!(tree.len(), n as usize);
        assert_eq!(tree.roots().len(), 1);
        assert_eq!(tree.iter().count(), n as usize);
        assert_eq!(
            tree.find(CommentId(n - 1)).map(|c| c.depth),
            Some(n as usize - 1)
        );
        let (depth, last) = tree.iter().last().unwrap();
        assert_eq!(last.id, CommentId(n - 1));
        assert_eq!(depth, n as usize - 1);
    }

    #[test]
    fn find_reaches_nested_comments() {
        let tree = CommentTree::build(vec![comment(1, None), comment(2, Some(1))]);
        assert_eq!(tree.find(CommentId(2)).map(|n| n.depth), Some(1));
        assert!(tree.find(CommentId(3)).is_none());
    }

    #[test]
    fn every_comment_appears_exactly_once() {
        bolero::check!()
            .with_type::<Vec<(u8, Option<u8>)>>()
            .for_each(|input| {
                let records = input
                    .iter()
                    .map(|(id, parent)| comment(*id as i64, parent.map(|p| p as i64)))
                    .collect::<Vec<_>>();
                let tree = CommentTree::build(records.clone());

                // Same multiset of ids going in and out
                let mut expected = records.iter().map(|r| r.id).collect::<Vec<_>>();
                let mut seen = tree.iter().map(|(_, r)| r.id).collect::<Vec<_>>();
                expected.sort();
                seen.sort();
                assert_eq!(expected, seen);
                assert_eq!(tree.len(), records.len());

                // Depth is parent depth + 1 all along the tree
                fn check_depths(nodes: &[CommentNode], depth: usize) {
                    for n in nodes {
                        assert_eq!(n.depth, depth);
                        assert!(n
                            .children
                            .iter()
                            .all(|c| c.record.parent_id == Some(n.record.id)));
                        check_depths(&n.children, depth + 1);
                    }
                }
                check_depths(tree.roots(), 0);
            });
    }

    #[test]
    fn depth_counts_ancestors_without_cycles() {
        // Parents always point to an earlier id, so there can be no cycle
        bolero::check!()
            .with_type::<Vec<Option<u8>>>()
            .for_each(|input| {
                let records = input
                    .iter()
                    .enumerate()
                    .map(|(i, p)| {
                        let parent = p.filter(|_| i > 0).map(|p| (p as usize % i) as i64);
                        comment(i as i64, parent)
                    })
                    .collect::<Vec<_>>();
                let tree = CommentTree::build(records.clone());
                let ids = records.iter().map(|r| r.id).collect::<HashSet<_>>();
                for (depth, r) in tree.iter() {
                    let mut hops = 0;
                    let mut cur = r.parent_id;
                    while let Some(p) = cur.filter(|p| ids.contains(p)) {
                        hops += 1;
                        cur = records[p.0 as usize].parent_id;
                    }
                    assert_eq!(depth, hops);
                }
            });
    }
}
