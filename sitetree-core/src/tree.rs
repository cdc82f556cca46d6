// Virtual directory tree built from path strings

use serde::Serialize;
use std::collections::HashMap;

pub const ROOT_NAME: &str = "/";

type NodeId = usize;

#[derive(Debug, Clone)]
struct TreeNode {
    name: String,
    parent: Option<NodeId>,
    /// Insertion order
    children: Vec<NodeId>,
    by_name: HashMap<String, NodeId>,
}

impl TreeNode {
    fn new(name: &str, parent: Option<NodeId>) -> Self {
        Self {
            name: name.to_string(),
            parent,
            children: Vec::new(),
            by_name: HashMap::new(),
        }
    }
}

/// A rooted tree of path segments. Node 0 is the root, named `/`.
///
/// Nodes live in an arena and refer to each other by index: children are owned by the arena,
/// `parent` is only a back reference. Nodes are never removed.
#[derive(Debug, Clone)]
pub struct VirtualTree {
    nodes: Vec<TreeNode>,
}

/// Nested, serializable view of a tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeView<'a> {
    pub name: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeView<'a>>,
}

/// Splits a path into its non-empty `/`-separated segments.
pub fn path_segments(path: &str) -> impl Iterator<Item = &str> {
    path.trim_matches('/').split('/').filter(|s| !s.is_empty())
}

impl VirtualTree {
    pub fn new() -> Self {
        Self {
            nodes: vec![TreeNode::new(ROOT_NAME, None)],
        }
    }

    pub fn from_paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut tree = Self::new();
        tree.extend(paths);
        tree
    }

    /// Adds `path`, creating only the segments not already present under their parent.
    pub fn add_path(&mut self, path: &str) {
        let mut current = 0;
        for segment in path_segments(path) {
            current = match self.nodes[current].by_name.get(segment) {
                Some(&existing) => existing,
                None => self.insert_child(current, segment),
            };
        }
    }

    fn insert_child(&mut self, parent: NodeId, name: &str) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(TreeNode::new(name, Some(parent)));
        let parent_node = &mut self.nodes[parent];
        parent_node.children.push(id);
        parent_node.by_name.insert(name.to_string(), id);
        id
    }

    fn find(&self, path: &str) -> Option<NodeId> {
        path_segments(path).try_fold(0, |current, segment| {
            self.nodes[current].by_name.get(segment).copied()
        })
    }

    /// Node count, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when only the root exists.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    pub fn contains_path(&self, path: &str) -> bool {
        self.find(path).is_some()
    }

    /// Child names of the node at `path`, in insertion order.
    pub fn children_of(&self, path: &str) -> Option<Vec<&str>> {
        let id = self.find(path)?;
        Some(
            self.nodes[id]
                .children
                .iter()
                .map(|&child| self.nodes[child].name.as_str())
                .collect(),
        )
    }

    /// Full path of every leaf, rebuilt by walking parent links up to the root.
    pub fn leaf_paths(&self) -> Vec<String> {
        self.nodes
            .iter()
            .enumerate()
            .skip(1)
            .filter(|(_, node)| node.children.is_empty())
            .map(|(id, _)| self.path_of(id))
            .collect()
    }

    fn path_of(&self, id: NodeId) -> String {
        let mut segments = Vec::new();
        let mut current = Some(id);
        while let Some(node_id) = current {
            let node = &self.nodes[node_id];
            if node.parent.is_some() {
                segments.push(node.name.as_str());
            }
            current = node.parent;
        }
        segments.reverse();
        format!("/{}", segments.join("/"))
    }

    /// Depth-first lines: the root name, then each node behind its branch prefix.
    pub fn render_lines(&self) -> Vec<String> {
        let mut lines = vec![self.nodes[0].name.clone()];
        // (node, indent of its line, last among its siblings)
        let mut stack: Vec<(NodeId, String, bool)> = Vec::new();
        self.push_children(0, "", &mut stack);

        while let Some((id, indent, is_last)) = stack.pop() {
            let (branch, continuation) = if is_last {
                ("└── ", "    ")
            } else {
                ("├── ", "│   ")
            };
            lines.push(format!("{}{}{}", indent, branch, self.nodes[id].name));
            self.push_children(id, &format!("{}{}", indent, continuation), &mut stack);
        }
        lines
    }

    // Reversed so the first child is popped first
    fn push_children(&self, id: NodeId, indent: &str, stack: &mut Vec<(NodeId, String, bool)>) {
        let children = &self.nodes[id].children;
        for (i, &child) in children.iter().enumerate().rev() {
            stack.push((child, indent.to_string(), i + 1 == children.len()));
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for line in self.render_lines() {
            out.push_str(&line);
            out.push('\n');
        }
        out
    }

    /// Builds the nested view bottom-up. A child always has a larger id than its parent, so
    /// walking ids in reverse finishes every subtree before its parent needs it.
    pub fn view(&self) -> TreeView<'_> {
        let mut views: Vec<Option<TreeView<'_>>> = self.nodes.iter().map(|_| None).collect();
        for (id, node) in self.nodes.iter().enumerate().rev() {
            let children = node
                .children
                .iter()
                .filter_map(|&child| views[child].take())
                .collect();
            views[id] = Some(TreeView {
                name: &node.name,
                children,
            });
        }
        views.into_iter().next().flatten().unwrap_or(TreeView {
            name: ROOT_NAME,
            children: Vec::new(),
        })
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.view())
    }
}

impl Default for VirtualTree {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: AsRef<str>> Extend<S> for VirtualTree {
    fn extend<I: IntoIterator<Item = S>>(&mut self, paths: I) {
        for path in paths {
            self.add_path(path.as_ref());
        }
    }
}
