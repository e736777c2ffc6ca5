use std::collections::BTreeMap;

use derive_more::Display;
use snafu::Snafu;

/// Data-less kind of a node, as reported by listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum NodeKind {
    #[display("directory")]
    Directory,
    #[display("file")]
    File,
}

/// Represents a node of the virtual filesystem.
///
/// A node's name is the key under which its parent stores it, so only the
/// root is nameless.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilesystemNode {
    File {
        content: Option<String>,
    },
    Directory {
        children: BTreeMap<String, FilesystemNode>,
    },
}

impl FilesystemNode {
    pub fn empty_directory() -> Self {
        FilesystemNode::Directory {
            children: BTreeMap::new(),
        }
    }

    pub fn file(content: Option<String>) -> Self {
        FilesystemNode::File {
            content: content.filter(|c| !c.is_empty()),
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            FilesystemNode::File { .. } => NodeKind::File,
            FilesystemNode::Directory { .. } => NodeKind::Directory,
        }
    }

    pub fn is_directory(&self) -> bool {
        self.kind() == NodeKind::Directory
    }

    pub fn content(&self) -> Option<&str> {
        match self {
            FilesystemNode::File { content } => content.as_deref(),
            FilesystemNode::Directory { .. } => None,
        }
    }

    pub fn child(&self, name: &str) -> Option<&FilesystemNode> {
        match self {
            FilesystemNode::Directory { children } => children.get(name),
            FilesystemNode::File { .. } => None,
        }
    }

    pub fn has_children(&self) -> bool {
        matches!(self, FilesystemNode::Directory { children } if !children.is_empty())
    }

    /// Children of a directory as `(name, kind)` pairs, sorted by name.
    /// Files have no children and yield an empty listing.
    pub fn list(&self) -> Vec<(&str, NodeKind)> {
        match self {
            FilesystemNode::Directory { children } => children
                .iter()
                .map(|(name, node)| (name.as_str(), node.kind()))
                .collect(),
            FilesystemNode::File { .. } => Vec::new(),
        }
    }

    /// Renders all descendants depth-first, two spaces of indentation per
    /// level, directories suffixed with '/'.
    pub fn render(&self) -> Vec<String> {
        let mut lines = Vec::new();
        self.render_into(1, &mut lines);
        lines
    }

    fn render_into(&self, depth: usize, lines: &mut Vec<String>) {
        if let FilesystemNode::Directory { children } = self {
            let indent = "  ".repeat(depth);
            for (name, node) in children {
                lines.push(format!("{indent}{}", display_name(name, node.kind())));
                node.render_into(depth + 1, lines);
            }
        }
    }
}

impl Default for FilesystemNode {
    fn default() -> Self {
        Self::empty_directory()
    }
}

/// Name of an entry as shown by listings
pub fn display_name(name: &str, kind: NodeKind) -> String {
    match kind {
        NodeKind::Directory => format!("{name}/"),
        NodeKind::File => name.to_string(),
    }
}

/// Splits a path into its non-empty segments, anchoring relative paths at `cwd`
fn segments<'a>(path: &'a str, cwd: &'a str) -> Vec<&'a str> {
    let base = if path.starts_with('/') { "" } else { cwd };
    base.split('/')
        .chain(path.split('/'))
        .filter(|segment| !segment.is_empty())
        .collect()
}

/// Absolute, normalized form of `path` relative to `cwd`
pub fn normalize(path: &str, cwd: &str) -> String {
    format!("/{}", segments(path, cwd).join("/"))
}

/// The in-memory filesystem, owning a root directory that is never replaced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tree {
    root: FilesystemNode,
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn root(&self) -> &FilesystemNode {
        &self.root
    }

    /// Walks from the root through every segment of `path`. Returns `None`
    /// as soon as a segment is missing. `.` and `..` are plain names here.
    pub fn resolve(&self, path: &str, cwd: &str) -> Option<&FilesystemNode> {
        segments(path, cwd)
            .into_iter()
            .try_fold(&self.root, |current, name| current.child(name))
    }

    /// Inserts a node at the absolute `path`, creating missing intermediate
    /// directories. An existing final node is overwritten, except that a
    /// directory inserted over a directory keeps its children.
    pub fn insert(
        &mut self,
        path: &str,
        kind: NodeKind,
        content: Option<String>,
    ) -> Result<(), InsertError> {
        let mut components = segments(path, "/").into_iter().peekable();
        if components.peek().is_none() {
            return Err(InsertError::EmptyPath);
        }
        let mut current = &mut self.root;

        while let Some(name) = components.next() {
            let FilesystemNode::Directory { children } = current else {
                return Err(InsertError::CannotInsertIntoFile {
                    path: path.to_string(),
                });
            };

            if components.peek().is_none() {
                // Last component, set its kind and content
                let keeps_existing = kind == NodeKind::Directory
                    && children.get(name).is_some_and(FilesystemNode::is_directory);
                if !keeps_existing {
                    let node = match kind {
                        NodeKind::Directory => FilesystemNode::empty_directory(),
                        NodeKind::File => FilesystemNode::file(content),
                    };
                    children.insert(name.to_string(), node);
                }
                return Ok(());
            }

            // Intermediate component, ensure directory exists
            current = children
                .entry(name.to_string())
                .or_insert_with(FilesystemNode::empty_directory);
        }

        Ok(())
    }
}

#[derive(Debug, Snafu, PartialEq, Eq)]
pub enum InsertError {
    #[snafu(display("Cannot replace the root directory"))]
    EmptyPath,
    #[snafu(display("Cannot insert {} below a file", path))]
    CannotInsertIntoFile { path: String },
}
