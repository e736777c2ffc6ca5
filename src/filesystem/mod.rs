//! In-memory filesystem tree and its CSV loader.
//!
//! The tree is a hierarchy of named nodes, each either a directory owning its
//! children or a file holding optional text content.

mod loader;
mod tree;

pub use loader::VfsLoader;
pub use tree::{FilesystemNode, NodeKind, Tree, display_name, normalize};
