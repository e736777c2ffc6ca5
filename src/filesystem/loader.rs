use std::path::Path;

use base64::{Engine as _, engine::general_purpose};
use compio::fs;
use snafu::{ResultExt, Snafu};
use tracing::{debug, info, warn};

use crate::filesystem::{NodeKind, Tree};

const DIRECTORY_TYPE: &str = "directory";

/// Builds a [`Tree`] from a CSV table of `path,type,content` rows.
///
/// The first row is a header and is ignored. `content` is the base64 encoded
/// payload of a file; when it does not decode to UTF-8 text the raw field is
/// stored instead.
pub struct VfsLoader;

impl VfsLoader {
    /// Loads the tree from `path`, falling back to an empty tree when no
    /// source is configured or it cannot be loaded.
    pub async fn load_or_empty(path: Option<&Path>) -> Tree {
        let Some(path) = path else {
            info!("No VFS source configured, starting with an empty tree");
            return Tree::new();
        };

        match Self::read(path).await {
            Ok(tree) => tree,
            Err(e) => {
                warn!("Failed to load VFS, starting with an empty tree: {e}");
                Tree::new()
            }
        }
    }

    pub async fn read(path: &Path) -> Result<Tree, LoadError> {
        debug!("Opening VFS source: {}", path.display());
        let bytes = fs::read(path).await.context(ReadSnafu {
            file_path: path.display().to_string(),
        })?;
        debug!("Successfully read VFS source: {} bytes", bytes.len());

        let tree = Self::parse(&bytes)?;
        info!("Loaded VFS from {}", path.display());
        Ok(tree)
    }

    pub fn parse(source: &[u8]) -> Result<Tree, LoadError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(source);

        let mut tree = Tree::new();
        for record in reader.records() {
            let record = record.context(ParseSnafu)?;
            let (Some(path), Some(node_type)) = (record.get(0), record.get(1)) else {
                debug!("Skipping row with fewer than 2 fields: {:?}", record);
                continue;
            };

            let kind = if node_type == DIRECTORY_TYPE {
                NodeKind::Directory
            } else {
                NodeKind::File
            };
            let content = match kind {
                NodeKind::File => record.get(2).map(decode_content),
                NodeKind::Directory => None,
            };

            debug!("Inserting {} '{}'", kind, path);
            if let Err(e) = tree.insert(path, kind, content) {
                warn!("Skipping {} row for '{}': {}", kind, path, e);
            }
        }

        Ok(tree)
    }
}

fn decode_content(raw: &str) -> String {
    general_purpose::STANDARD
        .decode(raw)
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .unwrap_or_else(|| raw.to_string())
}

#[derive(Debug, Snafu)]
pub enum LoadError {
    #[snafu(display("Failed to read the VFS source {}: {}", file_path, source))]
    ReadError {
        file_path: String,
        source: std::io::Error,
    },
    #[snafu(display("Failed to parse the VFS table: {}", source))]
    ParseError { source: csv::Error },
}
