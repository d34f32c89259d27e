//! Shared test utilities.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = TempDir::new().unwrap();
//! write_tree(tmp.path(), &[("global/help/support.md", "# Support")]);
//!
//! let mut tree = NavTree::new();
//! tree.add_page(page_at("help/support.md"));
//! ```

use crate::classify::DocumentKind;
use crate::page::{Page, SourceFile};
use std::path::{Path, PathBuf};

/// Minimal page shell: title first, then nav, then body.
pub const TEST_TEMPLATE: &str =
    "<title>{{ page_title }}</title><nav>{{ nav_tree }}</nav><main>{{ page_body }}</main>";

/// Write `(relative path, contents)` pairs under `root`, creating directories.
pub fn write_tree(root: &Path, files: &[(&str, &str)]) {
    for (path, contents) in files {
        let full = root.join(path);
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&full, contents).unwrap();
    }
}

/// A global doc page whose output path is `output_path`.
///
/// Panics if `output_path` has no markdown extension.
pub fn page_at(output_path: &str) -> Page {
    let input_path = format!("global/{output_path}");
    let file = SourceFile {
        full_input_path: PathBuf::from("/docs").join(&input_path),
        input_path,
        output_path: output_path.to_string(),
    };
    Page::new(file, DocumentKind::GlobalDoc)
        .unwrap_or_else(|e| panic!("bad test page '{output_path}': {e}"))
}
