//! Source files and the pages built from them.

use crate::classify::DocumentKind;
use crate::links::{LinkError, LinkResolver};
use crate::markdown;
use crate::nav::FolderId;
use crate::output_path::{PathError, replace_md_extension_with_html};
use std::path::PathBuf;

/// A discovered source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// `/`-separated path relative to the source root.
    pub input_path: String,
    /// Absolute location on disk.
    pub full_input_path: PathBuf,
    /// `/`-separated path relative to the output root, source extension kept.
    pub output_path: String,
}

/// A page of documentation, usually rendered from a markdown file.
#[derive(Debug, Clone)]
pub struct Page {
    pub file: SourceFile,
    pub kind: DocumentKind,
    /// From the output file name: `vpc-app/overview.md` → `Overview`
    pub title: String,
    /// Source body with package links expanded.
    pub body_markdown: String,
    /// Rendered body fragment, without the surrounding document.
    pub body_html: String,
    /// Upstream location of the source file. Empty outside `packages/`.
    pub github_url: String,
    /// Output path with its markdown extension replaced by `.html`.
    pub html_path: String,
    /// Set once the page is inserted into a [`NavTree`](crate::nav::NavTree).
    pub parent_folder: Option<FolderId>,
}

impl Page {
    pub fn new(file: SourceFile, kind: DocumentKind) -> Result<Self, PathError> {
        let html_path = replace_md_extension_with_html(&file.output_path)?;
        let title = title_from_output_path(&file.output_path);
        Ok(Self {
            file,
            kind,
            title,
            body_markdown: String::new(),
            body_html: String::new(),
            github_url: String::new(),
            html_path,
            parent_folder: None,
        })
    }

    /// Fill in the body and URL properties from the raw source `body`.
    pub fn populate(&mut self, body: &str, links: &LinkResolver) -> Result<(), LinkError> {
        self.body_markdown = links.rewrite_links(&self.file.input_path, body)?;
        self.body_html = markdown::to_html(&self.body_markdown);
        self.github_url = match links.github_url(&self.file.input_path)? {
            url if url == "./" => String::new(),
            url => url,
        };
        Ok(())
    }

    /// Site-absolute URL of the rendered page.
    pub fn href(&self) -> String {
        format!("/{}", self.html_path)
    }
}

/// `packages/p/m/getting-started.md` → `Getting-Started`
pub fn title_from_output_path(output_path: &str) -> String {
    let file_name = output_path.rsplit('/').next().unwrap_or(output_path);
    let stem = file_name.split('.').next().unwrap_or(file_name);
    title_case(stem)
}

/// Upper-case the first letter of every word. Anything other than a letter,
/// digit or underscore separates words.
fn title_case(text: &str) -> String {
    let mut title = String::with_capacity(text.len());
    let mut at_word_start = true;
    for c in text.chars() {
        if at_word_start {
            title.extend(c.to_uppercase());
        } else {
            title.push(c);
        }
        at_word_start = !(c.is_alphanumeric() || c == '_');
    }
    title
}
