//! Full-page HTML template.
//!
//! The page shell is a Jinja-syntax file loaded once per run. It receives
//! three variables:
//!
//! | Variable | Content | Escaped |
//! |----------|---------|---------|
//! | `page_title` | Page title | yes |
//! | `page_body` | Rendered markdown body | no |
//! | `nav_tree` | Rendered navigation with the page active | no |
//!
//! A missing or unparseable template is fatal for the run; a render failure
//! only fails the page being rendered.

use minijinja::{Environment, Value, context};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Template path used when neither config nor CLI names one.
pub const DEFAULT_TEMPLATE_PATH: &str = "_html/doc_template.html";

/// Registered name. The `.html` suffix turns on HTML auto-escaping.
const TEMPLATE_NAME: &str = "page.html";

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("template not found: {}", .0.display())]
    Missing(PathBuf),
    #[error("failed to read template {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse template {}: {source}", path.display())]
    Syntax {
        path: PathBuf,
        source: minijinja::Error,
    },
    #[error("failed to render page '{title}': {source}")]
    Render {
        title: String,
        source: minijinja::Error,
    },
}

/// A parsed page template, shareable across render threads.
#[derive(Debug)]
pub struct PageTemplate {
    env: Environment<'static>,
}

impl PageTemplate {
    /// Load and parse the template at `path`.
    pub fn load(path: &Path) -> Result<Self, TemplateError> {
        if !path.is_file() {
            return Err(TemplateError::Missing(path.to_path_buf()));
        }
        let source = std::fs::read_to_string(path).map_err(|source| TemplateError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_source(source).map_err(|source| TemplateError::Syntax {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse a template held in memory.
    pub fn from_source(source: impl Into<String>) -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        env.add_template_owned(TEMPLATE_NAME, source.into())?;
        Ok(Self { env })
    }

    /// Produce a full HTML document.
    pub fn render(&self, title: &str, body_html: &str, nav_html: &str) -> Result<String, TemplateError> {
        let render_error = |source| TemplateError::Render {
            title: title.to_string(),
            source,
        };
        let template = self.env.get_template(TEMPLATE_NAME).map_err(render_error)?;
        template
            .render(context! {
                page_title => title,
                page_body => Value::from_safe_string(body_html.to_string()),
                nav_tree => Value::from_safe_string(nav_html.to_string()),
            })
            .map_err(render_error)
    }
}
