//! Output path resolution.
//!
//! The published site has a flatter shape than the source repository. The
//! organizational folders (`modules/`, `_docs/`, `docs/`) are dropped, while
//! the package name, module name and file name are kept:
//!
//! | Kind | Source | Output |
//! |------|--------|--------|
//! | GlobalDoc | `global/help/support.md` | `help/support.md` |
//! | ModuleDoc | `packages/p/modules/m/_docs/f.md` | `packages/p/m/f.md` |
//! | ModuleOverview | `packages/p/modules/m/README.md` | `packages/p/m/overview.md` |
//! | ModuleExampleDoc | `packages/p/examples/e/docs/f.md` | `packages/p/e/examples/f.md` |
//! | ModuleExampleOverview | `packages/p/examples/e/README.md` | `packages/p/e/examples/overview.md` |
//! | PackageOverview | `packages/p/README.md` | `packages/p/overview.md` |
//! | PackageDoc | `packages/p/modules/_docs/s/README.md` | `packages/p/s/README.md` |
//! | Image (global) | `global/help/images/a.png` | `help/images/a.png` |
//! | Image (package) | `packages/p/modules/m/_docs/images/a.png` | `packages/p/m/images/a.png` |
//!
//! Package images are flattened the same way as the docs beside them, so a
//! relative `images/a.png` reference still resolves once the page has moved:
//! `modules/_docs/` goes to the package folder, `modules/<m>/[_docs/]` to
//! `<m>/`, and `examples/<e>/[_docs/|docs/]` to `<e>/examples/`. Images
//! anywhere else in the package keep their path.
//!
//! Output paths keep the source extension; [`replace_md_extension_with_html`]
//! produces the final `.html` file name when a page is written.

use crate::classify::DocumentKind;
use regex::{Captures, Regex};
use std::sync::LazyLock;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("malformed {rule} path {path:?}: does not decompose with pattern {pattern}")]
    MalformedPath {
        path: String,
        rule: &'static str,
        pattern: &'static str,
    },
    #[error("{path:?} does not have a markdown extension")]
    NotMarkdown { path: String },
    #[error("{kind} files have no output path: {path:?}")]
    UnsupportedKind { kind: DocumentKind, path: String },
}

const GLOBAL_DOC_OUTPUT: &str = r"^global/(.+)$";
const MODULE_DOC_OUTPUT: &str = r"^packages/([\w -]+)/modules/([\w -]+)/_docs/([^/]+)$";
const MODULE_OVERVIEW_OUTPUT: &str = r"^packages/([\w -]+)/modules/([\w -]+)/README\.md$";
const MODULE_EXAMPLE_DOC_OUTPUT: &str =
    r"^packages/([\w -]+)/examples/([\w -]+)/(?:_docs/|docs/)?([^/]+)$";
const MODULE_EXAMPLE_OVERVIEW_OUTPUT: &str = r"^packages/([\w -]+)/examples/([\w -]+)/README\.md$";
const PACKAGE_OVERVIEW_OUTPUT: &str = r"^packages/([\w -]+)/README\.md$";
const PACKAGE_DOC_OUTPUT: &str = r"^packages/([\w -]+)/modules/_docs/((?:[\w -]+/)?README\.md)$";
const PACKAGE_DOC_IMAGE: &str = r"^packages/([\w -]+)/modules/_docs/(.+)$";
const MODULE_IMAGE: &str = r"^packages/([\w -]+)/modules/([\w -]+)/(?:_docs/)?(.+)$";
const MODULE_EXAMPLE_IMAGE: &str = r"^packages/([\w -]+)/examples/([\w -]+)/(?:_docs/|docs/)?(.+)$";
const MARKDOWN_FILE_PATH: &str = r"^(.*?)\.(?:markdown|mdown|mkdn|mkd|md)$";

macro_rules! regex {
    ($pattern:expr) => {{
        static RE: LazyLock<Regex> = LazyLock::new(|| Regex::new($pattern).unwrap());
        &*RE
    }};
}

/// Compute the output-root-relative path for a classified input path.
pub fn resolve_output_path(kind: DocumentKind, input_path: &str) -> Result<String, PathError> {
    match kind {
        DocumentKind::GlobalDoc => global_doc_output_path(input_path),
        DocumentKind::ModuleDoc => module_doc_output_path(input_path),
        DocumentKind::ModuleOverview => module_overview_output_path(input_path),
        DocumentKind::ModuleExampleDoc => module_example_doc_output_path(input_path),
        DocumentKind::ModuleExampleOverview => module_example_overview_output_path(input_path),
        DocumentKind::PackageOverview => package_overview_output_path(input_path),
        DocumentKind::PackageDoc => package_doc_output_path(input_path),
        DocumentKind::Image => Ok(image_output_path(input_path)),
        DocumentKind::Skip => Err(PathError::UnsupportedKind {
            kind,
            path: input_path.to_string(),
        }),
    }
}

/// Match `input_path` and require exactly `groups` capture groups to participate.
fn capture<'a>(
    regex: &Regex,
    pattern: &'static str,
    rule: &'static str,
    input_path: &'a str,
    groups: usize,
) -> Result<Captures<'a>, PathError> {
    regex
        .captures(input_path)
        .filter(|caps| (1..=groups).all(|i| caps.get(i).is_some()))
        .ok_or_else(|| PathError::MalformedPath {
            path: input_path.to_string(),
            rule,
            pattern,
        })
}

pub fn global_doc_output_path(input_path: &str) -> Result<String, PathError> {
    let caps = capture(
        regex!(GLOBAL_DOC_OUTPUT),
        GLOBAL_DOC_OUTPUT,
        "global-doc",
        input_path,
        1,
    )?;
    Ok(caps[1].to_string())
}

pub fn module_doc_output_path(input_path: &str) -> Result<String, PathError> {
    let caps = capture(
        regex!(MODULE_DOC_OUTPUT),
        MODULE_DOC_OUTPUT,
        "module-doc",
        input_path,
        3,
    )?;
    Ok(format!("packages/{}/{}/{}", &caps[1], &caps[2], &caps[3]))
}

pub fn module_overview_output_path(input_path: &str) -> Result<String, PathError> {
    let caps = capture(
        regex!(MODULE_OVERVIEW_OUTPUT),
        MODULE_OVERVIEW_OUTPUT,
        "module-overview",
        input_path,
        2,
    )?;
    Ok(format!("packages/{}/{}/overview.md", &caps[1], &caps[2]))
}

pub fn module_example_doc_output_path(input_path: &str) -> Result<String, PathError> {
    let caps = capture(
        regex!(MODULE_EXAMPLE_DOC_OUTPUT),
        MODULE_EXAMPLE_DOC_OUTPUT,
        "module-example-doc",
        input_path,
        3,
    )?;
    Ok(format!("packages/{}/{}/examples/{}", &caps[1], &caps[2], &caps[3]))
}

pub fn module_example_overview_output_path(input_path: &str) -> Result<String, PathError> {
    let caps = capture(
        regex!(MODULE_EXAMPLE_OVERVIEW_OUTPUT),
        MODULE_EXAMPLE_OVERVIEW_OUTPUT,
        "module-example-overview",
        input_path,
        2,
    )?;
    Ok(format!("packages/{}/{}/examples/overview.md", &caps[1], &caps[2]))
}

pub fn package_overview_output_path(input_path: &str) -> Result<String, PathError> {
    let caps = capture(
        regex!(PACKAGE_OVERVIEW_OUTPUT),
        PACKAGE_OVERVIEW_OUTPUT,
        "package-overview",
        input_path,
        1,
    )?;
    Ok(format!("packages/{}/overview.md", &caps[1]))
}

pub fn package_doc_output_path(input_path: &str) -> Result<String, PathError> {
    let caps = capture(
        regex!(PACKAGE_DOC_OUTPUT),
        PACKAGE_DOC_OUTPUT,
        "package-doc",
        input_path,
        2,
    )?;
    Ok(format!("packages/{}/{}", &caps[1], &caps[2]))
}

/// Place an image next to the pages that reference it.
pub fn image_output_path(input_path: &str) -> String {
    if let Some(rest) = input_path.strip_prefix("global/") {
        return rest.to_string();
    }
    if let Some(caps) = regex!(PACKAGE_DOC_IMAGE).captures(input_path) {
        return format!("packages/{}/{}", &caps[1], &caps[2]);
    }
    if let Some(caps) = regex!(MODULE_IMAGE).captures(input_path) {
        return format!("packages/{}/{}/{}", &caps[1], &caps[2], &caps[3]);
    }
    if let Some(caps) = regex!(MODULE_EXAMPLE_IMAGE).captures(input_path) {
        return format!("packages/{}/{}/examples/{}", &caps[1], &caps[2], &caps[3]);
    }
    input_path.to_string()
}

/// Given `foo/bar.md` return `foo/bar.html`.
///
/// Any of the accepted markdown extensions is replaced. Only the final
/// extension of the path changes; a directory named `x.md/` is left alone.
pub fn replace_md_extension_with_html(path: &str) -> Result<String, PathError> {
    let caps = regex!(MARKDOWN_FILE_PATH)
        .captures(path)
        .filter(|caps| !caps[1].is_empty() && !caps[1].ends_with('/'))
        .ok_or_else(|| PathError::NotMarkdown {
            path: path.to_string(),
        })?;
    Ok(format!("{}.html", &caps[1]))
}
