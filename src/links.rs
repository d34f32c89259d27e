//! Link resolution and body rewriting.
//!
//! Documentation is written with repository-relative links so it previews
//! correctly inside each package repository. Package docs are published
//! away from those repositories, so every path-like link in a package page
//! is rewritten to the canonical source-control URL:
//!
//! ```text
//! https://<host>/<organization>/<package>/tree/<branch><suffix>
//! ```
//!
//! | Link shape | Suffix |
//! |------------|--------|
//! | `/abs/path` | the link verbatim |
//! | `./` | the page's own path within the package |
//! | `./sibling.md` | resolved against the page's directory |
//! | `../up.md` | resolved against the page's directory, `..` collapsed |
//!
//! `..` never climbs above the package root: at the root it is dropped, so
//! `../module-asg/README.md` from the package README lands on
//! `/module-asg/README.md` inside the same repository.
//!
//! Resolving `./sibling.md` to the sibling is a deliberate change: the
//! previous generator of this site sent every `./` link to the page itself.
//!
//! Pages outside `packages/` keep their links untouched, as do bare
//! relative tokens such as `and/or` that merely look like paths. A page
//! under `packages/` whose package root cannot be determined is an
//! [`LinkError::UnresolvableLink`].
//!
//! ## Replacement scope
//!
//! [`LinkResolver::rewrite_links`] only replaces a candidate where it is
//! wrapped in parentheses (`[text](path)`) or surrounded by single spaces.
//! A link followed by a comma or sitting at the start of a line is left
//! as written. This scope is relied on by existing content.

use crate::config::RepositoryConfig;
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;
use thiserror::Error;

pub const FILE_PATHS_PATTERN: &str =
    r"(?:http:/|https:/)?(/[A-Za-z0-9_/.-]+)|([A-Za-z0-9_/.-]+/[A-Za-z0-9_.-]*)";
pub const PACKAGE_FILE_PATTERN: &str = r"^packages/([\w -]+)(/.*)$";

static FILE_PATHS: LazyLock<Regex> = LazyLock::new(|| Regex::new(FILE_PATHS_PATTERN).unwrap());
static PACKAGE_FILE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(PACKAGE_FILE_PATTERN).unwrap());

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LinkError {
    #[error("cannot resolve link {link:?} in {input_path:?}: {reason}")]
    UnresolvableLink {
        input_path: String,
        link: String,
        reason: String,
    },
}

/// An input path split at its package root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackagePath<'a> {
    /// `module-vpc` in `packages/module-vpc/modules/vpc-app/README.md`
    pub name: &'a str,
    /// `/modules/vpc-app/README.md` in the same path
    pub relative: &'a str,
}

impl<'a> PackagePath<'a> {
    /// Returns `None` for paths outside `packages/<name>/`.
    pub fn parse(input_path: &'a str) -> Option<Self> {
        let caps = PACKAGE_FILE.captures(input_path)?;
        Some(Self {
            name: caps.get(1)?.as_str(),
            relative: caps.get(2)?.as_str(),
        })
    }
}

pub fn is_package_input_path(input_path: &str) -> bool {
    PACKAGE_FILE.is_match(input_path)
}

/// Rewrites links for one repository host/organization/branch.
#[derive(Debug, Clone)]
pub struct LinkResolver {
    repository: RepositoryConfig,
}

impl LinkResolver {
    pub fn new(repository: RepositoryConfig) -> Self {
        Self { repository }
    }

    /// `https://github.com/gruntwork-io/module-vpc/tree/master` for `module-vpc`.
    pub fn package_url_prefix(&self, package: &str) -> String {
        format!(
            "https://{}/{}/{}/tree/{}",
            self.repository.host, self.repository.organization, package, self.repository.branch
        )
    }

    /// Resolve a single link found in the body of `input_path`.
    pub fn resolve_link(&self, input_path: &str, link_path: &str) -> Result<String, LinkError> {
        let Some(package) = PackagePath::parse(input_path) else {
            if input_path.starts_with("packages/") {
                return Err(unresolvable(
                    input_path,
                    link_path,
                    "cannot determine the package root".to_string(),
                ));
            }
            return Ok(link_path.to_string());
        };

        let suffix = if link_path.starts_with('/') {
            link_path.to_string()
        } else if link_path == "./" {
            package.relative.to_string()
        } else if let Some(rest) = link_path.strip_prefix("./") {
            join_relative(package.relative, rest)
        } else if link_path.starts_with("../") {
            join_relative(package.relative, link_path)
        } else {
            return Ok(link_path.to_string());
        };

        Ok(format!("{}{}", self.package_url_prefix(package.name), suffix))
    }

    /// The source-control URL of the page at `input_path`.
    pub fn github_url(&self, input_path: &str) -> Result<String, LinkError> {
        self.resolve_link(input_path, "./")
    }

    /// Rewrite every link in `body` that resolves to something new.
    pub fn rewrite_links(&self, input_path: &str, body: &str) -> Result<String, LinkError> {
        let mut new_body = body.to_string();

        for link_path in link_candidates(body) {
            let url = self.resolve_link(input_path, link_path)?;
            if url == link_path {
                continue;
            }

            // A bare replace would also hit copies of the path inside URLs
            // that were already expanded.
            new_body = new_body.replace(&format!("({link_path})"), &format!("({url})"));
            new_body = new_body.replace(&format!(" {link_path} "), &format!(" {url} "));
        }

        Ok(new_body)
    }
}

fn unresolvable(input_path: &str, link: &str, reason: String) -> LinkError {
    LinkError::UnresolvableLink {
        input_path: input_path.to_string(),
        link: link.to_string(),
        reason,
    }
}

/// Distinct path-like tokens in `body`, in order of first appearance.
///
/// Tokens that are already fully qualified (`http://`, `https://`) are dropped.
pub fn link_candidates(body: &str) -> Vec<&str> {
    let mut seen = HashSet::new();
    FILE_PATHS
        .find_iter(body)
        .map(|m| m.as_str())
        .filter(|token| !token.contains("http://") && !token.contains("https://"))
        .filter(|token| seen.insert(*token))
        .collect()
}

/// Resolve `link` against the directory holding `file`, both package-relative.
///
/// `file` starts with `/`; the result does too. A `..` at the package root
/// is dropped.
fn join_relative(file: &str, link: &str) -> String {
    let mut segments: Vec<&str> = file.split('/').filter(|s| !s.is_empty()).collect();
    segments.pop();

    for segment in link.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            name => segments.push(name),
        }
    }

    format!("/{}", segments.join("/"))
}
