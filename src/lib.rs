//! # Docs Preprocessor
//!
//! Turns a repository of documentation into a static HTML site with a
//! navigation sidebar. The source tree has two halves:
//!
//! - `global/` holds site-wide docs, published with the prefix stripped.
//! - `packages/<name>/` holds docs copied from each package repository,
//!   rearranged into a flatter `packages/<name>/<module>/` layout.
//!
//! Where a file goes, and how it is treated, is decided by its path alone.
//!
//! # Pipeline
//!
//! ```text
//! docs/  ──discover──▶  classify  ──▶  output path  ──▶  page  ──▶  nav tree
//!                                                                      │
//! _site/  ◀──────────────── template(title, body, nav)  ◀───────────────┘
//! ```
//!
//! Links inside package docs are written relative to the package repository.
//! They are rewritten to absolute source-control URLs so they keep working
//! once the page is published somewhere else.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`classify`] | Ordered path rules deciding the [`classify::DocumentKind`] of each file |
//! | [`output_path`] | Per-kind input → output path mapping and `.html` naming |
//! | [`links`] | Package link resolution and body rewriting |
//! | [`page`] | `SourceFile` / `Page` records and title derivation |
//! | [`markdown`] | GitHub-flavored markdown to HTML |
//! | [`nav`] | Arena-backed navigation tree and its HTML rendering |
//! | [`template`] | Full-page HTML template |
//! | [`exclude`] | Glob-based path exclusion |
//! | [`files`] | File reads, writes and copies |
//! | [`assemble`] | Per-file pipeline and the parallel build driver |
//! | [`config`] | `config.toml` loading, merging and validation |
//! | [`output`] | CLI report formatting |
//!
//! # Design Decisions
//!
//! ## Paths Are the Data Model
//!
//! There is no front matter and no index file. Classification is an ordered
//! table of regular expressions over the root-relative path, evaluated first
//! match wins. Moving a file is the only way to change what it becomes.
//!
//! ## Maud for the Nav, a Template File for the Page
//!
//! The navigation tree is generated with [Maud](https://maud.lambda.xyz/) so
//! its markup is checked at compile time and every title is escaped. The
//! surrounding page is a runtime template so the site chrome can be changed
//! without rebuilding the tool.
//!
//! ## Failures Stay Local
//!
//! A file that cannot be resolved, read or rendered is reported and the run
//! continues. Only a missing source root or an unusable template stops it.

pub mod assemble;
pub mod classify;
pub mod config;
pub mod exclude;
pub mod files;
pub mod links;
pub mod markdown;
pub mod nav;
pub mod output;
pub mod output_path;
pub mod page;
pub mod template;

#[cfg(test)]
pub(crate) mod test_helpers;
