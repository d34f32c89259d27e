//! Path classification.
//!
//! Every file under the documentation root is identified purely by its
//! root-relative path. The repository follows a small set of layout
//! conventions:
//!
//! ```text
//! docs/
//! ├── global/                              # Site-wide documentation
//! │   ├── help/support.md                  # GlobalDoc
//! │   └── help/images/diagram.png          # Image
//! └── packages/
//!     └── module-vpc/
//!         ├── README.md                    # PackageOverview
//!         ├── modules/
//!         │   ├── _docs/README.md          # PackageDoc
//!         │   ├── _docs/faq/README.md      # PackageDoc
//!         │   └── vpc-app/
//!         │       ├── README.md            # ModuleOverview
//!         │       └── _docs/routing.md     # ModuleDoc
//!         └── examples/
//!             └── vpc-app/
//!                 ├── README.md            # ModuleExampleOverview
//!                 └── docs/usage.md        # ModuleExampleDoc
//! ```
//!
//! ## Precedence
//!
//! The patterns overlap: `packages/p/modules/_docs/README.md` also has the
//! shape of a module overview (with a module called `_docs`), and every
//! example overview is also a valid example doc. Rules are therefore an
//! ordered table and the first match wins. [`RULES`] lists them from the
//! most specific shape to the least specific one.

use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::LazyLock;

/// The kind of document a source path holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentKind {
    GlobalDoc,
    ModuleDoc,
    ModuleOverview,
    ModuleExampleDoc,
    ModuleExampleOverview,
    PackageDoc,
    PackageOverview,
    Image,
    /// Not part of the published site. Not an error.
    Skip,
}

impl DocumentKind {
    /// Whether files of this kind become rendered pages.
    pub fn is_page(self) -> bool {
        !matches!(self, Self::Image | Self::Skip)
    }

    /// Stable rule name, used in error messages and reports.
    pub fn name(self) -> &'static str {
        match self {
            Self::GlobalDoc => "global-doc",
            Self::ModuleDoc => "module-doc",
            Self::ModuleOverview => "module-overview",
            Self::ModuleExampleDoc => "module-example-doc",
            Self::ModuleExampleOverview => "module-example-overview",
            Self::PackageDoc => "package-doc",
            Self::PackageOverview => "package-overview",
            Self::Image => "image",
            Self::Skip => "skip",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Extensions accepted for markdown documents.
pub const MARKDOWN_EXTENSIONS: &[&str] = &["markdown", "mdown", "mkdn", "mkd", "md"];

pub const GLOBAL_DOC_PATTERN: &str = r"^global/.+/[^/]+\.(markdown|mdown|mkdn|mkd|md)$";
pub const MODULE_DOC_PATTERN: &str =
    r"^packages/[\w -]+/modules/[\w -]+/_docs/[\w -]+\.(markdown|mdown|mkdn|mkd|md)$";
pub const MODULE_OVERVIEW_PATTERN: &str = r"^packages/[\w -]+/modules/[\w -]+/README\.md$";
pub const MODULE_EXAMPLE_DOC_PATTERN: &str =
    r"^packages/[\w -]+/examples/[\w -]+/(?:_docs/|docs/)?[\w -]+\.(markdown|mdown|mkdn|mkd|md)$";
pub const MODULE_EXAMPLE_OVERVIEW_PATTERN: &str =
    r"^packages/[\w -]+/examples/[\w -]+/README\.md$";
pub const PACKAGE_OVERVIEW_PATTERN: &str = r"^packages/[\w -]+/README\.md$";
pub const PACKAGE_DOC_PATTERN: &str = r"^packages/[\w -]+/modules/_docs/(?:[\w -]+/)?README\.md$";
pub const IMAGE_PATTERN: &str = r"^(?:global|packages)/(?:.+/)?[^/]+\.(?:jpg|png|gif)$";

/// A single classification rule: a compiled pattern and the kind it yields.
pub struct Rule {
    pub kind: DocumentKind,
    pub pattern: &'static str,
    regex: LazyLock<Regex>,
}

impl Rule {
    pub fn matches(&self, input_path: &str) -> bool {
        self.regex.is_match(input_path)
    }
}

macro_rules! rule {
    ($kind:expr, $pattern:expr) => {
        Rule {
            kind: $kind,
            pattern: $pattern,
            regex: LazyLock::new(|| Regex::new($pattern).unwrap()),
        }
    };
}

/// Classification rules in evaluation order.
pub static RULES: [Rule; 8] = [
    rule!(DocumentKind::Image, IMAGE_PATTERN),
    rule!(DocumentKind::GlobalDoc, GLOBAL_DOC_PATTERN),
    rule!(DocumentKind::PackageOverview, PACKAGE_OVERVIEW_PATTERN),
    rule!(DocumentKind::PackageDoc, PACKAGE_DOC_PATTERN),
    rule!(DocumentKind::ModuleOverview, MODULE_OVERVIEW_PATTERN),
    rule!(DocumentKind::ModuleDoc, MODULE_DOC_PATTERN),
    rule!(DocumentKind::ModuleExampleOverview, MODULE_EXAMPLE_OVERVIEW_PATTERN),
    rule!(DocumentKind::ModuleExampleDoc, MODULE_EXAMPLE_DOC_PATTERN),
];

/// Classify a root-relative, `/`-separated path.
pub fn classify(input_path: &str) -> DocumentKind {
    RULES
        .iter()
        .find(|rule| rule.matches(input_path))
        .map_or(DocumentKind::Skip, |rule| rule.kind)
}

/// The rule for `kind`, or `None` for [`DocumentKind::Skip`].
pub fn rule_for(kind: DocumentKind) -> Option<&'static Rule> {
    RULES.iter().find(|rule| rule.kind == kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check_pattern(kind: DocumentKind, cases: &[(&str, bool)]) {
        let rule = rule_for(kind).unwrap();
        for (path, expected) in cases {
            assert_eq!(
                rule.matches(path),
                *expected,
                "rule = {}, path = {path}",
                kind
            );
        }
    }

    #[test]
    fn global_doc_pattern() {
        check_pattern(
            DocumentKind::GlobalDoc,
            &[
                ("global/help/support.md", true),
                ("global/introduction/tools.md", true),
                ("global/introduction/Getting Started.md", true),
                ("global/a/b/c/deep.markdown", true),
                ("global/top-level.md", false),
                ("global/help/logo.png", false),
                ("packages/module-vpc/README.md", false),
            ],
        );
    }

    #[test]
    fn module_doc_pattern() {
        check_pattern(
            DocumentKind::ModuleDoc,
            &[
                ("packages/module-vpc/modules/vpc-app/_docs/example.md", true),
                ("packages/some_otherPackageName/modules/modname/_docs/README.md", true),
                ("packages/module-vpc/modules/vpc-app/_docs/notes.mkd", true),
                ("packages5/some_otherPackageName/modules/modname/README.md", false),
                ("packages/module-vpc/modules/vpc-app/_docs", false),
                ("packages/module-vpc/modules/vpc-app/docs", false),
                ("packages/module-vpc/modules/vpc-app/docs/example.md", false),
                ("packages/module-vpc/modules/vpc-app/example.md", false),
                ("packages5/module-vpc/modules/vpc-app/example.md", false),
                ("packages/module-vpc/modules/vpc-app/_docs/subfolder/file.md", false),
            ],
        );
    }

    #[test]
    fn module_overview_pattern() {
        check_pattern(
            DocumentKind::ModuleOverview,
            &[
                ("packages/module-vpc/modules/vpc-mgmt-network-acls/README.md", true),
                ("packages/module-vpc/modules/vpc-peering/README.md", true),
                ("packages/module-vpc/modules/vpc-peering/overview.md", false),
            ],
        );
    }

    #[test]
    fn module_example_overview_pattern() {
        check_pattern(
            DocumentKind::ModuleExampleOverview,
            &[
                ("packages/module-vpc/examples/vpc-app/README.md", true),
                ("packages/package-vpc/examples/vpc-app/README.md", true),
                ("packages/something_else/examples/some_module_name/README.md", true),
                ("packages/something_else/examples/some_module_name/overview.md", false),
                ("packages/package-name/some_module_name/README.md", false),
            ],
        );
    }

    #[test]
    fn module_example_doc_pattern() {
        check_pattern(
            DocumentKind::ModuleExampleDoc,
            &[
                ("packages/module-vpc/examples/vpc-app/Example.md", true),
                ("packages/module-vpc/examples/vpc-app/_docs/Example.md", true),
                ("packages/module-vpc/examples/vpc-app/docs/Example.md", true),
                ("packages/module-vpc/examples/vpc-app/docs/Example.txt", false),
                ("packages/module-vpc/examples/vpc-app/Example.txt", false),
                ("packages/module-vpc/examples/Example.txt", false),
                ("packages/module-vpc/examples/vpc-app/other/Example.md", false),
            ],
        );
    }

    #[test]
    fn package_overview_pattern() {
        check_pattern(
            DocumentKind::PackageOverview,
            &[
                ("packages/module-vpc/README.md", true),
                ("packages/package-vpc/README.md", true),
                ("packages/module-vpc/examples/README.md", false),
                ("packages/module-vpc/examples/vpc-app/README.md", false),
                ("packages/module-vpc/overview.md", false),
                ("packages/package-_.vpc/overview.md", false),
                ("packages/package-_.vpc/README.md", false),
            ],
        );
    }

    #[test]
    fn package_doc_pattern() {
        check_pattern(
            DocumentKind::PackageDoc,
            &[
                ("packages/module-vpc/modules/_docs/README.md", true),
                ("packages/module-vpc/modules/_docs/subfolder/README.md", true),
                ("packages/module-vpc/_docs/README.md", false),
                ("packages/module-vpc/_docs/subfolder/README.md", false),
                ("packages/module-vpc/docs/README.md", false),
                ("packages/module-vpc/README.md", false),
            ],
        );
    }

    #[test]
    fn image_pattern() {
        check_pattern(
            DocumentKind::Image,
            &[
                ("global/help/images/sample.jpg", true),
                ("global/help/images/sample.png", true),
                ("global/help/images/sample.gif", true),
                ("global/help/sample.gif", true),
                ("packages/module-vpc/modules/_docs/images/sample.jpg", true),
                ("packages/module-vpc/modules/_docs/images/sample.md", false),
                ("global/sample.png", true),
                ("global/help/images/sample.doc", false),
            ],
        );
    }

    #[test]
    fn classify_applies_precedence() {
        let cases = [
            ("global/help/support.md", DocumentKind::GlobalDoc),
            ("packages/module-vpc/README.md", DocumentKind::PackageOverview),
            // Also shaped like a module overview for a module named `_docs`
            ("packages/module-vpc/modules/_docs/README.md", DocumentKind::PackageDoc),
            ("packages/module-vpc/modules/_docs/faq/README.md", DocumentKind::PackageDoc),
            ("packages/module-vpc/modules/vpc-app/README.md", DocumentKind::ModuleOverview),
            ("packages/module-vpc/modules/vpc-app/_docs/routing.md", DocumentKind::ModuleDoc),
            // Also shaped like an example doc
            ("packages/module-vpc/examples/vpc-app/README.md", DocumentKind::ModuleExampleOverview),
            ("packages/module-vpc/examples/vpc-app/docs/usage.md", DocumentKind::ModuleExampleDoc),
            ("packages/module-vpc/modules/_docs/images/arch.png", DocumentKind::Image),
            ("global/help/images/sample.doc", DocumentKind::Skip),
            ("packages/module-vpc/main.tf", DocumentKind::Skip),
            ("packages/module-vpc/modules/vpc-app/_docs/sub/file.md", DocumentKind::Skip),
            ("README.md", DocumentKind::Skip),
            ("config.toml", DocumentKind::Skip),
        ];
        for (path, expected) in cases {
            assert_eq!(classify(path), expected, "path = {path}");
        }
    }

    #[test]
    fn every_kind_but_skip_has_a_rule() {
        let kinds = [
            DocumentKind::GlobalDoc,
            DocumentKind::ModuleDoc,
            DocumentKind::ModuleOverview,
            DocumentKind::ModuleExampleDoc,
            DocumentKind::ModuleExampleOverview,
            DocumentKind::PackageDoc,
            DocumentKind::PackageOverview,
            DocumentKind::Image,
        ];
        for kind in kinds {
            assert!(rule_for(kind).is_some(), "missing rule for {kind}");
        }
        assert!(rule_for(DocumentKind::Skip).is_none());
    }

    #[test]
    fn only_documents_are_pages() {
        assert!(DocumentKind::GlobalDoc.is_page());
        assert!(DocumentKind::PackageOverview.is_page());
        assert!(!DocumentKind::Image.is_page());
        assert!(!DocumentKind::Skip.is_page());
    }
}
