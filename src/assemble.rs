//! Page assembly and the build driver.
//!
//! Every discovered file goes through the same steps:
//!
//! ```text
//! classify → resolve output path → read → rewrite links → markdown → title
//!          → GitHub URL → insert into nav tree → render with nav → write
//! ```
//!
//! Images stop after the output path is resolved and are copied as-is.
//! Two inputs that resolve to the same output path are a conflict: the first
//! in input-path order keeps it and the later one fails with
//! [`BuildError::DuplicateOutput`].
//! Files no rule claims are skipped without being read.
//!
//! ## Concurrency
//!
//! [`Assembler::run`] works in three phases:
//!
//! 1. **Prepare** (parallel): everything up to and including the GitHub URL.
//!    Each file only touches its own data.
//! 2. **Insert** (serial): output paths are claimed and prepared pages go into
//!    the [`NavTree`] in input-path order, so the tree is the same from run to
//!    run.
//! 3. **Write** (parallel): each page renders the finished tree with itself
//!    active, and images are copied. The tree is only read in this phase.
//!
//! ## Failure isolation
//!
//! A failure in any step fails that file alone. It is logged, recorded in
//! [`BuildReport::failures`] and the run moves on. Only conditions that would
//! fail every file (missing source root, unusable template or exclude
//! pattern) abort the run, and they are detected before the first file.

use crate::classify::{DocumentKind, classify};
use crate::config::{ConfigError, RepositoryConfig, SiteConfig};
use crate::exclude::{ExcludeError, Excludes};
use crate::files::{self, FileError};
use crate::links::{LinkError, LinkResolver};
use crate::nav::{NavTree, PageId};
use crate::output_path::{PathError, replace_md_extension_with_html, resolve_output_path};
use crate::page::{Page, SourceFile};
use crate::template::{PageTemplate, TemplateError};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Source directory not found: {}", .0.display())]
    SourceNotFound(PathBuf),
    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Path error: {0}")]
    Path(#[from] PathError),
    #[error("Link error: {0}")]
    Link(#[from] LinkError),
    #[error("Template error: {0}")]
    Template(#[from] TemplateError),
    #[error("File error: {0}")]
    File(#[from] FileError),
    #[error("Exclude error: {0}")]
    Exclude(#[from] ExcludeError),
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("Duplicate output {output_path}: already produced by {first_input}")]
    DuplicateOutput {
        output_path: String,
        first_input: String,
    },
}

/// Everything a run needs besides the template.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub source_root: PathBuf,
    pub output_root: PathBuf,
    pub repository: RepositoryConfig,
    pub excludes: Vec<String>,
}

impl BuildOptions {
    pub fn from_config(config: &SiteConfig, source_root: &Path, output_root: &Path) -> Self {
        Self {
            source_root: source_root.to_path_buf(),
            output_root: output_root.to_path_buf(),
            repository: config.repository.clone(),
            excludes: config.build.excludes.clone(),
        }
    }
}

/// Result of the parallel phase for one file.
#[derive(Debug)]
pub enum Prepared {
    Skipped,
    Image(SourceFile),
    Page(Box<Page>),
}

/// What happened to one file once it is in the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Skipped,
    Image { output_path: String },
    Page(PageId),
}

#[derive(Debug, Clone, Serialize)]
pub struct WrittenPage {
    pub input_path: String,
    pub output_path: String,
    pub title: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CopiedImage {
    pub input_path: String,
    pub output_path: String,
}

#[derive(Debug)]
pub struct FileFailure {
    pub path: String,
    pub error: BuildError,
}

/// Summary of a run.
#[derive(Debug, Default)]
pub struct BuildReport {
    /// In input-path order.
    pub pages: Vec<WrittenPage>,
    pub images: Vec<CopiedImage>,
    /// Files no rule claimed.
    pub skipped: Vec<String>,
    pub failures: Vec<FileFailure>,
}

impl BuildReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    fn fail(&mut self, path: &str, error: BuildError) {
        warn!(path, error = %error, "skipping file");
        self.failures.push(FileFailure {
            path: path.to_string(),
            error,
        });
    }
}

/// Holds the state of one run: the resolver, the template and the tree
/// being built.
#[derive(Debug)]
pub struct Assembler {
    options: BuildOptions,
    links: LinkResolver,
    template: PageTemplate,
    tree: NavTree,
    /// Output path → the input that produced it.
    claimed: HashMap<String, String>,
}

impl Assembler {
    pub fn new(options: BuildOptions, template: PageTemplate) -> Self {
        let links = LinkResolver::new(options.repository.clone());
        Self {
            options,
            links,
            template,
            tree: NavTree::new(),
            claimed: HashMap::new(),
        }
    }

    pub fn tree(&self) -> &NavTree {
        &self.tree
    }

    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    fn source_file(&self, input_path: &str, output_path: String) -> SourceFile {
        SourceFile {
            input_path: input_path.to_string(),
            full_input_path: self.options.source_root.join(input_path),
            output_path,
        }
    }

    /// Run one file up to the point where it needs the tree.
    pub fn prepare(&self, input_path: &str) -> Result<Prepared, BuildError> {
        let kind = classify(input_path);
        debug!(input = input_path, kind = %kind, "classified");
        if kind == DocumentKind::Skip {
            return Ok(Prepared::Skipped);
        }

        let output_path = resolve_output_path(kind, input_path)?;
        let file = self.source_file(input_path, output_path);

        if kind == DocumentKind::Image {
            return Ok(Prepared::Image(file));
        }

        let mut page = Page::new(file, kind)?;
        let body = files::read_file(&page.file.full_input_path)?;
        page.populate(&body, &self.links)?;
        Ok(Prepared::Page(Box::new(page)))
    }

    /// Record `input_path` as the producer of `output_path`.
    fn claim(&mut self, output_path: &str, input_path: &str) -> Result<(), BuildError> {
        if let Some(first_input) = self.claimed.get(output_path) {
            return Err(BuildError::DuplicateOutput {
                output_path: output_path.to_string(),
                first_input: first_input.clone(),
            });
        }
        self.claimed
            .insert(output_path.to_string(), input_path.to_string());
        Ok(())
    }

    /// Claim the output path of a prepared file and place pages into the tree.
    pub fn insert(&mut self, prepared: Prepared) -> Result<Outcome, BuildError> {
        match prepared {
            Prepared::Skipped => Ok(Outcome::Skipped),
            Prepared::Image(file) => {
                self.claim(&file.output_path, &file.input_path)?;
                Ok(Outcome::Image {
                    output_path: file.output_path,
                })
            }
            Prepared::Page(page) => {
                self.claim(&page.html_path, &page.file.input_path)?;
                Ok(Outcome::Page(self.tree.add_page(*page)))
            }
        }
    }

    /// Prepare and insert a single file. Images are copied straight away.
    pub fn process_file(&mut self, input_path: &str) -> Result<Outcome, BuildError> {
        let prepared = self.prepare(input_path)?;
        let outcome = self.insert(prepared)?;
        if let Outcome::Image { output_path } = &outcome {
            self.copy_image(input_path, output_path)?;
        }
        Ok(outcome)
    }

    pub fn copy_image(&self, input_path: &str, output_path: &str) -> Result<(), BuildError> {
        let source = self.options.source_root.join(input_path);
        let destination = self.options.output_root.join(output_path);
        files::copy_file(&source, &destination)?;
        info!(input = input_path, output = output_path, "copied image");
        Ok(())
    }

    /// Full HTML document for a page, with the nav rendered around it.
    pub fn render_page(&self, id: PageId) -> Result<String, BuildError> {
        let page = self.tree.page(id);
        let nav_html = self.tree.get_as_nav_tree_html(Some(id));
        Ok(self.template.render(&page.title, &page.body_html, &nav_html)?)
    }

    /// Render a page and write it under the output root. Returns the written path.
    pub fn write_page(&self, id: PageId) -> Result<PathBuf, BuildError> {
        let html = self.render_page(id)?;
        let page = self.tree.page(id);
        let destination = self.options.output_root.join(&page.html_path);
        files::write_file(&html, &destination)?;
        info!(input = %page.file.input_path, output = %page.html_path, "wrote page");
        Ok(destination)
    }

    /// Build every file in `input_paths`, which should be sorted.
    pub fn run(&mut self, input_paths: &[String]) -> BuildReport {
        let mut report = BuildReport::default();

        let prepared: Vec<(&String, Result<Prepared, BuildError>)> = input_paths
            .par_iter()
            .map(|path| (path, self.prepare(path)))
            .collect();

        let mut images = Vec::new();
        for (path, result) in prepared {
            match result.and_then(|p| self.insert(p)) {
                Ok(Outcome::Skipped) => report.skipped.push(path.clone()),
                Ok(Outcome::Image { output_path }) => images.push(CopiedImage {
                    input_path: path.clone(),
                    output_path,
                }),
                Ok(Outcome::Page(_)) => {}
                Err(e) => report.fail(path, e),
            }
        }

        let copied: Vec<(CopiedImage, Result<(), BuildError>)> = images
            .into_par_iter()
            .map(|image| {
                let result = self.copy_image(&image.input_path, &image.output_path);
                (image, result)
            })
            .collect();

        for (image, result) in copied {
            match result {
                Ok(()) => report.images.push(image),
                Err(e) => report.fail(&image.input_path, e),
            }
        }

        let ids: Vec<PageId> = self.tree.page_ids().collect();
        let written: Vec<(PageId, Result<PathBuf, BuildError>)> = ids
            .par_iter()
            .map(|&id| (id, self.write_page(id)))
            .collect();

        for (id, result) in written {
            let page = self.tree.page(id);
            match result {
                Ok(_) => report.pages.push(WrittenPage {
                    input_path: page.file.input_path.clone(),
                    output_path: page.html_path.clone(),
                    title: page.title.clone(),
                }),
                Err(e) => report.fail(&page.file.input_path, e),
            }
        }

        report
    }
}

/// Collect every file under `source_root` that is not excluded.
///
/// Paths come back `/`-separated, relative to the root, sorted. Hidden
/// entries are skipped, and excluded directories are not descended into.
pub fn discover(source_root: &Path, excludes: &Excludes) -> Result<Vec<String>, BuildError> {
    if !source_root.is_dir() {
        return Err(BuildError::SourceNotFound(source_root.to_path_buf()));
    }

    let walker = WalkDir::new(source_root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            if entry.depth() == 0 {
                return true;
            }
            let hidden = entry.file_name().to_string_lossy().starts_with('.');
            !hidden && !excludes.should_skip_path(&relative_path(source_root, entry.path()))
        });

    let mut paths = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() > 0 => {
                warn!(error = %e, "skipping unreadable entry");
                continue;
            }
            Err(e) => return Err(e.into()),
        };
        if entry.file_type().is_file() {
            paths.push(relative_path(source_root, entry.path()));
        }
    }
    paths.sort();
    Ok(paths)
}

/// `/`-separated form of `path` relative to `root`.
fn relative_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Discover and build the whole source tree.
pub fn build(options: BuildOptions, template: PageTemplate) -> Result<BuildReport, BuildError> {
    let excludes = Excludes::new(&options.excludes)?;
    let inputs = discover(&options.source_root, &excludes)?;
    info!(
        files = inputs.len(),
        source = %options.source_root.display(),
        output = %options.output_root.display(),
        "building"
    );
    let mut assembler = Assembler::new(options, template);
    Ok(assembler.run(&inputs))
}

/// How a single file would be handled by a build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub input_path: String,
    pub kind: DocumentKind,
    /// Final location under the output root, `.html` for pages.
    pub output_path: Option<String>,
    pub error: Option<String>,
}

impl Classification {
    pub fn is_failure(&self) -> bool {
        self.error.is_some()
    }
}

/// Classify and resolve every file without reading or writing anything.
pub fn check(source_root: &Path, excludes: &Excludes) -> Result<Vec<Classification>, BuildError> {
    let inputs = discover(source_root, excludes)?;
    Ok(inputs.into_iter().map(|path| classify_path(&path)).collect())
}

/// Where `input_path` would end up.
pub fn classify_path(input_path: &str) -> Classification {
    let kind = classify(input_path);
    let resolved = match kind {
        DocumentKind::Skip => Ok(None),
        DocumentKind::Image => resolve_output_path(kind, input_path).map(Some),
        _ => resolve_output_path(kind, input_path)
            .and_then(|path| replace_md_extension_with_html(&path))
            .map(Some),
    };
    let (output_path, error) = match resolved {
        Ok(output_path) => (output_path, None),
        Err(e) => (None, Some(e.to_string())),
    };
    Classification {
        input_path: input_path.to_string(),
        kind,
        output_path,
        error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{TEST_TEMPLATE, write_tree};
    use tempfile::TempDir;

    fn assembler(tmp: &TempDir) -> Assembler {
        let options = BuildOptions {
            source_root: tmp.path().join("docs"),
            output_root: tmp.path().join("site"),
            repository: RepositoryConfig::default(),
            excludes: Vec::new(),
        };
        Assembler::new(options, PageTemplate::from_source(TEST_TEMPLATE).unwrap())
    }

    #[test]
    fn skip_files_are_not_read() {
        let tmp = TempDir::new().unwrap();
        let mut asm = assembler(&tmp);
        // Does not exist on disk; a read would fail.
        let outcome = asm.process_file("random/notes.txt").unwrap();
        assert_eq!(outcome, Outcome::Skipped);
        assert_eq!(asm.tree().page_count(), 0);
    }

    #[test]
    fn global_doc_is_inserted_into_tree() {
        let tmp = TempDir::new().unwrap();
        write_tree(&tmp.path().join("docs"), &[("global/help/support.md", "# Support")]);
        let mut asm = assembler(&tmp);

        let Outcome::Page(id) = asm.process_file("global/help/support.md").unwrap() else {
            panic!("expected a page");
        };

        let page = asm.tree().page(id);
        assert_eq!(page.title, "Support");
        assert_eq!(page.html_path, "help/support.html");
        assert_eq!(page.parent_folder, asm.tree().find_folder("help"));
    }

    #[test]
    fn links_above_package_root_are_clamped() {
        let tmp = TempDir::new().unwrap();
        write_tree(
            &tmp.path().join("docs"),
            &[
                ("packages/module-vpc/README.md", "See [elsewhere](../outside.md)."),
                ("packages/module-vpc/modules/vpc-app/_docs/module-doc.md", "# Doc"),
            ],
        );
        let mut asm = assembler(&tmp);

        let report = asm.run(&[
            "packages/module-vpc/README.md".to_string(),
            "packages/module-vpc/modules/vpc-app/_docs/module-doc.md".to_string(),
        ]);

        assert!(report.is_success(), "failures: {:?}", report.failures);
        assert_eq!(report.pages.len(), 2);
        let overview =
            std::fs::read_to_string(tmp.path().join("site/packages/module-vpc/overview.html"))
                .unwrap();
        assert!(overview.contains(
            r#"href="https://github.com/gruntwork-io/module-vpc/tree/master/outside.md""#
        ));
    }

    #[test]
    fn second_input_for_an_output_path_fails() {
        let tmp = TempDir::new().unwrap();
        write_tree(
            &tmp.path().join("docs"),
            &[
                ("packages/p/modules/m/README.md", "# From readme"),
                ("packages/p/modules/m/_docs/overview.md", "# From docs"),
            ],
        );
        let mut asm = assembler(&tmp);

        let report = asm.run(&[
            "packages/p/modules/m/README.md".to_string(),
            "packages/p/modules/m/_docs/overview.md".to_string(),
        ]);

        assert_eq!(report.pages.len(), 1);
        assert_eq!(report.pages[0].input_path, "packages/p/modules/m/README.md");
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].path, "packages/p/modules/m/_docs/overview.md");
        match &report.failures[0].error {
            BuildError::DuplicateOutput {
                output_path,
                first_input,
            } => {
                assert_eq!(output_path, "packages/p/m/overview.html");
                assert_eq!(first_input, "packages/p/modules/m/README.md");
            }
            other => panic!("expected DuplicateOutput, got {other:?}"),
        }
        assert_eq!(asm.tree().page_count(), 1);
        let html =
            std::fs::read_to_string(tmp.path().join("site/packages/p/m/overview.html")).unwrap();
        assert!(html.contains("From readme"));
        assert_eq!(html.matches(r#"class="nav-page"#).count(), 1);
    }

    #[test]
    fn colliding_images_keep_the_first_copy() {
        let tmp = TempDir::new().unwrap();
        write_tree(
            &tmp.path().join("docs"),
            &[
                ("packages/p/modules/m/_docs/images/a.png", "from docs"),
                ("packages/p/modules/m/images/a.png", "from module"),
            ],
        );
        let mut asm = assembler(&tmp);

        let report = asm.run(&[
            "packages/p/modules/m/_docs/images/a.png".to_string(),
            "packages/p/modules/m/images/a.png".to_string(),
        ]);

        assert_eq!(report.images.len(), 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].path, "packages/p/modules/m/images/a.png");
        assert!(matches!(
            report.failures[0].error,
            BuildError::DuplicateOutput { .. }
        ));
        let copied = std::fs::read_to_string(tmp.path().join("site/packages/p/m/images/a.png")).unwrap();
        assert_eq!(copied, "from docs");
    }

    #[test]
    fn nested_module_docs_are_skipped() {
        let tmp = TempDir::new().unwrap();
        let mut asm = assembler(&tmp);
        let report = asm.run(&["packages/module-vpc/modules/vpc-app/_docs/sub/deep.md".to_string()]);
        assert!(report.is_success());
        assert_eq!(report.skipped.len(), 1);
    }

    #[test]
    fn missing_source_fails_that_file() {
        let tmp = TempDir::new().unwrap();
        let mut asm = assembler(&tmp);
        let report = asm.run(&["global/help/gone.md".to_string()]);
        assert!(!report.is_success());
        assert!(matches!(
            report.failures[0].error,
            BuildError::File(FileError::Read { .. })
        ));
    }

    #[test]
    fn images_are_copied() {
        let tmp = TempDir::new().unwrap();
        write_tree(&tmp.path().join("docs"), &[("global/help/images/sample.png", "PNG")]);
        let mut asm = assembler(&tmp);

        let outcome = asm.process_file("global/help/images/sample.png").unwrap();

        assert_eq!(
            outcome,
            Outcome::Image {
                output_path: "help/images/sample.png".into()
            }
        );
        let copied = std::fs::read_to_string(tmp.path().join("site/help/images/sample.png")).unwrap();
        assert_eq!(copied, "PNG");
    }

    #[test]
    fn rendered_page_has_nav_with_itself_active() {
        let tmp = TempDir::new().unwrap();
        write_tree(
            &tmp.path().join("docs"),
            &[
                ("global/a/b/x.md", "x body"),
                ("global/a/y.md", "y body"),
                ("global/a/z.md", "z body"),
            ],
        );
        let mut asm = assembler(&tmp);
        let Outcome::Page(x) = asm.process_file("global/a/b/x.md").unwrap() else {
            panic!("expected a page");
        };
        asm.process_file("global/a/y.md").unwrap();

        let html = asm.render_page(x).unwrap();

        assert!(html.starts_with("<title>X</title>"));
        assert!(html.contains("<p>x body</p>"));
        assert!(html.contains(r#"<li class="nav-page active"><a href="/a/b/x.html">X</a></li>"#));
        assert!(html.contains(r#"<li class="nav-page"><a href="/a/y.html">Y</a></li>"#));
    }

    #[test]
    fn discover_prunes_hidden_and_excluded() {
        let tmp = TempDir::new().unwrap();
        let docs = tmp.path().join("docs");
        write_tree(
            &docs,
            &[
                ("global/help/support.md", ""),
                ("global/drafts/wip.md", ""),
                ("global/.git/config", ""),
                ("packages/p/README.md", ""),
                (".hidden.md", ""),
            ],
        );
        let excludes = Excludes::new(&["global/drafts".to_string()]).unwrap();

        let paths = discover(&docs, &excludes).unwrap();

        assert_eq!(paths, vec!["global/help/support.md", "packages/p/README.md"]);
    }

    #[test]
    fn discover_missing_root() {
        let tmp = TempDir::new().unwrap();
        let result = discover(&tmp.path().join("nope"), &Excludes::default());
        assert!(matches!(result, Err(BuildError::SourceNotFound(_))));
    }

    #[test]
    fn classify_path_reports_outcome() {
        let cases = [
            ("global/help/support.md", DocumentKind::GlobalDoc, Some("help/support.html"), false),
            ("global/help/images/a.png", DocumentKind::Image, Some("help/images/a.png"), false),
            ("random/notes.txt", DocumentKind::Skip, None, false),
            (
                "packages/module-vpc/modules/vpc-app/_docs/sub/deep.md",
                DocumentKind::Skip,
                None,
                false,
            ),
        ];
        for (input, kind, output, failed) in cases {
            let c = classify_path(input);
            assert_eq!(c.kind, kind, "input = {input}");
            assert_eq!(c.output_path.as_deref(), output, "input = {input}");
            assert_eq!(c.is_failure(), failed, "input = {input}");
        }
    }
}
