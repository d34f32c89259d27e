//! Navigation tree.
//!
//! Pages arrive in no particular order, so folders are created lazily as
//! pages are inserted: a page at `a/b/c/x.md` creates `a`, `a/b` and `a/b/c`
//! if they do not exist yet, and reuses them if they do.
//!
//! The tree is an arena. Folders and pages are addressed by [`FolderId`] and
//! [`PageId`]; a child holds its parent's id rather than a reference, so the
//! tree owns everything from the root down and contains no cycles.
//!
//! ## Rendering
//!
//! [`NavTree::render_nav`] is read-only and may be called once per page
//! against the same tree. Within a folder, subfolders come first in name
//! order, then pages in title order. The active page gets the `active` class
//! and every folder on the path to it gets `open`.

use crate::page::Page;
use maud::{Markup, html};
use std::collections::{BTreeMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FolderId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageId(usize);

/// A folder of the navigation tree.
#[derive(Debug, Clone)]
pub struct Folder {
    pub name: String,
    /// `a/b` for folder `b` under `a`; empty for the root.
    pub output_path: String,
    pub subfolders: BTreeMap<String, FolderId>,
    /// In insertion order.
    pub pages: Vec<PageId>,
    /// `None` only for the root.
    pub parent: Option<FolderId>,
}

impl Folder {
    fn new(name: &str, output_path: String, parent: Option<FolderId>) -> Self {
        Self {
            name: name.to_string(),
            output_path,
            subfolders: BTreeMap::new(),
            pages: Vec::new(),
            parent,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NavTree {
    folders: Vec<Folder>,
    pages: Vec<Page>,
}

impl Default for NavTree {
    fn default() -> Self {
        Self::new()
    }
}

impl NavTree {
    pub const ROOT: FolderId = FolderId(0);

    pub fn new() -> Self {
        Self {
            folders: vec![Folder::new("", String::new(), None)],
            pages: Vec::new(),
        }
    }

    pub fn root(&self) -> &Folder {
        &self.folders[Self::ROOT.0]
    }

    pub fn folder(&self, id: FolderId) -> &Folder {
        &self.folders[id.0]
    }

    pub fn page(&self, id: PageId) -> &Page {
        &self.pages[id.0]
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn page_ids(&self) -> impl Iterator<Item = PageId> + '_ {
        (0..self.pages.len()).map(PageId)
    }

    /// Look up a folder by its `/`-separated path.
    pub fn find_folder(&self, path: &str) -> Option<FolderId> {
        let mut current = Self::ROOT;
        for segment in segments(path) {
            current = *self.folder(current).subfolders.get(segment)?;
        }
        Some(current)
    }

    /// Walk `path` from the root, creating missing folders, and return the last one.
    ///
    /// An empty path (or `.`) is the root.
    pub fn create_folder_if_not_exist(&mut self, path: &str) -> FolderId {
        let mut current = Self::ROOT;
        for segment in segments(path) {
            current = match self.folder(current).subfolders.get(segment) {
                Some(&existing) => existing,
                None => self.create_subfolder(current, segment),
            };
        }
        current
    }

    fn create_subfolder(&mut self, parent: FolderId, name: &str) -> FolderId {
        let id = FolderId(self.folders.len());
        let parent_path = &self.folder(parent).output_path;
        let output_path = if parent_path.is_empty() {
            name.to_string()
        } else {
            format!("{parent_path}/{name}")
        };
        self.folders.push(Folder::new(name, output_path, Some(parent)));
        self.folders[parent.0].subfolders.insert(name.to_string(), id);
        id
    }

    /// Append `page` to `folder`.
    pub fn add_page_to(&mut self, folder: FolderId, mut page: Page) -> PageId {
        let id = PageId(self.pages.len());
        page.parent_folder = Some(folder);
        self.pages.push(page);
        self.folders[folder.0].pages.push(id);
        id
    }

    /// Insert `page` under the folder holding its output path.
    pub fn add_page(&mut self, page: Page) -> PageId {
        let folder = self.create_folder_if_not_exist(containing_folder(&page.file.output_path));
        self.add_page_to(folder, page)
    }

    /// `folder` followed by each of its ancestors up to the root.
    pub fn ancestors(&self, folder: FolderId) -> impl Iterator<Item = FolderId> + '_ {
        std::iter::successors(Some(folder), |&id| self.folder(id).parent)
    }

    /// Render the whole tree with `active` marked.
    pub fn render_nav(&self, active: Option<PageId>) -> Markup {
        let open: HashSet<FolderId> = active
            .and_then(|id| self.page(id).parent_folder)
            .map(|folder| self.ancestors(folder).collect())
            .unwrap_or_default();

        html! {
            nav.nav-tree {
                (self.render_folder(Self::ROOT, active, &open))
            }
        }
    }

    /// [`render_nav`](Self::render_nav) as a string, ready for a template.
    pub fn get_as_nav_tree_html(&self, active: Option<PageId>) -> String {
        self.render_nav(active).into_string()
    }

    fn render_folder(&self, id: FolderId, active: Option<PageId>, open: &HashSet<FolderId>) -> Markup {
        let folder = self.folder(id);
        let mut pages: Vec<PageId> = folder.pages.clone();
        pages.sort_by(|a, b| {
            let (a, b) = (self.page(*a), self.page(*b));
            a.title
                .cmp(&b.title)
                .then_with(|| a.file.output_path.cmp(&b.file.output_path))
        });

        html! {
            ul {
                @for (name, &child) in &folder.subfolders {
                    li.nav-folder.open[open.contains(&child)] {
                        span.nav-folder-name { (name) }
                        (self.render_folder(child, active, open))
                    }
                }
                @for page_id in pages {
                    @let page = self.page(page_id);
                    li.nav-page.active[active == Some(page_id)] {
                        a href=(page.href()) { (page.title) }
                    }
                }
            }
        }
    }
}

/// Non-empty path segments, ignoring `.`.
fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty() && *s != ".")
}

/// `a/b/x.md` → `a/b`; `x.md` → ``
pub fn containing_folder(path: &str) -> &str {
    path.rsplit_once('/').map_or("", |(dir, _)| dir)
}
