//! Category graph extraction and consistency checks.
//!
//! Articles declare their categories as links inside a `.categories`
//! container. The first link to a name fixes the category's file path; every
//! later link must agree, in both directions.

use std::{
    collections::{BTreeMap, HashMap},
    path::{Path, PathBuf},
};

use sitestamp_core::{
    CoreError, Result,
    guard::validate_and_collect,
    paths::normalize_lexically,
};
use tracing::debug;

use crate::dom::Dom;

/// Class of the element holding an article's category links.
pub const CATEGORIES_CLASS: &str = "categories";

/// Directory of generated category pages within a subsite.
pub const CATEGORIES_DIR: &str = "categories";

/// A category reference declared by an article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryLink {
    /// Display name, the link text.
    pub name: String,
    /// Absolute, lexically normalized target of the link.
    pub path: PathBuf,
}

/// Read the category links of the article at `article_path`.
///
/// No container means no categories. A link without `href` is a structure
/// error.
pub fn category_links(dom: &Dom, article_path: &Path) -> Result<Vec<CategoryLink>> {
    let Some(container) = dom.find_by_class(CATEGORIES_CLASS) else {
        return Ok(Vec::new());
    };
    let article_dir = article_path.parent().unwrap_or(Path::new(""));

    container
        .find_all_by_tag("a")
        .into_iter()
        .map(|a| {
            let href = a.attr("href").ok_or_else(|| {
                CoreError::structure(article_path, "category link without href")
            })?;
            Ok(CategoryLink {
                name: a.text(),
                path: normalize_lexically(&article_dir.join(href)),
            })
        })
        .collect()
}

/// One category and the articles that reference it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryNode {
    pub name: String,
    pub path: PathBuf,
    /// Indices of member articles, in the order they were added.
    pub members: Vec<usize>,
}

/// Categories of one subsite, keyed both by name and by path.
#[derive(Debug, Default)]
pub struct CategoryGraph {
    by_name: BTreeMap<String, CategoryNode>,
    by_path: HashMap<PathBuf, String>,
}

impl CategoryGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that article `index`, located at `article_path`, references
    /// `links`.
    pub fn add_article(
        &mut self,
        index: usize,
        article_path: &Path,
        links: &[CategoryLink],
    ) -> Result<()> {
        for link in links {
            if let Some(node) = self.by_name.get(&link.name) {
                if node.path != link.path {
                    return Err(CoreError::consistency(
                        article_path,
                        format!(
                            "category path drift: {:?} links to {} but was first bound to {}",
                            link.name,
                            link.path.display(),
                            node.path.display()
                        ),
                    ));
                }
            } else if let Some(bound) = self.by_path.get(&link.path) {
                return Err(CoreError::consistency(
                    article_path,
                    format!(
                        "category naming drift: {} is named {:?} but was first bound to {:?}",
                        link.path.display(),
                        link.name,
                        bound
                    ),
                ));
            } else {
                debug!(name = %link.name, path = %link.path.display(), "new category");
                self.by_path.insert(link.path.clone(), link.name.clone());
            }

            let node = self
                .by_name
                .entry(link.name.clone())
                .or_insert_with(|| CategoryNode {
                    name: link.name.clone(),
                    path: link.path.clone(),
                    members: Vec::new(),
                });
            if node.members.last() != Some(&index) {
                node.members.push(index);
            }
        }
        Ok(())
    }

    /// Fail if `dir` holds a page no category is bound to. A missing
    /// directory holds no orphans.
    pub fn verify_no_orphans(&self, dir: &Path) -> Result<()> {
        if !dir.is_dir() {
            return Ok(());
        }

        let mut found = validate_and_collect(dir, &[], &[], true)?;
        found.sort();
        for path in found {
            let path = normalize_lexically(&path);
            if !self.by_path.contains_key(&path) {
                return Err(CoreError::consistency(path, "orphaned category page"));
            }
        }
        Ok(())
    }

    /// Look up a category by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&CategoryNode> {
        self.by_name.get(name)
    }

    /// Categories sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = &CategoryNode> {
        self.by_name.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}
