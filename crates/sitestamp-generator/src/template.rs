//! HTML templates for generated pages.
//!
//! A lightweight template system using string interpolation. Index and
//! category templates live as files in each subsite's template directory.

use std::{
    collections::{BTreeMap, HashMap},
    path::{Path, PathBuf},
};

use thiserror::Error;

/// File name of the index page template.
pub const INDEX_TEMPLATE: &str = "index_template.html";

/// File name of the category page template.
pub const CATEGORY_TEMPLATE: &str = "category_template.html";

/// Template rendering errors.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// Missing required variable.
    #[error("missing required variable '{variable}' in template {template}")]
    MissingVariable { template: String, variable: String },

    /// Template file not found.
    #[error("template not found: {0}")]
    NotFound(PathBuf),

    /// Invalid template syntax.
    #[error("invalid template syntax in {template}: {message}")]
    InvalidSyntax { template: String, message: String },

    /// IO error reading a template.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for template operations.
pub type Result<T> = std::result::Result<T, TemplateError>;

/// Template context with variables for interpolation.
#[derive(Debug, Clone, Default)]
pub struct TemplateContext {
    variables: HashMap<String, String>,
}

impl TemplateContext {
    /// Create a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a variable into the context.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.variables.insert(key.into(), value.into());
    }

    /// Create context with initial variables.
    #[must_use]
    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Add every entry of `extra`, overriding existing keys.
    #[must_use]
    pub fn extend(mut self, extra: &BTreeMap<String, String>) -> Self {
        for (key, value) in extra {
            self.insert(key.clone(), value.clone());
        }
        self
    }

    /// Get a variable value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.variables.get(key).map(String::as_str)
    }

}

/// A simple template that supports variable interpolation.
///
/// Variables are written as `{{ variable_name }}`. A trailing `?`
/// (`{{ variable_name? }}`) renders an absent variable as the empty string.
#[derive(Debug, Clone)]
pub struct Template {
    name: String,
    content: String,
}

impl Template {
    /// Create a new template with the given name and content.
    #[must_use]
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    /// Load a template file. Line endings are normalized to `\n`.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(TemplateError::NotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?.replace("\r\n", "\n");
        Ok(Self::new(path.display().to_string(), content))
    }

    /// Render the template with the given context.
    ///
    /// Replaces all `{{ variable }}` placeholders with values from context.
    /// Substituted values are not scanned for further placeholders.
    pub fn render(&self, context: &TemplateContext) -> Result<String> {
        let mut result = self.content.clone();
        let mut pos = 0;

        while let Some(start) = result[pos..].find("{{") {
            let start = pos + start;
            let end = result[start..]
                .find("}}")
                .ok_or_else(|| TemplateError::InvalidSyntax {
                    template: self.name.clone(),
                    message: "unclosed {{ delimiter".to_string(),
                })?;
            let end = start + end + 2;

            let var_name = result[start + 2..end - 2].trim();

            let (var_name, optional) = if let Some(stripped) = var_name.strip_suffix('?') {
                (stripped, true)
            } else {
                (var_name, false)
            };

            let value = match context.get(var_name) {
                Some(v) => v.to_string(),
                None if optional => String::new(),
                None => {
                    return Err(TemplateError::MissingVariable {
                        template: self.name.clone(),
                        variable: var_name.to_string(),
                    });
                }
            };

            result.replace_range(start..end, &value);
            pos = start + value.len();
        }

        Ok(result)
    }
}

/// The two templates a subsite renders with.
#[derive(Debug, Clone)]
pub struct TemplateSet {
    pub index: Template,
    pub category: Template,
}

impl TemplateSet {
    /// Load [`INDEX_TEMPLATE`] and [`CATEGORY_TEMPLATE`] from `dir`.
    pub fn load(dir: &Path) -> Result<Self> {
        Ok(Self {
            index: Template::load(&dir.join(INDEX_TEMPLATE))?,
            category: Template::load(&dir.join(CATEGORY_TEMPLATE))?,
        })
    }
}
