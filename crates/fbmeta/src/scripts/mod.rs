//! Script repository: the on-disk layout of one-file-per-object DDL scripts.
//!
//! ```text
//! <root>/
//!   domains/<NAME>.sql
//!   tables/<NAME>.sql
//!   procedures/<NAME>.sql
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;

/// Script category. Declaration order is the order scripts are applied in:
/// tables reference domains, procedures reference both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptCategory {
    Domain,
    Table,
    Procedure,
}

impl ScriptCategory {
    /// All categories in apply order.
    pub const ALL: [ScriptCategory; 3] = [
        ScriptCategory::Domain,
        ScriptCategory::Table,
        ScriptCategory::Procedure,
    ];

    /// Subdirectory name under the scripts root.
    pub fn dir_name(&self) -> &'static str {
        match self {
            ScriptCategory::Domain => "domains",
            ScriptCategory::Table => "tables",
            ScriptCategory::Procedure => "procedures",
        }
    }
}

impl std::fmt::Display for ScriptCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// One script: the complete DDL for one object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptArtifact {
    pub category: ScriptCategory,
    pub object_name: String,
    pub text: String,
}

impl ScriptArtifact {
    pub fn new(category: ScriptCategory, object_name: &str, text: String) -> Self {
        Self {
            category,
            object_name: object_name.to_string(),
            text,
        }
    }

    /// `<object_name>.sql`, with path separators replaced so a quoted
    /// identifier can never escape its category directory.
    pub fn file_name(&self) -> String {
        let safe: String = self
            .object_name
            .chars()
            .map(|c| if matches!(c, '/' | '\\' | '\0') { '_' } else { c })
            .collect();
        format!("{}.sql", safe)
    }
}

/// A scripts directory tree.
#[derive(Debug, Clone)]
pub struct ScriptRepository {
    root: PathBuf,
}

impl ScriptRepository {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn category_dir(&self, category: ScriptCategory) -> PathBuf {
        self.root.join(category.dir_name())
    }

    /// `*.sql` files in a category, sorted by file name. A missing category
    /// directory is treated as empty; anything else at that path is an error.
    pub fn list(&self, category: ScriptCategory) -> Result<Vec<PathBuf>> {
        let dir = self.category_dir(category);
        if !dir.exists() {
            debug!("No {} directory at {:?}", category, dir);
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            let is_sql = path
                .extension()
                .map(|ext| ext.eq_ignore_ascii_case("sql"))
                .unwrap_or(false);
            if is_sql && path.is_file() {
                files.push(path);
            }
        }
        files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        Ok(files)
    }

    /// Read a script's text.
    pub fn read(&self, path: &Path) -> Result<String> {
        Ok(fs::read_to_string(path)?)
    }

    /// Delete any existing tree at the root and create an empty layout.
    pub fn recreate(&self) -> Result<()> {
        if self.root.exists() {
            debug!("Removing existing output directory {:?}", self.root);
            fs::remove_dir_all(&self.root)?;
        }
        for category in ScriptCategory::ALL {
            fs::create_dir_all(self.category_dir(category))?;
        }
        Ok(())
    }

    /// Write one artifact, replacing any existing file of the same name.
    pub fn write(&self, artifact: &ScriptArtifact) -> Result<PathBuf> {
        let dir = self.category_dir(artifact.category);
        fs::create_dir_all(&dir)?;
        let path = dir.join(artifact.file_name());
        fs::write(&path, &artifact.text)?;
        Ok(path)
    }
}
