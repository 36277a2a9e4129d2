//! Canonical path catalogue.
//!
//! Every path the tool can create for a project, relative to the project
//! root.  The catalogue is computed once per invocation because one entry
//! embeds the project name.
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Directories, parents before children.
pub const DIRECTORIES: &[&str] = &[
    "R",
    "man",
    "tests",
    "tests/testthat",
    "vignettes",
    "analysis",
    "analysis/data",
    "analysis/data/raw_data",
    "analysis/data/derived_data",
    "analysis/paper",
    "analysis/figures",
    "analysis/tables",
    "analysis/scripts",
    "docs",
    ".github",
    ".github/workflows",
];

/// Files with fixed content.
pub const FILES: &[&str] = &[
    "NAMESPACE",
    ".gitignore",
    ".Rbuildignore",
    ".dockerignore",
    "tests/testthat.R",
    "analysis/data/raw_data/README.md",
];

/// Files rendered from templates.  The `.Rproj` file is added separately.
pub const TEMPLATE_FILES: &[&str] = &[
    "DESCRIPTION",
    "README.md",
    "LICENSE",
    "Dockerfile",
    "Makefile",
    "analysis/paper/paper.Rmd",
    ".github/workflows/r-package.yml",
    ".github/workflows/render-paper.yml",
];

/// Navigation shortcuts as `(link, relative target)`.
pub const SYMLINKS: &[(&str, &str)] = &[
    ("a", "analysis"),
    ("d", "analysis/data"),
    ("p", "analysis/paper"),
    ("f", "analysis/figures"),
    ("s", "analysis/scripts"),
    ("t", "tests"),
];

/// Personal configuration files copied from the dotfiles directory.
pub const DOTFILES: &[&str] = &[".vimrc", ".zshrc", ".bashrc", ".gitconfig", ".tmux.conf", ".lintr"];

/// Kind of artifact at a catalogue path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathKind {
    /// A directory.
    Directory,
    /// A file with fixed content.
    File,
    /// A file rendered from a template.
    TemplateFile,
    /// A relative symbolic link.
    Symlink,
    /// A file copied from the dotfiles directory.
    Dotfile,
}

impl PathKind {
    /// `true` for kinds that materialize as a regular file.
    #[must_use]
    pub const fn is_file_like(self) -> bool {
        matches!(self, Self::File | Self::TemplateFile | Self::Dotfile)
    }

    /// Lower-case label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Directory => "directory",
            Self::File => "file",
            Self::TemplateFile => "template",
            Self::Symlink => "symlink",
            Self::Dotfile => "dotfile",
        }
    }
}

impl fmt::Display for PathKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

/// One path the tool may create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalPath {
    /// Path relative to the project root.
    pub path: PathBuf,
    /// Artifact kind.
    pub kind: PathKind,
    /// Whether the path embeds the project name.
    pub parameterized: bool,
}

impl CanonicalPath {
    fn fixed(path: &str, kind: PathKind) -> Self {
        Self {
            path: PathBuf::from(path),
            kind,
            parameterized: false,
        }
    }

    /// Link target for symlink entries.
    #[must_use]
    pub fn symlink_target(&self) -> Option<&'static str> {
        if self.kind != PathKind::Symlink {
            return None;
        }
        SYMLINKS
            .iter()
            .find(|(link, _)| Path::new(link) == self.path)
            .map(|(_, target)| *target)
    }
}

/// The full set of paths for one project name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalogue {
    project: String,
    entries: Vec<CanonicalPath>,
}

impl Catalogue {
    /// Compute the catalogue for `project_name`.
    #[must_use]
    pub fn compute(project_name: &str) -> Self {
        let mut entries = Vec::new();
        entries.extend(
            DIRECTORIES
                .iter()
                .map(|p| CanonicalPath::fixed(p, PathKind::Directory)),
        );
        entries.extend(FILES.iter().map(|p| CanonicalPath::fixed(p, PathKind::File)));
        entries.extend(
            TEMPLATE_FILES
                .iter()
                .map(|p| CanonicalPath::fixed(p, PathKind::TemplateFile)),
        );
        entries.push(CanonicalPath {
            path: PathBuf::from(format!("{project_name}.Rproj")),
            kind: PathKind::TemplateFile,
            parameterized: true,
        });
        entries.extend(
            SYMLINKS
                .iter()
                .map(|(link, _)| CanonicalPath::fixed(link, PathKind::Symlink)),
        );
        entries.extend(
            DOTFILES
                .iter()
                .map(|p| CanonicalPath::fixed(p, PathKind::Dotfile)),
        );
        Self {
            project: project_name.to_string(),
            entries,
        }
    }

    /// Project name the catalogue was computed for.
    #[must_use]
    pub fn project(&self) -> &str {
        &self.project
    }

    /// All entries in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &CanonicalPath> {
        self.entries.iter()
    }

    /// Entries of one kind.
    pub fn of_kind(&self, kind: PathKind) -> impl Iterator<Item = &CanonicalPath> {
        self.entries.iter().filter(move |e| e.kind == kind)
    }

    /// Look up the entry for a relative path.
    #[must_use]
    pub fn get(&self, path: &Path) -> Option<&CanonicalPath> {
        self.entries.iter().find(|e| e.path == path)
    }

    /// `true` when `path` is in the catalogue.
    #[must_use]
    pub fn contains(&self, path: &Path) -> bool {
        self.get(path).is_some()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` when the catalogue has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// One line per entry: `<kind> <path>` (symlinks show their target).
    #[must_use]
    pub fn listing(&self) -> String {
        let mut out = String::new();
        for entry in &self.entries {
            let path = entry.path.display();
            match entry.symlink_target() {
                Some(target) => out.push_str(&format!("{:<9} {path} -> {target}\n", entry.kind)),
                None => out.push_str(&format!("{:<9} {path}\n", entry.kind)),
            }
        }
        out
    }
}
