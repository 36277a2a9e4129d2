//! Embedded file contents and `${VAR}` rendering.
use std::collections::BTreeMap;
use std::path::Path;

/// Fixed-content files keyed by catalogue path.
const STATIC_FILES: &[(&str, &str)] = &[
    ("NAMESPACE", include_str!("../templates/static/NAMESPACE")),
    (".gitignore", include_str!("../templates/static/gitignore")),
    (".Rbuildignore", include_str!("../templates/static/Rbuildignore")),
    (".dockerignore", include_str!("../templates/static/dockerignore")),
    ("tests/testthat.R", include_str!("../templates/static/testthat.R")),
    (
        "analysis/data/raw_data/README.md",
        include_str!("../templates/static/raw_data_README.md"),
    ),
];

/// Templates keyed by catalogue path.
const TEMPLATES: &[(&str, &str)] = &[
    ("DESCRIPTION", include_str!("../templates/DESCRIPTION")),
    ("README.md", include_str!("../templates/README.md")),
    ("LICENSE", include_str!("../templates/LICENSE")),
    ("Dockerfile", include_str!("../templates/Dockerfile")),
    ("Makefile", include_str!("../templates/Makefile")),
    ("analysis/paper/paper.Rmd", include_str!("../templates/paper.Rmd")),
    (
        ".github/workflows/r-package.yml",
        include_str!("../templates/r-package.yml"),
    ),
    (
        ".github/workflows/render-paper.yml",
        include_str!("../templates/render-paper.yml"),
    ),
];

const RPROJ_TEMPLATE: &str = include_str!("../templates/project.Rproj");

/// Raw contents for a file or template path.
///
/// Any `*.Rproj` path maps to the project file template.
#[must_use]
pub fn source_for(path: &Path) -> Option<&'static str> {
    if path.extension().is_some_and(|ext| ext == "Rproj") && path.parent() == Some(Path::new("")) {
        return Some(RPROJ_TEMPLATE);
    }
    STATIC_FILES
        .iter()
        .chain(TEMPLATES)
        .find(|(p, _)| Path::new(p) == path)
        .map(|(_, body)| *body)
}

/// Output of [`render`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    /// Rendered text.
    pub text: String,
    /// Placeholders left in place because no value was available, in order
    /// of first appearance.
    pub unresolved: Vec<String>,
}

/// Substitute `${NAME}` placeholders.
///
/// `NAME` must start with a letter or `_` and contain only ASCII
/// alphanumerics and `_`; anything else (`${{ expr }}`, `$(VAR)`, `$VAR`) is
/// copied verbatim.  Unknown names are left as the literal placeholder.
#[must_use]
pub fn render(template: &str, vars: &BTreeMap<String, String>) -> Rendered {
    let mut text = String::with_capacity(template.len());
    let mut unresolved: Vec<String> = Vec::new();
    let mut rest = template;

    while let Some(start) = rest.find("${") {
        let (before, after) = rest.split_at(start);
        text.push_str(before);
        let body = after.get(2..).unwrap_or("");
        let name_len = placeholder_len(body);
        let closed = name_len > 0 && body.get(name_len..).is_some_and(|s| s.starts_with('}'));
        if !closed {
            text.push_str("${");
            rest = body;
            continue;
        }
        let name = body.get(..name_len).unwrap_or("");
        match vars.get(name) {
            Some(value) => text.push_str(value),
            None => {
                text.push_str("${");
                text.push_str(name);
                text.push('}');
                if !unresolved.iter().any(|u| u == name) {
                    unresolved.push(name.to_string());
                }
            }
        }
        rest = body.get(name_len + 1..).unwrap_or("");
    }
    text.push_str(rest);

    Rendered { text, unresolved }
}

/// Length of a valid placeholder name at the start of `s`.
fn placeholder_len(s: &str) -> usize {
    let mut chars = s.char_indices();
    match chars.next() {
        Some((_, c)) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return 0,
    }
    chars
        .find(|(_, c)| !(c.is_ascii_alphanumeric() || *c == '_'))
        .map_or(s.len(), |(idx, _)| idx)
}
