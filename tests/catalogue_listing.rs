#![allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
//! Snapshot of the path catalogue.
//!
//! Any addition, removal, rename or reordering of a catalogue entry changes
//! what `create` produces and what `uninstall` expects, so it must show up
//! as a deliberate snapshot update.

use rscaffold_cli::catalogue::{Catalogue, PathKind};

#[test]
fn catalogue_listing() {
    let catalogue = Catalogue::compute("demo");
    insta::assert_snapshot!("catalogue_listing", catalogue.listing());
}

/// Only the `.Rproj` file depends on the project name.
#[test]
fn only_rproj_is_parameterized() {
    let catalogue = Catalogue::compute("paper2");
    let parameterized: Vec<_> = catalogue.iter().filter(|e| e.parameterized).collect();
    assert_eq!(parameterized.len(), 1);
    assert_eq!(parameterized[0].path.to_str(), Some("paper2.Rproj"));
    assert_eq!(parameterized[0].kind, PathKind::TemplateFile);
}
