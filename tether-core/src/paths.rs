//! Path resolver — pure mapping from source paths to artifact paths.
//!
//! Everything in this module is deterministic and does no I/O. Paths are
//! normalized to forward slashes so the same source identity resolves to the
//! same artifact path regardless of which separator the host delivered.

use std::path::{Path, PathBuf};

/// Forward-slash canonical form of a path.
pub fn normalize_slashes(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// The canonical artifact path for a source path: same directory, same stem,
/// `artifact_ext` in place of the source extension.
///
/// `expected_artifact_path("Scripts/Foo.src", "art")` → `Scripts/Foo.art`.
pub fn expected_artifact_path(source: &Path, artifact_ext: &str) -> PathBuf {
    let norm = normalize_slashes(source);
    let (dir, file) = match norm.rfind('/') {
        Some(i) => (&norm[..=i], &norm[i + 1..]),
        None => ("", norm.as_str()),
    };
    // A leading dot is part of the name, not an extension separator.
    let stem = match file.rfind('.') {
        Some(0) | None => file,
        Some(i) => &file[..i],
    };
    PathBuf::from(format!("{dir}{stem}.{artifact_ext}"))
}

/// Characters stripped outright from human-entered identifiers.
const STRIPPED: &str = "()[]{}<>+*/\\|!?&%$^~=,;:'\"`@";

/// Sanitize a human-entered display name into a safe artifact identifier.
///
/// Spaces are removed, `#` becomes `Sharp`, `-` becomes `_`, and bracket or
/// operator punctuation is dropped. Total: every input maps to exactly one
/// output.
pub fn sanitize_identifier(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for ch in name.chars() {
        match ch {
            ' ' => {}
            '#' => out.push_str("Sharp"),
            '-' => out.push('_'),
            c if STRIPPED.contains(c) => {}
            c => out.push(c),
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
