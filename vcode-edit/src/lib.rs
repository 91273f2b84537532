//! Edit engine for Android manifests.
//!
//! Responsibilities:
//! - Validate a manifest and rewrite `android:versionCode` on its root element.
//! - Leave every other byte of the document untouched.
//! - Generate a unified diff preview and optionally back up the original.

mod error;
mod scan;

pub use error::{MalformedManifest, PatchError};

use camino::Utf8Path;
use diffy::PatchFormatter;
use fs_err as fs;
use scan::{RootTag, scan_document};
use std::io::ErrorKind;
use vcode_types::diagnostics::Diagnostics;
use vcode_types::{ANDROID_NAMESPACE, VERSION_CODE_ATTRIBUTE};

const BOM: char = '\u{feff}';

#[derive(Debug, Clone)]
pub struct PatchOptions {
    /// Compute the outcome and diff without touching the file.
    pub dry_run: bool,
    /// Copy the original next to itself before overwriting it.
    pub backup_enabled: bool,
    pub backup_suffix: String,
}

impl Default for PatchOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            backup_enabled: false,
            backup_suffix: ".vcode.bak".to_string(),
        }
    }
}

/// Result of patching a document held in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentPatch {
    pub text: String,
    /// Raw attribute value before the patch, if the attribute existed.
    pub previous: Option<String>,
    pub changed: bool,
}

/// Set `android:versionCode` on the root element of `text` to `value`.
///
/// The new value is spliced into the original text: quoting style, attribute
/// order, whitespace and every other node survive unchanged. A missing
/// attribute is appended after the last one, declaring `xmlns:android` when
/// the root does not bind the namespace yet.
pub fn patch_content(text: &str, value: u32) -> Result<ContentPatch, MalformedManifest> {
    let body = text.strip_prefix(BOM).unwrap_or(text);
    let offset = text.len() - body.len();
    let root = scan_document(body)?;
    let new_value = value.to_string();

    let splice = plan_splice(body, &root, &new_value)?;
    let (range, replacement, previous) = match splice {
        Splice::Replace { range, previous } => (range, new_value.clone(), Some(previous)),
        Splice::Insert { at, text } => (at..at, text, None),
    };

    let mut out = String::with_capacity(text.len() + replacement.len());
    out.push_str(&text[..offset + range.start]);
    out.push_str(&replacement);
    out.push_str(&text[offset + range.end..]);

    let changed = out != text;
    Ok(ContentPatch {
        text: out,
        previous,
        changed,
    })
}

enum Splice {
    Replace {
        range: std::ops::Range<usize>,
        previous: String,
    },
    Insert {
        at: usize,
        text: String,
    },
}

fn plan_splice(body: &str, root: &RootTag, new_value: &str) -> Result<Splice, MalformedManifest> {
    let prefixes: Vec<&str> = root
        .attrs
        .iter()
        .filter(|a| &body[a.value.clone()] == ANDROID_NAMESPACE)
        .filter_map(|a| body[a.name.clone()].strip_prefix("xmlns:"))
        .collect();

    let existing = root.attrs.iter().find(|a| {
        body[a.name.clone()]
            .split_once(':')
            .is_some_and(|(prefix, local)| {
                local == VERSION_CODE_ATTRIBUTE && prefixes.contains(&prefix)
            })
    });
    if let Some(attr) = existing {
        return Ok(Splice::Replace {
            range: attr.value.clone(),
            previous: body[attr.value.clone()].to_string(),
        });
    }

    let (at, sep) = match root.attrs.last() {
        Some(last) => (last.end, &body[last.leading.clone()]),
        None => (root.name_end, " "),
    };

    let mut text = String::new();
    let prefix = match prefixes.first() {
        Some(p) => *p,
        None => {
            if let Some(foreign) = root
                .attrs
                .iter()
                .find(|a| &body[a.name.clone()] == "xmlns:android")
            {
                return Err(MalformedManifest::ForeignAndroidPrefix {
                    uri: body[foreign.value.clone()].to_string(),
                });
            }
            text.push_str(&format!("{sep}xmlns:android=\"{ANDROID_NAMESPACE}\""));
            "android"
        }
    };
    text.push_str(&format!(
        "{sep}{prefix}:{VERSION_CODE_ATTRIBUTE}=\"{new_value}\""
    ));

    Ok(Splice::Insert { at, text })
}

/// What happened to one manifest path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchOutcome {
    /// Nothing exists at the path.
    Missing,
    /// The attribute already holds the value; the file was not rewritten.
    Unchanged,
    Updated {
        previous: Option<String>,
        /// Unified diff of the change.
        diff: String,
        /// False in dry-run mode.
        written: bool,
    },
}

/// Patch the manifest at `path` with default options.
pub fn patch(
    path: &Utf8Path,
    value: u32,
    diag: &dyn Diagnostics,
) -> Result<PatchOutcome, PatchError> {
    patch_manifest(path, value, &PatchOptions::default(), diag)
}

/// Patch the manifest at `path` in place.
///
/// A missing file is not an error. Malformed documents are reported through
/// `diag` and returned as [`PatchError::Malformed`] without being written.
pub fn patch_manifest(
    path: &Utf8Path,
    value: u32,
    opts: &PatchOptions,
    diag: &dyn Diagnostics,
) -> Result<PatchOutcome, PatchError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            diag.debug(&format!("no manifest at {path}; skipping"));
            return Ok(PatchOutcome::Missing);
        }
        Err(source) => {
            return Err(PatchError::Read {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    let malformed = |source: MalformedManifest| {
        diag.error(&format!("malformed manifest {path}: {source}"));
        PatchError::Malformed {
            path: path.to_path_buf(),
            source,
        }
    };

    let text = String::from_utf8(bytes).map_err(|_| malformed(MalformedManifest::NotUtf8))?;
    let patched = patch_content(&text, value).map_err(malformed)?;

    if !patched.changed {
        diag.debug(&format!("{path} already has versionCode {value}"));
        return Ok(PatchOutcome::Unchanged);
    }

    let diff = render_diff(path, &text, &patched.text);
    if opts.dry_run {
        return Ok(PatchOutcome::Updated {
            previous: patched.previous,
            diff,
            written: false,
        });
    }

    let write_err = |source| PatchError::Write {
        path: path.to_path_buf(),
        source,
    };
    if opts.backup_enabled {
        let backup = format!("{path}{}", opts.backup_suffix);
        fs::write(&backup, &text).map_err(write_err)?;
        diag.debug(&format!("backed up {path} to {backup}"));
    }
    fs::write(path, &patched.text).map_err(write_err)?;

    diag.info(&format!(
        "set versionCode {} -> {value} in {path}",
        patched.previous.as_deref().unwrap_or("(none)")
    ));
    Ok(PatchOutcome::Updated {
        previous: patched.previous,
        diff,
        written: true,
    })
}

/// Unified diff between two versions of the file at `path`.
pub fn render_diff(path: &Utf8Path, old: &str, new: &str) -> String {
    let mut out = String::new();
    if old == new {
        return out;
    }

    let formatter = PatchFormatter::new();
    out.push_str(&format!("diff --git a/{0} b/{0}\n", path));
    out.push_str(&format!("--- a/{0}\n+++ b/{0}\n", path));

    let patch = diffy::create_patch(old, new);
    let body = formatter.fmt_patch(&patch).to_string();
    // Drop diffy's placeholder `--- original` / `+++ modified` header.
    let hunks = body
        .strip_prefix("--- original\n+++ modified\n")
        .unwrap_or(&body);
    out.push_str(hunks);
    if !out.ends_with('\n') {
        out.push('\n');
    }
    out
}
