//! Python shebang rewriting.

use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;

use walkdir::WalkDir;

use super::text::{is_python_shebang, replace_first_line};
use super::{Fixup, Outcome, RelocateContext, StageReport};
use crate::error::Result;

/// Rewrite the first line of every Python script in the tree.
///
/// Only regular files are inspected; unreadable files and files whose
/// first line is not UTF-8 are skipped.
pub fn rewrite(ctx: &RelocateContext) -> Result<StageReport> {
    let mut report = StageReport::new(Fixup::Shebangs);
    let shebang = ctx.shebang();

    for entry in WalkDir::new(&ctx.root).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("cannot walk {}: {}", ctx.root.display(), e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();

        match rewrite_file(path, &shebang) {
            Ok(None) => {}
            Ok(Some(outcome)) => report.record(path, outcome),
            Err(e) => report.record(path, Outcome::Skipped(e.to_string())),
        }
    }

    Ok(report)
}

/// `Ok(None)` when the file is not a Python script at all.
fn rewrite_file(path: &Path, shebang: &str) -> io::Result<Option<Outcome>> {
    let first = first_line(path)?;
    let line = first.trim();
    if !is_python_shebang(line) {
        return Ok(None);
    }
    if line == shebang {
        return Ok(Some(Outcome::Unchanged));
    }

    let content = fs::read(path)?;
    fs::write(path, replace_first_line(&content, shebang))?;
    tracing::debug!("{}: {} -> {}", path.display(), line, shebang);
    Ok(Some(Outcome::Applied))
}

/// Longest first line considered; anything longer is not a shebang.
const MAX_LINE: u64 = 4096;

/// First line of `path`, or an empty string when it does not start
/// with `#!`.
fn first_line(path: &Path) -> io::Result<String> {
    let mut reader = BufReader::new(File::open(path)?).take(MAX_LINE);
    let mut raw = Vec::new();
    reader.read_until(b'\n', &mut raw)?;
    if !raw.starts_with(b"#!") {
        return Ok(String::new());
    }
    String::from_utf8(raw).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}
