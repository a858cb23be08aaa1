//! Pure text rewrites used by the fixups. No filesystem access here.

use regex::{NoExpand, Regex};

use crate::error::{RelocateError, Result};

/// Replace every match of `pattern` in `content` with `replacement`,
/// taken literally (no `$` group expansion).
pub fn replace_pattern(content: &str, pattern: &str, replacement: &str) -> Result<String> {
    let re = compile(pattern)?;
    Ok(re.replace_all(content, NoExpand(replacement)).into_owned())
}

/// Insert `prefix` right after every `key` occurrence, keeping the rest of
/// that line. `prefix_after_key("ExecStart=/bin/x", "ExecStart=", "/opt")`
/// gives `ExecStart=/opt/bin/x`.
///
/// Values that already start with `prefix` are left as they are.
pub fn prefix_after_key(content: &str, key: &str, prefix: &str) -> Result<String> {
    let re = compile(&format!("{}(.*)", regex::escape(key)))?;
    Ok(re
        .replace_all(content, |caps: &regex::Captures| {
            if caps[1].starts_with(prefix) {
                caps[0].to_string()
            } else {
                format!("{}{}{}", key, prefix, &caps[1])
            }
        })
        .into_owned())
}

/// Insert `line` after the first line equal to `anchor`.
///
/// Returns `None` when no such line exists. When the line after the
/// anchor already is `line`, the content is returned unchanged.
pub fn insert_after(content: &str, anchor: &str, line: &str) -> Option<String> {
    let lines: Vec<&str> = content.split_inclusive('\n').collect();
    let index = lines.iter().position(|l| l.strip_suffix('\n') == Some(anchor))?;

    if lines
        .get(index + 1)
        .is_some_and(|next| next.trim_end_matches('\n') == line)
    {
        return Some(content.to_string());
    }

    let mut out = String::with_capacity(content.len() + line.len() + 1);
    for l in &lines[..=index] {
        out.push_str(l);
    }
    out.push_str(line);
    out.push('\n');
    for l in &lines[index + 1..] {
        out.push_str(l);
    }
    Some(out)
}

/// True for a `#!` line that runs some Python interpreter.
pub fn is_python_shebang(line: &str) -> bool {
    line.starts_with("#!") && line.contains("python")
}

/// Replace the first line of `content` with `line`, keeping the line
/// terminator and every byte after it.
pub fn replace_first_line(content: &[u8], line: &str) -> Vec<u8> {
    let rest = match content.iter().position(|&b| b == b'\n') {
        Some(pos) => &content[pos..],
        None => &[][..],
    };
    let mut out = Vec::with_capacity(line.len() + rest.len());
    out.extend_from_slice(line.as_bytes());
    out.extend_from_slice(rest);
    out
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|source| RelocateError::Pattern {
        pattern: pattern.to_string(),
        source,
    })
}
