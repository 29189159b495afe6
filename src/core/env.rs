//! Dotenv files.
//!
//! Reads `KEY=value` files into a variable map for push, and renders pulled
//! variables back into the same format.

use std::collections::BTreeMap;
use std::path::Path;

use tracing::debug;

use crate::error::Result;

/// Parse dotenv text.
///
/// Blank lines and `#` comments are skipped, an optional `export ` prefix is
/// accepted, and single or double quotes around the value are removed. Double
/// quoted values understand `\n`, `\r`, `\"` and `\\`. A later assignment to
/// the same key wins.
pub fn parse(contents: &str) -> BTreeMap<String, String> {
    let mut vars = BTreeMap::new();

    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let line = line.strip_prefix("export ").unwrap_or(line);
        if let Some((key, value)) = line.split_once('=') {
            let key = key.trim();
            if key.is_empty() {
                continue;
            }
            vars.insert(key.to_string(), unquote(value.trim()));
        }
    }

    vars
}

/// Read and parse a dotenv file.
pub fn load(path: impl AsRef<Path>) -> Result<BTreeMap<String, String>> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path)?;
    let vars = parse(&contents);
    debug!(path = %path.display(), count = vars.len(), "loaded env file");
    Ok(vars)
}

/// Render variables as dotenv text, one `KEY=value` per line in key order.
pub fn render<V: AsRef<str>>(vars: &BTreeMap<String, V>) -> String {
    let mut output = String::new();

    for (key, value) in vars {
        let value = value.as_ref();
        if needs_quotes(value) {
            output.push_str(&format!("{}=\"{}\"\n", key, escape(value)));
        } else {
            output.push_str(&format!("{}={}\n", key, value));
        }
    }

    output
}

/// Write variables to a dotenv file readable only by the owner.
pub fn write<V: AsRef<str>>(path: impl AsRef<Path>, vars: &BTreeMap<String, V>) -> Result<()> {
    let path = path.as_ref();
    let content = zeroize::Zeroizing::new(render(vars));

    #[cfg(unix)]
    {
        use std::io::Write;
        use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .truncate(true)
            .write(true)
            .mode(0o600)
            .open(path)?;
        file.write_all(content.as_bytes())?;
        file.flush()?;

        // open() leaves the mode of an existing file alone
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    }

    #[cfg(not(unix))]
    {
        std::fs::write(path, content.as_bytes())?;
    }

    debug!(path = %path.display(), count = vars.len(), "wrote env file");
    Ok(())
}

fn unquote(raw: &str) -> String {
    if raw.len() >= 2 && raw.starts_with('"') && raw.ends_with('"') {
        return unescape(&raw[1..raw.len() - 1]);
    }

    if raw.len() >= 2 && raw.starts_with('\'') && raw.ends_with('\'') {
        return raw[1..raw.len() - 1].to_string();
    }

    raw.to_string()
}

fn unescape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }

        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }

    out
}

fn needs_quotes(value: &str) -> bool {
    value.is_empty()
        || value
            .chars()
            .any(|ch| ch.is_whitespace() || matches!(ch, '#' | '=' | '"' | '\'' | '\\'))
}

fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());

    for ch in value.chars() {
        match ch {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            _ => escaped.push(ch),
        }
    }

    escaped
}
