//! The per-instance secrets file: four `KEY="value"` lines read back with
//! `dotenvy` by the chat application.

use crate::config::{
    DeploymentConfig, ENV_API_KEY, ENV_PASSWORD, ENV_SESSION_SECRET, ENV_SYSTEM_PROMPT,
};
use crate::error::AppError;
use std::collections::HashMap;
use std::io::Write;
use std::path::Path;

/// Keys written to the secrets file, in file order.
pub const ENV_KEYS: [&str; 4] = [ENV_API_KEY, ENV_PASSWORD, ENV_SYSTEM_PROMPT, ENV_SESSION_SECRET];

/// Double-quote a value so dotenvy reads back exactly what was typed.
/// With `keep_newline_escapes`, backslash-n pairs are left alone so the
/// system prompt can carry newline escapes.
pub fn quote_value(value: &str, keep_newline_escapes: bool) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' => out.push_str("\\\""),
            '$' => out.push_str("\\$"),
            '\n' => out.push_str("\\n"),
            '\\' if keep_newline_escapes && chars.peek() == Some(&'n') => out.push('\\'),
            '\\' => out.push_str("\\\\"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

pub fn render(cfg: &DeploymentConfig) -> String {
    let values = [
        &cfg.api_key,
        &cfg.gate_password,
        &cfg.system_prompt,
        &cfg.session_secret,
    ];
    ENV_KEYS
        .iter()
        .zip(values)
        .map(|(key, value)| {
            let quoted = quote_value(value, *key == ENV_SYSTEM_PROMPT);
            format!("{key}={quoted}\n")
        })
        .collect()
}

/// Truncate-and-write `contents` to `path` with mode 0600.
pub fn write_private(path: &Path, contents: &str) -> Result<(), AppError> {
    let mut opts = std::fs::OpenOptions::new();
    opts.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        opts.mode(0o600);
    }
    let mut file = opts.open(path)?;

    // `mode` only applies on create; tighten a pre-existing file before
    // any secret lands in it.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    }
    file.write_all(contents.as_bytes())?;
    Ok(())
}

/// Parse an env file without touching the process environment.
pub fn read(path: &Path) -> Result<HashMap<String, String>, AppError> {
    let mut vars = HashMap::new();
    for item in dotenvy::from_path_iter(path)? {
        let (key, value) = item?;
        vars.insert(key, value);
    }
    Ok(vars)
}
