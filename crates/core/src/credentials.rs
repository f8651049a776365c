// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bot credentials file (`KEY=value` lines) and its validity gate.
//!
//! The manager never consumes the credentials as structured config; that is
//! the bot runtime's job. It only needs to know whether the file is usable
//! before starting, deploying or updating.

use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

pub const TOKEN_KEY: &str = "DISCORD_TOKEN";
pub const CLIENT_ID_KEY: &str = "CLIENT_ID";
pub const GUILD_ID_KEY: &str = "GUILD_ID";

pub const TOKEN_PLACEHOLDER: &str = "your_bot_token_here";
pub const CLIENT_ID_PLACEHOLDER: &str = "your_client_id_here";
pub const GUILD_ID_PLACEHOLDER: &str = "your_guild_id_here";

static TOKEN_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9._-]{59,}$").ok());

/// How strictly the token value is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strictness {
    /// Presence, non-placeholder, numeric ids.
    Lenient,
    /// Additionally requires the token to look like a bot token.
    #[default]
    Strict,
}

/// Token, application id and guild id for the managed bot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialSet {
    pub token: String,
    pub client_id: String,
    pub guild_id: String,
}

impl CredentialSet {
    /// Build a set from operator input. Ids keep only their digits, so a
    /// pasted `<@123456>` becomes `123456`.
    pub fn new(token: impl Into<String>, client_id: &str, guild_id: &str) -> Self {
        Self {
            token: token.into().trim().to_string(),
            client_id: digits_only(client_id),
            guild_id: digits_only(guild_id),
        }
    }

    /// Extract the three keys from file contents, if all are present.
    pub fn parse(contents: &str) -> Option<Self> {
        let pairs = parse_pairs(contents);
        Some(Self {
            token: pairs.get(TOKEN_KEY)?.clone(),
            client_id: pairs.get(CLIENT_ID_KEY)?.clone(),
            guild_id: pairs.get(GUILD_ID_KEY)?.clone(),
        })
    }

    /// Render as a credentials file.
    pub fn render(&self) -> String {
        format!(
            "{TOKEN_KEY}={}\n{CLIENT_ID_KEY}={}\n{GUILD_ID_KEY}={}\n",
            self.token, self.client_id, self.guild_id
        )
    }

    /// Replace the credentials file in one step (temp file + rename).
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        crate::fs_util::write_atomic(path, self.render().as_bytes())
    }

    /// First ten characters of the token followed by `...`.
    pub fn masked_token(&self) -> String {
        let head: String = self.token.chars().take(10).collect();
        format!("{head}...")
    }

    pub fn validate(&self, strictness: Strictness) -> bool {
        let present = !self.token.is_empty()
            && !self.client_id.is_empty()
            && !self.guild_id.is_empty();
        let placeholder = self.token == TOKEN_PLACEHOLDER
            || self.client_id == CLIENT_ID_PLACEHOLDER
            || self.guild_id == GUILD_ID_PLACEHOLDER;
        let numeric_ids = is_numeric(&self.client_id) && is_numeric(&self.guild_id);
        if !present || placeholder || !numeric_ids {
            return false;
        }
        match strictness {
            Strictness::Lenient => true,
            Strictness::Strict => {
                TOKEN_PATTERN.as_ref().is_some_and(|re| re.is_match(&self.token))
            }
        }
    }
}

/// Placeholder credentials file written by `install` when none exists.
pub fn template() -> String {
    CredentialSet {
        token: TOKEN_PLACEHOLDER.to_string(),
        client_id: CLIENT_ID_PLACEHOLDER.to_string(),
        guild_id: GUILD_ID_PLACEHOLDER.to_string(),
    }
    .render()
}

/// Write the placeholder file unless one already exists. Returns whether
/// a file was written.
pub fn write_template_if_missing(path: &Path) -> std::io::Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    crate::fs_util::write_atomic(path, template().as_bytes())?;
    Ok(true)
}

/// Whether the given file contents form a usable credential set.
///
/// Never fails: anything unparseable is simply invalid.
pub fn is_valid(contents: &str, strictness: Strictness) -> bool {
    CredentialSet::parse(contents).is_some_and(|set| set.validate(strictness))
}

/// Read and validate the credentials file. A missing or unreadable file
/// (including non-UTF-8 contents) is invalid.
pub fn is_valid_file(path: &Path, strictness: Strictness) -> bool {
    match std::fs::read_to_string(path) {
        Ok(contents) => is_valid(&contents, strictness),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "credentials unreadable");
            false
        }
    }
}

/// Load the credential set from disk, if present and complete.
pub fn load(path: &Path) -> Option<CredentialSet> {
    std::fs::read_to_string(path).ok().and_then(|c| CredentialSet::parse(&c))
}

fn parse_pairs(contents: &str) -> HashMap<String, String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
        .collect()
}

fn digits_only(s: &str) -> String {
    s.chars().filter(char::is_ascii_digit).collect()
}

fn is_numeric(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
#[path = "credentials_tests.rs"]
mod tests;
