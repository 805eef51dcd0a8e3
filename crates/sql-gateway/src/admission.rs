//! Admission check for client-supplied SQL
//!
//! The check is a case-sensitive prefix denylist applied to the untrimmed
//! statement, kept exactly as the service it replaces behaved: no trimming,
//! no case folding, no scanning past the statement head. Lowercase spellings
//! and statements led by whitespace pass through. This is a compatibility
//! contract, not a security boundary.

use anyhow::{bail, Context, Result};
use serde::Deserialize;

/// Statement prefixes refused at admission.
pub const DENIED_PREFIXES: [&str; 3] = ["UPDATE", "DROP", "DELETE"];

/// A SQL statement that has passed the admission check.
///
/// The inner string is private and the only constructors are
/// [`admit_statement`] and [`admit_payload`], so holding a `SqlCommand`
/// proves the statement was checked. The statement itself is never altered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlCommand(String);

impl SqlCommand {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SqlCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Wire shape of an inbound command: `{"query": "<sql>"}`.
#[derive(Debug, Deserialize)]
struct QueryPayload {
    query: Option<String>,
}

/// Parse a JSON payload carrying a `query` field and admit the statement
/// inside it.
///
/// The payload must be a JSON document with a string-valued `query` field.
/// Anything else (invalid JSON, a missing field, a non-string value) is
/// refused before the denylist is even consulted.
pub fn admit_payload(payload: &str) -> Result<SqlCommand> {
    let parsed: QueryPayload = serde_json::from_str(payload)
        .context("payload does not match {\"query\": <string>}")?;

    let statement = match parsed.query {
        Some(statement) => statement,
        None => bail!("payload has no query field"),
    };

    admit_statement(statement)
}

/// Admit a bare SQL statement.
///
/// Empty statements are refused. A statement beginning with one of
/// [`DENIED_PREFIXES`] is refused. Everything else passes through unchanged,
/// byte for byte.
pub fn admit_statement(statement: String) -> Result<SqlCommand> {
    if statement.is_empty() {
        bail!("empty statement");
    }

    for prefix in DENIED_PREFIXES {
        if statement.starts_with(prefix) {
            bail!("statement begins with denied keyword {prefix}");
        }
    }

    Ok(SqlCommand(statement))
}
