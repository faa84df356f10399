//! The identifier allow-list guarding everything that is interpolated into a
//! query text instead of being bound as a parameter.

use crate::{InvariantViolation, SkipReason};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use tracing::warn;

static IDENTIFIER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9_.]+$").unwrap());

static FORBIDDEN_KEYWORDS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(drop|delete|insert|update|alter|truncate|create|grant|revoke|exec|execute|union|attach|detach|pragma)\b")
        .unwrap()
});

const FORBIDDEN_TOKENS: &[&str] = &[";", "--", "/*", "*/", "#"];

pub fn is_safe_identifier(ident: &str) -> bool {
    IDENTIFIER.is_match(ident)
}

/// Re-validates an identifier handed to a builder through a raw entry point.
pub fn ensure_identifier(ident: &str) -> Result<&str, InvariantViolation> {
    if is_safe_identifier(ident) && !ident.starts_with('.') && !ident.ends_with('.') {
        Ok(ident)
    } else {
        Err(InvariantViolation::UnsafeIdentifier(ident.to_owned()))
    }
}

/// Re-validates a raw condition handed to a builder. Raw conditions may use
/// operators, literals and placeholders, but never statement separators,
/// comments or statement keywords.
pub fn ensure_raw_condition(condition: &str) -> Result<&str, InvariantViolation> {
    let has_forbidden_token = FORBIDDEN_TOKENS.iter().any(|token| condition.contains(token));

    if condition.trim().is_empty() || has_forbidden_token || FORBIDDEN_KEYWORDS.is_match(condition) {
        Err(InvariantViolation::UnsafeCondition(condition.to_owned()))
    } else {
        Ok(condition)
    }
}

/// A field reference split into its column and an optional path into a
/// semi-structured (JSON/document) value stored in that column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRef {
    pub column: String,
    pub path: Vec<String>,
}

impl FieldRef {
    pub fn column(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            path: Vec::new(),
        }
    }

    /// Resolves `field` (dotted paths allowed) and an optional explicit JSON
    /// path. The field must pass the allow-list. An explicit path that fails
    /// the allow-list degrades to a plain column reference on `field`.
    pub fn resolve(field: &str, json_path: Option<&str>) -> Result<Self, SkipReason> {
        let field = field.trim();

        if field.is_empty() {
            return Err(SkipReason::EmptyField);
        }

        if !is_safe_identifier(field) {
            return Err(SkipReason::InvalidField(field.to_owned()));
        }

        let mut segments = field.split('.').filter(|s| !s.is_empty());
        let column = segments
            .next()
            .ok_or_else(|| SkipReason::InvalidField(field.to_owned()))?
            .to_owned();

        let mut path: Vec<String> = segments.map(ToOwned::to_owned).collect();

        if let Some(json_path) = json_path.map(normalize_json_path).filter(|p| !p.is_empty()) {
            if !is_safe_identifier(json_path) {
                warn!(
                    target: "query_structure::ident",
                    field,
                    json_path,
                    "JSON path failed the identifier allow-list, using the plain column."
                );

                return Ok(Self::column(field));
            }

            path.extend(json_path.split('.').filter(|s| !s.is_empty()).map(ToOwned::to_owned));
        }

        Ok(Self { column, path })
    }

    pub fn is_nested(&self) -> bool {
        !self.path.is_empty()
    }

    /// `column.path.to.value`
    pub fn dotted(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.column)?;

        for segment in &self.path {
            write!(f, ".{segment}")?;
        }

        Ok(())
    }
}

fn normalize_json_path(path: &str) -> &str {
    let path = path.trim();
    let path = path.strip_prefix("$.").unwrap_or(path);

    path.strip_prefix('.').unwrap_or(path)
}
