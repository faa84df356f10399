use crate::CompileError;
use query_structure::{
    pagination::{DEFAULT_CURSOR_FIELD, DEFAULT_PAGE_SIZE},
    OrderBy, PaginationSettings, SkipPolicy,
};
use serde::Deserialize;

/// Settings shared by every request a [`QueryCompiler`](crate::QueryCompiler)
/// compiles.
///
/// ```toml
/// skip_policy = "strict"
/// default_page_size = 50
/// max_page_size = 500
/// cursor_field = "seq"
/// default_order_by = "-created_at, id"
/// normalize_field_names = true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// What happens to conditions that cannot be compiled.
    pub skip_policy: SkipPolicy,
    pub default_page_size: i64,
    pub max_page_size: Option<i64>,
    /// Key compared against the last seen id of a page token.
    pub cursor_field: String,
    /// Ordering applied when a request names none, in the textual order-by
    /// convention.
    pub default_order_by: Option<String>,
    /// Converts camelCase field names to snake_case before compiling.
    pub normalize_field_names: bool,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            skip_policy: SkipPolicy::default(),
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: None,
            cursor_field: DEFAULT_CURSOR_FIELD.to_owned(),
            default_order_by: None,
            normalize_field_names: false,
        }
    }
}

impl CompilerConfig {
    pub fn from_toml(input: &str) -> crate::Result<Self> {
        toml::from_str(input).map_err(CompileError::configuration)
    }

    pub fn from_json(input: &str) -> crate::Result<Self> {
        serde_json::from_str(input).map_err(CompileError::configuration)
    }

    pub fn pagination_settings(&self) -> PaginationSettings {
        PaginationSettings {
            default_page_size: self.default_page_size,
            max_page_size: self.max_page_size,
            cursor_field: self.cursor_field.clone(),
        }
    }

    pub(crate) fn default_ordering(&self) -> crate::Result<Vec<OrderBy>> {
        match self.default_order_by.as_deref() {
            Some(order_by) => request_handlers::order_by::parse(order_by)
                .map_err(|err| CompileError::configuration(format!("default_order_by: {err}"))),
            None => Ok(Vec::new()),
        }
    }

    pub(crate) fn validate(self) -> crate::Result<Self> {
        if self.default_page_size <= 0 {
            return Err(CompileError::configuration("default_page_size must be positive"));
        }

        if matches!(self.max_page_size, Some(max) if max <= 0) {
            return Err(CompileError::configuration("max_page_size must be positive"));
        }

        if !query_structure::is_safe_identifier(&self.cursor_field) {
            return Err(CompileError::configuration(format!(
                "`{}` is not a valid cursor field",
                self.cursor_field
            )));
        }

        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults() {
        let config = CompilerConfig::from_toml("").unwrap();

        assert_eq!(CompilerConfig::default(), config);
        assert_eq!(SkipPolicy::Lenient, config.skip_policy);
        assert_eq!(20, config.default_page_size);
        assert_eq!("id", config.cursor_field);
    }

    #[test]
    fn toml_and_json_agree() {
        let from_toml = CompilerConfig::from_toml(indoc! {r#"
            skip_policy = "strict"
            default_page_size = 50
            max_page_size = 500
            default_order_by = "-created_at"
            normalize_field_names = true
        "#})
        .unwrap();

        let from_json = CompilerConfig::from_json(
            r#"{"skip_policy": "strict", "default_page_size": 50, "max_page_size": 500, "default_order_by": "-created_at", "normalize_field_names": true}"#,
        )
        .unwrap();

        assert_eq!(from_toml, from_json);
        assert_eq!(vec![OrderBy::desc("created_at")], from_toml.default_ordering().unwrap());
    }

    #[test]
    fn invalid_settings() {
        assert!(CompilerConfig::from_toml("skip_policy = \"sometimes\"").is_err());

        let config = CompilerConfig {
            cursor_field: "id; --".into(),
            ..Default::default()
        };

        assert!(config.validate().is_err());
    }
}
