use crate::{SkipReason, SkippedCondition};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Result of compiling a single condition.
#[derive(Debug, Clone, PartialEq)]
pub enum Compiled<T> {
    /// The condition produced a native predicate.
    Rendered(T),
    /// The condition is vacuously true and contributes nothing, e.g. an empty
    /// `NOT IN` list.
    Vacuous,
    /// The condition could not be compiled.
    Skipped(SkipReason),
}

impl<T> Compiled<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Compiled<U> {
        match self {
            Compiled::Rendered(t) => Compiled::Rendered(f(t)),
            Compiled::Vacuous => Compiled::Vacuous,
            Compiled::Skipped(reason) => Compiled::Skipped(reason),
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Compiled::Skipped(_))
    }
}

impl<T> From<Result<T, SkipReason>> for Compiled<T> {
    fn from(res: Result<T, SkipReason>) -> Self {
        match res {
            Ok(t) => Compiled::Rendered(t),
            Err(reason) => Compiled::Skipped(reason),
        }
    }
}

/// What to do with conditions that cannot be compiled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkipPolicy {
    /// Log and drop the condition, compile the rest.
    #[default]
    Lenient,
    /// Abort the compilation.
    Strict,
}

impl SkipPolicy {
    pub fn accept<T>(self, field: &str, compiled: Compiled<T>) -> Result<Option<T>, SkippedCondition> {
        match compiled {
            Compiled::Rendered(t) => Ok(Some(t)),
            Compiled::Vacuous => Ok(None),
            Compiled::Skipped(reason) => match self {
                SkipPolicy::Lenient => {
                    warn!(target: "query_structure::filter", field, %reason, "Dropping filter condition.");
                    Ok(None)
                }
                SkipPolicy::Strict => Err(SkippedCondition {
                    field: field.to_owned(),
                    reason,
                }),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    #[test]
    #[traced_test]
    fn lenient_policy_drops_and_logs() {
        let res = SkipPolicy::Lenient.accept::<()>("name", Compiled::Skipped(SkipReason::UnknownOperator));

        assert_eq!(Ok(None), res);
        assert!(logs_contain("Dropping filter condition."));
    }

    #[test]
    fn strict_policy_aborts() {
        let err = SkipPolicy::Strict
            .accept::<()>("na me", Compiled::Skipped(SkipReason::InvalidField("na me".into())))
            .unwrap_err();

        assert_eq!("na me", err.field);
        assert_eq!(
            "Filter condition on `na me` was rejected: `na me` is not a valid field identifier",
            err.to_string()
        );
    }

    #[test]
    fn vacuous_is_not_a_skip() {
        assert_eq!(Ok(None), SkipPolicy::Strict.accept::<()>("ids", Compiled::Vacuous));
    }
}
