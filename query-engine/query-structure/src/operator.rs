use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fmt};

/// The canonical comparison vocabulary every input syntax is normalized to.
#[derive(Clone, Copy, PartialEq, Debug, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(from = "String", into = "&'static str")]
pub enum Operator {
    #[default]
    Unspecified,
    Equals,
    NotEquals,
    In,
    NotIn,
    GreaterThan,
    GreaterThanOrEquals,
    LessThan,
    LessThanOrEquals,
    Between,
    IsNull,
    IsNotNull,
    Contains,
    InsensitiveContains,
    StartsWith,
    InsensitiveStartsWith,
    EndsWith,
    InsensitiveEndsWith,
    Exact,
    InsensitiveExact,
    Regexp,
    InsensitiveRegexp,
    Search,
}

/// How many values an operator consumes.
#[derive(Clone, Copy, PartialEq, Debug, Eq)]
pub enum Arity {
    Nullary,
    Single,
    List,
    Range,
}

static OPERATOR_ALIASES: Lazy<HashMap<&'static str, Operator>> = Lazy::new(|| {
    use Operator::*;

    let table: &[(&[&'static str], Operator)] = &[
        (&["eq", "equal", "equals", "=", "=="], Equals),
        (&["ne", "neq", "not_equal", "not_equals", "!=", "<>"], NotEquals),
        (&["in"], In),
        (&["nin", "not_in", "notin"], NotIn),
        (&["gt", "greater", "greater_than", ">"], GreaterThan),
        (
            &["gte", "ge", "greater_or_equal", "greater_than_or_equal", ">="],
            GreaterThanOrEquals,
        ),
        (&["lt", "less", "less_than", "<"], LessThan),
        (
            &["lte", "le", "less_or_equal", "less_than_or_equal", "<="],
            LessThanOrEquals,
        ),
        (&["between", "range"], Between),
        (&["isnull", "is_null", "null"], IsNull),
        (&["isnotnull", "is_not_null", "not_null", "notnull"], IsNotNull),
        (&["contains", "like"], Contains),
        (&["icontains", "ilike"], InsensitiveContains),
        (&["startswith", "starts_with", "prefix"], StartsWith),
        (&["istartswith", "istarts_with"], InsensitiveStartsWith),
        (&["endswith", "ends_with", "suffix"], EndsWith),
        (&["iendswith", "iends_with"], InsensitiveEndsWith),
        (&["exact"], Exact),
        (&["iexact"], InsensitiveExact),
        (&["regex", "regexp", "match"], Regexp),
        (&["iregex", "iregexp", "imatch"], InsensitiveRegexp),
        (&["search", "fts", "full_text"], Search),
    ];

    let mut aliases = HashMap::new();

    for (names, op) in table {
        for name in names.iter() {
            aliases.insert(*name, *op);
        }

        aliases.insert(op.as_str(), *op);
    }

    aliases
});

impl Operator {
    /// Normalizes a human spelling (`eq`, `Greater_Than`, `like`, `>=`) to the
    /// canonical operator. Unknown spellings yield `Operator::Unspecified`.
    pub fn from_alias(alias: &str) -> Operator {
        let alias = alias.trim();

        OPERATOR_ALIASES
            .get(alias)
            .or_else(|| OPERATOR_ALIASES.get(alias.to_ascii_lowercase().as_str()))
            .copied()
            .unwrap_or(Operator::Unspecified)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Operator::Unspecified => "UNSPECIFIED",
            Operator::Equals => "EQ",
            Operator::NotEquals => "NEQ",
            Operator::In => "IN",
            Operator::NotIn => "NIN",
            Operator::GreaterThan => "GT",
            Operator::GreaterThanOrEquals => "GTE",
            Operator::LessThan => "LT",
            Operator::LessThanOrEquals => "LTE",
            Operator::Between => "BETWEEN",
            Operator::IsNull => "IS_NULL",
            Operator::IsNotNull => "IS_NOT_NULL",
            Operator::Contains => "CONTAINS",
            Operator::InsensitiveContains => "ICONTAINS",
            Operator::StartsWith => "STARTS_WITH",
            Operator::InsensitiveStartsWith => "ISTARTS_WITH",
            Operator::EndsWith => "ENDS_WITH",
            Operator::InsensitiveEndsWith => "IENDS_WITH",
            Operator::Exact => "EXACT",
            Operator::InsensitiveExact => "IEXACT",
            Operator::Regexp => "REGEXP",
            Operator::InsensitiveRegexp => "IREGEXP",
            Operator::Search => "SEARCH",
        }
    }

    pub fn arity(self) -> Arity {
        match self {
            Operator::Unspecified | Operator::IsNull | Operator::IsNotNull => Arity::Nullary,
            Operator::In | Operator::NotIn => Arity::List,
            Operator::Between => Arity::Range,
            _ => Arity::Single,
        }
    }

    pub fn is_specified(self) -> bool {
        self != Operator::Unspecified
    }

    /// True for the operators matching with case folding.
    pub fn is_insensitive(self) -> bool {
        matches!(
            self,
            Operator::InsensitiveContains
                | Operator::InsensitiveStartsWith
                | Operator::InsensitiveEndsWith
                | Operator::InsensitiveExact
                | Operator::InsensitiveRegexp
        )
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Operator {
    fn from(s: &str) -> Self {
        Operator::from_alias(s)
    }
}

impl From<String> for Operator {
    fn from(s: String) -> Self {
        Operator::from_alias(&s)
    }
}

impl From<Operator> for &'static str {
    fn from(op: Operator) -> Self {
        op.as_str()
    }
}
