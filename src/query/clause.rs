//! Typed attribute predicates.
//!
//! Replaces string where-clause assembly with a small predicate tree that
//! both evaluates against row values and renders the delimiter-safe SQL
//! form for diagnostics.

use std::fmt;

use super::LikePattern;

/// Wrap an attribute name in the delimiters shapefile queries expect,
/// doubling any embedded quote.
pub fn delimit_field(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// A predicate over one row's attribute values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WhereClause {
    /// Field value matches a LIKE pattern
    Like { field: String, pattern: LikePattern },
    /// Field value does not match a LIKE pattern
    NotLike { field: String, pattern: LikePattern },
    /// Both sub-predicates hold
    And(Box<WhereClause>, Box<WhereClause>),
}

impl WhereClause {
    /// `field LIKE pattern`
    pub fn like(field: impl Into<String>, pattern: &str) -> Self {
        WhereClause::Like {
            field: field.into(),
            pattern: LikePattern::new(pattern),
        }
    }

    /// `field NOT LIKE pattern`
    pub fn not_like(field: impl Into<String>, pattern: &str) -> Self {
        WhereClause::NotLike {
            field: field.into(),
            pattern: LikePattern::new(pattern),
        }
    }

    /// Conjunction of this predicate with another.
    pub fn and(self, other: WhereClause) -> Self {
        WhereClause::And(Box::new(self), Box::new(other))
    }

    /// Every field name the predicate references.
    pub fn fields(&self) -> Vec<&str> {
        match self {
            WhereClause::Like { field, .. } | WhereClause::NotLike { field, .. } => {
                vec![field.as_str()]
            }
            WhereClause::And(left, right) => {
                let mut fields = left.fields();
                fields.extend(right.fields());
                fields
            }
        }
    }

    /// Evaluate against a row, looking attribute values up by field name.
    /// A field the lookup cannot resolve never matches.
    pub fn matches<F>(&self, lookup: &F) -> bool
    where
        F: Fn(&str) -> Option<String>,
    {
        match self {
            WhereClause::Like { field, pattern } => {
                lookup(field).is_some_and(|value| pattern.matches(&value))
            }
            WhereClause::NotLike { field, pattern } => {
                lookup(field).is_some_and(|value| !pattern.matches(&value))
            }
            WhereClause::And(left, right) => left.matches(lookup) && right.matches(lookup),
        }
    }
}

impl fmt::Display for WhereClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WhereClause::Like { field, pattern } => {
                write!(f, "{} LIKE '{}'", delimit_field(field), pattern)
            }
            WhereClause::NotLike { field, pattern } => {
                write!(f, "{} NOT LIKE '{}'", delimit_field(field), pattern)
            }
            WhereClause::And(left, right) => write!(f, "{left} AND {right}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner_lookup(value: &'static str) -> impl Fn(&str) -> Option<String> {
        move |name| (name == "OWNER_NAME").then(|| value.to_string())
    }

    #[test]
    fn test_display_is_delimited_sql() {
        let clause = WhereClause::like("OWNER_NAME", "CITY OF BOULDER%")
            .and(WhereClause::not_like("OWNER_NAME", "%HOUSING AUTHORITY"));

        assert_eq!(
            clause.to_string(),
            "\"OWNER_NAME\" LIKE 'CITY OF BOULDER%' AND \"OWNER_NAME\" NOT LIKE '%HOUSING AUTHORITY'"
        );
    }

    #[test]
    fn test_and_evaluation() {
        let clause = WhereClause::like("OWNER_NAME", "CITY OF BOULDER%")
            .and(WhereClause::not_like("OWNER_NAME", "%HOUSING AUTHORITY"));

        assert!(clause.matches(&owner_lookup("CITY OF BOULDER")));
        assert!(clause.matches(&owner_lookup("CITY OF BOULDER OPEN SPACE")));
        assert!(!clause.matches(&owner_lookup("CITY OF BOULDER HOUSING AUTHORITY")));
        assert!(!clause.matches(&owner_lookup("JANE DOE")));
    }

    #[test]
    fn test_unknown_field_never_matches() {
        let clause = WhereClause::like("MISSING", "%");
        assert!(!clause.matches(&owner_lookup("ANYTHING")));
    }

    #[test]
    fn test_fields_lists_every_reference() {
        let clause = WhereClause::like("A", "%").and(WhereClause::not_like("B", "%"));
        assert_eq!(clause.fields(), vec!["A", "B"]);
    }

    #[test]
    fn test_delimit_field_escapes_quotes() {
        assert_eq!(delimit_field("OWNER_NAME"), "\"OWNER_NAME\"");
        assert_eq!(delimit_field("WEIRD\"NAME"), "\"WEIRD\"\"NAME\"");
    }
}
