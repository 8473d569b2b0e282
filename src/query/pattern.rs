//! SQL LIKE wildcard matching.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    /// `%`: any run of characters, including none
    AnyRun,
    /// `_`: exactly one character
    AnyOne,
    Literal(char),
}

/// A compiled LIKE pattern. Matching is case-sensitive, as attribute
/// queries against shapefiles are.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LikePattern {
    source: String,
    tokens: Vec<Token>,
}

impl LikePattern {
    /// Compile a pattern. `%` and `_` are wildcards, everything else is
    /// matched literally.
    pub fn new(pattern: &str) -> Self {
        let tokens = pattern
            .chars()
            .map(|c| match c {
                '%' => Token::AnyRun,
                '_' => Token::AnyOne,
                other => Token::Literal(other),
            })
            .collect();
        LikePattern {
            source: pattern.to_string(),
            tokens,
        }
    }

    /// Test a value against the pattern.
    pub fn matches(&self, text: &str) -> bool {
        let chars: Vec<char> = text.chars().collect();
        let tokens = &self.tokens;

        // Two-pointer wildcard match with backtracking to the last `%`
        let mut ti = 0;
        let mut pi = 0;
        let mut backtrack: Option<(usize, usize)> = None;

        while ti < chars.len() {
            if pi < tokens.len() && tokens[pi] != Token::AnyRun && token_matches(tokens[pi], chars[ti]) {
                ti += 1;
                pi += 1;
            } else if pi < tokens.len() && tokens[pi] == Token::AnyRun {
                backtrack = Some((pi, ti));
                pi += 1;
            } else if let Some((run_pi, run_ti)) = backtrack {
                backtrack = Some((run_pi, run_ti + 1));
                pi = run_pi + 1;
                ti = run_ti + 1;
            } else {
                return false;
            }
        }

        while pi < tokens.len() && tokens[pi] == Token::AnyRun {
            pi += 1;
        }
        pi == tokens.len()
    }
}

fn token_matches(token: Token, c: char) -> bool {
    match token {
        Token::AnyRun => false,
        Token::AnyOne => true,
        Token::Literal(l) => l == c,
    }
}

impl fmt::Display for LikePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_match() {
        let pattern = LikePattern::new("CITY OF BOULDER%");
        assert!(pattern.matches("CITY OF BOULDER"));
        assert!(pattern.matches("CITY OF BOULDER OPEN SPACE"));
        assert!(!pattern.matches("THE CITY OF BOULDER"));
        assert!(!pattern.matches("CITY OF BOULDE"));
    }

    #[test]
    fn test_suffix_match() {
        let pattern = LikePattern::new("%HOUSING AUTHORITY");
        assert!(pattern.matches("HOUSING AUTHORITY"));
        assert!(pattern.matches("CITY OF BOULDER HOUSING AUTHORITY"));
        assert!(!pattern.matches("HOUSING AUTHORITY OF BOULDER"));
    }

    #[test]
    fn test_infix_and_single_char() {
        assert!(LikePattern::new("%BOULDER%").matches("THE BOULDER GROUP"));
        assert!(LikePattern::new("SMITH_").matches("SMITHS"));
        assert!(!LikePattern::new("SMITH_").matches("SMITH"));
        assert!(!LikePattern::new("SMITH_").matches("SMITHSON"));
    }

    #[test]
    fn test_literal_match() {
        let pattern = LikePattern::new("JANE DOE");
        assert!(pattern.matches("JANE DOE"));
        assert!(!pattern.matches("JANE DOE "));
    }

    #[test]
    fn test_case_sensitive() {
        assert!(!LikePattern::new("CITY%").matches("city of boulder"));
    }

    #[test]
    fn test_empty_pattern() {
        assert!(LikePattern::new("").matches(""));
        assert!(!LikePattern::new("").matches("A"));
        assert!(LikePattern::new("%").matches(""));
    }

    #[test]
    fn test_consecutive_wildcards() {
        assert!(LikePattern::new("%%X").matches("AX"));
        assert!(LikePattern::new("A%_").matches("AB"));
        assert!(!LikePattern::new("A%_").matches("A"));
    }
}
