//! Spreadsheet wildcard patterns
//!
//! `*` matches any run of characters, `?` matches exactly one character and `~` escapes
//! the character after it (`~*`, `~?`, `~~`). Matching is case-insensitive and always
//! covers the whole text.

use regex::{Regex, RegexBuilder};

/// A compiled wildcard pattern
#[derive(Debug, Clone)]
pub struct WildcardPattern {
    regex: Regex,
}

impl WildcardPattern {
    /// Compile `pattern`, or `None` if it contains no unescaped wildcard
    ///
    /// Callers fall back to plain case-insensitive equality when this returns `None`.
    pub fn new(pattern: &str) -> Option<Self> {
        if !has_wildcards(pattern) {
            return None;
        }
        Self::compile(pattern)
    }

    /// Compile `pattern` even without wildcards; such text must then match exactly
    pub fn compile(pattern: &str) -> Option<Self> {
        let mut source = String::with_capacity(pattern.len() + 8);
        source.push_str("^(?s:");
        let mut chars = pattern.chars();
        while let Some(ch) = chars.next() {
            match ch {
                '*' => source.push_str(".*"),
                '?' => source.push('.'),
                '~' => match chars.next() {
                    Some(next) => source.push_str(&regex::escape(&next.to_string())),
                    None => source.push_str(&regex::escape("~")),
                },
                other => source.push_str(&regex::escape(&other.to_string())),
            }
        }
        source.push_str(")$");

        RegexBuilder::new(&source)
            .case_insensitive(true)
            .build()
            .ok()
            .map(|regex| Self { regex })
    }

    pub fn matches(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

/// Whether `pattern` has a `*` or `?` that is not escaped by `~`
pub fn has_wildcards(pattern: &str) -> bool {
    let mut chars = pattern.chars();
    while let Some(ch) = chars.next() {
        match ch {
            '~' => {
                chars.next();
            }
            '*' | '?' => return true,
            _ => {}
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_star_and_question_mark() {
        let p = WildcardPattern::new("a*e").unwrap();
        assert!(p.matches("apple"));
        assert!(p.matches("AE"));
        assert!(!p.matches("apples"));

        let p = WildcardPattern::new("a?ple").unwrap();
        assert!(p.matches("Apple"));
        assert!(!p.matches("aple"));
        assert!(!p.matches("axxple"));
    }

    #[test]
    fn test_escapes() {
        assert!(WildcardPattern::new("what~?").is_none());
        let p = WildcardPattern::compile("what~?").unwrap();
        assert!(p.matches("What?"));
        assert!(!p.matches("whats"));

        let p = WildcardPattern::new("~**").unwrap();
        assert!(p.matches("*star"));
        assert!(!p.matches("star"));
    }

    #[test]
    fn test_regex_metacharacters_are_literal() {
        let p = WildcardPattern::new("(1+1)*").unwrap();
        assert!(p.matches("(1+1)=2"));
        assert!(!p.matches("11"));
    }
}
