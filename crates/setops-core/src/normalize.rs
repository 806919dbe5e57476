//! Operand normalization
//!
//! Trims, unquotes, optionally case-folds and deduplicates raw tokens into a
//! [`NamedSet`]. Empty tokens and duplicates are dropped silently.

use crate::set::{NamedSet, TokenSet};

const QUOTES: [char; 3] = ['"', '\'', '`'];

/// Raw tokens to named set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Normalizer {
    /// Keep tokens as written when `true`; fold to upper case otherwise
    pub case_sensitive: bool,
    /// Remove one surrounding pair of quote characters
    pub strip_quotes: bool,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self {
            case_sensitive: true,
            strip_quotes: true,
        }
    }
}

impl Normalizer {
    /// Normalizer with the given case sensitivity and quote stripping on
    pub fn new(case_sensitive: bool) -> Self {
        Self {
            case_sensitive,
            ..Self::default()
        }
    }

    /// Normalize a single raw token, `None` when nothing is left
    ///
    /// # Examples
    ///
    /// ```
    /// use setops_core::Normalizer;
    ///
    /// let n = Normalizer::new(false);
    /// assert_eq!(n.token("  'aapl' "), Some("AAPL".to_string()));
    /// assert_eq!(n.token("   "), None);
    /// ```
    pub fn token(&self, raw: &str) -> Option<String> {
        let mut cleaned = raw.trim();
        if self.strip_quotes {
            cleaned = unquote(cleaned).trim();
        }
        if cleaned.is_empty() {
            return None;
        }
        if self.case_sensitive {
            Some(cleaned.to_string())
        } else {
            Some(cleaned.to_uppercase())
        }
    }

    /// Normalize a token sequence into a named set
    pub fn normalize<I, S>(&self, raw: I) -> NamedSet
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tokens: TokenSet = raw
            .into_iter()
            .filter_map(|t| self.token(t.as_ref()))
            .collect();
        NamedSet::new(tokens)
    }
}

/// Drop one leading and one trailing quote; a lone quote character unquotes to
/// nothing
fn unquote(s: &str) -> &str {
    let mut chars = s.chars();
    match (chars.next(), chars.next_back()) {
        (Some(first), Some(last)) if QUOTES.contains(&first) && QUOTES.contains(&last) => {
            chars.as_str()
        }
        (Some(only), None) if QUOTES.contains(&only) => "",
        _ => s,
    }
}
