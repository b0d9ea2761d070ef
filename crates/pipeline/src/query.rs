//! Ordered query-string model and its percent codec.
//!
//! A raw query component (`a=1&b=x%20y`) is parsed into a [`ParsedQuery`]: an
//! ordered list of decoded [`QueryParam`]s. Duplicate keys are kept. Encoding
//! is the exact inverse of decoding, so `decode(encode(s)) == s` for every
//! string `s`.
//!
//! The codec escapes every byte outside the RFC 3986 unreserved set
//! (`A-Z a-z 0-9 - _ . ~`). `+` is an ordinary character, never a space.

use std::borrow::Cow;

use crate::DecodeError;

/// Percent-encodes one key or value for use in a query component.
pub fn encode_component(component: &str) -> Cow<'_, str> {
    urlencoding::encode(component)
}

/// Strictly percent-decodes one raw key or value.
///
/// # Errors
///
/// - [`DecodeError::IncompleteEscape`] if any `%` is not followed by two hex
///   digits (`"%2"`, `"%zz"`, a trailing `"%"`).
/// - [`DecodeError::InvalidUtf8`] if the decoded bytes are not UTF-8.
pub fn decode_component(segment: &str) -> Result<String, DecodeError> {
    let bytes = segment.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let well_formed = bytes
                .get(i + 1..i + 3)
                .is_some_and(|hex| hex.iter().all(|b| b.is_ascii_hexdigit()));
            if !well_formed {
                return Err(DecodeError::IncompleteEscape {
                    segment: segment.to_owned(),
                    offset: i,
                });
            }
            i += 3;
        } else {
            i += 1;
        }
    }

    urlencoding::decode(segment)
        .map(Cow::into_owned)
        .map_err(|_| DecodeError::InvalidUtf8 {
            segment: segment.to_owned(),
        })
}

// ---------------------------------------------------------------------------

/// One decoded `key=value` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryParam {
    /// Decoded key, case preserved.
    pub key: String,
    /// Decoded value; empty when the raw token had no `=`.
    pub value: String,
}

impl QueryParam {
    /// Creates a pair from decoded parts.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Returns `true` if this pair's key equals `key`, ignoring ASCII case.
    pub fn has_key(&self, key: &str) -> bool {
        self.key.eq_ignore_ascii_case(key)
    }
}

// ---------------------------------------------------------------------------

/// An ordered sequence of decoded query parameters.
///
/// Built fresh from a raw query string, edited, re-encoded, and dropped.
/// Left-to-right order of the source string is preserved throughout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedQuery {
    params: Vec<QueryParam>,
}

impl ParsedQuery {
    /// Creates an empty query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a raw query component (the text after `?`, without the `?`).
    ///
    /// Tokens are split on `&`; empty tokens from leading, trailing, or
    /// doubled separators are skipped. Each token splits on its first `=`.
    ///
    /// # Errors
    ///
    /// Returns the first [`DecodeError`] met, scanning left to right.
    pub fn parse(raw: &str) -> Result<Self, DecodeError> {
        let params = raw
            .split('&')
            .filter(|token| !token.is_empty())
            .map(|token| -> Result<QueryParam, DecodeError> {
                let (key, value) = token.split_once('=').unwrap_or((token, ""));
                Ok(QueryParam::new(
                    decode_component(key)?,
                    decode_component(value)?,
                ))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { params })
    }

    /// Appends a pair after all existing pairs.
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.params.push(QueryParam::new(key, value));
    }

    /// Drops every pair whose key matches `key` ignoring ASCII case, keeping
    /// the relative order of the rest. Returns how many were dropped.
    pub fn remove_ignore_case(&mut self, key: &str) -> usize {
        let before = self.params.len();
        self.params.retain(|param| !param.has_key(key));
        before - self.params.len()
    }

    /// Makes `key=value` the only pair for `key` (ignoring case), placed last.
    ///
    /// Returns how many prior occurrences were dropped.
    pub fn override_parameter(&mut self, key: &str, value: &str) -> usize {
        let removed = self.remove_ignore_case(key);
        self.push(key, value);
        removed
    }

    /// Returns the values of every pair matching `key`, ignoring ASCII case.
    pub fn values_ignore_case<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.params
            .iter()
            .filter(move |param| param.has_key(key))
            .map(|param| param.value.as_str())
    }

    /// Returns the pairs in order.
    pub fn params(&self) -> &[QueryParam] {
        &self.params
    }

    /// Returns the number of pairs.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Returns `true` if there are no pairs.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Encodes the pairs as `k=v` tokens joined by `&`, without a leading `?`.
    pub fn encode(&self) -> String {
        self.to_string()
    }
}

impl std::fmt::Display for ParsedQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str("&")?;
            }
            write!(
                f,
                "{}={}",
                encode_component(&param.key),
                encode_component(&param.value)
            )?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a ParsedQuery {
    type Item = &'a QueryParam;
    type IntoIter = std::slice::Iter<'a, QueryParam>;

    fn into_iter(self) -> Self::IntoIter {
        self.params.iter()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_parse_empty_query() {
        assert!(ParsedQuery::parse("").expect("empty parses").is_empty());
    }

    #[test]
    fn test_parse_skips_empty_tokens() {
        let query = ParsedQuery::parse("&&a=1&&b=2&").expect("valid");
        assert_eq!(
            query.params(),
            &[QueryParam::new("a", "1"), QueryParam::new("b", "2")]
        );
    }

    #[test]
    fn test_parse_splits_on_first_equals_only() {
        let query = ParsedQuery::parse("expr=a=b&flag").expect("valid");
        assert_eq!(
            query.params(),
            &[QueryParam::new("expr", "a=b"), QueryParam::new("flag", "")]
        );
    }

    #[test]
    fn test_parse_keeps_duplicates_in_order() {
        let query = ParsedQuery::parse("x=1&y=2&x=3").expect("valid");
        let xs: Vec<&str> = query.values_ignore_case("X").collect();
        assert_eq!(xs, vec!["1", "3"]);
    }

    #[test]
    fn test_plus_is_literal() {
        let query = ParsedQuery::parse("q=a+b").expect("valid");
        assert_eq!(query.params()[0].value, "a+b");
        assert_eq!(query.encode(), "q=a%2Bb");
    }

    #[test]
    fn test_decode_reports_offset_of_bad_escape() {
        assert_eq!(
            decode_component("ab%2"),
            Err(DecodeError::IncompleteEscape {
                segment: "ab%2".into(),
                offset: 2
            })
        );
        assert!(matches!(
            decode_component("%zz"),
            Err(DecodeError::IncompleteEscape { offset: 0, .. })
        ));
        assert!(matches!(
            decode_component("trailing%"),
            Err(DecodeError::IncompleteEscape { offset: 8, .. })
        ));
    }

    #[test]
    fn test_decode_rejects_invalid_utf8() {
        assert!(matches!(
            decode_component("%FF%FE"),
            Err(DecodeError::InvalidUtf8 { .. })
        ));
    }

    #[test]
    fn test_parse_propagates_malformed_value() {
        let err = ParsedQuery::parse("ok=1&a=%2").expect_err("malformed");
        assert_eq!(err.segment(), "%2");
    }

    #[test]
    fn test_encode_escapes_reserved_characters() {
        let mut query = ParsedQuery::new();
        query.push("a&b", "c=d %");
        query.push("名", "é");
        assert_eq!(query.encode(), "a%26b=c%3Dd%20%25&%E5%90%8D=%C3%A9");
    }

    #[test]
    fn test_override_parameter_moves_key_last() {
        let mut query = ParsedQuery::parse("API-Version=old&x=1&api-version=older").expect("valid");
        let removed = query.override_parameter("api-version", "v1");
        assert_eq!(removed, 2);
        assert_eq!(query.encode(), "x=1&api-version=v1");
    }

    proptest! {
        #[test]
        fn prop_component_round_trips(s in any::<String>()) {
            let encoded = encode_component(&s);
            prop_assert_eq!(decode_component(&encoded).expect("encoder output decodes"), s);
        }

        #[test]
        fn prop_encoded_query_reparses_identically(
            pairs in proptest::collection::vec((any::<String>(), any::<String>()), 0..8)
        ) {
            let mut query = ParsedQuery::new();
            for (k, v) in &pairs {
                query.push(k.as_str(), v.as_str());
            }
            let reparsed = ParsedQuery::parse(&query.encode()).expect("encoder output parses");
            prop_assert_eq!(reparsed, query);
        }
    }
}
