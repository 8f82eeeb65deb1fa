//! Query-string decomposition.
//!
//! Names and values are percent-decoded (`+` as space) with
//! `application/x-www-form-urlencoded` rules. Names keep their case.

use std::collections::HashMap;
use url::form_urlencoded;

/// Parsed query parameters: name → every value it was given, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    params: HashMap<String, Vec<String>>,
}

impl QueryParams {
    /// Parse a raw query string (without the leading `?`).
    ///
    /// `None` and `""` both yield an empty set. A name without `=` is
    /// present with an empty value.
    pub fn parse(query: Option<&str>) -> Self {
        let mut params: HashMap<String, Vec<String>> = HashMap::new();
        if let Some(query) = query {
            for (name, value) in form_urlencoded::parse(query.as_bytes()) {
                params
                    .entry(name.into_owned())
                    .or_default()
                    .push(value.into_owned());
            }
        }
        Self { params }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.params.contains_key(name)
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_inputs() {
        assert!(QueryParams::parse(None).params.is_empty());
        assert!(QueryParams::parse(Some("")).params.is_empty());
    }

    #[test]
    fn repeated_names_collect_values() {
        let params = QueryParams::parse(Some("q=a&fq=x&fq=y"));
        assert_eq!(params.params.len(), 2);
        assert_eq!(params.params["fq"], ["x", "y"]);
        assert_eq!(params.params["q"], ["a"]);
        assert!(!params.contains("missing"));
    }

    #[test]
    fn names_are_decoded() {
        let params = QueryParams::parse(Some("stream%2Eurl=x&a+b=1&qt=%2Fupdate"));
        assert!(params.contains("stream.url"));
        assert!(params.contains("a b"));
        assert_eq!(params.params["qt"], ["/update"]);
    }

    #[test]
    fn bare_name_is_present() {
        let params = QueryParams::parse(Some("q=solr&qt"));
        assert!(params.contains("qt"));
        assert_eq!(params.params["qt"], [""]);
    }

    #[test]
    fn names_keep_case() {
        let params = QueryParams::parse(Some("QT=1"));
        assert!(params.contains("QT"));
        assert!(!params.contains("qt"));
    }
}
