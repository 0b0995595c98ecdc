//! Normalization of web search responses.
//!
//! The search API answers with an envelope `{results: [...]}`, but proxies and older clients
//! hand back a bare list, a single hit or plain text. All of them become one
//! [`SearchResults`] value here so nodes never inspect raw payload shapes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::tool_source::ToolSourceError;

/// One search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    pub content: String,
}

/// Normalized search output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum SearchResults {
    Hits(Vec<SearchHit>),
    Text(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPayload {
    Envelope { results: Vec<SearchHit> },
    List(Vec<SearchHit>),
    Single(SearchHit),
    Text(String),
}

impl SearchResults {
    /// Normalizes any accepted payload shape. Anything else is a transport error.
    pub fn from_payload(payload: Value) -> Result<Self, ToolSourceError> {
        let raw: RawPayload = serde_json::from_value(payload).map_err(|e| {
            ToolSourceError::Transport(format!("unrecognized search response: {}", e))
        })?;
        Ok(match raw {
            RawPayload::Envelope { results } | RawPayload::List(results) => {
                SearchResults::Hits(results)
            }
            RawPayload::Single(hit) => SearchResults::Hits(vec![hit]),
            RawPayload::Text(text) => SearchResults::Text(text),
        })
    }

    pub fn is_empty(&self) -> bool {
        match self {
            SearchResults::Hits(hits) => hits.is_empty(),
            SearchResults::Text(text) => text.trim().is_empty(),
        }
    }

    /// Hit contents joined by newlines; used as the page content of a web-search document.
    pub fn joined_content(&self) -> String {
        match self {
            SearchResults::Hits(hits) => hits
                .iter()
                .map(|h| h.content.as_str())
                .collect::<Vec<_>>()
                .join("\n"),
            SearchResults::Text(text) => text.clone(),
        }
    }

    /// Observation text handed back to the model: hits as a JSON array, text as is.
    pub fn to_observation(&self) -> String {
        match self {
            SearchResults::Hits(hits) => {
                serde_json::to_string(hits).unwrap_or_else(|_| self.joined_content())
            }
            SearchResults::Text(text) => text.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn envelope_list_and_single_normalize_to_hits() {
        let hit = json!({"title": "t", "url": "https://a", "content": "body"});
        let expected = SearchResults::Hits(vec![SearchHit {
            title: "t".into(),
            url: "https://a".into(),
            content: "body".into(),
        }]);
        for payload in [json!({"query": "q", "results": [hit.clone()]}), json!([hit.clone()]), hit] {
            assert_eq!(SearchResults::from_payload(payload).unwrap(), expected);
        }
    }

    #[test]
    fn plain_string_becomes_text() {
        let r = SearchResults::from_payload(json!("just text")).unwrap();
        assert_eq!(r, SearchResults::Text("just text".into()));
        assert_eq!(r.joined_content(), "just text");
    }

    #[test]
    fn hit_without_title_or_url_is_accepted() {
        let r = SearchResults::from_payload(json!([{"content": "a"}, {"content": "b"}])).unwrap();
        assert_eq!(r.joined_content(), "a\nb");
    }

    /// **Scenario**: a payload of the wrong shape is an explicit error, not an empty result.
    #[test]
    fn unrecognized_shape_is_error() {
        let err = SearchResults::from_payload(json!(42)).unwrap_err();
        assert!(matches!(err, ToolSourceError::Transport(_)));
        assert!(SearchResults::from_payload(json!({"answer": "x"})).is_err());
    }

    #[test]
    fn observation_is_json_array_of_hits() {
        let r = SearchResults::Hits(vec![SearchHit {
            title: "t".into(),
            url: "u".into(),
            content: "c".into(),
        }]);
        let v: Value = serde_json::from_str(&r.to_observation()).unwrap();
        assert_eq!(v[0]["content"], "c");
        assert!(!r.is_empty());
        assert!(SearchResults::Hits(vec![]).is_empty());
    }
}
