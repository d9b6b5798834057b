//! Query-string building for list filters.
//!
//! Parameters keep insertion order. Absent or falsy values (`None`, an empty
//! string, a zero id) are left out entirely rather than sent empty.

use std::fmt::Write as _;

#[derive(Debug, Default, Clone)]
pub struct QueryString {
    pairs: Vec<(&'static str, String)>,
}

impl QueryString {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a text parameter if present and non-empty.
    pub fn text(mut self, key: &'static str, value: Option<&str>) -> Self {
        if let Some(v) = value.filter(|v| !v.is_empty()) {
            self.pairs.push((key, v.to_string()));
        }
        self
    }

    /// Add a numeric id if present and non-zero.
    pub fn id(mut self, key: &'static str, value: Option<u64>) -> Self {
        if let Some(v) = value.filter(|v| *v != 0) {
            self.pairs.push((key, v.to_string()));
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Append the encoded query (with its leading `?`) to `path`.
    pub fn apply(&self, path: &str) -> String {
        let mut out = path.to_string();
        for (i, (key, value)) in self.pairs.iter().enumerate() {
            let sep = if i == 0 { '?' } else { '&' };
            let _ = write!(
                out,
                "{}{}={}",
                sep,
                urlencoding::encode(key),
                urlencoding::encode(value)
            );
        }
        out
    }
}
