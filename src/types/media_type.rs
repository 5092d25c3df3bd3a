//! # Media Types
//!
//! Minimal media type / media range parsing for `Content-Type` and
//! `Accept` headers.

/// The canonical JSON:API media type
pub const JSON_API: &str = "application/vnd.api+json";

/// Plain JSON, acceptable for error responses only
pub const JSON: &str = "application/json";

/// A parsed media type or media range
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaType {
    /// Lowercased `type/subtype`
    pub essence: String,
    /// Parameters in order, names lowercased, values unquoted
    pub params: Vec<(String, String)>,
}

impl MediaType {
    pub fn parse(raw: &str) -> Self {
        let mut parts = split_unquoted(raw, ';').into_iter();
        let essence = parts
            .next()
            .map(|s| s.trim().to_ascii_lowercase())
            .unwrap_or_default();

        let params = parts
            .filter_map(|part| {
                let (name, value) = part.split_once('=')?;
                let value = value.trim();
                let value = value
                    .strip_prefix('"')
                    .and_then(|v| v.strip_suffix('"'))
                    .unwrap_or(value);
                Some((name.trim().to_ascii_lowercase(), value.to_string()))
            })
            .collect();

        Self { essence, params }
    }

    /// Parse a comma-separated list of media ranges (an `Accept` header)
    pub fn parse_list(raw: &str) -> Vec<Self> {
        split_unquoted(raw, ',')
            .into_iter()
            .filter(|part| !part.trim().is_empty())
            .map(Self::parse)
            .collect()
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Parameters other than the `q` weight
    pub fn non_weight_params(&self) -> impl Iterator<Item = &(String, String)> {
        self.params.iter().filter(|(key, _)| key != "q")
    }

    /// Quality weight; 1.0 when absent or unparseable
    pub fn quality(&self) -> f32 {
        self.param("q")
            .and_then(|q| q.parse::<f32>().ok())
            .unwrap_or(1.0)
    }

    /// Whether this range covers the given `type/subtype`
    pub fn matches(&self, essence: &str) -> bool {
        if self.essence == "*/*" || self.essence == essence {
            return true;
        }
        match (self.essence.split_once('/'), essence.split_once('/')) {
            (Some((range_type, "*")), Some((target_type, _))) => range_type == target_type,
            _ => false,
        }
    }
}

/// Split on `separator`, ignoring separators inside double quotes
fn split_unquoted(raw: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut in_quotes = false;
    let mut start = 0;

    for (i, c) in raw.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            c if c == separator && !in_quotes => {
                parts.push(&raw[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&raw[start..]);
    parts
}
