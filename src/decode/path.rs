//! Dot-notation lookups into JSON (`data.items[0].content`)

use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("invalid path '{path}': {reason}")]
    Syntax { path: String, reason: &'static str },

    #[error("path '{path}' not found (stopped at '{segment}')")]
    NotFound { path: String, segment: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Key(String),
    Index(usize),
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Key(key) => f.write_str(key),
            Segment::Index(index) => write!(f, "[{index}]"),
        }
    }
}

/// Parsed path; the empty path addresses the root value
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JsonPath {
    raw: String,
    segments: Vec<Segment>,
}

impl JsonPath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn parse(raw: &str) -> Result<Self, PathError> {
        let raw = raw.trim();
        let syntax = |reason| PathError::Syntax {
            path: raw.to_string(),
            reason,
        };

        let mut segments = Vec::new();
        if raw.is_empty() {
            return Ok(Self::root());
        }

        for part in raw.split('.') {
            if part.is_empty() {
                return Err(syntax("empty segment"));
            }

            let (key, mut rest) = match part.find('[') {
                Some(pos) => (&part[..pos], &part[pos..]),
                None => (part, ""),
            };

            if !key.is_empty() {
                segments.push(Segment::Key(key.to_string()));
            }

            while !rest.is_empty() {
                let Some(inner) = rest.strip_prefix('[') else {
                    return Err(syntax("unexpected text after index"));
                };
                let Some(close) = inner.find(']') else {
                    return Err(syntax("unclosed '['"));
                };
                let index = inner[..close]
                    .trim()
                    .parse::<usize>()
                    .map_err(|_| syntax("index is not a non-negative integer"))?;
                segments.push(Segment::Index(index));
                rest = &inner[close + 1..];
            }
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Walk `value`; a missing key, out-of-range index or type mismatch
    /// yields [`PathError::NotFound`]
    pub fn resolve<'a>(&self, value: &'a Value) -> Result<&'a Value, PathError> {
        let mut current = value;

        for segment in &self.segments {
            let next = match (segment, current) {
                (Segment::Key(key), Value::Object(map)) => map.get(key),
                (Segment::Index(index), Value::Array(items)) => items.get(*index),
                _ => None,
            };

            current = next.ok_or_else(|| PathError::NotFound {
                path: self.raw.clone(),
                segment: segment.to_string(),
            })?;
        }

        Ok(current)
    }

    /// Like [`resolve`](Self::resolve) but treats a missing value as `None`
    pub fn lookup<'a>(&self, value: &'a Value) -> Option<&'a Value> {
        self.resolve(value).ok()
    }
}

impl FromStr for JsonPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
