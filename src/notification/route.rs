//! URL trees and router-style "is active" matching
//!
//! A [`Route`] is either built from path segments (navigation targets) or
//! parsed from a location string such as `/courses/5;tab=info?view=list#top`.
//! [`MatchOptions`] decide how strictly a target route must agree with the
//! current location for it to count as active.
//!
//! Parsed locations are percent-decoded, so `/quiz%2Dexercises` and
//! `/quiz-exercises` are the same segment.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

/// How path segments are compared
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathMatch {
    /// Same segments, same count
    Exact,
    /// The route's segments are a prefix of the location's
    Subset,
}

/// How query parameters are compared
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryMatch {
    Exact,
    /// Every query parameter of the route is present in the location
    Subset,
    Ignored,
}

/// Comparison mode for fragments and matrix parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strictness {
    Exact,
    Ignored,
}

/// Matching strictness used when asking whether a route is the current location
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchOptions {
    pub paths: PathMatch,
    pub query_params: QueryMatch,
    pub fragment: Strictness,
    pub matrix_params: Strictness,
}

impl MatchOptions {
    /// Exact path, exact query params, fragment and matrix params ignored
    pub const EXACT: Self = Self {
        paths: PathMatch::Exact,
        query_params: QueryMatch::Exact,
        fragment: Strictness::Ignored,
        matrix_params: Strictness::Ignored,
    };

    /// Prefix path, subset query params, fragment and matrix params ignored
    pub const SUBSET: Self = Self {
        paths: PathMatch::Subset,
        query_params: QueryMatch::Subset,
        fragment: Strictness::Ignored,
        matrix_params: Strictness::Ignored,
    };
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self::EXACT
    }
}

/// One path segment with its matrix parameters
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UrlSegment {
    pub path: String,
    pub matrix: BTreeMap<String, String>,
}

impl UrlSegment {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            matrix: BTreeMap::new(),
        }
    }

    fn parse(raw: &str) -> Self {
        let mut parts = raw.split(';');
        let path = decode(parts.next().unwrap_or_default());
        let matrix = parts
            .filter(|p| !p.is_empty())
            .map(|p| split_pair(p, decode))
            .collect();
        Self { path, matrix }
    }

    fn matches(&self, other: &UrlSegment, matrix: Strictness) -> bool {
        self.path == other.path && (matrix == Strictness::Ignored || self.matrix == other.matrix)
    }
}

/// An absolute URL tree: path segments, query parameters and fragment
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Route {
    segments: Vec<UrlSegment>,
    query: BTreeMap<String, String>,
    fragment: Option<String>,
}

impl Route {
    /// The root location `/`
    pub fn root() -> Self {
        Self::default()
    }

    /// Build a route from path segments. Empty segments are skipped.
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: ToString,
    {
        Self {
            segments: segments
                .into_iter()
                .map(|s| s.to_string())
                .filter(|s| !s.is_empty())
                .map(UrlSegment::new)
                .collect(),
            ..Self::default()
        }
    }

    /// Parse a location string (`/a/b;k=v?q=1#frag`)
    pub fn parse(url: &str) -> Self {
        let (rest, fragment) = match url.split_once('#') {
            Some((rest, fragment)) => (rest, Some(decode(fragment))),
            None => (url, None),
        };
        let (path, query) = rest.split_once('?').unwrap_or((rest, ""));

        Self {
            segments: path
                .split('/')
                .filter(|s| !s.is_empty())
                .map(UrlSegment::parse)
                .collect(),
            query: query
                .split('&')
                .filter(|p| !p.is_empty())
                .map(|p| split_pair(p, decode_query))
                .collect(),
            fragment,
        }
    }

    /// Append one path segment
    pub fn child(mut self, segment: impl Into<String>) -> Self {
        let segment = segment.into();
        if !segment.is_empty() {
            self.segments.push(UrlSegment::new(segment));
        }
        self
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    pub fn segments(&self) -> &[UrlSegment] {
        &self.segments
    }

    pub fn query(&self) -> &BTreeMap<String, String> {
        &self.query
    }

    pub fn fragment(&self) -> Option<&str> {
        self.fragment.as_deref()
    }

    /// Whether this route counts as active when `current` is the location
    pub fn is_active_in(&self, current: &Route, options: &MatchOptions) -> bool {
        self.paths_match(current, options)
            && self.query_matches(current, options.query_params)
            && match options.fragment {
                Strictness::Exact => self.fragment == current.fragment,
                Strictness::Ignored => true,
            }
    }

    fn paths_match(&self, current: &Route, options: &MatchOptions) -> bool {
        let lengths_ok = match options.paths {
            PathMatch::Exact => self.segments.len() == current.segments.len(),
            PathMatch::Subset => self.segments.len() <= current.segments.len(),
        };
        lengths_ok
            && self
                .segments
                .iter()
                .zip(&current.segments)
                .all(|(a, b)| a.matches(b, options.matrix_params))
    }

    fn query_matches(&self, current: &Route, mode: QueryMatch) -> bool {
        match mode {
            QueryMatch::Exact => self.query == current.query,
            QueryMatch::Subset => self
                .query
                .iter()
                .all(|(k, v)| current.query.get(k) == Some(v)),
            QueryMatch::Ignored => true,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            write!(f, "/")?;
        }
        for segment in &self.segments {
            write!(f, "/{}", segment.path)?;
            for (k, v) in &segment.matrix {
                write!(f, ";{}={}", k, v)?;
            }
        }
        for (i, (k, v)) in self.query.iter().enumerate() {
            let sep = if i == 0 { '?' } else { '&' };
            write!(f, "{}{}={}", sep, k, v)?;
        }
        if let Some(fragment) = &self.fragment {
            write!(f, "#{}", fragment)?;
        }
        Ok(())
    }
}

fn split_pair(raw: &str, decode: fn(&str) -> String) -> (String, String) {
    match raw.split_once('=') {
        Some((k, v)) => (decode(k), decode(v)),
        None => (decode(raw), String::new()),
    }
}

/// Percent-decode one URL component; invalid UTF-8 is kept as written
fn decode(raw: &str) -> String {
    urlencoding::decode(raw)
        .map(Cow::into_owned)
        .unwrap_or_else(|_| raw.to_string())
}

/// Query components additionally encode spaces as `+`
fn decode_query(raw: &str) -> String {
    decode(&raw.replace('+', "%20"))
}
