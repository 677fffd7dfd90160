//! Segment-based route patterns.
//!
//! Grammar, one element per `/`-separated segment:
//!
//! | Segment    | Matches                                               |
//! |------------|-------------------------------------------------------|
//! | `orders`   | the literal segment (case-insensitive)                |
//! | `{id}`     | any single segment                                    |
//! | `{id:int}` | a single segment made of ASCII digits                 |
//! | `*`        | any single segment; as the last segment, one or more  |
//! | `**`       | last segment only: zero or more remaining segments    |
//! | `emp*`     | a single segment starting with `emp`                  |

use std::fmt;

/// Why a pattern string was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatternError {
    #[error("pattern '{0}' must start with '/'")]
    MissingLeadingSlash(String),
    #[error("pattern '{0}': '**' is only allowed as the last segment")]
    MisplacedDoubleWildcard(String),
    #[error("pattern '{0}': empty parameter name")]
    EmptyParameter(String),
    #[error("pattern '{pattern}': unknown parameter constraint '{constraint}'")]
    UnknownConstraint { pattern: String, constraint: String },
    #[error("pattern '{0}': '*' is only allowed at the end of a segment")]
    MisplacedWildcard(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param { int_only: bool },
    Any,
    Prefix(String),
    /// Matches the remaining segments; `min` is how many must remain.
    Tail { min: usize },
}

impl Segment {
    fn matches(&self, segment: &str) -> bool {
        match self {
            Segment::Literal(lit) => lit == segment,
            Segment::Param { int_only: true } => segment.bytes().all(|b| b.is_ascii_digit()),
            Segment::Param { int_only: false } | Segment::Any => true,
            Segment::Prefix(prefix) => segment.starts_with(prefix.as_str()),
            Segment::Tail { .. } => true,
        }
    }
}

/// A parsed route pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
    raw: String,
    segments: Vec<Segment>,
}

impl RoutePattern {
    /// Parse a pattern such as `/api/employees/{id:int}`.
    pub fn parse(raw: &str) -> Result<Self, PatternError> {
        let trimmed = raw.trim();
        if !trimmed.starts_with('/') {
            return Err(PatternError::MissingLeadingSlash(raw.to_string()));
        }

        let parts: Vec<&str> = trimmed.split('/').filter(|s| !s.is_empty()).collect();
        let last = parts.len().saturating_sub(1);
        let mut segments = Vec::with_capacity(parts.len());

        for (index, part) in parts.iter().enumerate() {
            let is_last = index == last;
            let segment = match *part {
                "**" if is_last => Segment::Tail { min: 0 },
                "**" => return Err(PatternError::MisplacedDoubleWildcard(raw.to_string())),
                "*" if is_last => Segment::Tail { min: 1 },
                "*" => Segment::Any,
                p if p.starts_with('{') && p.ends_with('}') => parse_param(raw, &p[1..p.len() - 1])?,
                p if p.ends_with('*') => {
                    let prefix = &p[..p.len() - 1];
                    if prefix.contains('*') {
                        return Err(PatternError::MisplacedWildcard(raw.to_string()));
                    }
                    Segment::Prefix(prefix.to_ascii_lowercase())
                }
                p if p.contains('*') => {
                    return Err(PatternError::MisplacedWildcard(raw.to_string()));
                }
                p => Segment::Literal(p.to_ascii_lowercase()),
            };
            segments.push(segment);
        }

        Ok(Self {
            raw: trimmed.to_string(),
            segments,
        })
    }

    /// The pattern as written.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Match against a path already split by [`normalize_path`].
    pub fn matches(&self, path: &[String]) -> bool {
        for (index, segment) in self.segments.iter().enumerate() {
            if let Segment::Tail { min } = segment {
                return path.len().saturating_sub(index) >= *min;
            }
            match path.get(index) {
                Some(actual) if segment.matches(actual) => {}
                _ => return false,
            }
        }
        path.len() == self.segments.len()
    }
}

impl fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn parse_param(raw: &str, inner: &str) -> Result<Segment, PatternError> {
    let (name, constraint) = match inner.split_once(':') {
        Some((name, constraint)) => (name.trim(), Some(constraint.trim())),
        None => (inner.trim(), None),
    };
    if name.is_empty() {
        return Err(PatternError::EmptyParameter(raw.to_string()));
    }
    match constraint {
        None => Ok(Segment::Param { int_only: false }),
        Some(c) if c.eq_ignore_ascii_case("int") || c.eq_ignore_ascii_case("long") => {
            Ok(Segment::Param { int_only: true })
        }
        Some(c) => Err(PatternError::UnknownConstraint {
            pattern: raw.to_string(),
            constraint: c.to_string(),
        }),
    }
}

/// Split a request path into lowercase segments.
///
/// Drops the query string and fragment, empty segments (so trailing and
/// repeated slashes are ignored) and lowercases everything.
pub fn normalize_path(path: &str) -> Vec<String> {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    path.split('/')
        .filter(|s| !s.is_empty())
        .map(|s| s.to_ascii_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn matches(pattern: &str, path: &str) -> bool {
        RoutePattern::parse(pattern)
            .expect("pattern should parse")
            .matches(&normalize_path(path))
    }

    #[test]
    fn literal_patterns_are_case_insensitive() {
        assert!(matches("/api/Employees", "/api/employees"));
        assert!(matches("/api/employees", "/API/EMPLOYEES/"));
        assert!(!matches("/api/employees", "/api/employees/1"));
        assert!(!matches("/api/employees", "/api"));
    }

    #[test]
    fn normalization_drops_query_and_duplicate_slashes() {
        assert_eq!(
            normalize_path("//api///tasks/?page=2#top"),
            vec!["api".to_string(), "tasks".to_string()]
        );
        assert!(normalize_path("/").is_empty());
    }

    #[test]
    fn root_pattern_matches_only_root() {
        assert!(matches("/", "/"));
        assert!(!matches("/", "/api"));
    }

    #[test]
    fn params_match_one_segment() {
        assert!(matches("/api/employees/{id}", "/api/employees/42"));
        assert!(matches("/api/employees/{id}", "/api/employees/export"));
        assert!(!matches("/api/employees/{id}", "/api/employees"));
        assert!(!matches("/api/employees/{id}", "/api/employees/42/contracts"));
    }

    #[test]
    fn int_constraint_requires_digits() {
        assert!(matches("/api/payrolls/{id:int}/approve", "/api/payrolls/7/approve"));
        assert!(!matches("/api/payrolls/{id:int}/approve", "/api/payrolls/abc/approve"));
    }

    #[test]
    fn trailing_star_needs_at_least_one_segment() {
        assert!(matches("/api/tasks/*", "/api/tasks/1"));
        assert!(matches("/api/tasks/*", "/api/tasks/1/status"));
        assert!(!matches("/api/tasks/*", "/api/tasks"));
    }

    #[test]
    fn double_star_matches_zero_or_more() {
        assert!(matches("/api/time-entries/**", "/api/time-entries"));
        assert!(matches("/api/time-entries/**", "/api/time-entries/5/stop"));
        assert!(!matches("/api/time-entries/**", "/api/tasks"));
        assert!(matches("/**", "/anything/at/all"));
    }

    #[test]
    fn inner_star_matches_exactly_one_segment() {
        assert!(matches("/api/*/export", "/api/employees/export"));
        assert!(!matches("/api/*/export", "/api/export"));
        assert!(!matches("/api/*/export", "/api/a/b/export"));
    }

    #[test]
    fn prefix_segments() {
        assert!(matches("/api/time*", "/api/time-entries"));
        assert!(!matches("/api/time*", "/api/tasks"));
    }

    #[test]
    fn invalid_patterns_rejected() {
        assert_matches!(
            RoutePattern::parse("api/tasks"),
            Err(PatternError::MissingLeadingSlash(_))
        );
        assert_matches!(
            RoutePattern::parse("/api/**/tasks"),
            Err(PatternError::MisplacedDoubleWildcard(_))
        );
        assert_matches!(RoutePattern::parse("/api/{}"), Err(PatternError::EmptyParameter(_)));
        assert_matches!(
            RoutePattern::parse("/api/{id:guid}"),
            Err(PatternError::UnknownConstraint { .. })
        );
        assert_matches!(
            RoutePattern::parse("/api/t*sks"),
            Err(PatternError::MisplacedWildcard(_))
        );
    }

    #[test]
    fn display_keeps_original_text() {
        let pattern = RoutePattern::parse(" /api/Tasks/{id} ").unwrap();
        assert_eq!(pattern.to_string(), "/api/Tasks/{id}");
    }
}
