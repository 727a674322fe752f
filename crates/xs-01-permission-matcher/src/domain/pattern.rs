//! Origin patterns.

use crate::error::PatternError;
use serde::{Deserialize, Serialize};
use shared_types::Origin;
use std::fmt;

/// Matcher over [`Origin`] values.
///
/// | Pattern                        | Matches                                   |
/// |--------------------------------|-------------------------------------------|
/// | `https://app.example.com`      | exactly that origin                       |
/// | `https://*.example.com`        | `https://a.example.com`, `https://a.b.example.com` |
/// | `*.example.com:8080`           | any scheme, subdomains, port 8080 only    |
/// | `*`                            | every origin                              |
///
/// A subdomain wildcard never matches the bare domain: `*.example.com` does
/// not match `https://example.com`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum OriginPattern {
    /// Every origin.
    Any,
    /// One origin, compared after normalization.
    Exact(Origin),
    /// One or more labels in front of `suffix`.
    Subdomain {
        scheme: Option<String>,
        suffix: String,
        port: Option<u16>,
    },
}

impl OriginPattern {
    /// Parse a pattern string.
    pub fn parse(pattern: &str) -> Result<Self, PatternError> {
        let normalized = pattern.trim().to_ascii_lowercase();
        if normalized.is_empty() {
            return Err(PatternError::Empty);
        }
        if normalized == "*" {
            return Ok(OriginPattern::Any);
        }
        if !normalized.contains('*') {
            return Ok(OriginPattern::Exact(Origin::new(normalized)));
        }

        let (scheme, authority) = match normalized.split_once("://") {
            Some((scheme, rest)) if !scheme.is_empty() && !scheme.contains('*') => {
                (Some(scheme.to_string()), rest)
            }
            Some(_) => return Err(PatternError::MisplacedWildcard(pattern.to_string())),
            None => (None, normalized.as_str()),
        };

        let Some(rest) = authority.strip_prefix("*.") else {
            return Err(PatternError::MisplacedWildcard(pattern.to_string()));
        };
        if rest.contains('*') {
            return Err(PatternError::MisplacedWildcard(pattern.to_string()));
        }

        let rest = rest.trim_end_matches('/');
        let (suffix, port) = match rest.rsplit_once(':') {
            Some((suffix, port)) => {
                let port = port
                    .parse::<u16>()
                    .map_err(|_| PatternError::InvalidPort(pattern.to_string()))?;
                (suffix, Some(port))
            }
            None => (rest, None),
        };

        if suffix.is_empty() || suffix.starts_with('.') || suffix.contains('/') {
            return Err(PatternError::EmptySuffix(pattern.to_string()));
        }

        Ok(OriginPattern::Subdomain {
            scheme,
            suffix: suffix.to_string(),
            port,
        })
    }

    /// Whether `origin` is covered by this pattern.
    pub fn matches(&self, origin: &Origin) -> bool {
        match self {
            OriginPattern::Any => true,
            OriginPattern::Exact(expected) => expected == origin,
            OriginPattern::Subdomain {
                scheme,
                suffix,
                port,
            } => {
                let Some(parts) = origin.parts() else {
                    return false;
                };
                if scheme.as_deref().is_some_and(|s| s != parts.scheme) {
                    return false;
                }
                if *port != parts.port {
                    return false;
                }
                is_strict_subdomain(parts.host, suffix)
            }
        }
    }
}

/// `host` is `<label>.<suffix>` with at least one non-empty label.
fn is_strict_subdomain(host: &str, suffix: &str) -> bool {
    let Some(prefix) = host.strip_suffix(suffix) else {
        return false;
    };
    let Some(labels) = prefix.strip_suffix('.') else {
        return false;
    };
    !labels.is_empty() && labels.split('.').all(|label| !label.is_empty())
}

impl fmt::Display for OriginPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OriginPattern::Any => f.write_str("*"),
            OriginPattern::Exact(origin) => write!(f, "{origin}"),
            OriginPattern::Subdomain {
                scheme,
                suffix,
                port,
            } => {
                if let Some(scheme) = scheme {
                    write!(f, "{scheme}://")?;
                }
                write!(f, "*.{suffix}")?;
                if let Some(port) = port {
                    write!(f, ":{port}")?;
                }
                Ok(())
            }
        }
    }
}

impl TryFrom<String> for OriginPattern {
    type Error = PatternError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        OriginPattern::parse(&value)
    }
}

impl From<OriginPattern> for String {
    fn from(pattern: OriginPattern) -> Self {
        pattern.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin(s: &str) -> Origin {
        Origin::new(s)
    }

    #[test]
    fn test_exact_match() {
        let pattern = OriginPattern::parse("https://App.Example.com").unwrap();
        assert!(pattern.matches(&origin("https://app.example.com")));
        assert!(!pattern.matches(&origin("http://app.example.com")));
        assert!(!pattern.matches(&origin("https://app.example.com:8443")));
        assert!(!pattern.matches(&origin("https://b.app.example.com")));
    }

    #[test]
    fn test_wildcard_matches_subdomains_only() {
        let pattern = OriginPattern::parse("https://*.example.com").unwrap();
        assert!(pattern.matches(&origin("https://a.example.com")));
        assert!(pattern.matches(&origin("https://a.b.example.com")));
        assert!(!pattern.matches(&origin("https://example.com")));
        assert!(!pattern.matches(&origin("https://badexample.com")));
        assert!(!pattern.matches(&origin("https://.example.com")));
        assert!(!pattern.matches(&origin("http://a.example.com")));
        assert!(!pattern.matches(&origin("https://a.example.com.evil.test")));
    }

    #[test]
    fn test_wildcard_without_scheme() {
        let pattern = OriginPattern::parse("*.example.com").unwrap();
        assert!(pattern.matches(&origin("https://a.example.com")));
        assert!(pattern.matches(&origin("http://a.example.com")));
        assert!(!pattern.matches(&origin("worker-7")));
    }

    #[test]
    fn test_wildcard_port() {
        let pattern = OriginPattern::parse("http://*.localhost:8080").unwrap();
        assert!(pattern.matches(&origin("http://app.localhost:8080")));
        assert!(!pattern.matches(&origin("http://app.localhost:9090")));
        assert!(!pattern.matches(&origin("http://app.localhost")));

        let portless = OriginPattern::parse("http://*.localhost").unwrap();
        assert!(!portless.matches(&origin("http://app.localhost:8080")));
    }

    #[test]
    fn test_any_pattern() {
        let pattern = OriginPattern::parse(" * ").unwrap();
        assert_eq!(pattern, OriginPattern::Any);
        assert!(pattern.matches(&origin("worker-7")));
    }

    #[test]
    fn test_invalid_patterns() {
        assert_eq!(OriginPattern::parse("  "), Err(PatternError::Empty));
        assert!(matches!(
            OriginPattern::parse("https://a.*.example.com"),
            Err(PatternError::MisplacedWildcard(_))
        ));
        assert!(matches!(
            OriginPattern::parse("*://a.example.com"),
            Err(PatternError::MisplacedWildcard(_))
        ));
        assert!(matches!(
            OriginPattern::parse("https://*."),
            Err(PatternError::EmptySuffix(_))
        ));
        assert!(matches!(
            OriginPattern::parse("https://*.example.com:http"),
            Err(PatternError::InvalidPort(_))
        ));
    }

    #[test]
    fn test_display_round_trips() {
        for raw in ["*", "https://app.example.com", "https://*.example.com:8443", "*.example.com"] {
            let pattern = OriginPattern::parse(raw).unwrap();
            assert_eq!(pattern.to_string(), raw);
            assert_eq!(OriginPattern::parse(&pattern.to_string()).unwrap(), pattern);
        }
    }
}
