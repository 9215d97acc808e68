use regex::Regex;
use serde::Serialize;
use std::fmt;
use thiserror::Error;
use url::Url;

/// Errors raised while resolving a component remote.
#[derive(Debug, Error, PartialEq)]
pub enum RemoteUrlError {
    #[error("Invalid URL format: {0}")]
    InvalidFormat(String),

    #[error("Relative remote {relative} cannot be resolved against {base}")]
    UnresolvableRelative { relative: String, base: String },
}

/// Remote URL of a component.
///
/// Manifest remotes starting with `..` are relative to the root repository's
/// own `origin`; everything else is used as written.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RemoteUrl {
    url: String,
}

impl RemoteUrl {
    pub fn new(url: &str) -> Result<Self, RemoteUrlError> {
        let trimmed = url.trim();
        if trimmed.is_empty() {
            return Err(RemoteUrlError::InvalidFormat("Empty URL".to_string()));
        }
        if trimmed.chars().any(|c| c.is_control()) {
            return Err(RemoteUrlError::InvalidFormat(format!(
                "control characters in {:?}",
                trimmed
            )));
        }
        Ok(Self {
            url: trimmed.to_string(),
        })
    }

    /// Whether the manifest entry must be resolved against the root's origin.
    pub fn is_relative(raw: &str) -> bool {
        raw.trim_start().starts_with("..")
    }

    /// Resolve a `..`-relative remote against the root repository's origin.
    ///
    /// The last path segment of `relative` replaces the last path segment of
    /// `base`, so `../env.git` against `https://host/org/root.git` yields
    /// `https://host/org/env.git`.
    pub fn resolve_relative(base: &str, relative: &str) -> Result<Self, RemoteUrlError> {
        let unresolvable = || RemoteUrlError::UnresolvableRelative {
            relative: relative.to_string(),
            base: base.to_string(),
        };

        let segment = relative
            .trim()
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .filter(|s| !s.is_empty() && *s != "..")
            .ok_or_else(unresolvable)?;

        let base = base.trim();
        if let Ok(parsed) = Url::parse(base) {
            if !parsed.cannot_be_a_base() {
                let joined = parsed.join(segment).map_err(|_| unresolvable())?;
                return Self::new(joined.as_str());
            }
        }

        // scp-style `user@host:org/repo.git`
        let scp = Regex::new(r"^(?P<host>[^/:]+@[^/:]+:)(?P<path>.*)$")
            .map_err(|e| RemoteUrlError::InvalidFormat(e.to_string()))?;
        if let Some(captures) = scp.captures(base) {
            let path = &captures["path"];
            return Self::new(&format!(
                "{}{}{}",
                &captures["host"],
                parent_of(path),
                segment
            ));
        }

        // plain filesystem path
        if base.contains('/') {
            return Self::new(&format!("{}{}", parent_of(base), segment));
        }

        Err(unresolvable())
    }

    pub fn as_str(&self) -> &str {
        &self.url
    }
}

fn parent_of(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[..=idx],
        None => "",
    }
}

impl fmt::Display for RemoteUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolute_remote_is_kept() {
        let url = RemoteUrl::new("git@github.com:org/env.git").unwrap();
        assert_eq!(url.as_str(), "git@github.com:org/env.git");
    }

    #[test]
    fn test_empty_remote_is_rejected() {
        assert!(RemoteUrl::new("   ").is_err());
    }

    #[test]
    fn test_is_relative() {
        assert!(RemoteUrl::is_relative("../env.git"));
        assert!(!RemoteUrl::is_relative("https://github.com/org/env.git"));
    }

    #[test]
    fn test_resolve_relative_against_https() {
        let url =
            RemoteUrl::resolve_relative("https://github.com/org/root.git", "../env.git").unwrap();
        assert_eq!(url.as_str(), "https://github.com/org/env.git");
    }

    #[test]
    fn test_resolve_relative_against_scp_style() {
        let url = RemoteUrl::resolve_relative("git@github.com:org/root.git", "../../cmake.git")
            .unwrap();
        assert_eq!(url.as_str(), "git@github.com:org/cmake.git");
    }

    #[test]
    fn test_resolve_relative_against_local_path() {
        let url = RemoteUrl::resolve_relative("/srv/git/root.git", "../env.git").unwrap();
        assert_eq!(url.as_str(), "/srv/git/env.git");
    }

    #[test]
    fn test_resolve_relative_without_parent_fails() {
        let result = RemoteUrl::resolve_relative("root.git", "../env.git");
        assert!(matches!(
            result,
            Err(RemoteUrlError::UnresolvableRelative { .. })
        ));
    }
}
