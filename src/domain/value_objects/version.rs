use serde::Serialize;
use std::fmt;

/// Prefix marking a branch pin that tracks the remote without a local branch.
pub const REMOTE_BRANCH_PREFIX: &str = "origin/";

/// What a [`Version`] name refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionKind {
    Branch,
    Tag,
    Hash,
}

impl VersionKind {
    /// Ref namespace queried on the remote (`refs/<namespace>/<name>`).
    ///
    /// Hashes have no namespace.
    pub fn ref_namespace(&self) -> Option<&'static str> {
        match self {
            VersionKind::Branch => Some("heads"),
            VersionKind::Tag => Some("tags"),
            VersionKind::Hash => None,
        }
    }

    fn short(&self) -> &'static str {
        match self {
            VersionKind::Branch => "b",
            VersionKind::Tag => "t",
            VersionKind::Hash => "h",
        }
    }
}

impl fmt::Display for VersionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VersionKind::Branch => "branch",
            VersionKind::Tag => "tag",
            VersionKind::Hash => "hash",
        };
        write!(f, "{}", name)
    }
}

/// A pinned or observed repository version.
///
/// A hash is always detached; the constructors are the only way to build a
/// version, so an attached hash cannot exist. Serialize only: pins are read
/// through the manifest entry, never straight into a `Version`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Version {
    name: String,
    kind: VersionKind,
    detached: bool,
}

impl Version {
    /// HEAD attached to a local branch.
    pub fn branch(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: VersionKind::Branch,
            detached: false,
        }
    }

    /// Detached at the tip of a branch.
    pub fn detached_branch(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: VersionKind::Branch,
            detached: true,
        }
    }

    /// Branch pin read from the manifest: `origin/<branch>`, detached.
    pub fn remote_branch(branch: &str) -> Self {
        Self::detached_branch(format!("{}{}", REMOTE_BRANCH_PREFIX, branch))
    }

    pub fn tag(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: VersionKind::Tag,
            detached: true,
        }
    }

    pub fn hash(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: VersionKind::Hash,
            detached: true,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> VersionKind {
        self.kind
    }

    pub fn is_detached(&self) -> bool {
        self.detached
    }

    /// Name as written to the manifest: detached branches lose their
    /// `origin/` prefix.
    pub fn manifest_name(&self) -> &str {
        match (self.kind, self.detached) {
            (VersionKind::Branch, true) => self
                .name
                .strip_prefix(REMOTE_BRANCH_PREFIX)
                .unwrap_or(&self.name),
            _ => &self.name,
        }
    }

    /// Whether `observed` satisfies this pin.
    ///
    /// Kinds must agree; branch names are compared without the `origin/`
    /// prefix so a fresh clone of `origin/main` matches a checkout of `main`.
    pub fn matches(&self, observed: &Version) -> bool {
        if self.kind != observed.kind {
            return false;
        }
        match self.kind {
            VersionKind::Branch => strip_remote(&self.name) == strip_remote(&observed.name),
            _ => self.name == observed.name,
        }
    }
}

fn strip_remote(name: &str) -> &str {
    name.strip_prefix(REMOTE_BRANCH_PREFIX).unwrap_or(name)
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}) {}", self.kind.short(), self.name)?;
        if self.detached {
            write!(f, " (DH)")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_always_detached() {
        let version = Version::hash("3d2e1f0");
        assert_eq!(version.kind(), VersionKind::Hash);
        assert!(version.is_detached());
    }

    #[test]
    fn test_remote_branch_round_trips_manifest_name() {
        let version = Version::remote_branch("main");
        assert_eq!(version.name(), "origin/main");
        assert!(version.is_detached());
        assert_eq!(version.manifest_name(), "main");
    }

    #[test]
    fn test_attached_branch_keeps_name() {
        let version = Version::branch("origin/feature");
        assert_eq!(version.manifest_name(), "origin/feature");
    }

    #[test]
    fn test_matches_ignores_remote_prefix() {
        let pinned = Version::remote_branch("main");
        assert!(pinned.matches(&Version::detached_branch("main")));
        assert!(pinned.matches(&Version::branch("main")));
        assert!(!pinned.matches(&Version::branch("develop")));
        assert!(!pinned.matches(&Version::tag("main")));
    }

    #[test]
    fn test_matches_tags_and_hashes_exactly() {
        assert!(Version::tag("v1.0").matches(&Version::tag("v1.0")));
        assert!(!Version::tag("v1.0").matches(&Version::tag("v1.1")));
        assert!(!Version::hash("abc").matches(&Version::hash("abcd")));
    }

    #[test]
    fn test_display() {
        assert_eq!(Version::branch("main").to_string(), "(b) main");
        assert_eq!(Version::tag("v1.0").to_string(), "(t) v1.0 (DH)");
        assert_eq!(Version::hash("abc").to_string(), "(h) abc (DH)");
    }

    #[test]
    fn test_serialized_hash_is_detached() {
        let value = serde_json::to_value(Version::hash("abc123")).unwrap();
        assert_eq!(value["kind"], "hash");
        assert_eq!(value["detached"], true);
    }

    #[test]
    fn test_ref_namespace() {
        assert_eq!(VersionKind::Branch.ref_namespace(), Some("heads"));
        assert_eq!(VersionKind::Tag.ref_namespace(), Some("tags"));
        assert_eq!(VersionKind::Hash.ref_namespace(), None);
    }
}
