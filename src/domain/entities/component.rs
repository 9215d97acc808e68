use crate::domain::value_objects::version::Version;
use serde::Serialize;

/// One manifest-declared repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Component {
    /// Unique key in the manifest.
    pub name: String,

    /// Checkout location, relative to the workspace root.
    pub local: String,

    /// Remote URL as written in the manifest (may be `..`-relative).
    pub remote: String,

    /// Pinned version.
    pub version: Version,

    /// Development branch to use instead of the pin, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub develop: Option<String>,

    /// Sparse-checkout spec file, relative to the workspace root.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sparse: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurse_submodules: Option<bool>,
}

impl Component {
    pub fn new(
        name: impl Into<String>,
        local: impl Into<String>,
        remote: impl Into<String>,
        version: Version,
    ) -> Self {
        Self {
            name: name.into(),
            local: local.into(),
            remote: remote.into(),
            version,
            develop: None,
            sparse: None,
            recurse_submodules: None,
        }
    }

    pub fn with_develop(mut self, develop: impl Into<String>) -> Self {
        self.develop = Some(develop.into());
        self
    }

    pub fn with_sparse(mut self, sparse: impl Into<String>) -> Self {
        self.sparse = Some(sparse.into());
        self
    }

    pub fn with_recurse_submodules(mut self, recurse: bool) -> Self {
        self.recurse_submodules = Some(recurse);
        self
    }

    /// Copy of this component re-pinned to `version`.
    pub fn repinned(&self, version: Version) -> Self {
        Self {
            version,
            ..self.clone()
        }
    }

    pub fn recurses_submodules(&self) -> bool {
        self.recurse_submodules.unwrap_or(false)
    }
}
