use super::component::Component;
use crate::common::error::MetapinError;
use crate::common::result::MetapinResult;
use crate::domain::value_objects::version::{Version, VersionKind};
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use std::path::Path;

/// Default manifest file name at the workspace root.
pub const MANIFEST_FILE_NAME: &str = "components.yaml";

/// Accepted when no `components.yaml` exists.
pub const ALT_MANIFEST_FILE_NAME: &str = "components.yml";

/// One manifest entry as written on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ComponentEntry {
    pub local: String,

    pub remote: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub develop: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sparse: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurse_submodules: Option<bool>,
}

impl ComponentEntry {
    /// Build the component named `name`; exactly one of branch/tag/hash must
    /// be set.
    pub fn into_component(self, name: &str) -> MetapinResult<Component> {
        let version = match (&self.branch, &self.tag, &self.hash) {
            (Some(branch), None, None) => Version::remote_branch(branch),
            (None, Some(tag), None) => Version::tag(tag),
            (None, None, Some(hash)) => Version::hash(hash),
            (None, None, None) => {
                return Err(MetapinError::manifest_error(
                    format!("component [{}] has no branch, tag or hash", name),
                    None,
                ))
            }
            _ => {
                return Err(MetapinError::manifest_error(
                    format!(
                        "component [{}] must have only one of branch, tag or hash",
                        name
                    ),
                    None,
                ))
            }
        };

        Ok(Component {
            name: name.to_string(),
            local: self.local,
            remote: self.remote,
            version,
            develop: self.develop,
            sparse: self.sparse,
            recurse_submodules: self.recurse_submodules,
        })
    }

    pub fn from_component(component: &Component) -> Self {
        let pin = Some(component.version.manifest_name().to_string());
        let (branch, tag, hash) = match component.version.kind() {
            VersionKind::Branch => (pin, None, None),
            VersionKind::Tag => (None, pin, None),
            VersionKind::Hash => (None, None, pin),
        };

        Self {
            local: component.local.clone(),
            remote: component.remote.clone(),
            branch,
            tag,
            hash,
            develop: component.develop.clone(),
            sparse: component.sparse.clone(),
            recurse_submodules: component.recurse_submodules,
        }
    }
}

/// Ordered component list read from `components.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    pub components: Vec<Component>,
}

impl Manifest {
    pub fn new(components: Vec<Component>) -> Self {
        Self { components }
    }

    /// Parse manifest YAML, keeping the document's component order.
    pub fn from_yaml_str(content: &str, file_path: Option<&Path>) -> MetapinResult<Self> {
        let file_path_buf = file_path.map(Path::to_path_buf);
        let document: Value = serde_yaml::from_str(content).map_err(|e| {
            MetapinError::manifest_error_with_source(
                "failed to parse manifest YAML",
                file_path_buf.clone(),
                e,
            )
        })?;

        let mapping = match document {
            Value::Null => return Ok(Self::default()),
            Value::Mapping(mapping) => mapping,
            _ => {
                return Err(MetapinError::manifest_error(
                    "manifest must be a mapping of component names",
                    file_path_buf,
                ))
            }
        };

        let mut components = Vec::with_capacity(mapping.len());
        for (key, value) in mapping {
            let name = key.as_str().map(str::to_string).ok_or_else(|| {
                MetapinError::manifest_error(
                    format!("component name {:?} is not a string", key),
                    file_path_buf.clone(),
                )
            })?;
            let entry: ComponentEntry = serde_yaml::from_value(value).map_err(|e| {
                MetapinError::manifest_error_with_source(
                    format!("invalid entry for component [{}]", name),
                    file_path_buf.clone(),
                    e,
                )
            })?;
            components.push(entry.into_component(&name)?);
        }

        Ok(Self { components })
    }

    pub fn to_yaml_string(&self) -> MetapinResult<String> {
        let mut mapping = Mapping::new();
        for component in &self.components {
            let entry = serde_yaml::to_value(ComponentEntry::from_component(component))?;
            mapping.insert(Value::String(component.name.clone()), entry);
        }
        Ok(serde_yaml::to_string(&mapping)?)
    }

    pub fn find(&self, name: &str) -> Option<&Component> {
        self.components.iter().find(|c| c.name == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.components.iter().map(|c| c.name.as_str()).collect()
    }

    /// Replace components with updated copies of the same name.
    pub fn apply_updates(&mut self, updated: Vec<Component>) {
        for component in updated {
            if let Some(slot) = self
                .components
                .iter_mut()
                .find(|c| c.name == component.name)
            {
                *slot = component;
            }
        }
    }
}
