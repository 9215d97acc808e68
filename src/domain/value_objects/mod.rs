pub mod remote_url;
pub mod version;

pub use remote_url::{RemoteUrl, RemoteUrlError};
pub use version::{Version, VersionKind};
