pub mod use_cases;

pub use use_cases::manifest_sync::{BulkReport, ManifestSync, SkipReason};
