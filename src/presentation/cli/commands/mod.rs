pub mod branch;
pub mod stash;
pub mod status;
pub mod tag;

pub use branch::*;
pub use stash::*;
pub use status::*;
pub use tag::*;

use anyhow::Result;
use colored::Colorize;
use std::env;
use std::path::{Path, PathBuf};

use crate::application::use_cases::manifest_sync::{BulkReport, SkipReason};
use crate::domain::entities::component::Component;

/// Print acted-on components, then skipped ones grouped by reason.
pub fn print_report(report: &BulkReport) {
    for action in &report.actions {
        if action.detail.is_empty() {
            println!("- {}", action.component.bold());
        } else {
            println!("- {}: {}", action.component.bold(), action.detail);
        }
    }

    for reason in [
        SkipReason::DetachedHead,
        SkipReason::NoChanges,
        SkipReason::AlreadyCloned,
    ] {
        let names = report.skipped_for(reason);
        if !names.is_empty() {
            println!(
                "{} skipped ({}): {}",
                "::".yellow().bold(),
                reason,
                names.join(", ")
            );
        }
    }
}

/// Widest component name, for column alignment.
pub fn name_width<'a>(components: impl IntoIterator<Item = &'a Component>) -> usize {
    components
        .into_iter()
        .map(|c| c.name.chars().count())
        .max()
        .unwrap_or(0)
}

/// `name | first line`, continuation lines aligned under the first.
pub fn print_component_output(name: &str, output: &str, width: usize) {
    let mut lines = output.lines();
    let first = lines.next().unwrap_or_default();
    println!("{:<width$} | {}", name, first, width = width);
    for line in lines {
        println!("{:<width$} | {}", "", line, width = width);
    }
}

/// Resolve `path` against the current directory; git runs inside each
/// component, so relative paths would otherwise change meaning.
pub fn absolute_path(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(env::current_dir()?.join(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::version::Version;

    #[test]
    fn test_name_width() {
        let components = vec![
            Component::new("env", "./@env", "../env.git", Version::tag("v1")),
            Component::new("fvdycore", "./fv", "../fv.git", Version::tag("v1")),
        ];
        assert_eq!(name_width(&components), 8);
        assert_eq!(name_width(Vec::<&Component>::new()), 0);
    }

    #[test]
    fn test_absolute_path_keeps_absolute() {
        let path = Path::new("/tmp/message.txt");
        assert_eq!(absolute_path(path).unwrap(), PathBuf::from("/tmp/message.txt"));
        assert!(absolute_path(Path::new("message.txt")).unwrap().is_absolute());
    }
}
