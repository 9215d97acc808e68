//! Human-readable rendering of `git status --porcelain=v2`.

use colored::Colorize;
use serde::Serialize;

/// Change classification taken from a porcelain-v2 record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Untracked,
    DeletedNotStaged,
    ModifiedNotStaged,
    AddedNotStaged,
    DeletedStaged,
    ModifiedStaged,
    AddedStaged,
    ModifiedStagedWithUnstaged,
    ModifiedStagedButDeleted,
    AddedStagedWithUnstaged,
    AddedStagedButDeleted,
    Renamed,
    RenamedWithUnstaged,
    RenamedButDeleted,
    Copied,
    CopiedWithUnstaged,
    CopiedButDeleted,
    /// Any XY code not listed above, kept verbatim.
    Unknown(String),
}

impl ChangeKind {
    fn from_xy(code: &str) -> Self {
        match code {
            ".D" => Self::DeletedNotStaged,
            ".M" => Self::ModifiedNotStaged,
            ".A" => Self::AddedNotStaged,
            "D." => Self::DeletedStaged,
            "M." => Self::ModifiedStaged,
            "A." => Self::AddedStaged,
            "MM" => Self::ModifiedStagedWithUnstaged,
            "MD" => Self::ModifiedStagedButDeleted,
            "AM" => Self::AddedStagedWithUnstaged,
            "AD" => Self::AddedStagedButDeleted,
            "R." => Self::Renamed,
            "RM" => Self::RenamedWithUnstaged,
            "RD" => Self::RenamedButDeleted,
            "C." => Self::Copied,
            "CM" => Self::CopiedWithUnstaged,
            "CD" => Self::CopiedButDeleted,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// Rename and copy records carry a second path.
    pub fn has_new_path(&self) -> bool {
        matches!(
            self,
            Self::Renamed
                | Self::RenamedWithUnstaged
                | Self::RenamedButDeleted
                | Self::Copied
                | Self::CopiedWithUnstaged
                | Self::CopiedButDeleted
        )
    }
}

/// One parsed status line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeRecord {
    /// Last whitespace-separated field of the record.
    pub path: String,
    pub kind: ChangeKind,
    /// Second-to-last field, for renames and copies.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_path: Option<String>,
}

impl ChangeRecord {
    /// Parse one record; blank lines yield `None`.
    pub fn parse(line: &str) -> Option<Self> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        let (first, last) = (fields.first()?, fields.last()?);

        let kind = if *first == "?" {
            ChangeKind::Untracked
        } else {
            ChangeKind::from_xy(fields.get(1).copied().unwrap_or_default())
        };

        let new_path = if kind.has_new_path() && fields.len() >= 2 {
            Some(fields[fields.len() - 2].to_string())
        } else {
            None
        };

        Some(Self {
            path: last.to_string(),
            kind,
            new_path,
        })
    }

    pub fn description(&self) -> String {
        let new_name = self.new_path.as_deref().unwrap_or_default().yellow();
        let unstaged = |s: &str| s.red().to_string();
        let staged = |s: &str| s.green().to_string();

        match &self.kind {
            ChangeKind::Untracked => unstaged("untracked file"),
            ChangeKind::DeletedNotStaged => unstaged("deleted, not staged"),
            ChangeKind::ModifiedNotStaged => unstaged("modified, not staged"),
            ChangeKind::AddedNotStaged => unstaged("added, not staged"),
            ChangeKind::DeletedStaged => staged("deleted, staged"),
            ChangeKind::ModifiedStaged => staged("modified, staged"),
            ChangeKind::AddedStaged => staged("added, staged"),
            ChangeKind::ModifiedStagedWithUnstaged => format!(
                "{} with {}",
                staged("modified, staged"),
                unstaged("unstaged changes")
            ),
            ChangeKind::ModifiedStagedButDeleted => format!(
                "{} but {}",
                staged("modified, staged"),
                unstaged("deleted, not staged")
            ),
            ChangeKind::AddedStagedWithUnstaged => format!(
                "{} with {}",
                staged("added, staged"),
                unstaged("unstaged changes")
            ),
            ChangeKind::AddedStagedButDeleted => format!(
                "{} but {}",
                staged("added, staged"),
                unstaged("deleted, not staged")
            ),
            ChangeKind::Renamed => format!("{} as {}", staged("renamed"), new_name),
            ChangeKind::RenamedWithUnstaged => format!(
                "{} as {} with {}",
                staged("renamed, staged"),
                new_name,
                unstaged("unstaged changes")
            ),
            ChangeKind::RenamedButDeleted => format!(
                "{} as {} but {}",
                staged("renamed, staged"),
                new_name,
                unstaged("deleted, not staged")
            ),
            ChangeKind::Copied => format!("{} as {}", staged("copied"), new_name),
            ChangeKind::CopiedWithUnstaged => format!(
                "{} as {} with {}",
                staged("copied, staged"),
                new_name,
                unstaged("unstaged changes")
            ),
            ChangeKind::CopiedButDeleted => format!(
                "{} as {} but {}",
                staged("copied, staged"),
                new_name,
                unstaged("deleted, not staged")
            ),
            ChangeKind::Unknown(_) => format!(
                "{} (please contact the metapin maintainers)",
                "unknown".cyan()
            ),
        }
    }
}

/// Parse every non-blank line of porcelain-v2 output.
pub fn parse_records(output: &str) -> Vec<ChangeRecord> {
    output.lines().filter_map(ChangeRecord::parse).collect()
}

/// One line per record, paths right-aligned to the longest one.
pub fn format_records(records: &[ChangeRecord]) -> String {
    let width = records
        .iter()
        .map(|r| r.path.chars().count())
        .max()
        .unwrap_or(0);

    records
        .iter()
        .map(|r| format!("{:>width$}: {}", r.path, r.description(), width = width))
        .collect::<Vec<_>>()
        .join("\n")
        .trim_end()
        .to_string()
}

/// Render raw porcelain-v2 output.
pub fn format_status(output: &str) -> String {
    format_records(&parse_records(output))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PORCELAIN: &str = "\
1 .M N... 100644 100644 100644 3b18e51 3b18e51 src/lib.rs
1 A. N... 000000 100644 100644 0000000 e69de29 new.txt
2 R. N... 100644 100644 100644 5716ca5 5716ca5 R100 renamed.txt\told.txt
1 MM N... 100644 100644 100644 3b18e51 3b18e51 README.md
? foo.txt
u UU N... 100644 100644 100644 100644 a b c conflict.txt
";

    #[test]
    fn test_parse_kinds() {
        let records = parse_records(PORCELAIN);
        let kinds: Vec<&ChangeKind> = records.iter().map(|r| &r.kind).collect();
        assert_eq!(
            kinds,
            vec![
                &ChangeKind::ModifiedNotStaged,
                &ChangeKind::AddedStaged,
                &ChangeKind::Renamed,
                &ChangeKind::ModifiedStagedWithUnstaged,
                &ChangeKind::Untracked,
                &ChangeKind::Unknown("UU".to_string()),
            ]
        );
    }

    #[test]
    fn test_rename_record_fields() {
        let record = ChangeRecord::parse(
            "2 R. N... 100644 100644 100644 5716ca5 5716ca5 R100 renamed.txt\told.txt",
        )
        .unwrap();
        assert_eq!(record.path, "old.txt");
        assert_eq!(record.new_path.as_deref(), Some("renamed.txt"));
        assert!(record.description().contains("renamed"));
        assert!(record.description().contains("renamed.txt"));
    }

    #[test]
    fn test_untracked_line() {
        assert_eq!(
            format_status("? foo.txt\n"),
            format!("foo.txt: {}", "untracked file".red())
        );
    }

    #[test]
    fn test_descriptions() {
        let records = parse_records(PORCELAIN);
        assert!(records[0].description().contains("modified, not staged"));
        assert!(records[1].description().contains("added, staged"));
        assert!(records[3].description().contains("with"));
        assert!(records[3].description().contains("unstaged changes"));
        assert!(records[5]
            .description()
            .contains("(please contact the metapin maintainers)"));
    }

    #[test]
    fn test_paths_are_right_aligned() {
        let text = format_status(PORCELAIN);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 6);

        let longest = "conflict.txt".len();
        for line in &lines {
            assert_eq!(line.find(": "), Some(longest), "misaligned: {}", line);
        }
        assert!(lines[4].starts_with("     foo.txt: "));
    }

    #[test]
    fn test_width_does_not_depend_on_order() {
        let forward = format_status("? a.txt\n? much_longer_name.txt\n");
        let backward = format_status("? much_longer_name.txt\n? a.txt\n");
        let column = |text: &str| text.lines().map(|l| l.find(": ")).collect::<Vec<_>>();
        assert_eq!(column(&forward), vec![Some(20), Some(20)]);
        assert_eq!(column(&backward), vec![Some(20), Some(20)]);
    }

    #[test]
    fn test_empty_output() {
        assert_eq!(format_status(""), "");
        assert_eq!(format_status("\n\n"), "");
        assert!(parse_records("").is_empty());
    }
}
