use std::fmt;

use crate::error::LookupError;

/// Kind of change a file went through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeType {
    Added,
    Deleted,
    Renamed,
    Modified,
}

impl ChangeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeType::Added => "added",
            ChangeType::Deleted => "deleted",
            ChangeType::Renamed => "renamed",
            ChangeType::Modified => "modified",
        }
    }

    /// First matching flag wins: new, then deleted, then renamed.
    fn from_flags(new_file: bool, deleted_file: bool, renamed: bool) -> Self {
        if new_file {
            ChangeType::Added
        } else if deleted_file {
            ChangeType::Deleted
        } else if renamed {
            ChangeType::Renamed
        } else {
            ChangeType::Modified
        }
    }
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One file entry as reported by the version-control tool, before normalization.
#[derive(Debug, Clone, Default)]
pub struct DiffEntry {
    pub new_file: bool,
    pub deleted_file: bool,
    pub renamed: bool,
    /// Path before the change.
    pub a_path: Option<String>,
    /// Path after the change.
    pub b_path: Option<String>,
    pub body: String,
}

/// Reads a file's content as of a given revision.
pub trait ContentLookup {
    fn fetch(&self, path: &str, revision: &str) -> Result<String, LookupError>;
}

/// Normalized single-file change handed to the prompt builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeRecord {
    pub path: String,
    pub change_type: ChangeType,
    /// Unified diff for this file; empty when no patch could be produced.
    pub content: String,
    /// Previous full content of the file, or empty when unavailable.
    pub old_content: String,
}

impl ChangeRecord {
    pub fn new(
        path: impl Into<String>,
        change_type: ChangeType,
        content: impl Into<String>,
        old_content: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            change_type,
            content: content.into(),
            old_content: old_content.into(),
        }
    }

    /// Build a record from a raw diff entry, looking up the previous content at `revision`.
    ///
    /// Added files never trigger a lookup. Any lookup failure leaves `old_content` empty.
    pub fn from_entry(entry: &DiffEntry, lookup: &dyn ContentLookup, revision: &str) -> Self {
        let change_type = ChangeType::from_flags(entry.new_file, entry.deleted_file, entry.renamed);

        let path = entry
            .b_path
            .as_deref()
            .filter(|p| !p.is_empty())
            .or(entry.a_path.as_deref())
            .unwrap_or_default()
            .to_string();

        let old_content = match change_type {
            ChangeType::Added => String::new(),
            _ => {
                // Renames live under their old name in the previous revision.
                let old_path = entry
                    .a_path
                    .as_deref()
                    .filter(|p| !p.is_empty())
                    .unwrap_or(&path);
                match lookup.fetch(old_path, revision) {
                    Ok(text) => text,
                    Err(e) => {
                        log::debug!("No previous content for {path}: {e}");
                        String::new()
                    }
                }
            }
        };

        Self::new(path, change_type, entry.body.clone(), old_content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    struct RecordingLookup {
        calls: RefCell<Vec<(String, String)>>,
        result: Result<String, LookupError>,
    }

    impl RecordingLookup {
        fn returning(result: Result<String, LookupError>) -> Self {
            Self {
                calls: RefCell::new(Vec::new()),
                result,
            }
        }
    }

    impl ContentLookup for RecordingLookup {
        fn fetch(&self, path: &str, revision: &str) -> Result<String, LookupError> {
            self.calls
                .borrow_mut()
                .push((path.to_string(), revision.to_string()));
            self.result.clone()
        }
    }

    fn entry(new_file: bool, deleted_file: bool, renamed: bool) -> DiffEntry {
        DiffEntry {
            new_file,
            deleted_file,
            renamed,
            a_path: Some("src/old.rs".into()),
            b_path: Some("src/new.rs".into()),
            body: "@@ -1 +1 @@\n-a\n+b\n".into(),
        }
    }

    #[test]
    fn added_file_never_looks_up_previous_content() {
        let lookup = RecordingLookup::returning(Ok("should not be used".into()));
        let record = ChangeRecord::from_entry(&entry(true, false, false), &lookup, "HEAD");

        assert_eq!(record.change_type, ChangeType::Added);
        assert_eq!(record.old_content, "");
        assert!(lookup.calls.borrow().is_empty());
    }

    #[test]
    fn flags_resolve_in_priority_order() {
        let lookup = RecordingLookup::returning(Ok(String::new()));
        let cases = [
            ((true, true, true), ChangeType::Added),
            ((false, true, true), ChangeType::Deleted),
            ((false, false, true), ChangeType::Renamed),
            ((false, false, false), ChangeType::Modified),
        ];

        for ((n, d, r), expected) in cases {
            let record = ChangeRecord::from_entry(&entry(n, d, r), &lookup, "HEAD");
            assert_eq!(record.change_type, expected, "flags {n} {d} {r}");
        }
    }

    #[test]
    fn path_falls_back_to_pre_change_path() {
        let lookup = RecordingLookup::returning(Ok("old".into()));
        let mut deleted = entry(false, true, false);
        deleted.b_path = None;

        let record = ChangeRecord::from_entry(&deleted, &lookup, "HEAD");
        assert_eq!(record.path, "src/old.rs");
        assert_eq!(record.old_content, "old");
    }

    #[test]
    fn lookup_failure_becomes_empty_content() {
        let lookup = RecordingLookup::returning(Err(LookupError::NotFound {
            path: "src/old.rs".into(),
            revision: "main".into(),
        }));
        let record = ChangeRecord::from_entry(&entry(false, false, false), &lookup, "main");

        assert_eq!(record.change_type, ChangeType::Modified);
        assert_eq!(record.old_content, "");
        assert_eq!(lookup.calls.borrow().len(), 1);
    }

    #[test]
    fn rename_looks_up_old_path_at_revision() {
        let lookup = RecordingLookup::returning(Ok("before".into()));
        let record = ChangeRecord::from_entry(&entry(false, false, true), &lookup, "develop");

        assert_eq!(record.path, "src/new.rs");
        assert_eq!(
            lookup.calls.borrow().as_slice(),
            &[("src/old.rs".to_string(), "develop".to_string())]
        );
    }

    #[test]
    fn body_is_carried_over_verbatim() {
        let lookup = RecordingLookup::returning(Ok(String::new()));
        let record = ChangeRecord::from_entry(&entry(false, false, false), &lookup, "HEAD");
        assert_eq!(record.content, "@@ -1 +1 @@\n-a\n+b\n");
    }
}
