use anyhow::{anyhow, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command as GitCommand;

use crate::change::{ChangeRecord, ContentLookup, DiffEntry};
use crate::error::LookupError;

/// Which set of changes to collect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffScope {
    /// Unstaged working-tree changes followed by staged changes.
    Working,
    /// Index vs HEAD.
    Staged,
    /// The given branch vs HEAD.
    Branch(String),
}

impl DiffScope {
    /// Revision the previous file contents are read from.
    pub fn base_revision(&self) -> &str {
        match self {
            DiffScope::Working | DiffScope::Staged => "HEAD",
            DiffScope::Branch(name) => name,
        }
    }

    /// Argument sets passed to `git diff`, one per pass.
    fn diff_args(&self) -> Vec<Vec<String>> {
        match self {
            DiffScope::Working => vec![vec![], vec!["--cached".into()]],
            DiffScope::Staged => vec![vec!["--cached".into()]],
            DiffScope::Branch(name) => vec![vec![name.clone(), "HEAD".into()]],
        }
    }
}

/// Run a git command and capture stdout as String.
pub fn git_output(args: &[&str]) -> Result<String> {
    git_output_in(Path::new("."), args)
}

/// Like [`git_output`], but run from `dir`.
fn git_output_in(dir: &Path, args: &[&str]) -> Result<String> {
    let output = GitCommand::new("git")
        .current_dir(dir)
        .args(args)
        .output()
        .with_context(|| format!("failed to run git {:?} in {:?}", args, dir))?;

    if !output.status.success() {
        return Err(anyhow!(
            "git {:?} exited with status {:?}",
            args,
            output.status.code()
        ));
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

/// Get the path to the Git directory (e.g. .git)
pub fn git_dir() -> Result<PathBuf> {
    let dir = git_output(&["rev-parse", "--git-dir"])?.trim().to_string();
    Ok(PathBuf::from(dir))
}

/// True when the current directory is inside a Git work tree.
pub fn is_repository() -> bool {
    git_output(&["rev-parse", "--is-inside-work-tree"])
        .map(|out| out.trim() == "true")
        .unwrap_or(false)
}

/// Write the commit message into .git/COMMIT_EDITMSG so the next `git commit`
/// will use it as the default message in the editor.
pub fn write_commit_editmsg(message: &str) -> Result<()> {
    let dir = git_dir()?;
    let path = dir.join("COMMIT_EDITMSG");
    fs::write(&path, message)
        .with_context(|| format!("failed to write commit message to {:?}", path))?;
    Ok(())
}

/// Content lookup backed by `git show <rev>:<path>`.
pub struct GitCli;

impl ContentLookup for GitCli {
    fn fetch(&self, path: &str, revision: &str) -> Result<String, LookupError> {
        let object = format!("{revision}:{path}");
        git_output(&["show", &object]).map_err(|e| {
            log::trace!("git show {object} failed: {e:#}");
            LookupError::NotFound {
                path: path.to_string(),
                revision: revision.to_string(),
            }
        })
    }
}

/// List the files touched in `scope` along with their per-file diff bodies.
pub fn enumerate_changes(scope: &DiffScope) -> Result<Vec<DiffEntry>> {
    enumerate_changes_in(Path::new("."), scope)
}

/// `--name-status` prints paths relative to the repository root, so the
/// per-file pathspecs are anchored there with `:(top)` whatever `dir` is.
fn enumerate_changes_in(dir: &Path, scope: &DiffScope) -> Result<Vec<DiffEntry>> {
    let mut entries = Vec::new();

    for pass in scope.diff_args() {
        let mut args: Vec<&str> = vec!["diff", "-M", "--name-status", "-z"];
        args.extend(pass.iter().map(String::as_str));
        let listing = git_output_in(dir, &args)?;

        for mut entry in parse_name_status(&listing) {
            let mut pathspecs = Vec::new();
            if entry.renamed {
                pathspecs.extend(entry.a_path.as_deref().map(top_pathspec));
            }
            pathspecs.extend(
                entry
                    .b_path
                    .as_deref()
                    .or(entry.a_path.as_deref())
                    .map(top_pathspec),
            );

            let mut body_args: Vec<&str> = vec!["diff", "-M"];
            body_args.extend(pass.iter().map(String::as_str));
            body_args.push("--");
            body_args.extend(pathspecs.iter().map(String::as_str));

            entry.body = git_output_in(dir, &body_args)?;
            entries.push(entry);
        }
    }

    log::info!("Found {} changed file(s) for {:?}", entries.len(), scope);
    Ok(entries)
}

/// Collect changes in `scope` and normalize them into change records.
pub fn collect_change_records(scope: &DiffScope) -> Result<Vec<ChangeRecord>> {
    let revision = scope.base_revision();
    let records = enumerate_changes(scope)?
        .iter()
        .map(|entry| ChangeRecord::from_entry(entry, &GitCli, revision))
        .collect();
    Ok(records)
}

/// Root-relative, non-glob pathspec for a path printed by `git diff`.
fn top_pathspec(path: &str) -> String {
    format!(":(top,literal){path}")
}

/// Parse `git diff --name-status -z` output into entries without bodies.
///
/// Records are NUL separated: `STATUS\0PATH\0`, or `RNNN\0OLD\0NEW\0` for renames
/// and copies.
fn parse_name_status(listing: &str) -> Vec<DiffEntry> {
    let mut fields = listing.split('\0').filter(|f| !f.is_empty());
    let mut entries = Vec::new();

    while let Some(status) = fields.next() {
        let kind = status.chars().next().unwrap_or('M');

        let entry = match kind {
            'R' | 'C' => {
                let (Some(old), Some(new)) = (fields.next(), fields.next()) else {
                    log::warn!("Truncated rename record in git output: {status:?}");
                    break;
                };
                DiffEntry {
                    renamed: kind == 'R',
                    new_file: kind == 'C',
                    a_path: Some(old.to_string()),
                    b_path: Some(new.to_string()),
                    ..DiffEntry::default()
                }
            }
            _ => {
                let Some(path) = fields.next() else {
                    log::warn!("Missing path after status {status:?} in git output");
                    break;
                };
                DiffEntry {
                    new_file: kind == 'A',
                    deleted_file: kind == 'D',
                    a_path: (kind != 'A').then(|| path.to_string()),
                    b_path: (kind != 'D').then(|| path.to_string()),
                    ..DiffEntry::default()
                }
            }
        };

        entries.push(entry);
    }

    entries
}
