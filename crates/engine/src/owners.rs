//! Ownership-mapping document parsing and path resolution.
//!
//! The source document is line-oriented `pattern owner owner…` entries
//! (CODEOWNERS format). Later entries override earlier ones on pattern
//! collision, the same layered semantics as ignore files.

use glob::{MatchOptions, Pattern};

use warden_github::{GithubError, RepoClient};

/// Repository path of the ownership document.
pub const OWNERS_PATH: &str = ".github/CODEOWNERS";

/// One `pattern owner owner…` line, in declaration order. Owner
/// identifiers are kept exactly as declared.
#[derive(Debug, Clone, PartialEq)]
pub struct OwnerEntry {
    pub pattern: String,
    pub owners: Vec<String>,
}

/// Parsed ownership document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OwnerFile {
    entries: Vec<OwnerEntry>,
}

impl OwnerFile {
    /// Parse the line-oriented format. Comment (`#`) and blank lines are
    /// skipped.
    pub fn parse(content: &str) -> Self {
        let mut entries = Vec::new();
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut parts = line.split_whitespace();
            let Some(pattern) = parts.next() else { continue };
            entries.push(OwnerEntry {
                pattern: pattern.to_string(),
                owners: parts.map(str::to_string).collect(),
            });
        }
        Self { entries }
    }

    /// Fetch and parse the ownership document; a missing file resolves to
    /// an empty document.
    pub async fn fetch(client: &dyn RepoClient) -> Result<Self, GithubError> {
        match client.get_file_contents(OWNERS_PATH, None).await {
            Ok(content) => Ok(Self::parse(&content)),
            Err(e) if e.is_not_found() => Ok(Self::default()),
            Err(e) => Err(e),
        }
    }

    pub fn entries(&self) -> &[OwnerEntry] {
        &self.entries
    }

    /// Owners of the last entry in declaration order whose pattern
    /// matches `path`; empty when nothing matches.
    pub fn owners_for(&self, path: &str) -> Vec<String> {
        let mut matched: &[String] = &[];
        for entry in &self.entries {
            if pattern_matches(&entry.pattern, path) {
                matched = &entry.owners;
            }
        }
        matched.to_vec()
    }

    /// Resolve the owners for a set of changed paths.
    ///
    /// A later path with a non-empty resolution replaces the accumulator
    /// rather than merging into it (most specific changed file wins).
    /// Identity markers (`@`) are stripped from the resolved names.
    pub fn resolve_owners<S: AsRef<str>>(&self, paths: &[S]) -> Vec<String> {
        let mut required: Vec<String> = Vec::new();
        for path in paths {
            let owners = self.owners_for(path.as_ref());
            if !owners.is_empty() {
                required = owners;
            }
        }
        required.iter().map(|owner| normalize_owner(owner)).collect()
    }
}

/// Strip the `@` identity marker; email identifiers pass through
/// unchanged.
fn normalize_owner(owner: &str) -> String {
    owner.strip_prefix('@').unwrap_or(owner).to_string()
}

/// CODEOWNERS-style matching: a bare `*.rs` matches at any depth, a
/// leading `/` anchors the pattern at the repository root, a trailing `/`
/// matches everything below that directory.
fn pattern_matches(pattern: &str, path: &str) -> bool {
    if let Some(dir) = pattern.strip_suffix('/') {
        let dir = dir.trim_start_matches('/');
        return path.starts_with(&format!("{dir}/"));
    }
    let anchored = pattern.starts_with('/');
    let Ok(compiled) = Pattern::new(pattern.trim_start_matches('/')) else {
        return false;
    };
    if anchored {
        let options = MatchOptions {
            require_literal_separator: true,
            ..MatchOptions::default()
        };
        compiled.matches_with(path, options)
    } else {
        compiled.matches(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_matching_entry_wins() {
        let file = OwnerFile::parse("*.js @a\n*.md @b\n");
        assert_eq!(file.owners_for("readme.md"), vec!["@b"]);
        assert_eq!(file.owners_for("x.js"), vec!["@a"]);
        assert!(file.owners_for("x.txt").is_empty());
    }

    #[test]
    fn later_entries_override_on_collision() {
        let file = OwnerFile::parse("*.rs @team\nsrc/special.rs @expert\n");
        assert_eq!(file.owners_for("src/special.rs"), vec!["@expert"]);
        assert_eq!(file.owners_for("src/other.rs"), vec!["@team"]);
    }

    #[test]
    fn comments_and_blanks_are_skipped() {
        let file = OwnerFile::parse("# ownership\n\n*.rs @a @b\n");
        assert_eq!(file.entries().len(), 1);
        assert_eq!(file.owners_for("lib.rs"), vec!["@a", "@b"]);
    }

    #[test]
    fn bare_glob_matches_at_any_depth() {
        let file = OwnerFile::parse("*.rs @a\n");
        assert_eq!(file.owners_for("deep/nested/mod.rs"), vec!["@a"]);
    }

    #[test]
    fn anchored_pattern_stays_at_the_root() {
        let file = OwnerFile::parse("/docs/* @writer\n");
        assert_eq!(file.owners_for("docs/guide.md"), vec!["@writer"]);
        assert!(file.owners_for("nested/docs/guide.md").is_empty());
    }

    #[test]
    fn directory_pattern_covers_the_subtree() {
        let file = OwnerFile::parse("ci/ @ops\n");
        assert_eq!(file.owners_for("ci/deploy/run.sh"), vec!["@ops"]);
        assert!(file.owners_for("cistern.txt").is_empty());
    }

    #[test]
    fn resolution_strips_identity_markers() {
        let file = OwnerFile::parse("*.md @writer docs@example.com\n");
        let owners = file.resolve_owners(&["readme.md"]);
        assert_eq!(owners, vec!["writer", "docs@example.com"]);
    }

    #[test]
    fn later_paths_override_the_accumulator() {
        let file = OwnerFile::parse("*.js @a\n*.md @b\n");
        let owners = file.resolve_owners(&["x.js", "readme.md"]);
        assert_eq!(owners, vec!["b"]);
        // a path with no owners leaves the previous resolution standing
        let owners = file.resolve_owners(&["x.js", "unowned.txt"]);
        assert_eq!(owners, vec!["a"]);
    }
}
