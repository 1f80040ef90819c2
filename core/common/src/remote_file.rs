//! Typed, namespaced identities for objects stored on a remote backend.
//!
//! Every remote object belongs to exactly one [`RemoteFileType`]. The type
//! decides the namespace prefix prepended to the object's simple name, so a
//! remote path always reads `<prefix><simple name>`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// Fixed simple name of the repository marker object.
pub const REPO_FILE_NAME: &str = "syncany";

/// Category of a remote object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemoteFileType {
    /// Bulk chunk container.
    Multichunk,
    /// Database delta.
    Database,
    /// Cleanup marker, stored next to the databases.
    Cleanup,
    /// Action marker (locks, cleanup in progress).
    Action,
    /// Transaction manifest.
    Transaction,
    /// Temporary object written during a transaction.
    Temp,
    /// Repository marker.
    Repo,
}

impl RemoteFileType {
    /// All remote file types.
    pub const ALL: [RemoteFileType; 7] = [
        RemoteFileType::Multichunk,
        RemoteFileType::Database,
        RemoteFileType::Cleanup,
        RemoteFileType::Action,
        RemoteFileType::Transaction,
        RemoteFileType::Temp,
        RemoteFileType::Repo,
    ];

    /// Namespace prefix for this type.
    ///
    /// Cleanup objects share the database namespace. The repository marker
    /// has no namespace and lives under its bare name.
    pub fn prefix(self) -> &'static str {
        match self {
            RemoteFileType::Multichunk => "mc-",
            RemoteFileType::Database | RemoteFileType::Cleanup => "db-",
            RemoteFileType::Action => "ac-",
            RemoteFileType::Transaction => "tx-",
            RemoteFileType::Temp => "tmp-",
            RemoteFileType::Repo => "",
        }
    }

    /// Infer the type owning a namespace prefix (including the trailing `-`).
    ///
    /// `db-` maps to [`RemoteFileType::Database`]; cleanup objects cannot be
    /// told apart from databases by their prefix alone.
    pub fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "mc-" => Some(RemoteFileType::Multichunk),
            "db-" => Some(RemoteFileType::Database),
            "ac-" => Some(RemoteFileType::Action),
            "tx-" => Some(RemoteFileType::Transaction),
            "tmp-" => Some(RemoteFileType::Temp),
            _ => None,
        }
    }

    /// Lowercase name of this type.
    pub fn as_str(self) -> &'static str {
        match self {
            RemoteFileType::Multichunk => "multichunk",
            RemoteFileType::Database => "database",
            RemoteFileType::Cleanup => "cleanup",
            RemoteFileType::Action => "action",
            RemoteFileType::Transaction => "transaction",
            RemoteFileType::Temp => "temp",
            RemoteFileType::Repo => "repo",
        }
    }

    /// Check that `name` is structurally valid for this type.
    ///
    /// # Errors
    /// - `Error::PatternMismatch` if the name is empty, starts with `-`,
    ///   or contains characters outside `[A-Za-z0-9._-]`
    /// - `Error::PatternMismatch` if a repository marker is not named
    ///   [`REPO_FILE_NAME`]
    /// - `Error::PatternMismatch` if a cleanup name is not `cleanup-<digits>`,
    ///   or a database name is
    pub fn validate_name(self, name: &str) -> Result<()> {
        let mismatch = || Error::PatternMismatch {
            kind: self.as_str(),
            name: name.to_string(),
        };

        if self == RemoteFileType::Repo {
            return if name == REPO_FILE_NAME {
                Ok(())
            } else {
                Err(mismatch())
            };
        }

        if name.is_empty() || name.starts_with('-') {
            return Err(mismatch());
        }

        let valid = name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
        if !valid {
            return Err(mismatch());
        }

        match self {
            RemoteFileType::Cleanup if !is_cleanup_name(name) => Err(mismatch()),
            RemoteFileType::Database if is_cleanup_name(name) => Err(mismatch()),
            _ => Ok(()),
        }
    }
}

/// Cleanup and database objects share `db-`; cleanups are `cleanup-<digits>`.
fn is_cleanup_name(name: &str) -> bool {
    name.strip_prefix("cleanup-")
        .is_some_and(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
}

impl fmt::Display for RemoteFileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RemoteFileType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        RemoteFileType::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::InvalidType(s.to_string()))
    }
}

/// Identity of a remote object: its type and its simple name.
///
/// The simple name never carries the namespace prefix; see
/// [`RemoteFile::remote_path`] for the fully qualified form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RemoteFile {
    kind: RemoteFileType,
    name: String,
}

impl RemoteFile {
    /// Create a remote file identity.
    ///
    /// # Errors
    /// - `Error::PatternMismatch` if `name` is not valid for `kind`
    pub fn new(kind: RemoteFileType, name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        kind.validate_name(&name)?;
        Ok(Self { kind, name })
    }

    /// The repository marker object.
    pub fn repo() -> Self {
        Self {
            kind: RemoteFileType::Repo,
            name: REPO_FILE_NAME.to_string(),
        }
    }

    /// Type of this object.
    pub fn kind(&self) -> RemoteFileType {
        self.kind
    }

    /// Simple name, without namespace prefix.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fully qualified remote path: `prefix(kind) + name`.
    pub fn remote_path(&self) -> String {
        format!("{}{}", self.kind.prefix(), self.name)
    }

    /// Whether this object carries bulk chunk data.
    ///
    /// Multichunks and temp objects holding a multichunk belong on the
    /// primary data channel of a backend.
    pub fn is_bulk_data(&self) -> bool {
        match self.kind {
            RemoteFileType::Multichunk => true,
            RemoteFileType::Temp => self.name.contains("multichunk"),
            _ => false,
        }
    }

    /// Recover an identity of `kind` from a raw listed object name.
    ///
    /// Returns `Ok(None)` when the name belongs to another namespace, has no
    /// `-` separated prefix segment, or has nothing after the prefix. A `db-`
    /// name of the sibling type (a cleanup seen by a database listing, or the
    /// reverse) is also `Ok(None)`. Such names are skipped by callers.
    ///
    /// # Errors
    /// - `Error::PatternMismatch` if the name is in `kind`'s namespace but the
    ///   remainder is not a valid simple name
    pub fn from_listed_name(raw: &str, kind: RemoteFileType) -> Result<Option<Self>> {
        if kind == RemoteFileType::Repo {
            return Ok((raw == REPO_FILE_NAME).then(Self::repo));
        }

        let Some((segment, simple_name)) = raw.split_once('-') else {
            return Ok(None);
        };

        if simple_name.is_empty() || kind.prefix().strip_suffix('-') != Some(segment) {
            return Ok(None);
        }

        let sibling = match kind {
            RemoteFileType::Database => is_cleanup_name(simple_name),
            RemoteFileType::Cleanup => !is_cleanup_name(simple_name),
            _ => false,
        };
        if sibling {
            return Ok(None);
        }

        Self::new(kind, simple_name).map(Some)
    }

    /// Recover an identity from a raw listed name, inferring its type.
    ///
    /// The type comes from the first `-` separated segment. Names in the
    /// shared `db-` namespace are cleanups when the remainder is
    /// `cleanup-<digits>`, databases otherwise.
    ///
    /// # Errors
    /// - `Error::PatternMismatch` if the remainder is not a valid simple name
    pub fn parse_listed_name(raw: &str) -> Result<Option<Self>> {
        if raw == REPO_FILE_NAME {
            return Ok(Some(Self::repo()));
        }

        let Some((segment, simple_name)) = raw.split_once('-') else {
            return Ok(None);
        };

        match RemoteFileType::from_prefix(&format!("{segment}-")) {
            Some(RemoteFileType::Database) if is_cleanup_name(simple_name) => {
                Self::from_listed_name(raw, RemoteFileType::Cleanup)
            }
            Some(kind) => Self::from_listed_name(raw, kind),
            None => Ok(None),
        }
    }
}

impl fmt::Display for RemoteFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_remote_path_uses_prefix() {
        let file = RemoteFile::new(RemoteFileType::Multichunk, "abc123").unwrap();
        assert_eq!(file.remote_path(), "mc-abc123");

        let file = RemoteFile::new(RemoteFileType::Cleanup, "cleanup-5").unwrap();
        assert_eq!(file.remote_path(), "db-cleanup-5");

        assert_eq!(RemoteFile::repo().remote_path(), "syncany");
    }

    #[test]
    fn test_prefixes_do_not_overlap() {
        let prefixes = ["mc-", "db-", "ac-", "tx-", "tmp-"];
        for a in prefixes {
            for b in prefixes {
                if a != b {
                    assert!(!a.starts_with(b), "{a} overlaps {b}");
                }
            }
        }
    }

    #[test]
    fn test_from_listed_name_strips_first_segment() {
        let file = RemoteFile::from_listed_name("db-A-0000000001", RemoteFileType::Database)
            .unwrap()
            .unwrap();
        assert_eq!(file.kind(), RemoteFileType::Database);
        assert_eq!(file.name(), "A-0000000001");
    }

    #[test]
    fn test_from_listed_name_skips_foreign_and_malformed() {
        let kind = RemoteFileType::Database;
        assert!(RemoteFile::from_listed_name("mc-xyz", kind).unwrap().is_none());
        assert!(RemoteFile::from_listed_name("badname", kind).unwrap().is_none());
        assert!(RemoteFile::from_listed_name("db-", kind).unwrap().is_none());
    }

    #[test]
    fn test_from_listed_name_pattern_mismatch() {
        let result = RemoteFile::from_listed_name("db-bad name", RemoteFileType::Database);
        assert!(matches!(result, Err(Error::PatternMismatch { .. })));
    }

    #[test]
    fn test_parse_listed_name_infers_type() {
        let file = RemoteFile::parse_listed_name("tmp-multichunk-1").unwrap().unwrap();
        assert_eq!(file.kind(), RemoteFileType::Temp);
        assert!(file.is_bulk_data());

        let file = RemoteFile::parse_listed_name("tx-42").unwrap().unwrap();
        assert_eq!(file.kind(), RemoteFileType::Transaction);
        assert!(!file.is_bulk_data());

        assert_eq!(
            RemoteFile::parse_listed_name("syncany").unwrap(),
            Some(RemoteFile::repo())
        );
        assert!(RemoteFile::parse_listed_name("zz-abc").unwrap().is_none());
    }

    #[test]
    fn test_repo_name_is_fixed() {
        assert!(RemoteFile::new(RemoteFileType::Repo, "other").is_err());
        assert!(RemoteFile::new(RemoteFileType::Repo, REPO_FILE_NAME).is_ok());
    }

    #[test]
    fn test_type_from_str() {
        assert_eq!(
            "Database".parse::<RemoteFileType>().unwrap(),
            RemoteFileType::Database
        );
        assert!(matches!(
            "chunk".parse::<RemoteFileType>(),
            Err(Error::InvalidType(_))
        ));
    }

    #[test]
    fn test_cleanup_names_are_structural() {
        assert!(RemoteFile::new(RemoteFileType::Cleanup, "cleanup-000001").is_ok());
        assert!(matches!(
            RemoteFile::new(RemoteFileType::Cleanup, "abc"),
            Err(Error::PatternMismatch { kind: "cleanup", .. })
        ));
        assert!(RemoteFile::new(RemoteFileType::Cleanup, "cleanup-").is_err());
        assert!(RemoteFile::new(RemoteFileType::Cleanup, "cleanup-1a").is_err());
        assert!(matches!(
            RemoteFile::new(RemoteFileType::Database, "cleanup-000001"),
            Err(Error::PatternMismatch { kind: "database", .. })
        ));
        assert!(RemoteFile::new(RemoteFileType::Database, "cleanup-x").is_ok());
    }

    #[test]
    fn test_shared_namespace_splits_by_name() {
        let database = RemoteFileType::Database;
        let cleanup = RemoteFileType::Cleanup;

        assert!(RemoteFile::from_listed_name("db-cleanup-000001", database)
            .unwrap()
            .is_none());
        assert!(RemoteFile::from_listed_name("db-A-0000000001", cleanup)
            .unwrap()
            .is_none());

        let file = RemoteFile::parse_listed_name("db-cleanup-000001").unwrap().unwrap();
        assert_eq!(file.kind(), cleanup);
        assert_eq!(file.name(), "cleanup-000001");

        let file = RemoteFile::parse_listed_name("db-A-0000000001").unwrap().unwrap();
        assert_eq!(file.kind(), database);
    }

    fn name_for(kind: RemoteFileType, name: String, digits: &str) -> String {
        match kind {
            RemoteFileType::Cleanup => format!("cleanup-{digits}"),
            RemoteFileType::Repo => REPO_FILE_NAME.to_string(),
            _ => name,
        }
    }

    proptest! {
        #[test]
        fn prop_listed_name_round_trip(
            index in 0usize..7,
            name in "[A-Za-z0-9._][A-Za-z0-9._-]{0,24}",
            digits in "[0-9]{1,10}",
        ) {
            prop_assume!(!is_cleanup_name(&name));
            let kind = RemoteFileType::ALL[index];
            let file = RemoteFile::new(kind, name_for(kind, name, &digits)).unwrap();
            let parsed = RemoteFile::from_listed_name(&file.remote_path(), kind).unwrap();
            prop_assert_eq!(parsed, Some(file));
        }

        #[test]
        fn prop_parsed_name_recovers_type(
            index in 0usize..7,
            name in "[A-Za-z0-9._][A-Za-z0-9._-]{0,24}",
            digits in "[0-9]{1,10}",
        ) {
            prop_assume!(!is_cleanup_name(&name));
            let kind = RemoteFileType::ALL[index];
            let file = RemoteFile::new(kind, name_for(kind, name, &digits)).unwrap();
            let parsed = RemoteFile::parse_listed_name(&file.remote_path()).unwrap();
            prop_assert_eq!(parsed, Some(file));
        }
    }
}
