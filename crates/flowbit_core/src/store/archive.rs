//! AOI archive contract and SQLite blob implementation.
//!
//! # Responsibility
//! - Provide load/save of the full AOI list as one JSON blob under a fixed
//!   key.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - The archive is a mechanism and reports failures as `Result`; the
//!   lenient-load and swallowed-save policies live in the store.
//! - Implementations must distinguish "never saved" (`Ok(None)`) from a
//!   present blob.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::aoi::Aoi;
use rusqlite::{params, Connection, OptionalExtension};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Fixed blob key for the persisted AOI list.
pub const AOI_BLOB_KEY: &str = "flowbit_aois_v1";

pub type ArchiveResult<T> = Result<T, ArchiveError>;

/// Archive error for blob persistence and decoding.
#[derive(Debug)]
pub enum ArchiveError {
    Db(DbError),
    /// The stored blob is not a valid JSON AOI list.
    MalformedBlob {
        key: &'static str,
        source: serde_json::Error,
    },
    /// Connection has never been migrated.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
}

impl Display for ArchiveError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::MalformedBlob { key, source } => {
                write!(f, "malformed archive blob under `{key}`: {source}")
            }
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection is not migrated: schema version {actual_version}, expected {expected_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "required table `{table}` is missing")
            }
        }
    }
}

impl Error for ArchiveError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::MalformedBlob { source, .. } => Some(source),
            Self::UninitializedConnection { .. } => None,
            Self::MissingRequiredTable(_) => None,
        }
    }
}

impl From<DbError> for ArchiveError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for ArchiveError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Persistence contract for the authoritative AOI list.
///
/// The value is the JSON-serialized list; consumers must treat a missing
/// blob as an empty list and must not let a malformed blob escalate past
/// the store's lenient load.
pub trait AoiArchive {
    /// Loads the persisted list; `Ok(None)` means nothing was ever saved.
    fn load(&self) -> ArchiveResult<Option<Vec<Aoi>>>;
    /// Replaces the persisted list with the given one.
    fn save(&self, aois: &[Aoi]) -> ArchiveResult<()>;
}

/// SQLite-backed archive storing the list under [`AOI_BLOB_KEY`].
pub struct SqliteAoiArchive {
    conn: Connection,
}

impl SqliteAoiArchive {
    /// Wraps a migrated connection, rejecting unmigrated or incomplete
    /// schemas up front instead of failing on first use.
    pub fn try_new(conn: Connection) -> ArchiveResult<Self> {
        let actual_version: u32 =
            conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
        let expected_version = latest_version();
        if actual_version != expected_version {
            return Err(ArchiveError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }

        let table_present: i64 = conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'panel_state';",
            [],
            |row| row.get(0),
        )?;
        if table_present == 0 {
            return Err(ArchiveError::MissingRequiredTable("panel_state"));
        }

        Ok(Self { conn })
    }
}

impl AoiArchive for SqliteAoiArchive {
    fn load(&self) -> ArchiveResult<Option<Vec<Aoi>>> {
        let blob: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM panel_state WHERE key = ?1;",
                [AOI_BLOB_KEY],
                |row| row.get(0),
            )
            .optional()?;

        let Some(blob) = blob else {
            return Ok(None);
        };

        let aois = serde_json::from_str(&blob).map_err(|source| ArchiveError::MalformedBlob {
            key: AOI_BLOB_KEY,
            source,
        })?;
        Ok(Some(aois))
    }

    fn save(&self, aois: &[Aoi]) -> ArchiveResult<()> {
        let blob = serde_json::to_string(aois).map_err(|source| ArchiveError::MalformedBlob {
            key: AOI_BLOB_KEY,
            source,
        })?;

        self.conn.execute(
            "INSERT INTO panel_state (key, value, updated_at)
             VALUES (?1, ?2, strftime('%s', 'now') * 1000)
             ON CONFLICT(key) DO UPDATE
             SET value = excluded.value, updated_at = excluded.updated_at;",
            params![AOI_BLOB_KEY, blob],
        )?;
        Ok(())
    }
}
