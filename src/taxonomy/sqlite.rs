//! NCBI taxonomy backed by a local SQLite dump
//!
//! Reads the layout produced by the ete toolkit's NCBI taxonomy loader
//! (`~/.etetoolkit/taxa.sqlite`):
//!
//! - `species(taxid, parent, spname, common, rank, track)` where `track` is
//!   the comma-separated lineage from the taxon up to the root
//! - `synonym(taxid, spname)`
//! - `merged(taxid_old, taxid_new)` (optional)

use super::{TaxId, TaxonomyError, TaxonomyLookup, TaxonomyResult};
use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

/// Read-only taxonomy over a SQLite connection
#[derive(Debug)]
pub struct SqliteTaxonomy {
    conn: Mutex<Connection>,
}

impl SqliteTaxonomy {
    /// Open a taxonomy database read-only
    pub fn open(path: impl AsRef<Path>) -> TaxonomyResult<Self> {
        let path = path.as_ref();
        info!("Opening taxonomy database at: {:?}", path);
        let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
        Ok(Self::from_connection(conn))
    }

    /// Wrap an existing connection (in-memory databases in tests)
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Follow `merged` when `id` is no longer a live taxon
    fn live_id(conn: &Connection, id: TaxId) -> TaxonomyResult<TaxId> {
        let exists: Option<i64> = conn
            .query_row(
                "SELECT taxid FROM species WHERE taxid = ?1",
                params![id.0 as i64],
                |row| row.get(0),
            )
            .optional()?;
        if exists.is_some() {
            return Ok(id);
        }

        // merged is absent from some dumps; a failed lookup means "not merged"
        let merged: Option<i64> = conn
            .query_row(
                "SELECT taxid_new FROM merged WHERE taxid_old = ?1",
                params![id.0 as i64],
                |row| row.get(0),
            )
            .optional()
            .ok()
            .flatten();
        match merged {
            Some(new_id) => {
                debug!("Taxid {} merged into {}", id, new_id);
                Ok(TaxId(new_id as u64))
            }
            None => Err(TaxonomyError::UnknownTaxId(id)),
        }
    }

    fn species_field(&self, id: TaxId, column: &str) -> TaxonomyResult<String> {
        let conn = self.conn();
        let id = Self::live_id(&conn, id)?;
        let sql = format!("SELECT {} FROM species WHERE taxid = ?1", column);
        let value: Option<String> = conn
            .query_row(&sql, params![id.0 as i64], |row| row.get(0))
            .optional()?;
        value.ok_or(TaxonomyError::UnknownTaxId(id))
    }
}

impl TaxonomyLookup for SqliteTaxonomy {
    fn ids_for_name(&self, name: &str) -> TaxonomyResult<Vec<TaxId>> {
        let conn = self.conn();
        let mut ids = Vec::new();
        for sql in [
            "SELECT taxid FROM species WHERE spname = ?1 COLLATE NOCASE",
            "SELECT taxid FROM synonym WHERE spname = ?1 COLLATE NOCASE",
        ] {
            let mut stmt = conn.prepare(sql)?;
            ids = stmt
                .query_map(params![name], |row| row.get::<_, i64>(0))?
                .map(|r| r.map(|id| TaxId(id as u64)))
                .collect::<rusqlite::Result<Vec<_>>>()?;
            if !ids.is_empty() {
                break;
            }
        }
        ids.sort();
        ids.dedup();
        Ok(ids)
    }

    fn descendants(&self, id: TaxId) -> TaxonomyResult<Vec<TaxId>> {
        let conn = self.conn();
        let id = Self::live_id(&conn, id)?;
        let mut stmt = conn.prepare(
            "WITH RECURSIVE below(taxid) AS (
                 SELECT taxid FROM species WHERE parent = ?1 AND taxid <> ?1
                 UNION
                 SELECT s.taxid FROM species s JOIN below b ON s.parent = b.taxid
                 WHERE s.taxid <> s.parent
             )
             SELECT taxid FROM below ORDER BY taxid",
        )?;
        let ids = stmt
            .query_map(params![id.0 as i64], |row| row.get::<_, i64>(0))?
            .map(|r| r.map(|id| TaxId(id as u64)))
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(ids)
    }

    fn lineage(&self, id: TaxId) -> TaxonomyResult<Vec<TaxId>> {
        let track = self.species_field(id, "track")?;
        let mut lineage = Vec::new();
        for part in track.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let parsed = part
                .parse::<u64>()
                .map_err(|_| TaxonomyError::UnknownTaxId(id))?;
            lineage.push(TaxId(parsed));
        }
        lineage.reverse();
        Ok(lineage)
    }

    fn rank(&self, id: TaxId) -> TaxonomyResult<String> {
        self.species_field(id, "rank")
    }

    fn name(&self, id: TaxId) -> TaxonomyResult<String> {
        self.species_field(id, "spname")
    }
}
