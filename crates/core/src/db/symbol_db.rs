use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};

use crate::db::{DbError, DbResult};
use crate::model::{Address, Function, GlobalVariable, Parameter, Storage};
use crate::symbols::{SymbolSet, SymbolSource};

/// Minimum schema version we know how to handle.
///
/// `0` means "no schema yet" (fresh DB).
const MIN_SUPPORTED_SCHEMA_VERSION: i32 = 0;

/// Latest schema version this crate knows about.
pub const CURRENT_SCHEMA_VERSION: i32 = 2;

/// SQLite-backed symbol table.
///
/// A thin wrapper around `rusqlite::Connection` that is responsible for:
/// - Opening/creating the DB file.
/// - Applying schema migrations.
/// - Answering [`SymbolSource`] queries and applying renames.
#[derive(Debug)]
pub struct SymbolDb {
    conn: Connection,
}

impl SymbolDb {
    /// Open (or create) a symbol database at the given path and ensure the schema exists.
    pub fn open(path: &Path) -> DbResult<Self> {
        let conn = Connection::open(path)?;
        apply_migrations(&conn)?;
        Ok(Self { conn })
    }

    /// In-memory database, mostly for tests.
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        apply_migrations(&conn)?;
        Ok(Self { conn })
    }

    /// Expose a reference to the underlying connection for advanced callers.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Insert or replace a function together with its parameters.
    pub fn insert_function(&self, function: &Function) -> DbResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            r#"
            INSERT OR REPLACE INTO functions (address, name, user_defined)
            VALUES (?1, ?2, ?3)
            "#,
            params![function.address as i64, function.name, function.user_defined],
        )?;
        tx.execute(
            "DELETE FROM parameters WHERE function_address = ?1",
            params![function.address as i64],
        )?;
        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO parameters (function_address, position, name, real_name)
                VALUES (?1, ?2, ?3, ?4)
                "#,
            )?;
            for (idx, p) in function.parameters.iter().enumerate() {
                stmt.execute(params![function.address as i64, idx as i64, p.name, p.real_name])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Insert or replace a global variable and return its row id.
    ///
    /// Memory globals are keyed by address, register globals by name. A
    /// replaced global keeps its row id, and with it its place in the listing.
    pub fn insert_global(&self, global: &GlobalVariable) -> DbResult<i64> {
        let address = global.storage.address().map(|a| a as i64);
        let tx = self.conn.unchecked_transaction()?;
        let existing: Option<i64> = match address {
            Some(a) => tx
                .query_row("SELECT id FROM globals WHERE address = ?1", params![a], |row| row.get(0))
                .optional()?,
            None => tx
                .query_row(
                    "SELECT id FROM globals WHERE address IS NULL AND name = ?1",
                    params![global.name],
                    |row| row.get(0),
                )
                .optional()?,
        };
        let id = match existing {
            Some(id) => {
                tx.execute(
                    "UPDATE globals SET name = ?2, real_name = ?3 WHERE id = ?1",
                    params![id, global.name, global.real_name],
                )?;
                id
            }
            None => {
                tx.execute(
                    r#"
                    INSERT INTO globals (name, real_name, address)
                    VALUES (?1, ?2, ?3)
                    "#,
                    params![global.name, global.real_name, address],
                )?;
                tx.last_insert_rowid()
            }
        };
        tx.commit()?;
        Ok(id)
    }

    /// Import a whole symbol set. Returns (functions, globals) inserted.
    pub fn import(&self, set: &SymbolSet) -> DbResult<(usize, usize)> {
        for function in &set.functions {
            self.insert_function(function)?;
        }
        for global in &set.globals {
            self.insert_global(global)?;
        }
        Ok((set.functions.len(), set.globals.len()))
    }

    /// List all functions (ordered by address) with their parameters.
    pub fn list_functions(&self) -> DbResult<Vec<Function>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT address, name, user_defined
            FROM functions
            ORDER BY address
            "#,
        )?;
        let rows = stmt.query_map([], |row| {
            let address: i64 = row.get(0)?;
            Ok(Function {
                address: address as u64,
                name: row.get(1)?,
                user_defined: row.get(2)?,
                parameters: Vec::new(),
            })
        })?;

        let mut out = Vec::new();
        for row in rows {
            let mut function = row?;
            function.parameters = self.list_parameters(function.address)?;
            out.push(function);
        }
        Ok(out)
    }

    fn list_parameters(&self, address: Address) -> DbResult<Vec<Parameter>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT name, real_name
            FROM parameters
            WHERE function_address = ?1
            ORDER BY position
            "#,
        )?;
        let rows = stmt.query_map(params![address as i64], |row| {
            Ok(Parameter { name: row.get(0)?, real_name: row.get(1)? })
        })?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// List all globals (ordered by id).
    pub fn list_globals(&self) -> DbResult<Vec<GlobalVariable>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT name, real_name, address
            FROM globals
            ORDER BY id
            "#,
        )?;
        let rows = stmt.query_map([], |row| {
            let address: Option<i64> = row.get(2)?;
            Ok(GlobalVariable {
                name: row.get(0)?,
                real_name: row.get(1)?,
                storage: match address {
                    Some(a) => Storage::Memory(a as u64),
                    None => Storage::Register,
                },
            })
        })?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// Rename whatever lives at `address`. Returns the number of rows changed.
    pub fn rename_at(&self, address: Address, new_name: &str) -> DbResult<usize> {
        let functions = self.conn.execute(
            "UPDATE functions SET name = ?2 WHERE address = ?1",
            params![address as i64, new_name],
        )?;
        if functions > 0 {
            return Ok(functions);
        }
        Ok(self.conn.execute(
            "UPDATE globals SET name = ?2 WHERE address = ?1",
            params![address as i64, new_name],
        )?)
    }

    pub fn comment(&self, address: Address) -> DbResult<Option<String>> {
        Ok(self
            .conn
            .query_row(
                "SELECT comment FROM function_comments WHERE function_address = ?1",
                params![address as i64],
                |row| row.get(0),
            )
            .optional()?)
    }

    /// Store a comment; an empty comment removes it. Returns false for unknown functions.
    pub fn set_comment(&self, address: Address, comment: &str) -> DbResult<bool> {
        if !self.has_function(address)? {
            return Ok(false);
        }
        if comment.is_empty() {
            self.conn.execute(
                "DELETE FROM function_comments WHERE function_address = ?1",
                params![address as i64],
            )?;
        } else {
            self.conn.execute(
                r#"
                INSERT OR REPLACE INTO function_comments (function_address, comment)
                VALUES (?1, ?2)
                "#,
                params![address as i64, comment],
            )?;
        }
        Ok(true)
    }

    pub fn declaration_at(&self, address: Address) -> DbResult<Option<String>> {
        Ok(self
            .conn
            .query_row(
                "SELECT declaration FROM functions WHERE address = ?1",
                params![address as i64],
                |row| row.get::<_, Option<String>>(0),
            )
            .optional()?
            .flatten())
    }

    pub fn set_declaration(&self, address: Address, declaration: &str) -> DbResult<bool> {
        let changed = self.conn.execute(
            "UPDATE functions SET declaration = ?2 WHERE address = ?1",
            params![address as i64, declaration],
        )?;
        Ok(changed > 0)
    }

    fn has_function(&self, address: Address) -> DbResult<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM functions WHERE address = ?1",
            params![address as i64],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }
}

fn log_db_error<T>(what: &str, result: DbResult<T>, fallback: T) -> T {
    result.unwrap_or_else(|err| {
        tracing::warn!(error = %err, "symbol db {what} failed");
        fallback
    })
}

impl SymbolSource for SymbolDb {
    fn functions(&self) -> Vec<Function> {
        log_db_error("list functions", self.list_functions(), Vec::new())
    }

    fn globals(&self) -> Vec<GlobalVariable> {
        log_db_error("list globals", self.list_globals(), Vec::new())
    }

    fn set_name(&mut self, address: Address, new_name: &str) -> bool {
        log_db_error("rename", self.rename_at(address, new_name).map(|n| n > 0), false)
    }

    fn function_comment(&self, address: Address) -> Option<String> {
        log_db_error("comment lookup", self.comment(address), None)
    }

    fn set_function_comment(&mut self, address: Address, comment: &str) -> bool {
        log_db_error("comment update", self.set_comment(address, comment), false)
    }

    fn declaration(&self, address: Address) -> Option<String> {
        log_db_error("declaration lookup", self.declaration_at(address), None)
    }

    fn apply_declaration(&mut self, address: Address, declaration: &str) -> bool {
        if declaration.trim().is_empty() {
            return false;
        }
        log_db_error("declaration update", self.set_declaration(address, declaration), false)
    }
}

/// Apply schema migrations to bring the database to the latest version.
///
/// We use `PRAGMA user_version` as the schema version indicator.
///
/// Version map:
/// - 0: no schema
/// - 1: functions, parameters, globals
/// - 2: function_comments
fn apply_migrations(conn: &Connection) -> DbResult<()> {
    let mut current_version = current_schema_version(conn)?;

    // Reject DBs created with a newer schema than we support.
    if current_version > CURRENT_SCHEMA_VERSION {
        return Err(DbError::UnsupportedSchemaVersion {
            found: current_version,
            min_supported: MIN_SUPPORTED_SCHEMA_VERSION,
            max_supported: CURRENT_SCHEMA_VERSION,
        });
    }

    if current_version == 0 {
        conn.execute_batch(
            r#"
            BEGIN;
            CREATE TABLE IF NOT EXISTS functions (
                address      INTEGER PRIMARY KEY,
                name         TEXT NOT NULL,
                user_defined INTEGER NOT NULL,
                declaration  TEXT
            );

            CREATE TABLE IF NOT EXISTS parameters (
                function_address INTEGER NOT NULL,
                position         INTEGER NOT NULL,
                name             TEXT NOT NULL,
                real_name        TEXT,
                PRIMARY KEY (function_address, position)
            );

            CREATE TABLE IF NOT EXISTS globals (
                id        INTEGER PRIMARY KEY AUTOINCREMENT,
                name      TEXT NOT NULL,
                real_name TEXT,
                address   INTEGER
            );

            PRAGMA user_version = 1;
            COMMIT;
            "#,
        )?;
        current_version = 1;
    }

    if current_version < 2 {
        conn.execute_batch(
            r#"
            BEGIN;
            CREATE TABLE IF NOT EXISTS function_comments (
                function_address INTEGER PRIMARY KEY,
                comment          TEXT NOT NULL
            );

            PRAGMA user_version = 2;
            COMMIT;
            "#,
        )?;
    }

    Ok(())
}

/// Read the SQLite schema version from `PRAGMA user_version`.
fn current_schema_version(conn: &Connection) -> DbResult<i32> {
    let version: i32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    Ok(version)
}
