use rusqlite::{Connection, OpenFlags};
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

use crate::error::{ConnectError, Error, Result};
use crate::snapshot::{TableSnapshot, Tables, Value};

/// Catalog query listing every table, in whatever order SQLite returns them
const CATALOG_QUERY: &str = "SELECT name FROM sqlite_master WHERE type='table'";

/// An open connection to a local SQLite file.
///
/// The connection is released when the handle is dropped, so every exit
/// path closes it. Use [`Database::close`] to observe close errors.
#[derive(Debug)]
pub struct Database {
    conn: Connection,
    path: PathBuf,
}

/// Open the database at `path`.
///
/// A missing file is an error rather than a new empty database, and a file
/// that is not SQLite is rejected here rather than on the first query.
/// Failures are logged and handed back as [`ConnectError`].
pub fn connect(path: impl AsRef<Path>) -> Result<Database, ConnectError> {
    let path = path.as_ref();
    match open(path) {
        Ok(conn) => {
            info!("Successfully connected to the database at {}.", path.display());
            Ok(Database {
                conn,
                path: path.to_path_buf(),
            })
        }
        Err(source) => {
            let err = ConnectError {
                path: path.to_path_buf(),
                source,
            };
            error!("{}", err);
            Err(err)
        }
    }
}

fn open(path: &Path) -> rusqlite::Result<Connection> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX;
    let conn = Connection::open_with_flags(plain_path(path), flags)?;
    // SQLite reads the header lazily; touch the catalog so garbage fails now.
    conn.query_row("SELECT count(*) FROM sqlite_master", [], |row| {
        row.get::<_, i64>(0)
    })?;
    Ok(conn)
}

/// SQLite reads any name starting with `file:` as a URI, even without
/// `SQLITE_OPEN_URI` when built with `SQLITE_USE_URI`. Anchor such names to
/// the current directory so they always open as files.
fn plain_path(path: &Path) -> Cow<'_, Path> {
    match path.to_str() {
        Some(s) if s.starts_with("file:") => Cow::Owned(Path::new(".").join(path)),
        _ => Cow::Borrowed(path),
    }
}

/// Load every table of an open database. See [`Database::load_all_tables`].
pub fn load_all_tables(db: &Database) -> Result<Tables> {
    db.load_all_tables()
}

impl Database {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Underlying connection, for queries this crate does not wrap
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Names of all tables listed in `sqlite_master`
    pub fn table_names(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(CATALOG_QUERY).map_err(Error::Catalog)?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(Error::Catalog)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(Error::Catalog)?;
        debug!("Catalog lists {} tables", names.len());
        Ok(names)
    }

    /// Read every table into memory.
    ///
    /// Tables are scanned one at a time. The first failure aborts the whole
    /// load and nothing read so far is returned.
    pub fn load_all_tables(&self) -> Result<Tables> {
        let mut tables = Tables::new();
        for name in self.table_names()? {
            info!("Loading data from table: {}", name);
            tables.insert(self.scan(&name)?);
        }
        Ok(tables)
    }

    /// Read a single table. Only names the catalog reports are accepted.
    pub fn load_table(&self, name: &str) -> Result<TableSnapshot> {
        if !self.table_names()?.iter().any(|t| t == name) {
            return Err(Error::UnknownTable(name.to_string()));
        }
        self.scan(name)
    }

    /// `name` must come from the catalog.
    fn scan(&self, name: &str) -> Result<TableSnapshot> {
        let scan_err = |source| Error::Scan {
            table: name.to_string(),
            source,
        };
        let sql = format!("SELECT * FROM {}", quote_identifier(name));
        let mut stmt = self.conn.prepare(&sql).map_err(scan_err)?;

        let columns: Vec<(String, Option<String>)> = stmt
            .columns()
            .iter()
            .map(|c| (c.name().to_string(), c.decl_type().map(str::to_string)))
            .collect();
        let width = columns.len();

        let mut rows = Vec::new();
        let mut cursor = stmt.query([]).map_err(scan_err)?;
        while let Some(row) = cursor.next().map_err(scan_err)? {
            let values = (0..width)
                .map(|idx| {
                    let cell = row.get_ref(idx)?;
                    Value::try_from(cell).map_err(rusqlite::Error::Utf8Error)
                })
                .collect::<rusqlite::Result<Vec<_>>>()
                .map_err(scan_err)?;
            rows.push(values);
        }
        drop(cursor);

        debug!("Table {} holds {} rows x {} columns", name, rows.len(), width);
        Ok(TableSnapshot::new(name, columns, rows))
    }

    /// Close the connection, reporting any error SQLite raises on close.
    pub fn close(self) -> Result<()> {
        let path = self.path;
        self.conn.close().map_err(|(_, e)| Error::Close(e))?;
        debug!("Closed database at {}", path.display());
        Ok(())
    }
}

/// Quote a table name as an SQL identifier, doubling embedded quotes.
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
