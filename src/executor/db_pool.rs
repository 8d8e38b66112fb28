use duckdb::Connection;
use r2d2::{ManageConnection, Pool};

/// r2d2 manager handing out connections to one DuckDB database file.
pub struct DuckDbConnectionManager {
    connection_string: String,
}

impl DuckDbConnectionManager {
    pub fn new(connection_string: impl Into<String>) -> Self {
        Self {
            connection_string: connection_string.into(),
        }
    }
}

impl ManageConnection for DuckDbConnectionManager {
    type Connection = Connection;
    type Error = duckdb::Error;

    fn connect(&self) -> Result<Self::Connection, Self::Error> {
        Connection::open(&self.connection_string)
    }

    fn is_valid(&self, conn: &mut Self::Connection) -> Result<(), Self::Error> {
        conn.execute("SELECT 1", [])?;
        Ok(())
    }

    fn has_broken(&self, _conn: &mut Self::Connection) -> bool {
        false
    }
}

pub fn build_pool(
    connection_string: &str,
    pool_size: usize,
) -> Result<Pool<DuckDbConnectionManager>, r2d2::Error> {
    Pool::builder()
        .max_size(pool_size.max(1) as u32)
        .build(DuckDbConnectionManager::new(connection_string))
}
