//! SQL schema for the session database.

/// Entry key holding the JSON-encoded principal.
pub const PRINCIPAL_KEY: &str = "principal";

/// Entry key holding the raw bearer token.
pub const TOKEN_KEY: &str = "token";

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- Two rows at most: 'principal' and 'token'. Written and erased together.
CREATE TABLE IF NOT EXISTS session_entries (
    key   TEXT PRIMARY KEY,
    value TEXT NOT NULL
);

PRAGMA user_version = 1;
";
