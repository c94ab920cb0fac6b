//! Test infrastructure for running the sink against a real MySQL server
//!
//! Integration tests read the server location from `MYSQL_TEST_URL`.

pub mod mysql;

pub use mysql::{create_mysql_config, MySQLConfig};
