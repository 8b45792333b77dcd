//! Shared governance storage
//!
//! [`SqliteStore`] implements both the
//! [`CounterStore`](conclave_application::CounterStore) and
//! [`WindowStore`](conclave_application::WindowStore) ports, letting several
//! processes enforce the same limits and quotas.

mod sqlite;

pub use sqlite::SqliteStore;
