//! Connection ownership. One write connection, serialized behind a mutex.

pub mod pragmas;
pub mod write_connection;

pub use write_connection::WriteConnection;
