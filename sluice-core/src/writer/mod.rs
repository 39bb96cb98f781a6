mod oracle;
mod sql_server;
mod sql_writer;

pub use oracle::*;
pub use sql_server::*;
pub use sql_writer::*;
