mod as_value;
mod capture;
mod config;
mod connection;
mod data_table;
mod error;
mod filter;
mod harness;
mod parameter;
mod provider;
mod row_parser;
mod statement;
mod util;
mod value;
mod writer;

pub use ::anyhow::Context;
pub use as_value::*;
pub use capture::*;
pub use config::*;
pub use connection::*;
pub use data_table::*;
pub use error::*;
pub use filter::*;
pub use harness::*;
pub use parameter::*;
pub use provider::*;
pub use row_parser::*;
pub use statement::*;
pub use util::*;
pub use value::*;
pub use writer::*;
pub mod stream {
    pub use ::futures::stream::*;
}
pub use ::futures::future;

pub type Result<T> = anyhow::Result<T>;
pub type Error = anyhow::Error;
