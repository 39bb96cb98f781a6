mod command;
mod connection;
mod database;
mod opener;
mod reader;
mod transaction;

pub use command::*;
pub use connection::*;
pub use database::*;
pub use opener::*;
pub use reader::*;
pub use transaction::*;

use log::LevelFilter;
use std::env;

/// Test logger, warnings only unless `RUST_LOG` is set.
pub fn init_logs() {
    let mut logger = env_logger::builder();
    logger
        .is_test(true)
        .format_file(true)
        .format_line_number(true);
    if env::var("RUST_LOG").is_err() {
        logger.filter_level(LevelFilter::Warn);
    }
    let _ = logger.try_init();
}
