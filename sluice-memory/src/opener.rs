use crate::{MemoryConnection, MemoryDatabase};
use sluice_core::{Opener, Result};

/// Opens connections to a [`MemoryDatabase`].
#[derive(Debug, Clone)]
pub struct MemoryOpener {
    database: MemoryDatabase,
}

impl MemoryOpener {
    pub fn new(database: MemoryDatabase) -> Self {
        Self { database }
    }
}

impl Opener for MemoryOpener {
    type Connection = MemoryConnection;

    fn open(&self) -> Result<MemoryConnection> {
        Ok(self.database.connect())
    }

    async fn open_async(&self) -> Result<MemoryConnection> {
        tokio::task::yield_now().await;
        self.open()
    }
}
