/// Transaction handle, only valid on the connection that started it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MemoryTransaction {
    id: u64,
    connection: u64,
}

impl MemoryTransaction {
    pub(crate) fn new(id: u64, connection: u64) -> Self {
        Self { id, connection }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn connection(&self) -> u64 {
        self.connection
    }
}
