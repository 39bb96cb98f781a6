use crate::{
    ExecutedCommand, MemoryCommand, MemoryDatabase, MemoryOpener, MemoryReader, MemoryTransaction,
    database::Script,
};
use sluice_core::{
    CommandBuilder, CommandSpec, Connection, Error, Result, TableFiller, truncate_long,
};
use std::{
    sync::{Arc, Mutex},
    time::Duration,
};
use tokio::time::sleep;

/// Connection to a [`MemoryDatabase`].
///
/// Not closed on drop, so tests can observe connections left open.
#[derive(Debug)]
pub struct MemoryConnection {
    id: u64,
    database: MemoryDatabase,
    open: bool,
}

impl MemoryConnection {
    pub(crate) fn new(id: u64, database: MemoryDatabase) -> Self {
        Self {
            id,
            database,
            open: true,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    fn check_open(&self) -> Result<()> {
        if self.open {
            Ok(())
        } else {
            Err(Error::msg(format!("Connection {} is closed", self.id)))
        }
    }

    fn delay(&self, text: &str) -> Option<Duration> {
        match self.database.script(text) {
            Some(Script::Result(result)) => result.delay,
            _ => None,
        }
    }
}

impl CommandBuilder for MemoryConnection {
    type Transaction = MemoryTransaction;
    type Command = MemoryCommand;

    fn build_command(
        &mut self,
        spec: &CommandSpec<'_>,
        transaction: Option<&MemoryTransaction>,
    ) -> Result<MemoryCommand> {
        self.check_open()?;
        if let Some(transaction) = transaction {
            if transaction.connection() != self.id {
                return Err(Error::msg(format!(
                    "Transaction {} belongs to connection {}, not {}",
                    transaction.id(),
                    transaction.connection(),
                    self.id
                )));
            }
        }
        Ok(MemoryCommand {
            text: spec.text.to_string(),
            kind: spec.kind,
            parameters: spec.parameters.to_vec(),
            timeout: spec.timeout,
            transaction: transaction.map(MemoryTransaction::id),
            output: Arc::new(Mutex::new(
                spec.parameters
                    .iter()
                    .filter(|v| v.direction.is_output())
                    .cloned()
                    .collect(),
            )),
        })
    }
}

impl Connection for MemoryConnection {
    type Opener = MemoryOpener;
    type Reader = MemoryReader;

    fn is_open(&self) -> bool {
        self.open
    }

    fn close(&mut self) -> Result<()> {
        if self.open {
            self.open = false;
            self.database.state().open -= 1;
            log::trace!("Memory connection {} closed", self.id);
        }
        Ok(())
    }

    fn execute_reader(&mut self, command: &mut MemoryCommand) -> Result<MemoryReader> {
        self.check_open()?;
        self.database.state().executed.push(ExecutedCommand {
            connection: self.id,
            text: command.text.clone(),
            kind: command.kind,
            parameters: command.parameters.clone(),
            timeout: command.timeout,
            transaction: command.transaction,
        });
        match self.database.script(&command.text) {
            None => Err(Error::msg(format!(
                "No result registered for `{}`",
                truncate_long!(command.text)
            ))),
            Some(Script::Failure(message)) => Err(Error::msg(message)),
            Some(Script::Result(result)) => {
                if let (Some(delay), Some(timeout)) = (result.delay, command.timeout) {
                    if delay > timeout {
                        return Err(Error::msg(format!(
                            "Timeout expired after {:?}, the command needs {:?}",
                            timeout, delay
                        )));
                    }
                }
                Ok(MemoryReader::new(result, command.output.clone()))
            }
        }
    }

    async fn execute_reader_async(&mut self, command: &mut MemoryCommand) -> Result<MemoryReader> {
        match self.delay(&command.text) {
            Some(delay) => sleep(delay).await,
            None => tokio::task::yield_now().await,
        }
        self.execute_reader(command)
    }
}

impl TableFiller for MemoryConnection {}
