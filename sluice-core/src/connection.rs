use crate::{ColumnInfo, DataTable, Parameter, QueryHarness, Result, Value};
use std::{future::Future, time::Duration};

/// How the statement text of a command is interpreted.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    #[default]
    Text,
    /// The text names a stored procedure.
    StoredProcedure,
    /// The text names a table read as a whole.
    TableDirect,
}

impl CommandKind {
    /// Whether the text is the name of a database object.
    pub fn names_object(&self) -> bool {
        matches!(self, CommandKind::StoredProcedure | CommandKind::TableDirect)
    }
}

/// Everything a backend needs to build a command.
#[derive(Debug, Clone, Copy)]
pub struct CommandSpec<'a> {
    pub text: &'a str,
    pub kind: CommandKind,
    pub parameters: &'a [Parameter],
    pub timeout: Option<Duration>,
}

/// Produces open connections.
pub trait Opener: Send + Sync {
    type Connection: Connection;

    fn open(&self) -> Result<Self::Connection>;

    fn open_async(&self) -> impl Future<Output = Result<Self::Connection>> + Send;

    /// Harness running `text` on a connection opened for the call.
    fn query<'c>(self, text: impl Into<String>) -> QueryHarness<'c, Self::Connection>
    where
        Self: Sized,
        Self::Connection: Connection<Opener = Self>,
    {
        QueryHarness::owned(self, text)
    }
}

/// A statement bound to a connection, ready to run.
pub trait Command: Send {
    /// Parameters written back by the command, populated once it completed
    /// and all its rows were read.
    fn output_parameters(&self) -> Vec<Parameter>;
}

/// Turns a [`CommandSpec`] into a backend command.
pub trait CommandBuilder {
    /// Externally managed transaction handle, passed through untouched.
    type Transaction: Send + Sync;
    type Command: Command;

    fn build_command(
        &mut self,
        spec: &CommandSpec<'_>,
        transaction: Option<&Self::Transaction>,
    ) -> Result<Self::Command>;
}

pub trait Connection: CommandBuilder + Send + Sized {
    type Opener: Opener<Connection = Self>;
    type Reader: ResultReader;

    fn is_open(&self) -> bool;

    fn close(&mut self) -> Result<()>;

    fn execute_reader(&mut self, command: &mut Self::Command) -> Result<Self::Reader>;

    fn execute_reader_async(
        &mut self,
        command: &mut Self::Command,
    ) -> impl Future<Output = Result<Self::Reader>> + Send;

    /// Harness running `text` on this connection, left open afterwards.
    fn query(&mut self, text: impl Into<String>) -> QueryHarness<'_, Self> {
        QueryHarness::shared(self, text)
    }
}

/// View of the current row of a result.
pub trait Cursor {
    fn columns(&self) -> &[ColumnInfo];

    /// Values of the current row, empty before the first read.
    fn values(&self) -> &[Value];

    /// Number of rows read so far.
    fn position(&self) -> usize;

    fn get(&self, index: usize) -> Option<&Value> {
        self.values().get(index)
    }

    fn get_by_name(&self, name: &str) -> Option<&Value> {
        self.columns()
            .iter()
            .position(|v| v.name.eq_ignore_ascii_case(name))
            .and_then(|i| self.get(i))
    }
}

/// Forward only reader over the rows produced by a command.
pub trait ResultReader: Cursor + Send {
    /// Advances to the next row, `false` once exhausted.
    fn read(&mut self) -> Result<bool>;

    fn read_async(&mut self) -> impl Future<Output = Result<bool>> + Send;

    fn close(&mut self) -> Result<()>;
}

/// Bulk materialization of a command result.
pub trait TableFiller: Connection {
    fn fill(&mut self, command: &mut Self::Command, name: &str) -> Result<DataTable> {
        let mut reader = self.execute_reader(command)?;
        let mut table = DataTable::new(name, reader.columns().to_vec());
        while reader.read()? {
            table.push(reader.values().into())?;
        }
        reader.close()?;
        Ok(table)
    }

    fn fill_async(
        &mut self,
        command: &mut Self::Command,
        name: &str,
    ) -> impl Future<Output = Result<DataTable>> + Send {
        async move {
            let mut reader = self.execute_reader_async(command).await?;
            let mut table = DataTable::new(name, reader.columns().to_vec());
            while reader.read_async().await? {
                table.push(reader.values().into())?;
            }
            reader.close()?;
            Ok(table)
        }
    }
}
