use crate::{MemoryConnection, MemoryOpener, MemoryTransaction};
use sluice_core::{ColumnInfo, CommandKind, Parameter, Value};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

/// Scripted outcome of a statement.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct MemoryResult {
    pub columns: Vec<ColumnInfo>,
    pub rows: Vec<Box<[Value]>>,
    /// Values written back to output parameters with the same name.
    pub output: Vec<Parameter>,
    /// Time the command takes, spent waiting on the asynchronous path.
    pub delay: Option<Duration>,
}

impl MemoryResult {
    pub fn new<N: Into<String>>(columns: impl IntoIterator<Item = (N, Value)>) -> Self {
        Self {
            columns: columns
                .into_iter()
                .map(|(name, ty)| ColumnInfo::new(name, ty))
                .collect(),
            ..Default::default()
        }
    }

    pub fn row(mut self, values: impl IntoIterator<Item = Value>) -> Self {
        self.rows.push(values.into_iter().collect());
        self
    }

    pub fn output(mut self, parameter: Parameter) -> Self {
        self.output.push(parameter);
        self
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[derive(Debug, Clone)]
pub(crate) enum Script {
    Result(MemoryResult),
    Failure(String),
}

/// Command as received by the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutedCommand {
    pub connection: u64,
    pub text: String,
    pub kind: CommandKind,
    pub parameters: Vec<Parameter>,
    pub timeout: Option<Duration>,
    pub transaction: Option<u64>,
}

#[derive(Default, Debug)]
pub(crate) struct State {
    pub(crate) scripts: HashMap<String, Script>,
    pub(crate) executed: Vec<ExecutedCommand>,
    pub(crate) open: usize,
    pub(crate) opened: usize,
    pub(crate) next_id: u64,
}

impl State {
    pub(crate) fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Shared store of scripted results and execution history.
///
/// Cloning shares the same store.
#[derive(Default, Debug, Clone)]
pub struct MemoryDatabase {
    state: Arc<Mutex<State>>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Result returned whenever `statement` runs.
    pub fn register(&self, statement: impl Into<String>, result: MemoryResult) {
        self.state()
            .scripts
            .insert(statement.into().trim().to_string(), Script::Result(result));
    }

    /// Makes `statement` fail with `message`.
    pub fn fail(&self, statement: impl Into<String>, message: impl Into<String>) {
        self.state().scripts.insert(
            statement.into().trim().to_string(),
            Script::Failure(message.into()),
        );
    }

    pub(crate) fn script(&self, statement: &str) -> Option<Script> {
        self.state().scripts.get(statement.trim()).cloned()
    }

    /// Every command executed so far, oldest first.
    pub fn executed(&self) -> Vec<ExecutedCommand> {
        self.state().executed.clone()
    }

    /// Connections currently open.
    pub fn open_connections(&self) -> usize {
        self.state().open
    }

    /// Connections opened since creation.
    pub fn opened_connections(&self) -> usize {
        self.state().opened
    }

    pub fn opener(&self) -> MemoryOpener {
        MemoryOpener::new(self.clone())
    }

    /// Opens a connection, the caller closes it.
    pub fn connect(&self) -> MemoryConnection {
        let id = {
            let mut state = self.state();
            state.open += 1;
            state.opened += 1;
            state.next_id()
        };
        log::trace!("Memory connection {} opened", id);
        MemoryConnection::new(id, self.clone())
    }

    pub fn begin(&self, connection: &MemoryConnection) -> MemoryTransaction {
        let id = self.state().next_id();
        MemoryTransaction::new(id, connection.id())
    }
}
