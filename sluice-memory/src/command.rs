use sluice_core::{Command, CommandKind, Parameter};
use std::{
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

/// Command bound to a memory connection.
#[derive(Debug)]
pub struct MemoryCommand {
    pub(crate) text: String,
    pub(crate) kind: CommandKind,
    pub(crate) parameters: Vec<Parameter>,
    pub(crate) timeout: Option<Duration>,
    pub(crate) transaction: Option<u64>,
    /// Output parameters, written by the reader once it completes.
    pub(crate) output: Arc<Mutex<Vec<Parameter>>>,
}

impl MemoryCommand {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }
}

impl Command for MemoryCommand {
    fn output_parameters(&self) -> Vec<Parameter> {
        self.output
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
