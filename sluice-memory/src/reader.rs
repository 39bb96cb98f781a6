use crate::MemoryResult;
use sluice_core::{ColumnInfo, Cursor, Error, Parameter, Result, ResultReader, Value};
use std::{
    sync::{Arc, Mutex, PoisonError},
    vec,
};

/// Reader over a scripted result.
#[derive(Debug)]
pub struct MemoryReader {
    columns: Vec<ColumnInfo>,
    rows: vec::IntoIter<Box<[Value]>>,
    current: Box<[Value]>,
    position: usize,
    output: Vec<Parameter>,
    target: Arc<Mutex<Vec<Parameter>>>,
    completed: bool,
    closed: bool,
}

impl MemoryReader {
    pub(crate) fn new(result: MemoryResult, target: Arc<Mutex<Vec<Parameter>>>) -> Self {
        Self {
            columns: result.columns,
            rows: result.rows.into_iter(),
            current: Box::new([]),
            position: 0,
            output: result.output,
            target,
            completed: false,
            closed: false,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Writes the scripted output values into the command parameters.
    fn complete(&mut self) {
        if self.completed {
            return;
        }
        self.completed = true;
        let mut target = self.target.lock().unwrap_or_else(PoisonError::into_inner);
        for parameter in target.iter_mut() {
            if let Some(value) = self
                .output
                .iter()
                .find(|v| v.name.eq_ignore_ascii_case(&parameter.name))
            {
                parameter.set_value(value.value().clone());
            }
        }
    }
}

impl Cursor for MemoryReader {
    fn columns(&self) -> &[ColumnInfo] {
        &self.columns
    }

    fn values(&self) -> &[Value] {
        &self.current
    }

    fn position(&self) -> usize {
        self.position
    }
}

impl ResultReader for MemoryReader {
    fn read(&mut self) -> Result<bool> {
        if self.closed {
            return Err(Error::msg("The reader is closed"));
        }
        match self.rows.next() {
            Some(row) => {
                self.current = row;
                self.position += 1;
                Ok(true)
            }
            None => {
                self.current = Box::new([]);
                self.complete();
                Ok(false)
            }
        }
    }

    async fn read_async(&mut self) -> Result<bool> {
        tokio::task::yield_now().await;
        self.read()
    }

    fn close(&mut self) -> Result<()> {
        self.complete();
        self.closed = true;
        Ok(())
    }
}
