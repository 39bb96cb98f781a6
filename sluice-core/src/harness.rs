use crate::{
    AutoOptions, AutoParser, Capture, ColumnInfo, Command, CommandKind, CommandSpec, Config,
    Connection, Cursor, DataTable, Error, FromRecord, Opener, Parameter, QueryError, ResultReader,
    Result, RowParser, StringPolicy, TableFiller, Value, stream::Stream, truncate_long,
};
use async_stream::try_stream;
use std::{future::Future, time::Duration};

/// Where the harness gets its connection from.
pub enum Source<'c, C: Connection> {
    /// A connection is opened for the call and closed on every exit path.
    Owned(C::Opener),
    /// Caller managed, already open, never opened nor closed here.
    Shared(&'c mut C),
}

/// Connection in use for one execution, closed on drop when owned.
enum ConnectionGuard<'c, C: Connection> {
    Owned(Option<C>),
    Shared(&'c mut C),
}

impl<'c, C: Connection> ConnectionGuard<'c, C> {
    fn connection(&mut self) -> &mut C {
        match self {
            ConnectionGuard::Owned(Some(connection)) => connection,
            ConnectionGuard::Owned(None) => {
                unreachable!("An owned connection is only taken when the guard is consumed")
            }
            ConnectionGuard::Shared(connection) => connection,
        }
    }

    /// Hands back an owned connection without closing it.
    fn release(mut self) -> Option<C> {
        match &mut self {
            ConnectionGuard::Owned(connection) => connection.take(),
            ConnectionGuard::Shared(..) => None,
        }
    }
}

impl<'c, C: Connection> Drop for ConnectionGuard<'c, C> {
    fn drop(&mut self) {
        if let ConnectionGuard::Owned(Some(connection)) = self {
            if connection.is_open() {
                log::trace!("Closing the owned connection");
                if let Err(e) = connection.close() {
                    log::error!("{:#}", e.context("While closing the owned connection"));
                }
            }
        }
    }
}

#[derive(Debug, Clone)]
struct Statement {
    text: String,
    kind: CommandKind,
    parameters: Vec<Parameter>,
    timeout: Option<Duration>,
}

impl Statement {
    fn spec(&self) -> CommandSpec<'_> {
        CommandSpec {
            text: &self.text,
            kind: self.kind,
            parameters: &self.parameters,
            timeout: self.timeout,
        }
    }

    /// Name of a table produced by this statement.
    fn table_name(&self) -> &str {
        if self.kind.names_object() {
            self.text.trim()
        } else {
            ""
        }
    }
}

/// Executes one statement and shapes its result.
///
/// The harness is built for a single call and consumed by the output method.
/// Every output has a synchronous and an `_async` variant with the same
/// behavior, the asynchronous one also enforces the command timeout as a
/// deadline.
///
/// ```rust,ignore
/// let mut capture = Capture::new();
/// let people = QueryHarness::owned(opener, "ListPeople")
///     .kind(CommandKind::StoredProcedure)
///     .parameter(Parameter::new("MinAge", 18))
///     .capture(&mut capture)
///     .fetch_auto::<Person>(AutoOptions::default())?;
/// ```
pub struct QueryHarness<'c, C: Connection> {
    source: Source<'c, C>,
    transaction: Option<&'c C::Transaction>,
    statement: Statement,
    capture: Option<&'c mut Capture>,
    strings: StringPolicy,
    keep_connection_open: bool,
}

impl<'c, C: Connection> QueryHarness<'c, C> {
    pub fn new(source: Source<'c, C>, text: impl Into<String>) -> Self {
        Self {
            source,
            transaction: None,
            statement: Statement {
                text: text.into(),
                kind: CommandKind::Text,
                parameters: Vec::new(),
                timeout: None,
            },
            capture: None,
            strings: StringPolicy::default(),
            keep_connection_open: false,
        }
    }

    pub fn owned(opener: C::Opener, text: impl Into<String>) -> Self {
        Self::new(Source::Owned(opener), text)
    }

    pub fn shared(connection: &'c mut C, text: impl Into<String>) -> Self {
        Self::new(Source::Shared(connection), text)
    }

    /// Externally managed transaction, requires a shared connection.
    pub fn transaction(mut self, transaction: &'c C::Transaction) -> Self {
        self.transaction = Some(transaction);
        self
    }

    pub fn kind(mut self, kind: CommandKind) -> Self {
        self.statement.kind = kind;
        self
    }

    pub fn parameter(mut self, parameter: impl Into<Parameter>) -> Self {
        self.statement.parameters.push(parameter.into());
        self
    }

    pub fn parameters<P: Into<Parameter>>(mut self, parameters: impl IntoIterator<Item = P>) -> Self {
        self.statement
            .parameters
            .extend(parameters.into_iter().map(Into::into));
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.statement.timeout = Some(timeout);
        self
    }

    pub fn capture(mut self, capture: &'c mut Capture) -> Self {
        self.capture = Some(capture);
        self
    }

    pub fn strings(mut self, strings: StringPolicy) -> Self {
        self.strings = strings;
        self
    }

    /// With a live cursor on an owned connection, closing the cursor hands
    /// the still open connection back instead of closing it.
    pub fn keep_connection_open(mut self, keep: bool) -> Self {
        self.keep_connection_open = keep;
        self
    }

    /// Applies the command timeout (when set) and the string policy.
    pub fn configure(mut self, config: &Config) -> Self {
        if let Some(timeout) = config.command_timeout {
            self.statement.timeout = Some(timeout);
        }
        self.strings = config.strings;
        self
    }

    fn check_source(source: &Source<'c, C>, transaction: bool) -> Result<()> {
        match source {
            Source::Owned(..) if transaction => Err(QueryError::validation(
                "A transaction belongs to the connection that started it, use a shared connection",
            )),
            Source::Shared(connection) if !connection.is_open() => Err(QueryError::validation(
                "A shared connection must already be open",
            )),
            _ => Ok(()),
        }
    }

    fn acquire(source: Source<'c, C>) -> Result<ConnectionGuard<'c, C>> {
        Ok(match source {
            Source::Owned(opener) => {
                log::trace!("Opening an owned connection");
                ConnectionGuard::Owned(Some(opener.open()?))
            }
            Source::Shared(connection) => ConnectionGuard::Shared(connection),
        })
    }

    async fn acquire_async(source: Source<'c, C>) -> Result<ConnectionGuard<'c, C>> {
        Ok(match source {
            Source::Owned(opener) => {
                log::trace!("Opening an owned connection");
                ConnectionGuard::Owned(Some(opener.open_async().await?))
            }
            Source::Shared(connection) => ConnectionGuard::Shared(connection),
        })
    }

    fn execute(self) -> Result<Execution<'c, C>> {
        Self::check_source(&self.source, self.transaction.is_some())?;
        log::debug!("Executing {}", truncate_long!(self.statement.text));
        let mut guard = Self::acquire(self.source)?;
        let connection = guard.connection();
        let mut command = connection.build_command(&self.statement.spec(), self.transaction)?;
        let reader = connection.execute_reader(&mut command)?;
        Ok(Execution::new(
            reader,
            command,
            guard,
            self.capture,
            self.strings,
            self.keep_connection_open,
        ))
    }

    async fn execute_async(self) -> Result<Execution<'c, C>> {
        Self::check_source(&self.source, self.transaction.is_some())?;
        log::debug!("Executing {}", truncate_long!(self.statement.text));
        let mut guard = Self::acquire_async(self.source).await?;
        let connection = guard.connection();
        let mut command = connection.build_command(&self.statement.spec(), self.transaction)?;
        let reader = connection.execute_reader_async(&mut command).await?;
        Ok(Execution::new(
            reader,
            command,
            guard,
            self.capture,
            self.strings,
            self.keep_connection_open,
        ))
    }

    /// Typed collection, one item per row in cursor order.
    pub fn fetch<T>(self, parser: &RowParser<T>) -> Result<Vec<T>> {
        let mut execution = self.execute()?;
        let mut result = Vec::new();
        while execution.reader.read()? {
            result.push(parser.parse(&execution.reader)?);
        }
        execution.finish()?;
        Ok(result)
    }

    pub async fn fetch_async<T>(self, parser: &RowParser<T>) -> Result<Vec<T>> {
        let timeout = self.statement.timeout;
        with_deadline(timeout, async move {
            let mut execution = self.execute_async().await?;
            let mut result = Vec::new();
            while execution.reader.read_async().await? {
                result.push(parser.parse(&execution.reader)?);
            }
            execution.finish()?;
            Ok(result)
        })
        .await
    }

    /// Typed collection mapped by column name, see [`AutoParser`].
    pub fn fetch_auto<T: FromRecord>(self, options: AutoOptions) -> Result<Vec<T>> {
        let parser = AutoParser::<T>::new(options);
        let mut execution = self.execute()?;
        let mut result = Vec::new();
        while execution.reader.read()? {
            result.push(parser.parse(&execution.reader)?);
        }
        execution.finish()?;
        Ok(result)
    }

    pub async fn fetch_auto_async<T: FromRecord>(self, options: AutoOptions) -> Result<Vec<T>> {
        let timeout = self.statement.timeout;
        with_deadline(timeout, async move {
            let parser = AutoParser::<T>::new(options);
            let mut execution = self.execute_async().await?;
            let mut result = Vec::new();
            while execution.reader.read_async().await? {
                result.push(parser.parse(&execution.reader)?);
            }
            execution.finish()?;
            Ok(result)
        })
        .await
    }

    /// Raw rows, null values become `None` and strings follow the string policy.
    pub fn fetch_rows(self) -> Result<Vec<Box<[Option<Value>]>>> {
        let mut execution = self.execute()?;
        let mut result = Vec::new();
        while execution.reader.read()? {
            result.push(execution.current_row());
        }
        execution.finish()?;
        Ok(result)
    }

    pub async fn fetch_rows_async(self) -> Result<Vec<Box<[Option<Value>]>>> {
        let timeout = self.statement.timeout;
        with_deadline(timeout, async move {
            let mut execution = self.execute_async().await?;
            let mut result = Vec::new();
            while execution.reader.read_async().await? {
                result.push(execution.current_row());
            }
            execution.finish()?;
            Ok(result)
        })
        .await
    }

    /// First column of the first row, `None` when there is no row or the value is null.
    pub fn scalar(self) -> Result<Option<Value>> {
        let mut execution = self.execute()?;
        let result = if execution.reader.read()? {
            execution.current_value(0)
        } else {
            None
        };
        execution.finish()?;
        Ok(result)
    }

    pub async fn scalar_async(self) -> Result<Option<Value>> {
        let timeout = self.statement.timeout;
        with_deadline(timeout, async move {
            let mut execution = self.execute_async().await?;
            let result = if execution.reader.read_async().await? {
                execution.current_value(0)
            } else {
                None
            };
            execution.finish()?;
            Ok(result)
        })
        .await
    }

    /// Live cursor over the result, see [`LiveCursor`].
    pub fn open_cursor(self) -> Result<LiveCursor<'c, C>> {
        Ok(LiveCursor {
            execution: self.execute()?,
        })
    }

    pub async fn open_cursor_async(self) -> Result<LiveCursor<'c, C>> {
        let timeout = self.statement.timeout;
        with_deadline(timeout, async move {
            Ok(LiveCursor {
                execution: self.execute_async().await?,
            })
        })
        .await
    }
}

impl<'c, C: TableFiller> QueryHarness<'c, C> {
    /// Buffered snapshot, named after the target for stored procedures and
    /// direct table reads.
    pub fn fetch_table(self) -> Result<DataTable> {
        Self::check_source(&self.source, self.transaction.is_some())?;
        log::debug!("Filling table from {}", truncate_long!(self.statement.text));
        let mut guard = Self::acquire(self.source)?;
        let connection = guard.connection();
        let mut command = connection.build_command(&self.statement.spec(), self.transaction)?;
        let table = connection.fill(&mut command, self.statement.table_name())?;
        if let Some(capture) = self.capture {
            capture.columns = table.columns.clone();
            capture.output = command.output_parameters();
        }
        Ok(table)
    }

    pub async fn fetch_table_async(self) -> Result<DataTable> {
        let timeout = self.statement.timeout;
        with_deadline(timeout, async move {
            Self::check_source(&self.source, self.transaction.is_some())?;
            log::debug!("Filling table from {}", truncate_long!(self.statement.text));
            let mut guard = Self::acquire_async(self.source).await?;
            let connection = guard.connection();
            let mut command =
                connection.build_command(&self.statement.spec(), self.transaction)?;
            let table = connection
                .fill_async(&mut command, self.statement.table_name())
                .await?;
            if let Some(capture) = self.capture {
                capture.columns = table.columns.clone();
                capture.output = command.output_parameters();
            }
            Ok(table)
        })
        .await
    }
}

async fn with_deadline<T>(
    timeout: Option<Duration>,
    future: impl Future<Output = Result<T>>,
) -> Result<T> {
    match timeout {
        Some(timeout) => tokio::time::timeout(timeout, future).await.map_err(|e| {
            Error::new(e).context(format!(
                "The command did not complete within {:?}",
                timeout
            ))
        })?,
        None => future.await,
    }
}

/// Running command with its reader.
///
/// Fields drop in order: the reader goes before the connection.
struct Execution<'c, C: Connection> {
    reader: C::Reader,
    command: C::Command,
    guard: ConnectionGuard<'c, C>,
    capture: Option<&'c mut Capture>,
    strings: StringPolicy,
    keep_connection_open: bool,
}

impl<'c, C: Connection> Execution<'c, C> {
    fn new(
        reader: C::Reader,
        command: C::Command,
        guard: ConnectionGuard<'c, C>,
        mut capture: Option<&'c mut Capture>,
        strings: StringPolicy,
        keep_connection_open: bool,
    ) -> Self {
        if let Some(capture) = capture.as_deref_mut() {
            capture.columns = reader.columns().to_vec();
            capture.output.clear();
        }
        Self {
            reader,
            command,
            guard,
            capture,
            strings,
            keep_connection_open,
        }
    }

    fn process(&self, value: &Value) -> Option<Value> {
        if value.is_null() {
            return None;
        }
        self.strings.apply(value.clone()).into_option()
    }

    fn current_row(&self) -> Box<[Option<Value>]> {
        self.reader.values().iter().map(|v| self.process(v)).collect()
    }

    fn current_value(&self, index: usize) -> Option<Value> {
        self.reader.get(index).and_then(|v| self.process(v))
    }

    /// Closes the reader and collects the output parameters. The connection
    /// is closed right after when owned.
    fn finish(mut self) -> Result<()> {
        self.complete()
    }

    fn complete(&mut self) -> Result<()> {
        self.reader.close()?;
        if let Some(capture) = self.capture.take() {
            capture.output = self.command.output_parameters();
        }
        Ok(())
    }
}

/// Open reader returned to the caller.
///
/// Owns the reader and, for an owned source, the connection. Dropping or
/// closing the cursor closes both, unless the harness was asked to keep the
/// connection open: then [`LiveCursor::close`] returns it.
pub struct LiveCursor<'c, C: Connection> {
    execution: Execution<'c, C>,
}

impl<'c, C: Connection> LiveCursor<'c, C> {
    pub fn read(&mut self) -> Result<bool> {
        self.execution.reader.read()
    }

    pub async fn read_async(&mut self) -> Result<bool> {
        self.execution.reader.read_async().await
    }

    /// Current row with the raw rows conventions, see [`QueryHarness::fetch_rows`].
    pub fn row(&self) -> Box<[Option<Value>]> {
        self.execution.current_row()
    }

    pub fn parse<T>(&self, parser: &RowParser<T>) -> Result<T> {
        parser.parse(&self.execution.reader)
    }

    pub fn is_connection_owned(&self) -> bool {
        matches!(self.execution.guard, ConnectionGuard::Owned(..))
    }

    /// Closes the reader and collects output parameters. Returns the owned
    /// connection still open when it must be kept, otherwise closes it.
    pub fn close(mut self) -> Result<Option<C>> {
        self.execution.complete()?;
        let Execution {
            reader,
            guard,
            keep_connection_open,
            ..
        } = self.execution;
        drop(reader);
        if keep_connection_open {
            Ok(guard.release())
        } else {
            drop(guard);
            Ok(None)
        }
    }

    /// Remaining rows as a stream, the cursor is closed once exhausted.
    pub fn into_stream(mut self) -> impl Stream<Item = Result<Box<[Option<Value>]>>> + 'c
    where
        C: 'c,
    {
        try_stream! {
            while self.execution.reader.read_async().await? {
                yield self.execution.current_row();
            }
            self.execution.complete()?;
        }
    }
}

impl<'c, C: Connection> Cursor for LiveCursor<'c, C> {
    fn columns(&self) -> &[ColumnInfo] {
        self.execution.reader.columns()
    }

    fn values(&self) -> &[Value] {
        self.execution.reader.values()
    }

    fn position(&self) -> usize {
        self.execution.reader.position()
    }
}
