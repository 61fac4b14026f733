//! Per-connection session handling.
//!
//! One session owns one connection for its whole lifetime: it renders the
//! banner, then loops reading command lines, dispatching each to a handler
//! and waiting for the handler's full asynchronous chain (including nested
//! prompts) to settle before accepting the next line. Handlers are never
//! interleaved within a session; sessions never touch each other's state.
//!
//! Recoverable command failures are rendered to the user and the prompt is
//! re-issued. A closed transport tears the session down silently.

use crate::command::{parse_id, Command, CommandError};
use crate::normalize::answers_match;
use crate::store::{QuizStore, StoreError};
use crate::text;
use std::sync::Arc;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{trace, warn};

/// Fatal session failures: the transport is gone or broken. Never rendered
/// to the user; they end the session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Peer closed the connection
    #[error("peer disconnected")]
    Disconnected,

    /// Transport read or write failed
    #[error("connection io error: {0}")]
    Io(#[from] std::io::Error),
}

/// A handler failure: either recoverable (rendered, session continues) or
/// fatal (session ends).
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error(transparent)]
    Command(#[from] CommandError),

    #[error(transparent)]
    Session(#[from] SessionError),
}

impl From<StoreError> for HandlerError {
    fn from(e: StoreError) -> Self {
        HandlerError::Command(CommandError::Store(e))
    }
}

/// One session's half-duplex view of its connection, plus the prompt-response
/// coordinator.
///
/// Holding `&mut Conn` is what serializes prompts: a handler can only issue
/// the next [`Conn::ask`] after the previous one resolved, so a second
/// outstanding prompt is structurally impossible.
pub struct Conn<R, W> {
    reader: R,
    writer: W,
    /// Whether the client echoes server-sent text into its line-editing
    /// buffer; gates edit's prefill.
    echo_prefill: bool,
}

impl<R, W> Conn<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(reader: R, writer: W, echo_prefill: bool) -> Self {
        Self {
            reader,
            writer,
            echo_prefill,
        }
    }

    /// Write one rendered line (CRLF-terminated)
    pub async fn send(&mut self, text: &str) -> Result<(), SessionError> {
        self.writer.write_all(text.as_bytes()).await?;
        self.writer.write_all(b"\r\n").await?;
        self.writer.flush().await?;
        Ok(())
    }

    /// Write text without a line terminator (prompts)
    async fn send_raw(&mut self, text: &str) -> Result<(), SessionError> {
        self.writer.write_all(text.as_bytes()).await?;
        self.writer.flush().await?;
        Ok(())
    }

    /// Read one input line, stripped of its terminator. EOF means the peer
    /// is gone.
    async fn read_line(&mut self) -> Result<String, SessionError> {
        let mut line = String::new();
        let n = self.reader.read_line(&mut line).await?;
        if n == 0 {
            return Err(SessionError::Disconnected);
        }
        while line.ends_with('\n') || line.ends_with('\r') {
            line.pop();
        }
        Ok(line)
    }

    /// Issue one prompt and resolve exactly one reply.
    ///
    /// If a prefill is given and the connection advertises line-editing echo,
    /// the prefill is written after the prompt for in-place correction; it is
    /// never auto-submitted. Suspends until a full line arrives; a closed
    /// connection abandons the prompt with [`SessionError::Disconnected`].
    pub async fn ask(
        &mut self,
        prompt: &str,
        prefill: Option<&str>,
    ) -> Result<String, SessionError> {
        self.send_raw(prompt).await?;
        if let Some(current) = prefill {
            if self.echo_prefill {
                self.send_raw(current).await?;
            }
        }
        self.read_line().await
    }
}

/// What the dispatch loop does after a command settles
enum Flow {
    Continue,
    Quit,
}

/// Run one session to completion: banner, then the dispatch loop.
///
/// Returns `Ok` on quit or peer disconnect; `Err` only on transport io
/// failure.
pub async fn run<R, W>(
    store: Arc<dyn QuizStore>,
    mut conn: Conn<R, W>,
) -> Result<(), SessionError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    conn.send(&text::banner()).await?;

    loop {
        conn.send_raw(&text::prompt()).await?;

        let line = match conn.read_line().await {
            Ok(line) => line,
            Err(SessionError::Disconnected) => return Ok(()),
            Err(e) => return Err(e),
        };

        match dispatch(store.as_ref(), &mut conn, &line).await {
            Ok(Flow::Continue) => {}
            Ok(Flow::Quit) => {
                conn.send(&text::farewell()).await?;
                return Ok(());
            }
            Err(SessionError::Disconnected) => return Ok(()),
            Err(e) => return Err(e),
        }
    }
}

/// Parse one line and run its handler. Recoverable failures are rendered
/// here; only transport failures escape.
async fn dispatch<R, W>(
    store: &dyn QuizStore,
    conn: &mut Conn<R, W>,
    line: &str,
) -> Result<Flow, SessionError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let command = Command::parse(line);
    trace!(?command, "Dispatching command");

    let outcome = match &command {
        Command::Empty => Ok(()),
        Command::Quit => return Ok(Flow::Quit),
        Command::Help => conn.send(&text::help()).await.map_err(HandlerError::from),
        Command::Credits => conn
            .send(&text::credits())
            .await
            .map_err(HandlerError::from),
        Command::Unknown(token) => conn
            .send(&text::unknown_command(token))
            .await
            .map_err(HandlerError::from),
        Command::List => list(store, conn).await,
        Command::Show { raw_id } => show(store, conn, raw_id.as_deref()).await,
        Command::Add => add(store, conn).await,
        Command::Delete { raw_id } => delete(store, raw_id.as_deref()).await,
        Command::Edit { raw_id } => edit(store, conn, raw_id.as_deref()).await,
        Command::Test { raw_id } => test(store, conn, raw_id.as_deref()).await,
        Command::Play => crate::play::run(store, conn).await,
    };

    match outcome {
        Ok(()) => Ok(Flow::Continue),
        Err(HandlerError::Session(e)) => Err(e),
        Err(HandlerError::Command(e)) => {
            render_command_error(conn, &e).await?;
            Ok(Flow::Continue)
        }
    }
}

/// Render one recoverable command failure as user-visible error lines
async fn render_command_error<R, W>(
    conn: &mut Conn<R, W>,
    error: &CommandError,
) -> Result<(), SessionError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    match error {
        CommandError::MissingArgument => conn.send(&text::missing_id()).await,
        CommandError::NotANumber(raw) => conn.send(&text::bad_id(raw)).await,
        CommandError::Store(StoreError::NotFound(id)) => conn.send(&text::not_found(*id)).await,
        CommandError::Store(StoreError::Validation(messages)) => {
            for message in messages {
                conn.send(&text::error_line(message)).await?;
            }
            Ok(())
        }
        CommandError::Store(StoreError::Io(e)) => {
            warn!(error = %e, "Catalog io failure");
            conn.send(&text::catalog_error()).await
        }
    }
}

async fn list<R, W>(store: &dyn QuizStore, conn: &mut Conn<R, W>) -> Result<(), HandlerError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    for quiz in store.list().await? {
        conn.send(&text::list_entry(&quiz)).await?;
    }
    Ok(())
}

async fn show<R, W>(
    store: &dyn QuizStore,
    conn: &mut Conn<R, W>,
    raw_id: Option<&str>,
) -> Result<(), HandlerError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let id = parse_id(raw_id)?;
    let quiz = store.get(id).await?;
    conn.send(&text::show_entry(&quiz)).await?;
    Ok(())
}

async fn add<R, W>(store: &dyn QuizStore, conn: &mut Conn<R, W>) -> Result<(), HandlerError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let question = conn.ask(&text::ask_question(), None).await?;
    let answer = conn.ask(&text::ask_answer(), None).await?;
    let quiz = store.create(&question, &answer).await?;
    conn.send(&text::added(&quiz)).await?;
    Ok(())
}

async fn delete(store: &dyn QuizStore, raw_id: Option<&str>) -> Result<(), HandlerError> {
    let id = parse_id(raw_id)?;
    store.delete(id).await?;
    Ok(())
}

async fn edit<R, W>(
    store: &dyn QuizStore,
    conn: &mut Conn<R, W>,
    raw_id: Option<&str>,
) -> Result<(), HandlerError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let id = parse_id(raw_id)?;
    let current = store.get(id).await?;
    let question = conn
        .ask(&text::ask_question(), Some(&current.question))
        .await?;
    let answer = conn.ask(&text::ask_answer(), Some(&current.answer)).await?;
    let quiz = store.update(id, &question, &answer).await?;
    conn.send(&text::edited(&quiz)).await?;
    Ok(())
}

async fn test<R, W>(
    store: &dyn QuizStore,
    conn: &mut Conn<R, W>,
    raw_id: Option<&str>,
) -> Result<(), HandlerError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let id = parse_id(raw_id)?;
    let quiz = store.get(id).await?;
    conn.send(&text::test_question(&quiz)).await?;
    let answer = conn.ask(&text::answer_prompt(), None).await?;
    if answers_match(&answer, &quiz.answer) {
        conn.send(&text::correct()).await?;
    } else {
        conn.send(&text::incorrect()).await?;
    }
    Ok(())
}
