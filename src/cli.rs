//! Line-oriented terminal client
//!
//! Renders one `ChatSession`: the transcript, a typing indicator while an
//! exchange is pending, and storage diagnostics on stderr. Input stays live
//! while a reply is pending, so `/clear` and `/quit` work mid-exchange.

use crate::config::ClientConfig;
use crate::session::{ChatSession, Diagnostic, Message, MessageId, Role, SessionContext, SessionView, TransitionError};
use crate::store::{SessionStore, SqliteStore};
use crate::transport::{HttpTransport, LoggingTransport, TransportClient};
use std::collections::HashSet;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};
use tokio::sync::{broadcast, watch};

const DIAGNOSTIC_CAPACITY: usize = 16;

const HELP: &str = "Type a message and press enter. /clear starts over, /quit exits.";

/// What a line of input asks for
#[derive(Debug, PartialEq, Eq)]
enum Command<'a> {
    Quit,
    Clear,
    Help,
    Say(&'a str),
}

impl<'a> Command<'a> {
    fn parse(line: &'a str) -> Self {
        match line.trim() {
            "/quit" | "/exit" => Command::Quit,
            "/clear" => Command::Clear,
            "/help" => Command::Help,
            text => Command::Say(text),
        }
    }
}

/// Whether the input loop keeps going
#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

pub async fn run(config: ClientConfig) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(parent) = config.db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    tracing::info!(path = %config.db_path.display(), "Opening session store");
    let store = SqliteStore::open(&config.db_path)?;

    let transport = LoggingTransport::new(HttpTransport::new(&config.base_url, config.timeout)?);
    tracing::info!(endpoint = %transport.endpoint(), "Using chat endpoint");

    // Subscribed before the session exists so restore failures are shown
    let (diagnostics_tx, diagnostics_rx) = broadcast::channel(DIAGNOSTIC_CAPACITY);
    let diagnostics_task = tokio::spawn(print_diagnostics(diagnostics_rx));

    let session = ChatSession::new(
        SessionContext::new(config.stale_replies),
        config.locale,
        transport,
        store,
        diagnostics_tx,
    );
    let typing_task = tokio::spawn(show_typing(session.subscribe()));

    let mut printer = Printer::default();
    printer.show(&session.view().transcript, true);
    println!("{HELP}");

    let lines = BufReader::new(tokio::io::stdin()).lines();
    let result = input_loop(&session, lines, &mut printer).await;

    typing_task.abort();
    diagnostics_task.abort();
    result
}

async fn input_loop<T, S, R>(
    session: &ChatSession<T, S>,
    mut lines: Lines<R>,
    printer: &mut Printer,
) -> Result<(), Box<dyn std::error::Error>>
where
    T: TransportClient,
    S: SessionStore,
    R: AsyncBufRead + Unpin,
{
    while let Some(line) = lines.next_line().await? {
        let text = match Command::parse(&line) {
            Command::Say(text) if !text.is_empty() => text.to_string(),
            command => {
                if handle_idle_command(session, &command, printer) == Flow::Quit {
                    return Ok(());
                }
                continue;
            }
        };

        let exchange = session.submit(&text);
        tokio::pin!(exchange);
        loop {
            tokio::select! {
                result = &mut exchange => {
                    report_submit(result);
                    printer.show(&session.view().transcript, false);
                    break;
                }
                // next_line is cancel safe
                line = lines.next_line() => {
                    let Some(line) = line? else {
                        // Input closed: let the pending reply land before exiting
                        report_submit((&mut exchange).await);
                        printer.show(&session.view().transcript, false);
                        return Ok(());
                    };
                    match Command::parse(&line) {
                        // Rejected with Busy while the exchange is pending
                        Command::Say(text) if !text.is_empty() => report_submit(session.submit(text).await),
                        command => {
                            if handle_idle_command(session, &command, printer) == Flow::Quit {
                                // Dropping the exchange settles it as failed
                                return Ok(());
                            }
                        }
                    }
                }
            }
        }
    }
    Ok(())
}

fn handle_idle_command<T, S>(session: &ChatSession<T, S>, command: &Command<'_>, printer: &mut Printer) -> Flow
where
    T: TransportClient,
    S: SessionStore,
{
    match command {
        Command::Quit => return Flow::Quit,
        Command::Clear => {
            session.clear();
            printer.show(&session.view().transcript, false);
        }
        Command::Help => println!("{HELP}"),
        Command::Say(_) => {}
    }
    Flow::Continue
}

fn report_submit(result: Result<(), TransitionError>) {
    match result {
        Ok(()) | Err(TransitionError::BlankMessage) => {}
        Err(e) => println!("({e})"),
    }
}

/// Prints each message once, however often the transcript is redrawn
#[derive(Default)]
struct Printer {
    printed: HashSet<MessageId>,
}

impl Printer {
    /// Print messages not shown yet. Typed user lines are already on screen,
    /// so they are only echoed when replaying a restored transcript.
    fn show(&mut self, transcript: &[Message], echo_user: bool) {
        for line in self.pending_lines(transcript, echo_user) {
            println!("{line}");
        }
    }

    fn pending_lines(&mut self, transcript: &[Message], echo_user: bool) -> Vec<String> {
        let mut lines = Vec::new();
        for message in transcript {
            if !self.printed.insert(message.id.clone()) {
                continue;
            }
            let speaker = match message.role {
                Role::User if !echo_user => continue,
                Role::User => "you",
                Role::Assistant => "assistant",
            };
            lines.push(format!("{speaker}> {}", message.content));
        }
        lines
    }
}

async fn show_typing(mut views: watch::Receiver<SessionView>) {
    let mut was_typing = views.borrow().is_typing;
    while views.changed().await.is_ok() {
        let typing = views.borrow_and_update().is_typing;
        if typing && !was_typing {
            println!("assistant is typing...");
        }
        was_typing = typing;
    }
}

async fn print_diagnostics(mut diagnostics: broadcast::Receiver<Diagnostic>) {
    loop {
        match diagnostics.recv().await {
            Ok(diagnostic) => eprintln!("warning: {diagnostic}"),
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Diagnostics receiver lagged");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
