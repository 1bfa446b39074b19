//! Line-oriented chat session over any reader/writer pair.

use crate::render;
use assistant_core::history::ConversationHistory;
use assistant_core::router::Router;
use std::io::{BufRead, Write};
use tracing::warn;

pub const PROMPT: &str = "> ";
pub const GREETING: &str =
    "Assistant de l'école. Posez votre question (/history, /clear, /quit).";

#[derive(Debug, PartialEq, Eq)]
enum Command<'a> {
    Quit,
    History,
    Clear,
    Skip,
    Message(&'a str),
}

fn parse(line: &str) -> Command<'_> {
    match line.trim() {
        "/quit" | "/exit" => Command::Quit,
        "/history" => Command::History,
        "/clear" => Command::Clear,
        "" => Command::Skip,
        text => Command::Message(text),
    }
}

/// Runs until `/quit` or end of input. A failed request is reported and the
/// session goes on; it leaves no trace in the history.
pub async fn run_session<R, W>(
    router: &Router,
    history: &mut ConversationHistory,
    input: R,
    mut output: W,
) -> anyhow::Result<()>
where
    R: BufRead,
    W: Write,
{
    writeln!(output, "{GREETING}")?;
    write!(output, "{PROMPT}")?;
    output.flush()?;
    for line in input.lines() {
        let line = line?;
        match parse(&line) {
            Command::Quit => break,
            Command::History => writeln!(output, "{}", render::history(history))?,
            Command::Clear => {
                history.clear();
                writeln!(output, "Historique effacé.")?;
            }
            Command::Skip => {}
            Command::Message(text) => match router.handle(text, history).await {
                Ok(reply) => writeln!(output, "{}", render::reply(&reply))?,
                Err(err) => {
                    warn!(error = %err, "request failed");
                    writeln!(output, "Erreur : {err}")?;
                }
            },
        }
        write!(output, "{PROMPT}")?;
        output.flush()?;
    }
    writeln!(output)?;
    Ok(())
}
