/// Terminal question loop.
///
/// Shows the pending pair, reads one line per answer and feeds it to the
/// session. Works on any `BufRead`/`Write` pair so it can be driven from tests.
use std::io::{self, BufRead, Write};

use pairsort_core::{Choice, Item, Outcome, Ranking, SessionState, SortError, SortSession};

pub const KEY_HELP: &str = "a = left, s = tie, d = right, u = undo, q = quit";

/// One line of user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Answer(Choice),
    Undo,
    Quit,
}

/// Parse a line: single keys (`a`/`s`/`d`/`u`/`q`) or words (`left`, `tie`, ...).
pub fn parse_command(line: &str) -> Option<Command> {
    let line = line.trim();
    let mut chars = line.chars();
    if let (Some(key), None) = (chars.next(), chars.next()) {
        return match key.to_ascii_lowercase() {
            'u' => Some(Command::Undo),
            'q' => Some(Command::Quit),
            _ => Choice::from_key(key).map(Command::Answer),
        };
    }
    match line.to_ascii_lowercase().as_str() {
        "undo" => Some(Command::Undo),
        "quit" | "exit" => Some(Command::Quit),
        _ => line.parse::<Choice>().ok().map(Command::Answer),
    }
}

/// Build the text shown for one question.
pub fn build_question(number: usize, estimate: usize, left: &Item, right: &Item) -> String {
    format!(
        "\nComparison #{number} (~{estimate} expected)\n  [a] {}\n  [d] {}\n> ",
        describe(left),
        describe(right),
    )
}

fn describe(item: &Item) -> String {
    if item.asset_ref.is_empty() {
        item.label.clone()
    } else {
        format!("{} ({})", item.label, item.asset_ref)
    }
}

fn to_io(e: SortError) -> io::Error {
    io::Error::other(e)
}

/// Run the session until the user accepts a result or quits.
///
/// Returns `None` when the user quits or input ends before a result is accepted.
/// A finished session can still be undone: the user is asked to confirm the
/// result first.
pub fn run_session<R: BufRead, W: Write>(
    session: &mut SortSession,
    mut input: R,
    out: &mut W,
) -> io::Result<Option<Ranking>> {
    let mut outcome = session.next(None).map_err(to_io)?;
    let mut line = String::new();

    loop {
        match &outcome {
            Outcome::Pending { left, right } => {
                let question = build_question(
                    session.comparisons() + 1,
                    session.estimated_comparisons(),
                    left,
                    right,
                );
                write!(out, "{question}")?;
            }
            Outcome::Result(_) => {
                if !session.can_undo() {
                    break;
                }
                write!(out, "\nDone after {} comparisons. [u] undo, Enter to accept\n> ", session.comparisons())?;
            }
        }
        out.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            return Ok(if session.state() == SessionState::Finished {
                session.ranking().cloned()
            } else {
                None
            });
        }

        let finished = session.state() == SessionState::Finished;
        match parse_command(&line) {
            Some(Command::Undo) => match session.undo() {
                Ok(previous) => outcome = previous,
                Err(SortError::NothingToUndo) => writeln!(out, "Nothing to undo")?,
                Err(e) => return Err(to_io(e)),
            },
            Some(Command::Quit) => return Ok(None),
            _ if finished => break,
            Some(Command::Answer(choice)) => {
                outcome = session.next(Some(choice)).map_err(to_io)?;
            }
            None => writeln!(out, "Unrecognised answer. Keys: {KEY_HELP}")?,
        }
    }

    Ok(session.ranking().cloned())
}
