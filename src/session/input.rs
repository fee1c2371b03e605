//! Subject input
//!
//! Maps terminal lines onto session inputs. The terminal stays in cooked
//! mode, so a key press arrives as one line once Enter is hit; an empty line
//! is the advance trigger.

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use crate::trial::Choice;

use super::SessionHandle;

/// One action of the subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    /// Start, stop, or move on to the next trial.
    Advance,
    /// Pick a grid during the choice phase.
    Select(Choice),
    /// End the session.
    Quit,
}

/// Parses one input line.
///
/// - empty line, `space`, `start`, `stop`, `next` → [`Input::Advance`]
/// - `f`, `a` → option A (left grid)
/// - `j`, `b` → option B (right grid)
/// - `q`, `quit`, `exit` → [`Input::Quit`]
///
/// Anything else yields `None`.
#[must_use]
pub fn parse_line(line: &str) -> Option<Input> {
    match line.trim().to_ascii_lowercase().as_str() {
        "" | "space" | "start" | "stop" | "next" => Some(Input::Advance),
        "f" | "a" => Some(Input::Select(Choice::A)),
        "j" | "b" => Some(Input::Select(Choice::B)),
        "q" | "quit" | "exit" => Some(Input::Quit),
        _ => None,
    }
}

/// Forwards parsed lines from `reader` into the session.
///
/// Sends [`SessionHandle::shutdown`] when the reader reaches end of input.
/// The task ends once the session queue is gone.
pub fn spawn_reader<R>(reader: R, handle: SessionHandle) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = BufReader::new(reader).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    let Some(input) = parse_line(&line) else {
                        trace!(line = %line.trim(), "unrecognized input");
                        continue;
                    };
                    if handle.send(input).is_err() {
                        break;
                    }
                }
                Ok(None) => {
                    debug!("input closed");
                    let _ = handle.shutdown();
                    break;
                }
                Err(e) => {
                    debug!(error = %e, "input read failed");
                    let _ = handle.shutdown();
                    break;
                }
            }
        }
    })
}

/// Forwards stdin into the session.
pub fn spawn_stdin_reader(handle: SessionHandle) -> JoinHandle<()> {
    spawn_reader(tokio::io::stdin(), handle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_keys() {
        assert_eq!(parse_line(""), Some(Input::Advance));
        assert_eq!(parse_line("  \n"), Some(Input::Advance));
        assert_eq!(parse_line("F"), Some(Input::Select(Choice::A)));
        assert_eq!(parse_line("j"), Some(Input::Select(Choice::B)));
        assert_eq!(parse_line("q"), Some(Input::Quit));
        assert_eq!(parse_line("x"), None);
    }
}
