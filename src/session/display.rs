//! Session display
//!
//! Redrawn after every transition and update tick.

use std::fmt::Write as _;
use std::io::Write;

use crate::render::TextGrid;
use crate::render::text::side_by_side;
use crate::trial::{Choice, Phase, TrialEngine};

const LABELS: (&str, &str) = ("Option A", "Option B");
const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Output surface of a session.
pub trait Display: Send {
    /// Redraws from the engine's current state.
    fn refresh(&mut self, engine: &TrialEngine);
}

/// Display that draws nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullDisplay;

impl Display for NullDisplay {
    fn refresh(&mut self, _engine: &TrialEngine) {}
}

/// Draws both grids, progress and the prompt to a terminal.
pub struct TerminalDisplay {
    left: TextGrid,
    right: TextGrid,
    out: Box<dyn Write + Send>,
    clear_screen: bool,
}

impl TerminalDisplay {
    /// Creates a display reading the cells of `left` and `right`.
    #[must_use]
    pub fn new(left: TextGrid, right: TextGrid, out: Box<dyn Write + Send>) -> Self {
        Self {
            left,
            right,
            out,
            clear_screen: false,
        }
    }

    /// Creates a display on stdout that redraws in place.
    #[must_use]
    pub fn stdout(left: TextGrid, right: TextGrid) -> Self {
        Self {
            clear_screen: true,
            ..Self::new(left, right, Box::new(std::io::stdout()))
        }
    }

    /// Renders one frame of the display.
    #[must_use]
    pub fn render(&self, engine: &TrialEngine) -> String {
        let mut frame = String::new();
        if self.clear_screen {
            frame.push_str(CLEAR_SCREEN);
        }

        let counter = engine.counter();
        let _ = writeln!(
            frame,
            "{:<10}{}/{}",
            engine.phase().as_str(),
            counter.frames,
            engine.config().duration_frames
        );
        frame.push('\n');
        frame.push_str(&side_by_side(&self.left, &self.right, Some(LABELS)));
        frame.push('\n');
        frame.push_str(&prompt(engine));
        frame.push('\n');
        frame
    }
}

fn prompt(engine: &TrialEngine) -> String {
    match engine.phase() {
        Phase::Stopped => "[Enter] start   [q] quit".to_string(),
        Phase::Running => "[Enter] stop".to_string(),
        Phase::Choice => match engine.selection() {
            None => format!("[f] {}   [j] {}", LABELS.0, LABELS.1),
            Some(Choice::A) => format!("selected {}   [Enter] next", LABELS.0),
            Some(Choice::B) => format!("selected {}   [Enter] next", LABELS.1),
        },
    }
}

impl Display for TerminalDisplay {
    fn refresh(&mut self, engine: &TrialEngine) {
        let frame = self.render(engine);
        let _ = self.out.write_all(frame.as_bytes());
        let _ = self.out.flush();
    }
}

impl std::fmt::Debug for TerminalDisplay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TerminalDisplay")
            .field("clear_screen", &self.clear_screen)
            .finish_non_exhaustive()
    }
}
