//! Crossterm driver that animates a [`Session`] in the terminal.
//!
//! Space toggles start / pause (and restarts a finished run), `n` steps once
//! while paused, `r` restarts with the next seed and `q` or Esc quits.

use std::io::{self, Write};
use std::time::{Duration, Instant};

use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, ClearType},
};
use log::{debug, info};
use pathstep_search::{CellKind, Session};

use crate::{glyph, render_panel};

/// What a key press asks the driver to do.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Action {
    Toggle,
    Step,
    Reseed,
    Quit,
}

/// Maps a crossterm [`KeyCode`] to an [`Action`].
pub fn to_action(code: KeyCode) -> Option<Action> {
    match code {
        KeyCode::Char(' ') | KeyCode::Enter => Some(Action::Toggle),
        KeyCode::Char('n') => Some(Action::Step),
        KeyCode::Char('r') => Some(Action::Reseed),
        KeyCode::Char('q') | KeyCode::Esc => Some(Action::Quit),
        _ => None,
    }
}

/// Foreground and background of a cell.
pub fn colors(kind: CellKind) -> (Color, Color) {
    const VIOLET: Color = Color::Rgb { r: 238, g: 130, b: 238 };
    const LAVENDER: Color = Color::Rgb { r: 230, g: 230, b: 250 };
    const MINT: Color = Color::Rgb { r: 188, g: 245, b: 188 };
    const ORCHID: Color = Color::Rgb { r: 186, g: 85, b: 211 };
    match kind {
        CellKind::Empty => (Color::Reset, Color::Reset),
        CellKind::Wall => (Color::DarkGrey, Color::Black),
        CellKind::Start | CellKind::Goal => (Color::White, Color::Red),
        CellKind::ReachedGoal => (Color::White, ORCHID),
        CellKind::Path => (Color::Black, VIOLET),
        CellKind::Open => (Color::Black, MINT),
        CellKind::Closed => (Color::DarkGrey, LAVENDER),
    }
}

/// A raw-mode, alternate-screen terminal. Restored on drop.
pub struct Terminal {
    out: io::Stdout,
}

impl Terminal {
    pub fn open() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        let mut out = io::stdout();
        execute!(
            out,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            terminal::Clear(ClearType::All)
        )?;
        Ok(Self { out })
    }

    /// Wait up to `timeout` for a key press.
    pub fn poll(&mut self, timeout: Duration) -> io::Result<Option<Action>> {
        if !event::poll(timeout)? {
            return Ok(None);
        }
        let action = match event::read()? {
            Event::Key(KeyEvent {
                code,
                kind: KeyEventKind::Press,
                ..
            }) => to_action(code),
            Event::Resize(..) => {
                execute!(self.out, terminal::Clear(ClearType::All))?;
                None
            }
            _ => None,
        };
        Ok(action)
    }

    /// Draw the grid with one two-column block per cell and the panel to its
    /// right.
    pub fn draw(&mut self, session: &Session) -> io::Result<()> {
        let cols = session.grid().cols().max(1) as usize;
        for (i, kind) in session.cell_kinds().into_iter().enumerate() {
            let (x, y) = ((i % cols) as u16, (i / cols) as u16);
            let (fg, bg) = colors(kind);
            let ch = glyph(kind);
            queue!(
                self.out,
                cursor::MoveTo(2 * x, y),
                SetForegroundColor(fg),
                SetBackgroundColor(bg),
                Print(ch),
                Print(ch)
            )?;
        }
        queue!(self.out, ResetColor)?;

        let left = 2 * cols as u16 + 2;
        for (y, line) in render_panel(session).iter().enumerate() {
            queue!(
                self.out,
                cursor::MoveTo(left, y as u16),
                terminal::Clear(ClearType::UntilNewLine),
                Print(line)
            )?;
        }
        self.out.flush()
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        let _ = execute!(self.out, ResetColor, cursor::Show, terminal::LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

/// Animate `session` at `fps` search steps per second until the user quits.
pub fn run(session: &mut Session, fps: u32) -> Result<(), Box<dyn std::error::Error>> {
    let frame = Duration::from_secs(1) / fps.max(1);
    let mut term = Terminal::open()?;
    term.draw(session)?;
    let mut next = Instant::now() + frame;

    loop {
        let wait = next.saturating_duration_since(Instant::now());
        match term.poll(wait)? {
            Some(Action::Quit) => break,
            Some(Action::Toggle) => session.toggle()?,
            Some(Action::Step) => {
                if !session.is_running() {
                    session.step();
                }
            }
            Some(Action::Reseed) => {
                let seed = session.config().seed.wrapping_add(1);
                info!("restarting with seed {seed}");
                session.restart_with_seed(seed)?;
                execute!(io::stdout(), terminal::Clear(ClearType::All))?;
            }
            None => {}
        }
        if Instant::now() >= next {
            if let Some(outcome) = session.tick() {
                debug!("tick: {outcome:?}");
            }
            next = Instant::now() + frame;
        }
        term.draw(session)?;
    }
    Ok(())
}
