//! Shared pieces of the pathstep demos: a text rendering of a [`Session`]
//! and a crossterm driver that animates it.
//!
//! The grid is drawn one character per cell, with a side panel showing the
//! score, the expansion count, the goal list and the route status.

pub mod term;

use std::fs;
use std::path::Path;

use pathstep_core::Config;
use pathstep_search::{CellKind, Session};

/// Columns between the grid and the side panel.
const GUTTER: usize = 2;

/// Character used for each kind of cell.
pub fn glyph(kind: CellKind) -> char {
    match kind {
        CellKind::Empty => ' ',
        CellKind::Wall => '#',
        CellKind::Start => 'S',
        CellKind::Goal => 'G',
        CellKind::ReachedGoal => '@',
        CellKind::Path => '*',
        CellKind::Open => 'o',
        CellKind::Closed => '.',
    }
}

/// One string per grid row.
pub fn render_grid(session: &Session) -> Vec<String> {
    let cols = session.grid().cols().max(1) as usize;
    session
        .cell_kinds()
        .chunks(cols)
        .map(|row| row.iter().map(|&k| glyph(k)).collect())
        .collect()
}

/// Side panel lines: score, expansions, targets, status and the control
/// caption.
pub fn render_panel(session: &Session) -> Vec<String> {
    let mut lines = vec![
        "SCORE".to_string(),
        format_cost(session.path_cost()),
        "EXPANSIONS".to_string(),
        session.expansions().to_string(),
        "TARGETS".to_string(),
    ];
    for w in session.goals() {
        let mark = if w.visited { '+' } else { '-' };
        lines.push(format!("{mark} [{}, {}]", w.pos.x, w.pos.y));
    }
    lines.push(String::new());
    lines.push(session.status().label().to_string());
    lines.push(format!("[ {} ]", session.control().label()));
    lines
}

/// Grid and panel side by side.
pub fn render(session: &Session) -> Vec<String> {
    let grid = render_grid(session);
    let panel = render_panel(session);
    let width = session.grid().cols().max(0) as usize;
    let rows = grid.len().max(panel.len());
    (0..rows)
        .map(|i| {
            let left = grid.get(i).map_or("", String::as_str);
            match panel.get(i) {
                Some(right) => format!("{left:<width$}{}{right}", " ".repeat(GUTTER)),
                None => left.to_string(),
            }
        })
        .collect()
}

/// Costs are multiples of the configured step costs; drop a trailing `.0`.
fn format_cost(cost: f64) -> String {
    if cost.fract() == 0.0 {
        format!("{cost:.0}")
    } else {
        format!("{cost}")
    }
}

/// Read a JSON [`Config`]. Missing fields take their default values.
pub fn load_config(path: &Path) -> Result<Config, Box<dyn std::error::Error>> {
    let text = fs::read_to_string(path)?;
    let config = serde_json::from_str(&text)?;
    Ok(config)
}
