#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Presentation contracts for Gridfall adapters.
//!
//! The session loop hands owned [`RenderFrame`] values across a channel. A
//! [`Presenter`] turns each frame into output without ever touching the
//! simulation, so presenters can run on their own thread.

use std::{fmt::Write as _, io::Write};

use anyhow::{Context, Result as AnyResult};
use glam::Vec2;
use gridfall_core::{
    Archetype, CellCoord, FrameEntityKind, RenderFrame, RewardEvent, SessionState, TileKind,
    WorldPoint,
};

/// Sink capable of presenting session frames.
pub trait Presenter {
    /// Presents a single frame.
    fn present(&mut self, frame: &RenderFrame) -> AnyResult<()>;

    /// Called once after the session loop stopped.
    fn finish(&mut self, state: SessionState) -> AnyResult<()> {
        let _ = state;
        Ok(())
    }
}

/// Converts a world point into a glam vector.
#[must_use]
pub fn to_vec2(point: WorldPoint) -> Vec2 {
    Vec2::new(point.x(), point.y())
}

/// Maps world positions into the coordinate space of a camera window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    origin: Vec2,
    tile_size: f32,
    window_size: u32,
}

impl Viewport {
    /// Builds the viewport a frame was captured with.
    #[must_use]
    pub fn of(frame: &RenderFrame) -> Self {
        Self {
            origin: Vec2::new(frame.origin.column() as f32, frame.origin.row() as f32)
                * frame.tile_size,
            tile_size: frame.tile_size,
            window_size: frame.window_size,
        }
    }

    /// Position relative to the window's upper-left corner, in world units.
    #[must_use]
    pub fn to_screen(&self, point: WorldPoint) -> Vec2 {
        to_vec2(point) - self.origin
    }

    /// Window-relative cell holding the point, if it falls inside the window.
    #[must_use]
    pub fn window_cell(&self, point: WorldPoint) -> Option<(u32, u32)> {
        if self.tile_size <= 0.0 {
            return None;
        }
        let local = (self.to_screen(point) / self.tile_size).floor();
        if local.x < 0.0 || local.y < 0.0 {
            return None;
        }
        let (column, row) = (local.x as u32, local.y as u32);
        (column < self.window_size && row < self.window_size).then_some((column, row))
    }

    /// Window-relative cell for a grid cell, if it falls inside the window.
    #[must_use]
    pub fn window_cell_of(&self, cell: CellCoord) -> Option<(u32, u32)> {
        self.window_cell(WorldPoint::cell_center(cell, self.tile_size))
    }
}

/// Character used for a tile, `' '` for padding beyond the grid.
#[must_use]
pub const fn tile_glyph(tile: Option<TileKind>) -> char {
    match tile {
        None => ' ',
        Some(TileKind::Floor) => '.',
        Some(TileKind::Wall) => '#',
        Some(TileKind::Chest) => '=',
        Some(TileKind::Start) => '<',
        Some(TileKind::Finish) => '>',
        Some(TileKind::Chasm) => ':',
        Some(TileKind::Hazard) => '^',
    }
}

/// Character used for a monster archetype.
#[must_use]
pub const fn archetype_glyph(archetype: Archetype) -> char {
    match archetype {
        Archetype::Slime => 's',
        Archetype::Bat => 'b',
        Archetype::Knight => 'k',
        Archetype::Archer => 'a',
    }
}

/// Plain-text presenter writing one block of lines per frame.
#[derive(Debug)]
pub struct TextPresenter<W: Write> {
    out: W,
    buffer: String,
}

impl<W: Write> TextPresenter<W> {
    /// Creates a presenter writing into `out`.
    pub fn new(out: W) -> Self {
        Self {
            out,
            buffer: String::new(),
        }
    }

    /// Consumes the presenter, returning the writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Presenter for TextPresenter<W> {
    fn present(&mut self, frame: &RenderFrame) -> AnyResult<()> {
        self.buffer.clear();
        render_into(frame, &mut self.buffer);
        self.out
            .write_all(self.buffer.as_bytes())
            .context("failed to write frame")?;
        self.out.flush().context("failed to flush frame")
    }

    fn finish(&mut self, state: SessionState) -> AnyResult<()> {
        writeln!(self.out, "session closed: {}", state_label(state))
            .context("failed to write closing line")?;
        self.out.flush().context("failed to flush closing line")
    }
}

/// Renders a frame the way [`TextPresenter`] prints it.
#[must_use]
pub fn render_to_string(frame: &RenderFrame) -> String {
    let mut text = String::new();
    render_into(frame, &mut text);
    text
}

fn render_into(frame: &RenderFrame, text: &mut String) {
    let size = frame.window_size as usize;
    let mut glyphs: Vec<char> = (0..size * size)
        .map(|index| {
            let (column, row) = ((index % size) as u32, (index / size) as u32);
            tile_glyph(frame.tile_at(column, row))
        })
        .collect();

    let viewport = Viewport::of(frame);
    let mut place = |cell: Option<(u32, u32)>, glyph: char| {
        if let Some((column, row)) = cell {
            glyphs[row as usize * size + column as usize] = glyph;
        }
    };

    for pickup in &frame.pickups {
        place(viewport.window_cell_of(pickup.cell), '$');
    }
    for projectile in &frame.projectiles {
        place(viewport.window_cell(projectile.position), '*');
    }
    // Player last so it is never hidden.
    for entity in frame.entities.iter().rev() {
        let glyph = match entity.kind {
            FrameEntityKind::Player => '@',
            FrameEntityKind::Monster { archetype, .. } => archetype_glyph(archetype),
        };
        place(viewport.window_cell(entity.position), glyph);
    }

    for row in glyphs.chunks(size.max(1)) {
        text.extend(row);
        text.push('\n');
    }

    let player = &frame.player;
    let _ = writeln!(
        text,
        "tick {} | {} | hp {}/{} | gold {} | kills {} | score {} | potions {}",
        frame.tick,
        state_label(frame.state),
        player.health.get(),
        player.max_health.get(),
        player.currency,
        player.kills,
        player.score,
        player.potions,
    );
    for reward in &frame.rewards {
        let _ = writeln!(text, "{}", reward_line(reward));
    }
}

fn state_label(state: SessionState) -> &'static str {
    match state {
        SessionState::Running => "running",
        SessionState::Paused => "paused",
        SessionState::GameOver => "game over",
        SessionState::Completed => "completed",
    }
}

fn reward_line(reward: &RewardEvent) -> String {
    match *reward {
        RewardEvent::MonsterEliminated { cell, value, .. } => {
            format!("monster eliminated at {cell}, dropped {value}")
        }
        RewardEvent::ChestOpened { cell, value } => format!("chest at {cell} held {value}"),
        RewardEvent::PickupCollected { value, .. } => format!("picked up {value}"),
        RewardEvent::HazardStepped { damage, .. } => format!("hazard dealt {damage}"),
    }
}
