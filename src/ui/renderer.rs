/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// This eliminates flicker caused by full-screen redraws.
///
/// The renderer is a pure reader: it consumes each cell's
/// (kind, color) pair plus the scalar player position, and never
/// touches simulation state.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::sim::world::WorldState;

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit dark background for all "empty" terminal cells, used
    /// for both Clear and cell backgrounds so inter-row gap pixels
    /// match on VTE-based terminals.
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        let mut cx = x;
        for ch in s.chars() {
            if cx >= self.width {
                break;
            }
            self.set(cx, y, Cell { ch, fg, bg });
            cx += 1;
        }
    }
}

// ── Renderer ──

/// Each game cell is 2 terminal columns wide, so tiles read as
/// roughly square blocks.
const CELL_W: usize = 2;

const HUD_ROW: usize = 0;
const MAP_ROW: usize = 2;

const PLAYER_COLOR: Color = Color::Rgb { r: 0xff, g: 0x00, b: 0x00 };

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;
        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            Clear(ClearType::All),
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    /// Draw the world. Pure read of grid + player position.
    pub fn render(&mut self, world: &WorldState) -> io::Result<()> {
        let (tw, th) = terminal::size()?;
        let (tw, th) = (tw as usize, th as usize);
        if tw != self.term_w || th != self.term_h {
            self.term_w = tw;
            self.term_h = th;
            self.front.resize(tw, th);
            self.back.resize(tw, th);
            // Force a full repaint after resize.
            self.back.clear();
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        self.front.clear();
        self.compose_hud(world);
        self.compose_map(world);
        self.flush_diff()?;
        Ok(())
    }

    // ── Frame composition ──

    fn compose_hud(&mut self, world: &WorldState) {
        let hud = format!(
            " {}  [{}/{}]  tick {}",
            world.level_name,
            world.current_level + 1,
            world.total_levels,
            world.tick,
        );
        self.front.put_str(0, HUD_ROW, &hud, Color::White, Cell::BASE_BG);

        if world.paused {
            self.front.put_str(0, HUD_ROW + 1, " PAUSED", Color::Yellow, Cell::BASE_BG);
        } else if !world.message.is_empty() {
            self.front
                .put_str(0, HUD_ROW + 1, &format!(" {}", world.message), Color::Cyan, Cell::BASE_BG);
        }
    }

    fn compose_map(&mut self, world: &WorldState) {
        for y in 0..world.grid.height() {
            for x in 0..world.grid.width() {
                let tile = world.grid.get(x as i32, y as i32);
                let bg = match tile.color() {
                    Some((r, g, b)) => Color::Rgb { r, g, b },
                    None => Cell::BASE_BG,
                };
                self.paint_cell(x, y, bg);
            }
        }

        // Player overlay: drawn from the scalar position, on top of
        // whatever the grid holds there (always Empty).
        if world.player_x >= 0 && world.player_y >= 0 {
            self.paint_cell(world.player_x as usize, world.player_y as usize, PLAYER_COLOR);
        }
    }

    fn paint_cell(&mut self, gx: usize, gy: usize, bg: Color) {
        let ty = MAP_ROW + gy;
        for i in 0..CELL_W {
            self.front.set(gx * CELL_W + i, ty, Cell { ch: ' ', fg: Color::White, bg });
        }
    }

    // ── Diff flush ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = None;
        let mut last_bg = None;

        for y in 0..self.front.height {
            let mut x = 0;
            while x < self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    x += 1;
                    continue;
                }

                queue!(self.writer, MoveTo(x as u16, y as u16))?;
                // Emit runs of changed cells without re-issuing MoveTo.
                while x < self.front.width {
                    let cell = self.front.get(x, y);
                    if cell == self.back.get(x, y) {
                        break;
                    }
                    if last_fg != Some(cell.fg) {
                        queue!(self.writer, SetForegroundColor(cell.fg))?;
                        last_fg = Some(cell.fg);
                    }
                    if last_bg != Some(cell.bg) {
                        queue!(self.writer, SetBackgroundColor(cell.bg))?;
                        last_bg = Some(cell.bg);
                    }
                    queue!(self.writer, Print(cell.ch))?;
                    x += 1;
                }
            }
        }

        self.writer.flush()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }
}
