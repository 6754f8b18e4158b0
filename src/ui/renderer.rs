/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Compose the next frame into `front` (a grid of terminal cells)
///   2. Compare each cell with `back` (the previous frame)
///   3. Emit terminal commands only for cells that changed, batched with `queue!`
///   4. Flush once, then swap front/back
///
/// The renderer only reads `WorldState`; it never mutates the game.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::cell::CellKind;
use crate::sim::world::{Phase, WorldState};

// ── Cell: the unit of the frame buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Cell {
    ch: [u8; 8],
    ch_len: u8,
    fg: Color,
    bg: Color,
    wide: bool, // occupies 2 terminal columns
    cont: bool, // right half of a wide char, never printed
}

impl Cell {
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell {
        ch: [b' ', 0, 0, 0, 0, 0, 0, 0],
        ch_len: 1,
        fg: Color::White,
        bg: Cell::BASE_BG,
        wide: false,
        cont: false,
    };

    const WIDE_CONT: Cell = Cell {
        ch: [0; 8],
        ch_len: 0,
        fg: Color::White,
        bg: Cell::BASE_BG,
        wide: false,
        cont: true,
    };

    /// Differs from every real cell: forces a full repaint.
    const INVALID: Cell = Cell {
        ch: [b'?', 0, 0, 0, 0, 0, 0, 0],
        ch_len: 1,
        fg: Color::Magenta,
        bg: Color::Magenta,
        wide: false,
        cont: false,
    };

    fn from_char(c: char, fg: Color, bg: Color) -> Self {
        let mut cell = Self::BLANK;
        cell.ch_len = c.encode_utf8(&mut cell.ch).len() as u8;
        cell.fg = fg;
        cell.bg = bg;
        cell
    }

    fn from_char_wide(c: char, bg: Color) -> Self {
        let mut cell = Self::from_char(c, Color::Reset, bg);
        cell.wide = true;
        cell
    }

    fn as_str(&self) -> &str {
        std::str::from_utf8(&self.ch[..self.ch_len as usize]).unwrap_or(" ")
    }
}

// ── FrameBuffer ──

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
            *self = FrameBuffer::new(w, h);
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
        for (i, ch) in s.chars().enumerate() {
            self.set(x + i, y, Cell::from_char(ch, fg, bg));
        }
    }

    fn fill_row(&mut self, y: usize, bg: Color) {
        for x in 0..self.width {
            self.set(x, y, Cell::from_char(' ', Color::White, bg));
        }
    }
}

// ── Renderer ──

/// Each grid cell is 2 terminal columns wide.
const CELL_W: usize = 2;
const HUD_ROW: usize = 0;
const MAP_ROW: usize = 2;

const HUD_BG: Color = Color::Rgb { r: 20, g: 20, b: 60 };
const MSG_BG: Color = Color::Rgb { r: 200, g: 180, b: 50 };
const WALL_BG: Color = Color::Rgb { r: 90, g: 90, b: 110 };
const FLOOR_BG: Color = Color::Rgb { r: 32, g: 32, b: 48 };
const OVER_BG: Color = Color::Rgb { r: 140, g: 30, b: 30 };
const WIN_BG: Color = Color::Rgb { r: 30, g: 120, b: 60 };

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    last_screen: Option<(usize, Phase)>,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            last_screen: None,
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
        self.sync_size(true)
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(self.writer, ResetColor, cursor::Show, terminal::LeaveAlternateScreen)?;
        terminal::disable_raw_mode()
    }

    /// Resize buffers to the terminal; invalidate the back buffer on change.
    fn sync_size(&mut self, force: bool) -> io::Result<()> {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        let (tw, th) = (tw as usize, th as usize);
        if force || tw != self.front.width || th != self.front.height {
            self.front.resize(tw, th);
            self.back.resize(tw, th);
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }
        Ok(())
    }

    pub fn render(&mut self, world: &WorldState) -> io::Result<()> {
        self.sync_size(false)?;

        // Level change or game over: clean slate
        let screen = (world.level, world.phase);
        if self.last_screen != Some(screen) {
            self.back.cells.fill(Cell::INVALID);
            self.last_screen = Some(screen);
        }

        self.front.clear();
        compose(&mut self.front, world);
        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut cursor_at: Option<(usize, usize)> = None;

        queue!(self.writer, SetForegroundColor(last_fg), SetBackgroundColor(last_bg))?;

        for y in 0..self.front.height {
            let mut x = 0;
            while x < self.front.width {
                let cell = self.front.get(x, y);
                if cell.cont {
                    x += 1;
                    continue;
                }
                let cont_changed = cell.wide && self.front.get(x + 1, y) != self.back.get(x + 1, y);
                if cell == self.back.get(x, y) && !cont_changed {
                    x += 1;
                    continue;
                }

                if cursor_at != Some((x, y)) {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }
                queue!(self.writer, Print(cell.as_str()))?;

                let advance = if cell.wide { 2 } else { 1 };
                x += advance;
                cursor_at = Some((x, y));
            }
        }

        self.writer.flush()
    }
}

// ── Compose: pure function of the world ──

fn compose(buf: &mut FrameBuffer, w: &WorldState) {
    let hud = format!(" Time: {}s | Score: {} | Level: {} ", w.time, w.score, w.level);
    buf.fill_row(HUD_ROW, HUD_BG);
    buf.put_str(0, HUD_ROW, &hud, Color::White, HUD_BG);
    let stars = format!("Stars {}/{}  Total {} ", w.score, w.star_total, w.total_score);
    let stars_x = buf.width.saturating_sub(stars.chars().count());
    if stars_x > hud.chars().count() {
        buf.put_str(stars_x, HUD_ROW, &stars, Color::Yellow, HUD_BG);
    }

    for y in 0..w.grid.height() {
        for x in 0..w.grid.width() {
            compose_cell(buf, w.grid.rows()[y][x], x * CELL_W, MAP_ROW + y);
        }
    }

    let msg_row = MAP_ROW + w.grid.height() + 1;
    let (text, fg, bg) = match w.phase {
        Phase::Caught => (w.message.as_str(), Color::White, OVER_BG),
        Phase::Completed => (w.message.as_str(), Color::White, WIN_BG),
        Phase::Playing if w.paused => ("PAUSED  [P] Resume", Color::Black, MSG_BG),
        Phase::Playing => (w.message.as_str(), Color::Black, MSG_BG),
    };
    if !text.is_empty() {
        buf.fill_row(msg_row, bg);
        buf.put_str(0, msg_row, &format!(" ◈ {text} "), fg, bg);
    }

    let help = if w.phase.is_terminal() {
        " R/Enter: New game   Q/Esc: Quit"
    } else {
        " Arrows/WASD: Move   P: Pause   R: Restart   Q/Esc: Quit"
    };
    buf.put_str(0, msg_row + 2, help, Color::DarkGrey, Cell::BASE_BG);
}

fn compose_cell(buf: &mut FrameBuffer, kind: CellKind, col: usize, row: usize) {
    let glyph = match kind {
        CellKind::Empty => {
            buf.set(col, row, Cell::from_char('·', Color::DarkGrey, FLOOR_BG));
            buf.set(col + 1, row, Cell::from_char(' ', Color::DarkGrey, FLOOR_BG));
            return;
        }
        CellKind::Wall => {
            buf.set(col, row, Cell::from_char(' ', Color::White, WALL_BG));
            buf.set(col + 1, row, Cell::from_char(' ', Color::White, WALL_BG));
            return;
        }
        CellKind::Player => '🚶',
        CellKind::Enemy => '👹',
        CellKind::Star => '⭐',
        CellKind::Exit => '🚪',
    };
    // Wide glyph needs both columns on screen
    if col + 1 < buf.width {
        buf.set(col, row, Cell::from_char_wide(glyph, FLOOR_BG));
        buf.set(col + 1, row, Cell::WIDE_CONT);
    }
}
