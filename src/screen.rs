use crate::display::Display;
use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen};
use log::warn;
use std::io;
use tui::backend::CrosstermBackend;
use tui::layout::Rect;
use tui::style::{Color, Style};
use tui::symbols::Marker;
use tui::widgets::canvas::{Canvas, Points};
use tui::widgets::{Block, Borders};
use tui::Terminal;

/// Screen is what the framebuffer gets painted on. It should abstract the
/// implementation details, so a variety of kinds of screen would work.
pub trait Screen {
    /// paint the framebuffer
    fn draw(&mut self, display: &Display) -> Result<(), io::Error>;

    /// paint, but only if the framebuffer changed since the last paint
    fn refresh(&mut self, display: &mut Display) -> Result<(), io::Error> {
        if !display.refresh_requested() {
            return Ok(());
        }
        self.draw(display)?;
        display.clear_refresh();
        Ok(())
    }
}

// store useful metadata about the framebuffer
struct Resolution(usize, usize);

impl Resolution {
    fn of(display: &Display) -> Self {
        Resolution(display.width(), display.height())
    }

    fn x_bounds(&self) -> [f64; 2] {
        [0.0, (self.0 - 1) as f64]
    }

    fn y_bounds(&self) -> [f64; 2] {
        [-1.0 * (self.1 - 1) as f64, 0.0]
    }

    /// canvas coordinates of every pixel that is lit (`on`) or unlit
    fn points<'a>(
        &self,
        pixels: &'a [u8],
        on: bool,
    ) -> impl std::iter::Iterator<Item = (f64, f64)> + 'a {
        let w = self.0;
        pixels
            .iter()
            .enumerate()
            .filter(move |(_, p)| (**p != 0) == on)
            .map(move |(i, _)| {
                (
                    (i % w) as f64,        // x
                    -1.0 * (i / w) as f64, // y
                )
            })
    }
}

/// monochrome display in a terminal, rendered using TUI and crossterm
pub struct MonoTermScreen {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl MonoTermScreen {
    pub fn new() -> Result<MonoTermScreen, io::Error> {
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.hide_cursor()?;
        terminal.clear()?;
        Ok(MonoTermScreen { terminal })
    }
}

impl Drop for MonoTermScreen {
    fn drop(&mut self) {
        if let Err(e) = self
            .terminal
            .show_cursor()
            .and_then(|_| execute!(io::stdout(), LeaveAlternateScreen))
        {
            warn!("couldn't restore the terminal: {}", e);
        }
    }
}

impl Screen for MonoTermScreen {
    fn draw(&mut self, display: &Display) -> Result<(), io::Error> {
        let resolution = Resolution::of(display);
        // expand the framebuffer into x, y float coords, suitable for
        // rendering with TUI. this just prints blocky points for now
        let unlit: Vec<(f64, f64)> = resolution.points(display.pixels(), false).collect();
        let lit: Vec<(f64, f64)> = resolution.points(display.pixels(), true).collect();

        // for now this assumes a 1:1 ratio between terminal cells, chip8
        // pixels and the internal TUI canvas
        self.terminal.draw(|f| {
            let size = Rect::new(0, 0, 2 + resolution.0 as u16, 2 + resolution.1 as u16);

            let canvas = Canvas::default()
                .block(
                    Block::default()
                        .title("CHIP-8")
                        .borders(Borders::ALL)
                        .style(Style::default().bg(Color::Black)),
                )
                .x_bounds(resolution.x_bounds())
                .y_bounds(resolution.y_bounds())
                .marker(Marker::Block)
                .paint(|ctx| {
                    ctx.draw(&Points {
                        coords: &unlit,
                        color: Color::Black,
                    });
                    ctx.draw(&Points {
                        coords: &lit,
                        color: Color::White,
                    });
                });
            f.render_widget(canvas, size);
        })?;
        Ok(())
    }
}

/// useful for testing non-display routines; remembers how often it drew
#[derive(Default)]
pub struct DummyScreen {
    pub frames: usize,
}

impl DummyScreen {
    pub fn new() -> DummyScreen {
        DummyScreen { frames: 0 }
    }
}

impl Screen for DummyScreen {
    fn draw(&mut self, _display: &Display) -> Result<(), io::Error> {
        self.frames += 1;
        Ok(())
    }
}
