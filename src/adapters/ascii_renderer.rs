//! Text-mode court renderer.

use std::{
    io::{self, Write},
    thread,
    time::Duration,
};

use crate::{Result, environment::Frame, error::Error, ports::Renderer};

/// Draws the court as a character grid.
///
/// Row 0 is the top of the court (y = field height). The left paddle is
/// drawn in the first column, the right paddle (or wall) in the last.
pub struct AsciiRenderer {
    columns: usize,
    rows: usize,
    frame_delay: Option<Duration>,
    out: Box<dyn Write + Send>,
}

impl AsciiRenderer {
    /// Render to standard output.
    pub fn stdout(columns: usize, rows: usize) -> Self {
        Self::new(columns, rows, Box::new(io::stdout()))
    }

    pub fn new(columns: usize, rows: usize, out: Box<dyn Write + Send>) -> Self {
        Self {
            columns: columns.max(3),
            rows: rows.max(2),
            frame_delay: None,
            out,
        }
    }

    /// Sleep after every frame to cap the frame rate.
    pub fn with_frame_delay(mut self, delay: Duration) -> Self {
        self.frame_delay = Some(delay);
        self
    }

    fn row_of(&self, y: f64, height: f64) -> usize {
        let fraction = (1.0 - y / height).clamp(0.0, 1.0);
        ((fraction * self.rows as f64) as usize).min(self.rows - 1)
    }

    fn column_of(&self, x: f64, width: f64) -> usize {
        let fraction = (x / width).clamp(0.0, 1.0);
        ((fraction * self.columns as f64) as usize).min(self.columns - 1)
    }

    fn fill_paddle(&self, grid: &mut [Vec<char>], column: usize, top: f64, frame: &Frame) {
        let first = self.row_of(top + frame.paddle_height, frame.field_height);
        let last = self.row_of(top, frame.field_height);
        for row in grid.iter_mut().take(last + 1).skip(first) {
            row[column] = '|';
        }
    }

    /// Lay out one frame without writing it anywhere.
    pub fn draw(&self, frame: &Frame) -> String {
        let mut grid = vec![vec![' '; self.columns]; self.rows];

        self.fill_paddle(&mut grid, 0, frame.left_paddle, frame);
        match frame.right_paddle {
            Some(top) => self.fill_paddle(&mut grid, self.columns - 1, top, frame),
            None => {
                for row in grid.iter_mut() {
                    row[self.columns - 1] = '#';
                }
            }
        }

        let ball_row = self.row_of(frame.ball_y, frame.field_height);
        let ball_column = self.column_of(frame.ball_x, frame.field_width);
        grid[ball_row][ball_column] = 'o';

        let border = "-".repeat(self.columns + 2);
        let mut text = String::with_capacity((self.columns + 3) * (self.rows + 2));
        text.push_str(&border);
        text.push('\n');
        for row in grid {
            text.push('|');
            text.extend(row);
            text.push('|');
            text.push('\n');
        }
        text.push_str(&border);
        text.push('\n');
        text
    }
}

impl Renderer for AsciiRenderer {
    fn render(&mut self, frame: &Frame) -> Result<()> {
        let text = self.draw(frame);
        self.out
            .write_all(text.as_bytes())
            .and_then(|()| self.out.flush())
            .map_err(|source| Error::Io {
                operation: "write frame".to_string(),
                source,
            })?;
        if let Some(delay) = self.frame_delay {
            thread::sleep(delay);
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.out.flush().map_err(|source| Error::Io {
            operation: "flush renderer".to_string(),
            source,
        })
    }
}
