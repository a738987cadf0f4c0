//! Renderer port - optional drawing surface for the court.

use crate::{Result, environment::Frame};

/// A surface that draws ball and paddle positions.
///
/// The pipeline calls [`Renderer::render`] once per step, and only when a
/// renderer is attached. Learning never depends on it.
pub trait Renderer: Send {
    /// Draw one frame.
    fn render(&mut self, frame: &Frame) -> Result<()>;

    /// Release the surface at the end of a run.
    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}
