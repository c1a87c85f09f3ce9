//! Single-line textual progress bar.
//!
//! The bar looks like `<activity>[=====     ]  50.0%` and is redrawn in place using a carriage
//! return. Redraws are throttled: a tick only redraws when progress moved by at least a tenth of
//! a percent since the last draw, or when the total has been reached.

use crate::IngestError;
use std::io::{self, Stdout, Write};

/// Width used when none is requested and the terminal cannot be queried.
pub const DEFAULT_WIDTH: usize = 80;

/// Characters taken by `[`, `]`, a space and the `nnn.n%` percentage.
const DECORATION: usize = 9;

/// Redraw when progress moves by at least `1 / REDRAW_RESOLUTION` of the total.
const REDRAW_RESOLUTION: u128 = 1000;

/// Configures a [`ProgressTracker`].
///
/// # Examples
///
/// ```
/// # use elastic_push::ProgressBuilder;
/// # fn main() -> Result<(), elastic_push::IngestError> {
/// let mut progress = ProgressBuilder::new(4)
///     .width(19)
///     .build_with_output(Vec::<u8>::new())?;
/// progress.tick(2)?;
/// assert_eq!(progress.render(), "[=====     ]  50.0%");
/// progress.done()?;
/// assert_eq!(progress.processed(), 4);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ProgressBuilder {
    total: u64,
    width: Option<usize>,
    activity: String,
}

impl ProgressBuilder {
    /// Starts a builder for a bar counting up to `total` units.
    #[must_use]
    pub fn new(total: u64) -> Self {
        Self {
            total,
            width: None,
            activity: String::new(),
        }
    }

    /// Requests an explicit line width instead of probing the terminal.
    #[must_use]
    pub fn width(mut self, width: usize) -> Self {
        self.width = Some(width);
        self
    }

    /// Sets a label printed in front of the bar.
    #[must_use]
    pub fn activity<S: Into<String>>(mut self, activity: S) -> Self {
        self.activity = activity.into();
        self
    }

    /// Builds a tracker drawing to standard output.
    ///
    /// Without an explicit width, the width of the terminal attached to standard output is used,
    /// or [`DEFAULT_WIDTH`] if there is none.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the total is zero.
    pub fn build(self) -> Result<ProgressTracker<Stdout>, IngestError> {
        let width = self.width.or_else(terminal_width);
        self.finish(io::stdout(), width)
    }

    /// Builds a tracker drawing to `output`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the total is zero.
    pub fn build_with_output<W: Write>(self, output: W) -> Result<ProgressTracker<W>, IngestError> {
        let width = self.width;
        self.finish(output, width)
    }

    fn finish<W: Write>(
        self,
        output: W,
        width: Option<usize>,
    ) -> Result<ProgressTracker<W>, IngestError> {
        if self.total == 0 {
            return Err(IngestError::configuration(
                "progress total must be positive",
            ));
        }
        let activity_len = self.activity.chars().count();
        let width = width
            .unwrap_or(DEFAULT_WIDTH)
            .min(DEFAULT_WIDTH + activity_len);
        Ok(ProgressTracker {
            total: self.total,
            processed: 0,
            last_drawn: 0,
            finished: false,
            width,
            activity: self.activity,
            activity_len,
            output,
        })
    }
}

fn terminal_width() -> Option<usize> {
    console::Term::stdout()
        .size_checked()
        .map(|(_rows, columns)| usize::from(columns))
}

/// Tracks processed units against a known total and draws a progress bar.
#[derive(Debug)]
pub struct ProgressTracker<W: Write> {
    total: u64,
    processed: u64,
    /// Value of `processed` at the last draw.
    last_drawn: u64,
    /// Set once a newline-terminated line was written; ticks no longer draw.
    finished: bool,
    width: usize,
    activity: String,
    activity_len: usize,
    output: W,
}

impl<W: Write> ProgressTracker<W> {
    /// Total number of units.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Units processed so far.
    #[must_use]
    pub fn processed(&self) -> u64 {
        self.processed
    }

    /// Line width the bar is drawn in.
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Processed fraction, between 0 and 1.
    #[must_use]
    pub fn fraction(&self) -> f64 {
        self.processed as f64 / self.total as f64
    }

    /// Whether the final line has already been written.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// The underlying output.
    #[must_use]
    pub fn output(&self) -> &W {
        &self.output
    }

    /// Returns the current bar without drawing it.
    #[must_use]
    pub fn render(&self) -> String {
        let budget = self
            .width
            .saturating_sub(DECORATION + self.activity_len);
        let filled = (u128::from(self.processed) * budget as u128 / u128::from(self.total)) as usize;
        let filled = filled.min(budget);
        format!(
            "{}[{}{}] {:5.1}%",
            self.activity,
            "=".repeat(filled),
            " ".repeat(budget - filled),
            self.fraction() * 100.0
        )
    }

    /// Draws the bar, ending the line if the total has been reached.
    ///
    /// # Errors
    ///
    /// Passes along any IO errors.
    pub fn draw(&mut self) -> io::Result<()> {
        let terminate = self.processed == self.total;
        self.draw_line(terminate)
    }

    /// Advances by `increment` units; `0` advances by one.
    ///
    /// Progress is capped at the total. The bar is redrawn only if the total has been reached or
    /// progress moved by at least 0.1% since the last draw.
    ///
    /// # Errors
    ///
    /// Passes along any IO errors.
    pub fn tick(&mut self, increment: u64) -> io::Result<()> {
        let increment = if increment == 0 { 1 } else { increment };
        self.processed = self.processed.saturating_add(increment).min(self.total);
        if self.finished {
            return Ok(());
        }
        if self.processed == self.total || self.moved_since_last_draw() {
            self.draw()?;
        }
        Ok(())
    }

    /// Marks everything as processed and draws the final line, regardless of the throttle.
    ///
    /// # Errors
    ///
    /// Passes along any IO errors.
    pub fn done(&mut self) -> io::Result<()> {
        self.processed = self.total;
        self.draw_line(true)
    }

    /// Draws the final line at the current progress, for runs aborted before completion.
    ///
    /// # Errors
    ///
    /// Passes along any IO errors.
    pub fn cancel(&mut self) -> io::Result<()> {
        self.draw_line(true)
    }

    fn moved_since_last_draw(&self) -> bool {
        u128::from(self.processed - self.last_drawn) * REDRAW_RESOLUTION
            >= u128::from(self.total)
    }

    fn draw_line(&mut self, terminate: bool) -> io::Result<()> {
        let line = self.render();
        write!(self.output, "\r{}", line)?;
        if terminate {
            writeln!(self.output)?;
        }
        self.output.flush()?;
        self.last_drawn = self.processed;
        self.finished |= terminate;
        Ok(())
    }
}
