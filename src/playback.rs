//! Looping playback of pre-rendered frames.

use std::io::Write;
use std::sync::mpsc::{Receiver, RecvTimeoutError, TryRecvError};
use std::time::{Duration, Instant};

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::style::{Print, ResetColor};
use crossterm::terminal::{Clear, ClearType};
use tracing::{debug, info};

use crate::error::Result;

/// A frame's text together with its on-screen time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFrame {
    pub text: String,
    pub delay: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Running,
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Interrupted,
    TimeLimit,
    /// There was nothing to play.
    Empty,
}

/// Draws frames to `out` in a loop.
///
/// While the player is `Running` the cursor is hidden. Leaving that state,
/// whether through [`Player::play`] returning or the player being dropped
/// after a failed write, clears the display and restores the cursor.
pub struct Player<W: Write> {
    out: W,
    frames: Vec<RenderedFrame>,
    state: PlaybackState,
}

impl<W: Write> Player<W> {
    pub fn new(out: W, frames: Vec<RenderedFrame>) -> Self {
        Self { out, frames, state: PlaybackState::Stopped }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Cycles through the frames until a message arrives on `stop`, the
    /// sending side hangs up, or `limit` has elapsed.
    ///
    /// Each frame stays up for exactly its delay; no correction is made for
    /// the time spent writing it.
    pub fn play(&mut self, stop: &Receiver<()>, limit: Option<Duration>) -> Result<StopReason> {
        if self.frames.is_empty() {
            return Ok(StopReason::Empty);
        }

        self.state = PlaybackState::Running;
        crossterm::queue!(self.out, Hide)?;
        info!(frames = self.frames.len(), "playback started");

        let started = Instant::now();
        let mut index = 0;
        let reason = loop {
            match stop.try_recv() {
                Err(TryRecvError::Empty) => {}
                Ok(()) | Err(TryRecvError::Disconnected) => break StopReason::Interrupted,
            }
            if limit.is_some_and(|l| started.elapsed() >= l) {
                break StopReason::TimeLimit;
            }

            let frame = &self.frames[index];
            draw_frame(&mut self.out, frame)?;

            match stop.recv_timeout(frame.delay) {
                Err(RecvTimeoutError::Timeout) => {}
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break StopReason::Interrupted,
            }
            index = (index + 1) % self.frames.len();
        };

        debug!(?reason, "playback stopping");
        self.stop()?;
        Ok(reason)
    }

    fn stop(&mut self) -> Result<()> {
        self.state = PlaybackState::Stopped;
        crossterm::execute!(self.out, MoveTo(0, 0), Clear(ClearType::All), ResetColor, Show)?;
        Ok(())
    }
}

impl<W: Write> Drop for Player<W> {
    fn drop(&mut self) {
        if self.state == PlaybackState::Running {
            let _ = self.stop();
        }
    }
}

fn draw_frame<W: Write>(out: &mut W, frame: &RenderedFrame) -> std::io::Result<()> {
    crossterm::queue!(out, MoveTo(0, 0), Clear(ClearType::All), Print(&frame.text), Print("\n"))?;
    out.flush()
}
