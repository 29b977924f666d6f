use std::io::Write;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::error::SoundError;

/// Plays the notification sound for pushed announcements.
pub trait Chime: Send + Sync {
    fn play(&self) -> Result<(), SoundError>;
}

pub struct Silent;

impl Chime for Silent {
    fn play(&self) -> Result<(), SoundError> {
        Ok(())
    }
}

/// Rings the terminal bell.
pub struct TerminalBell;

impl Chime for TerminalBell {
    fn play(&self) -> Result<(), SoundError> {
        let mut out = std::io::stdout();
        out.write_all(b"\x07")?;
        out.flush()?;
        Ok(())
    }
}

/// Counts plays; can be switched to fail.
#[derive(Default)]
pub struct CountingChime {
    plays: AtomicUsize,
    broken: AtomicBool,
}

impl CountingChime {
    pub fn plays(&self) -> usize {
        self.plays.load(Ordering::SeqCst)
    }

    pub fn set_broken(&self, broken: bool) {
        self.broken.store(broken, Ordering::SeqCst);
    }
}

impl Chime for CountingChime {
    fn play(&self) -> Result<(), SoundError> {
        self.plays.fetch_add(1, Ordering::SeqCst);
        if self.broken.load(Ordering::SeqCst) {
            return Err(SoundError::Unavailable("output device busy".into()));
        }
        Ok(())
    }
}
