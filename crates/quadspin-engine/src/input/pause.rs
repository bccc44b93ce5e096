/// Pause flag toggled by taps.
///
/// Pausing only stops the host from calling `update`/`draw`; no session state
/// changes, so resuming is instantaneous.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct PauseState {
    paused: bool,
}

impl PauseState {
    #[inline]
    pub fn is_paused(self) -> bool {
        self.paused
    }

    /// Flips the flag and returns the new value.
    pub fn toggle(&mut self) -> bool {
        self.paused = !self.paused;
        log::info!("{}", if self.paused { "paused" } else { "resumed" });
        self.paused
    }
}
