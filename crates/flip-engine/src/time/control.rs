/// Application time for one update.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Time {
    /// Accumulated scaled time, in seconds.
    pub elapsed: f32,
    pub dt: f32,
    /// `1 / dt`, or 0 when `dt` is 0.
    pub inv_dt: f32,
}

pub const DEFAULT_FIXED_RATE: f32 = 60.0;

/// Converts real frame deltas into application time.
#[derive(Debug, Clone)]
pub struct TimeControl {
    elapsed: f32,
    pub scale: f32,
    pub freeze: bool,
    /// When set, every update advances by `scale / fixed_rate` regardless of
    /// the real frame delta.
    pub fix_rate: bool,
    pub fixed_rate: f32,
}

impl Default for TimeControl {
    fn default() -> Self {
        Self {
            elapsed: 0.0,
            scale: 1.0,
            freeze: false,
            fix_rate: false,
            fixed_rate: DEFAULT_FIXED_RATE,
        }
    }
}

impl TimeControl {
    pub fn update(&mut self, real_dt: f32) -> Time {
        let dt = match (self.freeze, self.fix_rate) {
            (true, _) => 0.0,
            (false, true) => self.scale / self.fixed_rate,
            (false, false) => real_dt * self.scale,
        };
        self.elapsed += dt;

        Time {
            elapsed: self.elapsed,
            dt,
            inv_dt: if dt == 0.0 { 0.0 } else { 1.0 / dt },
        }
    }

    /// Restores scale and fixed rate defaults; elapsed time is kept.
    pub fn reset(&mut self) {
        self.scale = 1.0;
        self.fixed_rate = DEFAULT_FIXED_RATE;
    }
}
