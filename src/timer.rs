//! Performance measurement tools.

use std::{
    fmt::{self, Arguments},
    mem,
    sync::Mutex,
    time::{Duration, Instant},
};

use itertools::Itertools;

/// A timer that can measure and average the time an operation takes.
///
/// Collected timings are averaged and reset when the timer is displayed using `{}`
/// ([`std::fmt::Display`]).
pub struct Timer {
    name: &'static str,
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    total: Duration,
    /// The number of time measurements that contributed to `total`.
    count: u32,
}

impl Timer {
    /// Creates a new timer.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            state: Mutex::new(State::default()),
        }
    }

    /// Returns the name passed to [`Timer::new`].
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Invokes a closure, measuring and recording the time it takes.
    pub fn time<T>(&self, timee: impl FnOnce() -> T) -> T {
        let _guard = self.start();
        timee()
    }

    /// Starts timing an operation using a drop guard.
    ///
    /// When the returned [`TimerGuard`] is dropped, the time between the call to `start` and the
    /// drop is measured and recorded.
    pub fn start(&self) -> TimerGuard<'_> {
        TimerGuard {
            start: Instant::now(),
            timer: self,
        }
    }

    /// Returns the number of measurements recorded since the last reset.
    pub fn count(&self) -> u32 {
        self.lock().count
    }

    fn stop(&self, start: Instant) {
        let duration = start.elapsed();
        let mut state = self.lock();
        state.total += duration;
        state.count += 1;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }
}

/// Displays the average recorded time and resets it.
impl fmt::Display for Timer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = mem::take(&mut *self.lock());
        let avg_ms = if state.count == 0 {
            0.0
        } else {
            state.total.as_secs_f32() * 1000.0 / state.count as f32
        };

        write!(f, "{}: {}x{avg_ms:.01}ms", self.name, state.count)
    }
}

/// Cloning a timer resets its collected timings.
impl Clone for Timer {
    fn clone(&self) -> Self {
        Self::new(self.name)
    }
}

/// Guard returned by [`Timer::start`]. Stops timing the operation when dropped.
pub struct TimerGuard<'a> {
    start: Instant,
    timer: &'a Timer,
}

impl Drop for TimerGuard<'_> {
    fn drop(&mut self) {
        self.timer.stop(self.start);
    }
}

/// Logs frames per second with optional extra data.
pub struct FpsCounter {
    name: String,
    frames: u32,
    start: Instant,
}

impl FpsCounter {
    pub fn new<N: Into<String>>(name: N) -> Self {
        Self {
            name: name.into(),
            frames: 0,
            start: Instant::now(),
        }
    }

    /// Advances the frame counter by 1 and logs FPS if one second has passed.
    pub fn tick(&mut self) {
        self.tick_impl(format_args!(""));
    }

    /// Advances the frame counter by 1 and logs FPS and `extra` data if one second has passed.
    ///
    /// `extra` is typically the list of [`Timer`]s of the processing stages, which resets them.
    pub fn tick_with<D: fmt::Display, I: IntoIterator<Item = D>>(&mut self, extra: I) {
        if !self.elapsed() {
            self.frames += 1;
            return;
        }

        let extra = extra.into_iter().join(", ");
        if extra.is_empty() {
            self.tick_impl(format_args!(""));
        } else {
            self.tick_impl(format_args!(" ({extra})"));
        }
    }

    fn elapsed(&self) -> bool {
        self.start.elapsed() > Duration::from_secs(1)
    }

    fn tick_impl(&mut self, args: Arguments<'_>) {
        self.frames += 1;
        if self.elapsed() {
            log::debug!("{}: {} FPS{}", self.name, self.frames, args);

            self.frames = 0;
            self.start = Instant::now();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timer_resets_on_display() {
        let timer = Timer::new("stage");
        assert_eq!(timer.time(|| 41 + 1), 42);
        timer.time(|| {});
        assert_eq!(timer.count(), 2);

        let shown = timer.to_string();
        assert!(shown.starts_with("stage: 2x"), "{shown}");
        assert_eq!(timer.count(), 0);
        assert_eq!(timer.to_string(), "stage: 0x0.0ms");
    }

    #[test]
    fn clone_resets() {
        let timer = Timer::new("stage");
        timer.time(|| {});
        assert_eq!(timer.clone().count(), 0);
        assert_eq!(timer.clone().name(), "stage");
    }
}
