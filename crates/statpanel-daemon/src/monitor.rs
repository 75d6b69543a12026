//! The control loop.
//!
//! One iteration polls the touch panel, applies navigation or sleep, renders
//! the current screen and pushes it to the display. The loop is single
//! threaded and owns both buses.

use crate::app::{ApplicationState, Transition};
use crate::clock::Clock;
use crate::rendering::ScreenRenderer;
use crate::screenshot;
use crate::sources::DataFetch;
use statpanel_hw::{CoordinateMapper, DisplaySink, Framebuffer, TouchSource, BACKLIGHT_MAX};
use std::fmt::Display;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

const ERROR_LOG_INTERVAL: Duration = Duration::from_secs(60);

/// Operator requests delivered between iterations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Screenshot,
}

/// Lights the panel, then blanks it.
///
/// Failures are logged only: the first loop iteration pushes a full frame
/// anyway, and the backlight must not be left off by a failed clear.
pub fn power_on<D: DisplaySink>(display: &mut D) {
    if let Err(e) = display.set_backlight(BACKLIGHT_MAX) {
        warn!("Failed to turn on backlight: {}", e);
    }
    let (width, height) = display.dimensions();
    if let Err(e) = display.push_frame(&Framebuffer::new(width, height)) {
        warn!("Failed to clear display: {}", e);
    }
}

/// Loop timing and output locations.
#[derive(Debug, Clone)]
pub struct LoopSettings {
    pub poll_interval: Duration,
    pub debounce: Duration,
    pub screenshots: PathBuf,
}

/// Logs the first error, then at most one summary per interval.
struct ErrorThrottle {
    what: &'static str,
    suppressed: u32,
    last_log: Option<Instant>,
}

impl ErrorThrottle {
    fn new(what: &'static str) -> Self {
        Self {
            what,
            suppressed: 0,
            last_log: None,
        }
    }

    fn record(&mut self, now: Instant, err: &dyn Display) {
        let due = self
            .last_log
            .map_or(true, |t| now.saturating_duration_since(t) >= ERROR_LOG_INTERVAL);
        if !due {
            self.suppressed += 1;
            return;
        }
        if self.suppressed > 0 {
            warn!(
                "{} error (repeated {} times): {}",
                self.what,
                self.suppressed + 1,
                err
            );
        } else {
            warn!("{} error: {}", self.what, err);
        }
        self.last_log = Some(now);
        self.suppressed = 0;
    }

    fn clear(&mut self) {
        if self.last_log.take().is_some() {
            info!("{} recovered", self.what);
        }
        self.suppressed = 0;
    }
}

pub struct Monitor<D, T, C> {
    display: D,
    touch: T,
    clock: C,
    mapper: CoordinateMapper,
    renderer: ScreenRenderer,
    data: Box<dyn DataFetch>,
    state: ApplicationState,
    settings: LoopSettings,
    frame_errors: ErrorThrottle,
}

impl<D, T, C> Monitor<D, T, C>
where
    D: DisplaySink,
    T: TouchSource,
    C: Clock,
{
    pub fn new(
        display: D,
        touch: T,
        clock: C,
        mapper: CoordinateMapper,
        renderer: ScreenRenderer,
        data: Box<dyn DataFetch>,
        settings: LoopSettings,
    ) -> Self {
        let state = ApplicationState::new(
            renderer.screen_count(),
            renderer.layout().inactivity_timeout(),
            clock.now(),
        );
        Self {
            display,
            touch,
            clock,
            mapper,
            renderer,
            data,
            state,
            settings,
            frame_errors: ErrorThrottle::new("Display"),
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> &ApplicationState {
        &self.state
    }

    /// Runs one iteration and returns how long to wait before the next.
    pub fn step(&mut self) -> Duration {
        let now = self.clock.now();
        let sample = self.touch.poll();
        let mut delay = self.settings.poll_interval;

        if sample.is_touch() {
            let zone = self.mapper.zone(sample.x, sample.y);
            match self.state.on_touch(zone, now) {
                Transition::Woke => {
                    info!("Waking display");
                    self.set_backlight(BACKLIGHT_MAX);
                    return self.settings.debounce;
                }
                Transition::Navigated { from, to } => {
                    debug!("Screen {} -> {}", from, to);
                    delay += self.settings.debounce;
                }
                _ => {}
            }
        }

        if self.state.is_asleep() {
            return delay;
        }

        if !sample.is_touch() && self.state.on_idle(now) == Transition::FellAsleep {
            info!("No activity, sleeping display");
            self.set_backlight(0);
            return delay;
        }

        self.render_and_push();
        delay
    }

    /// Applies an operator command. Ignored while asleep.
    pub fn handle_command(&mut self, command: Command) -> Option<PathBuf> {
        match command {
            Command::Screenshot => {
                if self.state.is_asleep() {
                    info!("Display asleep, screenshot skipped");
                    return None;
                }
                let frame = self
                    .renderer
                    .render(self.state.screen_index(), self.data.as_ref());
                let name = screenshot::timestamped_name(chrono::Local::now());
                match screenshot::save(&frame, &self.settings.screenshots, &name) {
                    Ok(path) => {
                        info!("Screenshot saved to {}", path.display());
                        Some(path)
                    }
                    Err(e) => {
                        warn!("Error saving screenshot: {:#}", e);
                        None
                    }
                }
            }
        }
    }

    /// Leaves the panel lit.
    pub fn shutdown(&mut self) {
        self.set_backlight(BACKLIGHT_MAX);
    }

    /// Loops until `stop` is set, then restores the backlight.
    pub async fn run(&mut self, stop: &AtomicBool, commands: &mut mpsc::UnboundedReceiver<Command>) {
        while !stop.load(Ordering::SeqCst) {
            while let Ok(command) = commands.try_recv() {
                self.handle_command(command);
            }
            let delay = self.step();
            tokio::time::sleep(delay).await;
        }
        info!("Shutting down");
        self.shutdown();
    }

    fn render_and_push(&mut self) {
        let frame = self
            .renderer
            .render(self.state.screen_index(), self.data.as_ref());
        match self.display.push_frame(&frame) {
            Ok(()) => self.frame_errors.clear(),
            Err(e) => self.frame_errors.record(self.clock.now(), &e),
        }
    }

    fn set_backlight(&mut self, level: u8) {
        if let Err(e) = self.display.set_backlight(level) {
            warn!("Failed to set backlight to {}: {}", level, e);
        }
    }
}
