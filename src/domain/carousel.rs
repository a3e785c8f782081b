use std::{future::Future, time::Duration};

use serde::Serialize;
use tokio::sync::watch;

use crate::{
    domain::timer::{Timeline, TimerHandle},
    settings::AppConfig,
};

#[derive(Debug, Clone, PartialEq)]
pub struct CarouselConfig {
    pub autoplay: Duration,
    pub transition: Duration,
    /// Delay before the transition is re-enabled after a snap back (two frames).
    pub rearm: Duration,
    /// Width of one slide relative to the viewport.
    pub item_width_percent: f64,
}

impl Default for CarouselConfig {
    fn default() -> Self {
        CarouselConfig {
            autoplay: Duration::from_millis(2000),
            transition: Duration::from_millis(700),
            rearm: Duration::from_millis(32),
            item_width_percent: 40.0,
        }
    }
}

impl From<&AppConfig> for CarouselConfig {
    fn from(config: &AppConfig) -> Self {
        CarouselConfig {
            autoplay: config.slider_autoplay(),
            transition: config.slider_transition(),
            ..CarouselConfig::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CarouselPhase {
    /// Moving forward through the doubled sequence with the transition on.
    Advancing,
    /// Sitting on the first clone, waiting for the transition to end.
    SnappingBack,
    /// Jumped back to the start with the transition off, or nothing to show.
    Idle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CarouselEvent {
    Autoplay,
    SnapBack,
    Rearm,
}

/// Everything a client needs to paint the slider track.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CarouselFrame<T> {
    pub slides: Vec<T>,
    pub index: usize,
    pub phase: CarouselPhase,
    pub offset_percent: f64,
    pub transition: String,
    pub item_width_percent: f64,
    pub track_width_percent: f64,
}

/// Infinite-looping slider over `items ++ items`.
///
/// The index walks forward on every autoplay tick. Reaching the first clone
/// (index `N`) starts a snap back: once the transition has played, the index
/// jumps to 0 with the transition disabled, and a short rearm timer turns it
/// back on so the next move animates.
#[derive(Debug)]
pub struct Carousel<T> {
    items: Vec<T>,
    index: usize,
    transitioning: bool,
    phase: CarouselPhase,
    config: CarouselConfig,
    timeline: Timeline<CarouselEvent>,
    autoplay: Option<TimerHandle>,
    snap_back: Option<TimerHandle>,
    rearm: Option<TimerHandle>,
    torn_down: bool,
}

impl<T> Carousel<T> {
    pub fn new(items: Vec<T>, config: CarouselConfig) -> Self {
        let mut carousel = Carousel {
            items: Vec::new(),
            index: 0,
            transitioning: true,
            phase: CarouselPhase::Idle,
            config,
            timeline: Timeline::new(),
            autoplay: None,
            snap_back: None,
            rearm: None,
            torn_down: false,
        };
        carousel.set_items(items);
        carousel
    }

    /// Replaces the slides and restarts from the first one.
    pub fn set_items(&mut self, items: Vec<T>) {
        self.cancel(CarouselEvent::SnapBack);
        self.cancel(CarouselEvent::Rearm);
        self.items = items;
        self.index = 0;
        self.transitioning = true;
        self.phase = if self.items.is_empty() { CarouselPhase::Idle } else { CarouselPhase::Advancing };
        self.arm_autoplay();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_transitioning(&self) -> bool {
        self.transitioning
    }

    pub fn phase(&self) -> CarouselPhase {
        self.phase
    }

    pub fn pending_timers(&self) -> usize {
        self.timeline.len()
    }

    pub fn until_next_timer(&self) -> Option<Duration> {
        self.timeline.until_next()
    }

    /// Offset of the track, in percent of its own width.
    pub fn offset_percent(&self) -> f64 {
        if self.items.is_empty() {
            return 0.0;
        }
        self.index as f64 * (100.0 / (2 * self.items.len()) as f64)
    }

    pub fn transition_css(&self) -> String {
        if self.transitioning {
            format!("transform {}ms ease-in-out", self.config.transition.as_millis())
        } else {
            "none".to_string()
        }
    }

    /// Runs every timer that falls due within `elapsed`.
    pub fn advance(&mut self, elapsed: Duration) {
        if self.torn_down {
            return;
        }
        let until = self.timeline.now() + elapsed;
        while let Some((_, event)) = self.timeline.pop_due(until) {
            self.handle(event);
        }
        self.timeline.settle(until);
    }

    /// Cancels every pending timer; the carousel stays frozen afterwards.
    pub fn teardown(&mut self) {
        self.timeline.clear();
        self.autoplay = None;
        self.snap_back = None;
        self.rearm = None;
        self.torn_down = true;
        self.phase = CarouselPhase::Idle;
    }

    fn handle(&mut self, event: CarouselEvent) {
        match event {
            CarouselEvent::Autoplay => {
                self.autoplay = None;
                self.tick();
            }
            CarouselEvent::SnapBack => {
                self.snap_back = None;
                self.transitioning = false;
                self.index = 0;
                self.phase = CarouselPhase::Idle;
                self.rearm = Some(self.timeline.schedule(self.config.rearm, CarouselEvent::Rearm));
                self.arm_autoplay();
            }
            CarouselEvent::Rearm => {
                self.rearm = None;
                self.transitioning = true;
                self.phase = CarouselPhase::Advancing;
            }
        }
    }

    fn tick(&mut self) {
        if self.items.is_empty() {
            return;
        }
        // The pending snap back owns the next index change and re-arms autoplay.
        if self.phase == CarouselPhase::SnappingBack {
            tracing::trace!("Autoplay tick dropped while snapping back");
            return;
        }

        self.cancel(CarouselEvent::Rearm);
        self.transitioning = true;
        self.phase = CarouselPhase::Advancing;
        self.index += 1;

        if self.index >= self.items.len() {
            self.index = self.items.len();
            self.phase = CarouselPhase::SnappingBack;
            self.snap_back = Some(self.timeline.schedule(self.config.transition, CarouselEvent::SnapBack));
        }

        self.arm_autoplay();
    }

    /// Every index change restarts the dwell interval.
    fn arm_autoplay(&mut self) {
        self.cancel(CarouselEvent::Autoplay);
        if !self.items.is_empty() && !self.torn_down {
            self.autoplay = Some(self.timeline.schedule(self.config.autoplay, CarouselEvent::Autoplay));
        }
    }

    fn cancel(&mut self, event: CarouselEvent) {
        let slot = match event {
            CarouselEvent::Autoplay => &mut self.autoplay,
            CarouselEvent::SnapBack => &mut self.snap_back,
            CarouselEvent::Rearm => &mut self.rearm,
        };
        if let Some(handle) = slot.take() {
            self.timeline.cancel(handle);
        }
    }
}

impl<T: Clone> Carousel<T> {
    pub fn frame(&self) -> Option<CarouselFrame<T>> {
        if self.items.is_empty() {
            return None;
        }

        let doubled = 2 * self.items.len();
        Some(CarouselFrame {
            slides: self.items.iter().chain(self.items.iter()).cloned().collect(),
            index: self.index,
            phase: self.phase,
            offset_percent: self.offset_percent(),
            transition: self.transition_css(),
            item_width_percent: 100.0 / doubled as f64,
            track_width_percent: doubled as f64 * self.config.item_width_percent,
        })
    }
}

pub type FrameSender<T> = watch::Sender<Option<CarouselFrame<T>>>;

/// Runs `carousel` on the tokio clock, publishing a frame after every change.
///
/// Returns the torn-down carousel once `shutdown` resolves.
pub async fn drive_carousel<T, F>(mut carousel: Carousel<T>, frames: FrameSender<T>, shutdown: F) -> Carousel<T>
where
    T: Clone + Send + Sync + 'static,
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    frames.send_replace(carousel.frame());

    loop {
        let Some(wait) = carousel.until_next_timer() else {
            shutdown.as_mut().await;
            break;
        };

        tokio::select! {
            _ = shutdown.as_mut() => break,
            _ = tokio::time::sleep(wait) => {
                carousel.advance(wait);
                frames.send_replace(carousel.frame());
            }
        }
    }

    carousel.teardown();
    tracing::debug!("Carousel driver stopped");
    carousel
}
