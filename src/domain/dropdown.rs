use std::time::Duration;

use serde::Serialize;

use crate::{
    constants::OUTPUT_ROUTE,
    domain::timer::{Timeline, TimerHandle},
};

pub const MOBILE_BREAKPOINT_PX: u32 = 768;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Viewport {
    Mobile,
    Desktop,
}

impl Viewport {
    pub fn from_width(width_px: u32) -> Self {
        if width_px < MOBILE_BREAKPOINT_PX {
            Viewport::Mobile
        } else {
            Viewport::Desktop
        }
    }
}

/// Ways a press-and-hold gesture ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Release {
    MouseUp,
    MouseLeave,
    TouchEnd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ScrollStep;

#[derive(Debug, Clone, PartialEq)]
pub struct ScrollConfig {
    pub step_px: u32,
    pub interval: Duration,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        ScrollConfig {
            step_px: 5,
            interval: Duration::from_millis(16),
        }
    }
}

/// Route that lists one member's works.
pub fn member_route(member: &str) -> String {
    format!("{OUTPUT_ROUTE}?author={}", urlencoding::encode(member))
}

/// Member dropdown of the navigation bar.
///
/// While the desktop dropdown is open, holding the scroll button moves the
/// list down by `step_px` every `interval` until the press is released or
/// the dropdown closes.
#[derive(Debug)]
pub struct NavDropdown {
    open: bool,
    mobile_menu_open: bool,
    viewport: Viewport,
    scroll_top: u32,
    scroll_extent: u32,
    config: ScrollConfig,
    timeline: Timeline<ScrollStep>,
    repeat: Option<TimerHandle>,
}

impl NavDropdown {
    /// `scroll_extent` is how far the member list can scroll (content minus visible height).
    pub fn new(viewport: Viewport, scroll_extent: u32) -> Self {
        Self::with_config(viewport, scroll_extent, ScrollConfig::default())
    }

    pub fn with_config(viewport: Viewport, scroll_extent: u32, config: ScrollConfig) -> Self {
        NavDropdown {
            open: false,
            mobile_menu_open: false,
            viewport,
            scroll_top: 0,
            scroll_extent,
            config,
            timeline: Timeline::new(),
            repeat: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn is_mobile_menu_open(&self) -> bool {
        self.mobile_menu_open
    }

    pub fn is_scrolling(&self) -> bool {
        self.repeat.is_some()
    }

    pub fn scroll_top(&self) -> u32 {
        self.scroll_top
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn toggle(&mut self) {
        self.open = !self.open;
        if !self.open {
            self.stop_scrolling();
        }
    }

    pub fn toggle_mobile_menu(&mut self) {
        self.mobile_menu_open = !self.mobile_menu_open;
    }

    /// Starts the hold-to-scroll repeat. Returns false when nothing started:
    /// the dropdown is closed, the viewport is mobile, or a repeat is already running.
    pub fn press_scroll(&mut self) -> bool {
        if !self.open || self.viewport != Viewport::Desktop || self.repeat.is_some() {
            return false;
        }
        self.repeat = Some(self.timeline.schedule(self.config.interval, ScrollStep));
        true
    }

    pub fn release(&mut self, release: Release) {
        if self.repeat.is_some() {
            tracing::trace!(?release, "Scroll repeat released");
        }
        self.stop_scrolling();
    }

    pub fn advance(&mut self, elapsed: Duration) {
        let until = self.timeline.now() + elapsed;
        while let Some((_, ScrollStep)) = self.timeline.pop_due(until) {
            self.scroll_top = (self.scroll_top + self.config.step_px).min(self.scroll_extent);
            self.repeat = Some(self.timeline.schedule(self.config.interval, ScrollStep));
        }
        self.timeline.settle(until);
    }

    /// Picks a member: closes every menu and returns the route to navigate to.
    pub fn select_member(&mut self, member: &str) -> String {
        self.close_all();
        member_route(member)
    }

    pub fn navigate_away(&mut self) {
        self.close_all();
    }

    pub fn set_viewport_width(&mut self, width_px: u32) {
        let viewport = Viewport::from_width(width_px);
        if viewport != self.viewport {
            self.stop_scrolling();
            self.viewport = viewport;
        }
    }

    fn close_all(&mut self) {
        self.open = false;
        self.mobile_menu_open = false;
        self.stop_scrolling();
    }

    fn stop_scrolling(&mut self) {
        if let Some(handle) = self.repeat.take() {
            self.timeline.cancel(handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    fn open_desktop(extent: u32) -> NavDropdown {
        let mut dropdown = NavDropdown::new(Viewport::Desktop, extent);
        dropdown.toggle();
        dropdown
    }

    #[test]
    fn holding_scrolls_five_pixels_per_interval() {
        let mut dropdown = open_desktop(400);
        assert!(dropdown.press_scroll());

        dropdown.advance(ms(16 * 10));
        assert_eq!(dropdown.scroll_top(), 50);
    }

    #[test]
    fn second_press_does_not_start_another_repeat() {
        let mut dropdown = open_desktop(400);
        assert!(dropdown.press_scroll());
        assert!(!dropdown.press_scroll());

        dropdown.advance(ms(16));
        assert_eq!(dropdown.scroll_top(), 5);
    }

    #[test]
    fn every_release_kind_stops_the_repeat() {
        for release in [Release::MouseUp, Release::MouseLeave, Release::TouchEnd] {
            let mut dropdown = open_desktop(400);
            dropdown.press_scroll();
            dropdown.advance(ms(32));
            dropdown.release(release);
            dropdown.advance(ms(1000));
            assert_eq!(dropdown.scroll_top(), 10);
            assert!(!dropdown.is_scrolling());
        }
    }

    #[test]
    fn scroll_is_clamped_to_the_extent() {
        let mut dropdown = open_desktop(12);
        dropdown.press_scroll();
        dropdown.advance(ms(16 * 20));
        assert_eq!(dropdown.scroll_top(), 12);
    }

    #[test]
    fn closed_or_mobile_dropdowns_ignore_presses() {
        let mut closed = NavDropdown::new(Viewport::Desktop, 400);
        assert!(!closed.press_scroll());

        let mut mobile = NavDropdown::new(Viewport::Mobile, 400);
        mobile.toggle();
        assert!(!mobile.press_scroll());
    }

    #[test]
    fn selecting_a_member_closes_menus_and_stops_scrolling() {
        let mut dropdown = open_desktop(400);
        dropdown.toggle_mobile_menu();
        dropdown.press_scroll();

        let route = dropdown.select_member("김소연");

        assert_eq!(route, "/output?author=%EA%B9%80%EC%86%8C%EC%97%B0");
        assert!(!dropdown.is_open());
        assert!(!dropdown.is_mobile_menu_open());
        assert!(!dropdown.is_scrolling());
    }

    #[test]
    fn closing_via_toggle_or_navigation_stops_scrolling() {
        let mut dropdown = open_desktop(400);
        dropdown.press_scroll();
        dropdown.toggle();
        assert!(!dropdown.is_scrolling());

        let mut dropdown = open_desktop(400);
        dropdown.press_scroll();
        dropdown.navigate_away();
        assert!(!dropdown.is_open());
        assert!(!dropdown.is_scrolling());
    }

    #[test]
    fn crossing_the_breakpoint_switches_rendering() {
        let mut dropdown = open_desktop(400);
        dropdown.press_scroll();

        dropdown.set_viewport_width(600);
        assert_eq!(dropdown.viewport(), Viewport::Mobile);
        assert!(!dropdown.is_scrolling());

        dropdown.set_viewport_width(1024);
        assert_eq!(dropdown.viewport(), Viewport::Desktop);
    }
}
