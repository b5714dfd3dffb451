// src/render_loop.rs

//! The event-driven redraw loop.
//!
//! One event per iteration, blocking in `Driver::next_event`. The loop has two
//! states and a single way out of `Running` for each variant:
//! - legacy: any key press, or the close-protocol message;
//! - modern: the close-protocol message only.

use crate::backends::{Atom, Driver, Event, WindowId};
use crate::config::RenderConfig;
use crate::strategy::Variant;
use log::{debug, info, trace, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Terminated,
}

#[derive(Debug)]
pub struct Dispatcher {
    variant: Variant,
    window: WindowId,
    close_token: Option<Atom>,
    render: RenderConfig,
    state: LoopState,
    frames: u64,
}

impl Dispatcher {
    pub fn new(
        variant: Variant,
        window: WindowId,
        close_token: Option<Atom>,
        render: RenderConfig,
    ) -> Self {
        Self {
            variant,
            window,
            close_token,
            render,
            state: LoopState::Running,
            frames: 0,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Buffer swaps issued so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Handles one event and returns the resulting state.
    ///
    /// Once `Terminated`, further calls do nothing.
    pub fn dispatch<B: Driver>(&mut self, driver: &mut B, event: Event) -> LoopState {
        if self.state == LoopState::Terminated {
            return self.state;
        }

        match event {
            Event::Expose { .. } => self.on_expose(driver),
            Event::ClientMessage { data0 } => {
                if self.close_token.is_some_and(|token| token.0 == data0) {
                    info!("WM_DELETE_WINDOW received");
                    self.state = LoopState::Terminated;
                } else {
                    trace!("Ignoring client message with data[0] = {}", data0);
                }
            }
            Event::KeyPress { keycode } => match self.variant {
                Variant::Legacy => {
                    info!("Key press (keycode {}) closes the window", keycode);
                    self.state = LoopState::Terminated;
                }
                Variant::Modern => trace!("Key press (keycode {}) ignored", keycode),
            },
            Event::ConfigureNotify { width, height } => {
                trace!("Window reconfigured to {}x{}", width, height);
            }
            Event::Other(kind) => trace!("Ignoring event type {}", kind),
        }

        // The modern loop presents once per event, whatever the event was.
        if self.variant == Variant::Modern {
            driver.clear(self.render.clear_color);
            self.present(driver);
        }
        self.state
    }

    /// Blocks on events until the loop terminates. Returns the frame count.
    pub fn run<B: Driver>(&mut self, driver: &mut B) -> u64 {
        info!("Entering {:?} render loop", self.variant);
        while self.state == LoopState::Running {
            let event = driver.next_event();
            self.dispatch(driver, event);
        }
        info!("Render loop terminated after {} frame(s)", self.frames);
        self.frames
    }

    fn on_expose<B: Driver>(&mut self, driver: &mut B) {
        match driver.window_size(self.window) {
            Some((width, height)) => {
                debug!("Expose: viewport {}x{}", width, height);
                driver.viewport(width, height);
            }
            None => warn!("Expose: window size unavailable; keeping previous viewport"),
        }
        if self.variant == Variant::Legacy {
            driver.clear(self.render.clear_color);
            driver.draw_triangle(self.render.triangle_color);
            self.present(driver);
        }
    }

    fn present<B: Driver>(&mut self, driver: &mut B) {
        driver.swap_buffers(self.window);
        self.frames += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::mock::{Call, MockDriver, MOCK_DELETE_ATOM, MOCK_WINDOW};
    use test_log::test;

    fn dispatcher(variant: Variant) -> Dispatcher {
        Dispatcher::new(
            variant,
            MOCK_WINDOW,
            Some(MOCK_DELETE_ATOM),
            RenderConfig::default(),
        )
    }

    fn viewports(driver: &MockDriver) -> usize {
        driver
            .calls
            .iter()
            .filter(|c| matches!(c, Call::Viewport(..)))
            .count()
    }

    #[test]
    fn modern_expose_then_close_message() {
        let mut driver = MockDriver::new().with_events([
            Event::Expose { count: 0 },
            Event::ClientMessage {
                data0: MOCK_DELETE_ATOM.0,
            },
            Event::Expose { count: 0 },
        ]);
        let mut loop_ = dispatcher(Variant::Modern);
        let frames = loop_.run(&mut driver);

        assert_eq!(loop_.state(), LoopState::Terminated);
        assert_eq!(viewports(&driver), 1);
        assert_eq!(driver.calls.iter().find(|c| matches!(c, Call::Viewport(..))), Some(&Call::Viewport(600, 600)));
        assert_eq!(driver.count(&Call::NextEvent), 2);
        assert_eq!(driver.events.len(), 1);
        // Clear and swap after every dispatched event.
        assert_eq!(frames, 2);
        assert_eq!(driver.count(&Call::Clear), 2);
        assert_eq!(driver.count(&Call::DrawTriangle), 0);
    }

    #[test]
    fn legacy_expose_then_key_press() {
        let mut driver = MockDriver::new().with_events([
            Event::Expose { count: 0 },
            Event::KeyPress { keycode: 38 },
        ]);
        let mut loop_ = dispatcher(Variant::Legacy);
        let frames = loop_.run(&mut driver);

        assert_eq!(loop_.state(), LoopState::Terminated);
        assert_eq!(frames, 1);
        assert_eq!(driver.count(&Call::DrawTriangle), 1);
        assert_eq!(driver.count(&Call::SwapBuffers(MOCK_WINDOW)), 1);
        let expose_calls: Vec<_> = driver
            .calls
            .iter()
            .filter(|c| !matches!(c, Call::NextEvent))
            .cloned()
            .collect();
        assert_eq!(
            expose_calls,
            vec![
                Call::WindowSize(MOCK_WINDOW),
                Call::Viewport(600, 600),
                Call::Clear,
                Call::DrawTriangle,
                Call::SwapBuffers(MOCK_WINDOW),
            ]
        );
    }

    #[test]
    fn modern_ignores_key_press_and_foreign_client_messages() {
        let mut driver = MockDriver::new();
        let mut loop_ = dispatcher(Variant::Modern);
        assert_eq!(
            loop_.dispatch(&mut driver, Event::KeyPress { keycode: 9 }),
            LoopState::Running
        );
        assert_eq!(
            loop_.dispatch(&mut driver, Event::ClientMessage { data0: 999 }),
            LoopState::Running
        );
        assert_eq!(
            loop_.dispatch(&mut driver, Event::ConfigureNotify { width: 800, height: 600 }),
            LoopState::Running
        );
        assert_eq!(viewports(&driver), 0);
        assert_eq!(loop_.frames(), 3);
    }

    #[test]
    fn legacy_also_honours_close_message() {
        let mut driver = MockDriver::new();
        let mut loop_ = dispatcher(Variant::Legacy);
        assert_eq!(
            loop_.dispatch(&mut driver, Event::ClientMessage { data0: MOCK_DELETE_ATOM.0 }),
            LoopState::Terminated
        );
        assert!(driver.calls.is_empty());
    }

    #[test]
    fn without_close_token_no_message_terminates() {
        let mut driver = MockDriver::new();
        let mut loop_ = Dispatcher::new(Variant::Modern, MOCK_WINDOW, None, RenderConfig::default());
        assert_eq!(
            loop_.dispatch(&mut driver, Event::ClientMessage { data0: MOCK_DELETE_ATOM.0 }),
            LoopState::Running
        );
    }

    #[test]
    fn terminated_is_absorbing() {
        let mut driver = MockDriver::new();
        let mut loop_ = dispatcher(Variant::Legacy);
        loop_.dispatch(&mut driver, Event::KeyPress { keycode: 9 });
        driver.calls.clear();
        assert_eq!(
            loop_.dispatch(&mut driver, Event::Expose { count: 0 }),
            LoopState::Terminated
        );
        assert!(driver.calls.is_empty());
    }

    #[test]
    fn unknown_events_are_ignored_in_legacy() {
        let mut driver = MockDriver::new();
        let mut loop_ = dispatcher(Variant::Legacy);
        assert_eq!(loop_.dispatch(&mut driver, Event::Other(6)), LoopState::Running);
        assert!(driver.calls.is_empty());
    }
}
