//! Button event detection and listener dispatch.
//!
//! The physical I/O layer owns debouncing and delivers raw per-button
//! pressed/released levels; this module turns those levels into short-press
//! and long-press events and routes them to the handlers registered at
//! startup.
//!
//! Detection is split between two execution contexts, matching the timing
//! sources that drive it:
//!
//! - the fast housekeeping tick ([`PressDetector::sample`]) counts how long
//!   each button has been held and fires the long-press event exactly once
//!   per hold when the threshold is crossed, while the button is still held;
//! - the foreground loop ([`PressDetector::poll_releases`]) fires the
//!   short-press event when a button is released before the threshold was
//!   crossed. A hold that already fired its long-press event produces no
//!   short-press event on release.

use heapless::Vec;

/// Logical buttons of the device.
///
/// `SetAlarm` and `SetClock` may well share a physical button; the I/O
/// layer owns that mapping and reports levels per logical button.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Button {
    /// Enter/advance alarm setting
    SetAlarm = 0,
    /// Enter/advance clock setting
    SetClock = 1,
    /// Increment the selected field
    Up = 2,
    /// Decrement the selected field
    Down = 3,
    /// Toggle 12/24-hour representation
    Mode = 4,
    /// Snooze a ringing alarm
    Snooze = 5,
    /// Silence a ringing alarm
    StopAlarm = 6,
}

pub(crate) const BUTTON_COUNT: usize = 7;

impl Button {
    pub(crate) const ALL: [Button; BUTTON_COUNT] = [
        Button::SetAlarm,
        Button::SetClock,
        Button::Up,
        Button::Down,
        Button::Mode,
        Button::Snooze,
        Button::StopAlarm,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

/// Raw pressed/released levels for all buttons, sampled by the I/O layer.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ButtonLevels {
    pressed: [bool; BUTTON_COUNT],
}

impl ButtonLevels {
    /// No button pressed.
    pub fn released() -> Self {
        Self::default()
    }

    /// Returns a copy with `button` marked as pressed.
    #[must_use]
    pub fn with_pressed(mut self, button: Button) -> Self {
        self.pressed[button.index()] = true;
        self
    }

    /// Marks `button` as pressed or released.
    pub fn set_pressed(&mut self, button: Button, pressed: bool) {
        self.pressed[button.index()] = pressed;
    }

    pub fn is_pressed(&self, button: Button) -> bool {
        self.pressed[button.index()]
    }
}

/// Per-button hold tracking for short/long press classification.
#[derive(Debug)]
pub(crate) struct PressDetector {
    long_press_ticks: u16,
    hold_ticks: [u16; BUTTON_COUNT],
    long_fired: [bool; BUTTON_COUNT],
    seen_pressed: [bool; BUTTON_COUNT],
}

impl PressDetector {
    pub(crate) fn new(long_press_ticks: u16) -> Self {
        Self {
            long_press_ticks,
            hold_ticks: [0; BUTTON_COUNT],
            long_fired: [false; BUTTON_COUNT],
            seen_pressed: [false; BUTTON_COUNT],
        }
    }

    /// Advances the hold counters by one fast tick and returns the buttons
    /// whose long-press threshold was crossed on this tick.
    pub(crate) fn sample(&mut self, levels: &ButtonLevels) -> Vec<Button, BUTTON_COUNT> {
        let mut fired = Vec::new();
        for button in Button::ALL {
            let index = button.index();
            if levels.is_pressed(button) {
                self.hold_ticks[index] = self.hold_ticks[index].saturating_add(1);
                if self.hold_ticks[index] >= self.long_press_ticks && !self.long_fired[index] {
                    self.long_fired[index] = true;
                    // Capacity equals the button count, the push cannot fail
                    fired.push(button).ok();
                }
            } else {
                self.hold_ticks[index] = 0;
            }
        }
        fired
    }

    /// Observes the current levels from the foreground loop and returns the
    /// buttons released since the previous call without having crossed the
    /// long-press threshold.
    pub(crate) fn poll_releases(&mut self, levels: &ButtonLevels) -> Vec<Button, BUTTON_COUNT> {
        let mut fired = Vec::new();
        for button in Button::ALL {
            let index = button.index();
            let pressed = levels.is_pressed(button);
            if self.seen_pressed[index] && !pressed {
                if self.long_fired[index] {
                    // The hold already produced its long-press event; the
                    // release is consumed here so the next hold starts fresh.
                    self.long_fired[index] = false;
                } else {
                    fired.push(button).ok();
                }
            }
            self.seen_pressed[index] = pressed;
        }
        fired
    }
}

pub(crate) const MAX_LISTENERS: usize = 4;

type Handler<C, E> = fn(&mut C) -> Result<(), E>;

/// Ordered listener lists per button and edge, fixed at startup.
///
/// Dispatch runs every registered handler in registration order; the
/// generic any-button list runs before the per-button list, as the device
/// registers it first.
pub(crate) struct Listeners<C, E> {
    any_press: Vec<Handler<C, E>, MAX_LISTENERS>,
    short: [Vec<Handler<C, E>, MAX_LISTENERS>; BUTTON_COUNT],
    long: [Vec<Handler<C, E>, MAX_LISTENERS>; BUTTON_COUNT],
}

impl<C, E> Listeners<C, E> {
    pub(crate) fn new() -> Self {
        Self {
            any_press: Vec::new(),
            short: core::array::from_fn(|_| Vec::new()),
            long: core::array::from_fn(|_| Vec::new()),
        }
    }

    /// Registers a handler run on every short press, before the per-button
    /// handlers.
    ///
    /// # Panics
    /// Panics if more than [`MAX_LISTENERS`] handlers are registered for
    /// the edge. Registration happens once at startup with a fixed set of
    /// handlers, so the capacity is never exceeded in practice.
    pub(crate) fn on_any_press(&mut self, handler: Handler<C, E>) {
        if self.any_press.push(handler).is_err() {
            panic!("too many generic press listeners");
        }
    }

    /// Registers a short-press handler for `button`.
    ///
    /// # Panics
    /// See [`Listeners::on_any_press`].
    pub(crate) fn on_short(&mut self, button: Button, handler: Handler<C, E>) {
        if self.short[button.index()].push(handler).is_err() {
            panic!("too many short press listeners");
        }
    }

    /// Registers a long-press handler for `button`.
    ///
    /// # Panics
    /// See [`Listeners::on_any_press`].
    pub(crate) fn on_long(&mut self, button: Button, handler: Handler<C, E>) {
        if self.long[button.index()].push(handler).is_err() {
            panic!("too many long press listeners");
        }
    }

    pub(crate) fn dispatch_short(&self, context: &mut C, button: Button) -> Result<(), E> {
        for handler in &self.any_press {
            handler(context)?;
        }
        for handler in &self.short[button.index()] {
            handler(context)?;
        }
        Ok(())
    }

    pub(crate) fn dispatch_long(&self, context: &mut C, button: Button) -> Result<(), E> {
        for handler in &self.long[button.index()] {
            handler(context)?;
        }
        Ok(())
    }
}
