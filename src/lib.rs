#![no_std]

//! A platform-agnostic timing and state core for bedside alarm clocks.
//!
//! This crate implements everything about an alarm clock that is not
//! hardware: the wall clock, the alarm and snooze times, the device mode
//! state machine, short/long button press classification, the intermittent
//! ring pattern and the backlight timeout. The platform supplies the
//! outputs (via [`ClockOutputs`] or the [`PinOutputs`] adapter over
//! `embedded-hal` pins) and calls the entry points from its periodic timer
//! interrupts and its main loop:
//!
//! - [`AlarmClock::on_second_tick`] from a seconds-cadence timer interrupt,
//! - [`AlarmClock::on_fast_tick`] from a millisecond-cadence housekeeping
//!   timer interrupt,
//! - [`AlarmClock::poll`] from the foreground loop,
//! - [`AlarmClock::snapshot`] wherever the display is rendered.
//!
//! The audio-frequency tone generation itself stays on the platform side;
//! the core only gates it through [`ClockOutputs::set_buzzer_pulse`].
//!
//! # Concurrency
//!
//! The entry points are designed to be called from interrupt handlers that
//! preempt the foreground loop on a single core without an OS. All shared
//! state lives behind a `critical_section::Mutex`, and each entry point
//! performs its whole read-modify-write inside one scoped critical
//! section, so a preempting handler can never observe a half-updated
//! value. The methods therefore take `&self` and the device can be placed
//! in a `static`.
//!
//! # Example
//!
//! ```rust,ignore
//! use alarm_core::{AlarmClock, Config, PinOutputs};
//!
//! let outputs = PinOutputs::new(backlight_pin, buzzer_gate_pin);
//! let clock = AlarmClock::new(outputs, Config::default());
//!
//! // In the 1 Hz timer ISR:
//! clock.on_second_tick(switch.is_high())?;
//!
//! // In the fast housekeeping timer ISR:
//! clock.on_fast_tick(&io.button_levels())?;
//!
//! // In the main loop:
//! clock.poll(&io.button_levels(), switch.is_high())?;
//! display.render(&clock.snapshot());
//! ```

use core::cell::RefCell;

use critical_section::Mutex;
use embedded_hal::digital::OutputPin;

#[macro_use]
mod fmt;

mod buttons;
mod state;
mod time;
mod timers;

pub use buttons::{Button, ButtonLevels};
pub use state::DeviceState;
pub use time::{TimeError, TimeOfDay, TimeRepresentation};

use buttons::{Listeners, PressDetector};
use timers::{Backlight, Buzzer};

/// Hardware outputs driven by the core.
///
/// Implementations translate the logical operations to the actual
/// hardware: an illumination line for the display backlight, and a gate
/// that starts or stops the audio-frequency buzzer pulse source (typically
/// by enabling or disabling a timer interrupt).
pub trait ClockOutputs {
    /// Error type of the underlying output implementation.
    type Error;

    /// Switches the display illumination on or off.
    fn set_illumination(&mut self, on: bool) -> Result<(), Self::Error>;

    /// Arms or disarms the buzzer pulse source.
    fn set_buzzer_pulse(&mut self, enabled: bool) -> Result<(), Self::Error>;
}

/// [`ClockOutputs`] implementation over two `embedded-hal` output pins.
pub struct PinOutputs<L, B> {
    illumination: L,
    buzzer_gate: B,
}

impl<L, B> PinOutputs<L, B> {
    /// Creates the adapter from an illumination pin and a buzzer gate pin.
    pub fn new(illumination: L, buzzer_gate: B) -> Self {
        Self {
            illumination,
            buzzer_gate,
        }
    }

    /// Releases the underlying pins.
    pub fn release(self) -> (L, B) {
        (self.illumination, self.buzzer_gate)
    }
}

impl<L, B, E> ClockOutputs for PinOutputs<L, B>
where
    L: OutputPin<Error = E>,
    B: OutputPin<Error = E>,
{
    type Error = E;

    fn set_illumination(&mut self, on: bool) -> Result<(), E> {
        if on {
            self.illumination.set_high()
        } else {
            self.illumination.set_low()
        }
    }

    fn set_buzzer_pulse(&mut self, enabled: bool) -> Result<(), E> {
        if enabled {
            self.buzzer_gate.set_high()
        } else {
            self.buzzer_gate.set_low()
        }
    }
}

/// Static configuration of the core, applied at construction.
///
/// Durations are expressed in fast housekeeping ticks; with the usual
/// millisecond cadence the defaults give a 0.8 s long-press threshold, a
/// 10 s backlight, a short acknowledgment beep and a half-second ring
/// phase.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// Initial 12/24-hour representation
    pub time_representation: TimeRepresentation,
    /// Held duration after which a press counts as long
    pub long_press_ticks: u16,
    /// Backlight duration after a button press
    pub backlight_ticks: u16,
    /// Length of the acknowledgment beep on a button press
    pub beep_ticks: u16,
    /// Length of one audible (and one silent) ring pattern phase
    pub ring_phase_ticks: u16,
    /// Minutes added to the snooze time per snooze press
    pub snooze_minutes: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            time_representation: TimeRepresentation::TwentyFourHour,
            long_press_ticks: 800,
            backlight_ticks: 10_000,
            beep_ticks: 60,
            ring_phase_ticks: 500,
            snooze_minutes: 5,
        }
    }
}

/// Errors returned by the alarm clock core.
#[derive(Debug)]
pub enum AlarmClockError<E> {
    /// Error from the hardware output implementation
    Output(E),
}

impl<E> From<E> for AlarmClockError<E> {
    fn from(e: E) -> Self {
        AlarmClockError::Output(e)
    }
}

/// Read-only copy of the displayable state, taken in one critical section.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Snapshot {
    /// Current device mode
    pub state: DeviceState,
    /// Current wall-clock time
    pub time: TimeOfDay,
    /// Configured alarm time
    pub alarm: TimeOfDay,
    /// Active 12/24-hour representation
    pub representation: TimeRepresentation,
    /// Whether a snooze is pending
    pub snoozed: bool,
}

/// The shared mutable state: everything the interrupt handlers and the
/// foreground loop both touch.
pub(crate) struct Core<IO: ClockOutputs> {
    pub(crate) state: DeviceState,
    pub(crate) clock: TimeOfDay,
    pub(crate) alarm: TimeOfDay,
    pub(crate) snooze: TimeOfDay,
    pub(crate) snoozed: bool,
    pub(crate) snooze_minutes: u8,
    pub(crate) detector: PressDetector,
    pub(crate) backlight: Backlight,
    pub(crate) buzzer: Buzzer,
    pub(crate) io: IO,
}

impl<IO: ClockOutputs> Core<IO> {
    pub(crate) fn new(io: IO, config: &Config) -> Self {
        let midnight = TimeOfDay::midnight(config.time_representation);
        Self {
            state: DeviceState::Idle,
            clock: midnight,
            alarm: midnight,
            snooze: midnight,
            snoozed: false,
            snooze_minutes: config.snooze_minutes,
            detector: PressDetector::new(config.long_press_ticks),
            backlight: Backlight::new(config.backlight_ticks),
            buzzer: Buzzer::new(config.beep_ticks, config.ring_phase_ticks),
            io,
        }
    }
}

/// The alarm clock core.
///
/// Owns the shared state behind a `critical_section::Mutex` together with
/// the button listener table, which is fixed at construction and read-only
/// afterwards.
pub struct AlarmClock<IO: ClockOutputs> {
    shared: Mutex<RefCell<Core<IO>>>,
    listeners: Listeners<Core<IO>, AlarmClockError<IO::Error>>,
}

impl<IO: ClockOutputs> AlarmClock<IO> {
    /// Creates the core with all state at its power-up defaults (midnight,
    /// idle, not snoozed) and registers the button handlers.
    pub fn new(io: IO, config: Config) -> Self {
        let mut listeners: Listeners<Core<IO>, AlarmClockError<IO::Error>> = Listeners::new();
        listeners.on_any_press(state::press_any);
        listeners.on_short(Button::SetAlarm, state::press_set_alarm);
        listeners.on_long(Button::SetAlarm, state::long_set_alarm);
        listeners.on_short(Button::SetClock, state::press_set_clock);
        listeners.on_long(Button::SetClock, state::long_set_clock);
        listeners.on_short(Button::Up, state::press_up);
        listeners.on_short(Button::Down, state::press_down);
        listeners.on_short(Button::Mode, state::press_mode);
        listeners.on_short(Button::Snooze, state::press_snooze);
        listeners.on_short(Button::StopAlarm, state::press_stop_alarm);

        Self {
            shared: Mutex::new(RefCell::new(Core::new(io, &config))),
            listeners,
        }
    }

    /// Seconds-cadence tick, to be called from the timer interrupt that
    /// fires once per second.
    ///
    /// Advances the clock and starts ringing on an alarm or snooze match.
    ///
    /// # Arguments
    /// * `switch_on` - Level of the physical alarm on/off switch
    pub fn on_second_tick(&self, switch_on: bool) -> Result<(), AlarmClockError<IO::Error>> {
        critical_section::with(|cs| {
            let mut core = self.shared.borrow_ref_mut(cs);
            state::second_tick(&mut core, switch_on)
        })
    }

    /// Fast housekeeping tick, to be called from the sub-second timer
    /// interrupt.
    ///
    /// Runs long-press detection and dispatch, the backlight timeout and
    /// the buzzer countdown.
    ///
    /// # Arguments
    /// * `levels` - Debounced pressed/released levels from the I/O layer
    pub fn on_fast_tick(&self, levels: &ButtonLevels) -> Result<(), AlarmClockError<IO::Error>> {
        critical_section::with(|cs| {
            let mut core = self.shared.borrow_ref_mut(cs);
            let core = &mut *core;

            for button in core.detector.sample(levels) {
                trace!("long press {:?}", button);
                self.listeners.dispatch_long(core, button)?;
            }

            core.backlight.tick(&mut core.io)?;
            let ringing = core.state == DeviceState::Ringing;
            core.buzzer.tick(&mut core.io, ringing)
        })
    }

    /// Foreground polling pass, to be called from the main loop.
    ///
    /// Observes the alarm switch (turning it off silences a ringing alarm)
    /// and fires the short-press handlers for buttons released before the
    /// long-press threshold.
    pub fn poll(
        &self,
        levels: &ButtonLevels,
        switch_on: bool,
    ) -> Result<(), AlarmClockError<IO::Error>> {
        critical_section::with(|cs| {
            let mut core = self.shared.borrow_ref_mut(cs);
            let core = &mut *core;

            if !switch_on && core.state == DeviceState::Ringing {
                state::silence(core)?;
            }

            for button in core.detector.poll_releases(levels) {
                trace!("short press {:?}", button);
                self.listeners.dispatch_short(core, button)?;
            }
            Ok(())
        })
    }

    /// Takes a consistent read-only snapshot for the display layer.
    pub fn snapshot(&self) -> Snapshot {
        critical_section::with(|cs| {
            let core = self.shared.borrow_ref(cs);
            Snapshot {
                state: core.state,
                time: core.clock,
                alarm: core.alarm,
                representation: core.clock.representation(),
                snoozed: core.snoozed,
            }
        })
    }
}
