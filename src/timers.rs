//! Countdown-driven timers for the buzzer and the display backlight.
//!
//! Both timers are decremented from the fast housekeeping tick and express
//! their idle state explicitly as [`Countdown::Off`] rather than with a
//! sentinel value.

use crate::{AlarmClockError, ClockOutputs};

/// A tick countdown with an explicit off state.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Countdown {
    Off,
    Counting(u16),
}

impl Countdown {
    pub(crate) const fn new() -> Self {
        Countdown::Off
    }

    pub(crate) fn arm(&mut self, ticks: u16) {
        *self = Countdown::Counting(ticks);
    }

    pub(crate) fn is_armed(&self) -> bool {
        matches!(self, Countdown::Counting(_))
    }

    /// Advances the countdown by one tick. Returns `true` exactly once per
    /// arming, on the tick the countdown expires; the countdown is off
    /// afterwards.
    pub(crate) fn tick(&mut self) -> bool {
        match *self {
            Countdown::Off => false,
            Countdown::Counting(0) => {
                *self = Countdown::Off;
                true
            }
            Countdown::Counting(remaining) => {
                *self = Countdown::Counting(remaining - 1);
                false
            }
        }
    }
}

/// Countdown-driven timeout for the display illumination output.
#[derive(Debug)]
pub(crate) struct Backlight {
    countdown: Countdown,
    duration: u16,
}

impl Backlight {
    pub(crate) fn new(duration: u16) -> Self {
        Self {
            countdown: Countdown::new(),
            duration,
        }
    }

    /// Enables the illumination output and restarts the timeout. Pressing
    /// another button before expiry simply refreshes the countdown.
    pub(crate) fn turn_on<IO: ClockOutputs>(
        &mut self,
        io: &mut IO,
    ) -> Result<(), AlarmClockError<IO::Error>> {
        io.set_illumination(true)?;
        self.countdown.arm(self.duration);
        Ok(())
    }

    pub(crate) fn tick<IO: ClockOutputs>(
        &mut self,
        io: &mut IO,
    ) -> Result<(), AlarmClockError<IO::Error>> {
        if self.countdown.tick() {
            io.set_illumination(false)?;
        }
        Ok(())
    }
}

/// Intermittent buzzer driver.
///
/// While the device is ringing the countdown expiry alternates the pulse
/// source between an audible and a silent phase of equal length, producing
/// the classic beeping pattern. Outside of ringing the countdown times a
/// single acknowledgment beep and then fully disarms the pulse source.
#[derive(Debug)]
pub(crate) struct Buzzer {
    countdown: Countdown,
    silent_phase: bool,
    beep_ticks: u16,
    ring_phase_ticks: u16,
}

impl Buzzer {
    pub(crate) fn new(beep_ticks: u16, ring_phase_ticks: u16) -> Self {
        Self {
            countdown: Countdown::new(),
            silent_phase: false,
            beep_ticks,
            ring_phase_ticks,
        }
    }

    /// Arms the pulse source.
    ///
    /// While ringing the long phase countdown is armed only if the current
    /// countdown is exhausted: a button pressed during the ring must not
    /// stretch the pattern it is already in. Otherwise a short
    /// acknowledgment beep is armed.
    pub(crate) fn start<IO: ClockOutputs>(
        &mut self,
        io: &mut IO,
        ringing: bool,
    ) -> Result<(), AlarmClockError<IO::Error>> {
        if ringing {
            if !self.countdown.is_armed() {
                self.countdown.arm(self.ring_phase_ticks);
            }
        } else {
            self.countdown.arm(self.beep_ticks);
        }
        self.silent_phase = false;
        io.set_buzzer_pulse(true)?;
        Ok(())
    }

    /// Disarms the pulse source unconditionally. Any running countdown is
    /// left to decay on its own.
    pub(crate) fn stop<IO: ClockOutputs>(
        &mut self,
        io: &mut IO,
    ) -> Result<(), AlarmClockError<IO::Error>> {
        io.set_buzzer_pulse(false)?;
        Ok(())
    }

    pub(crate) fn tick<IO: ClockOutputs>(
        &mut self,
        io: &mut IO,
        ringing: bool,
    ) -> Result<(), AlarmClockError<IO::Error>> {
        if self.countdown.tick() {
            if ringing {
                self.silent_phase = !self.silent_phase;
                io.set_buzzer_pulse(!self.silent_phase)?;
                self.countdown.arm(self.ring_phase_ticks);
            } else {
                self.silent_phase = false;
                io.set_buzzer_pulse(false)?;
            }
        }
        Ok(())
    }
}
