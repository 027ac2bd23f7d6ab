//! Device mode state machine and its button/tick transition handlers.
//!
//! The device is always in exactly one [`DeviceState`]. Button events and
//! the once-per-second tick drive the transitions; every state/event pair
//! not handled below is deliberately a no-op, so the transition table is
//! closed and no invalid state can be reached.
//!
//! # Transitions
//!
//! - Holding the set-alarm (set-clock) button in `Idle` enters the hour
//!   editing state; short presses advance to minute editing and back to
//!   `Idle`, committing the edited value.
//! - `Up`/`Down` adjust the field selected by the current editing state.
//! - The seconds tick compares the clock against the alarm (or against the
//!   snooze time once snoozed) and starts ringing on a match, provided the
//!   alarm switch is on.
//! - Snoozing re-arms the comparison at the alarm time plus the configured
//!   offset, adding the offset again on every further snooze press.
//!
//! All guards are equality comparisons against the current state; the
//! handlers never force a transition from an unexpected state.

use crate::{AlarmClockError, ClockOutputs, Core, TimeRepresentation};

/// Operating mode of the device.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceState {
    /// Normal clock display
    Idle,
    /// Editing the alarm hour
    SetAlarmHour,
    /// Editing the alarm minute
    SetAlarmMinute,
    /// Editing the clock hour
    SetClockHour,
    /// Editing the clock minute
    SetClockMinute,
    /// Alarm is sounding
    Ringing,
}

/// Generic short-press listener, registered before the per-button ones:
/// lights the display and produces the acknowledgment beep.
pub(crate) fn press_any<IO: ClockOutputs>(
    core: &mut Core<IO>,
) -> Result<(), AlarmClockError<IO::Error>> {
    core.backlight.turn_on(&mut core.io)?;
    let ringing = core.state == DeviceState::Ringing;
    core.buzzer.start(&mut core.io, ringing)
}

pub(crate) fn long_set_alarm<IO: ClockOutputs>(
    core: &mut Core<IO>,
) -> Result<(), AlarmClockError<IO::Error>> {
    if core.state == DeviceState::Idle {
        core.state = DeviceState::SetAlarmHour;
    }
    Ok(())
}

pub(crate) fn press_set_alarm<IO: ClockOutputs>(
    core: &mut Core<IO>,
) -> Result<(), AlarmClockError<IO::Error>> {
    match core.state {
        DeviceState::SetAlarmHour => core.state = DeviceState::SetAlarmMinute,
        DeviceState::SetAlarmMinute => {
            core.state = DeviceState::Idle;
            debug!("alarm set to {:?}", core.alarm);
        }
        _ => {}
    }
    Ok(())
}

pub(crate) fn long_set_clock<IO: ClockOutputs>(
    core: &mut Core<IO>,
) -> Result<(), AlarmClockError<IO::Error>> {
    if core.state == DeviceState::Idle {
        core.state = DeviceState::SetClockHour;
    }
    Ok(())
}

pub(crate) fn press_set_clock<IO: ClockOutputs>(
    core: &mut Core<IO>,
) -> Result<(), AlarmClockError<IO::Error>> {
    match core.state {
        DeviceState::SetClockHour => core.state = DeviceState::SetClockMinute,
        DeviceState::SetClockMinute => {
            core.state = DeviceState::Idle;
            debug!("clock set to {:?}", core.clock);
        }
        _ => {}
    }
    Ok(())
}

pub(crate) fn press_up<IO: ClockOutputs>(
    core: &mut Core<IO>,
) -> Result<(), AlarmClockError<IO::Error>> {
    adjust_selected(core, 1);
    Ok(())
}

pub(crate) fn press_down<IO: ClockOutputs>(
    core: &mut Core<IO>,
) -> Result<(), AlarmClockError<IO::Error>> {
    adjust_selected(core, -1);
    Ok(())
}

fn adjust_selected<IO: ClockOutputs>(core: &mut Core<IO>, delta: i8) {
    match core.state {
        DeviceState::SetAlarmHour => core.alarm.add_hours(delta),
        DeviceState::SetAlarmMinute => core.alarm.add_minutes(delta),
        DeviceState::SetClockHour => core.clock.add_hours(delta),
        DeviceState::SetClockMinute => core.clock.add_minutes(delta),
        _ => {}
    }
}

/// Toggles the 12/24-hour representation in any state. All time values are
/// converted together so alarm/snooze matching stays well-formed.
pub(crate) fn press_mode<IO: ClockOutputs>(
    core: &mut Core<IO>,
) -> Result<(), AlarmClockError<IO::Error>> {
    let repr = match core.clock.representation() {
        TimeRepresentation::TwentyFourHour => TimeRepresentation::TwelveHour,
        TimeRepresentation::TwelveHour => TimeRepresentation::TwentyFourHour,
    };
    core.clock.set_representation(repr);
    core.alarm.set_representation(repr);
    core.snooze.set_representation(repr);
    debug!("time representation now {:?}", repr);
    Ok(())
}

pub(crate) fn press_snooze<IO: ClockOutputs>(
    core: &mut Core<IO>,
) -> Result<(), AlarmClockError<IO::Error>> {
    if core.state == DeviceState::Ringing {
        if !core.snoozed {
            core.snoozed = true;
            core.snooze = core.alarm;
        }
        core.snooze.add_minutes(core.snooze_minutes as i8);
        core.state = DeviceState::Idle;
        debug!("snoozed until {:?}", core.snooze);
        // The buzzer is left to decay at its next countdown expiry.
    }
    Ok(())
}

pub(crate) fn press_stop_alarm<IO: ClockOutputs>(
    core: &mut Core<IO>,
) -> Result<(), AlarmClockError<IO::Error>> {
    if core.state == DeviceState::Ringing {
        silence(core)?;
    }
    Ok(())
}

/// Returns the device to `Idle`, clears the snoozed flag and disarms the
/// buzzer pulse source. Used by the stop button and by the alarm switch
/// being turned off.
pub(crate) fn silence<IO: ClockOutputs>(
    core: &mut Core<IO>,
) -> Result<(), AlarmClockError<IO::Error>> {
    core.state = DeviceState::Idle;
    core.snoozed = false;
    debug!("alarm silenced");
    core.buzzer.stop(&mut core.io)
}

/// Seconds-cadence tick: advances the clock and, while idle with the alarm
/// switch on, checks the alarm (or snooze) time for a match.
pub(crate) fn second_tick<IO: ClockOutputs>(
    core: &mut Core<IO>,
    switch_on: bool,
) -> Result<(), AlarmClockError<IO::Error>> {
    core.clock.tick();

    if switch_on && core.state == DeviceState::Idle {
        let target = if core.snoozed { core.snooze } else { core.alarm };
        if target == core.clock {
            core.state = DeviceState::Ringing;
            debug!("alarm ringing at {:?}", core.clock);
            core.buzzer.start(&mut core.io, true)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::FakeOutputs;
    use crate::{Config, TimeOfDay};

    fn core_in(state: DeviceState) -> Core<FakeOutputs> {
        let mut core = Core::new(FakeOutputs::new(), &Config::default());
        core.state = state;
        core
    }

    fn at(hour: u8, minute: u8, second: u8) -> TimeOfDay {
        TimeOfDay::from_hms(TimeRepresentation::TwentyFourHour, hour, minute, second).unwrap()
    }

    const ALL_STATES: [DeviceState; 6] = [
        DeviceState::Idle,
        DeviceState::SetAlarmHour,
        DeviceState::SetAlarmMinute,
        DeviceState::SetClockHour,
        DeviceState::SetClockMinute,
        DeviceState::Ringing,
    ];

    #[test]
    fn test_set_alarm_sequence() {
        let mut core = core_in(DeviceState::Idle);
        long_set_alarm(&mut core).unwrap();
        assert_eq!(core.state, DeviceState::SetAlarmHour);
        press_set_alarm(&mut core).unwrap();
        assert_eq!(core.state, DeviceState::SetAlarmMinute);
        press_set_alarm(&mut core).unwrap();
        assert_eq!(core.state, DeviceState::Idle);
    }

    #[test]
    fn test_set_clock_sequence() {
        let mut core = core_in(DeviceState::Idle);
        long_set_clock(&mut core).unwrap();
        assert_eq!(core.state, DeviceState::SetClockHour);
        press_set_clock(&mut core).unwrap();
        assert_eq!(core.state, DeviceState::SetClockMinute);
        press_set_clock(&mut core).unwrap();
        assert_eq!(core.state, DeviceState::Idle);
    }

    #[test]
    fn test_unlisted_events_are_no_ops() {
        for state in [
            DeviceState::Idle,
            DeviceState::SetClockHour,
            DeviceState::SetClockMinute,
            DeviceState::Ringing,
        ] {
            let mut core = core_in(state);
            press_set_alarm(&mut core).unwrap();
            assert_eq!(core.state, state);
        }
        for state in [
            DeviceState::Idle,
            DeviceState::SetAlarmHour,
            DeviceState::SetAlarmMinute,
            DeviceState::Ringing,
        ] {
            let mut core = core_in(state);
            press_set_clock(&mut core).unwrap();
            assert_eq!(core.state, state);
        }
        for state in ALL_STATES {
            if state == DeviceState::Idle {
                continue;
            }
            let mut core = core_in(state);
            long_set_alarm(&mut core).unwrap();
            assert_eq!(core.state, state);
            let mut core = core_in(state);
            long_set_clock(&mut core).unwrap();
            assert_eq!(core.state, state);
        }
        for state in ALL_STATES {
            if state == DeviceState::Ringing {
                continue;
            }
            let mut core = core_in(state);
            press_snooze(&mut core).unwrap();
            assert_eq!(core.state, state);
            assert!(!core.snoozed);
            let mut core = core_in(state);
            press_stop_alarm(&mut core).unwrap();
            assert_eq!(core.state, state);
        }
    }

    #[test]
    fn test_up_down_ignored_outside_editing() {
        for state in [DeviceState::Idle, DeviceState::Ringing] {
            let mut core = core_in(state);
            let clock = core.clock;
            let alarm = core.alarm;
            press_up(&mut core).unwrap();
            press_down(&mut core).unwrap();
            assert_eq!(core.clock, clock);
            assert_eq!(core.alarm, alarm);
            assert_eq!(core.state, state);
        }
    }

    #[test]
    fn test_up_down_edit_selected_field() {
        let mut core = core_in(DeviceState::SetAlarmHour);
        press_up(&mut core).unwrap();
        assert_eq!(core.alarm, at(1, 0, 0));

        core.state = DeviceState::SetAlarmMinute;
        press_down(&mut core).unwrap();
        assert_eq!(core.alarm, at(0, 59, 0));

        core.state = DeviceState::SetClockHour;
        press_down(&mut core).unwrap();
        assert_eq!(core.clock, at(23, 0, 0));

        core.state = DeviceState::SetClockMinute;
        press_up(&mut core).unwrap();
        assert_eq!(core.clock, at(23, 1, 0));
    }

    #[test]
    fn test_alarm_match_starts_ringing() {
        let mut core = core_in(DeviceState::Idle);
        core.alarm = at(6, 30, 0);
        core.clock = at(6, 29, 59);
        second_tick(&mut core, true).unwrap();
        assert_eq!(core.state, DeviceState::Ringing);
        assert!(core.io.pulse_enabled);
    }

    #[test]
    fn test_no_match_with_switch_off() {
        let mut core = core_in(DeviceState::Idle);
        core.alarm = at(6, 30, 0);
        core.clock = at(6, 29, 59);
        second_tick(&mut core, false).unwrap();
        assert_eq!(core.state, DeviceState::Idle);
        assert!(!core.io.pulse_enabled);
        // The clock still advances
        assert_eq!(core.clock, at(6, 30, 0));
    }

    #[test]
    fn test_no_match_outside_idle() {
        let mut core = core_in(DeviceState::SetClockMinute);
        core.alarm = at(6, 30, 0);
        core.clock = at(6, 29, 59);
        second_tick(&mut core, true).unwrap();
        assert_eq!(core.state, DeviceState::SetClockMinute);
        assert!(!core.io.pulse_enabled);
    }

    #[test]
    fn test_snooze_re_arms_from_alarm() {
        let mut core = core_in(DeviceState::Ringing);
        core.alarm = at(6, 30, 0);
        core.clock = at(6, 30, 5);

        press_snooze(&mut core).unwrap();
        assert_eq!(core.state, DeviceState::Idle);
        assert!(core.snoozed);
        assert_eq!(core.snooze, at(6, 35, 0));
        assert_eq!(core.alarm, at(6, 30, 0));
    }

    #[test]
    fn test_repeated_snooze_extends_snooze_not_alarm() {
        let mut core = core_in(DeviceState::Ringing);
        core.alarm = at(6, 30, 0);
        press_snooze(&mut core).unwrap();

        core.state = DeviceState::Ringing;
        press_snooze(&mut core).unwrap();
        assert_eq!(core.snooze, at(6, 40, 0));
        assert_eq!(core.alarm, at(6, 30, 0));
    }

    #[test]
    fn test_snoozed_match_checks_snooze_time_only() {
        let mut core = core_in(DeviceState::Idle);
        core.snoozed = true;
        core.snooze = at(6, 35, 0);
        core.alarm = at(6, 31, 0);
        core.clock = at(6, 30, 59);

        // Alarm time passes without ringing
        second_tick(&mut core, true).unwrap();
        assert_eq!(core.state, DeviceState::Idle);

        core.clock = at(6, 34, 59);
        second_tick(&mut core, true).unwrap();
        assert_eq!(core.state, DeviceState::Ringing);
    }

    #[test]
    fn test_stop_clears_snoozed_and_buzzer() {
        let mut core = core_in(DeviceState::Ringing);
        core.snoozed = true;
        core.io.pulse_enabled = true;

        press_stop_alarm(&mut core).unwrap();
        assert_eq!(core.state, DeviceState::Idle);
        assert!(!core.snoozed);
        assert!(!core.io.pulse_enabled);
    }

    #[test]
    fn test_mode_toggle_converts_all_values() {
        let mut core = core_in(DeviceState::Idle);
        core.clock = at(18, 0, 0);
        core.alarm = at(6, 30, 0);
        core.snooze = at(12, 0, 0);

        press_mode(&mut core).unwrap();
        assert_eq!(core.clock.hour(), 6);
        assert_eq!(core.clock.is_pm(), Some(true));
        assert_eq!(core.alarm.hour(), 6);
        assert_eq!(core.alarm.is_pm(), Some(false));
        assert_eq!(core.snooze.hour(), 12);
        assert_eq!(core.snooze.is_pm(), Some(true));

        press_mode(&mut core).unwrap();
        assert_eq!(core.clock, at(18, 0, 0));
        assert_eq!(core.alarm, at(6, 30, 0));
        assert_eq!(core.snooze, at(12, 0, 0));
    }

    #[test]
    fn test_mode_toggle_works_in_any_state() {
        for state in ALL_STATES {
            let mut core = core_in(state);
            press_mode(&mut core).unwrap();
            assert_eq!(core.state, state);
            assert_eq!(
                core.clock.representation(),
                TimeRepresentation::TwelveHour
            );
        }
    }

    #[test]
    fn test_generic_press_lights_and_beeps() {
        let mut core = core_in(DeviceState::Idle);
        press_any(&mut core).unwrap();
        assert!(core.io.illumination);
        assert!(core.io.pulse_enabled);
    }

    #[test]
    fn test_next_day_re_trigger() {
        let mut core = core_in(DeviceState::Idle);
        core.alarm = at(6, 30, 0);
        core.clock = at(6, 29, 59);
        second_tick(&mut core, true).unwrap();
        assert_eq!(core.state, DeviceState::Ringing);
        silence(&mut core).unwrap();

        // A day later the comparison matches again
        for _ in 0..86_400 {
            second_tick(&mut core, true).unwrap();
        }
        assert_eq!(core.state, DeviceState::Ringing);
    }
}
