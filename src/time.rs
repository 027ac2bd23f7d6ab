//! Wall-clock time values for the alarm clock core.
//!
//! This module provides [`TimeOfDay`], the wrapping hour/minute/second value
//! used for the running clock, the alarm time and the snooze time, together
//! with conversion to and from chrono's `NaiveTime` for display layers.
//!
//! # Features
//!
//! - Second ticks with carry into minutes and hours
//! - Hour and minute adjustment with wrap-around (editing via Up/Down)
//! - 12-hour and 24-hour representations with lossless conversion
//! - Validated construction from raw hour/minute/second values
//!
//! # Representation
//!
//! Hours are stored in the active [`TimeRepresentation`]: 0–23 in 24-hour
//! mode, 1–12 plus a meridiem flag in 12-hour mode. All mutating operations
//! keep the value normalized, so a `TimeOfDay` can never hold an
//! out-of-range field.

use chrono::{NaiveTime, Timelike};

/// Time representation format for the clock, alarm and snooze values.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimeRepresentation {
    /// 24-hour format (0-23)
    TwentyFourHour,
    /// 12-hour format (1-12 + AM/PM)
    TwelveHour,
}

/// Errors that can occur when constructing a [`TimeOfDay`] from raw values.
#[derive(Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimeError {
    /// The hour is not in 0-23
    InvalidHour,
    /// The minute is not in 0-59
    InvalidMinute,
    /// The second is not in 0-59
    InvalidSecond,
}

/// A wrapping hour/minute/second value.
///
/// The stored hour follows the active representation, like the hours
/// register of a hardware RTC whose encoding switches on its 12/24-hour
/// mode bit. Equality compares all fields, so values being matched against
/// each other (clock vs. alarm) must share a representation; the core
/// converts all of its time values together when the mode is toggled.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TimeOfDay {
    repr: TimeRepresentation,
    hours: u8,
    minutes: u8,
    seconds: u8,
    pm: bool,
}

impl TimeOfDay {
    /// Returns midnight (00:00:00, or 12:00:00 AM) in the given
    /// representation.
    pub fn midnight(repr: TimeRepresentation) -> Self {
        let hours = match repr {
            TimeRepresentation::TwentyFourHour => 0,
            TimeRepresentation::TwelveHour => 12,
        };
        Self {
            repr,
            hours,
            minutes: 0,
            seconds: 0,
            pm: false,
        }
    }

    /// Creates a `TimeOfDay` from a 24-hour clock reading, stored in the
    /// given representation.
    ///
    /// # Arguments
    /// * `repr` - The representation to store the value in
    /// * `hour` - Hour on the 24-hour clock (0-23), converted if `repr` is
    ///   12-hour
    /// * `minute` - Minute (0-59)
    /// * `second` - Second (0-59)
    ///
    /// # Errors
    /// Returns a [`TimeError`] if any component is out of range.
    pub fn from_hms(
        repr: TimeRepresentation,
        hour: u8,
        minute: u8,
        second: u8,
    ) -> Result<Self, TimeError> {
        if hour > 23 {
            return Err(TimeError::InvalidHour);
        }
        if minute > 59 {
            return Err(TimeError::InvalidMinute);
        }
        if second > 59 {
            return Err(TimeError::InvalidSecond);
        }
        let mut value = Self::midnight(repr);
        value.minutes = minute;
        value.seconds = second;
        value.set_hour24(hour);
        Ok(value)
    }

    /// Creates a `TimeOfDay` from a chrono `NaiveTime`, discarding
    /// sub-second precision.
    pub fn from_naive_time(time: NaiveTime, repr: TimeRepresentation) -> Self {
        let mut value = Self::midnight(repr);
        value.minutes = time.minute() as u8;
        value.seconds = time.second() as u8;
        value.set_hour24(time.hour() as u8);
        value
    }

    /// The active representation.
    pub fn representation(&self) -> TimeRepresentation {
        self.repr
    }

    /// The stored hour: 0-23 in 24-hour mode, 1-12 in 12-hour mode.
    pub fn hour(&self) -> u8 {
        self.hours
    }

    /// The minute (0-59).
    pub fn minute(&self) -> u8 {
        self.minutes
    }

    /// The second (0-59).
    pub fn second(&self) -> u8 {
        self.seconds
    }

    /// The meridiem flag: `None` in 24-hour mode, `Some(true)` for PM in
    /// 12-hour mode.
    pub fn is_pm(&self) -> Option<bool> {
        match self.repr {
            TimeRepresentation::TwentyFourHour => None,
            TimeRepresentation::TwelveHour => Some(self.pm),
        }
    }

    /// Advances the value by one second, carrying into minutes and hours.
    pub fn tick(&mut self) {
        self.seconds += 1;
        if self.seconds == 60 {
            self.seconds = 0;
            self.increment_minute();
        }
    }

    /// Adjusts the hour by `delta` steps, wrapping within the day.
    ///
    /// In 24-hour mode the hour wraps 23→0. In 12-hour mode it wraps 12→1,
    /// with the meridiem toggling at the 11→12 boundary so that repeated
    /// adjustment cycles through all 24 hours.
    pub fn add_hours(&mut self, delta: i8) {
        for _ in 0..delta.unsigned_abs() {
            if delta > 0 {
                self.increment_hour();
            } else {
                self.decrement_hour();
            }
        }
    }

    /// Adjusts the minute by `delta` steps, carrying into the hour on wrap.
    pub fn add_minutes(&mut self, delta: i8) {
        for _ in 0..delta.unsigned_abs() {
            if delta > 0 {
                self.increment_minute();
            } else {
                self.decrement_minute();
            }
        }
    }

    /// Converts the stored value to another representation.
    ///
    /// The conversion is lossless: 12:xx AM maps to hour 0, 1-11 AM to
    /// 1-11, 12:xx PM to hour 12 and 1-11 PM to 13-23, and back.
    pub fn set_representation(&mut self, repr: TimeRepresentation) {
        if self.repr == repr {
            return;
        }
        let hour = self.hour24();
        self.repr = repr;
        self.set_hour24(hour);
    }

    /// The hour projected onto the 24-hour clock regardless of
    /// representation.
    fn hour24(&self) -> u8 {
        match self.repr {
            TimeRepresentation::TwentyFourHour => self.hours,
            TimeRepresentation::TwelveHour => match (self.hours, self.pm) {
                (12, false) => 0,
                (12, true) => 12,
                (h, false) => h,
                (h, true) => h + 12,
            },
        }
    }

    /// Stores a 24-hour clock hour (0-23) in the active representation.
    fn set_hour24(&mut self, hour: u8) {
        match self.repr {
            TimeRepresentation::TwentyFourHour => {
                self.hours = hour;
                self.pm = false;
            }
            TimeRepresentation::TwelveHour => {
                let (hours, pm) = match hour {
                    0 => (12, false),
                    1..=11 => (hour, false),
                    12 => (12, true),
                    _ => (hour - 12, true),
                };
                self.hours = hours;
                self.pm = pm;
            }
        }
    }

    fn increment_minute(&mut self) {
        self.minutes += 1;
        if self.minutes == 60 {
            self.minutes = 0;
            self.increment_hour();
        }
    }

    fn decrement_minute(&mut self) {
        if self.minutes == 0 {
            self.minutes = 59;
            self.decrement_hour();
        } else {
            self.minutes -= 1;
        }
    }

    fn increment_hour(&mut self) {
        match self.repr {
            TimeRepresentation::TwentyFourHour => {
                self.hours = (self.hours + 1) % 24;
            }
            TimeRepresentation::TwelveHour => match self.hours {
                11 => {
                    self.hours = 12;
                    self.pm = !self.pm;
                }
                12 => self.hours = 1,
                _ => self.hours += 1,
            },
        }
    }

    fn decrement_hour(&mut self) {
        match self.repr {
            TimeRepresentation::TwentyFourHour => {
                self.hours = if self.hours == 0 { 23 } else { self.hours - 1 };
            }
            TimeRepresentation::TwelveHour => match self.hours {
                12 => {
                    self.hours = 11;
                    self.pm = !self.pm;
                }
                1 => self.hours = 12,
                _ => self.hours -= 1,
            },
        }
    }
}

impl From<TimeOfDay> for NaiveTime {
    fn from(time: TimeOfDay) -> Self {
        // Every mutator keeps the fields normalized, so the projection is
        // always in range.
        NaiveTime::from_hms_opt(
            u32::from(time.hour24()),
            u32::from(time.minutes),
            u32::from(time.seconds),
        )
        .unwrap_or(NaiveTime::MIN)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for TimeOfDay {
    fn format(&self, f: defmt::Formatter) {
        match self.repr {
            TimeRepresentation::TwentyFourHour => {
                defmt::write!(f, "{}:{}:{}", self.hours, self.minutes, self.seconds);
            }
            TimeRepresentation::TwelveHour => {
                defmt::write!(
                    f,
                    "{}:{}:{} {}",
                    self.hours,
                    self.minutes,
                    self.seconds,
                    if self.pm { "PM" } else { "AM" }
                );
            }
        }
    }
}
