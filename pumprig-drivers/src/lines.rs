//! Pin-backed output lines
//!
//! Maps logical channels onto GPIO pins, applying the polarity from the
//! channel map. The direction line is driven like any other output.

use pumprig_core::config::{Channel, ChannelMap, PinConfig};
use pumprig_core::error::HardwareFault;
use pumprig_core::traits::OutputLines;
use pumprig_hal::OutputPin;

/// Output pins, one per channel
pub struct LinePins<P> {
    pub motor_pwm: P,
    pub motor_direction: P,
    pub solenoid_enable: P,
    pub solenoid_pwm: P,
    /// Boards without a status LED leave this empty
    pub status_led: Option<P>,
}

struct Line<P> {
    pin: P,
    config: PinConfig,
}

impl<P: OutputPin> Line<P> {
    fn drive(&mut self, channel: Channel, active: bool) -> Result<(), HardwareFault> {
        self.pin
            .set_state(self.config.level_for(active))
            .map_err(|_| HardwareFault::Write(channel))
    }
}

/// Output lines backed by GPIO pins
pub struct PinLines<P> {
    motor_pwm: Line<P>,
    motor_direction: Line<P>,
    solenoid_enable: Line<P>,
    solenoid_pwm: Line<P>,
    status_led: Option<Line<P>>,
}

impl<P: OutputPin> PinLines<P> {
    /// Bind pins to channels and drive every line inactive
    ///
    /// A status LED pin is only used when the channel map names one.
    pub fn new(map: &ChannelMap, pins: LinePins<P>) -> Result<Self, HardwareFault> {
        let status_led = match (map.status_led, pins.status_led) {
            (Some(config), Some(pin)) => Some(Line { pin, config }),
            _ => None,
        };

        let mut lines = Self {
            motor_pwm: Line {
                pin: pins.motor_pwm,
                config: map.motor_pwm,
            },
            motor_direction: Line {
                pin: pins.motor_direction,
                config: map.motor_direction,
            },
            solenoid_enable: Line {
                pin: pins.solenoid_enable,
                config: map.solenoid_enable,
            },
            solenoid_pwm: Line {
                pin: pins.solenoid_pwm,
                config: map.solenoid_pwm,
            },
            status_led,
        };
        lines.all_off()?;
        Ok(lines)
    }

    fn line_mut(&mut self, channel: Channel) -> Option<&mut Line<P>> {
        match channel {
            Channel::MotorPwm => Some(&mut self.motor_pwm),
            Channel::MotorDirection => Some(&mut self.motor_direction),
            Channel::SolenoidEnable => Some(&mut self.solenoid_enable),
            Channel::SolenoidPwm => Some(&mut self.solenoid_pwm),
            Channel::StatusLed => self.status_led.as_mut(),
            Channel::Button => None,
        }
    }
}

impl<P: OutputPin> OutputLines for PinLines<P> {
    fn set_line(&mut self, channel: Channel, active: bool) -> Result<(), HardwareFault> {
        match self.line_mut(channel) {
            Some(line) => line.drive(channel, active),
            None => Err(HardwareFault::Write(channel)),
        }
    }

    fn has_line(&self, channel: Channel) -> bool {
        match channel {
            Channel::StatusLed => self.status_led.is_some(),
            Channel::Button => false,
            _ => true,
        }
    }
}
