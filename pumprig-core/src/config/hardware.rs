//! Hardware configuration types
//!
//! The rig logic only ever talks about logical channels. Which physical
//! pin backs each channel, and whether it is active-low, is injected at
//! startup through a [`ChannelMap`].

use crate::error::ConfigError;

/// Logical rig channels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Channel {
    /// Bit-banged PWM line driving the motor/coil
    MotorPwm,
    /// Motor direction line
    MotorDirection,
    /// Solenoid valve enable
    SolenoidEnable,
    /// Solenoid valve PWM line (driven full-on)
    SolenoidPwm,
    /// Status LED used by the halt loop
    StatusLed,
    /// Mode push-button (input)
    Button,
}

impl Channel {
    /// All output channels, in the order they are de-energised
    pub const OUTPUTS: [Channel; 5] = [
        Channel::MotorPwm,
        Channel::SolenoidPwm,
        Channel::SolenoidEnable,
        Channel::MotorDirection,
        Channel::StatusLed,
    ];

    /// Short name for logs and config keys
    pub const fn name(&self) -> &'static str {
        match self {
            Channel::MotorPwm => "motor_pwm",
            Channel::MotorDirection => "motor_direction",
            Channel::SolenoidEnable => "solenoid_enable",
            Channel::SolenoidPwm => "solenoid_pwm",
            Channel::StatusLed => "status_led",
            Channel::Button => "button",
        }
    }

    /// Look up a channel by its config key
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "motor_pwm" => Some(Channel::MotorPwm),
            "motor_direction" => Some(Channel::MotorDirection),
            "solenoid_enable" => Some(Channel::SolenoidEnable),
            "solenoid_pwm" => Some(Channel::SolenoidPwm),
            "status_led" => Some(Channel::StatusLed),
            "button" => Some(Channel::Button),
            _ => None,
        }
    }

    /// Check if this channel is an output
    pub const fn is_output(&self) -> bool {
        !matches!(self, Channel::Button)
    }
}

/// Pin configuration with optional inversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinConfig {
    /// GPIO pin number
    pub pin: u8,
    /// Pin is active-low (inverted)
    pub inverted: bool,
    /// Enable internal pull-up
    pub pull_up: bool,
}

impl PinConfig {
    /// Create a new active-high pin config
    pub const fn new(pin: u8) -> Self {
        Self {
            pin,
            inverted: false,
            pull_up: false,
        }
    }

    /// Create an inverted (active-low) pin
    pub const fn inverted(pin: u8) -> Self {
        Self {
            pin,
            inverted: true,
            pull_up: false,
        }
    }

    /// Create a pin with pull-up enabled
    pub const fn with_pullup(pin: u8) -> Self {
        Self {
            pin,
            inverted: false,
            pull_up: true,
        }
    }

    /// Physical level for a logical state
    pub const fn level_for(&self, active: bool) -> bool {
        active != self.inverted
    }
}

/// Logical channel to physical pin mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelMap {
    pub motor_pwm: PinConfig,
    pub motor_direction: PinConfig,
    pub solenoid_enable: PinConfig,
    pub solenoid_pwm: PinConfig,
    /// Status LED is optional; the halt loop just idles without it
    pub status_led: Option<PinConfig>,
    pub button: PinConfig,
}

impl Default for ChannelMap {
    /// Wiring of the reference rig (Pico carrier board)
    fn default() -> Self {
        Self {
            motor_pwm: PinConfig::new(2),
            motor_direction: PinConfig::new(3),
            solenoid_enable: PinConfig::new(6),
            solenoid_pwm: PinConfig::new(7),
            status_led: Some(PinConfig::new(25)),
            button: PinConfig {
                pin: 14,
                inverted: true,
                pull_up: true,
            },
        }
    }
}

impl ChannelMap {
    /// Pin configuration for a channel, if mapped
    pub fn get(&self, channel: Channel) -> Option<PinConfig> {
        match channel {
            Channel::MotorPwm => Some(self.motor_pwm),
            Channel::MotorDirection => Some(self.motor_direction),
            Channel::SolenoidEnable => Some(self.solenoid_enable),
            Channel::SolenoidPwm => Some(self.solenoid_pwm),
            Channel::StatusLed => self.status_led,
            Channel::Button => Some(self.button),
        }
    }

    /// Replace the pin configuration for a channel
    pub fn set(&mut self, channel: Channel, pin: PinConfig) {
        match channel {
            Channel::MotorPwm => self.motor_pwm = pin,
            Channel::MotorDirection => self.motor_direction = pin,
            Channel::SolenoidEnable => self.solenoid_enable = pin,
            Channel::SolenoidPwm => self.solenoid_pwm = pin,
            Channel::StatusLed => self.status_led = Some(pin),
            Channel::Button => self.button = pin,
        }
    }

    /// Check that no physical pin backs two channels
    pub fn validate(&self) -> Result<(), ConfigError> {
        const ALL: [Channel; 6] = [
            Channel::MotorPwm,
            Channel::MotorDirection,
            Channel::SolenoidEnable,
            Channel::SolenoidPwm,
            Channel::StatusLed,
            Channel::Button,
        ];

        let mut seen = [false; 256];
        for channel in ALL {
            if let Some(cfg) = self.get(channel) {
                let slot = &mut seen[cfg.pin as usize];
                if *slot {
                    return Err(ConfigError::DuplicatePin(cfg.pin));
                }
                *slot = true;
            }
        }
        Ok(())
    }
}
