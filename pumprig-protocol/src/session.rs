//! Configuration session state machine

use heapless::Vec;

use crate::{ACK, ANNOUNCE, START_MARKER, TERMINATOR};

/// Settings received from the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PulseSettings {
    /// Motor duty (0-99%)
    pub duty_percent: u8,
    /// Number of PWM periods to emit (0-99)
    pub pulses: u8,
}

/// Session errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SessionError {
    /// Byte fed after the session completed; reset first
    AlreadyComplete,
}

impl core::fmt::Display for SessionError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::AlreadyComplete => write!(f, "session already complete"),
        }
    }
}

/// What to do after feeding one byte
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Reply {
    /// Bytes to transmit, in order
    pub bytes: Vec<u8, 3>,
    /// Set on the byte that completes the session
    pub settings: Option<PulseSettings>,
}

impl Reply {
    fn none() -> Self {
        Self::default()
    }

    fn send(data: &[u8]) -> Self {
        let mut bytes = Vec::new();
        // Replies never exceed three bytes
        let _ = bytes.extend_from_slice(data);
        Self {
            bytes,
            settings: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Duty,
    Pulses,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Tens,
    Units { tens: u8 },
    Terminator { value: u8, matched: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    AwaitStart,
    Announce,
    Reading { field: Field, stage: Stage },
    Complete(PulseSettings),
}

/// Byte-fed configuration session
#[derive(Debug, Clone)]
pub struct ConfigSession {
    state: State,
    duty_percent: u8,
}

impl Default for ConfigSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigSession {
    /// Create a session waiting for the start marker
    pub fn new() -> Self {
        Self {
            state: State::AwaitStart,
            duty_percent: 0,
        }
    }

    /// Return to waiting for the start marker
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Settings, once the session has completed
    pub fn settings(&self) -> Option<PulseSettings> {
        match self.state {
            State::Complete(settings) => Some(settings),
            _ => None,
        }
    }

    /// Feed one received byte
    pub fn feed(&mut self, byte: u8) -> Result<Reply, SessionError> {
        match self.state {
            State::AwaitStart => {
                if byte == START_MARKER {
                    self.state = State::Announce;
                    return Ok(Reply::send(ANNOUNCE));
                }
                Ok(Reply::none())
            }
            State::Announce => {
                if byte == ACK {
                    self.state = State::Reading {
                        field: Field::Duty,
                        stage: Stage::Tens,
                    };
                    return Ok(Reply::none());
                }
                Ok(Reply::send(ANNOUNCE))
            }
            State::Reading { field, stage } => Ok(self.read_field(field, stage, byte)),
            State::Complete(_) => Err(SessionError::AlreadyComplete),
        }
    }

    fn read_field(&mut self, field: Field, stage: Stage, byte: u8) -> Reply {
        let restart = State::Reading {
            field,
            stage: Stage::Tens,
        };

        match stage {
            Stage::Tens => match digit(byte) {
                Some(tens) => {
                    self.state = State::Reading {
                        field,
                        stage: Stage::Units { tens },
                    };
                    Reply::send(&[byte])
                }
                None => {
                    self.state = restart;
                    Reply::none()
                }
            },
            Stage::Units { tens } => match digit(byte) {
                Some(units) => {
                    self.state = State::Reading {
                        field,
                        stage: Stage::Terminator {
                            value: tens * 10 + units,
                            matched: 0,
                        },
                    };
                    Reply::send(&[byte])
                }
                None => {
                    self.state = restart;
                    Reply::none()
                }
            },
            Stage::Terminator { value, matched } => {
                if byte != TERMINATOR[matched] {
                    self.state = restart;
                    return Reply::none();
                }
                if matched + 1 < TERMINATOR.len() {
                    self.state = State::Reading {
                        field,
                        stage: Stage::Terminator {
                            value,
                            matched: matched + 1,
                        },
                    };
                    return Reply::none();
                }
                self.commit(field, value)
            }
        }
    }

    fn commit(&mut self, field: Field, value: u8) -> Reply {
        match field {
            Field::Duty => {
                self.duty_percent = value;
                self.state = State::Reading {
                    field: Field::Pulses,
                    stage: Stage::Tens,
                };
                Reply::none()
            }
            Field::Pulses => {
                let settings = PulseSettings {
                    duty_percent: self.duty_percent,
                    pulses: value,
                };
                self.state = State::Complete(settings);
                Reply {
                    bytes: Vec::new(),
                    settings: Some(settings),
                }
            }
        }
    }
}

fn digit(byte: u8) -> Option<u8> {
    byte.is_ascii_digit().then(|| byte - b'0')
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Feed a byte string, collecting everything transmitted
    fn feed_all(session: &mut ConfigSession, input: &[u8]) -> (Vec<u8, 64>, Option<PulseSettings>) {
        let mut sent = Vec::new();
        let mut settings = None;
        for &byte in input {
            let reply = session.feed(byte).unwrap();
            sent.extend_from_slice(&reply.bytes).unwrap();
            if reply.settings.is_some() {
                settings = reply.settings;
            }
        }
        (sent, settings)
    }

    #[test]
    fn test_full_session() {
        let mut session = ConfigSession::new();
        let (sent, settings) = feed_all(&mut session, b"x914552307523");

        assert_eq!(&sent[..], b"9134507");
        assert_eq!(
            settings,
            Some(PulseSettings {
                duty_percent: 45,
                pulses: 7
            })
        );
        assert_eq!(session.settings(), settings);
    }

    #[test]
    fn test_announce_repeats_until_ack() {
        let mut session = ConfigSession::new();
        let (sent, _) = feed_all(&mut session, b"9zz");
        assert_eq!(&sent[..], b"913913913");

        assert!(session.feed(ACK).unwrap().bytes.is_empty());
        // Acknowledged: digits are echoed, the marker no longer re-announces
        assert_eq!(&session.feed(b'9').unwrap().bytes[..], b"9");
    }

    #[test]
    fn test_stray_terminator_byte_restarts_pulse_field() {
        let mut session = ConfigSession::new();
        // Pulses 07 followed by "55": the second '5' breaks the terminator
        let (sent, settings) = feed_all(&mut session, b"x9145523075523");
        assert_eq!(&sent[..], b"913450723");
        assert_eq!(settings, None);

        // "23" was taken as the new pulse count
        let (sent, settings) = feed_all(&mut session, b"523");
        assert!(sent.is_empty());
        assert_eq!(
            settings,
            Some(PulseSettings {
                duty_percent: 45,
                pulses: 23
            })
        );
    }

    #[test]
    fn test_bad_terminator_restarts_field() {
        let mut session = ConfigSession::new();
        // Duty 12 with a broken terminator, then 34 properly
        let (sent, settings) = feed_all(&mut session, b"91125x34523");
        assert_eq!(&sent[..], b"9131234");
        assert_eq!(settings, None);

        let (_, settings) = feed_all(&mut session, b"99523");
        assert_eq!(
            settings,
            Some(PulseSettings {
                duty_percent: 34,
                pulses: 99
            })
        );
    }

    #[test]
    fn test_non_digit_restarts_without_echo() {
        let mut session = ConfigSession::new();
        feed_all(&mut session, b"91");

        assert!(session.feed(b'a').unwrap().bytes.is_empty());
        assert_eq!(&session.feed(b'4').unwrap().bytes[..], b"4");
        // Non-digit in the units position drops the tens digit too
        assert!(session.feed(b'-').unwrap().bytes.is_empty());

        let (_, settings) = feed_all(&mut session, b"6052310523");
        assert_eq!(
            settings,
            Some(PulseSettings {
                duty_percent: 60,
                pulses: 10
            })
        );
    }

    #[test]
    fn test_complete_rejects_bytes_until_reset() {
        let mut session = ConfigSession::new();
        feed_all(&mut session, b"910052300523");

        assert_eq!(session.feed(b'9'), Err(SessionError::AlreadyComplete));

        session.reset();
        assert_eq!(session.settings(), None);
        assert_eq!(&session.feed(b'9').unwrap().bytes[..], ANNOUNCE);
    }

    proptest! {
        #[test]
        fn prop_any_two_digit_values(duty in 0u8..100, pulses in 0u8..100) {
            let mut input: Vec<u8, 16> = Vec::new();
            input.extend_from_slice(b"91").unwrap();
            input.push(b'0' + duty / 10).unwrap();
            input.push(b'0' + duty % 10).unwrap();
            input.extend_from_slice(TERMINATOR).unwrap();
            input.push(b'0' + pulses / 10).unwrap();
            input.push(b'0' + pulses % 10).unwrap();
            input.extend_from_slice(TERMINATOR).unwrap();

            let mut session = ConfigSession::new();
            let (_, settings) = feed_all(&mut session, &input);
            prop_assert_eq!(settings, Some(PulseSettings { duty_percent: duty, pulses }));
        }
    }
}
