//! Typed register access and motion verbs over a [`Transport`].

use std::net::TcpStream;
use std::str::FromStr;

use crate::config::units::Steps;
use crate::error::{ProtocolError, Result};
use crate::transport::{ConnectionState, Link, Response, Transport, TransportSettings};

use super::variable::{
    assignment_command, query_command, registers, VariableValue, HOME_COMMAND, PAUSE_COMMAND,
};

/// MCode stepper controller.
///
/// Holds no state of its own beyond the transport. Values are in controller
/// units (steps, steps/s, steps/s²); converting from millimeters is the
/// caller's job (see [`crate::config::StageMechanics`]). Nothing here polls or
/// waits for motion to finish.
pub struct Controller<S: Link = TcpStream> {
    transport: Transport<S>,
}

impl Controller<TcpStream> {
    /// Create a disconnected controller with the given socket settings.
    pub fn new(settings: TransportSettings) -> Self {
        Self::from_transport(Transport::new(settings))
    }

    /// Open the connection, closing any existing one first.
    pub fn connect(&mut self, host: &str, port: u16) -> Result<()> {
        self.transport.connect(host, port)
    }
}

impl<S: Link> Controller<S> {
    /// Wrap an existing transport.
    pub fn from_transport(transport: Transport<S>) -> Self {
        Self { transport }
    }

    /// Close the connection. Safe to call repeatedly.
    pub fn close(&mut self) {
        self.transport.close();
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        self.transport.state()
    }

    /// True while connected.
    pub fn is_connected(&self) -> bool {
        self.transport.is_connected()
    }

    /// The underlying transport.
    pub fn transport(&self) -> &Transport<S> {
        &self.transport
    }

    /// Send a raw command (e.g. `CW=255`, `TE=0`) and return the validated response.
    pub fn send_command(&mut self, command: &str) -> Result<Response> {
        self.transport.send_command(command)
    }

    /// Read a register as text.
    ///
    /// # Errors
    ///
    /// [`ProtocolError::MissingValue`] if the reply carries only the echo line.
    pub fn read_variable(&mut self, name: &str) -> Result<String> {
        let command = query_command(name);
        let mut response = self.transport.send_command(&command)?;
        if response.lines.len() < 2 {
            return Err(ProtocolError::MissingValue {
                command,
                lines: response.lines,
            }
            .into());
        }
        Ok(response.lines.swap_remove(1))
    }

    /// Write a register. Sequences are sent comma-joined.
    pub fn write_variable(&mut self, name: &str, value: impl Into<VariableValue>) -> Result<()> {
        let command = assignment_command(name, &value.into());
        self.transport.send_command(&command)?;
        Ok(())
    }

    fn read_parsed<T: FromStr>(&mut self, name: &str) -> Result<T> {
        let value = self.read_variable(name)?;
        parse_field(name, &value)
    }

    /// Maximum velocity (`VM`).
    pub fn max_velocity(&mut self) -> Result<i64> {
        self.read_parsed(registers::MAX_VELOCITY)
    }

    /// Set maximum velocity (`VM`).
    pub fn set_max_velocity(&mut self, value: i64) -> Result<()> {
        self.write_variable(registers::MAX_VELOCITY, value)
    }

    /// Initial velocity (`VI`).
    pub fn initial_velocity(&mut self) -> Result<i64> {
        self.read_parsed(registers::INITIAL_VELOCITY)
    }

    /// Set initial velocity (`VI`).
    pub fn set_initial_velocity(&mut self, value: i64) -> Result<()> {
        self.write_variable(registers::INITIAL_VELOCITY, value)
    }

    /// Acceleration (`A`).
    pub fn acceleration(&mut self) -> Result<i64> {
        self.read_parsed(registers::ACCELERATION)
    }

    /// Set acceleration (`A`).
    pub fn set_acceleration(&mut self, value: i64) -> Result<()> {
        self.write_variable(registers::ACCELERATION, value)
    }

    /// Deceleration (`D`).
    pub fn deceleration(&mut self) -> Result<i64> {
        self.read_parsed(registers::DECELERATION)
    }

    /// Set deceleration (`D`).
    pub fn set_deceleration(&mut self, value: i64) -> Result<()> {
        self.write_variable(registers::DECELERATION, value)
    }

    /// Trip position (`TP`), first field only.
    pub fn trip_position(&mut self) -> Result<Steps> {
        let value = self.read_variable(registers::TRIP_POSITION)?;
        let first = value.split(',').next().unwrap_or_default();
        parse_field(registers::TRIP_POSITION, first).map(Steps)
    }

    /// Set trip position (`TP=<position>,0`).
    pub fn set_trip_position(&mut self, position: Steps) -> Result<()> {
        self.write_variable(registers::TRIP_POSITION, (position, 0))
    }

    /// Move counter (`C1`).
    pub fn counter(&mut self) -> Result<i64> {
        self.read_parsed(registers::COUNTER)
    }

    /// Set move counter (`C1`).
    pub fn set_counter(&mut self, value: i64) -> Result<()> {
        self.write_variable(registers::COUNTER, value)
    }

    /// Microstep resolution (`MS`).
    pub fn microsteps(&mut self) -> Result<i64> {
        self.read_parsed(registers::MICROSTEPS)
    }

    /// Moving flag (`MV`). Any non-zero value means moving.
    pub fn is_moving(&mut self) -> Result<bool> {
        self.read_parsed::<i64>(registers::MOVING).map(|v| v != 0)
    }

    /// Start the homing routine (`HM 1`). Returns once the controller acknowledges.
    pub fn home(&mut self) -> Result<()> {
        self.transport.send_command(HOME_COMMAND)?;
        Ok(())
    }

    /// Pause motion (`PS`).
    pub fn pause(&mut self) -> Result<()> {
        self.transport.send_command(PAUSE_COMMAND)?;
        Ok(())
    }

    /// Start a move to an absolute position (`MA`).
    pub fn move_absolute(&mut self, position: Steps) -> Result<()> {
        self.write_variable(registers::MOVE_ABSOLUTE, position)
    }

    /// Start a relative move (`MR`).
    pub fn move_relative(&mut self, distance: Steps) -> Result<()> {
        self.write_variable(registers::MOVE_RELATIVE, distance)
    }
}

fn parse_field<T: FromStr>(register: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        ProtocolError::InvalidValue {
            register: register.to_owned(),
            value: value.to_owned(),
        }
        .into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::transport::mock::{ScriptedLink, Wire};

    fn controller(replies: &[&str]) -> (Controller<ScriptedLink>, Wire) {
        let (link, wire) = ScriptedLink::replies(replies);
        let transport = Transport::from_stream(link, TransportSettings::default()).unwrap();
        (Controller::from_transport(transport), wire)
    }

    #[test]
    fn test_read_variable_returns_value_line() {
        let (mut c, wire) = controller(&["PR VM\r\n768000\r\n>"]);
        assert_eq!(c.read_variable("VM").unwrap(), "768000");
        assert_eq!(wire.written_text(), "PR VM\r");
    }

    #[test]
    fn test_read_variable_without_value_line() {
        let (mut c, _) = controller(&["PR VM\r\n>"]);
        let err = c.read_variable("VM").unwrap_err();
        match err {
            Error::Protocol(ProtocolError::MissingValue { command, lines }) => {
                assert_eq!(command, "PR VM");
                assert_eq!(lines, vec!["PR VM"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_write_trip_position_two_fields() {
        let (mut c, wire) = controller(&["TP=500,0\r\n>"]);
        c.set_trip_position(Steps(500)).unwrap();
        assert_eq!(wire.written_text(), "TP=500,0\r");
    }

    #[test]
    fn test_write_variable_sequence() {
        let (mut c, wire) = controller(&["OS=1,23,0\r\n>"]);
        c.write_variable("OS", [1, 23, 0]).unwrap();
        assert_eq!(wire.written_text(), "OS=1,23,0\r");
    }

    #[test]
    fn test_trip_position_reads_first_field() {
        let (mut c, _) = controller(&["PR TP\r\n-1200,0\r\n>"]);
        assert_eq!(c.trip_position().unwrap(), Steps(-1200));
    }

    #[test]
    fn test_is_moving_truth_test() {
        let (mut c, _) = controller(&[
            "PR MV\r\n0\r\n>",
            "PR MV\r\n1\r\n>",
            "PR MV\r\n-3\r\n>",
        ]);
        assert!(!c.is_moving().unwrap());
        assert!(c.is_moving().unwrap());
        assert!(c.is_moving().unwrap());
    }

    #[test]
    fn test_unparsable_value() {
        let (mut c, _) = controller(&["PR MS\r\nabc\r\n>"]);
        assert!(matches!(
            c.microsteps(),
            Err(Error::Protocol(ProtocolError::InvalidValue { ref register, .. })) if register == "MS"
        ));
    }

    #[test]
    fn test_typed_getters() {
        let (mut c, wire) = controller(&[
            "PR VI\r\n1000\r\n>",
            "PR A\r\n50000\r\n>",
            "PR D\r\n40000\r\n>",
            "PR C1\r\n0\r\n>",
        ]);
        assert_eq!(c.initial_velocity().unwrap(), 1000);
        assert_eq!(c.acceleration().unwrap(), 50000);
        assert_eq!(c.deceleration().unwrap(), 40000);
        assert_eq!(c.counter().unwrap(), 0);
        assert_eq!(wire.written_text(), "PR VI\rPR A\rPR D\rPR C1\r");
    }

    #[test]
    fn test_verbs_and_moves() {
        let (mut c, wire) = controller(&[
            "HM 1\r\n>",
            "PS\r\n>",
            "MA=1612\r\n>",
            "MR=-16\r\n>",
        ]);
        c.home().unwrap();
        c.pause().unwrap();
        c.move_absolute(Steps(1612)).unwrap();
        c.move_relative(Steps(-16)).unwrap();
        assert_eq!(wire.written_text(), "HM 1\rPS\rMA=1612\rMR=-16\r");
    }

    #[test]
    fn test_operations_require_connection() {
        let (mut c, _) = controller(&[]);
        c.close();
        assert_eq!(c.state(), ConnectionState::Disconnected);
        let err = c.max_velocity().unwrap_err();
        assert!(err.is_programming_error());
        assert!(matches!(c.home(), Err(Error::NotConnected)));
    }
}
