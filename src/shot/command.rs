//! Construction of SHOT protocol command lines.

use crate::shot::{Axis, StopTarget};
use std::io;

/// How a move command interprets its coordinates.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub(crate) enum MoveMode {
	/// Move to an absolute coordinate (`A:` on the wire).
	Absolute,
	/// Move by a relative offset (`M:` on the wire).
	Relative,
}

impl MoveMode {
	/// The command keyword for this mode.
	fn keyword(self) -> char {
		match self {
			MoveMode::Absolute => 'A',
			MoveMode::Relative => 'M',
		}
	}
}

/// A single SHOT command line, ready to be written to a controller.
///
/// `write_into` produces the line without its terminator; the
/// [`Port`](crate::shot::Port) appends `\r\n` when sending. A command is
/// immutable once built and is constructed fresh for every operation.
#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) enum Command {
	/// `RESET:` — reset the controller.
	Reset,
	/// `SRQ:` — query the controller status.
	StatusQuery,
	/// `P:W` — query the position counters.
	PositionQuery,
	/// `G` — begin the previously set motion.
	Go,
	/// `A:W.../M:W...` — set an absolute/relative motion target, in µm.
	Move {
		/// Absolute or relative coordinates.
		mode: MoveMode,
		/// First axis coordinate, in µm.
		x: f64,
		/// Second axis coordinate, in µm.
		y: f64,
	},
	/// `L:<target>` — stop one axis, both axes, or everything (emergency).
	Stop(StopTarget),
	/// `D:WF<v1>F<v2>` — set the speed of both axes, in µm/s.
	Speed {
		/// First axis speed, in µm/s.
		v1: f64,
		/// Second axis speed, in µm/s.
		v2: f64,
	},
	/// `ACC:<axis> <ms>` — set one axis's acceleration ramp time.
	Acceleration {
		/// The axis to configure.
		axis: Axis,
		/// The ramp time, in ms.
		ramp_ms: u32,
	},
	/// `H:W` — return both axes to the mechanical origin.
	Home,
	/// `R:<axis>` — zero the given axis's position counter.
	SetLogicalOrigin(Axis),
	/// `C:W1`/`C:W0` — energize or free the motors.
	Excitation(bool),
}

impl Command {
	/// Write the command line (without terminator) into the specified writer.
	pub(crate) fn write_into<W: io::Write + ?Sized>(&self, writer: &mut W) -> io::Result<()> {
		match *self {
			Command::Reset => write!(writer, "RESET:"),
			Command::StatusQuery => write!(writer, "SRQ:"),
			Command::PositionQuery => write!(writer, "P:W"),
			Command::Go => write!(writer, "G"),
			Command::Move { mode, x, y } => {
				write!(writer, "{}:W", mode.keyword())?;
				write_signed_pulses(writer, x)?;
				write_signed_pulses(writer, y)
			}
			Command::Stop(target) => write!(writer, "L:{target}"),
			Command::Speed { v1, v2 } => {
				write!(writer, "D:WF{}F{}", v1.trunc() as u64, v2.trunc() as u64)
			}
			Command::Acceleration { axis, ramp_ms } => {
				write!(writer, "ACC:{axis} {ramp_ms}")
			}
			Command::Home => write!(writer, "H:W"),
			Command::SetLogicalOrigin(axis) => write!(writer, "R:{axis}"),
			Command::Excitation(on) => write!(writer, "C:W{}", u8::from(on)),
		}
	}
}

/// Write one coordinate as a `<sign>P<magnitude>` token.
///
/// The sign is `+` for non-negative values and the magnitude is truncated
/// toward zero, so `-200.7` becomes `-P200`.
fn write_signed_pulses<W: io::Write + ?Sized>(writer: &mut W, value: f64) -> io::Result<()> {
	let sign = if value >= 0.0 { '+' } else { '-' };
	write!(writer, "{}P{}", sign, value.trunc().abs() as u64)
}

#[cfg(test)]
mod test {
	use super::*;

	fn line(command: Command) -> String {
		let mut buf = Vec::new();
		command.write_into(&mut buf).unwrap();
		String::from_utf8(buf).unwrap()
	}

	#[test]
	fn move_commands() {
		assert_eq!(
			line(Command::Move {
				mode: MoveMode::Absolute,
				x: 1500.7,
				y: -200.0,
			}),
			"A:W+P1500-P200"
		);
		assert_eq!(
			line(Command::Move {
				mode: MoveMode::Relative,
				x: 0.0,
				y: -0.9,
			}),
			"M:W+P0-P0"
		);
		assert_eq!(
			line(Command::Move {
				mode: MoveMode::Absolute,
				x: -123_456.9,
				y: 7.0,
			}),
			"A:W-P123456+P7"
		);
	}

	#[test]
	fn fixed_commands() {
		assert_eq!(line(Command::Reset), "RESET:");
		assert_eq!(line(Command::StatusQuery), "SRQ:");
		assert_eq!(line(Command::PositionQuery), "P:W");
		assert_eq!(line(Command::Go), "G");
		assert_eq!(line(Command::Home), "H:W");
	}

	#[test]
	fn stop_commands() {
		assert_eq!(line(Command::Stop(StopTarget::Axis(Axis::First))), "L:1");
		assert_eq!(line(Command::Stop(StopTarget::Axis(Axis::Second))), "L:2");
		assert_eq!(line(Command::Stop(StopTarget::Both)), "L:W");
		assert_eq!(line(Command::Stop(StopTarget::Emergency)), "L:E");
	}

	#[test]
	fn configuration_commands() {
		assert_eq!(
			line(Command::Speed {
				v1: 1000.9,
				v2: 200_000.0,
			}),
			"D:WF1000F200000"
		);
		assert_eq!(
			line(Command::Acceleration {
				axis: Axis::Second,
				ramp_ms: 1500,
			}),
			"ACC:2 1500"
		);
		assert_eq!(line(Command::SetLogicalOrigin(Axis::First)), "R:1");
		assert_eq!(line(Command::Excitation(true)), "C:W1");
		assert_eq!(line(Command::Excitation(false)), "C:W0");
	}
}
