//! Types and traits for communicating with Sigma Koki stage controllers over
//! their line-oriented ASCII ("SHOT") protocol.
//!
//! ## Communicating with a controller
//!
//! All communication starts with a [`Port`], which wraps a serial port:
//!
//! ```rust
//! # use skproto::{error::ShotError, shot::Port};
//! # fn wrapper() -> Result<(), ShotError> {
//! let mut port = Port::open_serial("/dev/ttyUSB0")?;
//! # Ok(())
//! # }
//! ```
//!
//! The port is parameterized by the controller model, which fixes the
//! pulse ratio and the speed/acceleration limits used to validate commands.
//! The default model is the [`Sc101g`]; select another with
//! [`into_model`](Port::into_model):
//!
//! ```rust
//! # use skproto::{error::ShotError, shot::{Port, Shot302gs}};
//! # fn wrapper() -> Result<(), ShotError> {
//! let mut port = Port::open_serial("/dev/ttyUSB0")?.into_model::<Shot302gs>();
//! port.home()?; // only SHOT-302GS class controllers implement `H:`
//! # Ok(())
//! # }
//! ```
//!
//! Motion commands validate their arguments against the model's limits
//! before anything is written to the controller, and queries parse the
//! controller's reply into structured types:
//!
//! ```rust
//! # use skproto::{backend::Backend, error::ShotError, shot::Port};
//! # fn wrapper<B: Backend>(mut port: Port<B>) -> Result<(), ShotError> {
//! port.set_speed(10_000.0, 10_000.0)?;
//! port.move_relative(1500.7, -200.0)?; // sends `M:W+P1500-P200` then `G`
//! let status = port.status()?;
//! if status.error.is_ok() && status.positioning.is_ready() {
//!     println!("settled at {} µm", port.position()?);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Offline mode
//!
//! A port without a bound backend ([`Port::offline`]) accepts every command
//! as a no-op and answers every receive with a fixed placeholder line. This
//! is how command construction and validation are exercised without
//! hardware.

mod command;
mod model;
mod port;
mod status;

pub use model::*;
pub use port::*;
pub use status::*;

use crate::error::InvalidStopTargetError;

/// One of the two motion axes of a controller.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Axis {
	/// The first (X) axis, `1` on the wire.
	First,
	/// The second (Y) axis, `2` on the wire.
	Second,
}

impl Axis {
	/// Get the axis number as transmitted on the wire.
	pub const fn number(self) -> u8 {
		match self {
			Axis::First => 1,
			Axis::Second => 2,
		}
	}
}

impl std::fmt::Display for Axis {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.number())
	}
}

/// The target of a stop (`L:`) command.
///
/// Selectors other than the four listed here do not exist on the wire, so an
/// invalid stop target is unrepresentable. Use the `TryFrom<char>` impl when
/// starting from a raw selector character.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum StopTarget {
	/// Decelerate and stop one axis.
	Axis(Axis),
	/// Decelerate and stop both axes (`W` on the wire).
	Both,
	/// Stop both axes immediately, without deceleration (`E` on the wire).
	Emergency,
}

impl From<Axis> for StopTarget {
	fn from(axis: Axis) -> Self {
		StopTarget::Axis(axis)
	}
}

impl TryFrom<char> for StopTarget {
	type Error = InvalidStopTargetError;

	fn try_from(selector: char) -> Result<Self, Self::Error> {
		match selector {
			'1' => Ok(StopTarget::Axis(Axis::First)),
			'2' => Ok(StopTarget::Axis(Axis::Second)),
			'W' => Ok(StopTarget::Both),
			'E' => Ok(StopTarget::Emergency),
			other => Err(InvalidStopTargetError::new(other)),
		}
	}
}

impl std::fmt::Display for StopTarget {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			StopTarget::Axis(axis) => write!(f, "{axis}"),
			StopTarget::Both => write!(f, "W"),
			StopTarget::Emergency => write!(f, "E"),
		}
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn stop_target_selectors() {
		assert_eq!(StopTarget::try_from('1'), Ok(StopTarget::Axis(Axis::First)));
		assert_eq!(
			StopTarget::try_from('2'),
			Ok(StopTarget::Axis(Axis::Second))
		);
		assert_eq!(StopTarget::try_from('W'), Ok(StopTarget::Both));
		assert_eq!(StopTarget::try_from('E'), Ok(StopTarget::Emergency));
		for invalid in ['X', '3', '0', 'w', 'e', ' '] {
			assert!(StopTarget::try_from(invalid).is_err(), "{invalid}");
		}
	}

	#[test]
	fn stop_target_display() {
		assert_eq!(StopTarget::Axis(Axis::First).to_string(), "1");
		assert_eq!(StopTarget::Axis(Axis::Second).to_string(), "2");
		assert_eq!(StopTarget::Both.to_string(), "W");
		assert_eq!(StopTarget::Emergency.to_string(), "E");
	}
}
