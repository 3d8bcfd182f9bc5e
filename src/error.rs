//! Error types.
//!
//! Each error is represented by a unique type that implements
//! [`std::error::Error`]. Most APIs can fail in more than one way and so
//! return the higher level [`ShotError`] enum, which all the concrete error
//! types are convertible into, allowing them to be used with `?`:
//!
//! ```
//! use skproto::error::{MalformedStatusError, ShotError};
//!
//! fn foo() -> Result<(), MalformedStatusError> {
//!     // ...
//! # unimplemented!();
//! }
//!
//! fn bar() -> Result<(), ShotError> {
//!     foo()?;
//!     // ...
//! # Ok(())
//! }
//! ```
//!
//! Validation errors ([`SpeedOutOfRangeError`], [`AccelerationOutOfRangeError`],
//! [`InvalidStopTargetError`]) are always raised before any bytes are written
//! to the controller.

use std::io;

/// Implement Error and Display traits for the specified type.
///
/// Define the format string and any arguments it should reference after
/// `self =>` (to abide by macro hygiene rules).
macro_rules! impl_error_display {
	(
		$name:path,
		$self:ident =>
		$display:literal
		$(,
			$($arg:expr),+
		)?
	) => {
		impl std::error::Error for $name {}

		impl std::fmt::Display for $name {
			fn fmt(&$self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
				write!(
					f,
					$display
					$(,
						$($arg),+
					)?
				)
			}
		}
	};
}

/// Define an error enum that contains concrete error types (not other error
/// enums).
///
/// From and TryFrom traits will be implemented between the enum and its
/// underlying errors. The enum's Display implementation will defer to the
/// underlying errors' Display implementations.
macro_rules! error_enum {
	(
		$(#[$attr:meta])*
		pub enum $name:ident {
			$(
				$variant:ident($inner:path)
			),+
			$(,)?
		}
	) => {
		$(
			#[$attr]
		)*
		#[allow(missing_docs)]
		pub enum $name {
			$(
				$variant($inner)
			),+
		}

		impl std::error::Error for $name {}

		// Defer the display to the inner error type
		impl std::fmt::Display for $name {
			fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
				match self {
					$(
						$name::$variant(e) => e.fmt(f)
					),+
				}
			}
		}

		// Allow the enum to be convertible from an infallible error
		impl From<std::convert::Infallible> for $name {
			fn from(_: std::convert::Infallible) -> Self {
				unreachable!();
			}
		}

		// Conversions with underlying errors
		$(
			impl From<$inner> for $name {
				fn from(other: $inner) -> Self {
					$name::$variant(other)
				}
			}

			impl TryFrom<$name> for $inner {
				type Error = $name;
				fn try_from(other: $name) -> Result<Self, Self::Error> {
					match other {
						$name::$variant(value) => Ok(value),
						value => Err(value)
					}
				}
			}
		)+
	};
}

/// The specified device is either disconnected or already in use by another process.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct SerialDeviceInUseOrDisconnectedError(Box<str>);

impl_error_display! {
	SerialDeviceInUseOrDisconnectedError,
	self =>
	"the specified device is either disconnected or already in use by another process: {}", self.0
}

/// A received line contained non-ASCII bytes.
///
/// The controllers only ever transmit ASCII, so this indicates serial line
/// noise or a framing mismatch.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct NotAsciiError(Box<[u8]>);

impl_error_display! {
	NotAsciiError,
	self => "received line is not ASCII: {}", String::from_utf8_lossy(&self.0)
}

impl NotAsciiError {
	/// Create a instance of the error
	pub(crate) fn new<R: AsRef<[u8]>>(bytes: R) -> Self {
		NotAsciiError(Box::from(bytes.as_ref()))
	}

	/// Get the bytes of the invalid line.
	pub fn as_bytes(&self) -> &[u8] {
		&self.0
	}
}

/// A status reply did not split into exactly five comma-separated fields.
///
/// No partial [`StatusReport`](crate::shot::StatusReport) is produced when
/// this error is raised.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct MalformedStatusError(Box<str>);

impl_error_display! {
	MalformedStatusError,
	self => "malformed status reply (expected 5 fields): {}", self.0
}

impl MalformedStatusError {
	/// Create a instance of the error
	pub(crate) fn new<S: AsRef<str>>(line: S) -> Self {
		MalformedStatusError(Box::from(line.as_ref()))
	}

	/// Get the offending reply line.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

/// A position reply could not be parsed as a signed counter reading.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct MalformedPositionError(Box<str>);

impl_error_display! {
	MalformedPositionError,
	self => "malformed position reply: {}", self.0
}

impl MalformedPositionError {
	/// Create a instance of the error
	pub(crate) fn new<S: AsRef<str>>(line: S) -> Self {
		MalformedPositionError(Box::from(line.as_ref()))
	}

	/// Get the offending reply line.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

/// A speed value was outside the controller model's supported range.
///
/// The command was not sent.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SpeedOutOfRangeError {
	/// The rejected speed, in µm/s.
	value: f64,
	/// The largest speed the model supports, in µm/s.
	max: f64,
}

impl_error_display! {
	SpeedOutOfRangeError,
	self => "speed {} µm/s is out of range (must be 0 to {} µm/s)", self.value, self.max
}

impl SpeedOutOfRangeError {
	pub(crate) fn new(value: f64, max: f64) -> Self {
		SpeedOutOfRangeError { value, max }
	}

	/// Get the rejected speed, in µm/s.
	pub fn value(self) -> f64 {
		self.value
	}

	/// Get the largest speed the controller model supports, in µm/s.
	pub fn max(self) -> f64 {
		self.max
	}
}

/// An acceleration ramp time was outside the controller model's supported range.
///
/// The command was not sent.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct AccelerationOutOfRangeError {
	/// The rejected ramp time, in ms.
	value: u32,
	/// The smallest supported ramp time, in ms.
	min: u32,
	/// The largest supported ramp time, in ms.
	max: u32,
}

impl_error_display! {
	AccelerationOutOfRangeError,
	self =>
	"acceleration ramp time {} ms is out of range (must be {} to {} ms)",
	self.value, self.min, self.max
}

impl AccelerationOutOfRangeError {
	pub(crate) fn new(value: u32, min: u32, max: u32) -> Self {
		AccelerationOutOfRangeError { value, min, max }
	}

	/// Get the rejected ramp time, in ms.
	pub fn value(self) -> u32 {
		self.value
	}

	/// Get the smallest ramp time the controller model supports, in ms.
	pub fn min(self) -> u32 {
		self.min
	}

	/// Get the largest ramp time the controller model supports, in ms.
	pub fn max(self) -> u32 {
		self.max
	}
}

/// A character does not name a stop target.
///
/// The valid selectors are `1`, `2`, `W` (both axes), and `E` (emergency).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct InvalidStopTargetError(char);

impl_error_display! {
	InvalidStopTargetError,
	self => "invalid stop target `{}` (must be 1, 2, W, or E)", self.0
}

impl InvalidStopTargetError {
	pub(crate) fn new(selector: char) -> Self {
		InvalidStopTargetError(selector)
	}

	/// Get the rejected selector character.
	pub fn selector(self) -> char {
		self.0
	}
}

error_enum! {
	/// Any error returned while communicating with a stage controller.
	#[derive(Debug)]
	#[non_exhaustive]
	pub enum ShotError {
		Io(std::io::Error),
		SerialDeviceInUseOrDisconnected(SerialDeviceInUseOrDisconnectedError),
		NotAscii(NotAsciiError),
		MalformedStatus(MalformedStatusError),
		MalformedPosition(MalformedPositionError),
		SpeedOutOfRange(SpeedOutOfRangeError),
		AccelerationOutOfRange(AccelerationOutOfRangeError),
	}
}

impl ShotError {
	/// A convenience function for determining if the error is due to the
	/// port timing out.
	pub fn is_timeout(&self) -> bool {
		matches!(self, ShotError::Io(e) if e.kind() == std::io::ErrorKind::TimedOut)
	}
}

impl From<serialport::Error> for ShotError {
	fn from(other: serialport::Error) -> Self {
		match other.kind() {
			serialport::ErrorKind::NoDevice => ShotError::SerialDeviceInUseOrDisconnected(
				SerialDeviceInUseOrDisconnectedError(other.description.into_boxed_str()),
			),
			serialport::ErrorKind::InvalidInput => ShotError::Io(io::Error::new(
				io::ErrorKind::InvalidInput,
				other.description,
			)),
			serialport::ErrorKind::Unknown => {
				ShotError::Io(io::Error::new(io::ErrorKind::Other, other.description))
			}
			serialport::ErrorKind::Io(kind) => {
				ShotError::Io(io::Error::new(kind, other.description))
			}
		}
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn display_messages() {
		assert_eq!(
			SpeedOutOfRangeError::new(250_000.0, 200_000.0).to_string(),
			"speed 250000 µm/s is out of range (must be 0 to 200000 µm/s)"
		);
		assert_eq!(
			AccelerationOutOfRangeError::new(2001, 10, 2000).to_string(),
			"acceleration ramp time 2001 ms is out of range (must be 10 to 2000 ms)"
		);
		assert_eq!(
			InvalidStopTargetError::new('X').to_string(),
			"invalid stop target `X` (must be 1, 2, W, or E)"
		);
		assert_eq!(
			MalformedStatusError::new("K,M,K,0000").to_string(),
			"malformed status reply (expected 5 fields): K,M,K,0000"
		);
	}

	#[test]
	fn round_trip_through_shot_error() {
		let err: ShotError = MalformedStatusError::new("1,2").into();
		let inner = MalformedStatusError::try_from(err).unwrap();
		assert_eq!(inner.as_str(), "1,2");
	}

	#[test]
	fn is_timeout() {
		let err = ShotError::from(io::Error::new(io::ErrorKind::TimedOut, "too slow"));
		assert!(err.is_timeout());
		let err = ShotError::from(io::Error::new(io::ErrorKind::BrokenPipe, "gone"));
		assert!(!err.is_timeout());
	}
}
