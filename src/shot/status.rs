//! Parsing of SHOT status replies.
//!
//! The reply to a status query (`SRQ:`) is a single line of exactly five
//! comma-separated fields, parsed into a [`StatusReport`]. Decoding is pure:
//! nothing is printed or logged here. The `Display` impls render the
//! human-readable labels from the controller manual.

use crate::error::MalformedStatusError;

/// The controller-wide error field of a status reply.
///
/// A code outside the documented table parses to
/// [`Unrecognized`](ErrorState::Unrecognized) rather than failing the whole
/// status parse.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ErrorState {
	/// `K` — no error.
	NoError,
	/// `1` — command error.
	Command,
	/// `2` — scale error.
	Scale,
	/// `3` — stopped at a limit sensor.
	LimitStop,
	/// `4` — over-speed error.
	OverSpeed,
	/// `5` — overflow error.
	Overflow,
	/// `6` — emergency stop.
	Emergency,
	/// `7` — MN102 (internal processor) error.
	Mn102,
	/// `8` — limit error.
	Limit,
	/// `9` — system error.
	System,
	/// Any code outside the documented table, passed through verbatim.
	Unrecognized(Box<str>),
}

impl ErrorState {
	/// Parse one status field.
	fn from_code(code: &str) -> ErrorState {
		match code {
			"K" => ErrorState::NoError,
			"1" => ErrorState::Command,
			"2" => ErrorState::Scale,
			"3" => ErrorState::LimitStop,
			"4" => ErrorState::OverSpeed,
			"5" => ErrorState::Overflow,
			"6" => ErrorState::Emergency,
			"7" => ErrorState::Mn102,
			"8" => ErrorState::Limit,
			"9" => ErrorState::System,
			other => ErrorState::Unrecognized(Box::from(other)),
		}
	}

	/// Whether the controller reported no error.
	pub fn is_ok(&self) -> bool {
		*self == ErrorState::NoError
	}
}

impl std::fmt::Display for ErrorState {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			ErrorState::NoError => write!(f, "no error"),
			ErrorState::Command => write!(f, "command error"),
			ErrorState::Scale => write!(f, "scale error"),
			ErrorState::LimitStop => write!(f, "limit stop"),
			ErrorState::OverSpeed => write!(f, "over speed error"),
			ErrorState::Overflow => write!(f, "overflow error"),
			ErrorState::Emergency => write!(f, "emergency error"),
			ErrorState::Mn102 => write!(f, "MN102 error"),
			ErrorState::Limit => write!(f, "limit error"),
			ErrorState::System => write!(f, "system error"),
			ErrorState::Unrecognized(code) => write!(f, "unrecognized error state `{code}`"),
		}
	}
}

/// The per-axis motion field of a status reply.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AxisState {
	/// `K` — stopped normally.
	Stopped,
	/// `M` — moving normally.
	Moving,
	/// `C` — stopped at the CW limit sensor.
	CwLimit,
	/// `W` — stopped at the CCW limit sensor.
	CcwLimit,
	/// Any code outside the documented table, passed through verbatim.
	Unrecognized(Box<str>),
}

impl AxisState {
	/// Parse one status field.
	fn from_code(code: &str) -> AxisState {
		match code {
			"K" => AxisState::Stopped,
			"M" => AxisState::Moving,
			"C" => AxisState::CwLimit,
			"W" => AxisState::CcwLimit,
			other => AxisState::Unrecognized(Box::from(other)),
		}
	}

	/// Whether the axis is moving.
	pub fn is_moving(&self) -> bool {
		*self == AxisState::Moving
	}

	/// Whether the axis is stopped at either limit sensor.
	pub fn is_at_limit(&self) -> bool {
		matches!(self, AxisState::CwLimit | AxisState::CcwLimit)
	}
}

impl std::fmt::Display for AxisState {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			AxisState::Stopped => write!(f, "normal stop"),
			AxisState::Moving => write!(f, "normal moving"),
			AxisState::CwLimit => write!(f, "CW limit stop"),
			AxisState::CcwLimit => write!(f, "CCW limit stop"),
			AxisState::Unrecognized(code) => write!(f, "unrecognized axis state `{code}`"),
		}
	}
}

/// The positioning field of a status reply.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PositioningState {
	/// `B` — busy, positioning not yet complete.
	Busy,
	/// `R` — ready, positioning complete.
	Ready,
	/// Any code outside the documented table, passed through verbatim.
	Unrecognized(Box<str>),
}

impl PositioningState {
	/// Parse one status field.
	fn from_code(code: &str) -> PositioningState {
		match code {
			"B" => PositioningState::Busy,
			"R" => PositioningState::Ready,
			other => PositioningState::Unrecognized(Box::from(other)),
		}
	}

	/// Whether positioning is complete.
	pub fn is_ready(&self) -> bool {
		*self == PositioningState::Ready
	}
}

impl std::fmt::Display for PositioningState {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			PositioningState::Busy => write!(f, "busy"),
			PositioningState::Ready => write!(f, "ready"),
			PositioningState::Unrecognized(code) => {
				write!(f, "unrecognized positioning state `{code}`")
			}
		}
	}
}

/// The parsed reply to a status query (`SRQ:`).
///
/// A reply always has exactly five fields; a line with any other field count
/// fails to parse and never produces a partial report. Individual fields
/// with codes outside their documented tables parse to `Unrecognized`
/// variants without affecting the other fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StatusReport {
	/// The controller-wide error state.
	pub error: ErrorState,
	/// The first axis's motion state.
	pub axis1: AxisState,
	/// The second axis's motion state.
	pub axis2: AxisState,
	/// The system-reserved field (a four digit maintenance value), passed
	/// through unmodified.
	pub reserved: Box<str>,
	/// The stage positioning state.
	pub positioning: PositioningState,
}

impl TryFrom<&str> for StatusReport {
	type Error = MalformedStatusError;

	fn try_from(line: &str) -> Result<Self, MalformedStatusError> {
		let fields: Vec<&str> = line.split(',').collect();
		let [error, axis1, axis2, reserved, positioning] = fields.as_slice() else {
			return Err(MalformedStatusError::new(line));
		};
		Ok(StatusReport {
			error: ErrorState::from_code(error),
			axis1: AxisState::from_code(axis1),
			axis2: AxisState::from_code(axis2),
			reserved: Box::from(*reserved),
			positioning: PositioningState::from_code(positioning),
		})
	}
}

impl std::fmt::Display for StatusReport {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(
			f,
			"{}, axis1: {}, axis2: {}, system reserved: {}, positioning: {}",
			self.error, self.axis1, self.axis2, self.reserved, self.positioning
		)
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn parse_nominal_status() {
		let report = StatusReport::try_from("K,M,K,0000,R").unwrap();
		assert_eq!(report.error, ErrorState::NoError);
		assert_eq!(report.axis1, AxisState::Moving);
		assert_eq!(report.axis2, AxisState::Stopped);
		assert_eq!(&*report.reserved, "0000");
		assert_eq!(report.positioning, PositioningState::Ready);
	}

	#[test]
	fn parse_all_error_codes() {
		let expected = [
			("K", ErrorState::NoError),
			("1", ErrorState::Command),
			("2", ErrorState::Scale),
			("3", ErrorState::LimitStop),
			("4", ErrorState::OverSpeed),
			("5", ErrorState::Overflow),
			("6", ErrorState::Emergency),
			("7", ErrorState::Mn102),
			("8", ErrorState::Limit),
			("9", ErrorState::System),
		];
		for (code, state) in expected {
			let report = StatusReport::try_from(format!("{code},K,K,0000,R").as_str()).unwrap();
			assert_eq!(report.error, state, "code {code}");
		}
	}

	#[test]
	fn wrong_field_count_is_rejected() {
		assert!(StatusReport::try_from("K,M,K,0000").is_err());
		assert!(StatusReport::try_from("K,M,K,0000,R,X").is_err());
		assert!(StatusReport::try_from("").is_err());
	}

	#[test]
	fn unrecognized_code_does_not_abort_the_parse() {
		let report = StatusReport::try_from("Z,M,K,0000,R").unwrap();
		assert_eq!(report.error, ErrorState::Unrecognized(Box::from("Z")));
		assert_eq!(report.axis1, AxisState::Moving);
		assert_eq!(report.axis2, AxisState::Stopped);
		assert_eq!(report.positioning, PositioningState::Ready);

		let report = StatusReport::try_from("K,?,K,1234,Q").unwrap();
		assert_eq!(report.axis1, AxisState::Unrecognized(Box::from("?")));
		assert_eq!(
			report.positioning,
			PositioningState::Unrecognized(Box::from("Q"))
		);
		assert_eq!(&*report.reserved, "1234");
	}

	#[test]
	fn display_labels() {
		let report = StatusReport::try_from("3,C,W,0000,B").unwrap();
		assert_eq!(
			report.to_string(),
			"limit stop, axis1: CW limit stop, axis2: CCW limit stop, \
			 system reserved: 0000, positioning: busy"
		);
	}

	#[test]
	fn convenience_predicates() {
		assert!(ErrorState::NoError.is_ok());
		assert!(!ErrorState::System.is_ok());
		assert!(AxisState::Moving.is_moving());
		assert!(AxisState::CwLimit.is_at_limit());
		assert!(AxisState::CcwLimit.is_at_limit());
		assert!(!AxisState::Stopped.is_at_limit());
		assert!(PositioningState::Ready.is_ready());
		assert!(!PositioningState::Busy.is_ready());
	}
}
