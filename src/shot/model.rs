//! Controller model definitions.
//!
//! Each supported controller is a zero-sized marker type implementing
//! [`Model`]. The constants are fixed per model and bound the validation of
//! every speed and acceleration command; they are never consulted after a
//! value has been validated and never change over the life of a port.

/// Per-model constants of a stage controller.
///
/// This trait is sealed: the supported models are defined in this crate.
pub trait Model: private::Sealed {
	/// The marketing name of the controller.
	const NAME: &'static str;

	/// The pulse-to-micrometre ratio of the position counter.
	///
	/// Raw counter readings are divided by this ratio to obtain micrometres.
	const PULSE_RATIO: f64;

	/// The lowest speed the controller accepts, in µm/s.
	const MIN_SPEED: f64;

	/// The highest speed the controller accepts, in µm/s.
	const MAX_SPEED: f64;

	/// The shortest acceleration ramp time the controller accepts, in ms.
	const MIN_ACCELERATION_TIME: u32;

	/// The longest acceleration ramp time the controller accepts, in ms.
	const MAX_ACCELERATION_TIME: u32;
}

/// The SC-101G two-axis stage controller.
///
/// This is the default model of a [`Port`](crate::shot::Port). It speaks
/// only the core SHOT command set; `H:` (mechanical home), `R:` (logical
/// origin) and `C:` (motor excitation) are not available on this model's
/// type because the controller does not implement them.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Sc101g {}

impl Model for Sc101g {
	const NAME: &'static str = "SC-101G";
	const PULSE_RATIO: f64 = 0.1;
	const MIN_SPEED: f64 = 0.0;
	const MAX_SPEED: f64 = 200_000.0;
	const MIN_ACCELERATION_TIME: u32 = 10;
	const MAX_ACCELERATION_TIME: u32 = 2000;
}

/// The SHOT-302GS two-axis stage controller.
///
/// Speaks the full SHOT command vocabulary, including mechanical-origin
/// return, logical-origin set, and motor excitation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Shot302gs {}

impl Model for Shot302gs {
	const NAME: &'static str = "SHOT-302GS";
	const PULSE_RATIO: f64 = 0.5;
	const MIN_SPEED: f64 = 0.0;
	const MAX_SPEED: f64 = 500_000.0;
	const MIN_ACCELERATION_TIME: u32 = 10;
	const MAX_ACCELERATION_TIME: u32 = 2000;
}

mod private {
	pub trait Sealed {}

	impl Sealed for super::Sc101g {}
	impl Sealed for super::Shot302gs {}
}

#[cfg(test)]
mod test {
	use super::*;
	use static_assertions::const_assert;

	// The acceleration ranges must be non-empty for every model.
	const_assert!(Sc101g::MIN_ACCELERATION_TIME < Sc101g::MAX_ACCELERATION_TIME);
	const_assert!(Shot302gs::MIN_ACCELERATION_TIME < Shot302gs::MAX_ACCELERATION_TIME);

	#[test]
	fn speed_ranges_are_non_empty() {
		assert!(Sc101g::MIN_SPEED < Sc101g::MAX_SPEED);
		assert!(Shot302gs::MIN_SPEED < Shot302gs::MAX_SPEED);
	}

	#[test]
	fn pulse_ratios() {
		assert!((Sc101g::PULSE_RATIO - 0.1).abs() < f64::EPSILON);
		assert!((Shot302gs::PULSE_RATIO - 0.5).abs() < f64::EPSILON);
	}
}
