//! Types for opening and using a serial port with the SHOT protocol.

mod options;
#[cfg(test)]
mod test;

use crate::backend::{Backend, Serial, UNKNOWN_BACKEND_NAME};
use crate::error::{
	AccelerationOutOfRangeError, MalformedPositionError, NotAsciiError, ShotError,
	SpeedOutOfRangeError,
};
use crate::shot::{
	command::{Command, MoveMode},
	model::{Model, Sc101g, Shot302gs},
	status::StatusReport,
	Axis, StopTarget,
};
use crate::timeout_guard::TimeoutGuard;
pub use options::*;
use std::{io, marker::PhantomData, time::Duration};

/// The SHOT protocol line terminator, appended to every transmitted command
/// and stripped from every received line.
pub(crate) const LINE_TERMINATOR: &str = "\r\n";

/// The canned line [`Port::receive`] returns when no backend is bound.
pub const OFFLINE_RESPONSE: &str = "some response";

/// A port configured to use the SHOT protocol.
///
/// See the [`shot`](crate::shot) module-level documentation for details on
/// how to use a `Port`.
///
/// A port is parameterized by two types:
///
/// 1. `B`: the type of [`Backend`] used to exchange bytes with the
///    controller. Use [`open_serial`](Port::open_serial) to construct a
///    serial port (`Port<Serial>`), [`from_backend`](Port::from_backend) for
///    any other backend, or [`offline`](Port::offline) for a port with no
///    backend at all.
/// 2. `M`: the controller [`Model`], which fixes the pulse ratio and the
///    speed/acceleration limits used to validate commands. It defaults to
///    the [`Sc101g`]. Commands a model does not implement are not present
///    on that model's port type.
///
/// Every command is a single line, written in full or not at all; a sent
/// command is never retried. One port exclusively owns its backend, and all
/// I/O is blocking: sharing one controller between callers means serializing
/// access to the port yourself.
pub struct Port<B, M: Model = Sc101g> {
	/// The underlying backend. `None` is the offline (dry-run) mode: sends
	/// are accepted and dropped, receives answer with [`OFFLINE_RESPONSE`].
	backend: Option<B>,
	/// If populated, the error that has "poisoned" the port. This error MUST
	/// be reported before the port is used for communication again.
	///
	/// A port becomes "poisoned" when an error occurs that cannot be
	/// recovered from but where panicking is ill advised, such as a
	/// [`TimeoutGuard`] failing to restore the original timeout in its Drop
	/// implementation.
	poison: Option<io::Error>,
	/// The controller model this port validates against.
	model: PhantomData<M>,
}

impl<B: Backend, M: Model> std::fmt::Debug for Port<B, M> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Port")
			.field("name", &self.backend.as_ref().and_then(Backend::name))
			.field("model", &M::NAME)
			.finish_non_exhaustive()
	}
}

impl Port<Serial> {
	/// Open the serial port at the specified path using the default options.
	///
	/// The port is for the default controller model; use
	/// [`into_model`](Port::into_model) to select another. Alternatively,
	/// use [`Port::open_serial_options`] to customize how the port is opened.
	///
	/// ## Example
	///
	/// ```rust
	/// # use skproto::shot::Port;
	/// # fn wrapper() -> Result<(), Box<dyn std::error::Error>> {
	/// let mut port = Port::open_serial("/dev/ttyUSB0")?;
	/// // Or equivalently
	/// let mut port = Port::open_serial_options().open("/dev/ttyUSB0")?;
	/// # Ok(())
	/// # }
	/// ```
	pub fn open_serial(path: &str) -> Result<Port<Serial>, ShotError> {
		OpenSerialOptions::new().open(path)
	}

	/// Get an [`OpenSerialOptions`] to customize how a serial port is opened.
	pub fn open_serial_options() -> OpenSerialOptions {
		OpenSerialOptions::default()
	}

	/// Create a port with no backend bound.
	///
	/// Every send is accepted without any I/O and every receive answers with
	/// the fixed [`OFFLINE_RESPONSE`] line, so all validation and command
	/// construction can be exercised without hardware.
	pub fn offline() -> Port<Serial> {
		Port {
			backend: None,
			poison: None,
			model: PhantomData,
		}
	}
}

impl<B: Backend, M: Model> Port<B, M> {
	/// Create a `Port` from a [`Backend`] type.
	pub fn from_backend(backend: B) -> Port<B, M> {
		Port {
			backend: Some(backend),
			poison: None,
			model: PhantomData,
		}
	}

	/// Convert the type of this port to target another controller model.
	///
	/// This does not touch the wire; it only changes which commands the
	/// compiler makes available and which limits validate arguments.
	///
	/// ## Example
	///
	/// ```rust
	/// # use skproto::{error::ShotError, shot::{Port, Shot302gs}};
	/// # fn wrapper() -> Result<(), ShotError> {
	/// let mut port = Port::open_serial("/dev/ttyUSB0")?.into_model::<Shot302gs>();
	/// port.home()?;
	/// # Ok(())
	/// # }
	/// ```
	pub fn into_model<M2: Model>(self) -> Port<B, M2> {
		Port {
			backend: self.backend,
			poison: self.poison,
			model: PhantomData,
		}
	}

	/// Check if the port is poisoned and report the error if it exists.
	fn check_poisoned(&mut self) -> Result<(), io::Error> {
		if let Some(poison) = self.poison.take() {
			Err(poison)
		} else {
			Ok(())
		}
	}

	/// Poison the port with the given error.
	pub(crate) fn poison(&mut self, e: io::Error) {
		self.poison = Some(e);
	}

	/// Get the name of the backend for log messages.
	fn backend_name(&self) -> String {
		match &self.backend {
			Some(backend) => backend
				.name()
				.unwrap_or_else(|| UNKNOWN_BACKEND_NAME.to_string()),
			None => String::from("<offline>"),
		}
	}

	/// Get a reference to the underlying backend, if one is bound.
	pub fn backend(&self) -> Option<&B> {
		self.backend.as_ref()
	}

	/// Get a mutable reference to the underlying backend, if one is bound.
	pub fn backend_mut(&mut self) -> Option<&mut B> {
		self.backend.as_mut()
	}

	/// Get the read timeout of the backend.
	///
	/// If the timeout is `None`, reads will block indefinitely. An offline
	/// port reports no timeout.
	pub fn read_timeout(&self) -> Result<Option<Duration>, io::Error> {
		match &self.backend {
			Some(backend) => backend.read_timeout(),
			None => Ok(None),
		}
	}

	/// Set the read timeout of the backend.
	///
	/// If the timeout is `None`, reads will block indefinitely. On an
	/// offline port this is a no-op.
	pub fn set_read_timeout(&mut self, timeout: Option<Duration>) -> Result<(), io::Error> {
		match self.backend.as_mut() {
			Some(backend) => backend.set_read_timeout(timeout),
			None => Ok(()),
		}
	}

	/// Temporarily change the read timeout, restoring it when the returned
	/// guard is dropped.
	///
	/// While the guard is in scope the port can only be accessed through it.
	///
	/// ## Example
	///
	/// ```rust
	/// # use skproto::{backend::Backend, error::ShotError, shot::Port};
	/// # use std::time::Duration;
	/// # fn wrapper<B: Backend>(mut port: Port<B>) -> Result<(), ShotError> {
	/// {
	///     let mut guard = port.timeout_guard(Some(Duration::from_secs(30)))?;
	///     guard.move_absolute(0.0, 0.0)?;
	///     while !guard.status()?.positioning.is_ready() {}
	/// }
	/// // The original timeout is restored here.
	/// # Ok(())
	/// # }
	/// ```
	pub fn timeout_guard(
		&mut self,
		timeout: Option<Duration>,
	) -> Result<TimeoutGuard<'_, B, M>, io::Error> {
		self.check_poisoned()?;
		TimeoutGuard::new(self, timeout)
	}

	/// Send one command line.
	///
	/// The terminator is appended here; commands themselves are
	/// terminator-free. Without a bound backend this logs the line and
	/// succeeds without any I/O.
	fn send(&mut self, command: Command) -> Result<(), ShotError> {
		self.check_poisoned()?;
		let mut buffer = Vec::with_capacity(32);
		command.write_into(&mut buffer)?;
		log::debug!(
			"{} TX:   {}",
			self.backend_name(),
			String::from_utf8_lossy(&buffer)
		);
		buffer.extend_from_slice(LINE_TERMINATOR.as_bytes());
		if let Some(backend) = self.backend.as_mut() {
			backend.write_all(&buffer)?;
		}
		Ok(())
	}

	/// Read one reply line from the controller, with the terminator removed.
	///
	/// This is only needed in combination with [`request_position`]
	/// (`P:W` is a two-step query); the other queries read their own
	/// replies. Without a bound backend this returns [`OFFLINE_RESPONSE`].
	///
	/// A reply containing non-ASCII bytes fails the call; there is no retry.
	///
	/// [`request_position`]: Port::request_position
	pub fn receive(&mut self) -> Result<String, ShotError> {
		self.check_poisoned()?;
		let line = if let Some(backend) = self.backend.as_mut() {
			let mut bytes = Vec::with_capacity(32);
			let mut byte = [0_u8; 1];
			loop {
				backend.read_exact(&mut byte)?;
				if byte[0] == b'\n' {
					break;
				}
				bytes.push(byte[0]);
			}
			if bytes.last() == Some(&b'\r') {
				bytes.pop();
			}
			match String::from_utf8(bytes) {
				Ok(line) if line.is_ascii() => line,
				Ok(line) => return Err(NotAsciiError::new(line.as_bytes()).into()),
				Err(err) => return Err(NotAsciiError::new(err.as_bytes()).into()),
			}
		} else {
			OFFLINE_RESPONSE.to_string()
		};
		log::debug!("{} RX:   {}", self.backend_name(), line);
		Ok(line)
	}

	/// Reset the controller (`RESET:`).
	pub fn reset(&mut self) -> Result<(), ShotError> {
		self.send(Command::Reset)
	}

	/// Query the controller status (`SRQ:`) and parse the reply.
	///
	/// Fails with [`MalformedStatusError`](crate::error::MalformedStatusError)
	/// if the reply does not have exactly five comma-separated fields; no
	/// partial report is ever produced.
	pub fn status(&mut self) -> Result<StatusReport, ShotError> {
		self.send(Command::StatusQuery)?;
		let line = self.receive()?;
		Ok(StatusReport::try_from(line.as_str())?)
	}

	/// Request the position counters (`P:W`) without reading the reply.
	///
	/// This is the controller's documented two-step query: follow up with
	/// [`receive`](Port::receive) to get the raw counter line, and divide
	/// the reading by the model's pulse ratio to obtain micrometres. For
	/// the common case use [`position`](Port::position), which does both.
	pub fn request_position(&mut self) -> Result<(), ShotError> {
		self.send(Command::PositionQuery)
	}

	/// Query the current position and convert it to micrometres.
	///
	/// Sends `P:W`, reads the raw counter reading, and divides it by the
	/// model's pulse ratio.
	pub fn position(&mut self) -> Result<f64, ShotError> {
		self.request_position()?;
		let line = self.receive()?;
		let pulses: i64 = line
			.trim()
			.parse()
			.map_err(|_| MalformedPositionError::new(&line))?;
		Ok(pulses as f64 / M::PULSE_RATIO)
	}

	/// Begin the previously set motion (`G`).
	///
	/// The `move_*` methods call this themselves; it is only needed
	/// separately when a motion target was set by other means.
	pub fn start_moving(&mut self) -> Result<(), ShotError> {
		self.send(Command::Go)
	}

	/// Move to an absolute coordinate, in µm.
	///
	/// Sends the target (`A:W...`) and then unconditionally triggers the
	/// motion (`G`): two wire transactions, with no rollback of the first
	/// if the second fails. Coordinates may be negative; magnitudes are
	/// truncated toward zero.
	pub fn move_absolute(&mut self, x: f64, y: f64) -> Result<(), ShotError> {
		self.set_target(MoveMode::Absolute, x, y)
	}

	/// Move by a relative offset, in µm.
	///
	/// Sends the offset (`M:W...`) and then unconditionally triggers the
	/// motion (`G`), like [`move_absolute`](Port::move_absolute).
	pub fn move_relative(&mut self, x: f64, y: f64) -> Result<(), ShotError> {
		self.set_target(MoveMode::Relative, x, y)
	}

	/// Set a motion target and trigger the motion.
	fn set_target(&mut self, mode: MoveMode, x: f64, y: f64) -> Result<(), ShotError> {
		self.send(Command::Move { mode, x, y })?;
		self.start_moving()
	}

	/// Stop the given target (`L:`).
	pub fn stop<T: Into<StopTarget>>(&mut self, target: T) -> Result<(), ShotError> {
		self.send(Command::Stop(target.into()))
	}

	/// Set the speed of both axes (`D:WF<v1>F<v2>`), in µm/s.
	///
	/// Each value must be within the model's supported range
	/// (0 to [`Model::MAX_SPEED`]); otherwise nothing is sent.
	pub fn set_speed(&mut self, v1: f64, v2: f64) -> Result<(), ShotError> {
		for value in [v1, v2] {
			if !(M::MIN_SPEED..=M::MAX_SPEED).contains(&value) {
				return Err(SpeedOutOfRangeError::new(value, M::MAX_SPEED).into());
			}
		}
		self.send(Command::Speed { v1, v2 })
	}

	/// Set both axes to the model's maximum speed.
	pub fn set_speed_max(&mut self) -> Result<(), ShotError> {
		self.set_speed(M::MAX_SPEED, M::MAX_SPEED)
	}

	/// Set one axis's acceleration ramp time (`ACC:<axis> <ms>`).
	///
	/// The ramp time must be within the model's supported range
	/// ([`Model::MIN_ACCELERATION_TIME`] to [`Model::MAX_ACCELERATION_TIME`]);
	/// otherwise nothing is sent.
	pub fn set_acceleration(&mut self, axis: Axis, ramp_ms: u32) -> Result<(), ShotError> {
		if !(M::MIN_ACCELERATION_TIME..=M::MAX_ACCELERATION_TIME).contains(&ramp_ms) {
			return Err(AccelerationOutOfRangeError::new(
				ramp_ms,
				M::MIN_ACCELERATION_TIME,
				M::MAX_ACCELERATION_TIME,
			)
			.into());
		}
		self.send(Command::Acceleration { axis, ramp_ms })
	}

	/// Set both axes to the model's maximum acceleration ramp time.
	///
	/// Both axes are always attempted, even if the first fails; the first
	/// error (if any) is reported after both attempts.
	pub fn set_acceleration_max(&mut self) -> Result<(), ShotError> {
		let first = self.set_acceleration(Axis::First, M::MAX_ACCELERATION_TIME);
		let second = self.set_acceleration(Axis::Second, M::MAX_ACCELERATION_TIME);
		first.and(second)
	}
}

/// Commands only implemented by SHOT-302GS class controllers.
impl<B: Backend> Port<B, Shot302gs> {
	/// Return both axes to the mechanical origin (`H:W`).
	pub fn home(&mut self) -> Result<(), ShotError> {
		self.send(Command::Home)
	}

	/// Zero the given axis's position counter (`R:<axis>`).
	pub fn set_logical_origin(&mut self, axis: Axis) -> Result<(), ShotError> {
		self.send(Command::SetLogicalOrigin(axis))
	}

	/// Energize (`C:W1`) or free (`C:W0`) the motors.
	///
	/// Freeing the motors allows the stages to be positioned by hand.
	pub fn excitation(&mut self, on: bool) -> Result<(), ShotError> {
		self.send(Command::Excitation(on))
	}
}
