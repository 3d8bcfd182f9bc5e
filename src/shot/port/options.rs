//! Types defining the different options when opening a port.

use super::Port;
use crate::{
	backend::{Backend, Serial},
	error::ShotError,
};
use serialport as sp;
use std::time::Duration;

/// Options for configuring and opening a serial port.
///
/// ## Example
///
/// ```rust
/// # use skproto::shot::OpenSerialOptions;
/// # use std::time::Duration;
/// # fn wrapper() -> Result<(), Box<dyn std::error::Error>> {
/// let mut port = OpenSerialOptions::new()
///     .timeout(Some(Duration::from_millis(500)))
///     .open("/dev/ttyUSB0")?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct OpenSerialOptions {
	/// The custom baud rate
	baud_rate: u32,
	/// The custom timeout
	timeout: Option<Duration>,
	/// The flow control mode
	flow_control: sp::FlowControl,
}

impl OpenSerialOptions {
	/// The controllers' factory-default baud rate: 9600.
	pub const DEFAULT_BAUD_RATE: u32 = 9600;

	/// Create a blank set of options ready for configuration.
	///
	/// The default baud rate and read timeout are 9600 and 3 seconds,
	/// respectively, and RTS/CTS flow control is enabled, matching the
	/// controllers' factory settings.
	///
	/// Equivalent to [`default`](OpenSerialOptions::default).
	pub fn new() -> Self {
		OpenSerialOptions {
			baud_rate: OpenSerialOptions::DEFAULT_BAUD_RATE,
			timeout: Some(Duration::from_secs(3)),
			flow_control: sp::FlowControl::Hardware,
		}
	}

	/// Set a custom baud rate.
	///
	/// The default is 9600.
	pub fn baud_rate(&mut self, baud_rate: u32) -> &mut Self {
		self.baud_rate = baud_rate;
		self
	}

	/// Set a custom read timeout.
	///
	/// If duration is `None`, reads will block indefinitely. The default is 3 seconds.
	pub fn timeout(&mut self, duration: Option<Duration>) -> &mut Self {
		self.timeout = duration;
		self
	}

	/// Set the flow control mode.
	///
	/// The default is hardware (RTS/CTS) flow control, which the controllers
	/// ship with. Use [`serialport::FlowControl::None`] for a three-wire
	/// cable.
	pub fn flow_control(&mut self, flow_control: sp::FlowControl) -> &mut Self {
		self.flow_control = flow_control;
		self
	}

	/// Open a [`Serial`] port configured for the SHOT protocol at the specified path.
	fn open_serial_port(&self, path: &str) -> Result<Serial, ShotError> {
		// Due to https://gitlab.com/susurrus/serialport-rs/-/issues/102, the
		// baud rate passed to new is ignored. It must be defined using the
		// baud_rate method below. Use the default baud_rate as it should be a
		// valid baud rate.
		sp::new(path, OpenSerialOptions::DEFAULT_BAUD_RATE)
			.data_bits(sp::DataBits::Eight)
			.parity(sp::Parity::None)
			.flow_control(self.flow_control)
			.stop_bits(sp::StopBits::One)
			// The serialport API does not support infinite timeouts, so simply
			// set the timeout to the largest possible duration if `timeout` is
			// `None`, which is practically infinite.
			.timeout(self.timeout.unwrap_or(Duration::MAX))
			.baud_rate(self.baud_rate)
			.open_native()
			.map(Serial)
			.map_err(Into::into)
	}

	/// Open the port at the specified path with the custom options.
	///
	/// The port speaks to the default controller model. Call
	/// [`Port::into_model`] to select a different one.
	pub fn open(&self, path: &str) -> Result<Port<Serial>, ShotError> {
		Ok(Port::from_backend(self.open_serial_port(path)?))
	}

	/// Open the port at the specified path with the custom options.
	///
	/// The type of the underlying backend is erased via dynamic dispatch,
	/// which does have runtime overhead. [`OpenSerialOptions::open`] should
	/// generally be used instead, except when the type of the underlying
	/// backend may not be known at compile time.
	pub fn open_dyn(&self, path: &str) -> Result<Port<Box<dyn Backend>>, ShotError> {
		Ok(Port::from_backend(Box::new(self.open_serial_port(path)?)))
	}
}

impl Default for OpenSerialOptions {
	fn default() -> Self {
		OpenSerialOptions::new()
	}
}
