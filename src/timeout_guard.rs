//! A "scope guard" that will reset a port's timeout when it goes out of scope.

use crate::backend::Backend;
use crate::shot::{Model, Port};
use std::{io, time::Duration};

/// A "scope guard" that will update the port's timeout and then reset it when
/// it goes out of scope.
///
/// To create a guard, use the port's
/// [`timeout_guard`](crate::shot::Port::timeout_guard) method.
///
/// While the guard is in scope, the port can only be accessed through the
/// guard. However, because the guard implements [`Deref`](std::ops::Deref)
/// and [`DerefMut`](std::ops::DerefMut) callers can treat the guard as the
/// port.
///
/// If the original timeout cannot be restored when the guard is dropped, the
/// port is poisoned: the restoration error is reported by the next attempt
/// to use the port.
#[derive(Debug)]
pub struct TimeoutGuard<'a, B: Backend, M: Model> {
	/// The underlying port.
	port: &'a mut Port<B, M>,
	/// The original timeout that will be restored when the guard is dropped.
	original_timeout: Option<Duration>,
}

impl<'a, B: Backend, M: Model> TimeoutGuard<'a, B, M> {
	/// Update the port's timeout and return a [`TimeoutGuard`] wrapping the port.
	pub(crate) fn new(
		port: &'a mut Port<B, M>,
		timeout: Option<Duration>,
	) -> Result<Self, io::Error> {
		let original_timeout = port.read_timeout()?;
		port.set_read_timeout(timeout)?;
		Ok(TimeoutGuard {
			port,
			original_timeout,
		})
	}
}

impl<B: Backend, M: Model> std::ops::Deref for TimeoutGuard<'_, B, M> {
	type Target = Port<B, M>;
	/// Get a shared reference to the underlying port.
	fn deref(&self) -> &Self::Target {
		self.port
	}
}

impl<B: Backend, M: Model> std::ops::DerefMut for TimeoutGuard<'_, B, M> {
	/// Get an exclusive reference to the underlying port.
	fn deref_mut(&mut self) -> &mut Self::Target {
		self.port
	}
}

impl<B: Backend, M: Model> Drop for TimeoutGuard<'_, B, M> {
	fn drop(&mut self) {
		if let Err(err) = self.port.set_read_timeout(self.original_timeout) {
			self.port.poison(io::Error::new(
				io::ErrorKind::Other,
				if let Some(timeout) = self.original_timeout {
					format!(
						"failed to reset timeout to {} seconds: {}",
						timeout.as_secs(),
						err
					)
				} else {
					format!("failed to reset to an infinite timeout: {err}")
				},
			));
		}
	}
}
