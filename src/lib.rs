//! A simple but easy to use library for communicating with Sigma Koki
//! (OptoSigma) stage controllers.
//!
//! The controllers speak a line-oriented ASCII command set (the "SHOT"
//! protocol) over a serial port, which is implemented in the [`shot`] module.
//!
//! ```no_run
//! # use skproto::{error::ShotError, shot::Port};
//! # fn wrapper() -> Result<(), ShotError> {
//! let mut port = Port::open_serial("/dev/ttyUSB0")?;
//! port.move_absolute(1500.0, -200.0)?;
//! # Ok(())
//! # }
//! ```
//!
//! Every transmitted and received line is logged with the [`log`] crate at
//! the debug level. Install any logger implementation to see the traffic:
//!
//! ```no_run
//! simple_logger::SimpleLogger::new().init().unwrap();
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]
#![deny(missing_debug_implementations)]

pub mod backend;
pub mod error;
pub mod shot;
pub mod timeout_guard;
