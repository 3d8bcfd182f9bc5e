use crate::backend::{Mock, Serial};
use crate::error::ShotError;
use crate::shot::{
	Axis, Model, Port, PositioningState, Sc101g, Shot302gs, StopTarget, OFFLINE_RESPONSE,
};
use std::io;
use std::time::Duration;

fn new_port() -> Port<Mock> {
	Port::from_backend(Mock::new())
}

/// Get everything the port has written to its mock backend, as a string.
fn written<M: Model>(port: &Port<Mock, M>) -> String {
	String::from_utf8(port.backend().unwrap().written().to_vec()).unwrap()
}

#[test]
fn reset_sends_fixed_command() {
	let mut port = new_port();
	port.reset().unwrap();
	assert_eq!(written(&port), "RESET:\r\n");
}

#[test]
fn moves_set_target_then_trigger_motion() {
	let mut port = new_port();
	port.move_absolute(1500.7, -200.0).unwrap();
	assert_eq!(written(&port), "A:W+P1500-P200\r\nG\r\n");

	port.backend_mut().unwrap().clear_written();
	port.move_relative(-0.9, 42.0).unwrap();
	assert_eq!(written(&port), "M:W-P0+P42\r\nG\r\n");
}

#[test]
fn status_round_trip() {
	let mut port = new_port();
	port.backend_mut().unwrap().append_data(b"K,M,K,0000,R\r\n");
	let report = port.status().unwrap();
	assert_eq!(written(&port), "SRQ:\r\n");
	assert!(report.error.is_ok());
	assert!(report.axis1.is_moving());
	assert!(!report.axis2.is_moving());
	assert_eq!(&*report.reserved, "0000");
	assert!(report.positioning.is_ready());
}

#[test]
fn status_rejects_wrong_field_count() {
	let mut port = new_port();
	port.backend_mut().unwrap().append_data(b"K,M,K,0000\r\n");
	let err = port.status().unwrap_err();
	assert!(matches!(err, ShotError::MalformedStatus(_)), "{err:?}");

	port.backend_mut()
		.unwrap()
		.append_data(b"K,M,K,0000,R,X\r\n");
	let err = port.status().unwrap_err();
	assert!(matches!(err, ShotError::MalformedStatus(_)), "{err:?}");
}

#[test]
fn status_tolerates_unrecognized_codes() {
	let mut port = new_port();
	port.backend_mut().unwrap().append_data(b"Z,M,K,0000,R\r\n");
	let report = port.status().unwrap();
	assert!(!report.error.is_ok());
	assert!(report.axis1.is_moving());
	assert_eq!(report.positioning, PositioningState::Ready);
}

#[test]
fn position_divides_by_the_pulse_ratio() {
	let mut port = new_port();
	port.backend_mut().unwrap().append_data(b"150\r\n");
	let position = port.position().unwrap();
	assert_eq!(written(&port), "P:W\r\n");
	assert!((position - 1500.0).abs() < 1e-9, "{position}");

	let mut port: Port<Mock, Shot302gs> = Port::from_backend(Mock::new());
	port.backend_mut().unwrap().append_data(b"-300\r\n");
	assert!((port.position().unwrap() - -600.0).abs() < 1e-9);
}

#[test]
fn position_rejects_non_numeric_reply() {
	let mut port = new_port();
	port.backend_mut().unwrap().append_data(b"NG\r\n");
	let err = port.position().unwrap_err();
	assert!(matches!(err, ShotError::MalformedPosition(_)), "{err:?}");
}

#[test]
fn two_step_position_query() {
	let mut port = new_port();
	port.backend_mut().unwrap().append_data(b"  1234\r\n");
	port.request_position().unwrap();
	assert_eq!(written(&port), "P:W\r\n");
	assert_eq!(port.receive().unwrap(), "  1234");
}

#[test]
fn set_speed_validates_before_sending() {
	let mut port = new_port();
	assert!(matches!(
		port.set_speed(-1.0, 0.0),
		Err(ShotError::SpeedOutOfRange(_))
	));
	assert!(matches!(
		port.set_speed(0.0, 200_000.1),
		Err(ShotError::SpeedOutOfRange(_))
	));
	assert_eq!(written(&port), "", "rejected speeds must not be sent");

	port.set_speed(1000.9, 200_000.0).unwrap();
	assert_eq!(written(&port), "D:WF1000F200000\r\n");
}

#[test]
fn set_speed_max_uses_the_model_limit() {
	let mut port = new_port();
	port.set_speed_max().unwrap();
	assert_eq!(written(&port), "D:WF200000F200000\r\n");

	let mut port: Port<Mock, Shot302gs> = Port::from_backend(Mock::new());
	// Over the SC-101G limit but within the SHOT-302GS limit.
	port.set_speed(300_000.0, 500_000.0).unwrap();
	port.set_speed_max().unwrap();
	assert_eq!(
		written(&port),
		"D:WF300000F500000\r\nD:WF500000F500000\r\n"
	);
	assert!(matches!(
		port.set_speed(500_000.1, 0.0),
		Err(ShotError::SpeedOutOfRange(_))
	));
}

#[test]
fn set_acceleration_accepts_the_closed_interval() {
	let mut port = new_port();
	assert!(matches!(
		port.set_acceleration(Axis::First, 9),
		Err(ShotError::AccelerationOutOfRange(_))
	));
	assert!(matches!(
		port.set_acceleration(Axis::First, 2001),
		Err(ShotError::AccelerationOutOfRange(_))
	));
	assert_eq!(written(&port), "", "rejected ramp times must not be sent");

	port.set_acceleration(Axis::First, 10).unwrap();
	port.set_acceleration(Axis::Second, 2000).unwrap();
	assert_eq!(written(&port), "ACC:1 10\r\nACC:2 2000\r\n");
}

#[test]
fn set_acceleration_max_configures_both_axes() {
	let mut port = new_port();
	port.set_acceleration_max().unwrap();
	assert_eq!(written(&port), "ACC:1 2000\r\nACC:2 2000\r\n");
}

#[test]
fn stop_targets() {
	let mut port = new_port();
	port.stop(Axis::First).unwrap();
	port.stop(Axis::Second).unwrap();
	port.stop(StopTarget::Both).unwrap();
	port.stop(StopTarget::Emergency).unwrap();
	assert_eq!(written(&port), "L:1\r\nL:2\r\nL:W\r\nL:E\r\n");
}

#[test]
fn offline_port_accepts_commands_and_answers_with_the_placeholder() {
	let mut port: Port<Serial, Sc101g> = Port::offline();
	port.reset().unwrap();
	port.move_absolute(1500.7, -200.0).unwrap();
	port.set_speed_max().unwrap();
	port.set_acceleration_max().unwrap();
	port.stop(StopTarget::Both).unwrap();
	port.request_position().unwrap();
	assert_eq!(port.receive().unwrap(), OFFLINE_RESPONSE);

	// The placeholder is not a status reply, so parsing queries still
	// surface the malformed line instead of a partial report.
	let err = port.status().unwrap_err();
	assert!(matches!(err, ShotError::MalformedStatus(_)), "{err:?}");
}

#[test]
fn offline_validation_still_applies() {
	let mut port: Port<Serial, Sc101g> = Port::offline();
	assert!(matches!(
		port.set_speed(-1.0, 0.0),
		Err(ShotError::SpeedOutOfRange(_))
	));
	assert!(matches!(
		port.set_acceleration(Axis::First, 2001),
		Err(ShotError::AccelerationOutOfRange(_))
	));
}

#[test]
fn read_errors_propagate() {
	let mut port = new_port();
	port.backend_mut()
		.unwrap()
		.read_error(Some(io::Error::new(io::ErrorKind::BrokenPipe, "gone")));
	let err = port.status().unwrap_err();
	assert!(matches!(err, ShotError::Io(_)), "{err:?}");
}

#[test]
fn an_empty_mock_times_out() {
	let mut port = new_port();
	let err = port.status().unwrap_err();
	assert!(err.is_timeout(), "{err:?}");
}

#[test]
fn write_errors_propagate() {
	let mut port = new_port();
	port.backend_mut()
		.unwrap()
		.write_error(Some(io::Error::new(io::ErrorKind::BrokenPipe, "gone")));
	let err = port.reset().unwrap_err();
	assert!(matches!(err, ShotError::Io(_)), "{err:?}");
}

#[test]
fn timeout_guard_restores_the_original_timeout() {
	let mut port = new_port();
	assert_eq!(port.read_timeout().unwrap(), Some(Duration::ZERO));
	{
		let guard = port.timeout_guard(Some(Duration::from_secs(5))).unwrap();
		assert_eq!(guard.read_timeout().unwrap(), Some(Duration::from_secs(5)));
	}
	assert_eq!(port.read_timeout().unwrap(), Some(Duration::ZERO));
}

#[test]
fn failing_to_restore_the_timeout_poisons_the_port() {
	let mut port = new_port();
	{
		let mut guard = port.timeout_guard(Some(Duration::from_secs(5))).unwrap();
		guard
			.backend_mut()
			.unwrap()
			.set_read_timeout_error(Some(io::Error::new(io::ErrorKind::Other, "nope")));
	}
	// The restoration failure is reported by the next operation.
	let err = port.reset().unwrap_err();
	match err {
		ShotError::Io(e) => assert!(e.to_string().contains("failed to reset"), "{e}"),
		other => panic!("unexpected error: {other:?}"),
	}
	// And only by that one.
	port.reset().unwrap();
}

#[test]
fn model_gated_commands() {
	let mut port: Port<Mock, Shot302gs> = Port::from_backend(Mock::new());
	port.home().unwrap();
	port.set_logical_origin(Axis::Second).unwrap();
	port.excitation(false).unwrap();
	port.excitation(true).unwrap();
	assert_eq!(written(&port), "H:W\r\nR:2\r\nC:W0\r\nC:W1\r\n");
}
