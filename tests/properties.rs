//! Property tests for framing and unit conversion.

use mcode_stage::config::StageMechanics;
use mcode_stage::transport::framing::{encode_command, parse_lines, ResponseBuffer};
use mcode_stage::{Microsteps, Millimeters, Steps};
use proptest::prelude::*;

/// Commands as the controller accepts them: printable ASCII, no sentinels.
fn command() -> impl Strategy<Value = String> {
    "[A-Z][A-Z0-9 =,-]{0,15}"
}

fn reply(command: &str, value: &Option<String>) -> String {
    match value {
        Some(v) => format!("{command}\r\n{v}\r\n>"),
        None => format!("{command}\r\n>"),
    }
}

proptest! {
    #[test]
    fn encoded_frame_is_command_plus_cr(cmd in command()) {
        let frame = encode_command(&cmd).unwrap();
        prop_assert_eq!(&frame[..cmd.len()], cmd.as_bytes());
        prop_assert_eq!(&frame[cmd.len()..], b"\r");
    }

    #[test]
    fn echo_is_first_line(cmd in command(), value in proptest::option::of("-?[0-9]{1,7}")) {
        let text = reply(cmd.trim(), &value);
        let lines = parse_lines(text.as_bytes()).unwrap();
        prop_assert_eq!(lines.first().map(String::as_str), Some(cmd.trim()));
        prop_assert!(lines.iter().all(|l| !l.is_empty()));
    }

    #[test]
    fn chunking_is_transparent(
        cmd in command(),
        value in proptest::option::of("-?[0-9]{1,7}"),
        cuts in proptest::collection::vec(any::<prop::sample::Index>(), 0..6),
    ) {
        let text = reply(&cmd, &value);
        let bytes = text.as_bytes();

        let mut points: Vec<usize> = cuts.iter().map(|i| i.index(bytes.len())).collect();
        points.sort_unstable();
        points.dedup();

        let mut buffer = ResponseBuffer::new();
        let mut start = 0;
        for &p in points.iter().chain(std::iter::once(&bytes.len())) {
            buffer.push(&bytes[start..p]);
            start = p;
        }

        let whole = parse_lines(bytes).unwrap();
        let chunked = buffer.parse().unwrap().unwrap();
        prop_assert_eq!(chunked.lines, whole);
    }

    #[test]
    fn mm_steps_round_trip_within_half_step(
        mm in -500.0f64..500.0,
        microsteps in prop::sample::select(vec![1u16, 2, 5, 16, 25, 128, 250, 256]),
    ) {
        let stage = StageMechanics {
            microsteps: Microsteps::new(microsteps).unwrap(),
            ..StageMechanics::default()
        };
        let steps = stage.to_steps(Millimeters(mm));
        let back = stage.to_mm(steps);
        prop_assert!((back.0 - mm).abs() <= stage.mm_per_step() / 2.0 + 1e-9);
        prop_assert_eq!(stage.to_steps(back), steps);
    }

    #[test]
    fn negation_is_symmetric(steps in -1_000_000i64..1_000_000) {
        let stage = StageMechanics::default();
        let mm = stage.to_mm(Steps(steps));
        prop_assert_eq!(stage.to_steps(-mm), Steps(-steps));
    }
}
