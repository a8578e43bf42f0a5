//! Subprocess test for the finalization broadcast.
//!
//! Runs the `finalize-probe` subcommand and checks, from the outside,
//! that the probe hook is notified about the clearance before it is
//! released, and that its failure during clearance is ignored.

use std::process::Command;

#[test]
fn test_finalize_hooks_subprocess() {
    let output = Command::new(env!("CARGO_BIN_EXE_sentra-cli"))
        .arg("finalize-probe")
        .output()
        .expect("failed to spawn probe");

    assert!(output.status.success(), "probe exited with {:?}", output.status);
    assert!(output.stdout.is_empty(), "expected no stdout output");

    let stderr = String::from_utf8(output.stderr).unwrap();
    let events: Vec<(&str, &str)> = stderr
        .lines()
        .filter_map(|line| line.split_once(' '))
        .collect();

    assert_eq!(events.len(), 3, "unexpected probe output: {stderr}");
    let first_id = events[0].1;
    assert_eq!(
        events,
        vec![
            ("Created", first_id),
            ("sys._clearaudithooks", first_id),
            ("Finalized", first_id),
        ]
    );
}
