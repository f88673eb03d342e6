use std::io::Write;
use std::process::{Command, Output, Stdio};

use tempfile::NamedTempFile;

mod common;
use common::trajectories;

const BIN: &str = env!("CARGO_BIN_EXE_flexcalc");

fn run(args: &[&str]) -> Output {
    Command::new(BIN)
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run the flexcalc binary")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn two_frames() {
    let output = run(&[trajectories::TWO]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(stdout(&output), "0.7071\n");
}

#[test]
fn wobble() {
    let output = run(&[trajectories::WOBBLE]);
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout(&output), "0.2315\n");
}

#[test]
fn identical() {
    let output = run(&[trajectories::IDENTICAL]);
    assert_eq!(stdout(&output), "0.0000\n");
}

#[test]
fn empty_file() -> std::io::Result<()> {
    let file = NamedTempFile::new()?;
    let output = run(&[file.path().to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty(), "no score should be printed");
    assert_eq!(stderr(&output), "flexcalc error: no frames in trajectory\n");
    Ok(())
}

#[test]
fn mismatch() {
    let output = run(&[trajectories::MISMATCH]);
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    let stderr = stderr(&output);
    assert!(stderr.starts_with("flexcalc error: "), "{stderr}");
    assert!(stderr.contains("frame 'c'"), "{stderr}");
}

#[test]
fn malformed() {
    let strict = run(&[trajectories::MALFORMED]);
    assert_eq!(strict.status.code(), Some(1));
    assert_eq!(
        stderr(&strict),
        "flexcalc error: unable to parse coordinates on line 6: '1.0 zero 0.0'\n"
    );

    let lenient = run(&["--lenient", trajectories::MALFORMED]);
    assert_eq!(lenient.status.code(), Some(0));
    assert_eq!(stdout(&lenient), "0.0000\n");
}

#[test]
fn missing_file() {
    let output = run(&["tests/trajectories/does_not_exist.traj"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("unable to open"));
}

#[test]
fn usage_without_arguments() {
    let output = run(&[]);
    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).contains("Usage"));
}

#[test]
fn help_and_version() {
    let help = run(&["--help"]);
    assert_eq!(help.status.code(), Some(0));
    assert!(stdout(&help).contains("Usage"));
    assert!(help.stderr.is_empty());

    let version = run(&["--version"]);
    assert_eq!(version.status.code(), Some(0));
    assert_eq!(
        stdout(&version),
        concat!("flexcalc ", env!("CARGO_PKG_VERSION"), "\n")
    );
}

#[test]
fn stdin() -> std::io::Result<()> {
    let mut child = Command::new(BIN)
        .arg("-")
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;
    child
        .stdin
        .take()
        .expect("stdin should be piped")
        .write_all(b">f1\n0 0 0\n2 0 0\n>f2\n0 0 0\n0 0 0\n")?;
    let output = child.wait_with_output()?;
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout(&output), "0.7071\n");
    Ok(())
}

#[test]
fn generated() -> std::io::Result<()> {
    // A rigid body shifted along x by 0, 1, 2 and 3: the mean lies halfway, and both middle
    // frames are 0.5 away from it. The earlier of the two is the reference.
    let mut file = NamedTempFile::new()?;
    for shift in 0..4 {
        writeln!(file, ">shift {shift}")?;
        for atom in 0..10 {
            writeln!(file, "{} {} 0.0", shift as f64 + atom as f64, atom % 3)?;
        }
    }
    file.flush()?;
    let output = run(&[file.path().to_str().unwrap()]);
    // Distances to shift 1 are 1, 0, 1, 2.
    assert_eq!(stdout(&output), "1.0000\n");
    Ok(())
}
