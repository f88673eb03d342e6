#![allow(dead_code)]

pub mod trajectories {
    pub const TWO: &str = "tests/trajectories/two_frames.traj";
    pub const WOBBLE: &str = "tests/trajectories/wobble.traj";
    pub const IDENTICAL: &str = "tests/trajectories/identical.traj";
    pub const MISMATCH: &str = "tests/trajectories/mismatch.traj";
    pub const MALFORMED: &str = "tests/trajectories/malformed.traj";
    pub const HEADERLESS: &str = "tests/trajectories/headerless.traj";

    /// Every fixture that holds at least one frame.
    pub const ALL: [&str; 5] = [TWO, WOBBLE, IDENTICAL, MISMATCH, MALFORMED];
}
