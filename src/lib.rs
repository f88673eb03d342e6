//! Score the flexibility of a trajectory without ever holding more than one frame in memory.
//!
//! The flexibility score is the mean RMSD of every frame against the frame that lies closest to
//! the per-atom mean positions. Computing it takes four sequential passes over the same source
//! (see [`flexibility`]), which is why a [`TrajReader`] needs a source it can rewind.
//!
//! ```no_run
//! let mut reader = flexcalc::TrajReader::open("trajectory.traj")?;
//! let summary = flexcalc::flexibility(&mut reader)?;
//! println!("{summary}");
//! # Ok::<(), flexcalc::Error>(())
//! ```
use std::fs::File;
use std::io::{self, BufRead, BufReader, Seek, SeekFrom};
use std::path::Path;

use glam::DVec3;

use crate::reader::{classify, header_token, parse_coords, Line};

pub use crate::analysis::{closest_to_mean, flexibility, mean_frame, mean_rmsd, rmsd, Summary};
pub use crate::error::{Error, Result};
pub use crate::reader::{Parsing, HEADER_MARKER};

pub mod analysis;
mod error;
pub mod reader;

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Frame {
    /// The label following the header marker. Empty for synthetic frames.
    pub header: String,
    pub positions: Vec<DVec3>,
}

impl Frame {
    pub fn new(header: impl Into<String>, positions: Vec<DVec3>) -> Self {
        Self {
            header: header.into(),
            positions,
        }
    }

    /// A headerless frame of `natoms` positions at the origin.
    pub fn zeroed(natoms: usize) -> Self {
        Self {
            header: String::new(),
            positions: vec![DVec3::ZERO; natoms],
        }
    }

    pub fn natoms(&self) -> usize {
        self.positions.len()
    }

    pub fn coords(&self) -> impl Iterator<Item = DVec3> + '_ {
        self.positions.iter().copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    AwaitingFirstHeader,
    InFrame,
    Exhausted,
}

/// A reader that produces one [`Frame`] at a time from a text trajectory.
///
/// The header line that ends a frame is also the header of the next one, so the reader holds on
/// to it between calls. Other than that single pending header, nothing is buffered beyond the
/// line currently being read.
#[derive(Debug)]
pub struct TrajReader<R> {
    pub file: R,
    parsing: Parsing,
    state: State,
    pending: Option<String>,
    line: Vec<u8>,
    lineno: usize,
    step: usize,
}

impl TrajReader<BufReader<File>> {
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> TrajReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            file: reader,
            parsing: Parsing::default(),
            state: State::AwaitingFirstHeader,
            pending: None,
            line: Vec::new(),
            lineno: 0,
            step: 0,
        }
    }

    /// Set how malformed coordinate lines are treated.
    pub fn with_parsing(mut self, parsing: Parsing) -> Self {
        self.parsing = parsing;
        self
    }

    pub fn parsing(&self) -> Parsing {
        self.parsing
    }

    /// The number of frames read since the last reset.
    pub fn step(&self) -> usize {
        self.step
    }

    /// Forget all parse state, as if no line has been read yet.
    ///
    /// This does not move the cursor of the underlying source. It is meant for sources that have
    /// been rewound by the caller. See [`TrajReader::home`] for seekable sources.
    pub fn reset(&mut self) {
        self.state = State::AwaitingFirstHeader;
        self.pending = None;
        self.line.clear();
        self.lineno = 0;
        self.step = 0;
    }

    /// Read the next line into `self.line` without its line terminator.
    ///
    /// The line is kept as raw bytes. Returns `false` at the end of the source.
    fn next_line(&mut self) -> io::Result<bool> {
        self.line.clear();
        if self.file.read_until(b'\n', &mut self.line)? == 0 {
            return Ok(false);
        }
        self.lineno += 1;
        while let Some(b'\n' | b'\r') = self.line.last() {
            self.line.pop();
        }
        Ok(true)
    }

    /// Reads the next frame into `frame` and advances one step.
    ///
    /// Returns `false` once the source is exhausted, in which case `frame` is left empty. Lines
    /// before the first header and blank lines are skipped.
    pub fn read_frame(&mut self, frame: &mut Frame) -> Result<bool> {
        frame.header.clear();
        frame.positions.clear();

        if self.state == State::AwaitingFirstHeader {
            loop {
                if !self.next_line()? {
                    self.state = State::Exhausted;
                    return Ok(false);
                }
                match classify(&self.line) {
                    Line::Header(token) => {
                        self.pending = Some(header_token(token));
                        self.state = State::InFrame;
                        break;
                    }
                    Line::Blank => {}
                    Line::Coords(content) => log::debug!(
                        "skipping line {} before the first header: '{}'",
                        self.lineno,
                        String::from_utf8_lossy(content).trim()
                    ),
                }
            }
        }

        match (self.state, self.pending.take()) {
            (State::InFrame, Some(header)) => frame.header = header,
            _ => {
                self.state = State::Exhausted;
                return Ok(false);
            }
        }

        while self.next_line()? {
            match classify(&self.line) {
                Line::Header(token) => {
                    self.pending = Some(header_token(token));
                    break;
                }
                Line::Blank => {}
                Line::Coords(content) => {
                    let position = parse_coords(content, self.lineno, self.parsing)?;
                    frame
                        .positions
                        .try_reserve(1)
                        .map_err(|source| Error::Alloc {
                            header: frame.header.clone(),
                            source,
                        })?;
                    frame.positions.push(position);
                }
            }
        }

        if self.pending.is_none() {
            self.state = State::Exhausted;
        }
        self.step += 1;

        Ok(true)
    }
}

impl<R: BufRead + Seek> TrajReader<R> {
    /// Rewind the source to its start and reset the parse state.
    pub fn home(&mut self) -> io::Result<()> {
        self.file.seek(SeekFrom::Start(0))?;
        self.reset();
        Ok(())
    }

    /// Count the frames in the trajectory by counting its header lines.
    ///
    /// The source is read from its start, and is left rewound.
    pub fn count_frames(&mut self) -> Result<usize> {
        self.home()?;
        let mut nframes = 0;
        while self.next_line()? {
            if let Line::Header(_) = classify(&self.line) {
                nframes += 1;
            }
        }
        self.home()?;
        Ok(nframes)
    }
}

impl<R: BufRead> Iterator for TrajReader<R> {
    type Item = Result<Frame>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut frame = Frame::default();
        match self.read_frame(&mut frame) {
            Ok(true) => Some(Ok(frame)),
            Ok(false) => None,
            Err(err) => Some(Err(err)),
        }
    }
}
