use std::collections::TryReserveError;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong while scoring a trajectory.
///
/// All of these are fatal. A score is only meaningful if every frame in the trajectory is
/// well-formed and has the same shape, so there is no such thing as a partial result.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("no frames in trajectory")]
    NoFrames,

    /// A frame without any coordinates. An RMSD over zero atoms is undefined.
    #[error("frame '{header}' contains no coordinates")]
    EmptyFrame { header: String },

    /// A frame disagrees with the reference about the number of atoms.
    #[error("frame '{header}' has {found} atoms, expected {expected}")]
    ShapeMismatch {
        header: String,
        expected: usize,
        found: usize,
    },

    #[error("unable to parse coordinates on line {line}: '{content}'")]
    Parse { line: usize, content: String },

    #[error("unable to allocate memory for frame '{header}': {source}")]
    Alloc {
        header: String,
        #[source]
        source: TryReserveError,
    },

    #[error("unable to calculate mean coordinates: {0}")]
    MeanCoordinates(#[source] Box<Error>),

    #[error("couldn't find closest frame")]
    ClosestFrame,

    #[error("unable to calculate mean RMSD (frame '{header}'): {source}")]
    MeanRmsd {
        header: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// The header of the frame that caused this error, if it is known.
    pub fn header(&self) -> Option<&str> {
        match self {
            Error::EmptyFrame { header }
            | Error::ShapeMismatch { header, .. }
            | Error::Alloc { header, .. }
            | Error::MeanRmsd { header, .. } => Some(header),
            Error::MeanCoordinates(inner) => inner.header(),
            Error::Io(_) | Error::NoFrames | Error::Parse { .. } | Error::ClosestFrame => None,
        }
    }
}
