//! The passes over a trajectory that together produce its flexibility score.
//!
//! Each pass starts by sending the reader home and leaves it home once it is done. Passes never
//! hold more than the frame currently being read, plus the mean or closest frame they were given.
use std::fmt;
use std::io::{BufRead, Seek};

use crate::{Error, Frame, Result, TrajReader};

/// The outcome of a [`flexibility`] run.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub nframes: usize,
    pub natoms: usize,
    /// Header of the frame closest to the mean positions.
    pub closest_header: String,
    /// RMSD of the closest frame to the mean positions.
    pub closest_rmsd: f64,
    /// The flexibility score: mean RMSD of all frames to the closest frame.
    pub mean_rmsd: f64,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}", self.mean_rmsd)
    }
}

/// Returns the root-mean-square deviation between the positions of two frames.
///
/// # Errors
///
/// If the frames do not have the same number of atoms, an [`Error::ShapeMismatch`] naming the
/// header of `frame` is returned. Frames without any atoms give an [`Error::EmptyFrame`].
pub fn rmsd(reference: &Frame, frame: &Frame) -> Result<f64> {
    let natoms = reference.natoms();
    if frame.natoms() != natoms {
        return Err(Error::ShapeMismatch {
            header: frame.header.clone(),
            expected: natoms,
            found: frame.natoms(),
        });
    }
    if natoms == 0 {
        return Err(Error::EmptyFrame {
            header: frame.header.clone(),
        });
    }

    let sum: f64 = reference
        .coords()
        .zip(frame.coords())
        .map(|(a, b)| a.distance_squared(b))
        .sum();
    Ok((sum / natoms as f64).sqrt())
}

/// Calculate the per-atom mean positions over all frames.
///
/// The first frame determines the shape of the mean frame. Every position is divided by
/// `nframes` before it is added, which keeps the running sums at the magnitude of the
/// coordinates themselves.
///
/// # Errors
///
/// Any frame with a different number of atoms than the first aborts the pass with an
/// [`Error::ShapeMismatch`].
pub fn mean_frame<R: BufRead + Seek>(
    reader: &mut TrajReader<R>,
    nframes: usize,
) -> Result<Frame> {
    if nframes == 0 {
        return Err(Error::NoFrames);
    }
    reader.home()?;

    let n = nframes as f64;
    let mut frame = Frame::default();
    let mut mean: Option<Frame> = None;
    while reader.read_frame(&mut frame)? {
        let mean = mean.get_or_insert_with(|| Frame::zeroed(frame.natoms()));
        if frame.natoms() != mean.natoms() {
            return Err(Error::ShapeMismatch {
                header: std::mem::take(&mut frame.header),
                expected: mean.natoms(),
                found: frame.natoms(),
            });
        }
        if frame.natoms() == 0 {
            return Err(Error::EmptyFrame {
                header: std::mem::take(&mut frame.header),
            });
        }
        for (m, &p) in mean.positions.iter_mut().zip(&frame.positions) {
            *m += p / n;
        }
    }

    let read = reader.step();
    reader.home()?;
    if read != nframes {
        log::warn!("averaged over {nframes} frames, but read {read}");
    }
    mean.ok_or(Error::NoFrames)
}

/// Find the frame with the lowest RMSD to `mean`, together with that RMSD.
///
/// When several frames are equally close, the earliest one is kept. Returns [`None`] if the
/// trajectory holds no frames.
pub fn closest_to_mean<R: BufRead + Seek>(
    reader: &mut TrajReader<R>,
    mean: &Frame,
) -> Result<Option<(Frame, f64)>> {
    reader.home()?;

    let mut closest: Option<(Frame, f64)> = None;
    let mut frame = Frame::default();
    while reader.read_frame(&mut frame)? {
        let deviation = rmsd(mean, &frame)?;
        let improves = match &closest {
            None => true,
            Some((_, lowest)) => deviation < *lowest,
        };
        if improves {
            // Take the frame wholesale. The old best is dropped and the next read starts in a
            // fresh buffer.
            closest = Some((std::mem::take(&mut frame), deviation));
        }
    }

    reader.home()?;
    Ok(closest)
}

/// Calculate the mean RMSD of all frames to `closest`.
///
/// # Errors
///
/// An RMSD that cannot be computed is reported as [`Error::MeanRmsd`], carrying the header of
/// the offending frame.
pub fn mean_rmsd<R: BufRead + Seek>(
    reader: &mut TrajReader<R>,
    closest: &Frame,
    nframes: usize,
) -> Result<f64> {
    if nframes == 0 {
        return Err(Error::NoFrames);
    }
    reader.home()?;

    let mut total = 0.0;
    let mut frame = Frame::default();
    while reader.read_frame(&mut frame)? {
        total += rmsd(closest, &frame).map_err(|source| Error::MeanRmsd {
            header: frame.header.clone(),
            source: Box::new(source),
        })?;
    }

    reader.home()?;
    Ok(total / nframes as f64)
}

/// Calculate the flexibility of the trajectory behind `reader`.
///
/// This runs four passes over the source, strictly in this order, since each one depends on the
/// result of the one before it:
///
/// 1. count the frames,
/// 2. average their positions into a mean frame,
/// 3. find the frame closest to that mean,
/// 4. average the RMSD of all frames to the closest frame.
pub fn flexibility<R: BufRead + Seek>(reader: &mut TrajReader<R>) -> Result<Summary> {
    let nframes = reader.count_frames()?;
    if nframes == 0 {
        return Err(Error::NoFrames);
    }
    log::info!("counted {nframes} frames");

    let mean = mean_frame(reader, nframes).map_err(|err| match err {
        Error::ShapeMismatch { .. } | Error::EmptyFrame { .. } => {
            Error::MeanCoordinates(Box::new(err))
        }
        err => err,
    })?;
    log::debug!("mean frame holds {} atoms", mean.natoms());

    let (closest, closest_rmsd) = closest_to_mean(reader, &mean)?.ok_or(Error::ClosestFrame)?;
    log::info!(
        "frame '{}' is closest to the mean (rmsd {closest_rmsd:.4})",
        closest.header
    );

    let mean_rmsd = mean_rmsd(reader, &closest, nframes)?;
    log::debug!("mean rmsd to '{}' is {mean_rmsd}", closest.header);

    Ok(Summary {
        nframes,
        natoms: mean.natoms(),
        closest_header: closest.header,
        closest_rmsd,
        mean_rmsd,
    })
}
