use std::path::{Path, PathBuf};

use anyhow::{Context, Error};
use chrono::NaiveDate;

use crate::{
    front::FrontTable,
    record::StationTable,
    variant::{DepthSign, Dimension, Station, Variant},
    writer::write_submission,
};

/// Rendering of numbers in the submission format.
pub mod format;

/// Rupture front tables.
pub mod front;
mod header;

/// Numerical integration of recorded time series.
pub mod integrate;

/// Batch conversion driven by JSON job files.
pub mod jobs;

/// Station tables: per-row assembly of the output fields.
pub mod record;

/// Submission layouts, stations and sign conventions.
pub mod variant;

/// Generic writing of submission files.
pub mod writer;

pub use fdfault_output::{
    ChannelSeries, ChannelSource, FrontSource, FrontSurface, MemorySource, OutputReader,
};
pub use header::CODE_NAME;

/// Options shared by all exporters.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportOptions {
    /// Sign applied to every depth-derived value
    pub depth_sign: DepthSign,
    /// Person who ran the simulation
    pub author: String,
    /// Code version used in the simulation
    pub version: String,
    /// Grid spacing used in the simulation
    pub grid_spacing: String,
    /// Whether station files carry the normal field group
    pub include_normal: bool,
    /// Date written into the header
    pub date: NaiveDate,
}

impl ExportOptions {
    /// Creates options with positive depth, empty free-text fields and the
    /// normal field group included.
    pub fn new(date: NaiveDate) -> Self {
        Self {
            depth_sign: DepthSign::Positive,
            author: String::new(),
            version: String::new(),
            grid_spacing: String::new(),
            include_normal: true,
            date,
        }
    }
}

/// Converts the channels of a single station into a submission file and
/// returns the path of the written file.
///
/// The layout of the file follows from the placement of `station` (on or off
/// the fault), the `dimension` of the problem and
/// [`ExportOptions::include_normal`]. The file is written to
/// `{problem}_faultst{strike}dp{depth}.txt` (on fault) or
/// `{problem}_body{across}st{strike}dp{depth}.txt` (off fault) inside
/// `output_dir`, an existing file is replaced.
///
/// All channels are read and checked before the file is created, so a
/// missing channel or inconsistent sample counts never leave a file behind.
///
/// # Examples
/// ```no_run
/// # use anyhow::Error;
/// # fn main() -> Result<(), Error> {
/// use std::path::Path;
///
/// use chrono::NaiveDate;
/// use fdfault_scec::{
///     ExportOptions, OutputReader,
///     variant::{DepthSign, Dimension, Station},
/// };
///
/// // The simulation wrote its output for run `tpv5` into `data/`.
/// let reader = OutputReader::new("data");
///
/// let mut options = ExportOptions::new(NaiveDate::from_ymd_opt(2016, 3, 7).unwrap());
/// options.depth_sign = DepthSign::Negative;
/// options.author = "Jane Doe".into();
///
/// let path = fdfault_scec::export_station(
///     &reader,
///     "tpv5",
///     &Station::fault("-075", "075"),
///     Dimension::Three,
///     &options,
///     Path::new("."),
/// )?;
/// assert_eq!(path, Path::new("./tpv5_faultst-075dp075.txt"));
/// # Ok(())
/// # }
/// ```
pub fn export_station<S: ChannelSource + ?Sized>(
    source: &S,
    problem: &str,
    station: &Station,
    dimension: Dimension,
    options: &ExportOptions,
    output_dir: &Path,
) -> Result<PathBuf, Error> {
    let variant = Variant::new(dimension, station.placement(), options.include_normal);
    let table = StationTable::assemble(source, problem, station, variant, options.depth_sign)?;

    write_submission(&table, problem, options, output_dir)
}

/// Converts the rupture front of interface `iface` into the submission file
/// `{problem}_cplot.txt` inside `output_dir` and returns its path.
///
/// Points the rupture never reached (negative arrival time) are written with
/// an arrival time of [`front::UNRUPTURED_TIME`].
pub fn export_front<S: FrontSource + ?Sized>(
    source: &S,
    problem: &str,
    iface: usize,
    options: &ExportOptions,
    output_dir: &Path,
) -> Result<PathBuf, Error> {
    let front = source
        .fetch_front(problem, iface)
        .with_context(|| format!("Could not fetch front {iface} of {problem}"))?;

    write_submission(
        &FrontTable::new(&front, options.depth_sign),
        problem,
        options,
        output_dir,
    )
}
