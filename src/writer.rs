use std::{
    fs::OpenOptions,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Error};
use log::info;

use crate::{
    ExportOptions,
    header::{write_legend, write_preamble},
    variant::Column,
};

/// Common trait for data that can be written as a benchmark submission file
pub trait Submission {
    /// Returns the file name of the submission for the run `problem`.
    fn file_name(&self, problem: &str) -> String;

    /// Returns the columns of the data rows, in order.
    fn columns(&self) -> Vec<Column>;

    /// Writes metadata lines that follow the shared preamble.
    fn write_metadata<W: Write>(&self, _output: &mut W) -> Result<(), Error> {
        Ok(())
    }

    /// Writes one line per data row.
    fn write_rows<W: Write>(&self, output: &mut W) -> Result<(), Error>;
}

/// Encodes `submission` into `output`: preamble, submission specific metadata,
/// column legend and data rows.
pub fn encode<S: Submission, W: Write>(
    submission: &S,
    problem: &str,
    options: &ExportOptions,
    mut output: W,
) -> Result<(), Error> {
    write_preamble(&mut output, problem, options)?;
    submission.write_metadata(&mut output)?;
    write_legend(&mut output, &submission.columns())?;
    submission.write_rows(&mut output)?;

    output.flush()?;

    Ok(())
}

/// Writes `submission` into `output_dir`, replacing any previous file of the
/// same name, and returns the path of the written file.
pub fn write_submission<S: Submission>(
    submission: &S,
    problem: &str,
    options: &ExportOptions,
    output_dir: &Path,
) -> Result<PathBuf, Error> {
    let path = output_dir.join(submission.file_name(problem));
    let writer = BufWriter::new(
        OpenOptions::new()
            .truncate(true)
            .write(true)
            .create(true)
            .open(&path)
            .with_context(|| format!("Could not create {}", path.display()))?,
    );

    encode(submission, problem, options, writer)
        .with_context(|| format!("Could not write {}", path.display()))?;

    info!("Wrote {}", path.display());

    Ok(path)
}
