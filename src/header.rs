use std::io::Write;

use anyhow::Error;

use crate::{
    ExportOptions,
    format::shortest,
    variant::{Column, DepthSign, Dimension},
};

/// Identifies the simulation code in every submission file.
pub const CODE_NAME: &str = "fdfault";

/// Writes the metadata lines shared by all submission files.
pub(crate) fn write_preamble<W: Write>(
    output: &mut W,
    problem: &str,
    options: &ExportOptions,
) -> Result<(), Error> {
    writeln!(output, "# problem={problem}")?;
    writeln!(output, "# author={}", options.author)?;
    writeln!(output, "# date={}", options.date.format("%y/%m/%d"))?;
    writeln!(output, "# code={CODE_NAME}")?;
    writeln!(output, "# version={}", options.version)?;
    writeln!(output, "# element_size={}", options.grid_spacing)?;

    Ok(())
}

/// Writes the column legend followed by the column name line.
pub(crate) fn write_legend<W: Write>(output: &mut W, columns: &[Column]) -> Result<(), Error> {
    for (idx, column) in columns.iter().enumerate() {
        writeln!(output, "# Column #{} = {}", idx + 1, column.legend)?;
    }
    writeln!(output, "#")?;

    let names: Vec<&str> = columns.iter().map(|column| column.name).collect();
    writeln!(output, "{}", names.join(" "))?;
    writeln!(output, "#")?;

    Ok(())
}

/// Formats the station location in km.
///
/// In two dimensions the station has no strike coordinate, `x` is the
/// distance across the fault and `y` the depth. A zero depth prints as `0.0`
/// for either depth sign, never as `-0.0`.
pub(crate) fn location(dimension: Dimension, position: [f64; 3], depth_sign: DepthSign) -> String {
    let [x, y, z] = position;

    match dimension {
        Dimension::Three => format!(
            "{} km strike, {} km across, {} km depth",
            shortest(x),
            shortest(y),
            shortest(depth_sign.apply(z))
        ),
        Dimension::Two => format!(
            " 0 km strike, {} km across, {} km depth",
            shortest(x),
            shortest(depth_sign.apply(y))
        ),
    }
}
