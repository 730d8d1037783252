use std::io::Write;

use anyhow::Error;
use fdfault_output::FrontSurface;

use crate::{
    format::scientific,
    variant::{Column, DepthSign},
    writer::Submission,
};

/// Arrival time written for points the rupture never reached.
pub const UNRUPTURED_TIME: f64 = 1.0e9;

const KM_TO_M: f64 = 1000.0;
const PRECISION: usize = 6;

const FRONT_COLUMNS: [Column; 3] = [
    Column {
        name: "j",
        legend: "horizontal coordinate, distance along strike (m)",
    },
    Column {
        name: "k",
        legend: "vertical coordinate, distance down-dip (m)",
    },
    Column {
        name: "t",
        legend: "rupture time (s)",
    },
];

/// Rupture arrival times in submission units, one row per grid point.
///
/// Rows are ordered row-major over the grid: row `k` holds point
/// `(k / ny, k % ny)`. Readers rebuild the grid from this order.
#[derive(Debug, Clone, PartialEq)]
pub struct FrontTable {
    rows: Vec<[f64; 3]>,
}

impl FrontTable {
    pub fn new(front: &FrontSurface, depth_sign: DepthSign) -> Self {
        let mut rows = Vec::with_capacity(front.nx() * front.ny());

        for i in 0..front.nx() {
            for j in 0..front.ny() {
                let (x, z, t) = front.point(i, j);
                let t = if t < 0.0 { UNRUPTURED_TIME } else { t };
                rows.push([x * KM_TO_M, depth_sign.apply(z) * KM_TO_M, t]);
            }
        }

        Self { rows }
    }

    /// Returns the rows as `[along strike (m), down dip (m), arrival time (s)]`.
    pub fn rows(&self) -> &[[f64; 3]] {
        &self.rows
    }
}

impl Submission for FrontTable {
    fn file_name(&self, problem: &str) -> String {
        format!("{problem}_cplot.txt")
    }

    fn columns(&self) -> Vec<Column> {
        FRONT_COLUMNS.to_vec()
    }

    fn write_rows<W: Write>(&self, output: &mut W) -> Result<(), Error> {
        for row in &self.rows {
            let fields: Vec<String> = row.iter().map(|v| scientific(*v, PRECISION)).collect();
            writeln!(output, "{}", fields.join(" "))?;
        }

        Ok(())
    }
}
