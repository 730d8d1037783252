use std::path::{Path, PathBuf};

use anyhow::{Context, Error};
use chrono::NaiveDate;
use fdfault_output::{ChannelSource, FrontSource};
use log::info;
use serde::{Deserialize, Serialize};

use crate::{
    ExportOptions, export_front, export_station,
    variant::{DepthSign, Dimension, Station},
};

fn include_normal() -> bool {
    true
}

/// A single conversion of a batch job file.
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ExportJob {
    OnFault {
        strike: String,
        depth: String,
        #[serde(default)]
        dimension: Dimension,
        #[serde(default = "include_normal")]
        normal: bool,
    },
    OffFault {
        strike: String,
        across: String,
        depth: String,
        #[serde(default)]
        dimension: Dimension,
        #[serde(default = "include_normal")]
        normal: bool,
    },
    Front {
        #[serde(default)]
        iface: usize,
    },
}

/// A list of conversions for one simulation run, sharing header options.
///
/// ```json
/// {
///     "problem": "tpv5",
///     "depthsign": -1,
///     "author": "Jane Doe",
///     "exports": [
///         { "kind": "on-fault", "strike": "-075", "depth": "075" },
///         { "kind": "off-fault", "strike": "000", "across": "030", "depth": "000", "dimension": "2d" },
///         { "kind": "front" }
///     ]
/// }
/// ```
#[derive(Serialize, Deserialize, PartialEq, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct JobFile {
    pub problem: String,
    #[serde(default)]
    pub depthsign: DepthSign,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub grid_spacing: String,
    /// Header date, today if absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    pub exports: Vec<ExportJob>,
}

impl JobFile {
    pub fn from_json(json: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reads a job file from disk.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Could not read job file {}", path.display()))?;

        Self::from_json(&json).with_context(|| format!("Invalid job file {}", path.display()))
    }

    /// Returns the header options of this job file; `today` is used if the
    /// file does not pin a date.
    pub fn options(&self, today: NaiveDate) -> ExportOptions {
        ExportOptions {
            depth_sign: self.depthsign,
            author: self.author.clone(),
            version: self.version.clone(),
            grid_spacing: self.grid_spacing.clone(),
            include_normal: true,
            date: self.date.unwrap_or(today),
        }
    }

    /// Runs all conversions in order and returns the paths of the written files.
    ///
    /// # Errors
    ///
    /// Stops at the first failing conversion, files written before it are kept.
    pub fn run<S: ChannelSource + FrontSource + ?Sized>(
        &self,
        source: &S,
        today: NaiveDate,
        output_dir: &Path,
    ) -> Result<Vec<PathBuf>, Error> {
        let mut options = self.options(today);
        let mut written = Vec::with_capacity(self.exports.len());

        for (idx, job) in self.exports.iter().enumerate() {
            let path = match job {
                ExportJob::OnFault {
                    strike,
                    depth,
                    dimension,
                    normal,
                } => {
                    options.include_normal = *normal;
                    export_station(
                        source,
                        &self.problem,
                        &Station::fault(strike.as_str(), depth.as_str()),
                        *dimension,
                        &options,
                        output_dir,
                    )
                }
                ExportJob::OffFault {
                    strike,
                    across,
                    depth,
                    dimension,
                    normal,
                } => {
                    options.include_normal = *normal;
                    export_station(
                        source,
                        &self.problem,
                        &Station::body(strike.as_str(), across.as_str(), depth.as_str()),
                        *dimension,
                        &options,
                        output_dir,
                    )
                }
                ExportJob::Front { iface } => {
                    export_front(source, &self.problem, *iface, &options, output_dir)
                }
            }
            .with_context(|| format!("Export #{} of {} failed", idx + 1, self.problem))?;

            written.push(path);
        }

        info!("Wrote {} files for {}", written.len(), self.problem);

        Ok(written)
    }
}
