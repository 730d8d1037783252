use std::{fmt::Display, str::FromStr};

use anyhow::{Error, anyhow, bail};
use serde::{Deserialize, Serialize};

/// Sign convention of the depth axis in the written output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub enum DepthSign {
    /// Depth is reported as it is recorded by the simulation
    #[default]
    Positive,
    /// Depth is reported with flipped sign
    Negative,
}

impl DepthSign {
    pub fn factor(self) -> f64 {
        match self {
            DepthSign::Positive => 1.0,
            DepthSign::Negative => -1.0,
        }
    }

    pub fn apply(self, value: f64) -> f64 {
        self.factor() * value
    }
}

impl TryFrom<f64> for DepthSign {
    type Error = Error;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if value == 1.0 {
            Ok(DepthSign::Positive)
        } else if value == -1.0 {
            Ok(DepthSign::Negative)
        } else {
            bail!("Depth sign must be 1 or -1, got {value}")
        }
    }
}

impl From<DepthSign> for f64 {
    fn from(sign: DepthSign) -> Self {
        sign.factor()
    }
}

impl FromStr for DepthSign {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: f64 = s
            .trim()
            .parse()
            .map_err(|_| anyhow!("Depth sign must be 1 or -1, got {s:?}"))?;
        DepthSign::try_from(value)
    }
}

impl Display for DepthSign {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DepthSign::Positive => write!(f, "1"),
            DepthSign::Negative => write!(f, "-1"),
        }
    }
}

/// Dimensionality of the simulated problem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Dimension {
    #[serde(rename = "2d")]
    Two,
    #[default]
    #[serde(rename = "3d")]
    Three,
}

/// Where a station is located relative to the fault
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    OnFault,
    OffFault,
}

/// A station, identified by the coordinate strings used in its channel names.
///
/// The coordinates are kept verbatim, `"-075"` and `"-75"` are different stations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Station {
    /// A station on the fault surface
    Fault { strike: String, depth: String },
    /// A station embedded in the medium
    Body {
        strike: String,
        across: String,
        depth: String,
    },
}

impl Station {
    pub fn fault<S: Into<String>>(strike: S, depth: S) -> Self {
        Station::Fault {
            strike: strike.into(),
            depth: depth.into(),
        }
    }

    pub fn body<S: Into<String>>(strike: S, across: S, depth: S) -> Self {
        Station::Body {
            strike: strike.into(),
            across: across.into(),
            depth: depth.into(),
        }
    }

    pub fn placement(&self) -> Placement {
        match self {
            Station::Fault { .. } => Placement::OnFault,
            Station::Body { .. } => Placement::OffFault,
        }
    }

    /// Returns the station string that prefixes all channel names of this station.
    pub fn name(&self) -> String {
        match self {
            Station::Fault { strike, depth } => format!("faultst{strike}dp{depth}"),
            Station::Body {
                strike,
                across,
                depth,
            } => format!("body{across}st{strike}dp{depth}"),
        }
    }

    /// Returns the name of the channel recording `suffix` at this station.
    pub fn channel(&self, suffix: &str) -> String {
        format!("{}{suffix}", self.name())
    }
}

/// A column of a submission file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    /// Short name used in the column name line
    pub name: &'static str,
    /// Description used in the column legend
    pub legend: &'static str,
}

const fn column(name: &'static str, legend: &'static str) -> Column {
    Column { name, legend }
}

const TIME_COLUMN: Column = column("t", "Time (s)");

const ON_FAULT_COLUMNS: [Column; 6] = [
    column("h-slip", "horizontal slip (m)"),
    column("h-slip-rate", "horizontal slip rate (m/s)"),
    column("h-shear-stress", "horizontal shear stress (MPa)"),
    column("v-slip", "vertical slip (m)"),
    column("v-slip-rate", "vertical slip rate (m/s)"),
    column("v-shear-stress", "vertical shear stress (MPa)"),
];
const ON_FAULT_NORMAL_COLUMNS: [Column; 1] = [column("n-stress", "normal stress (MPa)")];

const OFF_FAULT_COLUMNS: [Column; 4] = [
    column("h-disp", "horizontal displacement (m)"),
    column("h-vel", "horizontal velocity (m/s)"),
    column("v-disp", "vertical displacement (m)"),
    column("v-vel", "vertical velocity (m/s)"),
];
const OFF_FAULT_NORMAL_COLUMNS: [Column; 2] = [
    column("n-disp", "normal displacement (m)"),
    column("n-vel", "normal velocity (m/s)"),
];

/// A component of a station channel that feeds an output column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Probe {
    /// Channel name suffix, appended to the station string
    pub suffix: &'static str,
    /// Name of the component inside the channel
    pub component: &'static str,
    /// Whether the depth sign applies to the values
    pub signed: bool,
}

const fn probe(suffix: &'static str, component: &'static str, signed: bool) -> Probe {
    Probe {
        suffix,
        component,
        signed,
    }
}

/// How the values of an output column are obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Derivation {
    /// The column is identically zero
    Zero,
    /// The column holds the recorded samples
    Sample(Probe),
    /// The column holds the running time integral of the recorded samples
    Integrate(Probe),
}

/// Describes which submission file layout is produced for a station.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Variant {
    pub dimension: Dimension,
    pub placement: Placement,
    /// Whether the normal stress (on fault) or the normal displacement and
    /// velocity (off fault) are part of the output
    pub include_normal: bool,
}

impl Variant {
    pub fn new(dimension: Dimension, placement: Placement, include_normal: bool) -> Self {
        Self {
            dimension,
            placement,
            include_normal,
        }
    }

    /// Returns all columns of this variant, starting with the time column.
    pub fn columns(&self) -> Vec<Column> {
        let (columns, normal): (&[Column], &[Column]) = match self.placement {
            Placement::OnFault => (&ON_FAULT_COLUMNS, &ON_FAULT_NORMAL_COLUMNS),
            Placement::OffFault => (&OFF_FAULT_COLUMNS, &OFF_FAULT_NORMAL_COLUMNS),
        };

        let mut all = vec![TIME_COLUMN];
        all.extend_from_slice(columns);
        if self.include_normal {
            all.extend_from_slice(normal);
        }
        all
    }

    /// Returns how each non-time column is derived, in column order.
    ///
    /// Two-dimensional problems have no strike direction, so their horizontal
    /// columns are zero and their depth axis is `y` instead of `z`.
    pub fn derivations(&self) -> Vec<Derivation> {
        use Derivation::{Integrate, Sample, Zero};

        let mut derivations = match (self.placement, self.dimension) {
            (Placement::OnFault, Dimension::Three) => vec![
                Sample(probe("-h-slip", "Ux", false)),
                Sample(probe("-h-slip-rate", "Vx", false)),
                Sample(probe("-h-shear-stress", "Sx", false)),
                Sample(probe("-v-slip", "Uz", false)),
                Sample(probe("-v-slip-rate", "Vz", false)),
                Sample(probe("-v-shear-stress", "Sz", false)),
            ],
            (Placement::OnFault, Dimension::Two) => vec![
                Zero,
                Zero,
                Zero,
                Sample(probe("-v-slip", "Uy", true)),
                Sample(probe("-v-slip-rate", "Vy", true)),
                Sample(probe("-v-shear-stress", "Sy", true)),
            ],
            (Placement::OffFault, Dimension::Three) => vec![
                Integrate(probe("-h-vel", "vx", false)),
                Sample(probe("-h-vel", "vx", false)),
                Integrate(probe("-v-vel", "vz", true)),
                Sample(probe("-v-vel", "vz", true)),
            ],
            (Placement::OffFault, Dimension::Two) => vec![
                Zero,
                Zero,
                Integrate(probe("-v-vel", "vy", true)),
                Sample(probe("-v-vel", "vy", true)),
            ],
        };

        if self.include_normal {
            match (self.placement, self.dimension) {
                (Placement::OnFault, _) => {
                    derivations.push(Sample(probe("-n-stress", "Sn", false)));
                }
                (Placement::OffFault, Dimension::Three) => {
                    derivations.push(Integrate(probe("-n-vel", "vy", false)));
                    derivations.push(Sample(probe("-n-vel", "vy", false)));
                }
                (Placement::OffFault, Dimension::Two) => {
                    derivations.push(Integrate(probe("-n-vel", "vx", false)));
                    derivations.push(Sample(probe("-n-vel", "vx", false)));
                }
            }
        }

        derivations
    }
}

#[cfg(test)]
mod tests {
    use super::{DepthSign, Derivation, Dimension, Placement, Station, Variant};

    #[test]
    fn accept_unit_depth_signs_only() {
        assert_eq!(DepthSign::try_from(1.0).unwrap(), DepthSign::Positive);
        assert_eq!(DepthSign::try_from(-1.0).unwrap(), DepthSign::Negative);

        for invalid in [0.0, 2.0, -0.5, 1.0000001, f64::NAN, f64::INFINITY] {
            DepthSign::try_from(invalid).unwrap_err();
        }
    }

    #[test]
    fn parse_depth_sign() {
        assert_eq!("-1".parse::<DepthSign>().unwrap(), DepthSign::Negative);
        assert_eq!("1.".parse::<DepthSign>().unwrap(), DepthSign::Positive);
        "down".parse::<DepthSign>().unwrap_err();
        "-2".parse::<DepthSign>().unwrap_err();
    }

    #[test]
    fn name_stations() {
        assert_eq!(Station::fault("-120", "075").name(), "faultst-120dp075");
        assert_eq!(
            Station::body("000", "030", "000").channel("-h-vel"),
            "body030st000dp000-h-vel"
        );
    }

    #[test]
    fn match_columns_and_derivations() {
        for dimension in [Dimension::Two, Dimension::Three] {
            for placement in [Placement::OnFault, Placement::OffFault] {
                for include_normal in [true, false] {
                    let variant = Variant::new(dimension, placement, include_normal);
                    assert_eq!(variant.columns().len(), variant.derivations().len() + 1);
                }
            }
        }
    }

    #[test]
    fn drop_normal_columns() {
        let names = |variant: Variant| -> Vec<&str> {
            variant.columns().iter().map(|column| column.name).collect()
        };

        assert_eq!(
            names(Variant::new(Dimension::Three, Placement::OnFault, true)),
            [
                "t",
                "h-slip",
                "h-slip-rate",
                "h-shear-stress",
                "v-slip",
                "v-slip-rate",
                "v-shear-stress",
                "n-stress",
            ]
        );
        assert_eq!(
            names(Variant::new(Dimension::Two, Placement::OffFault, false)),
            ["t", "h-disp", "h-vel", "v-disp", "v-vel"]
        );
    }

    #[test]
    fn zero_horizontal_axis_in_two_dimensions() {
        for placement in [Placement::OnFault, Placement::OffFault] {
            let derivations = Variant::new(Dimension::Two, placement, true).derivations();
            let n_horizontal = match placement {
                Placement::OnFault => 3,
                Placement::OffFault => 2,
            };

            let (horizontal, rest) = derivations.split_at(n_horizontal);
            assert!(horizontal.iter().all(|d| *d == Derivation::Zero));
            assert!(!rest.contains(&Derivation::Zero));
        }
    }
}
