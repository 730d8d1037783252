use anyhow::{Error, anyhow, ensure};

mod memory;

/// Utilities to read the binary output files written by fdfault.
pub mod reader;

pub use memory::MemorySource;
pub use reader::{Endian, OutputReader};

/// A time series recorded at a single station of a simulation run.
///
/// All components share the timestamps of the series, i.e. every component
/// holds exactly [`ChannelSeries::nt`] values.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelSeries {
    time: Vec<f64>,
    components: Vec<(String, Vec<f64>)>,
    position: [f64; 3],
}

impl ChannelSeries {
    /// Creates a series without any components.
    ///
    /// `position` holds the station coordinates `(x, y, z)` in km.
    pub fn new(time: Vec<f64>, position: [f64; 3]) -> Self {
        Self {
            time,
            components: Vec::new(),
            position,
        }
    }

    /// Adds a named component to the series.
    ///
    /// # Errors
    ///
    /// Fails if `values` does not hold exactly one value per timestamp or if a
    /// component with the same name already exists.
    pub fn with_component<S: Into<String>>(
        mut self,
        name: S,
        values: Vec<f64>,
    ) -> Result<Self, Error> {
        let name = name.into();
        ensure!(
            values.len() == self.time.len(),
            "Component {name} holds {} values, expected {}",
            values.len(),
            self.time.len()
        );
        ensure!(
            self.components.iter().all(|(existing, _)| *existing != name),
            "Component {name} was added twice"
        );
        self.components.push((name, values));
        Ok(self)
    }

    /// Returns the number of time samples.
    pub fn nt(&self) -> usize {
        self.time.len()
    }

    pub fn time(&self) -> &[f64] {
        &self.time
    }

    /// Returns the values of the component called `name`.
    pub fn component(&self, name: &str) -> Result<&[f64], Error> {
        self.components
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, values)| values.as_slice())
            .ok_or_else(|| anyhow!("Series has no component named {name}"))
    }

    pub fn position(&self) -> [f64; 3] {
        self.position
    }

    pub fn x(&self) -> f64 {
        self.position[0]
    }

    pub fn y(&self) -> f64 {
        self.position[1]
    }

    pub fn z(&self) -> f64 {
        self.position[2]
    }
}

/// Rupture arrival times sampled on an `nx × ny` grid over a fault surface.
///
/// The grid is stored row-major, the value of point `(i, j)` lives at
/// index `i * ny + j`.
#[derive(Debug, Clone, PartialEq)]
pub struct FrontSurface {
    nx: usize,
    ny: usize,
    x: Vec<f64>,
    z: Vec<f64>,
    t: Vec<f64>,
}

impl FrontSurface {
    /// Creates a front surface from along-strike coordinates `x`, down-dip
    /// coordinates `z` (both in km) and arrival times `t` (in s).
    ///
    /// # Errors
    ///
    /// Fails if any of the three sequences does not hold `nx * ny` values.
    pub fn new(
        nx: usize,
        ny: usize,
        x: Vec<f64>,
        z: Vec<f64>,
        t: Vec<f64>,
    ) -> Result<Self, Error> {
        let n = nx
            .checked_mul(ny)
            .ok_or_else(|| anyhow!("Front grid of {nx} x {ny} points is too large"))?;
        for (name, values) in [("x", &x), ("z", &z), ("t", &t)] {
            ensure!(
                values.len() == n,
                "Front {name} holds {} values, expected {n}",
                values.len()
            );
        }

        Ok(Self { nx, ny, x, z, t })
    }

    pub fn nx(&self) -> usize {
        self.nx
    }

    pub fn ny(&self) -> usize {
        self.ny
    }

    /// Returns `(x, z, t)` of grid point `(i, j)`.
    ///
    /// # Panics
    ///
    /// Panics if the point lies outside the grid.
    pub fn point(&self, i: usize, j: usize) -> (f64, f64, f64) {
        assert!(
            i < self.nx && j < self.ny,
            "Point ({i}, {j}) is off the grid"
        );
        let k = i * self.ny + j;
        (self.x[k], self.z[k], self.t[k])
    }
}

/// Common trait for sources of station time series
pub trait ChannelSource {
    /// Fetches the channel called `channel` that belongs to the run `problem`.
    fn fetch(&self, problem: &str, channel: &str) -> Result<ChannelSeries, Error>;
}

/// Common trait for sources of rupture front data
pub trait FrontSource {
    /// Fetches the rupture front recorded on interface `iface` of the run `problem`.
    fn fetch_front(&self, problem: &str, iface: usize) -> Result<FrontSurface, Error>;
}
