use std::{
    path::{Path, PathBuf},
    str::{FromStr, SplitWhitespace},
};

use anyhow::{Context, Error, anyhow, bail, ensure};
use log::debug;

use crate::{ChannelSeries, ChannelSource, FrontSource, FrontSurface};

const F64_SIZE: usize = std::mem::size_of::<f64>();

/// Byte order of the binary data files
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    Little,
    Big,
}

impl Endian {
    fn decode(&self, bytes: [u8; F64_SIZE]) -> f64 {
        match self {
            Endian::Little => f64::from_le_bytes(bytes),
            Endian::Big => f64::from_be_bytes(bytes),
        }
    }

    /// Encodes `values` in this byte order.
    pub fn encode(&self, values: &[f64]) -> Vec<u8> {
        values
            .iter()
            .flat_map(|value| match self {
                Endian::Little => value.to_le_bytes(),
                Endian::Big => value.to_be_bytes(),
            })
            .collect()
    }
}

impl FromStr for Endian {
    type Err = Error;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        match token {
            "<" => Ok(Endian::Little),
            ">" => Ok(Endian::Big),
            _ => Err(anyhow!("Byte order token {token:?} was not recognized")),
        }
    }
}

/// Whitespace separated tokens of a `.o` metadata file.
struct Tokens<'a> {
    path: &'a Path,
    inner: SplitWhitespace<'a>,
}

impl<'a> Tokens<'a> {
    fn new(path: &'a Path, content: &'a str) -> Self {
        Self {
            path,
            inner: content.split_whitespace(),
        }
    }

    fn next<T>(&mut self, what: &str) -> Result<T, Error>
    where
        T: FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        let token = self
            .inner
            .next()
            .ok_or_else(|| anyhow!("{} ends before {what}", self.path.display()))?;

        token
            .parse()
            .with_context(|| format!("Invalid {what} {token:?} in {}", self.path.display()))
    }

    fn endian(&mut self) -> Result<Endian, Error> {
        match self.inner.next() {
            Some(token) => token.parse(),
            None => bail!("{} ends before the byte order", self.path.display()),
        }
    }
}

/// Metadata of a station output unit.
#[derive(Debug, PartialEq, Eq)]
struct UnitHeader {
    field: String,
    nt: usize,
    n_points: usize,
    endian: Endian,
}

impl UnitHeader {
    fn parse(path: &Path, content: &str) -> Result<Self, Error> {
        let mut tokens = Tokens::new(path, content);
        let field: String = tokens.next("field name")?;

        // Time and space index ranges: (tm, tp, ts), (xm, xp, xs), ...
        for what in ["time range", "x range", "y range", "z range"] {
            for _ in 0..3 {
                tokens.next::<i64>(what)?;
            }
        }

        let nt: usize = tokens.next("nt")?;
        let mut n_points = 1_usize;
        for what in ["nx", "ny", "nz"] {
            n_points = n_points
                .checked_mul(tokens.next(what)?)
                .ok_or_else(|| anyhow!("Grid size overflows in {}", path.display()))?;
        }

        Ok(Self {
            field,
            nt,
            n_points,
            endian: tokens.endian()?,
        })
    }
}

/// Reads the binary output of a simulation run from a data directory.
///
/// An output unit called `name` of the run `problem` consists of the ASCII
/// metadata file `{problem}_{name}.o` and the raw `f64` data files
/// `{problem}_{name}_{suffix}.dat`.
pub struct OutputReader {
    data_dir: PathBuf,
}

impl OutputReader {
    pub fn new<P: Into<PathBuf>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    fn unit_file(&self, problem: &str, name: &str, suffix: &str) -> PathBuf {
        self.data_dir.join(format!("{problem}_{name}{suffix}"))
    }

    fn read_metadata(&self, path: &Path) -> Result<String, Error> {
        std::fs::read_to_string(path)
            .with_context(|| format!("Could not read output metadata {}", path.display()))
    }
}

/// Reads exactly `count` values of type `f64` from a raw data file.
fn read_values(path: &Path, count: usize, endian: Endian) -> Result<Vec<f64>, Error> {
    let expected = count
        .checked_mul(F64_SIZE)
        .ok_or_else(|| anyhow!("{count} values overflow the size of {}", path.display()))?;
    let bytes = std::fs::read(path)
        .with_context(|| format!("Could not read output data {}", path.display()))?;

    ensure!(
        bytes.len() == expected,
        "{} holds {} bytes, expected {} values of {F64_SIZE} bytes",
        path.display(),
        bytes.len(),
        count
    );

    Ok(bytes
        .chunks_exact(F64_SIZE)
        .map(|chunk| {
            let mut buffer = [0; F64_SIZE];
            buffer.copy_from_slice(chunk);
            endian.decode(buffer)
        })
        .collect())
}

/// Reads the single coordinate of a station, returning `None` if the file is absent.
fn read_coordinate(path: &Path, endian: Endian) -> Result<Option<f64>, Error> {
    if !path.exists() {
        return Ok(None);
    }

    Ok(read_values(path, 1, endian)?.first().copied())
}

impl ChannelSource for OutputReader {
    fn fetch(&self, problem: &str, channel: &str) -> Result<ChannelSeries, Error> {
        let meta_path = self.unit_file(problem, channel, ".o");
        let header = UnitHeader::parse(&meta_path, &self.read_metadata(&meta_path)?)?;

        ensure!(
            header.n_points == 1,
            "Output unit {channel} covers {} points, expected a single station",
            header.n_points
        );

        let endian = header.endian;
        let time = read_values(
            &self.unit_file(problem, channel, "_t.dat"),
            header.nt,
            endian,
        )?;
        let values = read_values(
            &self.unit_file(problem, channel, &format!("_{}.dat", header.field)),
            header.nt,
            endian,
        )?;

        let mut position = [0.0; 3];
        for (axis, coordinate) in ["x", "y", "z"].into_iter().zip(position.iter_mut()) {
            let path = self.unit_file(problem, channel, &format!("_{axis}.dat"));
            match read_coordinate(&path, endian)? {
                Some(value) => *coordinate = value,
                None if axis == "z" => {}
                None => bail!("Missing station coordinate file {}", path.display()),
            }
        }

        debug!(
            "Read channel {channel} of {problem}: field {}, {} samples",
            header.field, header.nt
        );

        ChannelSeries::new(time, position).with_component(header.field, values)
    }
}

impl FrontSource for OutputReader {
    fn fetch_front(&self, problem: &str, iface: usize) -> Result<FrontSurface, Error> {
        let name = format!("front_{iface}");
        let meta_path = self.unit_file(problem, &name, ".o");
        let content = self.read_metadata(&meta_path)?;

        let mut tokens = Tokens::new(&meta_path, &content);
        let nx: usize = tokens.next("nx")?;
        let ny: usize = tokens.next("ny")?;
        let endian = tokens.endian()?;
        let n = nx
            .checked_mul(ny)
            .ok_or_else(|| anyhow!("Front grid overflows in {}", meta_path.display()))?;

        let [x, z, t] = ["_x.dat", "_z.dat", "_t.dat"]
            .map(|suffix| read_values(&self.unit_file(problem, &name, suffix), n, endian));

        debug!("Read rupture front {iface} of {problem}: {nx} x {ny} points");

        FrontSurface::new(nx, ny, x?, z?, t?)
    }
}
