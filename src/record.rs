use std::io::Write;

use anyhow::{Context, Error, anyhow, ensure};
use fdfault_output::{ChannelSeries, ChannelSource};
use log::debug;

use crate::{
    format::{scientific, shortest},
    header::location,
    integrate::cumulative_trapezoid,
    variant::{Column, DepthSign, Derivation, Probe, Station, Variant},
    writer::Submission,
};

/// Fractional digits of the time column
const TIME_PRECISION: usize = 12;
/// Fractional digits of all other columns
const FIELD_PRECISION: usize = 6;

/// A single output row: the time of the sample and the derived fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub time: f64,
    pub fields: Vec<f64>,
}

impl Record {
    /// Renders the row as space separated scientific notation.
    pub fn render(&self) -> String {
        let mut line = scientific(self.time, TIME_PRECISION);
        for field in &self.fields {
            line.push(' ');
            line.push_str(&scientific(*field, FIELD_PRECISION));
        }
        line
    }
}

/// The derived columns of one station, ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct StationTable {
    station: Station,
    variant: Variant,
    depth_sign: DepthSign,
    position: [f64; 3],
    time: Vec<f64>,
    columns: Vec<Vec<f64>>,
}

impl StationTable {
    /// Fetches all channels `variant` needs for `station` and derives the output columns.
    ///
    /// Time and station position are taken from the first channel read.
    ///
    /// # Errors
    ///
    /// Fails if a channel cannot be fetched, lacks the expected component, the
    /// channels disagree on the number of samples or hold fewer than two
    /// samples (the time step would be undefined).
    pub fn assemble<S: ChannelSource + ?Sized>(
        source: &S,
        problem: &str,
        station: &Station,
        variant: Variant,
        depth_sign: DepthSign,
    ) -> Result<Self, Error> {
        let derivations = variant.derivations();

        let mut channels: Vec<(&'static str, ChannelSeries)> = Vec::new();
        for derivation in &derivations {
            if let Derivation::Sample(probe) | Derivation::Integrate(probe) = derivation {
                if channels.iter().all(|(suffix, _)| *suffix != probe.suffix) {
                    let name = station.channel(probe.suffix);
                    let series = source
                        .fetch(problem, &name)
                        .with_context(|| format!("Could not fetch channel {name} of {problem}"))?;
                    debug!("Fetched {name}: {} samples", series.nt());
                    channels.push((probe.suffix, series));
                }
            }
        }

        let (first_suffix, reference) = channels
            .first()
            .ok_or_else(|| anyhow!("Station {} has no channels to export", station.name()))?;
        let nt = reference.nt();
        for (suffix, series) in &channels[1..] {
            ensure!(
                series.nt() == nt,
                "Channel {} holds {} samples but {} holds {nt}",
                station.channel(suffix),
                series.nt(),
                station.channel(first_suffix)
            );
        }
        ensure!(
            nt >= 2,
            "Channel {} holds {nt} samples, at least two are needed for a time step",
            station.channel(first_suffix)
        );

        let lookup = |probe: &Probe| -> Result<&ChannelSeries, Error> {
            channels
                .iter()
                .find(|(suffix, _)| *suffix == probe.suffix)
                .map(|(_, series)| series)
                .ok_or_else(|| anyhow!("Channel suffix {} was not fetched", probe.suffix))
        };
        let signed = |probe: &Probe, value: f64| {
            if probe.signed {
                depth_sign.apply(value)
            } else {
                value
            }
        };

        let columns = derivations
            .iter()
            .map(|derivation| -> Result<Vec<f64>, Error> {
                match derivation {
                    Derivation::Zero => Ok(vec![0.0; nt]),
                    Derivation::Sample(probe) => {
                        let values = lookup(probe)?.component(probe.component)?;
                        Ok(values.iter().map(|value| signed(probe, *value)).collect())
                    }
                    Derivation::Integrate(probe) => {
                        let series = lookup(probe)?;
                        let integral = cumulative_trapezoid(
                            series.time(),
                            series.component(probe.component)?,
                        )?;
                        Ok(integral.into_iter().map(|v| signed(probe, v)).collect())
                    }
                }
            })
            .collect::<Result<Vec<Vec<f64>>, Error>>()?;

        Ok(Self {
            station: station.clone(),
            variant,
            depth_sign,
            position: reference.position(),
            time: reference.time().to_vec(),
            columns,
        })
    }

    pub fn nt(&self) -> usize {
        self.time.len()
    }

    /// Returns the spacing of the first two samples.
    pub fn time_step(&self) -> f64 {
        self.time[1] - self.time[0]
    }

    /// Returns the `idx`-th output row.
    pub fn record(&self, idx: usize) -> Record {
        Record {
            time: self.time[idx],
            fields: self.columns.iter().map(|column| column[idx]).collect(),
        }
    }

    pub fn records(&self) -> impl Iterator<Item = Record> + '_ {
        (0..self.nt()).map(|idx| self.record(idx))
    }
}

impl Submission for StationTable {
    fn file_name(&self, problem: &str) -> String {
        format!("{problem}_{}.txt", self.station.name())
    }

    fn columns(&self) -> Vec<Column> {
        self.variant.columns()
    }

    fn write_metadata<W: Write>(&self, output: &mut W) -> Result<(), Error> {
        writeln!(output, "# time_step={} s", shortest(self.time_step()))?;
        writeln!(output, "# num_time_steps={}", self.nt())?;
        writeln!(
            output,
            "# location={}",
            location(self.variant.dimension, self.position, self.depth_sign)
        )?;

        Ok(())
    }

    fn write_rows<W: Write>(&self, output: &mut W) -> Result<(), Error> {
        for record in self.records() {
            writeln!(output, "{}", record.render())?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Error;
    use fdfault_output::{ChannelSeries, MemorySource};
    use rand_xoshiro::{
        Xoshiro256PlusPlus,
        rand_core::{RngCore, SeedableRng},
    };

    use super::{Record, StationTable};
    use crate::variant::{DepthSign, Derivation, Dimension, Placement, Station, Variant};

    const PROBLEM: &str = "tpv5";

    fn channel(time: &[f64], component: &str, values: Vec<f64>) -> ChannelSeries {
        ChannelSeries::new(time.to_vec(), [1.5, -2.0, 7.5])
            .with_component(component, values)
            .unwrap()
    }

    /// Registers one channel per `(suffix, component, values)` entry at `station`.
    fn fixed_source(
        station: &Station,
        time: &[f64],
        entries: &[(&str, &str, [f64; 2])],
    ) -> MemorySource {
        let mut source = MemorySource::new();
        for (suffix, component, values) in entries {
            let series = channel(time, component, values.to_vec());
            source.insert_channel(PROBLEM, &station.channel(suffix), series);
        }

        source
    }

    /// Registers random channels for every component `variant` reads at `station`.
    fn random_source(variant: Variant, station: &Station, nt: usize, seed: u64) -> MemorySource {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
        let time: Vec<f64> = (0..nt).map(|idx| idx as f64 * 0.005).collect();
        let mut source = MemorySource::new();

        for derivation in variant.derivations() {
            if let Derivation::Sample(probe) | Derivation::Integrate(probe) = derivation {
                let values = (0..nt)
                    .map(|_| (rng.next_u32() % 20_000) as f64 / 100.0 - 100.0)
                    .collect();
                let series = channel(&time, probe.component, values);
                source.insert_channel(PROBLEM, &station.channel(probe.suffix), series);
            }
        }

        source
    }

    fn station_for(placement: Placement) -> Station {
        match placement {
            Placement::OnFault => Station::fault("-120", "075"),
            Placement::OffFault => Station::body("000", "030", "000"),
        }
    }

    fn all_variants() -> Vec<Variant> {
        let mut variants = Vec::new();
        for dimension in [Dimension::Two, Dimension::Three] {
            for placement in [Placement::OnFault, Placement::OffFault] {
                for include_normal in [true, false] {
                    variants.push(Variant::new(dimension, placement, include_normal));
                }
            }
        }
        variants
    }

    #[test]
    fn assemble_off_fault_example() -> Result<(), Error> {
        let station = Station::body("000", "030", "000");
        let source = fixed_source(
            &station,
            &[0.0, 0.1],
            &[
                ("-h-vel", "vx", [0.0, 2.0]),
                ("-v-vel", "vz", [0.0, 1.0]),
                ("-n-vel", "vy", [0.0, 0.5]),
            ],
        );

        let variant = Variant::new(Dimension::Three, Placement::OffFault, true);
        let table =
            StationTable::assemble(&source, PROBLEM, &station, variant, DepthSign::Negative)?;

        assert_eq!(table.nt(), 2);
        assert_eq!(table.time_step(), 0.1);
        assert_eq!(
            table.record(1),
            Record {
                time: 0.1,
                fields: vec![0.1, 2.0, -0.05, -1.0, 0.025, 0.5],
            }
        );
        assert_eq!(
            table.record(0).render(),
            "0.000000000000E+00 0.000000E+00 0.000000E+00 0.000000E+00 0.000000E+00 \
             0.000000E+00 0.000000E+00"
        );
        assert_eq!(
            table.record(1).render(),
            "1.000000000000E-01 1.000000E-01 2.000000E+00 -5.000000E-02 -1.000000E+00 \
             2.500000E-02 5.000000E-01"
        );

        Ok(())
    }

    #[test]
    fn map_on_fault_3d_components_to_columns() -> Result<(), Error> {
        let station = Station::fault("-120", "075");
        let source = fixed_source(
            &station,
            &[0.0, 0.5],
            &[
                ("-h-slip", "Ux", [0.0, 1.0]),
                ("-h-slip-rate", "Vx", [0.0, 2.0]),
                ("-h-shear-stress", "Sx", [0.0, 3.0]),
                ("-v-slip", "Uz", [0.0, 4.0]),
                ("-v-slip-rate", "Vz", [0.0, 5.0]),
                ("-v-shear-stress", "Sz", [0.0, 6.0]),
                ("-n-stress", "Sn", [-120.0, -7.0]),
            ],
        );

        let variant = Variant::new(Dimension::Three, Placement::OnFault, true);
        let table =
            StationTable::assemble(&source, PROBLEM, &station, variant, DepthSign::Negative)?;

        assert_eq!(
            table.record(1).render(),
            "5.000000000000E-01 1.000000E+00 2.000000E+00 3.000000E+00 4.000000E+00 \
             5.000000E+00 6.000000E+00 -7.000000E+00"
        );
        assert_eq!(table.record(0).fields[6], -120.0);

        Ok(())
    }

    #[test]
    fn map_off_fault_2d_components_to_columns() -> Result<(), Error> {
        let station = Station::body("000", "030", "000");
        let source = fixed_source(
            &station,
            &[0.0, 0.1],
            &[("-v-vel", "vy", [0.0, 1.0]), ("-n-vel", "vx", [0.0, 0.5])],
        );

        let variant = Variant::new(Dimension::Two, Placement::OffFault, true);
        let table =
            StationTable::assemble(&source, PROBLEM, &station, variant, DepthSign::Negative)?;

        assert_eq!(
            table.record(1),
            Record {
                time: 0.1,
                fields: vec![0.0, 0.0, -0.05, -1.0, 0.025, 0.5],
            }
        );
        assert_eq!(
            table.record(1).render(),
            "1.000000000000E-01 0.000000E+00 0.000000E+00 -5.000000E-02 -1.000000E+00 \
             2.500000E-02 5.000000E-01"
        );

        Ok(())
    }

    #[test]
    fn keep_on_fault_3d_fields_unsigned() -> Result<(), Error> {
        let variant = Variant::new(Dimension::Three, Placement::OnFault, true);
        let station = station_for(Placement::OnFault);
        let source = random_source(variant, &station, 16, 3);

        let positive =
            StationTable::assemble(&source, PROBLEM, &station, variant, DepthSign::Positive)?;
        let negative =
            StationTable::assemble(&source, PROBLEM, &station, variant, DepthSign::Negative)?;

        assert!(positive.records().eq(negative.records()));

        Ok(())
    }

    #[test]
    fn negate_depth_fields_only() -> Result<(), Error> {
        for (seed, variant) in all_variants().into_iter().enumerate() {
            let station = station_for(variant.placement);
            let source = random_source(variant, &station, 32, seed as u64);

            let assemble = |sign| StationTable::assemble(&source, PROBLEM, &station, variant, sign);
            let positive = assemble(DepthSign::Positive)?;
            let negative = assemble(DepthSign::Negative)?;

            let derivations = variant.derivations();
            for (pos, neg) in positive.records().zip(negative.records()) {
                assert_eq!(pos.time, neg.time);
                for (idx, derivation) in derivations.iter().enumerate() {
                    let signed = match derivation {
                        Derivation::Zero => false,
                        Derivation::Sample(probe) => probe.signed,
                        Derivation::Integrate(probe) => probe.signed,
                    };
                    if signed {
                        assert_eq!(neg.fields[idx], -pos.fields[idx]);
                    } else {
                        assert_eq!(neg.fields[idx], pos.fields[idx]);
                    }
                }
            }
        }

        Ok(())
    }

    #[test]
    fn zero_horizontal_fields_in_two_dimensions() -> Result<(), Error> {
        let variant = Variant::new(Dimension::Two, Placement::OnFault, true);
        let station = station_for(Placement::OnFault);
        let source = random_source(variant, &station, 8, 11);

        let table =
            StationTable::assemble(&source, PROBLEM, &station, variant, DepthSign::Negative)?;
        for record in table.records() {
            assert_eq!(record.fields.len(), 7);
            assert_eq!(&record.fields[..3], &[0.0, 0.0, 0.0]);
        }

        Ok(())
    }

    #[test]
    fn fail_on_sample_count_mismatch() {
        let station = Station::body("000", "030", "000");
        let mut source = fixed_source(
            &station,
            &[0.0, 0.1],
            &[("-h-vel", "vx", [0.0, 2.0]), ("-n-vel", "vy", [0.0, 0.5])],
        );
        let series = channel(&[0.0, 0.1, 0.2], "vz", vec![0.0, 1.0, 1.0]);
        source.insert_channel(PROBLEM, &station.channel("-v-vel"), series);

        let variant = Variant::new(Dimension::Three, Placement::OffFault, true);
        StationTable::assemble(&source, PROBLEM, &station, variant, DepthSign::Positive)
            .unwrap_err();
    }

    #[test]
    fn fail_on_single_sample() {
        let variant = Variant::new(Dimension::Two, Placement::OffFault, false);
        let station = station_for(Placement::OffFault);
        let source = random_source(variant, &station, 1, 5);

        StationTable::assemble(&source, PROBLEM, &station, variant, DepthSign::Positive)
            .unwrap_err();
    }

    #[test]
    fn fail_on_missing_channel() {
        let variant = Variant::new(Dimension::Three, Placement::OnFault, false);
        let station = station_for(Placement::OnFault);
        let source = random_source(variant, &station, 4, 9);

        // The normal stress channel was never registered
        let variant = Variant::new(Dimension::Three, Placement::OnFault, true);
        StationTable::assemble(&source, PROBLEM, &station, variant, DepthSign::Positive)
            .unwrap_err();
    }

    #[test]
    fn fail_on_missing_component() {
        let station = Station::fault("000", "000");
        let variant = Variant::new(Dimension::Two, Placement::OnFault, false);

        // 3D component names, a 2D export expects Uy, Vy and Sy
        let source = fixed_source(
            &station,
            &[0.0, 0.1],
            &[
                ("-v-slip", "Uz", [0.0, 1.0]),
                ("-v-slip-rate", "Vz", [0.0, 1.0]),
                ("-v-shear-stress", "Sz", [0.0, 1.0]),
            ],
        );

        StationTable::assemble(&source, PROBLEM, &station, variant, DepthSign::Positive)
            .unwrap_err();
    }
}
