use std::path::PathBuf;

use anyhow::Error;
use chrono::{Local, NaiveDate};
use clap::{ArgAction, Args, Parser, Subcommand};
use fdfault_scec::{
    ExportOptions, OutputReader,
    jobs::JobFile,
    variant::{DepthSign, Dimension, Station},
};
use log::LevelFilter;
use log4rs::{
    append::console::{ConsoleAppender, Target},
    config::{Appender, Config, Root},
    encode::pattern::PatternEncoder,
};

/// Converts fdfault simulation output into benchmark submission files
#[derive(Parser)]
#[command(version)]
struct Cli {
    /// Log more details (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct Locations {
    /// Directory holding the binary simulation output
    #[arg(long, default_value = ".")]
    data_dir: PathBuf,

    /// Directory the submission files are written to
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,
}

#[derive(Args)]
struct Header {
    /// Sign of the depth axis, 1 or -1
    #[arg(long, default_value_t = DepthSign::Positive, allow_negative_numbers = true)]
    depthsign: DepthSign,

    /// Person who ran the simulation
    #[arg(long, default_value = "")]
    author: String,

    /// Code version used in the simulation
    #[arg(long, default_value = "")]
    code_version: String,

    /// Grid spacing used in the simulation
    #[arg(long, default_value = "")]
    grid_spacing: String,

    /// Header date as YYYY-MM-DD, today if omitted
    #[arg(long)]
    date: Option<NaiveDate>,
}

impl Header {
    fn options(&self, include_normal: bool) -> ExportOptions {
        ExportOptions {
            depth_sign: self.depthsign,
            author: self.author.clone(),
            version: self.code_version.clone(),
            grid_spacing: self.grid_spacing.clone(),
            include_normal,
            date: self.date.unwrap_or_else(today),
        }
    }
}

#[derive(Args)]
struct Layout {
    /// The problem is two-dimensional
    #[arg(long)]
    two_d: bool,

    /// Leave out the normal stress (on fault) or normal motion (off fault)
    #[arg(long)]
    no_normal: bool,
}

impl Layout {
    fn dimension(&self) -> Dimension {
        if self.two_d {
            Dimension::Two
        } else {
            Dimension::Three
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Converts the output of a station on the fault
    OnFault {
        problem: String,
        #[arg(allow_hyphen_values = true)]
        strike: String,
        #[arg(allow_hyphen_values = true)]
        depth: String,
        #[command(flatten)]
        layout: Layout,
        #[command(flatten)]
        locations: Locations,
        #[command(flatten)]
        header: Header,
    },
    /// Converts the output of a station off the fault
    OffFault {
        problem: String,
        #[arg(allow_hyphen_values = true)]
        strike: String,
        #[arg(allow_hyphen_values = true)]
        across: String,
        #[arg(allow_hyphen_values = true)]
        depth: String,
        #[command(flatten)]
        layout: Layout,
        #[command(flatten)]
        locations: Locations,
        #[command(flatten)]
        header: Header,
    },
    /// Converts the rupture front of an interface
    Front {
        problem: String,
        /// Interface the front was recorded on
        #[arg(long, default_value_t = 0)]
        iface: usize,
        #[command(flatten)]
        locations: Locations,
        #[command(flatten)]
        header: Header,
    },
    /// Runs all conversions listed in a JSON job file
    Batch {
        jobs: PathBuf,
        #[command(flatten)]
        locations: Locations,
    },
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn init_logging(verbose: u8) -> Result<(), Error> {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    let stderr = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new("[{l}] {m}{n}")))
        .build();
    let config = Config::builder()
        .appender(Appender::builder().build("stderr", Box::new(stderr)))
        .build(Root::builder().appender("stderr").build(level))?;

    log4rs::init_config(config)?;

    Ok(())
}

fn main() -> Result<(), anyhow::Error> {
    let args = Cli::parse();
    init_logging(args.verbose)?;

    let written = match args.command {
        Command::OnFault {
            problem,
            strike,
            depth,
            layout,
            locations,
            header,
        } => vec![fdfault_scec::export_station(
            &OutputReader::new(locations.data_dir),
            &problem,
            &Station::fault(strike, depth),
            layout.dimension(),
            &header.options(!layout.no_normal),
            &locations.output_dir,
        )?],
        Command::OffFault {
            problem,
            strike,
            across,
            depth,
            layout,
            locations,
            header,
        } => vec![fdfault_scec::export_station(
            &OutputReader::new(locations.data_dir),
            &problem,
            &Station::body(strike, across, depth),
            layout.dimension(),
            &header.options(!layout.no_normal),
            &locations.output_dir,
        )?],
        Command::Front {
            problem,
            iface,
            locations,
            header,
        } => vec![fdfault_scec::export_front(
            &OutputReader::new(locations.data_dir),
            &problem,
            iface,
            &header.options(true),
            &locations.output_dir,
        )?],
        Command::Batch { jobs, locations } => JobFile::load(jobs)?.run(
            &OutputReader::new(locations.data_dir),
            today(),
            &locations.output_dir,
        )?,
    };

    for path in written {
        println!("{}", path.display());
    }

    Ok(())
}
