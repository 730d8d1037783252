use std::collections::HashMap;

use anyhow::{Error, anyhow};

use crate::{ChannelSeries, ChannelSource, FrontSource, FrontSurface};

/// A source that serves channels and fronts held in memory.
///
/// Useful to drive the exporters without any simulation output on disk.
#[derive(Debug, Default)]
pub struct MemorySource {
    channels: HashMap<(String, String), ChannelSeries>,
    fronts: HashMap<(String, usize), FrontSurface>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `series` as channel `channel` of the run `problem`, replacing
    /// any channel previously registered under the same name.
    pub fn insert_channel(&mut self, problem: &str, channel: &str, series: ChannelSeries) {
        self.channels
            .insert((problem.to_owned(), channel.to_owned()), series);
    }

    /// Registers `front` as the rupture front of interface `iface` of the run `problem`.
    pub fn insert_front(&mut self, problem: &str, iface: usize, front: FrontSurface) {
        self.fronts.insert((problem.to_owned(), iface), front);
    }
}

impl ChannelSource for MemorySource {
    fn fetch(&self, problem: &str, channel: &str) -> Result<ChannelSeries, Error> {
        self.channels
            .get(&(problem.to_owned(), channel.to_owned()))
            .cloned()
            .ok_or_else(|| anyhow!("Channel {channel} of problem {problem} not found"))
    }
}

impl FrontSource for MemorySource {
    fn fetch_front(&self, problem: &str, iface: usize) -> Result<FrontSurface, Error> {
        self.fronts
            .get(&(problem.to_owned(), iface))
            .cloned()
            .ok_or_else(|| anyhow!("Front {iface} of problem {problem} not found"))
    }
}
