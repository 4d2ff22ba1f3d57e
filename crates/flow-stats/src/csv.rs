//! CSV export of the sampled location content series.
//!
//! One file, one row per (location, sample): `location,minute,contents`.
//! Downstream charting tools pivot it however they like.

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::collector::StatisticsCollector;
use crate::{StatsError, StatsResult};

/// Writes the content-sample series to a CSV file.
pub struct SampleWriter {
    writer:   Writer<File>,
    finished: bool,
}

impl SampleWriter {
    /// Open (or create) the output file and write the header row.
    pub fn new(path: &Path) -> StatsResult<Self> {
        let mut writer = Writer::from_path(path).map_err(StatsError::Csv)?;
        writer.write_record(["location", "minute", "contents"])?;
        Ok(Self { writer, finished: false })
    }

    /// Append every sampled series from `collector`.
    pub fn write_samples(&mut self, collector: &StatisticsCollector) -> StatsResult<()> {
        for (name, series) in collector.locations() {
            for &(t, contents) in series.samples() {
                self.writer.write_record(&[
                    name.to_string(),
                    format!("{:.1}", t.minutes()),
                    contents.to_string(),
                ])?;
            }
        }
        Ok(())
    }

    /// Flush and close.  Safe to call more than once.
    pub fn finish(&mut self) -> StatsResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.writer.flush()?;
        Ok(())
    }
}
