use crate::application::settlement::SettlementReport;
use crate::error::Result;
use std::io::Write;

/// Writes a settlement report, one line per affiliate, to any `Write` sink.
pub struct ReportWriter<W: Write> {
    writer: W,
}

impl<W: Write> ReportWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn write_report(&mut self, report: &SettlementReport) -> Result<()> {
        for line in report.lines() {
            writeln!(self.writer, "{line}")?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
