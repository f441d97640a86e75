//! Defines the `BedWriter` struct for writing genotyped loci as BED rows.

use super::rows::{variant_to_bed, BED_HEADERS};
use crate::strtyper::variant::Variant;
use crate::utils::Result;
use std::{
    fs::File,
    io::{BufWriter, Write},
};

/// Writes one BED row per variant.
pub struct BedWriter {
    writer: BufWriter<File>,
}

impl BedWriter {
    /// Creates the file at `output_path` and writes the header line.
    pub fn new(output_path: &str) -> Result<BedWriter> {
        let file = File::create(output_path)
            .map_err(|e| format!("Failed to create {}: {}", output_path, e))?;
        let mut writer = BufWriter::new(file);
        writeln!(writer, "#{}", BED_HEADERS.join("\t")).map_err(|e| e.to_string())?;
        Ok(BedWriter { writer })
    }

    pub fn write(&mut self, variant: &Variant) -> Result<()> {
        writeln!(self.writer, "{}", variant_to_bed(variant).join("\t")).map_err(|e| e.to_string())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush().map_err(|e| e.to_string())
    }
}
