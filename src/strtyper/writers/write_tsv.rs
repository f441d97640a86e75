//! Defines the `TsvWriter` struct for writing genotype calls with per-read detail.

use super::rows::{
    allele_to_tsv, summarize_alleles, variant_to_tsv, ALLELE_SUMMARY_HEADERS, ALLELE_TSV_HEADERS,
    VARIANT_TSV_HEADERS,
};
use crate::strtyper::variant::Variant;
use crate::utils::Result;
use itertools::Itertools;
use std::{
    env,
    fs::File,
    io::{BufWriter, Write},
};

/// Writes genotype calls as tab-separated rows.
pub struct TsvWriter {
    writer: BufWriter<File>,
    /// One row per variant with comma-joined read columns instead of one row per read
    collapse_alleles: bool,
}

impl TsvWriter {
    /// Constructs a new `TsvWriter` instance.
    ///
    /// # Arguments
    /// * `output_path` - Path of the output TSV file.
    /// * `collapse_alleles` - Summarize the reads of a variant on a single row.
    ///
    /// # Returns
    /// Returns a `Result` with either a new `TsvWriter` instance or an error message.
    pub fn new(output_path: &str, collapse_alleles: bool) -> Result<TsvWriter> {
        let command_line = env::args().join(" ");
        Self::with_command_line(output_path, collapse_alleles, &command_line)
    }

    fn with_command_line(
        output_path: &str,
        collapse_alleles: bool,
        command_line: &str,
    ) -> Result<TsvWriter> {
        let file = File::create(output_path)
            .map_err(|e| format!("Failed to create {}: {}", output_path, e))?;
        let mut writer = BufWriter::new(file);

        let allele_headers: &[&str] = if collapse_alleles {
            &ALLELE_SUMMARY_HEADERS
        } else {
            &ALLELE_TSV_HEADERS
        };
        let headers = VARIANT_TSV_HEADERS.iter().chain(allele_headers).join("\t");
        writeln!(writer, "#{}", command_line).map_err(|e| e.to_string())?;
        writeln!(writer, "#{}", headers).map_err(|e| e.to_string())?;

        Ok(TsvWriter {
            writer,
            collapse_alleles,
        })
    }

    /// Writes the rows of a genotyped variant.
    pub fn write(&mut self, variant: &Variant) -> Result<()> {
        let variant_cols = variant_to_tsv(variant);
        if self.collapse_alleles {
            let (reads, copy_numbers, sizes, read_starts) = summarize_alleles(&variant.alleles);
            let row = variant_cols
                .iter()
                .map(String::as_str)
                .chain([
                    reads.as_str(),
                    copy_numbers.as_str(),
                    sizes.as_str(),
                    read_starts.as_str(),
                ])
                .join("\t");
            writeln!(self.writer, "{}", row).map_err(|e| e.to_string())?;
        } else {
            for allele in &variant.alleles {
                let row = variant_cols.iter().chain(&allele_to_tsv(allele)).join("\t");
                writeln!(self.writer, "{}", row).map_err(|e| e.to_string())?;
            }
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush().map_err(|e| e.to_string())
    }
}
