//! Reading per-read allele measurements and grouping them into variants.
//!
//! The allele table has one row per read and locus with the columns
//! `chrom start end repeat_unit read read_start copy_number size genome_start genome_end`.
//! Consecutive rows with the same locus columns form one variant.

use super::{allele::Allele, variant::Variant};
use crate::utils::{open_table_reader, Result};
use crossbeam_channel::Sender;
use std::{
    io::{BufRead, Lines},
    iter::Enumerate,
    path::Path,
    str::FromStr,
};

const EXPECTED_FIELD_COUNT: usize = 10;

#[derive(Debug, PartialEq)]
struct AlleleRow {
    chrom: String,
    start: u32,
    end: u32,
    repeat_unit: String,
    allele: Allele,
}

impl AlleleRow {
    fn from_line(line: &str) -> Result<Self> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != EXPECTED_FIELD_COUNT {
            return Err(format!(
                "Expected {} fields, found {}: {}",
                EXPECTED_FIELD_COUNT,
                fields.len(),
                line
            ));
        }

        let (chrom, repeat_unit) = (fields[0], fields[3]);
        let allele = Allele::new(
            fields[4],
            parse_field(fields[5], "read_start")?,
            repeat_unit,
            parse_measurement(fields[6], "copy_number")?,
            parse_measurement(fields[7], "size")?,
            parse_field(fields[8], "genome_start")?,
            parse_field(fields[9], "genome_end")?,
        );

        Ok(AlleleRow {
            chrom: chrom.to_string(),
            start: parse_field(fields[1], "start")?,
            end: parse_field(fields[2], "end")?,
            repeat_unit: repeat_unit.to_string(),
            allele,
        })
    }

    fn is_locus_of(&self, variant: &Variant) -> bool {
        self.chrom == variant.chrom
            && (self.start, self.end) == variant.ref_interval()
            && self.repeat_unit == variant.repeat_unit
    }
}

fn parse_field<T: FromStr>(value: &str, name: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| format!("Invalid {} value: {}", name, value))
}

fn parse_measurement(value: &str, name: &str) -> Result<f64> {
    let measurement: f64 = parse_field(value, name)?;
    if !measurement.is_finite() {
        return Err(format!("Invalid {} value: {}", name, value));
    }
    Ok(measurement)
}

/// Iterator over the variants of an allele table.
///
/// A malformed line yields an error and is skipped; a read failure ends the
/// iteration.
pub struct VariantReader<R: BufRead> {
    lines: Enumerate<Lines<R>>,
    current: Option<Variant>,
    done: bool,
}

impl<R: BufRead> VariantReader<R> {
    pub fn new(reader: R) -> Self {
        VariantReader {
            lines: reader.lines().enumerate(),
            current: None,
            done: false,
        }
    }
}

impl<R: BufRead> Iterator for VariantReader<R> {
    type Item = Result<Variant>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        loop {
            let Some((index, line)) = self.lines.next() else {
                self.done = true;
                return self.current.take().map(Ok);
            };
            let line_number = index + 1;

            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    self.done = true;
                    return Some(Err(format!("Error at line {}: {}", line_number, e)));
                }
            };
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let row = match AlleleRow::from_line(line) {
                Ok(row) => row,
                Err(e) => return Some(Err(format!("Error at line {}: {}", line_number, e))),
            };

            match self.current.as_mut() {
                Some(variant) if row.is_locus_of(variant) => variant.alleles.push(row.allele),
                _ => {
                    let variant = Variant::new(row.chrom, row.start, row.end, row.repeat_unit);
                    let mut variant = match variant {
                        Ok(variant) => variant,
                        Err(e) => return Some(Err(format!("Error at line {}: {}", line_number, e))),
                    };
                    variant.alleles.push(row.allele);
                    if let Some(finished) = self.current.replace(variant) {
                        return Some(Ok(finished));
                    }
                }
            }
        }
    }
}

/// Streams variants from the allele table at `alleles_path`, tagged with
/// their ordinal in the table.
pub fn stream_variants_into_channel(
    alleles_path: &Path,
    sender: Sender<Result<(usize, Variant)>>,
) -> Result<()> {
    let reader = open_table_reader(alleles_path)?;

    let mut ordinal = 0;
    for result in VariantReader::new(reader) {
        let message = result.map(|variant| {
            ordinal += 1;
            (ordinal - 1, variant)
        });
        sender
            .send(message)
            .map_err(|e| format!("Failed to send variant through channel: {}", e))?;
    }
    log::debug!("Read {} variants from {}", ordinal, alleles_path.display());
    Ok(())
}
