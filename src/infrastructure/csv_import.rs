//! Draw history import from CSV.
//!
//! Expected header: `concurso,date,numbers`, with `date` as `YYYY-MM-DD` or
//! `DD/MM/YYYY` and `numbers` separated by spaces, dashes or semicolons
//! (`04-17-23-35-41-58`).

use crate::domain::lottery::{Draw, LotteryConfig};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
struct DrawRecord {
    concurso: u32,
    date: String,
    numbers: String,
}

pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%d/%m/%Y"))
        .with_context(|| format!("Unrecognized date: {:?}", raw))
}

pub fn parse_numbers(raw: &str) -> Result<Vec<u32>> {
    raw.split(|c: char| c.is_whitespace() || c == '-' || c == ';')
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<u32>()
                .with_context(|| format!("Invalid number {:?} in {:?}", part, raw))
        })
        .collect()
}

/// Parses draws from CSV and returns them most recent first.
pub fn parse_draws<R: Read>(reader: R) -> Result<Vec<Draw>> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut draws = Vec::new();

    for (line, result) in rdr.deserialize().enumerate() {
        let record: DrawRecord = result.with_context(|| format!("Malformed CSV row {}", line + 1))?;
        let date = parse_date(&record.date).with_context(|| format!("Row {}", line + 1))?;
        let numbers = parse_numbers(&record.numbers).with_context(|| format!("Row {}", line + 1))?;
        draws.push(Draw::new(record.concurso, date, numbers));
    }

    draws.sort_by(|a, b| b.concurso.cmp(&a.concurso));
    draws.dedup_by_key(|d| d.concurso);
    Ok(draws)
}

pub fn read_draws_csv(path: &Path) -> Result<Vec<Draw>> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let draws = parse_draws(BufReader::new(file))?;
    info!("Loaded {} draws from {}", draws.len(), path.display());
    Ok(draws)
}

/// Drops draws with the wrong size or numbers outside the configured range.
pub fn retain_valid(draws: Vec<Draw>, config: &LotteryConfig) -> Vec<Draw> {
    let total = draws.len();
    let valid: Vec<Draw> = draws
        .into_iter()
        .filter(|draw| config.fits(draw))
        .collect();
    if valid.len() < total {
        warn!(
            "Skipped {} draws that do not fit {} ({} of {} in [{}, {}])",
            total - valid.len(),
            config.lottery_context,
            config.numbers_to_draw,
            config.range_size(),
            config.min_number,
            config.max_number
        );
    }
    valid
}
