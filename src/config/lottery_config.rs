//! Game shape parsing from environment variables.

use super::{Lookup, parse_or};
use crate::domain::lottery::LotteryConfig;
use anyhow::Result;

/// Lottery environment configuration
#[derive(Debug, Clone, PartialEq)]
pub struct LotteryEnvConfig {
    pub lottery_context: String,
    pub numbers_to_draw: usize,
    pub min_number: u32,
    pub max_number: u32,
}

impl Default for LotteryEnvConfig {
    fn default() -> Self {
        let mega_sena = LotteryConfig::mega_sena();
        Self {
            lottery_context: mega_sena.lottery_context,
            numbers_to_draw: mega_sena.numbers_to_draw,
            min_number: mega_sena.min_number,
            max_number: mega_sena.max_number,
        }
    }
}

impl LotteryEnvConfig {
    pub(crate) fn from_lookup(lookup: Lookup<'_>) -> Result<Self> {
        let defaults = Self::default();
        let config = Self {
            lottery_context: lookup("LOTTERY_CONTEXT")
                .map(|c| c.trim().to_lowercase())
                .filter(|c| !c.is_empty())
                .unwrap_or(defaults.lottery_context),
            numbers_to_draw: parse_or(lookup, "NUMBERS_TO_DRAW", defaults.numbers_to_draw)?,
            min_number: parse_or(lookup, "MIN_NUMBER", defaults.min_number)?,
            max_number: parse_or(lookup, "MAX_NUMBER", defaults.max_number)?,
        };

        if config.min_number > config.max_number {
            anyhow::bail!(
                "MIN_NUMBER ({}) must not exceed MAX_NUMBER ({})",
                config.min_number,
                config.max_number
            );
        }
        Ok(config)
    }

    pub fn to_lottery_config(&self) -> LotteryConfig {
        LotteryConfig::new(
            self.lottery_context.clone(),
            self.numbers_to_draw,
            self.min_number,
            self.max_number,
        )
    }
}
