//! # Economy Configuration
//!
//! Balance data loaded once at startup from TOML.
//!
//! ```toml
//! bag_capacity = 24
//! rng_seed = 1337
//! loot_lifetime_secs = 120
//!
//! [rarity_gates]
//! epic = 12
//!
//! [[loot_profiles]]
//! id = "wolf"
//! currency_per_level = 2
//! max_rolls = 1
//! drop_chance_bp = 2500
//! templates = ["wolf-pelt"]
//! ```

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::Path;
use std::time::Duration;

use crate::bag::{DEFAULT_BAG_CAPACITY, MAX_BAG_CAPACITY};
use crate::error::{EconomyError, EconomyResult};
use crate::generator::{ItemGenerator, RarityDropTable, RarityGates};
use crate::loot::{LootProfile, DEFAULT_LOOT_LIFETIME};

fn default_bag_capacity() -> usize {
    DEFAULT_BAG_CAPACITY
}

fn default_loot_lifetime_secs() -> u64 {
    DEFAULT_LOOT_LIFETIME.as_secs()
}

/// Economy tuning.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct EconomyConfig {
    /// Slots in a new player bag.
    #[serde(default = "default_bag_capacity")]
    pub bag_capacity: usize,
    /// Seed for the world RNG.
    #[serde(default)]
    pub rng_seed: u64,
    /// Seconds a loot container stays before despawning.
    #[serde(default = "default_loot_lifetime_secs")]
    pub loot_lifetime_secs: u64,
    /// Minimum item level per rarity.
    #[serde(default)]
    pub rarity_gates: RarityGates,
    /// NPC loot tables.
    #[serde(default)]
    pub loot_profiles: Vec<LootProfile>,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            bag_capacity: DEFAULT_BAG_CAPACITY,
            rng_seed: 0,
            loot_lifetime_secs: default_loot_lifetime_secs(),
            rarity_gates: RarityGates::default(),
            loot_profiles: Vec::new(),
        }
    }
}

impl EconomyConfig {
    /// Parses and validates a configuration.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` for malformed TOML, a zero bag capacity, a bad loot
    /// profile or a repeated profile id.
    pub fn from_toml_str(text: &str) -> EconomyResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        tracing::info!(
            "Loaded economy config: bag capacity {}, {} loot profiles",
            config.bag_capacity,
            config.loot_profiles.len()
        );
        Ok(config)
    }

    /// Reads and parses a configuration file.
    ///
    /// # Errors
    ///
    /// `Io` if the file cannot be read, otherwise as
    /// [`EconomyConfig::from_toml_str`].
    pub fn from_toml_file(path: impl AsRef<Path>) -> EconomyResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Checks cross-field constraints.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` describing the first problem found.
    pub fn validate(&self) -> EconomyResult<()> {
        if self.bag_capacity == 0 || self.bag_capacity > MAX_BAG_CAPACITY {
            return Err(EconomyError::InvalidConfig(format!(
                "bag_capacity must be in 1..={MAX_BAG_CAPACITY}, got {}",
                self.bag_capacity
            )));
        }
        let mut seen = BTreeSet::new();
        for profile in &self.loot_profiles {
            profile.validate()?;
            if !seen.insert(profile.id.as_str()) {
                return Err(EconomyError::InvalidConfig(format!(
                    "duplicate loot profile id: {}",
                    profile.id
                )));
            }
        }
        Ok(())
    }

    /// Loot container lifetime.
    #[inline]
    #[must_use]
    pub const fn loot_lifetime(&self) -> Duration {
        Duration::from_secs(self.loot_lifetime_secs)
    }

    /// Looks up a loot profile by id.
    #[must_use]
    pub fn loot_profile(&self, id: &str) -> Option<&LootProfile> {
        self.loot_profiles.iter().find(|p| p.id == id)
    }

    /// A generator using the configured rarity gates.
    #[must_use]
    pub fn generator(&self) -> ItemGenerator {
        ItemGenerator::new(RarityDropTable::new(self.rarity_gates))
    }

    /// A fresh RNG seeded from `rng_seed`.
    #[must_use]
    pub fn rng(&self) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(self.rng_seed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::Rarity;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = EconomyConfig::from_toml_str("").unwrap();
        assert_eq!(config, EconomyConfig::default());
        assert_eq!(config.loot_lifetime(), DEFAULT_LOOT_LIFETIME);
    }

    #[test]
    fn test_partial_rarity_gates() {
        let config = EconomyConfig::from_toml_str(
            r#"
            rng_seed = 99
            [rarity_gates]
            epic = 12
            "#,
        )
        .unwrap();
        assert_eq!(config.rarity_gates.gate(Rarity::Epic), 12);
        assert_eq!(config.rarity_gates.gate(Rarity::Legendary), 22);
        assert_eq!(config.generator().drop_table().gates().gate(Rarity::Epic), 12);
    }

    #[test]
    fn test_loot_profiles_parse() {
        let config = EconomyConfig::from_toml_str(
            r#"
            [[loot_profiles]]
            id = "wolf"
            currency_per_level = 2
            max_rolls = 1
            drop_chance_bp = 2500
            templates = ["wolf-pelt"]
            "#,
        )
        .unwrap();
        let wolf = config.loot_profile("wolf").unwrap();
        assert_eq!(wolf.currency_min_pct, 80);
        assert_eq!(wolf.drop_chance_bp, 2500);
        assert!(config.loot_profile("bear").is_none());
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(
            EconomyConfig::from_toml_str("bag_capacity = 0"),
            Err(EconomyError::InvalidConfig(_))
        ));
        assert!(matches!(
            EconomyConfig::from_toml_str("bag_capacity = 5000"),
            Err(EconomyError::InvalidConfig(_))
        ));
        let duplicate = r#"
            [[loot_profiles]]
            id = "a"
            currency_per_level = 1
            [[loot_profiles]]
            id = "a"
            currency_per_level = 1
        "#;
        assert!(matches!(
            EconomyConfig::from_toml_str(duplicate),
            Err(EconomyError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_same_seed_same_rng() {
        use rand::Rng;
        let config = EconomyConfig::default();
        let a: u64 = config.rng().gen();
        let b: u64 = config.rng().gen();
        assert_eq!(a, b);
    }
}
