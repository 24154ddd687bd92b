use log::{info, warn};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use super::cache::FeatureCache;
use super::titanic::{Age, Embarked, FamilySize, Fare, Pclass, Sex, Title};
use super::Feature;
use crate::data::model::RawDataset;
use crate::error::{Error, Result};
use crate::logging::time_block;

/// Builds a fresh instance of one feature variant.
pub type FeatureFactory = fn() -> Box<dyn Feature>;

// ---------------------------------------------------------------------------
// FeatureRegistry
// ---------------------------------------------------------------------------

/// Explicit table of the available feature variants, in registration order.
#[derive(Default)]
pub struct FeatureRegistry {
    entries: Vec<(String, FeatureFactory)>,
}

impl FeatureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every Titanic variant.
    pub fn titanic() -> Self {
        let factories: [FeatureFactory; 7] = [
            || Box::new(Pclass),
            || Box::new(Sex),
            || Box::new(FamilySize),
            || Box::new(Embarked),
            || Box::new(Fare),
            || Box::new(Age),
            || Box::new(Title),
        ];
        Self {
            entries: factories
                .into_iter()
                .map(|factory| (factory().name().to_ascii_lowercase(), factory))
                .collect(),
        }
    }

    /// Add a variant under `name` (case-insensitive).
    pub fn register(&mut self, name: &str, factory: FeatureFactory) -> Result<()> {
        let key = name.to_ascii_lowercase();
        if self.entries.iter().any(|(n, _)| *n == key) {
            return Err(Error::DuplicateFeature(key));
        }
        self.entries.push((key, factory));
        Ok(())
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|(n, _)| n.as_str()).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factory(name).is_some()
    }

    /// Instantiate the variant registered under `name`.
    pub fn build(&self, name: &str) -> Result<Box<dyn Feature>> {
        self.factory(name)
            .map(|f| f())
            .ok_or_else(|| Error::UnknownFeature(name.to_string()))
    }

    fn factory(&self, name: &str) -> Option<FeatureFactory> {
        let key = name.to_ascii_lowercase();
        self.entries
            .iter()
            .find(|(n, _)| *n == key)
            .map(|(_, f)| *f)
    }
}

// ---------------------------------------------------------------------------
// FeatureGenerator – compute-or-skip driver
// ---------------------------------------------------------------------------

/// What a generation run did for each requested feature.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct GenerateReport {
    pub computed: Vec<String>,
    pub skipped: Vec<String>,
}

/// Runs registered features against one raw dataset and persists the results.
pub struct FeatureGenerator<'a> {
    registry: &'a FeatureRegistry,
    cache: &'a FeatureCache,
    raw: &'a RawDataset,
    rng: ChaCha8Rng,
}

impl<'a> FeatureGenerator<'a> {
    /// With `seed == None` the generator draws from OS entropy and random
    /// imputations differ between runs.
    pub fn new(
        registry: &'a FeatureRegistry,
        cache: &'a FeatureCache,
        raw: &'a RawDataset,
        seed: Option<u64>,
    ) -> Self {
        let rng = match seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => {
                warn!("no random_seed configured: randomly imputed features are not reproducible");
                ChaCha8Rng::from_entropy()
            }
        };
        Self {
            registry,
            cache,
            raw,
            rng,
        }
    }

    /// Generate every registered feature.
    pub fn generate_all(&mut self, overwrite: bool) -> Result<GenerateReport> {
        let names: Vec<String> = self
            .registry
            .names()
            .into_iter()
            .map(str::to_string)
            .collect();
        self.generate(&names, overwrite)
    }

    /// Compute and save each named feature unless both cache files already
    /// exist and `overwrite` is false. Stops at the first failure.
    pub fn generate<S: AsRef<str>>(&mut self, names: &[S], overwrite: bool) -> Result<GenerateReport> {
        let mut report = GenerateReport::default();

        for name in names {
            let feature = self.registry.build(name.as_ref())?;
            let key = feature.name();

            if !overwrite && self.cache.exists(key) {
                info!("{key} was skipped");
                report.skipped.push(key.to_string());
                continue;
            }

            let pair = time_block(key, || feature.create_features(self.raw, &mut self.rng))?;
            self.cache.save(key, &pair)?;
            report.computed.push(key.to_string());
        }

        Ok(report)
    }
}
