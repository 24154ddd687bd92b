//! Titanic feature catalogue. Each variant emits a single `Int64` column named
//! after the variant; its cache key is the lower-cased name.

use std::sync::OnceLock;

use log::debug;
use rand::{Rng, RngCore};
use regex::Regex;

use super::binning::{mean, qcut, sample_std, Duplicates};
use super::{Feature, FeaturePair};
use crate::data::model::{Passenger, RawDataset};
use crate::error::{Error, Result};

/// Apply `f` to every row of both splits.
fn map_splits<F>(raw: &RawDataset, mut f: F) -> Result<(Vec<i64>, Vec<i64>)>
where
    F: FnMut(&Passenger) -> Result<i64>,
{
    let train = raw.train.iter().map(&mut f).collect::<Result<Vec<_>>>()?;
    let test = raw.test.iter().map(&mut f).collect::<Result<Vec<_>>>()?;
    Ok((train, test))
}

// ---------------------------------------------------------------------------
// Direct mappings
// ---------------------------------------------------------------------------

/// Ticket class, passed through.
pub struct Pclass;

impl Feature for Pclass {
    fn name(&self) -> &'static str {
        "pclass"
    }

    fn create_features(&self, raw: &RawDataset, _rng: &mut dyn RngCore) -> Result<FeaturePair> {
        let (train, test) = map_splits(raw, |p| Ok(p.pclass))?;
        FeaturePair::from_int_columns("Pclass", train, test)
    }
}

/// male → 0, female → 1.
pub struct Sex;

impl Feature for Sex {
    fn name(&self) -> &'static str {
        "sex"
    }

    fn create_features(&self, raw: &RawDataset, _rng: &mut dyn RngCore) -> Result<FeaturePair> {
        let (train, test) = map_splits(raw, |p| match p.sex.as_str() {
            "male" => Ok(0),
            "female" => Ok(1),
            other => Err(Error::UnknownCategory {
                column: "Sex".to_string(),
                value: other.to_string(),
            }),
        })?;
        FeaturePair::from_int_columns("Sex", train, test)
    }
}

/// Siblings/spouses + parents/children + the passenger.
pub struct FamilySize;

impl Feature for FamilySize {
    fn name(&self) -> &'static str {
        "familysize"
    }

    fn create_features(&self, raw: &RawDataset, _rng: &mut dyn RngCore) -> Result<FeaturePair> {
        let (train, test) = map_splits(raw, |p| Ok(p.sib_sp + p.parch + 1))?;
        FeaturePair::from_int_columns("FamilySize", train, test)
    }
}

/// Port of embarkation; missing ports count as Southampton.
pub struct Embarked;

impl Feature for Embarked {
    fn name(&self) -> &'static str {
        "embarked"
    }

    fn create_features(&self, raw: &RawDataset, _rng: &mut dyn RngCore) -> Result<FeaturePair> {
        let (train, test) = map_splits(raw, |p| match p.embarked.as_deref().unwrap_or("S") {
            "S" => Ok(0),
            "C" => Ok(1),
            "Q" => Ok(2),
            other => Err(Error::UnknownCategory {
                column: "Embarked".to_string(),
                value: other.to_string(),
            }),
        })?;
        FeaturePair::from_int_columns("Embarked", train, test)
    }
}

// ---------------------------------------------------------------------------
// Imputed + binned numerics
//
// Bin edges are fit on each split on its own, so the same fare can land in
// different bins in train and test.
// ---------------------------------------------------------------------------

/// Fare quartile. Missing fares take the train+test mean.
pub struct Fare;

impl Feature for Fare {
    fn name(&self) -> &'static str {
        "fare"
    }

    fn create_features(&self, raw: &RawDataset, _rng: &mut dyn RngCore) -> Result<FeaturePair> {
        let fill = mean(raw.union().map(|p| p.fare))
            .ok_or_else(|| Error::InvalidInput("no Fare values to average".to_string()))?;
        debug!("fare fill value {fill:.4}");

        let bin = |rows: &[Passenger]| {
            let filled: Vec<f64> = rows.iter().map(|p| p.fare.unwrap_or(fill)).collect();
            qcut("Fare", &filled, 4, Duplicates::Raise)
        };
        FeaturePair::from_int_columns("Fare", bin(&raw.train)?, bin(&raw.test)?)
    }
}

/// Age quintile (fewer bins when edges coincide).
///
/// Missing ages are filled with one random integer per split drawn from
/// `[trunc(mean - std), trunc(mean + std))` over train+test, so output is
/// only reproducible with a seeded generator.
pub struct Age;

impl Age {
    fn fill_value(low: i64, high: i64, rng: &mut dyn RngCore) -> Result<f64> {
        if low >= high {
            return Err(Error::InvalidInput(format!(
                "empty Age fill range [{low}, {high})"
            )));
        }
        Ok(rng.gen_range(low..high) as f64)
    }
}

impl Feature for Age {
    fn name(&self) -> &'static str {
        "age"
    }

    fn create_features(&self, raw: &RawDataset, rng: &mut dyn RngCore) -> Result<FeaturePair> {
        let ages = || raw.union().map(|p| p.age);
        let (m, s) = mean(ages())
            .zip(sample_std(ages()))
            .ok_or_else(|| Error::InvalidInput("too few Age values for mean/std".to_string()))?;
        let (low, high) = ((m - s).trunc() as i64, (m + s).trunc() as i64);

        let mut bin = |rows: &[Passenger]| -> Result<Vec<i64>> {
            let fill = Self::fill_value(low, high, &mut *rng)?;
            debug!("age fill value {fill}");
            let filled: Vec<f64> = rows.iter().map(|p| p.age.unwrap_or(fill)).collect();
            qcut("Age", &filled, 5, Duplicates::Drop)
        };
        let train = bin(&raw.train)?;
        let test = bin(&raw.test)?;
        FeaturePair::from_int_columns("Age", train, test)
    }
}

// ---------------------------------------------------------------------------
// Title
// ---------------------------------------------------------------------------

const RARE_TITLES: [&str; 11] = [
    "Lady", "Countess", "Capt", "Col", "Don", "Dr", "Major", "Rev", "Sir", "Jonkheer", "Dona",
];

fn title_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r" ([A-Za-z]+)\.").expect("title pattern is valid"))
}

/// Honorific extracted from the passenger name.
pub struct Title;

impl Title {
    /// First ` <letters>.` token in `name`, or `""` when there is none.
    pub fn get_title(name: &str) -> String {
        title_pattern()
            .captures(name)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
            .unwrap_or_default()
    }

    /// Fold rare and French honorifics into the five mapped groups.
    pub fn canonical(title: &str) -> &str {
        match title {
            t if RARE_TITLES.contains(&t) => "Rare",
            "Mlle" | "Ms" => "Miss",
            "Mme" => "Mrs",
            t => t,
        }
    }

    pub fn code(title: &str) -> i64 {
        match Self::canonical(title) {
            "Mr" => 1,
            "Miss" => 2,
            "Mrs" => 3,
            "Master" => 4,
            "Rare" => 5,
            _ => 0,
        }
    }
}

impl Feature for Title {
    fn name(&self) -> &'static str {
        "title"
    }

    fn create_features(&self, raw: &RawDataset, _rng: &mut dyn RngCore) -> Result<FeaturePair> {
        let (train, test) = map_splits(raw, |p| Ok(Self::code(&Self::get_title(&p.name))))?;
        FeaturePair::from_int_columns("Title", train, test)
    }
}
