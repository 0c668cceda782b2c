use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::register::RegisterConfiguration;
use crate::error::{BaryogenesisError, Result};

/// Observed count per final register configuration.
///
/// Serializes as a Qiskit-style counts object, `{"01010": 5412, "10100": 4588}`.
/// The running total is kept with checked arithmetic, so every count and every
/// partial sum of counts fits in a `u64`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<RegisterConfiguration, u64>",
    into = "BTreeMap<RegisterConfiguration, u64>"
)]
pub struct TrialOutcomeSet {
    counts: BTreeMap<RegisterConfiguration, u64>,
    total: u64,
}

impl TrialOutcomeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a set from `(configuration, count)` pairs, summing repeats.
    pub fn from_counts<I>(counts: I) -> Result<Self>
    where
        I: IntoIterator<Item = (RegisterConfiguration, u64)>,
    {
        let mut set = TrialOutcomeSet::new();
        for (config, count) in counts {
            set.record(config, count)?;
        }
        Ok(set)
    }

    /// Fails with `InvalidParameter` if the total shot count would overflow.
    pub fn record(&mut self, config: RegisterConfiguration, count: u64) -> Result<()> {
        if count == 0 {
            return Ok(());
        }
        self.total = self.total.checked_add(count).ok_or_else(|| {
            BaryogenesisError::invalid_parameter(
                "counts",
                format!("adding {} shots of {} overflows the shot total", count, config),
            )
        })?;
        // Cannot overflow: every entry is bounded by the checked total
        *self.counts.entry(config).or_insert(0) += count;
        Ok(())
    }

    /// Sums per-configuration counts; used to fold per-worker shards together.
    pub fn merge(&mut self, other: TrialOutcomeSet) -> Result<()> {
        for (config, count) in other.counts {
            self.record(config, count)?;
        }
        Ok(())
    }

    pub fn count(&self, config: RegisterConfiguration) -> u64 {
        self.counts.get(&config).copied().unwrap_or(0)
    }

    pub fn total_shots(&self) -> u64 {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Configurations with non-zero count, ascending mask order
    pub fn iter(&self) -> impl Iterator<Item = (RegisterConfiguration, u64)> + '_ {
        self.counts.iter().map(|(&config, &count)| (config, count))
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let raw: BTreeMap<String, u64> = serde_json::from_str(json)?;
        let mut set = TrialOutcomeSet::new();
        for (bits, count) in raw {
            set.record(bits.parse()?, count)?;
        }
        Ok(set)
    }

    pub fn load_json(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| {
            BaryogenesisError::Config(format!("cannot read counts file {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&json)
    }
}

impl TryFrom<BTreeMap<RegisterConfiguration, u64>> for TrialOutcomeSet {
    type Error = BaryogenesisError;

    fn try_from(counts: BTreeMap<RegisterConfiguration, u64>) -> Result<Self> {
        Self::from_counts(counts)
    }
}

impl From<TrialOutcomeSet> for BTreeMap<RegisterConfiguration, u64> {
    fn from(set: TrialOutcomeSet) -> Self {
        set.counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_sums_per_configuration() {
        let mut a = TrialOutcomeSet::from_counts([(RegisterConfiguration::MATTER, 3)]).unwrap();
        let b = TrialOutcomeSet::from_counts([
            (RegisterConfiguration::MATTER, 2),
            (RegisterConfiguration::ANTIMATTER, 5),
        ])
        .unwrap();
        a.merge(b).unwrap();
        assert_eq!(a.count(RegisterConfiguration::MATTER), 5);
        assert_eq!(a.count(RegisterConfiguration::ANTIMATTER), 5);
        assert_eq!(a.total_shots(), 10);
    }

    #[test]
    fn reads_qiskit_counts() {
        let set = TrialOutcomeSet::from_json_str(r#"{"01010": 551, "10100": 449, "00001": 0}"#).unwrap();
        assert_eq!(set.total_shots(), 1000);
        assert_eq!(set.iter().count(), 2);
        assert_eq!(
            serde_json::to_string(&set).unwrap(),
            r#"{"01010":551,"10100":449}"#
        );
        assert!(TrialOutcomeSet::from_json_str(r#"{"0101": 3}"#).is_err());
    }

    #[test]
    fn overflowing_counts_are_rejected() {
        let json = r#"{"01010": 18446744073709551615, "10100": 1}"#;
        assert!(matches!(
            TrialOutcomeSet::from_json_str(json),
            Err(BaryogenesisError::InvalidParameter { name: "counts", .. })
        ));
        assert!(serde_json::from_str::<TrialOutcomeSet>(json).is_err());

        let mut set = TrialOutcomeSet::from_counts([(RegisterConfiguration::MATTER, u64::MAX)]).unwrap();
        assert!(set.record(RegisterConfiguration::ANTIMATTER, 1).is_err());
        assert_eq!(set.total_shots(), u64::MAX);
        assert_eq!(set.count(RegisterConfiguration::ANTIMATTER), 0);
    }
}
