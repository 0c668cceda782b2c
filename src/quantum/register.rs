//! Five-indicator particle register.
//!
//! Bit `i` of the mask is the presence indicator of [`Particle`] `i`. The text
//! form follows the Qiskit counts convention: qubit 0 (the X boson) is the
//! rightmost character, so the initial register reads `"00001"`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{BaryogenesisError, Result};

/// Width of the register. Fixed, not configurable.
pub const REGISTER_WIDTH: usize = 5;

/// Number of distinct register configurations (2^5).
pub const CONFIGURATION_COUNT: usize = 1 << REGISTER_WIDTH;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Particle {
    XBoson,
    Quark,
    Antiquark,
    Lepton,
    Antilepton,
}

impl Particle {
    pub const ALL: [Particle; REGISTER_WIDTH] = [
        Particle::XBoson,
        Particle::Quark,
        Particle::Antiquark,
        Particle::Lepton,
        Particle::Antilepton,
    ];

    /// Register position (qubit index) of this particle
    pub const fn index(self) -> usize {
        match self {
            Particle::XBoson => 0,
            Particle::Quark => 1,
            Particle::Antiquark => 2,
            Particle::Lepton => 3,
            Particle::Antilepton => 4,
        }
    }
}

/// An immutable snapshot of the five presence indicators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RegisterConfiguration(u8);

impl RegisterConfiguration {
    /// X boson present, no decay products.
    pub const INITIAL: RegisterConfiguration = RegisterConfiguration(0b00001);
    /// Quark + lepton.
    pub const MATTER: RegisterConfiguration = RegisterConfiguration(0b01010);
    /// Antiquark + antilepton.
    pub const ANTIMATTER: RegisterConfiguration = RegisterConfiguration(0b10100);

    pub fn from_bits(bits: u8) -> Result<Self> {
        if usize::from(bits) >= CONFIGURATION_COUNT {
            return Err(BaryogenesisError::InvalidConfiguration(format!(
                "mask {:#b} is wider than {} bits",
                bits, REGISTER_WIDTH
            )));
        }
        Ok(RegisterConfiguration(bits))
    }

    /// Builds a configuration from the ordered tuple `(x, q, qbar, l, lbar)`.
    pub fn from_indicators(indicators: [bool; REGISTER_WIDTH]) -> Self {
        let bits = indicators
            .iter()
            .enumerate()
            .fold(0u8, |acc, (i, &set)| if set { acc | (1 << i) } else { acc });
        RegisterConfiguration(bits)
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn indicators(self) -> [bool; REGISTER_WIDTH] {
        let mut out = [false; REGISTER_WIDTH];
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = self.0 & (1 << i) != 0;
        }
        out
    }

    pub fn has(self, particle: Particle) -> bool {
        self.0 & (1 << particle.index()) != 0
    }

    /// All 32 configurations in ascending mask order
    pub fn all() -> impl Iterator<Item = RegisterConfiguration> {
        (0..CONFIGURATION_COUNT as u8).map(RegisterConfiguration)
    }

    /// Qiskit-style bitstring, qubit 0 rightmost
    pub fn to_bitstring(self) -> String {
        (0..REGISTER_WIDTH)
            .rev()
            .map(|i| if self.0 & (1 << i) != 0 { '1' } else { '0' })
            .collect()
    }

    /// Sorts the configuration into matter, antimatter or violation.
    /// Total over all 32 masks; a residual X boson is never a valid terminal state.
    pub fn classify(self) -> Classification {
        match self {
            RegisterConfiguration::MATTER => Classification::Matter,
            RegisterConfiguration::ANTIMATTER => Classification::Antimatter,
            _ => Classification::Violation,
        }
    }

    /// Conservation rules this configuration breaks when read as a terminal state.
    /// Empty exactly for the matter and antimatter patterns.
    pub fn broken_rules(self) -> Vec<ConservationRule> {
        let x = self.has(Particle::XBoson);
        let q = self.has(Particle::Quark);
        let qbar = self.has(Particle::Antiquark);
        let l = self.has(Particle::Lepton);
        let lbar = self.has(Particle::Antilepton);

        let mut rules = Vec::new();
        if x {
            rules.push(ConservationRule::ResidualXBoson);
        }
        if !(q || qbar || l || lbar) {
            rules.push(ConservationRule::NoDecayProducts);
        }
        if q && !l {
            rules.push(ConservationRule::QuarkWithoutLepton);
        }
        if l && !q {
            rules.push(ConservationRule::LeptonWithoutQuark);
        }
        if qbar && !lbar {
            rules.push(ConservationRule::AntiquarkWithoutAntilepton);
        }
        if lbar && !qbar {
            rules.push(ConservationRule::AntileptonWithoutAntiquark);
        }
        if (q || l) && (qbar || lbar) {
            rules.push(ConservationRule::MixedBranches);
        }
        rules
    }
}

/// The Initializer: X boson present, every decay product absent.
pub fn initial_configuration() -> RegisterConfiguration {
    RegisterConfiguration::INITIAL
}

impl fmt::Display for RegisterConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_bitstring())
    }
}

impl FromStr for RegisterConfiguration {
    type Err = BaryogenesisError;

    fn from_str(s: &str) -> Result<Self> {
        // Qiskit separates classical registers with spaces
        let trimmed: String = s.chars().filter(|c| !c.is_whitespace()).collect();
        if trimmed.len() != REGISTER_WIDTH {
            return Err(BaryogenesisError::InvalidConfiguration(format!(
                "expected {} bits, got {:?}",
                REGISTER_WIDTH, s
            )));
        }
        let mut bits = 0u8;
        for (pos, c) in trimmed.chars().enumerate() {
            let qubit = REGISTER_WIDTH - 1 - pos;
            match c {
                '1' => bits |= 1 << qubit,
                '0' => {}
                other => {
                    return Err(BaryogenesisError::InvalidConfiguration(format!(
                        "unexpected character {:?} in {:?}",
                        other, s
                    )))
                }
            }
        }
        Ok(RegisterConfiguration(bits))
    }
}

impl TryFrom<String> for RegisterConfiguration {
    type Error = BaryogenesisError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<RegisterConfiguration> for String {
    fn from(config: RegisterConfiguration) -> Self {
        config.to_bitstring()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Classification {
    Matter,
    Antimatter,
    Violation,
}

/// Pairing and decay rules a terminal configuration must satisfy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConservationRule {
    ResidualXBoson,
    NoDecayProducts,
    QuarkWithoutLepton,
    LeptonWithoutQuark,
    AntiquarkWithoutAntilepton,
    AntileptonWithoutAntiquark,
    MixedBranches,
}

impl fmt::Display for ConservationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ConservationRule::ResidualXBoson => "X boson survived the decay",
            ConservationRule::NoDecayProducts => "no decay products",
            ConservationRule::QuarkWithoutLepton => "quark without lepton",
            ConservationRule::LeptonWithoutQuark => "lepton without quark",
            ConservationRule::AntiquarkWithoutAntilepton => "antiquark without antilepton",
            ConservationRule::AntileptonWithoutAntiquark => "antilepton without antiquark",
            ConservationRule::MixedBranches => "matter and antimatter products together",
        };
        f.write_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initializer_is_x_boson_only() {
        let init = initial_configuration();
        assert_eq!(init.indicators(), [true, false, false, false, false]);
        assert_eq!(init.to_bitstring(), "00001");
    }

    #[test]
    fn valid_patterns_match_tuples() {
        assert_eq!(
            RegisterConfiguration::from_indicators([false, true, false, true, false]),
            RegisterConfiguration::MATTER
        );
        assert_eq!(
            RegisterConfiguration::from_indicators([false, false, true, false, true]),
            RegisterConfiguration::ANTIMATTER
        );
        assert_eq!(RegisterConfiguration::MATTER.to_bitstring(), "01010");
        assert_eq!(RegisterConfiguration::ANTIMATTER.to_bitstring(), "10100");
    }

    #[test]
    fn classification_is_total_and_consistent_with_rules() {
        let mut matter = 0;
        let mut antimatter = 0;
        for config in RegisterConfiguration::all() {
            let class = config.classify();
            let rules = config.broken_rules();
            match class {
                Classification::Matter => matter += 1,
                Classification::Antimatter => antimatter += 1,
                Classification::Violation => {}
            }
            assert_eq!(
                rules.is_empty(),
                class != Classification::Violation,
                "config {} rules {:?}",
                config,
                rules
            );
        }
        assert_eq!((matter, antimatter), (1, 1));
    }

    #[test]
    fn residual_x_boson_is_a_violation() {
        let with_x = RegisterConfiguration::from_bits(RegisterConfiguration::MATTER.bits() | 1).unwrap();
        assert_eq!(with_x.classify(), Classification::Violation);
        assert_eq!(with_x.broken_rules(), vec![ConservationRule::ResidualXBoson]);
        assert_eq!(
            RegisterConfiguration::INITIAL.broken_rules(),
            vec![ConservationRule::ResidualXBoson, ConservationRule::NoDecayProducts]
        );
    }

    #[test]
    fn unpaired_quark_is_flagged() {
        let config: RegisterConfiguration = "00010".parse().unwrap();
        assert!(config.has(Particle::Quark));
        assert_eq!(config.broken_rules(), vec![ConservationRule::QuarkWithoutLepton]);
    }

    #[test]
    fn bitstring_parse_roundtrip_and_errors() {
        for config in RegisterConfiguration::all() {
            assert_eq!(config.to_bitstring().parse::<RegisterConfiguration>().unwrap(), config);
        }
        assert_eq!("010 10".parse::<RegisterConfiguration>().unwrap(), RegisterConfiguration::MATTER);
        assert!("0101".parse::<RegisterConfiguration>().is_err());
        assert!("0101x".parse::<RegisterConfiguration>().is_err());
        assert!(RegisterConfiguration::from_bits(32).is_err());
    }
}
