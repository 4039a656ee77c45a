//! Closed enumerations: spirit archetypes, naming styles, trait categories
//!
//! These are closed sets. Parsing an unknown name fails at construction time
//! instead of flowing through the pipeline as an arbitrary string.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Agent archetype biasing trait generation and specialization scoring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpiritType {
    Fox,
    Wolf,
    Otter,
    Eagle,
    Lion,
    Tiger,
    Dragon,
    Phoenix,
    Alien,
    Yeti,
}

impl SpiritType {
    /// Every archetype in declaration order
    pub const ALL: [SpiritType; 10] = [
        SpiritType::Fox,
        SpiritType::Wolf,
        SpiritType::Otter,
        SpiritType::Eagle,
        SpiritType::Lion,
        SpiritType::Tiger,
        SpiritType::Dragon,
        SpiritType::Phoenix,
        SpiritType::Alien,
        SpiritType::Yeti,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SpiritType::Fox => "fox",
            SpiritType::Wolf => "wolf",
            SpiritType::Otter => "otter",
            SpiritType::Eagle => "eagle",
            SpiritType::Lion => "lion",
            SpiritType::Tiger => "tiger",
            SpiritType::Dragon => "dragon",
            SpiritType::Phoenix => "phoenix",
            SpiritType::Alien => "alien",
            SpiritType::Yeti => "yeti",
        }
    }

    /// Capitalized form used in display names (`Fox-Foundation-01`)
    pub fn title(&self) -> String {
        capitalize(self.as_str())
    }
}

impl fmt::Display for SpiritType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SpiritType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        SpiritType::ALL
            .iter()
            .copied()
            .find(|spirit| spirit.as_str() == lower)
            .ok_or_else(|| UnknownVariant::new("spirit", s))
    }
}

/// Naming convention used for an agent's display name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NamingStyle {
    Foundation,
    Exo,
    Hybrid,
    Cyberpunk,
    Mythological,
    Scientific,
}

impl NamingStyle {
    /// Every naming style in declaration order
    pub const ALL: [NamingStyle; 6] = [
        NamingStyle::Foundation,
        NamingStyle::Exo,
        NamingStyle::Hybrid,
        NamingStyle::Cyberpunk,
        NamingStyle::Mythological,
        NamingStyle::Scientific,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NamingStyle::Foundation => "foundation",
            NamingStyle::Exo => "exo",
            NamingStyle::Hybrid => "hybrid",
            NamingStyle::Cyberpunk => "cyberpunk",
            NamingStyle::Mythological => "mythological",
            NamingStyle::Scientific => "scientific",
        }
    }

    pub fn title(&self) -> String {
        capitalize(self.as_str())
    }
}

impl fmt::Display for NamingStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NamingStyle {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        NamingStyle::ALL
            .iter()
            .copied()
            .find(|style| style.as_str() == lower)
            .ok_or_else(|| UnknownVariant::new("naming style", s))
    }
}

/// Category of an extracted subliminal trait
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraitCategory {
    Personality,
    Cognitive,
    Behavioral,
    DomainSpecific,
    Social,
    Creative,
}

impl TraitCategory {
    pub const ALL: [TraitCategory; 6] = [
        TraitCategory::Personality,
        TraitCategory::Cognitive,
        TraitCategory::Behavioral,
        TraitCategory::DomainSpecific,
        TraitCategory::Social,
        TraitCategory::Creative,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TraitCategory::Personality => "personality",
            TraitCategory::Cognitive => "cognitive",
            TraitCategory::Behavioral => "behavioral",
            TraitCategory::DomainSpecific => "domain_specific",
            TraitCategory::Social => "social",
            TraitCategory::Creative => "creative",
        }
    }
}

impl fmt::Display for TraitCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One of the three numeric trait maps carried by every agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraitGroup {
    Personality,
    Physical,
    Ability,
}

impl TraitGroup {
    pub const ALL: [TraitGroup; 3] = [TraitGroup::Personality, TraitGroup::Physical, TraitGroup::Ability];

    pub fn as_str(&self) -> &'static str {
        match self {
            TraitGroup::Personality => "personality",
            TraitGroup::Physical => "physical",
            TraitGroup::Ability => "ability",
        }
    }
}

impl fmt::Display for TraitGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse failure for one of the closed enumerations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown {kind}: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl UnknownVariant {
    pub fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spirit_round_trip_through_str() {
        for spirit in SpiritType::ALL {
            assert_eq!(spirit.as_str().parse::<SpiritType>().unwrap(), spirit);
        }
        assert_eq!("  Dragon ".parse::<SpiritType>().unwrap(), SpiritType::Dragon);
    }

    #[test]
    fn test_unknown_spirit_rejected() {
        let err = "griffin".parse::<SpiritType>().unwrap_err();
        assert_eq!(err.kind, "spirit");
        assert!(err.to_string().contains("griffin"));
    }

    #[test]
    fn test_serde_uses_lowercase_names() {
        let json = serde_json::to_string(&SpiritType::Phoenix).unwrap();
        assert_eq!(json, "\"phoenix\"");
        let style: NamingStyle = serde_json::from_str("\"cyberpunk\"").unwrap();
        assert_eq!(style, NamingStyle::Cyberpunk);
        assert!(serde_json::from_str::<NamingStyle>("\"gothic\"").is_err());
    }

    #[test]
    fn test_titles() {
        assert_eq!(SpiritType::Fox.title(), "Fox");
        assert_eq!(NamingStyle::Mythological.title(), "Mythological");
        assert_eq!(TraitCategory::DomainSpecific.to_string(), "domain_specific");
    }
}
