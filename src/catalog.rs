//! Static structure and research definitions, indexed by id once at load time.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::yields::{Resource, YieldBundle};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StructureId(String);

impl StructureId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for StructureId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for StructureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResearchId(String);

impl ResearchId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ResearchId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for ResearchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureDefinition {
    pub id: StructureId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Price of the tier 1 build; upgrades scale from it.
    pub cost: YieldBundle,
    /// Output per tier.
    pub base_yield: YieldBundle,
    pub max_tier: u32,
    /// Specialist slots for tiers `1..=max_tier`.
    pub specialist_capacity: Vec<u32>,
    #[serde(default)]
    pub specialist_bonus: YieldBundle,
    #[serde(default)]
    pub unlocked_by: Option<ResearchId>,
}

impl StructureDefinition {
    pub fn capacity_at(&self, tier: u32) -> u32 {
        tier.checked_sub(1)
            .and_then(|index| self.specialist_capacity.get(index as usize))
            .copied()
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchDefinition {
    pub id: ResearchId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Price in the Research resource.
    pub cost: f64,
    #[serde(default)]
    pub prerequisites: Vec<ResearchId>,
    #[serde(default)]
    pub yield_bonus: YieldBundle,
    #[serde(default)]
    pub unlocks: Vec<StructureId>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("structure id `{0}` defined more than once")]
    DuplicateStructure(StructureId),
    #[error("research id `{0}` defined more than once")]
    DuplicateResearch(ResearchId),
    #[error("structure `{0}` must allow at least one tier")]
    ZeroMaxTier(StructureId),
    #[error("structure `{id}` lists {found} specialist capacities for {max_tier} tiers")]
    CapacityLength {
        id: StructureId,
        max_tier: u32,
        found: usize,
    },
    #[error("`{owner}` references unknown research `{missing}`")]
    UnknownResearch { owner: String, missing: ResearchId },
    #[error("research `{owner}` unlocks unknown structure `{missing}`")]
    UnknownStructure {
        owner: ResearchId,
        missing: StructureId,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CatalogData {
    structures: Vec<StructureDefinition>,
    research: Vec<ResearchDefinition>,
}

/// Read-only catalog. Lookups go through id maps built in [`Catalog::new`], while iteration
/// keeps the declaration order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "CatalogData", into = "CatalogData")]
pub struct Catalog {
    structures: Vec<StructureDefinition>,
    research: Vec<ResearchDefinition>,
    structure_index: HashMap<StructureId, usize>,
    research_index: HashMap<ResearchId, usize>,
}

impl Catalog {
    pub fn new(
        structures: Vec<StructureDefinition>,
        research: Vec<ResearchDefinition>,
    ) -> Result<Self, CatalogError> {
        let mut structure_index = HashMap::with_capacity(structures.len());
        for (index, def) in structures.iter().enumerate() {
            if def.max_tier == 0 {
                return Err(CatalogError::ZeroMaxTier(def.id.clone()));
            }
            if def.specialist_capacity.len() != def.max_tier as usize {
                return Err(CatalogError::CapacityLength {
                    id: def.id.clone(),
                    max_tier: def.max_tier,
                    found: def.specialist_capacity.len(),
                });
            }
            if structure_index.insert(def.id.clone(), index).is_some() {
                return Err(CatalogError::DuplicateStructure(def.id.clone()));
            }
        }

        let mut research_index = HashMap::with_capacity(research.len());
        for (index, def) in research.iter().enumerate() {
            if research_index.insert(def.id.clone(), index).is_some() {
                return Err(CatalogError::DuplicateResearch(def.id.clone()));
            }
        }

        for def in &research {
            if let Some(missing) = def
                .prerequisites
                .iter()
                .find(|dep| !research_index.contains_key(*dep))
            {
                return Err(CatalogError::UnknownResearch {
                    owner: def.id.to_string(),
                    missing: missing.clone(),
                });
            }
            if let Some(missing) = def
                .unlocks
                .iter()
                .find(|id| !structure_index.contains_key(*id))
            {
                return Err(CatalogError::UnknownStructure {
                    owner: def.id.clone(),
                    missing: missing.clone(),
                });
            }
        }
        for def in &structures {
            if let Some(gate) = def.unlocked_by.as_ref() {
                if !research_index.contains_key(gate) {
                    return Err(CatalogError::UnknownResearch {
                        owner: def.id.to_string(),
                        missing: gate.clone(),
                    });
                }
            }
        }

        Ok(Self {
            structures,
            research,
            structure_index,
            research_index,
        })
    }

    pub fn structure(&self, id: &StructureId) -> Option<&StructureDefinition> {
        self.structure_index.get(id).map(|&index| &self.structures[index])
    }

    pub fn research(&self, id: &ResearchId) -> Option<&ResearchDefinition> {
        self.research_index.get(id).map(|&index| &self.research[index])
    }

    pub fn structures(&self) -> &[StructureDefinition] {
        &self.structures
    }

    pub fn research_topics(&self) -> &[ResearchDefinition] {
        &self.research
    }

    /// True once every prerequisite of `id` appears in `researched`. Unknown ids are never met.
    pub fn prerequisites_met(&self, id: &ResearchId, researched: &BTreeSet<ResearchId>) -> bool {
        self.research(id)
            .map(|def| def.prerequisites.iter().all(|dep| researched.contains(dep)))
            .unwrap_or(false)
    }

    /// The five-structure, five-topic catalog the standard scenario ships with.
    pub fn standard() -> Self {
        use Resource::*;

        let structures = vec![
            StructureDefinition {
                id: "scripture_pavilion".into(),
                name: "Scripture Pavilion".into(),
                description: "Generates Research. Specialists speed up study.".into(),
                cost: YieldBundle::from([(Currency, 40.0), (Production, 15.0)]),
                base_yield: YieldBundle::from([(Research, 2.0)]),
                max_tier: 3,
                specialist_capacity: vec![1, 2, 3],
                specialist_bonus: YieldBundle::from([(Research, 1.0)]),
                unlocked_by: None,
            },
            StructureDefinition {
                id: "ancestral_shrine".into(),
                name: "Ancestral Shrine".into(),
                description: "Generates Faith and a little Prestige.".into(),
                cost: YieldBundle::from([(Currency, 60.0), (Production, 25.0)]),
                base_yield: YieldBundle::from([(Faith, 1.0), (Prestige, 0.5)]),
                max_tier: 3,
                specialist_capacity: vec![1, 1, 2],
                specialist_bonus: YieldBundle::from([(Faith, 0.5), (Prestige, 0.25)]),
                unlocked_by: Some("spirit_herb_recognition".into()),
            },
            StructureDefinition {
                id: "treasure_pavilion".into(),
                name: "Treasure Pavilion".into(),
                description: "Generates Currency. Specialists improve the books.".into(),
                cost: YieldBundle::from([(Currency, 70.0), (Production, 30.0)]),
                base_yield: YieldBundle::from([(Currency, 5.0)]),
                max_tier: 3,
                specialist_capacity: vec![1, 2, 2],
                specialist_bonus: YieldBundle::from([(Currency, 2.0)]),
                unlocked_by: Some("foundation_establishment".into()),
            },
            StructureDefinition {
                id: "proving_grounds".into(),
                name: "Proving Grounds".into(),
                description: "Generates Prestige. Instructors add more.".into(),
                cost: YieldBundle::from([(Currency, 70.0), (Production, 30.0)]),
                base_yield: YieldBundle::from([(Prestige, 2.0)]),
                max_tier: 3,
                specialist_capacity: vec![1, 1, 2],
                specialist_bonus: YieldBundle::from([(Prestige, 1.0)]),
                unlocked_by: Some("sect_doctrine_basics".into()),
            },
            StructureDefinition {
                id: "martial_bastion".into(),
                name: "Martial Prowess Bastion".into(),
                description: "Adds Production and Prestige.".into(),
                cost: YieldBundle::from([(Currency, 80.0), (Production, 35.0)]),
                base_yield: YieldBundle::from([(Production, 1.0), (Prestige, 1.0)]),
                max_tier: 3,
                specialist_capacity: vec![1, 1, 1],
                specialist_bonus: YieldBundle::from([(Production, 1.0)]),
                unlocked_by: Some("basic_martial_conditioning".into()),
            },
        ];

        let research = vec![
            ResearchDefinition {
                id: "basic_qi_circulation".into(),
                name: "Basic Qi Circulation".into(),
                description: "Slightly improves overall efficiency.".into(),
                cost: 15.0,
                prerequisites: Vec::new(),
                yield_bonus: YieldBundle::from([(Production, 0.5)]),
                unlocks: Vec::new(),
            },
            ResearchDefinition {
                id: "spirit_herb_recognition".into(),
                name: "Spirit Herb Recognition".into(),
                description: "Unlocks the Ancestral Shrine.".into(),
                cost: 25.0,
                prerequisites: vec!["basic_qi_circulation".into()],
                yield_bonus: YieldBundle::new(),
                unlocks: vec!["ancestral_shrine".into()],
            },
            ResearchDefinition {
                id: "foundation_establishment".into(),
                name: "Foundation Establishment".into(),
                description: "Unlocks the Treasure Pavilion.".into(),
                cost: 40.0,
                prerequisites: vec!["spirit_herb_recognition".into()],
                yield_bonus: YieldBundle::new(),
                unlocks: vec!["treasure_pavilion".into()],
            },
            ResearchDefinition {
                id: "sect_doctrine_basics".into(),
                name: "Sect Doctrine Basics".into(),
                description: "Unlocks the Proving Grounds.".into(),
                cost: 30.0,
                prerequisites: vec!["spirit_herb_recognition".into()],
                yield_bonus: YieldBundle::new(),
                unlocks: vec!["proving_grounds".into()],
            },
            ResearchDefinition {
                id: "basic_martial_conditioning".into(),
                name: "Basic Martial Conditioning".into(),
                description: "Unlocks the Martial Prowess Bastion.".into(),
                cost: 35.0,
                prerequisites: vec!["basic_qi_circulation".into()],
                yield_bonus: YieldBundle::new(),
                unlocks: vec!["martial_bastion".into()],
            },
        ];

        match Catalog::new(structures, research) {
            Ok(catalog) => catalog,
            Err(err) => unreachable!("standard catalog is consistent: {err}"),
        }
    }
}

impl TryFrom<CatalogData> for Catalog {
    type Error = CatalogError;

    fn try_from(value: CatalogData) -> Result<Self, Self::Error> {
        Catalog::new(value.structures, value.research)
    }
}

impl From<Catalog> for CatalogData {
    fn from(value: Catalog) -> Self {
        CatalogData {
            structures: value.structures,
            research: value.research,
        }
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::standard()
    }
}
