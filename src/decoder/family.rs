//! Tag families and the registry of compiled-in codeword tables.

use std::sync::OnceLock;

use super::tables;
use crate::error::ConfigError;

/// A fixed set of square binary markers sharing payload size and minimum
/// pairwise Hamming distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagFamily {
    /// Identifier hosts use to select the family, e.g. `"36h11"`.
    pub name: &'static str,
    /// Payload cells per side (6 for 36h11).
    pub bits_per_side: usize,
    /// Minimum Hamming distance between any two codewords in any rotation.
    pub min_hamming: u32,
    /// One codeword per tag id.
    pub codes: &'static [u64],
    /// Solid border rings printed around the payload by default.
    pub default_black_border: u32,
}

impl TagFamily {
    /// Payload bits per tag.
    #[inline]
    pub fn bit_count(&self) -> usize {
        self.bits_per_side * self.bits_per_side
    }

    /// Largest bit error count that still identifies a unique codeword.
    #[inline]
    pub fn max_correctable(&self) -> u32 {
        self.min_hamming.saturating_sub(1) / 2
    }

    /// Codeword for `id`, if the family has one.
    pub fn code(&self, id: u32) -> Option<u64> {
        self.codes.get(id as usize).copied()
    }

    /// Number of tag ids.
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    /// True for a family without codes
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

/// Tag36h11, always compiled in.
pub static TAG36H11: TagFamily = TagFamily {
    name: "36h11",
    bits_per_side: 6,
    min_hamming: 11,
    codes: &tables::TAG36H11_CODES,
    default_black_border: 1,
};

/// Tag16h5, 30 ids.
#[cfg(feature = "tag16h5")]
pub static TAG16H5: TagFamily = TagFamily {
    name: "16h5",
    bits_per_side: 4,
    min_hamming: 5,
    codes: &tables::TAG16H5_CODES,
    default_black_border: 1,
};

/// Name to family mapping for every table included in this build.
#[derive(Debug)]
pub struct FamilyRegistry {
    families: Vec<&'static TagFamily>,
}

impl FamilyRegistry {
    /// Registry of the tables compiled into this build.
    pub fn builtin() -> &'static FamilyRegistry {
        static REGISTRY: OnceLock<FamilyRegistry> = OnceLock::new();
        REGISTRY.get_or_init(|| {
            #[allow(unused_mut)]
            let mut families = vec![&TAG36H11];
            #[cfg(feature = "tag16h5")]
            families.push(&TAG16H5);
            FamilyRegistry { families }
        })
    }

    /// Look up a family by its exact name.
    pub fn get(&self, name: &str) -> Option<&'static TagFamily> {
        self.families.iter().copied().find(|f| f.name == name)
    }

    /// Like [`FamilyRegistry::get`], failing with the list of supported names.
    pub fn resolve(&self, name: &str) -> Result<&'static TagFamily, ConfigError> {
        self.get(name).ok_or_else(|| ConfigError::UnknownTagFamily {
            name: name.to_string(),
            supported: self.names(),
        })
    }

    /// Whether `name` resolves in this build
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Registered names, mandatory family first.
    pub fn names(&self) -> Vec<&'static str> {
        self.families.iter().map(|f| f.name).collect()
    }

    /// Registered families in [`names`](Self::names) order
    pub fn iter(&self) -> impl Iterator<Item = &'static TagFamily> + '_ {
        self.families.iter().copied()
    }
}

/// Names of the tag families available in this build.
pub fn supported_families() -> Vec<&'static str> {
    FamilyRegistry::builtin().names()
}
