//! Codeword matching.

use super::family::TagFamily;

/// Best codeword for an observed payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Match {
    /// Tag id in the family.
    pub id: u32,
    /// Bit errors between observed and stored codeword.
    pub hamming: u32,
}

/// Matcher for a fixed family.
///
/// Brute force over all ids; family tables hold at most a few thousand codes.
#[derive(Clone, Debug)]
pub struct Matcher {
    family: &'static TagFamily,
    max_hamming: u32,
}

impl Matcher {
    /// Build a matcher accepting up to `max_hamming` bit errors.
    pub fn new(family: &'static TagFamily, max_hamming: u32) -> Self {
        assert!(
            family.bit_count() <= 64,
            "{} payload bits do not fit a u64",
            family.bit_count()
        );
        Self {
            family,
            max_hamming,
        }
    }

    /// Family being matched against
    #[inline]
    pub fn family(&self) -> &'static TagFamily {
        self.family
    }

    /// Largest accepted bit distance
    #[inline]
    pub fn max_hamming(&self) -> u32 {
        self.max_hamming
    }

    /// Lowest-distance codeword within `max_hamming`; ties keep the lower id.
    pub fn match_code(&self, observed: u64) -> Option<Match> {
        let mut best: Option<Match> = None;

        for (id, &code) in self.family.codes.iter().enumerate() {
            let hamming = (observed ^ code).count_ones();
            if hamming > self.max_hamming {
                continue;
            }
            if best.is_none_or(|b| hamming < b.hamming) {
                best = Some(Match {
                    id: id as u32,
                    hamming,
                });
                if hamming == 0 {
                    break;
                }
            }
        }

        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::family::TAG36H11;

    #[test]
    fn exact_codes_match_themselves() {
        let matcher = Matcher::new(&TAG36H11, 0);
        for (id, &code) in TAG36H11.codes.iter().enumerate().step_by(37) {
            assert_eq!(
                matcher.match_code(code),
                Some(Match {
                    id: id as u32,
                    hamming: 0
                })
            );
        }
    }

    #[test]
    fn flipped_bits_are_counted() {
        let matcher = Matcher::new(&TAG36H11, TAG36H11.max_correctable());
        let code = TAG36H11.codes[42] ^ (1 << 3) ^ (1 << 20);
        assert_eq!(matcher.match_code(code), Some(Match { id: 42, hamming: 2 }));
    }

    #[test]
    fn far_codes_are_rejected() {
        let matcher = Matcher::new(&TAG36H11, 1);
        let code = TAG36H11.codes[5] ^ 0b111;
        assert_eq!(matcher.match_code(code), None);
    }
}
