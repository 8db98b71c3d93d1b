//! Attribute-choice policies.
//!
//! A policy looks at the chooser's own top card and picks the attribute to
//! play. Policies drive the single-player CPU opponent and full-match
//! simulations:
//! - `FixedAttribute`: always the same attribute
//! - `RandomAttribute`: uniform over all attributes
//! - `HeuristicPolicy`: strongest normalised stat, with optional noise

use crate::cards::{Attribute, Card};
use crate::core::GameRng;

/// Reference year for scoring debut years.
const DEBUT_REFERENCE_YEAR: f64 = 2025.0;

/// Chooses an attribute for a card.
pub trait AttributePolicy {
    /// Pick the attribute to play with `card`.
    fn choose(&mut self, card: &Card, rng: &mut GameRng) -> Attribute;
}

/// Always plays the same attribute.
#[derive(Clone, Copy, Debug)]
pub struct FixedAttribute(pub Attribute);

impl AttributePolicy for FixedAttribute {
    fn choose(&mut self, _card: &Card, _rng: &mut GameRng) -> Attribute {
        self.0
    }
}

/// Plays a uniformly random attribute.
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomAttribute;

impl AttributePolicy for RandomAttribute {
    fn choose(&mut self, _card: &Card, rng: &mut GameRng) -> Attribute {
        rng.choose(&Attribute::ALL).copied().unwrap_or(Attribute::Members)
    }
}

/// Picks the attribute where the card looks strongest.
///
/// Each stat is scaled to roughly `[0, 1]` against the pool's typical
/// maximum, then `noise * U[0, 1)` is added so the CPU is not perfectly
/// predictable. With `noise == 0.0` the choice is deterministic and ties
/// go to the earliest attribute in `Attribute::ALL`.
#[derive(Clone, Copy, Debug)]
pub struct HeuristicPolicy {
    pub noise: f64,
}

impl Default for HeuristicPolicy {
    fn default() -> Self {
        Self { noise: 0.1 }
    }
}

impl HeuristicPolicy {
    /// A heuristic without noise.
    #[must_use]
    pub fn deterministic() -> Self {
        Self { noise: 0.0 }
    }

    /// Normalised strength of one stat, before noise.
    #[must_use]
    pub fn score(card: &Card, attribute: Attribute) -> f64 {
        let value = f64::from(card.stat(attribute));
        match attribute {
            Attribute::Fame => value / 40.0,
            Attribute::DebutYear => (DEBUT_REFERENCE_YEAR - value) / 20.0,
            Attribute::Members => value / 13.0,
            Attribute::Albums => value / 10.0,
            Attribute::Awards => value / 200.0,
        }
    }
}

impl AttributePolicy for HeuristicPolicy {
    fn choose(&mut self, card: &Card, rng: &mut GameRng) -> Attribute {
        let mut best = Attribute::Members;
        let mut best_score = f64::NEG_INFINITY;
        for attribute in Attribute::ALL {
            let mut score = Self::score(card, attribute);
            if self.noise > 0.0 {
                score += rng.gen_unit() * self.noise;
            }
            if score > best_score {
                best_score = score;
                best = attribute;
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{CardCatalog, CardId, CardStats};

    #[test]
    fn test_fixed() {
        let mut rng = GameRng::new(1);
        let card = Card::new("x", "x", CardStats::default());
        assert_eq!(FixedAttribute(Attribute::Fame).choose(&card, &mut rng), Attribute::Fame);
    }

    #[test]
    fn test_random_covers_attributes() {
        let mut rng = GameRng::new(1);
        let card = Card::new("x", "x", CardStats::default());
        let mut policy = RandomAttribute;
        let seen: std::collections::HashSet<_> =
            (0..200).map(|_| policy.choose(&card, &mut rng)).collect();
        assert_eq!(seen.len(), Attribute::ALL.len());
    }

    #[test]
    fn test_heuristic_picks_awards_for_bts() {
        // 483 awards scores 2.4, far above every other stat.
        let catalog = CardCatalog::standard();
        let bts = catalog.get(&CardId::new("1")).unwrap();
        let mut rng = GameRng::new(1);
        assert_eq!(HeuristicPolicy::default().choose(bts, &mut rng), Attribute::Awards);
    }

    #[test]
    fn test_heuristic_picks_debut_for_tvxq() {
        // Debut 2003 scores 1.1; fame 32/40 is 0.8.
        let catalog = CardCatalog::standard();
        let tvxq = catalog.get(&CardId::new("15")).unwrap();
        let mut rng = GameRng::new(1);
        assert_eq!(
            HeuristicPolicy::deterministic().choose(tvxq, &mut rng),
            Attribute::DebutYear
        );
    }

    #[test]
    fn test_deterministic_does_not_consume_rng() {
        let card = Card::new("x", "x", CardStats { fame: 40, ..Default::default() });
        let mut rng = GameRng::new(5);
        let before = rng.state();
        HeuristicPolicy::deterministic().choose(&card, &mut rng);
        assert_eq!(rng.state(), before);
    }
}
