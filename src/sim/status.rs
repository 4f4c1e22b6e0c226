//! Timed status effects (power mode, boost, shield)
//!
//! Each actor carries a short list of `(kind, remaining_ticks)` pairs.
//! Remaining ticks only ever go down; an effect disappears from the list on
//! the tick it reaches zero.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    /// Maze chase: ghosts can be eaten
    Power,
    /// Kart: raised top speed
    Boost,
    /// Kart: obstacles have no effect
    Shield,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusEffects {
    effects: Vec<(EffectKind, u32)>,
}

impl StatusEffects {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start or refresh an effect. Refreshing never shortens a running one.
    pub fn apply(&mut self, kind: EffectKind, ticks: u32) {
        if ticks == 0 {
            return;
        }
        match self.effects.iter_mut().find(|(k, _)| *k == kind) {
            Some((_, remaining)) => *remaining = (*remaining).max(ticks),
            None => self.effects.push((kind, ticks)),
        }
    }

    /// Count every effect down by one tick. Returns the kinds that expired.
    pub fn tick(&mut self) -> Vec<EffectKind> {
        let mut expired = Vec::new();
        for (kind, remaining) in &mut self.effects {
            *remaining = remaining.saturating_sub(1);
            if *remaining == 0 {
                expired.push(*kind);
            }
        }
        self.effects.retain(|(_, remaining)| *remaining > 0);
        expired
    }

    pub fn is_active(&self, kind: EffectKind) -> bool {
        self.remaining(kind) > 0
    }

    pub fn remaining(&self, kind: EffectKind) -> u32 {
        self.effects
            .iter()
            .find(|(k, _)| *k == kind)
            .map_or(0, |(_, r)| *r)
    }

    pub fn clear(&mut self, kind: EffectKind) {
        self.effects.retain(|(k, _)| *k != kind);
    }

    pub fn clear_all(&mut self) {
        self.effects.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (EffectKind, u32)> + '_ {
        self.effects.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effect_expires_after_exact_ticks() {
        let mut fx = StatusEffects::new();
        fx.apply(EffectKind::Power, 3);
        assert!(fx.tick().is_empty());
        assert!(fx.tick().is_empty());
        assert_eq!(fx.tick(), vec![EffectKind::Power]);
        assert!(!fx.is_active(EffectKind::Power));
    }

    #[test]
    fn test_refresh_keeps_longer_timer() {
        let mut fx = StatusEffects::new();
        fx.apply(EffectKind::Shield, 100);
        fx.apply(EffectKind::Shield, 20);
        assert_eq!(fx.remaining(EffectKind::Shield), 100);
        fx.apply(EffectKind::Shield, 150);
        assert_eq!(fx.remaining(EffectKind::Shield), 150);
    }

    #[test]
    fn test_independent_kinds() {
        let mut fx = StatusEffects::new();
        fx.apply(EffectKind::Boost, 1);
        fx.apply(EffectKind::Shield, 5);
        assert_eq!(fx.tick(), vec![EffectKind::Boost]);
        assert!(fx.is_active(EffectKind::Shield));
        fx.clear(EffectKind::Shield);
        assert_eq!(fx.iter().count(), 0);
    }
}
