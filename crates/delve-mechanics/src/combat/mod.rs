//! Initiative and turn order.
//!
//! Combatants roll initiative once, are sorted highest first (ties keep
//! insertion order), and each acts at most once per round. The order is
//! fixed for the whole round even if someone drops mid-round; inactive
//! combatants are simply skipped.

pub mod combatant;

pub use combatant::{Combatant, CombatantKind};

use std::collections::HashSet;

use delve_core::{Actor, EntityId, Side};
use tracing::debug;

use crate::dice::{Die, RandomSource};
use crate::error::{MechError, MechResult};

/// The combatants of an encounter and the order they act in.
#[derive(Debug, Clone, Default)]
pub struct TurnOrder {
    combatants: Vec<Combatant>,
    /// Round number (1-based, 0 before start).
    round: u32,
    /// Position in `order` of the next candidate actor.
    cursor: usize,
    /// Indices into `combatants`, sorted by initiative.
    order: Vec<usize>,
}

impl TurnOrder {
    /// Create an empty turn order.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a combatant. Returns its index.
    pub fn add(&mut self, mut combatant: Combatant) -> usize {
        let index = self.combatants.len();
        combatant.set_insertion_order(index);
        self.combatants.push(combatant);
        index
    }

    /// Roll initiative for every combatant.
    pub fn roll_initiative<R>(&mut self, die: Die, source: &mut R) -> MechResult<()>
    where
        R: RandomSource + ?Sized,
    {
        for combatant in &mut self.combatants {
            combatant.roll_initiative(die, source)?;
        }
        Ok(())
    }

    /// Start round 1.
    pub fn start(&mut self) -> MechResult<()> {
        if self.combatants.is_empty() {
            return Err(MechError::InvalidOperation(
                "cannot start combat without combatants".to_string(),
            ));
        }
        self.round = 0;
        self.begin_round();
        Ok(())
    }

    /// Advance to the next round: reset acted flags of everyone still
    /// active and fix the order for the round.
    pub fn begin_round(&mut self) {
        self.round += 1;
        self.cursor = 0;
        for combatant in &mut self.combatants {
            if combatant.is_active() {
                combatant.reset_acted();
            }
        }
        self.sort_initiative();
        debug!(round = self.round, combatants = self.order.len(), "round started");
    }

    /// The next combatant due to act this round, skipping anyone inactive
    /// or already acted. `None` once the round is exhausted.
    pub fn next_actor(&mut self) -> Option<usize> {
        while let Some(&index) = self.order.get(self.cursor) {
            let combatant = &self.combatants[index];
            if combatant.is_active() && !combatant.has_acted() {
                return Some(index);
            }
            self.cursor += 1;
        }
        None
    }

    /// Mark a combatant as having acted this round.
    pub fn mark_acted(&mut self, index: usize) -> MechResult<()> {
        let combatant = self.combatants.get_mut(index).ok_or_else(|| {
            MechError::InvalidArgument(format!("combatant index {index} out of bounds"))
        })?;
        if combatant.has_acted() {
            return Err(MechError::InvalidOperation(format!(
                "{} has already acted this round",
                combatant.display_name()
            )));
        }
        combatant.mark_acted();
        Ok(())
    }

    /// Current round number.
    pub fn round(&self) -> u32 {
        self.round
    }

    /// Returns true if combat hasn't started yet.
    pub fn is_not_started(&self) -> bool {
        self.round == 0
    }

    /// All combatants in insertion order.
    pub fn combatants(&self) -> &[Combatant] {
        &self.combatants
    }

    /// Combatants in this round's acting order.
    pub fn in_order(&self) -> impl Iterator<Item = &Combatant> {
        self.order.iter().map(|&i| &self.combatants[i])
    }

    /// A combatant by index.
    pub fn get(&self, index: usize) -> Option<&Combatant> {
        self.combatants.get(index)
    }

    /// A mutable combatant by index.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Combatant> {
        self.combatants.get_mut(index)
    }

    /// Index of the combatant with the given entity id.
    pub fn find(&self, id: EntityId) -> Option<usize> {
        self.combatants.iter().position(|c| c.id() == id)
    }

    /// Sides that still have at least one active combatant.
    pub fn active_sides(&self) -> HashSet<Side> {
        self.combatants
            .iter()
            .filter(|c| c.is_active())
            .map(|c| c.side())
            .collect()
    }

    /// Number of combatants.
    pub fn len(&self) -> usize {
        self.combatants.len()
    }

    /// True if there are no combatants.
    pub fn is_empty(&self) -> bool {
        self.combatants.is_empty()
    }

    /// Sort by initiative descending; ties keep insertion order.
    fn sort_initiative(&mut self) {
        let mut indices: Vec<usize> = (0..self.combatants.len()).collect();
        indices.sort_by(|&a, &b| {
            let (ca, cb) = (&self.combatants[a], &self.combatants[b]);
            cb.initiative()
                .cmp(&ca.initiative())
                .then(ca.insertion_order().cmp(&cb.insertion_order()))
        });
        self.order = indices;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::ScriptedFaces;
    use delve_core::{CatalogId, Monster, Player};

    fn player(name: &str, roll: i32) -> Combatant {
        let mut c = Combatant::player(Player::new(name, 10).unwrap());
        c.set_initiative_roll(roll);
        c
    }

    fn monster(name: &str, roll: i32, modifier: i32) -> Combatant {
        let m = Monster::new(name, CatalogId::new("goblin").unwrap(), 5)
            .unwrap()
            .with_initiative_modifier(modifier);
        let mut c = Combatant::monster(m);
        c.set_initiative_roll(roll);
        c
    }

    fn names(order: &TurnOrder) -> Vec<String> {
        order.in_order().map(|c| c.display_name().to_string()).collect()
    }

    #[test]
    fn combat_lifecycle() {
        let mut order = TurnOrder::new();
        assert!(order.is_not_started());
        order.add(player("Alice", 15));
        order.add(player("Bob", 10));
        order.add(monster("Grik", 18, 2));
        order.start().unwrap();
        assert_eq!(order.round(), 1);
        assert_eq!(names(&order), ["Grik", "Alice", "Bob"]);

        let first = order.next_actor().unwrap();
        assert_eq!(order.get(first).unwrap().display_name(), "Grik");
        order.mark_acted(first).unwrap();
        let second = order.next_actor().unwrap();
        assert_eq!(order.get(second).unwrap().display_name(), "Alice");
        order.mark_acted(second).unwrap();
        let third = order.next_actor().unwrap();
        order.mark_acted(third).unwrap();
        assert!(order.next_actor().is_none());

        order.begin_round();
        assert_eq!(order.round(), 2);
        assert_eq!(order.next_actor(), Some(first));
    }

    #[test]
    fn ties_keep_insertion_order() {
        let mut order = TurnOrder::new();
        order.add(player("First", 12));
        order.add(player("Second", 12));
        order.add(monster("Third", 10, 2));
        order.start().unwrap();
        assert_eq!(names(&order), ["First", "Second", "Third"]);
    }

    #[test]
    fn inactive_combatants_are_skipped_without_reordering() {
        let mut order = TurnOrder::new();
        let a = order.add(player("Alice", 20));
        let b = order.add(monster("Grik", 15, 0));
        let c = order.add(player("Bob", 10));
        order.start().unwrap();

        assert_eq!(order.next_actor(), Some(a));
        order.mark_acted(a).unwrap();
        order.get_mut(b).unwrap().take_damage(100);
        assert_eq!(order.next_actor(), Some(c));
        assert_eq!(names(&order), ["Alice", "Grik", "Bob"]);
    }

    #[test]
    fn double_acting_is_rejected() {
        let mut order = TurnOrder::new();
        let a = order.add(player("Alice", 5));
        order.start().unwrap();
        order.mark_acted(a).unwrap();
        assert!(matches!(order.mark_acted(a), Err(MechError::InvalidOperation(_))));
        assert!(order.mark_acted(9).is_err());
    }

    #[test]
    fn begin_round_does_not_revive_the_fallen() {
        let mut order = TurnOrder::new();
        let a = order.add(player("Alice", 5));
        order.start().unwrap();
        order.mark_acted(a).unwrap();
        order.get_mut(a).unwrap().take_damage(100);
        order.begin_round();
        assert!(order.get(a).unwrap().has_acted());
        assert!(order.next_actor().is_none());
    }

    #[test]
    fn empty_combat_cannot_start() {
        let mut order = TurnOrder::new();
        assert!(order.start().is_err());
    }

    #[test]
    fn rolled_initiative_adds_modifier() {
        let mut order = TurnOrder::new();
        order.add(monster("Grik", 0, 3));
        order.add(player("Alice", 0));
        let mut script = ScriptedFaces::new([4, 6]);
        order.roll_initiative(Die::D20, &mut script).unwrap();
        order.start().unwrap();
        // Grik 4 + 3 = 7 beats Alice 6
        assert_eq!(names(&order), ["Grik", "Alice"]);
        assert_eq!(order.get(0).unwrap().initiative(), 7);
    }

    #[test]
    fn active_sides_tracks_survivors() {
        let mut order = TurnOrder::new();
        order.add(player("Alice", 5));
        let g = order.add(monster("Grik", 5, 0));
        assert_eq!(order.active_sides().len(), 2);
        order.get_mut(g).unwrap().take_damage(50);
        let sides = order.active_sides();
        assert_eq!(sides.len(), 1);
        assert!(sides.contains(&Side::Players));
        assert_eq!(order.find(order.get(g).unwrap().id()), Some(g));
    }
}
