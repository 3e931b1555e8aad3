//! A participant in combat: a player or a monster plus initiative state.

use delve_core::{Actor, CatalogId, EntityId, Monster, Player, Side};

use crate::dice::{Die, RandomSource};
use crate::error::MechResult;

/// The underlying model of a combatant. Exactly one variant is populated.
#[derive(Debug, Clone)]
pub enum CombatantKind {
    /// A player character.
    Player(Player),
    /// A monster.
    Monster(Monster),
}

impl CombatantKind {
    fn actor(&self) -> &dyn Actor {
        match self {
            Self::Player(p) => p,
            Self::Monster(m) => m,
        }
    }

    fn actor_mut(&mut self) -> &mut dyn Actor {
        match self {
            Self::Player(p) => p,
            Self::Monster(m) => m,
        }
    }
}

/// A player or monster wrapped with initiative and a per-round acted flag.
#[derive(Debug, Clone)]
pub struct Combatant {
    kind: CombatantKind,
    initiative_roll: i32,
    insertion_order: usize,
    has_acted: bool,
}

impl Combatant {
    /// Wrap a player.
    pub fn player(player: Player) -> Self {
        Self::from_kind(CombatantKind::Player(player))
    }

    /// Wrap a monster.
    pub fn monster(monster: Monster) -> Self {
        Self::from_kind(CombatantKind::Monster(monster))
    }

    fn from_kind(kind: CombatantKind) -> Self {
        Self {
            kind,
            initiative_roll: 0,
            insertion_order: 0,
            has_acted: false,
        }
    }

    /// The underlying model.
    pub fn kind(&self) -> &CombatantKind {
        &self.kind
    }

    /// The player, if this combatant is one.
    pub fn as_player(&self) -> Option<&Player> {
        match &self.kind {
            CombatantKind::Player(p) => Some(p),
            CombatantKind::Monster(_) => None,
        }
    }

    /// The monster, if this combatant is one.
    pub fn as_monster(&self) -> Option<&Monster> {
        match &self.kind {
            CombatantKind::Monster(m) => Some(m),
            CombatantKind::Player(_) => None,
        }
    }

    /// Roll the initiative die. Returns the resulting initiative.
    pub fn roll_initiative<R>(&mut self, die: Die, source: &mut R) -> MechResult<i32>
    where
        R: RandomSource + ?Sized,
    {
        let face = source.next_face(die.sides())?;
        self.initiative_roll = i32::try_from(face).unwrap_or(i32::MAX);
        Ok(self.initiative())
    }

    /// Record an externally rolled initiative die.
    pub fn set_initiative_roll(&mut self, roll: i32) {
        self.initiative_roll = roll;
    }

    /// The raw initiative roll.
    pub fn initiative_roll(&self) -> i32 {
        self.initiative_roll
    }

    /// Roll plus modifier, saturating at the `i32` bounds.
    pub fn initiative(&self) -> i32 {
        self.initiative_roll.saturating_add(self.initiative_modifier())
    }

    /// Tie-break key.
    pub fn insertion_order(&self) -> usize {
        self.insertion_order
    }

    pub(crate) fn set_insertion_order(&mut self, order: usize) {
        self.insertion_order = order;
    }

    /// Whether the combatant has acted this round.
    pub fn has_acted(&self) -> bool {
        self.has_acted
    }

    /// Flag the combatant as having acted.
    pub fn mark_acted(&mut self) {
        self.has_acted = true;
    }

    /// Clear the acted flag for a new round.
    pub fn reset_acted(&mut self) {
        self.has_acted = false;
    }
}

impl Actor for Combatant {
    fn id(&self) -> EntityId {
        self.kind.actor().id()
    }

    fn display_name(&self) -> &str {
        self.kind.actor().display_name()
    }

    fn current_health(&self) -> i32 {
        self.kind.actor().current_health()
    }

    fn take_damage(&mut self, amount: i32) -> i32 {
        self.kind.actor_mut().take_damage(amount)
    }

    fn heal(&mut self, amount: i32) -> i32 {
        self.kind.actor_mut().heal(amount)
    }

    fn side(&self) -> Side {
        self.kind.actor().side()
    }

    fn defense(&self) -> i32 {
        self.kind.actor().defense()
    }

    fn attack_dice(&self) -> u32 {
        self.kind.actor().attack_dice()
    }

    fn base_damage(&self) -> i32 {
        self.kind.actor().base_damage()
    }

    fn speed(&self) -> u32 {
        self.kind.actor().speed()
    }

    fn initiative_modifier(&self) -> i32 {
        self.kind.actor().initiative_modifier()
    }

    fn check_bonus(&self, skill: &CatalogId) -> i32 {
        self.kind.actor().check_bonus(skill)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::ScriptedFaces;

    #[test]
    fn exactly_one_variant() {
        let c = Combatant::player(Player::new("Mira", 8).unwrap());
        assert!(c.as_player().is_some());
        assert!(c.as_monster().is_none());
        assert_eq!(c.side(), Side::Players);

        let m = Monster::new("Rat", CatalogId::new("rat").unwrap(), 2).unwrap();
        let c = Combatant::monster(m);
        assert!(c.as_monster().is_some());
        assert!(c.as_player().is_none());
    }

    #[test]
    fn initiative_is_flat_sum() {
        let p = Player::new("Mira", 8)
            .unwrap()
            .with_initiative_modifier(-3);
        let mut c = Combatant::player(p);
        let mut script = ScriptedFaces::new([2]);
        assert_eq!(c.roll_initiative(Die::D20, &mut script).unwrap(), -1);
        assert_eq!(c.initiative_roll(), 2);
    }

    #[test]
    fn extreme_modifiers_saturate() {
        let p = Player::new("Mira", 8)
            .unwrap()
            .with_initiative_modifier(i32::MAX);
        let mut c = Combatant::player(p);
        let mut script = ScriptedFaces::new([20]);
        assert_eq!(c.roll_initiative(Die::D20, &mut script).unwrap(), i32::MAX);

        let p = Player::new("Sela", 8)
            .unwrap()
            .with_initiative_modifier(i32::MIN);
        let mut c = Combatant::player(p);
        c.set_initiative_roll(-5);
        assert_eq!(c.initiative(), i32::MIN);
    }

    #[test]
    fn acted_flag_toggles() {
        let mut c = Combatant::player(Player::new("Mira", 8).unwrap());
        assert!(!c.has_acted());
        c.mark_acted();
        assert!(c.has_acted());
        c.reset_acted();
        assert!(!c.has_acted());
    }

    #[test]
    fn delegates_health() {
        let mut c = Combatant::player(Player::new("Mira", 8).unwrap());
        assert_eq!(c.take_damage(3), 3);
        assert_eq!(c.current_health(), 5);
        assert!(c.is_active());
        assert_eq!(c.display_name(), "Mira");
    }
}
