//! Player components and resources.
//!
//! All ECS state describing the player lives here, grouped by the state axis
//! that owns it.  Systems that mutate this state are in the sibling modules:
//! - [`super::control`] — movement, jumps, wall cling, dash, parry window
//! - [`super::combat`] — shots, EX attacks, the card economy
//!
//! The axes are orthogonal by design: grounding, the dash override, the jump
//! budget, the parry window, and the shield each own their timers and reset
//! triggers, so no two systems fight over one countdown.

use crate::constants::*;
use bevy::prelude::*;

/// Marker component for the player entity.
#[derive(Component)]
pub struct Player;

/// Which surface the player is on.  Wall cling is only reachable from the
/// air with downward velocity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grounding {
    Grounded,
    Airborne,
    /// `left` is the wall side, not the travel direction.
    WallCling { left: bool },
}

/// Locomotion state: velocity, grounding, the jump budget, and the dash
/// override.
#[derive(Component, Debug, Clone)]
pub struct PlayerMotion {
    pub vel: Vec2,
    pub grounding: Grounding,
    /// Facing sign: -1.0 left, 1.0 right.
    pub facing: f32,
    /// Jumps consumed since last ground contact.
    pub jumps_used: u32,
    /// One banked extra jump from a perfect parry; consumed by the jump that
    /// exceeds the normal budget.
    pub bonus_jump: bool,
    /// While positive, holding jump applies reduced gravity.
    pub variable_jump_timer: f32,
    /// Remaining cling budget; refilled on landing.
    pub cling_timer: f32,
    /// Set when the cling budget ran dry, blocking re-cling until landing.
    pub cling_spent: bool,
    /// Additive run-speed bonus from chained wall jumps; reset on damage.
    pub momentum_boost: f32,
    /// While positive the dash override is live and grants i-frames.
    pub dash_timer: f32,
    pub dash_cooldown: f32,
    pub dash_dir: Vec2,
    /// One air dash per airtime; refilled on landing or successful parry.
    pub air_dash_available: bool,
}

impl Default for PlayerMotion {
    fn default() -> Self {
        Self {
            vel: Vec2::ZERO,
            grounding: Grounding::Grounded,
            facing: 1.0,
            jumps_used: 0,
            bonus_jump: false,
            variable_jump_timer: 0.0,
            cling_timer: CLING_BUDGET_TICKS,
            cling_spent: false,
            momentum_boost: 0.0,
            dash_timer: 0.0,
            dash_cooldown: 0.0,
            dash_dir: Vec2::X,
            air_dash_available: true,
        }
    }
}

impl PlayerMotion {
    /// Dash i-frames cover exactly the dash duration.
    #[inline]
    pub fn is_dashing(&self) -> bool {
        self.dash_timer > 0.0
    }

    /// Run-speed cap including the wall-jump momentum bonus.
    #[inline]
    pub fn max_run_speed(&self) -> f32 {
        RUN_MAX_SPEED * (1.0 + self.momentum_boost)
    }
}

/// Which EX attack the next EX-fire input triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExAttack {
    #[default]
    HomingVolley,
    SpreadVolley,
    Boomerang,
    Bomb,
    Ultimate,
}

impl ExAttack {
    /// Selection slots 1..=5, as presented to the host input mapping.
    pub fn from_slot(slot: u8) -> Option<ExAttack> {
        match slot {
            1 => Some(ExAttack::HomingVolley),
            2 => Some(ExAttack::SpreadVolley),
            3 => Some(ExAttack::Boomerang),
            4 => Some(ExAttack::Bomb),
            5 => Some(ExAttack::Ultimate),
            _ => None,
        }
    }

    pub fn card_cost(self) -> f32 {
        match self {
            ExAttack::HomingVolley => EX_HOMING_VOLLEY_COST,
            ExAttack::SpreadVolley => EX_SPREAD_VOLLEY_COST,
            ExAttack::Boomerang => EX_BOOMERANG_COST,
            ExAttack::Bomb => EX_BOMB_COST,
            ExAttack::Ultimate => EX_ULTIMATE_COST,
        }
    }
}

/// Combat state: HP, i-frames, the parry window and chain, the shield, the
/// card pool, and shot cooldowns.
#[derive(Component, Debug)]
pub struct PlayerCombat {
    pub hp: i32,
    pub max_hp: i32,
    /// Post-hit invulnerability; dash i-frames live on [`PlayerMotion`].
    pub iframe_timer: f32,
    /// Open parry window countdown; 0 when closed.
    pub parry_timer: f32,
    pub parry_chain: u32,
    /// Chain grace period; expiry resets the chain to zero.
    pub chain_timer: f32,
    /// While positive, basic shots deal double damage.
    pub exam_ace_timer: f32,
    /// Armed shield blocks exactly one hit.
    pub shield_active: bool,
    pub shield_cooldown: f32,
    /// Spendable EX resource, fractional, clamped to `[0, max_cards]`.
    pub cards: f32,
    pub ex_selected: ExAttack,
    pub shot_cooldown: f32,
    /// Ticks the shoot input has been held; a long hold releases as a charge
    /// shot.
    pub charge_held: f32,
    /// Focus meter for held slow-motion.
    pub focus: f32,
}

impl Default for PlayerCombat {
    fn default() -> Self {
        Self {
            hp: PLAYER_MAX_HP,
            max_hp: PLAYER_MAX_HP,
            iframe_timer: 0.0,
            parry_timer: 0.0,
            parry_chain: 0,
            chain_timer: 0.0,
            exam_ace_timer: 0.0,
            shield_active: false,
            shield_cooldown: 0.0,
            cards: 0.0,
            ex_selected: ExAttack::default(),
            shot_cooldown: 0.0,
            charge_held: 0.0,
            focus: FOCUS_MAX,
        }
    }
}

/// Outcome of an incoming hit after the defense ladder has been walked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitOutcome {
    /// I-frames (post-hit or dash) swallowed the hit entirely.
    Ignored,
    /// The armed shield consumed the hit; no damage, shield on cooldown.
    Shielded,
    /// One HP lost; i-frames opened, momentum and chain reset.
    Damaged,
}

impl PlayerCombat {
    #[inline]
    pub fn parry_open(&self) -> bool {
        self.parry_timer > 0.0
    }

    /// True while the parry window sits in its leading "perfect" portion.
    #[inline]
    pub fn parry_perfect(&self, window: f32, perfect: f32) -> bool {
        self.parry_timer > 0.0 && self.parry_timer >= window - perfect
    }

    /// Adds to the card pool, saturating at `max_cards`.
    pub fn add_cards(&mut self, amount: f32, max_cards: f32) {
        self.cards = (self.cards + amount).clamp(0.0, max_cards);
    }

    /// Spends `cost` cards, or returns `false` without going negative.
    pub fn try_spend_cards(&mut self, cost: f32) -> bool {
        if self.cards + 1e-6 < cost {
            return false;
        }
        self.cards = (self.cards - cost).max(0.0);
        true
    }

    /// Basic-shot damage with the exam-ace multiplier applied.
    pub fn shot_damage(&self) -> f32 {
        if self.exam_ace_timer > 0.0 {
            SHOT_DAMAGE * EXAM_ACE_DAMAGE_MULTIPLIER
        } else {
            SHOT_DAMAGE
        }
    }

    /// Walks the defense ladder for a hit that was not parried: i-frames,
    /// then shield, then damage.  The caller checks parry first.
    pub fn absorb_hit(&mut self, motion: &mut PlayerMotion, iframe_ticks: f32) -> HitOutcome {
        if self.iframe_timer > 0.0 || motion.is_dashing() {
            return HitOutcome::Ignored;
        }
        if self.shield_active {
            self.shield_active = false;
            return HitOutcome::Shielded;
        }
        self.hp = (self.hp - 1).max(0);
        self.iframe_timer = iframe_ticks;
        self.parry_chain = 0;
        self.chain_timer = 0.0;
        motion.momentum_boost = 0.0;
        HitOutcome::Damaged
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cards_saturate_at_cap() {
        let mut combat = PlayerCombat {
            cards: 4.5,
            ..Default::default()
        };
        combat.add_cards(PERFECT_PARRY_CARD_REWARD, MAX_CARDS);
        assert_eq!(combat.cards, MAX_CARDS);
        combat.cards = 4.5;
        combat.add_cards(PARRY_CARD_REWARD, MAX_CARDS);
        assert_eq!(combat.cards, MAX_CARDS);
    }

    #[test]
    fn spending_never_goes_negative() {
        let mut combat = PlayerCombat {
            cards: 1.5,
            ..Default::default()
        };
        assert!(!combat.try_spend_cards(2.0));
        assert_eq!(combat.cards, 1.5);
        assert!(combat.try_spend_cards(1.5));
        assert_eq!(combat.cards, 0.0);
    }

    #[test]
    fn perfect_window_is_the_leading_portion() {
        let mut combat = PlayerCombat {
            parry_timer: PARRY_WINDOW_TICKS,
            ..Default::default()
        };
        assert!(combat.parry_perfect(PARRY_WINDOW_TICKS, PERFECT_PARRY_TICKS));
        combat.parry_timer = PARRY_WINDOW_TICKS - PERFECT_PARRY_TICKS - 1.0;
        assert!(combat.parry_open());
        assert!(!combat.parry_perfect(PARRY_WINDOW_TICKS, PERFECT_PARRY_TICKS));
    }

    #[test]
    fn defense_ladder_iframes_then_shield_then_damage() {
        let mut combat = PlayerCombat::default();
        let mut motion = PlayerMotion::default();

        motion.dash_timer = 1.0;
        assert_eq!(
            combat.absorb_hit(&mut motion, PLAYER_IFRAME_TICKS),
            HitOutcome::Ignored
        );
        assert_eq!(combat.hp, PLAYER_MAX_HP);

        motion.dash_timer = 0.0;
        combat.shield_active = true;
        assert_eq!(
            combat.absorb_hit(&mut motion, PLAYER_IFRAME_TICKS),
            HitOutcome::Shielded
        );
        assert_eq!(combat.hp, PLAYER_MAX_HP);
        assert!(!combat.shield_active);

        motion.momentum_boost = 1.0;
        assert_eq!(
            combat.absorb_hit(&mut motion, PLAYER_IFRAME_TICKS),
            HitOutcome::Damaged
        );
        assert_eq!(combat.hp, PLAYER_MAX_HP - 1);
        assert_eq!(motion.momentum_boost, 0.0);
        // Fresh i-frames swallow the immediate follow-up.
        assert_eq!(
            combat.absorb_hit(&mut motion, PLAYER_IFRAME_TICKS),
            HitOutcome::Ignored
        );
    }

    #[test]
    fn ex_slots_cover_one_through_five() {
        assert_eq!(ExAttack::from_slot(1), Some(ExAttack::HomingVolley));
        assert_eq!(ExAttack::from_slot(5), Some(ExAttack::Ultimate));
        assert_eq!(ExAttack::from_slot(0), None);
        assert_eq!(ExAttack::from_slot(6), None);
    }
}
