//! Session tuning shared by the world, systems and loop.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Decides whether a line-of-sight result lets an attack through.
///
/// `RequireBlocked` reproduces the shipped game, where strikes only land when
/// the sampled line is obstructed. `RequireClear` is the conventional rule.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SightGate {
    /// Attacks land only when sight is blocked.
    #[default]
    RequireBlocked,
    /// Attacks land only when sight is clear.
    RequireClear,
}

impl SightGate {
    /// Reports whether an attack passes given the sampled sight result.
    #[must_use]
    pub const fn permits(self, sight_clear: bool) -> bool {
        match self {
            Self::RequireBlocked => !sight_clear,
            Self::RequireClear => sight_clear,
        }
    }
}

/// Tunables fixed for the lifetime of a session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Simulation steps per second.
    pub tick_rate: u32,
    /// Edge length of the square camera window, in cells.
    pub window_size: u32,
    /// Edge length of a tile in world units.
    pub tile_size: f32,
    /// Chebyshev reach of the player's strike, in cells.
    pub player_attack_range: u32,
    /// Minimum time between player steps, in milliseconds.
    pub player_move_cooldown_ms: u64,
    /// Minimum time between player strikes, in milliseconds.
    pub player_attack_cooldown_ms: u64,
    /// Damage dealt by hazard tiles.
    pub hazard_damage: u32,
    /// Sight rule applied to player strikes and ranged monsters.
    pub sight_gate: SightGate,
    /// Seed for the movement strategies.
    pub rng_seed: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tick_rate: 60,
            window_size: 9,
            tile_size: 32.0,
            player_attack_range: 2,
            player_move_cooldown_ms: 150,
            player_attack_cooldown_ms: 400,
            hazard_damage: 1,
            sight_gate: SightGate::RequireBlocked,
            rng_seed: 0x6772_6964_6661_6c6c,
        }
    }
}

impl SessionConfig {
    /// Rejects settings the loop cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_rate == 0 {
            return Err(ConfigError::InvalidSessionConfig("tick_rate must be positive"));
        }
        if self.window_size == 0 {
            return Err(ConfigError::InvalidSessionConfig(
                "window_size must be positive",
            ));
        }
        if !(self.tile_size.is_finite() && self.tile_size > 0.0) {
            return Err(ConfigError::InvalidSessionConfig(
                "tile_size must be a positive number",
            ));
        }
        Ok(())
    }

    /// Duration of one simulation step.
    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(1) / self.tick_rate.max(1)
    }

    /// Minimum time between player steps.
    #[must_use]
    pub const fn player_move_cooldown(&self) -> Duration {
        Duration::from_millis(self.player_move_cooldown_ms)
    }

    /// Minimum time between player strikes.
    #[must_use]
    pub const fn player_attack_cooldown(&self) -> Duration {
        Duration::from_millis(self.player_attack_cooldown_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sight_gate_inverts_for_literal_rule() {
        assert!(SightGate::RequireBlocked.permits(false));
        assert!(!SightGate::RequireBlocked.permits(true));
        assert!(SightGate::RequireClear.permits(true));
        assert!(!SightGate::RequireClear.permits(false));
    }

    #[test]
    fn default_config_runs_at_sixty_hertz() {
        let config = SessionConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.tick_interval(), Duration::from_secs(1) / 60);
    }

    #[test]
    fn zero_window_is_rejected() {
        let config = SessionConfig {
            window_size: 0,
            ..SessionConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidSessionConfig(_))
        ));
    }
}
