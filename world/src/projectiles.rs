//! Range-limited projectiles flying in a fixed direction.

use std::time::Duration;

use gridfall_core::{MonsterId, ProjectileId, ProjectileSnapshot, WorldPoint};

/// Projectile state stored inside the world.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Projectile {
    pub(crate) id: ProjectileId,
    pub(crate) monster: MonsterId,
    position: WorldPoint,
    direction: (f32, f32),
    speed: f32,
    traveled: f32,
    max_distance: f32,
}

impl Projectile {
    /// Creates a projectile heading from `origin` to `target`.
    ///
    /// `speed` is measured in world units per second and `max_distance` in
    /// world units. A projectile aimed at its own origin keeps a zero direction
    /// and still expires once its travel budget is spent.
    pub(crate) fn launch(
        id: ProjectileId,
        monster: MonsterId,
        origin: WorldPoint,
        target: WorldPoint,
        speed: f32,
        max_distance: f32,
    ) -> Self {
        let dx = target.x() - origin.x();
        let dy = target.y() - origin.y();
        let length = (dx * dx + dy * dy).sqrt();
        let direction = if length > f32::EPSILON {
            (dx / length, dy / length)
        } else {
            (0.0, 0.0)
        };

        Self {
            id,
            monster,
            position: origin,
            direction,
            speed,
            traveled: 0.0,
            max_distance,
        }
    }

    /// Moves the projectile and reports whether it is now terminal.
    pub(crate) fn advance(&mut self, dt: Duration) -> bool {
        let step = self.speed * dt.as_secs_f32();
        self.position = WorldPoint::new(
            self.position.x() + self.direction.0 * step,
            self.position.y() + self.direction.1 * step,
        );
        self.traveled += step;
        self.is_terminal()
    }

    /// Reports whether the travel budget is exhausted.
    pub(crate) fn is_terminal(&self) -> bool {
        self.traveled >= self.max_distance
    }

    pub(crate) fn snapshot(&self) -> ProjectileSnapshot {
        ProjectileSnapshot {
            id: self.id,
            monster: self.monster,
            position: self.position,
            traveled: self.traveled,
            max_distance: self.max_distance,
        }
    }
}
