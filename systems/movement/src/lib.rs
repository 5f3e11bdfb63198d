#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Seeded movement system that asks each monster's strategy for a step.
//!
//! Strategies only propose offsets. The world decides whether a proposed
//! step is committed, so a strategy never needs to know about occupancy.

use std::{collections::BTreeMap, fmt};

use gridfall_core::{
    CellCoord, Command, Direction, Event, MonsterId, MonsterView, Offset, StrategyKind,
};
use gridfall_system_pathfinding::Pathfinder;
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Inputs available to a strategy when it proposes a step.
pub struct StrategyContext<'a> {
    /// Cell currently occupied by the moving monster.
    pub origin: CellCoord,
    /// Cell the monster tracks, usually the player.
    pub target: CellCoord,
    /// Number of grid columns.
    pub columns: u32,
    /// Number of grid rows.
    pub rows: u32,
    /// Reports whether a cell stops path searches.
    pub is_blocked: &'a dyn Fn(CellCoord) -> bool,
}

/// Movement policy attached to a single monster.
pub trait MovementStrategy: fmt::Debug + Send {
    /// Policy implemented by the strategy.
    fn kind(&self) -> StrategyKind;

    /// Proposes a displacement for the current tick.
    fn propose(&mut self, ctx: &StrategyContext<'_>, rng: &mut dyn RngCore) -> Offset;
}

/// Picks one of the four cardinal directions uniformly.
#[derive(Debug, Default)]
pub struct RandomWalk;

impl MovementStrategy for RandomWalk {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Random
    }

    fn propose(&mut self, _ctx: &StrategyContext<'_>, rng: &mut dyn RngCore) -> Offset {
        Direction::CARDINALS[rng.gen_range(0..Direction::CARDINALS.len())].offset()
    }
}

/// Picks any of the eight neighbours, resampling the zero offset.
#[derive(Debug, Default)]
pub struct Omnidirectional;

impl MovementStrategy for Omnidirectional {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Omnidirectional
    }

    fn propose(&mut self, _ctx: &StrategyContext<'_>, rng: &mut dyn RngCore) -> Offset {
        loop {
            let offset = Offset::new(rng.gen_range(-1..=1), rng.gen_range(-1..=1));
            if !offset.is_zero() {
                return offset;
            }
        }
    }
}

/// Draws an axis, then a sign. Each call is independent of the last.
#[derive(Debug, Default)]
pub struct Straight;

impl MovementStrategy for Straight {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Straight
    }

    fn propose(&mut self, _ctx: &StrategyContext<'_>, rng: &mut dyn RngCore) -> Offset {
        let horizontal = rng.gen_bool(0.5);
        let sign = if rng.gen_bool(0.5) { 1 } else { -1 };
        if horizontal {
            Offset::new(sign, 0)
        } else {
            Offset::new(0, sign)
        }
    }
}

/// Follows a freshly computed shortest path toward the target.
#[derive(Debug, Default)]
pub struct Pursuit {
    pathfinder: Pathfinder,
}

impl MovementStrategy for Pursuit {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Pursuit
    }

    fn propose(&mut self, ctx: &StrategyContext<'_>, _rng: &mut dyn RngCore) -> Offset {
        let path = self.pathfinder.find_path(
            ctx.origin,
            ctx.target,
            ctx.columns,
            ctx.rows,
            ctx.is_blocked,
        );
        match path.get(1) {
            Some(next) => ctx.origin.offset_to(*next),
            None => {
                if path.is_empty() {
                    tracing::trace!(origin = %ctx.origin, target = %ctx.target, "no path");
                }
                Offset::ZERO
            }
        }
    }
}

/// Builds the strategy implementing `kind`.
#[must_use]
pub fn strategy_for(kind: StrategyKind) -> Box<dyn MovementStrategy> {
    match kind {
        StrategyKind::Random => Box::new(RandomWalk),
        StrategyKind::Omnidirectional => Box::new(Omnidirectional),
        StrategyKind::Straight => Box::new(Straight),
        StrategyKind::Pursuit => Box::<Pursuit>::default(),
    }
}

/// Pure system that reacts to world events and emits monster step commands.
#[derive(Debug)]
pub struct Movement {
    rng: ChaCha8Rng,
    strategies: BTreeMap<MonsterId, Box<dyn MovementStrategy>>,
}

impl Movement {
    /// Creates a movement system whose random draws derive from `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            strategies: BTreeMap::new(),
        }
    }

    /// Consumes world events and the monster view to emit step commands.
    ///
    /// Monsters are visited in identifier order and only when their movement
    /// cooldown elapsed, so a replay with the same seed and inputs proposes
    /// the same steps.
    #[allow(clippy::too_many_arguments)]
    pub fn handle<F>(
        &mut self,
        events: &[Event],
        monsters: &MonsterView,
        player: CellCoord,
        columns: u32,
        rows: u32,
        is_blocked: F,
        out: &mut Vec<Command>,
    ) where
        F: Fn(CellCoord) -> bool,
    {
        if !events
            .iter()
            .any(|event| matches!(event, Event::TimeAdvanced { .. }))
        {
            return;
        }
        self.strategies.retain(|id, _| monsters.get(*id).is_some());

        for monster in monsters.iter() {
            if !monster.move_ready_in.is_zero() {
                continue;
            }

            let strategy = self
                .strategies
                .entry(monster.id)
                .or_insert_with(|| strategy_for(monster.strategy));
            let ctx = StrategyContext {
                origin: monster.cell,
                target: player,
                columns,
                rows,
                is_blocked: &is_blocked,
            };
            let offset = strategy.propose(&ctx, &mut self.rng);
            if offset.is_zero() {
                continue;
            }
            out.push(Command::StepMonster {
                monster: monster.id,
                offset,
            });
        }
    }
}
