//! Burst fire: серии выстрелов с перезарядкой между сериями.

use bevy::prelude::*;

use crate::ai::{Agent, AgentState};
use crate::combat::projectile::spawn_projectile;
use crate::combat::{Dead, ProjectileParams};
use crate::components::Actor;
use crate::logger::log;

/// Стрельба сериями: N выстрелов через interval, затем cooldown.
///
/// Цель вышла из range посреди серии — прогресс сбрасывается В НОЛЬ и
/// перезарядка взводится сразу. Возврат цели в range не возобновляет
/// недостреленную серию.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct BurstFire {
    pub shots_per_burst: u32,
    pub shot_interval: f32,
    pub cooldown: f32,
    pub range: f32,
    pub projectile: ProjectileParams,
    pub shots_fired: u32,
    pub shot_timer: f32,
    pub cooldown_timer: f32,
}

impl Default for BurstFire {
    fn default() -> Self {
        Self {
            shots_per_burst: 3,
            shot_interval: 0.15,
            cooldown: 1.5,
            range: 10.0,
            projectile: ProjectileParams::default(),
            shots_fired: 0,
            shot_timer: 0.0,
            cooldown_timer: 0.0,
        }
    }
}

impl BurstFire {
    /// Один тик логики. Возвращает true, когда пора выстрелить.
    pub fn step(&mut self, target_in_range: bool, delta: f32) -> bool {
        if self.cooldown_timer > 0.0 {
            self.cooldown_timer = (self.cooldown_timer - delta).max(0.0);
            return false;
        }

        if !target_in_range {
            if self.shots_fired > 0 {
                // Прерванная серия: сброс прогресса + немедленная перезарядка
                self.shots_fired = 0;
                self.shot_timer = 0.0;
                self.cooldown_timer = self.cooldown;
            }
            return false;
        }

        self.shot_timer -= delta;
        if self.shot_timer > 0.0 {
            return false;
        }

        self.shots_fired += 1;
        self.shot_timer += self.shot_interval;

        if self.shots_fired >= self.shots_per_burst {
            self.shots_fired = 0;
            self.shot_timer = 0.0;
            self.cooldown_timer = self.cooldown;
        }

        true
    }
}

/// Sequence: burst fire для агентов с BurstFire (обычно вместо репертуара атак)
pub fn burst_fire(
    mut commands: Commands,
    time: Res<Time<Fixed>>,
    mut guards: Query<
        (Entity, &mut BurstFire, &Agent, &AgentState, &Actor, &Transform),
        Without<Dead>,
    >,
    positions: Query<&Transform, Without<BurstFire>>,
) {
    let delta = time.delta_secs();

    for (entity, mut burst, agent, state, actor, transform) in guards.iter_mut() {
        if *state == AgentState::Dead {
            continue;
        }

        let position = transform.translation.truncate();
        let target_pos = agent
            .target
            .and_then(|t| positions.get(t).ok())
            .map(|t| t.translation.truncate());

        // Отступление вытесняет стрельбу: для серии это выход из range
        // (прерванная серия сбрасывается и взводит перезарядку)
        let in_range = *state != AgentState::Retreating
            && target_pos
                .map(|p| p.distance(position) <= burst.range)
                .unwrap_or(false);

        if burst.step(in_range, delta) {
            // in_range гарантирует Some
            if let Some(target_pos) = target_pos {
                let heading = target_pos - position;
                spawn_projectile(
                    &mut commands,
                    position,
                    heading,
                    entity,
                    actor.faction,
                    burst.projectile,
                );
                log(&format!("🔫 Guard {:?} burst shot", entity));
            }
        }
    }
}
