//! Боевая подсистема: урон, knockback, снаряды, контактные опасности.
//!
//! Контракт событий: всё, что находит попадания (Resolve), пишет события,
//! а применяются они в Damage В СЛЕДУЮЩЕМ тике. Один тик латентности —
//! цена детерминированного порядка (никаких "кто первый прочитал").

pub mod hazard;
pub mod health;
pub mod knockback;
pub mod pickup;
pub mod projectile;

pub use hazard::{ContactHazard, Dashing};
pub use health::{CorpsePrefab, LootDrop};
pub use knockback::{KnockbackReceiver, PendingKnockback};
pub use pickup::Pickup;
pub use projectile::{Projectile, ProjectileParams};

use bevy::prelude::*;

use crate::components::Faction;
use crate::SimulationSet;

/// Попадание зафиксировано (Resolve), урон применится в следующем Damage
#[derive(Event, Debug, Clone, Copy)]
pub struct HitLanded {
    pub attacker: Entity,
    pub target: Entity,
    pub damage: u32,
}

/// Урон реально прошёл (после invincibility gate). Host слушает для HUD/VFX.
#[derive(Event, Debug, Clone, Copy)]
pub struct DamageDealt {
    pub target: Entity,
    pub amount: u32,
    pub remaining: u32,
}

/// Запрос на отбрасывание. Применяется независимо от invincibility.
#[derive(Event, Debug, Clone, Copy)]
pub struct KnockbackEvent {
    pub target: Entity,
    /// Ненормализованное направление; нулевой вектор → fallback +X
    pub direction: Vec2,
    pub force: f32,
}

/// AoE запрос (slam, взрыв): круг → HitLanded + KnockbackEvent по попавшим
#[derive(Event, Debug, Clone, Copy)]
pub struct AreaDamage {
    pub source: Entity,
    pub center: Vec2,
    pub radius: f32,
    pub damage: u32,
    pub knockback: f32,
    /// Фракция атакующего: бьём только противоположную
    pub attacker_faction: Faction,
}

/// Health дошло до нуля
#[derive(Event, Debug, Clone, Copy)]
pub struct EntityDied {
    pub entity: Entity,
}

/// Маркер мёртвого актора: исключает из targeting, движения и атак
#[derive(Component, Debug, Default, Reflect)]
#[reflect(Component)]
pub struct Dead;

/// Отложенный despawn (труп лежит, cue догорает)
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct DespawnAfter {
    pub timer: f32,
}

impl DespawnAfter {
    pub fn new(seconds: f32) -> Self {
        Self { timer: seconds }
    }
}

pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<HitLanded>()
            .add_event::<DamageDealt>()
            .add_event::<KnockbackEvent>()
            .add_event::<AreaDamage>()
            .add_event::<EntityDied>()
            .add_systems(
                FixedUpdate,
                health::tick_invincibility.in_set(SimulationSet::Sense),
            )
            .add_systems(
                FixedUpdate,
                (
                    health::apply_hits,
                    knockback::apply_knockback_events,
                    health::handle_deaths,
                )
                    .chain()
                    .in_set(SimulationSet::Damage),
            )
            .add_systems(
                FixedUpdate,
                knockback::apply_pending_knockback.in_set(SimulationSet::Knockback),
            )
            .add_systems(
                FixedUpdate,
                (
                    projectile::integrate_projectiles,
                    health::resolve_area_damage,
                    hazard::resolve_dash_contact,
                    hazard::resolve_contact_hazards,
                    pickup::resolve_pickups,
                )
                    .chain()
                    .in_set(SimulationSet::Resolve),
            )
            .add_systems(
                FixedUpdate,
                tick_despawn_after.in_set(SimulationSet::Cleanup),
            );
    }
}

/// Тикает отложенные despawn'ы и убирает entity по истечении
pub fn tick_despawn_after(
    mut commands: Commands,
    time: Res<Time<Fixed>>,
    mut query: Query<(Entity, &mut DespawnAfter)>,
) {
    let delta = time.delta_secs();

    for (entity, mut despawn) in query.iter_mut() {
        despawn.timer -= delta;
        if despawn.timer <= 0.0 {
            if let Ok(mut entity_commands) = commands.get_entity(entity) {
                entity_commands.despawn();
            }
        }
    }
}
