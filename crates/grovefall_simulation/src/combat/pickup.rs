//! Pickups: лечащие дропы с врагов.

use bevy::prelude::*;

use crate::combat::Dead;
use crate::components::{Actor, Faction, Footprint, Health};
use crate::logger::log;
use crate::spatial;

/// Лежащий на земле хил. Подбирается игроком по overlap.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Pickup {
    pub heal: u32,
}

/// Resolve: подбор pickups игроком
pub fn resolve_pickups(
    mut commands: Commands,
    pickups: Query<(Entity, &Transform, &Footprint, &Pickup)>,
    mut actors: Query<
        (&Transform, &Actor, &Footprint, &mut Health),
        (Without<Pickup>, Without<Dead>),
    >,
) {
    for (pickup_entity, transform, footprint, pickup) in pickups.iter() {
        let pickup_pos = transform.translation.truncate();

        for (actor_transform, actor, actor_footprint, mut health) in actors.iter_mut() {
            if actor.faction != Faction::Player {
                continue;
            }

            let actor_pos = actor_transform.translation.truncate();
            if !spatial::circles_overlap(
                pickup_pos,
                footprint.radius,
                actor_pos,
                actor_footprint.radius,
            ) {
                continue;
            }

            health.heal(pickup.heal);
            log(&format!(
                "🍋 Pickup {:?} consumed (+{} HP, now {}/{})",
                pickup_entity, pickup.heal, health.current, health.max
            ));

            if let Ok(mut entity_commands) = commands.get_entity(pickup_entity) {
                entity_commands.despawn();
            }
            break; // Один потребитель на pickup
        }
    }
}
