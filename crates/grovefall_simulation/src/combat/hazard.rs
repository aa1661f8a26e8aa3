//! Контактный урон: dash-рывки и статичные опасности (шипы, лужи).

use bevy::prelude::*;
use std::collections::HashSet;

use crate::combat::{Dead, HitLanded, KnockbackEvent};
use crate::components::{Actor, Faction, Footprint, PhysicsBody};
use crate::logger::log;
use crate::spatial;

/// Активная фаза рывка: тело бьёт всё, через что проходит.
///
/// Вешается sequencer'ом на вход в dash-фазу, снимается на выходе.
/// `hits` — один удар на цель за рывок.
#[derive(Component, Debug, Clone)]
pub struct Dashing {
    pub damage: u32,
    pub knockback: f32,
    pub hits: HashSet<Entity>,
}

impl Dashing {
    pub fn new(damage: u32, knockback: f32) -> Self {
        Self {
            damage,
            knockback,
            hits: HashSet::new(),
        }
    }
}

/// Статичная контактная опасность.
///
/// `once = true` — каждая цель страдает один раз за жизнь hazard'а;
/// иначе повторные тики гасятся invincibility окном цели.
#[derive(Component, Debug, Clone)]
pub struct ContactHazard {
    pub damage: u32,
    pub knockback: f32,
    pub faction: Faction,
    pub once: bool,
    /// Hazard уничтожается после первого контакта (мина, а не шипы)
    pub single_use: bool,
    pub damaged: HashSet<Entity>,
}

impl ContactHazard {
    pub fn new(damage: u32, knockback: f32, faction: Faction) -> Self {
        Self {
            damage,
            knockback,
            faction,
            once: false,
            single_use: false,
            damaged: HashSet::new(),
        }
    }

    pub fn one_shot(mut self) -> Self {
        self.once = true;
        self
    }

    pub fn single_use(mut self) -> Self {
        self.single_use = true;
        self
    }
}

/// Resolve: пересечения рывков с противоположной фракцией
pub fn resolve_dash_contact(
    mut hits_out: EventWriter<HitLanded>,
    mut knockbacks: EventWriter<KnockbackEvent>,
    mut dashers: Query<
        (Entity, &Transform, &Footprint, &Actor, &PhysicsBody, &mut Dashing),
        Without<Dead>,
    >,
    targets: Query<
        (Entity, &Transform, &Actor, &Footprint),
        (Without<Dashing>, Without<Dead>),
    >,
) {
    for (dasher, transform, footprint, actor, body, mut dashing) in dashers.iter_mut() {
        let dasher_pos = transform.translation.truncate();

        for (target, target_transform, target_actor, target_footprint) in targets.iter() {
            if target == dasher || dashing.hits.contains(&target) {
                continue;
            }
            if !actor.faction.opposes(target_actor.faction) {
                continue;
            }

            let target_pos = target_transform.translation.truncate();
            if !spatial::circles_overlap(
                dasher_pos,
                footprint.radius,
                target_pos,
                target_footprint.radius,
            ) {
                continue;
            }

            dashing.hits.insert(target);
            log(&format!("💢 Dash from {:?} struck {:?}", dasher, target));

            hits_out.write(HitLanded {
                attacker: dasher,
                target,
                damage: dashing.damage,
            });
            // Отбрасываем по ходу рывка, а не радиально
            knockbacks.write(KnockbackEvent {
                target,
                direction: body.velocity,
                force: dashing.knockback,
            });
        }
    }
}

/// Resolve: пересечения акторов со статичными hazard'ами
pub fn resolve_contact_hazards(
    mut commands: Commands,
    mut hits_out: EventWriter<HitLanded>,
    mut knockbacks: EventWriter<KnockbackEvent>,
    mut hazards: Query<(Entity, &Transform, &Footprint, &mut ContactHazard)>,
    targets: Query<
        (Entity, &Transform, &Actor, &Footprint),
        (Without<ContactHazard>, Without<Dead>),
    >,
) {
    for (hazard_entity, transform, footprint, mut hazard) in hazards.iter_mut() {
        let hazard_pos = transform.translation.truncate();

        for (target, target_transform, actor, target_footprint) in targets.iter() {
            if !hazard.faction.opposes(actor.faction) {
                continue;
            }
            if hazard.once && hazard.damaged.contains(&target) {
                continue;
            }

            let target_pos = target_transform.translation.truncate();
            if !spatial::circles_overlap(
                hazard_pos,
                footprint.radius,
                target_pos,
                target_footprint.radius,
            ) {
                continue;
            }

            if hazard.once {
                hazard.damaged.insert(target);
            }

            hits_out.write(HitLanded {
                attacker: hazard_entity,
                target,
                damage: hazard.damage,
            });
            knockbacks.write(KnockbackEvent {
                target,
                direction: target_pos - hazard_pos,
                force: hazard.knockback,
            });

            if hazard.single_use {
                if let Ok(mut entity_commands) = commands.get_entity(hazard_entity) {
                    entity_commands.despawn();
                }
                break;
            }
        }
    }
}
