//! Снаряды: swept движение, pierce, idempotent попадания.

use bevy::prelude::*;
use bevy_rapier2d::prelude::{Collider, CollisionGroups, RigidBody, Sensor, Velocity};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::combat::{Dead, HitLanded, KnockbackEvent};
use crate::components::{Actor, Faction, Footprint, Health, Obstacle};
use crate::logger::log;
use crate::spatial;

/// Тюнинг снаряда (скаляры, сериализуемые для конфигов оружия)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Reflect)]
pub struct ProjectileParams {
    pub speed: f32,
    pub lifetime: f32,
    pub damage: u32,
    pub knockback: f32,
    /// Сколько целей пробивает НАСКВОЗЬ (0 = умирает на первой)
    pub pierce: u32,
    pub radius: f32,
}

impl Default for ProjectileParams {
    fn default() -> Self {
        Self {
            speed: 30.0,
            lifetime: 1.5,
            damage: 10,
            knockback: 5.0,
            pierce: 0,
            radius: 0.15,
        }
    }
}

/// Летящий снаряд.
///
/// `hits` делает попадания идемпотентными: pierce-снаряд, задевший цель
/// в двух последовательных тиках, бьёт её один раз.
#[derive(Component, Debug, Clone)]
pub struct Projectile {
    /// Нормализованное направление полёта
    pub heading: Vec2,
    pub params: ProjectileParams,
    pub remaining_lifetime: f32,
    pub owner: Entity,
    pub faction: Faction,
    pub hit_count: u32,
    pub hits: HashSet<Entity>,
}

impl Projectile {
    pub fn new(heading: Vec2, owner: Entity, faction: Faction, params: ProjectileParams) -> Self {
        Self {
            heading: heading.try_normalize().unwrap_or(Vec2::X),
            remaining_lifetime: params.lifetime,
            params,
            owner,
            faction,
            hit_count: 0,
            hits: HashSet::new(),
        }
    }

    /// pierce=k → снаряд живёт до k+1 попаданий
    pub fn exhausted(&self) -> bool {
        self.hit_count > self.params.pierce
    }
}

/// Спавнит снаряд со всей физической обвязкой (sensor, collision groups)
pub fn spawn_projectile(
    commands: &mut Commands,
    origin: Vec2,
    heading: Vec2,
    owner: Entity,
    faction: Faction,
    params: ProjectileParams,
) -> Entity {
    commands
        .spawn((
            Projectile::new(heading, owner, faction, params),
            Transform::from_translation(origin.extend(0.0)),
            RigidBody::KinematicPositionBased,
            Collider::ball(params.radius),
            Sensor,
            Velocity {
                linvel: heading.try_normalize().unwrap_or(Vec2::X) * params.speed,
                angvel: 0.0,
            },
            spatial::projectile_groups(),
        ))
        .id()
}

/// Resolve: движение снарядов + swept collision за один проход.
///
/// Порядок попаданий в тике — по параметру t вдоль пути (ближние первыми),
/// tie-break по Entity ID. Стена обрезает путь: цели за ней не задеты.
pub fn integrate_projectiles(
    mut commands: Commands,
    time: Res<Time<Fixed>>,
    mut hits_out: EventWriter<HitLanded>,
    mut knockbacks: EventWriter<KnockbackEvent>,
    mut projectiles: Query<(Entity, &mut Transform, &mut Projectile)>,
    targets: Query<
        (Entity, &Transform, &Actor, &Footprint, Option<&CollisionGroups>),
        (With<Health>, Without<Dead>, Without<Projectile>),
    >,
    obstacles: Query<(&Transform, &Footprint), (With<Obstacle>, Without<Projectile>)>,
) {
    let delta = time.delta_secs();

    for (entity, mut transform, mut projectile) in projectiles.iter_mut() {
        projectile.remaining_lifetime -= delta;
        if projectile.remaining_lifetime <= 0.0 {
            if let Ok(mut entity_commands) = commands.get_entity(entity) {
                entity_commands.despawn();
            }
            continue;
        }

        let from = transform.translation.truncate();
        let to = from + projectile.heading * projectile.params.speed * delta;
        transform.translation = to.extend(transform.translation.z);

        // Стены: первая по пути обрезает отрезок
        let mut wall_t = f32::INFINITY;
        for (obstacle_transform, footprint) in obstacles.iter() {
            if !footprint.solid {
                continue;
            }
            let center = obstacle_transform.translation.truncate();
            if let Some(t) =
                spatial::swept_circle_param(from, to, projectile.params.radius, center, footprint.radius)
            {
                wall_t = wall_t.min(t);
            }
        }

        // Кандидаты-акторы до стены, отсортированные вдоль пути
        let mut candidates: Vec<(f32, Entity, Vec2)> = Vec::new();
        for (target, target_transform, actor, footprint, groups) in targets.iter() {
            if target == projectile.owner {
                continue;
            }
            if !projectile.faction.opposes(actor.faction) {
                continue; // Свои — пролетаем насквозь
            }
            if projectile.hits.contains(&target) {
                continue;
            }
            if let Some(groups) = groups {
                if !spatial::projectile_groups().filters.contains(groups.memberships) {
                    continue;
                }
            }

            let center = target_transform.translation.truncate();
            if let Some(t) =
                spatial::swept_circle_param(from, to, projectile.params.radius, center, footprint.radius)
            {
                if t <= wall_t {
                    candidates.push((t, target, center));
                }
            }
        }
        candidates.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

        for (_, target, _) in candidates {
            projectile.hits.insert(target);
            projectile.hit_count += 1;

            log(&format!(
                "🎯 Projectile {:?} hit {:?} ({} dmg)",
                entity, target, projectile.params.damage
            ));
            hits_out.write(HitLanded {
                attacker: projectile.owner,
                target,
                damage: projectile.params.damage,
            });
            knockbacks.write(KnockbackEvent {
                target,
                direction: projectile.heading,
                force: projectile.params.knockback,
            });

            if projectile.exhausted() {
                break;
            }
        }

        if projectile.exhausted() || wall_t.is_finite() {
            if let Ok(mut entity_commands) = commands.get_entity(entity) {
                entity_commands.despawn();
            }
        }
    }
}
