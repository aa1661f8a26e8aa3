//! Применение урона, смерти, area damage.

use bevy::prelude::*;
use rand::Rng;

use crate::combat::{
    AreaDamage, DamageDealt, Dead, DespawnAfter, EntityDied, HitLanded, KnockbackEvent,
};
use crate::components::{Actor, FlashCue, Footprint, Health, Invincibility, PhysicsBody};
use crate::logger::{log, log_info};
use crate::spawn::{PrefabId, SpawnRequest};
use crate::{spatial, DeterministicRng};

/// Шанс дропа при смерти (roll через DeterministicRng)
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct LootDrop {
    pub prefab: PrefabId,
    /// 0.0..=1.0
    pub chance: f32,
}

/// Труп-prefab: спавнится на месте смерти с переносом скорости тела
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct CorpsePrefab {
    pub prefab: PrefabId,
}

/// Sense: тикаем окна неуязвимости и косметический flash
pub fn tick_invincibility(
    time: Res<Time<Fixed>>,
    mut query: Query<(&mut Invincibility, Option<&mut FlashCue>)>,
) {
    let delta = time.delta_secs();

    for (mut inv, flash) in query.iter_mut() {
        inv.tick(delta);
        if let Some(mut flash) = flash {
            flash.tick(delta);
        }
    }
}

/// Damage: применяем HitLanded прошлого тика через invincibility gate.
///
/// Несколько попаданий в одном тике по уязвимой цели: первое проходит
/// и взводит окно, остальные гасятся окном (порядок событий детерминирован).
pub fn apply_hits(
    mut hits: EventReader<HitLanded>,
    mut dealt: EventWriter<DamageDealt>,
    mut targets: Query<(
        &mut Health,
        Option<&mut Invincibility>,
        Option<&mut FlashCue>,
        Option<&Dead>,
    )>,
) {
    for hit in hits.read() {
        let Ok((mut health, invincibility, flash, dead)) = targets.get_mut(hit.target) else {
            continue; // Цель уже удалена
        };

        // Труп не бьём (no-op, не ошибка)
        if dead.is_some() {
            continue;
        }

        if let Some(mut inv) = invincibility {
            if inv.is_active() {
                log(&format!(
                    "🛡️ Hit on {:?} ignored (invincible, {:.2}s left)",
                    hit.target, inv.timer
                ));
                continue;
            }

            health.take_damage(hit.damage);
            inv.arm();
            if let Some(mut flash) = flash {
                flash.start(inv.window);
            }
        } else {
            health.take_damage(hit.damage);
        }

        log(&format!(
            "💥 {:?} hit {:?} for {} ({}/{} left)",
            hit.attacker, hit.target, hit.damage, health.current, health.max
        ));

        dealt.write(DamageDealt {
            target: hit.target,
            amount: hit.damage,
            remaining: health.current,
        });
    }
}

/// Damage: фиксация смертей.
///
/// Бежит ПОСЛЕ apply_hits в том же тике: умерший не успевает походить,
/// выстрелить или начать атаку (Decide/Sequence фильтруют по Without<Dead>).
pub fn handle_deaths(
    mut commands: Commands,
    mut died: EventWriter<EntityDied>,
    mut spawns: EventWriter<SpawnRequest>,
    mut rng: ResMut<DeterministicRng>,
    mut query: Query<
        (
            Entity,
            &Health,
            &Transform,
            Option<&mut PhysicsBody>,
            Option<&LootDrop>,
            Option<&CorpsePrefab>,
        ),
        (Changed<Health>, Without<Dead>),
    >,
) {
    for (entity, health, transform, body, loot, corpse) in query.iter_mut() {
        if health.is_alive() {
            continue;
        }

        let position = transform.translation.truncate();
        let velocity = body.as_ref().map(|b| b.velocity).unwrap_or(Vec2::ZERO);

        log_info(&format!("⚰️ {:?} died at {:?}", entity, position));
        died.write(EntityDied { entity });

        // Труп наследует скорость тела в момент смерти
        if let Some(corpse) = corpse {
            spawns.write(SpawnRequest {
                prefab: corpse.prefab,
                position,
                velocity,
            });
        }

        if let Some(loot) = loot {
            let roll: f32 = rng.rng.gen_range(0.0..1.0);
            if roll < loot.chance {
                log(&format!("🎁 Loot drop from {:?} (roll {:.2})", entity, roll));
                spawns.write(SpawnRequest {
                    prefab: loot.prefab,
                    position,
                    velocity: Vec2::ZERO,
                });
            }
        }

        if let Some(mut body) = body {
            body.velocity = Vec2::ZERO;
        }

        // Если труп спавнится отдельной entity, сам актор уходит сразу
        let linger = if corpse.is_some() { 0.0 } else { 2.0 };
        commands
            .entity(entity)
            .insert(Dead)
            .insert(DespawnAfter::new(linger));
    }
}

/// Resolve: AoE запросы → попадания по противоположной фракции.
///
/// Knockback направлен радиально от центра; цель в центре получает +X.
pub fn resolve_area_damage(
    mut areas: EventReader<AreaDamage>,
    mut hits: EventWriter<HitLanded>,
    mut knockbacks: EventWriter<KnockbackEvent>,
    targets: Query<(Entity, &Transform, &Actor, &Footprint), Without<Dead>>,
) {
    for area in areas.read() {
        for (entity, transform, actor, footprint) in targets.iter() {
            if entity == area.source {
                continue;
            }
            if !area.attacker_faction.opposes(actor.faction) {
                continue;
            }

            let target_pos = transform.translation.truncate();
            if !spatial::circles_overlap(area.center, area.radius, target_pos, footprint.radius)
            {
                continue;
            }

            hits.write(HitLanded {
                attacker: area.source,
                target: entity,
                damage: area.damage,
            });
            knockbacks.write(KnockbackEvent {
                target: entity,
                direction: target_pos - area.center,
                force: area.knockback,
            });
        }
    }
}
