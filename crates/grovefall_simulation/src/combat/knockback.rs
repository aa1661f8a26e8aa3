//! Knockback: события → импульс или one-tick velocity override.
//!
//! Capability model:
//! - KnockbackReceiver + PhysicsBody → PendingKnockback (полный override)
//! - только PhysicsBody → прямой импульс (impulse / mass)
//! - ни того ни другого → событие игнорируется (турели, стены)

use bevy::prelude::*;

use crate::combat::KnockbackEvent;
use crate::components::{Grounded, PhysicsBody};
use crate::logger::log;

/// Получатель knockback'а с тюнингом реакции
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct KnockbackReceiver {
    /// Множитель силы (0 = иммунитет, 1 = как есть, >1 = "лёгкий")
    pub resistance: f32,
    /// Дополнительная прижимающая скорость вниз, если цель в воздухе
    pub air_down_bias: f32,
}

impl Default for KnockbackReceiver {
    fn default() -> Self {
        Self {
            resistance: 1.0,
            air_down_bias: 5.0,
        }
    }
}

/// Velocity override на РОВНО один тик: применяется в Knockback set
/// (после Steer), затем снимается. Steering в этом тике проигрывает.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct PendingKnockback {
    pub velocity: Vec2,
}

/// Damage: превращаем события в PendingKnockback / прямой импульс
pub fn apply_knockback_events(
    mut commands: Commands,
    mut events: EventReader<KnockbackEvent>,
    mut targets: Query<(
        Option<&KnockbackReceiver>,
        Option<&mut PhysicsBody>,
        Option<&Grounded>,
    )>,
) {
    for event in events.read() {
        let Ok((receiver, body, grounded)) = targets.get_mut(event.target) else {
            continue;
        };

        // Нулевое направление → fallback +X (детерминированный, не random)
        let direction = event.direction.try_normalize().unwrap_or(Vec2::X);

        match (receiver, body) {
            (Some(receiver), Some(_body)) => {
                let mut velocity = direction * event.force * receiver.resistance;

                let airborne = grounded.map(|g| !g.is_grounded()).unwrap_or(false);
                if airborne {
                    velocity.y -= receiver.air_down_bias;
                }

                log(&format!(
                    "💨 Knockback {:?}: v={:?} (force {:.1})",
                    event.target, velocity, event.force
                ));
                commands
                    .entity(event.target)
                    .insert(PendingKnockback { velocity });
            }
            (None, Some(mut body)) => {
                // Без receiver'а — аддитивный импульс через массу
                let mass = body.mass;
                body.velocity += direction * event.force / mass;
            }
            _ => {} // Нет тела — knockback не к чему применять
        }
    }
}

/// Knockback set: override скорости и снятие компонента в том же тике
pub fn apply_pending_knockback(
    mut commands: Commands,
    mut query: Query<(Entity, &PendingKnockback, &mut PhysicsBody)>,
) {
    for (entity, pending, mut body) in query.iter_mut() {
        body.velocity = pending.velocity;
        commands.entity(entity).remove::<PendingKnockback>();
    }
}
