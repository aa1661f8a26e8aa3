//! Наземное band-steering: держать цель в «рабочей полосе» дистанций.

use bevy::prelude::*;

use crate::ai::{Agent, AgentState, AttackSequence};
use crate::combat::Dead;
use crate::components::{Facing, PhysicsBody};

/// Наземный преследователь: подходит ближе too_far, отходит от too_close,
/// в полосе между ними — гасит горизонтальную скорость.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct GroundChaser {
    pub move_speed: f32,
    pub too_close: f32,
    pub too_far: f32,
    /// Множитель затухания velocity.x внутри полосы (за тик)
    pub damping: f32,
}

impl Default for GroundChaser {
    fn default() -> Self {
        Self {
            move_speed: 3.0,
            too_close: 4.0,
            too_far: 12.0,
            damping: 0.8,
        }
    }
}

/// Желаемая горизонтальная скорость по band-правилу (чистая функция)
pub fn band_velocity_x(dx: f32, current_x: f32, chaser: &GroundChaser) -> f32 {
    let dist = dx.abs();

    if dist > chaser.too_far {
        dx.signum() * chaser.move_speed
    } else if dist < chaser.too_close {
        -dx.signum() * chaser.move_speed
    } else {
        current_x * chaser.damping
    }
}

/// Steer: band chase для наземных агентов.
///
/// Работает только в Chasing; в Cooldown гасим скорость (стоим и «дышим»),
/// во время атаки телом владеет sequencer.
pub fn chase_in_band(
    mut chasers: Query<
        (
            &GroundChaser,
            &Agent,
            &AgentState,
            &Transform,
            &mut PhysicsBody,
            Option<&mut Facing>,
        ),
        (Without<AttackSequence>, Without<Dead>),
    >,
    positions: Query<&Transform>,
) {
    for (chaser, agent, state, transform, mut body, facing) in chasers.iter_mut() {
        match state {
            // Band-правило само разруливает отступление (dist < too_close);
            // в Cooldown агент продолжает держать дистанцию
            AgentState::Chasing | AgentState::Retreating | AgentState::Cooldown => {}
            AgentState::Idle => {
                body.velocity.x *= chaser.damping;
                continue;
            }
            _ => continue,
        }

        let Some(target) = agent.target else {
            body.velocity.x *= chaser.damping;
            continue;
        };
        let Ok(target_transform) = positions.get(target) else {
            body.velocity.x *= chaser.damping;
            continue;
        };

        let dx = target_transform.translation.x - transform.translation.x;
        body.velocity.x = band_velocity_x(dx, body.velocity.x, chaser);

        if let Some(mut facing) = facing {
            facing.face_toward(dx);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_steering() {
        let chaser = GroundChaser::default();

        // Далеко → идём к цели
        assert_eq!(band_velocity_x(20.0, 0.0, &chaser), 3.0);
        assert_eq!(band_velocity_x(-20.0, 0.0, &chaser), -3.0);

        // Слишком близко → пятимся
        assert_eq!(band_velocity_x(2.0, 0.0, &chaser), -3.0);
        assert_eq!(band_velocity_x(-2.0, 0.0, &chaser), 3.0);

        // В полосе → затухание
        let v = band_velocity_x(8.0, 3.0, &chaser);
        assert!((v - 2.4).abs() < 1e-6);
    }
}
