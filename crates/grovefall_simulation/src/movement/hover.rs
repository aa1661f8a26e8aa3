//! Hover steering: летающий страйкер держит высоту и дистанционные зоны.

use bevy::prelude::*;

use crate::ai::{Agent, AgentState, AttackSequence};
use crate::combat::Dead;
use crate::components::{Facing, PhysicsBody};

/// Летающий страйкер с тремя зонами по горизонтали:
/// дальше far_range — сближается, ближе close_range — отлетает,
/// между ними — кружит вокруг цели (тангенциальный дрейф + радиальная
/// поправка к середине полосы). Вертикаль — P-регулятор к высоте
/// desired_height над целью.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct HoverStriker {
    pub move_speed: f32,
    pub desired_height: f32,
    pub far_range: f32,
    pub close_range: f32,
    /// Коэффициент P-регулятора высоты
    pub hover_gain: f32,
    pub damping: f32,
    /// Кламп итоговой скорости: move_speed × factor
    pub max_speed_factor: f32,
    /// Доля move_speed на тангенциальный дрейф в средней полосе
    pub orbit_factor: f32,
}

impl Default for HoverStriker {
    fn default() -> Self {
        Self {
            move_speed: 3.0,
            desired_height: 3.0,
            far_range: 10.0,
            close_range: 4.0,
            hover_gain: 5.0,
            damping: 0.95,
            max_speed_factor: 1.5,
            orbit_factor: 0.75,
        }
    }
}

/// Желаемая скорость hover-страйкера (чистая функция).
///
/// `to_target` — вектор от страйкера к цели.
pub fn desired_hover_velocity(to_target: Vec2, striker: &HoverStriker) -> Vec2 {
    let dx = to_target.x;
    let dist = dx.abs();

    // Высота: регулятор к точке desired_height над целью
    let height_error = to_target.y + striker.desired_height;
    let vy = (height_error * striker.hover_gain).clamp(-striker.move_speed, striker.move_speed);

    if dist > striker.far_range {
        return Vec2::new(dx.signum() * striker.move_speed, vy);
    }
    if dist < striker.close_range {
        return Vec2::new(-dx.signum() * striker.move_speed, vy);
    }

    // Средняя полоса: орбита вокруг цели — тангенциальный дрейф плюс
    // радиальная поправка к середине полосы
    let dir = to_target.try_normalize().unwrap_or(Vec2::X);
    let tangent = dir.perp() * striker.move_speed * striker.orbit_factor;
    let band_mid = (striker.close_range + striker.far_range) * 0.5;
    let radial = dir
        * ((dist - band_mid) * striker.hover_gain).clamp(-striker.move_speed, striker.move_speed);
    let orbit = tangent + radial;

    Vec2::new(
        orbit.x,
        (orbit.y + vy).clamp(-striker.move_speed, striker.move_speed),
    )
}

/// Пружинный шаг к желаемой скорости: `v += (desired - v) * gain * dt`,
/// затем damping и кламп. Без damping'а регулятор раскачивается.
pub fn spring_step(current: Vec2, desired: Vec2, striker: &HoverStriker, delta: f32) -> Vec2 {
    let accelerated = current + (desired - current) * (striker.hover_gain * delta).min(1.0);
    let damped = accelerated * striker.damping;
    damped.clamp_length_max(striker.move_speed * striker.max_speed_factor)
}

/// Steer: hover для летающих агентов (гравитация у них выключена)
pub fn hover_steering(
    time: Res<Time<Fixed>>,
    mut strikers: Query<
        (
            &HoverStriker,
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
    let delta = time.delta_secs();

    for (striker, agent, state, transform, mut body, facing) in strikers.iter_mut() {
        match state {
            AgentState::Chasing | AgentState::Retreating | AgentState::Cooldown => {}
            AgentState::Idle => {
                // Без цели просто висим
                body.velocity *= striker.damping;
                continue;
            }
            _ => continue,
        }

        let Some(target) = agent.target else {
            body.velocity *= striker.damping;
            continue;
        };
        let Ok(target_transform) = positions.get(target) else {
            body.velocity *= striker.damping;
            continue;
        };

        let to_target =
            (target_transform.translation - transform.translation).truncate();
        let desired = desired_hover_velocity(to_target, striker);
        body.velocity = spring_step(body.velocity, desired, striker, delta);

        if let Some(mut facing) = facing {
            facing.face_toward(to_target.x);
        }
    }
}
