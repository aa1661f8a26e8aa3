//! Движение: ground sensing, steering, интеграция, синк в rapier.

pub mod ground;
pub mod hover;
pub mod patrol;

pub use ground::GroundChaser;
pub use hover::HoverStriker;
pub use patrol::PatrolRoute;

use bevy::prelude::*;
use bevy_rapier2d::prelude::Velocity;

use crate::components::{Footprint, Gravity, Grounded, PhysicsBody};
use crate::spatial::GroundPlane;
use crate::SimulationSet;

pub struct MovementPlugin;

impl Plugin for MovementPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(FixedUpdate, sense_ground.in_set(SimulationSet::Sense))
            .add_systems(
                FixedUpdate,
                (
                    ground::chase_in_band,
                    hover::hover_steering,
                    patrol::patrol_steering,
                )
                    .chain()
                    .in_set(SimulationSet::Steer),
            )
            .add_systems(
                FixedUpdate,
                (apply_gravity, integrate_bodies, sync_rapier_velocity)
                    .chain()
                    .in_set(SimulationSet::Integrate),
            );
    }
}

/// Sense: ground probe против плоскости пола + coyote timer
pub fn sense_ground(
    time: Res<Time<Fixed>>,
    ground: Res<GroundPlane>,
    mut query: Query<(&Transform, &Footprint, &PhysicsBody, &mut Grounded)>,
) {
    let delta = time.delta_secs();

    for (transform, footprint, body, mut grounded) in query.iter_mut() {
        // На земле = касаемся пола и не летим вверх
        let foot_y = transform.translation.y - footprint.radius;
        let on_ground = foot_y <= ground.y + 0.05 && body.velocity.y <= 0.0;
        grounded.update(on_ground, delta);
    }
}

/// Integrate: гравитация для тел с включённой Gravity
pub fn apply_gravity(
    time: Res<Time<Fixed>>,
    mut query: Query<(&Gravity, &Grounded, &mut PhysicsBody)>,
) {
    let delta = time.delta_secs();

    for (gravity, grounded, mut body) in query.iter_mut() {
        if !gravity.enabled {
            continue;
        }

        if grounded.on_ground && body.velocity.y <= 0.0 {
            body.velocity.y = 0.0;
        } else {
            body.velocity.y += gravity.accel * delta;
        }
    }
}

/// Integrate: velocity → Transform + кламп к полу
pub fn integrate_bodies(
    time: Res<Time<Fixed>>,
    ground: Res<GroundPlane>,
    mut query: Query<(&PhysicsBody, &Footprint, &mut Transform)>,
) {
    let delta = time.delta_secs();

    for (body, footprint, mut transform) in query.iter_mut() {
        transform.translation += (body.velocity * delta).extend(0.0);

        // Сквозь пол не проваливаемся
        let min_y = ground.y + footprint.radius;
        if transform.translation.y < min_y {
            transform.translation.y = min_y;
        }
    }
}

/// Integrate: зеркалим собственную скорость в rapier Velocity
/// (физический мир используется для query, не для интеграции)
pub fn sync_rapier_velocity(mut query: Query<(&PhysicsBody, &mut Velocity)>) {
    for (body, mut velocity) in query.iter_mut() {
        velocity.linvel = body.velocity;
    }
}
