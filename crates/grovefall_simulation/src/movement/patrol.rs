//! Патруль по циклическому маршруту (для агентов без цели).

use bevy::prelude::*;

use crate::ai::{AgentState, AttackSequence};
use crate::combat::Dead;
use crate::components::{Facing, PhysicsBody};

/// Циклический маршрут: точка → dwell → следующая точка.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct PatrolRoute {
    pub points: Vec<Vec2>,
    pub current: usize,
    pub speed: f32,
    /// P-gain подлёта к точке
    pub gain: f32,
    pub arrival_radius: f32,
    /// Пауза на точке, секунды
    pub dwell: f32,
    pub dwell_timer: f32,
}

impl PatrolRoute {
    pub fn new(points: Vec<Vec2>) -> Self {
        Self {
            points,
            current: 0,
            speed: 2.0,
            gain: 5.0,
            arrival_radius: 0.5,
            dwell: 1.0,
            dwell_timer: 0.0,
        }
    }

    pub fn current_point(&self) -> Option<Vec2> {
        self.points.get(self.current).copied()
    }

    /// Желаемая скорость к текущей точке + обновление таймеров.
    /// Чистая tick-логика, тестируется без World.
    pub fn tick(&mut self, position: Vec2, delta: f32) -> Vec2 {
        let Some(point) = self.current_point() else {
            return Vec2::ZERO;
        };

        if self.dwell_timer > 0.0 {
            self.dwell_timer -= delta;
            if self.dwell_timer <= 0.0 && !self.points.is_empty() {
                self.current = (self.current + 1) % self.points.len();
            }
            return Vec2::ZERO;
        }

        let to_point = point - position;
        if to_point.length() <= self.arrival_radius {
            self.dwell_timer = self.dwell;
            return Vec2::ZERO;
        }

        // P-подлёт с клампом до крейсерской скорости
        (to_point * self.gain).clamp_length_max(self.speed)
    }
}

/// Steer: патруль активен только пока агент Idle (нет цели)
pub fn patrol_steering(
    time: Res<Time<Fixed>>,
    mut patrols: Query<
        (
            &mut PatrolRoute,
            &AgentState,
            &Transform,
            &mut PhysicsBody,
            Option<&mut Facing>,
        ),
        (Without<AttackSequence>, Without<Dead>),
    >,
) {
    let delta = time.delta_secs();

    for (mut route, state, transform, mut body, facing) in patrols.iter_mut() {
        if *state != AgentState::Idle {
            continue;
        }

        let position = transform.translation.truncate();
        let desired = route.tick(position, delta);
        body.velocity.x = desired.x;

        if let Some(mut facing) = facing {
            facing.face_toward(desired.x);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patrol_cycles_points() {
        let mut route = PatrolRoute::new(vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(5.0, 0.0),
        ]);
        let dt = 1.0 / 60.0;

        // Стоим на первой точке: dwell взводится
        assert_eq!(route.tick(Vec2::ZERO, dt), Vec2::ZERO);
        assert!(route.dwell_timer > 0.0);

        // Пережидаем dwell (1 сек = 60 тиков)
        for _ in 0..61 {
            route.tick(Vec2::ZERO, dt);
        }
        assert_eq!(route.current, 1);

        // Теперь едем ко второй точке
        let v = route.tick(Vec2::ZERO, dt);
        assert!(v.x > 0.0);
    }

    #[test]
    fn test_patrol_wraps_around() {
        let mut route = PatrolRoute::new(vec![Vec2::ZERO, Vec2::new(10.0, 0.0)]);
        route.current = 1;
        route.dwell_timer = 0.001;

        route.tick(Vec2::new(10.0, 0.0), 1.0 / 60.0);
        assert_eq!(route.current, 0); // Циклический
    }

    #[test]
    fn test_empty_route_is_noop() {
        let mut route = PatrolRoute::new(vec![]);
        assert_eq!(route.tick(Vec2::ZERO, 1.0 / 60.0), Vec2::ZERO);
    }

    #[test]
    fn test_cruise_speed_clamp() {
        let mut route = PatrolRoute::new(vec![Vec2::new(100.0, 0.0)]);
        let v = route.tick(Vec2::ZERO, 1.0 / 60.0);
        assert!((v.length() - route.speed).abs() < 1e-4);
    }
}
