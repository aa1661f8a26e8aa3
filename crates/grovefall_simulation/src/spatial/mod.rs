//! Пространственные запросы и collision layers.
//!
//! Rapier используется как словарь (Group/CollisionGroups для layer-масок),
//! сами overlap-тесты — чистые функции над кругами: их легко тестировать
//! и они детерминистичны по построению.

use bevy::prelude::*;
use bevy_rapier2d::prelude::{CollisionGroups, Group};

/// Layer: живые акторы (игрок, враги)
pub const ACTOR_GROUP: Group = Group::GROUP_1;
/// Layer: снаряды
pub const PROJECTILE_GROUP: Group = Group::GROUP_2;
/// Layer: статичная геометрия
pub const OBSTACLE_GROUP: Group = Group::GROUP_3;
/// Layer: pickups (хил и т.п.)
pub const PICKUP_GROUP: Group = Group::GROUP_4;

/// Membership/filter для акторов: сталкиваются с геометрией и снарядами
pub fn actor_groups() -> CollisionGroups {
    CollisionGroups::new(ACTOR_GROUP, OBSTACLE_GROUP | PROJECTILE_GROUP | PICKUP_GROUP)
}

/// Снаряды видят акторов и стены, но не друг друга
pub fn projectile_groups() -> CollisionGroups {
    CollisionGroups::new(PROJECTILE_GROUP, ACTOR_GROUP | OBSTACLE_GROUP)
}

pub fn obstacle_groups() -> CollisionGroups {
    CollisionGroups::new(OBSTACLE_GROUP, Group::ALL)
}

pub fn pickup_groups() -> CollisionGroups {
    CollisionGroups::new(PICKUP_GROUP, ACTOR_GROUP)
}

/// Уровень земли (y-координата пола). Ground probe сравнивает с ним.
#[derive(Resource, Debug, Clone, Copy)]
pub struct GroundPlane {
    pub y: f32,
}

impl Default for GroundPlane {
    fn default() -> Self {
        Self { y: 0.0 }
    }
}

/// Пересечение двух кругов (center + radius)
pub fn circles_overlap(a_center: Vec2, a_radius: f32, b_center: Vec2, b_radius: f32) -> bool {
    let r = a_radius + b_radius;
    a_center.distance_squared(b_center) <= r * r
}

/// Точка внутри круга
pub fn point_in_circle(point: Vec2, center: Vec2, radius: f32) -> bool {
    point.distance_squared(center) <= radius * radius
}

/// Swept-circle тест: двигался ли круг radius из `from` в `to` через круг цели.
///
/// Снаряды на 30 units/sec при 60Hz проходят 0.5 units за тик — без sweep
/// тонкие цели «туннелируются». Возвращает параметр t ∈ [0, 1] ближайшей
/// точки отрезка к цели (для упорядочивания множественных попаданий).
pub fn swept_circle_param(
    from: Vec2,
    to: Vec2,
    radius: f32,
    target_center: Vec2,
    target_radius: f32,
) -> Option<f32> {
    let hit_radius = radius + target_radius;
    let seg = to - from;
    let seg_len_sq = seg.length_squared();

    if seg_len_sq < 1e-12 {
        return point_in_circle(target_center, from, hit_radius).then_some(0.0);
    }

    // Ближайшая точка отрезка [from, to] к центру цели
    let t = ((target_center - from).dot(seg) / seg_len_sq).clamp(0.0, 1.0);
    let closest = from + seg * t;

    point_in_circle(target_center, closest, hit_radius).then_some(t)
}

pub fn swept_circle_hits(
    from: Vec2,
    to: Vec2,
    radius: f32,
    target_center: Vec2,
    target_radius: f32,
) -> bool {
    swept_circle_param(from, to, radius, target_center, target_radius).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circles_overlap() {
        assert!(circles_overlap(Vec2::ZERO, 1.0, Vec2::new(1.5, 0.0), 1.0));
        assert!(!circles_overlap(Vec2::ZERO, 1.0, Vec2::new(3.0, 0.0), 1.0));
        // Касание засчитывается
        assert!(circles_overlap(Vec2::ZERO, 1.0, Vec2::new(2.0, 0.0), 1.0));
    }

    #[test]
    fn test_swept_circle_catches_tunneling() {
        // Снаряд пролетает сквозь цель за один тик: дискретный тест мимо,
        // sweep ловит
        let from = Vec2::new(-1.0, 0.0);
        let to = Vec2::new(1.0, 0.0);
        let target = Vec2::new(0.0, 0.1);

        assert!(!point_in_circle(target, from, 0.3));
        assert!(!point_in_circle(target, to, 0.3));
        assert!(swept_circle_hits(from, to, 0.1, target, 0.2));
    }

    #[test]
    fn test_swept_circle_miss() {
        let from = Vec2::new(-1.0, 2.0);
        let to = Vec2::new(1.0, 2.0);
        assert!(!swept_circle_hits(from, to, 0.1, Vec2::ZERO, 0.5));
    }

    #[test]
    fn test_group_masks() {
        // Снаряды не фильтруют друг друга
        let p = projectile_groups();
        assert!(!p.filters.contains(PROJECTILE_GROUP));
        assert!(p.filters.contains(ACTOR_GROUP));
        assert!(p.filters.contains(OBSTACLE_GROUP));
    }
}
