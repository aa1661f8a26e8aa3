//! Префабы и SpawnRequest: единственная точка сборки entity.
//!
//! Системы никогда не собирают entity по месту — они шлют SpawnRequest,
//! а каталог здесь знает полный состав компонентов каждого префаба.

use bevy::prelude::*;
use bevy_rapier2d::prelude::{Collider, RigidBody, Sensor, Velocity};

use crate::ai::{
    Agent, AgentConfig, AgentState, AttackCooldown, AttackSpec, BurstFire, ChargeConfig,
    SlamConfig, VolleyConfig,
};
use crate::combat::{CorpsePrefab, DespawnAfter, KnockbackReceiver, LootDrop, Pickup};
use crate::components::{
    Actor, Facing, FlashCue, Footprint, Gravity, Grounded, Health, Invincibility, Obstacle,
    PhysicsBody,
};
use crate::movement::{GroundChaser, HoverStriker, PatrolRoute};
use crate::player::{Player, PlayerInput, PlayerMovement, PlayerShooting};
use crate::spatial;

/// Идентификатор префаба (данные для SpawnRequest и loot-таблиц)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum PrefabId {
    Player,
    Bramblelord,
    ThornDrone,
    GroveGuard,
    Wall,
    Corpse,
    HealPickup,
}

/// Запрос на спавн (пишут системы, исполняет process_spawn_requests)
#[derive(Event, Debug, Clone, Copy)]
pub struct SpawnRequest {
    pub prefab: PrefabId,
    pub position: Vec2,
    pub velocity: Vec2,
}

/// Cleanup: исполнение накопленных SpawnRequest
pub fn process_spawn_requests(mut commands: Commands, mut requests: EventReader<SpawnRequest>) {
    for request in requests.read() {
        match request.prefab {
            PrefabId::Player => {
                spawn_player(&mut commands, request.position);
            }
            PrefabId::Bramblelord => {
                spawn_boss(&mut commands, request.position);
            }
            PrefabId::ThornDrone => {
                spawn_drone(&mut commands, request.position);
            }
            PrefabId::GroveGuard => {
                spawn_guard(&mut commands, request.position, Vec::new());
            }
            PrefabId::Wall => {
                spawn_wall(&mut commands, request.position, 0.5);
            }
            PrefabId::Corpse => {
                spawn_corpse(&mut commands, request.position, request.velocity);
            }
            PrefabId::HealPickup => {
                spawn_heal_pickup(&mut commands, request.position);
            }
        }
    }
}

pub fn spawn_player(commands: &mut Commands, position: Vec2) -> Entity {
    commands
        .spawn((
            (
                Player,
                PlayerInput::default(),
                PlayerMovement::default(),
                PlayerShooting::default(),
            ),
            (
                Actor::player(),
                Health::new(100),
                Invincibility::default(),
                FlashCue::default(),
                Footprint::actor(0.5),
                Facing::default(),
                KnockbackReceiver::default(),
            ),
            (
                PhysicsBody::default(),
                Gravity::default(),
                Grounded::default(),
                Transform::from_translation(position.extend(0.0)),
            ),
            (
                RigidBody::KinematicPositionBased,
                Collider::ball(0.5),
                Velocity::zero(),
                spatial::actor_groups(),
            ),
        ))
        .id()
}

/// Босс: наземный band-chaser с репертуаром slam/charge/volley
pub fn spawn_boss(commands: &mut Commands, position: Vec2) -> Entity {
    commands
        .spawn((
            (
                Actor::enemy(),
                Health::new(500),
                Invincibility::default(),
                FlashCue::default(),
                Footprint::actor(1.0),
                Facing::default(),
                // Тяжёлый: knockback почти не сдвигает
                KnockbackReceiver {
                    resistance: 0.2,
                    air_down_bias: 0.0,
                },
            ),
            (
                Agent::default(),
                AgentState::Idle,
                AgentConfig {
                    detection_range: 20.0,
                    attack_range: 8.0,
                    attack_cooldown: 3.0,
                    retreat_distance: 2.0,
                    attacks: vec![
                        AttackSpec::Slam(SlamConfig::default()),
                        AttackSpec::Charge(ChargeConfig::default()),
                        AttackSpec::Volley(VolleyConfig::default()),
                    ],
                },
                AttackCooldown::default(),
                GroundChaser::default(),
                LootDrop {
                    prefab: PrefabId::HealPickup,
                    chance: 1.0,
                },
                CorpsePrefab {
                    prefab: PrefabId::Corpse,
                },
            ),
            (
                PhysicsBody::with_mass(5.0),
                Gravity::default(),
                Grounded::default(),
                Transform::from_translation(position.extend(0.0)),
            ),
            (
                RigidBody::KinematicPositionBased,
                Collider::ball(1.0),
                Velocity::zero(),
                spatial::actor_groups(),
            ),
        ))
        .id()
}

/// Дрон: hover striker, одиночные выстрелы с перезарядкой
pub fn spawn_drone(commands: &mut Commands, position: Vec2) -> Entity {
    commands
        .spawn((
            (
                Actor::enemy(),
                Health::new(30),
                Invincibility::default(),
                FlashCue::default(),
                Footprint::actor(0.4),
                Facing::default(),
                KnockbackReceiver::default(),
            ),
            (
                Agent::default(),
                AgentState::Idle,
                AgentConfig {
                    detection_range: 15.0,
                    attacks: Vec::new(), // Стреляет через BurstFire
                    ..Default::default()
                },
                HoverStriker::default(),
                BurstFire {
                    shots_per_burst: 1,
                    shot_interval: 0.1,
                    cooldown: 1.5,
                    range: 12.0,
                    ..Default::default()
                },
                LootDrop {
                    prefab: PrefabId::HealPickup,
                    chance: 0.5,
                },
                CorpsePrefab {
                    prefab: PrefabId::Corpse,
                },
            ),
            (
                PhysicsBody::default(),
                // Летает: вертикаль держит hover-регулятор
                Gravity {
                    enabled: false,
                    ..Default::default()
                },
                Grounded::default(),
                Transform::from_translation(position.extend(0.0)),
            ),
            (
                RigidBody::KinematicPositionBased,
                Collider::ball(0.4),
                Velocity::zero(),
                spatial::actor_groups(),
            ),
        ))
        .id()
}

/// Страж: патрулирует маршрут; заметив цель, встаёт в рабочую полосу
/// и бьёт сериями по три
pub fn spawn_guard(commands: &mut Commands, position: Vec2, patrol: Vec<Vec2>) -> Entity {
    commands
        .spawn((
            (
                Actor::enemy(),
                Health::new(50),
                Invincibility::default(),
                FlashCue::default(),
                Footprint::actor(0.5),
                Facing::default(),
                KnockbackReceiver::default(),
            ),
            (
                Agent::default(),
                AgentState::Idle,
                AgentConfig {
                    detection_range: 12.0,
                    attacks: Vec::new(),
                    ..Default::default()
                },
                BurstFire::default(),
                PatrolRoute::new(patrol),
                // Вне Idle телом владеет band-steering: патрульная
                // скорость не должна переживать встречу с целью
                GroundChaser {
                    move_speed: 4.0,
                    too_close: 3.0,
                    too_far: 6.0,
                    damping: 0.8,
                },
                LootDrop {
                    prefab: PrefabId::HealPickup,
                    chance: 0.25,
                },
                CorpsePrefab {
                    prefab: PrefabId::Corpse,
                },
            ),
            (
                PhysicsBody::default(),
                Gravity::default(),
                Grounded::default(),
                Transform::from_translation(position.extend(0.0)),
            ),
            (
                RigidBody::KinematicPositionBased,
                Collider::ball(0.5),
                Velocity::zero(),
                spatial::actor_groups(),
            ),
        ))
        .id()
}

pub fn spawn_wall(commands: &mut Commands, position: Vec2, radius: f32) -> Entity {
    commands
        .spawn((
            Obstacle,
            Footprint::obstacle(radius),
            Transform::from_translation(position.extend(0.0)),
            RigidBody::Fixed,
            Collider::ball(radius),
            spatial::obstacle_groups(),
        ))
        .id()
}

/// Труп: чисто косметическое тело, наследует скорость и падает
pub fn spawn_corpse(commands: &mut Commands, position: Vec2, velocity: Vec2) -> Entity {
    commands
        .spawn((
            Footprint::actor(0.5),
            PhysicsBody {
                velocity,
                mass: 1.0,
            },
            Gravity::default(),
            Grounded::default(),
            Transform::from_translation(position.extend(0.0)),
            DespawnAfter::new(3.0),
        ))
        .id()
}

pub fn spawn_heal_pickup(commands: &mut Commands, position: Vec2) -> Entity {
    commands
        .spawn((
            Pickup { heal: 20 },
            Footprint::actor(0.3),
            PhysicsBody::default(),
            Gravity::default(),
            Grounded::default(),
            Transform::from_translation(position.extend(0.0)),
            RigidBody::KinematicPositionBased,
            Collider::ball(0.3),
            Sensor,
            spatial::pickup_groups(),
        ))
        .id()
}
