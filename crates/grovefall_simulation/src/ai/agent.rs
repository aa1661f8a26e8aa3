//! Agent FSM: targeting, переходы состояний, выбор атаки.

use bevy::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::ai::sequencer::AttackSequence;
use crate::combat::{Dashing, Dead};
use crate::components::{Actor, Gravity, PhysicsBody};
use crate::logger::{log, log_warning};
use crate::combat::ProjectileParams;
use crate::DeterministicRng;

/// Состояние агента. Переходы — только в Decide, один шаг за тик.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub enum AgentState {
    Idle,
    Chasing,
    Retreating,
    Attacking,
    Cooldown,
    Dead,
}

/// AI-агент: текущая цель (захватывается в Decide)
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Agent {
    pub target: Option<Entity>,
}

impl Default for Agent {
    fn default() -> Self {
        Self { target: None }
    }
}

/// Тюнинг FSM агента
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct AgentConfig {
    pub detection_range: f32,
    /// Дистанция, с которой можно начинать атаку
    pub attack_range: f32,
    /// Пауза после завершённой атаки
    pub attack_cooldown: f32,
    /// Ближе этой дистанции — отступаем
    pub retreat_distance: f32,
    /// Репертуар. Пуст — агент не атакует (например, burst-турель)
    pub attacks: Vec<AttackSpec>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            detection_range: 15.0,
            attack_range: 8.0,
            attack_cooldown: 3.0,
            retreat_distance: 2.0,
            attacks: Vec::new(),
        }
    }
}

/// Таймер паузы между атаками
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct AttackCooldown {
    pub timer: f32,
}

impl AttackCooldown {
    pub fn ready(&self) -> bool {
        self.timer <= 0.0
    }
}

/// Агент с невыполнимой конфигурацией: исключён из FSM, но жив
/// (его можно убить, он просто ничего не делает)
#[derive(Component, Debug, Default, Reflect)]
#[reflect(Component)]
pub struct Inert;

/// Атака из репертуара агента
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Reflect)]
pub enum AttackSpec {
    Slam(SlamConfig),
    Charge(ChargeConfig),
    Volley(VolleyConfig),
}

/// Прыжок вверх → зависание → удар о землю с AoE
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Reflect)]
pub struct SlamConfig {
    pub prepare: f32,
    pub rise_height: f32,
    pub rise_time: f32,
    pub hang_time: f32,
    pub drop_speed: f32,
    pub radius: f32,
    pub damage: u32,
    pub knockback: f32,
}

impl Default for SlamConfig {
    fn default() -> Self {
        Self {
            prepare: 0.75,
            rise_height: 2.0,
            rise_time: 0.4,
            hang_time: 0.3,
            drop_speed: 25.0,
            radius: 3.0,
            damage: 50,
            knockback: 10.0,
        }
    }
}

/// Рывок по прямой, контактный урон всему на пути
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Reflect)]
pub struct ChargeConfig {
    pub prepare: f32,
    pub speed: f32,
    pub duration: f32,
    pub damage: u32,
    pub knockback: f32,
}

impl Default for ChargeConfig {
    fn default() -> Self {
        Self {
            prepare: 0.6,
            speed: 15.0,
            duration: 1.0,
            damage: 75,
            knockback: 12.0,
        }
    }
}

/// Серия снарядов с перенаведением на каждый выстрел
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Reflect)]
pub struct VolleyConfig {
    pub prepare: f32,
    pub shots: u32,
    pub interval: f32,
    pub projectile: ProjectileParams,
}

impl Default for VolleyConfig {
    fn default() -> Self {
        Self {
            prepare: 0.5,
            shots: 5,
            interval: 0.2,
            projectile: ProjectileParams::default(),
        }
    }
}

impl AttackSpec {
    /// Конфигурация заведомо бессмысленна (атака не выстрелит/не сдвинет)
    pub fn is_degenerate(&self) -> bool {
        match self {
            AttackSpec::Slam(slam) => slam.radius <= 0.0,
            AttackSpec::Charge(charge) => charge.speed <= 0.0 || charge.duration <= 0.0,
            AttackSpec::Volley(volley) => volley.shots == 0 || volley.interval <= 0.0,
        }
    }
}

/// Decide: валидация свежих агентов.
///
/// Нет тела — агент Inert (warn, не panic). Дегенеративные атаки — warn,
/// агент работает с тем, что осталось осмысленного.
pub fn validate_agents(
    mut commands: Commands,
    query: Query<(Entity, &AgentConfig, Option<&PhysicsBody>), Added<Agent>>,
) {
    for (entity, config, body) in query.iter() {
        if body.is_none() {
            log_warning(&format!(
                "⚠️ Agent {:?} has no physics body, marking inert",
                entity
            ));
            commands.entity(entity).insert(Inert);
            continue;
        }

        if config.retreat_distance >= config.attack_range {
            log_warning(&format!(
                "⚠️ Agent {:?}: retreat_distance {} >= attack_range {}, agent will mostly back off",
                entity, config.retreat_distance, config.attack_range
            ));
        }

        for (i, attack) in config.attacks.iter().enumerate() {
            if attack.is_degenerate() {
                log_warning(&format!(
                    "⚠️ Agent {:?}: attack #{} is degenerate and will be skipped",
                    entity, i
                ));
            }
        }
    }
}

/// Decide: агенты со свежим Dead выходят из FSM.
///
/// Снимаем активную атаку и возвращаем телу гравитацию (смерть в воздухе
/// посреди slam'а не должна оставить труп висеть).
pub fn retire_dead_agents(
    mut commands: Commands,
    mut query: Query<(Entity, &mut AgentState, Option<&mut Gravity>), (With<Agent>, Added<Dead>)>,
) {
    for (entity, mut state, gravity) in query.iter_mut() {
        *state = AgentState::Dead;
        commands
            .entity(entity)
            .remove::<AttackSequence>()
            .remove::<Dashing>()
            .remove::<crate::ai::sequencer::TelegraphCue>();

        if let Some(mut gravity) = gravity {
            gravity.enabled = true;
        }
    }
}

/// Decide: захват цели — ближайший живой актор противоположной фракции
/// в detection_range. Tie-break по Entity ID для детерминизма.
pub fn acquire_targets(
    mut agents: Query<
        (Entity, &mut Agent, &AgentConfig, &Actor, &Transform),
        (Without<Dead>, Without<Inert>),
    >,
    candidates: Query<(Entity, &Actor, &Transform), (Without<Dead>, Without<Agent>)>,
) {
    for (agent_entity, mut agent, config, actor, transform) in agents.iter_mut() {
        let position = transform.translation.truncate();

        // Текущая цель мертва/удалена → сброс
        if let Some(target) = agent.target {
            if candidates.get(target).is_err() {
                agent.target = None;
            }
        }

        let mut best: Option<(f32, Entity)> = None;
        for (candidate, candidate_actor, candidate_transform) in candidates.iter() {
            if candidate == agent_entity || !actor.faction.opposes(candidate_actor.faction) {
                continue;
            }

            let dist = position.distance(candidate_transform.translation.truncate());
            if dist > config.detection_range {
                continue;
            }

            let better = match best {
                None => true,
                Some((best_dist, best_entity)) => {
                    dist < best_dist || (dist == best_dist && candidate < best_entity)
                }
            };
            if better {
                best = Some((dist, candidate));
            }
        }

        agent.target = best.map(|(_, entity)| entity);
    }
}

/// Decide: переходы FSM (вне активной атаки)
pub fn fsm_transitions(
    time: Res<Time<Fixed>>,
    mut agents: Query<
        (
            Entity,
            &mut AgentState,
            &Agent,
            &AgentConfig,
            &Transform,
            Option<&mut AttackCooldown>,
        ),
        (Without<Dead>, Without<Inert>, Without<AttackSequence>),
    >,
    positions: Query<&Transform, Without<Agent>>,
) {
    let delta = time.delta_secs();

    for (entity, mut state, agent, config, transform, cooldown) in agents.iter_mut() {
        let target_pos = agent
            .target
            .and_then(|t| positions.get(t).ok())
            .map(|t| t.translation.truncate());
        let dist = target_pos.map(|p| p.distance(transform.translation.truncate()));

        let cooldown_ready = match cooldown {
            Some(mut cd) => {
                if cd.timer > 0.0 {
                    cd.timer = (cd.timer - delta).max(0.0);
                }
                cd.ready()
            }
            None => true,
        };

        let next = match *state {
            AgentState::Idle => match dist {
                Some(_) => Some(AgentState::Chasing),
                None => None,
            },
            AgentState::Chasing => match dist {
                None => Some(AgentState::Idle),
                Some(d) if d < config.retreat_distance => Some(AgentState::Retreating),
                Some(d)
                    if d <= config.attack_range
                        && cooldown_ready
                        && config.attacks.iter().any(|a| !a.is_degenerate()) =>
                {
                    Some(AgentState::Attacking)
                }
                _ => None,
            },
            AgentState::Retreating => match dist {
                None => Some(AgentState::Idle),
                Some(d) if d >= config.retreat_distance => Some(AgentState::Chasing),
                _ => None,
            },
            // Attacking без AttackSequence = атака только что выбрана
            // или завершилась; finish_attacks/start_attacks разрулят
            AgentState::Attacking => None,
            AgentState::Cooldown => {
                if cooldown_ready {
                    Some(match dist {
                        Some(_) => AgentState::Chasing,
                        None => AgentState::Idle,
                    })
                } else {
                    None
                }
            }
            AgentState::Dead => None,
        };

        if let Some(next) = next {
            log(&format!("🧠 Agent {:?}: {:?} → {:?}", entity, *state, next));
            *state = next;
        }
    }
}

/// Decide: штатно завершённые атаки переводят агента в Cooldown
pub fn finish_attacks(
    mut commands: Commands,
    mut finished: EventReader<crate::ai::sequencer::AttackFinished>,
    mut agents: Query<
        (&mut AgentState, &AgentConfig, Option<&mut AttackCooldown>),
        (Without<Dead>, Without<Inert>),
    >,
) {
    for event in finished.read() {
        let Ok((mut state, config, cooldown)) = agents.get_mut(event.entity) else {
            continue;
        };

        *state = AgentState::Cooldown;
        match cooldown {
            Some(mut cd) => cd.timer = config.attack_cooldown,
            None => {
                commands.entity(event.entity).insert(AttackCooldown {
                    timer: config.attack_cooldown,
                });
            }
        }
    }
}

/// Decide: агент в Attacking без активной последовательности получает её.
/// Выбор — равномерный по недегенеративным атакам через seeded RNG.
pub fn start_attacks(
    mut commands: Commands,
    mut rng: ResMut<DeterministicRng>,
    mut agents: Query<
        (Entity, &mut AgentState, &AgentConfig, &Transform),
        (
            Without<Dead>,
            Without<Inert>,
            Without<AttackSequence>,
        ),
    >,
) {
    for (entity, mut state, config, transform) in agents.iter_mut() {
        if *state != AgentState::Attacking {
            continue;
        }

        let viable: Vec<&AttackSpec> =
            config.attacks.iter().filter(|a| !a.is_degenerate()).collect();
        if viable.is_empty() {
            *state = AgentState::Cooldown;
            continue;
        }

        let pick = rng.rng.gen_range(0..viable.len());
        let spec = viable[pick];
        log(&format!("⚔️ Agent {:?} starts {:?}", entity, spec));

        commands.entity(entity).insert(AttackSequence::from_spec(
            spec,
            transform.translation.truncate(),
        ));
    }
}
