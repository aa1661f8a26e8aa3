//! Phase sequencer: атака = линейная последовательность фаз.
//!
//! Фазовая модель вместо ad-hoc корутин: telegraph → движение → payload.
//! Вход/тик/выход фазы — явные, отмена (смерть) снимает компонент целиком
//! и восстанавливает гравитацию.

use bevy::prelude::*;

use crate::ai::agent::{AttackSpec, SlamConfig};
use crate::combat::{AreaDamage, Dashing, Dead, ProjectileParams};
use crate::combat::projectile::spawn_projectile;
use crate::components::{Actor, Gravity, Grounded, PhysicsBody};
use crate::logger::log;
use crate::ai::Agent;

/// Атака завершилась штатно (прерванные смертью — НЕ шлют)
#[derive(Event, Debug, Clone, Copy)]
pub struct AttackFinished {
    pub entity: Entity,
}

/// Вид телеграфа — host решает, как его рисовать
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum CueKind {
    Windup,
    Slam,
    Charge,
    Volley,
}

/// Cue-компонент: висит на entity, пока фаза телеграфирует
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct TelegraphCue {
    pub kind: CueKind,
}

#[derive(Debug, Clone, Copy)]
pub enum PhaseKind {
    /// Стоим на месте, показываем намерение
    Telegraph,
    /// Вертикальный подъём (гравитация выключена)
    Lift { speed: f32 },
    /// Зависание в верхней точке
    Hang,
    /// Падение до земли, на выходе AoE
    Drop {
        speed: f32,
        radius: f32,
        damage: u32,
        knockback: f32,
    },
    /// Рывок с контактным уроном (направление фиксируется на входе)
    Dash {
        speed: f32,
        damage: u32,
        knockback: f32,
    },
    /// Серия снарядов, прицел обновляется перед каждым выстрелом;
    /// без цели залп обрывается досрочно
    Volley {
        shots: u32,
        interval: f32,
        projectile: ProjectileParams,
    },
}

#[derive(Debug, Clone, Copy)]
pub struct Phase {
    pub duration: f32,
    pub cue: Option<CueKind>,
    pub kind: PhaseKind,
}

/// Активная атака. Один компонент = одна атака; удаление = отмена.
#[derive(Component, Debug, Clone)]
pub struct AttackSequence {
    pub phases: Vec<Phase>,
    pub current: usize,
    pub elapsed: f32,
    pub entered: bool,
    /// Позиция агента на момент старта атаки
    pub origin: Vec2,
    /// Направление рывка (фиксируется на входе в Dash)
    pub dash_dir: Vec2,
    pub shots_fired: u32,
    pub shot_timer: f32,
}

impl AttackSequence {
    pub fn from_spec(spec: &AttackSpec, origin: Vec2) -> Self {
        let phases = match spec {
            AttackSpec::Slam(slam) => slam_phases(slam),
            AttackSpec::Charge(charge) => vec![
                Phase {
                    duration: charge.prepare,
                    cue: Some(CueKind::Charge),
                    kind: PhaseKind::Telegraph,
                },
                Phase {
                    duration: charge.duration,
                    cue: None,
                    kind: PhaseKind::Dash {
                        speed: charge.speed,
                        damage: charge.damage,
                        knockback: charge.knockback,
                    },
                },
            ],
            AttackSpec::Volley(volley) => vec![
                Phase {
                    duration: volley.prepare,
                    cue: Some(CueKind::Volley),
                    kind: PhaseKind::Telegraph,
                },
                Phase {
                    // Запас в пол-интервала, чтобы последний выстрел успел
                    duration: volley.shots as f32 * volley.interval + volley.interval * 0.5,
                    cue: None,
                    kind: PhaseKind::Volley {
                        shots: volley.shots,
                        interval: volley.interval,
                        projectile: volley.projectile,
                    },
                },
            ],
        };

        Self {
            phases,
            current: 0,
            elapsed: 0.0,
            entered: false,
            origin,
            dash_dir: Vec2::X,
            shots_fired: 0,
            shot_timer: 0.0,
        }
    }

    pub fn finished(&self) -> bool {
        self.current >= self.phases.len()
    }
}

fn slam_phases(slam: &SlamConfig) -> Vec<Phase> {
    vec![
        Phase {
            duration: slam.prepare,
            cue: Some(CueKind::Windup),
            kind: PhaseKind::Telegraph,
        },
        Phase {
            duration: slam.rise_time,
            cue: None,
            kind: PhaseKind::Lift {
                speed: slam.rise_height / slam.rise_time.max(1e-3),
            },
        },
        Phase {
            duration: slam.hang_time,
            cue: Some(CueKind::Slam),
            kind: PhaseKind::Hang,
        },
        Phase {
            // Timeout-страховка; штатно фаза заканчивается по приземлению
            duration: 2.0,
            cue: Some(CueKind::Slam),
            kind: PhaseKind::Drop {
                speed: slam.drop_speed,
                radius: slam.radius,
                damage: slam.damage,
                knockback: slam.knockback,
            },
        },
    ]
}

/// Sequence: тик всех активных атак.
///
/// Границы фаз обрабатываются в одном тике: exit текущей + enter следующей,
/// первый tick следующей — в следующем тике.
pub fn run_sequences(
    mut commands: Commands,
    time: Res<Time<Fixed>>,
    mut finished_events: EventWriter<AttackFinished>,
    mut areas: EventWriter<AreaDamage>,
    mut sequences: Query<
        (
            Entity,
            &mut AttackSequence,
            &Agent,
            &Actor,
            &Transform,
            &mut PhysicsBody,
            Option<&mut Gravity>,
            Option<&Grounded>,
        ),
        Without<Dead>,
    >,
    positions: Query<&Transform, Without<AttackSequence>>,
) {
    let delta = time.delta_secs();

    for (entity, mut seq, agent, actor, transform, mut body, mut gravity, grounded) in
        sequences.iter_mut()
    {
        if seq.finished() {
            continue;
        }

        let position = transform.translation.truncate();
        let target_pos = agent
            .target
            .and_then(|t| positions.get(t).ok())
            .map(|t| t.translation.truncate());

        let phase = seq.phases[seq.current];

        // Enter
        if !seq.entered {
            seq.entered = true;
            seq.elapsed = 0.0;

            match phase.cue {
                Some(kind) => {
                    commands.entity(entity).insert(TelegraphCue { kind });
                }
                None => {
                    commands.entity(entity).remove::<TelegraphCue>();
                }
            }

            match phase.kind {
                PhaseKind::Telegraph => {
                    body.velocity = Vec2::ZERO;
                }
                PhaseKind::Lift { .. } | PhaseKind::Hang | PhaseKind::Drop { .. } => {
                    if let Some(gravity) = gravity.as_mut() {
                        gravity.enabled = false;
                    }
                }
                PhaseKind::Dash {
                    speed: _,
                    damage,
                    knockback,
                } => {
                    // Направление фиксируется один раз: увернуться можно
                    seq.dash_dir = target_pos
                        .map(|p| p - position)
                        .and_then(|d| d.try_normalize())
                        .unwrap_or(Vec2::X);
                    if let Some(gravity) = gravity.as_mut() {
                        gravity.enabled = false;
                    }
                    commands.entity(entity).insert(Dashing::new(damage, knockback));
                }
                PhaseKind::Volley { .. } => {
                    seq.shots_fired = 0;
                    seq.shot_timer = 0.0;
                    body.velocity = Vec2::ZERO;
                }
            }
        }

        // Tick
        seq.elapsed += delta;
        let mut phase_done = seq.elapsed >= phase.duration;

        match phase.kind {
            PhaseKind::Telegraph | PhaseKind::Hang => {
                body.velocity = Vec2::ZERO;
            }
            PhaseKind::Lift { speed } => {
                body.velocity = Vec2::new(0.0, speed);
            }
            PhaseKind::Drop { speed, .. } => {
                body.velocity = Vec2::new(0.0, -speed);
                // Приземлились — фаза кончается досрочно
                if grounded.map(|g| g.on_ground).unwrap_or(false) && seq.elapsed > delta {
                    phase_done = true;
                }
            }
            PhaseKind::Dash { speed, .. } => {
                body.velocity = seq.dash_dir * speed;
            }
            PhaseKind::Volley {
                shots,
                interval,
                projectile,
            } => {
                // Перенаведение перед каждым выстрелом; цель пропала —
                // залп обрывается, остаток серии сгорает
                if let Some(target_pos) = target_pos {
                    seq.shot_timer -= delta;
                    if seq.shot_timer <= 0.0 && seq.shots_fired < shots {
                        let heading = target_pos - position;
                        spawn_projectile(
                            &mut commands,
                            position,
                            heading,
                            entity,
                            actor.faction,
                            projectile,
                        );
                        seq.shots_fired += 1;
                        seq.shot_timer += interval;
                        log(&format!(
                            "🔫 Agent {:?} volley shot {}/{}",
                            entity, seq.shots_fired, shots
                        ));
                    }
                    if seq.shots_fired >= shots {
                        phase_done = true;
                    }
                } else {
                    phase_done = true;
                }
            }
        }

        // Exit
        if phase_done {
            match phase.kind {
                PhaseKind::Drop {
                    radius,
                    damage,
                    knockback,
                    ..
                } => {
                    let center = transform.translation.truncate();
                    log(&format!("💥 Slam impact at {:?} (r={})", center, radius));
                    areas.write(AreaDamage {
                        source: entity,
                        center,
                        radius,
                        damage,
                        knockback,
                        attacker_faction: actor.faction,
                    });
                    body.velocity = Vec2::ZERO;
                    if let Some(gravity) = gravity.as_mut() {
                        gravity.enabled = true;
                    }
                }
                PhaseKind::Dash { .. } => {
                    body.velocity = Vec2::ZERO;
                    if let Some(gravity) = gravity.as_mut() {
                        gravity.enabled = true;
                    }
                    commands.entity(entity).remove::<Dashing>();
                }
                _ => {}
            }

            seq.current += 1;
            seq.entered = false;

            if seq.finished() {
                commands.entity(entity).remove::<AttackSequence>();
                commands.entity(entity).remove::<TelegraphCue>();
                body.velocity = Vec2::ZERO;
                if let Some(gravity) = gravity.as_mut() {
                    gravity.enabled = true;
                }
                finished_events.write(AttackFinished { entity });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::agent::{ChargeConfig, VolleyConfig};

    #[test]
    fn test_slam_phase_layout() {
        let seq = AttackSequence::from_spec(
            &AttackSpec::Slam(SlamConfig::default()),
            Vec2::ZERO,
        );
        assert_eq!(seq.phases.len(), 4);
        assert!(matches!(seq.phases[0].kind, PhaseKind::Telegraph));
        assert!(matches!(seq.phases[3].kind, PhaseKind::Drop { .. }));
        assert_eq!(seq.phases[0].cue, Some(CueKind::Windup));
    }

    #[test]
    fn test_charge_has_telegraph_then_dash() {
        let seq = AttackSequence::from_spec(
            &AttackSpec::Charge(ChargeConfig::default()),
            Vec2::ZERO,
        );
        assert_eq!(seq.phases.len(), 2);
        assert!((seq.phases[0].duration - 0.6).abs() < 1e-6);
        assert!(matches!(seq.phases[1].kind, PhaseKind::Dash { speed, .. } if speed == 15.0));
    }

    #[test]
    fn test_volley_duration_covers_all_shots() {
        let seq = AttackSequence::from_spec(
            &AttackSpec::Volley(VolleyConfig::default()),
            Vec2::ZERO,
        );
        // 5 выстрелов × 0.2с + запас
        assert!(seq.phases[1].duration >= 1.0);
    }

    #[test]
    fn test_sequence_not_finished_initially() {
        let seq = AttackSequence::from_spec(
            &AttackSpec::Charge(ChargeConfig::default()),
            Vec2::ZERO,
        );
        assert!(!seq.finished());
    }
}
