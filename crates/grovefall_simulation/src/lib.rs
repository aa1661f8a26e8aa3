//! GROVEFALL Simulation Core
//!
//! Headless ECS-симуляция боя на Bevy 0.16 (2D action game).
//!
//! HYBRID ARCHITECTURE:
//! - ECS = authoritative layer (agent FSM, attack sequencing, damage/knockback)
//! - Host (рендер, input devices, audio, сцены) = внешний consumer:
//!   читает позиции/cue-флаги, пишет PlayerInput, исполняет SpawnRequest

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// Публичные модули
pub mod ai;
pub mod combat;
pub mod components;
pub mod logger;
pub mod movement;
pub mod player;
pub mod spatial;
pub mod spawn;

// Re-export базовых типов для удобства
pub use ai::{
    AIPlugin, Agent, AgentConfig, AgentState, AttackCooldown, AttackFinished, AttackSequence,
    AttackSpec, BurstFire, ChargeConfig, CueKind, Inert, SlamConfig, TelegraphCue, VolleyConfig,
};
pub use combat::{
    AreaDamage, CombatPlugin, ContactHazard, CorpsePrefab, DamageDealt, Dashing, Dead,
    DespawnAfter, EntityDied, HitLanded, KnockbackEvent, KnockbackReceiver, LootDrop,
    PendingKnockback, Pickup, Projectile, ProjectileParams,
};
pub use components::*;
pub use movement::{GroundChaser, HoverStriker, MovementPlugin, PatrolRoute};
pub use player::{Player, PlayerInput, PlayerMovement, PlayerPlugin, PlayerShooting};
pub use spawn::{PrefabId, SpawnRequest};

pub use logger::{init_logger, log, log_error, log_info, log_warning};

/// Глобальный порядок systems внутри одного simulation tick.
///
/// Контракт тика (важен для knockback/attack семантики):
/// 1. Sense — таймеры, ground detection
/// 2. Damage — применение hit/knockback событий прошлого тика, смерти
/// 3. Decide — FSM transitions + выбор атаки
/// 4. Sequence — фазы атак, burst fire, player shooting
/// 5. Steer — movement intents (пишут velocity)
/// 6. Knockback — pending override ПОБЕЖДАЕТ steering output (ровно один тик)
/// 7. Integrate — gravity + velocity → Transform
/// 8. Resolve — projectile/contact/area collision → события следующего тика
/// 9. Cleanup — отложенные despawn'ы
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    Sense,
    Damage,
    Decide,
    Sequence,
    Steer,
    Knockback,
    Integrate,
    Resolve,
    Cleanup,
}

/// Главный plugin симуляции (объединяет все подсистемы)
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app
            // Fixed timestep 60Hz для simulation tick (легче считать интервалы)
            .insert_resource(Time::<Fixed>::from_hz(60.0))
            // Детерминистичный RNG (seed по умолчанию)
            .insert_resource(DeterministicRng::new(42))
            .insert_resource(spatial::GroundPlane::default())
            .configure_sets(
                FixedUpdate,
                (
                    SimulationSet::Sense,
                    SimulationSet::Damage,
                    SimulationSet::Decide,
                    SimulationSet::Sequence,
                    SimulationSet::Steer,
                    SimulationSet::Knockback,
                    SimulationSet::Integrate,
                    SimulationSet::Resolve,
                    SimulationSet::Cleanup,
                )
                    .chain(),
            )
            .add_event::<SpawnRequest>()
            .add_systems(
                FixedUpdate,
                spawn::process_spawn_requests.in_set(SimulationSet::Cleanup),
            )
            // Подсистемы
            .add_plugins((CombatPlugin, AIPlugin, MovementPlugin, PlayerPlugin));
    }
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Создаёт minimal Bevy App для headless симуляции
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .add_plugins(SimulationPlugin)
        // Seed поверх дефолтного из SimulationPlugin
        .insert_resource(DeterministicRng::new(seed));

    app
}

/// Продвигает симуляцию ровно на один fixed tick.
///
/// Явная точка входа `step(dt)`: нет скрытого frame clock — тесты и host
/// сами владеют циклом. dt = timestep из Time<Fixed> (60Hz по умолчанию).
pub fn step(app: &mut App) {
    let timestep = app.world().resource::<Time<Fixed>>().timestep();
    app.world_mut()
        .resource_mut::<Time<Fixed>>()
        .advance_by(timestep);
    app.world_mut().run_schedule(FixedUpdate);
    rotate_events(app.world_mut());
}

/// Ротация event-буферов в конце тика: First-расписание у нас не бегает,
/// поэтому штатная уборка событий не случается и буферы растут вечно.
///
/// Двойная буферизация Events сохраняет контракт латентности: событие,
/// записанное в Resolve тика N, живёт весь тик N+1 и читается в Damage.
fn rotate_events(world: &mut World) {
    fn rotate<E: Event>(world: &mut World) {
        if let Some(mut events) = world.get_resource_mut::<Events<E>>() {
            events.update();
        }
    }

    rotate::<HitLanded>(world);
    rotate::<DamageDealt>(world);
    rotate::<KnockbackEvent>(world);
    rotate::<AreaDamage>(world);
    rotate::<EntityDied>(world);
    rotate::<AttackFinished>(world);
    rotate::<SpawnRequest>(world);
}

/// Прогоняет `n` тиков подряд (удобно в тестах: n = секунды × 60)
pub fn step_n(app: &mut App, n: usize) {
    for _ in 0..n {
        step(app);
    }
}

/// Snapshot мира для сравнения детерминизма
/// (упрощённая версия: Debug-сериализация, отсортированная по Entity ID)
pub fn world_snapshot<T: Component>(world: &mut World) -> Vec<u8>
where
    T: std::fmt::Debug,
{
    let mut snapshot = Vec::new();

    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();

    // Сортируем по Entity ID для детерминизма
    entities.sort_by_key(|(entity, _)| entity.index());

    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}
