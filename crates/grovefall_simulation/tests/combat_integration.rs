//! Интеграционные бои: полный tick-цикл через step().

use bevy::prelude::*;

use grovefall_simulation::combat::projectile::spawn_projectile;
use grovefall_simulation::{
    create_headless_app, step, step_n, Actor, Agent, AgentConfig, AgentState, AttackCooldown,
    AttackSpec, BurstFire, ChargeConfig, CorpsePrefab, Facing, Faction, Footprint, Gravity,
    Grounded, Health, HitLanded, Invincibility, KnockbackEvent, KnockbackReceiver, LootDrop,
    PhysicsBody, Pickup, PrefabId, Projectile, ProjectileParams, SlamConfig, VolleyConfig,
};

fn spawn_test_player(world: &mut World, position: Vec2) -> Entity {
    world
        .spawn((
            Actor::player(),
            Health::new(100),
            Invincibility::default(),
            Footprint::actor(0.5),
            KnockbackReceiver::default(),
            PhysicsBody::default(),
            Gravity::default(),
            Grounded::default(),
            Transform::from_translation(position.extend(0.0)),
        ))
        .id()
}

fn spawn_test_agent(world: &mut World, position: Vec2, config: AgentConfig) -> Entity {
    world
        .spawn((
            (
                Actor::enemy(),
                Health::new(500),
                Footprint::actor(1.0),
                Facing::default(),
            ),
            (
                Agent::default(),
                AgentState::Idle,
                config,
                AttackCooldown::default(),
            ),
            (
                PhysicsBody::default(),
                Gravity::default(),
                Grounded::default(),
                Transform::from_translation(position.extend(0.0)),
            ),
        ))
        .id()
}

fn count_projectiles(world: &mut World) -> usize {
    world.query::<&Projectile>().iter(world).count()
}

#[test]
fn test_volley_fires_on_schedule() {
    let mut app = create_headless_app(1);
    let world = app.world_mut();

    spawn_test_player(world, Vec2::new(40.0, 0.5));
    let agent = spawn_test_agent(
        world,
        Vec2::new(0.0, 1.0),
        AgentConfig {
            detection_range: 50.0,
            attack_range: 50.0,
            attacks: vec![AttackSpec::Volley(VolleyConfig::default())],
            ..Default::default()
        },
    );

    // Telegraph 0.5с, затем 5 выстрелов с шагом 0.2с.
    // Проверяем счётчик между ожидаемыми моментами выстрелов.
    step_n(&mut app, 38);
    assert_eq!(count_projectiles(app.world_mut()), 1);

    step_n(&mut app, 12);
    assert_eq!(count_projectiles(app.world_mut()), 2);

    step_n(&mut app, 12);
    assert_eq!(count_projectiles(app.world_mut()), 3);

    step_n(&mut app, 12);
    assert_eq!(count_projectiles(app.world_mut()), 4);

    step_n(&mut app, 12);
    assert_eq!(count_projectiles(app.world_mut()), 5);

    // После последнего выстрела атака завершена → Cooldown
    step_n(&mut app, 6);
    let state = app.world().get::<AgentState>(agent).unwrap();
    assert_eq!(*state, AgentState::Cooldown);
}

#[test]
fn test_volley_aborts_when_target_lost() {
    let mut app = create_headless_app(1);
    let world = app.world_mut();

    let player = spawn_test_player(world, Vec2::new(40.0, 0.5));
    let agent = spawn_test_agent(
        world,
        Vec2::new(0.0, 1.0),
        AgentConfig {
            detection_range: 50.0,
            attack_range: 50.0,
            attacks: vec![AttackSpec::Volley(VolleyConfig::default())],
            ..Default::default()
        },
    );

    // Два выстрела из пяти уже сделаны
    step_n(&mut app, 50);
    assert_eq!(count_projectiles(app.world_mut()), 2);

    // Цель исчезает посреди залпа
    app.world_mut().despawn(player);
    step_n(&mut app, 10);

    // Остаток серии сгорел: атака завершена, новых снарядов нет
    assert_eq!(count_projectiles(app.world_mut()), 2);
    let state = app.world().get::<AgentState>(agent).unwrap();
    assert_eq!(*state, AgentState::Cooldown);
}

#[test]
fn test_charge_covers_expected_distance() {
    let mut app = create_headless_app(1);
    let world = app.world_mut();

    spawn_test_player(world, Vec2::new(20.0, 0.5));
    let agent = spawn_test_agent(
        world,
        Vec2::new(0.0, 1.0),
        AgentConfig {
            detection_range: 50.0,
            attack_range: 50.0,
            attacks: vec![AttackSpec::Charge(ChargeConfig::default())],
            ..Default::default()
        },
    );

    // Telegraph 0.6с (~36 тиков со старта атаки), затем рывок 15 u/s.
    // Через ~0.5с рывка пройдено ~7.5.
    step_n(&mut app, 68);
    let x = app.world().get::<Transform>(agent).unwrap().translation.x;
    assert!(
        (6.5..=8.5).contains(&x),
        "expected mid-dash position ~7.5, got {}",
        x
    );

    // Полный рывок 1.0с → ~15 юнитов, затем остановка и Cooldown
    step_n(&mut app, 40);
    let x = app.world().get::<Transform>(agent).unwrap().translation.x;
    assert!(
        (14.0..=16.0).contains(&x),
        "expected full dash distance ~15, got {}",
        x
    );

    let state = app.world().get::<AgentState>(agent).unwrap();
    assert_eq!(*state, AgentState::Cooldown);

    let body = app.world().get::<PhysicsBody>(agent).unwrap();
    assert_eq!(body.velocity, Vec2::ZERO);
}

#[test]
fn test_slam_damages_and_knocks_back() {
    let mut app = create_headless_app(1);
    let world = app.world_mut();

    let player = spawn_test_player(world, Vec2::new(2.5, 0.5));
    spawn_test_agent(
        world,
        Vec2::new(0.0, 1.0),
        AgentConfig {
            detection_range: 20.0,
            attack_range: 8.0,
            attacks: vec![AttackSpec::Slam(SlamConfig::default())],
            ..Default::default()
        },
    );

    // Полный цикл slam'а: telegraph + подъём + зависание + падение + AoE
    step_n(&mut app, 120);

    let health = app.world().get::<Health>(player).unwrap();
    assert_eq!(health.current, 50); // 100 - 50 от slam'а

    // Радиальный knockback оттолкнул игрока от эпицентра
    let x = app.world().get::<Transform>(player).unwrap().translation.x;
    assert!(x > 2.6, "expected player pushed right, got x={}", x);
}

#[test]
fn test_charge_hits_target_in_path() {
    let mut app = create_headless_app(1);
    let world = app.world_mut();

    let player = spawn_test_player(world, Vec2::new(5.0, 0.5));
    spawn_test_agent(
        world,
        Vec2::new(0.0, 1.0),
        AgentConfig {
            detection_range: 50.0,
            attack_range: 50.0,
            attacks: vec![AttackSpec::Charge(ChargeConfig::default())],
            ..Default::default()
        },
    );

    // Рывок проходит сквозь игрока: контактный урон один раз за рывок
    step_n(&mut app, 120);

    let health = app.world().get::<Health>(player).unwrap();
    assert_eq!(health.current, 25); // 100 - 75
}

#[test]
fn test_contact_hazard_rehits_after_window() {
    let mut app = create_headless_app(1);
    let world = app.world_mut();

    // Без отбрасывания, чтобы цель не выталкивало из зоны
    world.spawn((
        grovefall_simulation::ContactHazard::new(15, 0.0, Faction::Enemy),
        Footprint::actor(0.5),
        Transform::from_xyz(0.0, 0.5, 0.0),
    ));
    let player = spawn_test_player(world, Vec2::new(0.3, 0.5));

    step_n(&mut app, 30);

    // Урон тикает с периодом окна неуязвимости, не каждый тик
    let health = app.world().get::<Health>(player).unwrap();
    assert!(
        (40..=70).contains(&health.current),
        "expected windowed damage, got {}",
        health.current
    );
}

#[test]
fn test_invincibility_window_gates_damage() {
    let mut app = create_headless_app(1);
    let world = app.world_mut();

    let attacker = world.spawn_empty().id();
    let target = spawn_test_player(world, Vec2::new(0.0, 0.5));

    app.world_mut().send_event(HitLanded {
        attacker,
        target,
        damage: 30,
    });
    step(&mut app);
    assert_eq!(app.world().get::<Health>(target).unwrap().current, 70);

    // Окно 0.2с активно: повторный удар глотается
    app.world_mut().send_event(HitLanded {
        attacker,
        target,
        damage: 30,
    });
    step(&mut app);
    assert_eq!(app.world().get::<Health>(target).unwrap().current, 70);

    // Пережидаем окно и бьём снова
    step_n(&mut app, 12);
    app.world_mut().send_event(HitLanded {
        attacker,
        target,
        damage: 30,
    });
    step(&mut app);
    assert_eq!(app.world().get::<Health>(target).unwrap().current, 40);
}

#[test]
fn test_projectile_pierce_hits_two_targets() {
    let mut app = create_headless_app(1);
    let world = app.world_mut();

    let targets: Vec<Entity> = [2.0_f32, 4.0, 6.0]
        .iter()
        .map(|x| {
            world
                .spawn((
                    Actor::enemy(),
                    Health::new(30),
                    Footprint::actor(0.5),
                    Transform::from_xyz(*x, 0.5, 0.0),
                ))
                .id()
        })
        .collect();

    let owner = world.spawn_empty().id();
    {
        let mut commands = world.commands();
        spawn_projectile(
            &mut commands,
            Vec2::new(0.0, 0.5),
            Vec2::X,
            owner,
            Faction::Player,
            ProjectileParams {
                pierce: 1,
                ..Default::default()
            },
        );
    }
    world.flush();

    step_n(&mut app, 20);

    // pierce=1 → две первые цели по ходу, третья не задета
    let world = app.world();
    assert_eq!(world.get::<Health>(targets[0]).unwrap().current, 20);
    assert_eq!(world.get::<Health>(targets[1]).unwrap().current, 20);
    assert_eq!(world.get::<Health>(targets[2]).unwrap().current, 30);

    assert_eq!(count_projectiles(app.world_mut()), 0);
}

#[test]
fn test_wall_blocks_projectile() {
    let mut app = create_headless_app(1);
    let world = app.world_mut();

    let victim = world
        .spawn((
            Actor::enemy(),
            Health::new(30),
            Footprint::actor(0.5),
            Transform::from_xyz(6.0, 0.5, 0.0),
        ))
        .id();

    let owner = world.spawn_empty().id();
    {
        let mut commands = world.commands();
        grovefall_simulation::spawn::spawn_wall(&mut commands, Vec2::new(3.0, 0.5), 0.5);
        spawn_projectile(
            &mut commands,
            Vec2::new(0.0, 0.5),
            Vec2::X,
            owner,
            Faction::Player,
            ProjectileParams::default(),
        );
    }
    world.flush();

    step_n(&mut app, 30);

    // Стена съела снаряд, цель за ней не пострадала
    assert_eq!(app.world().get::<Health>(victim).unwrap().current, 30);
    assert_eq!(count_projectiles(app.world_mut()), 0);
}

#[test]
fn test_direct_impulse_divides_by_mass() {
    let mut app = create_headless_app(1);
    let world = app.world_mut();

    // Тело без KnockbackReceiver получает прямой импульс через массу
    let barrel = world
        .spawn((
            PhysicsBody::with_mass(2.0),
            Transform::from_xyz(0.0, 0.5, 0.0),
        ))
        .id();

    app.world_mut().send_event(KnockbackEvent {
        target: barrel,
        direction: Vec2::X,
        force: 10.0,
    });
    step(&mut app);

    let body = app.world().get::<PhysicsBody>(barrel).unwrap();
    assert!(
        (body.velocity.x - 5.0).abs() < 1e-4,
        "expected force/mass impulse, got {:?}",
        body.velocity
    );
}

#[test]
fn test_burst_holds_fire_while_retreating() {
    let mut app = create_headless_app(1);
    let world = app.world_mut();

    let player = spawn_test_player(world, Vec2::new(1.0, 0.5));
    let guard = world
        .spawn((
            (
                Actor::enemy(),
                Health::new(50),
                Footprint::actor(0.5),
                Facing::default(),
            ),
            (
                Agent::default(),
                AgentState::Retreating,
                AgentConfig {
                    detection_range: 12.0,
                    attacks: Vec::new(),
                    ..Default::default()
                },
                BurstFire::default(),
            ),
            (
                PhysicsBody::default(),
                Gravity::default(),
                Grounded::default(),
                Transform::from_xyz(0.0, 0.5, 0.0),
            ),
        ))
        .id();

    // Игрок прилипает к стражу: дистанция всегда меньше retreat_distance
    for _ in 0..120 {
        let guard_pos = app.world().get::<Transform>(guard).unwrap().translation;
        app.world_mut().get_mut::<Transform>(player).unwrap().translation =
            guard_pos + Vec3::new(1.0, 0.0, 0.0);
        step(&mut app);
    }

    // Отступление вытесняет стрельбу: ни одного выстрела за 2 секунды
    assert_eq!(
        *app.world().get::<AgentState>(guard).unwrap(),
        AgentState::Retreating
    );
    assert_eq!(count_projectiles(app.world_mut()), 0);
}

#[test]
fn test_guard_holds_band_when_engaged() {
    let mut app = create_headless_app(1);
    let world = app.world_mut();

    // Цель-статуя: без тела knockback её не сдвинет
    let target = world
        .spawn((
            Actor::player(),
            Health::new(1000),
            Invincibility::default(),
            Footprint::actor(0.5),
            Transform::from_xyz(20.0, 0.5, 0.0),
        ))
        .id();

    let guard = {
        let mut commands = world.commands();
        grovefall_simulation::spawn::spawn_guard(
            &mut commands,
            Vec2::new(48.5, 0.5),
            vec![Vec2::new(30.0, 0.5), Vec2::new(50.0, 0.5)],
        )
    };
    world.flush();

    // Секунда патруля влево: страж набрал крейсерскую скорость
    step_n(&mut app, 60);
    let drifting = app.world().get::<PhysicsBody>(guard).unwrap().velocity.x;
    assert!(drifting < 0.0, "expected patrol motion, got {}", drifting);

    // Цель появляется прямо по курсу
    let guard_x = app.world().get::<Transform>(guard).unwrap().translation.x;
    app.world_mut().get_mut::<Transform>(target).unwrap().translation =
        Vec3::new(guard_x - 3.5, 0.5, 0.0);

    step_n(&mut app, 360);

    // Страж не проезжает сквозь цель на патрульной скорости:
    // встаёт в рабочую полосу и держит дистанцию
    let guard_x = app.world().get::<Transform>(guard).unwrap().translation.x;
    let target_x = app.world().get::<Transform>(target).unwrap().translation.x;
    assert!(
        guard_x > target_x,
        "guard coasted past its target: guard {} target {}",
        guard_x,
        target_x
    );
    let dist = guard_x - target_x;
    assert!(
        (2.0..=8.0).contains(&dist),
        "expected band-holding distance, got {}",
        dist
    );
    assert_ne!(
        *app.world().get::<AgentState>(guard).unwrap(),
        AgentState::Idle
    );
}

#[test]
fn test_event_buffers_stay_bounded() {
    let mut app = create_headless_app(1);
    let world = app.world_mut();

    // Постоянный поток попаданий: hazard пишет HitLanded каждый тик
    world.spawn((
        grovefall_simulation::ContactHazard::new(1, 0.0, Faction::Enemy),
        Footprint::actor(0.5),
        Transform::from_xyz(0.0, 0.5, 0.0),
    ));
    spawn_test_player(world, Vec2::new(0.3, 0.5));

    step_n(&mut app, 300);

    // Буферы ротируются в step(): события не копятся бесконечно
    let events = app.world().resource::<Events<HitLanded>>();
    assert!(events.len() < 8, "event buffers grew to {}", events.len());
}

#[test]
fn test_death_spawns_corpse_and_loot() {
    let mut app = create_headless_app(1);
    let world = app.world_mut();

    let attacker = world.spawn_empty().id();
    let victim = world
        .spawn((
            Actor::enemy(),
            Health::new(30),
            Footprint::actor(0.5),
            PhysicsBody {
                velocity: Vec2::new(4.0, 0.0),
                mass: 1.0,
            },
            Transform::from_xyz(5.0, 0.5, 0.0),
            LootDrop {
                prefab: PrefabId::HealPickup,
                chance: 1.0, // Гарантированный дроп
            },
            CorpsePrefab {
                prefab: PrefabId::Corpse,
            },
        ))
        .id();

    app.world_mut().send_event(HitLanded {
        attacker,
        target: victim,
        damage: 99,
    });
    step_n(&mut app, 3);

    let world = app.world_mut();
    assert!(world.get_entity(victim).is_err(), "victim should be gone");

    let pickups = world.query::<&Pickup>().iter(world).count();
    assert_eq!(pickups, 1);

    // Труп существует и унаследовал скорость
    let corpse_velocities: Vec<Vec2> = world
        .query::<(&PhysicsBody, &grovefall_simulation::DespawnAfter)>()
        .iter(world)
        .map(|(body, _)| body.velocity)
        .collect();
    assert!(corpse_velocities.iter().any(|v| v.x > 3.0));
}
