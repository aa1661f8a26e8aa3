//! Детерминизм: одинаковый seed → бит-в-бит одинаковый мир.

use bevy::prelude::*;

use grovefall_simulation::{
    create_headless_app, spawn, step_n, world_snapshot, Health, PlayerInput,
};

/// Полный сценарий: игрок под огнём, босс с полным репертуаром,
/// дрон и патрульный страж
fn build_scenario(app: &mut App) {
    let world = app.world_mut();
    let player = {
        let mut commands = world.commands();
        let player = spawn::spawn_player(&mut commands, Vec2::new(0.0, 0.5));
        spawn::spawn_boss(&mut commands, Vec2::new(10.0, 1.0));
        spawn::spawn_drone(&mut commands, Vec2::new(-6.0, 4.0));
        spawn::spawn_guard(
            &mut commands,
            Vec2::new(6.0, 0.5),
            vec![Vec2::new(4.0, 0.5), Vec2::new(8.0, 0.5)],
        );
        player
    };
    world.flush();

    let mut input = world.get_mut::<PlayerInput>(player).unwrap();
    input.fire = true;
    input.aim = Vec2::X;
}

#[test]
fn test_same_seed_same_world() {
    let mut app_a = create_headless_app(1337);
    let mut app_b = create_headless_app(1337);

    build_scenario(&mut app_a);
    build_scenario(&mut app_b);

    // 10 секунд боя: атаки выбираются случайно, лут роллится
    step_n(&mut app_a, 600);
    step_n(&mut app_b, 600);

    let transforms_a = world_snapshot::<Transform>(app_a.world_mut());
    let transforms_b = world_snapshot::<Transform>(app_b.world_mut());
    assert_eq!(transforms_a, transforms_b, "transform divergence");

    let health_a = world_snapshot::<Health>(app_a.world_mut());
    let health_b = world_snapshot::<Health>(app_b.world_mut());
    assert_eq!(health_a, health_b, "health divergence");
}

#[test]
fn test_snapshot_not_empty_after_run() {
    let mut app = create_headless_app(7);
    build_scenario(&mut app);
    step_n(&mut app, 60);

    let snapshot = world_snapshot::<Transform>(app.world_mut());
    assert!(!snapshot.is_empty());
}
