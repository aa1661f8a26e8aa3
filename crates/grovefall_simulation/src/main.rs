//! Headless демо-сценарий: игрок против босса и свиты.
//!
//! Запуск: grovefall_simulation [seed] [seconds]

use bevy::prelude::*;

use grovefall_simulation::{
    create_headless_app, log_info, spawn, step_n, AgentState, Health, Player, PlayerInput,
};

fn main() {
    let mut args = std::env::args().skip(1);
    let seed: u64 = args
        .next()
        .and_then(|s| s.parse().ok())
        .unwrap_or(42);
    let seconds: f32 = args
        .next()
        .and_then(|s| s.parse().ok())
        .unwrap_or(15.0);

    let mut app = create_headless_app(seed);
    log_info(&format!(
        "🌿 GROVEFALL headless run: seed={}, {}s",
        seed, seconds
    ));

    {
        let world = app.world_mut();
        let mut commands = world.commands();
        let player = spawn::spawn_player(&mut commands, Vec2::new(0.0, 0.5));
        spawn::spawn_boss(&mut commands, Vec2::new(10.0, 1.0));
        spawn::spawn_drone(&mut commands, Vec2::new(-6.0, 4.0));
        spawn::spawn_guard(
            &mut commands,
            Vec2::new(6.0, 0.5),
            vec![Vec2::new(4.0, 0.5), Vec2::new(8.0, 0.5)],
        );
        world.flush();

        // Игрок жмёт гашетку в сторону босса весь прогон
        let mut input = world.get_mut::<PlayerInput>(player).unwrap();
        input.fire = true;
        input.aim = Vec2::X;
    }

    let ticks = (seconds * 60.0).round() as usize;
    step_n(&mut app, ticks);

    // Итоги прогона
    let world = app.world_mut();
    let mut players = world.query_filtered::<&Health, With<Player>>();
    for health in players.iter(world) {
        log_info(&format!("🏁 Player: {}/{} HP", health.current, health.max));
    }

    let mut agents = world.query::<(Entity, &AgentState, &Health)>();
    for (entity, state, health) in agents.iter(world) {
        log_info(&format!(
            "🏁 Agent {:?}: {:?}, {}/{} HP",
            entity, state, health.current, health.max
        ));
    }
}
