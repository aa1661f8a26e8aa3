//! AI: FSM агентов, phase sequencer атак, burst fire.

pub mod agent;
pub mod guard;
pub mod sequencer;

pub use agent::{
    Agent, AgentConfig, AgentState, AttackCooldown, AttackSpec, ChargeConfig, Inert, SlamConfig,
    VolleyConfig,
};
pub use guard::BurstFire;
pub use sequencer::{AttackFinished, AttackSequence, CueKind, Phase, PhaseKind, TelegraphCue};

use bevy::prelude::*;

use crate::SimulationSet;

pub struct AIPlugin;

impl Plugin for AIPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<AttackFinished>()
            .add_systems(
                FixedUpdate,
                (
                    agent::retire_dead_agents,
                    agent::finish_attacks,
                    agent::validate_agents,
                    agent::acquire_targets,
                    agent::fsm_transitions,
                    agent::start_attacks,
                )
                    .chain()
                    .in_set(SimulationSet::Decide),
            )
            .add_systems(
                FixedUpdate,
                (sequencer::run_sequences, guard::burst_fire)
                    .chain()
                    .in_set(SimulationSet::Sequence),
            );
    }
}
