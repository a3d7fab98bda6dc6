//! Host-issued commands applied between ticks.

use tracing::debug;

use crate::config::EcosystemConfig;
use crate::population::log_spawn;
use crate::world::{EcosystemWorld, WorldError};
use crate::PursuerId;

/// Commands a host can queue against a running world.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlCommand {
    /// Freeze a pursuer for its configured still duration.
    StillPursuer(PursuerId),
    /// Put a pursuer into its ritual pose.
    BeginRitual(PursuerId),
    /// Spawn one follower through the population manager.
    SpawnFollower,
    /// Spawn one sign through the population manager.
    SpawnSign,
    /// Replace the configuration wholesale.
    UpdateConfig(Box<EcosystemConfig>),
}

/// Apply `command` to `world`. Commands naming an entity that no longer
/// exists, or spawns refused by a cap, are logged and otherwise ignored;
/// only a configuration that fails validation is an error.
pub fn apply_control_command(
    world: &mut EcosystemWorld,
    command: ControlCommand,
) -> Result<(), WorldError> {
    match command {
        ControlCommand::StillPursuer(id) => {
            let applied = world.pursuer_mut(id).is_some_and(|p| p.enter_still());
            debug!(pursuer = ?id, applied, "still command");
        }
        ControlCommand::BeginRitual(id) => {
            let applied = world.pursuer_mut(id).is_some_and(|p| p.begin_ritual());
            debug!(pursuer = ?id, applied, "ritual command");
        }
        ControlCommand::SpawnFollower => {
            log_spawn(world.spawn_follower(), "follower");
        }
        ControlCommand::SpawnSign => {
            log_spawn(world.spawn_sign(), "sign");
        }
        ControlCommand::UpdateConfig(config) => world.update_config(*config)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PopulationConfig;
    use crate::pursuer::PursuerState;
    use crate::Position;

    fn empty_world() -> EcosystemWorld {
        EcosystemWorld::new(EcosystemConfig {
            rng_seed: Some(3),
            initial_pursuer_count: 0,
            population: PopulationConfig {
                initial_follower_count: 0,
                initial_sign_count: 0,
                max_follower_count: 1,
                ..PopulationConfig::default()
            },
            ..EcosystemConfig::default()
        })
        .expect("world")
    }

    #[test]
    fn still_and_ritual_reach_the_pursuer() {
        let mut world = empty_world();
        let id = world.spawn_pursuer_at(Position::default());
        apply_control_command(&mut world, ControlCommand::StillPursuer(id)).expect("still");
        assert_eq!(world.pursuer(id).expect("pursuer").state(), PursuerState::Still);
        apply_control_command(&mut world, ControlCommand::BeginRitual(id)).expect("ritual");
        assert_eq!(world.pursuer(id).expect("pursuer").state(), PursuerState::Ritual);
    }

    #[test]
    fn commands_for_missing_pursuers_are_ignored() {
        let mut world = empty_world();
        let id = world.spawn_pursuer_at(Position::default());
        let mut other = empty_world();
        assert!(apply_control_command(&mut other, ControlCommand::StillPursuer(id)).is_ok());
    }

    #[test]
    fn spawn_commands_respect_caps() {
        let mut world = empty_world();
        apply_control_command(&mut world, ControlCommand::SpawnFollower).expect("first");
        apply_control_command(&mut world, ControlCommand::SpawnFollower).expect("capped");
        assert_eq!(world.population().follower_count(), 1);
        apply_control_command(&mut world, ControlCommand::SpawnSign).expect("sign");
        assert_eq!(world.population().sign_count(), 1);
    }

    #[test]
    fn invalid_config_updates_are_refused() {
        let mut world = empty_world();
        let mut config = world.config().clone();
        config.follower.move_speed = -1.0;
        let command = ControlCommand::UpdateConfig(Box::new(config));
        let result = apply_control_command(&mut world, command);
        assert!(matches!(result, Err(WorldError::InvalidConfig(_))));
        assert_eq!(world.config().follower.move_speed, 8.0);
    }
}
