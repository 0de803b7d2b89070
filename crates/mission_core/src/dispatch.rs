//! Routes terminal actions to the map camera, the vehicle simulation, or the
//! host's cosmetic effect sinks.

use tracing::debug;

use crate::action::Action;
use crate::uxv::UxvSimulation;
use crate::viewport::{FlyToRequest, MapViewport};

/// Audio, achievement and alert collaborators owned by the host.
pub trait EffectSink {
    fn play_effect(&mut self, id: &str);

    fn unlock(&mut self, id: &str);

    fn trigger_alert(&mut self, duration_ms: Option<u64>);
}

/// Sink that ignores every effect; for headless runs and tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopEffects;

impl EffectSink for NoopEffects {
    fn play_effect(&mut self, _id: &str) {}

    fn unlock(&mut self, _id: &str) {}

    fn trigger_alert(&mut self, _duration_ms: Option<u64>) {}
}

pub struct ActionDispatcher<'a> {
    sim: &'a mut UxvSimulation,
    viewport: &'a mut dyn MapViewport,
    effects: &'a mut dyn EffectSink,
}

impl<'a> ActionDispatcher<'a> {
    pub fn new(
        sim: &'a mut UxvSimulation,
        viewport: &'a mut dyn MapViewport,
        effects: &'a mut dyn EffectSink,
    ) -> Self {
        Self {
            sim,
            viewport,
            effects,
        }
    }

    pub fn apply_all(&mut self, actions: impl IntoIterator<Item = Action>) {
        for action in actions {
            self.apply(action);
        }
    }

    pub fn apply(&mut self, action: Action) {
        debug!(action = action.kind(), "action_dispatched");
        match action {
            Action::FlyTo {
                center,
                zoom,
                duration_ms,
            } => self.viewport.fly_to(FlyToRequest {
                center,
                zoom,
                duration_ms,
            }),
            Action::Zoom { zoom, duration_ms } => self.viewport.zoom_to(zoom, duration_ms),
            Action::StartUxv { position } => {
                let spawn = position.unwrap_or_else(|| self.viewport.center());
                self.sim.start(spawn);
            }
            Action::StopUxv => self.sim.stop(),
            Action::UxvGoto { target } => self.sim.set_target(target),
            Action::UxvSpeed { meters_per_second } => self.sim.set_speed(meters_per_second),
            Action::UxvDrop => {
                self.sim.drop_payload();
            }
            Action::UxvReturn => self.sim.return_to_base(),
            Action::UxvFollow { enabled } => self.sim.set_follow_camera(enabled),
            Action::UxvWeapon { weapon } => self.sim.set_weapon_type(weapon),
            Action::UxvPatrol { mode } => self.sim.set_patrol_mode(mode),
            Action::UxvAltitude { meters } => self.sim.set_altitude(meters),
            Action::UxvCharge { active } => {
                if active {
                    self.sim.start_charging();
                } else {
                    self.sim.stop_charging();
                }
            }
            Action::UxvFire { target } => {
                let state = self.sim.state();
                let aim = target.or(state.target()).or(state.position());
                let power = state.weapon().charge_power();
                if let Some(aim) = aim {
                    self.sim.fire_laser(aim, power);
                }
            }
            Action::UxvTrail { max_length } => self.sim.set_max_trail_length(max_length),
            Action::PlaySound { id } => self.effects.play_effect(&id),
            Action::UnlockAchievement { id } => self.effects.unlock(&id),
            Action::TriggerAlert { duration_ms } => self.effects.trigger_alert(duration_ms),
        }
    }
}
