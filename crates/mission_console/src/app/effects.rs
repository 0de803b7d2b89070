use mission_core::EffectSink;
use tracing::{info, warn};

const DEFAULT_ALERT_DURATION_MS: u64 = 3_000;

/// Logs every cosmetic effect and keeps the alert deadline on the
/// simulation's virtual clock.
#[derive(Debug, Default)]
pub(crate) struct LogEffects {
    now_ms: f64,
    alert_until_ms: Option<f64>,
    unlocked: Vec<String>,
}

impl LogEffects {
    pub(crate) fn set_now_ms(&mut self, now_ms: f64) {
        self.now_ms = now_ms;
    }

    /// True exactly once, on the first call after the alert window closes.
    pub(crate) fn take_alert_expired(&mut self) -> bool {
        match self.alert_until_ms {
            Some(until) if self.now_ms >= until => {
                self.alert_until_ms = None;
                info!("alert_cleared");
                true
            }
            _ => false,
        }
    }

    pub(crate) fn unlocked(&self) -> &[String] {
        &self.unlocked
    }
}

impl EffectSink for LogEffects {
    fn play_effect(&mut self, id: &str) {
        info!(id, "sound_played");
    }

    fn unlock(&mut self, id: &str) {
        if self.unlocked.iter().any(|existing| existing == id) {
            return;
        }
        self.unlocked.push(id.to_string());
        info!(id, total = self.unlocked.len(), "achievement_unlocked");
    }

    fn trigger_alert(&mut self, duration_ms: Option<u64>) {
        let duration_ms = duration_ms.unwrap_or(DEFAULT_ALERT_DURATION_MS);
        self.alert_until_ms = Some(self.now_ms + duration_ms as f64);
        warn!(duration_ms, "alert_triggered");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alert_expires_on_virtual_clock() {
        let mut effects = LogEffects::default();
        effects.set_now_ms(1_000.0);
        effects.trigger_alert(Some(500));

        effects.set_now_ms(1_499.0);
        assert!(!effects.take_alert_expired());
        effects.set_now_ms(1_500.0);
        assert!(effects.take_alert_expired());
        assert!(!effects.take_alert_expired());
    }

    #[test]
    fn missing_duration_uses_default() {
        let mut effects = LogEffects::default();
        effects.trigger_alert(None);
        effects.set_now_ms(DEFAULT_ALERT_DURATION_MS as f64);
        assert!(effects.take_alert_expired());
    }

    #[test]
    fn achievements_unlock_once() {
        let mut effects = LogEffects::default();
        effects.unlock("scanner");
        effects.unlock("scanner");
        effects.unlock("root_access");
        assert_eq!(effects.unlocked(), ["scanner", "root_access"]);
    }
}
