use super::clamp_score;
use crate::config::CombineConfig;

/// Weighted blend of the two axes. Weights are used as given, only the
/// result is clamped. `None` when combining is disabled.
pub fn combine(melody: f64, tonal: f64, config: &CombineConfig) -> Option<f64> {
    if !config.enabled {
        return None;
    }
    Some(clamp_score(
        melody * config.weight_melody + tonal * config.weight_tonal,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weights(weight_melody: f64, weight_tonal: f64) -> CombineConfig {
        CombineConfig {
            enabled: true,
            weight_melody,
            weight_tonal,
        }
    }

    #[test]
    fn blends_with_weights() {
        assert_eq!(combine(80.0, 40.0, &weights(0.5, 0.5)), Some(60.0));
        assert_eq!(combine(80.0, 40.0, &weights(0.25, 0.0)), Some(20.0));
    }

    #[test]
    fn does_not_normalize_weights() {
        assert_eq!(combine(30.0, 40.0, &weights(1.0, 1.0)), Some(70.0));
        assert_eq!(combine(80.0, 90.0, &weights(1.0, 1.0)), Some(100.0));
    }

    #[test]
    fn disabled_gives_none() {
        let config = CombineConfig {
            enabled: false,
            ..CombineConfig::default()
        };
        assert_eq!(combine(80.0, 40.0, &config), None);
    }
}
