use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{constants::env, BlockwireError, BlockwireResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Distance a link block is moved after its document is unplugged.
    pub snap_radius: f64,
    /// How far document getter colours are shaded towards white (or black
    /// when negative), in `-1.0..=1.0`.
    pub shade_percent: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            snap_radius: 28.0,
            shade_percent: 0.5,
        }
    }
}

impl EditorConfig {
    /// Defaults overridden by `BLOCKWIRE_*` variables, a `.env` file is
    /// honoured when present.
    pub fn from_env() -> BlockwireResult<Self> {
        let mut config = Self::default();

        if let Some(snap_radius) = read_var(env::SNAP_RADIUS)? {
            config.snap_radius = snap_radius;
        }
        if let Some(shade_percent) = read_var::<f64>(env::SHADE_PERCENT)? {
            if !(-1.0..=1.0).contains(&shade_percent) {
                return Err(BlockwireError::Config {
                    key: env::SHADE_PERCENT,
                    value: shade_percent.to_string(),
                });
            }
            config.shade_percent = shade_percent;
        }

        Ok(config)
    }
}

fn read_var<T: FromStr>(key: &'static str) -> BlockwireResult<Option<T>> {
    match dotenvy::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| BlockwireError::Config { key, value }),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn config_from_env() {
        std::env::remove_var(env::SNAP_RADIUS);
        std::env::remove_var(env::SHADE_PERCENT);
        assert_eq!(EditorConfig::from_env().unwrap(), EditorConfig::default());

        std::env::set_var(env::SNAP_RADIUS, "48");
        std::env::set_var(env::SHADE_PERCENT, "-0.25");
        assert_eq!(
            EditorConfig::from_env().unwrap(),
            EditorConfig {
                snap_radius: 48.0,
                shade_percent: -0.25,
            }
        );

        std::env::set_var(env::SHADE_PERCENT, "2");
        assert!(matches!(
            EditorConfig::from_env(),
            Err(BlockwireError::Config { key, .. }) if key == env::SHADE_PERCENT
        ));

        std::env::set_var(env::SNAP_RADIUS, "wide");
        assert!(matches!(
            EditorConfig::from_env(),
            Err(BlockwireError::Config { key, .. }) if key == env::SNAP_RADIUS
        ));

        std::env::remove_var(env::SNAP_RADIUS);
        std::env::remove_var(env::SHADE_PERCENT);
    }
}
