use serde::{Deserialize, Serialize};

use crate::rating::{SetCollection, SetId, SetTitles};
use crate::scoring::{ItemLimits, ScoringConfig};

/// Number of sets created when the config does not list any.
pub const DEFAULT_SET_COUNT: usize = 4;

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub scoring: ScoringConfig,

    #[serde(default)]
    pub limits: ItemLimits,

    /// Sets in display order
    #[serde(default = "default_sets")]
    pub sets: Vec<SetDefinition>,

    /// Where the rating state is kept (default: ~/.config/wine-rater/wine_ratings.json)
    #[serde(default)]
    pub state_path: Option<String>,

    /// Directory for CSV exports (default: current directory)
    #[serde(default)]
    pub export_dir: Option<String>,

    #[serde(default)]
    pub theme: ThemeConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SetDefinition {
    pub id: String,

    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ThemeConfig {
    #[default]
    Auto,
    Dark,
    Light,
}

fn default_sets() -> Vec<SetDefinition> {
    (1..=DEFAULT_SET_COUNT)
        .map(|n| SetDefinition {
            id: format!("set{}", n),
            title: Some(format!("セット{}", n)),
        })
        .collect()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scoring: ScoringConfig::default(),
            limits: ItemLimits::default(),
            sets: default_sets(),
            state_path: None,
            export_dir: None,
            theme: ThemeConfig::default(),
        }
    }
}

impl Config {
    pub fn set_ids(&self) -> impl Iterator<Item = SetId> + '_ {
        self.sets.iter().map(|def| SetId::new(def.id.as_str()))
    }

    /// Titles as configured; sets without a title show their id.
    pub fn default_titles(&self) -> SetTitles {
        self.sets
            .iter()
            .filter_map(|def| {
                def.title
                    .as_ref()
                    .map(|title| (SetId::new(def.id.as_str()), title.clone()))
            })
            .collect()
    }

    /// A blank collection laid out as configured.
    pub fn fresh_collection(&self) -> SetCollection {
        SetCollection::new(self.set_ids(), self.limits, self.scoring)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_has_four_sets() {
        let config = Config::default();
        assert_eq!(config.sets.len(), 4);
        assert_eq!(config.sets[0].id, "set1");
        assert_eq!(config.default_titles().get(&SetId::new("set4")), "セット4");
    }

    #[test]
    fn test_empty_yaml_gives_defaults() {
        let config: Config = serde_saphyr::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_full_config_parse() {
        let yaml = r#"
scoring:
  target_sum: 20
  step: 0.5
limits:
  min_items: 3
  max_items: 8
sets:
  - id: red
    title: 赤
  - id: white
state_path: /tmp/ratings.json
theme: light
"#;
        let config: Config = serde_saphyr::from_str(yaml).unwrap();
        assert_eq!(config.scoring.target_sum, 20.0);
        assert_eq!(config.limits.max_items, 8);
        assert_eq!(config.sets.len(), 2);
        assert!(config.sets[1].title.is_none());
        assert_eq!(config.theme, ThemeConfig::Light);

        let titles = config.default_titles();
        assert_eq!(titles.get(&SetId::new("red")), "赤");
        assert_eq!(titles.get(&SetId::new("white")), "white");
    }

    #[test]
    fn test_fresh_collection_follows_config() {
        let mut config = Config::default();
        config.limits.min_items = 3;
        let collection = config.fresh_collection();
        assert_eq!(collection.len(), 4);
        assert!(collection.iter().all(|set| set.len() == 3));
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let yaml = serde_saphyr::to_string(&config).unwrap();
        let parsed: Config = serde_saphyr::from_str(&yaml).unwrap();
        assert_eq!(config, parsed);
    }
}
