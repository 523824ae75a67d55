use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// One weighted input/output quality criterion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Criterion {
    pub key: String,
    pub label: String,
    pub weight: u32,
    /// What "meets the criterion" looks like; shown as helper text.
    #[serde(default)]
    pub meets: String,
}

/// One system-fit questionnaire entry. Options are ordered best → worst;
/// the recorded answer is the option index (0–3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemQuestion {
    pub id: String,
    pub label: String,
    pub options: Vec<String>,
}

/// Board configuration: scoring tables plus UI overrides. Loaded from
/// `sipoc.toml` next to the project file when present, defaults otherwise.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardConfig {
    #[serde(default = "default_criteria")]
    pub criteria: Vec<Criterion>,
    #[serde(default = "default_system_questions")]
    pub system_questions: Vec<SystemQuestion>,
    #[serde(default = "default_frequencies")]
    pub disruption_frequencies: Vec<String>,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UiConfig {
    /// Hex color overrides keyed by theme slot name (e.g. `background = "#263238"`).
    #[serde(default)]
    pub colors: HashMap<String, String>,
}

impl Default for BoardConfig {
    fn default() -> Self {
        BoardConfig {
            criteria: default_criteria(),
            system_questions: default_system_questions(),
            disruption_frequencies: default_frequencies(),
            ui: UiConfig::default(),
        }
    }
}

/// How the config load path obtained its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigOutcome {
    /// No config file at the path; defaults.
    Missing,
    /// Parsed from the file.
    Loaded,
    /// File present but not valid TOML; defaults, caller should warn.
    Malformed,
}

impl BoardConfig {
    /// Load config from a TOML file. Config problems never block startup:
    /// missing or malformed files fall back to defaults, with the outcome
    /// reported so the caller can surface a parse failure.
    pub fn load(path: &Path) -> (BoardConfig, ConfigOutcome) {
        match fs::read_to_string(path) {
            Ok(text) => match toml::from_str(&text) {
                Ok(config) => (config, ConfigOutcome::Loaded),
                Err(_) => (BoardConfig::default(), ConfigOutcome::Malformed),
            },
            Err(_) => (BoardConfig::default(), ConfigOutcome::Missing),
        }
    }

    pub fn criterion(&self, key: &str) -> Option<&Criterion> {
        self.criteria.iter().find(|c| c.key == key)
    }

    pub fn question(&self, id: &str) -> Option<&SystemQuestion> {
        self.system_questions.iter().find(|q| q.id == id)
    }

    /// Highest possible system-fit answer total (3 per question).
    pub fn system_max_points(&self) -> u32 {
        self.system_questions.len() as u32 * 3
    }
}

fn criterion(key: &str, label: &str, weight: u32, meets: &str) -> Criterion {
    Criterion {
        key: key.to_string(),
        label: label.to_string(),
        weight,
        meets: meets.to_string(),
    }
}

fn default_criteria() -> Vec<Criterion> {
    vec![
        criterion("complete", "Completeness", 5, "All required data/materials are present."),
        criterion("quality", "Data quality", 5, "Format, resolution and content are correct."),
        criterion("clarity", "Unambiguity", 3, "No interpretation or questions needed to start."),
        criterion("timeliness", "Timeliness", 3, "Available at the planned moment."),
        criterion("standard", "Standardization", 1, "Conforms to naming and protocols."),
        criterion("handover", "Handover", 1, "Status correctly updated in source systems."),
    ]
}

fn question(id: &str, label: &str, options: [&str; 4]) -> SystemQuestion {
    SystemQuestion {
        id: id.to_string(),
        label: label.to_string(),
        options: options.iter().map(|o| o.to_string()).collect(),
    }
}

fn default_system_questions() -> Vec<SystemQuestion> {
    let scale = ["(Almost) never", "Sometimes", "Often", "(Almost) always"];
    vec![
        question(
            "workarounds",
            "1. How often does the system force workarounds (spreadsheets, mail, copy/paste)?",
            scale,
        ),
        question(
            "performance",
            "2. How often does the system slow you down (sluggishness, outages, waiting)?",
            scale,
        ),
        question(
            "double",
            "3. How often must data be registered twice (retyping)?",
            scale,
        ),
        question(
            "error",
            "4. How often does the system leave room for mistakes (no validation)?",
            scale,
        ),
        question(
            "depend",
            "5. How dependent is the process on this system (risk at outage)?",
            ["Safe (fallback)", "Delay", "Major risk", "Full standstill"],
        ),
    ]
}

fn default_frequencies() -> Vec<String> {
    ["Rarely", "Sometimes", "Often", "Always"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_weights_match_scoring_table() {
        let config = BoardConfig::default();
        let weights: Vec<u32> = config.criteria.iter().map(|c| c.weight).collect();
        assert_eq!(weights, vec![5, 5, 3, 3, 1, 1]);
    }

    #[test]
    fn five_questions_three_points_each() {
        let config = BoardConfig::default();
        assert_eq!(config.system_questions.len(), 5);
        assert_eq!(config.system_max_points(), 15);
        assert!(config.system_questions.iter().all(|q| q.options.len() == 4));
    }

    #[test]
    fn load_missing_file_falls_back_to_defaults() {
        let (config, outcome) = BoardConfig::load(Path::new("/nonexistent/sipoc.toml"));
        assert_eq!(outcome, ConfigOutcome::Missing);
        assert_eq!(config.criteria.len(), 6);
    }

    #[test]
    fn load_malformed_file_reports_and_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sipoc.toml");
        fs::write(&path, "not [valid toml").unwrap();
        let (config, outcome) = BoardConfig::load(&path);
        assert_eq!(outcome, ConfigOutcome::Malformed);
        assert_eq!(config.criteria.len(), 6);
    }

    #[test]
    fn load_valid_file_reports_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sipoc.toml");
        fs::write(&path, "[ui.colors]\nbackground = \"#263238\"\n").unwrap();
        let (config, outcome) = BoardConfig::load(&path);
        assert_eq!(outcome, ConfigOutcome::Loaded);
        assert_eq!(config.ui.colors.get("background").unwrap(), "#263238");
    }

    #[test]
    fn partial_toml_keeps_defaults_for_the_rest() {
        let config: BoardConfig = toml::from_str(
            r##"
            [ui.colors]
            background = "#263238"
            "##,
        )
        .unwrap();
        assert_eq!(config.criteria.len(), 6);
        assert_eq!(config.ui.colors.get("background").unwrap(), "#263238");
    }
}
