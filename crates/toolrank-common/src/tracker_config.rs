//! Tracker configuration.
//!
//! Describes what a refresh run tracks: which tools, grouped into which
//! categories, over which months and region, and how the two signals are
//! weighted. Users can define it via YAML/JSON/TOML; the pipeline receives
//! it as an immutable value and never reads configuration from anywhere else.

use std::collections::BTreeMap;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::category::Category;
use crate::error::{Result, ToolrankError};
use crate::month::MonthKey;
use crate::table::ToolName;

/// History key under which encyclopedia pageviews are persisted.
pub const PAGEVIEWS_HISTORY_KEY: &str = "history_wiki";

/// Complete tracker configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Search-interest region code ("" = worldwide)
    #[serde(default = "default_region")]
    pub region: String,

    /// First month to fetch
    #[serde(default = "default_start")]
    pub start: MonthKey,

    /// Last month to fetch (None = current month)
    #[serde(default)]
    pub end: Option<MonthKey>,

    /// Fetch encyclopedia pageviews as the second signal
    #[serde(default = "default_true")]
    pub use_pageviews: bool,

    /// Competing tool groups, in display order
    #[serde(default = "default_categories")]
    pub categories: Vec<Category>,

    /// Tool → encyclopedia document title overrides
    #[serde(default = "default_documents")]
    pub documents: BTreeMap<ToolName, String>,

    /// Signal weights
    #[serde(default)]
    pub scoring: ScoringConfig,

    /// Leaderboard and rank-history view options
    #[serde(default)]
    pub view: ViewConfig,
}

fn default_region() -> String { "US".to_string() }
fn default_start() -> MonthKey { MonthKey::new(2022, 1).unwrap_or_else(MonthKey::current) }
fn default_true() -> bool { true }

fn default_categories() -> Vec<Category> {
    vec![
        Category::new("1. Productivity", ["ChatGPT", "Microsoft Copilot", "Google Gemini", "Notion AI", "Grammarly"]),
        Category::new("2. Marketing", ["Jasper", "Copy.ai", "Anyword", "HubSpot AI", "Grammarly Business"]),
        Category::new("3. Design & Media", ["Canva", "Midjourney", "Adobe Firefly", "Runway", "DALL·E"]),
        Category::new("4. Development", ["GitHub Copilot", "ChatGPT", "Cursor", "Codeium", "Claude"]),
        Category::new("5. Customer Service", ["Zendesk AI", "Intercom", "Salesforce Einstein", "Dialogflow", "ChatGPT"]),
        Category::new("6. Operations & Automation", ["Zapier", "Make", "UiPath", "Power Automate", "n8n"]),
    ]
}

fn default_documents() -> BTreeMap<ToolName, String> {
    [
        ("ChatGPT", "ChatGPT"),
        ("Microsoft Copilot", "Microsoft_Copilot"),
        ("Google Gemini", "Google_Gemini"),
        ("Notion AI", "Notion_(product)"),
        ("Grammarly", "Grammarly"),
        ("Jasper", "Jasper_(software)"),
        ("Copy.ai", "Copy.ai"),
        ("Anyword", "Anyword"),
        ("HubSpot AI", "HubSpot"),
        ("Grammarly Business", "Grammarly"),
        ("Canva", "Canva"),
        ("Midjourney", "Midjourney"),
        ("Adobe Firefly", "Adobe_Firefly"),
        ("Runway", "Runway_(company)"),
        ("DALL·E", "DALL-E"),
        ("GitHub Copilot", "GitHub_Copilot"),
        ("Cursor", "Cursor_(software)"),
        ("Codeium", "Codeium"),
        ("Claude", "Claude_(language_model)"),
        ("Zendesk AI", "Zendesk"),
        ("Intercom", "Intercom_(company)"),
        ("Salesforce Einstein", "Salesforce_Einstein"),
        ("Dialogflow", "Dialogflow"),
        ("Zapier", "Zapier"),
        ("Make", "Integromat"),
        ("UiPath", "UiPath"),
        ("Power Automate", "Power_Automate"),
        ("n8n", "N8n"),
    ]
    .into_iter()
    .map(|(tool, doc)| (tool.to_string(), doc.to_string()))
    .collect()
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            region: default_region(),
            start: default_start(),
            end: None,
            use_pageviews: true,
            categories: default_categories(),
            documents: default_documents(),
            scoring: ScoringConfig::default(),
            view: ViewConfig::default(),
        }
    }
}

// ── Scoring Configuration ─────────────────────────────────────────────────────

/// Weights of the two normalised signals in the composite score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Weight for the bounded search-interest signal
    #[serde(default = "default_trends_weight")]
    pub trends_weight: f64,

    /// Weight for the unbounded pageview signal
    #[serde(default = "default_pageviews_weight")]
    pub pageviews_weight: f64,
}

fn default_trends_weight() -> f64 { 0.6 }
fn default_pageviews_weight() -> f64 { 0.4 }

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            trends_weight: default_trends_weight(),
            pageviews_weight: default_pageviews_weight(),
        }
    }
}

impl ScoringConfig {
}

// ── View Configuration ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewConfig {
    /// Rows shown per category leaderboard
    #[serde(default = "default_top_n")]
    pub leaderboard_top_n: usize,

    /// Months of rank history shown (None = everything)
    #[serde(default = "default_lookback")]
    pub lookback_months: Option<usize>,

    /// Tools kept in the rank history, chosen by their latest rank
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Apply a trailing 3-month moving average to ranks
    #[serde(default)]
    pub smooth: bool,
}

fn default_top_n() -> usize { 5 }
fn default_lookback() -> Option<usize> { Some(24) }
fn default_top_k() -> usize { 5 }

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            leaderboard_top_n: default_top_n(),
            lookback_months: default_lookback(),
            top_k: default_top_k(),
            smooth: false,
        }
    }
}

// ── Config Files ──────────────────────────────────────────────────────────────

/// Read a configuration file, choosing the format from its extension:
/// `.yaml`/`.yml` and `.json` are parsed as such, anything else as TOML.
pub fn load_config_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)?;
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    let config = match ext.as_deref() {
        Some("yaml") | Some("yml") => serde_yaml::from_str(&content)
            .map_err(|e| ToolrankError::Config(format!("{}: {e}", path.display())))?,
        Some("json") => serde_json::from_str(&content)?,
        _ => toml::from_str(&content)
            .map_err(|e| ToolrankError::Config(format!("{}: {e}", path.display())))?,
    };
    Ok(config)
}

// ── Helper Methods ─────────────────────────────────────────────────────────────

impl TrackerConfig {
    /// Last month of the fetch window.
    pub fn end_month(&self) -> MonthKey {
        self.end.unwrap_or_else(MonthKey::current)
    }

    /// Region as used in history keys ("GLOBAL" when worldwide).
    pub fn region_label(&self) -> &str {
        if self.region.trim().is_empty() { "GLOBAL" } else { self.region.trim() }
    }

    pub fn trends_history_key(&self) -> String {
        format!("history_trends_{}", self.region_label())
    }

    pub fn scores_history_key(&self) -> String {
        format!("history_scores_{}", self.region_label())
    }

    pub fn pageviews_history_key(&self) -> &'static str {
        PAGEVIEWS_HISTORY_KEY
    }

    /// Every tracked tool across all categories, sorted and de-duplicated.
    pub fn all_tools(&self) -> Vec<ToolName> {
        let mut tools: Vec<ToolName> = self
            .categories
            .iter()
            .flat_map(|c| c.tools.iter().cloned())
            .collect();
        tools.sort();
        tools.dedup();
        tools
    }

    /// Tool → document title for every tracked tool. Tools without an
    /// override use their own name with spaces replaced by underscores.
    pub fn document_map(&self) -> BTreeMap<ToolName, String> {
        self.all_tools()
            .into_iter()
            .map(|tool| {
                let doc = self
                    .documents
                    .get(&tool)
                    .cloned()
                    .unwrap_or_else(|| tool.replace(' ', "_"));
                (tool, doc)
            })
            .collect()
    }

    pub fn category(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.name == name)
    }

    /// Check the configuration before any fetch is attempted.
    pub fn validate(&self) -> Result<()> {
        if self.categories.is_empty() {
            return Err(ToolrankError::Config("at least one category is required".into()));
        }
        if let Some(empty) = self.categories.iter().find(|c| c.tools.is_empty()) {
            return Err(ToolrankError::Config(format!("category '{}' has no tools", empty.name)));
        }
        if self.end_month() < self.start {
            return Err(ToolrankError::Config(format!(
                "end month {} is before start month {}",
                self.end_month(),
                self.start
            )));
        }
        if self.scoring.trends_weight < 0.0 || self.scoring.pageviews_weight < 0.0 {
            return Err(ToolrankError::Config("signal weights must be non-negative".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_all_tools_sorted_and_unique() {
        let config = TrackerConfig::default();
        let tools = config.all_tools();
        let mut sorted = tools.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(tools, sorted);
        assert_eq!(tools.iter().filter(|t| *t == "ChatGPT").count(), 1);
    }

    #[test]
    fn test_document_map_falls_back_to_underscored_name() {
        let config = TrackerConfig {
            categories: vec![Category::new("Misc", ["Foo Bar", "ChatGPT"])],
            documents: [("ChatGPT".to_string(), "ChatGPT".to_string())].into_iter().collect(),
            ..TrackerConfig::default()
        };
        let docs = config.document_map();
        assert_eq!(docs.get("Foo Bar").map(String::as_str), Some("Foo_Bar"));
        assert_eq!(docs.get("ChatGPT").map(String::as_str), Some("ChatGPT"));
    }

    #[test]
    fn test_history_keys_use_region_label() {
        let mut config = TrackerConfig::default();
        assert_eq!(config.trends_history_key(), "history_trends_US");
        config.region = String::new();
        assert_eq!(config.scores_history_key(), "history_scores_GLOBAL");
        assert_eq!(config.pageviews_history_key(), "history_wiki");
    }

    #[test]
    fn test_validate_rejects_inverted_range() {
        let config = TrackerConfig {
            start: MonthKey::new(2024, 5).unwrap(),
            end: Some(MonthKey::new(2024, 1).unwrap()),
            ..TrackerConfig::default()
        };
        assert!(matches!(config.validate(), Err(ToolrankError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_empty_category() {
        let config = TrackerConfig {
            categories: vec![Category::new("Empty", Vec::<String>::new())],
            ..TrackerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_yaml_defaults_fill_missing_fields() {
        let yaml = "region: KR\ncategories:\n  - name: Dev\n    tools: [Cursor, Claude]\n";
        let config: TrackerConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.region, "KR");
        assert_eq!(config.categories.len(), 1);
        assert!(config.use_pageviews);
        assert_eq!(config.view.top_k, 5);
        assert_eq!(config.start, MonthKey::new(2022, 1).unwrap());
    }

    #[test]
    fn test_from_yaml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tracker.yaml");
        std::fs::write(&path, "region: ''\nstart: 2023-06\nend: 2024-02\n").unwrap();
        let config: TrackerConfig = load_config_file(&path).unwrap();
        assert_eq!(config.region_label(), "GLOBAL");
        assert_eq!(config.end_month(), MonthKey::new(2024, 2).unwrap());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_json_and_toml_files() {
        let dir = tempfile::tempdir().unwrap();
        let json = dir.path().join("tracker.json");
        std::fs::write(&json, r#"{"region": "DE", "use_pageviews": false}"#).unwrap();
        let config: TrackerConfig = load_config_file(&json).unwrap();
        assert_eq!(config.region, "DE");
        assert!(!config.use_pageviews);

        let toml_path = dir.path().join("tracker.toml");
        std::fs::write(&toml_path, "region = \"JP\"\n[view]\ntop_k = 3\n").unwrap();
        let config: TrackerConfig = load_config_file(&toml_path).unwrap();
        assert_eq!(config.region, "JP");
        assert_eq!(config.view.top_k, 3);
    }

    #[test]
    fn test_config_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = load_config_file::<TrackerConfig>(&dir.path().join("absent.yaml"));
        assert!(matches!(missing, Err(ToolrankError::Io(_))));

        let bad_json = dir.path().join("bad.json");
        std::fs::write(&bad_json, "{ region: ").unwrap();
        let parsed = load_config_file::<TrackerConfig>(&bad_json);
        assert!(matches!(parsed, Err(ToolrankError::Serialization(_))));

        let bad_toml = dir.path().join("bad.toml");
        std::fs::write(&bad_toml, "region = [").unwrap();
        let parsed = load_config_file::<TrackerConfig>(&bad_toml);
        assert!(matches!(parsed, Err(ToolrankError::Config(_))));
    }
}
