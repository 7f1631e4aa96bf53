use serde::{Deserialize, Serialize};

/// Ordering applied to `MONTH/YEAR` buckets.
///
/// `Lexicographic` sorts the label text, which is what legacy exports
/// contain (so `DECEMBER/2024` lands before `FEBRUARY/2024`).
/// `Chronological` sorts by (year, month).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MonthOrder {
    #[default]
    Lexicographic,
    Chronological,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default)]
    pub month_order: MonthOrder,
    /// Materials always listed in the flat-file price section, in order.
    #[serde(default = "default_canonical_materials")]
    pub canonical_materials: Vec<String>,
    /// Monday-first labels for the weekly curve.
    #[serde(default = "default_weekday_labels")]
    pub weekday_labels: Vec<String>,
    #[serde(default = "default_no_collections_label")]
    pub no_collections_label: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            month_order: MonthOrder::default(),
            canonical_materials: default_canonical_materials(),
            weekday_labels: default_weekday_labels(),
            no_collections_label: default_no_collections_label(),
        }
    }
}

impl ReportConfig {
    /// Load from `<data_dir>/reporting.json`.
    /// In tests, use ReportConfig::default().
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let path = format!("{data_dir}/reporting.json");
        let content = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: ReportConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.weekday_labels.len() != 7 {
            anyhow::bail!(
                "weekday_labels must have 7 entries, got {}",
                self.weekday_labels.len()
            );
        }
        if self.canonical_materials.is_empty() {
            anyhow::bail!("canonical_materials must not be empty");
        }
        Ok(())
    }
}

fn default_canonical_materials() -> Vec<String> {
    ["PET", "Ferro", "Papelão", "Alumínio"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_weekday_labels() -> Vec<String> {
    ["Segunda", "Terça", "Quarta", "Quinta", "Sexta", "Sábado", "Domingo"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_no_collections_label() -> String {
    "Não houve coletas".into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: ReportConfig =
            serde_json::from_str(r#"{ "month_order": "chronological" }"#).unwrap();
        assert_eq!(config.month_order, MonthOrder::Chronological);
        assert_eq!(config.canonical_materials, default_canonical_materials());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn short_weekday_list_is_rejected() {
        let config = ReportConfig {
            weekday_labels: vec!["Mon".into()],
            ..ReportConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
