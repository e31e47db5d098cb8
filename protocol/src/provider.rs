use serde::Deserialize;
use serde::Serialize;

pub const DEFAULT_PROVIDER: &str = "ollama";
pub const DEFAULT_MODEL: &str = "qwen3:8b";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ProviderInfo {
    pub name: String,
    pub default_model: String,
}

/// Known model providers plus the default provider/model pair for new myses.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ProviderCatalog {
    providers: Vec<ProviderInfo>,
    default_provider: String,
    default_model: String,
}

impl ProviderCatalog {
    /// Build a catalog. The default provider is added to the provider list when missing.
    pub fn new(
        mut providers: Vec<ProviderInfo>,
        default_provider: impl Into<String>,
        default_model: impl Into<String>,
    ) -> Self {
        let default_provider = default_provider.into();
        let default_model = default_model.into();
        if !providers.iter().any(|p| p.name == default_provider) {
            providers.push(ProviderInfo {
                name: default_provider.clone(),
                default_model: default_model.clone(),
            });
        }
        providers.sort_by(|a, b| a.name.cmp(&b.name));
        providers.dedup_by(|a, b| a.name == b.name);
        Self {
            providers,
            default_provider,
            default_model,
        }
    }

    pub fn providers(&self) -> &[ProviderInfo] {
        &self.providers
    }

    pub fn provider_names(&self) -> impl Iterator<Item = &str> {
        self.providers.iter().map(|p| p.name.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.providers.iter().any(|p| p.name == name)
    }

    pub fn default_provider(&self) -> &str {
        &self.default_provider
    }

    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    /// Model to use for `provider` when the user does not pick one.
    pub fn default_model_for(&self, provider: &str) -> &str {
        self.providers
            .iter()
            .find(|p| p.name == provider)
            .map(|p| p.default_model.as_str())
            .unwrap_or(&self.default_model)
    }
}

impl Default for ProviderCatalog {
    fn default() -> Self {
        Self::new(
            vec![
                ProviderInfo {
                    name: DEFAULT_PROVIDER.to_string(),
                    default_model: DEFAULT_MODEL.to_string(),
                },
                ProviderInfo {
                    name: "opencode_zen".to_string(),
                    default_model: "gpt-5-nano".to_string(),
                },
            ],
            DEFAULT_PROVIDER,
            DEFAULT_MODEL,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_provider_is_always_known() {
        let catalog = ProviderCatalog::new(Vec::new(), "zen", "small");
        assert!(catalog.contains("zen"));
        assert_eq!(catalog.default_model_for("zen"), "small");
        assert_eq!(catalog.default_model_for("missing"), "small");
    }

    #[test]
    fn providers_are_sorted_and_deduplicated() {
        let info = |name: &str| ProviderInfo {
            name: name.to_string(),
            default_model: "m".to_string(),
        };
        let catalog = ProviderCatalog::new(vec![info("b"), info("a"), info("b")], "a", "m");
        assert_eq!(catalog.provider_names().collect::<Vec<_>>(), vec!["a", "b"]);
    }
}
