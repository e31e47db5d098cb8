use std::io::ErrorKind;
use std::path::Path;
use std::path::PathBuf;

use anyhow::Context;
use toml_edit::DocumentMut;
use toml_edit::Item as TomlItem;
use toml_edit::Table as TomlTable;
use toml_edit::value;
use zoea_protocol::ProviderCatalog;
use zoea_protocol::ProviderInfo;

use crate::atomic_write::Overwrite;
use crate::atomic_write::write_atomic_text;

const SWARM_TABLE: &str = "swarm";
const PROVIDERS_TABLE: &str = "providers";

/// `~/.zoea/config.toml`.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn new_default() -> anyhow::Result<Self> {
        let Some(home) = dirs::home_dir() else {
            anyhow::bail!("cannot determine home directory for config path");
        };
        Ok(Self::new(default_config_path(&home)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Provider catalog described by the config file.
    ///
    /// A missing file, table or key falls back to the built-in catalog. Values of the wrong
    /// type are ignored with a warning.
    pub fn load_providers(&self) -> anyhow::Result<ProviderCatalog> {
        let Some(content) = read_document_string(&self.path)? else {
            tracing::debug!(path = %self.path.display(), "no config file, using defaults");
            return Ok(ProviderCatalog::default());
        };
        let doc = content
            .parse::<DocumentMut>()
            .with_context(|| format!("parse {}", self.path.display()))?;
        Ok(catalog_from_document(&doc))
    }

    /// Write a commented starter config unless one already exists.
    pub fn write_default(&self) -> anyhow::Result<bool> {
        write_atomic_text(&self.path, &default_document(), Overwrite::KeepExisting)
    }

    /// Set `[swarm] default_provider` (and `default_model` when given), keeping comments and
    /// unrelated tables intact.
    pub fn set_default_provider(&self, provider: &str, model: Option<&str>) -> anyhow::Result<()> {
        let content = read_document_string(&self.path)?.unwrap_or_default();
        let mut doc = content
            .parse::<DocumentMut>()
            .with_context(|| format!("parse {}", self.path.display()))?;

        let swarm = ensure_table_for_write(&mut doc, SWARM_TABLE);
        swarm["default_provider"] = value(provider);
        if let Some(model) = model {
            swarm["default_model"] = value(model);
        }

        write_atomic_text(&self.path, &doc.to_string(), Overwrite::Replace)?;
        Ok(())
    }
}

fn default_config_path(home: &Path) -> PathBuf {
    home.join(".zoea").join("config.toml")
}

fn catalog_from_document(doc: &DocumentMut) -> ProviderCatalog {
    let defaults = ProviderCatalog::default();
    let swarm = doc.get(SWARM_TABLE).and_then(TomlItem::as_table);
    let default_provider = swarm
        .and_then(|table| read_string(table, "default_provider"))
        .unwrap_or_else(|| defaults.default_provider().to_string());
    let default_model = swarm
        .and_then(|table| read_string(table, "default_model"))
        .unwrap_or_else(|| defaults.default_model_for(&default_provider).to_string());

    let providers = match doc.get(PROVIDERS_TABLE).and_then(TomlItem::as_table) {
        Some(table) => table
            .iter()
            .filter_map(|(name, item)| {
                let Some(entry) = item.as_table() else {
                    tracing::warn!(provider = name, "ignoring provider entry that is not a table");
                    return None;
                };
                let model = read_string(entry, "model")
                    .unwrap_or_else(|| defaults.default_model_for(name).to_string());
                Some(ProviderInfo {
                    name: name.to_string(),
                    default_model: model,
                })
            })
            .collect(),
        None => defaults.providers().to_vec(),
    };

    ProviderCatalog::new(providers, default_provider, default_model)
}

fn read_string(table: &TomlTable, key: &str) -> Option<String> {
    let item = table.get(key)?;
    match item.as_value().and_then(|v| v.as_str()) {
        Some(text) if !text.trim().is_empty() => Some(text.trim().to_string()),
        Some(_) => None,
        None => {
            tracing::warn!(key, "ignoring config value that is not a string");
            None
        }
    }
}

fn default_document() -> String {
    let defaults = ProviderCatalog::default();
    let mut out = String::from("# zoea swarm dashboard\n\n[swarm]\n");
    out.push_str(&format!(
        "default_provider = \"{}\"\ndefault_model = \"{}\"\n",
        defaults.default_provider(),
        defaults.default_model()
    ));
    for provider in defaults.providers() {
        out.push_str(&format!(
            "\n[{PROVIDERS_TABLE}.{}]\nmodel = \"{}\"\n",
            provider.name, provider.default_model
        ));
    }
    out
}

fn ensure_table_for_write<'a>(doc: &'a mut DocumentMut, key: &str) -> &'a mut TomlTable {
    if doc.get(key).and_then(TomlItem::as_table).is_none() {
        let mut table = TomlTable::new();
        table.set_implicit(false);
        doc[key] = TomlItem::Table(table);
    }
    match &mut doc[key] {
        TomlItem::Table(table) => table,
        _ => unreachable!("expected `{key}` to be a table"),
    }
}

fn read_document_string(path: &Path) -> anyhow::Result<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(contents) => Ok(Some(contents)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(anyhow::Error::new(err).context(format!("read {}", path.display()))),
    }
}
