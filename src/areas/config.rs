//! Repository configuration
//!
//! Settings live in `.kit/config.toml`. Each TOML table is a section and keys
//! are addressed with dotted names:
//!
//! ```toml
//! [user]
//! name = "Jane Doe"
//! email = "jane@example.com"
//! ```
//!
//! `user.name` resolves to `"Jane Doe"`. Only two-level keys are supported.

use crate::areas::storage::Storage;
use crate::errors::RepositoryError;
use anyhow::Context;
use std::path::Path;
use std::rc::Rc;

#[derive(Debug)]
pub struct Config {
    path: Box<Path>,
    storage: Rc<dyn Storage>,
}

impl Config {
    pub fn new(path: Box<Path>, storage: Rc<dyn Storage>) -> Self {
        Config { path, storage }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn split_key(key: &str) -> anyhow::Result<(&str, &str)> {
        match key.split_once('.') {
            Some((section, name))
                if !section.is_empty() && !name.is_empty() && !name.contains('.') =>
            {
                Ok((section, name))
            }
            _ => anyhow::bail!("key does not contain a section: {}", key),
        }
    }

    fn load(&self) -> anyhow::Result<toml::Table> {
        if !self.storage.is_file(&self.path) {
            return Ok(toml::Table::new());
        }

        let content = self.storage.read(&self.path).map_err(|err| {
            RepositoryError::io(
                format!("unable to read config file {}", self.path.display()),
                err,
            )
        })?;
        let content = std::str::from_utf8(&content)
            .with_context(|| format!("config file {} is not UTF-8", self.path.display()))?;

        toml::from_str(content)
            .with_context(|| format!("invalid config file {}", self.path.display()))
    }

    /// Look up a dotted key; missing files, sections and keys all read as `None`
    pub fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        let (section, name) = Self::split_key(key)?;
        let table = self.load()?;

        let value = table
            .get(section)
            .and_then(|section| section.as_table())
            .and_then(|section| section.get(name));

        Ok(value.map(|value| match value {
            toml::Value::String(text) => text.clone(),
            other => other.to_string(),
        }))
    }

    /// Lookup that treats an unreadable config as empty
    pub fn lookup(&self, key: &str) -> Option<String> {
        match self.get(key) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(key, error = %err, "ignoring unreadable config");
                None
            }
        }
    }

    pub fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        let (section, name) = Self::split_key(key)?;
        let mut table = self.load()?;

        let section_table = table
            .entry(section.to_string())
            .or_insert_with(|| toml::Value::Table(toml::Table::new()));
        let section_table = section_table
            .as_table_mut()
            .with_context(|| format!("config entry {} is not a section", section))?;
        section_table.insert(name.to_string(), toml::Value::String(value.to_string()));

        let content = toml::to_string(&table).context("unable to serialize config")?;
        self.storage
            .write(&self.path, content.as_bytes())
            .map_err(|err| {
                RepositoryError::io(
                    format!("unable to write config file {}", self.path.display()),
                    err,
                )
                .into()
            })
    }
}
