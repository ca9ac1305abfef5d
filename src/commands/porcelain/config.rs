use crate::areas::repository::Repository;
use std::io::Write;

impl Repository {
    /// Print `key`, or set it when a value is given
    pub fn config_command(&self, key: &str, value: Option<&str>) -> anyhow::Result<()> {
        self.require_repository()?;

        match value {
            Some(value) => self.config().set(key, value),
            None => match self.config().get(key)? {
                Some(value) => {
                    writeln!(self.writer(), "{}", value)?;
                    Ok(())
                }
                None => anyhow::bail!("config key '{}' is not set", key),
            },
        }
    }
}
