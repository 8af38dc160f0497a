// Reporter lookup by name

use std::collections::BTreeMap;
use tracing::debug;

use super::{MultiReporter, Reporter, ReporterConfig, StreamingJsonReporter, TapReporter};
use crate::config::RunConfiguration;
use crate::error::{Error, Result};

pub type ReporterFactory = fn(&ReporterConfig) -> Box<dyn Reporter>;

fn tap_factory(config: &ReporterConfig) -> Box<dyn Reporter> {
    Box::new(TapReporter::new(config))
}

fn jsonl_factory(config: &ReporterConfig) -> Box<dyn Reporter> {
    Box::new(StreamingJsonReporter::new(config))
}

struct Registration {
    description: String,
    factory: ReporterFactory,
}

/// Maps reporter names to factories; built at startup and passed to the run
pub struct ReporterRegistry {
    registrations: BTreeMap<String, Registration>,
}

impl Default for ReporterRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl ReporterRegistry {
    /// Registry with no reporters
    pub fn empty() -> Self {
        Self {
            registrations: BTreeMap::new(),
        }
    }

    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        registry.register(TapReporter::NAME, TapReporter::description(), tap_factory);
        registry.register(
            StreamingJsonReporter::NAME,
            StreamingJsonReporter::description(),
            jsonl_factory,
        );
        registry
    }

    pub fn register(&mut self, name: &str, description: &str, factory: ReporterFactory) {
        self.registrations.insert(
            name.to_string(),
            Registration {
                description: description.to_string(),
                factory,
            },
        );
    }

    pub fn contains(&self, name: &str) -> bool {
        self.registrations.contains_key(name)
    }

    /// (name, description) pairs in name order
    pub fn descriptions(&self) -> impl Iterator<Item = (&str, &str)> {
        self.registrations
            .iter()
            .map(|(name, r)| (name.as_str(), r.description.as_str()))
    }

    pub fn create(&self, name: &str, config: &ReporterConfig) -> Result<Box<dyn Reporter>> {
        let registration = self
            .registrations
            .get(name)
            .ok_or_else(|| Error::UnknownReporter(name.to_string()))?;
        debug!("Creating reporter '{}'", name);
        Ok((registration.factory)(config))
    }

    /// The reporter (or fan-out of reporters) a run asks for
    pub fn create_for_run(&self, config: &RunConfiguration) -> Result<Box<dyn Reporter>> {
        let reporter_config = ReporterConfig::from_run(config);
        let names = config.reporter_names();

        if let [name] = names.as_slice() {
            return self.create(name, &reporter_config);
        }

        let mut multi = MultiReporter::new();
        for name in &names {
            multi.add(self.create(name, &reporter_config)?);
        }
        Ok(Box::new(multi))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::StreamWriter;

    #[test]
    fn test_builtins_registered() {
        let registry = ReporterRegistry::with_builtins();
        assert!(registry.contains("tap"));
        assert!(registry.contains("jsonl"));
        let names: Vec<&str> = registry.descriptions().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["jsonl", "tap"]);
    }

    #[test]
    fn test_unknown_reporter_is_config_error() {
        let registry = ReporterRegistry::with_builtins();
        let config = ReporterConfig::new(StreamWriter::new(std::io::sink()));
        let err = registry.create("xml", &config).err().unwrap();
        assert_eq!(err.kind(), crate::error::ErrorKind::Config);
    }

    #[test]
    fn test_empty_registry() {
        assert_eq!(ReporterRegistry::empty().descriptions().count(), 0);
    }
}
