use std::{collections::HashMap, time::Duration};

use crate::store::StoreConfig;

#[derive(Debug, Default)]
pub struct Config(pub HashMap<Parameter, String>);

#[derive(Debug, Hash, PartialEq, Eq, Clone, Copy)]
pub enum Parameter {
    SweepInterval,
    Log,
}

impl Parameter {
    pub fn deserialize(s: &str) -> anyhow::Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "sweep-interval" => Ok(Parameter::SweepInterval),
            "log" => Ok(Parameter::Log),
            _ => Err(anyhow::format_err!("unknown parameter {:?}", s)),
        }
    }

    pub fn serialize(&self) -> &'static str {
        match self {
            Parameter::SweepInterval => "sweep-interval",
            Parameter::Log => "log",
        }
    }
}

impl Config {
    /// Load config from `--key value` pairs, program name excluded.
    pub fn from_args<I>(args: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut config = Config::default();
        let mut current_key = None;
        for arg in args {
            if let Some(current_key) = current_key.take() {
                config.0.insert(current_key, arg);
            } else if let Some(key) = arg.strip_prefix("--") {
                current_key = Some(Parameter::deserialize(key)?);
            } else {
                anyhow::bail!("invalid argument {:?}", arg)
            }
        }
        if let Some(key) = current_key {
            anyhow::bail!("missing value for --{}", key.serialize())
        }
        Ok(config)
    }

    pub fn store_config(&self) -> anyhow::Result<StoreConfig> {
        let mut store_config = StoreConfig::default();
        if let Some(secs) = self.0.get(&Parameter::SweepInterval) {
            let secs = secs.parse::<u64>().map_err(|_| {
                anyhow::format_err!("invalid --{} {:?}", Parameter::SweepInterval.serialize(), secs)
            })?;
            if secs == 0 {
                anyhow::bail!("--{} must be positive", Parameter::SweepInterval.serialize())
            }
            store_config.sweep_interval = Duration::from_secs(secs);
        }
        Ok(store_config)
    }

    pub fn log_filter(&self) -> Option<&str> {
        self.0.get(&Parameter::Log).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{Config, Parameter};
    use crate::store::SWEEP_INTERVAL;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn defaults() {
        let config = Config::from_args(args(&[])).unwrap();
        assert_eq!(config.store_config().unwrap().sweep_interval, SWEEP_INTERVAL);
        assert_eq!(config.log_filter(), None);
    }

    #[test]
    fn parses_pairs() {
        let config =
            Config::from_args(args(&["--sweep-interval", "5", "--LOG", "debug"])).unwrap();
        assert_eq!(config.0.get(&Parameter::Log).map(String::as_str), Some("debug"));
        assert_eq!(
            config.store_config().unwrap().sweep_interval,
            Duration::from_secs(5)
        );
        assert_eq!(config.log_filter(), Some("debug"));
    }

    #[test]
    fn rejects_bad_input() {
        assert!(Config::from_args(args(&["--port", "6379"])).is_err());
        assert!(Config::from_args(args(&["stray"])).is_err());
        assert!(Config::from_args(args(&["--log"])).is_err());

        let zero = Config::from_args(args(&["--sweep-interval", "0"])).unwrap();
        assert!(zero.store_config().is_err());
        let junk = Config::from_args(args(&["--sweep-interval", "soon"])).unwrap();
        assert!(junk.store_config().is_err());
    }
}
