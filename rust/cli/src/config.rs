use pokersim_engine::dealer::{check_card_budget, Variant, MAX_SEATS, MIN_SEATS};
use serde::{Deserialize, Serialize};
use std::fs;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub seed: Option<u64>,
    pub seats: usize,
    pub rounds: u64,
    pub variant: Variant,
    pub progress_every: u64,
    pub parallel: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueSource {
    Default,
    File,
    Env,
}

#[derive(Debug, Clone, Copy)]
pub struct ConfigSources {
    pub seed: ValueSource,
    pub seats: ValueSource,
    pub rounds: ValueSource,
    pub variant: ValueSource,
    pub progress_every: ValueSource,
    pub parallel: ValueSource,
}

impl Default for ConfigSources {
    fn default() -> Self {
        Self {
            seed: ValueSource::Default,
            seats: ValueSource::Default,
            rounds: ValueSource::Default,
            variant: ValueSource::Default,
            progress_every: ValueSource::Default,
            parallel: ValueSource::Default,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConfigResolved {
    pub config: Config,
    pub sources: ConfigSources,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            seed: None,
            seats: 4,
            rounds: 10_000,
            variant: Variant::Draw,
            progress_every: 1000,
            parallel: false,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Invalid(String),
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}
impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Parse(e)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "cannot read config file: {}", e),
            ConfigError::Parse(e) => write!(f, "malformed config file: {}", e),
            ConfigError::Invalid(msg) => f.write_str(msg),
        }
    }
}

/// Defaults, then the TOML file named by `POKERSIM_CONFIG`, then
/// `POKERSIM_*` environment variables. Command-line flags are applied by
/// the commands themselves on top of this.
pub fn load_with_sources() -> Result<ConfigResolved, ConfigError> {
    let mut cfg = Config::default();
    let mut sources = ConfigSources::default();

    if let Ok(path) = std::env::var("POKERSIM_CONFIG")
        && !path.is_empty()
    {
        let s = fs::read_to_string(path)?;
        let f: FileConfig = toml::from_str(&s)?;
        if let Some(v) = f.seed {
            cfg.seed = Some(v);
            sources.seed = ValueSource::File;
        }
        if let Some(v) = f.seats {
            cfg.seats = v;
            sources.seats = ValueSource::File;
        }
        if let Some(v) = f.rounds {
            cfg.rounds = v;
            sources.rounds = ValueSource::File;
        }
        if let Some(v) = f.variant {
            cfg.variant = v;
            sources.variant = ValueSource::File;
        }
        if let Some(v) = f.progress_every {
            cfg.progress_every = v;
            sources.progress_every = ValueSource::File;
        }
        if let Some(v) = f.parallel {
            cfg.parallel = v;
            sources.parallel = ValueSource::File;
        }
    }

    if let Some(seed) = env_value("POKERSIM_SEED") {
        cfg.seed = Some(
            seed.parse()
                .map_err(|_| ConfigError::Invalid(format!("Invalid seed: {}", seed)))?,
        );
        sources.seed = ValueSource::Env;
    }
    if let Some(seats) = env_value("POKERSIM_SEATS") {
        cfg.seats = seats
            .parse()
            .map_err(|_| ConfigError::Invalid(format!("Invalid seats: {}", seats)))?;
        sources.seats = ValueSource::Env;
    }
    if let Some(rounds) = env_value("POKERSIM_ROUNDS") {
        cfg.rounds = rounds
            .parse()
            .map_err(|_| ConfigError::Invalid(format!("Invalid rounds: {}", rounds)))?;
        sources.rounds = ValueSource::Env;
    }
    if let Some(variant) = env_value("POKERSIM_VARIANT") {
        cfg.variant = variant.parse().map_err(ConfigError::Invalid)?;
        sources.variant = ValueSource::Env;
    }
    if let Some(every) = env_value("POKERSIM_PROGRESS_EVERY") {
        cfg.progress_every = every
            .parse()
            .map_err(|_| ConfigError::Invalid(format!("Invalid progress_every: {}", every)))?;
        sources.progress_every = ValueSource::Env;
    }
    if let Some(par) = env_value("POKERSIM_PARALLEL") {
        cfg.parallel = parse_bool(&par)
            .ok_or_else(|| ConfigError::Invalid(format!("Invalid parallel: {}", par)))?;
        sources.parallel = ValueSource::Env;
    }

    validate(&cfg)?;
    Ok(ConfigResolved {
        config: cfg,
        sources,
    })
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

#[derive(Debug, Deserialize)]
struct FileConfig {
    #[serde(default)]
    seed: Option<u64>,
    #[serde(default)]
    seats: Option<usize>,
    #[serde(default)]
    rounds: Option<u64>,
    #[serde(default)]
    variant: Option<Variant>,
    #[serde(default)]
    progress_every: Option<u64>,
    #[serde(default)]
    parallel: Option<bool>,
}

fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if !(MIN_SEATS..=MAX_SEATS).contains(&cfg.seats) {
        return Err(ConfigError::Invalid(format!(
            "seats must be within {}..={}",
            MIN_SEATS, MAX_SEATS
        )));
    }
    if cfg.rounds == 0 {
        return Err(ConfigError::Invalid("rounds must be >=1".into()));
    }
    check_card_budget(cfg.variant, cfg.seats)
        .map_err(|e| ConfigError::Invalid(e.to_string()))
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_bool_accepts_common_spellings() {
        assert_eq!(parse_bool("YES"), Some(true));
        assert_eq!(parse_bool("off"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    fn default_config_is_valid() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn validate_rejects_out_of_range_seats() {
        let cfg = Config {
            seats: 11,
            ..Config::default()
        };
        let err = validate(&cfg).unwrap_err();
        assert!(err.to_string().contains("seats"));
    }

    #[test]
    fn file_config_parses_lowercase_variant() {
        let f: FileConfig = toml::from_str("variant = \"holdem\"\nseats = 6\n").unwrap();
        assert_eq!(f.variant, Some(Variant::Holdem));
        assert_eq!(f.seats, Some(6));
        assert_eq!(f.rounds, None);
    }
}
