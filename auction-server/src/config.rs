use {
    crate::subject::entities::Subject,
    anyhow::{
        anyhow,
        Result,
    },
    clap::{
        crate_authors,
        crate_description,
        crate_name,
        crate_version,
        Args,
        Parser,
    },
    std::fs,
    time::{
        macros::format_description,
        UtcOffset,
    },
};

mod server;

// `Options` is the clap definition of the command-line args for the auction server.
#[derive(Parser, Debug)]
#[command(name = crate_name!())]
#[command(author = crate_authors!())]
#[command(about = crate_description!())]
#[command(version = crate_version!())]
pub enum Options {
    /// Run the auction server service.
    Run(RunOptions),
}

#[derive(Args, Clone, Debug)]
pub struct RunOptions {
    /// Server Options
    #[command(flatten)]
    pub server: server::Options,

    #[command(flatten)]
    pub config: ConfigOptions,
}

#[derive(Args, Clone, Debug)]
#[command(next_help_heading = "Config Options")]
#[group(id = "Config")]
pub struct ConfigOptions {
    /// Path to a configuration file containing the bidding settings and seed lots
    #[arg(long = "config")]
    #[arg(env = "BIDDING_CONFIG")]
    #[arg(default_value = "config.yaml")]
    pub config: String,
}

const DEFAULT_UTC_OFFSET: &str = "+05:30";
const DEFAULT_MAX_UPDATE_ATTEMPTS: usize = 5;

fn default_utc_offset() -> String {
    DEFAULT_UTC_OFFSET.to_string()
}

fn default_max_update_attempts() -> usize {
    DEFAULT_MAX_UPDATE_ATTEMPTS
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct BiddingConfig {
    /// Offset in which harvesting months end, e.g. `+05:30`.
    #[serde(default = "default_utc_offset")]
    pub utc_offset:          String,
    /// How many times a session write is retried after losing to a concurrent writer.
    #[serde(default = "default_max_update_attempts")]
    pub max_update_attempts: usize,
}

impl Default for BiddingConfig {
    fn default() -> Self {
        Self {
            utc_offset:          default_utc_offset(),
            max_update_attempts: default_max_update_attempts(),
        }
    }
}

impl BiddingConfig {
    pub fn utc_offset(&self) -> Result<UtcOffset> {
        UtcOffset::parse(
            &self.utc_offset,
            format_description!("[offset_hour sign:mandatory]:[offset_minute]"),
        )
        .map_err(|err| anyhow!("Invalid utc_offset {:?}: {}", self.utc_offset, err))
    }
}

/// A crop lot served by the in-memory subject store.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct SubjectConfig {
    pub subject_ref: String,
    pub crop_type:   String,
    pub district:    String,
    #[serde(default)]
    pub village:     Option<String>,
    #[serde(default)]
    pub area_acres:  Option<f64>,
    pub owner_id:    String,
}

impl From<SubjectConfig> for Subject {
    fn from(config: SubjectConfig) -> Self {
        Self {
            subject_ref: config.subject_ref,
            crop_type:   config.crop_type,
            district:    config.district,
            village:     config.village,
            area_acres:  config.area_acres,
            owner_id:    config.owner_id,
        }
    }
}

#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct Config {
    #[serde(default)]
    pub bidding:  BiddingConfig,
    /// Only used when no database is configured.
    #[serde(default)]
    pub subjects: Vec<SubjectConfig>,
}

impl Config {
    pub fn load(path: &str) -> Result<Config> {
        // Open and read the YAML file
        let yaml_content = fs::read_to_string(path)?;
        Self::from_yaml(&yaml_content)
    }

    fn from_yaml(yaml_content: &str) -> Result<Config> {
        let config: Config = serde_yaml::from_str(yaml_content)?;
        if config.bidding.max_update_attempts == 0 {
            return Err(anyhow!("max_update_attempts must be at least 1"));
        }
        config.bidding.utc_offset()?;
        Ok(config)
    }
}
