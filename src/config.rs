use anyhow::{anyhow, Context, Result};

/// Size of the simulated heap when nothing else is given.
pub const DEFAULT_ARENA_SIZE: usize = 1024;

/// Environment variable that overrides the arena size.
pub const ARENA_SIZE_VAR: &str = "HEAPSIM_ARENA_SIZE";

/// Runtime settings of the simulator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub arena_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            arena_size: DEFAULT_ARENA_SIZE,
        }
    }
}

impl Config {
    /// Build the configuration from the process arguments and
    /// environment.
    pub fn from_env() -> Result<Self> {
        let argument = std::env::args().nth(1);
        let variable = std::env::var(ARENA_SIZE_VAR).ok();
        Self::resolve(argument.as_deref(), variable.as_deref())
    }

    /// The command line argument wins over the environment
    /// variable, which wins over the default.
    pub fn resolve(argument: Option<&str>, variable: Option<&str>) -> Result<Self> {
        let arena_size = match (argument, variable) {
            (Some(value), _) => parse_size(value).context("Invalid arena size argument.")?,
            (None, Some(value)) => parse_size(value)
                .with_context(|| format!("Invalid value for {ARENA_SIZE_VAR}."))?,
            (None, None) => DEFAULT_ARENA_SIZE,
        };

        Ok(Self { arena_size })
    }
}

fn parse_size(value: &str) -> Result<usize> {
    let size: usize = value
        .trim()
        .parse()
        .with_context(|| format!("'{value}' is not a byte count"))?;

    if size == 0 {
        return Err(anyhow!("the arena cannot be empty"));
    }

    Ok(size)
}
