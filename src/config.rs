use crate::models::CategoryGoal;
use chrono_tz::Tz;
use std::{env, path::PathBuf};
use thiserror::Error;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_DATA_PATH: &str = "data/records.json";
pub const DEFAULT_TIMEZONE: &str = "America/Sao_Paulo";
pub const DEFAULT_GOALS: &str = "Studies=60,English=30,Read=30";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("PORT must be a number between 0 and 65535, got {0:?}")]
    InvalidPort(String),
    #[error("unknown timezone {0:?}")]
    UnknownTimezone(String),
    #[error("goal entry {0:?} must look like Category=minutes")]
    InvalidGoal(String),
    #[error("{year}-{month} is not a calendar month")]
    InvalidMonth { year: i32, month: u32 },
}

/// Everything the analytics need besides the records themselves.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub goals: Vec<CategoryGoal>,
    pub timezone: Tz,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub data_path: PathBuf,
    pub settings: Settings,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = match lookup("PORT") {
            Some(value) => value
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort(value))?,
            None => DEFAULT_PORT,
        };

        let data_path = lookup("APP_DATA_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_PATH));

        let timezone_name = lookup("APP_TIMEZONE").unwrap_or_else(|| DEFAULT_TIMEZONE.to_string());
        let timezone = timezone_name
            .trim()
            .parse::<Tz>()
            .map_err(|_| ConfigError::UnknownTimezone(timezone_name.clone()))?;

        let goals = parse_goals(&lookup("APP_GOALS").unwrap_or_else(|| DEFAULT_GOALS.to_string()))?;

        Ok(Self {
            port,
            data_path,
            settings: Settings { goals, timezone },
        })
    }
}

/// Parses `Category=minutes` pairs separated by commas. A category may
/// appear only once.
pub fn parse_goals(raw: &str) -> Result<Vec<CategoryGoal>, ConfigError> {
    let mut goals: Vec<CategoryGoal> = Vec::new();
    for entry in raw.split(',').map(str::trim).filter(|entry| !entry.is_empty()) {
        let invalid = || ConfigError::InvalidGoal(entry.to_string());
        let (category, minutes) = entry.split_once('=').ok_or_else(invalid)?;
        let category = category.trim();
        let daily_target_minutes = minutes.trim().parse::<u32>().map_err(|_| invalid())?;
        if category.is_empty() || goals.iter().any(|goal| goal.category == category) {
            return Err(invalid());
        }
        goals.push(CategoryGoal {
            category: category.to_string(),
            daily_target_minutes,
        });
    }
    Ok(goals)
}
