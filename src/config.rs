use anyhow::{Context, Result};

pub const DEFAULT_MAX_STUDENTS_PER_COURSE: usize = 20;

/// Runtime settings, read from the environment (and `.env` when present)
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub max_students_per_course: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let database_url = lookup("DATABASE_URL")
            .context("DATABASE_URL must be set")?;
        let host = lookup("HOST")
            .unwrap_or_else(|| "0.0.0.0".to_string());
        let port = lookup("PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse::<u16>()
            .context("Invalid PORT")?;
        let max_students_per_course = match lookup("MAX_STUDENTS_PER_COURSE") {
            Some(value) => value
                .parse::<usize>()
                .context("Invalid MAX_STUDENTS_PER_COURSE")?,
            None => DEFAULT_MAX_STUDENTS_PER_COURSE,
        };

        Ok(Self {
            database_url,
            host,
            port,
            max_students_per_course,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
