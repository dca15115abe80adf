//! CLI bootstrap - the composition root.
//!
//! The only place where the database pool, the cache and the repositories
//! are wired together. Handlers receive the finished [`CliContext`].

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use aibot_core::{CancellationToken, MemoryCachePool, QuestionService, Repos, database_path};
use aibot_db::{CoreFactory, setup_database, setup_database_url};

/// Bootstrap configuration for the CLI.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliConfig {
    /// Connection URL; the default database file under the data root when `None`.
    pub database_url: Option<String>,
    pub cache_capacity: Option<usize>,
    pub cache_ttl: Option<Duration>,
}

impl CliConfig {
    /// Build the config from the global flags (already merged with the
    /// environment by clap).
    pub fn from_cli(
        database_url: Option<&str>,
        cache_capacity: Option<usize>,
        cache_ttl_secs: Option<u64>,
    ) -> Self {
        Self {
            database_url: database_url
                .filter(|url| !url.is_empty())
                .map(str::to_string),
            cache_capacity,
            cache_ttl: cache_ttl_secs.map(Duration::from_secs),
        }
    }

    fn cache(&self) -> MemoryCachePool {
        let mut cache = MemoryCachePool::new();
        if let Some(capacity) = self.cache_capacity {
            cache = cache.with_capacity(capacity);
        }
        if let Some(ttl) = self.cache_ttl {
            cache = cache.with_ttl(ttl);
        }
        cache
    }
}

/// Fully composed context for CLI commands.
pub struct CliContext {
    pub repos: Repos,
    pub questions: QuestionService,
    /// Where the database lives, for display.
    pub location: String,
    cancel: CancellationToken,
}

impl CliContext {
    /// The root cancellation token, fired on Ctrl-C.
    pub const fn cancel(&self) -> &CancellationToken {
        &self.cancel
    }
}

/// Open (and if needed create) the database and build every repository.
pub async fn bootstrap(config: CliConfig, cancel: CancellationToken) -> Result<CliContext> {
    let (pool, location) = match &config.database_url {
        Some(url) => (setup_database_url(url).await?, url.clone()),
        None => {
            let path = database_path()?;
            (setup_database(&path).await?, path.display().to_string())
        }
    };
    tracing::debug!(%location, ?config, "database opened");

    let repos = CoreFactory::build_repos(pool, Arc::new(config.cache()));
    Ok(CliContext {
        questions: QuestionService::new(repos.clone()),
        repos,
        location,
        cancel,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_flags() {
        let config = CliConfig::from_cli(Some(""), Some(10), Some(30));
        assert_eq!(
            config,
            CliConfig {
                database_url: None,
                cache_capacity: Some(10),
                cache_ttl: Some(Duration::from_secs(30)),
            }
        );
    }

    #[tokio::test]
    async fn test_bootstrap_with_url() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("cli.db").display());
        let config = CliConfig::from_cli(Some(&url), None, None);

        let ctx = bootstrap(config, CancellationToken::new()).await.unwrap();
        assert_eq!(ctx.location, url);
        assert!(dir.path().join("cli.db").exists());
    }
}
