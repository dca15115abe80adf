//! `SQLite` implementations of the AIBot repository ports.
//!
//! Every mutation follows the same shape: validate the input, check the
//! state it depends on, then commit a [`repositories::ChangeSet`] and, on a
//! write conflict, check again and retry. Use [`CoreFactory::build_repos`]
//! to obtain the full [`aibot_core::Repos`] set over one pool.

#![deny(unsafe_code)]

pub mod factory;
pub mod repositories;
pub mod setup;

// Re-export factory for convenient access
pub use factory::CoreFactory;

// Re-export TestDb for integration tests
#[cfg(any(test, feature = "test-utils"))]
pub use factory::TestDb;

// Re-export repository implementations
pub use repositories::{
    SqliteAnswerRepository, SqliteCollectRepository, SqliteFavoriteRepository,
    SqliteLikeRepository, SqliteQuestionRepository, SqliteTagRepository, SqliteUserRepository,
};

// Re-export setup functions for convenient access
pub use setup::{setup_database, setup_database_url};
#[cfg(any(test, feature = "test-utils"))]
pub use setup::setup_test_database;

// Linked for the bundled SQLite build only.
use libsqlite3_sys as _;
