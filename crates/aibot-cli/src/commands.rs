//! Subcommand definitions.

use clap::{Subcommand, ValueEnum};

/// Available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Create the database schema if it does not exist yet
    Init,

    /// Manage users
    #[command(subcommand)]
    User(UserCommand),

    /// Inspect questions
    #[command(subcommand)]
    Question(QuestionCommand),

    /// Like a question or answer on behalf of a user
    Like {
        /// What kind of row is liked
        #[arg(value_enum)]
        target: LikeTarget,
        /// Liking user id
        uid: i64,
        /// Question or answer id
        id: i64,
        /// Remove the like instead
        #[arg(long)]
        undo: bool,
    },
}

#[derive(Subcommand)]
pub enum UserCommand {
    /// Register a user
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        /// Pre-computed bcrypt hash (60 characters)
        #[arg(long)]
        bcrypt: String,
        /// Authority level: "user" or "admin"
        #[arg(long, default_value = "user")]
        auth: String,
        /// Profile photo id
        #[arg(long, default_value_t = 0)]
        photo: i64,
    },

    /// Show a user by id, email or name
    Show {
        /// Numeric id, an email (contains '@') or a user name
        identifier: String,
    },

    /// Delete a user
    Delete { uid: i64 },

    /// List the questions a user asked
    Questions {
        uid: i64,
        /// Most recently modified first
        #[arg(long)]
        by_modify_time: bool,
    },
}

#[derive(Subcommand)]
pub enum QuestionCommand {
    /// Print the question view as JSON
    Show {
        qid: i64,
        /// Fill in like/collect flags for this user
        #[arg(long)]
        viewer: Option<i64>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LikeTarget {
    Question,
    Answer,
}
