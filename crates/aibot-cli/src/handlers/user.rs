//! User command handlers.

use aibot_core::{AuthLevel, ListOrder, NewUser, RepositoryError, User};

use crate::bootstrap::CliContext;
use crate::commands::UserCommand;
use crate::error::CliError;

/// How `user show` interprets its argument.
#[derive(Debug, PartialEq, Eq)]
enum Identifier<'a> {
    Id(i64),
    Email(&'a str),
    Name(&'a str),
}

impl<'a> Identifier<'a> {
    fn parse(raw: &'a str) -> Self {
        if let Ok(id) = raw.parse() {
            Self::Id(id)
        } else if raw.contains('@') {
            Self::Email(raw)
        } else {
            Self::Name(raw)
        }
    }
}

pub async fn execute(ctx: &CliContext, command: UserCommand) -> Result<(), CliError> {
    let users = &ctx.repos.users;
    let cancel = ctx.cancel();

    match command {
        UserCommand::Add {
            name,
            email,
            bcrypt,
            auth,
            photo,
        } => {
            let auth = AuthLevel::parse(&auth)
                .filter(|level| level.is_concrete())
                .ok_or_else(|| CliError::Arguments(format!("unknown auth level '{auth}'")))?;
            let user = NewUser::new(email, bcrypt, name, auth, photo);
            let uid = users.insert_user(cancel, &user).await?;
            tracing::debug!(uid, "user added");
            println!("Added user {uid}");
        }
        UserCommand::Show { identifier } => {
            let user = match Identifier::parse(&identifier) {
                Identifier::Id(uid) => users.select_user_by_id(cancel, uid).await?,
                Identifier::Email(email) => users.select_user_by_email(cancel, email).await?,
                Identifier::Name(name) => users.select_user_by_name(cancel, name).await?,
            };
            let user = user
                .ok_or_else(|| CliError::NotFound(format!("no user matches '{identifier}'")))?;
            print_user(&user);
        }
        UserCommand::Delete { uid } => {
            users.delete_user_by_id(cancel, uid).await?;
            println!("Deleted user {uid} (if it existed)");
        }
        UserCommand::Questions {
            uid,
            by_modify_time,
        } => {
            let order = if by_modify_time {
                ListOrder::ModifyTimeDesc
            } else {
                ListOrder::Unspecified
            };
            let questions = users
                .select_questions_id_by_id(cancel, uid, order)
                .await?
                .ok_or(RepositoryError::UserNotExist(uid))?;
            if questions.is_empty() {
                println!("User {uid} has not asked any questions.");
            }
            for qid in questions {
                println!("{qid}");
            }
        }
    }
    Ok(())
}

fn print_user(user: &User) {
    println!("id      = {}", user.user_id);
    println!("name    = {}", user.name);
    println!("email   = {}", user.email);
    println!("auth    = {}", user.auth);
    println!("photo   = {}", user.profile_photo);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_detection() {
        assert_eq!(Identifier::parse("42"), Identifier::Id(42));
        assert_eq!(
            Identifier::parse("ferris@rust.dev"),
            Identifier::Email("ferris@rust.dev")
        );
        assert_eq!(Identifier::parse("ferris"), Identifier::Name("ferris"));
    }
}
