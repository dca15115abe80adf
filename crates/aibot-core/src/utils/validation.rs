//! Length limits enforced at the repository boundary.
//!
//! Lengths are counted in characters, not bytes.

use crate::ports::RepositoryError;

pub const USER_EMAIL_MAX_LENGTH: usize = 254;
pub const USER_NAME_MAX_LENGTH: usize = 32;
/// Bcrypt hashes have a fixed length.
pub const USER_BCRYPT_LENGTH: usize = 60;
pub const QUESTION_TITLE_MAX_LENGTH: usize = 128;
pub const TAG_NAME_MAX_LENGTH: usize = 32;
pub const FAVORITE_NAME_MAX_LENGTH: usize = 64;

fn char_len(s: &str) -> usize {
    s.chars().count()
}

pub fn check_user_email(email: &str) -> Result<(), RepositoryError> {
    let actual = char_len(email);
    if actual > USER_EMAIL_MAX_LENGTH {
        return Err(RepositoryError::UserEmailTooLong {
            actual,
            max: USER_EMAIL_MAX_LENGTH,
        });
    }
    Ok(())
}

pub fn check_user_name(name: &str) -> Result<(), RepositoryError> {
    let actual = char_len(name);
    if actual > USER_NAME_MAX_LENGTH {
        return Err(RepositoryError::UserNameTooLong {
            actual,
            max: USER_NAME_MAX_LENGTH,
        });
    }
    Ok(())
}

pub fn check_user_bcrypt(bcrypt: &str) -> Result<(), RepositoryError> {
    let actual = char_len(bcrypt);
    if actual != USER_BCRYPT_LENGTH {
        return Err(RepositoryError::UserBcryptLength {
            actual,
            required: USER_BCRYPT_LENGTH,
        });
    }
    Ok(())
}

pub fn check_question_title(title: &str) -> Result<(), RepositoryError> {
    let actual = char_len(title);
    if actual > QUESTION_TITLE_MAX_LENGTH {
        return Err(RepositoryError::QuestionTitleTooLong {
            actual,
            max: QUESTION_TITLE_MAX_LENGTH,
        });
    }
    Ok(())
}

pub fn check_tag_name(name: &str) -> Result<(), RepositoryError> {
    let actual = char_len(name);
    if actual > TAG_NAME_MAX_LENGTH {
        return Err(RepositoryError::TagNameTooLong {
            actual,
            max: TAG_NAME_MAX_LENGTH,
        });
    }
    Ok(())
}

pub fn check_favorite_name(name: &str) -> Result<(), RepositoryError> {
    let actual = char_len(name);
    if actual > FAVORITE_NAME_MAX_LENGTH {
        return Err(RepositoryError::FavoriteNameTooLong {
            actual,
            max: FAVORITE_NAME_MAX_LENGTH,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_at_limit_is_accepted() {
        assert!(check_user_name(&"a".repeat(USER_NAME_MAX_LENGTH)).is_ok());
        assert_eq!(
            check_user_name(&"a".repeat(USER_NAME_MAX_LENGTH + 1)),
            Err(RepositoryError::UserNameTooLong {
                actual: USER_NAME_MAX_LENGTH + 1,
                max: USER_NAME_MAX_LENGTH,
            })
        );
    }

    #[test]
    fn lengths_count_characters_not_bytes() {
        // 32 three-byte characters
        let name = "名".repeat(USER_NAME_MAX_LENGTH);
        assert!(name.len() > USER_NAME_MAX_LENGTH);
        assert!(check_user_name(&name).is_ok());
    }

    #[test]
    fn bcrypt_must_match_exactly() {
        assert!(check_user_bcrypt(&"x".repeat(60)).is_ok());
        assert!(matches!(
            check_user_bcrypt(&"x".repeat(59)),
            Err(RepositoryError::UserBcryptLength { actual: 59, .. })
        ));
        assert!(matches!(
            check_user_bcrypt(&"x".repeat(61)),
            Err(RepositoryError::UserBcryptLength { actual: 61, .. })
        ));
    }

    #[test]
    fn remaining_limits() {
        assert!(check_user_email(&"e".repeat(255)).is_err());
        assert!(check_question_title(&"t".repeat(129)).is_err());
        assert!(check_tag_name(&"t".repeat(33)).is_err());
        assert!(check_favorite_name(&"f".repeat(65)).is_err());
        assert!(check_favorite_name("").is_ok());
    }
}
