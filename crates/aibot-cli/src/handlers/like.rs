//! Like command handler.

use crate::bootstrap::CliContext;
use crate::commands::LikeTarget;
use crate::error::CliError;

/// Add or remove a like, then print the target's new like count.
pub async fn execute(
    ctx: &CliContext,
    target: LikeTarget,
    uid: i64,
    id: i64,
    undo: bool,
) -> Result<(), CliError> {
    let likes = &ctx.repos.likes;
    let cancel = ctx.cancel();

    let count = match (target, undo) {
        (LikeTarget::Question, false) => {
            likes.insert_like_for_question(cancel, uid, id).await?;
            likes.select_likes_count_for_question(cancel, id).await?
        }
        (LikeTarget::Question, true) => {
            likes.delete_like_for_question(cancel, uid, id).await?;
            likes.select_likes_count_for_question(cancel, id).await?
        }
        (LikeTarget::Answer, false) => {
            likes.insert_like_for_answer(cancel, uid, id).await?;
            likes.select_likes_count_for_answer(cancel, id).await?
        }
        (LikeTarget::Answer, true) => {
            likes.delete_like_for_answer(cancel, uid, id).await?;
            likes.select_likes_count_for_answer(cancel, id).await?
        }
    };

    let verb = if undo { "Removed like from" } else { "Liked" };
    let noun = match target {
        LikeTarget::Question => "question",
        LikeTarget::Answer => "answer",
    };
    println!("{verb} {noun} {id}; it now has {count} like(s).");
    Ok(())
}
