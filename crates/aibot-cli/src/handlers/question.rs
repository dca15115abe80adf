//! Question command handlers.

use aibot_core::RepositoryError;

use crate::bootstrap::CliContext;
use crate::commands::QuestionCommand;
use crate::error::CliError;

pub async fn execute(ctx: &CliContext, command: QuestionCommand) -> Result<(), CliError> {
    match command {
        QuestionCommand::Show { qid, viewer } => {
            let view = ctx
                .questions
                .question_information(ctx.cancel(), qid, viewer)
                .await?
                .ok_or(RepositoryError::QuestionNotExist(qid))?;
            println!("{}", serde_json::to_string_pretty(&view)?);
        }
    }
    Ok(())
}
