//! Init command handler.
//!
//! Bootstrap already creates any missing tables, so this only reports
//! where the database lives.

use crate::bootstrap::CliContext;
use crate::error::CliError;

pub fn execute(ctx: &CliContext) -> Result<(), CliError> {
    println!("Database ready at {}", ctx.location);
    Ok(())
}
