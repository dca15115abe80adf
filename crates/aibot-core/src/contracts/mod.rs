//! Transfer records handed to the service/API layer.
//!
//! These are flat values with no behavior. Field names serialize in
//! camelCase; `Option` on a viewer-relative field means "no viewer".

mod question;

pub use question::{AnswerInformation, QuestionInformation, QuestionModifyItems, TagInformation};
