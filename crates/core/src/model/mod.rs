mod badge;
mod ids;
mod question;
mod session;

pub use badge::{Badge, BadgeSet};
pub use ids::{QuestionId, SessionId};
pub use question::{Question, QuestionDraft, QuestionError};
pub use session::SessionState;
