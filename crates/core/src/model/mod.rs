mod answer;
mod ids;
mod question;
mod session;

pub use answer::AnswerValue;
pub use ids::{ParseIdError, QuestionId, SessionId};
pub use question::{ChoiceOption, Question, QuestionBody, QuestionType};
pub use session::{
    SessionMode, SessionResult, SessionSnapshot, SessionStatus, SnapshotError,
};
