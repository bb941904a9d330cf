pub mod event;
pub mod machine;
pub mod parser;
pub mod prompt;
pub mod types;

pub use event::{DialogueEvent, DialogueObserver};
pub use machine::DialogueMachine;
pub use parser::parse_response;
pub use types::{DialogueLine, DialogueOption, DialogueState, DialogueTone};
