mod answers;
mod catalog;
mod export;
mod field;
mod notice;
mod selection;
mod session;

pub use answers::Answers;
pub use catalog::{Catalog, ChoiceOption, FieldSpec};
pub use export::{CompletionAnswers, CompletionRecord};
pub use field::{ActionKind, FieldKey, FieldKind};
pub use notice::Notice;
pub use selection::Selection;
pub use session::Session;
