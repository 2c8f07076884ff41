pub mod card_store;
pub mod deck;
pub mod flashcard;
pub mod session;
pub mod sm2;

pub use card_store::CardStore;
pub use deck::Deck;
pub use flashcard::Flashcard;
pub use session::{SessionState, StudyScope, StudySession};
pub use sm2::Grade;
