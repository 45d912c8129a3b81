pub mod board_source;
pub mod engine;
pub mod session;

pub use board_source::{BoardSource, FenBoardSource, ScriptedBoardSource};
pub use engine::{DecisionSource, UciEngine};
pub use session::GameSession;
