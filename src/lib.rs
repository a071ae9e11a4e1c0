pub mod audit;
pub mod conversation;
pub mod device;
pub mod dsl;
pub mod engine;
pub mod error;
pub mod observer;
pub mod paths;
pub mod registry;
pub mod response;
pub mod routine;
pub mod settings;
pub mod state;
pub mod storage;
pub mod util;

pub use conversation::{Assistant, TurnOutcome};
pub use engine::Engine;
pub use response::CommandResponse;
