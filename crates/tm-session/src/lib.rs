pub mod event;
pub mod state;
pub mod projector;
pub mod validator;
pub mod session;

pub use state::*;
pub use event::*;
pub use session::ComparisonSession;
