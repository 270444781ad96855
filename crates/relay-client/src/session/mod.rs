pub mod event;
pub mod io;
pub mod orchestrator;

pub use event::{Event, EventId, EventMgr, EventRegistry};
pub use io::Connection;
pub use orchestrator::Session;
