//! Page-local widget runtime: loader, chrome renderer, toggle state machine
//! and session frame controller, written against an abstract host document.

pub mod document;
pub mod frame;
pub mod instance;
pub mod loader;
pub mod renderer;
pub mod state;
pub mod timer;

pub use document::{HostDocument, MemoryDocument, NodeId};
pub use instance::WidgetInstance;
pub use loader::{InitOutcome, WidgetRuntime};
pub use state::ToggleState;
