pub mod admin_handlers;
pub mod ai_handlers;
pub mod jobs_handlers;
pub mod system_handlers;

pub use admin_handlers::*;
pub use ai_handlers::*;
pub use jobs_handlers::*;
pub use system_handlers::*;
