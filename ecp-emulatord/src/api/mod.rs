pub mod guard;
pub mod routes;

pub use guard::RequestGuard;
pub use routes::{router, AppState};
