pub mod profile;
pub mod session;

pub use profile::ProfileStore;
pub use session::SessionManager;
