pub mod daemon;
pub mod health;
pub mod init;
pub mod keygen;
pub mod preview;
pub mod version;

pub use daemon::Daemon;
pub use health::Health;
pub use init::Init;
pub use keygen::Keygen;
pub use preview::Preview;
pub use version::Version;
