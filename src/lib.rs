// Orbitone - Step patterns driving an orbiting-dots visualization
// Module declarations

pub mod arranger;
pub mod bridge;
pub mod pattern;
pub mod session;
pub mod state;
pub mod timing;
pub mod transport;
pub mod visual;

pub use session::{Session, SessionError, SessionResult};
