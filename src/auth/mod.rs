//! Authentication: user sessions, password hashing and the admin PSK guard.

mod password;
mod psk;
mod session;

pub use password::*;
pub use psk::*;
pub use session::*;
