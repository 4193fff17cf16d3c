mod compare;
mod init;
mod watch;

pub use self::compare::compare;
pub use self::init::init;
pub use self::watch::watch;
