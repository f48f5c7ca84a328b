pub mod clean;
pub mod info;
pub mod list;
pub mod managers;
pub mod outdated;
pub mod selection;
pub mod upgrade;
pub mod watch;
