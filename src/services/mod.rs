pub mod cleaner;
pub mod scanner;
pub mod version_check;

pub use cleaner::Cleaner;
pub use scanner::Scanner;
pub use version_check::VersionChecker;
