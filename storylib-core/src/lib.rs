pub mod backup;
pub mod errors;
pub mod locale;
pub mod locker;
pub mod paths;
pub mod permissions;
pub mod shell;
pub mod story;

pub use backup::*;
pub use errors::*;
pub use locale::{DefaultLocale, Localizer, TableLocale};
pub use locker::*;
pub use paths::*;
pub use permissions::{platform_toggle, OwnerWriteBit, PerFileMode, PermissionToggle};
pub use shell::*;
pub use story::*;
