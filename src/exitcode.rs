//! Process exit codes
//!
//! BSD sysexits.h values, plus `PARTIAL` for a cascade that finished with
//! some nodes left behind.

pub const OK: i32 = 0;

/// Cascade finished, but some nodes could not be updated
pub const PARTIAL: i32 = 3;

/// Bad arguments (e.g. unknown parent for `add`)
pub const USAGE: i32 = 64;

/// Parent change would create a cycle, or a stored loop was found
pub const DATAERR: i32 = 65;

/// Unknown node
pub const NOINPUT: i32 = 66;

/// Node store unreachable, or every node of a cascade failed
pub const UNAVAILABLE: i32 = 69;

pub const SOFTWARE: i32 = 70;

/// Filesystem error outside the node store
pub const IOERR: i32 = 74;

/// Invalid settings
pub const CONFIG: i32 = 78;
