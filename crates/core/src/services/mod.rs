//! Collaborators that run outside the session's thread: decompilers and the
//! redisplay scheduler that calls them.

pub mod decompiler;
pub mod redisplay;
