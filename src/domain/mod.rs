//! 领域层
//!
//! Collaborator contracts the container and the windows are written against.
//! Concrete implementations live in `infrastructure`.

pub mod interfaces;
