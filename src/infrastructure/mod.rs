//! 基础设施层
//!
//! 提供具体的技术实现，包括：
//! - 依赖注入容器
//! - 窗口工厂
//! - 日志与设置协作者

pub mod container;
pub mod factory;
pub mod logger;
pub mod settings;

pub use container::{CapabilityKey, Container, ContainerStats, Key, Lifetime, ResolveError};
pub use factory::{FactoryError, WindowFactory};
