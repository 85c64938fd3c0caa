pub mod config;
pub mod handle;
pub mod mapper;

pub use config::MapperConfig;
pub use handle::MapperHandle;
pub use mapper::EntityMapper;
