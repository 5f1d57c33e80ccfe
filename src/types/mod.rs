//! 连接参数与确认结果类型

pub mod connection_config;
pub mod acknowledgement;
pub mod mongo_builder;

pub use connection_config::{ConnectionSettings, UriScheme, DEFAULT_APP_NAME};
pub use acknowledgement::{InsertAck, UpdateAck};
pub use mongo_builder::MongoUriBuilder;
