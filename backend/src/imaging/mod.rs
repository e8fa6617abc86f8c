pub mod data_uri;
pub mod resolver;
pub mod upload;
