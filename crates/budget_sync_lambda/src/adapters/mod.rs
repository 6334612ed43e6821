pub mod credentials;
pub mod parameter_store;
