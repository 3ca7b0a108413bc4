pub mod error;
pub mod geo;
pub mod lifecycle;
pub mod matcher;
pub mod ports;
pub mod validator;
