//! HTTP services exposed by the server

pub mod services;
