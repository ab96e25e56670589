mod config;
mod lifecycle;
mod ports;
mod server;
