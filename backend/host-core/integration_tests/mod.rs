mod helpers;
mod lifecycle;
mod readiness;
mod server;
