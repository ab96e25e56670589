mod builder;
mod record;
