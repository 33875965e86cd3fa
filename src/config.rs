// ABOUTME: Small constants shared between the CLI and the rest of the crate

pub const VERSION: &str = "1.0.0";
