pub mod apis;
pub mod arguments;
pub mod config; // TOML configuration with embedded defaults
pub mod engines; // Adrenaline + trending refresh loops
pub mod errors;
pub mod events; // Topic broadcast + retained snapshots
pub mod logger;
pub mod paths;
pub mod screener; // Bucket classifier and trending scorer
pub mod shutdown;
pub mod tokens;
