use std::env;

#[derive(Clone, Debug)]
pub struct Config {
    pub stockfish_path: String,
    pub engine_threads: u32,
    pub engine_hash_mb: u32,
    pub host: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            stockfish_path: env::var("STOCKFISH_PATH").unwrap_or_else(|_| "stockfish".to_string()),
            engine_threads: env::var("ENGINE_THREADS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1),
            engine_hash_mb: env::var("ENGINE_HASH_MB")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(256),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8000),
        }
    }
}
