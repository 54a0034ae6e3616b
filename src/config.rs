use crate::error::{AppError, Result};
use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

#[derive(Clone)]
pub struct Config {
    pub server_addr: SocketAddr,
    pub supabase_url: String,
    pub supabase_secret_key: String,
}

impl Config {
    pub fn load() -> Result<Self> {
        // Load environment variables from .env file if it exists
        dotenv::dotenv().ok();

        // Storage credentials are required
        let supabase_url = env::var("SUPABASE_URL")?;
        let supabase_secret_key = env::var("SUPABASE_SECRET_KEY")?;

        // Load server configuration with defaults
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("PORT").unwrap_or_else(|_| "5050".to_string());
        let port = port
            .parse::<u16>()
            .map_err(|e| AppError::Config(format!("Invalid port: {}", e)))?;
        let ip = IpAddr::from_str(&host)
            .map_err(|e| AppError::Config(format!("Invalid host address: {}", e)))?;

        let server_addr = SocketAddr::new(ip, port);

        Ok(Config {
            server_addr,
            supabase_url,
            supabase_secret_key,
        })
    }
}
