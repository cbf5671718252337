use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub seats_per_room: usize,
    pub entry_points: i32,
    pub round_minutes: i64,
    pub play_notice_delay_ms: u64,
    pub connection_timeout_seconds: u64,
}

impl Config {
    pub fn new() -> Self {
        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .expect("Invalid PORT"),
            seats_per_room: env::var("SEATS_PER_ROOM")
                .unwrap_or_else(|_| "4".to_string())
                .parse()
                .expect("Invalid SEATS_PER_ROOM"),
            entry_points: env::var("ENTRY_POINTS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .expect("Invalid ENTRY_POINTS"),
            round_minutes: env::var("ROUND_MINUTES")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .expect("Invalid ROUND_MINUTES"),
            play_notice_delay_ms: env::var("PLAY_NOTICE_DELAY_MS")
                .unwrap_or_else(|_| "1000".to_string())
                .parse()
                .expect("Invalid PLAY_NOTICE_DELAY_MS"),
            connection_timeout_seconds: env::var("CONNECTION_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| "300".to_string())
                .parse()
                .expect("Invalid CONNECTION_TIMEOUT_SECONDS"),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
