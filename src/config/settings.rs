#[derive(Debug, Clone)]
pub struct ScoringSettings {
    pub win_threshold: i32,
    pub sweep_total: i32,
    pub small_bonus: i32,
    pub big_bonus: i32,
}

impl Default for ScoringSettings {
    fn default() -> Self {
        Self {
            win_threshold: 1000,
            sweep_total: 200,
            small_bonus: 100,
            big_bonus: 200,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub database_path: String,
    pub admin_code: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            database_path: std::env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "tichu_manager.db".to_string()),
            admin_code: std::env::var("ADMIN_CODE").unwrap_or_else(|_| "admin123".to_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CleanupSettings {
    /// In-progress games older than this many days are marked abandoned.
    pub stale_after_days: i64,
    pub sweep_interval_secs: u64,
}

impl Default for CleanupSettings {
    fn default() -> Self {
        Self {
            stale_after_days: 3,
            sweep_interval_secs: 6 * 60 * 60,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub scoring: ScoringSettings,
    pub server: ServerSettings,
    pub cleanup: CleanupSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self {
            scoring: ScoringSettings::default(),
            server: ServerSettings::default(),
            cleanup: CleanupSettings::default(),
        }
    }
}

// Passed explicitly (dependency injection) rather than held in a global.
