use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub maintenance: MaintenanceConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// 存储后端
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub backend: StoreBackend,
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaintenanceConfig {
    /// 单批写操作上限, 取值 1..=500
    pub max_batch_size: usize,
    /// true: 存储不可用时清理接口报错; false: 记录日志后跳过
    pub strict_availability: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            database: DatabaseConfig {
                backend: StoreBackend::Postgres,
                url: "postgres://localhost/order_reconcile".to_string(),
                max_connections: 20,
                acquire_timeout_secs: 10,
            },
            maintenance: MaintenanceConfig {
                max_batch_size: crate::service::MAX_BATCH_SIZE,
                strict_availability: false,
            },
        }
    }
}

impl AppConfig {
    /// 加载顺序 (后者覆盖前者): 默认值 -> config/app.{toml,yaml,json} -> APP__* 环境变量 -> DATABASE_URL / SERVER_HOST / SERVER_PORT
    pub fn load() -> Result<Self, ConfigError> {
        let defaults = Config::try_from(&AppConfig::default())?;

        let settings = Config::builder()
            .add_source(defaults)
            .add_source(File::with_name("config/app").required(false))
            .add_source(Environment::with_prefix("APP").prefix_separator("__").separator("__"))
            .set_override_option("database.url", std::env::var("DATABASE_URL").ok())?
            .set_override_option("server.host", std::env::var("SERVER_HOST").ok())?
            .set_override_option("server.port", std::env::var("SERVER_PORT").ok())?
            .build()?;

        let mut config: AppConfig = settings.try_deserialize()?;
        config.normalize();
        Ok(config)
    }

    fn normalize(&mut self) {
        let requested = self.maintenance.max_batch_size;
        let clamped = requested.clamp(1, 500);
        if clamped != requested {
            tracing::warn!("maintenance.max_batch_size {} out of range, using {}", requested, clamped);
            self.maintenance.max_batch_size = clamped;
        }
    }
}
