use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumIter, EnumMessage, IntoEnumIterator};

/// Histogram bucket layout used for histograms and timers
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, EnumIter, AsRefStr, EnumMessage,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum HistogramFlavor {
    #[default]
    #[strum(message = "Classic Prometheus default buckets (5ms .. 10s)")]
    Prometheus,
    #[strum(message = "Exponential buckets doubling from 1ms, 16 buckets")]
    Exponential,
}

impl std::fmt::Display for HistogramFlavor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Prometheus => write!(f, "prometheus"),
            Self::Exponential => write!(f, "exponential"),
        }
    }
}

impl std::str::FromStr for HistogramFlavor {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "prometheus" => Ok(Self::Prometheus),
            "exponential" => Ok(Self::Exponential),
            _ => {
                let valid: Vec<String> = Self::iter().map(|v| v.as_ref().to_owned()).collect();
                Err(format!(
                    "Invalid histogram flavor: '{}'. Valid: {}",
                    s,
                    valid.join(", ")
                ))
            }
        }
    }
}

/// 静态配置（从 TOML 加载，启动时使用，之后不可变）
///
/// - server: 监听地址、端口、worker 数量
/// - logging: 日志配置
/// - management: 导出开关、Prometheus 属性、端点暴露
/// - exposition: 抓取输出的全局过滤规则
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StaticConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub management: ManagementConfig,
    #[serde(default)]
    pub exposition: ExpositionConfig,
}

impl StaticConfig {
    /// 从 TOML 文件和环境变量加载配置
    ///
    /// 优先级：ENV > 配置文件 > 默认值
    /// ENV 前缀：PROMGATE，分隔符：__
    /// 示例：PROMGATE__SERVER__PORT=9100
    ///
    /// 加载失败时打印错误并回退到默认值。
    pub fn load(path: &str) -> Self {
        match Self::try_load(path, None) {
            Ok(config) => {
                if std::path::Path::new(path).exists() {
                    eprintln!("[INFO] Configuration loaded from: {}", path);
                }
                config
            }
            Err(e) => {
                eprintln!("[ERROR] Failed to load config: {}", e);
                Self::default()
            }
        }
    }

    /// Load configuration, surfacing errors instead of falling back.
    ///
    /// `env` replaces the process environment as the override source when given.
    pub fn try_load(
        path: &str,
        env: Option<config::Map<String, String>>,
    ) -> crate::errors::Result<Self> {
        use config::{Config, Environment, File};

        let mut environment = Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .try_parsing(true)
            .list_separator(",");
        for key in LIST_KEYS {
            environment = environment.with_list_parse_key(key);
        }
        if env.is_some() {
            environment = environment.source(env);
        }

        let settings = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(environment)
            .build()?;

        Ok(settings.try_deserialize::<StaticConfig>()?)
    }

    /// 生成示例 TOML 配置文件
    pub fn generate_sample_config() -> String {
        let sample_config = Self::default();
        toml::to_string_pretty(&sample_config)
            .unwrap_or_else(|e| format!("Error generating sample config: {}", e))
    }

    /// 保存配置到 TOML 文件
    pub fn save_to_file<P: AsRef<std::path::Path>>(
        &self,
        path: P,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;

        if let Some(parent) = path.as_ref().parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }
}

/// 环境变量前缀
pub const ENV_PREFIX: &str = "PROMGATE";

/// Keys whose environment values are split on `,` into lists
const LIST_KEYS: [&str; 6] = [
    "management.endpoints.exposure.include",
    "management.endpoints.exposure.exclude",
    "exposition.filter.metric_name_must_be_equal_to",
    "exposition.filter.metric_name_must_not_be_equal_to",
    "exposition.filter.metric_name_must_start_with",
    "exposition.filter.metric_name_must_not_start_with",
];

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
    #[serde(default = "default_workers")]
    pub workers: usize,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default = "default_max_backups")]
    pub max_backups: u32,
    #[serde(default = "default_enable_rotation")]
    pub enable_rotation: bool,
}

/// Management section: export switches and endpoint exposure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ManagementConfig {
    #[serde(default)]
    pub defaults: ExportDefaults,
    #[serde(default)]
    pub prometheus: PrometheusProperties,
    #[serde(default)]
    pub endpoints: EndpointsConfig,
}

impl ManagementConfig {
    /// Exporter flag when set, otherwise the global export default.
    pub fn prometheus_export_enabled(&self) -> bool {
        self.prometheus
            .enabled
            .unwrap_or(self.defaults.metrics_export_enabled)
    }
}

/// Defaults shared by every metrics exporter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportDefaults {
    #[serde(default = "default_true")]
    pub metrics_export_enabled: bool,
}

/// User-supplied Prometheus exporter properties
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrometheusProperties {
    /// Exporter-specific switch; unset defers to `management.defaults`
    #[serde(default)]
    pub enabled: Option<bool>,
    /// Step interval, e.g. "30s", "1m", "1m30s"
    #[serde(default = "default_step")]
    pub step: String,
    #[serde(default = "default_true")]
    pub descriptions: bool,
    #[serde(default)]
    pub histogram_flavor: HistogramFlavor,
    /// Namespace prepended to every meter name
    #[serde(default)]
    pub prefix: Option<String>,
    #[serde(default = "default_true")]
    pub process_metrics: bool,
}

/// Scrape endpoint availability and routing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointsConfig {
    #[serde(default = "default_true")]
    pub enabled_by_default: bool,
    /// Endpoint-specific switch; unset defers to `enabled_by_default`
    #[serde(default)]
    pub prometheus_enabled: Option<bool>,
    #[serde(default = "default_base_path")]
    pub base_path: String,
    #[serde(default = "default_prometheus_path")]
    pub prometheus_path: String,
    #[serde(default)]
    pub exposure: ExposureConfig,
}

impl EndpointsConfig {
    /// Full route of the scrape endpoint, always starting with `/`
    pub fn scrape_path(&self) -> String {
        let base = self.base_path.trim_end_matches('/');
        let leaf = self.prometheus_path.trim_matches('/');
        let joined = if leaf.is_empty() {
            base.to_string()
        } else {
            format!("{}/{}", base, leaf)
        };
        if joined.starts_with('/') {
            joined
        } else {
            format!("/{}", joined)
        }
    }
}

/// Which endpoints are exposed over HTTP
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExposureConfig {
    #[serde(default = "default_exposure_include")]
    pub include: Vec<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
}

impl ExposureConfig {
    pub fn is_exposed(&self, endpoint_id: &str) -> bool {
        let matches = |list: &[String]| list.iter().any(|id| id == "*" || id == endpoint_id);
        matches(&self.include) && !matches(&self.exclude)
    }
}

/// Global exposition settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ExpositionConfig {
    #[serde(default)]
    pub filter: MetricNameFilterConfig,
}

/// Metric name filter applied to every scrape; empty lists impose nothing
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct MetricNameFilterConfig {
    #[serde(default)]
    pub metric_name_must_be_equal_to: Vec<String>,
    #[serde(default)]
    pub metric_name_must_not_be_equal_to: Vec<String>,
    #[serde(default)]
    pub metric_name_must_start_with: Vec<String>,
    #[serde(default)]
    pub metric_name_must_not_start_with: Vec<String>,
}

// ============================================================
// Default value functions
// ============================================================

fn default_true() -> bool {
    true
}

fn default_server_host() -> String {
    "127.0.0.1".to_string()
}

fn default_server_port() -> u16 {
    9464
}

fn default_workers() -> usize {
    num_cpus::get()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_max_backups() -> u32 {
    5
}

fn default_enable_rotation() -> bool {
    true
}

fn default_step() -> String {
    "1m".to_string()
}

fn default_base_path() -> String {
    "/actuator".to_string()
}

fn default_prometheus_path() -> String {
    "prometheus".to_string()
}

fn default_exposure_include() -> Vec<String> {
    vec!["prometheus".to_string()]
}

// ============================================================
// Default implementations
// ============================================================

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            workers: default_workers(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
            max_backups: default_max_backups(),
            enable_rotation: default_enable_rotation(),
        }
    }
}

impl Default for ExportDefaults {
    fn default() -> Self {
        Self {
            metrics_export_enabled: true,
        }
    }
}

impl Default for PrometheusProperties {
    fn default() -> Self {
        Self {
            enabled: None,
            step: default_step(),
            descriptions: true,
            histogram_flavor: HistogramFlavor::default(),
            prefix: None,
            process_metrics: true,
        }
    }
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            enabled_by_default: true,
            prometheus_enabled: None,
            base_path: default_base_path(),
            prometheus_path: default_prometheus_path(),
            exposure: ExposureConfig::default(),
        }
    }
}

impl Default for ExposureConfig {
    fn default() -> Self {
        Self {
            include: default_exposure_include(),
            exclude: Vec::new(),
        }
    }
}
