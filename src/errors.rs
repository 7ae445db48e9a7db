use std::fmt;

#[derive(Debug, Clone)]
pub enum PromgateError {
    Config(String),
    Validation(String),
    Registration(String),
    MeterConflict(String),
    Encoding(String),
    BeanAlreadyRegistered(String),
    Server(String),
}

impl PromgateError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            PromgateError::Config(_) => "E001",
            PromgateError::Validation(_) => "E002",
            PromgateError::Registration(_) => "E003",
            PromgateError::MeterConflict(_) => "E004",
            PromgateError::Encoding(_) => "E005",
            PromgateError::BeanAlreadyRegistered(_) => "E006",
            PromgateError::Server(_) => "E007",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            PromgateError::Config(_) => "Configuration Error",
            PromgateError::Validation(_) => "Validation Error",
            PromgateError::Registration(_) => "Metric Registration Error",
            PromgateError::MeterConflict(_) => "Meter Conflict",
            PromgateError::Encoding(_) => "Exposition Encoding Error",
            PromgateError::BeanAlreadyRegistered(_) => "Bean Already Registered",
            PromgateError::Server(_) => "Server Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            PromgateError::Config(msg) => msg,
            PromgateError::Validation(msg) => msg,
            PromgateError::Registration(msg) => msg,
            PromgateError::MeterConflict(msg) => msg,
            PromgateError::Encoding(msg) => msg,
            PromgateError::BeanAlreadyRegistered(msg) => msg,
            PromgateError::Server(msg) => msg,
        }
    }

    /// 格式化为彩色输出（用于启动失败时的终端输出）
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for PromgateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for PromgateError {}

// 便捷的构造函数
impl PromgateError {
    pub fn config<T: Into<String>>(msg: T) -> Self {
        PromgateError::Config(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        PromgateError::Validation(msg.into())
    }

    pub fn registration<T: Into<String>>(msg: T) -> Self {
        PromgateError::Registration(msg.into())
    }

    pub fn meter_conflict<T: Into<String>>(msg: T) -> Self {
        PromgateError::MeterConflict(msg.into())
    }

    pub fn encoding<T: Into<String>>(msg: T) -> Self {
        PromgateError::Encoding(msg.into())
    }

    pub fn bean_already_registered<T: Into<String>>(msg: T) -> Self {
        PromgateError::BeanAlreadyRegistered(msg.into())
    }

    pub fn server<T: Into<String>>(msg: T) -> Self {
        PromgateError::Server(msg.into())
    }
}

#[cfg(feature = "metrics")]
impl From<prometheus::Error> for PromgateError {
    fn from(err: prometheus::Error) -> Self {
        match err {
            prometheus::Error::AlreadyReg => {
                PromgateError::Registration("collector already registered".to_string())
            }
            prometheus::Error::InconsistentCardinality { expect, got } => {
                PromgateError::Validation(format!(
                    "inconsistent label cardinality: expected {}, got {}",
                    expect, got
                ))
            }
            other => PromgateError::Registration(other.to_string()),
        }
    }
}

impl From<std::io::Error> for PromgateError {
    fn from(err: std::io::Error) -> Self {
        PromgateError::Server(err.to_string())
    }
}

impl From<config::ConfigError> for PromgateError {
    fn from(err: config::ConfigError) -> Self {
        PromgateError::Config(err.to_string())
    }
}

impl From<std::string::FromUtf8Error> for PromgateError {
    fn from(err: std::string::FromUtf8Error) -> Self {
        PromgateError::Encoding(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PromgateError>;

/// 启动失败时的终端输出：链中有 `PromgateError` 时使用彩色格式
pub fn format_startup_error(err: &anyhow::Error) -> String {
    match err
        .chain()
        .find_map(|cause| cause.downcast_ref::<PromgateError>())
    {
        Some(promgate_err) => format!("{}
  ({})", promgate_err.format_colored(), err),
        None => format!("{:#}", err),
    }
}
