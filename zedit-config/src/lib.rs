use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// 指定配置文件路径的环境变量。
pub const CONFIG_ENV: &str = "ZEDIT_CONFIG";

/// 应用配置的根结构。
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub editor: EditorConfig,
    #[serde(default)]
    pub command_line: CommandLineConfig,
}

impl AppConfig {
    /// 从显式路径加载配置。
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// 自动发现配置文件：优先读取环境变量 `ZEDIT_CONFIG`，否则寻找 `./config/default.toml`。
    /// 若文件缺失，则返回默认配置。
    pub fn discover() -> Result<Self, ConfigError> {
        if let Some(path) = env::var_os(CONFIG_ENV) {
            return Self::from_file(PathBuf::from(path));
        }

        let default_path = env::current_dir()
            .map(|dir| dir.join("config").join("default.toml"))
            .map_err(|source| ConfigError::Context {
                message: "获取当前工作目录失败".to_string(),
                source,
            })?;

        if default_path.exists() {
            Self::from_file(default_path)
        } else {
            Ok(Self::default())
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let editor = &self.editor;
        if !(editor.pick_tolerance > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "editor.pick_tolerance 必须大于零，当前为 {}",
                editor.pick_tolerance
            )));
        }
        if !(editor.join_tolerance >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "editor.join_tolerance 不能为负数，当前为 {}",
                editor.join_tolerance
            )));
        }
        if let Some(distance) = editor.default_offset_distance.filter(|d| !(*d > 0.0)) {
            return Err(ConfigError::Invalid(format!(
                "editor.default_offset_distance 必须大于零，当前为 {distance}"
            )));
        }
        Ok(())
    }
}

/// 日志配置，支持设置默认等级。
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_string()
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
        }
    }
}

/// 编辑行为相关的参数。
#[derive(Debug, Clone, Deserialize)]
pub struct EditorConfig {
    /// 拾取实体的距离容差。
    #[serde(default = "EditorConfig::default_pick_tolerance")]
    pub pick_tolerance: f64,
    /// PEDIT 合并时端点视为重合的距离。
    #[serde(default = "EditorConfig::default_join_tolerance")]
    pub join_tolerance: f64,
    /// 撤销历史的最大条数，0 表示不限。
    #[serde(default)]
    pub undo_depth: usize,
    #[serde(default)]
    pub default_offset_distance: Option<f64>,
}

impl EditorConfig {
    fn default_pick_tolerance() -> f64 {
        0.5
    }

    fn default_join_tolerance() -> f64 {
        0.001
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            pick_tolerance: Self::default_pick_tolerance(),
            join_tolerance: Self::default_join_tolerance(),
            undo_depth: 0,
            default_offset_distance: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommandLineConfig {
    /// 脚本回放时是否把读入的每一行回显到控制台。
    #[serde(default)]
    pub echo_input: bool,
    #[serde(default = "CommandLineConfig::default_prompt_suffix")]
    pub prompt_suffix: String,
}

impl CommandLineConfig {
    fn default_prompt_suffix() -> String {
        ": ".to_string()
    }
}

impl Default for CommandLineConfig {
    fn default() -> Self {
        Self {
            echo_input: false,
            prompt_suffix: Self::default_prompt_suffix(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("读取配置文件 {path:?} 失败: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("解析配置文件 {path:?} 失败: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("{message}")]
    Context {
        message: String,
        #[source]
        source: std::io::Error,
    },
    #[error("配置无效: {0}")]
    Invalid(String),
}
