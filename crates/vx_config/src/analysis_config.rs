// crates/vx_config/src/analysis_config.rs

//! AnalysisConfig - 分析管线配置
//!
//! 包含求解器路径、几何容差、部件命名、批处理目录与参数覆盖。
//! 所有数值使用 f64 存储以便 JSON 序列化；几何相关项在构造
//! [`Tolerance`] 时收拢为一个注入值。

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use vx_foundation::tolerance::{
    Tolerance, DEFAULT_CROSS_PART_DISTANCE_REL, DEFAULT_EPS_REL, DEFAULT_NORMAL_ANGLE_DEG,
};

use crate::error::ConfigError;

fn default_eps_rel() -> f64 {
    DEFAULT_EPS_REL
}

fn default_normal_angle_deg() -> f64 {
    DEFAULT_NORMAL_ANGLE_DEG
}

fn default_cross_part_distance_rel() -> f64 {
    DEFAULT_CROSS_PART_DISTANCE_REL
}

fn default_reference_part_name() -> String {
    "RUBBER_OBJ".to_string()
}

fn default_indenter_part_name() -> String {
    "KEYCAP".to_string()
}

fn default_indenter_ref_z() -> f64 {
    2.65
}

fn default_grace_timeout_secs() -> f64 {
    5.0
}

fn default_template_path() -> PathBuf {
    PathBuf::from("template.feb")
}

fn default_input_dir() -> PathBuf {
    PathBuf::from("input")
}

fn default_temp_dir() -> PathBuf {
    PathBuf::from("temp")
}

fn default_results_dir() -> PathBuf {
    PathBuf::from("results")
}

/// 分析管线配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// 主求解器可执行文件路径
    #[serde(default)]
    pub febio_path: Option<PathBuf>,

    /// 备用求解器路径（dll-not-found 时重试一次）
    #[serde(default)]
    pub febio_fallback_path: Option<PathBuf>,

    /// 坐标比较相对容差
    #[serde(default = "default_eps_rel")]
    pub tolerance_eps_rel: f64,

    /// 法向分类角度阈值（度）
    #[serde(default = "default_normal_angle_deg")]
    pub normal_angle_deg: f64,

    /// 跨部件邻近距离（包围盒最大边长的比例）
    #[serde(default = "default_cross_part_distance_rel")]
    pub cross_part_distance_rel: f64,

    /// 对齐与置换的目标部件
    #[serde(default = "default_reference_part_name")]
    pub reference_part_name: String,

    /// 网格文件 `part` 单元数组整数 id 到模板部件名的映射（下标即 id）
    ///
    /// 留空表示单部件网格，整个网格归属 `reference_part_name`。
    #[serde(default)]
    pub part_names: Vec<String>,

    /// 刚性压头部件名
    #[serde(default = "default_indenter_part_name")]
    pub indenter_part_name: String,

    /// 模板编写时压头对应的参考 z 高度
    #[serde(default = "default_indenter_ref_z")]
    pub indenter_ref_z: f64,

    /// 覆盖压头行程（取绝对值后按 -z 方向施加）
    #[serde(default)]
    pub total_stroke: Option<f64>,

    /// 覆盖时间步数
    #[serde(default)]
    pub time_steps: Option<u32>,

    /// 取消后强制终止前的宽限时间（秒）
    #[serde(default = "default_grace_timeout_secs")]
    pub grace_timeout_secs: f64,

    /// FEA 模板文档路径
    #[serde(default = "default_template_path")]
    pub template_path: PathBuf,

    /// 网格输入目录
    #[serde(default = "default_input_dir")]
    pub input_dir: PathBuf,

    /// 中间产物目录（准备好的文档、求解器日志）
    #[serde(default = "default_temp_dir")]
    pub temp_dir: PathBuf,

    /// 结果目录（CSV、图像）
    #[serde(default = "default_results_dir")]
    pub results_dir: PathBuf,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            febio_path: None,
            febio_fallback_path: None,
            tolerance_eps_rel: default_eps_rel(),
            normal_angle_deg: default_normal_angle_deg(),
            cross_part_distance_rel: default_cross_part_distance_rel(),
            reference_part_name: default_reference_part_name(),
            part_names: Vec::new(),
            indenter_part_name: default_indenter_part_name(),
            indenter_ref_z: default_indenter_ref_z(),
            total_stroke: None,
            time_steps: None,
            grace_timeout_secs: default_grace_timeout_secs(),
            template_path: default_template_path(),
            input_dir: default_input_dir(),
            temp_dir: default_temp_dir(),
            results_dir: default_results_dir(),
        }
    }
}

impl AnalysisConfig {
    /// 从 JSON 文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;

        let config: AnalysisConfig =
            serde_json::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tolerance_eps_rel <= 0.0 {
            return Err(ConfigError::InvalidValue {
                key: "tolerance_eps_rel".to_string(),
                value: self.tolerance_eps_rel.to_string(),
                reason: "必须为正".to_string(),
            });
        }

        if self.normal_angle_deg <= 0.0 || self.normal_angle_deg >= 90.0 {
            return Err(ConfigError::InvalidValue {
                key: "normal_angle_deg".to_string(),
                value: self.normal_angle_deg.to_string(),
                reason: "必须在 (0, 90) 范围内".to_string(),
            });
        }

        if self.cross_part_distance_rel <= 0.0 {
            return Err(ConfigError::InvalidValue {
                key: "cross_part_distance_rel".to_string(),
                value: self.cross_part_distance_rel.to_string(),
                reason: "必须为正".to_string(),
            });
        }

        if self.reference_part_name.is_empty() {
            return Err(ConfigError::Missing("reference_part_name".to_string()));
        }

        if !self.part_names.is_empty()
            && !self
                .part_names
                .iter()
                .any(|n| n == &self.reference_part_name)
        {
            return Err(ConfigError::InvalidValue {
                key: "part_names".to_string(),
                value: format!("{:?}", self.part_names),
                reason: format!("必须包含 reference_part_name '{}'", self.reference_part_name),
            });
        }

        if self.grace_timeout_secs < 0.0 {
            return Err(ConfigError::InvalidValue {
                key: "grace_timeout_secs".to_string(),
                value: self.grace_timeout_secs.to_string(),
                reason: "不能为负".to_string(),
            });
        }

        Ok(())
    }

    /// 保存配置到文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content =
            serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))?;
        std::fs::write(path, content).map_err(ConfigError::Io)?;
        Ok(())
    }

    /// 收拢几何容差项
    pub fn tolerance(&self) -> Tolerance {
        Tolerance::new(
            self.tolerance_eps_rel,
            self.normal_angle_deg,
            self.cross_part_distance_rel,
        )
    }

    /// 网格部件 id 对应的模板部件名
    ///
    /// 映射表为空时，id 0 归属 `reference_part_name`。
    pub fn part_name_for_id(&self, id: usize) -> Option<&str> {
        if self.part_names.is_empty() {
            (id == 0).then_some(self.reference_part_name.as_str())
        } else {
            self.part_names.get(id).map(String::as_str)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AnalysisConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.reference_part_name, "RUBBER_OBJ");
        assert_eq!(config.part_name_for_id(0), Some("RUBBER_OBJ"));
        assert_eq!(config.part_name_for_id(1), None);
    }

    #[test]
    fn test_invalid_angle() {
        let mut config = AnalysisConfig::default();
        config.normal_angle_deg = 120.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_part_names_must_contain_reference() {
        let mut config = AnalysisConfig::default();
        config.part_names = vec!["KEYCAP".to_string()];
        assert!(config.validate().is_err());

        config.part_names = vec!["RUBBER_OBJ".to_string(), "KEYCAP".to_string()];
        assert!(config.validate().is_ok());
        assert_eq!(config.part_name_for_id(1), Some("KEYCAP"));
    }

    #[test]
    fn test_serialize_deserialize() {
        let config = AnalysisConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: AnalysisConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.reference_part_name, config.reference_part_name);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{ "febio_path": "solver/febio4", "time_steps": 40 }"#;
        let config: AnalysisConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.time_steps, Some(40));
        assert!((config.tolerance_eps_rel - 1e-6).abs() < 1e-18);
        assert_eq!(config.temp_dir, PathBuf::from("temp"));
    }
}
