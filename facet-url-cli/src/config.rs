use anyhow::{Context, Result};
use facet_url::{CategoryTable, CodecConfig};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// 命令行配置文件（JSON）
#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct CliConfig {
    /// 编解码器配置
    pub codec: CodecConfig,
    /// 分类表，用于生成分类筛选链接
    pub categories: CategoryTable,
}

impl CliConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("无法读取配置文件 {}", path.display()))?;
        let config: CliConfig = serde_json::from_str(&raw)
            .with_context(|| format!("解析配置文件失败 {}", path.display()))?;
        tracing::debug!(
            categories = config.categories.len(),
            root = config.codec.root_category_id,
            "loaded config from {}",
            path.display()
        );
        Ok(config)
    }
}
