use serde::{Deserialize, Serialize};

use crate::error::ParameterError;

/// 分类树根节点 ID，向上查找祖先时遇到即停止
pub const DEFAULT_ROOT_CATEGORY_ID: u64 = 1;

/// 原始 URL 覆盖参数，异步请求用它携带页面的规范地址
pub const DEFAULT_ORIGINAL_URL_PARAMETER: &str = "__tw_original_url";

/// 当前路由（沿用当前请求的路径）
pub const CURRENT_ROUTE: &str = "*/*/*";

/// 筛选模式 - 单选或多选
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum FacetMode {
    #[default]
    Single,
    Multi,
}

/// 分面设置
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct FacetSettings {
    /// URL 中使用的参数名
    pub url_key: String,
    /// 单选 / 多选
    #[serde(default)]
    pub mode: FacetMode,
}

impl FacetSettings {
    pub fn new(url_key: impl Into<String>, mode: FacetMode) -> Self {
        Self {
            url_key: url_key.into(),
            mode,
        }
    }
}

/// 页面上渲染的一个筛选项
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct FilterItem {
    /// 所属分面的设置
    pub facet: FacetSettings,
    /// 筛选项自身的值（属性标题）
    pub value: String,
    /// 所属分面未筛选时的值，空字符串表示移除该参数
    #[serde(default)]
    pub clean_value: String,
}

impl FilterItem {
    pub fn new(facet: FacetSettings, value: impl Into<String>, clean_value: impl Into<String>) -> Self {
        Self {
            facet,
            value: value.into(),
            clean_value: clean_value.into(),
        }
    }

    pub fn url_key(&self) -> &str {
        &self.facet.url_key
    }
}

/// 保留参数的原始值
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct ScalarParameters {
    pub page: Option<String>,
    pub page_size: Option<String>,
    pub sort_order: Option<String>,
    pub search_text: Option<String>,
}

impl ScalarParameters {
    /// 页码，非无符号整数时报错
    pub fn page_number(&self) -> Result<Option<u32>, ParameterError> {
        parse_unsigned("page", self.page.as_deref())
    }

    /// 每页条数，非无符号整数时报错
    pub fn page_limit(&self) -> Result<Option<u32>, ParameterError> {
        parse_unsigned("page_size", self.page_size.as_deref())
    }
}

fn parse_unsigned(name: &'static str, raw: Option<&str>) -> Result<Option<u32>, ParameterError> {
    match raw {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse::<u32>()
            .map(Some)
            .map_err(|_| ParameterError::NotUnsigned {
                name,
                value: value.to_string(),
            }),
    }
}

/// 分类实体
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Category {
    pub id: u64,
    pub parent_id: u64,
    /// 分类页面的规范地址
    pub url: String,
}

/// 分类筛选链接 - 查询状态或分类页面地址
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "type", content = "value")]
pub enum CategoryLink {
    /// 有搜索词时：在当前页面上按分类路径筛选
    Query(query_common::QueryState),
    /// 无搜索词时：直接跳转到分类页面
    CanonicalUrl(String),
}

/// 请求类型，只有搜索请求接受搜索词
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RequestKind {
    #[default]
    Navigation,
    Search,
}

/// 属性筛选条件
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct AttributeFilter {
    pub attribute: String,
    pub value: String,
}

/// 交给搜索服务客户端的导航请求
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct NavigationRequest {
    pub kind: RequestKind,
    pub attribute_filters: Vec<AttributeFilter>,
    pub order: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
    /// 分类路径，根节点在前
    pub category_path: Vec<u64>,
    pub search: Option<String>,
}

impl NavigationRequest {
    pub fn new(kind: RequestKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    pub fn add_attribute_filter(&mut self, attribute: impl Into<String>, value: impl Into<String>) {
        self.attribute_filters.push(AttributeFilter {
            attribute: attribute.into(),
            value: value.into(),
        });
    }

    pub fn add_category_path_filter(&mut self, path: &[u64]) {
        self.category_path.extend_from_slice(path);
    }
}

/// 一次请求的完整解析结果
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct DecodedRequest {
    pub filters: query_common::QueryState,
    pub category_path: Vec<u64>,
    pub parameters: ScalarParameters,
    pub request: NavigationRequest,
}

/// 编解码器配置
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct CodecConfig {
    /// 分类树根节点 ID
    pub root_category_id: u64,
    /// 原始 URL 覆盖参数名
    pub original_url_parameter: String,
    /// 生成链接使用的路由
    pub route: String,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            root_category_id: DEFAULT_ROOT_CATEGORY_ID,
            original_url_parameter: DEFAULT_ORIGINAL_URL_PARAMETER.to_string(),
            route: CURRENT_ROUTE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_page_parsing() {
        let params = ScalarParameters {
            page: Some("3".to_string()),
            page_size: Some("ten".to_string()),
            ..ScalarParameters::default()
        };

        assert_eq!(params.page_number().unwrap(), Some(3));
        assert_eq!(
            params.page_limit().unwrap_err(),
            ParameterError::NotUnsigned {
                name: "page_size",
                value: "ten".to_string()
            }
        );
        assert_eq!(ScalarParameters::default().page_number().unwrap(), None);
    }

    #[test]
    fn config_defaults_fill_missing_fields() {
        let config: CodecConfig = serde_json::from_str(r#"{"root_category_id": 2}"#).unwrap();
        assert_eq!(config.root_category_id, 2);
        assert_eq!(config.original_url_parameter, "__tw_original_url");
        assert_eq!(config.route, "*/*/*");
    }

    #[test]
    fn filter_item_from_json() {
        let item: FilterItem = serde_json::from_str(
            r#"{"facet": {"url_key": "color", "mode": "multi"}, "value": "red"}"#,
        )
        .unwrap();
        assert_eq!(item.facet.mode, FacetMode::Multi);
        assert_eq!(item.clean_value, "");
    }
}
