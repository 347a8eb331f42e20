use query_common::{QueryState, QueryValue};
use tracing::debug;

use crate::category::{ancestor_path, CategoryRepository};
use crate::error::CategoryError;
use crate::models::{CategoryLink, CodecConfig, FacetMode, FacetSettings, FilterItem, ScalarParameters};

/// 分类路径分隔符
pub const CATEGORY_TREE_SEPARATOR: &str = "-";

/// 页码
pub const PARAM_PAGE: &str = "p";
/// 每页条数
pub const PARAM_LIMIT: &str = "product_list_limit";
/// 排序
pub const PARAM_ORDER: &str = "product_list_order";
/// 搜索词
pub const PARAM_SEARCH: &str = "q";
/// 分类路径
pub const PARAM_CATEGORY: &str = "categorie";
/// 列表显示模式
pub const PARAM_MODE: &str = "product_list_mode";

/// 不参与属性筛选的保留参数
pub const RESERVED_PARAMETERS: [&str; 6] = [
    PARAM_PAGE,
    PARAM_LIMIT,
    PARAM_ORDER,
    PARAM_SEARCH,
    PARAM_CATEGORY,
    PARAM_MODE,
];

/// 分类 ID 上限，超出的段按上限取值
pub const MAX_CATEGORY_ID: u64 = i64::MAX as u64;

/// 滑块筛选的占位模板，由前端滑块组件替换
pub const SLIDER_TEMPLATE: &str = "{{from}}-{{to}}";

/// 保留参数判断（不区分大小写）
pub fn is_reserved(key: &str) -> bool {
    RESERVED_PARAMETERS
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(key))
}

// 对单个分面的一次变更
enum Change<'a> {
    Add(&'a str),
    Remove { value: &'a str, clean_value: &'a str },
}

/// 查询参数 URL 策略 - 在查询状态与筛选选择之间双向转换
///
/// 所有 `build_*` 方法只返回本次链接要改变的参数，其余参数由链接生成时的
/// `QueryState::merged` 原样保留。
#[derive(Clone, Debug, Default)]
pub struct FilterUrlCodec {
    config: CodecConfig,
}

impl FilterUrlCodec {
    pub fn new(config: CodecConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// 提取所有非保留参数作为属性筛选，保持原值形态
    pub fn decode_facet_filters(&self, query: &QueryState) -> QueryState {
        query
            .iter()
            .filter(|(key, _)| !is_reserved(key))
            .map(|(key, value)| (key, value.clone()))
            .collect()
    }

    /// 解析分类路径：按 `-` 拆分，每段取开头的数字，没有数字或为 0 的段被丢弃，去重并保持首次出现顺序
    pub fn decode_category_path(&self, query: &QueryState) -> Vec<u64> {
        let raw = match query.get_single(PARAM_CATEGORY) {
            Some(raw) => raw,
            None => return Vec::new(),
        };

        let mut path = Vec::new();
        for segment in raw.split(CATEGORY_TREE_SEPARATOR) {
            let id = leading_integer(segment);
            if id != 0 && !path.contains(&id) {
                path.push(id);
            }
        }
        path
    }

    /// 读取分页、排序与搜索参数的原始值
    pub fn decode_scalar_parameters(&self, query: &QueryState) -> ScalarParameters {
        let read = |key: &str| query.get_single(key).map(str::to_string);
        ScalarParameters {
            page: read(PARAM_PAGE),
            page_size: read(PARAM_LIMIT),
            sort_order: read(PARAM_ORDER),
            search_text: read(PARAM_SEARCH),
        }
    }

    /// 读取某个分面当前选中的值
    ///
    /// 参数缺失或为空时，多选返回空列表，单选返回 `None`。
    pub fn request_values(&self, query: &QueryState, url_key: &str, mode: FacetMode) -> Option<QueryValue> {
        let present = query.get(url_key).filter(|value| !value.is_empty());
        match (mode, present) {
            (FacetMode::Multi, None) => Some(QueryValue::List(Vec::new())),
            (FacetMode::Single, None) => None,
            (FacetMode::Multi, Some(value)) => Some(QueryValue::List(value.to_list())),
            (FacetMode::Single, Some(value)) => value.first().map(QueryValue::from),
        }
    }

    /// 选中筛选项的链接参数
    pub fn build_select(&self, current: &QueryState, item: &FilterItem) -> QueryState {
        self.change(current, &item.facet, Change::Add(&item.value))
    }

    /// 取消筛选项的链接参数
    pub fn build_remove(&self, current: &QueryState, item: &FilterItem) -> QueryState {
        self.change(
            current,
            &item.facet,
            Change::Remove {
                value: &item.value,
                clean_value: &item.clean_value,
            },
        )
    }

    fn change(&self, current: &QueryState, facet: &FacetSettings, change: Change<'_>) -> QueryState {
        let value = match facet.mode {
            FacetMode::Single => match change {
                Change::Add(value) => QueryValue::from(value),
                Change::Remove { clean_value, .. } => QueryValue::from(clean_value),
            },
            FacetMode::Multi => {
                let mut values = self
                    .request_values(current, &facet.url_key, FacetMode::Multi)
                    .map(|value| value.to_list())
                    .unwrap_or_default();
                match change {
                    Change::Add(value) => {
                        values.push(value.to_string());
                        values = unique(values);
                    }
                    Change::Remove { value, .. } => {
                        if let Some(index) = values.iter().position(|existing| existing == value) {
                            values.remove(index);
                        }
                    }
                }
                QueryValue::List(values)
            }
        };

        debug!(url_key = %facet.url_key, ?value, "built facet link query");
        let mut query = QueryState::new();
        query.set(facet.url_key.as_str(), value);
        query
    }

    /// 清除全部筛选：每个已选筛选项的分面重置为未筛选值
    pub fn build_clear(&self, active_filters: &[FilterItem]) -> QueryState {
        active_filters
            .iter()
            .map(|item| (item.url_key(), item.clean_value.as_str()))
            .collect()
    }

    /// 选择分类的链接
    ///
    /// 没有搜索词时直接返回分类页面地址；否则把从根到叶的分类路径写入 `url_key`。
    /// 分类不存在时返回错误，不做本地恢复。
    pub fn build_category_select<R: CategoryRepository>(
        &self,
        current: &QueryState,
        url_key: &str,
        leaf_id: u64,
        categories: &R,
    ) -> Result<CategoryLink, CategoryError> {
        let leaf = categories.get(leaf_id)?;
        if !self.has_search(current) {
            return Ok(CategoryLink::CanonicalUrl(leaf.url));
        }

        let path = ancestor_path(categories, &leaf, self.config.root_category_id)?;
        let value = join_category_path(&path);
        debug!(url_key, %value, "built category link query");

        let mut query = QueryState::new();
        query.set(url_key, value);
        Ok(CategoryLink::Query(query))
    }

    /// 取消分类筛选：重置为未筛选值
    pub fn build_category_remove(&self, item: &FilterItem) -> QueryState {
        let mut query = QueryState::new();
        query.set(item.url_key(), item.clean_value.as_str());
        query
    }

    /// 滑块链接：写入占位模板，由前端替换区间
    pub fn build_slider(&self, url_key: &str) -> QueryState {
        let mut query = QueryState::new();
        query.set(url_key, SLIDER_TEMPLATE);
        query
    }

    /// 仅包含当前属性筛选的查询参数
    pub fn build_filter_query(&self, current: &QueryState) -> QueryState {
        self.decode_facet_filters(current)
    }

    /// 当前请求是否带有搜索词
    pub fn has_search(&self, query: &QueryState) -> bool {
        query
            .get_single(PARAM_SEARCH)
            .map_or(false, |search| !search.is_empty())
    }
}

/// 拼接分类路径
pub fn join_category_path(path: &[u64]) -> String {
    path.iter()
        .map(u64::to_string)
        .collect::<Vec<_>>()
        .join(CATEGORY_TREE_SEPARATOR)
}

// 读取开头的十进制数字（允许前导空白与 `+`），没有数字时为 0，超出上限时取 MAX_CATEGORY_ID
fn leading_integer(segment: &str) -> u64 {
    let trimmed = segment.trim_start();
    let digits = trimmed.strip_prefix('+').unwrap_or(trimmed);
    digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0u64, |acc, digit| {
            acc.checked_mul(10)
                .and_then(|acc| acc.checked_add(u64::from(digit - b'0')))
                .map_or(MAX_CATEGORY_ID, |acc| acc.min(MAX_CATEGORY_ID))
        })
}

// 去重并保持首次出现顺序
fn unique(values: Vec<String>) -> Vec<String> {
    let mut result: Vec<String> = Vec::with_capacity(values.len());
    for value in values {
        if !result.contains(&value) {
            result.push(value);
        }
    }
    result
}
