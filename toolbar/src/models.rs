use serde::{Deserialize, Serialize};

/// 页码参数
pub const PAGE_PARAMETER: &str = "p";

/// 工具栏配置
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct ToolbarOptions {
    /// 是否通过筛选表单异步提交参数变更
    pub ajax_filters: bool,
    /// 分页条目选择器
    pub pager_item_selector: String,
    /// 筛选表单 ID
    pub filter_form_id: String,
}

impl Default for ToolbarOptions {
    fn default() -> Self {
        Self {
            ajax_filters: false,
            pager_item_selector: ".pages li.item".to_string(),
            filter_form_id: "facet-filter-form".to_string(),
        }
    }
}

/// 一次参数变更（排序、每页条数、页码等）
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ParamChange {
    pub name: String,
    pub value: String,
    /// 该参数的默认值，取值等于默认值时从 URL 中去掉
    pub default_value: String,
}

impl ParamChange {
    pub fn new(name: impl Into<String>, value: impl Into<String>, default_value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            default_value: default_value.into(),
        }
    }

    pub fn is_default(&self) -> bool {
        self.value == self.default_value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_from_widget_json() {
        let options: ToolbarOptions = serde_json::from_str(r#"{"ajaxFilters": true}"#).unwrap();
        assert!(options.ajax_filters);
        assert_eq!(options.pager_item_selector, ".pages li.item");
        assert_eq!(options.filter_form_id, "facet-filter-form");
    }

    #[test]
    fn default_value_detection() {
        assert!(ParamChange::new("p", "2", "2").is_default());
        assert!(!ParamChange::new("product_list_limit", "36", "12").is_default());
    }
}
