use once_cell::sync::Lazy;
use query_common::{join_url, split_url};
use regex::Regex;
use tracing::debug;

use crate::models::{ParamChange, ToolbarOptions, PAGE_PARAMETER};

static PAGE_IN_HREF: Lazy<Regex> = Lazy::new(|| Regex::new(r"[?&]p=(\d+)").unwrap());

/// 从分页链接中取出页码
pub fn page_from_href(href: &str) -> Option<String> {
    PAGE_IN_HREF
        .captures(href)
        .and_then(|captures| captures.get(1))
        .map(|page| page.as_str().to_string())
}

/// 参数变更装饰器
///
/// 未开启异步筛选时交给 `base` 处理（跳转到新地址），开启后交给 `submit`（写入筛选表单）。
pub fn intercept_changes<B, S, R>(options: &ToolbarOptions, mut base: B, mut submit: S) -> impl FnMut(&ParamChange) -> R
where
    B: FnMut(&ParamChange) -> R,
    S: FnMut(&ParamChange) -> R,
{
    let ajax_filters = options.ajax_filters;
    move |change: &ParamChange| {
        if ajax_filters {
            debug!(name = %change.name, value = %change.value, "submitting param change through filter form");
            submit(change)
        } else {
            base(change)
        }
    }
}

/// 处理分页点击：取出页码并作为参数变更提交
///
/// 返回值表示是否继续浏览器默认跳转，始终为 `false`。
pub fn handle_pager_click<R>(href: &str, change_url: &mut impl FnMut(&ParamChange) -> R) -> (bool, Option<R>) {
    let result = page_from_href(href).map(|page| change_url(&ParamChange::new(PAGE_PARAMETER, page.clone(), page)));
    (false, result)
}

/// 默认的参数变更：在当前地址上设置参数，等于默认值时去掉该参数
pub fn apply_param_change(current_url: &str, change: &ParamChange) -> String {
    let (base, mut query) = split_url(current_url);
    if change.is_default() {
        query.remove(&change.name);
    } else {
        query.set(change.name.as_str(), change.value.as_str());
    }
    join_url(base, &query)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_page_from_href() {
        assert_eq!(page_from_href("/shoes.html?p=3"), Some("3".to_string()));
        assert_eq!(page_from_href("/shoes.html?q=boot&p=12&color=red"), Some("12".to_string()));
        assert_eq!(page_from_href("/shoes.html?top=3"), None);
        assert_eq!(page_from_href(""), None);
    }

    #[test]
    fn routes_changes_by_configuration() {
        let change = ParamChange::new("product_list_order", "price", "position");

        let plain = ToolbarOptions::default();
        let mut change_url = intercept_changes(&plain, |_: &ParamChange| "base", |_: &ParamChange| "form");
        assert_eq!(change_url(&change), "base");

        let ajax = ToolbarOptions {
            ajax_filters: true,
            ..ToolbarOptions::default()
        };
        let mut change_url = intercept_changes(&ajax, |_: &ParamChange| "base", |_: &ParamChange| "form");
        assert_eq!(change_url(&change), "form");
    }

    #[test]
    fn pager_click_submits_page_and_prevents_default() {
        let mut submitted = Vec::new();
        let mut change_url = |change: &ParamChange| submitted.push(change.clone());

        let (follow, result) = handle_pager_click("/shoes.html?p=4", &mut change_url);
        assert!(!follow);
        assert!(result.is_some());

        let (follow, result) = handle_pager_click("#", &mut change_url);
        assert!(!follow);
        assert!(result.is_none());

        assert_eq!(submitted, vec![ParamChange::new("p", "4", "4")]);
    }

    #[test]
    fn default_change_sets_or_removes_param() {
        let url = "/shoes.html?q=boot&product_list_order=name";

        let changed = apply_param_change(url, &ParamChange::new("product_list_order", "price", "position"));
        assert_eq!(changed, "/shoes.html?q=boot&product_list_order=price");

        let reset = apply_param_change(url, &ParamChange::new("product_list_order", "position", "position"));
        assert_eq!(reset, "/shoes.html?q=boot");

        let added = apply_param_change("/shoes.html", &ParamChange::new("product_list_limit", "36", "12"));
        assert_eq!(added, "/shoes.html?product_list_limit=36");
    }

    #[test]
    fn plain_toolbar_rewrites_current_url() {
        let current_url = "/shoes.html?q=boot&product_list_limit=12";
        let mut change_url = intercept_changes(
            &ToolbarOptions::default(),
            |change: &ParamChange| apply_param_change(current_url, change),
            |_: &ParamChange| String::from("form"),
        );

        assert_eq!(
            change_url(&ParamChange::new("product_list_order", "price", "position")),
            "/shoes.html?q=boot&product_list_limit=12&product_list_order=price"
        );
        assert_eq!(
            change_url(&ParamChange::new("product_list_limit", "12", "12")),
            "/shoes.html?q=boot"
        );
    }
}
