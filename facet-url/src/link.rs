use query_common::{parse_url, split_url, to_query_string, QueryError, QueryState, QueryValue};
use serde::Serialize;
use tracing::{debug, warn};
use url::Url;

use crate::category::CategoryRepository;
use crate::error::CategoryError;
use crate::models::{CategoryLink, FilterItem, CURRENT_ROUTE};
use crate::strategy::FilterUrlCodec;

/// 链接生成选项
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct UrlOptions {
    /// 保留当前请求的查询参数
    pub current: bool,
    /// 使用 URL 重写
    pub use_rewrite: bool,
    /// 需要改变的查询参数
    pub query: QueryState,
    /// 对 `&` 做 HTML 转义
    pub escape: bool,
}

impl UrlOptions {
    /// 筛选链接的固定选项：保留当前参数、使用重写、不转义
    pub fn current_query(query: QueryState) -> Self {
        Self {
            current: true,
            use_rewrite: true,
            query,
            escape: false,
        }
    }
}

/// URL 生成器
pub trait UrlMaterializer {
    /// 当前请求的查询参数，`current` 选项在它之上合并变更
    fn request_query(&self) -> &QueryState;
    /// 按路由生成 URL
    fn url(&self, route: &str, options: &UrlOptions) -> String;
    /// 以给定地址为基础生成 URL
    fn direct_url(&self, base: &str, options: &UrlOptions) -> String;
}

/// 基于当前请求地址的 URL 生成器
///
/// 不做 URL 重写；`*/*/*` 解析为当前请求路径，其他路由视为站点根下的路径。
#[derive(Clone, Debug)]
pub struct BaseUrlMaterializer {
    request_url: Url,
    request_query: QueryState,
}

impl BaseUrlMaterializer {
    pub fn from_request_url(request_url: &str) -> Result<Self, QueryError> {
        let parsed = parse_url(request_url)?;
        let (_, request_query) = split_url(request_url);
        Ok(Self {
            request_url: parsed,
            request_query,
        })
    }

    fn render(&self, mut target: Url, options: &UrlOptions) -> String {
        let query = if options.current {
            self.request_query.merged(&options.query)
        } else {
            QueryState::new().merged(&options.query)
        };

        let encoded = to_query_string(&query);
        target.set_query(if encoded.is_empty() { None } else { Some(encoded.as_str()) });
        target.set_fragment(None);

        let url = target.to_string();
        if options.escape {
            url.replace('&', "&amp;")
        } else {
            url
        }
    }
}

impl UrlMaterializer for BaseUrlMaterializer {
    fn request_query(&self) -> &QueryState {
        &self.request_query
    }

    fn url(&self, route: &str, options: &UrlOptions) -> String {
        let mut target = self.request_url.clone();
        if route != CURRENT_ROUTE {
            target.set_path(&format!("/{}", route.trim_start_matches('/')));
        }
        self.render(target, options)
    }

    /// `base` 只能是当前站点下的地址，指向其他站点时改用当前请求路径
    fn direct_url(&self, base: &str, options: &UrlOptions) -> String {
        match self.request_url.join(base) {
            Ok(target) if target.origin() == self.request_url.origin() => self.render(target, options),
            Ok(target) => {
                warn!("original url '{}' leaves the request origin ({}), ignored", base, target.origin().ascii_serialization());
                self.url(CURRENT_ROUTE, options)
            }
            Err(e) => {
                warn!("cannot resolve original url '{}': {}", base, e);
                self.url(CURRENT_ROUTE, options)
            }
        }
    }
}

/// 筛选链接生成 - 组合 URL 策略与 URL 生成器
pub struct LinkBuilder<'a, M: UrlMaterializer> {
    codec: &'a FilterUrlCodec,
    materializer: M,
}

impl<'a, M: UrlMaterializer> LinkBuilder<'a, M> {
    pub fn new(codec: &'a FilterUrlCodec, materializer: M) -> Self {
        Self { codec, materializer }
    }

    /// 当前请求的查询参数
    pub fn current(&self) -> &QueryState {
        self.materializer.request_query()
    }

    /// 生成保留当前参数、应用 `delta` 的链接
    ///
    /// 请求中带有原始 URL 覆盖参数时以它为基础地址，并从结果中去掉该参数。
    pub fn current_query_url(&self, mut delta: QueryState) -> String {
        let config = self.codec.config();
        let original_url = self
            .current()
            .get_single(&config.original_url_parameter)
            .filter(|url| !url.is_empty());

        match original_url {
            Some(original_url) => {
                delta.set(config.original_url_parameter.as_str(), QueryValue::List(Vec::new()));
                debug!(original_url, "building link against original url");
                self.materializer
                    .direct_url(original_url, &UrlOptions::current_query(delta))
            }
            None => self
                .materializer
                .url(&config.route, &UrlOptions::current_query(delta)),
        }
    }

    pub fn select_url(&self, item: &FilterItem) -> String {
        self.current_query_url(self.codec.build_select(self.current(), item))
    }

    pub fn remove_url(&self, item: &FilterItem) -> String {
        self.current_query_url(self.codec.build_remove(self.current(), item))
    }

    pub fn clear_url(&self, active_filters: &[FilterItem]) -> String {
        self.current_query_url(self.codec.build_clear(active_filters))
    }

    pub fn slider_url(&self, url_key: &str) -> String {
        self.current_query_url(self.codec.build_slider(url_key))
    }

    pub fn filter_url(&self) -> String {
        self.current_query_url(self.codec.build_filter_query(self.current()))
    }

    pub fn category_select_url<R: CategoryRepository>(
        &self,
        url_key: &str,
        leaf_id: u64,
        categories: &R,
    ) -> Result<String, CategoryError> {
        match self
            .codec
            .build_category_select(self.current(), url_key, leaf_id, categories)?
        {
            CategoryLink::CanonicalUrl(url) => Ok(url),
            CategoryLink::Query(delta) => Ok(self.current_query_url(delta)),
        }
    }

    pub fn category_remove_url(&self, item: &FilterItem) -> String {
        self.current_query_url(self.codec.build_category_remove(item))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::CategoryTable;
    use crate::models::{Category, FacetMode, FacetSettings};

    const REQUEST: &str = "https://shop.example/women/shoes.html?q=boot&color%5B%5D=red&p=2";

    fn materializer() -> BaseUrlMaterializer {
        BaseUrlMaterializer::from_request_url(REQUEST).unwrap()
    }

    #[test]
    fn current_route_keeps_path_and_merges_query() {
        let mut delta = QueryState::new();
        delta.set("brand", "acme");
        let url = materializer().url(CURRENT_ROUTE, &UrlOptions::current_query(delta));
        assert_eq!(
            url,
            "https://shop.example/women/shoes.html?q=boot&color%5B%5D=red&p=2&brand=acme"
        );
    }

    #[test]
    fn explicit_route_without_current_query() {
        let mut options = UrlOptions::current_query(QueryState::new());
        options.current = false;
        let url = materializer().url("catalogsearch/result", &options);
        assert_eq!(url, "https://shop.example/catalogsearch/result");
    }

    #[test]
    fn escape_encodes_ampersands() {
        let mut options = UrlOptions::current_query(QueryState::new());
        options.escape = true;
        let url = materializer().url(CURRENT_ROUTE, &options);
        assert!(url.ends_with("?q=boot&amp;color%5B%5D=red&amp;p=2"));
    }

    #[test]
    fn select_link_adds_value_and_keeps_other_parameters() {
        let codec = FilterUrlCodec::default();
        let builder = LinkBuilder::new(&codec, materializer());
        let item = FilterItem::new(FacetSettings::new("color", FacetMode::Multi), "blue", "");

        assert_eq!(
            builder.select_url(&item),
            "https://shop.example/women/shoes.html?q=boot&color%5B%5D=red&color%5B%5D=blue&p=2"
        );
        let item = FilterItem::new(FacetSettings::new("color", FacetMode::Multi), "red", "");
        assert_eq!(
            builder.remove_url(&item),
            "https://shop.example/women/shoes.html?q=boot&p=2"
        );
    }

    #[test]
    fn original_url_override_becomes_the_base() {
        let request = "https://shop.example/facets/ajax/navigation?color=red&__tw_original_url=%2Fwomen%2Fshoes.html";
        let materializer = BaseUrlMaterializer::from_request_url(request).unwrap();
        let codec = FilterUrlCodec::default();
        let builder = LinkBuilder::new(&codec, materializer);

        assert_eq!(
            builder.slider_url("price"),
            "https://shop.example/women/shoes.html?color=red&price=%7B%7Bfrom%7D%7D-%7B%7Bto%7D%7D"
        );
    }

    #[test]
    fn original_url_override_cannot_leave_the_shop() {
        let codec = FilterUrlCodec::default();
        let overrides = [
            "https%3A%2F%2Fevil.example%2Fphish",
            "%2F%2Fevil.example%2Fphish",
            "http%3A%2F%2Fshop.example%2Fwomen.html",
        ];

        for original_url in overrides {
            let request = format!(
                "https://shop.example/facets/ajax/navigation?color=red&__tw_original_url={}",
                original_url
            );
            let builder = LinkBuilder::new(&codec, BaseUrlMaterializer::from_request_url(&request).unwrap());
            assert_eq!(
                builder.slider_url("price"),
                "https://shop.example/facets/ajax/navigation?color=red&price=%7B%7Bfrom%7D%7D-%7B%7Bto%7D%7D"
            );
        }
    }

    #[test]
    fn links_merge_into_the_materializer_request() {
        let codec = FilterUrlCodec::default();
        let builder = LinkBuilder::new(&codec, materializer());
        assert_eq!(builder.current().get_single("q"), Some("boot"));

        let item = FilterItem::new(FacetSettings::new("brand", FacetMode::Single), "acme", "");
        assert_eq!(
            builder.select_url(&item),
            "https://shop.example/women/shoes.html?q=boot&color%5B%5D=red&p=2&brand=acme"
        );
    }

    #[test]
    fn category_link_without_search_is_the_category_page() {
        let categories: CategoryTable = vec![
            Category { id: 2, parent_id: 1, url: "/women.html".into() },
            Category { id: 7, parent_id: 2, url: "/women/shoes.html".into() },
        ]
        .into();
        let codec = FilterUrlCodec::default();
        let builder = LinkBuilder::new(&codec, materializer());
        assert_eq!(
            builder.category_select_url("categorie", 7, &categories).unwrap(),
            "https://shop.example/women/shoes.html?q=boot&color%5B%5D=red&p=2&categorie=2-7"
        );

        let browsing = BaseUrlMaterializer::from_request_url("https://shop.example/women.html?color=red").unwrap();
        let builder = LinkBuilder::new(&codec, browsing);
        assert_eq!(
            builder.category_select_url("categorie", 7, &categories).unwrap(),
            "/women/shoes.html"
        );
        assert_eq!(
            builder.category_select_url("categorie", 99, &categories),
            Err(CategoryError::NotFound(99))
        );
    }
}
