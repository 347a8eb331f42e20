use query_common::QueryState;
use tracing::warn;

use crate::models::{DecodedRequest, NavigationRequest, RequestKind};
use crate::strategy::FilterUrlCodec;

impl FilterUrlCodec {
    /// 把当前请求的查询参数应用到导航请求
    ///
    /// 无效的页码或每页条数只记录警告并跳过，任何查询参数都不会导致页面渲染失败。
    pub fn apply(&self, query: &QueryState, request: &mut NavigationRequest) {
        for (attribute, values) in self.decode_facet_filters(query).iter() {
            for value in values.iter() {
                request.add_attribute_filter(attribute, value);
            }
        }

        let params = self.decode_scalar_parameters(query);

        if let Some(order) = params.sort_order.as_deref().filter(|order| !order.is_empty()) {
            request.order = Some(order.to_string());
        }

        match params.page_number() {
            Ok(Some(page)) if page > 0 => request.page = Some(page),
            Ok(_) => {}
            Err(e) => warn!("ignoring page parameter: {}", e),
        }

        match params.page_limit() {
            Ok(Some(limit)) if limit > 0 => request.limit = Some(limit),
            Ok(_) => {}
            Err(e) => warn!("ignoring page size parameter: {}", e),
        }

        let categories = self.decode_category_path(query);
        if !categories.is_empty() {
            request.add_category_path_filter(&categories);
        }

        if request.kind == RequestKind::Search {
            if let Some(search) = params.search_text.filter(|search| !search.is_empty()) {
                request.search = Some(search);
            }
        }
    }

    /// 根据查询参数创建导航请求
    pub fn navigation_request(&self, query: &QueryState, kind: RequestKind) -> NavigationRequest {
        let mut request = NavigationRequest::new(kind);
        self.apply(query, &mut request);
        request
    }

    /// 解析请求：属性筛选、分类路径、保留参数以及对应的导航请求
    pub fn decode(&self, query: &QueryState, kind: RequestKind) -> DecodedRequest {
        DecodedRequest {
            filters: self.decode_facet_filters(query),
            category_path: self.decode_category_path(query),
            parameters: self.decode_scalar_parameters(query),
            request: self.navigation_request(query, kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AttributeFilter;
    use query_common::parse_query;

    #[test]
    fn applies_filters_paging_and_categories() {
        let query = parse_query(
            "color[]=red&color[]=blue&brand=acme&p=2&product_list_limit=24&product_list_order=price&categorie=2-10&q=boot",
        );
        let request = FilterUrlCodec::default().navigation_request(&query, RequestKind::Navigation);

        assert_eq!(
            request.attribute_filters,
            vec![
                AttributeFilter { attribute: "color".into(), value: "red".into() },
                AttributeFilter { attribute: "color".into(), value: "blue".into() },
                AttributeFilter { attribute: "brand".into(), value: "acme".into() },
            ]
        );
        assert_eq!(request.page, Some(2));
        assert_eq!(request.limit, Some(24));
        assert_eq!(request.order.as_deref(), Some("price"));
        assert_eq!(request.category_path, vec![2, 10]);
        assert_eq!(request.search, None);
    }

    #[test]
    fn search_term_only_on_search_requests() {
        let query = parse_query("q=boot");
        let request = FilterUrlCodec::default().navigation_request(&query, RequestKind::Search);
        assert_eq!(request.search.as_deref(), Some("boot"));
        assert!(request.attribute_filters.is_empty());
    }

    #[test]
    fn decode_collects_everything() {
        let query = parse_query("q=boot&size=42&categorie=4-4-9&p=x");
        let decoded = FilterUrlCodec::default().decode(&query, RequestKind::Search);
        assert_eq!(decoded.filters.keys().collect::<Vec<_>>(), vec!["size"]);
        assert_eq!(decoded.category_path, vec![4, 9]);
        assert_eq!(decoded.parameters.page.as_deref(), Some("x"));
        assert_eq!(decoded.request.page, None);
        assert_eq!(decoded.request.search.as_deref(), Some("boot"));
    }

    #[test]
    fn invalid_or_zero_paging_is_skipped() {
        let query = parse_query("p=abc&product_list_limit=0");
        let request = FilterUrlCodec::default().navigation_request(&query, RequestKind::Navigation);
        assert_eq!(request.page, None);
        assert_eq!(request.limit, None);
    }
}
