use wasm_bindgen::prelude::*;
use web_sys::console;

use query_common::split_url;

// 导出模块
pub mod category;
pub mod error;
pub mod link;
pub mod models;
pub mod navigation;
pub mod strategy;

pub use category::{CategoryRepository, CategoryTable};
pub use error::{CategoryError, ParameterError};
pub use link::{BaseUrlMaterializer, LinkBuilder, UrlMaterializer, UrlOptions};
pub use models::{
    CategoryLink, CodecConfig, DecodedRequest, FacetMode, FacetSettings, FilterItem, NavigationRequest,
    RequestKind, ScalarParameters,
};
pub use strategy::FilterUrlCodec;

#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

/// 初始化函数 - 设置错误处理
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
}

/// 版本信息
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn js_error(context: &str, e: impl std::fmt::Display) -> JsValue {
    let message = format!("{}: {}", context, e);
    console::log_1(&JsValue::from_str(&message));
    JsValue::from_str(&message)
}

fn parse_json<'a, T: serde::Deserialize<'a>>(context: &str, json: &'a str) -> Result<T, JsValue> {
    serde_json::from_str(json).map_err(|e| js_error(context, e))
}

/// 筛选链接 JS 接口 - 供前端分面导航组件使用
#[wasm_bindgen]
pub struct FacetUrlJS {
    codec: FilterUrlCodec,
    categories: CategoryTable,
}

#[wasm_bindgen]
impl FacetUrlJS {
    /// 创建实例；配置与分类表均为 JSON，空字符串使用默认值
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str, categories_json: &str) -> Result<FacetUrlJS, JsValue> {
        console_error_panic_hook::set_once();

        let config: CodecConfig = if config_json.trim().is_empty() {
            CodecConfig::default()
        } else {
            parse_json("解析配置失败", config_json)?
        };
        let categories: CategoryTable = if categories_json.trim().is_empty() {
            CategoryTable::new()
        } else {
            parse_json("解析分类表失败", categories_json)?
        };

        Ok(FacetUrlJS {
            codec: FilterUrlCodec::new(config),
            categories,
        })
    }

    /// 解析当前请求地址
    #[wasm_bindgen]
    pub fn decode(&self, request_url: &str, search: bool) -> Result<JsValue, JsValue> {
        let (_, query) = split_url(request_url);
        let kind = if search { RequestKind::Search } else { RequestKind::Navigation };
        let decoded = self.codec.decode(&query, kind);

        serde_wasm_bindgen::to_value(&decoded).map_err(|e| js_error("序列化解析结果失败", e))
    }

    #[wasm_bindgen]
    pub fn select_url(&self, request_url: &str, item_json: &str) -> Result<String, JsValue> {
        let item: FilterItem = parse_json("解析筛选项失败", item_json)?;
        let builder = self.link_builder(request_url)?;
        Ok(builder.select_url(&item))
    }

    #[wasm_bindgen]
    pub fn remove_url(&self, request_url: &str, item_json: &str) -> Result<String, JsValue> {
        let item: FilterItem = parse_json("解析筛选项失败", item_json)?;
        let builder = self.link_builder(request_url)?;
        Ok(builder.remove_url(&item))
    }

    #[wasm_bindgen]
    pub fn clear_url(&self, request_url: &str, items_json: &str) -> Result<String, JsValue> {
        let items: Vec<FilterItem> = parse_json("解析筛选项失败", items_json)?;
        let builder = self.link_builder(request_url)?;
        Ok(builder.clear_url(&items))
    }

    #[wasm_bindgen]
    pub fn slider_url(&self, request_url: &str, url_key: &str) -> Result<String, JsValue> {
        let builder = self.link_builder(request_url)?;
        Ok(builder.slider_url(url_key))
    }

    #[wasm_bindgen]
    pub fn filter_url(&self, request_url: &str) -> Result<String, JsValue> {
        let builder = self.link_builder(request_url)?;
        Ok(builder.filter_url())
    }

    #[wasm_bindgen]
    pub fn category_select_url(&self, request_url: &str, url_key: &str, category_id: u32) -> Result<String, JsValue> {
        let builder = self.link_builder(request_url)?;
        builder
            .category_select_url(url_key, u64::from(category_id), &self.categories)
            .map_err(|e| js_error("生成分类链接失败", e))
    }

    #[wasm_bindgen]
    pub fn category_remove_url(&self, request_url: &str, item_json: &str) -> Result<String, JsValue> {
        let item: FilterItem = parse_json("解析筛选项失败", item_json)?;
        let builder = self.link_builder(request_url)?;
        Ok(builder.category_remove_url(&item))
    }
}

impl FacetUrlJS {
    fn link_builder(&self, request_url: &str) -> Result<LinkBuilder<'_, BaseUrlMaterializer>, JsValue> {
        let materializer = BaseUrlMaterializer::from_request_url(request_url)
            .map_err(|e| js_error("解析请求地址失败", e))?;
        Ok(LinkBuilder::new(&self.codec, materializer))
    }
}
