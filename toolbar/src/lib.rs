use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{console, Event, EventInit, HtmlFormElement, HtmlInputElement};

pub mod models;
pub mod pager;

pub use models::{ParamChange, ToolbarOptions};
pub use pager::{apply_param_change, handle_pager_click, intercept_changes, page_from_href};

#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

// 初始化错误处理
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
}

/// 把参数变更写入筛选表单的隐藏字段并触发表单 change 事件
fn submit_through_form(form_id: &str, change: &ParamChange) -> Result<(), JsValue> {
    let document = web_sys::window()
        .and_then(|window| window.document())
        .ok_or_else(|| JsValue::from_str("document 不可用"))?;

    let form: HtmlFormElement = document
        .get_element_by_id(form_id)
        .ok_or_else(|| JsValue::from_str(&format!("找不到筛选表单: #{}", form_id)))?
        .dyn_into()?;

    let input: HtmlInputElement = document.create_element("input")?.dyn_into()?;
    input.set_type("hidden");
    input.set_class_name("hidden");
    input.set_name(&change.name);
    input.set_value(&change.value);
    form.append_child(&input)?;

    let init = EventInit::new();
    init.set_bubbles(true);
    let event = Event::new_with_event_init_dict("change", &init)?;
    form.dispatch_event(&event)?;
    Ok(())
}

/// 没有页面回调时的默认行为：在当前地址上应用参数变更并跳转
fn navigate_with_change(change: &ParamChange) -> Result<(), JsValue> {
    let location = web_sys::window()
        .ok_or_else(|| JsValue::from_str("window 不可用"))?
        .location();
    let target = apply_param_change(&location.href()?, change);
    location.set_href(&target)
}

/// 工具栏 JS 接口 - 包装页面原有的参数变更回调
#[wasm_bindgen]
pub struct ToolbarJS {
    options: ToolbarOptions,
    base: Option<js_sys::Function>,
}

#[wasm_bindgen]
impl ToolbarJS {
    /// `base` 为原有的 `changeUrl(name, value, defaultValue)` 回调，省略时直接改写当前地址
    #[wasm_bindgen(constructor)]
    pub fn new(options: JsValue, base: Option<js_sys::Function>) -> Result<ToolbarJS, JsValue> {
        console_error_panic_hook::set_once();

        let options: ToolbarOptions = if options.is_undefined() || options.is_null() {
            ToolbarOptions::default()
        } else {
            serde_wasm_bindgen::from_value(options)
                .map_err(|e| JsValue::from_str(&format!("解析工具栏配置失败: {}", e)))?
        };

        Ok(ToolbarJS { options, base })
    }

    /// 分页条目选择器，供页面绑定点击事件
    #[wasm_bindgen(getter)]
    pub fn pager_item_selector(&self) -> String {
        self.options.pager_item_selector.clone()
    }

    /// 是否开启异步筛选（仅开启时需要拦截分页点击）
    #[wasm_bindgen(getter)]
    pub fn ajax_filters(&self) -> bool {
        self.options.ajax_filters
    }

    /// 提交一次参数变更
    #[wasm_bindgen]
    pub fn change_url(&self, name: &str, value: &str, default_value: &str) -> Result<(), JsValue> {
        let mut change_url = self.decorated();
        change_url(&ParamChange::new(name, value, default_value))
    }

    /// 处理分页链接点击，返回 `false` 以阻止默认跳转
    #[wasm_bindgen]
    pub fn handle_pager_click(&self, href: &str) -> Result<bool, JsValue> {
        let mut change_url = self.decorated();
        let (follow, result) = handle_pager_click(href, &mut change_url);
        if let Some(Err(e)) = result {
            console::log_1(&JsValue::from_str(&format!("分页提交失败: {:?}", e)));
            return Err(e);
        }
        Ok(follow)
    }
}

impl ToolbarJS {
    fn decorated(&self) -> impl FnMut(&ParamChange) -> Result<(), JsValue> + '_ {
        let form_id = self.options.filter_form_id.as_str();
        intercept_changes(
            &self.options,
            move |change: &ParamChange| match &self.base {
                Some(base) => base
                    .call3(
                        &JsValue::NULL,
                        &JsValue::from_str(&change.name),
                        &JsValue::from_str(&change.value),
                        &JsValue::from_str(&change.default_value),
                    )
                    .map(|_| ()),
                None => navigate_with_change(change),
            },
            move |change: &ParamChange| submit_through_form(form_id, change),
        )
    }
}
