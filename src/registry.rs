/// Host tab API bridge: querying, activating, closing and creating tabs,
/// plus the lifecycle-event subscription that keeps the popup list live.

use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::tab_data::TabInfo;

// Import JS bridge functions
#[wasm_bindgen(module = "/js/bridge.js")]
extern "C" {
    #[wasm_bindgen(catch)]
    async fn queryTabs() -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn activateTab(tab_id: i32) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn removeTabs(tab_ids: JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn createTab(options: JsValue) -> Result<JsValue, JsValue>;

    fn onTabsChanged(callback: &js_sys::Function) -> JsValue;

    fn offTabsChanged(token: JsValue);
}

/// Query the host for the full current tab set.
///
/// Callers replace their list wholesale on success and keep the previous
/// list on error.
pub async fn query_tabs() -> Result<Vec<TabInfo>, String> {
    let tabs_js = queryTabs()
        .await
        .map_err(|e| format!("Failed to query tabs: {:?}", e))?;
    serde_wasm_bindgen::from_value(tabs_js).map_err(|e| format!("Failed to parse tabs: {:?}", e))
}

/// Ask the host to focus a tab. No local state changes here; the next
/// lifecycle event or refresh reflects it.
pub async fn activate_tab(tab_id: i32) -> Result<(), String> {
    activateTab(tab_id)
        .await
        .map_err(|e| format!("Failed to activate tab {}: {:?}", tab_id, e))
}

/// Ask the host to close the given tabs in one request. On error none of
/// the ids may be assumed removed.
pub async fn close_tabs(tab_ids: &[i32]) -> Result<(), String> {
    let ids_js = serde_wasm_bindgen::to_value(tab_ids)
        .map_err(|e| format!("Failed to serialize tab ids: {:?}", e))?;
    removeTabs(ids_js)
        .await
        .map_err(|e| format!("Failed to close tabs: {:?}", e))
}

pub async fn close_tab(tab_id: i32) -> Result<(), String> {
    close_tabs(&[tab_id]).await
}

/// Options for a host "create tab" request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTabRequest {
    pub url: String,
    pub pinned: bool,
    pub active: bool,
}

/// Ask the host to open one tab.
pub async fn create_tab(request: &CreateTabRequest) -> Result<(), String> {
    let options = serde_wasm_bindgen::to_value(request)
        .map_err(|e| format!("Failed to serialize create request: {:?}", e))?;
    createTab(options)
        .await
        .map(|_| ())
        .map_err(|e| format!("Failed to open {}: {:?}", request.url, e))
}

/// Live subscription to host tab lifecycle events (created, removed,
/// updated, moved). Dropping the guard unregisters the bridge listener, so
/// no callback fires into Rust after teardown.
pub struct TabEventSubscription {
    token: JsValue,
    _callback: Closure<dyn FnMut()>,
}

pub fn subscribe_tab_events<F>(on_change: F) -> TabEventSubscription
where
    F: Fn() + 'static,
{
    let callback = Closure::wrap(Box::new(on_change) as Box<dyn FnMut()>);
    let token = onTabsChanged(callback.as_ref().unchecked_ref());
    TabEventSubscription {
        token,
        _callback: callback,
    }
}

impl Drop for TabEventSubscription {
    fn drop(&mut self) {
        offTabsChanged(self.token.clone());
    }
}
