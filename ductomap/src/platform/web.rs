//! Loading for WASM32 (web) targets through the `fetch` API.

use async_trait::async_trait;
use bytes::Bytes;
use js_sys::Uint8Array;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, RequestMode, Response, WorkerGlobalScope};

use crate::error::LoadError;
use crate::platform::GeoJsonSource;

/// Source for the web target. Relative urls resolve against the page location.
#[derive(Debug, Default, Clone)]
pub struct WebSource {}

impl WebSource {
    /// Creates a new source.
    pub fn new() -> Self {
        Self {}
    }
}

#[async_trait(?Send)]
impl GeoJsonSource for WebSource {
    async fn load_bytes(&self, url: &str) -> Result<Bytes, LoadError> {
        let opts = RequestInit::new();
        opts.set_method("GET");
        opts.set_mode(RequestMode::Cors);

        let request = Request::new_with_str_and_init(url, &opts)?;
        request.headers().set("Accept", "application/geo+json")?;

        let resp_value = if let Some(window) = web_sys::window() {
            JsFuture::from(window.fetch_with_request(&request)).await?
        } else if let Ok(global) = js_sys::global().dyn_into::<WorkerGlobalScope>() {
            JsFuture::from(global.fetch_with_request(&request)).await?
        } else {
            return Err(LoadError::Io {
                url: url.to_string(),
                reason: "global object is not available".to_string(),
            });
        };

        let resp: Response = resp_value.dyn_into()?;
        if !resp.ok() {
            return Err(LoadError::Http {
                url: url.to_string(),
                status: resp.status(),
            });
        }

        let bytes_val = JsFuture::from(resp.array_buffer()?).await?;
        let array = Uint8Array::new(&bytes_val);
        Ok(array.to_vec().into())
    }
}

/// Routes `log` records to the browser console and panics to `console.error`.
pub fn init_logging(level: log::Level) {
    console_error_panic_hook::set_once();
    if let Err(err) = console_log::init_with_level(level) {
        web_sys::console::warn_1(&format!("logger is already initialized: {err}").into());
    }
}
