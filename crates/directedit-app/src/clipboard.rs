//! System clipboard backends.

use directedit_core::{Clipboard, ClipboardError};

/// The desktop clipboard through `arboard`.
///
/// A fresh handle is opened for every write; some platforms drop the
/// contents when the owning handle goes away, so the handle is kept until
/// the next write replaces it.
#[cfg(feature = "native")]
#[derive(Default)]
pub struct SystemClipboard {
    handle: Option<arboard::Clipboard>,
}

#[cfg(feature = "native")]
impl SystemClipboard {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(feature = "native")]
impl Clipboard for SystemClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        let mut clipboard =
            arboard::Clipboard::new().map_err(|e| ClipboardError::Unavailable(e.to_string()))?;
        clipboard
            .set_text(text.to_string())
            .map_err(|e| ClipboardError::Write(e.to_string()))?;
        self.handle = Some(clipboard);
        Ok(())
    }
}

/// `navigator.clipboard.writeText`.
///
/// The browser write settles asynchronously, so the toolkit hands the text
/// to the host, which awaits [`WebClipboard::write`] and reports the result.
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Default)]
pub struct WebClipboard;

#[cfg(target_arch = "wasm32")]
impl WebClipboard {
    /// Write `text` and wait for the browser to accept or reject it.
    pub async fn write(text: String) -> Result<(), ClipboardError> {
        let window =
            web_sys::window().ok_or_else(|| ClipboardError::Unavailable("No window".to_string()))?;
        let promise = window.navigator().clipboard().write_text(&text);
        wasm_bindgen_futures::JsFuture::from(promise)
            .await
            .map(|_| ())
            .map_err(|e| ClipboardError::Write(format!("{:?}", e)))
    }
}

#[cfg(target_arch = "wasm32")]
impl Clipboard for WebClipboard {
    fn write_text(&mut self, _text: &str) -> Result<(), ClipboardError> {
        Err(ClipboardError::Unavailable(
            "navigator.clipboard writes are asynchronous".to_string(),
        ))
    }

    fn is_async(&self) -> bool {
        true
    }
}
