//! File operations for exporting and importing flowcharts.
//!
//! This module handles all file I/O including native file dialogs and
//! WASM-compatible browser downloads and file pickers. Results from async
//! operations come back through the channel in [`FileState`](super::state::FileState)
//! and are applied on the UI thread.

use super::state::{FileOperationResult, FlowchartApp};
use crate::constants::EXPORT_FILE_NAME;
use eframe::egui;
use log::{error, info};

impl FlowchartApp {
    /// Handles pending file operations for both native and WASM platforms.
    ///
    /// Completed operations are applied first, then any newly requested export or
    /// import is started.
    ///
    /// # Arguments
    ///
    /// * `ctx` - The egui context for requesting repaints
    pub fn handle_pending_operations(&mut self, ctx: &egui::Context) {
        self.process_file_results();

        if std::mem::take(&mut self.file.pending_export) {
            self.start_export(ctx);
        }

        if std::mem::take(&mut self.file.pending_import) {
            self.start_import(ctx);
        }
    }

    /// Applies every file operation result that has arrived since the last frame.
    ///
    /// Each import replaces the whole diagram, so when two imports finish together
    /// the one received last wins.
    pub fn process_file_results(&mut self) {
        while let Ok(result) = self.file.file_operation_receiver.try_recv() {
            match result {
                FileOperationResult::ExportCompleted(path) => {
                    self.file.saved_revision = self.editor.revision();
                    info!("Exported flowchart to {path}");
                    self.file.status_message = Some(format!("Exported {path}"));
                }
                FileOperationResult::ImportCompleted(name, content) => {
                    match self.editor.import_json(&content) {
                        Ok(()) => {
                            self.file.saved_revision = self.editor.revision();
                            self.interaction.editing_node_label = false;
                            self.interaction.editing_edge_label = false;
                            self.file.status_message = Some(format!("Imported {name}"));
                        }
                        Err(err) => {
                            error!("Failed to import {name}: {err}");
                            self.file.status_message = Some(format!("Invalid file {name}: {err}"));
                        }
                    }
                }
                FileOperationResult::OperationFailed(message) => {
                    error!("File operation failed: {message}");
                    self.file.status_message = Some(message);
                }
            }
        }
    }

    /// Requests an export on the next frame.
    pub fn export_flowchart(&mut self) {
        self.file.pending_export = true;
    }

    /// Requests an import on the next frame.
    pub fn import_flowchart(&mut self) {
        self.file.pending_import = true;
    }

    /// Serializes the diagram and hands it to a save dialog or browser download.
    fn start_export(&mut self, ctx: &egui::Context) {
        let json = match self.editor.export_json() {
            Ok(json) => json,
            Err(err) => {
                error!("{err}");
                self.file.status_message = Some(err.to_string());
                return;
            }
        };
        let sender = self.file.file_operation_sender.clone();

        #[cfg(target_arch = "wasm32")]
        {
            // Use synchronous download for Firefox compatibility
            let result = match Self::trigger_download(EXPORT_FILE_NAME, &json) {
                Ok(()) => FileOperationResult::ExportCompleted(EXPORT_FILE_NAME.to_string()),
                Err(e) => FileOperationResult::OperationFailed(e),
            };
            let _ = sender.send(result);
            ctx.request_repaint();
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let ctx = ctx.clone();
            tokio::spawn(async move {
                if let Some(handle) = rfd::AsyncFileDialog::new()
                    .add_filter("JSON", &["json"])
                    .set_file_name(EXPORT_FILE_NAME)
                    .save_file()
                    .await
                {
                    let path = handle.path();
                    let result = match std::fs::write(path, json) {
                        Ok(()) => FileOperationResult::ExportCompleted(path.display().to_string()),
                        Err(e) => FileOperationResult::OperationFailed(format!(
                            "Failed to save file: {e}"
                        )),
                    };
                    let _ = sender.send(result);
                }
                ctx.request_repaint();
            });
        }
    }

    /// Opens a file picker and sends the chosen file's content back to the app.
    fn start_import(&mut self, ctx: &egui::Context) {
        let ctx = ctx.clone();
        let sender = self.file.file_operation_sender.clone();

        #[cfg(target_arch = "wasm32")]
        {
            wasm_bindgen_futures::spawn_local(async move {
                match Self::show_open_file_picker().await {
                    Some(file) => {
                        let filename = file.name();
                        let result = match Self::read_file(file).await {
                            Ok(content) => FileOperationResult::ImportCompleted(filename, content),
                            Err(e) => FileOperationResult::OperationFailed(e),
                        };
                        let _ = sender.send(result);
                    }
                    None => {
                        log::debug!("Open dialog cancelled or API not supported");
                    }
                }
                ctx.request_repaint();
            });
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            tokio::spawn(async move {
                if let Some(handle) = rfd::AsyncFileDialog::new()
                    .add_filter("JSON", &["json"])
                    .pick_file()
                    .await
                {
                    let path = handle.path();
                    let result = match std::fs::read_to_string(path) {
                        Ok(json) => {
                            FileOperationResult::ImportCompleted(path.display().to_string(), json)
                        }
                        Err(e) => FileOperationResult::OperationFailed(format!(
                            "Failed to read file: {e}"
                        )),
                    };
                    let _ = sender.send(result);
                }
                ctx.request_repaint();
            });
        }
    }

    /// Triggers a file download in the browser (WASM only, Firefox-compatible).
    ///
    /// Creates a temporary anchor element with a blob URL and clicks it.
    #[cfg(target_arch = "wasm32")]
    fn trigger_download(filename: &str, content: &str) -> Result<(), String> {
        use wasm_bindgen::JsCast;

        let window = web_sys::window().ok_or("No window found")?;
        let document = window.document().ok_or("No document found")?;

        let blob_parts = js_sys::Array::new();
        blob_parts.push(&wasm_bindgen::JsValue::from_str(content));

        let blob_options = web_sys::BlobPropertyBag::new();
        blob_options.set_type("application/json");

        let blob = web_sys::Blob::new_with_str_sequence_and_options(&blob_parts, &blob_options)
            .map_err(|_| "Failed to create blob")?;

        let url = web_sys::Url::create_object_url_with_blob(&blob)
            .map_err(|_| "Failed to create object URL")?;

        let anchor = document
            .create_element("a")
            .map_err(|_| "Failed to create anchor element")?
            .dyn_into::<web_sys::HtmlAnchorElement>()
            .map_err(|_| "Failed to cast to anchor element")?;

        anchor.set_href(&url);
        anchor.set_download(filename);
        anchor.style().set_property("display", "none").ok();

        let body = document.body().ok_or("No body found")?;
        body.append_child(&anchor)
            .map_err(|_| "Failed to append anchor")?;
        anchor.click();
        body.remove_child(&anchor)
            .map_err(|_| "Failed to remove anchor")?;

        web_sys::Url::revoke_object_url(&url).map_err(|_| "Failed to revoke object URL")?;

        Ok(())
    }

    /// Opens a file picker restricted to JSON files (WASM only).
    ///
    /// # Returns
    ///
    /// The selected `File`, or `None` if the user cancelled or the operation failed.
    #[cfg(target_arch = "wasm32")]
    async fn show_open_file_picker() -> Option<web_sys::File> {
        use wasm_bindgen::closure::Closure;
        use wasm_bindgen::JsCast;

        let window = web_sys::window()?;
        let document = window.document()?;

        let input = document
            .create_element("input")
            .ok()?
            .dyn_into::<web_sys::HtmlInputElement>()
            .ok()?;

        input.set_type("file");
        input.set_accept(".json,application/json");
        input.style().set_property("display", "none").ok()?;

        let (sender, receiver) = futures::channel::oneshot::channel::<Option<web_sys::File>>();
        let sender = std::rc::Rc::new(std::cell::RefCell::new(Some(sender)));

        let change_sender = sender.clone();
        let onchange = Closure::wrap(Box::new(move |event: web_sys::Event| {
            let file = event
                .target()
                .and_then(|t| t.dyn_into::<web_sys::HtmlInputElement>().ok())
                .and_then(|input| input.files())
                .and_then(|files| files.get(0));
            settle_picker(&change_sender, file);
        }) as Box<dyn FnMut(_)>);

        // Dismissing the dialog fires `cancel` instead of `change`
        let oncancel = Closure::wrap(Box::new(move |_event: web_sys::Event| {
            settle_picker(&sender, None);
        }) as Box<dyn FnMut(_)>);

        input.set_onchange(Some(onchange.as_ref().unchecked_ref()));
        input
            .add_event_listener_with_callback("cancel", oncancel.as_ref().unchecked_ref())
            .ok()?;

        let body = document.body()?;
        body.append_child(&input).ok()?;
        input.click();

        let file = receiver.await.ok().flatten();

        if body.remove_child(&input).is_err() {
            error!("Failed to remove file input from the page");
        }
        drop(onchange);
        drop(oncancel);

        file
    }

    /// Reads a browser `File` as text (WASM only).
    #[cfg(target_arch = "wasm32")]
    async fn read_file(file: web_sys::File) -> Result<String, String> {
        use wasm_bindgen::JsCast;
        use wasm_bindgen::JsValue;

        let file_reader =
            web_sys::FileReader::new().map_err(|_| "Failed to create FileReader".to_string())?;

        let promise = js_sys::Promise::new(&mut |resolve, reject| {
            let reader = file_reader.clone();

            let onload = wasm_bindgen::closure::Closure::wrap(Box::new(
                move |_event: web_sys::ProgressEvent| {
                    if let Ok(result) = reader.result() {
                        let _ = resolve.call1(&JsValue::NULL, &result);
                    }
                },
            ) as Box<dyn FnMut(_)>);

            file_reader.set_onload(Some(onload.as_ref().unchecked_ref()));
            onload.forget();

            let onerror = wasm_bindgen::closure::Closure::wrap(Box::new(
                move |_event: web_sys::ProgressEvent| {
                    let _ = reject.call1(&JsValue::NULL, &JsValue::from_str("Failed to read file"));
                },
            ) as Box<dyn FnMut(_)>);

            file_reader.set_onerror(Some(onerror.as_ref().unchecked_ref()));
            onerror.forget();
        });

        file_reader
            .read_as_text(&file)
            .map_err(|_| "Failed to start reading file".to_string())?;

        let result = wasm_bindgen_futures::JsFuture::from(promise)
            .await
            .map_err(|e| format!("Failed to read file: {e:?}"))?;

        result
            .as_string()
            .ok_or_else(|| "File content is not a string".to_string())
    }

    /// Discards the current diagram and its history.
    pub fn new_flowchart(&mut self) {
        self.editor.reset();
        self.file.saved_revision = self.editor.revision();
        self.file.status_message = None;
        self.interaction = Default::default();
        self.canvas.initialized = false;
    }
}

/// Delivers the picker result once; later events for the same dialog are ignored.
#[cfg(any(target_arch = "wasm32", test))]
fn settle_picker<T>(
    slot: &std::cell::RefCell<Option<futures::channel::oneshot::Sender<Option<T>>>>,
    value: Option<T>,
) {
    if let Some(sender) = slot.borrow_mut().take() {
        let _ = sender.send(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn test_cancelled_picker_resolves_empty() {
        let (sender, mut receiver) = futures::channel::oneshot::channel::<Option<String>>();
        let slot = RefCell::new(Some(sender));

        settle_picker(&slot, None);

        assert_eq!(receiver.try_recv(), Ok(Some(None)));
        assert!(slot.borrow().is_none());
    }

    #[test]
    fn test_picker_keeps_first_result() {
        let (sender, mut receiver) = futures::channel::oneshot::channel::<Option<String>>();
        let slot = RefCell::new(Some(sender));

        settle_picker(&slot, Some("flowchart.json".to_string()));
        settle_picker(&slot, None);

        assert_eq!(
            receiver.try_recv(),
            Ok(Some(Some("flowchart.json".to_string())))
        );
    }
}
