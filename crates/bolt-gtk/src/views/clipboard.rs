use std::cell::{OnceCell, RefCell};
use std::rc::Rc;

use bolt_core::mode::{CLIPBOARD_MODE, ClipboardHistory, Mode};
use bolt_core::{Error, Result};
use gtk4::gdk;
use gtk4::glib;
use gtk4::prelude::*;
use tracing::{debug, warn};

use super::{SearchList, ViewContext, row_index};

struct Clipboard {
    ctx: ViewContext,
    clipboard: gdk::Clipboard,
    history: RefCell<ClipboardHistory>,
    /// Entries currently listed, in row order.
    shown: RefCell<Vec<String>>,
    view: OnceCell<SearchList>,
}

pub struct ClipboardMode {
    inner: Rc<Clipboard>,
}

impl ClipboardMode {
    /// Start recording the display clipboard.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Process`] when there is no display to read from.
    pub fn new(ctx: ViewContext) -> Result<Self> {
        let display = gdk::Display::default()
            .ok_or_else(|| Error::Process("No display available for clipboard access".into()))?;

        let inner = Rc::new(Clipboard {
            ctx,
            clipboard: display.clipboard(),
            history: RefCell::new(ClipboardHistory::default()),
            shown: RefCell::new(Vec::new()),
            view: OnceCell::new(),
        });

        let weak = Rc::downgrade(&inner);
        inner.clipboard.connect_changed(move |clipboard| {
            let weak = weak.clone();
            let clipboard = clipboard.clone();
            glib::spawn_future_local(async move {
                let text = match clipboard.read_text_future().await {
                    Ok(Some(text)) => text,
                    Ok(None) => return,
                    Err(e) => {
                        debug!("Clipboard content is not text: {e}");
                        return;
                    }
                };
                if let Some(inner) = weak.upgrade()
                    && inner.history.borrow_mut().push(&text)
                {
                    inner.refresh();
                }
            });
        });

        Ok(Self { inner })
    }
}

impl Mode<gtk4::Widget> for ClipboardMode {
    fn name(&self) -> &str {
        CLIPBOARD_MODE
    }

    fn icon_name(&self) -> &str {
        "edit-copy-symbolic"
    }

    fn view(&mut self) -> Option<gtk4::Widget> {
        if self.inner.view.get().is_none() {
            let _ = self.inner.view.set(build_view(&self.inner));
            self.inner.refresh();
        }
        self.inner.view.get().map(SearchList::widget)
    }

    fn activate(&mut self) {
        if let Some(view) = self.inner.view.get() {
            view.entry.grab_focus();
        }
    }
}

impl Clipboard {
    fn refresh(&self) {
        let Some(view) = self.view.get() else {
            return;
        };

        let query = view.entry.text();
        let shown: Vec<String> = self
            .history
            .borrow()
            .filtered(&query)
            .into_iter()
            .map(str::to_string)
            .collect();

        view.set_rows(shown.iter().map(|text| (None, first_line(text))));
        *self.shown.borrow_mut() = shown;
    }

    fn copy(&self, index: usize) {
        let Some(text) = self.shown.borrow().get(index).cloned() else {
            warn!("No clipboard entry at row {index}");
            return;
        };
        self.clipboard.set_text(&text);
        self.ctx.hide_window();
    }
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or(text)
}

fn build_view(clipboard: &Rc<Clipboard>) -> SearchList {
    let view = SearchList::new("Filter clipboard history", "clipboard-view");

    let weak = Rc::downgrade(clipboard);
    view.entry.connect_search_changed(move |_| {
        if let Some(clipboard) = weak.upgrade() {
            clipboard.refresh();
        }
    });

    let weak = Rc::downgrade(clipboard);
    view.entry.connect_activate(move |_| {
        if let Some(clipboard) = weak.upgrade() {
            clipboard.copy(0);
        }
    });

    let weak = Rc::downgrade(clipboard);
    view.list.connect_row_activated(move |_, row| {
        if let (Some(clipboard), Some(index)) = (weak.upgrade(), row_index(row)) {
            clipboard.copy(index);
        }
    });

    view
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_line() {
        assert_eq!(first_line("one\ntwo"), "one");
        assert_eq!(first_line("single"), "single");
        assert_eq!(first_line(""), "");
    }
}
