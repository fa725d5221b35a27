use std::cell::{OnceCell, RefCell};
use std::rc::Rc;

use bolt_core::mode::{Mode, WINDOW_MODE, WindowAction};
use gtk4::prelude::*;

use super::{SearchList, ViewContext, row_index};

struct WindowOps {
    ctx: ViewContext,
    shown: RefCell<Vec<WindowAction>>,
    view: OnceCell<SearchList>,
}

pub struct WindowOpsMode {
    inner: Rc<WindowOps>,
}

impl WindowOpsMode {
    pub fn new(ctx: ViewContext) -> Self {
        Self {
            inner: Rc::new(WindowOps {
                ctx,
                shown: RefCell::new(WindowAction::ALL.to_vec()),
                view: OnceCell::new(),
            }),
        }
    }
}

impl Mode<gtk4::Widget> for WindowOpsMode {
    fn name(&self) -> &str {
        WINDOW_MODE
    }

    fn icon_name(&self) -> &str {
        "view-grid-symbolic"
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

impl WindowOps {
    fn refresh(&self) {
        let Some(view) = self.view.get() else {
            return;
        };

        let shown = WindowAction::filter(&view.entry.text());
        view.set_rows(
            shown
                .iter()
                .map(|action| (Some("view-fullscreen-symbolic"), action.label())),
        );
        *self.shown.borrow_mut() = shown;
    }

    fn run(&self, index: usize) {
        let Some(action) = self.shown.borrow().get(index).copied() else {
            return;
        };

        match action.execute() {
            Ok(()) => self.ctx.hide_window(),
            Err(e) => self
                .ctx
                .show_error(&format!("{} failed", action.label()), &e.to_string()),
        }
    }
}

fn build_view(ops: &Rc<WindowOps>) -> SearchList {
    let view = SearchList::new("Filter window actions", "window-view");

    let weak = Rc::downgrade(ops);
    view.entry.connect_search_changed(move |_| {
        if let Some(ops) = weak.upgrade() {
            ops.refresh();
        }
    });

    let weak = Rc::downgrade(ops);
    view.entry.connect_activate(move |_| {
        if let Some(ops) = weak.upgrade() {
            ops.run(0);
        }
    });

    let weak = Rc::downgrade(ops);
    view.list.connect_row_activated(move |_, row| {
        if let (Some(ops), Some(index)) = (weak.upgrade(), row_index(row)) {
            ops.run(index);
        }
    });

    view
}
