use std::cell::{OnceCell, RefCell};
use std::rc::Rc;

use bolt_core::mode::{AI_CHAT_MODE, ChatRole, ChatSession, Mode};
use gtk4::Orientation;
use gtk4::prelude::*;
use tracing::{debug, warn};

use super::ViewContext;

struct ChatView {
    root: gtk4::Box,
    transcript: gtk4::Box,
    scrolled: gtk4::ScrolledWindow,
    entry: gtk4::Entry,
}

struct Chat {
    ctx: ViewContext,
    session: RefCell<ChatSession>,
    view: OnceCell<ChatView>,
}

pub struct ChatMode {
    inner: Rc<Chat>,
}

impl ChatMode {
    pub fn new(ctx: ViewContext) -> Self {
        Self {
            inner: Rc::new(Chat {
                ctx,
                session: RefCell::new(ChatSession::default()),
                view: OnceCell::new(),
            }),
        }
    }
}

impl Mode<gtk4::Widget> for ChatMode {
    fn name(&self) -> &str {
        AI_CHAT_MODE
    }

    fn icon_name(&self) -> &str {
        "chat-symbolic"
    }

    fn view(&mut self) -> Option<gtk4::Widget> {
        if self.inner.view.get().is_none() {
            let _ = self.inner.view.set(build_view(&self.inner));
            self.inner.render();
        }
        self.inner.view.get().map(|view| view.root.clone().upcast())
    }

    fn activate(&mut self) {
        if let Some(view) = self.inner.view.get() {
            view.entry.grab_focus();
        }
    }
}

impl Chat {
    fn submit(&self, prompt: &str) {
        let result = {
            let ai = self.ctx.ai.borrow();
            self.session.borrow_mut().submit(prompt, &ai)
        };

        match result {
            Ok(Some(request)) => {
                debug!(
                    "Chat request for {} with {} message(s)",
                    request.provider,
                    request.history.len()
                );
                self.session.borrow_mut().push(
                    ChatRole::Error,
                    &format!("{} is not available in this build", request.provider),
                );
            }
            Ok(None) => return,
            Err(e) => warn!("Chat request rejected: {e}"),
        }

        self.render();
    }

    fn render(&self) {
        let Some(view) = self.view.get() else {
            return;
        };

        while let Some(child) = view.transcript.first_child() {
            view.transcript.remove(&child);
        }

        for message in self.session.borrow().transcript() {
            let css_class = match message.role {
                ChatRole::User => "chat-user",
                ChatRole::Assistant => "chat-assistant",
                ChatRole::Error => "chat-error",
            };
            let label = gtk4::Label::builder()
                .label(message.text.as_str())
                .wrap(true)
                .selectable(true)
                .xalign(0.0)
                .halign(if message.role == ChatRole::User {
                    gtk4::Align::End
                } else {
                    gtk4::Align::Start
                })
                .css_classes([css_class])
                .build();
            view.transcript.append(&label);
        }

        let adjustment = view.scrolled.vadjustment();
        adjustment.set_value(adjustment.upper());
    }
}

fn build_view(chat: &Rc<Chat>) -> ChatView {
    let root = gtk4::Box::builder()
        .orientation(Orientation::Vertical)
        .spacing(8)
        .css_classes(["chat-view"])
        .build();

    let transcript = gtk4::Box::builder()
        .orientation(Orientation::Vertical)
        .spacing(6)
        .build();

    let scrolled = gtk4::ScrolledWindow::builder()
        .hscrollbar_policy(gtk4::PolicyType::Never)
        .vexpand(true)
        .child(&transcript)
        .build();

    let entry = gtk4::Entry::builder()
        .placeholder_text("Ask something")
        .hexpand(true)
        .build();

    let weak = Rc::downgrade(chat);
    entry.connect_activate(move |entry| {
        let Some(chat) = weak.upgrade() else {
            return;
        };
        let prompt = entry.text().to_string();
        entry.set_text("");
        chat.submit(&prompt);
    });

    root.append(&scrolled);
    root.append(&entry);

    ChatView {
        root,
        transcript,
        scrolled,
        entry,
    }
}
