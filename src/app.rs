use std::sync::Arc;

use ratatui::layout::Rect;

use crate::chat::{ChatBackend, ChatSession};
use crate::router::Route;

pub struct App {
    // Core state
    pub should_quit: bool,
    pub route: Route,

    // Page body scroll
    pub page_scroll: u16,
    pub page_max_scroll: u16, // written by the renderer
    pub page_height: u16,

    // Chat widget: Some while open
    pub chat: Option<ChatSession>,
    pub backend: Arc<dyn ChatBackend>,
    pub model_name: String,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // Panel areas for mouse hit-testing (updated during render)
    pub page_area: Option<Rect>,
    pub chat_area: Option<Rect>,
}

impl App {
    pub fn new(backend: Arc<dyn ChatBackend>, model_name: &str) -> Self {
        Self {
            should_quit: false,
            route: Route::default(),

            page_scroll: 0,
            page_max_scroll: 0,
            page_height: 0,

            chat: None,
            backend,
            model_name: model_name.to_string(),

            animation_frame: 0,

            page_area: None,
            chat_area: None,
        }
    }

    pub fn navigate(&mut self, route: Route) {
        if self.route != route {
            tracing::debug!(path = route.path(), "navigate");
            self.route = route;
            self.page_scroll = 0;
        }
    }

    /// Returns `false` for paths no route matches.
    pub fn navigate_path(&mut self, path: &str) -> bool {
        match Route::from_path(path) {
            Some(route) => {
                self.navigate(route);
                true
            }
            None => false,
        }
    }

    pub fn is_chat_open(&self) -> bool {
        self.chat.is_some()
    }

    pub fn open_chat(&mut self) {
        if self.chat.is_none() {
            tracing::info!("chat opened");
            self.chat = Some(ChatSession::new(Arc::clone(&self.backend)));
            self.animation_frame = 0;
        }
    }

    /// Drop the session. An in-flight request keeps running detached and its
    /// reply is never applied.
    pub fn close_chat(&mut self) {
        if let Some(session) = self.chat.take() {
            if session.is_pending() {
                tracing::info!("chat closed with a request in flight; reply will be discarded");
            } else {
                tracing::info!("chat closed");
            }
            self.chat_area = None;
        }
    }

    pub fn tick(&mut self) {
        if let Some(chat) = self.chat.as_mut() {
            chat.poll_reply();
            if chat.is_pending() {
                self.animation_frame = (self.animation_frame + 1) % 3;
            }
        }
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.page_scroll = self.page_scroll.saturating_add(lines).min(self.page_max_scroll);
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.page_scroll = self.page_scroll.saturating_sub(lines);
    }

    pub fn scroll_half_page_down(&mut self) {
        self.scroll_down((self.page_height / 2).max(1));
    }

    pub fn scroll_half_page_up(&mut self) {
        self.scroll_up((self.page_height / 2).max(1));
    }

    pub fn scroll_top(&mut self) {
        self.page_scroll = 0;
    }

    pub fn scroll_bottom(&mut self) {
        self.page_scroll = self.page_max_scroll;
    }
}
