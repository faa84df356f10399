//! Pagination strategies. Every strategy is built fresh for one request,
//! configured through its setters and consumed exactly once into a
//! [`PageWindow`] that the dialect builders render.

use base64::{
    engine::general_purpose::{STANDARD, STANDARD_NO_PAD, URL_SAFE, URL_SAFE_NO_PAD},
    Engine as _,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const DEFAULT_CURSOR_FIELD: &str = "id";

/// Rows strictly after `last_id` on `field`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorPosition {
    pub field: String,
    pub last_id: i64,
}

/// What a paginator asks the builder to emit.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PageWindow {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub after: Option<CursorPosition>,
}

impl PageWindow {
    pub fn is_empty(&self) -> bool {
        self.limit.is_none() && self.offset.is_none() && self.after.is_none()
    }

    /// Caps the limit at `max` when a cap is configured.
    pub fn clamp(mut self, max: Option<i64>) -> Self {
        if let (Some(limit), Some(max)) = (self.limit, max.filter(|m| *m > 0)) {
            self.limit = Some(limit.min(max));
        }

        self
    }

    fn limited(limit: i64, offset: i64) -> Self {
        if limit <= 0 {
            return Self::default();
        }

        Self {
            limit: Some(limit),
            offset: (offset > 0).then_some(offset),
            after: None,
        }
    }
}

pub trait Paginate {
    fn into_window(self) -> PageWindow;
}

#[derive(Debug, Clone, Default)]
pub struct OffsetPaginator {
    offset: i64,
    limit: i64,
}

impl OffsetPaginator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_offset(&mut self, offset: i64) -> &mut Self {
        self.offset = offset;
        self
    }

    pub fn set_limit(&mut self, limit: i64) -> &mut Self {
        self.limit = limit;
        self
    }
}

impl Paginate for OffsetPaginator {
    fn into_window(self) -> PageWindow {
        PageWindow::limited(self.limit, self.offset)
    }
}

#[derive(Debug, Clone)]
pub struct PagePaginator {
    page: i64,
    size: i64,
    default_size: i64,
}

impl Default for PagePaginator {
    fn default() -> Self {
        Self {
            page: 1,
            size: 0,
            default_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PagePaginator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_page(&mut self, page: i64) -> &mut Self {
        self.page = page;
        self
    }

    pub fn set_size(&mut self, size: i64) -> &mut Self {
        self.size = size;
        self
    }

    /// The size used when no positive size is given.
    pub fn set_default_size(&mut self, size: i64) -> &mut Self {
        self.default_size = size;
        self
    }
}

impl Paginate for PagePaginator {
    fn into_window(self) -> PageWindow {
        let page = self.page.max(1);
        let size = effective_size(self.size, self.default_size);

        PageWindow::limited(size, (page - 1).saturating_mul(size))
    }
}

#[derive(Debug, Clone)]
pub struct TokenPaginator {
    token: String,
    size: i64,
    default_size: i64,
    cursor_field: String,
}

impl Default for TokenPaginator {
    fn default() -> Self {
        Self {
            token: String::new(),
            size: 0,
            default_size: DEFAULT_PAGE_SIZE,
            cursor_field: DEFAULT_CURSOR_FIELD.to_owned(),
        }
    }
}

impl TokenPaginator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_token(&mut self, token: impl Into<String>) -> &mut Self {
        self.token = token.into();
        self
    }

    pub fn set_size(&mut self, size: i64) -> &mut Self {
        self.size = size;
        self
    }

    pub fn set_default_size(&mut self, size: i64) -> &mut Self {
        self.default_size = size;
        self
    }

    pub fn set_cursor_field(&mut self, field: impl Into<String>) -> &mut Self {
        self.cursor_field = field.into();
        self
    }
}

impl Paginate for TokenPaginator {
    fn into_window(self) -> PageWindow {
        let size = effective_size(self.size, self.default_size);
        let mut window = PageWindow::limited(size, 0);

        match CursorToken::decode(&self.token) {
            Some(token) => {
                window.after = Some(CursorPosition {
                    field: self.cursor_field,
                    last_id: token.last_id,
                });
            }
            None => {
                debug!(
                    target: "query_structure::pagination",
                    token = %self.token,
                    "Undecodable page token, paginating from the start."
                );
            }
        }

        window
    }
}

fn effective_size(size: i64, default_size: i64) -> i64 {
    if size > 0 {
        size
    } else if default_size > 0 {
        default_size
    } else {
        DEFAULT_PAGE_SIZE
    }
}

/// The opaque page token: base64 of `{"last_id": <i64>}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorToken {
    pub last_id: i64,
}

impl CursorToken {
    pub fn new(last_id: i64) -> Self {
        Self { last_id }
    }

    pub fn encode(&self) -> String {
        let json = serde_json::json!({ "last_id": self.last_id });
        STANDARD.encode(json.to_string())
    }

    /// Accepts standard and URL-safe alphabets, padded or not. Any failure
    /// yields `None`.
    pub fn decode(token: &str) -> Option<Self> {
        let token = token.trim();

        if token.is_empty() {
            return None;
        }

        let bytes = STANDARD
            .decode(token)
            .or_else(|_| URL_SAFE.decode(token))
            .or_else(|_| URL_SAFE_NO_PAD.decode(token))
            .or_else(|_| STANDARD_NO_PAD.decode(token))
            .ok()?;

        serde_json::from_slice(&bytes).ok()
    }
}

/// Pagination inputs of a request. Exactly one strategy is picked: a token
/// wins over a page number, a page number over an offset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationParams {
    pub token: Option<String>,
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub offset: Option<i64>,
    pub limit: Option<i64>,
}

/// Request independent pagination settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationSettings {
    pub default_page_size: i64,
    pub max_page_size: Option<i64>,
    pub cursor_field: String,
}

impl Default for PaginationSettings {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: None,
            cursor_field: DEFAULT_CURSOR_FIELD.to_owned(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Pagination {
    Offset(OffsetPaginator),
    Page(PagePaginator),
    Token(TokenPaginator),
}

impl Paginate for Pagination {
    fn into_window(self) -> PageWindow {
        match self {
            Pagination::Offset(p) => p.into_window(),
            Pagination::Page(p) => p.into_window(),
            Pagination::Token(p) => p.into_window(),
        }
    }
}

impl PaginationParams {
    pub fn select(&self, settings: &PaginationSettings) -> Option<Pagination> {
        let size = self.size.or(self.limit).unwrap_or(0);

        if let Some(token) = &self.token {
            let mut paginator = TokenPaginator::new();

            paginator
                .set_token(token.as_str())
                .set_size(size)
                .set_default_size(settings.default_page_size)
                .set_cursor_field(settings.cursor_field.as_str());

            return Some(Pagination::Token(paginator));
        }

        if let Some(page) = self.page {
            let mut paginator = PagePaginator::new();

            paginator
                .set_page(page)
                .set_size(size)
                .set_default_size(settings.default_page_size);

            return Some(Pagination::Page(paginator));
        }

        if self.offset.is_some() || self.limit.is_some() {
            let mut paginator = OffsetPaginator::new();

            paginator
                .set_offset(self.offset.unwrap_or(0))
                .set_limit(self.limit.unwrap_or(0));

            return Some(Pagination::Offset(paginator));
        }

        None
    }

    /// Selects, consumes and clamps in one go.
    pub fn window(&self, settings: &PaginationSettings) -> PageWindow {
        self.select(settings)
            .map(Paginate::into_window)
            .unwrap_or_default()
            .clamp(settings.max_page_size)
    }
}
