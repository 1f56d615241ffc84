use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::api::{ApiError, Backend, NewReview, Review, SearchResult};
use crate::view;

pub const SEARCH_FAILED: &str = "Failed to fetch movies";
pub const REVIEWS_FAILED: &str = "Failed to load reviews";
pub const SUBMIT_FAILED: &str = "Failed to submit review";
pub const DELETE_FAILED: &str = "Failed to delete review";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Popup {
    None,
    Help,
    ConfirmDelete,
}

/// Which view is on screen, derived from `selected_title`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Search,
    Review,
}

/// Keyboard focus within the current mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Input, // Keyword field in search mode, draft field in review mode
    List,  // Results in search mode, reviews in review mode
}

/// A finished backend request, delivered back to the event loop
#[derive(Debug)]
pub enum Completion {
    Search {
        seq: u64,
        page: u32,
        result: Result<SearchResult, ApiError>,
    },
    Reviews {
        seq: u64,
        title: String,
        result: Result<Vec<Review>, ApiError>,
    },
    Submit {
        title: String,
        result: Result<(), ApiError>,
    },
    Delete {
        id: i64,
        title: Option<String>,
        result: Result<(), ApiError>,
    },
}

pub struct App {
    backend: Arc<dyn Backend>,
    completions_tx: UnboundedSender<Completion>,
    completions_rx: UnboundedReceiver<Completion>,
    in_flight: usize,

    // Latest issued request per kind; older completions are dropped
    search_seq: u64,
    reviews_seq: u64,

    // Search state
    pub keyword: String,
    pub current_page: u32,
    pub search_result: SearchResult,

    // Single visible error, overwritten by the next one
    pub error_message: Option<String>,

    // Review state (None = search mode)
    pub selected_title: Option<String>,
    pub review_list: Vec<Review>,
    pub draft_review_text: String,

    // Presentation
    pub popup: Popup,
    pub focus: Focus,
    pub selected_result: usize,
    pub selected_review: usize,
    pub pending_delete: Option<i64>,
    pub placeholder_poster: String,
}

impl App {
    pub fn new(backend: Arc<dyn Backend>, placeholder_poster: impl Into<String>) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();

        Self {
            backend,
            completions_tx,
            completions_rx,
            in_flight: 0,

            search_seq: 0,
            reviews_seq: 0,

            keyword: String::new(),
            current_page: 1,
            search_result: SearchResult::default(),

            error_message: None,

            selected_title: None,
            review_list: Vec::new(),
            draft_review_text: String::new(),

            popup: Popup::None,
            focus: Focus::Input,
            selected_result: 0,
            selected_review: 0,
            pending_delete: None,
            placeholder_poster: placeholder_poster.into(),
        }
    }

    pub fn mode(&self) -> Mode {
        if self.selected_title.is_some() {
            Mode::Review
        } else {
            Mode::Search
        }
    }

    pub fn total_pages(&self) -> u32 {
        view::total_pages(self.search_result.total_count)
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight > 0
    }

    /// Whether review mode is open for `title`
    fn is_showing(&self, title: &str) -> bool {
        self.selected_title.as_deref() == Some(title)
    }

    /// True while keystrokes go into a text field
    pub fn is_editing(&self) -> bool {
        self.popup == Popup::None && self.focus == Focus::Input
    }

    /// Run a backend call off the event loop; its result comes back through `tick`
    fn spawn<F>(&mut self, request: F)
    where
        F: Future<Output = Completion> + Send + 'static,
    {
        self.in_flight += 1;
        let tx = self.completions_tx.clone();
        tokio::spawn(async move {
            let _ = tx.send(request.await);
        });
    }

    // ------------------------------------------------------------------
    // Operations
    // ------------------------------------------------------------------

    /// Search for `keyword` and show the given page of results.
    /// Blank keywords are ignored without touching any state.
    pub fn search(&mut self, keyword: &str, page: u32) {
        let trimmed = keyword.trim();
        if trimmed.is_empty() {
            return;
        }

        self.keyword = keyword.to_string();
        self.error_message = None;
        self.search_result = SearchResult::default();
        self.selected_result = 0;

        self.search_seq += 1;
        let seq = self.search_seq;
        let page = page.max(1);
        let query = trimmed.to_string();
        let backend = Arc::clone(&self.backend);

        tracing::info!(keyword = %query, page, seq, "Searching");
        self.spawn(async move {
            let result = backend.search(&query, page).await;
            Completion::Search { seq, page, result }
        });
    }

    pub fn change_page(&mut self, page: u32) {
        let keyword = self.keyword.clone();
        self.search(&keyword, page);
    }

    /// Enter review mode for `title` and load its reviews
    pub fn select_movie(&mut self, title: impl Into<String>) {
        let title = title.into();
        tracing::info!(title = %title, "Selected movie");

        self.selected_title = Some(title.clone());
        self.draft_review_text.clear();
        self.selected_review = 0;
        self.focus = Focus::Input;
        self.fetch_reviews(title);
    }

    fn fetch_reviews(&mut self, title: String) {
        self.reviews_seq += 1;
        let seq = self.reviews_seq;
        let backend = Arc::clone(&self.backend);

        tracing::debug!(title = %title, seq, "Fetching reviews");
        self.spawn(async move {
            let result = backend.fetch_reviews(&title).await;
            Completion::Reviews { seq, title, result }
        });
    }

    pub fn submit_review(&mut self, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        let Some(title) = self.selected_title.clone() else {
            return;
        };

        self.error_message = None;
        let review = NewReview {
            movie_title: title.clone(),
            review_text: text.to_string(),
        };
        let backend = Arc::clone(&self.backend);

        tracing::info!(title = %title, "Submitting review");
        self.spawn(async move {
            let result = backend.create_review(&review).await;
            Completion::Submit { title, result }
        });
    }

    /// Ask for confirmation before deleting; nothing is sent until confirmed
    pub fn request_delete(&mut self, id: i64) {
        self.pending_delete = Some(id);
        self.popup = Popup::ConfirmDelete;
    }

    pub fn confirm_delete(&mut self) {
        self.popup = Popup::None;
        let Some(id) = self.pending_delete.take() else {
            return;
        };
        let title = self.selected_title.clone();
        let backend = Arc::clone(&self.backend);

        tracing::info!(id, "Deleting review");
        self.spawn(async move {
            let result = backend.delete_review(id).await;
            Completion::Delete { id, title, result }
        });
    }

    pub fn decline_delete(&mut self) {
        self.popup = Popup::None;
        self.pending_delete = None;
    }

    /// Back to search mode; results, keyword and page are kept as they were
    pub fn back(&mut self) {
        self.selected_title = None;
        self.popup = Popup::None;
        self.pending_delete = None;
        self.focus = if self.search_result.is_empty() {
            Focus::Input
        } else {
            Focus::List
        };
    }

    // ------------------------------------------------------------------
    // Completions
    // ------------------------------------------------------------------

    /// Apply every completion that has arrived so far
    pub fn tick(&mut self) {
        while let Ok(completion) = self.completions_rx.try_recv() {
            self.apply(completion);
        }
    }

    fn apply(&mut self, completion: Completion) {
        self.in_flight = self.in_flight.saturating_sub(1);

        match completion {
            Completion::Search { seq, page, result } => {
                if seq != self.search_seq {
                    tracing::debug!(seq, latest = self.search_seq, "Dropping stale search");
                    return;
                }
                match result {
                    Ok(result) => {
                        tracing::info!(
                            page,
                            items = result.items.len(),
                            total = result.total_count,
                            "Search complete"
                        );
                        self.search_result = result;
                        self.current_page = page;
                        self.selected_result = 0;
                    }
                    Err(e) => {
                        tracing::warn!("Search failed: {}", e);
                        let message = e.backend_message().unwrap_or(SEARCH_FAILED).to_string();
                        self.error_message = Some(message);
                    }
                }
            }
            Completion::Reviews { seq, title, result } => {
                if seq != self.reviews_seq {
                    tracing::debug!(seq, latest = self.reviews_seq, "Dropping stale reviews");
                    return;
                }
                match result {
                    Ok(reviews) => {
                        tracing::debug!(title = %title, count = reviews.len(), "Reviews loaded");
                        self.review_list = reviews;
                        if self.selected_review >= self.review_list.len() {
                            self.selected_review = self.review_list.len().saturating_sub(1);
                        }
                    }
                    // The previous list stays on screen
                    Err(e) => {
                        tracing::warn!(title = %title, "Loading reviews failed: {}", e);
                        self.error_message = Some(REVIEWS_FAILED.to_string());
                    }
                }
            }
            Completion::Submit { title, result } => match result {
                // Another title may be open by now; its draft and list are left alone
                Ok(()) => {
                    tracing::info!(title = %title, "Review submitted");
                    if self.is_showing(&title) {
                        self.draft_review_text.clear();
                        self.fetch_reviews(title);
                    }
                }
                // Draft is kept so the text isn't lost
                Err(e) => {
                    tracing::warn!(title = %title, "Submitting review failed: {}", e);
                    self.error_message = Some(SUBMIT_FAILED.to_string());
                }
            },
            Completion::Delete { id, title, result } => match result {
                Ok(()) => {
                    tracing::info!(id, "Review deleted");
                    if let Some(title) = title.filter(|t| self.is_showing(t)) {
                        self.fetch_reviews(title);
                    }
                }
                Err(e) => {
                    tracing::warn!(id, "Deleting review failed: {}", e);
                    self.error_message = Some(DELETE_FAILED.to_string());
                }
            },
        }
    }

    /// Wait until nothing is in flight, including follow-up fetches
    #[cfg(test)]
    pub async fn settle(&mut self) {
        while self.in_flight > 0 {
            match self.completions_rx.recv().await {
                Some(completion) => self.apply(completion),
                None => break,
            }
        }
    }

    // ------------------------------------------------------------------
    // Keyboard
    // ------------------------------------------------------------------

    pub fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        // Handle popups first
        if self.popup != Popup::None {
            self.handle_popup_key(key);
            return Ok(());
        }

        match (self.mode(), self.focus) {
            (Mode::Search, Focus::Input) => self.handle_keyword_key(key),
            (Mode::Search, Focus::List) => self.handle_results_key(key),
            (Mode::Review, Focus::Input) => self.handle_draft_key(key),
            (Mode::Review, Focus::List) => self.handle_reviews_key(key),
        }
        Ok(())
    }

    fn handle_popup_key(&mut self, key: KeyEvent) {
        match self.popup {
            Popup::ConfirmDelete => match key.code {
                KeyCode::Char('y') | KeyCode::Enter => self.confirm_delete(),
                KeyCode::Char('n') | KeyCode::Esc => self.decline_delete(),
                _ => {}
            },
            Popup::Help => {
                if matches!(
                    key.code,
                    KeyCode::Esc | KeyCode::Char('?') | KeyCode::Enter | KeyCode::Char('q')
                ) {
                    self.popup = Popup::None;
                }
            }
            Popup::None => {}
        }
    }

    fn handle_keyword_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => {
                let keyword = self.keyword.clone();
                self.search(&keyword, 1);
                if !keyword.trim().is_empty() {
                    self.focus = Focus::List;
                }
            }
            KeyCode::Tab | KeyCode::Down | KeyCode::Esc => {
                if !self.search_result.is_empty() {
                    self.focus = Focus::List;
                }
            }
            KeyCode::Backspace => {
                self.keyword.pop();
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.keyword.push(c);
            }
            _ => {}
        }
    }

    fn handle_results_key(&mut self, key: KeyEvent) {
        let count = self.search_result.items.len();
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                if count > 0 {
                    self.selected_result = (self.selected_result + 1) % count;
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                if count > 0 {
                    self.selected_result = self.selected_result.checked_sub(1).unwrap_or(count - 1);
                }
            }
            KeyCode::Enter => {
                if let Some(movie) = self.search_result.items.get(self.selected_result) {
                    let title = movie.title.clone();
                    self.select_movie(title);
                }
            }
            KeyCode::Char('[') | KeyCode::Left => {
                if self.current_page > 1 {
                    self.change_page(self.current_page - 1);
                }
            }
            KeyCode::Char(']') | KeyCode::Right => {
                if self.current_page < self.total_pages() {
                    self.change_page(self.current_page + 1);
                }
            }
            KeyCode::Char(c @ '1'..='9') => {
                let page = c.to_digit(10).unwrap_or(1);
                if page <= self.total_pages() && page != self.current_page {
                    self.change_page(page);
                }
            }
            KeyCode::Tab | KeyCode::Char('/') | KeyCode::Char('s') => self.focus = Focus::Input,
            KeyCode::Char('?') => self.popup = Popup::Help,
            _ => {}
        }
    }

    fn handle_draft_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => {
                let draft = self.draft_review_text.clone();
                self.submit_review(&draft);
            }
            KeyCode::Esc => self.back(),
            KeyCode::Tab | KeyCode::Down => self.focus = Focus::List,
            KeyCode::Backspace => {
                self.draft_review_text.pop();
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.draft_review_text.push(c);
            }
            _ => {}
        }
    }

    fn handle_reviews_key(&mut self, key: KeyEvent) {
        let count = self.review_list.len();
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                if count > 0 {
                    self.selected_review = (self.selected_review + 1) % count;
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                if count > 0 {
                    self.selected_review = self.selected_review.checked_sub(1).unwrap_or(count - 1);
                }
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                if let Some(review) = self.review_list.get(self.selected_review) {
                    self.request_delete(review.id);
                }
            }
            KeyCode::Tab | KeyCode::Char('i') => self.focus = Focus::Input,
            KeyCode::Esc | KeyCode::Backspace | KeyCode::Char('b') => self.back(),
            KeyCode::Char('?') => self.popup = Popup::Help,
            _ => {}
        }
    }
}
