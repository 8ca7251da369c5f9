//! Per-view load state.
//!
//! Each page view owns one of these. A load is started with [`begin`], which
//! hands out a ticket; only the completion carrying the newest ticket is
//! applied, so an out-of-order response cannot overwrite a newer one.
//!
//! [`begin`]: DetailView::begin

use tracing::{error, warn};

use crate::error::ContentError;
use crate::models::Post;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

#[derive(Debug, Default)]
struct Tickets {
    latest: u64,
}

impl Tickets {
    fn issue(&mut self) -> Ticket {
        self.latest += 1;
        Ticket(self.latest)
    }

    fn is_current(&self, ticket: Ticket) -> bool {
        ticket.0 == self.latest
    }
}

/// The three things a detail page can show.
#[derive(Debug)]
pub enum LoadState<T> {
    Loading,
    Failed(ContentError),
    Loaded(T),
}

/// A single post looked up by slug.
#[derive(Debug)]
pub struct DetailView {
    tickets: Tickets,
    state: LoadState<Post>,
}

impl Default for DetailView {
    fn default() -> Self {
        DetailView {
            tickets: Tickets::default(),
            state: LoadState::Loading,
        }
    }
}

impl DetailView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self) -> Ticket {
        self.state = LoadState::Loading;
        self.tickets.issue()
    }

    /// Applies a fetch result. Returns `false` when the ticket is stale and
    /// the result was dropped.
    pub fn complete(&mut self, ticket: Ticket, result: Result<Post, ContentError>) -> bool {
        if !self.tickets.is_current(ticket) {
            warn!("Ignoring stale post response");
            return false;
        }
        self.state = match result {
            Ok(post) => LoadState::Loaded(post),
            Err(e) => {
                error!("Failed to fetch post: {}", e);
                LoadState::Failed(e)
            }
        };
        true
    }

    pub fn state(&self) -> &LoadState<Post> {
        &self.state
    }
}

/// The home page's post list. Failures keep whatever was shown before.
#[derive(Debug, Default)]
pub struct ListView {
    tickets: Tickets,
    posts: Vec<Post>,
}

impl ListView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self) -> Ticket {
        self.tickets.issue()
    }

    pub fn complete(&mut self, ticket: Ticket, result: Result<Vec<Post>, ContentError>) -> bool {
        if !self.tickets.is_current(ticket) {
            warn!("Ignoring stale post list response");
            return false;
        }
        match result {
            Ok(posts) => self.posts = posts,
            Err(e) => error!("Failed to fetch posts: {}", e),
        }
        true
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }
}
