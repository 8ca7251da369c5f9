use crate::models::{Category, Post};

/// Strips every whitespace character and lowercases, so that loosely
/// authored category codes still match.
pub fn normalize(value: &str) -> String {
    value
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    pub fn key(self) -> &'static str {
        match self {
            CategoryFilter::All => "all",
            CategoryFilter::Only(category) => category.code(),
        }
    }

    /// Every filter in display order, `all` first.
    pub fn options() -> impl Iterator<Item = CategoryFilter> {
        std::iter::once(CategoryFilter::All).chain(Category::ALL.into_iter().map(CategoryFilter::Only))
    }

    /// Maps a query value onto a filter. Unknown or missing keys mean `all`.
    pub fn from_query(raw: Option<&str>) -> CategoryFilter {
        let Some(raw) = raw else {
            return CategoryFilter::All;
        };
        let wanted = normalize(raw);
        CategoryFilter::options()
            .find(|filter| normalize(filter.key()) == wanted)
            .unwrap_or_default()
    }

    pub fn matches(self, post: &Post) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(_) => normalize(&post.category) == normalize(self.key()),
        }
    }
}

pub fn filter_posts<'a>(posts: &'a [Post], filter: CategoryFilter) -> Vec<&'a Post> {
    posts.iter().filter(|post| filter.matches(post)).collect()
}

/// What the home page shows for one filter selection.
#[derive(Debug)]
pub struct HomeFeed<'a> {
    pub daily: Option<&'a Post>,
    pub list: Vec<&'a Post>,
    pub filter: CategoryFilter,
}

impl<'a> HomeFeed<'a> {
    /// `posts` must already be ordered newest first.
    ///
    /// The daily post is dropped from the list only under `all`, and only by
    /// position: a specific filter lists every match, the daily post included.
    pub fn build(posts: &'a [Post], filter: CategoryFilter) -> HomeFeed<'a> {
        let filtered = filter_posts(posts, filter);
        let list = match filter {
            CategoryFilter::All => filtered.into_iter().skip(1).collect(),
            CategoryFilter::Only(_) => filtered,
        };
        HomeFeed {
            daily: posts.first(),
            list,
            filter,
        }
    }
}
