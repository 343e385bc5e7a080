use serde::Serialize;

use super::PostCard;
use crate::{
	model::{FeedPage, Post},
	service::FeedQuery,
};

pub const LOADING_TEXT: &str = "Loading feed...";
pub const LOADING_MORE_TEXT: &str = "Loading more posts...";
pub const ERROR_TITLE: &str = "Error loading feed";
pub const ERROR_FALLBACK: &str = "Something went wrong";
pub const RETRY_TEXT: &str = "Try Again";
pub const EMPTY_TITLE: &str = "No posts yet";
pub const EMPTY_TEXT: &str = "Be the first to share your activity with the community!";

/// The next page is requested once the remaining content is within this
/// fraction of the viewport height.
pub const LOAD_MORE_THRESHOLD: f64 = 0.1;

/// Scroll position of the list, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scroll {
	pub offset: f64,
	pub viewport: f64,
	pub content: f64,
}

impl Scroll {
	pub fn near_end(&self) -> bool {
		let remaining = self.content - self.offset - self.viewport;

		remaining <= self.viewport * LOAD_MORE_THRESHOLD
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Status {
	Loading,
	Ready,
	Failed(Option<String>),
}

/// What the feed renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeedScreen<'a> {
	Loading {
		message: &'static str,
	},
	Error {
		title: &'static str,
		message: &'a str,
		retry: &'static str,
	},
	Empty {
		title: &'static str,
		message: &'static str,
	},
	List {
		cards: Vec<PostCard<'a>>,
		footer: Option<&'static str>,
	},
}

/// The infinite-scrolling feed.
///
/// Pages accumulate in request order. The list asks for a page by returning
/// a [`FeedQuery`]; the caller runs it and reports back with
/// [`FeedList::page_loaded`] or [`FeedList::page_failed`].
#[derive(Debug, Clone)]
pub struct FeedList {
	limit: u32,
	account_id: Option<uuid::Uuid>,
	pages: Vec<FeedPage>,
	status: Status,
	in_flight: Option<u32>,
}

impl FeedList {
	/// Creates the list and returns the query for its first page.
	pub fn new(limit: u32) -> (Self, FeedQuery) {
		let mut list = Self {
			limit,
			account_id: None,
			pages: Vec::new(),
			status: Status::Loading,
			in_flight: None,
		};
		let query = list.request(0);

		(list, query)
	}

	/// Like [`FeedList::new`], restricted to one account's posts.
	pub fn for_account(limit: u32, account_id: uuid::Uuid) -> (Self, FeedQuery) {
		let (mut list, _) = Self::new(limit);
		list.account_id = Some(account_id);
		let query = list.request(0);

		(list, query)
	}

	fn request(&mut self, page: u32) -> FeedQuery {
		self.in_flight = Some(page);

		FeedQuery {
			account_id: self.account_id,
			..FeedQuery::page(page, self.limit)
		}
	}

	/// Whether `query` is the request the list is waiting on. Responses to
	/// anything else arrived after a refresh replaced them.
	fn answers(&self, query: &FeedQuery) -> bool {
		self.in_flight == Some(query.page) && query.account_id == self.account_id
	}

	/// Records the page fetched for `query`. Stale responses are ignored.
	pub fn page_loaded(&mut self, query: FeedQuery, page: FeedPage) {
		if !self.answers(&query) {
			return;
		}

		self.in_flight = None;

		if query.page == 0 {
			self.pages = vec![page];
		} else {
			self.pages.push(page);
		}

		self.status = Status::Ready;
	}

	/// Records a failed fetch for `query`. With nothing loaded yet the whole
	/// list shows the error; a failed next page leaves the loaded posts in
	/// place. Stale failures are ignored.
	pub fn page_failed(&mut self, query: FeedQuery, message: Option<String>) {
		if !self.answers(&query) {
			return;
		}

		self.in_flight = None;

		if self.pages.is_empty() {
			self.status = Status::Failed(message.filter(|message| !message.is_empty()));
		}
	}

	pub fn posts(&self) -> impl Iterator<Item = &Post> {
		self.pages.iter().flat_map(|page| &page.data)
	}

	pub fn has_next_page(&self) -> bool {
		self.pages.last().is_some_and(|page| page.next_page.is_some())
	}

	pub fn is_fetching_next_page(&self) -> bool {
		self.in_flight.is_some_and(|page| page > 0)
	}

	/// Returns the next page's query when the list is near its end, a next
	/// page exists and nothing is in flight.
	pub fn load_more(&mut self, scroll: Scroll) -> Option<FeedQuery> {
		if self.status != Status::Ready || self.in_flight.is_some() || !scroll.near_end() {
			return None;
		}

		let next = self.pages.last()?.next_page?;

		Some(self.request(next))
	}

	/// Starts over from the first page. Loaded posts stay visible until it
	/// arrives; a failed list goes back to loading.
	pub fn refresh(&mut self) -> FeedQuery {
		if self.pages.is_empty() {
			self.status = Status::Loading;
		}

		self.request(0)
	}

	pub fn screen(&self) -> FeedScreen<'_> {
		match &self.status {
			Status::Loading => FeedScreen::Loading {
				message: LOADING_TEXT,
			},
			Status::Failed(message) => FeedScreen::Error {
				title: ERROR_TITLE,
				message: message.as_deref().unwrap_or(ERROR_FALLBACK),
				retry: RETRY_TEXT,
			},
			Status::Ready if self.pages.iter().all(|page| page.data.is_empty()) => {
				FeedScreen::Empty {
					title: EMPTY_TITLE,
					message: EMPTY_TEXT,
				}
			}
			Status::Ready => FeedScreen::List {
				cards: self.posts().map(PostCard::from).collect(),
				footer: self.is_fetching_next_page().then_some(LOADING_MORE_TEXT),
			},
		}
	}
}

#[cfg(test)]
mod test {
	use chrono::Utc;
	use uuid::Uuid;

	use super::*;
	use crate::service::DEFAULT_CHALLENGE_ID;

	const NEAR_END: Scroll = Scroll {
		offset: 1000.0,
		viewport: 800.0,
		content: 1850.0,
	};

	const FAR: Scroll = Scroll {
		offset: 0.0,
		viewport: 800.0,
		content: 4000.0,
	};

	fn page(titles: &[&str], next_page: Option<u32>) -> FeedPage {
		FeedPage {
			data: titles
				.iter()
				.map(|title| Post {
					id: Uuid::new_v4(),
					account_id: Uuid::new_v4(),
					title: (*title).into(),
					body: None,
					image_url: None,
					challenge_id: DEFAULT_CHALLENGE_ID,
					created_at: Utc::now(),
				})
				.collect(),
			has_more: next_page.is_some(),
			total_count: 0,
			next_page,
		}
	}

	#[test]
	fn test_scroll_threshold() {
		assert!(NEAR_END.near_end());
		assert!(!FAR.near_end());
	}

	#[test]
	fn test_pages_accumulate() {
		let (mut list, first) = FeedList::new(2);
		assert_eq!(first.range(), (0, 1));
		assert_eq!(
			list.screen(),
			FeedScreen::Loading {
				message: LOADING_TEXT
			}
		);

		list.page_loaded(first, page(&["c", "b"], Some(1)));
		assert!(list.load_more(FAR).is_none());

		let next = list.load_more(NEAR_END).unwrap();
		assert_eq!(next.range(), (2, 3));
		assert!(list.load_more(NEAR_END).is_none(), "one fetch at a time");

		let FeedScreen::List { footer, .. } = list.screen() else {
			panic!("expected a list");
		};
		assert_eq!(footer, Some(LOADING_MORE_TEXT));

		list.page_loaded(next, page(&["a"], None));

		let titles = list.posts().map(|post| post.title.as_str()).collect::<Vec<_>>();
		assert_eq!(titles, ["c", "b", "a"]);
		assert!(!list.has_next_page());
		assert!(list.load_more(NEAR_END).is_none());
	}

	#[test]
	fn test_error_and_retry() {
		let (mut list, first) = FeedList::new(10);

		list.page_failed(first, None);
		assert_eq!(
			list.screen(),
			FeedScreen::Error {
				title: ERROR_TITLE,
				message: ERROR_FALLBACK,
				retry: RETRY_TEXT,
			}
		);

		let query = list.refresh();
		assert_eq!(query.page, 0);
		assert!(matches!(list.screen(), FeedScreen::Loading { .. }));

		list.page_failed(query, Some("relation \"log_activite\" does not exist".into()));
		let FeedScreen::Error { message, .. } = list.screen() else {
			panic!("expected an error");
		};
		assert_eq!(message, "relation \"log_activite\" does not exist");
	}

	#[test]
	fn test_next_page_failure_keeps_posts() {
		let (mut list, first) = FeedList::new(1);
		list.page_loaded(first, page(&["b"], Some(1)));
		let next = list.load_more(NEAR_END).unwrap();

		list.page_failed(next, Some("timeout".into()));

		assert_eq!(list.posts().count(), 1);
		assert!(list.load_more(NEAR_END).is_some());
	}

	#[test]
	fn test_empty_and_refresh() {
		let (mut list, first) = FeedList::new(10);
		list.page_loaded(first, page(&[], None));

		assert_eq!(
			list.screen(),
			FeedScreen::Empty {
				title: EMPTY_TITLE,
				message: EMPTY_TEXT,
			}
		);

		let query = list.refresh();
		list.page_loaded(query, page(&["new"], None));
		assert_eq!(list.posts().count(), 1);
	}

	#[test]
	fn test_refresh_during_next_page_ignores_stale_page() {
		let (mut list, first) = FeedList::new(2);
		list.page_loaded(first, page(&["d", "c"], Some(1)));
		let next = list.load_more(NEAR_END).unwrap();

		let refresh = list.refresh();
		list.page_loaded(next, page(&["b", "a"], None));

		let titles = list.posts().map(|post| post.title.as_str()).collect::<Vec<_>>();
		assert_eq!(titles, ["d", "c"]);
		assert!(!list.is_fetching_next_page());

		list.page_failed(next, Some("late".into()));
		list.page_loaded(refresh, page(&["e", "d"], Some(1)));

		let titles = list.posts().map(|post| post.title.as_str()).collect::<Vec<_>>();
		assert_eq!(titles, ["e", "d"]);
		assert!(list.has_next_page());
		assert_eq!(list.load_more(NEAR_END).map(|query| query.page), Some(1));
	}

	#[test]
	fn test_stale_failure_leaves_refresh_pending() {
		let (mut list, first) = FeedList::new(2);
		list.page_loaded(first, page(&["b", "a"], Some(1)));
		let next = list.load_more(NEAR_END).unwrap();
		let refresh = list.refresh();

		list.page_failed(next, None);
		assert!(list.load_more(NEAR_END).is_none(), "refresh still in flight");

		list.page_failed(refresh, Some("offline".into()));
		assert!(matches!(list.screen(), FeedScreen::List { .. }));
		assert!(list.load_more(NEAR_END).is_some());
	}

	#[test]
	fn test_account_feed_queries_carry_account() {
		let account = Uuid::new_v4();
		let (_, query) = FeedList::for_account(10, account);

		assert_eq!(query.account_id, Some(account));
	}
}
