use serde::Serialize;

use crate::model::Account;

pub const SIGN_IN_PATH: &str = "/auth/sign-in";
pub const POST_CREATED_TEXT: &str = "Post created successfully!";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
	Loading,
	SignedIn(Account),
	SignedOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tab {
	#[default]
	Home,
	Settings,
}

impl Tab {
	pub fn title(self) -> &'static str {
		match self {
			Self::Home => "Home",
			Self::Settings => "Settings",
		}
	}

	pub fn path(self) -> &'static str {
		match self {
			Self::Home => "/",
			Self::Settings => "/settings",
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MainScreen<'a> {
	/// Keep the splash screen up until auth resolves.
	Splash,
	Tabs {
		account: &'a Account,
		active: Tab,
		create_open: bool,
	},
	Redirect {
		to: &'static str,
	},
}

/// The signed-in shell: a home and a settings tab, plus the create modal
/// opened from the tab bar or the feed header.
#[derive(Debug, Clone)]
pub struct MainLayout {
	auth: AuthState,
	active: Tab,
	create_open: bool,
}

impl Default for MainLayout {
	fn default() -> Self {
		Self {
			auth: AuthState::Loading,
			active: Tab::Home,
			create_open: false,
		}
	}
}

impl MainLayout {
	pub fn set_auth(&mut self, auth: AuthState) {
		if !matches!(auth, AuthState::SignedIn(..)) {
			self.active = Tab::Home;
			self.create_open = false;
		}

		self.auth = auth;
	}

	pub fn select(&mut self, tab: Tab) {
		self.active = tab;
		self.create_open = false;
	}

	/// The create action. Only the home tab has a create modal.
	pub fn open_create(&mut self) {
		if matches!(self.auth, AuthState::SignedIn(..)) && self.active == Tab::Home {
			self.create_open = true;
		}
	}

	pub fn cancel_create(&mut self) {
		self.create_open = false;
	}

	/// Closes the modal after a successful creation and returns the
	/// confirmation to show.
	pub fn post_created(&mut self) -> &'static str {
		self.create_open = false;

		POST_CREATED_TEXT
	}

	pub fn screen(&self) -> MainScreen<'_> {
		match &self.auth {
			AuthState::Loading => MainScreen::Splash,
			AuthState::SignedOut => MainScreen::Redirect { to: SIGN_IN_PATH },
			AuthState::SignedIn(account) => MainScreen::Tabs {
				account,
				active: self.active,
				create_open: self.create_open,
			},
		}
	}
}

#[cfg(test)]
mod test {
	use uuid::Uuid;

	use super::*;

	fn account() -> Account {
		Account {
			id: Uuid::new_v4(),
			name: Some("Ada".into()),
			picture_url: None,
		}
	}

	#[test]
	fn test_auth_gating() {
		let mut layout = MainLayout::default();
		assert_eq!(layout.screen(), MainScreen::Splash);

		layout.set_auth(AuthState::SignedOut);
		assert_eq!(
			layout.screen(),
			MainScreen::Redirect {
				to: "/auth/sign-in"
			}
		);

		let ada = account();
		layout.set_auth(AuthState::SignedIn(ada.clone()));
		assert_eq!(
			layout.screen(),
			MainScreen::Tabs {
				account: &ada,
				active: Tab::Home,
				create_open: false,
			}
		);
	}

	#[test]
	fn test_create_modal() {
		let mut layout = MainLayout::default();

		layout.open_create();
		assert!(!layout.create_open, "not signed in");

		layout.set_auth(AuthState::SignedIn(account()));
		layout.open_create();
		assert!(layout.create_open);

		assert_eq!(layout.post_created(), "Post created successfully!");
		assert!(!layout.create_open);

		layout.select(Tab::Settings);
		layout.open_create();
		assert!(!layout.create_open);
		assert_eq!(Tab::Settings.path(), "/settings");
	}

	#[test]
	fn test_sign_out_closes_everything() {
		let mut layout = MainLayout::default();
		layout.set_auth(AuthState::SignedIn(account()));
		layout.open_create();

		layout.set_auth(AuthState::SignedOut);

		assert!(!layout.create_open);
		assert_eq!(layout.active, Tab::Home);
	}
}
