//! # Menu
//!
//! The numbered entries shown at the console and which of them apply to
//! the current session.
//!
//! ## Visibility Tiers
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │   #  Entry            Visibility          Anonymous   Logged in        │
//! │  ──  ───────────────  ──────────────────  ─────────   ─────────        │
//! │   1  Log in           AnonymousOnly           ✓                         │
//! │   2  Register         AnonymousOnly           ✓                         │
//! │   3  Redeem ticket    AuthenticatedOnly                   ✓             │
//! │   4  Buy              AuthenticatedOnly                   ✓             │
//! │   5  Profile          AuthenticatedOnly                   ✓             │
//! │   6  Products         Always                  ✓           ✓             │
//! │   7  Log out          AuthenticatedOnly                   ✓             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Numbers are positions in the full list, so an entry keeps its number
//! whether or not its neighbours are shown. Choosing a hidden entry or a
//! number outside the list does nothing.

use std::fmt::Write as _;

/// Who can see a menu entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Always,
    AnonymousOnly,
    AuthenticatedOnly,
}

impl Visibility {
    pub fn is_visible(self, authenticated: bool) -> bool {
        match self {
            Visibility::Always => true,
            Visibility::AnonymousOnly => !authenticated,
            Visibility::AuthenticatedOnly => authenticated,
        }
    }
}

/// What a menu entry does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Login,
    Register,
    RedeemTicket,
    Buy,
    Profile,
    Products,
    Logout,
}

#[derive(Debug, Clone)]
pub struct MenuEntry {
    pub label: &'static str,
    pub action: Action,
    pub visibility: Visibility,
}

impl MenuEntry {
    pub const fn new(label: &'static str, action: Action, visibility: Visibility) -> Self {
        MenuEntry {
            label,
            action,
            visibility,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Menu {
    entries: Vec<MenuEntry>,
}

impl Menu {
    pub fn new(entries: Vec<MenuEntry>) -> Self {
        Menu { entries }
    }

    /// The shop's menu.
    pub fn standard() -> Self {
        Menu::new(vec![
            MenuEntry::new("Log in", Action::Login, Visibility::AnonymousOnly),
            MenuEntry::new("Register", Action::Register, Visibility::AnonymousOnly),
            MenuEntry::new("Redeem ticket", Action::RedeemTicket, Visibility::AuthenticatedOnly),
            MenuEntry::new("Buy", Action::Buy, Visibility::AuthenticatedOnly),
            MenuEntry::new("Profile", Action::Profile, Visibility::AuthenticatedOnly),
            MenuEntry::new("Products", Action::Products, Visibility::Always),
            MenuEntry::new("Log out", Action::Logout, Visibility::AuthenticatedOnly),
        ])
    }

    /// Visible entries with their 1-based numbers.
    pub fn visible(&self, authenticated: bool) -> impl Iterator<Item = (usize, &MenuEntry)> {
        self.entries
            .iter()
            .enumerate()
            .filter(move |(_, e)| e.visibility.is_visible(authenticated))
            .map(|(i, e)| (i + 1, e))
    }

    /// Resolves a typed choice to an action.
    ///
    /// Returns `None` for non-numeric input, numbers outside the list and
    /// entries hidden from the current session.
    pub fn select(&self, choice: &str, authenticated: bool) -> Option<Action> {
        let choice = choice.trim();
        if choice.is_empty() || !choice.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }

        let index: usize = choice.parse().ok()?;
        let entry = self.entries.get(index.checked_sub(1)?)?;

        entry
            .visibility
            .is_visible(authenticated)
            .then_some(entry.action)
    }

    /// The menu as printed at the console.
    pub fn render(&self, authenticated: bool) -> String {
        let mut out = String::new();
        for (number, entry) in self.visible(authenticated) {
            let _ = writeln!(out, " {}. {}", number, entry.label);
        }
        out
    }
}
