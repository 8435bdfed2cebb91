//! Which screen is showing. Transitions only happen in response to input.

/// Top-level pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Home,
    ChildDetail,
    Admin,
}

/// Current page plus the child selected for the detail page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Router {
    page: Page,
    selected_child: Option<String>,
}

impl Router {
    pub fn new() -> Self {
        Self {
            page: Page::Home,
            selected_child: None,
        }
    }

    pub fn page(&self) -> Page {
        self.page
    }

    pub fn selected_child(&self) -> Option<&str> {
        self.selected_child.as_deref()
    }

    /// Logo / back navigation.
    pub fn go_home(&mut self) {
        self.page = Page::Home;
        self.selected_child = None;
    }

    /// Card selection on the home page.
    pub fn open_child(&mut self, child_id: impl Into<String>) {
        self.page = Page::ChildDetail;
        self.selected_child = Some(child_id.into());
    }

    pub fn open_admin(&mut self) {
        self.page = Page::Admin;
        self.selected_child = None;
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}
