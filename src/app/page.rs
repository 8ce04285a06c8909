//! Page navigation state

use serde::{Deserialize, Serialize};
use std::fmt;

/// A page of the predictor front end
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Page {
    #[default]
    Home,
    ManualEntry,
    BulkUpload,
    Feedback,
}

/// Something the user did that may move them to another page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavEvent {
    /// Picked a page from the menu
    Select(Page),
    /// Submitted the form on the current page
    Submit,
    /// Asked to go back to the landing page
    Back,
}

impl Page {
    /// Menu order
    pub const ALL: [Page; 4] = [Page::Home, Page::ManualEntry, Page::BulkUpload, Page::Feedback];

    /// Page reached from `self` after `event`
    pub fn navigate(self, event: NavEvent) -> Page {
        match event {
            NavEvent::Select(page) => page,
            NavEvent::Submit => self,
            NavEvent::Back => Page::Home,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Page::Home => "Home",
            Page::ManualEntry => "Manual Entry",
            Page::BulkUpload => "Bulk Upload",
            Page::Feedback => "Feedback",
        }
    }

    /// Short description shown next to the menu entry
    pub fn summary(&self) -> &'static str {
        match self {
            Page::Home => "about this app",
            Page::ManualEntry => "predict one employee's salary",
            Page::BulkUpload => "predict salaries for a CSV file",
            Page::Feedback => "suggestions and contact",
        }
    }

    /// Value of the `page` query parameter
    pub fn as_query(&self) -> &'static str {
        match self {
            Page::Home => "home",
            Page::ManualEntry => "manual",
            Page::BulkUpload => "bulk",
            Page::Feedback => "feedback",
        }
    }

    /// Parse a `page` query value. Unknown values fall back to `None`.
    pub fn from_query(value: &str) -> Option<Page> {
        let key: String = value
            .trim()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        match key.as_str() {
            "home" | "" => Some(Page::Home),
            "manual" | "manualentry" => Some(Page::ManualEntry),
            "bulk" | "bulkupload" => Some(Page::BulkUpload),
            "feedback" => Some(Page::Feedback),
            _ => None,
        }
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_moves_to_page() {
        for from in Page::ALL {
            for to in Page::ALL {
                assert_eq!(from.navigate(NavEvent::Select(to)), to);
            }
        }
    }

    #[test]
    fn test_submit_stays_back_goes_home() {
        assert_eq!(Page::ManualEntry.navigate(NavEvent::Submit), Page::ManualEntry);
        assert_eq!(Page::BulkUpload.navigate(NavEvent::Submit), Page::BulkUpload);
        assert_eq!(Page::Feedback.navigate(NavEvent::Back), Page::Home);
        assert_eq!(Page::Home.navigate(NavEvent::Back), Page::Home);
    }

    #[test]
    fn test_query_round_trip() {
        for page in Page::ALL {
            assert_eq!(Page::from_query(page.as_query()), Some(page));
        }
        assert_eq!(Page::from_query("Manual Entry"), Some(Page::ManualEntry));
        assert_eq!(Page::from_query("bulk_upload"), Some(Page::BulkUpload));
        assert_eq!(Page::from_query("settings"), None);
    }

    #[test]
    fn test_default_is_home() {
        assert_eq!(Page::default(), Page::Home);
    }
}
