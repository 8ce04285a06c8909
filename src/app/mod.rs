//! Front-end pages shared by the web dashboard and the terminal mode

mod page;
mod render;

pub use page::{NavEvent, Page};
pub use render::{
    render_page, PageView, APP_TITLE, CONTACT_EMAIL, DEVELOPER, FEEDBACK_TEXT, HOME_INTRO,
};
