//! Browser module - page/session seams and the headless Chrome driver

pub mod cdp;
pub mod page;

pub use cdp::CdpLauncher;
pub use page::{
    BrowserLauncher, BrowserSession, NavigationResponse, PageHandle, ScrollDirection, Target,
};
