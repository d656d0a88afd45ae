pub mod acquisition;
pub mod catalog;
pub mod login;
pub mod navigation;
pub mod quota;

pub use acquisition::{AcquireOutcome, AcquisitionService};
pub use catalog::CatalogExtractor;
pub use login::LoginService;
pub use navigation::NavigationService;
pub use quota::{QuotaMonitor, QuotaState};
