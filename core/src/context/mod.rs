mod app_config;
mod clock;
mod interner;

pub use app_config::AppConfigExt;
pub use clock::{Clock, ManualClock, SharedClock, SystemClock, system_clock};
pub use interner::{IStr, empty_istr, intern, resolve};
