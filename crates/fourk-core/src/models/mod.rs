//! Data models for fourk

mod dealer;
mod dealer_file;
mod file_setting;

pub use dealer::{Dealer, DealerStatus};
pub use dealer_file::{DealerFile, LogRow, LogsResponse, WireFlag, WireScalar};
pub use file_setting::{FileSetting, FileStatus, PMM_TYPE};
