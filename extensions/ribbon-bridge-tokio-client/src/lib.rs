mod blocking_client;
pub use blocking_client::BlockingRibbonClient;

mod ribbon_client;
pub use ribbon_client::{RibbonClient, StateChangeHandler};
