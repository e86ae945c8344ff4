mod validate;
pub use validate::ValidateAuctionTask;

mod snapshot;
pub use snapshot::SnapshotTask;

mod partition;
pub use partition::{Partition, PartitionTask, partition};

mod dispatch;
pub use dispatch::{DispatchTask, LateResponse, LateResponseListener, LateResponseListeners};
