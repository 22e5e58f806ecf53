pub mod partition;
pub mod synthesis;

pub use partition::PartitionWeights;
pub use synthesis::{OpticalDepthMap, line_center_optical_depths, synthesize};
