pub mod segmented;

pub use segmented::SegmentedStream;
