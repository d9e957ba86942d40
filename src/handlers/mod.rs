pub mod trending;

pub use trending::{
    get_trending, track_click, track_impression, track_read_end, TrendingState,
};
