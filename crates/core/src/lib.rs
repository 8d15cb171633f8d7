//! Core of trail-chart: a mirror of a remote activity collection, the
//! projection of activity records onto a distance-over-time chart, and the
//! view transforms that turn chart state into render commands.

pub mod config;
pub mod controller;
pub mod feed;
pub mod interaction;
pub mod model;
pub mod projection;
pub mod scale;
pub mod store;
pub mod svg;
pub mod views;

pub use config::{ChartConfig, ConfigError};
pub use controller::ChartController;
pub use feed::{ChangeFeed, FeedError, IterFeed, JsonLinesFeed};
pub use store::{BatchReport, MirrorStore};
