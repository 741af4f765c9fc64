pub mod cli;
pub mod config;
pub mod dates;
pub mod feeds;
pub mod github;
pub mod mastodon;
pub mod media;
pub mod report;
pub mod storage;
