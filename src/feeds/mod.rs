//! FAA feed access and extraction.
//!
//! Both feeds follow the same two-phase pattern:
//!
//! 1. **Fetching**: one GET through a [`client::FeedSource`]
//! 2. **Extracting**: turn the raw body into alert lines for the target airports
//!
//! # Feeds
//!
//! | Feed | Module | Format | Notes |
//! |------|--------|--------|-------|
//! | Airport status | [`realtime`] | XML | Active ground stops, ground delay programs, arrival/departure delays |
//! | Operations plan | [`planning`] | HTML | Forecast advisories, matched line by line |
//!
//! Extractors never fail: a fetch error, a parse error, or an empty document
//! all become an empty result after a log line.

pub mod client;
pub mod planning;
pub mod realtime;
pub mod xml;
