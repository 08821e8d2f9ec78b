//! Clients for the market data and news providers

pub mod news;
pub mod yahoo;

pub use news::{NewsContent, NewsItem, SyntheticNews, YAHOO_NEWS_API_BASE, YahooNews};
pub use yahoo::YahooMarketData;
