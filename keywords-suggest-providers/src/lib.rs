#![warn(missing_docs, clippy::missing_docs_in_private_items)]

//! The Keywords suggestion providers, and the tools to build and combine them.

mod fan_out;
mod fetcher;
mod maker;
mod providers;

pub use crate::{
    fan_out::FanOut,
    fetcher::ReqwestFetcher,
    maker::make_fan_out,
    providers::{
        google::GoogleSuggester,
        instagram::{InstagramSuggester, MAX_HASHTAGS},
        tiktok::TiktokSuggester,
        youtube::YoutubeSuggester,
    },
};
