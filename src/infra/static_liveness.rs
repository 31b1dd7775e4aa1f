use crate::app::ports::LivenessCheck;
use async_trait::async_trait;
use std::collections::HashSet;

/// Liveness answers fixed up front, for offline runs and tests.
#[derive(Debug, Clone)]
pub enum StaticLiveness {
    AllLive,
    NoneLive,
    Only(HashSet<String>),
}

impl StaticLiveness {
    pub fn only<I, S>(urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        StaticLiveness::Only(urls.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl LivenessCheck for StaticLiveness {
    async fn is_live(&self, url: &str) -> bool {
        match self {
            StaticLiveness::AllLive => true,
            StaticLiveness::NoneLive => false,
            StaticLiveness::Only(urls) => urls.contains(url),
        }
    }
}
