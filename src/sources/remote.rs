use std::sync::Arc;

use anyhow::{Context, Result, ensure};
use image::RgbaImage;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand::seq::IndexedRandom;
use reqwest::Url;
use serde::Deserialize;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::config::RemoteOptions;
use crate::error::LoadError;
use crate::events::{GalleryImage, ImageBatch, ImageOrigin};
use crate::processing::decode::decode_bytes;
use crate::sources::LoadImages;

const CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Deserialize)]
struct QueryResponse {
    hits: Vec<Hit>,
}

#[derive(Debug, Deserialize)]
struct Hit {
    #[serde(rename = "largeImageURL")]
    large_image_url: String,
}

/// Stock-photo search API client.
#[derive(Debug, Clone)]
pub struct RemoteSource {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    keywords: Arc<[String]>,
}

impl RemoteSource {
    pub fn new(options: &RemoteOptions) -> Result<Self> {
        let api_key = options
            .api_key
            .clone()
            .filter(|k| !k.is_empty())
            .context("remote.api-key is not configured")?;
        ensure!(
            !options.keywords.is_empty(),
            "remote.keywords must list at least one keyword"
        );
        let http = reqwest::Client::builder()
            .timeout(options.request_timeout)
            .connect_timeout(std::time::Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            http,
            endpoint: options.endpoint.clone(),
            api_key,
            keywords: options.keywords.iter().cloned().collect(),
        })
    }

    pub fn pick_keyword<R: Rng + ?Sized>(&self, rng: &mut R) -> &str {
        self.keywords
            .choose(rng)
            .map(String::as_str)
            .unwrap_or_default()
    }

    /// `GET <endpoint>?key=..&q=..&per_page=..`
    pub fn query_url(&self, keyword: &str, count: usize) -> Result<Url, LoadError> {
        let per_page = count.to_string();
        Url::parse_with_params(
            &self.endpoint,
            [
                ("key", self.api_key.as_str()),
                ("q", keyword),
                ("per_page", per_page.as_str()),
            ],
        )
        .map_err(|err| LoadError::InvalidRequest(format!("{}: {err}", self.endpoint)))
    }

    async fn query(&self, url: Url) -> Result<Vec<Hit>, LoadError> {
        let response = self.http.get(url).send().await.map_err(LoadError::Network)?;
        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::Status(status));
        }
        let body = response.bytes().await.map_err(LoadError::Network)?;
        let parsed: QueryResponse = serde_json::from_slice(&body)?;
        Ok(parsed.hits)
    }

    /// Download every hit concurrently and wait for all of them.
    async fn download_all(&self, hits: Vec<Hit>) -> ImageBatch {
        let requested = hits.len();
        let mut tasks = JoinSet::new();
        for (position, hit) in hits.into_iter().enumerate() {
            let http = self.http.clone();
            tasks.spawn(async move {
                let result = download(&http, &hit.large_image_url).await;
                (position, hit.large_image_url, result)
            });
        }

        let mut images = Vec::with_capacity(requested);
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((position, url, Ok(pixels))) => {
                    debug!(%url, "downloaded image");
                    images.push((position, GalleryImage::new(ImageOrigin::Remote(url), pixels)));
                }
                Ok((_, url, Err(err))) => warn!(%url, "dropping image: {err:#}"),
                Err(err) => warn!("download task failed: {err}"),
            }
        }
        images.sort_by_key(|(position, _)| *position);
        info!(requested, delivered = images.len(), "remote downloads finished");
        images.into_iter().map(|(_, img)| img).collect()
    }
}

async fn download(http: &reqwest::Client, url: &str) -> Result<RgbaImage> {
    let response = http.get(url).send().await?.error_for_status()?;
    let bytes = response.bytes().await?;
    tokio::task::spawn_blocking(move || decode_bytes(&bytes)).await?
}

impl LoadImages for RemoteSource {
    async fn load_images(&self, count: usize, seed: u64) -> Result<ImageBatch, LoadError> {
        let keyword = self.pick_keyword(&mut StdRng::seed_from_u64(seed)).to_owned();
        let url = self.query_url(&keyword, count)?;
        info!(%keyword, count, "querying image service");
        let hits = self.query(url).await?;
        Ok(self.download_all(hits).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> RemoteOptions {
        RemoteOptions {
            api_key: Some("secret".into()),
            ..RemoteOptions::default()
        }
    }

    #[test]
    fn query_url_carries_key_keyword_and_count() {
        let source = RemoteSource::new(&options()).unwrap();
        let url = source.query_url("trees", 12).unwrap();
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("key".to_string(), "secret".to_string()),
                ("q".to_string(), "trees".to_string()),
                ("per_page".to_string(), "12".to_string()),
            ]
        );
        assert_eq!(url.host_str(), Some("pixabay.com"));
    }

    #[test]
    fn malformed_endpoint_is_an_invalid_request() {
        let source = RemoteSource::new(&RemoteOptions {
            endpoint: "not a url".into(),
            ..options()
        })
        .unwrap();
        assert!(matches!(
            source.query_url("stars", 3),
            Err(LoadError::InvalidRequest(_))
        ));
    }

    #[test]
    fn keyword_comes_from_configured_set() {
        let source = RemoteSource::new(&options()).unwrap();
        let mut rng = StdRng::seed_from_u64(8);
        for _ in 0..20 {
            let k = source.pick_keyword(&mut rng);
            assert!(["waterfall", "trees", "music", "stars"].contains(&k));
        }
    }

    #[test]
    fn response_shape_is_strict() {
        let ok: QueryResponse =
            serde_json::from_str(r#"{"total": 2, "hits": [{"largeImageURL": "http://x/a.jpg", "id": 1}]}"#)
                .unwrap();
        assert_eq!(ok.hits.len(), 1);
        assert!(serde_json::from_str::<QueryResponse>(r#"{"images": []}"#).is_err());
        assert!(serde_json::from_str::<QueryResponse>(r#"{"hits": [{"url": "x"}]}"#).is_err());
    }
}
