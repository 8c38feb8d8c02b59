// src/ui/thumbnail.rs
use image::DynamicImage;
use ratatui::{buffer::Buffer, layout::Rect, widgets::StatefulWidget};
use ratatui_image::{picker::Picker, protocol::StatefulProtocol, Resize, StatefulImage};
use std::collections::{HashMap, VecDeque};
use std::time::Duration;
use tokio::sync::mpsc;

use crate::error::FetchError;
use crate::{log_debug, log_warn};

/// Decoded thumbnails kept around at most. The least recently used one goes first.
pub const THUMBNAIL_CACHE_CAPACITY: usize = 32;

pub struct ImageRenderer {
    protocol: StatefulProtocol,
    image_dimensions: (u32, u32),
}

// StatefulProtocol doesn't implement Debug
impl std::fmt::Debug for ImageRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageRenderer")
            .field("protocol", &"<StatefulProtocol>")
            .field("image_dimensions", &self.image_dimensions)
            .finish()
    }
}

impl ImageRenderer {
    pub fn new(picker: &Picker, img: DynamicImage) -> Self {
        let image_dimensions = (img.width(), img.height());
        Self {
            protocol: picker.new_resize_protocol(img),
            image_dimensions,
        }
    }

    /// Letterboxed into `area`.
    pub fn render(&mut self, area: Rect, buf: &mut Buffer) {
        let image = StatefulImage::default().resize(Resize::Fit(None));
        image.render(area, buf, &mut self.protocol);

        if let Err(e) = self.protocol.last_encoding_result().unwrap_or(Ok(())) {
            log_warn!("Thumbnail encoding error: {}", e);
        }
    }
}

#[derive(Debug)]
pub enum Thumbnail {
    Loading,
    Ready(ImageRenderer),
    Failed(String),
}

type LoadResult = (String, Result<DynamicImage, String>);

/// Fetches sample thumbnails in the background and caches them per URL.
/// A cached URL is not requested again until it has been evicted.
#[derive(Debug)]
pub struct ThumbnailLoader {
    base_url: Option<reqwest::Url>,
    client: reqwest::Client,
    picker: Option<Picker>,
    cache: HashMap<String, Thumbnail>,
    /// Cache keys, least recently used at the front.
    recency: VecDeque<String>,
    capacity: usize,
    tx: mpsc::UnboundedSender<LoadResult>,
    rx: mpsc::UnboundedReceiver<LoadResult>,
}

impl ThumbnailLoader {
    /// `picker` is `None` when the terminal can't show images; thumbnails are
    /// then never fetched.
    pub fn new(base_url: &str, timeout: Duration, picker: Option<Picker>) -> Result<Self, FetchError> {
        let (tx, rx) = mpsc::unbounded_channel();
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()?;

        Ok(Self {
            base_url: reqwest::Url::parse(base_url).ok(),
            client,
            picker,
            cache: HashMap::new(),
            recency: VecDeque::new(),
            capacity: THUMBNAIL_CACHE_CAPACITY,
            tx,
            rx,
        })
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self.evict();
        self
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    pub fn contains(&self, url: &str) -> bool {
        self.cache.contains_key(url)
    }

    pub fn supports_images(&self) -> bool {
        self.picker.is_some()
    }

    /// Endpoint URLs are usually relative to the server root.
    pub fn resolve(&self, url: &str) -> Option<reqwest::Url> {
        match reqwest::Url::parse(url) {
            Ok(absolute) => Some(absolute),
            Err(_) => self.base_url.as_ref()?.join(url).ok(),
        }
    }

    pub fn request(&mut self, url: &str) {
        if url.is_empty() || self.picker.is_none() {
            return;
        }
        if self.cache.contains_key(url) {
            self.touch(url);
            return;
        }
        let Some(resolved) = self.resolve(url) else {
            self.insert(url.to_string(), Thumbnail::Failed("unresolvable url".into()));
            return;
        };

        self.insert(url.to_string(), Thumbnail::Loading);
        let key = url.to_string();
        let client = self.client.clone();
        let tx = self.tx.clone();

        tokio::spawn(async move {
            log_debug!("Fetching thumbnail {}", resolved);
            let result = fetch_image(&client, resolved).await;
            let _ = tx.send((key, result));
        });
    }

    /// Non-blocking: moves finished downloads into the cache. Downloads whose
    /// entry was evicted meanwhile are dropped. Returns true if anything changed.
    pub fn process_messages(&mut self) -> bool {
        let mut changed = false;
        while let Ok((url, result)) = self.rx.try_recv() {
            if !self.cache.contains_key(&url) {
                log_debug!("Dropping thumbnail {} evicted while loading", url);
                continue;
            }
            let entry = match (result, self.picker.as_ref()) {
                (Ok(img), Some(picker)) => Thumbnail::Ready(ImageRenderer::new(picker, img)),
                (Ok(_), None) => Thumbnail::Failed("terminal has no image support".into()),
                (Err(e), _) => {
                    log_warn!("Thumbnail {} failed: {}", url, e);
                    Thumbnail::Failed(e)
                }
            };
            self.cache.insert(url, entry);
            changed = true;
        }
        changed
    }

    pub fn get_mut(&mut self, url: &str) -> Option<&mut Thumbnail> {
        if self.cache.contains_key(url) {
            self.touch(url);
        }
        self.cache.get_mut(url)
    }

    fn insert(&mut self, url: String, thumbnail: Thumbnail) {
        self.recency.push_back(url.clone());
        self.cache.insert(url, thumbnail);
        self.evict();
    }

    fn touch(&mut self, url: &str) {
        if let Some(pos) = self.recency.iter().position(|u| u == url) {
            if let Some(key) = self.recency.remove(pos) {
                self.recency.push_back(key);
            }
        }
    }

    fn evict(&mut self) {
        while self.cache.len() > self.capacity {
            let Some(oldest) = self.recency.pop_front() else { break };
            self.cache.remove(&oldest);
        }
    }
}

async fn fetch_image(client: &reqwest::Client, url: reqwest::Url) -> Result<DynamicImage, String> {
    let response = client.get(url).send().await.map_err(|e| e.to_string())?;
    if !response.status().is_success() {
        return Err(format!("status {}", response.status().as_u16()));
    }
    let bytes = response.bytes().await.map_err(|e| e.to_string())?;
    image::load_from_memory(&bytes).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolves_relative_and_absolute_urls() {
        let loader = ThumbnailLoader::new("http://127.0.0.1:5000", Duration::from_secs(1), None).unwrap();
        assert_eq!(
            loader.resolve("/static/shots/3.jpg").unwrap().as_str(),
            "http://127.0.0.1:5000/static/shots/3.jpg"
        );
        assert_eq!(
            loader.resolve("https://cdn.example.org/a.png").unwrap().as_str(),
            "https://cdn.example.org/a.png"
        );
    }

    #[test]
    fn test_without_picker_nothing_is_requested() {
        let mut loader = ThumbnailLoader::new("http://127.0.0.1:5000", Duration::from_secs(1), None).unwrap();
        assert!(!loader.supports_images());
        loader.request("/static/shots/0.jpg");
        assert!(loader.get_mut("/static/shots/0.jpg").is_none());
        assert!(!loader.process_messages());
    }

    fn loader_with_picker() -> ThumbnailLoader {
        // port 9 (discard): nothing answers, fetches fail in the background
        ThumbnailLoader::new("http://127.0.0.1:9", Duration::from_millis(50), Some(Picker::from_fontsize((8, 16))))
            .unwrap()
    }

    #[tokio::test]
    async fn test_cache_stays_bounded_over_many_samples() {
        let mut loader = loader_with_picker();
        for i in 0..500 {
            loader.request(&format!("/static/shots/{}.jpg", i));
        }

        assert_eq!(loader.len(), THUMBNAIL_CACHE_CAPACITY);
        assert!(loader.contains("/static/shots/499.jpg"));
        assert!(!loader.contains("/static/shots/0.jpg"));
    }

    #[tokio::test]
    async fn test_recently_viewed_thumbnail_survives_eviction() {
        let mut loader = loader_with_picker().with_capacity(3);
        loader.request("/a.jpg");
        loader.request("/b.jpg");
        loader.request("/c.jpg");

        // looking at /a.jpg makes /b.jpg the oldest
        assert!(loader.get_mut("/a.jpg").is_some());
        loader.request("/d.jpg");

        assert_eq!(loader.len(), 3);
        assert!(loader.contains("/a.jpg"));
        assert!(!loader.contains("/b.jpg"));
        assert!(loader.contains("/d.jpg"));
    }

    #[tokio::test]
    async fn test_late_download_for_evicted_url_is_dropped() {
        let mut loader = loader_with_picker().with_capacity(1);
        loader.request("/old.jpg");
        loader.request("/new.jpg");

        loader
            .tx
            .send(("/old.jpg".to_string(), Err("late".to_string())))
            .unwrap();
        loader.process_messages();

        assert!(!loader.contains("/old.jpg"));
        assert_eq!(loader.len(), 1);
    }
}
