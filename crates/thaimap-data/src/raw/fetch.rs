use std::path::PathBuf;

use ahash::AHashMap;
use bytes::Bytes;
use tracing::{debug, info, instrument};

use super::{Result, parse_collection};
use crate::{AdminLevel, DataError, FeatureCollection};

/// Where the five boundary documents come from.
#[derive(Debug, Clone)]
pub enum DataSource {
    /// A directory holding one `<level>.geojson` file per level.
    Directory(PathBuf),
    /// An HTTP(S) base URL; each level is fetched from `<base_url>/<level>.geojson`.
    #[cfg(feature = "download_data")]
    Remote { base_url: String },
    /// Documents already in memory. A level without bytes fails to load.
    Memory(AHashMap<AdminLevel, Bytes>),
}

impl DataSource {
    /// `<DATA_DIR>/boundaries`.
    pub fn default_directory() -> Self {
        Self::Directory(crate::get_data_dir().join("boundaries"))
    }

    pub fn from_memory<I, B>(documents: I) -> Self
    where
        I: IntoIterator<Item = (AdminLevel, B)>,
        B: Into<Bytes>,
    {
        Self::Memory(
            documents
                .into_iter()
                .map(|(level, bytes)| (level, bytes.into()))
                .collect(),
        )
    }

    /// Human-readable location of a level's document, for logs.
    pub fn location(&self, level: AdminLevel) -> String {
        match self {
            Self::Directory(dir) => dir.join(level.file_name()).display().to_string(),
            #[cfg(feature = "download_data")]
            Self::Remote { base_url } => remote_url(base_url, level),
            Self::Memory(_) => format!("memory://{level}"),
        }
    }
}

#[cfg(feature = "download_data")]
fn remote_url(base_url: &str, level: AdminLevel) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), level.file_name())
}

/// Fetches and parses boundary documents from a [`DataSource`].
///
/// One fetcher is shared by all concurrent level loads of a single load
/// operation, so remote downloads reuse one HTTP client.
#[derive(Debug, Clone)]
pub struct BoundaryFetcher {
    source: DataSource,
    #[cfg(feature = "download_data")]
    client: reqwest::Client,
    #[cfg(feature = "download_data")]
    progress: indicatif::MultiProgress,
}

impl BoundaryFetcher {
    pub fn new(source: DataSource) -> Self {
        Self {
            source,
            #[cfg(feature = "download_data")]
            client: reqwest::Client::new(),
            #[cfg(feature = "download_data")]
            progress: indicatif::MultiProgress::new(),
        }
    }

    pub const fn source(&self) -> &DataSource {
        &self.source
    }

    /// Fetch the raw bytes of one level's document.
    pub async fn fetch(&self, level: AdminLevel) -> Result<Bytes> {
        match &self.source {
            DataSource::Directory(dir) => read_from_directory(dir, level).await,
            #[cfg(feature = "download_data")]
            DataSource::Remote { base_url } => self.download(&remote_url(base_url, level)).await,
            DataSource::Memory(documents) => documents
                .get(&level)
                .cloned()
                .ok_or(DataError::SourceNotFound(level)),
        }
    }

    #[cfg(feature = "download_data")]
    async fn download(&self, url: &str) -> Result<Bytes> {
        use futures::StreamExt;
        use indicatif::{ProgressBar, ProgressStyle};

        info!(url, "Starting download");
        let response = self.client.get(url).send().await?.error_for_status()?;
        let total_size = response.content_length().unwrap_or(0);

        let pb = self.progress.add(ProgressBar::new(total_size));
        if let Ok(style) = ProgressStyle::default_bar().template(
            "{msg}\n{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})",
        ) {
            pb.set_style(style.progress_chars("█░"));
        }
        let file_name = url.split('/').next_back().unwrap_or(url);
        pb.set_message(format!("Downloading {file_name}"));

        let mut body = Vec::with_capacity(usize::try_from(total_size).unwrap_or_default());
        let mut stream = response.bytes_stream();
        while let Some(item) = stream.next().await {
            let chunk = item?;
            body.extend_from_slice(&chunk);
            pb.inc(chunk.len() as u64);
        }
        pb.finish_and_clear();
        debug!(url, size = body.len(), "Download complete");
        Ok(Bytes::from(body))
    }

    /// Fetch and parse one level. Parsing runs on the blocking thread pool.
    #[instrument(
        name = "Load boundary level",
        skip(self),
        fields(location = %self.source.location(level)),
        level = "info"
    )]
    pub async fn load_level(&self, level: AdminLevel) -> Result<FeatureCollection> {
        let t_load = std::time::Instant::now();
        let bytes = self.fetch(level).await?;
        let size = bytes.len();

        let parsed = tokio::task::spawn_blocking(move || parse_collection(level, &bytes));
        let collection = parsed.await??;

        info!(
            %level,
            size,
            features = collection.len(),
            elapsed = ?t_load.elapsed(),
            "Boundary level loaded"
        );
        Ok(collection)
    }
}

async fn read_from_directory(dir: &std::path::Path, level: AdminLevel) -> Result<Bytes> {
    let path = dir.join(level.file_name());
    debug!(path = ?path, "Reading boundary document");
    match tokio::fs::read(&path).await {
        Ok(bytes) => Ok(Bytes::from(bytes)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(DataError::SourceNotFound(level))
        }
        Err(e) => Err(e.into()),
    }
}
