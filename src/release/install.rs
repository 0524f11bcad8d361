use anyhow::{bail, Context, Result};
use flate2::read::GzDecoder;
use reqwest::header::USER_AGENT;
use reqwest::{Client, Response};
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tar::Archive;
use tracing::{debug, info, warn};
use url::Url;
use walkdir::WalkDir;

use super::checksum::{compute_sha256, verify};
use super::formula::{Formula, PlatformAsset};
use super::ReleaseError;

const DEFAULT_USER_AGENT: &str = "ghostie";
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(300);

/// `~/.local/bin`, where `ghostie release install` puts the binary unless told otherwise.
pub fn default_bin_dir() -> Result<PathBuf> {
    let base_dirs = directories::BaseDirs::new().context("Failed to get home directory")?;
    Ok(base_dirs.home_dir().join(".local").join("bin"))
}

/// Downloads release archives into a staging directory and installs the binary they contain.
#[derive(Debug, Clone)]
pub struct Installer {
    http: Client,
    staging: PathBuf,
}

impl Installer {
    pub fn new(staging: impl Into<PathBuf>) -> Result<Self> {
        Self::with_timeout(staging, DOWNLOAD_TIMEOUT)
    }

    /// Like [`Installer::new`], but a single download may take at most `timeout`.
    pub fn with_timeout(staging: impl Into<PathBuf>, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT.min(timeout))
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            http,
            staging: staging.into(),
        })
    }

    /// Download `asset` into `dest`, returning the SHA-256 of the received bytes.
    ///
    /// The body is written to a `.download` file first and only renamed into place once
    /// the transfer completed. A failed transfer leaves neither file behind.
    pub async fn download(&self, url: &str, dest: &Path) -> Result<[u8; 32]> {
        let mut response = self
            .http
            .get(url)
            .header(USER_AGENT, DEFAULT_USER_AGENT)
            .send()
            .await
            .map_err(|source| ReleaseError::Download {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ReleaseError::DownloadStatus {
                url: url.to_string(),
                status,
            }
            .into());
        }

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create parent directory for download at {:?}", dest)
            })?;
        }

        let temp_path = dest.with_extension("download");
        let received = write_body(&mut response, url, &temp_path).await.and_then(|digest| {
            fs::rename(&temp_path, dest).with_context(|| {
                format!("Failed to move download from {:?} to {:?}", temp_path, dest)
            })?;
            Ok(digest)
        });

        if received.is_err() && temp_path.exists() {
            if let Err(err) = fs::remove_file(&temp_path) {
                warn!("Failed to remove partial download {:?}: {}", temp_path, err);
            }
        }
        received
    }

    /// Download the archive for `asset` and check it against the declared checksum.
    /// An archive already staged with the right checksum is reused. A mismatching
    /// download is removed before the error is returned.
    pub async fn fetch_verified(&self, formula: &Formula, asset: &PlatformAsset) -> Result<PathBuf> {
        let archive = self
            .staging_dir(formula, asset)
            .join(archive_file_name(&asset.url)?);

        if archive.is_file() {
            if verify(&asset.sha256, &compute_sha256(&archive)?).is_ok() {
                debug!("reusing staged archive {:?}", archive);
                return Ok(archive);
            }
            debug!("staged archive {:?} does not match, downloading again", archive);
        }

        info!("downloading {}", asset.url);
        let digest = self.download(&asset.url, &archive).await?;

        if let Err(err) = verify(&asset.sha256, &digest) {
            fs::remove_file(&archive)
                .with_context(|| format!("Failed to remove corrupt download {:?}", archive))?;
            return Err(err.into());
        }

        debug!("verified checksum of {:?}", archive);
        Ok(archive)
    }

    /// Download, verify and unpack the archive for `asset`, then copy the formula's
    /// binary into `bin_dir`. Returns the installed path.
    pub async fn install(
        &self,
        formula: &Formula,
        asset: &PlatformAsset,
        bin_dir: &Path,
    ) -> Result<PathBuf> {
        let archive = self.fetch_verified(formula, asset).await?;

        let extract_root = self.staging_dir(formula, asset).join("extract");
        if extract_root.exists() {
            fs::remove_dir_all(&extract_root).with_context(|| {
                format!("Failed to clear previous extraction at {:?}", extract_root)
            })?;
        }
        fs::create_dir_all(&extract_root)
            .with_context(|| format!("Failed to create {:?}", extract_root))?;
        extract_tar_gz(&archive, &extract_root)?;

        let binary = resolve_binary_path(&extract_root, &formula.binary)?;
        let target = install_binary(&binary, bin_dir, &formula.binary)?;
        debug!("installed {} {} to {:?}", formula.name, formula.version, target);
        Ok(target)
    }

    fn staging_dir(&self, formula: &Formula, asset: &PlatformAsset) -> PathBuf {
        self.staging
            .join(&formula.version)
            .join(asset.platform.as_str())
    }
}

async fn write_body(response: &mut Response, url: &str, path: &Path) -> Result<[u8; 32]> {
    let mut file = File::create(path)
        .with_context(|| format!("Failed to create temporary download at {:?}", path))?;
    let mut hasher = Sha256::new();

    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|source| ReleaseError::Download {
            url: url.to_string(),
            source,
        })?
    {
        file.write_all(&chunk)
            .with_context(|| format!("Failed while writing download to {:?}", path))?;
        hasher.update(&chunk);
    }

    file.flush()
        .with_context(|| format!("Failed to flush download to {:?}", path))?;
    Ok(hasher.finalize().into())
}

fn archive_file_name(url: &str) -> Result<String> {
    let parsed = Url::parse(url).with_context(|| format!("Invalid download url '{url}'"))?;
    match parsed
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|name| !name.is_empty())
    {
        Some(name) => Ok(name.to_string()),
        None => bail!("Download url '{url}' does not name a file"),
    }
}

pub fn extract_tar_gz(archive_path: &Path, dest: &Path) -> Result<()> {
    let file = File::open(archive_path)
        .with_context(|| format!("Failed to open archive {:?}", archive_path))?;
    let mut archive = Archive::new(GzDecoder::new(file));
    archive
        .unpack(dest)
        .with_context(|| format!("Failed to unpack tar.gz archive {:?}", archive_path))
}

/// Locate `name` inside an unpacked archive, either at the top level or exactly once
/// anywhere below it.
pub fn resolve_binary_path(extract_root: &Path, name: &str) -> Result<PathBuf> {
    let direct = extract_root.join(name);
    if direct.is_file() {
        return Ok(direct);
    }

    let mut matches = Vec::new();
    for entry in WalkDir::new(extract_root) {
        let entry = entry?;
        if entry.file_type().is_file() && entry.file_name() == name {
            matches.push(entry.into_path());
            if matches.len() > 1 {
                break;
            }
        }
    }

    match matches.len() {
        1 => Ok(matches.remove(0)),
        0 => bail!(
            "Binary '{}' not found in extracted contents under {:?}",
            name,
            extract_root
        ),
        _ => bail!(
            "Binary '{}' matched multiple files in extracted contents under {:?}",
            name,
            extract_root
        ),
    }
}

fn install_binary(source: &Path, bin_dir: &Path, name: &str) -> Result<PathBuf> {
    fs::create_dir_all(bin_dir)
        .with_context(|| format!("Failed to create bin directory {:?}", bin_dir))?;

    let target = bin_dir.join(name);
    let temp = bin_dir.join(format!(".{name}.tmp"));
    fs::copy(source, &temp)
        .with_context(|| format!("Failed to copy {:?} to {:?}", source, temp))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if let Err(err) = fs::set_permissions(&temp, fs::Permissions::from_mode(0o755)) {
            let _ = fs::remove_file(&temp);
            return Err(err).with_context(|| format!("Failed to set permissions on {:?}", temp));
        }
    }

    if let Err(err) = fs::rename(&temp, &target) {
        let _ = fs::remove_file(&temp);
        return Err(err)
            .with_context(|| format!("Failed to move {:?} into place at {:?}", temp, target));
    }
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::Platform;
    use crate::release::checksum::format_digest;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const ARCHIVE_PATH: &str =
        "/releases/download/v0.1.0/ghostie-v0.1.0-x86_64-unknown-linux-gnu.tar.gz";

    fn archive_bytes() -> Vec<u8> {
        let encoder = GzEncoder::new(Vec::new(), Compression::default());
        let mut builder = tar::Builder::new(encoder);

        let contents = b"#!/bin/sh\necho ghostie\n";
        let mut header = tar::Header::new_gnu();
        header.set_size(contents.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(&mut header, "ghostie-v0.1.0/ghostie", &contents[..])
            .unwrap();

        builder.into_inner().unwrap().finish().unwrap()
    }

    fn formula_for(server: &MockServer, sha256: String) -> Formula {
        let mut formula = Formula::ghostie();
        formula.assets = vec![PlatformAsset {
            platform: Platform::Linux,
            url: format!("{}{}", server.uri(), ARCHIVE_PATH),
            sha256,
        }];
        formula
    }

    async fn serve_archive(bytes: Vec<u8>) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(ARCHIVE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(bytes))
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn installs_verified_binary() {
        let bytes = archive_bytes();
        let digest = format_digest(&Sha256::digest(&bytes).into());
        let server = serve_archive(bytes).await;
        let formula = formula_for(&server, digest);

        let temp = TempDir::new().unwrap();
        let installer = Installer::new(temp.path().join("releases")).unwrap();
        let bin_dir = temp.path().join("bin");
        let asset = formula.asset_for(Platform::Linux).unwrap();

        let installed = installer.install(&formula, asset, &bin_dir).await.unwrap();

        assert_eq!(installed, bin_dir.join("ghostie"));
        assert_eq!(
            fs::read_to_string(&installed).unwrap(),
            "#!/bin/sh\necho ghostie\n"
        );
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(&installed).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o755);
        }
    }

    #[tokio::test]
    async fn checksum_mismatch_removes_download() {
        let server = serve_archive(archive_bytes()).await;
        let formula = formula_for(&server, "0".repeat(64));

        let temp = TempDir::new().unwrap();
        let installer = Installer::new(temp.path().join("releases")).unwrap();
        let bin_dir = temp.path().join("bin");
        let asset = formula.asset_for(Platform::Linux).unwrap();

        let err = installer
            .install(&formula, asset, &bin_dir)
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<ReleaseError>(),
            Some(ReleaseError::ChecksumMismatch { .. })
        ));
        let staged = temp
            .path()
            .join("releases/v0.1.0/linux/ghostie-v0.1.0-x86_64-unknown-linux-gnu.tar.gz");
        assert!(!staged.exists());
        assert!(!bin_dir.join("ghostie").exists());
    }

    #[tokio::test]
    async fn missing_archive_reports_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        let formula = formula_for(&server, "0".repeat(64));

        let temp = TempDir::new().unwrap();
        let installer = Installer::new(temp.path()).unwrap();
        let asset = formula.asset_for(Platform::Linux).unwrap();

        let err = installer.fetch_verified(&formula, asset).await.unwrap_err();
        match err.downcast_ref::<ReleaseError>() {
            Some(ReleaseError::DownloadStatus { status, .. }) => assert_eq!(status.as_u16(), 404),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn reinstall_reuses_the_staged_archive() {
        let bytes = archive_bytes();
        let digest = format_digest(&Sha256::digest(&bytes).into());
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(ARCHIVE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(bytes))
            .expect(1)
            .mount(&server)
            .await;
        let formula = formula_for(&server, digest);

        let temp = TempDir::new().unwrap();
        let installer = Installer::new(temp.path().join("releases")).unwrap();
        let bin_dir = temp.path().join("bin");
        let asset = formula.asset_for(Platform::Linux).unwrap();

        installer.install(&formula, asset, &bin_dir).await.unwrap();
        fs::remove_file(bin_dir.join("ghostie")).unwrap();
        let installed = installer.install(&formula, asset, &bin_dir).await.unwrap();

        assert!(installed.is_file());
        server.verify().await;
    }

    #[tokio::test]
    async fn corrupt_staged_archive_is_downloaded_again() {
        let bytes = archive_bytes();
        let digest = format_digest(&Sha256::digest(&bytes).into());
        let server = serve_archive(bytes.clone()).await;
        let formula = formula_for(&server, digest);

        let temp = TempDir::new().unwrap();
        let staged = temp
            .path()
            .join("releases/v0.1.0/linux/ghostie-v0.1.0-x86_64-unknown-linux-gnu.tar.gz");
        fs::create_dir_all(staged.parent().unwrap()).unwrap();
        fs::write(&staged, b"truncated").unwrap();

        let installer = Installer::new(temp.path().join("releases")).unwrap();
        let asset = formula.asset_for(Platform::Linux).unwrap();
        let archive = installer.fetch_verified(&formula, asset).await.unwrap();

        assert_eq!(archive, staged);
        assert_eq!(fs::read(&staged).unwrap(), bytes);
        assert_eq!(server.received_requests().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn interrupted_download_leaves_no_partial_file() {
        use std::io::{Read, Write};
        use std::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let server = std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = Vec::new();
            let mut buffer = [0u8; 1024];
            while !request.ends_with(b"\r\n\r\n") {
                let read = stream.read(&mut buffer).unwrap();
                if read == 0 {
                    break;
                }
                request.extend_from_slice(&buffer[..read]);
            }
            stream
                .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 100\r\n\r\npartial")
                .unwrap();
        });

        let temp = TempDir::new().unwrap();
        let installer = Installer::new(temp.path()).unwrap();
        let dest = temp.path().join("ghostie.tar.gz");
        let url = format!("http://{addr}/ghostie.tar.gz");

        let err = installer.download(&url, &dest).await.unwrap_err();
        server.join().unwrap();

        assert!(matches!(
            err.downcast_ref::<ReleaseError>(),
            Some(ReleaseError::Download { .. })
        ));
        assert!(!dest.exists());
        assert!(!dest.with_extension("download").exists());
    }

    #[tokio::test]
    async fn slow_download_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_bytes(archive_bytes())
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;
        let formula = formula_for(&server, "0".repeat(64));

        let temp = TempDir::new().unwrap();
        let installer = Installer::with_timeout(temp.path(), Duration::from_millis(200)).unwrap();
        let asset = formula.asset_for(Platform::Linux).unwrap();

        let err = installer.fetch_verified(&formula, asset).await.unwrap_err();
        match err.downcast_ref::<ReleaseError>() {
            Some(ReleaseError::Download { source, .. }) => assert!(source.is_timeout()),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn failed_move_into_place_removes_temp_copy() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("ghostie");
        fs::write(&source, "#!/bin/sh\n").unwrap();

        let bin_dir = temp.path().join("bin");
        fs::create_dir_all(bin_dir.join("ghostie").join("occupied")).unwrap();

        let err = install_binary(&source, &bin_dir, "ghostie").unwrap_err();

        assert!(err.to_string().contains("Failed to move"));
        assert!(!bin_dir.join(".ghostie.tmp").exists());
        assert!(bin_dir.join("ghostie").is_dir());
    }

    #[test]
    fn resolve_binary_path_missing_errors() {
        let temp = TempDir::new().unwrap();
        let err = resolve_binary_path(temp.path(), "ghostie").unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn resolve_binary_path_rejects_duplicates() {
        let temp = TempDir::new().unwrap();
        for dir in ["a", "b"] {
            fs::create_dir_all(temp.path().join(dir)).unwrap();
            fs::write(temp.path().join(dir).join("ghostie"), "").unwrap();
        }
        let err = resolve_binary_path(temp.path(), "ghostie").unwrap_err();
        assert!(err.to_string().contains("multiple"));
    }

    #[test]
    fn archive_names_come_from_the_url() {
        assert_eq!(
            archive_file_name("https://example.com/download/v1/tool.tar.gz").unwrap(),
            "tool.tar.gz"
        );
        assert!(archive_file_name("https://example.com/").is_err());
    }
}
