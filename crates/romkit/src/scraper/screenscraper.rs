use super::client::{self, MetadataClient};
use super::{
    AssetUrls, Credentials, GameMetadata, ImageSource, MediaRef, ScrapeError, ScrapeResult,
    ScraperOptions,
};
use crate::library::RomFile;
use crate::systems::SystemDef;
use serde::Deserialize;
use std::path::Path;

const BASE_URL: &str = "https://www.screenscraper.fr/api2";
const SOFTNAME: &str = "marquee";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Response {
    header: Header,
    response: Option<Body>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Header {
    success: String,
    error: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Body {
    jeu: Option<Game>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Game {
    noms: Vec<Localized>,
    synopsis: Vec<Localized>,
    dates: Vec<Localized>,
    genres: Vec<Genre>,
    developpeur: Option<Text>,
    editeur: Option<Text>,
    joueurs: Option<Text>,
    note: Option<Text>,
    medias: Vec<Media>,
    rom: Option<Rom>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Localized {
    region: Option<String>,
    langue: Option<String>,
    text: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Genre {
    noms: Vec<Localized>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Text {
    text: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Media {
    #[serde(rename = "type")]
    kind: String,
    url: String,
    region: Option<String>,
    format: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Rom {
    romcrc: Option<String>,
    rommd5: Option<String>,
    romsha1: Option<String>,
}

/// Text in the preferred region/language, else English, else the first entry.
fn localized(entries: &[Localized], prefer: &str) -> Option<String> {
    let tagged = |e: &&Localized, tag: &str| {
        e.region.as_deref() == Some(tag) || e.langue.as_deref() == Some(tag)
    };
    entries
        .iter()
        .find(|e| tagged(e, prefer))
        .or_else(|| {
            entries
                .iter()
                .find(|e| tagged(e, "en") || tagged(e, "us"))
        })
        .or_else(|| entries.first())
        .map(|e| e.text.clone())
        .filter(|t| !t.is_empty())
}

fn genre_text(genres: &[Genre]) -> Option<String> {
    let names: Vec<String> = genres
        .iter()
        .filter_map(|g| localized(&g.noms, "en"))
        .collect();
    (!names.is_empty()).then(|| names.join(", "))
}

/// Media of `kind` for `region` or worldwide, else any region.
fn find_media(medias: &[Media], kind: &str, region: &str) -> Option<MediaRef> {
    let of_kind = || medias.iter().filter(|m| m.kind == kind && !m.url.is_empty());
    of_kind()
        .find(|m| matches!(m.region.as_deref(), Some(r) if r == region || r == "wor"))
        .or_else(|| of_kind().next())
        .map(|m| MediaRef::new(m.url.clone(), m.format.clone()))
}

fn media_type(source: ImageSource) -> &'static str {
    match source {
        ImageSource::Screenshot => "ss",
        ImageSource::TitleScreenshot => "sstitle",
        ImageSource::Box2d => "box-2D",
        ImageSource::Box3d => "box-3D",
        ImageSource::Mix => "mixrbv1",
    }
}

pub struct ScreenScraperClient {
    agent: ureq::Agent,
    credentials: Credentials,
    image_source: ImageSource,
    download_logo: bool,
    download_video: bool,
    download_fanart: bool,
}

impl ScreenScraperClient {
    pub fn new(options: &ScraperOptions) -> Self {
        Self {
            agent: client::http_agent(options.timeout),
            credentials: options.credentials.clone(),
            image_source: options.image_source,
            download_logo: options.download_logo,
            download_video: options.download_video,
            download_fanart: options.download_fanart,
        }
    }

    fn interpret(&self, response: Response, fallback_title: &str) -> Option<ScrapeResult> {
        if response.header.success != "true" {
            if let Some(error) = response.header.error.filter(|e| !e.is_empty()) {
                log::debug!("ScreenScraper: {}", error);
            }
            return None;
        }
        let game = response.response?.jeu?;

        let metadata = GameMetadata {
            title: localized(&game.noms, "wor").unwrap_or_else(|| fallback_title.to_string()),
            description: localized(&game.synopsis, "en"),
            developer: game.developpeur.map(|t| t.text),
            publisher: game.editeur.map(|t| t.text),
            release_date: localized(&game.dates, "wor"),
            genre: genre_text(&game.genres),
            players: game.joueurs.map(|t| t.text),
            rating: game.note.and_then(|t| t.text.parse().ok()),
            crc: game.rom.as_ref().and_then(|r| r.romcrc.clone()),
            md5: game.rom.as_ref().and_then(|r| r.rommd5.clone()),
            sha1: game.rom.as_ref().and_then(|r| r.romsha1.clone()),
        };

        let medias = &game.medias;
        let assets = AssetUrls {
            image: find_media(medias, media_type(self.image_source), "us")
                .or_else(|| find_media(medias, "box-2D", "us"))
                .or_else(|| find_media(medias, "ss", "us")),
            logo: self
                .download_logo
                .then(|| find_media(medias, "wheel", "us"))
                .flatten(),
            video: self
                .download_video
                .then(|| find_media(medias, "video", "us"))
                .flatten(),
            fanart: self
                .download_fanart
                .then(|| find_media(medias, "fanart", "us"))
                .flatten(),
        };

        Some(ScrapeResult { metadata, assets })
    }
}

impl MetadataClient for ScreenScraperClient {
    fn fetch_metadata(
        &self,
        rom: &RomFile,
        system: &SystemDef,
    ) -> Result<Option<ScrapeResult>, ScrapeError> {
        let name = rom.display_name();
        let mut request = self
            .agent
            .get(format!("{BASE_URL}/jeuInfos.php"))
            .query("output", "json")
            .query("softname", SOFTNAME)
            .query("systemeid", system.platform.screenscraper.to_string())
            .query("romnom", &name)
            .query("romtaille", rom.size.to_string());

        let credentials = [
            ("devid", &self.credentials.dev_id),
            ("devpassword", &self.credentials.dev_password),
            ("ssid", &self.credentials.username),
            ("sspassword", &self.credentials.password),
        ];
        for (key, value) in credentials {
            if let Some(value) = value {
                request = request.query(key, value);
            }
        }

        let response = match request.call() {
            Ok(response) => response,
            // unknown games are reported as 404
            Err(ureq::Error::StatusCode(404)) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let body: Response = response.into_body().read_json()?;
        Ok(self.interpret(body, &name))
    }

    fn download_asset(&self, url: &str, destination: &Path) -> bool {
        match client::download_to(&self.agent, url, destination) {
            Ok(bytes) => {
                log::debug!("Downloaded {} bytes to {}", bytes, destination.display());
                true
            }
            Err(e) => {
                log::warn!("Download of {} failed: {}", url, e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "header": { "APIversion": "2.0", "success": "true" },
        "response": {
            "jeu": {
                "id": "3",
                "noms": [
                    { "region": "ss", "text": "Sonic The Hedgehog" },
                    { "region": "wor", "text": "Sonic the Hedgehog" }
                ],
                "synopsis": [
                    { "langue": "fr", "text": "Le hérisson bleu." },
                    { "langue": "en", "text": "The blue hedgehog." }
                ],
                "dates": [{ "region": "us", "text": "1991-06-23" }],
                "genres": [
                    { "id": "7", "noms": [{ "langue": "en", "text": "Platform" }] },
                    { "id": "8", "noms": [{ "langue": "fr", "text": "Action" }] }
                ],
                "developpeur": { "id": "1", "text": "Sonic Team" },
                "editeur": { "id": "2", "text": "Sega" },
                "joueurs": { "text": "1" },
                "note": { "text": "17" },
                "rom": { "romcrc": "F9394E97" },
                "medias": [
                    { "type": "ss", "url": "https://ss/ss-jp.png", "region": "jp", "format": "png" },
                    { "type": "ss", "url": "https://ss/ss-wor.png", "region": "wor", "format": "png" },
                    { "type": "box-2D", "url": "https://ss/box.png", "region": "us", "format": "png" },
                    { "type": "wheel", "url": "https://ss/wheel.png", "region": "eu", "format": "png" },
                    { "type": "video", "url": "https://ss/video", "format": "mp4" }
                ]
            }
        }
    }"#;

    fn client(options: ScraperOptions) -> ScreenScraperClient {
        ScreenScraperClient::new(&options)
    }

    #[test]
    fn test_interpret_full_response() {
        let client = client(ScraperOptions {
            image_source: ImageSource::Screenshot,
            download_video: false,
            ..ScraperOptions::default()
        });
        let response: Response = serde_json::from_str(SAMPLE).unwrap();
        let result = client.interpret(response, "sonic").unwrap();

        assert_eq!(result.metadata.title, "Sonic the Hedgehog");
        assert_eq!(result.metadata.description.as_deref(), Some("The blue hedgehog."));
        assert_eq!(result.metadata.release_date.as_deref(), Some("1991-06-23"));
        assert_eq!(result.metadata.genre.as_deref(), Some("Platform, Action"));
        assert_eq!(result.metadata.developer.as_deref(), Some("Sonic Team"));
        assert_eq!(result.metadata.rating, Some(17.0));
        assert_eq!(result.metadata.crc.as_deref(), Some("F9394E97"));

        // worldwide screenshot preferred over the Japanese one
        assert_eq!(result.assets.image.unwrap().url, "https://ss/ss-wor.png");
        // no us/wor wheel, any region accepted
        assert_eq!(result.assets.logo.unwrap().url, "https://ss/wheel.png");
        assert!(result.assets.video.is_none());
        assert!(result.assets.fanart.is_none());
    }

    #[test]
    fn test_missing_media_type_falls_back_to_box_art() {
        let client = client(ScraperOptions {
            image_source: ImageSource::Box3d,
            ..ScraperOptions::default()
        });
        let response: Response = serde_json::from_str(SAMPLE).unwrap();
        let result = client.interpret(response, "sonic").unwrap();
        assert_eq!(result.assets.image.unwrap().url, "https://ss/box.png");
        assert_eq!(result.assets.video.unwrap().format.as_deref(), Some("mp4"));
    }

    #[test]
    fn test_unsuccessful_header_is_no_result() {
        let client = client(ScraperOptions::default());
        let response: Response =
            serde_json::from_str(r#"{ "header": { "success": "false", "error": "quota" } }"#)
                .unwrap();
        assert!(client.interpret(response, "x").is_none());

        let empty: Response = serde_json::from_str(r#"{ "header": { "success": "true" } }"#).unwrap();
        assert!(client.interpret(empty, "x").is_none());
    }
}
