use super::client::{self, MetadataClient};
use super::{
    AssetUrls, GameMetadata, ImageSource, MediaRef, ScrapeError, ScrapeResult, ScraperOptions,
    ScraperSource,
};
use crate::library::RomFile;
use crate::systems::SystemDef;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

const BASE_URL: &str = "https://api.thegamesdb.net/v1";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Response {
    code: u16,
    status: String,
    data: Option<Data>,
    include: Option<Include>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Data {
    games: Vec<Game>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Game {
    id: u64,
    game_title: String,
    release_date: Option<String>,
    overview: Option<String>,
    players: Option<u32>,
    rating: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Include {
    boxart: Option<Boxart>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Boxart {
    base_url: BaseUrl,
    data: HashMap<String, Vec<Picture>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct BaseUrl {
    original: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Picture {
    #[serde(rename = "type")]
    kind: String,
    side: Option<String>,
    filename: String,
}

pub struct TheGamesDbClient {
    agent: ureq::Agent,
    api_key: Option<String>,
    image_source: ImageSource,
    download_logo: bool,
    download_fanart: bool,
}

impl TheGamesDbClient {
    pub fn new(options: &ScraperOptions) -> Self {
        Self {
            agent: client::http_agent(options.timeout),
            api_key: options.credentials.api_key.clone(),
            image_source: options.image_source,
            download_logo: options.download_logo,
            download_fanart: options.download_fanart,
        }
    }

    fn interpret(&self, response: Response) -> Result<Option<ScrapeResult>, ScrapeError> {
        if response.code != 200 {
            return Err(ScrapeError::Api {
                service: ScraperSource::TheGamesDb,
                message: format!("{} {}", response.code, response.status),
            });
        }
        let Some(game) = response.data.and_then(|d| d.games.into_iter().next()) else {
            return Ok(None);
        };

        let metadata = GameMetadata {
            title: game.game_title,
            description: game.overview,
            release_date: game.release_date,
            players: game.players.map(|p| p.to_string()),
            rating: game.rating.and_then(|r| r.parse().ok()),
            ..GameMetadata::default()
        };

        let mut assets = AssetUrls::default();
        if let Some(boxart) = response.include.and_then(|i| i.boxart) {
            let pictures = boxart
                .data
                .get(&game.id.to_string())
                .map(Vec::as_slice)
                .unwrap_or_default();
            let url = |picture: &Picture| {
                MediaRef::new(format!("{}{}", boxart.base_url.original, picture.filename), None)
            };
            let find = |kind: &str| pictures.iter().find(|p| p.kind == kind).map(url);

            let front = pictures
                .iter()
                .find(|p| p.kind == "boxart" && p.side.as_deref() == Some("front"))
                .map(url);
            let screenshot = find("screenshot");
            assets.image = if self.image_source.prefers_box_art() {
                front.or(screenshot)
            } else {
                screenshot.or(front)
            };
            if self.download_logo {
                assets.logo = find("clearlogo");
            }
            if self.download_fanart {
                assets.fanart = find("fanart");
            }
        }

        Ok(Some(ScrapeResult { metadata, assets }))
    }
}

impl MetadataClient for TheGamesDbClient {
    fn fetch_metadata(
        &self,
        rom: &RomFile,
        system: &SystemDef,
    ) -> Result<Option<ScrapeResult>, ScrapeError> {
        let mut request = self
            .agent
            .get(format!("{BASE_URL}/Games/ByGameName"))
            .query("name", rom.display_name())
            .query("filter[platform]", system.platform.thegamesdb.to_string())
            .query("fields", "players,publishers,genres,overview,rating")
            .query("include", "boxart");
        if let Some(key) = &self.api_key {
            request = request.query("apikey", key);
        }

        let body: Response = request.call()?.into_body().read_json()?;
        self.interpret(body)
    }

    fn download_asset(&self, url: &str, destination: &Path) -> bool {
        client::download_to(&self.agent, url, destination)
            .inspect_err(|e| log::warn!("Download of {} failed: {}", url, e))
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "code": 200,
        "status": "Success",
        "data": {
            "count": 1,
            "games": [{
                "id": 140,
                "game_title": "Super Metroid",
                "release_date": "1994-04-18",
                "platform": 6,
                "players": 1,
                "overview": "Samus returns.",
                "rating": "8.5"
            }]
        },
        "include": {
            "boxart": {
                "base_url": { "original": "https://cdn.thegamesdb.net/images/original/" },
                "data": {
                    "140": [
                        { "id": 1, "type": "screenshot", "filename": "screenshots/140-1.jpg" },
                        { "id": 2, "type": "boxart", "side": "back", "filename": "boxart/back/140-1.jpg" },
                        { "id": 3, "type": "boxart", "side": "front", "filename": "boxart/front/140-1.jpg" },
                        { "id": 4, "type": "clearlogo", "filename": "clearlogo/140.png" }
                    ]
                }
            }
        }
    }"#;

    fn parse() -> Response {
        serde_json::from_str(SAMPLE).unwrap()
    }

    #[test]
    fn test_interpret_prefers_front_box_art() {
        let client = TheGamesDbClient::new(&ScraperOptions::default());
        let result = client.interpret(parse()).unwrap().unwrap();

        assert_eq!(result.metadata.title, "Super Metroid");
        assert_eq!(result.metadata.players.as_deref(), Some("1"));
        assert_eq!(result.metadata.rating, Some(8.5));
        assert_eq!(
            result.assets.image.unwrap().url,
            "https://cdn.thegamesdb.net/images/original/boxart/front/140-1.jpg"
        );
        assert!(result.assets.logo.unwrap().url.ends_with("clearlogo/140.png"));
        assert!(result.assets.fanart.is_none());
    }

    #[test]
    fn test_screenshot_source_uses_screenshot() {
        let client = TheGamesDbClient::new(&ScraperOptions {
            image_source: ImageSource::Screenshot,
            download_logo: false,
            ..ScraperOptions::default()
        });
        let result = client.interpret(parse()).unwrap().unwrap();
        assert!(result.assets.image.unwrap().url.ends_with("screenshots/140-1.jpg"));
        assert!(result.assets.logo.is_none());
    }

    #[test]
    fn test_empty_and_failed_responses() {
        let client = TheGamesDbClient::new(&ScraperOptions::default());
        let empty: Response =
            serde_json::from_str(r#"{ "code": 200, "status": "Success", "data": { "games": [] } }"#)
                .unwrap();
        assert!(client.interpret(empty).unwrap().is_none());

        let denied: Response =
            serde_json::from_str(r#"{ "code": 403, "status": "Invalid API key" }"#).unwrap();
        assert!(matches!(
            client.interpret(denied),
            Err(ScrapeError::Api { service: ScraperSource::TheGamesDb, .. })
        ));
    }
}
