//! Thin wrappers around the Steam Web API and community endpoints, plus
//! the card database download. Everything algorithmic lives elsewhere;
//! these are the collaborator boundaries.

use crate::badges::BadgeOracle;
use crate::error::Error;
use crate::helpers::{get_default_middleware, parses_response, retry, RetryPolicy};
use crate::inventory::AssetProvider;
use crate::response::{Asset, Badge, BadgeSummary, ClassInfo};
use crate::serialize;
use crate::types::{AppId, ContextId, HttpClient};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use async_trait::async_trait;
use reqwest::header::REFERER;
use serde::{Serialize, Deserialize};
use steamid_ng::SteamID;

const USER_AGENT_STRING: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/97.0.4692.71 Safari/537.36";
const HOSTNAME: &str = "https://steamcommunity.com";
const API_HOSTNAME: &str = "https://api.steampowered.com";
const CARD_DATABASE_URL: &str = "https://bartervg.com/browse/cards/json/";
const CARD_DATABASE_RETRY_DELAY: Duration = Duration::from_secs(60);

/// Client for the Steam endpoints the engine depends on: badge progress,
/// inventory contents, and the community card database.
#[derive(Debug, Clone)]
pub struct SteamWebAPI {
    client: HttpClient,
    api_key: String,
}

impl SteamWebAPI {
    /// Creates a new [`SteamWebAPI`] using the given Web API key.
    pub fn new(api_key: String) -> Self {
        Self {
            client: get_default_middleware(USER_AGENT_STRING),
            api_key,
        }
    }

    /// Downloads the app ID to set-size table from barter.vg. Transient
    /// failures and bad responses retry once a minute until a copy is
    /// obtained.
    pub async fn fetch_card_database(&self) -> Result<HashMap<AppId, u32>, Error> {
        #[derive(Deserialize)]
        struct BarterApp {
            cards: u32,
        }

        let retryable = |error: &Error| {
            error.is_transient() || matches!(error, Error::Http(_) | Error::Parse(_))
        };

        retry(
            RetryPolicy::unbounded(CARD_DATABASE_RETRY_DELAY),
            retryable,
            || async move {
                log::debug!("Requesting card set database");

                let response = self.client.get(CARD_DATABASE_URL).send().await?;
                let body: HashMap<AppId, BarterApp> = parses_response(response).await?;

                Ok(body
                    .into_iter()
                    .map(|(appid, app)| (appid, app.cards))
                    .collect())
            },
        ).await
    }
}

#[async_trait]
impl BadgeOracle for SteamWebAPI {
    async fn get_badges(&self, customer: SteamID) -> Result<BadgeSummary, Error> {
        #[derive(Serialize)]
        struct Query<'a> {
            steamid: u64,
            key: &'a str,
        }

        let uri = format!("{API_HOSTNAME}/IPlayerService/GetBadges/v1/");
        let response = self.client.get(&uri)
            .query(&Query {
                steamid: u64::from(customer),
                key: self.api_key.as_str(),
            })
            .send()
            .await?;
        let body: GetBadgesResponse = parses_response(response).await?;

        body.response.into_summary()
    }
}

#[async_trait]
impl AssetProvider for SteamWebAPI {
    async fn get_inventory(
        &self,
        steamid: SteamID,
        appid: AppId,
        contextid: ContextId,
        tradable_only: bool,
    ) -> Result<Vec<Asset>, Error> {
        #[derive(Serialize)]
        struct Query<'a> {
            l: &'a str,
            count: u32,
            start_assetid: Option<u64>,
        }

        let mut responses: Vec<GetInventoryResponse> = Vec::new();
        let mut start_assetid: Option<u64> = None;
        let sid = u64::from(steamid);
        let uri = format!("{HOSTNAME}/inventory/{sid}/{appid}/{contextid}");
        let referer = format!("{HOSTNAME}/profiles/{sid}/inventory");

        loop {
            let response = self.client.get(&uri)
                .header(REFERER, &referer)
                .query(&Query {
                    l: "english",
                    count: 2000,
                    start_assetid,
                })
                .send()
                .await?;

            // A private inventory is a terminal state, not worth a retry.
            if response.status() == reqwest::StatusCode::FORBIDDEN {
                return Err(Error::PrivateInventory);
            }

            let body: GetInventoryResponse = parses_response(response).await?;

            if !body.success {
                return Err(Error::Response("inventory response unsuccessful".into()));
            } else if body.more_items {
                // shouldn't occur, but we wouldn't want to call this endlessly if it does...
                if body.last_assetid == start_assetid {
                    return Err(Error::Response("malformed inventory pagination".into()));
                }

                start_assetid = body.last_assetid;
                responses.push(body);
            } else {
                responses.push(body);
                break;
            }
        }

        let mut inventory = Vec::new();

        for body in responses {
            let descriptions = body.descriptions
                .into_iter()
                .map(|classinfo| ((classinfo.classid, classinfo.instanceid), Arc::new(classinfo)))
                .collect::<HashMap<_, _>>();

            for item in body.assets {
                let classinfo = descriptions
                    .get(&(item.classid, item.instanceid))
                    .ok_or_else(|| Error::Response(format!(
                        "missing description for {}:{}",
                        item.classid,
                        item.instanceid,
                    )))?;

                if tradable_only && !classinfo.tradable {
                    continue;
                }

                inventory.push(Asset {
                    appid,
                    contextid,
                    assetid: item.assetid,
                    amount: item.amount,
                    classinfo: Arc::clone(classinfo),
                });
            }
        }

        Ok(inventory)
    }
}

#[derive(Deserialize)]
struct GetBadgesResponse {
    response: RawBadges,
}

#[derive(Deserialize)]
struct RawBadges {
    #[serde(default)]
    badges: Vec<Badge>,
    player_level: Option<u32>,
    player_xp: Option<u64>,
}

impl RawBadges {
    /// An empty response body (no level, no badges) is what a private
    /// profile looks like.
    fn into_summary(self) -> Result<BadgeSummary, Error> {
        let player_level = self.player_level.ok_or(Error::EmptyProfile)?;

        Ok(BadgeSummary {
            badges: self.badges,
            player_level,
            player_xp: self.player_xp.unwrap_or_default(),
        })
    }
}

#[derive(Deserialize)]
struct GetInventoryResponse {
    #[serde(default)]
    #[serde(deserialize_with = "serialize::from_int_to_bool")]
    success: bool,
    #[serde(default)]
    #[serde(deserialize_with = "serialize::from_int_to_bool")]
    more_items: bool,
    #[serde(default)]
    assets: Vec<RawAsset>,
    #[serde(default)]
    descriptions: Vec<ClassInfo>,
    #[serde(default)]
    #[serde(deserialize_with = "serialize::option_str_to_number")]
    last_assetid: Option<u64>,
}

#[derive(Deserialize)]
struct RawAsset {
    #[serde(with = "serialize::string")]
    assetid: u64,
    #[serde(with = "serialize::string")]
    classid: u64,
    #[serde(default)]
    #[serde(with = "serialize::string")]
    instanceid: u64,
    #[serde(with = "serialize::string")]
    amount: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_get_inventory_response() {
        let response: GetInventoryResponse = serde_json::from_str(include_str!("fixtures/inventory.json")).unwrap();

        assert!(response.success);
        assert_eq!(response.assets.len(), 2);
        assert_eq!(response.assets[0].assetid, 11152148507);
        assert_eq!(response.descriptions.len(), 2);
        assert!(response.descriptions[0].is_normal_card());
    }

    #[test]
    fn empty_badge_response_is_an_empty_profile() {
        let body: GetBadgesResponse = serde_json::from_str(r#"{"response":{}}"#).unwrap();
        let result = body.response.into_summary();

        assert!(matches!(result, Err(Error::EmptyProfile)));
    }

    #[test]
    fn parses_badge_response() {
        let body: GetBadgesResponse = serde_json::from_str(r#"{
            "response": {
                "badges": [
                    { "badgeid": 13, "appid": 440, "level": 2, "border_color": 0, "xp": 200, "scarcity": 100 }
                ],
                "player_level": 14,
                "player_xp": 1306
            }
        }"#).unwrap();
        let summary = body.response.into_summary().unwrap();

        assert_eq!(summary.player_level, 14);
        assert_eq!(summary.badges[0].appid, Some(440));
    }
}
