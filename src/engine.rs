//! The exchange engine: reconciles inventories, plans allocations, sends
//! offers, and credits completions exactly once.

use crate::allocation::{self, AllocationPlan};
use crate::badges::{BadgeOracle, Eligibility};
use crate::catalog::SetSizeCatalog;
use crate::completion::CompletionCache;
use crate::config::Config;
use crate::enums::{AllocationMode, TradeDirection, TradeOfferState};
use crate::error::{Error, TradeOfferError};
use crate::helpers::{retry, RetryPolicy};
use crate::inventory::{self, AssetProvider, InventorySnapshot};
use crate::offer::{self, OfferTransport, TradeOfferRecord};
use crate::profit::{ProfitLedger, Profits};
use crate::request::OfferItem;
use crate::response::SentOffer;
use crate::types::{AppId, TradeOfferId, CARD_CONTEXTID, KEY_CONTEXTID, STEAM_APPID, TF2_APPID};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;
use async_trait::async_trait;
use steamid_ng::SteamID;

/// What the bot calls its currency when talking about trades.
pub const KEY_CURRENCY_LABEL: &str = "tf key(s)";

const BADGE_RETRY_DELAY: Duration = Duration::from_secs(2);
const INVENTORY_RETRY_DELAY: Duration = Duration::from_secs(5);

/// A typed customer-facing outcome. Rendering these into chat messages is
/// the transport layer's business, not the engine's.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// An offer is on its way.
    OfferSent {
        tradeofferid: TradeOfferId,
    },
    /// The trade would be held in escrow and was refused.
    TradeHold,
    /// The partner cannot trade at all right now.
    NotAvailableToTrade,
    /// The bot has sent too many offers and Steam is rate limiting it.
    TooManyOffers,
    /// The bot cannot fill the requested sets.
    NeedMoreSets {
        available: u32,
        needed: u32,
    },
    /// The bot cannot pay the requested keys.
    NeedMoreKeys {
        available: u32,
        needed: u32,
    },
    /// The customer has no keys to pay with.
    CustomerHasNoKeys,
    /// The customer has keys, just not enough.
    CustomerNeedsKeys {
        available: u32,
        needed: u32,
    },
    /// The customer has no complete sets to sell.
    CustomerHasNoSets,
    /// The customer has sets, just not enough for the requested keys.
    CustomerNeedsSets {
        available: u32,
        needed: u32,
    },
    /// The customer's inventory is private.
    PrivateInventory,
    /// The customer's badges could not be read, typically a private
    /// profile.
    BadgesUnavailable,
    /// A completed trade; thanks.
    Thanks,
    /// Something unexpected went wrong.
    TradeFailed,
}

/// Delivers notices, admin messages and profile comments. Implemented
/// over the chat transport in production.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify_customer(&self, customer: SteamID, notice: Notice);
    async fn notify_admins(&self, message: &str);
    async fn post_comment(&self, customer: SteamID, comment: &str);
}

/// One delivery from the offer notification stream. The stream is
/// at-least-once: the same event can arrive more than once.
#[derive(Debug, Clone)]
pub struct OfferEvent {
    /// The offer that changed.
    pub tradeofferid: TradeOfferId,
    /// The trade partner.
    pub partner: SteamID,
    /// The state the offer changed into.
    pub state: TradeOfferState,
    /// The metadata blob stored with the offer at send time, if any.
    pub metadata: Option<String>,
}

/// The inventory reconciliation and trade composition engine.
///
/// Holds a wholesale-replaced inventory snapshot and the collaborator
/// ports everything else is done through. Requests read whatever snapshot
/// is current when they start. There is no locking between concurrent
/// requests, so two simultaneous buys can plan against the same stock;
/// in practice a single chat consumer bounds that risk.
pub struct ExchangeEngine {
    config: Config,
    steamid: SteamID,
    assets: Arc<dyn AssetProvider>,
    badges: Arc<dyn BadgeOracle>,
    transport: Arc<dyn OfferTransport>,
    notifier: Arc<dyn Notifier>,
    catalog: Arc<dyn SetSizeCatalog>,
    snapshot: RwLock<InventorySnapshot>,
    profit: tokio::sync::Mutex<ProfitLedger>,
    completed: Mutex<CompletionCache>,
}

impl ExchangeEngine {
    /// Builder for constructing an [`ExchangeEngine`].
    pub fn builder(config: Config, steamid: SteamID) -> ExchangeEngineBuilder {
        ExchangeEngineBuilder::new(config, steamid)
    }

    /// The total number of complete sets in stock.
    pub fn have_sets(&self) -> usize {
        self.snapshot.read().unwrap().sets.total_sets()
    }

    /// The number of keys in stock.
    pub fn have_keys(&self) -> usize {
        self.snapshot.read().unwrap().keys.len()
    }

    /// The number of complete sets in stock for one game.
    pub fn stock(&self, appid: AppId) -> usize {
        self.snapshot.read().unwrap().sets.stock(appid)
    }

    /// The lifetime profit totals.
    pub async fn profits(&self) -> Profits {
        self.profit.lock().await.profits()
    }

    /// Loads the bot's inventory, replacing the snapshot wholesale. Cards
    /// and keys load concurrently; transient failures retry on a fixed
    /// delay until they clear. A no-op when already loaded, unless
    /// `force` is set.
    pub async fn load_inventory(&self, force: bool) -> Result<(), Error> {
        if !force && self.snapshot.read().unwrap().is_loaded() {
            return Ok(());
        }

        log::info!("Loading bot inventory");

        let policy = RetryPolicy::unbounded(INVENTORY_RETRY_DELAY);
        let cards = retry(policy, Error::is_transient, || {
            self.assets.get_inventory(self.steamid, STEAM_APPID, CARD_CONTEXTID, true)
        });
        let key_assets = retry(policy, Error::is_transient, || {
            self.assets.get_inventory(self.steamid, TF2_APPID, KEY_CONTEXTID, true)
        });
        let (cards, key_assets) = futures::future::try_join(cards, key_assets).await?;
        let grouping = inventory::group_cards(&cards);
        let sets = inventory::assemble_sets(grouping, self.catalog.as_ref());
        let keys = inventory::customer_keys(&key_assets);

        log::info!("Found {} keys", keys.len());

        *self.snapshot.write().unwrap() = InventorySnapshot {
            sets,
            keys,
        };

        Ok(())
    }

    /// Sells sets to a customer for keys: the `!buy` family of requests.
    ///
    /// Validates the customer's key balance, reconciles their badge
    /// eligibility per `mode`, plans the allocation and sends the offer.
    /// Refusals are delivered to the customer as notices before the error
    /// returns.
    pub async fn buy(
        &self,
        customer: SteamID,
        keys_amount: u32,
        mode: AllocationMode,
    ) -> Result<SentOffer, Error> {
        let result = self.try_buy(customer, keys_amount, mode).await;

        if let Err(error) = &result {
            self.report(customer, error).await;
        }

        result
    }

    async fn try_buy(
        &self,
        customer: SteamID,
        keys_amount: u32,
        mode: AllocationMode,
    ) -> Result<SentOffer, Error> {
        self.check_key_amount(keys_amount)?;

        let key_assets = retry(
            RetryPolicy::unbounded(INVENTORY_RETRY_DELAY),
            Error::is_transient,
            || self.assets.get_inventory(customer, TF2_APPID, KEY_CONTEXTID, true),
        ).await?;
        let customer_keys = inventory::customer_keys(&key_assets);
        let available = customer_keys.len() as u32;

        if available < keys_amount {
            return Err(Error::CustomerMissingKeys {
                available,
                needed: keys_amount,
            });
        }

        let needed_sets = self.config.sell_rate * keys_amount;
        let eligibility = match mode {
            AllocationMode::Compare => Eligibility::compare(&self.get_badges(customer).await?),
            AllocationMode::Collector => Eligibility::collector(&self.get_badges(customer).await?),
            AllocationMode::Any => Eligibility::any(),
        };
        let plan = {
            let snapshot = self.snapshot.read().unwrap();

            allocation::plan(&snapshot.sets, &eligibility, needed_sets)
        };

        if !plan.is_complete(needed_sets) {
            return Err(Error::MissingSets {
                available: plan.sets_taken,
                needed: needed_sets,
            });
        }

        let sent = self.send_offer_for_plan(customer, plan, customer_keys, keys_amount).await?;

        self.notifier
            .notify_customer(customer, Notice::OfferSent {
                tradeofferid: sent.tradeofferid,
            })
            .await;

        Ok(sent)
    }

    async fn send_offer_for_plan(
        &self,
        customer: SteamID,
        plan: AllocationPlan,
        customer_keys: Vec<u64>,
        keys_amount: u32,
    ) -> Result<SentOffer, Error> {
        let items_to_give = plan.items
            .iter()
            .map(|card| OfferItem::card(card.assetid))
            .collect();
        let items_to_receive = inventory::to_offer_keys(&customer_keys, keys_amount)
            .map_err(|_| Error::CustomerMissingKeys {
                available: customer_keys.len() as u32,
                needed: keys_amount,
            })?;
        let record = TradeOfferRecord {
            direction: TradeDirection::Sell,
            sets: plan.sets_taken,
            currency: keys_amount,
            currency_label: KEY_CURRENCY_LABEL.into(),
        };

        offer::send_exchange_offer(
            self.transport.as_ref(),
            customer,
            items_to_give,
            items_to_receive,
            record,
        ).await
    }

    /// Buys sets from a customer for keys: the `!sell` request.
    ///
    /// The customer's complete sets are capped per game by the configured
    /// stock limit; games the bot is already full on are not bought.
    pub async fn sell(
        &self,
        customer: SteamID,
        keys_to_send: u32,
    ) -> Result<SentOffer, Error> {
        let result = self.try_sell(customer, keys_to_send).await;

        if let Err(error) = &result {
            self.report(customer, error).await;
        }

        result
    }

    async fn try_sell(
        &self,
        customer: SteamID,
        keys_to_send: u32,
    ) -> Result<SentOffer, Error> {
        if !self.config.enable_sell {
            return Err(Error::Parameter("selling is disabled"));
        }

        self.check_key_amount(keys_to_send)?;

        let bot_keys = self.snapshot.read().unwrap().keys.clone();

        if (bot_keys.len() as u32) < keys_to_send {
            return Err(Error::MissingKeys {
                available: bot_keys.len() as u32,
                needed: keys_to_send,
            });
        }

        let card_assets = retry(
            RetryPolicy::unbounded(INVENTORY_RETRY_DELAY),
            Error::is_transient,
            || self.assets.get_inventory(customer, STEAM_APPID, CARD_CONTEXTID, true),
        ).await?;
        let grouping = inventory::group_cards(&card_assets);
        let customer_inventory = inventory::assemble_sets(grouping, self.catalog.as_ref());
        let requested_sets = keys_to_send * self.config.buy_rate;
        let chosen = {
            let snapshot = self.snapshot.read().unwrap();

            allocation::customer_sell_sets(&customer_inventory, &snapshot.sets, self.config.max_stock)
        };

        if (chosen.len() as u32) < requested_sets {
            return Err(Error::CustomerMissingSets {
                available: chosen.len() as u32,
                needed: requested_sets,
            });
        }

        let items_to_give = inventory::to_offer_keys(&bot_keys, keys_to_send)?;
        let items_to_receive = chosen
            .iter()
            .take(requested_sets as usize)
            .flatten()
            .map(|card| OfferItem::card(card.assetid))
            .collect();
        let record = TradeOfferRecord {
            direction: TradeDirection::Buy,
            sets: requested_sets,
            currency: keys_to_send,
            currency_label: KEY_CURRENCY_LABEL.into(),
        };
        let sent = offer::send_exchange_offer(
            self.transport.as_ref(),
            customer,
            items_to_give,
            items_to_receive,
            record,
        ).await?;

        self.notifier
            .notify_customer(customer, Notice::OfferSent {
                tradeofferid: sent.tradeofferid,
            })
            .await;

        Ok(sent)
    }

    /// Handles one delivery from the offer notification stream.
    ///
    /// Only transitions into `Accepted` have effects, and each accepted
    /// offer is credited exactly once no matter how often the stream
    /// redelivers it: inventory reload, profit update, admin notification
    /// and the thank-you comment all sit behind the completion cache.
    pub async fn handle_offer_changed(&self, event: OfferEvent) -> Result<(), Error> {
        if event.state != TradeOfferState::Accepted {
            return Ok(());
        }

        let repeated = self.completed.lock().unwrap().seen_or_mark(event.tradeofferid);

        if repeated {
            log::debug!("Offer #{} already processed", event.tradeofferid);
            return Ok(());
        }

        self.load_inventory(true).await?;

        if let Some(metadata) = &event.metadata {
            match TradeOfferRecord::from_metadata(metadata) {
                Ok(record) => self.credit_completed_trade(&event, &record).await?,
                Err(error) => log::error!(
                    "Failed to read metadata of offer #{}: {error}",
                    event.tradeofferid,
                ),
            }
        }

        if let Some(comment) = &self.config.thanks_comment {
            if event.metadata.is_some() {
                self.notifier.post_comment(event.partner, comment).await;
                self.notifier.notify_customer(event.partner, Notice::Thanks).await;
            }
        }

        Ok(())
    }

    async fn credit_completed_trade(
        &self,
        event: &OfferEvent,
        record: &TradeOfferRecord,
    ) -> Result<(), Error> {
        self.profit.lock().await.record(record).await?;

        let verb = match record.direction {
            TradeDirection::Sell => "sold",
            TradeDirection::Buy => "bought",
        };
        let text = format!(
            "#{} accepted a trade offer: {verb} {} set(s) for {} {}",
            u64::from(event.partner),
            record.sets,
            record.currency,
            record.currency_label,
        );

        log::info!("{text}");

        if self.config.notify_admins_on_sale {
            self.notifier.notify_admins(&text).await;
        }

        Ok(())
    }

    async fn get_badges(&self, customer: SteamID) -> Result<crate::response::BadgeSummary, Error> {
        retry(
            RetryPolicy::unbounded(BADGE_RETRY_DELAY),
            Error::is_transient,
            || self.badges.get_badges(customer),
        ).await
    }

    fn check_key_amount(&self, keys_amount: u32) -> Result<(), Error> {
        if keys_amount == 0 {
            return Err(Error::Parameter("key amount must be at least 1"));
        }

        if keys_amount > self.config.max_trade_keys {
            return Err(Error::Parameter("key amount exceeds the per-trade limit"));
        }

        Ok(())
    }

    /// Maps an error onto the notice the customer should see. Terminal
    /// business conditions are expected states and not logged as
    /// failures; anything unexpected is.
    async fn report(&self, customer: SteamID, error: &Error) {
        let notice = match error {
            Error::PrivateInventory => Notice::PrivateInventory,
            Error::EmptyProfile => Notice::BadgesUnavailable,
            Error::EscrowHold(_) => Notice::TradeHold,
            Error::NotAvailableToTrade => {
                log::info!("#{} is unavailable to trade", u64::from(customer));
                Notice::NotAvailableToTrade
            },
            Error::Trade(TradeOfferError::LimitExceeded) => Notice::TooManyOffers,
            Error::MissingSets { available, needed } => Notice::NeedMoreSets {
                available: *available,
                needed: *needed,
            },
            Error::MissingKeys { available, needed } => Notice::NeedMoreKeys {
                available: *available,
                needed: *needed,
            },
            Error::CustomerMissingKeys { available: 0, .. } => Notice::CustomerHasNoKeys,
            Error::CustomerMissingKeys { available, needed } => Notice::CustomerNeedsKeys {
                available: *available,
                needed: *needed,
            },
            Error::CustomerMissingSets { available: 0, .. } => Notice::CustomerHasNoSets,
            Error::CustomerMissingSets { available, needed } => Notice::CustomerNeedsSets {
                available: *available,
                needed: *needed,
            },
            other => {
                log::error!("Trade failed: {other}");
                Notice::TradeFailed
            },
        };

        self.notifier.notify_customer(customer, notice).await;
    }
}

/// Builder for constructing an [`ExchangeEngine`].
pub struct ExchangeEngineBuilder {
    config: Config,
    steamid: SteamID,
    assets: Option<Arc<dyn AssetProvider>>,
    badges: Option<Arc<dyn BadgeOracle>>,
    transport: Option<Arc<dyn OfferTransport>>,
    notifier: Option<Arc<dyn Notifier>>,
    catalog: Option<Arc<dyn SetSizeCatalog>>,
}

impl ExchangeEngineBuilder {
    pub fn new(config: Config, steamid: SteamID) -> Self {
        Self {
            config,
            steamid,
            assets: None,
            badges: None,
            transport: None,
            notifier: None,
            catalog: None,
        }
    }

    /// The inventory retrieval collaborator.
    pub fn assets(mut self, assets: Arc<dyn AssetProvider>) -> Self {
        self.assets = Some(assets);
        self
    }

    /// The badge progress collaborator.
    pub fn badges(mut self, badges: Arc<dyn BadgeOracle>) -> Self {
        self.badges = Some(badges);
        self
    }

    /// The trade-offer transport collaborator.
    pub fn transport(mut self, transport: Arc<dyn OfferTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// The notification collaborator.
    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// The set-size catalog collaborator.
    pub fn catalog(mut self, catalog: Arc<dyn SetSizeCatalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Builds the engine, loading the profit ledger from the configured
    /// data directory. Fails when a collaborator is missing.
    pub fn build(self) -> Result<ExchangeEngine, Error> {
        let profit = ProfitLedger::load(&self.config.data_directory);

        Ok(ExchangeEngine {
            steamid: self.steamid,
            assets: self.assets.ok_or(Error::Parameter("missing assets collaborator"))?,
            badges: self.badges.ok_or(Error::Parameter("missing badges collaborator"))?,
            transport: self.transport.ok_or(Error::Parameter("missing transport collaborator"))?,
            notifier: self.notifier.ok_or(Error::Parameter("missing notifier collaborator"))?,
            catalog: self.catalog.ok_or(Error::Parameter("missing catalog collaborator"))?,
            snapshot: RwLock::new(InventorySnapshot::default()),
            profit: tokio::sync::Mutex::new(profit),
            completed: Mutex::new(CompletionCache::new()),
            config: self.config,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::FixedSetSizeCatalog;
    use crate::response::{Asset, Badge, BadgeSummary, ClassInfo, Tag, UserDetails};
    use crate::request::NewTradeOffer;
    use crate::types::{AppId, ContextId};
    use std::collections::HashMap;

    struct StaticAssets {
        inventories: HashMap<(u64, AppId), Vec<Asset>>,
    }

    #[async_trait]
    impl AssetProvider for StaticAssets {
        async fn get_inventory(
            &self,
            steamid: SteamID,
            appid: AppId,
            _contextid: ContextId,
            _tradable_only: bool,
        ) -> Result<Vec<Asset>, Error> {
            Ok(self.inventories
                .get(&(u64::from(steamid), appid))
                .cloned()
                .unwrap_or_default())
        }
    }

    struct StaticBadges {
        summary: Option<BadgeSummary>,
    }

    #[async_trait]
    impl BadgeOracle for StaticBadges {
        async fn get_badges(&self, _customer: SteamID) -> Result<BadgeSummary, Error> {
            self.summary.clone().ok_or(Error::EmptyProfile)
        }
    }

    #[derive(Default)]
    struct FakeTransport {
        sent: Mutex<Vec<NewTradeOffer>>,
    }

    #[async_trait]
    impl OfferTransport for FakeTransport {
        async fn get_user_details(&self, _partner: SteamID) -> Result<UserDetails, Error> {
            Ok(UserDetails::default())
        }

        async fn send_offer(&self, offer: &NewTradeOffer) -> Result<SentOffer, Error> {
            let mut sent = self.sent.lock().unwrap();

            sent.push(offer.clone());

            Ok(SentOffer {
                tradeofferid: 999 + sent.len() as u64,
                needs_mobile_confirmation: false,
            })
        }

        async fn check_confirmations(&self) -> Result<(), Error> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        notices: Mutex<Vec<(u64, Notice)>>,
        admin_messages: Mutex<Vec<String>>,
        comments: Mutex<Vec<u64>>,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn notify_customer(&self, customer: SteamID, notice: Notice) {
            self.notices.lock().unwrap().push((u64::from(customer), notice));
        }

        async fn notify_admins(&self, message: &str) {
            self.admin_messages.lock().unwrap().push(message.into());
        }

        async fn post_comment(&self, customer: SteamID, _comment: &str) {
            self.comments.lock().unwrap().push(u64::from(customer));
        }
    }

    const BOT: u64 = 76561198000000001;
    const CUSTOMER: u64 = 76561198000000002;

    fn card_asset(assetid: u64, market_hash_name: &str) -> Asset {
        Asset {
            appid: STEAM_APPID,
            contextid: CARD_CONTEXTID,
            assetid,
            amount: 1,
            classinfo: std::sync::Arc::new(ClassInfo {
                classid: assetid,
                instanceid: 0,
                name: market_hash_name.into(),
                market_hash_name: market_hash_name.into(),
                tradable: true,
                tags: vec![
                    Tag {
                        category: "item_class".into(),
                        internal_name: "item_class_2".into(),
                    },
                    Tag {
                        category: "cardborder".into(),
                        internal_name: "cardborder_0".into(),
                    },
                ],
            }),
        }
    }

    fn key_asset(assetid: u64) -> Asset {
        Asset {
            appid: TF2_APPID,
            contextid: KEY_CONTEXTID,
            assetid,
            amount: 1,
            classinfo: std::sync::Arc::new(ClassInfo {
                classid: 101785959,
                instanceid: 0,
                name: "Mann Co. Supply Crate Key".into(),
                market_hash_name: "Mann Co. Supply Crate Key".into(),
                tradable: true,
                tags: Vec::new(),
            }),
        }
    }

    /// `count` copies of each of `names` for one game.
    fn cards(game: u32, names: &[&str], count: usize, next_assetid: &mut u64) -> Vec<Asset> {
        let mut assets = Vec::new();

        for name in names {
            for _ in 0..count {
                assets.push(card_asset(*next_assetid, &format!("{game}-{name}")));
                *next_assetid += 1;
            }
        }

        assets
    }

    struct Harness {
        engine: ExchangeEngine,
        transport: Arc<FakeTransport>,
        notifier: Arc<RecordingNotifier>,
        _dir: tempfile::TempDir,
    }

    fn harness(
        config: Config,
        inventories: HashMap<(u64, AppId), Vec<Asset>>,
        summary: Option<BadgeSummary>,
        catalog: FixedSetSizeCatalog,
    ) -> Harness {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config;

        config.data_directory = dir.path().into();

        let transport = Arc::new(FakeTransport::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let engine = ExchangeEngine::builder(config, SteamID::from(BOT))
            .assets(Arc::new(StaticAssets { inventories }))
            .badges(Arc::new(StaticBadges { summary }))
            .transport(Arc::clone(&transport) as Arc<dyn OfferTransport>)
            .notifier(Arc::clone(&notifier) as Arc<dyn Notifier>)
            .catalog(Arc::new(catalog))
            .build()
            .unwrap();

        Harness {
            engine,
            transport,
            notifier,
            _dir: dir,
        }
    }

    fn summary_with(badges: Vec<Badge>) -> BadgeSummary {
        BadgeSummary {
            badges,
            player_level: 10,
            player_xp: 1000,
        }
    }

    #[tokio::test]
    async fn buy_allocates_across_games_and_sends_a_symmetric_offer() {
        // The bot stocks 5 sets each of games 440 and 500 (3 cards per
        // set). The customer's badge caps 440 at 3; 500 is uncapped.
        let mut next_assetid = 1;
        let mut bot_cards = cards(440, &["A", "B", "C"], 5, &mut next_assetid);

        bot_cards.extend(cards(500, &["X", "Y", "Z"], 5, &mut next_assetid));

        let inventories = HashMap::from([
            ((BOT, STEAM_APPID), bot_cards),
            ((CUSTOMER, TF2_APPID), vec![key_asset(5001)]),
        ]);
        let summary = summary_with(vec![Badge {
            appid: Some(440),
            level: 2,
            border_color: Some(0),
        }]);
        let mut config = Config::default();

        config.sell_rate = 5;

        let harness = harness(
            config,
            inventories,
            Some(summary),
            FixedSetSizeCatalog::from([(440, 3), (500, 3)]),
        );

        harness.engine.load_inventory(false).await.unwrap();
        assert_eq!(harness.engine.have_sets(), 10);

        let sent = harness.engine
            .buy(SteamID::from(CUSTOMER), 1, AllocationMode::Compare)
            .await
            .unwrap();

        assert_eq!(sent.tradeofferid, 1000);

        let offers = harness.transport.sent.lock().unwrap();
        let offer = &offers[0];

        // 3 sets from 440 plus 2 from 500, 3 cards each, against 1 key.
        assert_eq!(offer.items_to_give.len(), 15);
        assert_eq!(offer.items_to_receive.len(), 1);
        assert_eq!(offer.items_to_receive[0].assetid, 5001);

        let record = TradeOfferRecord::from_metadata(offer.metadata.as_ref().unwrap()).unwrap();

        assert_eq!(record.direction, TradeDirection::Sell);
        assert_eq!(record.sets, 5);
        assert_eq!(record.currency, 1);

        let notices = harness.notifier.notices.lock().unwrap();

        assert_eq!(notices[0].1, Notice::OfferSent { tradeofferid: 1000 });
    }

    #[tokio::test]
    async fn buy_rejects_short_allocations() {
        // Only game 440 in stock and the badge caps it at 2; requesting 5
        // sets must refuse the trade rather than send a partial offer.
        let mut next_assetid = 1;
        let bot_cards = cards(440, &["A", "B", "C"], 5, &mut next_assetid);
        let inventories = HashMap::from([
            ((BOT, STEAM_APPID), bot_cards),
            ((CUSTOMER, TF2_APPID), vec![key_asset(5001)]),
        ]);
        let summary = summary_with(vec![Badge {
            appid: Some(440),
            level: 3,
            border_color: Some(0),
        }]);
        let mut config = Config::default();

        config.sell_rate = 5;

        let harness = harness(
            config,
            inventories,
            Some(summary),
            FixedSetSizeCatalog::from([(440, 3)]),
        );

        harness.engine.load_inventory(false).await.unwrap();

        let result = harness.engine
            .buy(SteamID::from(CUSTOMER), 1, AllocationMode::Compare)
            .await;

        assert!(matches!(result, Err(Error::MissingSets { available: 2, needed: 5 })));
        assert!(harness.transport.sent.lock().unwrap().is_empty());

        let notices = harness.notifier.notices.lock().unwrap();

        assert_eq!(notices[0].1, Notice::NeedMoreSets { available: 2, needed: 5 });
    }

    #[tokio::test]
    async fn buy_requires_badge_data_in_compare_mode() {
        let mut next_assetid = 1;
        let inventories = HashMap::from([
            ((BOT, STEAM_APPID), cards(440, &["A"], 1, &mut next_assetid)),
            ((CUSTOMER, TF2_APPID), vec![key_asset(5001)]),
        ]);
        let harness = harness(
            Config::default(),
            inventories,
            None,
            FixedSetSizeCatalog::from([(440, 1)]),
        );

        harness.engine.load_inventory(false).await.unwrap();

        let result = harness.engine
            .buy(SteamID::from(CUSTOMER), 1, AllocationMode::Compare)
            .await;

        assert!(matches!(result, Err(Error::EmptyProfile)));

        let notices = harness.notifier.notices.lock().unwrap();

        assert_eq!(notices[0].1, Notice::BadgesUnavailable);
    }

    #[tokio::test]
    async fn buy_refuses_customers_without_keys() {
        let mut next_assetid = 1;
        let inventories = HashMap::from([
            ((BOT, STEAM_APPID), cards(440, &["A"], 5, &mut next_assetid)),
        ]);
        let mut config = Config::default();

        config.sell_rate = 1;

        let harness = harness(
            config,
            inventories,
            None,
            FixedSetSizeCatalog::from([(440, 1)]),
        );

        harness.engine.load_inventory(false).await.unwrap();

        let result = harness.engine
            .buy(SteamID::from(CUSTOMER), 1, AllocationMode::Any)
            .await;

        assert!(matches!(result, Err(Error::CustomerMissingKeys { available: 0, needed: 1 })));

        let notices = harness.notifier.notices.lock().unwrap();

        assert_eq!(notices[0].1, Notice::CustomerHasNoKeys);
    }

    #[tokio::test]
    async fn sell_buys_sets_up_to_the_stock_cap() {
        // The customer holds 3 complete sets of game 570; the bot pays 1
        // key for 2 sets.
        let mut next_assetid = 1;
        let customer_cards = cards(570, &["L", "R"], 3, &mut next_assetid);
        let inventories = HashMap::from([
            ((BOT, TF2_APPID), vec![key_asset(9001), key_asset(9002)]),
            ((CUSTOMER, STEAM_APPID), customer_cards),
        ]);
        let mut config = Config::default();

        config.buy_rate = 2;

        let harness = harness(
            config,
            inventories,
            None,
            FixedSetSizeCatalog::from([(570, 2)]),
        );

        harness.engine.load_inventory(false).await.unwrap();
        assert_eq!(harness.engine.have_keys(), 2);

        let _sent = harness.engine.sell(SteamID::from(CUSTOMER), 1).await.unwrap();
        let offers = harness.transport.sent.lock().unwrap();
        let offer = &offers[0];

        assert_eq!(offer.items_to_give.len(), 1);
        assert_eq!(offer.items_to_give[0].assetid, 9001);
        // 2 sets of 2 cards each.
        assert_eq!(offer.items_to_receive.len(), 4);

        let record = TradeOfferRecord::from_metadata(offer.metadata.as_ref().unwrap()).unwrap();

        assert_eq!(record.direction, TradeDirection::Buy);
        assert_eq!(record.sets, 2);
    }

    #[tokio::test]
    async fn sell_respects_the_disable_flag() {
        let mut config = Config::default();

        config.enable_sell = false;

        let harness = harness(config, HashMap::new(), None, FixedSetSizeCatalog::from([]));
        let result = harness.engine.sell(SteamID::from(CUSTOMER), 1).await;

        assert!(matches!(result, Err(Error::Parameter(_))));
    }

    #[tokio::test]
    async fn completion_pipeline_runs_exactly_once_per_offer() {
        let harness = harness(
            Config::default(),
            HashMap::new(),
            None,
            FixedSetSizeCatalog::from([]),
        );
        let record = TradeOfferRecord {
            direction: TradeDirection::Sell,
            sets: 15,
            currency: 3,
            currency_label: KEY_CURRENCY_LABEL.into(),
        };
        let event = OfferEvent {
            tradeofferid: 999,
            partner: SteamID::from(CUSTOMER),
            state: TradeOfferState::Accepted,
            metadata: Some(record.to_metadata().unwrap()),
        };

        // The stream redelivers the same accepted offer.
        harness.engine.handle_offer_changed(event.clone()).await.unwrap();
        harness.engine.handle_offer_changed(event).await.unwrap();

        let profits = harness.engine.profits().await;

        assert_eq!(profits.sell.sets, 15);
        assert_eq!(profits.sell.currency, 3);
        assert_eq!(harness.notifier.admin_messages.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn non_accepted_states_have_no_effects() {
        let harness = harness(
            Config::default(),
            HashMap::new(),
            None,
            FixedSetSizeCatalog::from([]),
        );
        let event = OfferEvent {
            tradeofferid: 999,
            partner: SteamID::from(CUSTOMER),
            state: TradeOfferState::Declined,
            metadata: None,
        };

        harness.engine.handle_offer_changed(event).await.unwrap();

        assert_eq!(harness.engine.profits().await, Profits::default());
        // A declined offer must not mark the cache; a later acceptance
        // still gets credited.
        assert!(harness.engine.completed.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn accepted_offers_trigger_thanks_when_configured() {
        let mut config = Config::default();

        config.thanks_comment = Some("+Rep! Thanks for trading".into());

        let harness = harness(config, HashMap::new(), None, FixedSetSizeCatalog::from([]));
        let record = TradeOfferRecord {
            direction: TradeDirection::Buy,
            sets: 2,
            currency: 1,
            currency_label: KEY_CURRENCY_LABEL.into(),
        };
        let event = OfferEvent {
            tradeofferid: 1234,
            partner: SteamID::from(CUSTOMER),
            state: TradeOfferState::Accepted,
            metadata: Some(record.to_metadata().unwrap()),
        };

        harness.engine.handle_offer_changed(event).await.unwrap();

        assert_eq!(*harness.notifier.comments.lock().unwrap(), vec![CUSTOMER]);

        let notices = harness.notifier.notices.lock().unwrap();

        assert_eq!(notices[0].1, Notice::Thanks);
    }

    #[tokio::test]
    async fn key_amounts_are_clamped_to_the_configured_limit() {
        let harness = harness(
            Config::default(),
            HashMap::new(),
            None,
            FixedSetSizeCatalog::from([]),
        );
        let result = harness.engine
            .buy(SteamID::from(CUSTOMER), 16, AllocationMode::Any)
            .await;

        assert!(matches!(result, Err(Error::Parameter(_))));
    }
}
