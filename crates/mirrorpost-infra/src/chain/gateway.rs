//! HTTP client for a MirrorPost contract gateway.
//!
//! The gateway exposes the contract's view functions and its event log as
//! JSON:
//!
//! - `GET {base}/posts/{id}`, `GET {base}/subcommunities/{id}`,
//!   `GET {base}/users/{address}`; `404` means the contract does not know it.
//! - `GET {base}/events?fromBlock={b}&afterLog={l}&limit={n}`; events at
//!   `fromBlock` with a log index above `afterLog` and every later block, in
//!   chain order. Without `afterLog` the whole of `fromBlock` is included.
//!
//! Subscriptions poll the event endpoint on a fixed interval. Each event in a
//! page is decoded on its own; one the indexer cannot read is logged and
//! skipped so the cursor still moves past it.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::time::MissedTickBehavior;

use mirrorpost_core::domain::{Address, EventCursor, EventEnvelope, PostId, SubCommunityId};
use mirrorpost_core::error::ChainError;
use mirrorpost_core::ports::{
    ChainPost, ChainSubCommunity, ChainUser, ContractReader, EventSink, EventSource,
    EventSubscription,
};

/// Connection and polling settings for the gateway.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub base_url: String,
    pub poll_interval: Duration,
    /// Maximum events requested per poll.
    pub batch_size: u32,
    /// First block replicated when a subscription has no cursor.
    pub start_block: u64,
    pub request_timeout: Duration,
}

impl GatewayConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            poll_interval: Duration::from_millis(2000),
            batch_size: 100,
            start_block: 0,
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// [`ContractReader`] and [`EventSource`] over HTTP.
#[derive(Clone)]
pub struct HttpContractGateway {
    client: Client,
    config: GatewayConfig,
}

impl HttpContractGateway {
    pub fn new(config: GatewayConfig) -> Result<Self, ChainError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ChainError::Transport(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// GET a JSON document; `Ok(None)` on 404.
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>, ChainError> {
        let url = self.url(path);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ChainError::Transport(format!("GET {url}: {e}")))?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => response
                .json::<T>()
                .await
                .map(Some)
                .map_err(|e| ChainError::Decode(format!("GET {url}: {e}"))),
            status => Err(ChainError::Transport(format!(
                "GET {url} returned status {status}"
            ))),
        }
    }

    /// One page of raw events; decoding happens per event in [`poll_events`].
    async fn fetch_events(&self, after: Option<EventCursor>) -> Result<Vec<Value>, ChainError> {
        let url = self.url("/events");
        let mut query = vec![("limit", self.config.batch_size.to_string())];
        match after {
            Some(cursor) => {
                query.push(("fromBlock", cursor.block_number.to_string()));
                query.push(("afterLog", cursor.log_index.to_string()));
            }
            None => query.push(("fromBlock", self.config.start_block.to_string())),
        }

        let response = self
            .client
            .get(&url)
            .query(&query)
            .send()
            .await
            .map_err(|e| ChainError::Transport(format!("GET {url}: {e}")))?;

        if !response.status().is_success() {
            return Err(ChainError::Transport(format!(
                "GET {url} returned status {}",
                response.status()
            )));
        }

        response
            .json::<Vec<Value>>()
            .await
            .map_err(|e| ChainError::Decode(format!("GET {url}: {e}")))
    }
}

#[async_trait]
impl ContractReader for HttpContractGateway {
    async fn get_post(&self, id: PostId) -> Result<Option<ChainPost>, ChainError> {
        self.get_json(&format!("/posts/{id}")).await
    }

    async fn get_sub_community(
        &self,
        id: SubCommunityId,
    ) -> Result<Option<ChainSubCommunity>, ChainError> {
        self.get_json(&format!("/subcommunities/{id}")).await
    }

    async fn get_user(&self, address: &Address) -> Result<Option<ChainUser>, ChainError> {
        let user: Option<ChainUser> = self.get_json(&format!("/users/{address}")).await?;
        Ok(user.filter(|u| u.exists))
    }
}

#[async_trait]
impl EventSource for HttpContractGateway {
    async fn subscribe(&self, after: Option<EventCursor>) -> Result<EventSubscription, ChainError> {
        let buffer = self.config.batch_size.max(1) as usize;
        let (sink, subscription) = EventSubscription::channel(buffer);

        tracing::info!(
            gateway = %self.config.base_url,
            after = ?after,
            "Polling gateway for contract events"
        );
        tokio::spawn(poll_events(self.clone(), sink, after));
        Ok(subscription)
    }
}

async fn poll_events(gateway: HttpContractGateway, sink: EventSink, mut after: Option<EventCursor>) {
    let mut ticker = tokio::time::interval(gateway.config.poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = sink.closed() => return,
            _ = ticker.tick() => {}
        }

        // Keep draining while the gateway returns full pages.
        loop {
            let batch = match gateway.fetch_events(after).await {
                Ok(batch) => batch,
                Err(e) => {
                    tracing::warn!(error = %e, "Event poll failed");
                    sink.fail(e).await;
                    return;
                }
            };

            let full = batch.len() >= gateway.config.batch_size as usize;
            for raw in batch {
                let Some(cursor) = read_cursor(&raw) else {
                    tracing::warn!(event = %raw, "Skipping gateway event without a cursor");
                    continue;
                };
                if after.is_some_and(|seen| cursor <= seen) {
                    continue;
                }
                after = Some(cursor);

                let envelope = match serde_json::from_value::<EventEnvelope>(raw) {
                    Ok(envelope) => envelope,
                    Err(e) => {
                        tracing::warn!(%cursor, error = %e, "Skipping undecodable gateway event");
                        continue;
                    }
                };
                if !sink.deliver(envelope).await {
                    return;
                }
            }

            if !full {
                break;
            }
        }
    }
}

fn read_cursor(raw: &Value) -> Option<EventCursor> {
    raw.get("cursor")
        .and_then(|cursor| EventCursor::deserialize(cursor).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mirrorpost_core::domain::ChainEvent;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const AUTHOR: &str = "0x00000000000000000000000000000000000000aa";

    fn gateway(server: &MockServer) -> HttpContractGateway {
        let mut config = GatewayConfig::new(server.uri());
        config.poll_interval = Duration::from_millis(10);
        config.batch_size = 2;
        HttpContractGateway::new(config).unwrap()
    }

    #[tokio::test]
    async fn get_post_decodes_contract_view() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/posts/7"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "postId": 7,
                "subCommunityId": 1,
                "author": AUTHOR,
                "username": "alice",
                "content": "gm",
                "timestamp": 1_700_000_000u64,
                "likes": 4,
                "isDeleted": false,
                "exists": true
            })))
            .mount(&server)
            .await;

        let post = gateway(&server).get_post(7).await.unwrap().unwrap();
        assert_eq!(post.likes, 4);
        assert!(post.is_live());
    }

    #[tokio::test]
    async fn not_found_means_missing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/subcommunities/3"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        assert!(gateway(&server).get_sub_community(3).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn server_error_is_transport_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/posts/1"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let err = gateway(&server).get_post(1).await.unwrap_err();
        assert!(matches!(err, ChainError::Transport(_)));
    }

    #[tokio::test]
    async fn malformed_body_is_decode_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/posts/1"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = gateway(&server).get_post(1).await.unwrap_err();
        assert!(matches!(err, ChainError::Decode(_)));
    }

    #[tokio::test]
    async fn user_without_registration_is_missing() {
        let server = MockServer::start().await;
        let address = Address::parse(AUTHOR).unwrap();
        Mock::given(method("GET"))
            .and(path(format!("/users/{AUTHOR}")))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"username": "", "exists": false})),
            )
            .mount(&server)
            .await;

        assert!(gateway(&server).get_user(&address).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn subscription_pages_through_events() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/events"))
            .and(query_param("fromBlock", "0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"cursor": {"blockNumber": 1, "logIndex": 0}, "event": "UsernameSet",
                 "args": {"user": AUTHOR, "username": "alice"}},
                {"cursor": {"blockNumber": 2, "logIndex": 0}, "event": "PostDeleted",
                 "args": {"postId": 9, "moderator": AUTHOR}}
            ])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/events"))
            .and(query_param("fromBlock", "2"))
            .and(query_param("afterLog", "0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"cursor": {"blockNumber": 3, "logIndex": 1}, "event": "PostLiked",
                 "args": {"postId": 9, "liker": AUTHOR, "likes": 1}}
            ])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/events"))
            .and(query_param("fromBlock", "3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let mut sub = gateway(&server).subscribe(None).await.unwrap();
        let cursors: Vec<EventCursor> = [
            sub.next().await.unwrap().unwrap(),
            sub.next().await.unwrap().unwrap(),
            sub.next().await.unwrap().unwrap(),
        ]
        .iter()
        .map(|e| e.cursor)
        .collect();

        assert_eq!(
            cursors,
            vec![
                EventCursor::new(1, 0),
                EventCursor::new(2, 0),
                EventCursor::new(3, 1)
            ]
        );
    }

    #[tokio::test]
    async fn undecodable_event_is_skipped_and_paging_continues() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/events"))
            .and(query_param("fromBlock", "0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"cursor": {"blockNumber": 1, "logIndex": 0}, "event": "UsernameSet",
                 "args": {"user": AUTHOR, "username": "alice"}},
                {"cursor": {"blockNumber": 2, "logIndex": 0}, "event": "OwnershipTransferred",
                 "args": {"previousOwner": AUTHOR, "newOwner": AUTHOR}},
                {"cursor": {"blockNumber": 3, "logIndex": 0}, "event": "PostDeleted",
                 "args": {"postId": 9, "moderator": AUTHOR}}
            ])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/events"))
            .and(query_param("fromBlock", "3"))
            .and(query_param("afterLog", "0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"cursor": {"blockNumber": 4, "logIndex": 0}, "event": "PostLiked",
                 "args": {"postId": 9, "liker": AUTHOR, "likes": "many"}},
                {"event": "PostLiked", "args": {"postId": 9, "liker": AUTHOR, "likes": 1}},
                {"cursor": {"blockNumber": 5, "logIndex": 2}, "event": "PostLiked",
                 "args": {"postId": 9, "liker": AUTHOR, "likes": 2}}
            ])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/events"))
            .and(query_param("fromBlock", "5"))
            .and(query_param("afterLog", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let mut sub = gateway(&server).subscribe(None).await.unwrap();
        let mut cursors = Vec::new();
        for _ in 0..3 {
            cursors.push(sub.next().await.unwrap().unwrap().cursor);
        }

        assert_eq!(
            cursors,
            vec![
                EventCursor::new(1, 0),
                EventCursor::new(3, 0),
                EventCursor::new(5, 2)
            ]
        );
    }

    #[tokio::test]
    async fn failed_poll_ends_subscription_with_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/events"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let mut sub = gateway(&server).subscribe(None).await.unwrap();
        assert!(matches!(
            sub.next().await,
            Some(Err(ChainError::Transport(_)))
        ));
        assert!(sub.next().await.is_none());
    }

    #[test]
    fn event_json_matches_gateway_shape() {
        let envelope: EventEnvelope = serde_json::from_value(json!({
            "cursor": {"blockNumber": 5, "logIndex": 2},
            "event": "CommentDeleted",
            "args": {"postId": 1, "commentId": 2, "moderator": AUTHOR}
        }))
        .unwrap();
        assert!(matches!(envelope.event, ChainEvent::CommentDeleted { comment_id: 2, .. }));
    }
}
