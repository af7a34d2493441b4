//! tests/store_tests.rs
//! Configs, cola y heartbeat sobre SQLite en memoria.

#[cfg(test)]
mod tests {
    use actix_rt::test;
    use chrono::{DateTime, Utc};

    use crate::errors::WorkerError;
    use crate::models::config_model::{ConfigType, CreateConfigRequest};
    use crate::models::message_model::MessageStatus;
    use crate::services::config_service::ConfigService;
    use crate::services::heartbeat_service::HeartbeatService;
    use crate::services::message_service::MessageService;
    use crate::tests::support::{enqueue, test_pool};

    fn parse(ts: &str) -> DateTime<Utc> {
        ts.parse().expect("timestamp ISO")
    }

    #[test]
    async fn test_seed_defaults_is_idempotent() {
        let configs = ConfigService::new(test_pool().await);
        configs.seed_defaults().await.unwrap();
        configs.seed_defaults().await.unwrap();

        let all = configs.list().await.unwrap();
        assert_eq!(all.len(), 3);

        let screenshot = configs
            .get(ConfigType::TradingViewScreenshot)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(screenshot.data, "1D");
        assert!(screenshot.enabled);

        let creds = configs
            .get(ConfigType::TradingViewCredentials)
            .await
            .unwrap()
            .unwrap();
        assert!(!creds.enabled);
    }

    #[test]
    async fn test_require_missing_config() {
        let configs = ConfigService::new(test_pool().await);
        let err = configs.require(ConfigType::TelegramBot).await.unwrap_err();
        assert!(matches!(
            err,
            WorkerError::ConfigurationMissing(ConfigType::TelegramBot)
        ));
        assert!(err.to_log().contains("ConfigurationMissing"));
    }

    #[test]
    async fn test_create_accepts_unknown_type() {
        let configs = ConfigService::new(test_pool().await);
        let rec = configs
            .create(CreateConfigRequest {
                config_type: "whatever".to_string(),
                data: "x".to_string(),
                enabled: None,
            })
            .await
            .unwrap();
        assert_eq!(rec.config_type, "whatever");
        assert!(rec.enabled);
        assert_eq!(configs.list().await.unwrap().len(), 1);
    }

    #[test]
    async fn test_heartbeat_init_creates_once() {
        let configs = ConfigService::new(test_pool().await);
        let heartbeat = HeartbeatService::new(configs.clone());

        heartbeat.init().await.unwrap();
        let first = configs.get(ConfigType::Worker).await.unwrap().unwrap();
        heartbeat.init().await.unwrap();

        let rows: Vec<_> = configs
            .list()
            .await
            .unwrap()
            .into_iter()
            .filter(|c| c.config_type == "worker")
            .collect();
        assert_eq!(rows.len(), 1);
        // El segundo init no pisa el valor
        assert_eq!(rows[0].data, first.data);
    }

    #[test]
    async fn test_heartbeat_touch_is_monotonic() {
        let configs = ConfigService::new(test_pool().await);
        let heartbeat = HeartbeatService::new(configs.clone());
        heartbeat.init().await.unwrap();

        let mut last = parse(&configs.get(ConfigType::Worker).await.unwrap().unwrap().data);
        for _ in 0..3 {
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
            heartbeat.touch().await.unwrap();
            let now = parse(&configs.get(ConfigType::Worker).await.unwrap().unwrap().data);
            assert!(now >= last);
            last = now;
        }
    }

    #[test]
    async fn test_heartbeat_touch_without_row_is_noop() {
        let configs = ConfigService::new(test_pool().await);
        let heartbeat = HeartbeatService::new(configs.clone());

        heartbeat.touch().await.expect("no es error");
        assert!(configs.get(ConfigType::Worker).await.unwrap().is_none());
    }

    #[test]
    async fn test_queue_status_and_log_updates() {
        let messages = MessageService::new(test_pool().await);
        let a = enqueue(&messages, "AAPL a", None, "c1").await;
        let b = enqueue(&messages, "MSFT b", Some("1h"), "c2").await;
        assert_eq!(a.status, "pending");
        assert_eq!(b.timeframe.as_deref(), Some("1h"));

        messages.update_log(a.id, "captura fallida").await.unwrap();
        let row = messages.get(a.id).await.unwrap();
        assert_eq!(row.status, "pending");
        assert_eq!(row.log.as_deref(), Some("captura fallida"));

        messages
            .update_status(a.id, MessageStatus::Failed, "{}")
            .await
            .unwrap();
        let pending = messages.find_by_status(MessageStatus::Pending).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, b.id);
        assert_eq!(messages.list(None).await.unwrap().len(), 2);
    }

    #[test]
    async fn test_message_parsing() {
        let messages = MessageService::new(test_pool().await);
        let msg = enqueue(&messages, "NASDAQ:AAPL  Buy now ", None, "chan1,chan2").await;

        assert_eq!(msg.symbol(), "NASDAQ:AAPL");
        assert_eq!(msg.caption(), "Buy now");
        assert_eq!(msg.channel_list(), vec!["chan1", "chan2"]);
        assert_eq!(msg.timeframe_or("1D"), "1D");

        let lone = enqueue(&messages, "BTCUSD", Some("4h"), "x").await;
        assert_eq!(lone.caption(), "");
        assert_eq!(lone.timeframe_or("1D"), "4h");

        // Un timeframe vacío no pisa el de la config
        let blank = enqueue(&messages, "BTCUSD", Some(""), "x").await;
        assert_eq!(blank.timeframe_or("1D"), "1D");
    }
}
