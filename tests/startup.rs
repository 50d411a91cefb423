//! Startup ordering: configuration and backend failures abort before the
//! listener is bound.

use std::collections::HashMap;

use storefront_gateway::backends::ServiceKind;
use storefront_gateway::lifecycle::startup;
use storefront_gateway::{Gateway, StartupError};

mod common;

fn env_for(addr: &str) -> HashMap<&'static str, String> {
    ServiceKind::ALL
        .iter()
        .map(|kind| (kind.env_key(), addr.to_string()))
        .collect()
}

#[test]
fn test_each_missing_address_is_fatal() {
    for missing in ServiceKind::ALL {
        let mut env = env_for("127.0.0.1:5000");
        env.remove(missing.env_key());

        let err = startup::load(None, |key| env.get(key).cloned()).unwrap_err();
        assert!(matches!(err, StartupError::Config(_)));
        assert!(
            err.to_string().contains(missing.env_key()),
            "{} not named in {}",
            missing.env_key(),
            err
        );
    }
}

#[test]
fn test_env_overrides_applied() {
    let mut env = env_for("127.0.0.1:5000");
    env.insert("PORT", "9090".into());
    env.insert("LOG_FORMAT", "json".into());

    let config = startup::load(None, |key| env.get(key).cloned()).unwrap();
    assert_eq!(config.listener.port, 9090);
    assert_eq!(config.services.get(ServiceKind::Shipping), "127.0.0.1:5000");
}

#[tokio::test]
async fn test_unreachable_backend_aborts_before_bind() {
    let backend = common::start_mock_backends(common::MockBackends::default()).await;

    // Two free ports: one with nothing behind it, and the one the gateway
    // would have bound, which must stay free.
    let probes = [
        std::net::TcpListener::bind("127.0.0.1:0").unwrap(),
        std::net::TcpListener::bind("127.0.0.1:0").unwrap(),
    ];
    let dead = probes[0].local_addr().unwrap();
    let reserved = probes[1].local_addr().unwrap();
    drop(probes);

    let mut config = common::gateway_config(backend);
    *config.services.slot_mut(ServiceKind::Recommendation) = dead.to_string();
    config.listener.port = reserved.port();

    let err = Gateway::start(config).await.err().expect("start should fail");
    assert!(matches!(err, StartupError::Registry(_)));
    assert!(err.to_string().contains("recommendation"), "{}", err);

    assert!(std::net::TcpListener::bind(reserved).is_ok());
}

#[tokio::test]
async fn test_gateway_starts_with_all_backends() {
    let backend = common::start_mock_backends(common::MockBackends::default()).await;
    let gateway = Gateway::start(common::gateway_config(backend)).await.unwrap();
    assert_ne!(gateway.local_addr().unwrap().port(), 0);
}
