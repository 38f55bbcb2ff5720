mod common;

use common::{start_upstreams, test_config, test_domain};
use serde_json::json;
use zonesync::{DnssecKey, PdnsClient, SyncError};

#[tokio::test]
async fn test_get_keys_exposes_active_ksk_only() {
    let (editor, publisher) = start_upstreams().await;
    editor.respond_json(
        "GET",
        "/zones/example.com./cryptokeys",
        200,
        json!([
            {
                "type": "Cryptokey",
                "id": 1,
                "active": true,
                "published": true,
                "keytype": "ksk",
                "flags": 257,
                "algorithm": "ECDSAP256SHA256",
                "bits": 256,
                "dnskey": "257 3 13 mdsswUyr3DPW132mOi8V9xESWE8jTo0dxCjjnopKl+GqJxpVXckHAeF+KkxLbxILfDLUT0rAK9iUzy1L53eKGQ==",
                "ds": [
                    "55648 13 1 b2b5e9b5f7c6e4e1d4c4c1f0d3c7c2a8b8e6d5f4",
                    "55648 13 2 6e0f6ad9d2e0c1d4a7fbd6c3b1a8e9f2c4d5e6f7a8b9c0d1e2f3a4b5c6d7e8f9"
                ],
                "privatekey": "Private-key-format: v1.2\nAlgorithm: 13 (ECDSAP256SHA256)\nPrivateKey: secret\n"
            },
            {
                "type": "Cryptokey",
                "id": 2,
                "active": false,
                "published": true,
                "keytype": "ksk",
                "flags": 257,
                "dnskey": "257 3 13 inactive",
                "ds": ["1 13 2 aa"]
            }
        ]),
    );

    let client = PdnsClient::new(test_config(&editor, &publisher), None).unwrap();
    let keys = client.get_keys(&test_domain("example.com")).await.unwrap();

    assert_eq!(keys.len(), 1);
    assert_eq!(keys[0].keytype, "ksk");
    assert_eq!(keys[0].flags, 257);
    assert_eq!(keys[0].ds.len(), 2);
    assert!(keys[0].dnskey.starts_with("257 3 13 mdssw"));

    let rendered = serde_json::to_string(&keys).unwrap();
    assert!(!rendered.contains("privatekey"));
    assert!(!rendered.contains("active"));
    assert_eq!(editor.last_path().as_deref(), Some("/zones/example.com./cryptokeys"));
    assert_eq!(publisher.call_count(), 0);
}

#[tokio::test]
async fn test_get_keys_keeps_server_order() {
    let (editor, publisher) = start_upstreams().await;
    editor.respond_json(
        "GET",
        "/zones/example.com./cryptokeys",
        200,
        json!([
            {"id": 9, "active": true, "keytype": "csk", "flags": 257, "dnskey": "k9", "ds": ["d9"]},
            {"id": 3, "active": true, "keytype": "zsk", "flags": 256, "dnskey": "k3"},
            {"id": 4, "active": true, "keytype": "ksk", "flags": 257, "dnskey": "k4", "ds": ["d4"]}
        ]),
    );

    let client = PdnsClient::new(test_config(&editor, &publisher), None).unwrap();
    let keys = client.get_keys(&test_domain("example.com")).await.unwrap();

    assert_eq!(
        keys,
        vec![
            DnssecKey {
                dnskey: "k9".into(),
                ds: vec!["d9".into()],
                flags: 257,
                keytype: "csk".into(),
            },
            DnssecKey {
                dnskey: "k4".into(),
                ds: vec!["d4".into()],
                flags: 257,
                keytype: "ksk".into(),
            },
        ]
    );
}

#[tokio::test]
async fn test_get_keys_for_unsigned_zone_is_empty() {
    let (editor, publisher) = start_upstreams().await;
    editor.respond("GET", "/zones/example.com./cryptokeys", 200, "[]");

    let client = PdnsClient::new(test_config(&editor, &publisher), None).unwrap();
    let keys = client.get_keys(&test_domain("example.com")).await.unwrap();
    assert!(keys.is_empty());
}

#[tokio::test]
async fn test_get_keys_errors() {
    let (editor, publisher) = start_upstreams().await;
    editor.respond("GET", "/zones/example.com./cryptokeys", 502, "Bad Gateway");
    editor.respond("GET", "/zones/example.org./cryptokeys", 200, "not json");

    let client = PdnsClient::new(test_config(&editor, &publisher), None).unwrap();

    let err = client.get_keys(&test_domain("example.com")).await.unwrap_err();
    assert!(matches!(&err, SyncError::Upstream(r) if r.status == 502));

    let err = client.get_keys(&test_domain("example.org")).await.unwrap_err();
    assert!(matches!(err, SyncError::Decode(_)));

    let err = client.get_keys(&test_domain("exa mple.com")).await.unwrap_err();
    assert!(matches!(err, SyncError::InvalidIdentifier(_)));
    assert_eq!(editor.call_count(), 2);
}
