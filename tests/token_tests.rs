//! Token lifecycle properties: issuance, verification, expiry and tamper
//! resistance, driven through the configuration layer the way the server
//! builds them.

use std::collections::BTreeSet;
use std::time::Duration;

use stockroom::auth::TokenRejection;
use stockroom::config::AuthConfig;

// base64 of 32 bytes of key material
const SECRET: &str = "dGhpcnR5LXR3by1ieXRlcy1vZi10ZXN0LWtleS1tYXQ=";

fn roles(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|r| r.to_string()).collect()
}

#[tokio::test]
async fn round_trip_preserves_subject_and_claims() {
    let config = AuthConfig::new(SECRET, 60_000);
    let issuer = config.issuer().unwrap();
    let verifier = config.verifier().unwrap();

    let token = issuer.issue("alice", roles(&["ADMIN"])).await.unwrap();
    let identity = verifier.verify(&token).await.unwrap();

    assert_eq!(identity.subject, "alice");
    assert_eq!(identity.roles, roles(&["ADMIN"]));
}

#[tokio::test]
async fn one_millisecond_lifetime_expires() {
    let config = AuthConfig::new(SECRET, 1);
    let issuer = config.issuer().unwrap();
    let verifier = config.verifier().unwrap();

    let token = issuer.issue("alice", roles(&[])).await.unwrap();
    tokio::time::sleep(Duration::from_millis(25)).await;

    assert_eq!(verifier.verify(&token).await, Err(TokenRejection::Expired));
}

#[tokio::test]
async fn tokens_are_not_idempotent_across_issuance() {
    let config = AuthConfig::new(SECRET, 60_000);
    let issuer = config.issuer().unwrap();

    let first = issuer.issue("alice", roles(&["ADMIN"])).await.unwrap();
    tokio::time::sleep(Duration::from_millis(5)).await;
    let second = issuer.issue("alice", roles(&["ADMIN"])).await.unwrap();

    // Issue instants differ, so the credentials differ.
    assert_ne!(first, second);
}

#[tokio::test]
async fn flipping_signature_bytes_never_yields_an_identity() {
    let config = AuthConfig::new(SECRET, 60_000);
    let issuer = config.issuer().unwrap();
    let verifier = config.verifier().unwrap();

    let token = issuer.issue("alice", roles(&["ADMIN"])).await.unwrap();
    let (payload, signature) = token.rsplit_once('.').unwrap();

    // Flip each character of the signature body in turn; none of the
    // mutants may verify.
    for index in 0..signature.len().saturating_sub(2) {
        let mut mutated: Vec<char> = signature.chars().collect();
        mutated[index] = if mutated[index] == 'A' { 'B' } else { 'A' };
        let tampered = format!("{}.{}", payload, mutated.into_iter().collect::<String>());
        if tampered == token {
            continue;
        }

        let result = verifier.verify(&tampered).await;
        assert!(
            matches!(
                result,
                Err(TokenRejection::Tampered) | Err(TokenRejection::Malformed)
            ),
            "mutant at index {} verified: {:?}",
            index,
            result
        );
    }
}

#[tokio::test]
async fn payload_mutation_invalidates_signature() {
    let config = AuthConfig::new(SECRET, 60_000);
    let issuer = config.issuer().unwrap();
    let verifier = config.verifier().unwrap();

    let token = issuer.issue("alice", roles(&[])).await.unwrap();
    let parts: Vec<&str> = token.split('.').collect();

    // Substitute the payload of a different token, keep the signature.
    let other = issuer.issue("mallory", roles(&["ADMIN"])).await.unwrap();
    let other_parts: Vec<&str> = other.split('.').collect();
    let spliced = format!("{}.{}.{}", parts[0], other_parts[1], parts[2]);

    assert_eq!(
        verifier.verify(&spliced).await,
        Err(TokenRejection::Tampered)
    );
}

#[tokio::test]
async fn extract_subject_fails_loudly_on_damage() {
    let config = AuthConfig::new(SECRET, 60_000);
    let issuer = config.issuer().unwrap();
    let verifier = config.verifier().unwrap();

    let token = issuer.issue("alice", roles(&[])).await.unwrap();
    assert_eq!(verifier.extract_subject(&token).await.unwrap(), "alice");

    assert_eq!(
        verifier.extract_subject("garbage").await,
        Err(TokenRejection::Malformed)
    );
}

#[test]
fn misconfigured_secret_fails_at_startup_not_per_call() {
    let config = AuthConfig::new("*** definitely not base64 ***", 60_000);
    assert!(config.issuer().is_err());
    assert!(config.verifier().is_err());
}
