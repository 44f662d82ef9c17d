//! Property tests over generated pipelines
//!
//! The canonical ordering is whatever the registry declares, so these
//! properties run over pipeline lengths beyond the three-stage example:
//! a token attested through `k` of `n` stages satisfies stage `i` iff
//! `i <= k`, and the inline and registry-backed paths always agree.

use proptest::prelude::*;

use warden_authz::{
    AccessGateway, KeyStore, MemoryResourceStore, ServiceChainDefinition, ServiceChainRegistry,
};
use warden_testkit::{chain_definition, key_ring, KeyFixture, TokenForge};

const SUBJECT: &str = "svc:test-client";
const RESOURCE: &str = "test-pipeline";

struct Pipeline {
    gateway: AccessGateway<MemoryResourceStore>,
    definition: ServiceChainDefinition,
    components: Vec<String>,
    token: String,
}

/// Build an `n`-stage pipeline and a token attested through the first `k` stages
fn pipeline(n: usize, k: usize) -> Pipeline {
    let issuer = KeyFixture::from_seed(1);
    let stage_keys: Vec<KeyFixture> = (0..n).map(|i| KeyFixture::from_seed(100 + i as u8)).collect();
    let components: Vec<String> = (0..n).map(|i| format!("stage_{}", i + 1)).collect();

    let stages: Vec<(&str, &KeyFixture)> = components
        .iter()
        .map(String::as_str)
        .zip(stage_keys.iter())
        .collect();
    let definition = chain_definition(RESOURCE, &stages);

    let mut token = TokenForge::new(issuer.signing_key().clone()).mint(SUBJECT, RESOURCE);
    for (component, key) in components.iter().zip(&stage_keys).take(k) {
        token = token.attest(component, key.signing_key());
    }

    let gateway = AccessGateway::new(
        KeyStore::new(key_ring(1, &[("issuer", &issuer, true)])),
        ServiceChainRegistry::from_definitions(vec![definition.clone()]).unwrap(),
        MemoryResourceStore::new(),
    );

    Pipeline {
        gateway,
        definition,
        components,
        token: token.encode(),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn positional_monotonicity(
        (n, k) in (1usize..=6).prop_flat_map(|n| (Just(n), 0..=n))
    ) {
        let pipeline = pipeline(n, k);

        for (index, component) in pipeline.components.iter().enumerate() {
            let expected = index + 1 <= k;
            let got = pipeline
                .gateway
                .verify_service_chain_by_name(&pipeline.token, SUBJECT, RESOURCE, component)
                .unwrap();
            prop_assert_eq!(got, expected, "n={}, k={}, stage {}", n, k, component);
        }
    }

    #[test]
    fn inline_equals_registry_backed(
        (n, k) in (1usize..=6).prop_flat_map(|n| (Just(n), 0..=n))
    ) {
        let pipeline = pipeline(n, k);

        let mut queries: Vec<&str> = pipeline.components.iter().map(String::as_str).collect();
        queries.push("nonexistent_service");

        for component in queries {
            let inline = pipeline
                .gateway
                .verify_service_chain(
                    &pipeline.token,
                    SUBJECT,
                    RESOURCE,
                    &pipeline.definition.nodes,
                    component,
                )
                .unwrap();
            let by_name = pipeline
                .gateway
                .verify_service_chain_by_name(&pipeline.token, SUBJECT, RESOURCE, component)
                .unwrap();
            prop_assert_eq!(inline, by_name, "paths diverged for {}", component);
        }
    }

    #[test]
    fn unknown_component_always_false(
        (n, k) in (1usize..=6).prop_flat_map(|n| (Just(n), 0..=n))
    ) {
        let pipeline = pipeline(n, k);
        let got = pipeline
            .gateway
            .verify_service_chain_by_name(
                &pipeline.token,
                SUBJECT,
                RESOURCE,
                "nonexistent_service",
            )
            .unwrap();
        prop_assert!(!got);
    }
}
